use crate::events::{ListenerId, StyleEvent, StyleEventKind};
use crate::style::cssom::SheetRef;
use crate::style::engine;
use html5ever::namespace_url;
use html5ever::{ns, LocalName, QualName};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

pub mod dom_tree {
    use super::*;

    pub type NodeRef = Rc<RefCell<Node>>;

    #[derive(Debug, Clone)]
    pub enum Node {
        DocumentRoot(DocumentRootNode),
        Element(ElementNode),
        Text(String),
        Comment(String),
    }

    #[derive(Debug, Clone, Default)]
    pub struct DocumentRootNode {
        pub children: Vec<NodeRef>,
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        pub attributes: Vec<(String, String)>,
        pub children: Vec<NodeRef>,
        pub parent: Option<Weak<RefCell<Node>>>,
        /// Live rule list of a `<style>` element, parsed from its text on first access.
        pub sheet: Option<SheetRef>,
    }

    /// Callback invoked for every dispatched [`StyleEvent`] of the kind it was registered for.
    pub type Listener = Rc<dyn Fn(&StyleEvent)>;

    struct Registration {
        id: ListenerId,
        kind: StyleEventKind,
        callback: Listener,
    }

    /// A document (or detached fragment/shadow-like root) hosting style nodes.
    pub struct Document {
        pub root: NodeRef,
        pub doctype: RefCell<Option<Doctype>>,
        listeners: RefCell<Vec<Registration>>,
        next_listener: Cell<u64>,
    }

    #[derive(Debug)]
    pub struct Doctype {
        pub name: String,
        pub public_id: String,
        pub system_id: String,
    }

    impl DocumentRootNode {
        pub fn new() -> Self {
            DocumentRootNode {
                children: Vec::new(),
            }
        }
    }

    impl ElementNode {
        pub fn new(tag: String, qual_name: QualName) -> Self {
            ElementNode {
                tag,
                qual_name,
                attributes: Vec::new(),
                children: Vec::new(),
                parent: None,
                sheet: None,
            }
        }

        pub fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }

        pub fn is_style(&self) -> bool {
            self.tag.eq_ignore_ascii_case("style")
        }
    }

    impl fmt::Debug for Document {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Document")
                .field("root", &self.root)
                .field("doctype", &self.doctype)
                .field("listeners", &self.listeners.borrow().len())
                .finish()
        }
    }

    impl Document {
        /// The `<head>` container, either directly under the root or under its `<html>` element.
        pub fn head(&self) -> Option<NodeRef> {
            for child in children(&self.root) {
                match tag_name(&child).as_deref() {
                    Some(tag) if tag.eq_ignore_ascii_case("head") => return Some(child),
                    Some(tag) if tag.eq_ignore_ascii_case("html") => {
                        return children(&child)
                            .into_iter()
                            .find(|c| is_element_named(c, "head"));
                    }
                    _ => {}
                }
            }
            None
        }

        /// Every `<style>` sheet in the document, in tree order.
        pub fn style_sheets(&self) -> Vec<SheetRef> {
            let mut sheets = Vec::new();
            collect_style_sheets(&self.root, &mut sheets);
            sheets
        }

        pub fn add_listener<F>(&self, kind: StyleEventKind, callback: F) -> ListenerId
        where
            F: Fn(&StyleEvent) + 'static,
        {
            let id = ListenerId(self.next_listener.get());
            self.next_listener.set(id.0 + 1);
            self.listeners.borrow_mut().push(Registration {
                id,
                kind,
                callback: Rc::new(callback),
            });
            id
        }

        pub fn remove_listener(&self, id: ListenerId) -> bool {
            let mut listeners = self.listeners.borrow_mut();
            let before = listeners.len();
            listeners.retain(|registration| registration.id != id);
            listeners.len() != before
        }

        /// Delivers `event` to the listeners registered for its kind.
        ///
        /// The listener list is snapshotted first, so callbacks may register or
        /// remove listeners without affecting the current dispatch.
        pub fn dispatch_event(&self, event: &StyleEvent) {
            let callbacks: Vec<Listener> = self
                .listeners
                .borrow()
                .iter()
                .filter(|registration| registration.kind == event.kind())
                .map(|registration| Rc::clone(&registration.callback))
                .collect();
            for callback in callbacks {
                callback(event);
            }
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Rc::new(RefCell::new(Node::DocumentRoot(DocumentRootNode::new()))),
            doctype: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
        }
    }

    /// Creates a detached HTML element.
    pub fn create_element(tag: &str) -> NodeRef {
        let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
        Rc::new(RefCell::new(Node::Element(ElementNode::new(
            tag.to_string(),
            qual_name,
        ))))
    }

    pub fn create_text(text: &str) -> NodeRef {
        Rc::new(RefCell::new(Node::Text(text.to_string())))
    }

    pub fn create_comment(text: &str) -> NodeRef {
        Rc::new(RefCell::new(Node::Comment(text.to_string())))
    }

    pub fn children(node: &NodeRef) -> Vec<NodeRef> {
        match &*node.borrow() {
            Node::DocumentRoot(root) => root.children.clone(),
            Node::Element(elem) => elem.children.clone(),
            Node::Text(_) | Node::Comment(_) => Vec::new(),
        }
    }

    fn children_mut(node: &mut Node) -> Option<&mut Vec<NodeRef>> {
        match node {
            Node::DocumentRoot(root) => Some(&mut root.children),
            Node::Element(elem) => Some(&mut elem.children),
            Node::Text(_) | Node::Comment(_) => None,
        }
    }

    /// Drops a cached sheet after the children of a `<style>` element changed;
    /// the next [`style_sheet`] call reparses.
    fn invalidate_sheet(node: &mut Node) {
        if let Node::Element(elem) = node {
            elem.sheet = None;
        }
    }

    /// Empties `node`, handing back its former children.
    pub fn take_children(node: &NodeRef) -> Vec<NodeRef> {
        let mut node_borrow = node.borrow_mut();
        invalidate_sheet(&mut node_borrow);
        children_mut(&mut node_borrow)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn parent(node: &NodeRef) -> Option<NodeRef> {
        match &*node.borrow() {
            Node::Element(elem) => elem.parent.as_ref().and_then(Weak::upgrade),
            _ => None,
        }
    }

    pub fn tag_name(node: &NodeRef) -> Option<String> {
        match &*node.borrow() {
            Node::Element(elem) => Some(elem.tag.clone()),
            _ => None,
        }
    }

    pub fn is_element_named(node: &NodeRef, tag: &str) -> bool {
        matches!(&*node.borrow(), Node::Element(elem) if elem.tag.eq_ignore_ascii_case(tag))
    }

    pub fn is_style_element(node: &NodeRef) -> bool {
        matches!(&*node.borrow(), Node::Element(elem) if elem.is_style())
    }

    pub fn get_attribute(node: &NodeRef, name: &str) -> Option<String> {
        match &*node.borrow() {
            Node::Element(elem) => elem.attribute(name).map(str::to_string),
            _ => None,
        }
    }

    pub fn set_attribute(node: &NodeRef, name: &str, value: &str) {
        if let Node::Element(elem) = &mut *node.borrow_mut() {
            match elem
                .attributes
                .iter_mut()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
            {
                Some((_, existing)) => *existing = value.to_string(),
                None => elem.attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Inserts `child` into `parent` at `index` (clamped to the child count).
    pub fn insert_child(parent: &NodeRef, index: usize, child: NodeRef) {
        if let Node::Element(elem) = &mut *child.borrow_mut() {
            elem.parent = Some(Rc::downgrade(parent));
        }
        let mut parent_borrow = parent.borrow_mut();
        invalidate_sheet(&mut parent_borrow);
        if let Some(children) = children_mut(&mut parent_borrow) {
            let index = index.min(children.len());
            children.insert(index, child);
        }
    }

    pub fn append_child(parent: &NodeRef, child: NodeRef) {
        let len = children(parent).len();
        insert_child(parent, len, child);
    }

    /// Appends text, merging with a trailing text node when there is one.
    pub fn append_text(parent: &NodeRef, text: &str) {
        if let Some(last) = children(parent).last() {
            if let Node::Text(existing) = &mut *last.borrow_mut() {
                existing.push_str(text);
                invalidate_sheet(&mut parent.borrow_mut());
                return;
            }
        }
        append_child(parent, create_text(text));
    }

    /// Removes `node` from its parent. Only elements track their parent.
    pub fn detach(node: &NodeRef) {
        let Some(parent) = parent(node) else {
            return;
        };
        {
            let mut parent_borrow = parent.borrow_mut();
            invalidate_sheet(&mut parent_borrow);
            if let Some(children) = children_mut(&mut parent_borrow) {
                children.retain(|child| !Rc::ptr_eq(child, node));
            }
        }
        if let Node::Element(elem) = &mut *node.borrow_mut() {
            elem.parent = None;
        }
    }

    /// Concatenated text of the node's direct text children.
    pub fn text_content(node: &NodeRef) -> String {
        let mut text = String::new();
        for child in children(node) {
            if let Node::Text(chunk) = &*child.borrow() {
                text.push_str(chunk);
            }
        }
        text
    }

    /// Replaces all children with a single text node. A `<style>` element is reparsed
    /// immediately, which detaches rule handles taken from its previous sheet.
    pub fn set_text_content(node: &NodeRef, text: &str) {
        {
            let mut node_borrow = node.borrow_mut();
            if let Node::Element(elem) = &mut *node_borrow {
                elem.sheet = None;
            }
            if let Some(children) = children_mut(&mut node_borrow) {
                children.clear();
                children.push(create_text(text));
            }
        }
        style_sheet(node);
    }

    /// The live sheet of a `<style>` element; `None` for any other node.
    pub fn style_sheet(node: &NodeRef) -> Option<SheetRef> {
        let text = {
            let node_borrow = node.borrow();
            let Node::Element(elem) = &*node_borrow else {
                return None;
            };
            if !elem.is_style() {
                return None;
            }
            if let Some(sheet) = &elem.sheet {
                return Some(Rc::clone(sheet));
            }
            elem.children
                .iter()
                .filter_map(|child| match &*child.borrow() {
                    Node::Text(chunk) => Some(chunk.clone()),
                    _ => None,
                })
                .collect::<String>()
        };
        let sheet = engine::parse_stylesheet(node, &text);
        if let Node::Element(elem) = &mut *node.borrow_mut() {
            elem.sheet = Some(Rc::clone(&sheet));
        }
        Some(sheet)
    }

    fn collect_style_sheets(node: &NodeRef, sheets: &mut Vec<SheetRef>) {
        if let Some(sheet) = style_sheet(node) {
            sheets.push(sheet);
            return;
        }
        for child in children(node) {
            collect_style_sheets(&child, sheets);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::dom_tree::*;
    use crate::events::EmitterIdentity;
    use std::rc::Rc;

    #[test]
    fn style_sheets_are_collected_in_tree_order() {
        let document = new_document();
        let first = create_element("style");
        set_text_content(&first, ".a { color: red; }");
        let div = create_element("div");
        let nested = create_element("style");
        set_text_content(&nested, ".b { color: blue; }");
        append_child(&div, Rc::clone(&nested));
        append_child(&document.root, Rc::clone(&first));
        append_child(&document.root, div);

        let sheets = document.style_sheets();
        assert_eq!(sheets.len(), 2);
        let owner = sheets[1].borrow().owner_node().unwrap();
        assert!(Rc::ptr_eq(&owner, &nested));
    }

    #[test]
    fn set_text_content_replaces_the_live_sheet() {
        let style = create_element("style");
        set_text_content(&style, ".a { color: red; }");
        let before = style_sheet(&style).unwrap();
        set_text_content(&style, ".a { color: red; }.b { }");
        let after = style_sheet(&style).unwrap();

        assert!(!Rc::ptr_eq(&before, &after));
        assert_eq!(after.borrow().rules().len(), 2);
    }

    #[test]
    fn appending_to_a_style_element_reparses_its_sheet() {
        let style = create_element("style");
        set_text_content(&style, ".a { color: red; }");
        let before = style_sheet(&style).unwrap();

        append_text(&style, ".b { color: blue; }");
        let after = style_sheet(&style).unwrap();
        assert!(!Rc::ptr_eq(&before, &after));
        assert_eq!(after.borrow().rules().len(), 2);

        append_child(&style, create_text(".c { }"));
        assert_eq!(style_sheet(&style).unwrap().borrow().rules().len(), 3);

        take_children(&style);
        assert!(style_sheet(&style).unwrap().borrow().rules().is_empty());
    }

    #[test]
    fn comments_do_not_count_as_text() {
        let style = create_element("style");
        append_child(&style, create_comment(" theme "));
        append_text(&style, ".a { color: red; }");

        assert_eq!(text_content(&style), ".a { color: red; }");
        assert_eq!(children(&style).len(), 2);
    }

    #[test]
    fn head_is_found_under_the_html_element() {
        let document = new_document();
        let html = create_element("html");
        let head = create_element("head");
        append_child(&html, Rc::clone(&head));
        append_child(&html, create_element("body"));
        append_child(&document.root, html);

        assert!(Rc::ptr_eq(&document.head().unwrap(), &head));
        assert!(new_document().head().is_none());
    }

    #[test]
    fn detach_removes_the_element_from_its_parent() {
        let parent = create_element("div");
        let child = create_element("span");
        append_child(&parent, Rc::clone(&child));
        detach(&child);

        assert!(children(&parent).is_empty());
        assert!(super::dom_tree::parent(&child).is_none());
    }

    #[test]
    fn listeners_only_receive_their_own_kind() {
        use crate::events::{StyleEvent, StyleEventKind};
        use std::cell::RefCell;

        let document = new_document();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = document.add_listener(StyleEventKind::UnknownCssRule, move |event| {
            sink.borrow_mut().push(event.clone());
        });

        let emitter = EmitterIdentity::new("Test");
        document.dispatch_event(&StyleEvent::UnknownStylesheet {
            stylesheet_name: "theme".into(),
            emitter: emitter.clone(),
        });
        document.dispatch_event(&StyleEvent::UnknownCssRule {
            stylesheet_name: "theme".into(),
            selector: ".card".into(),
            emitter,
        });
        assert_eq!(seen.borrow().len(), 1);

        assert!(document.remove_listener(id));
        assert!(!document.remove_listener(id));
    }
}
