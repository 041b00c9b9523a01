//! This module contains functions and types for parsing HTML into a host document
//! and writing it back out.
//!
//! It uses html5ever as the HTML parser and builds the tree defined in the
//! `crate::dom::dom_tree` module.

use crate::dom::dom_tree;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    interface::{ElemName, NodeOrText, QuirksMode, TreeSink},
    LocalName, Namespace, QualName,
};
use log::debug;
use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

/// A list of void (self-closing) elements in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "meta", "img", "br", "hr", "input", "link", "area", "base", "col", "embed", "param", "source",
    "track", "wbr",
];

/// Elements whose text is written out unescaped.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// Creates a document from the provided HTML content.
///
/// # Arguments
///
/// * `html_content` - A string slice containing the HTML to parse.
pub fn create_dom_tree(html_content: &str) -> dom_tree::Document {
    let tree_sink = StyleRepoTreeSink::new();
    html5ever::parse_document(tree_sink, Default::default()).one(html_content)
}

/// Serializes the entire Document, including its DOCTYPE (if any), back to HTML.
pub fn serialize_document(document: &dom_tree::Document) -> String {
    let mut output = String::new();
    if let Some(doctype) = &*document.doctype.borrow() {
        output.push_str(&format!("<!DOCTYPE {}>", doctype.name));
    }
    serialize_node(&document.root, false, &mut output);
    output
}

fn serialize_node(node: &dom_tree::NodeRef, raw_text: bool, output: &mut String) {
    match &*node.borrow() {
        dom_tree::Node::DocumentRoot(root) => {
            for child in &root.children {
                serialize_node(child, false, output);
            }
        }
        dom_tree::Node::Element(elem) => {
            output.push('<');
            output.push_str(&elem.tag);
            for (k, v) in &elem.attributes {
                output.push_str(&format!(" {}=\"{}\"", k, escape(v, true)));
            }
            output.push('>');

            if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&elem.tag.as_str());
            for child in &elem.children {
                serialize_node(child, raw, output);
            }
            output.push_str(&format!("</{}>", elem.tag));
        }
        dom_tree::Node::Text(text) => {
            if raw_text {
                output.push_str(text);
            } else {
                output.push_str(&escape(text, false));
            }
        }
        dom_tree::Node::Comment(text) => {
            output.push_str("<!--");
            output.push_str(text);
            output.push_str("-->");
        }
    }
}

fn escape(text: &str, attribute: bool) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' if attribute => escaped.push_str("&quot;"),
            '<' if !attribute => escaped.push_str("&lt;"),
            '>' if !attribute => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// A custom TreeSink for building the document used by the parser.
pub struct StyleRepoTreeSink {
    document: dom_tree::Document,
}

impl StyleRepoTreeSink {
    /// Creates a new `StyleRepoTreeSink` with an empty document.
    pub fn new() -> Self {
        Self {
            document: dom_tree::new_document(),
        }
    }
}

impl Default for StyleRepoTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

/// A simple implementation of the `ElemName` trait for our elements.
#[derive(Debug)]
pub struct MyElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for MyElemName {
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

impl TreeSink for StyleRepoTreeSink {
    type Handle = dom_tree::NodeRef;
    type Output = dom_tree::Document;
    type ElemName<'a>
        = MyElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.document
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        debug!("html parse error: {}", msg);
    }

    fn get_document(&self) -> Self::Handle {
        self.document.root.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        if let dom_tree::Node::Element(ref elem) = *target.borrow() {
            return MyElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            };
        }
        panic!("elem_name called on non-element node")
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: html5ever::interface::ElementFlags,
    ) -> Self::Handle {
        let mut element_node = dom_tree::ElementNode::new(name.local.to_string(), name);
        element_node.attributes = attrs
            .into_iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        Rc::new(RefCell::new(dom_tree::Node::Element(element_node)))
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        dom_tree::create_comment(&text)
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        dom_tree::create_text(&format!("{} {}", target, data))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => dom_tree::append_child(parent, node),
            NodeOrText::AppendText(text) => dom_tree::append_text(parent, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if dom_tree::parent(element).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        *self.document.doctype.borrow_mut() = Some(dom_tree::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    /// Quirks mode has no bearing on style resolution.
    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let Some(parent) = dom_tree::parent(sibling) else {
            return;
        };
        let index = dom_tree::children(&parent)
            .iter()
            .position(|c| Rc::ptr_eq(c, sibling))
            .unwrap_or(0);
        let node = match child {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => dom_tree::create_text(&text),
        };
        dom_tree::insert_child(&parent, index, node);
    }

    /// Adds attributes to the target node if they are missing.
    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<html5ever::Attribute>) {
        if let dom_tree::Node::Element(elem_node) = &mut *target.borrow_mut() {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if !elem_node.attributes.iter().any(|(k, _)| k == &key) {
                    elem_node.attributes.push((key, attr.value.to_string()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        dom_tree::detach(target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        for child in dom_tree::take_children(node) {
            dom_tree::append_child(new_parent, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn style_text_survives_a_round_trip() {
        let html = r#"<!DOCTYPE html><html><head><style data-stylesheet="theme">.a > .b { color: red; }</style></head><body><p class="x">a &amp; b</p></body></html>"#;
        let document = create_dom_tree(html);
        assert_eq!(serialize_document(&document), html);
    }

    #[test]
    fn comments_are_written_back_out() {
        let html = r#"<html><head><!-- theme overrides --><style data-stylesheet="theme">.a { color: red; }</style></head><body><!--x--></body></html>"#;
        let document = create_dom_tree(html);
        assert_eq!(serialize_document(&document), html);
    }

    #[test]
    fn parsed_documents_expose_head_and_sheets() {
        let document = create_dom_tree("<style>.card { color: red; }</style><p>hi</p>");
        assert!(document.head().is_some());
        assert_eq!(document.style_sheets().len(), 1);
    }
}
