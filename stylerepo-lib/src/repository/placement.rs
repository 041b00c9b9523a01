//! Where a new `<style>` node goes when no sheet with the requested name exists.
//!
//! Not every root has a `<head>` (fragments, shadow-like roots), so placement
//! degrades in this order:
//!
//! 1. append to the head container;
//! 2. otherwise, among the root's element children, find the first `<style>`
//!    and insert before the first non-style element that follows it;
//! 3. if that `<style>` has no such follower, append to the root;
//! 4. if the root has no `<style>` child at all, insert as the first child.
//!
//! Text children are ignored when looking for the non-style follower.

use crate::dom::dom_tree::{self, Document, NodeRef};
use log::debug;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Placement {
    AppendToHead(NodeRef),
    BeforeRootChild(usize),
    AppendToRoot,
    FirstRootChild,
}

pub fn choose_placement(document: &Document) -> Placement {
    if let Some(head) = document.head() {
        return Placement::AppendToHead(head);
    }

    let children = dom_tree::children(&document.root);
    let Some(first_style) = children.iter().position(dom_tree::is_style_element) else {
        return Placement::FirstRootChild;
    };
    children
        .iter()
        .enumerate()
        .skip(first_style + 1)
        .find(|(_, child)| {
            dom_tree::tag_name(child).is_some() && !dom_tree::is_style_element(child)
        })
        .map_or(Placement::AppendToRoot, |(index, _)| {
            Placement::BeforeRootChild(index)
        })
}

/// Creates a `<style marker="name">` node and inserts it per [`choose_placement`].
pub fn create_stylesheet_node(document: &Document, marker: &str, name: &str) -> NodeRef {
    let node = dom_tree::create_element("style");
    dom_tree::set_attribute(&node, marker, name);

    let placement = choose_placement(document);
    debug!("creating stylesheet `{}` ({:?})", name, placement);
    match placement {
        Placement::AppendToHead(head) => dom_tree::append_child(&head, Rc::clone(&node)),
        Placement::BeforeRootChild(index) => {
            dom_tree::insert_child(&document.root, index, Rc::clone(&node))
        }
        Placement::AppendToRoot => dom_tree::append_child(&document.root, Rc::clone(&node)),
        Placement::FirstRootChild => dom_tree::insert_child(&document.root, 0, Rc::clone(&node)),
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::dom_tree::{append_child, create_element, create_text, new_document};

    fn root_tags(document: &Document) -> Vec<String> {
        dom_tree::children(&document.root)
            .iter()
            .map(|child| dom_tree::tag_name(child).unwrap_or_else(|| "#text".to_string()))
            .collect()
    }

    #[test]
    fn appends_to_head_when_present() {
        let document = new_document();
        let html = create_element("html");
        let head = create_element("head");
        append_child(&head, create_element("title"));
        append_child(&html, Rc::clone(&head));
        append_child(&document.root, html);

        let node = create_stylesheet_node(&document, "data-stylesheet", "theme");
        let head_children = dom_tree::children(&head);
        assert_eq!(head_children.len(), 2);
        assert!(Rc::ptr_eq(&head_children[1], &node));
        assert_eq!(
            dom_tree::get_attribute(&node, "data-stylesheet").as_deref(),
            Some("theme")
        );
    }

    #[test]
    fn first_child_without_any_style() {
        let document = new_document();
        append_child(&document.root, create_element("div"));

        create_stylesheet_node(&document, "data-stylesheet", "theme");
        assert_eq!(root_tags(&document), vec!["style", "div"]);
    }

    #[test]
    fn before_the_first_non_style_follower() {
        let document = new_document();
        append_child(&document.root, create_element("div"));
        append_child(&document.root, create_element("style"));
        append_child(&document.root, create_text("\n"));
        append_child(&document.root, create_element("style"));
        append_child(&document.root, create_element("section"));

        create_stylesheet_node(&document, "data-stylesheet", "theme");
        assert_eq!(
            root_tags(&document),
            vec!["div", "style", "#text", "style", "style", "section"]
        );
    }

    #[test]
    fn appended_after_a_trailing_style() {
        let document = new_document();
        append_child(&document.root, create_element("div"));
        append_child(&document.root, create_element("style"));

        let node = create_stylesheet_node(&document, "data-stylesheet", "theme");
        let children = dom_tree::children(&document.root);
        assert_eq!(children.len(), 3);
        assert!(Rc::ptr_eq(&children[2], &node));
    }
}
