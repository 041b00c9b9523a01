use pretty_assertions::assert_eq;
use stylerepo_lib::dom::dom_tree;
use stylerepo_lib::parser::html::{create_dom_tree, serialize_document};
use stylerepo_lib::{Lookup, StyleRepository};

const PAGE: &str = r#"<!DOCTYPE html><html><head><title>Cards</title><style data-stylesheet="theme">.grid .card { color: red; }@media print { .card { display: none; } }</style></head><body><div class="grid"><p class="card">Hello</p></div></body></html>"#;

#[test]
fn existing_sheets_are_resolved_from_parsed_html() {
    let document = create_dom_tree(PAGE);
    let repository = StyleRepository::new(&document);

    assert_eq!(
        repository.get_property("theme", ".card", "color", Lookup::Strict),
        Some("red".to_string())
    );
}

#[test]
fn mutations_keep_at_rules_and_show_up_in_the_html() {
    let document = create_dom_tree(PAGE);
    let repository = StyleRepository::new(&document);

    repository
        .set_property("theme", ".card", "color", "green")
        .unwrap();

    let text = repository.stylesheet_text("theme").unwrap();
    assert!(text.starts_with(".grid .card { color: green; }@media print"));
    assert!(serialize_document(&document).contains(".grid .card { color: green; }"));
}

#[test]
fn new_sheets_land_at_the_end_of_head() {
    let document = create_dom_tree(PAGE);
    let repository = StyleRepository::new(&document);

    repository.set_property("layout", ".grid", "display", "grid").unwrap();

    let head = document.head().unwrap();
    let tags: Vec<String> = dom_tree::children(&head)
        .iter()
        .filter_map(dom_tree::tag_name)
        .collect();
    assert_eq!(tags, vec!["title", "style", "style"]);
    assert!(serialize_document(&document).contains(
        r#"<style data-stylesheet="layout">.grid { display: grid; }</style></head>"#
    ));
}
