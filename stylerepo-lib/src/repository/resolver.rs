//! Read-only resolution of names to sheets and selector fragments to rules.

use crate::dom::dom_tree::{self, Document};
use crate::style::cssom::{RuleRef, SheetRef, StyleSheet};
use crate::style::engine;

/// Whether a lookup that misses raises a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Dispatch a miss event before returning `None`.
    Strict,
    /// Return `None` quietly.
    Silent,
}

impl Lookup {
    pub fn is_strict(self) -> bool {
        self == Lookup::Strict
    }
}

impl From<bool> for Lookup {
    fn from(strict: bool) -> Self {
        if strict {
            Lookup::Strict
        } else {
            Lookup::Silent
        }
    }
}

/// A requested selector fragment, kept both verbatim and as the engine prints it.
#[derive(Debug, Clone)]
pub struct SelectorQuery {
    raw: String,
    canonical: String,
}

impl SelectorQuery {
    pub fn new(selector: &str) -> Self {
        SelectorQuery {
            raw: selector.trim().to_string(),
            canonical: engine::canonical_selector(selector),
        }
    }

    /// Suffix match against a rule's full selector text.
    pub fn matches(&self, selector_text: &str) -> bool {
        selector_text.ends_with(&self.canonical) || selector_text.ends_with(&self.raw)
    }
}

/// First sheet in tree order whose owner carries `marker="name"`.
pub fn find_stylesheet(document: &Document, marker: &str, name: &str) -> Option<SheetRef> {
    document.style_sheets().into_iter().find(|sheet| {
        sheet
            .borrow()
            .owner_node()
            .and_then(|owner| dom_tree::get_attribute(&owner, marker))
            .is_some_and(|value| value == name)
    })
}

/// First plain selector rule, in rule-list order, whose selector ends with `query`.
pub fn find_rule(sheet: &StyleSheet, query: &SelectorQuery) -> Option<RuleRef> {
    sheet
        .style_rules()
        .find(|rule| query.matches(rule.borrow().selector_text()))
        .cloned()
}
