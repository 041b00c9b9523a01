// src/style/cssom.rs: the live rule objects the style engine hands out.
use crate::dom::dom_tree::{Node, NodeRef};
use crate::error::Result;
use crate::style::engine;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub type SheetRef = Rc<RefCell<StyleSheet>>;
pub type RuleRef = Rc<RefCell<StyleRule>>;

/// Parsed rule list of one `<style>` node.
///
/// Mutating a rule does not touch the owner node's text; the two are only
/// brought back in sync by re-serializing the sheet into the node.
#[derive(Debug)]
pub struct StyleSheet {
    pub(crate) owner: Weak<RefCell<Node>>,
    pub(crate) rules: Vec<CssRule>,
}

/// Rule variants. Only [`CssRule::Style`] takes part in selector lookups.
#[derive(Debug, Clone)]
pub enum CssRule {
    /// A plain selector rule.
    Style(RuleRef),
    /// `@media`, `@supports`, `@keyframes`, ... kept as printed text.
    At(AtRule),
    /// Anything else, e.g. a style rule carrying nested rules.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    pub name: String,
    pub css_text: String,
}

#[derive(Debug)]
pub struct StyleRule {
    pub(crate) selector_text: String,
    pub(crate) declarations: Vec<Declaration>,
    pub(crate) parent: Weak<RefCell<StyleSheet>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl StyleSheet {
    pub(crate) fn new(owner: Weak<RefCell<Node>>) -> Self {
        StyleSheet {
            owner,
            rules: Vec::new(),
        }
    }

    pub fn owner_node(&self) -> Option<NodeRef> {
        self.owner.upgrade()
    }

    pub fn rules(&self) -> &[CssRule] {
        &self.rules
    }

    /// Plain selector rules in document order.
    pub fn style_rules(&self) -> impl Iterator<Item = &RuleRef> {
        self.rules.iter().filter_map(CssRule::as_style)
    }
}

impl CssRule {
    pub fn as_style(&self) -> Option<&RuleRef> {
        match self {
            CssRule::Style(rule) => Some(rule),
            CssRule::At(_) | CssRule::Other(_) => None,
        }
    }

    pub fn css_text(&self) -> String {
        match self {
            CssRule::Style(rule) => rule.borrow().css_text(),
            CssRule::At(at_rule) => at_rule.css_text.clone(),
            CssRule::Other(text) => text.clone(),
        }
    }
}

impl AtRule {
    /// Builds an at-rule from its printed form, taking the name from the `@keyword`.
    pub fn from_css_text(css_text: String) -> Self {
        let name = css_text
            .trim_start()
            .trim_start_matches('@')
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '-')
            .collect();
        AtRule { name, css_text }
    }
}

impl StyleRule {
    pub(crate) fn new(
        selector_text: String,
        declarations: Vec<Declaration>,
        parent: Weak<RefCell<StyleSheet>>,
    ) -> Self {
        StyleRule {
            selector_text,
            declarations,
            parent,
        }
    }

    pub fn selector_text(&self) -> &str {
        &self.selector_text
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn parent_style_sheet(&self) -> Option<SheetRef> {
        self.parent.upgrade()
    }

    /// Value of the last declaration for `property`.
    pub fn get_property(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|decl| same_property(&decl.property, property))
            .map(|decl| decl.value.as_str())
    }

    /// Sets or replaces `property`. A trailing `!important` in `value` marks the
    /// declaration important; an empty value removes the declaration.
    ///
    /// The value goes through the style engine first and is stored as the
    /// engine prints it. Anything that does not parse as exactly one
    /// declaration of `property` is rejected and leaves the rule untouched.
    pub fn set_property(&mut self, property: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            self.remove_property(property);
            return Ok(());
        }
        let parsed = engine::parse_declaration(property, value)?;
        match self
            .declarations
            .iter_mut()
            .rev()
            .find(|decl| same_property(&decl.property, &parsed.property))
        {
            Some(decl) => *decl = parsed,
            None => self.declarations.push(parsed),
        }
        Ok(())
    }

    /// Removes every declaration of `property`, returning the last value.
    pub fn remove_property(&mut self, property: &str) -> Option<String> {
        let removed = self.get_property(property).map(str::to_string);
        self.declarations
            .retain(|decl| !same_property(&decl.property, property));
        removed
    }

    pub fn replace_declarations(&mut self, declarations: Vec<Declaration>) {
        self.declarations = declarations;
    }

    pub fn css_text(&self) -> String {
        if self.declarations.is_empty() {
            return format!("{} {{ }}", self.selector_text);
        }
        let body: Vec<String> = self.declarations.iter().map(Declaration::css_text).collect();
        format!("{} {{ {} }}", self.selector_text, body.join(" "))
    }
}

impl Declaration {
    pub fn css_text(&self) -> String {
        if self.important {
            format!("{}: {} !important;", self.property, self.value)
        } else {
            format!("{}: {};", self.property, self.value)
        }
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css_text())
    }
}

/// Custom properties (`--*`) are case-sensitive; everything else is ASCII case-insensitive.
pub(crate) fn same_property(a: &str, b: &str) -> bool {
    if a.starts_with("--") || b.starts_with("--") {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}
