//! Named access to a document's style sheets and the rules inside them.
//!
//! A [`StyleRepository`] is bound to one [`Document`] and addresses sheets by a
//! logical name (a marker attribute on the `<style>` node) and rules by a
//! selector suffix. Reads resolve; writes resolve-or-create, mutate the live
//! rule, then write the sheet's serialized text back into its node.
//!
//! Lookups come in two flavours, see [`Lookup`]: a strict miss dispatches an
//! [`UnknownStylesheet`](crate::events::StyleEvent::UnknownStylesheet) or
//! [`UnknownCssRule`](crate::events::StyleEvent::UnknownCssRule) event on the
//! document before returning `None`; a silent miss just returns `None`.
//!
//! Listeners run synchronously inside the lookup that raised the event and
//! must not call back into the repository from there; the sheet being
//! resolved may be mid-iteration.

pub mod notify;
pub mod options;
pub mod placement;
pub mod resolver;

pub use notify::NotificationGateway;
pub use options::RepositoryOptions;
pub use resolver::{Lookup, SelectorQuery};

use crate::dom::dom_tree::{self, Document};
use crate::error::{Error, Result};
use crate::style::cssom::{CssRule, RuleRef, SheetRef};
use crate::style::{engine, serializer};
use log::{debug, trace};

pub struct StyleRepository<'d> {
    document: &'d Document,
    options: RepositoryOptions,
    notifier: NotificationGateway<'d>,
}

impl<'d> StyleRepository<'d> {
    pub fn new(document: &'d Document) -> Self {
        Self::with_options(document, RepositoryOptions::default())
    }

    pub fn with_options(document: &'d Document, options: RepositoryOptions) -> Self {
        let notifier = NotificationGateway::new(document, options.emitter.clone());
        StyleRepository {
            document,
            options,
            notifier,
        }
    }

    pub fn document(&self) -> &'d Document {
        self.document
    }

    pub fn options(&self) -> &RepositoryOptions {
        &self.options
    }

    pub fn get_stylesheet(&self, name: &str, lookup: Lookup) -> Option<SheetRef> {
        trace!("resolving stylesheet `{}`", name);
        let sheet = resolver::find_stylesheet(self.document, &self.options.marker_attribute, name);
        if sheet.is_none() && lookup.is_strict() {
            self.notifier.notify_unknown_stylesheet(name);
        }
        sheet
    }

    /// Returns the sheet named `name`, creating its `<style>` node first if needed.
    pub fn get_or_create_stylesheet(&self, name: &str) -> Result<SheetRef> {
        if let Some(sheet) = self.get_stylesheet(name, Lookup::Silent) {
            return Ok(sheet);
        }
        placement::create_stylesheet_node(self.document, &self.options.marker_attribute, name);
        self.get_stylesheet(name, Lookup::Strict)
            .ok_or_else(|| Error::StylesheetNotMaterialized {
                name: name.to_string(),
            })
    }

    /// First rule in sheet `name` whose selector ends with `selector`.
    pub fn get_rule(&self, name: &str, selector: &str, lookup: Lookup) -> Option<RuleRef> {
        let sheet = self.get_stylesheet(name, lookup)?;
        trace!("resolving rule `{}` in stylesheet `{}`", selector, name);
        let rule = resolver::find_rule(&sheet.borrow(), &SelectorQuery::new(selector));
        if rule.is_none() && lookup.is_strict() {
            self.notifier.notify_unknown_rule(name, selector);
        }
        rule
    }

    /// Returns the matching rule, appending an empty `selector { }` rule to the
    /// sheet (created if needed) when there is none.
    ///
    /// Rules only come to life by parsing sheet text, so the new rule is added by
    /// rewriting the node's text and taking the last rule of the reparsed sheet.
    pub fn get_or_create_rule(&self, name: &str, selector: &str) -> Result<RuleRef> {
        if let Some(rule) = self.get_rule(name, selector, Lookup::Silent) {
            return Ok(rule);
        }
        let sheet = self.get_or_create_stylesheet(name)?;
        let mut text = serializer::serialize(&sheet.borrow());
        text.push_str(selector.trim());
        text.push_str(" { }");
        serializer::replace_text(&sheet, &text)?;

        let not_materialized = || Error::RuleNotMaterialized {
            stylesheet: name.to_string(),
            selector: selector.to_string(),
        };
        let sheet = self
            .get_stylesheet(name, Lookup::Strict)
            .ok_or_else(|| Error::StylesheetNotMaterialized {
                name: name.to_string(),
            })?;
        let rule = sheet
            .borrow()
            .rules()
            .last()
            .and_then(CssRule::as_style)
            .cloned()
            .ok_or_else(not_materialized)?;
        if !SelectorQuery::new(selector).matches(rule.borrow().selector_text()) {
            return Err(not_materialized());
        }
        debug!("created rule `{}` in stylesheet `{}`", selector, name);
        Ok(rule)
    }

    /// Replaces every declaration of the rule with those in `text`, which may be
    /// given with or without its surrounding braces (`{color: red}` or `color: red`).
    pub fn create_or_update_rule(&self, name: &str, selector: &str, text: &str) -> Result<()> {
        let declarations = engine::parse_declarations(declaration_body(text))?;
        let rule = self.get_or_create_rule(name, selector)?;
        rule.borrow_mut().replace_declarations(declarations);
        refresh_parent(&rule)
    }

    /// Sets one declaration, creating the sheet and rule as needed. An empty
    /// value removes the declaration; a trailing `!important` is honoured.
    pub fn set_property(
        &self,
        name: &str,
        selector: &str,
        property: &str,
        value: &str,
    ) -> Result<()> {
        let rule = self.get_or_create_rule(name, selector)?;
        rule.borrow_mut().set_property(property, value)?;
        refresh_parent(&rule)
    }

    pub fn get_property(
        &self,
        name: &str,
        selector: &str,
        property: &str,
        lookup: Lookup,
    ) -> Option<String> {
        let rule = self.get_rule(name, selector, lookup)?;
        let value = rule.borrow().get_property(property).map(str::to_string);
        value
    }

    /// Removes a declaration from an existing rule. Missing sheets and rules are
    /// left alone and yield `Ok(None)`.
    pub fn remove_property(
        &self,
        name: &str,
        selector: &str,
        property: &str,
    ) -> Result<Option<String>> {
        let Some(rule) = self.get_rule(name, selector, Lookup::Silent) else {
            return Ok(None);
        };
        let removed = rule.borrow_mut().remove_property(property);
        if removed.is_some() {
            refresh_parent(&rule)?;
        }
        Ok(removed)
    }

    /// [`set_property`](Self::set_property) for a custom property; `--` is added when missing.
    pub fn set_variable(
        &self,
        name: &str,
        selector: &str,
        variable: &str,
        value: &str,
    ) -> Result<()> {
        self.set_property(name, selector, &custom_property_name(variable), value)
    }

    pub fn get_variable(
        &self,
        name: &str,
        selector: &str,
        variable: &str,
        lookup: Lookup,
    ) -> Option<String> {
        self.get_property(name, selector, &custom_property_name(variable), lookup)
    }

    /// Current text of the sheet's backing node.
    pub fn stylesheet_text(&self, name: &str) -> Option<String> {
        let sheet = self.get_stylesheet(name, Lookup::Silent)?;
        let owner = sheet.borrow().owner_node()?;
        Some(dom_tree::text_content(&owner))
    }

    /// Re-serializes sheet `name` into its node. Unknown names are a strict miss.
    pub fn refresh(&self, name: &str) -> Result<()> {
        match self.get_stylesheet(name, Lookup::Strict) {
            Some(sheet) => serializer::refresh(&sheet),
            None => Ok(()),
        }
    }
}

fn refresh_parent(rule: &RuleRef) -> Result<()> {
    let sheet = rule
        .borrow()
        .parent_style_sheet()
        .ok_or(Error::DetachedStylesheet)?;
    serializer::refresh(&sheet)
}

fn declaration_body(text: &str) -> &str {
    let text = text.trim();
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start + 1..end],
        _ => text,
    }
}

fn custom_property_name(variable: &str) -> String {
    let variable = variable.trim();
    if variable.starts_with("--") {
        variable.to_string()
    } else {
        format!("--{}", variable)
    }
}
