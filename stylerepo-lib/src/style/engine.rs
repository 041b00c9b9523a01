//! The style engine: turns a style node's text into a live [`StyleSheet`].
//!
//! Parsing is delegated to LightningCSS with error recovery enabled, so an
//! invalid rule or declaration is dropped instead of failing the whole sheet.
//! Everything is copied out into owned cssom objects; nothing borrows the
//! source text once parsing returns.

use crate::dom::dom_tree::NodeRef;
use crate::error::{Error, Result};
use crate::style::cssom::{
    same_property, AtRule, CssRule, Declaration, SheetRef, StyleRule, StyleSheet,
};
use lightningcss::declaration::DeclarationBlock;
use lightningcss::printer::PrinterOptions;
use lightningcss::properties::{Property, PropertyId};
use lightningcss::rules::{style::StyleRule as LightningStyleRule, CssRule as LightningRule};
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use lightningcss::traits::ToCss;
use log::warn;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Parses `css_text` into a sheet owned by `owner`. Text the engine cannot
/// parse at all yields an empty sheet.
pub fn parse_stylesheet(owner: &NodeRef, css_text: &str) -> SheetRef {
    let sheet = Rc::new(RefCell::new(StyleSheet::new(Rc::downgrade(owner))));
    let rules = match parse_rules(css_text, &Rc::downgrade(&sheet)) {
        Ok(rules) => rules,
        Err(err) => {
            warn!("dropping unparsable style sheet text: {}", err);
            Vec::new()
        }
    };
    sheet.borrow_mut().rules = rules;
    sheet
}

fn parse_rules(css_text: &str, parent: &Weak<RefCell<StyleSheet>>) -> Result<Vec<CssRule>> {
    let parser_opts = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let sheet = LightningStyleSheet::parse(css_text, parser_opts).map_err(|e| Error::Stylesheet {
        message: e.to_string(),
    })?;

    let mut rules = Vec::with_capacity(sheet.rules.0.len());
    for rule in &sheet.rules.0 {
        match rule {
            LightningRule::Style(style_rule) if style_rule.rules.0.is_empty() => {
                let owned = convert_style_rule(style_rule, parent)?;
                rules.push(CssRule::Style(Rc::new(RefCell::new(owned))));
            }
            LightningRule::Ignored => {}
            other => {
                let text = other
                    .to_css_string(PrinterOptions::default())
                    .map_err(printer_error)?;
                if text.trim_start().starts_with('@') {
                    rules.push(CssRule::At(AtRule::from_css_text(text)));
                } else {
                    rules.push(CssRule::Other(text));
                }
            }
        }
    }
    Ok(rules)
}

/// Copies a single LightningCSS style rule's selector + declarations into a live rule.
fn convert_style_rule(
    style_rule: &LightningStyleRule<'_>,
    parent: &Weak<RefCell<StyleSheet>>,
) -> Result<StyleRule> {
    let selector_text = style_rule
        .selectors
        .to_css_string(PrinterOptions::default())
        .map_err(printer_error)?;
    let declarations = convert_block(&style_rule.declarations)?;
    Ok(StyleRule::new(selector_text, declarations, Weak::clone(parent)))
}

fn convert_block(block: &DeclarationBlock<'_>) -> Result<Vec<Declaration>> {
    let mut decls_vec = Vec::new();

    // Normal declarations
    for property in &block.declarations {
        decls_vec.push(convert_declaration(property, false)?);
    }

    // !important declarations
    for property in &block.important_declarations {
        decls_vec.push(convert_declaration(property, true)?);
    }

    Ok(decls_vec)
}

fn convert_declaration(property: &Property<'_>, important: bool) -> Result<Declaration> {
    Ok(Declaration {
        property: property_name(&property.property_id())?,
        value: property
            .value_to_css_string(PrinterOptions::default())
            .map_err(printer_error)?,
        important,
    })
}

/// Full property name including any vendor prefix, e.g. `-webkit-transition`.
/// `PropertyId::name` alone drops the prefix.
fn property_name(id: &PropertyId<'_>) -> Result<String> {
    match id {
        PropertyId::Custom(_) => Ok(id.name().to_string()),
        _ => id
            .to_css_string(PrinterOptions::default())
            .map_err(printer_error),
    }
}

/// Parses a declaration block body such as `color: red; --gap: 4px`.
///
/// The body is parsed the way it will later be written, inside a rule, and
/// must come back as that one rule: text that closes the block or opens
/// nested rules is rejected.
pub fn parse_declarations(text: &str) -> Result<Vec<Declaration>> {
    let wrapped = format!("x {{ {} }}", text);
    let parser_opts = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let invalid = |message: String| Error::Declarations {
        input: text.to_string(),
        message,
    };
    let sheet =
        LightningStyleSheet::parse(&wrapped, parser_opts).map_err(|e| invalid(e.to_string()))?;
    match sheet.rules.0.as_slice() {
        [LightningRule::Style(style_rule)] if style_rule.rules.0.is_empty() => {
            convert_block(&style_rule.declarations)
        }
        _ => Err(invalid("text escapes its declaration block".to_string())),
    }
}

/// Parses `property: value` as one declaration, honouring a trailing
/// `!important`. Fails unless the text yields exactly one declaration of
/// `property`, so a value cannot smuggle in further declarations or rules.
pub fn parse_declaration(property: &str, value: &str) -> Result<Declaration> {
    let property = property.trim();
    let text = format!("{}: {}", property, value.trim());
    let mut declarations = parse_declarations(&text)?;
    match declarations.pop() {
        Some(declaration)
            if declarations.is_empty() && same_property(&declaration.property, property) =>
        {
            Ok(declaration)
        }
        _ => Err(Error::Declarations {
            input: text,
            message: format!("expected a single `{}` declaration", property),
        }),
    }
}

/// Prints `selector` the way the engine prints parsed selectors, so that a
/// requested fragment compares equal to rule selector text. Fragments the
/// engine rejects are returned trimmed but otherwise verbatim.
pub fn canonical_selector(selector: &str) -> String {
    let trimmed = selector.trim();
    let wrapped = format!("{} {{}}", trimmed);
    let Ok(sheet) = LightningStyleSheet::parse(&wrapped, ParserOptions::default()) else {
        return trimmed.to_string();
    };
    match sheet.rules.0.as_slice() {
        [LightningRule::Style(style_rule)] => style_rule
            .selectors
            .to_css_string(PrinterOptions::default())
            .unwrap_or_else(|_| trimmed.to_string()),
        _ => trimmed.to_string(),
    }
}

fn printer_error(err: lightningcss::error::PrinterError) -> Error {
    Error::Stylesheet {
        message: err.to_string(),
    }
}
