use crate::dom::dom_tree;
use crate::error::{Error, Result};
use crate::style::cssom::{CssRule, SheetRef, StyleSheet};
use log::debug;

/// Concatenates the text of every rule in order, adding no separators.
pub fn serialize(sheet: &StyleSheet) -> String {
    sheet.rules().iter().map(CssRule::css_text).collect()
}

/// Writes `serialize(sheet)` back into the sheet's owner node.
///
/// The owner is reparsed, so handles into `sheet` are detached afterwards;
/// resolve again to read the refreshed rules.
pub fn refresh(sheet: &SheetRef) -> Result<()> {
    let text = serialize(&sheet.borrow());
    replace_text(sheet, &text)
}

/// Replaces the owner node's content with `text`.
pub fn replace_text(sheet: &SheetRef, text: &str) -> Result<()> {
    let owner = sheet
        .borrow()
        .owner_node()
        .ok_or(Error::DetachedStylesheet)?;
    debug!("rewriting style node content ({} bytes)", text.len());
    dom_tree::set_text_content(&owner, text);
    Ok(())
}
