use crate::dom::dom_tree::Document;
use crate::events::{EmitterIdentity, StyleEvent};
use log::debug;

/// Builds miss events and dispatches them on the bound document.
///
/// Fire-and-forget: nothing is returned and handlers are not inspected.
#[derive(Debug)]
pub struct NotificationGateway<'d> {
    document: &'d Document,
    emitter: EmitterIdentity,
}

impl<'d> NotificationGateway<'d> {
    pub fn new(document: &'d Document, emitter: EmitterIdentity) -> Self {
        NotificationGateway { document, emitter }
    }

    pub fn emitter(&self) -> &EmitterIdentity {
        &self.emitter
    }

    pub fn notify_unknown_stylesheet(&self, name: &str) {
        debug!("unknown stylesheet `{}`", name);
        self.document.dispatch_event(&StyleEvent::UnknownStylesheet {
            stylesheet_name: name.to_string(),
            emitter: self.emitter.clone(),
        });
    }

    pub fn notify_unknown_rule(&self, name: &str, selector: &str) {
        debug!("unknown rule `{}` in stylesheet `{}`", selector, name);
        self.document.dispatch_event(&StyleEvent::UnknownCssRule {
            stylesheet_name: name.to_string(),
            selector: selector.to_string(),
            emitter: self.emitter.clone(),
        });
    }
}
