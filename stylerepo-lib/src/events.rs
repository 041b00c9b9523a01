//! Miss notifications raised by strict lookups.
//!
//! A miss is a signal, not an error: the lookup that raised it still returns
//! `None` to its caller. Events are dispatched on the [`Document`] the
//! repository is bound to and serialize to the payload consumers expect:
//!
//! ```json
//! { "event": "UnknownCssRule", "stylesheetName": "theme", "selector": ".card",
//!   "emitter": { "type": "StyleRepository" } }
//! ```
//!
//! [`Document`]: crate::dom::dom_tree::Document

use serde::Serialize;

/// Identifies the repository instance that raised an event. Carried for provenance only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmitterIdentity {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl EmitterIdentity {
    pub fn new(kind: impl Into<String>) -> Self {
        EmitterIdentity {
            kind: kind.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleEventKind {
    UnknownStylesheet,
    UnknownCssRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum StyleEvent {
    #[serde(rename_all = "camelCase")]
    UnknownStylesheet {
        stylesheet_name: String,
        emitter: EmitterIdentity,
    },
    #[serde(rename_all = "camelCase")]
    UnknownCssRule {
        stylesheet_name: String,
        selector: String,
        emitter: EmitterIdentity,
    },
}

impl StyleEvent {
    pub fn kind(&self) -> StyleEventKind {
        match self {
            StyleEvent::UnknownStylesheet { .. } => StyleEventKind::UnknownStylesheet,
            StyleEvent::UnknownCssRule { .. } => StyleEventKind::UnknownCssRule,
        }
    }

    pub fn stylesheet_name(&self) -> &str {
        match self {
            StyleEvent::UnknownStylesheet {
                stylesheet_name, ..
            }
            | StyleEvent::UnknownCssRule {
                stylesheet_name, ..
            } => stylesheet_name,
        }
    }

    /// The missing selector; only rule misses carry one.
    pub fn selector(&self) -> Option<&str> {
        match self {
            StyleEvent::UnknownCssRule { selector, .. } => Some(selector),
            StyleEvent::UnknownStylesheet { .. } => None,
        }
    }

    pub fn emitter(&self) -> &EmitterIdentity {
        match self {
            StyleEvent::UnknownStylesheet { emitter, .. }
            | StyleEvent::UnknownCssRule { emitter, .. } => emitter,
        }
    }
}

/// Handle returned by [`Document::add_listener`](crate::dom::dom_tree::Document::add_listener).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rule_miss_serializes_to_payload_shape() {
        let event = StyleEvent::UnknownCssRule {
            stylesheet_name: "theme".into(),
            selector: ".nonexistent".into(),
            emitter: EmitterIdentity::new("StyleRepository").with_id("main"),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "UnknownCssRule",
                "stylesheetName": "theme",
                "selector": ".nonexistent",
                "emitter": { "type": "StyleRepository", "id": "main" }
            })
        );
    }

    #[test]
    fn emitter_without_id_omits_the_field() {
        let event = StyleEvent::UnknownStylesheet {
            stylesheet_name: "theme".into(),
            emitter: EmitterIdentity::new("StyleRepository"),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "UnknownStylesheet",
                "stylesheetName": "theme",
                "emitter": { "type": "StyleRepository" }
            })
        );
        assert_eq!(event.selector(), None);
    }
}
