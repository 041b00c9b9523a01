use crate::events::EmitterIdentity;

pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-stylesheet";
pub const DEFAULT_EMITTER_TYPE: &str = "StyleRepository";

/// Per-repository configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOptions {
    /// Attribute on a `<style>` node that carries the sheet's logical name.
    /// Use `"title"` to address sheets by their title.
    pub marker_attribute: String,
    /// Identity stamped on every miss event this repository raises.
    pub emitter: EmitterIdentity,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        RepositoryOptions {
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
            emitter: EmitterIdentity::new(DEFAULT_EMITTER_TYPE),
        }
    }
}

impl RepositoryOptions {
    pub fn with_marker_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.marker_attribute = attribute.into();
        self
    }

    pub fn with_emitter(mut self, emitter: EmitterIdentity) -> Self {
        self.emitter = emitter;
        self
    }
}
