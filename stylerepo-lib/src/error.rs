use thiserror::Error;

/// Host-level failures on creation and mutation paths.
///
/// Lookups never produce these; a missing sheet or rule is reported as `None`
/// (plus a miss event for strict lookups).
#[derive(Debug, Error)]
pub enum Error {
    #[error("stylesheet `{name}` was created but cannot be resolved")]
    StylesheetNotMaterialized { name: String },

    #[error("style engine produced no rule for `{selector}` in stylesheet `{stylesheet}`")]
    RuleNotMaterialized { stylesheet: String, selector: String },

    #[error("stylesheet is no longer attached to a document node")]
    DetachedStylesheet,

    #[error("cannot parse declarations `{input}`: {message}")]
    Declarations { input: String, message: String },

    #[error("style engine error: {message}")]
    Stylesheet { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
