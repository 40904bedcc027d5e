use glam::Vec2;

/// Errors from catalog lookup and chain management.
///
/// Everything here is a configuration problem: the content cannot produce a
/// valid next section. Callers should halt the stream rather than retry.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("section catalog is empty")]
    EmptyCatalog,
    #[error("template {template:?} is invalid: {reason}")]
    InvalidTemplate {
        template: String,
        reason: &'static str,
    },
    #[error("no section template matches tags {tags:?}")]
    NoMatchingTemplate { tags: Vec<String> },
    #[error("stream has no sections; call init first")]
    NotInitialized,
}

/// A stitch that could not produce a seamless continuation.
///
/// Recoverable: the streamer logs it and tries again on the next tick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StitchError {
    #[error("template {template:?} has a non-finite anchor or bounds")]
    NonFiniteTemplate { template: String },
    #[error("previous section exit anchor is not usable: {exit:?}")]
    MissingExit { exit: Vec2 },
}
