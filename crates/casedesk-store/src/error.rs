use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("case {case_id} enables action {action} which the catalog does not declare")]
    UndeclaredAction { case_id: String, action: String },

    #[error(
        "case {case_id} action {action}: scripted key has {found} values, catalog expects {expected}"
    )]
    ArityMismatch {
        case_id: String,
        action: String,
        expected: usize,
        found: usize,
    },
}
