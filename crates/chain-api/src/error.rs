/// Failures surfaced by the out-of-scope collaborators this crate models
/// as traits (§1, §7 `Collaborator`).
#[derive(Debug, thiserror::Error)]
pub enum ChainApiError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("cursor is out of range")]
    CursorOutOfRange,
    #[error("not found")]
    NotFound,
}
