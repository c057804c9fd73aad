use thiserror::Error;

#[derive(Debug, Error)]
pub enum DialogueError {
    /// The dialogue service could not be reached or rejected the request.
    #[error("dialogue service request failed: {0}")]
    Service(String),

    /// The dialogue service answered, but its content was not the expected
    /// draft-message JSON.
    #[error("dialogue response could not be parsed: {0}")]
    Parse(String),
}
