use thiserror::Error;

/// A failed simulate request, by the stage that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulateError {
    #[error("failed to send topology to server: {0}")]
    Submit(String),
    #[error("failed to simulate routing: {0}")]
    Animate(String),
}

impl SimulateError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Submit(_) => "submit",
            Self::Animate(_) => "animate",
        }
    }
}
