use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// The OS random source could not deliver bytes. Never replaced by a weaker source.
    #[error("random source exhausted: {0}")]
    RandomSourceExhausted(String),

    #[error("tenant key needs at least {min} random bytes, got {requested}")]
    KeyTooShort { requested: usize, min: usize },
}
