use std::fmt::Display;

#[derive(Debug)]
pub struct NiceError {
    content: String,
}

impl Display for NiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl std::error::Error for NiceError {}

/// Human readable rendering for the error enums in this crate. Nested errors
/// are rendered on their own line beneath the outer message.
pub trait NiceDisplay {
    fn message(&self) -> String;
    fn to_nice_error(&self) -> NiceError {
        NiceError {
            content: self.message(),
        }
    }
}
