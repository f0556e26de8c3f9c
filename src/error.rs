use thiserror::Error;

/// Message stored when a generation failure carries no usable description.
pub const UNKNOWN_FAILURE_MESSAGE: &str = "An unknown error occurred while generating the image.";

/// Message stored when a submission is rejected for a blank prompt.
pub const EMPTY_PROMPT_MESSAGE: &str = "Prompt cannot be empty.";

/// Errors returned by studio operations.
#[derive(Error, Debug)]
pub enum StudioError {
    /// The submission was rejected before any call was made.
    #[error("{0}")]
    Validation(String),

    /// The image API returned a non-success HTTP status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// The API answered but produced no image.
    #[error("No image data received from the API.")]
    NoImage,

    /// The API withheld the image for policy reasons.
    #[error("Image was filtered: {0}")]
    Filtered(String),

    /// The response from the API was missing expected fields.
    #[error("{0}")]
    InvalidResponse(String),

    /// The generator failed without describing why.
    #[error("")]
    Unknown,

    /// Invalid or incomplete configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Image locator could not be decoded into bytes.
    #[error("Cannot decode image: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StudioError {
    /// Whether this error was raised by the external generation capability
    /// (as opposed to local validation or setup).
    pub fn is_generation_failure(&self) -> bool {
        !matches!(self, StudioError::Validation(_) | StudioError::Config(_))
    }

    /// User-facing message carried by this failure, if it has one.
    pub fn failure_message(&self) -> Option<String> {
        if matches!(self, StudioError::Unknown) {
            return None;
        }
        let message = self.to_string();
        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, StudioError>;
