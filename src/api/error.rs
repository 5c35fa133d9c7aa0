use thiserror::Error;

/// The prompt was rejected by one of the service's safety filters.
#[derive(Error, Debug)]
pub enum SafetyError {
    /// Rejected before generation: the prompt contains filtered terms.
    #[error("prompt {prompt:?} contains potentially unsafe words")]
    TermFilter { prompt: String },

    /// Rejected after generation: the service returned a blank image.
    #[error("generated image for prompt {prompt:?} was blanked by the content filter")]
    ContentFilter { prompt: String },
}

impl SafetyError {
    pub fn prompt(&self) -> &str {
        match self {
            Self::TermFilter { prompt } | Self::ContentFilter { prompt } => prompt,
        }
    }
}

#[derive(Error, Debug)]
pub enum ComputerenderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid parameters: {0}")]
    Validation(String),

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error("API error for prompt {prompt:?} (status {status}): {message}")]
    Api {
        prompt: String,
        status: u16,
        message: String,
    },

    #[error("Cannot parse cost {value:?}: {reason}")]
    Currency { value: String, reason: String },

    #[error("HTTP request for prompt {prompt:?} failed: {source}")]
    Request {
        prompt: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed response for prompt {prompt:?}: {source}")]
    Decode {
        prompt: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot build request URL for prompt {prompt:?}: {source}")]
    Url {
        prompt: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl ComputerenderError {
    pub fn is_safety(&self) -> bool {
        matches!(self, Self::Safety(_))
    }
}

pub type Result<T> = std::result::Result<T, ComputerenderError>;
