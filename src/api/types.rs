use serde::Deserialize;

/// Message the service sends when its term filter rejects a prompt.
pub const TERM_FILTER_MESSAGE: &str = "potentially unsafe words in prompt";

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CostResponse {
    pub cost: String,
}
