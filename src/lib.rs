pub mod api;
pub mod blocking;
pub mod config;
pub mod detector;

pub use api::{
    ApiClient, ClientBuilder, ComputerenderError, GenerationParams, Money, Param, Result,
    SafetyError,
};
pub use config::{API_KEY_ENV, BASE_URL, Settings};
#[cfg(feature = "image")]
pub use detector::UniformColorDetector;
pub use detector::{BlankImageDetector, NeverBlank};
