pub mod client;
pub mod currency;
pub mod error;
pub mod params;
pub mod types;

pub use client::{ApiClient, ClientBuilder};
pub use currency::Money;
pub use error::{ComputerenderError, Result, SafetyError};
pub use params::{GenerationParams, Param};
