use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::api::error::{ComputerenderError, Result};

pub const BASE_URL: &str = "https://api.computerender.com/";
pub const API_KEY_ENV: &str = "COMPUTERENDER_KEY";

/// Connection settings for one API session.
///
/// The key is resolved once, when the settings are built. Nothing in the
/// client reads the environment afterwards.
#[derive(Debug)]
pub struct Settings {
    api_key: SecretString,
    base_url: Option<Url>,
}

impl Settings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            base_url: None,
        }
    }

    /// Resolves the API key from `explicit` first, then from `lookup(COMPUTERENDER_KEY)`.
    ///
    /// Empty strings count as absent.
    pub fn resolve<F>(explicit: Option<String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        explicit
            .filter(|k| !k.is_empty())
            .or_else(|| lookup(API_KEY_ENV).filter(|k| !k.is_empty()))
            .map(Self::new)
            .ok_or_else(|| {
                ComputerenderError::Config(format!(
                    "no API key given and {API_KEY_ENV} is not set"
                ))
            })
    }

    pub fn from_env(explicit: Option<String>) -> Result<Self> {
        Self::resolve(explicit, |name| std::env::var(name).ok())
    }

    #[must_use]
    pub fn with_base_url(mut self, mut url: Url) -> Self {
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        self
    }

    /// The endpoint set with [`Settings::with_base_url`], or [`BASE_URL`].
    pub fn base_url(&self) -> Result<Url> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Url::parse(BASE_URL).map_err(|e| {
                ComputerenderError::Config(format!("invalid base URL {BASE_URL}: {e}"))
            }),
        }
    }

    pub(crate) fn authorization(&self) -> String {
        format!("X-API-Key {}", self.api_key.expose_secret())
    }
}
