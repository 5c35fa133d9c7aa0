use std::fmt;
use std::ops::AsyncFnOnce;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use url::Url;

use super::currency::Money;
use super::error::{ComputerenderError, Result, SafetyError};
use super::params::GenerationParams;
use super::types::{CostResponse, ErrorBody, TERM_FILTER_MESSAGE};
use crate::config::Settings;
use crate::detector::{self, BlankImageDetector};

const USER_AGENT: &str = concat!("computerender-rs/", env!("CARGO_PKG_VERSION"));

/// Longest body excerpt kept in errors for unexpected statuses.
const MAX_BODY_EXCERPT: usize = 200;

pub struct ClientBuilder {
    settings: Settings,
    detector: Option<Arc<dyn BlankImageDetector>>,
}

impl ClientBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            detector: None,
        }
    }

    /// Replaces the check used to recognise content-filtered (blank) images.
    #[must_use]
    pub fn detector(mut self, detector: impl BlankImageDetector + 'static) -> Self {
        self.detector = Some(Arc::new(detector));
        self
    }

    /// Opens the session. No request is sent.
    pub fn build(self) -> Result<ApiClient> {
        let mut auth = HeaderValue::from_str(&self.settings.authorization()).map_err(|_| {
            ComputerenderError::Config("API key contains invalid header characters".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        let base_url = self.settings.base_url()?;
        tracing::debug!(base_url = %base_url, "opened session");

        Ok(ApiClient {
            http,
            base_url,
            detector: self.detector.unwrap_or_else(detector::default_detector),
        })
    }

    /// Opens a client, runs `f` with it, and closes it whether or not `f` succeeded.
    pub async fn scoped<F, T>(self, f: F) -> Result<T>
    where
        F: AsyncFnOnce(&ApiClient) -> Result<T>,
    {
        let client = self.build()?;
        let result = f(&client).await;
        client.close();
        result
    }
}

/// Client for the computerender API.
///
/// One client holds one session (connection pool and auth header). It can
/// be shared between tasks; each call is an independent request.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    detector: Arc<dyn BlankImageDetector>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(settings: Settings) -> Result<Self> {
        ClientBuilder::new(settings).build()
    }

    /// Uses `api_key` if given, otherwise `COMPUTERENDER_KEY`.
    pub fn from_env(api_key: Option<String>) -> Result<Self> {
        Self::new(Settings::from_env(api_key)?)
    }

    pub fn builder(settings: Settings) -> ClientBuilder {
        ClientBuilder::new(settings)
    }

    pub async fn scoped<F, T>(settings: Settings, f: F) -> Result<T>
    where
        F: AsyncFnOnce(&ApiClient) -> Result<T>,
    {
        ClientBuilder::new(settings).scoped(f).await
    }

    /// Builds `{base}{prefix}/{prompt}?{params}`.
    ///
    /// The prompt is form-encoded, so spaces become `+`. A prompt of `.` or
    /// `..` is rejected: URL parsing resolves those segments (escaped or not),
    /// which would send the request to a different endpoint.
    pub fn request_url(&self, prefix: &str, prompt: &str, params: &GenerationParams) -> Result<Url> {
        let encoded: String = url::form_urlencoded::byte_serialize(prompt.as_bytes()).collect();
        if encoded == "." || encoded == ".." {
            return Err(ComputerenderError::Validation(format!(
                "prompt {prompt:?} cannot be used as a URL path segment"
            )));
        }

        let mut url = self
            .base_url
            .join(&format!("{prefix}/{encoded}"))
            .map_err(|source| ComputerenderError::Url {
                prompt: prompt.to_string(),
                source,
            })?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.query_pairs());
        }
        Ok(url)
    }

    /// Generates an image and returns the encoded bytes.
    ///
    /// A blank image is reported as [`SafetyError::ContentFilter`] instead of
    /// being returned.
    pub async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Vec<u8>> {
        let response = self.get("generate", prompt, params).await?;
        if response.status() != StatusCode::OK {
            return Err(classify_error(prompt, response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| request_error(prompt, source))?;

        if self.detector.is_blank(&bytes) {
            tracing::warn!(prompt, "generated image is blank, treating as filtered");
            return Err(SafetyError::ContentFilter {
                prompt: prompt.to_string(),
            }
            .into());
        }

        Ok(bytes.to_vec())
    }

    /// Asks what generating `prompt` with `params` would cost.
    pub async fn cost(&self, prompt: &str, params: &GenerationParams) -> Result<Money> {
        let response = self.get("cost", prompt, params).await?;
        if response.status() != StatusCode::OK {
            return Err(classify_error(prompt, response).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| request_error(prompt, source))?;
        let parsed: CostResponse =
            serde_json::from_slice(&body).map_err(|source| ComputerenderError::Decode {
                prompt: prompt.to_string(),
                source,
            })?;

        parsed.cost.parse()
    }

    /// Closes the session.
    pub fn close(self) {
        tracing::debug!(base_url = %self.base_url, "closing session");
    }

    async fn get(&self, prefix: &str, prompt: &str, params: &GenerationParams) -> Result<Response> {
        let url = self.request_url(prefix, prompt, params)?;
        tracing::debug!(endpoint = prefix, prompt, "sending request");

        self.http
            .get(url)
            .send()
            .await
            .map_err(|source| request_error(prompt, source))
    }
}

fn request_error(prompt: &str, source: reqwest::Error) -> ComputerenderError {
    ComputerenderError::Request {
        prompt: prompt.to_string(),
        source,
    }
}

/// Maps a non-200 response onto the error taxonomy.
async fn classify_error(prompt: &str, response: Response) -> ComputerenderError {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(source) => return request_error(prompt, source),
    };

    let api_error = |message: String| ComputerenderError::Api {
        prompt: prompt.to_string(),
        status: status.as_u16(),
        message,
    };

    let err: ComputerenderError = if status == StatusCode::BAD_REQUEST {
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(e) if e.status == "error" && e.message == TERM_FILTER_MESSAGE => {
                SafetyError::TermFilter {
                    prompt: prompt.to_string(),
                }
                .into()
            }
            Ok(e) if e.status == "error" => api_error(e.message),
            _ => api_error(format!("unrecognized error response: {body}")),
        }
    } else {
        api_error(format!("unexpected status code: {}", excerpt(&body)))
    };

    tracing::warn!(prompt, status = status.as_u16(), error = %err, "request failed");
    err
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(Settings::new("test-key")).unwrap()
    }

    #[test]
    fn prompt_is_form_encoded_into_the_path() {
        let url = client()
            .request_url("generate", "a cat & a dog", &GenerationParams::new())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.computerender.com/generate/a+cat+%26+a+dog"
        );
    }

    #[test]
    fn path_unsafe_characters_are_escaped() {
        let url = client()
            .request_url("cost", "50/50? #1", &GenerationParams::new())
            .unwrap();
        assert_eq!(url.path(), "/cost/50%2F50%3F+%231");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn dot_segment_prompts_are_rejected() {
        for prompt in [".", ".."] {
            for prefix in ["generate", "cost"] {
                let err = client()
                    .request_url(prefix, prompt, &GenerationParams::new())
                    .unwrap_err();
                assert!(matches!(err, ComputerenderError::Validation(_)), "{prompt:?}");
            }
        }
    }

    #[test]
    fn prompts_with_dots_stay_under_the_prefix() {
        let params = GenerationParams::new();
        let url = client().request_url("generate", "...", &params).unwrap();
        assert_eq!(url.path(), "/generate/...");

        let url = client().request_url("generate", "../admin", &params).unwrap();
        assert_eq!(url.path(), "/generate/..%2Fadmin");

        let url = client().request_url("cost", "v1.5 art", &params).unwrap();
        assert_eq!(url.path(), "/cost/v1.5+art");
    }

    #[test]
    fn params_become_the_query_string() {
        let params = GenerationParams::new().height(256).width(512).seed(7);
        let url = client().request_url("generate", "fox", &params).unwrap();
        assert_eq!(url.query(), Some("width=512&height=256&seed=7"));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(MAX_BODY_EXCERPT + 50);
        let short = excerpt(&body);
        assert_eq!(short.len(), MAX_BODY_EXCERPT + 3);
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn debug_does_not_leak_the_key() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("api.computerender.com"));
        assert!(!debug.contains("test-key"));
    }
}
