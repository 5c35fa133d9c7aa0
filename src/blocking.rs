//! Blocking calling convention.
//!
//! Each function opens a session, performs one call on a private
//! current-thread runtime, and closes the session before returning. They must
//! not be called from inside an async runtime; doing so returns
//! [`ComputerenderError::Runtime`].
//!
//! ```no_run
//! use computerender::{ClientBuilder, GenerationParams, Settings, blocking};
//!
//! # fn main() -> computerender::Result<()> {
//! let builder = ClientBuilder::new(Settings::from_env(None)?);
//! let image = blocking::generate(builder, "a red fox", &GenerationParams::new().width(512))?;
//! std::fs::write("fox.jpg", image).ok();
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use crate::api::{ApiClient, ClientBuilder, ComputerenderError, GenerationParams, Money, Result};

pub fn generate(builder: ClientBuilder, prompt: &str, params: &GenerationParams) -> Result<Vec<u8>> {
    block_on(builder.scoped(async |client: &ApiClient| client.generate(prompt, params).await))
}

pub fn cost(builder: ClientBuilder, prompt: &str, params: &GenerationParams) -> Result<Money> {
    block_on(builder.scoped(async |client: &ApiClient| client.cost(prompt, params).await))
}

fn block_on<T>(future: impl Future<Output = Result<T>>) -> Result<T> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ComputerenderError::Runtime(
            "blocking calls cannot run inside an async runtime; use ApiClient instead".to_string(),
        ));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ComputerenderError::Runtime(format!("failed to start runtime: {e}")))?;

    runtime.block_on(future)
}
