use std::time::Duration;

use anyhow::{Context, Result};

pub(crate) fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(format!(
            "pantry-cli/{} (ingredient tracker)",
            env!("CARGO_PKG_VERSION")
        ))
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .context("Failed to build HTTP client")
}

/// Handle of the runtime the blocking provider impls run on.
pub(crate) fn runtime_handle() -> Result<tokio::runtime::Handle> {
    tokio::runtime::Handle::try_current()
        .context("HTTP clients must be created inside a tokio runtime")
}
