use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, StatusCode};
use url::Url;

use crate::launch_error::ProbeError;

#[async_trait]
pub(crate) trait ServiceProbe: Send + Sync {
    /// One request, no retries. Never fails.
    async fn is_accessible(&self) -> bool;
}

/// GETs a fixed health URL. A redirect counts as alive and is not followed.
#[derive(Debug, Clone)]
pub(crate) struct HttpServiceProbe {
    client: reqwest::Client,
    url: Url,
}

impl HttpServiceProbe {
    pub(crate) fn new(url: Url, timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self { client, url })
    }

    async fn fetch_status(&self) -> Result<StatusCode, ProbeError> {
        let response = self.client.get(self.url.clone()).send().await?;
        Ok(response.status())
    }
}

#[async_trait]
impl ServiceProbe for HttpServiceProbe {
    async fn is_accessible(&self) -> bool {
        match self.fetch_status().await {
            Ok(status) => {
                let accessible = is_available_status(status);
                if !accessible {
                    tracing::debug!("service probe {} answered {status}", self.url);
                }
                accessible
            }
            Err(error) => {
                tracing::debug!("service probe {} failed: {error}", self.url);
                false
            }
        }
    }
}

pub(crate) fn is_available_status(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::FOUND
}
