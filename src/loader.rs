use crate::model::Manifest;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Location of the published step library manifest.
pub const MANIFEST_URL: &str = "https://bitrise-steplib-collection.s3.amazonaws.com/spec.json";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch manifest from {url}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to decode manifest from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("server responded with HTTP {0}")]
    Status(StatusCode),
}

/// Fetches and decodes the manifest with a single blocking GET.
pub struct ManifestLoader {
    client: Client,
    url: String,
}

impl ManifestLoader {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LoadError::Fetch {
                url: url.clone(),
                source: e.into(),
            })?;
        Ok(Self { client, url })
    }

    /// Fetch the manifest. No retries: any failure is returned as is.
    pub fn fetch(&self) -> Result<Manifest, LoadError> {
        tracing::debug!(url = %self.url, "requesting manifest");

        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| self.fetch_error(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.fetch_error(FetchError::Status(status)));
        }

        let body = response
            .bytes()
            .map_err(|e| self.fetch_error(e.into()))?;
        tracing::debug!(bytes = body.len(), "manifest downloaded");

        Manifest::from_slice(&body).map_err(|source| LoadError::Decode {
            url: self.url.clone(),
            source,
        })
    }

    fn fetch_error(&self, source: FetchError) -> LoadError {
        LoadError::Fetch {
            url: self.url.clone(),
            source,
        }
    }
}
