//! Descriptor loading and caching
//!
//! Descriptors are read from a local file or fetched over HTTP. Failures are
//! reported to the caller as [`DescriptorError`] and never retried here.
//! [`DescriptorCache`] keeps the first successfully loaded descriptor for
//! reuse; it is an ordinary value, so callers decide how widely it is shared.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::descriptor::Descriptor;

/// Location of the bundled demo descriptor
pub const DEFAULT_DESCRIPTOR_PATH: &str = "descriptors/DemoRouter.json";

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("Failed to read descriptor {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to fetch descriptor from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to load descriptor from {url}: HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Invalid descriptor JSON: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Where a descriptor comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorSource {
    Path(PathBuf),
    Url(String),
}

impl Default for DescriptorSource {
    fn default() -> Self {
        DescriptorSource::Path(PathBuf::from(DEFAULT_DESCRIPTOR_PATH))
    }
}

impl FromStr for DescriptorSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(DescriptorSource::Url(s.to_string()))
        } else {
            Ok(DescriptorSource::Path(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for DescriptorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorSource::Path(path) => write!(f, "{}", path.display()),
            DescriptorSource::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Loads a descriptor without caching
pub async fn load_descriptor_from(source: &DescriptorSource) -> Result<Descriptor, DescriptorError> {
    fetch(&reqwest::Client::new(), source).await
}

async fn fetch(
    client: &reqwest::Client,
    source: &DescriptorSource,
) -> Result<Descriptor, DescriptorError> {
    let body = match source {
        DescriptorSource::Path(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| DescriptorError::Io {
                    path: path.clone(),
                    source,
                })?
        }
        DescriptorSource::Url(url) => {
            let http_err = |source| DescriptorError::Http {
                url: url.clone(),
                source,
            };
            let response = client.get(url).send().await.map_err(http_err)?;
            if !response.status().is_success() {
                return Err(DescriptorError::Status {
                    url: url.clone(),
                    status: response.status(),
                });
            }
            response.text().await.map_err(http_err)?
        }
    };

    let descriptor = Descriptor::from_json(&body)?;
    info!(
        source = %source,
        messages = descriptor.messages.len(),
        formats = descriptor.display.formats.len(),
        "loaded ERC-7730 descriptor"
    );
    Ok(descriptor)
}

/// Caches the first successfully loaded descriptor from one source
#[derive(Debug)]
pub struct DescriptorCache {
    source: DescriptorSource,
    client: reqwest::Client,
    cached: RwLock<Option<Arc<Descriptor>>>,
}

impl DescriptorCache {
    pub fn new(source: DescriptorSource) -> Self {
        Self {
            source,
            client: reqwest::Client::new(),
            cached: RwLock::new(None),
        }
    }

    /// Cache over [`DEFAULT_DESCRIPTOR_PATH`]
    pub fn well_known() -> Self {
        Self::new(DescriptorSource::default())
    }

    pub fn source(&self) -> &DescriptorSource {
        &self.source
    }

    /// Returns the cached descriptor, loading it on first use
    ///
    /// A failed load leaves the cache empty so the next call tries again.
    pub async fn load(&self) -> Result<Arc<Descriptor>, DescriptorError> {
        if let Some(descriptor) = self.cached() {
            debug!(source = %self.source, "descriptor cache hit");
            return Ok(descriptor);
        }

        let loaded = Arc::new(fetch(&self.client, &self.source).await?);
        let mut slot = self.cached.write().unwrap_or_else(|e| e.into_inner());
        // A concurrent load may have finished first; keep whichever landed first.
        Ok(slot.get_or_insert(loaded).clone())
    }

    pub fn cached(&self) -> Option<Arc<Descriptor>> {
        self.cached
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        *self.cached.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl Default for DescriptorCache {
    fn default() -> Self {
        Self::well_known()
    }
}
