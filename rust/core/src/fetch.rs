// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Network access for fragment files and the engine worker script.

use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Retrieves a resource as raw bytes.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Plain HTTP GET fetcher.
///
/// No retries. No timeout unless one is configured.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    /// Build the client, failing if the HTTP backend cannot be set up.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Initialization(format!("http client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let resp = self.client.get(url).send().await.map_err(|e| Error::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Fetch returned non-success status");
            return Err(Error::NotFound {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|e| Error::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(url = %url, bytes = body.len(), "Fetched");
        Ok(body)
    }
}

/// Turns fragment paths into absolute URLs.
///
/// - absolute `http`/`https` URLs are used as-is
/// - `/fragments/a.frag` is resolved against the base URL
/// - `a.frag` is resolved inside the fragments directory
#[derive(Debug, Clone)]
pub struct UrlResolver {
    base: Url,
    fragments_dir: String,
}

impl UrlResolver {
    pub fn new(base: &str, fragments_dir: &str) -> Result<Self> {
        let mut base = Url::parse(base).map_err(|e| Error::InvalidUrl {
            path: base.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                path: base.to_string(),
                reason: "cannot be used as a base".into(),
            });
        }
        // Joining replaces the last segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            fragments_dir: fragments_dir.trim_matches('/').to_string(),
        })
    }

    pub fn resolve(&self, path: &str) -> Result<Url> {
        let invalid = |reason: String| Error::InvalidUrl {
            path: path.to_string(),
            reason,
        };

        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty path".into()));
        }

        match Url::parse(trimmed) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => return Ok(url),
            Ok(url) => return Err(invalid(format!("unsupported scheme '{}'", url.scheme()))),
            Err(url::ParseError::RelativeUrlWithoutBase) => {}
            Err(e) => return Err(invalid(e.to_string())),
        }

        let relative = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else if self.fragments_dir.is_empty() {
            trimmed.to_string()
        } else {
            format!("{}/{}", self.fragments_dir, trimmed)
        };

        self.base
            .join(&relative)
            .map_err(|e| invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> UrlResolver {
        UrlResolver::new("http://127.0.0.1:8080", "/fragments/").unwrap()
    }

    #[test]
    fn absolute_urls_pass_through() {
        let url = "https://thatopen.github.io/engine_components/resources/frags/school_arq.frag";
        assert_eq!(resolver().resolve(url).unwrap().as_str(), url);
    }

    #[test]
    fn rooted_paths_join_the_base() {
        let url = resolver().resolve("/fragments/a.ifc.frag").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/fragments/a.ifc.frag");
    }

    #[test]
    fn bare_names_land_in_fragments_dir() {
        let url = resolver().resolve("b.ifc.frag").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/fragments/b.ifc.frag");
    }

    #[test]
    fn base_with_path_keeps_its_segments() {
        let resolver = UrlResolver::new("http://host/viewer", "fragments").unwrap();
        let url = resolver.resolve("a.frag").unwrap();
        assert_eq!(url.as_str(), "http://host/viewer/fragments/a.frag");
    }

    #[test]
    fn rejects_unsupported_schemes_and_empty_paths() {
        assert!(resolver().resolve("ftp://host/a.frag").is_err());
        assert!(resolver().resolve("   ").is_err());
    }

    #[test]
    fn client_builds_with_and_without_timeout() {
        assert!(HttpFetcher::new().is_ok());
        assert!(HttpFetcher::with_timeout(Some(Duration::from_secs(5))).is_ok());
    }

    #[test]
    fn rejects_invalid_base() {
        assert!(UrlResolver::new("not a url", "fragments").is_err());
        assert!(UrlResolver::new("mailto:someone@example.com", "fragments").is_err());
    }
}
