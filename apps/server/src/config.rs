// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

use frag_viewer_core::{
    CameraPreset, ViewerConfig, Viewport, DEFAULT_ARCH_PATTERN, DEFAULT_FRAGMENTS,
    DEFAULT_WORKER_URL,
};
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Interface to bind.
    pub bind_addr: String,
    /// Public base URL; rooted fragment paths resolve against it.
    pub public_url: String,
    /// Local directory served as static fragment files.
    pub fragments_dir: String,
    /// URL path segment the fragment directory is mounted under.
    pub fragments_path: String,
    /// Engine worker script fetched at mount.
    pub worker_url: String,
    /// Fragments loaded by the "load" action.
    pub default_fragments: Vec<String>,
    /// Substring marking the architecture model.
    pub arch_pattern: String,
    /// Directory that "download all" writes into.
    pub download_dir: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Fetch timeout in seconds. Unset means no timeout.
    pub fetch_timeout_secs: Option<u64>,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Allowed CORS origins (comma-separated, or "*" for all).
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let port = parse_or(var("PORT"), 8080);
        let fragments_path = var("FRAGMENTS_PATH")
            .map(|p| p.trim_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "fragments".into());

        Self {
            port,
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".into()),
            public_url: var("PUBLIC_URL").unwrap_or_else(|| format!("http://127.0.0.1:{}", port)),
            fragments_dir: var("FRAGMENTS_DIR").unwrap_or_else(|| "./fragments".into()),
            fragments_path,
            worker_url: var("WORKER_URL").unwrap_or_else(|| DEFAULT_WORKER_URL.into()),
            default_fragments: var("DEFAULT_FRAGMENTS")
                .map(|list| split_list(&list))
                .unwrap_or_else(|| DEFAULT_FRAGMENTS.iter().map(|s| s.to_string()).collect()),
            arch_pattern: var("ARCH_MODEL_PATTERN").unwrap_or_else(|| DEFAULT_ARCH_PATTERN.into()),
            download_dir: var("DOWNLOAD_DIR").unwrap_or_else(|| "./downloads".into()),
            viewport_width: parse_or(var("VIEWPORT_WIDTH"), 1280),
            viewport_height: parse_or(var("VIEWPORT_HEIGHT"), 720),
            fetch_timeout_secs: var("FETCH_TIMEOUT_SECS").and_then(|v| v.parse().ok()),
            request_timeout_secs: parse_or(var("REQUEST_TIMEOUT_SECS"), 300),
            cors_origins: split_list(&var("CORS_ORIGINS").unwrap_or_else(|| {
                // Default: allow common development origins
                "http://localhost:3000,http://localhost:5173,http://127.0.0.1:3000,http://127.0.0.1:5173".into()
            })),
        }
    }

    /// Settings handed to the viewer controller.
    pub fn viewer_config(&self) -> ViewerConfig {
        ViewerConfig {
            base_url: self.public_url.clone(),
            fragments_dir: self.fragments_path.clone(),
            worker_url: self.worker_url.clone(),
            default_fragments: self.default_fragments.clone(),
            arch_pattern: self.arch_pattern.clone(),
            camera: CameraPreset::default(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.public_url, "http://127.0.0.1:8080");
        assert_eq!(config.fragments_path, "fragments");
        assert_eq!(config.default_fragments.len(), 2);
        assert_eq!(config.arch_pattern, "arq");
        assert_eq!(config.viewport(), Viewport::new(1280, 720));
        assert_eq!(config.fetch_timeout(), None);
        assert_eq!(config.request_timeout_secs, 300);
    }

    #[test]
    fn public_url_follows_port() {
        let config = config(&[("PORT", "9000")]);
        assert_eq!(config.public_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let config = config(&[("PORT", "eighty"), ("VIEWPORT_WIDTH", "-3")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.viewport_width, 1280);
    }

    #[test]
    fn lists_are_trimmed() {
        let config = config(&[
            ("DEFAULT_FRAGMENTS", " /fragments/a.frag , ,b.frag"),
            ("FRAGMENTS_PATH", "/models/"),
            ("FETCH_TIMEOUT_SECS", "15"),
        ]);
        assert_eq!(config.default_fragments, vec!["/fragments/a.frag", "b.frag"]);
        assert_eq!(config.fragments_path, "models");
        assert_eq!(config.fetch_timeout(), Some(Duration::from_secs(15)));

        let viewer = config.viewer_config();
        assert_eq!(viewer.fragments_dir, "models");
        assert_eq!(viewer.default_fragments, config.default_fragments);
    }
}
