// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fetch-and-decode pipeline from fragment paths to resident models.
//!
//! A batch load fetches and decodes every path concurrently and waits for
//! all of them. Completion order is unspecified. Models that load before a
//! sibling fails stay resident; the batch then reports the first failure
//! observed.

use crate::engine::{FragmentEngine, LoadOptions};
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, UrlResolver};
use crate::model_id::derive_model_id;
use crate::progress::LoadingProgress;
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of a batch load without failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Model ids in completion order.
    pub loaded: Vec<String>,
    /// Paths with no usable model id.
    pub skipped: Vec<String>,
}

/// Loads fragment paths into a [`FragmentEngine`].
pub struct FragmentLoader<E, F> {
    engine: Arc<E>,
    fetcher: Arc<F>,
    resolver: UrlResolver,
}

impl<E: FragmentEngine, F: Fetcher> FragmentLoader<E, F> {
    pub fn new(engine: Arc<E>, fetcher: Arc<F>, resolver: UrlResolver) -> Self {
        Self {
            engine,
            fetcher,
            resolver,
        }
    }

    /// Load every path concurrently.
    ///
    /// Paths without a model id are skipped before dispatch and do not count
    /// towards the total. `on_progress` is called with `(0, total)` up front
    /// and again after each fragment that loads successfully, so a batch
    /// without failures always ends at `(total, total)`.
    pub async fn load_all<P>(&self, paths: &[String], mut on_progress: P) -> Result<LoadReport>
    where
        P: FnMut(LoadingProgress),
    {
        let mut report = LoadReport::default();
        let mut pending = FuturesUnordered::new();
        for path in paths {
            match derive_model_id(path) {
                Some(model_id) => {
                    pending.push(async move { (path, self.load_model(path, model_id).await) })
                }
                None => {
                    tracing::warn!(path = %path, "Skipping fragment without a model id");
                    report.skipped.push(path.clone());
                }
            }
        }

        let mut progress = LoadingProgress::new(pending.len());
        on_progress(progress);

        let mut first_error: Option<Error> = None;
        while let Some((path, result)) = pending.next().await {
            match result {
                Ok(model_id) => {
                    progress.advance();
                    on_progress(progress);
                    report.loaded.push(model_id);
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Fragment failed to load");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                tracing::info!(
                    loaded = report.loaded.len(),
                    skipped = report.skipped.len(),
                    "Batch load complete"
                );
                Ok(report)
            }
        }
    }

    /// Load a single explicit path.
    pub async fn load_one(&self, path: &str) -> Result<String> {
        let model_id =
            derive_model_id(path).ok_or_else(|| Error::InvalidModelId(path.to_string()))?;
        self.load_model(path, model_id).await
    }

    async fn load_model(&self, path: &str, model_id: String) -> Result<String> {
        let url = self.resolver.resolve(path)?;
        let buffer = self.fetcher.fetch(url.as_str()).await?;
        let size = buffer.len();
        self.engine
            .load(buffer, LoadOptions::new(model_id.clone()))
            .await?;

        tracing::info!(model_id = %model_id, url = %url, bytes = size, "Loaded fragment");
        Ok(model_id)
    }
}
