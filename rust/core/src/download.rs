// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exporting resident models as `<modelId>.frag` files.

use crate::engine::FragmentEngine;
use crate::error::{Error, Result};
use crate::model_id::{fragment_file_name, validate_file_stem};
use bytes::Bytes;
use std::future::Future;
use std::path::PathBuf;

/// Destination for exported fragment files.
pub trait DownloadSink: Send + Sync {
    fn save(&self, file_name: &str, data: Bytes) -> impl Future<Output = Result<()>> + Send;
}

/// Writes exported fragments into a directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    async fn save(&self, file_name: &str, data: Bytes) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, &data).await?;
        tracing::info!(path = %path.display(), bytes = data.len(), "Saved fragment");
        Ok(())
    }
}

/// Serialize every resident model and hand it to `sink`.
///
/// Stops at the first failure. Returns the saved file names.
pub async fn download_models<E, S>(engine: &E, sink: &S) -> Result<Vec<String>>
where
    E: FragmentEngine,
    S: DownloadSink,
{
    let model_ids = engine.models().keys();
    let mut saved = Vec::with_capacity(model_ids.len());

    for model_id in model_ids {
        validate_file_stem(&model_id).map_err(|reason| Error::Download {
            model_id: model_id.clone(),
            reason,
        })?;

        let buffer = engine.get_buffer(&model_id, false).await?;
        let file_name = fragment_file_name(&model_id);
        sink.save(&file_name, buffer)
            .await
            .map_err(|e| Error::Download {
                model_id: model_id.clone(),
                reason: e.to_string(),
            })?;
        saved.push(file_name);
    }

    Ok(saved)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::engine::{compress, BufferEngine, LoadOptions};
    use parking_lot::Mutex;

    /// Records every save.
    #[derive(Default)]
    pub(crate) struct MemorySink {
        pub(crate) saved: Mutex<Vec<(String, Bytes)>>,
    }

    impl DownloadSink for MemorySink {
        async fn save(&self, file_name: &str, data: Bytes) -> Result<()> {
            self.saved.lock().push((file_name.to_string(), data));
            Ok(())
        }
    }

    async fn engine_with(ids: &[&str]) -> BufferEngine {
        let engine = BufferEngine::new();
        engine.init(Bytes::from_static(b"worker")).await.unwrap();
        for id in ids {
            engine
                .load(compress(id.as_bytes()), LoadOptions::new(*id))
                .await
                .unwrap();
        }
        engine
    }

    #[tokio::test]
    async fn one_save_per_model() {
        let engine = engine_with(&["school_arq", "school_str"]).await;
        let sink = MemorySink::default();

        let saved = download_models(&engine, &sink).await.unwrap();

        assert_eq!(saved, vec!["school_arq.frag", "school_str.frag"]);
        let recorded = sink.saved.lock();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].1, engine.get_buffer("school_arq", false).await.unwrap());
    }

    #[tokio::test]
    async fn empty_collection_saves_nothing() {
        let engine = engine_with(&[]).await;
        let sink = MemorySink::default();
        assert!(download_models(&engine, &sink).await.unwrap().is_empty());
        assert!(sink.saved.lock().is_empty());
    }

    #[tokio::test]
    async fn directory_sink_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("downloads"));
        let engine = engine_with(&["a"]).await;

        download_models(&engine, &sink).await.unwrap();

        let written = std::fs::read(dir.path().join("downloads").join("a.frag")).unwrap();
        assert_eq!(written, engine.get_buffer("a", false).await.unwrap().to_vec());
    }
}
