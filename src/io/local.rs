use crate::io::{FileStorage, valid_filename, verify_relative_path};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

const SUFFIX_LEN: usize = 7;

/// Files under a media root on local disk, published below `base_url`.
pub struct LocalFileStorage {
    pub root_path: PathBuf,
    pub base_url: String,
}

impl LocalFileStorage {
    pub fn new(root_path: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            base_url: base_url.into(),
        }
    }

    // "name.txt" -> "name_a8Xk2Qp.txt"
    fn with_random_suffix(name: &str) -> String {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect();

        let path = Path::new(name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        match path.extension() {
            Some(ext) => format!("{}_{}.{}", stem, suffix, ext.to_string_lossy()),
            None => format!("{}_{}", stem, suffix),
        }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let cleaned = valid_filename(name);
        if cleaned.is_empty() {
            return Err(anyhow!("'{}' is not a usable file name", name));
        }

        tokio::fs::create_dir_all(&self.root_path)
            .await
            .with_context(|| format!("Failed to create media root {}", self.root_path.display()))?;

        // create_new claims the name atomically; a taken name gets a fresh suffix
        let mut candidate = cleaned.clone();
        let mut file = loop {
            let target = self.path(&candidate)?;
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .await
            {
                Ok(file) => break file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    candidate = Self::with_random_suffix(&cleaned);
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {}", target.display()));
                }
            }
        };

        file.write_all(bytes)
            .await
            .with_context(|| format!("Failed to write {}", candidate))?;
        file.flush()
            .await
            .with_context(|| format!("Failed to write {}", candidate))?;

        Ok(candidate)
    }

    async fn read(&self, name: &str) -> Result<Vec<u8>> {
        let target = self.path(name)?;
        tokio::fs::read(&target)
            .await
            .with_context(|| format!("Failed to read {}", target.display()))
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let target = self.path(name)?;
        tokio::fs::try_exists(&target)
            .await
            .with_context(|| format!("Failed to check {}", target.display()))
    }

    fn path(&self, name: &str) -> Result<PathBuf> {
        verify_relative_path(&self.root_path, Path::new(name))
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), name)
    }
}
