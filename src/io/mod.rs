use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

pub mod local;

/// Where uploaded file payloads live.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores `bytes` under a free name derived from `name`, returning the name used.
    async fn save(&self, name: &str, bytes: &[u8]) -> Result<String>;
    async fn read(&self, name: &str) -> Result<Vec<u8>>;
    async fn exists(&self, name: &str) -> Result<bool>;
    /// Absolute filesystem location, for handing to a static file server.
    fn path(&self, name: &str) -> Result<PathBuf>;
    /// Public URL of a stored file.
    fn url(&self, name: &str) -> String;
}

/// Joins `name` onto `root`, refusing anything that would land outside it.
pub fn verify_relative_path(root: &Path, name: &Path) -> Result<PathBuf> {
    let mut depth: i32 = 0;
    for component in name.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return Err(anyhow!("Path {} escapes the storage root", name.display()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(anyhow!("Absolute path {} is not allowed", name.display()));
            }
        }
    }

    if depth == 0 {
        return Err(anyhow!("Path {} does not name a file", name.display()));
    }

    Ok(root.join(name))
}

/// Reduces an uploaded file name to a safe basename: spaces become `_`,
/// anything outside `[\w.-]` is dropped.
pub fn valid_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    base.replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
