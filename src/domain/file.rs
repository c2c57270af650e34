use chrono::NaiveDateTime;
use std::path::Path;

/// An uploaded file. `name` is the name under the media root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: i64,
    pub name: String,
    pub created: NaiveDateTime,
}

impl StoredFile {
    pub fn basename(&self) -> String {
        Path::new(&self.name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone())
    }

    pub fn download_url(&self) -> String {
        format!("/files/{}/{}", self.id, self.basename().to_lowercase())
    }
}
