use crate::database::FileRepository;
use crate::domain::StoredFile;
use crate::error::CmsError;
use crate::io::FileStorage;
use std::path::PathBuf;

/// How a download is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Let the front-end server send the file found at `url`.
    AccelRedirect { url: String },
    /// Stream the file from disk ourselves.
    Direct { path: PathBuf },
}

pub struct FileService {
    repo: Box<dyn FileRepository>,
    storage: Box<dyn FileStorage>,
    use_x_accel_redirect: bool,
}

impl FileService {
    pub fn new(
        repo: Box<dyn FileRepository>,
        storage: Box<dyn FileStorage>,
        use_x_accel_redirect: bool,
    ) -> Self {
        Self {
            repo,
            storage,
            use_x_accel_redirect,
        }
    }

    pub async fn upload(&self, name: &str, bytes: &[u8]) -> anyhow::Result<StoredFile> {
        let stored_name = self.storage.save(name, bytes).await?;
        let file = self.repo.create_file(&stored_name).await?;
        tracing::info!("Stored upload {} as file {}", stored_name, file.id);
        Ok(file)
    }

    pub async fn get(&self, id: i64) -> anyhow::Result<Option<StoredFile>> {
        self.repo.get_file(id).await
    }

    pub fn storage_url(&self, file: &StoredFile) -> String {
        self.storage.url(&file.name)
    }

    pub async fn delivery(&self, id: i64) -> Result<Delivery, CmsError> {
        let file = self.get(id).await?.ok_or(CmsError::NotFound)?;

        if self.use_x_accel_redirect {
            return Ok(Delivery::AccelRedirect {
                url: self.storage_url(&file),
            });
        }

        let path = self.storage.path(&file.name)?;
        if !self.storage.exists(&file.name).await? {
            tracing::warn!("File {} is recorded but missing from storage", file.id);
            return Err(CmsError::NotFound);
        }

        Ok(Delivery::Direct { path })
    }
}
