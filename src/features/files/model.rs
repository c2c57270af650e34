use crate::domain::StoredFile;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct DbFile {
    pub id: i64,
    pub name: String,
    pub created: NaiveDateTime,
}

impl From<DbFile> for StoredFile {
    fn from(db_file: DbFile) -> Self {
        StoredFile {
            id: db_file.id,
            name: db_file.name,
            created: db_file.created,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JsonFile {
    pub id: i64,
    pub name: String,
    pub download_url: String,
    pub created: String,
}

impl From<&StoredFile> for JsonFile {
    fn from(file: &StoredFile) -> Self {
        JsonFile {
            id: file.id,
            name: file.name.clone(),
            download_url: file.download_url(),
            created: file
                .created
                .format(crate::features::pages::model::DATETIME_FORMAT)
                .to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct UploadParams {
    pub name: String,
}
