pub mod access;
pub mod file;
pub mod language;
pub mod page;

pub use access::{User, can_edit};
pub use file::StoredFile;
pub use language::resolve_language;
pub use page::{Page, PageRevision, PageStatus};
