pub mod files;
pub mod lookup;
pub mod pages;

pub use files::{Delivery, FileService};
pub use pages::PageService;
