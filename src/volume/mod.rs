pub mod provider;
pub mod providers;

pub use provider::{EntryStream, RawArticle, RawContent, VolumeError, VolumeInfo, VolumeProvider};
pub use providers::JsonLibrary;
