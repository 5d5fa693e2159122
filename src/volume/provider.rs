use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::core::model::Entry;

/// Errors a volume backend can surface. The navigator reports all of them as
/// backend failures; the variants only exist to keep log lines useful.
#[derive(Debug, Error)]
pub enum VolumeError {
    /// The entry points at a volume or offset the backend does not have.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Volume data could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
    #[error("{0}")]
    Backend(String),
}

/// Stored article content before redirects are followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawContent {
    Body(String),
    /// "Look at this other title instead." May carry a `#section` suffix.
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArticle {
    pub title: String,
    pub content: RawContent,
}

/// Metadata about one loaded volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub id: String,
    pub display_title: String,
    /// Online article URL with `$1` standing in for the article title.
    pub article_url_template: Option<String>,
}

impl VolumeInfo {
    pub fn article_url(&self, title: &str) -> Option<String> {
        self.article_url_template
            .as_ref()
            .map(|template| template.replace("$1", title))
    }
}

/// Lazily produced link-follow candidates. Consumers decide how many to take.
pub type EntryStream = BoxStream<'static, Entry>;

#[async_trait]
pub trait VolumeProvider: Send + Sync {
    /// Returns the name of the backend.
    fn name(&self) -> &str;

    /// Volume metadata. Never blocks.
    fn volume(&self, volume_id: &str) -> Option<VolumeInfo>;

    /// Display title for a volume, falling back to its id.
    fn display_title(&self, volume_id: &str) -> String {
        self.volume(volume_id)
            .map(|v| v.display_title)
            .unwrap_or_else(|| volume_id.to_string())
    }

    /// Fetches the stored content for an entry, which may itself be a redirect.
    async fn article_raw(&self, entry: &Entry) -> Result<RawArticle, VolumeError>;

    /// Finds the entry for an exact title within one volume. Used to follow redirects.
    async fn lookup(&self, title: &str, volume_id: &str) -> Result<Option<Entry>, VolumeError>;

    /// Candidate entries for a link clicked inside an article of `volume_id`.
    async fn follow_link(&self, link: &str, volume_id: &str) -> Result<EntryStream, VolumeError>;
}
