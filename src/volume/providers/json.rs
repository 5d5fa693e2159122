//! JSON-backed volume library.
//!
//! Each volume is one `*.json` file:
//!
//! ```json
//! {
//!   "id": "enwiki",
//!   "title": "English Wikipedia",
//!   "article_url_template": "https://en.wikipedia.org/wiki/$1",
//!   "articles": [
//!     { "title": "Cat", "body": "<p>Small carnivorous mammal.</p>" },
//!     { "title": "Kitty", "redirect": "Cat#Kittens" }
//!   ]
//! }
//! ```
//!
//! Articles are addressed by their index in `articles`, which becomes the
//! entry's `article_offset`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::core::model::{Entry, split_anchor};
use crate::volume::{EntryStream, RawArticle, RawContent, VolumeError, VolumeInfo, VolumeProvider};

// ============================================================================
// File Format
// ============================================================================

#[derive(Deserialize, Debug)]
struct VolumeFile {
    id: String,
    title: String,
    #[serde(default)]
    article_url_template: Option<String>,
    #[serde(default)]
    articles: Vec<ArticleRecord>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum ArticleRecord {
    Redirect { title: String, redirect: String },
    Body { title: String, body: String },
}

impl ArticleRecord {
    fn title(&self) -> &str {
        match self {
            ArticleRecord::Redirect { title, .. } | ArticleRecord::Body { title, .. } => title,
        }
    }

    fn content(&self) -> RawContent {
        match self {
            ArticleRecord::Redirect { redirect, .. } => RawContent::Redirect(redirect.clone()),
            ArticleRecord::Body { body, .. } => RawContent::Body(body.clone()),
        }
    }
}

struct Volume {
    info: VolumeInfo,
    articles: Vec<ArticleRecord>,
}

impl Volume {
    fn entry(&self, index: usize) -> Entry {
        Entry::new(
            self.info.id.clone(),
            self.articles[index].title(),
            index as u64,
        )
    }
}

// ============================================================================
// Title Matching
// ============================================================================

/// Match quality, best first. Link following walks every volume once per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchTier {
    Exact,
    IgnoreCase,
    Prefix,
}

impl MatchTier {
    const ALL: [MatchTier; 3] = [MatchTier::Exact, MatchTier::IgnoreCase, MatchTier::Prefix];

    fn matches(self, candidate: &str, wanted: &str) -> bool {
        match self {
            MatchTier::Exact => candidate == wanted,
            MatchTier::IgnoreCase => {
                candidate != wanted && candidate.to_lowercase() == wanted.to_lowercase()
            }
            MatchTier::Prefix => {
                let candidate = candidate.to_lowercase();
                let wanted = wanted.to_lowercase();
                candidate != wanted && candidate.starts_with(&wanted)
            }
        }
    }
}

// ============================================================================
// Library
// ============================================================================

/// All loaded volumes, in lookup preference order.
pub struct JsonLibrary {
    volumes: Vec<Arc<Volume>>,
}

impl JsonLibrary {
    /// Builds a library from JSON documents, one per volume.
    pub fn from_json<S: AsRef<str>>(sources: &[S]) -> Result<Self, VolumeError> {
        let mut library = Self {
            volumes: Vec::new(),
        };
        for source in sources {
            let file: VolumeFile = serde_json::from_str(source.as_ref())
                .map_err(|e| VolumeError::Parse(e.to_string()))?;
            library.add(file);
        }
        Ok(library)
    }

    /// Loads every `*.json` file in `dir`, in file name order.
    pub fn load_dir(dir: &Path) -> Result<Self, VolumeError> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut library = Self {
            volumes: Vec::new(),
        };
        for path in paths {
            let contents = fs::read_to_string(&path)?;
            let file: VolumeFile = serde_json::from_str(&contents)
                .map_err(|e| VolumeError::Parse(format!("{}: {e}", path.display())))?;
            library.add(file);
        }
        info!(
            "Loaded {} volume(s) from {}",
            library.volumes.len(),
            dir.display()
        );
        Ok(library)
    }

    fn add(&mut self, file: VolumeFile) {
        if self.find(&file.id).is_some() {
            warn!("Duplicate volume id {}, keeping the first one", file.id);
            return;
        }
        debug!("Volume {} has {} article(s)", file.id, file.articles.len());
        self.volumes.push(Arc::new(Volume {
            info: VolumeInfo {
                id: file.id,
                display_title: file.title,
                article_url_template: file.article_url_template,
            },
            articles: file.articles,
        }));
    }

    /// Moves a volume to the front so it is searched first.
    pub fn with_preferred(mut self, volume_id: &str) -> Self {
        if let Some(pos) = self.volumes.iter().position(|v| v.info.id == volume_id) {
            let volume = self.volumes.remove(pos);
            self.volumes.insert(0, volume);
        } else {
            warn!("Preferred volume {} is not loaded", volume_id);
        }
        self
    }

    pub fn volume_ids(&self) -> Vec<String> {
        self.volumes.iter().map(|v| v.info.id.clone()).collect()
    }

    /// Best match for a headword across all volumes, used to open the first article.
    pub fn find_entry(&self, word: &str, volume_id: Option<&str>) -> Option<Entry> {
        let (title, section) = split_anchor(word);
        let volumes = self.ordered(volume_id);
        MatchTier::ALL.iter().find_map(|tier| {
            volumes.iter().find_map(|volume| {
                volume
                    .articles
                    .iter()
                    .position(|a| tier.matches(a.title(), title))
                    .map(|idx| volume.entry(idx).with_section(section.map(str::to_string)))
            })
        })
    }

    fn find(&self, volume_id: &str) -> Option<&Arc<Volume>> {
        self.volumes.iter().find(|v| v.info.id == volume_id)
    }

    /// Volumes with `first` (if loaded) moved to the front.
    fn ordered(&self, first: Option<&str>) -> Vec<Arc<Volume>> {
        let mut volumes = self.volumes.clone();
        if let Some(pos) = first.and_then(|id| volumes.iter().position(|v| v.info.id == id)) {
            let volume = volumes.remove(pos);
            volumes.insert(0, volume);
        }
        volumes
    }
}

#[async_trait]
impl VolumeProvider for JsonLibrary {
    fn name(&self) -> &str {
        "json"
    }

    fn volume(&self, volume_id: &str) -> Option<VolumeInfo> {
        self.find(volume_id).map(|v| v.info.clone())
    }

    async fn article_raw(&self, entry: &Entry) -> Result<RawArticle, VolumeError> {
        let volume = self
            .find(&entry.volume_id)
            .ok_or_else(|| VolumeError::NotFound(format!("volume {}", entry.volume_id)))?;
        let record = usize::try_from(entry.article_offset)
            .ok()
            .and_then(|idx| volume.articles.get(idx))
            .ok_or_else(|| {
                VolumeError::NotFound(format!(
                    "article {} in volume {}",
                    entry.article_offset, entry.volume_id
                ))
            })?;
        Ok(RawArticle {
            title: record.title().to_string(),
            content: record.content(),
        })
    }

    async fn lookup(&self, title: &str, volume_id: &str) -> Result<Option<Entry>, VolumeError> {
        let volume = self
            .find(volume_id)
            .ok_or_else(|| VolumeError::NotFound(format!("volume {volume_id}")))?;
        let found = [MatchTier::Exact, MatchTier::IgnoreCase]
            .iter()
            .find_map(|tier| {
                volume
                    .articles
                    .iter()
                    .position(|a| tier.matches(a.title(), title))
            })
            .map(|idx| volume.entry(idx));
        Ok(found)
    }

    async fn follow_link(&self, link: &str, volume_id: &str) -> Result<EntryStream, VolumeError> {
        let (title, section) = split_anchor(link);
        if title.is_empty() {
            return Ok(futures::stream::empty().boxed());
        }
        let title = title.to_string();
        let section = section.map(str::to_string);
        let volumes = self.ordered(Some(volume_id));

        let candidates = MatchTier::ALL.into_iter().flat_map(move |tier| {
            let title = title.clone();
            let section = section.clone();
            volumes.clone().into_iter().flat_map(move |volume| {
                let title = title.clone();
                let section = section.clone();
                (0..volume.articles.len()).filter_map(move |idx| {
                    tier.matches(volume.articles[idx].title(), &title)
                        .then(|| volume.entry(idx).with_section(section.clone()))
                })
            })
        });
        Ok(futures::stream::iter(candidates).boxed())
    }
}
