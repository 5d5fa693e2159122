//! Link following: turn link text from an article into candidate entries.

use std::sync::Arc;

use futures::StreamExt;
use log::debug;

use crate::core::model::Entry;
use crate::error::Result;
use crate::volume::VolumeProvider;

/// Most candidates collected for one link.
pub const DEFAULT_MAX_LINK_CANDIDATES: usize = 10;

/// URL schemes handed to the host instead of being looked up.
const EXTERNAL_SCHEMES: &[&str] = &["http://", "https://", "ftp://", "sftp://", "mailto:"];

/// Where a clicked link should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Outside the dictionary; open it with the system handler.
    External(String),
    /// A headword reference to look up in the loaded volumes.
    Internal(String),
}

impl LinkTarget {
    pub fn classify(url: &str) -> Self {
        let lower = url.to_lowercase();
        if EXTERNAL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
            LinkTarget::External(url.to_string())
        } else {
            LinkTarget::Internal(url.to_string())
        }
    }
}

pub struct LinkFollower {
    volumes: Arc<dyn VolumeProvider>,
    max_candidates: usize,
}

impl LinkFollower {
    pub fn new(volumes: Arc<dyn VolumeProvider>, max_candidates: usize) -> Self {
        Self {
            volumes,
            max_candidates,
        }
    }

    /// Collects at most `max_candidates` entries for `link`. The backend stream
    /// may be longer or endless; only the head is ever pulled.
    pub async fn follow(&self, link: &str, volume_id: &str) -> Result<Vec<Entry>> {
        let candidates: Vec<Entry> = self
            .volumes
            .follow_link(link, volume_id)
            .await?
            .take(self.max_candidates)
            .collect()
            .await;
        debug!(
            "Link {:?} from {} matched {} candidate(s)",
            link,
            volume_id,
            candidates.len()
        );
        Ok(candidates)
    }
}
