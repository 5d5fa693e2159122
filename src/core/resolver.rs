//! Entry resolution: fetch an article and follow its redirects.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use crate::core::model::{Article, Entry, split_anchor};
use crate::error::{Error, Result};
use crate::volume::{RawContent, VolumeProvider};

/// Redirect hops followed before giving up.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

pub struct Resolver {
    volumes: Arc<dyn VolumeProvider>,
    max_redirects: usize,
}

impl Resolver {
    pub fn new(volumes: Arc<dyn VolumeProvider>, max_redirects: usize) -> Self {
        Self {
            volumes,
            max_redirects,
        }
    }

    /// Resolves `entry` into an article, following redirects within the same volume.
    ///
    /// A chain that revisits a title or runs past `max_redirects` hops fails with
    /// [`Error::RedirectChainTooLong`]; a target the volume does not contain fails
    /// with [`Error::RedirectTargetNotFound`].
    pub async fn resolve(&self, entry: &Entry) -> Result<Article> {
        let mut raw = self.volumes.article_raw(entry).await?;
        let requested = raw.title.clone();
        let mut section = entry.section.clone();
        let mut seen = HashSet::from([raw.title.clone()]);
        let mut hops = 0;

        loop {
            let target = match raw.content {
                RawContent::Body(body) => {
                    return Ok(Article {
                        volume_id: entry.volume_id.clone(),
                        redirected_from_title: (hops > 0).then_some(requested),
                        title: raw.title,
                        body,
                        section,
                    });
                }
                RawContent::Redirect(target) => target,
            };

            hops += 1;
            let (title, anchor) = split_anchor(&target);
            if hops > self.max_redirects || !seen.insert(title.to_string()) {
                return Err(Error::RedirectChainTooLong(target));
            }
            debug!("Redirect {} -> {} (hop {})", raw.title, target, hops);

            let next = self
                .volumes
                .lookup(title, &entry.volume_id)
                .await?
                .ok_or_else(|| Error::RedirectTargetNotFound(target.clone()))?;
            if section.is_none() {
                section = anchor.map(str::to_string);
            }
            raw = self.volumes.article_raw(&next).await?;
            // Case-insensitive lookups can land on a title spelled differently.
            seen.insert(raw.title.clone());
        }
    }
}
