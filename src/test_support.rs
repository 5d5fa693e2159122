//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::Notify;

use crate::core::model::Entry;
use crate::core::present::ViewEvent;
use crate::volume::{EntryStream, RawArticle, RawContent, VolumeError, VolumeInfo, VolumeProvider};

/// One stored article for [`ScriptedVolumes`].
pub struct Record {
    title: String,
    content: RawContent,
}

pub fn body(title: &str, text: &str) -> Record {
    Record {
        title: title.to_string(),
        content: RawContent::Body(text.to_string()),
    }
}

pub fn redirect(title: &str, target: &str) -> Record {
    Record {
        title: title.to_string(),
        content: RawContent::Redirect(target.to_string()),
    }
}

/// A single in-memory volume with switchable failure modes.
pub struct ScriptedVolumes {
    volume_id: String,
    records: Vec<Record>,
    links: HashMap<String, Vec<String>>,
    url_template: Option<String>,
    endless_links: bool,
    failing_articles: bool,
    failing_links: bool,
    gate: Option<Arc<Notify>>,
}

impl ScriptedVolumes {
    pub fn new(volume_id: &str) -> Self {
        Self {
            volume_id: volume_id.to_string(),
            records: Vec::new(),
            links: HashMap::new(),
            url_template: None,
            endless_links: false,
            failing_articles: false,
            failing_links: false,
            gate: None,
        }
    }

    pub fn with(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }

    /// Link text that expands to these titles, in order.
    pub fn with_links(mut self, link: &str, titles: &[&str]) -> Self {
        self.links.insert(
            link.to_string(),
            titles.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn with_url_template(mut self, template: &str) -> Self {
        self.url_template = Some(template.to_string());
        self
    }

    /// Link following yields the first article forever.
    pub fn endless_links(mut self) -> Self {
        self.endless_links = true;
        self
    }

    pub fn failing_articles(mut self) -> Self {
        self.failing_articles = true;
        self
    }

    pub fn failing_links(mut self) -> Self {
        self.failing_links = true;
        self
    }

    /// Article fetches wait until [`gate`](Self::gate) is notified.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn gate(&self) -> Arc<Notify> {
        self.gate.clone().expect("volumes are not gated")
    }

    pub fn entry(&self, title: &str) -> Entry {
        self.find(title)
            .unwrap_or_else(|| panic!("no scripted article {title}"))
    }

    fn find(&self, title: &str) -> Option<Entry> {
        self.records
            .iter()
            .position(|r| r.title == title)
            .map(|idx| Entry::new(self.volume_id.clone(), title, idx as u64))
    }
}

#[async_trait]
impl VolumeProvider for ScriptedVolumes {
    fn name(&self) -> &str {
        "scripted"
    }

    fn volume(&self, volume_id: &str) -> Option<VolumeInfo> {
        (volume_id == self.volume_id).then(|| VolumeInfo {
            id: volume_id.to_string(),
            display_title: format!("Volume {volume_id}"),
            article_url_template: self.url_template.clone(),
        })
    }

    async fn article_raw(&self, entry: &Entry) -> Result<RawArticle, VolumeError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.failing_articles {
            return Err(VolumeError::Backend("scripted failure".to_string()));
        }
        let record = self
            .records
            .get(entry.article_offset as usize)
            .filter(|_| entry.volume_id == self.volume_id)
            .ok_or_else(|| VolumeError::NotFound(entry.title.clone()))?;
        Ok(RawArticle {
            title: record.title.clone(),
            content: record.content.clone(),
        })
    }

    async fn lookup(&self, title: &str, volume_id: &str) -> Result<Option<Entry>, VolumeError> {
        if volume_id != self.volume_id {
            return Ok(None);
        }
        Ok(self.find(title))
    }

    async fn follow_link(&self, link: &str, _volume_id: &str) -> Result<EntryStream, VolumeError> {
        if self.failing_links {
            return Err(VolumeError::Backend("scripted link failure".to_string()));
        }
        if self.endless_links {
            let entry = Entry::new(self.volume_id.clone(), link, 0);
            return Ok(futures::stream::repeat(entry).boxed());
        }
        let entries: Vec<Entry> = match self.links.get(link) {
            Some(titles) => titles.iter().filter_map(|t| self.find(t)).collect(),
            None => self.find(link).into_iter().collect(),
        };
        Ok(futures::stream::iter(entries).boxed())
    }
}

/// Everything queued on the view channel so far.
pub fn drain_events(events: &Receiver<ViewEvent>) -> Vec<ViewEvent> {
    events.try_iter().collect()
}
