//! # History Stack
//!
//! ```text
//! History
//! └── frames: Vec<HistoryFrame>       // append/pop at the tail only
//!     ├── candidates: Arc<[Entry]>    // shared, never mutated
//!     ├── cursor: Option<usize>       // None = before the first candidate
//!     └── article: Option<Article>    // set once the current candidate resolves
//! ```
//!
//! A frame holds a single entry for a direct lookup, or up to a handful of
//! candidates when a link matched several headwords. Copies share the
//! candidate list but never the cursor or article, so advancing or popping
//! one copy leaves every other copy alone.

use std::sync::Arc;

use crate::core::model::{Article, Entry};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct HistoryFrame {
    candidates: Arc<[Entry]>,
    cursor: Option<usize>,
    article: Option<Article>,
}

impl HistoryFrame {
    pub fn new(candidates: Vec<Entry>) -> Self {
        Self {
            candidates: candidates.into(),
            cursor: None,
            article: None,
        }
    }

    pub fn single(entry: Entry) -> Self {
        Self::new(vec![entry])
    }

    /// Copy that shares candidates but owns its cursor and article.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Snapshot with the resolved article scrolled to a different section.
    pub fn with_section(&self, section: Option<String>) -> Self {
        let mut copy = self.snapshot();
        if let Some(article) = copy.article.as_mut() {
            article.section = section;
        }
        copy
    }

    pub fn candidates(&self) -> &[Entry] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// 1-based position of the current candidate, 0 before the first.
    pub fn position(&self) -> usize {
        self.cursor.map_or(0, |i| i + 1)
    }

    pub fn has_next(&self) -> bool {
        self.position() < self.candidates.len()
    }

    /// Moves to the next candidate and returns it.
    pub fn advance(&mut self) -> Result<Entry> {
        if !self.has_next() {
            return Err(Error::NoNextCandidate);
        }
        let next = self.position();
        self.cursor = Some(next);
        Ok(self.candidates[next].clone())
    }

    pub fn current(&self) -> Option<&Entry> {
        self.cursor.map(|i| &self.candidates[i])
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    pub fn set_article(&mut self, article: Article) {
        self.article = Some(article);
    }

    /// True when both frames point at the same candidate list.
    pub fn shares_candidates(&self, other: &HistoryFrame) -> bool {
        Arc::ptr_eq(&self.candidates, &other.candidates)
    }
}

/// Stack of viewed frames. Once navigation has started one frame is the floor.
#[derive(Debug, Default)]
pub struct History {
    frames: Vec<HistoryFrame>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: HistoryFrame) {
        self.frames.push(frame);
    }

    /// Removes the tail frame. Never empties the stack.
    pub fn pop(&mut self) -> Result<HistoryFrame> {
        if self.frames.len() <= 1 {
            return Err(Error::EmptyHistory);
        }
        self.frames.pop().ok_or(Error::EmptyHistory)
    }

    pub fn top(&self) -> Result<&HistoryFrame> {
        self.frames.last().ok_or(Error::EmptyHistory)
    }

    pub fn top_article(&self) -> Result<&Article> {
        self.top()?.article().ok_or(Error::UnresolvedFrame)
    }

    /// Advances the tail frame's cursor in place.
    pub fn advance_top(&mut self) -> Result<Entry> {
        self.frames
            .last_mut()
            .ok_or(Error::EmptyHistory)?
            .advance()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.frames.last().is_some_and(HistoryFrame::has_next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(titles: &[&str]) -> Vec<Entry> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| Entry::new("v1", *t, i as u64))
            .collect()
    }

    fn resolved(title: &str) -> HistoryFrame {
        let mut frame = HistoryFrame::single(Entry::new("v1", title, 0));
        frame.advance().unwrap();
        frame.set_article(Article {
            volume_id: "v1".to_string(),
            title: title.to_string(),
            body: format!("<p>{title}</p>"),
            section: None,
            redirected_from_title: None,
        });
        frame
    }

    #[test]
    fn test_new_frame_starts_before_first() {
        let frame = HistoryFrame::new(entries(&["Dog", "Dogma"]));
        assert_eq!(frame.cursor(), None);
        assert_eq!(frame.position(), 0);
        assert!(frame.current().is_none());
        assert!(frame.has_next());
    }

    #[test]
    fn test_advance_walks_candidates_and_stops() {
        let mut frame = HistoryFrame::new(entries(&["Dog", "Dogma"]));
        assert_eq!(frame.advance().unwrap().title, "Dog");
        assert_eq!(frame.cursor(), Some(0));
        assert_eq!(frame.advance().unwrap().title, "Dogma");
        assert_eq!(frame.cursor(), Some(1));
        assert!(!frame.has_next());
        assert!(matches!(frame.advance(), Err(Error::NoNextCandidate)));
        // A rejected advance leaves the cursor in range.
        assert_eq!(frame.cursor(), Some(1));
    }

    #[test]
    fn test_empty_frame_has_no_next() {
        let mut frame = HistoryFrame::new(Vec::new());
        assert!(frame.is_empty());
        assert!(!frame.has_next());
        assert!(matches!(frame.advance(), Err(Error::NoNextCandidate)));
        assert_eq!(frame.cursor(), None);
    }

    #[test]
    fn test_snapshot_cursor_is_independent() {
        let original = HistoryFrame::new(entries(&["Dog", "Dogma", "Dogger"]));
        let mut copy = original.snapshot();
        copy.advance().unwrap();
        copy.advance().unwrap();
        assert_eq!(original.cursor(), None);
        assert_eq!(copy.cursor(), Some(1));
        assert!(copy.shares_candidates(&original));
    }

    #[test]
    fn test_with_section_leaves_original_article() {
        let frame = resolved("Cat");
        let jumped = frame.with_section(Some("Diet".to_string()));
        assert_eq!(jumped.article().unwrap().section.as_deref(), Some("Diet"));
        assert_eq!(frame.article().unwrap().section, None);
    }

    #[test]
    fn test_pop_keeps_one_frame() {
        let mut history = History::new();
        assert!(matches!(history.pop(), Err(Error::EmptyHistory)));
        history.push(resolved("Cat"));
        assert!(matches!(history.pop(), Err(Error::EmptyHistory)));
        assert_eq!(history.len(), 1);
        history.push(resolved("Dog"));
        assert_eq!(history.pop().unwrap().article().unwrap().title, "Dog");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_popping_never_touches_sibling_copy() {
        let mut history = History::new();
        let base = {
            let mut f = HistoryFrame::new(entries(&["Dog", "Dogma"]));
            f.advance().unwrap();
            f
        };
        let mut sibling = base.snapshot();
        history.push(base);
        history.push(sibling.clone());

        let mut popped = history.pop().unwrap();
        popped.advance().unwrap();
        sibling.advance().unwrap();

        assert_eq!(history.top().unwrap().cursor(), Some(0));
        assert!(history.can_go_next());
    }

    #[test]
    fn test_top_on_empty_history() {
        let history = History::new();
        assert!(matches!(history.top(), Err(Error::EmptyHistory)));
        assert!(matches!(history.top_article(), Err(Error::EmptyHistory)));
        assert!(!history.can_go_back());
        assert!(!history.can_go_next());
    }

    #[test]
    fn test_top_article_unresolved() {
        let mut history = History::new();
        history.push(HistoryFrame::single(Entry::new("v1", "Cat", 0)));
        assert!(matches!(history.top_article(), Err(Error::UnresolvedFrame)));
    }

    #[test]
    fn test_advance_top() {
        let mut history = History::new();
        history.push(HistoryFrame::new(entries(&["Dog", "Dogma"])));
        assert_eq!(history.advance_top().unwrap().title, "Dog");
        assert_eq!(history.advance_top().unwrap().title, "Dogma");
        assert!(matches!(history.advance_top(), Err(Error::NoNextCandidate)));
        assert!(!history.can_go_next());
    }
}
