//! # Presentation Boundary
//!
//! Background resolution never touches the view. It queues [`ViewEvent`]s on a
//! channel; the presentation thread drains them in order and applies each one
//! to its [`Presenter`].
//!
//! ```text
//! Navigator task ──ViewEvent──▶ mpsc ──drain()──▶ Presenter (single thread)
//! ```

use std::sync::mpsc::Receiver;

use crate::core::model::Article;

/// Resolution has started.
pub const PROGRESS_STARTED: u16 = 500;
/// A full document load is starting; the view reports its own progress above this.
pub const PROGRESS_LOADING: u16 = 5000;
pub const PROGRESS_DONE: u16 = 10000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Reload the document with this article.
    PresentArticle(Article),
    /// Scroll to a section without reloading. `None` means the top of the page.
    PresentAnchor(Option<String>),
    TitleChanged(String),
    Progress(u16),
    /// Expected condition worth telling the user about (not found, redirect loop).
    Message(String),
    /// Unexpected backend failure.
    Error(String),
    /// Link leads outside the dictionary.
    OpenExternal(String),
    /// Nothing left to show; the host should end the reading session.
    CloseSession,
}

/// The host view. Every call happens on the thread that drains the channel.
pub trait Presenter {
    fn present_article(&mut self, article: &Article);
    fn present_anchor(&mut self, section: Option<&str>);
    fn title_changed(&mut self, title: &str);
    fn progress(&mut self, value: u16);
    fn message(&mut self, text: &str);
    fn error(&mut self, text: &str);

    fn open_external(&mut self, _url: &str) {}

    fn close_session(&mut self) {}
}

impl ViewEvent {
    pub fn apply(&self, presenter: &mut dyn Presenter) {
        match self {
            ViewEvent::PresentArticle(article) => presenter.present_article(article),
            ViewEvent::PresentAnchor(section) => presenter.present_anchor(section.as_deref()),
            ViewEvent::TitleChanged(title) => presenter.title_changed(title),
            ViewEvent::Progress(value) => presenter.progress(*value),
            ViewEvent::Message(text) => presenter.message(text),
            ViewEvent::Error(text) => presenter.error(text),
            ViewEvent::OpenExternal(url) => presenter.open_external(url),
            ViewEvent::CloseSession => presenter.close_session(),
        }
    }
}

/// Applies every event queued so far, in order. Returns how many were applied.
pub fn drain(events: &Receiver<ViewEvent>, presenter: &mut dyn Presenter) -> usize {
    let mut applied = 0;
    while let Ok(event) = events.try_recv() {
        event.apply(presenter);
        applied += 1;
    }
    applied
}
