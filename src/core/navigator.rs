//! # Navigation Controller
//!
//! Owns the history stack and runs at most one resolution at a time.
//!
//! ```text
//!            start_lookup / follow_link / go_to_next_candidate
//!   Idle ────────────────────────────────────────────────────▶ Resolving
//!    ▲                                                            │
//!    └──────── article presented, or failure reported ────────────┘
//! ```
//!
//! Requests that arrive while `Resolving` are dropped, not queued. An in-flight
//! resolution is never cancelled; it runs to success or failure. There is no
//! timeout, so a backend call that never returns keeps the navigator busy.
//!
//! Every user-visible effect goes out as a [`ViewEvent`] on the channel returned
//! by [`Navigator::new`]. Events are queued while the history lock is held, so
//! the view always sees them in the same order the stack changed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use tokio::task::JoinHandle;

use crate::core::follower::{DEFAULT_MAX_LINK_CANDIDATES, LinkFollower, LinkTarget};
use crate::core::history::{History, HistoryFrame};
use crate::core::model::{Article, Entry, non_blank, split_anchor};
use crate::core::present::{PROGRESS_DONE, PROGRESS_LOADING, PROGRESS_STARTED, ViewEvent};
use crate::core::resolver::{DEFAULT_MAX_REDIRECTS, Resolver};
use crate::error::Error;
use crate::volume::VolumeProvider;

/// Navigation limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorConfig {
    /// Link-follow candidates collected before the rest of the stream is dropped.
    pub max_link_candidates: usize,
    /// Redirect hops followed before reporting a chain as too long.
    pub max_redirects: usize,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            max_link_candidates: DEFAULT_MAX_LINK_CANDIDATES,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    Resolving,
}

/// What happened to a navigation request.
#[must_use]
#[derive(Debug)]
pub enum Dispatch {
    /// A resolution task is running; await the handle to see it finish.
    Started(JoinHandle<()>),
    /// Another resolution is in flight and this request was dropped.
    Busy,
    /// Handled synchronously or nothing to do.
    Skipped,
}

impl Dispatch {
    pub fn is_started(&self) -> bool {
        matches!(self, Dispatch::Started(_))
    }

    /// Waits for the spawned resolution, if any, to finish reporting.
    pub async fn wait(self) {
        if let Dispatch::Started(handle) = self
            && let Err(e) = handle.await
        {
            error!("Resolution task failed: {}", e);
        }
    }
}

/// User-facing outcome of a failed navigation.
enum Notice {
    Message(String),
    Error(String),
}

struct Shared {
    volumes: Arc<dyn VolumeProvider>,
    resolver: Resolver,
    follower: LinkFollower,
    history: Mutex<History>,
    resolving: AtomicBool,
    events: Sender<ViewEvent>,
}

/// Holds the single resolution slot. Releasing happens on drop, so a panicking
/// task still returns the navigator to `Idle`.
struct Flight {
    shared: Arc<Shared>,
}

impl Drop for Flight {
    fn drop(&mut self) {
        self.shared.resolving.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct Navigator {
    shared: Arc<Shared>,
}

impl Navigator {
    /// Creates a navigator and the receiving end of its view events.
    ///
    /// Navigation methods spawn onto the current tokio runtime.
    pub fn new(
        volumes: Arc<dyn VolumeProvider>,
        config: NavigatorConfig,
    ) -> (Self, Receiver<ViewEvent>) {
        let (events, rx) = mpsc::channel();
        info!(
            "Navigator using {} volumes (candidates={}, redirects={})",
            volumes.name(),
            config.max_link_candidates,
            config.max_redirects
        );
        let shared = Shared {
            resolver: Resolver::new(volumes.clone(), config.max_redirects),
            follower: LinkFollower::new(volumes.clone(), config.max_link_candidates),
            volumes,
            history: Mutex::new(History::new()),
            resolving: AtomicBool::new(false),
            events,
        };
        (
            Self {
                shared: Arc::new(shared),
            },
            rx,
        )
    }

    pub fn state(&self) -> NavState {
        if self.shared.resolving.load(Ordering::Acquire) {
            NavState::Resolving
        } else {
            NavState::Idle
        }
    }

    /// Opens a headword by volume and article offset, the usual way a session starts.
    pub fn open(
        &self,
        volume_id: &str,
        title: &str,
        article_offset: u64,
        section: Option<String>,
    ) -> Dispatch {
        info!(
            "Opening {:?} (volume={}, offset={}, section={:?})",
            title, volume_id, article_offset, section
        );
        if self.shared.volumes.volume(volume_id).is_none() {
            self.shared
                .report(Notice::Error(format!("Dictionary {volume_id} not found")));
            return Dispatch::Skipped;
        }
        let entry = Entry::new(volume_id, title, article_offset).with_section(section);
        self.start_lookup(vec![entry])
    }

    /// Shows the first of `entries`; the rest stay reachable with
    /// [`go_to_next_candidate`](Self::go_to_next_candidate).
    pub fn start_lookup(&self, entries: Vec<Entry>) -> Dispatch {
        if entries.is_empty() {
            warn!("start_lookup called with no entries");
            return Dispatch::Skipped;
        }
        self.show_next(HistoryFrame::new(entries))
    }

    /// Follows a link clicked inside an article from `source_volume_id`.
    pub fn follow_link(&self, url: &str, source_volume_id: &str) -> Dispatch {
        let link = match LinkTarget::classify(url) {
            LinkTarget::External(url) => {
                info!("Opening external link {}", url);
                self.shared.emit(ViewEvent::OpenExternal(url));
                return Dispatch::Skipped;
            }
            LinkTarget::Internal(link) => link,
        };
        let Some(flight) = self.shared.begin() else {
            debug!("Busy, ignoring link {:?}", link);
            return Dispatch::Busy;
        };
        info!("Following link {:?} from {}", link, source_volume_id);

        let shared = self.shared.clone();
        let source = source_volume_id.to_string();
        Dispatch::Started(tokio::spawn(async move {
            let _flight = flight;
            let candidates = match shared.follower.follow(&link, &source).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    error!("Failed to follow link {:?}: {}", link, e);
                    shared.report(follow_notice(&link, &e));
                    return;
                }
            };
            if candidates.is_empty() {
                shared.report(follow_notice(&link, &Error::EntryNotFound(link.clone())));
                return;
            }
            if let Some((frame, entry)) = shared.prepare(HistoryFrame::new(candidates)) {
                shared.resolve_and_present(frame, entry).await;
            }
        }))
    }

    /// Steps back one frame.
    ///
    /// Returns `true` when back was handled, including while a resolution is in
    /// flight (the press is swallowed). Returns `false` when there is nothing to
    /// go back to and the host should end the session.
    pub fn go_back(&self) -> bool {
        let Some(_flight) = self.shared.begin() else {
            debug!("Busy, ignoring back");
            return true;
        };
        let mut history = self.shared.history();
        if !history.can_go_back() {
            return false;
        }
        let popped = match history.pop() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Back failed: {}", e);
                return false;
            }
        };
        let Ok(current) = history.top_article() else {
            warn!("Frame below the top has no article");
            return true;
        };

        let same_page = popped.article().is_some_and(|a| a.same_page(current));
        debug!(
            "Back to {:?} (same page: {}, depth {})",
            current.title,
            same_page,
            history.len()
        );
        if same_page {
            let section = current.section.clone();
            self.shared.emit_title(&history);
            self.shared.emit(ViewEvent::PresentAnchor(section));
        } else {
            let article = current.clone();
            self.shared.emit(ViewEvent::Progress(PROGRESS_LOADING));
            self.shared.emit_title(&history);
            self.shared.emit(ViewEvent::PresentArticle(article));
        }
        true
    }

    /// Shows the next disambiguation candidate of the current frame as a new
    /// history entry, so back returns to the previous candidate.
    pub fn go_to_next_candidate(&self) -> Dispatch {
        let frame = {
            let history = self.shared.history();
            match history.top() {
                Ok(top) if top.has_next() => top.snapshot(),
                _ => return Dispatch::Skipped,
            }
        };
        self.show_next(frame)
    }

    /// Called by the view after a document load or an in-page anchor jump.
    ///
    /// A `#section` in `url` records the jump as its own history entry, so back
    /// returns to where the reader was. Otherwise the current article's own
    /// section, if any, is scrolled into view.
    pub fn page_finished(&self, url: &str) {
        let mut history = self.shared.history();
        let section = if url.contains('#') {
            let section = split_anchor(url).1.map(str::to_string);
            let jumped = history.top().ok().map(|top| top.with_section(section.clone()));
            if let Some(frame) = jumped {
                history.push(frame);
            }
            section
        } else {
            history.top_article().ok().and_then(|a| a.section.clone())
        };
        if let Some(section) = non_blank(section.as_deref()) {
            self.shared
                .emit(ViewEvent::PresentAnchor(Some(section.to_string())));
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.shared.history().can_go_back()
    }

    pub fn can_go_next(&self) -> bool {
        self.shared.history().can_go_next()
    }

    pub fn current_article(&self) -> Option<Article> {
        self.shared.history().top_article().ok().cloned()
    }

    pub fn history_len(&self) -> usize {
        self.shared.history().len()
    }

    /// Web address of the current article, when its volume publishes one.
    pub fn online_url(&self) -> Option<String> {
        let article = self.current_article()?;
        self.shared
            .volumes
            .volume(&article.volume_id)?
            .article_url(&article.title)
    }

    pub fn can_view_online(&self) -> bool {
        self.online_url().is_some()
    }

    fn show_next(&self, frame: HistoryFrame) -> Dispatch {
        let Some(flight) = self.shared.begin() else {
            debug!("Busy, ignoring navigation request");
            return Dispatch::Busy;
        };
        let Some((frame, entry)) = self.shared.prepare(frame) else {
            return Dispatch::Skipped;
        };
        let shared = self.shared.clone();
        Dispatch::Started(tokio::spawn(async move {
            let _flight = flight;
            shared.resolve_and_present(frame, entry).await;
        }))
    }
}

impl Shared {
    fn history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(self: &Arc<Self>) -> Option<Flight> {
        self.resolving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Flight {
                shared: self.clone(),
            })
    }

    fn emit(&self, event: ViewEvent) {
        if self.events.send(event).is_err() {
            warn!("Failed to send view event: receiver dropped");
        }
    }

    fn emit_title(&self, history: &History) {
        if let Ok(top) = history.top()
            && let Some(title) = frame_title(top, |id| self.volumes.display_title(id))
        {
            self.emit(ViewEvent::TitleChanged(title));
        }
    }

    /// Copies `frame`, advances the copy, and announces the entry being loaded.
    fn prepare(&self, frame: HistoryFrame) -> Option<(HistoryFrame, Entry)> {
        let mut frame = frame.snapshot();
        let entry = match frame.advance() {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Nothing to show: {}", e);
                return None;
            }
        };
        let volume_title = self.volumes.display_title(&entry.volume_id);
        self.emit(ViewEvent::TitleChanged(format_title(&entry.title, &volume_title)));
        self.emit(ViewEvent::Progress(PROGRESS_STARTED));
        Some((frame, entry))
    }

    async fn resolve_and_present(&self, mut frame: HistoryFrame, entry: Entry) {
        debug!(
            "Resolving {:?} in {} (candidate {}/{})",
            entry.title,
            entry.volume_id,
            frame.position(),
            frame.len()
        );
        let article = match self.resolver.resolve(&entry).await {
            Ok(article) => article,
            Err(e) => {
                self.report(resolve_notice(&entry, &e));
                return;
            }
        };
        frame.set_article(article.clone());

        let mut history = self.history();
        let same_page = history
            .top_article()
            .is_ok_and(|current| current.same_page(&article));
        history.push(frame);
        info!(
            "Showing {:?} from {} (same page: {}, depth {})",
            article.title,
            article.volume_id,
            same_page,
            history.len()
        );

        if same_page {
            self.emit_title(&history);
            self.emit(ViewEvent::PresentAnchor(article.section));
            self.emit(ViewEvent::Progress(PROGRESS_DONE));
        } else {
            self.emit(ViewEvent::Progress(PROGRESS_LOADING));
            self.emit_title(&history);
            self.emit(ViewEvent::PresentArticle(article));
        }
    }

    /// Reports a failed navigation exactly once. The stack is left as it was.
    fn report(&self, notice: Notice) {
        let history = self.history();
        self.emit(ViewEvent::Progress(PROGRESS_DONE));
        self.emit_title(&history);
        match notice {
            Notice::Message(text) => {
                info!("{}", text);
                self.emit(ViewEvent::Message(text));
            }
            Notice::Error(text) => {
                warn!("{}", text);
                self.emit(ViewEvent::Error(text));
            }
        }
        if history.is_empty() {
            self.emit(ViewEvent::CloseSession);
        }
    }
}

fn resolve_notice(entry: &Entry, err: &Error) -> Notice {
    match err {
        Error::RedirectTargetNotFound(target) => {
            Notice::Message(format!("Redirect \"{target}\" not found"))
        }
        Error::RedirectChainTooLong(target) => {
            Notice::Message(format!("Too many redirects for \"{target}\""))
        }
        other => {
            error!("Failed to load {:?}: {}", entry.title, other);
            Notice::Error(format!(
                "There was an error loading article \"{}\"",
                entry.title
            ))
        }
    }
}

fn follow_notice(link: &str, err: &Error) -> Notice {
    match err {
        Error::EntryNotFound(_) => Notice::Message(format!("Article \"{link}\" not found")),
        Error::Backend(cause) => Notice::Error(format!(
            "There was an error following link \"{link}\": {cause}"
        )),
        other => Notice::Error(format!(
            "There was an error following link \"{link}\": {other}"
        )),
    }
}

/// `"<article> - <volume>"`.
pub fn format_title(article_title: &str, volume_title: &str) -> String {
    format!("{article_title} - {volume_title}")
}

/// Title for a resolved frame, prefixed with `pos/count` when it holds
/// several candidates. `None` while the frame has no article.
pub fn frame_title(frame: &HistoryFrame, volume_title: impl Fn(&str) -> String) -> Option<String> {
    let article = frame.article()?;
    let mut title = String::new();
    if frame.len() > 1 {
        title.push_str(&format!("{}/{} ", frame.position(), frame.len()));
    }
    title.push_str(article.display_title());
    Some(format_title(&title, &volume_title(&article.volume_id)))
}
