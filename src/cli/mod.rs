//! # Terminal Reader
//!
//! A line-oriented front end over [`Navigator`]. Reads commands from stdin,
//! waits for each navigation to finish, then renders the queued view events
//! with [`TextPresenter`].

pub mod command;
pub mod presenter;

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::core::config::ResolvedConfig;
use crate::core::present::drain;
use crate::core::{Navigator, ViewEvent};
use crate::volume::{JsonLibrary, VolumeProvider};

pub use command::Command;
pub use presenter::TextPresenter;

const WRAP_WIDTH: usize = 80;

/// Address reported for full renders; it never carries a fragment.
const RENDERED_URL: &str = "about:lexnav";

/// Applies pending events, acknowledging each full render back to the navigator
/// the way a page-load callback would.
pub fn settle<W: Write>(
    nav: &Navigator,
    events: &Receiver<ViewEvent>,
    presenter: &mut TextPresenter<W>,
) {
    loop {
        drain(events, presenter);
        if !presenter.take_loaded() {
            break;
        }
        nav.page_finished(RENDERED_URL);
    }
}

pub async fn run(config: ResolvedConfig, word: &str, section: Option<String>) -> io::Result<()> {
    let mut library = JsonLibrary::load_dir(&config.library_path).map_err(io::Error::other)?;
    if let Some(volume) = &config.preferred_volume {
        library = library.with_preferred(volume);
    }

    let Some(mut entry) = library.find_entry(word, config.preferred_volume.as_deref()) else {
        println!("No article found for {word:?}");
        return Ok(());
    };
    if section.is_some() {
        entry.section = section;
    }
    info!("Starting at {:?} in {}", entry.title, entry.volume_id);

    let (nav, events) = Navigator::new(
        Arc::new(library) as Arc<dyn VolumeProvider>,
        config.navigator,
    );
    let mut presenter = TextPresenter::new(io::stdout(), WRAP_WIDTH);

    nav.open(
        &entry.volume_id,
        &entry.title,
        entry.article_offset,
        entry.section.clone(),
    )
    .wait()
    .await;
    settle(&nav, &events, &mut presenter);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !presenter.is_closed() {
        prompt(&nav);
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            if !line.trim().is_empty() {
                println!("Unknown command, type \"help\" for a list");
            }
            continue;
        };

        if !execute(&nav, command, &mut io::stdout()).await? {
            break;
        }
        settle(&nav, &events, &mut presenter);
    }

    info!("Session ended with {} frame(s) in history", nav.history_len());
    Ok(())
}

/// Runs one reader command. Returns `false` when the session should end.
pub async fn execute<W: Write>(nav: &Navigator, command: Command, out: &mut W) -> io::Result<bool> {
    match command {
        Command::Back => return Ok(nav.go_back()),
        Command::Next => {
            if nav.can_go_next() {
                nav.go_to_next_candidate().wait().await;
            } else {
                writeln!(out, "No other matches")?;
            }
        }
        Command::Follow(link) => match nav.current_article() {
            Some(article) => nav.follow_link(&link, &article.volume_id).wait().await,
            None => warn!("Nothing to follow {:?} from", link),
        },
        Command::Anchor(section) => nav.page_finished(&format!("#{section}")),
        Command::Online => match nav.online_url() {
            Some(url) => writeln!(out, "{url}")?,
            None => writeln!(out, "This article has no online version")?,
        },
        Command::Help => writeln!(out, "{}", command::HELP)?,
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

fn prompt(nav: &Navigator) {
    let mut marks = String::new();
    if nav.can_go_back() {
        marks.push('<');
    }
    if nav.can_go_next() {
        marks.push('>');
    }
    print!("{marks}> ");
    let _ = io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NavigatorConfig;
    use crate::test_support::{ScriptedVolumes, body, drain_events};

    async fn at_cat(volumes: ScriptedVolumes) -> (Navigator, Receiver<ViewEvent>) {
        let cat = volumes.entry("Cat");
        let (nav, events) = Navigator::new(Arc::new(volumes), NavigatorConfig::default());
        nav.start_lookup(vec![cat]).wait().await;
        drain_events(&events);
        (nav, events)
    }

    #[tokio::test]
    async fn test_next_without_candidates_does_not_navigate() {
        let (nav, events) = at_cat(ScriptedVolumes::new("v1").with(body("Cat", "<p>Meow</p>"))).await;
        let mut out = Vec::new();

        assert!(execute(&nav, Command::Next, &mut out).await.unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "No other matches\n");
        assert!(drain_events(&events).is_empty());
        assert_eq!(nav.history_len(), 1);
    }

    #[tokio::test]
    async fn test_next_with_candidates_navigates() {
        let volumes = ScriptedVolumes::new("v1")
            .with(body("Cat", "<p>Meow</p>"))
            .with(body("Dog", "<p>Woof</p>"))
            .with(body("Dogma", "<p>Belief</p>"))
            .with_links("dog", &["Dog", "Dogma"]);
        let (nav, events) = at_cat(volumes).await;
        let mut out = Vec::new();

        execute(&nav, Command::Follow("dog".to_string()), &mut out).await.unwrap();
        execute(&nav, Command::Next, &mut out).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(nav.current_article().unwrap().title, "Dogma");
        assert_eq!(nav.history_len(), 3);
        assert!(!drain_events(&events).is_empty());
    }

    #[tokio::test]
    async fn test_back_and_quit_end_session() {
        let (nav, _events) = at_cat(ScriptedVolumes::new("v1").with(body("Cat", "<p>Meow</p>"))).await;
        let mut out = Vec::new();
        assert!(!execute(&nav, Command::Back, &mut out).await.unwrap());
        assert!(!execute(&nav, Command::Quit, &mut out).await.unwrap());
        assert!(execute(&nav, Command::Online, &mut out).await.unwrap());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "This article has no online version\n"
        );
    }
}
