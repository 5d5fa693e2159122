//! Plain-text presenter for terminals.

use std::io::Write;

use log::{debug, warn};
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::core::{Article, Presenter};

/// Tags that end a paragraph when the article is flattened to text.
const BLOCK_TAGS: &[&str] = &["p", "br", "div", "li", "h1", "h2", "h3", "h4", "tr"];

pub struct TextPresenter<W: Write> {
    out: W,
    width: usize,
    loaded: bool,
    closed: bool,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W, width: usize) -> Self {
        Self {
            out,
            width,
            loaded: false,
            closed: false,
        }
    }

    /// True once after each full article render, standing in for a view's
    /// page-finished callback.
    pub fn take_loaded(&mut self) -> bool {
        std::mem::take(&mut self.loaded)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            warn!("Failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present_article(&mut self, article: &Article) {
        let text = html_to_text(&article.body);
        let wrapped = text
            .split("\n\n")
            .map(|para| textwrap::fill(para, self.width))
            .collect::<Vec<_>>()
            .join("\n\n");
        self.line("");
        self.line(&wrapped);
        self.line("");
        self.loaded = true;
    }

    fn present_anchor(&mut self, section: Option<&str>) {
        match section {
            Some(section) => self.line(&format!("§ {section}")),
            None => self.line("(top of article)"),
        }
    }

    fn title_changed(&mut self, title: &str) {
        self.line(&format!("== {title} =="));
    }

    fn progress(&mut self, value: u16) {
        debug!("Progress: {}", value);
    }

    fn message(&mut self, text: &str) {
        self.line(text);
    }

    fn error(&mut self, text: &str) {
        self.line(&format!("Error: {text}"));
    }

    fn open_external(&mut self, url: &str) {
        self.line(&format!("External link: {url}"));
    }

    fn close_session(&mut self) {
        self.closed = true;
    }
}

/// Flattens article markup into paragraphs separated by blank lines.
///
/// Bodies are HTML fragments, so unmatched end tags are tolerated and entities
/// resolve against the HTML5 table. Parsing stops at the first malformed tag;
/// text read up to that point is kept.
fn html_to_text(html: &str) -> String {
    let mut reader = Reader::from_str(html);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;
    reader.config_mut().allow_unmatched_ends = true;

    let mut text = String::with_capacity(html.len());
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => paragraph_break(&mut text, e.name().as_ref()),
            Ok(Event::End(e)) => paragraph_break(&mut text, e.name().as_ref()),
            Ok(Event::Text(e)) => match e.unescape_with(resolve_html5_entity) {
                Ok(decoded) => text.push_str(&decoded),
                Err(err) => {
                    debug!("Keeping undecodable text as is: {}", err);
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            },
            Ok(Event::CData(e)) => text.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "Malformed article markup at byte {}: {}",
                    reader.buffer_position(),
                    e
                );
                break;
            }
        }
    }

    text.split("\n\n")
        .map(|para| para.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|para| !para.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn paragraph_break(text: &mut String, name: &[u8]) {
    let name = name.to_ascii_lowercase();
    if BLOCK_TAGS.iter().any(|tag| tag.as_bytes() == name.as_slice()) {
        text.push_str("\n\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(body: &str) -> Article {
        Article {
            volume_id: "v1".to_string(),
            title: "Cat".to_string(),
            body: body.to_string(),
            section: None,
            redirected_from_title: None,
        }
    }

    fn output(presenter: TextPresenter<Vec<u8>>) -> String {
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn test_html_to_text_paragraphs() {
        assert_eq!(
            html_to_text("<h1>Cat</h1><p>Small  <b>carnivorous</b>\nmammal.</p><p>Tom &amp; Jerry</p>"),
            "Cat\n\nSmall carnivorous mammal.\n\nTom & Jerry"
        );
    }

    #[test]
    fn test_html_to_text_decodes_entities_once() {
        assert_eq!(
            html_to_text("<p>Write &amp;lt;b&amp;gt; for bold</p>"),
            "Write &lt;b&gt; for bold"
        );
        assert_eq!(html_to_text("<p>It&#39;s&nbsp;a&#x20;cat</p>"), "It's a cat");
    }

    #[test]
    fn test_html_to_text_tolerates_html_fragments() {
        assert_eq!(
            html_to_text("<P>One<BR>two</p><p>Tom & Jerry</div></li>"),
            "One\n\ntwo\n\nTom & Jerry"
        );
    }

    #[test]
    fn test_html_to_text_unclosed_tag_keeps_prefix() {
        assert_eq!(html_to_text("text <b"), "text");
    }

    #[test]
    fn test_present_article_wraps_and_marks_loaded() {
        let mut presenter = TextPresenter::new(Vec::new(), 20);
        presenter.present_article(&article(
            "<p>The cat is a small domesticated carnivorous mammal.</p>",
        ));
        assert!(presenter.take_loaded());
        assert!(!presenter.take_loaded());
        let out = output(presenter);
        assert!(out.lines().all(|l| l.len() <= 20));
        assert!(out.contains("domesticated"));
    }

    #[test]
    fn test_title_anchor_and_notices() {
        let mut presenter = TextPresenter::new(Vec::new(), 80);
        presenter.title_changed("Cat - Animals");
        presenter.present_anchor(Some("Diet"));
        presenter.present_anchor(None);
        presenter.error("boom");
        presenter.close_session();
        assert!(presenter.is_closed());
        assert_eq!(
            output(presenter),
            "== Cat - Animals ==\n§ Diet\n(top of article)\nError: boom\n"
        );
    }
}
