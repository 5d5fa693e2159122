//! # Entries and Articles
//!
//! An [`Entry`] points at a headword inside one volume; an [`Article`] is what
//! the resolver hands back once every redirect has been followed.

/// Reference to one dictionary headword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub volume_id: String,
    pub title: String,
    pub article_offset: u64,
    /// In-article anchor to jump to once the article is shown.
    pub section: Option<String>,
}

impl Entry {
    pub fn new(volume_id: impl Into<String>, title: impl Into<String>, article_offset: u64) -> Self {
        Self {
            volume_id: volume_id.into(),
            title: title.into(),
            article_offset,
            section: None,
        }
    }

    pub fn with_section(mut self, section: Option<String>) -> Self {
        self.section = section;
        self
    }
}

/// Fully resolved, renderable article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub volume_id: String,
    pub title: String,
    pub body: String,
    pub section: Option<String>,
    /// Title the user asked for when one or more redirects were followed.
    pub redirected_from_title: Option<String>,
}

impl Article {
    /// Same volume and title. Section anchors are ignored, so two articles that
    /// differ only in where the view is scrolled count as the same page.
    pub fn same_page(&self, other: &Article) -> bool {
        self.volume_id == other.volume_id && self.title == other.title
    }

    /// The title shown to the user: the one they followed, not where it redirected.
    pub fn display_title(&self) -> &str {
        self.redirected_from_title.as_deref().unwrap_or(&self.title)
    }
}

/// Splits `Title#section` into its parts. An empty fragment counts as no section.
pub fn split_anchor(link: &str) -> (&str, Option<&str>) {
    match link.split_once('#') {
        Some((title, section)) if !section.is_empty() => (title, Some(section)),
        Some((title, _)) => (title, None),
        None => (link, None),
    }
}

/// Drops sections that are empty or whitespace-only.
pub fn non_blank(section: Option<&str>) -> Option<&str> {
    section.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(volume: &str, title: &str, section: Option<&str>) -> Article {
        Article {
            volume_id: volume.to_string(),
            title: title.to_string(),
            body: String::new(),
            section: section.map(str::to_string),
            redirected_from_title: None,
        }
    }

    #[test]
    fn test_same_page_ignores_section() {
        let a = article("v1", "T", Some("s1"));
        let b = article("v1", "T", Some("s2"));
        assert!(a.same_page(&b));
        assert!(a.same_page(&a));
    }

    #[test]
    fn test_same_page_differs_on_title_or_volume() {
        assert!(!article("v1", "T", None).same_page(&article("v1", "U", None)));
        assert!(!article("v1", "T", None).same_page(&article("v2", "T", None)));
    }

    #[test]
    fn test_display_title_prefers_redirect_source() {
        let mut a = article("v1", "Felis", None);
        assert_eq!(a.display_title(), "Felis");
        a.redirected_from_title = Some("Cat".to_string());
        assert_eq!(a.display_title(), "Cat");
    }

    #[test]
    fn test_split_anchor() {
        assert_eq!(split_anchor("Dog#Etymology"), ("Dog", Some("Etymology")));
        assert_eq!(split_anchor("Dog#"), ("Dog", None));
        assert_eq!(split_anchor("Dog"), ("Dog", None));
        assert_eq!(split_anchor("#History"), ("", Some("History")));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some("Usage")), Some("Usage"));
    }
}
