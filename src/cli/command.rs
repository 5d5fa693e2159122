/// Reader commands typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Back,
    Next,
    /// Follow link text as if it was clicked in the current article.
    Follow(String),
    /// Jump to a section of the current article.
    Anchor(String),
    Online,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if let Some(section) = line.strip_prefix('#') {
            return Some(Command::Anchor(section.trim().to_string()));
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match (word, rest) {
            ("b" | "back", "") => Some(Command::Back),
            ("n" | "next", "") => Some(Command::Next),
            ("f" | "follow", link) if !link.is_empty() => Some(Command::Follow(link.to_string())),
            ("o" | "online", "") => Some(Command::Online),
            ("h" | "help" | "?", "") => Some(Command::Help),
            ("q" | "quit", "") => Some(Command::Quit),
            _ => None,
        }
    }
}

pub const HELP: &str = "\
Commands:
  back, b            go back one article
  next, n            show the next matching article
  follow, f <link>   follow a link from the current article
  #<section>         jump to a section
  online, o          print the article's web address
  quit, q            exit";
