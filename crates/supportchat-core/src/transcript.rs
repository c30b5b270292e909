//! The message list model. UI-agnostic: the TUI turns entries into styled
//! lines each frame. Everything that came over the network is sanitized
//! here, before it is ever stored.

use std::time::{Duration, Instant};

use crate::api::Source;

/// Error entries dismiss themselves after this long, user action or not.
pub const ERROR_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Human,
    Assistant,
}

#[derive(Debug, Clone)]
pub enum Entry {
    Message {
        role: Role,
        content: String,
        /// Validated http/https URLs only.
        sources: Vec<String>,
    },
    Error {
        text: String,
        expires_at: Instant,
    },
}

#[derive(Debug)]
pub struct Transcript {
    entries: Vec<Entry>,
    /// At most one typing indicator exists; it is a flag, not an entry, so
    /// duplicates are impossible by construction.
    typing: bool,
    /// The one-time welcome placeholder, cleared by the first message.
    welcome: bool,
    /// Set on every append; the view consumes it and jumps to the end.
    follow: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            typing: false,
            welcome: true,
            follow: false,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn push_message(&mut self, role: Role, content: &str, sources: &[Source]) {
        self.welcome = false;
        let sources = sources
            .iter()
            .map(|s| s.url.trim())
            .filter(|u| is_safe_url(u))
            .map(|u| u.to_string())
            .collect();
        self.entries.push(Entry::Message {
            role,
            content: sanitize(content),
            sources,
        });
        self.follow = true;
    }

    pub fn push_error(&mut self, text: &str, now: Instant) {
        self.entries.push(Entry::Error {
            text: text.to_string(),
            expires_at: now + ERROR_TTL,
        });
        self.follow = true;
    }

    pub fn show_typing(&mut self) {
        self.typing = true;
        self.follow = true;
    }

    pub fn clear_typing(&mut self) {
        self.typing = false;
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn shows_welcome(&self) -> bool {
        self.welcome
    }

    /// Drop error entries whose 5-second lifetime has elapsed. Driven by
    /// the host's tick.
    pub fn prune_expired(&mut self, now: Instant) {
        self.entries.retain(|entry| match entry {
            Entry::Error { expires_at, .. } => *expires_at > now,
            _ => true,
        });
    }

    pub fn take_follow(&mut self) -> bool {
        std::mem::take(&mut self.follow)
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip terminal control characters from untrusted text. Markup-significant
/// characters stay as-is: entries are rendered as literal text, never
/// interpreted, so `<script>` displays exactly as typed. Escape sequences
/// are the injection vector in a terminal and are removed.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| *c == '\n' || *c == '\t' || !c.is_control())
        .collect()
}

/// Only plain http/https URLs may be shown as source links.
pub fn is_safe_url(url: &str) -> bool {
    (url.starts_with("http://") || url.starts_with("https://"))
        && !url.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(url: &str) -> Source {
        Source {
            url: url.to_string(),
        }
    }

    #[test]
    fn test_markup_renders_as_literal_text() {
        let mut t = Transcript::new();
        t.push_message(Role::Assistant, "<script>alert(1)</script>", &[]);
        match &t.entries()[0] {
            Entry::Message { content, .. } => {
                assert_eq!(content, "<script>alert(1)</script>");
            }
            _ => panic!("expected message entry"),
        }
    }

    #[test]
    fn test_control_sequences_stripped() {
        let mut t = Transcript::new();
        t.push_message(Role::Assistant, "hi\x1b[31m there\r\nok", &[]);
        match &t.entries()[0] {
            Entry::Message { content, .. } => {
                assert_eq!(content, "hi[31m there\nok");
            }
            _ => panic!("expected message entry"),
        }
    }

    #[test]
    fn test_welcome_cleared_by_first_message_only() {
        let mut t = Transcript::new();
        assert!(t.shows_welcome());
        t.push_error("oops", Instant::now());
        assert!(t.shows_welcome());
        t.push_message(Role::Human, "hello", &[]);
        assert!(!t.shows_welcome());
    }

    #[test]
    fn test_single_typing_indicator() {
        let mut t = Transcript::new();
        t.show_typing();
        t.show_typing();
        assert!(t.is_typing());
        t.clear_typing();
        assert!(!t.is_typing());
    }

    #[test]
    fn test_unsafe_source_urls_dropped() {
        let mut t = Transcript::new();
        t.push_message(
            Role::Assistant,
            "see docs",
            &[
                src("https://docs.example.com/a"),
                src("javascript:alert(1)"),
                src("ftp://example.com"),
                src("  http://example.com/b  "),
                src(""),
            ],
        );
        match &t.entries()[0] {
            Entry::Message { sources, .. } => {
                assert_eq!(
                    sources,
                    &["https://docs.example.com/a", "http://example.com/b"]
                );
            }
            _ => panic!("expected message entry"),
        }
    }

    #[test]
    fn test_error_expires_after_exactly_five_seconds() {
        let mut t = Transcript::new();
        let now = Instant::now();
        t.push_error("send failed", now);

        t.prune_expired(now + Duration::from_millis(4_999));
        assert_eq!(t.entries().len(), 1);

        t.prune_expired(now + Duration::from_secs(5));
        assert!(t.entries().is_empty());
    }

    #[test]
    fn test_messages_survive_pruning() {
        let mut t = Transcript::new();
        let now = Instant::now();
        t.push_message(Role::Human, "hello", &[]);
        t.push_error("send failed", now);
        t.prune_expired(now + Duration::from_secs(6));
        assert_eq!(t.entries().len(), 1);
    }

    #[test]
    fn test_follow_set_on_append() {
        let mut t = Transcript::new();
        assert!(!t.take_follow());
        t.push_message(Role::Human, "hi", &[]);
        assert!(t.take_follow());
        assert!(!t.take_follow());
    }
}
