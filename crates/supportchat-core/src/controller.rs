use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::api::{ChatReply, HistoryMessage, WidgetConfig};
use crate::error::WidgetError;
use crate::session::SessionStore;
use crate::state::WidgetState;
use crate::transcript::{Role, Transcript};

/// What the user sees when a send fails. The real cause goes to the log.
pub const SEND_ERROR_TEXT: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
}

/// An accepted submit, ready to go on the wire. The controller has already
/// rendered the optimistic human message and moved to `Sending` by the time
/// the caller sees one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub tenant_id: Option<i64>,
    pub session_id: Option<i64>,
    pub message: String,
}

/// The send/receive state machine. Owns the widget state and transcript;
/// all mutation happens through its operations.
///
/// Single-flight: `submit` while `Sending` is silently dropped, and both
/// `complete` and `fail` unconditionally return to `Idle`, so one finished
/// request can never leave the widget stuck disabled.
pub struct ChatController {
    state: WidgetState,
    transcript: Transcript,
    store: SessionStore,
    phase: Phase,
}

impl ChatController {
    pub fn new(store: SessionStore) -> Self {
        Self {
            state: WidgetState::default(),
            transcript: Transcript::new(),
            store,
            phase: Phase::Idle,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_sending(&self) -> bool {
        self.phase == Phase::Sending
    }

    pub fn apply_config(&mut self, config: WidgetConfig) {
        info!(tenant_id = config.tenant_id, "widget config loaded");
        self.state.set_branding(
            config.tenant_id,
            config.chatbot_name,
            config.colors,
            config.company_name,
        );
    }

    pub fn restore_session(&mut self) {
        if let Some(id) = self.store.restore() {
            debug!(session_id = id, "restored stored session");
            self.state.set_session(id);
        }
    }

    /// Replay prior messages of a restored session, in their stored order.
    pub fn replay_history(&mut self, messages: Vec<HistoryMessage>) {
        for message in messages {
            let role = match message.role.as_str() {
                "human" => Role::Human,
                // the server writes "ai"; accept "assistant" too
                _ => Role::Assistant,
            };
            let sources = message.meta.map(|m| m.sources).unwrap_or_default();
            self.transcript
                .push_message(role, &message.content, &sources);
        }
    }

    pub fn open(&mut self) {
        self.state.set_open(true);
    }

    pub fn close(&mut self) {
        self.state.set_open(false);
    }

    pub fn toggle(&mut self) {
        self.state.set_open(!self.state.is_open());
    }

    /// `Idle --submit--> Sending`. Returns `None` (a no-op) for input that
    /// is empty after trimming, and for any submit while already `Sending`.
    pub fn submit(&mut self, input: &str) -> Option<OutboundMessage> {
        let text = input.trim();
        if text.is_empty() || self.phase == Phase::Sending {
            return None;
        }

        self.transcript.push_message(Role::Human, text, &[]);
        self.transcript.show_typing();
        self.phase = Phase::Sending;
        self.state.set_loading(true);

        Some(OutboundMessage {
            tenant_id: self.state.tenant_id(),
            session_id: self.state.session_id(),
            message: text.to_string(),
        })
    }

    /// `Sending --response ok--> Idle`. Adopts and persists the session id
    /// on its first-ever assignment; later replies never write the store
    /// again.
    pub fn complete(&mut self, reply: ChatReply) {
        if self.state.session_id().is_none() {
            self.state.set_session(reply.session_id);
            match self.store.persist(reply.session_id) {
                Ok(()) => info!(session_id = reply.session_id, "session adopted"),
                Err(err) => warn!(error = %err, "could not persist session id"),
            }
        }

        self.transcript.clear_typing();
        self.transcript
            .push_message(Role::Assistant, &reply.content, &reply.sources);
        self.finish();
    }

    /// `Sending --response failed--> Idle`. The user sees the fixed generic
    /// message; the cause is logged.
    pub fn fail(&mut self, err: &WidgetError, now: Instant) {
        error!(error = %err, "message send failed");
        self.transcript.clear_typing();
        self.transcript.push_error(SEND_ERROR_TEXT, now);
        self.finish();
    }

    // Both outcomes land here, so Sending is always cleared.
    fn finish(&mut self) {
        self.phase = Phase::Idle;
        self.state.set_loading(false);
    }

    pub fn tick(&mut self, now: Instant) {
        self.transcript.prune_expired(now);
    }

    pub fn take_follow(&mut self) -> bool {
        self.transcript.take_follow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MessageMeta, Source};
    use crate::transcript::Entry;
    use std::time::Duration;
    use tempfile::TempDir;

    fn controller(dir: &TempDir) -> ChatController {
        ChatController::new(SessionStore::at(dir.path().join("session")))
    }

    fn reply(session_id: i64, content: &str) -> ChatReply {
        ChatReply {
            session_id,
            content: content.to_string(),
            sources: Vec::new(),
        }
    }

    fn message_contents(c: &ChatController) -> Vec<(Role, String)> {
        c.transcript()
            .entries()
            .iter()
            .filter_map(|e| match e {
                Entry::Message { role, content, .. } => Some((*role, content.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_submit_trims_and_rejects_empty() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);
        assert!(c.submit("").is_none());
        assert!(c.submit("   \n\t ").is_none());
        assert_eq!(c.phase(), Phase::Idle);
        assert!(c.transcript().entries().is_empty());
    }

    #[test]
    fn test_submit_renders_optimistically_and_enters_sending() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);

        let out = c.submit("  Hello  ").unwrap();
        assert_eq!(out.message, "Hello");
        assert_eq!(out.session_id, None);
        assert_eq!(out.tenant_id, None);

        assert_eq!(c.phase(), Phase::Sending);
        assert!(c.state().is_loading());
        assert!(c.transcript().is_typing());
        assert_eq!(
            message_contents(&c),
            vec![(Role::Human, "Hello".to_string())]
        );
    }

    #[test]
    fn test_second_submit_while_sending_is_dropped() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);

        assert!(c.submit("first").is_some());
        assert!(c.submit("second").is_none());

        // Only one human bubble exists
        assert_eq!(message_contents(&c).len(), 1);
    }

    #[test]
    fn test_fresh_send_adopts_and_persists_session() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);

        c.submit("Hello").unwrap();
        c.complete(reply(42, "Hi there"));

        assert_eq!(c.phase(), Phase::Idle);
        assert!(!c.state().is_loading());
        assert!(!c.transcript().is_typing());
        assert_eq!(c.state().session_id(), Some(42));
        assert_eq!(
            message_contents(&c),
            vec![
                (Role::Human, "Hello".to_string()),
                (Role::Assistant, "Hi there".to_string()),
            ]
        );

        let store = SessionStore::at(dir.path().join("session"));
        assert_eq!(store.restore(), Some(42));
    }

    #[test]
    fn test_session_persisted_only_on_first_assignment() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);

        c.submit("one").unwrap();
        c.complete(reply(42, "a"));
        c.submit("two").unwrap();
        c.complete(reply(99, "b"));

        // The first-known id wins; the store is never rewritten
        assert_eq!(c.state().session_id(), Some(42));
        let store = SessionStore::at(dir.path().join("session"));
        assert_eq!(store.restore(), Some(42));
    }

    #[test]
    fn test_failed_send_shows_error_and_reenables() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);
        let now = Instant::now();

        c.submit("Hello").unwrap();
        c.fail(&WidgetError::SendInterrupted, now);

        assert_eq!(c.phase(), Phase::Idle);
        assert!(!c.state().is_loading());
        assert!(!c.transcript().is_typing());

        // One human bubble, no assistant bubble, one error entry
        assert_eq!(message_contents(&c).len(), 1);
        let errors: Vec<_> = c
            .transcript()
            .entries()
            .iter()
            .filter(|e| matches!(e, Entry::Error { .. }))
            .collect();
        assert_eq!(errors.len(), 1);
        match errors[0] {
            Entry::Error { text, .. } => assert_eq!(text, SEND_ERROR_TEXT),
            _ => unreachable!(),
        }

        // Error self-removes on the 5 second tick
        c.tick(now + Duration::from_secs(5));
        assert_eq!(c.transcript().entries().len(), 1);
    }

    #[test]
    fn test_submit_possible_again_after_failure() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);

        c.submit("Hello").unwrap();
        c.fail(&WidgetError::SendInterrupted, Instant::now());
        assert!(c.submit("Hello again").is_some());
    }

    #[test]
    fn test_restored_session_rides_along_on_sends() {
        let dir = TempDir::new().unwrap();
        SessionStore::at(dir.path().join("session"))
            .persist(7)
            .unwrap();

        let mut c = controller(&dir);
        c.restore_session();
        assert_eq!(c.state().session_id(), Some(7));

        let out = c.submit("hi").unwrap();
        assert_eq!(out.session_id, Some(7));
    }

    #[test]
    fn test_replay_history_keeps_order_and_maps_roles() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);

        c.replay_history(vec![
            HistoryMessage {
                role: "human".to_string(),
                content: "hello".to_string(),
                meta: None,
            },
            HistoryMessage {
                role: "ai".to_string(),
                content: "hi".to_string(),
                meta: Some(MessageMeta {
                    sources: vec![Source {
                        url: "https://docs.example.com".to_string(),
                    }],
                }),
            },
            HistoryMessage {
                role: "assistant".to_string(),
                content: "anything else?".to_string(),
                meta: None,
            },
        ]);

        assert!(!c.transcript().shows_welcome());
        assert_eq!(
            message_contents(&c),
            vec![
                (Role::Human, "hello".to_string()),
                (Role::Assistant, "hi".to_string()),
                (Role::Assistant, "anything else?".to_string()),
            ]
        );
    }

    #[test]
    fn test_apply_config_populates_branding() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);

        c.apply_config(WidgetConfig {
            tenant_id: 3,
            chatbot_name: "Acme Support".to_string(),
            colors: crate::theme::ColorPalette {
                send_button_color: "#007bff".to_string(),
                chat_header_color: "#007bff".to_string(),
                close_icon_color: "#ffffff".to_string(),
                chat_bg_color: "#f8f9fa".to_string(),
                ai_bubble_color: "#ffffff".to_string(),
                human_bubble_color: "#007bff".to_string(),
                text_box_color: "#ffffff".to_string(),
            },
            company_name: Some("Acme".to_string()),
        });

        assert_eq!(c.state().tenant_id(), Some(3));
        assert_eq!(c.state().chatbot_name(), "Acme Support");
        assert_eq!(c.state().company_name(), Some("Acme"));
        assert!(c.state().colors().is_some());

        let out = c.submit("hi").unwrap();
        assert_eq!(out.tenant_id, Some(3));
    }

    #[test]
    fn test_open_close_toggle() {
        let dir = TempDir::new().unwrap();
        let mut c = controller(&dir);

        assert!(!c.state().is_open());
        c.open();
        c.open();
        assert!(c.state().is_open());
        c.toggle();
        assert!(!c.state().is_open());
        c.close();
        assert!(!c.state().is_open());
    }
}
