use std::time::Instant;

use tracing::{debug, warn};

use crate::api::{ApiClient, ChatReply};
use crate::config::Settings;
use crate::controller::{ChatController, OutboundMessage};
use crate::error::WidgetError;
use crate::session::SessionStore;
use crate::theme::Theme;
use crate::transcript::Transcript;
use crate::state::WidgetState;

/// The embedding surface: everything a host needs to put the chat drawer
/// on screen and drive it. `open`, `close` and `send` are the three
/// host-facing operations; all of them route through the controller, so a
/// host can never bypass the single-flight guard.
pub struct ChatWidget {
    api: ApiClient,
    controller: ChatController,
}

impl ChatWidget {
    /// Initialize the widget: one config fetch attempt (degraded branding
    /// on any failure), session restore, and history replay for a restored
    /// session. Never fails: every startup error leaves a working widget
    /// with default styling and an empty transcript.
    pub async fn init(settings: &Settings, store: SessionStore) -> Self {
        let api = ApiClient::new(settings.base_url());
        let mut controller = ChatController::new(store);

        match settings.api_key() {
            None => {
                warn!("{}", WidgetError::MissingApiKey);
            }
            Some(key) => match api.fetch_config(key).await {
                Ok(config) => controller.apply_config(config),
                Err(err) => warn!(error = %err, "widget config unavailable, using defaults"),
            },
        }

        controller.restore_session();
        if let Some(session_id) = controller.state().session_id() {
            match api.fetch_history(session_id).await {
                Ok(messages) => controller.replay_history(messages),
                // History is a nicety; its absence is not worth surfacing.
                Err(err) => debug!(error = %err, "chat history unavailable"),
            }
        }

        Self { api, controller }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> &WidgetState {
        self.controller.state()
    }

    pub fn transcript(&self) -> &Transcript {
        self.controller.transcript()
    }

    /// Resolved theme for the current branding; the default theme until a
    /// palette arrives (or forever, in degraded mode).
    pub fn theme(&self) -> Theme {
        self.state()
            .colors()
            .map(Theme::from_palette)
            .unwrap_or_default()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    pub fn is_sending(&self) -> bool {
        self.controller.is_sending()
    }

    pub fn open(&mut self) {
        self.controller.open();
    }

    pub fn close(&mut self) {
        self.controller.close();
    }

    pub fn toggle(&mut self) {
        self.controller.toggle();
    }

    /// Host-facing send: same submit guard as a user-initiated send.
    /// Returns false when the submit was a no-op (empty text, or a send
    /// already in flight). Awaits the round trip; hosts with their own
    /// event loop use `begin_send`/`finish_send` instead.
    pub async fn send(&mut self, text: &str) -> bool {
        let Some(out) = self.controller.submit(text) else {
            return false;
        };
        let result = self
            .api
            .send_message(out.tenant_id, out.session_id, &out.message)
            .await;
        self.finish_send(result, Instant::now());
        true
    }

    /// First half of a non-blocking send: run the submit guard and, if
    /// accepted, hand back the payload for the host to put on the wire.
    pub fn begin_send(&mut self, text: &str) -> Option<OutboundMessage> {
        self.controller.submit(text)
    }

    /// Second half: feed the wire outcome back into the state machine.
    pub fn finish_send(&mut self, result: Result<ChatReply, WidgetError>, now: Instant) {
        match result {
            Ok(reply) => self.controller.complete(reply),
            Err(err) => self.controller.fail(&err, now),
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.controller.tick(now);
    }

    pub fn take_follow(&mut self) -> bool {
        self.controller.take_follow()
    }
}
