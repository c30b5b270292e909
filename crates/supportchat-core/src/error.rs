use thiserror::Error;

/// Failure classes of the widget. None of these are fatal: config and
/// history errors degrade silently, send errors surface as a single generic
/// transcript entry. The detailed cause is only ever logged.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("no widget API key configured")]
    MissingApiKey,

    #[error("widget config fetch failed")]
    ConfigFetch(#[source] reqwest::Error),

    #[error("message send failed")]
    SendFailed(#[source] reqwest::Error),

    /// The spawned send task was cancelled or panicked before producing a
    /// response. Treated like any other send failure by the controller.
    #[error("message send interrupted")]
    SendInterrupted,

    #[error("chat history fetch failed")]
    HistoryLoadFailed(#[source] reqwest::Error),

    #[error("session store error")]
    SessionStore(#[from] std::io::Error),
}
