pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod session;
pub mod state;
pub mod theme;
pub mod transcript;
pub mod widget;

// Re-export main types for convenience
pub use api::{ApiClient, ChatReply, HistoryMessage, Source, WidgetConfig};
pub use config::Settings;
pub use controller::{ChatController, OutboundMessage, Phase};
pub use error::WidgetError;
pub use session::SessionStore;
pub use state::WidgetState;
pub use theme::{ColorPalette, Rgb, Theme};
pub use transcript::{Entry, Role, Transcript};
pub use widget::ChatWidget;
