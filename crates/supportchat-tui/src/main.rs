mod app;
mod handler;
mod tui;
mod ui;

use std::fs::File;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use supportchat_core::{ChatWidget, SessionStore, Settings};

use crate::app::App;
use crate::tui::EventHandler;

/// The terminal owns stdout/stderr, so logs go to a file under the config
/// directory instead.
fn init_logging() -> Result<()> {
    let dir = dirs::config_dir()
        .context("could not determine config directory")?
        .join("supportchat");
    std::fs::create_dir_all(&dir)?;
    let log_file = File::create(dir.join("supportchat.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let settings = Settings::resolve();
    let store = SessionStore::open_default()?;
    let widget = ChatWidget::init(&settings, store).await;
    let mut app = App::new(widget);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event).await?;
        } else {
            break;
        }
    }

    tui::restore()?;
    Ok(())
}
