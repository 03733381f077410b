mod app;
mod client;
mod config;
mod conversation;
mod decode;
mod handler;
mod tui;
mod ui;

use anyhow::Result;
use app::App;
use tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let api_url = config::resolve_api_url();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let mut app = App::new(&api_url, events.sender());

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;
        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event)?;
        }
    }

    tui::restore()?;
    Ok(())
}
