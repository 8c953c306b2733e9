pub mod app;
pub mod components;
pub mod events;
pub mod ui;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use vidshelf::Result;
use vidshelf::core::{FileGateway, PinSync, UserId};

pub use app::App;
pub use events::EventHandler;

pub type Tui = Terminal<CrosstermBackend<io::Stdout>>;

const TICK: Duration = Duration::from_millis(100);

pub fn init() -> Result<Tui> {
    execute!(io::stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

pub fn restore() -> Result<()> {
    execute!(io::stdout(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

/// Run the interactive shelf until the user quits. The terminal is restored
/// even when the loop fails.
pub fn run(sync: Arc<PinSync<FileGateway>>, owner: UserId) -> Result<()> {
    let mut terminal = init()?;
    let result = event_loop(&mut terminal, sync, owner);
    restore()?;
    result
}

fn event_loop(terminal: &mut Tui, sync: Arc<PinSync<FileGateway>>, owner: UserId) -> Result<()> {
    let mut app = App::new(sync, owner);
    app.reload();
    let events = EventHandler::new(TICK);

    loop {
        let event = events.next_event()?;
        app.handle_event(event);

        terminal.draw(|f| ui::draw(f, &mut app))?;

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
