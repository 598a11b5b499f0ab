mod app_logic;
mod app_state;
mod event_handler;
mod ui_renderer;

pub use app_logic::TuiApp;

// The main function to run the TUI
pub use self::run_tui::run_tui;

// Main TUI loop and terminal setup/teardown
mod run_tui {
    use super::app_logic::TuiApp;
    use super::event_handler::handle_events;
    use super::ui_renderer::ui_frame;
    use crate::model::TreeModel;
    use crate::watcher::WatchMessage;
    use anyhow::Result;
    use crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::prelude::{CrosstermBackend, Terminal};
    use std::io::{self, Stdout};
    use std::panic;
    use std::sync::mpsc::{Receiver, TryRecvError};
    use tracing::{info, warn};

    /// Run the browser until the user quits.
    ///
    /// The screen is redrawn only after input or a change notification, so
    /// size and filter computations do not repeat while idle.
    pub fn run_tui<M: TreeModel>(
        mut app: TuiApp<M>,
        changes: Option<Receiver<WatchMessage>>,
    ) -> Result<()> {
        install_panic_hook();
        let mut terminal = init_terminal()?;
        info!("browsing {}", app.root_path().display());

        let result = event_loop(&mut terminal, &mut app, changes.as_ref());

        restore_terminal(terminal)?;
        result
    }

    fn event_loop<M: TreeModel>(
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        app: &mut TuiApp<M>,
        changes: Option<&Receiver<WatchMessage>>,
    ) -> Result<()> {
        let mut needs_redraw = true;
        let mut watching = changes.is_some();

        while !app.quit {
            if needs_redraw {
                terminal.draw(|frame| ui_frame(frame, app))?;
                needs_redraw = false;
            }
            needs_redraw |= handle_events(app)?;

            if let (true, Some(rx)) = (watching, changes) {
                loop {
                    match rx.try_recv() {
                        Ok(message) => {
                            app.handle_watch_message(message);
                            needs_redraw = true;
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            warn!("change watcher stopped");
                            watching = false;
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).map_err(Into::into)
    }

    fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor().map_err(Into::into)
    }

    /// Restore the terminal before the default hook prints the panic.
    fn install_panic_hook() {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));
    }
}
