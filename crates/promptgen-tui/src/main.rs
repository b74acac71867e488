mod app;
mod cli;
mod editor;
mod logging;
mod tasks;
mod theme;
mod ui;
mod widgets;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{error, info};

use app::{App, AppEvent, Request, SessionConfig};
use cli::Cli;
use promptgen_core::clipboard::SystemClipboard;
use promptgen_core::config::{resolve_prompt_file, PromptFileSource};
use promptgen_core::store::YamlStore;
use tasks::TaskContext;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();
    logging::init();

    // Resolve before terminal setup so errors print cleanly
    let (path, source) = match resolve_prompt_file(cli.file.as_deref()) {
        Ok(found) => found,
        Err(e) => {
            error!(error = %e, "could not resolve prompt file");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    info!(path = %path.display(), source = source.label(), "using prompt file");

    let config = SessionConfig::load(cli.wants_monochrome());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, config, &path, source).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        error!(error = %e, "terminal error");
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: SessionConfig,
    path: &Path,
    source: PromptFileSource,
) -> io::Result<()> {
    let (request_tx, mut request_rx) = mpsc::unbounded_channel::<Request>();
    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<AppEvent>();
    let ctx = TaskContext {
        store: Arc::new(YamlStore::new(path)),
        clipboard: Arc::new(SystemClipboard),
    };

    let mut app = App::new(config, request_tx);
    let size = terminal.size()?;
    app.handle_event(AppEvent::Resize {
        width: size.width,
        height: size.height,
    });
    app.handle_event(AppEvent::Status(format!(
        "Using {} prompts file: {}",
        source.label(),
        path.display()
    )));
    app.start();

    let mut terminal_events = spawn_input_reader();
    let mut ticks = tokio::time::interval(Duration::from_millis(100));

    loop {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        tokio::select! {
            Some(input) = terminal_events.recv() => {
                match input {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        app.handle_event(AppEvent::Key(key));
                    }
                    Event::Paste(text) => app.handle_event(AppEvent::Paste(text)),
                    Event::Resize(width, height) => {
                        app.handle_event(AppEvent::Resize { width, height });
                    }
                    _ => {}
                }
            }
            Some(request) = request_rx.recv() => {
                tasks::spawn(request, &ctx, result_tx.clone());
            }
            Some(result) = result_rx.recv() => {
                app.handle_event(result);
            }
            _ = ticks.tick() => {
                app.handle_event(AppEvent::Tick);
            }
        }

        if app.should_quit {
            info!("exiting");
            return Ok(());
        }
    }
}

/// Crossterm reads block, so they run on a plain thread. The thread ends once
/// the receiver is dropped.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || loop {
        match event::poll(Duration::from_millis(50)) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(_) => break,
        }
        let Ok(input) = event::read() else { continue };
        if tx.send(input).is_err() {
            break;
        }
    });
    rx
}
