//! App — terminal lifecycle and the single consumer event loop.
//!
//! Two producers feed one `mpsc` queue: the socket reader task (decoded
//! backend messages, including remotely-replayed navigation) and the
//! blocking keyboard thread.  The loop is the only consumer, so every
//! mutation of session state happens in arrival order with no locking.

use std::io;

use ratatui::crossterm::{
    event::{self, Event, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use deck_proto::config::Config;
use deck_proto::protocol::UiCommand;

use crate::connection::{self, ConnectionError, Reader, Writer};
use crate::input::{self, UiEvent};
use crate::screen::{NullScreen, Screen, TermScreen};
use crate::session::Session;

pub enum AppMessage {
    /// A decoded message from the backend.
    Incoming(UiCommand),
    Key(KeyEvent),
    /// One opaque controller event from a local device binding.
    Controller([u8; 3]),
    Disconnected,
    Redraw,
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.backend_addr();
    let (reader, mut writer) = connection::connect(&addr).await?;

    let (tx, mut rx) = mpsc::channel::<AppMessage>(256);
    spawn_reader(reader, tx.clone());

    let device = config.controller.device_name.clone();
    let root = config.library.root_playlist;

    // A session without a terminal still navigates and forwards commands;
    // it just has nothing to show (non-fatal, per the operator warning).
    match setup_terminal() {
        Ok(mut terminal) => {
            spawn_key_thread(tx);
            let mut session = Session::new(device, TermScreen::new());
            for cmd in session.bootstrap(root) {
                writer.send(&cmd).await?;
            }
            let result = event_loop(&mut session, &mut writer, &mut rx, |screen| {
                terminal.draw(|frame| screen.draw(frame))?;
                Ok(())
            })
            .await;
            restore_terminal();
            result
        }
        Err(e) => {
            warn!("no terminal capability ({}); continuing without display", e);
            let mut session = Session::new(device, NullScreen);
            for cmd in session.bootstrap(root) {
                writer.send(&cmd).await?;
            }
            event_loop(&mut session, &mut writer, &mut rx, |_| Ok(())).await
        }
    }
}

async fn event_loop<S: Screen>(
    session: &mut Session<S>,
    writer: &mut Writer,
    rx: &mut mpsc::Receiver<AppMessage>,
    mut draw: impl FnMut(&S) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    draw(session.screen())?;
    loop {
        let Some(msg) = rx.recv().await else {
            break;
        };
        let outbound = match msg {
            AppMessage::Incoming(cmd) => session.handle(cmd),
            AppMessage::Key(key) => match input::map_key(&key) {
                Some(UiEvent::Quit) => {
                    info!("quit requested");
                    break;
                }
                Some(event) => session.handle_ui_event(event),
                None => Vec::new(),
            },
            AppMessage::Controller(bytes) => vec![session.forward_midi(bytes)],
            AppMessage::Disconnected => {
                warn!("backend connection lost; shutting down");
                break;
            }
            AppMessage::Redraw => Vec::new(),
        };
        for cmd in &outbound {
            writer.send(cmd).await?;
        }
        draw(session.screen())?;
    }
    Ok(())
}

fn spawn_reader(mut reader: Reader, tx: mpsc::Sender<AppMessage>) {
    tokio::spawn(async move {
        loop {
            match reader.next().await {
                Ok(cmd) => {
                    if tx.send(AppMessage::Incoming(cmd)).await.is_err() {
                        return;
                    }
                }
                Err(ConnectionError::Closed) => {
                    let _ = tx.send(AppMessage::Disconnected).await;
                    return;
                }
                Err(e) => {
                    error!("read error: {}", e);
                    let _ = tx.send(AppMessage::Disconnected).await;
                    return;
                }
            }
        }
    });
}

fn spawn_key_thread(tx: mpsc::Sender<AppMessage>) {
    std::thread::spawn(move || loop {
        match event::read() {
            Ok(Event::Key(key)) => {
                if tx.blocking_send(AppMessage::Key(key)).is_err() {
                    return;
                }
            }
            Ok(Event::Resize(_, _)) => {
                if tx.blocking_send(AppMessage::Redraw).is_err() {
                    return;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("input read error: {}", e);
                return;
            }
        }
    });
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}
