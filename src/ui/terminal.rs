//! Interactive full-screen session.
//!
//! Key events are read on a blocking thread and forwarded as [`Intent`]s;
//! the async loop applies intents through the controller and redraws
//! whenever the store's watch channel reports a new snapshot.

use crate::controller::ThemeController;
use crate::ui::card::render_card;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, QueueableCommand};
use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const EVENT_POLL_MS: u64 = 100;

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ChangeTheme,
    /// Zero-based index into the source's preset names.
    Preset(usize),
    Redraw,
    Quit,
}

/// Map one key press to an intent.
pub fn intent_for_key(key: KeyEvent) -> Option<Intent> {
    if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
        return None;
    }
    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => Some(Intent::ChangeTheme),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Intent::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Intent::Quit),
        KeyCode::Char(digit @ '1'..='9') => Some(Intent::Preset(digit as usize - '1' as usize)),
        _ => None,
    }
}

/// Whether stdin/stdout can host the full-screen card.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Run the card until the user quits.
pub async fn run_interactive(controller: &ThemeController, color: bool) -> io::Result<()> {
    let _screen = ScreenGuard::acquire()?;
    let mut stdout = io::stdout();
    let mut state_rx = controller.store().watch();
    let presets = controller.source().preset_names();

    let stop = Arc::new(AtomicBool::new(false));
    let (intent_tx, mut intent_rx) = mpsc::unbounded_channel::<Intent>();
    let reader = spawn_key_reader(intent_tx, Arc::clone(&stop));

    let mut result = draw(&mut stdout, &state_rx.borrow_and_update(), color);
    while result.is_ok() {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = state_rx.borrow_and_update().clone();
                result = draw(&mut stdout, &snapshot, color);
            }
            intent = intent_rx.recv() => {
                match intent {
                    Some(Intent::Quit) | None => break,
                    Some(Intent::ChangeTheme) => {
                        let pending = controller.request_random_theme();
                        debug!(request = %pending.id(), "change theme pressed");
                    }
                    Some(Intent::Preset(index)) => match presets.get(index) {
                        Some(name) => {
                            if let Err(err) = controller.apply_preset(name) {
                                warn!(preset = %name, error = %err, "failed to apply preset");
                            }
                        }
                        None => debug!(index, "no preset bound to key"),
                    },
                    Some(Intent::Redraw) => {
                        let snapshot = controller.store().state();
                        result = draw(&mut stdout, &snapshot, color);
                    }
                }
            }
        }
    }

    stop.store(true, Ordering::SeqCst);
    if let Err(err) = reader.await {
        warn!(error = %err, "key reader task failed");
    }
    result
}

fn draw(
    stdout: &mut io::Stdout,
    snapshot: &crate::store::StoreState,
    color: bool,
) -> io::Result<()> {
    let size = terminal::size()?;
    render_card(stdout, snapshot, size, color)
}

fn spawn_key_reader(
    tx: mpsc::UnboundedSender<Intent>,
    stop: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !stop.load(Ordering::SeqCst) {
            match event::poll(Duration::from_millis(EVENT_POLL_MS)) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(err) => {
                    warn!(error = %err, "terminal event poll failed");
                    let _ = tx.send(Intent::Quit);
                    return;
                }
            }
            let intent = match event::read() {
                Ok(Event::Key(key)) => intent_for_key(key),
                Ok(Event::Resize(_, _)) => Some(Intent::Redraw),
                Ok(_) => None,
                Err(err) => {
                    warn!(error = %err, "terminal event read failed");
                    Some(Intent::Quit)
                }
            };
            if let Some(intent) = intent {
                if tx.send(intent).is_err() || intent == Intent::Quit {
                    return;
                }
            }
        }
    })
}

/// Raw mode + alternate screen + hidden cursor, restored on drop.
struct ScreenGuard;

impl ScreenGuard {
    fn acquire() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        Ok(Self)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = stdout.queue(Show);
        let _ = stdout.queue(LeaveAlternateScreen);
        let _ = stdout.flush();
        let _ = terminal::disable_raw_mode();
    }
}
