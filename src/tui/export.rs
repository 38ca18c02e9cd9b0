use anyhow::Result;
use std::sync::mpsc as std_mpsc;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use super::state::GridView;

// Clipboard manager channel, created on first copy
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();
// When the last queued copy stops being held
static HOLD_UNTIL: Mutex<Option<Instant>> = Mutex::new(None);

const CLIPBOARD_HOLD: Duration = Duration::from_secs(2);

/// Text placed on the clipboard by `y`: caption lines, with the statistics line last.
pub fn clipboard_text(view: &GridView) -> String {
    let mut lines: Vec<&str> = view
        .caption
        .iter()
        .map(String::as_str)
        .filter(|l| *l != view.stats_line)
        .collect();
    lines.push(&view.stats_line);
    lines.join("\n")
}

/// Shorten for the status line.
pub fn status_preview(text: &str, max: usize) -> String {
    let last = text.lines().last().unwrap_or_default();
    if last.chars().count() > max {
        let cut: String = last.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        last.to_string()
    }
}

/// Start the clipboard thread once. Each copy keeps its arboard handle alive
/// for a while so X11/Wayland clipboard managers can read the contents.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                match Clipboard::new() {
                    Ok(mut clipboard) => {
                        if clipboard.set_text(&text).is_ok() {
                            std::thread::sleep(CLIPBOARD_HOLD);
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "clipboard unavailable"),
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue `text` for the clipboard without blocking the UI thread.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    if let Ok(mut until) = HOLD_UNTIL.lock() {
        *until = Some(extend_hold(*until, Instant::now()));
    }
    Ok(())
}

/// Copies run one after another, so a new one is held after the previous ends.
fn extend_hold(until: Option<Instant>, now: Instant) -> Instant {
    until.map_or(now, |u| u.max(now)) + CLIPBOARD_HOLD
}

fn remaining_hold(until: Option<Instant>, now: Instant) -> Duration {
    until.map_or(Duration::ZERO, |u| u.saturating_duration_since(now))
}

/// Block until queued clipboard contents have been held long enough for a
/// clipboard manager to take them. Called once the viewer has closed.
pub fn wait_for_clipboard() {
    let until = HOLD_UNTIL.lock().ok().and_then(|g| *g);
    let wait = remaining_hold(until, Instant::now());
    if !wait.is_zero() {
        tracing::debug!(?wait, "waiting for clipboard hand-off");
        std::thread::sleep(wait);
    }
}
