mod charts;
mod export;
mod help;
mod state;

pub use state::GridView;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Terminal,
};
use std::io;

use export::{clipboard_text, copy_to_clipboard, status_preview, wait_for_clipboard};
use state::ViewerState;

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    Scroll(isize, isize),
    Home,
    Copy,
    ToggleHelp,
    Ignore,
}

fn action_for(k: KeyEvent) -> Action {
    match (k.modifiers, k.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Action::Quit,
        (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => Action::Quit,
        (_, KeyCode::Up) | (_, KeyCode::Char('k')) => Action::Scroll(-1, 0),
        (_, KeyCode::Down) | (_, KeyCode::Char('j')) => Action::Scroll(1, 0),
        (_, KeyCode::Left) | (_, KeyCode::Char('h')) => Action::Scroll(0, -1),
        (_, KeyCode::Right) | (_, KeyCode::Char('l')) => Action::Scroll(0, 1),
        (_, KeyCode::PageUp) => Action::Scroll(-10, 0),
        (_, KeyCode::PageDown) => Action::Scroll(10, 0),
        (_, KeyCode::Home) => Action::Home,
        (_, KeyCode::Char('y')) => Action::Copy,
        (_, KeyCode::Char('?')) => Action::ToggleHelp,
        _ => Action::Ignore,
    }
}

/// Apply an action; `false` means the viewer should close.
fn apply(state: &mut ViewerState, action: Action) -> bool {
    match action {
        Action::Quit => return false,
        Action::Scroll(rows, cols) => state.scroll_by(rows, cols),
        Action::Home => {
            state.scroll_row = 0;
            state.scroll_col = 0;
        }
        Action::Copy => {
            let text = clipboard_text(&state.view);
            state.info = match copy_to_clipboard(&text) {
                Ok(()) => format!("✓ Copied to clipboard: {}", status_preview(&text, 60)),
                Err(e) => format!("Clipboard copy failed: {e:#}"),
            };
        }
        Action::ToggleHelp => state.show_help = !state.show_help,
        Action::Ignore => {}
    }
    true
}

/// Show the figure in the terminal until the user quits.
pub fn run(view: GridView) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let res = event_loop(ViewerState::new(view));

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    wait_for_clipboard();
    res
}

fn event_loop(mut state: ViewerState) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    loop {
        terminal
            .draw(|f| draw(f.area(), f, &state))
            .context("draw frame")?;

        if let Event::Key(k) = event::read().context("read terminal event")? {
            if k.kind != KeyEventKind::Press {
                continue;
            }
            if !apply(&mut state, action_for(k)) {
                tracing::debug!("viewer closed");
                return Ok(());
            }
        }
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &ViewerState) {
    let caption_height = state.view.caption.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(caption_height),
                Constraint::Min(3),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    charts::draw_caption(chunks[0], f, &state.view);
    charts::draw_grid(chunks[1], f, state);
    f.render_widget(
        Paragraph::new(Line::from(state.info.clone())).style(Style::default().fg(Color::Gray)),
        chunks[2],
    );

    if state.show_help {
        help::draw_help(area, f);
    }
}
