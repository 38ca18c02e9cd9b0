use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn key_line(keys: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(keys, Style::default().fg(Color::Magenta)),
        Span::raw(format!("{:pad$}{action}", "", pad = 14usize.saturating_sub(keys.chars().count()))),
    ])
}

pub fn help_lines() -> Vec<Line<'static>> {
    vec![
        Line::from("Keybinds:"),
        key_line("q / Esc", "Quit"),
        key_line("Ctrl-C", "Quit"),
        key_line("↑/↓ or k/j", "Scroll rows"),
        key_line("←/→ or h/l", "Scroll columns"),
        key_line("Home", "Back to the top-left cell"),
        key_line("y", "Copy caption and statistics"),
        key_line("?", "Toggle this help"),
    ]
}

/// Help popup centered over `area`.
pub fn draw_help(area: Rect, f: &mut Frame) {
    let lines = help_lines();
    let [vertical] = Layout::vertical([Constraint::Length(lines.len() as u16 + 2)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(44)])
        .flex(Flex::Center)
        .areas(vertical);
    f.render_widget(Clear, popup);
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_line_up() {
        let lines = help_lines();
        let quit: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        let copy: String = lines[6].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(quit.find("Quit"), copy.find("Copy"));
    }
}
