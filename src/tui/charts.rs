use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::ops::Range;

use super::state::{GridView, ViewerState};
use crate::render::heatmap::TextShade;
use crate::render::style::Rgb;

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Characters per cell, including one column of padding.
pub fn cell_width(view: &GridView) -> usize {
    let widest = view
        .cells
        .iter()
        .map(|c| c.label.chars().count())
        .chain(view.x_ticks.iter().map(|t| t.chars().count()))
        .max()
        .unwrap_or(0);
    widest.max(2) + 1
}

/// Width of the row-label gutter; zero when row labels are hidden.
pub fn gutter_width(view: &GridView) -> usize {
    view.y_ticks
        .iter()
        .map(|t| t.chars().count() + 1)
        .max()
        .unwrap_or(0)
}

/// Indices that fit in `room` slots of `per` characters each, starting at `start`.
pub fn visible_span(total: usize, start: usize, room: usize, per: usize) -> Range<usize> {
    let start = start.min(total);
    let count = if per == 0 { 0 } else { room / per };
    start..(start + count).min(total)
}

fn matrix_row(view: &GridView, display_row: usize) -> usize {
    if view.origin_bottom {
        view.size - 1 - display_row
    } else {
        display_row
    }
}

fn tick_line(view: &GridView, cols: &Range<usize>, cell: usize, gutter: usize) -> Line<'static> {
    let mut spans = vec![Span::raw(" ".repeat(gutter))];
    for col in cols.clone() {
        spans.push(Span::styled(
            format!("{:>w$} ", view.x_ticks[col], w = cell - 1),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    Line::from(spans)
}

/// Rows of styled cells for the part of the matrix that fits in `width` x `height`.
pub fn grid_lines(
    view: &GridView,
    scroll_row: usize,
    scroll_col: usize,
    width: usize,
    height: usize,
) -> Vec<Line<'static>> {
    let cell = cell_width(view);
    let gutter = gutter_width(view);
    let cols = visible_span(view.size, scroll_col, width.saturating_sub(gutter), cell);
    let rows = visible_span(view.size, scroll_row, height.saturating_sub(1), 1);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    if !view.origin_bottom {
        lines.push(tick_line(view, &cols, cell, gutter));
    }
    for display_row in rows {
        let row = matrix_row(view, display_row);
        let mut spans = Vec::with_capacity(cols.len() + 1);
        if gutter > 0 {
            spans.push(Span::raw(format!("{:<w$}", view.y_ticks[row], w = gutter)));
        }
        for col in cols.clone() {
            let c = view.cell(row, col);
            let fg = match c.shade {
                TextShade::Light => view.light_text,
                TextShade::Dark => view.dark_text,
            };
            let bg = c.fill.unwrap_or(view.missing_fill);
            spans.push(Span::styled(
                format!("{:>w$} ", c.label, w = cell - 1),
                Style::default().fg(color(fg)).bg(color(bg)),
            ));
        }
        lines.push(Line::from(spans));
    }
    if view.origin_bottom {
        lines.push(tick_line(view, &cols, cell, gutter));
    }
    lines
}

pub fn draw_caption(area: Rect, f: &mut Frame, view: &GridView) {
    let lines: Vec<Line> = view
        .caption
        .iter()
        .map(|l| {
            if *l == view.stats_line {
                Line::from(Span::styled(l.clone(), Style::default().fg(Color::Cyan)))
            } else {
                Line::from(l.clone())
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines).centered(), area);
}

pub fn draw_grid(area: Rect, f: &mut Frame, state: &ViewerState) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        "{n} x {n} cores (row {}, col {})",
        state.scroll_row,
        state.scroll_col,
        n = state.view.size
    ));
    let inner = block.inner(area);
    let lines = grid_lines(
        &state.view,
        state.scroll_row,
        state.scroll_col,
        inner.width as usize,
        inner.height as usize,
    );
    f.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LatencyMatrix, RenderParameters};
    use crate::render::{heatmap, style::FigureStyle};

    fn view() -> GridView {
        let m = LatencyMatrix::from_ragged_rows(vec![
            vec![],
            vec![10.0],
            vec![20.0, 15.0],
            vec![120.0, 30.0, 40.0],
        ])
        .unwrap()
        .symmetrized();
        let style = FigureStyle::heatmap();
        let plan = heatmap::plan(&m, &RenderParameters::default(), &style).unwrap();
        GridView::from_heatmap(&plan, &style)
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn widths_follow_longest_label() {
        let v = view();
        assert_eq!(cell_width(&v), 4);
        assert_eq!(gutter_width(&v), "CPU 4".len() + 1);
    }

    #[test]
    fn span_is_clamped() {
        assert_eq!(visible_span(10, 0, 12, 4), 0..3);
        assert_eq!(visible_span(10, 8, 12, 4), 8..10);
        assert_eq!(visible_span(10, 12, 12, 4), 10..10);
        assert_eq!(visible_span(10, 0, 12, 0), 0..0);
    }

    #[test]
    fn header_then_rows_top_down() {
        let v = view();
        let lines = grid_lines(&v, 0, 0, 80, 20);
        assert_eq!(lines.len(), 5);
        assert!(text(&lines[0]).contains('4'));
        assert!(text(&lines[1]).starts_with("CPU 1"));
        assert!(text(&lines[4]).contains("120"));
    }

    #[test]
    fn viewport_limits_rows_and_columns() {
        let v = view();
        let gutter = gutter_width(&v);
        let lines = grid_lines(&v, 1, 2, gutter + 2 * cell_width(&v), 3);
        assert_eq!(lines.len(), 3);
        assert!(text(&lines[1]).starts_with("CPU 2"));
        // gutter plus two cells
        assert_eq!(lines[1].spans.len(), 3);
    }

    #[test]
    fn bottom_origin_puts_ticks_last() {
        let mut v = view();
        v.origin_bottom = true;
        let lines = grid_lines(&v, 0, 0, 80, 20);
        assert!(text(&lines[0]).starts_with("CPU 4"));
        assert!(!text(&lines[4]).contains("CPU"));
    }
}
