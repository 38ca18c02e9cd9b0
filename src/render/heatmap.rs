//! Annotated core-to-core heatmap.
//!
//! [`plan`] makes every decision (range, colors, labels, text shade, ticks,
//! caption, size) without touching a backend; [`draw`] rasterizes a plan onto any
//! plotters drawing area. The terminal viewer consumes the same plan.

use super::colormap::scaled_color;
use super::style::{FigureStyle, Rgb};
use crate::error::{MatrixError, RenderError};
use crate::metrics;
use crate::model::{FigureSize, LatencyMatrix, MatrixStats, RenderParameters};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

pub const DEFAULT_SUBTITLE: &str = "Inter-core one-way data latency between CPU cores";

/// Label color class; light labels sit on dark cells and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextShade {
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellPlan {
    pub row: usize,
    pub col: usize,
    pub value: f64,
    /// `None` for missing values: the gray underlay shows through
    pub fill: Option<Rgb>,
    pub label: String,
    pub shade: TextShade,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapPlan {
    pub size: usize,
    pub vmin: f64,
    pub vmax: f64,
    pub black_at: f64,
    pub stats: MatrixStats,
    /// Row-major, `size * size` entries
    pub cells: Vec<CellPlan>,
    pub value_font_pt: f64,
    pub x_ticks: Vec<String>,
    /// Empty when y tick labels are disabled
    pub y_ticks: Vec<String>,
    pub caption: Vec<String>,
    pub figure_size: FigureSize,
}

impl HeatmapPlan {
    pub fn cell(&self, row: usize, col: usize) -> &CellPlan {
        &self.cells[row * self.size + col]
    }

    /// The `Min=.. Median=.. Max=..` caption line.
    pub fn stats_line(&self) -> String {
        stats_line(self.vmin, self.stats.median, self.vmax)
    }
}

/// Threshold between light and dark labels: three quarters of the way up the range.
pub fn black_at(vmin: f64, vmax: f64) -> f64 {
    (vmin + 3.0 * vmax) / 4.0
}

pub fn text_shade(value: f64, black_at: f64) -> TextShade {
    if value < black_at {
        TextShade::Light
    } else {
        TextShade::Dark
    }
}

/// One decimal when the range tops out below 10, integers otherwise; NaN is blank.
pub fn format_label(value: f64, vmax: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if vmax < 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.0}")
    }
}

pub fn value_font_points(vmax: f64, style: &FigureStyle) -> f64 {
    if vmax >= 100.0 {
        style.wide_value_font_pt
    } else {
        style.value_font_pt
    }
}

/// 0.3 inch per cell plus a fixed margin.
pub fn default_figure_size(rows: usize, cols: usize) -> FigureSize {
    FigureSize {
        width: cols as f64 * 0.3 + 6.0,
        height: rows as f64 * 0.3 + 1.0,
    }
}

pub fn stats_line(vmin: f64, median: f64, vmax: f64) -> String {
    format!("Min={vmin:.1}ns Median={median:.1}ns Max={vmax:.1}ns")
}

/// Decide everything about the figure for an already symmetrized matrix.
pub fn plan(
    matrix: &LatencyMatrix,
    params: &RenderParameters,
    style: &FigureStyle,
) -> Result<HeatmapPlan, MatrixError> {
    let stats = metrics::compute_stats(matrix, params.median)?;
    let vmin = params.vmin.unwrap_or(stats.min);
    let vmax = params.vmax.unwrap_or(stats.max);
    let black_at = black_at(vmin, vmax);
    tracing::debug!(vmin, vmax, black_at, median = stats.median, "heatmap range");

    let n = matrix.size();
    let mut cells = Vec::with_capacity(n * n);
    for (row, values) in matrix.rows().enumerate() {
        for (col, &value) in values.iter().enumerate() {
            cells.push(CellPlan {
                row,
                col,
                value,
                fill: (!value.is_nan()).then(|| scaled_color(value, vmin, vmax)),
                label: format_label(value, vmax),
                shade: text_shade(value, black_at),
            });
        }
    }

    let x_ticks = (1..=n).map(|i| i.to_string()).collect();
    let y_ticks = if params.y_ticks {
        (1..=n).map(|i| format!("CPU {i}")).collect()
    } else {
        Vec::new()
    };

    let mut caption = Vec::with_capacity(3);
    if let Some(title) = params.title.as_deref().filter(|t| !t.trim().is_empty()) {
        caption.push(title.trim().to_string());
    }
    caption.push(
        params
            .subtitle
            .clone()
            .unwrap_or_else(|| DEFAULT_SUBTITLE.to_string()),
    );
    caption.push(stats_line(vmin, stats.median, vmax));

    Ok(HeatmapPlan {
        size: n,
        vmin,
        vmax,
        black_at,
        stats,
        cells,
        value_font_pt: value_font_points(vmax, style),
        x_ticks,
        y_ticks,
        caption,
        figure_size: params
            .figure_size
            .unwrap_or_else(|| default_figure_size(n, n)),
    })
}

/// Pixel placement of the caption, tick bands and grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapLayout {
    pub width: u32,
    pub height: u32,
    pub margin: f64,
    pub caption_line: f64,
    pub x_band: f64,
    pub y_band: f64,
    pub grid_left: f64,
    pub grid_top: f64,
    pub cell: f64,
}

impl HeatmapLayout {
    pub fn compute(plan: &HeatmapPlan, style: &FigureStyle, (width, height): (u32, u32)) -> Self {
        let margin = 0.1 * style.dpi;
        let caption_line = style.px(style.title_font_pt) * style.title_line_spacing;
        let caption_height = caption_line * plan.caption.len() as f64 + margin;
        let tick_px = style.px(style.tick_font_pt);
        let x_band = tick_px * 1.8;
        let y_band = match plan.y_ticks.iter().map(|t| t.chars().count()).max() {
            Some(chars) => chars as f64 * tick_px * 0.6 + margin,
            None => margin,
        };

        let n = plan.size.max(1) as f64;
        let avail_w = (width as f64 - y_band - 2.0 * margin).max(n);
        let avail_h = (height as f64 - caption_height - x_band - 2.0 * margin).max(n);
        let cell = (avail_w / n).min(avail_h / n).max(1.0);

        let grid_left = margin + y_band + (avail_w - cell * n) / 2.0;
        let top_band = if style.x_ticks_on_top { x_band } else { 0.0 };
        let grid_top = margin + caption_height + top_band + (avail_h - cell * n) / 2.0;

        Self {
            width,
            height,
            margin,
            caption_line,
            x_band,
            y_band,
            grid_left,
            grid_top,
            cell,
        }
    }

    fn cell_rect(&self, row: usize, col: usize) -> [(i32, i32); 2] {
        let x0 = self.grid_left + col as f64 * self.cell;
        let y0 = self.grid_top + row as f64 * self.cell;
        [
            (x0.round() as i32, y0.round() as i32),
            ((x0 + self.cell).round() as i32, (y0 + self.cell).round() as i32),
        ]
    }

    fn cell_center(&self, row: usize, col: usize) -> (i32, i32) {
        (
            (self.grid_left + (col as f64 + 0.5) * self.cell).round() as i32,
            (self.grid_top + (row as f64 + 0.5) * self.cell).round() as i32,
        )
    }
}

fn text_style<'a>(style: &'a FigureStyle, points: f64, color: Rgb, pos: Pos) -> TextStyle<'a> {
    (style.font_family.as_str(), style.px(points))
        .into_font()
        .color(&RGBColor::from(color))
        .pos(pos)
}

/// Rasterize `plan` onto `root`. The area is expected to be sized from
/// `plan.figure_size` at `style.dpi`.
pub fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plan: &HeatmapPlan,
    style: &FigureStyle,
) -> Result<(), RenderError> {
    let layout = HeatmapLayout::compute(plan, style, root.dim_in_pixel());
    let center = Pos::new(HPos::Center, VPos::Center);

    root.fill(&RGBColor::from(style.background))
        .map_err(RenderError::backend)?;

    for (i, line) in plan.caption.iter().enumerate() {
        let y = layout.margin + layout.caption_line * (i as f64 + 0.5);
        root.draw(&Text::new(
            line.as_str(),
            ((layout.width / 2) as i32, y.round() as i32),
            text_style(style, style.title_font_pt, style.dark_text, center),
        ))
        .map_err(RenderError::backend)?;
    }

    // Underlay: every cell gray first, values painted on top.
    let n = plan.size;
    let [top_left, _] = layout.cell_rect(0, 0);
    let [_, bottom_right] = layout.cell_rect(n.saturating_sub(1), n.saturating_sub(1));
    root.draw(&Rectangle::new(
        [top_left, bottom_right],
        RGBColor::from(style.missing_fill).filled(),
    ))
    .map_err(RenderError::backend)?;

    for cell in &plan.cells {
        if let Some(fill) = cell.fill {
            root.draw(&Rectangle::new(
                layout.cell_rect(cell.row, cell.col),
                RGBColor::from(fill).filled(),
            ))
            .map_err(RenderError::backend)?;
        }
    }

    for cell in plan.cells.iter().filter(|c| !c.label.is_empty()) {
        let color = match cell.shade {
            TextShade::Light => style.light_text,
            TextShade::Dark => style.dark_text,
        };
        root.draw(&Text::new(
            cell.label.as_str(),
            layout.cell_center(cell.row, cell.col),
            text_style(style, plan.value_font_pt, color, center),
        ))
        .map_err(RenderError::backend)?;
    }

    let x_tick_y = if style.x_ticks_on_top {
        layout.grid_top - layout.x_band / 2.0
    } else {
        layout.grid_top + layout.cell * n as f64 + layout.x_band / 2.0
    };
    for (col, tick) in plan.x_ticks.iter().enumerate() {
        let (x, _) = layout.cell_center(0, col);
        root.draw(&Text::new(
            tick.as_str(),
            (x, x_tick_y.round() as i32),
            text_style(style, style.tick_font_pt, style.dark_text, center),
        ))
        .map_err(RenderError::backend)?;
    }

    let y_tick_x = (layout.grid_left - layout.margin / 2.0).round() as i32;
    for (row, tick) in plan.y_ticks.iter().enumerate() {
        let (_, y) = layout.cell_center(row, 0);
        root.draw(&Text::new(
            tick.as_str(),
            (y_tick_x, y),
            text_style(
                style,
                style.tick_font_pt,
                style.dark_text,
                Pos::new(HPos::Right, VPos::Center),
            ),
        ))
        .map_err(RenderError::backend)?;
    }

    root.present().map_err(RenderError::backend)?;
    Ok(())
}
