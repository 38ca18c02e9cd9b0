use crate::model::MatrixStats;
use crate::render::heatmap::{stats_line, HeatmapPlan, TextShade};
use crate::render::mesh::MeshPlan;
use crate::render::style::{FigureStyle, Rgb};

/// One matrix cell as the terminal shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewCell {
    pub fill: Option<Rgb>,
    pub label: String,
    pub shade: TextShade,
}

/// Everything the viewer needs from a plan, independent of which plot produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct GridView {
    pub caption: Vec<String>,
    pub stats_line: String,
    pub size: usize,
    pub x_ticks: Vec<String>,
    /// Empty when row labels are hidden
    pub y_ticks: Vec<String>,
    /// Row-major, `size * size` entries
    pub cells: Vec<ViewCell>,
    pub missing_fill: Rgb,
    pub light_text: Rgb,
    pub dark_text: Rgb,
    /// Draw row 0 at the bottom (mesh orientation)
    pub origin_bottom: bool,
}

impl GridView {
    pub fn from_heatmap(plan: &HeatmapPlan, style: &FigureStyle) -> Self {
        Self {
            caption: plan.caption.clone(),
            stats_line: plan.stats_line(),
            size: plan.size,
            x_ticks: plan.x_ticks.clone(),
            y_ticks: plan.y_ticks.clone(),
            cells: plan
                .cells
                .iter()
                .map(|c| ViewCell {
                    fill: c.fill,
                    label: c.label.clone(),
                    shade: c.shade,
                })
                .collect(),
            missing_fill: style.missing_fill,
            light_text: style.light_text,
            dark_text: style.dark_text,
            origin_bottom: false,
        }
    }

    pub fn from_mesh(plan: &MeshPlan, style: &FigureStyle, stats: MatrixStats) -> Self {
        let ticks: Vec<String> = (0..plan.size).map(|i| plan.tick_label(i as f64)).collect();
        let line = stats_line(stats.min, stats.median, stats.max);
        Self {
            caption: vec![
                format!(
                    "{n} x {n} latency matrix, color range {:.1} .. {:.1} ns",
                    plan.vmin,
                    plan.vmax,
                    n = plan.size
                ),
                line.clone(),
            ],
            stats_line: line,
            size: plan.size,
            x_ticks: ticks.clone(),
            y_ticks: ticks,
            cells: plan
                .cells
                .iter()
                .map(|fill| ViewCell {
                    fill: *fill,
                    label: String::new(),
                    shade: TextShade::Dark,
                })
                .collect(),
            missing_fill: style.background,
            light_text: style.light_text,
            dark_text: style.dark_text,
            origin_bottom: true,
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> &ViewCell {
        &self.cells[row * self.size + col]
    }
}

pub struct ViewerState {
    pub view: GridView,
    /// First visible display row / column
    pub scroll_row: usize,
    pub scroll_col: usize,
    pub show_help: bool,
    pub info: String,
}

impl ViewerState {
    pub fn new(view: GridView) -> Self {
        Self {
            view,
            scroll_row: 0,
            scroll_col: 0,
            show_help: false,
            info: "q quit · ? help · y copy stats".to_string(),
        }
    }

    /// Move the viewport; stays within the matrix.
    pub fn scroll_by(&mut self, rows: isize, cols: isize) {
        let last = self.view.size.saturating_sub(1);
        self.scroll_row = self.scroll_row.saturating_add_signed(rows).min(last);
        self.scroll_col = self.scroll_col.saturating_add_signed(cols).min(last);
    }
}
