//! Plain color mesh with a color bar, for label-keyed matrices.

use super::colormap::{scaled_color, viridis};
use super::style::{FigureStyle, Rgb};
use crate::error::{MatrixError, RenderError};
use crate::metrics;
use crate::model::{FigureSize, LatencyMatrix, RenderParameters};
use plotters::coord::Shift;
use plotters::prelude::*;

const COLORBAR_STEPS: usize = 64;
const COLORBAR_TICKS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct MeshPlan {
    pub size: usize,
    pub vmin: f64,
    pub vmax: f64,
    /// Row-major; `None` where the value is missing
    pub cells: Vec<Option<Rgb>>,
    pub labels: Option<Vec<String>>,
    pub figure_size: FigureSize,
    pub colorbar_ticks: Vec<f64>,
}

impl MeshPlan {
    pub fn cell(&self, row: usize, col: usize) -> Option<Rgb> {
        self.cells[row * self.size + col]
    }

    /// Axis text for a position on either axis; blank between cells.
    pub fn tick_label(&self, position: f64) -> String {
        let idx = position.round();
        if (position - idx).abs() > 1e-6 || idx < 0.0 || idx as usize >= self.size {
            return String::new();
        }
        match &self.labels {
            Some(labels) => labels[idx as usize].clone(),
            None => format!("{idx:.0}"),
        }
    }
}

pub fn plan(
    matrix: &LatencyMatrix,
    labels: Option<Vec<String>>,
    params: &RenderParameters,
) -> Result<MeshPlan, MatrixError> {
    let vmin = match params.vmin {
        Some(v) => v,
        None => metrics::nan_min(matrix.values()).ok_or(MatrixError::NoData)?,
    };
    let vmax = match params.vmax {
        Some(v) => v,
        None => metrics::nan_max(matrix.values()).ok_or(MatrixError::NoData)?,
    };

    let cells = matrix
        .values()
        .map(|v| (!v.is_nan()).then(|| scaled_color(v, vmin, vmax)))
        .collect();

    let colorbar_ticks = (0..COLORBAR_TICKS)
        .map(|i| vmin + (vmax - vmin) * i as f64 / (COLORBAR_TICKS - 1) as f64)
        .collect();

    Ok(MeshPlan {
        size: matrix.size(),
        vmin,
        vmax,
        cells,
        labels,
        figure_size: params.figure_size.unwrap_or(FigureSize {
            width: 6.4,
            height: 4.8,
        }),
        colorbar_ticks,
    })
}

/// Value range for the color bar axis; widened when the data is flat.
fn colorbar_range(plan: &MeshPlan) -> (f64, f64) {
    if plan.vmax > plan.vmin {
        (plan.vmin, plan.vmax)
    } else {
        (plan.vmin - 0.5, plan.vmin + 0.5)
    }
}

/// Rasterize `plan`: mesh on the left, color bar on the right.
pub fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plan: &MeshPlan,
    style: &FigureStyle,
) -> Result<(), RenderError> {
    root.fill(&RGBColor::from(style.background))
        .map_err(RenderError::backend)?;

    let (width, _) = root.dim_in_pixel();
    let (mesh_area, bar_area) = root.split_horizontally((width as f64 * 0.82) as u32);
    let n = plan.size as f64;
    let tick_font = (style.font_family.as_str(), style.px(style.tick_font_pt)).into_font();
    let formatter = |v: &f64| plan.tick_label(*v);

    let mut chart = ChartBuilder::on(&mesh_area)
        .margin(10)
        .x_label_area_size((style.px(style.tick_font_pt) * 2.5) as i32)
        .y_label_area_size((style.px(style.tick_font_pt) * 5.0) as i32)
        .build_cartesian_2d(-0.5f64..(n - 0.5), -0.5f64..(n - 0.5))
        .map_err(RenderError::backend)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(plan.size.min(20))
        .y_labels(plan.size.min(20))
        .x_label_formatter(&formatter)
        .y_label_formatter(&formatter)
        .label_style(tick_font.clone())
        .draw()
        .map_err(RenderError::backend)?;

    let size = plan.size;
    chart
        .draw_series((0..size * size).filter_map(|i| {
            let (row, col) = (i / size, i % size);
            plan.cell(row, col).map(|fill| {
                let (x, y) = (col as f64, row as f64);
                Rectangle::new(
                    [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                    RGBColor::from(fill).filled(),
                )
            })
        }))
        .map_err(RenderError::backend)?;

    let (lo, hi) = colorbar_range(plan);
    let mut bar = ChartBuilder::on(&bar_area)
        .margin(10)
        .x_label_area_size((style.px(style.tick_font_pt) * 2.5) as i32)
        .right_y_label_area_size((style.px(style.tick_font_pt) * 5.0) as i32)
        .build_cartesian_2d(0f64..1f64, lo..hi)
        .map_err(RenderError::backend)?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(plan.colorbar_ticks.len())
        .y_label_formatter(&|v| format!("{v:.1}"))
        .label_style(tick_font)
        .draw()
        .map_err(RenderError::backend)?;

    let step = (hi - lo) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let y0 = lo + step * i as f64;
        let t = (i as f64 + 0.5) / COLORBAR_STEPS as f64;
        Rectangle::new(
            [(0.0, y0), (1.0, y0 + step)],
            RGBColor::from(viridis(t)).filled(),
        )
    }))
    .map_err(RenderError::backend)?;

    root.present().map_err(RenderError::backend)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled() -> (LatencyMatrix, Vec<String>) {
        let m = LatencyMatrix::from_rows(vec![vec![80.0, 140.0], vec![150.0, f64::NAN]]).unwrap();
        (m, vec!["node0".into(), "node1".into()])
    }

    #[test]
    fn range_and_colors_from_data() {
        let (m, labels) = labeled();
        let plan = plan(&m, Some(labels), &RenderParameters::default()).unwrap();
        assert_eq!(plan.vmin, 80.0);
        assert_eq!(plan.vmax, 150.0);
        assert_eq!(plan.cell(0, 0), Some(viridis(0.0)));
        assert_eq!(plan.cell(1, 0), Some(viridis(1.0)));
        assert_eq!(plan.cell(1, 1), None);
        assert_eq!(plan.figure_size, FigureSize { width: 6.4, height: 4.8 });
    }

    #[test]
    fn colorbar_ticks_span_range() {
        let (m, _) = labeled();
        let plan = plan(&m, None, &RenderParameters::default()).unwrap();
        assert_eq!(plan.colorbar_ticks, vec![80.0, 97.5, 115.0, 132.5, 150.0]);
    }

    #[test]
    fn tick_labels_use_matrix_labels() {
        let (m, labels) = labeled();
        let plan = plan(&m, Some(labels), &RenderParameters::default()).unwrap();
        assert_eq!(plan.tick_label(0.0), "node0");
        assert_eq!(plan.tick_label(1.0), "node1");
        assert_eq!(plan.tick_label(0.5), "");
        assert_eq!(plan.tick_label(2.0), "");

        let (m, _) = labeled();
        let unlabeled = super::plan(&m, None, &RenderParameters::default()).unwrap();
        assert_eq!(unlabeled.tick_label(1.0), "1");
    }

    #[test]
    fn flat_data_gets_a_usable_colorbar_range() {
        let m = LatencyMatrix::from_rows(vec![vec![3.0]]).unwrap();
        let plan = plan(&m, None, &RenderParameters::default()).unwrap();
        assert_eq!(colorbar_range(&plan), (2.5, 3.5));
    }
}
