//! Figure rendering.
//!
//! Plans are backend-independent; this module picks a plotters backend from the
//! output path and hands it the drawing area. PDF goes through an in-memory SVG
//! that is converted with `svg2pdf`.

pub mod colormap;
pub mod heatmap;
pub mod mesh;
pub mod style;

use crate::error::RenderError;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

pub use heatmap::HeatmapPlan;
pub use mesh::MeshPlan;
pub use style::FigureStyle;

/// File formats the renderer can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Pdf,
    Bitmap,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("svg") => Ok(ImageFormat::Svg),
            Some("pdf") => Ok(ImageFormat::Pdf),
            Some("png" | "bmp" | "jpg" | "jpeg") => Ok(ImageFormat::Bitmap),
            Some(other) => Err(RenderError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: format!("unknown extension .{other} (use .pdf, .svg, .png, .bmp or .jpg)"),
            }),
            None => Err(RenderError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: "no file extension (use .pdf, .svg, .png, .bmp or .jpg)".to_string(),
            }),
        }
    }
}

/// Convert a finished SVG document to a single-page PDF.
pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, RenderError> {
    use svg2pdf::usvg;

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options).map_err(RenderError::pdf)?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(RenderError::pdf)
}

/// Draw into an SVG string, then write it to `path` as PDF.
fn write_pdf<F>(path: &Path, size: (u32, u32), draw: F) -> Result<(), RenderError>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<(), RenderError>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw(&root)?;
    }
    let pdf = svg_to_pdf(&svg)?;
    std::fs::write(path, pdf)?;
    Ok(())
}

/// Write a heatmap plan to `path`, sized from the plan at the style's resolution.
pub fn save_heatmap(plan: &HeatmapPlan, style: &FigureStyle, path: &Path) -> Result<(), RenderError> {
    let format = ImageFormat::from_path(path)?;
    let size = plan.figure_size.to_pixels(style.dpi);
    tracing::info!(path = %path.display(), ?format, width = size.0, height = size.1, "writing heatmap");
    match format {
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            heatmap::draw(&root, plan, style)
        }
        ImageFormat::Pdf => write_pdf(path, size, |root| heatmap::draw(root, plan, style)),
        ImageFormat::Bitmap => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            heatmap::draw(&root, plan, style)
        }
    }
}

/// Write a mesh plan to `path`.
pub fn save_mesh(plan: &MeshPlan, style: &FigureStyle, path: &Path) -> Result<(), RenderError> {
    let format = ImageFormat::from_path(path)?;
    let size = plan.figure_size.to_pixels(style.dpi);
    tracing::info!(path = %path.display(), ?format, width = size.0, height = size.1, "writing mesh");
    match format {
        ImageFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            mesh::draw(&root, plan, style)
        }
        ImageFormat::Pdf => write_pdf(path, size, |root| mesh::draw(root, plan, style)),
        ImageFormat::Bitmap => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            mesh::draw(&root, plan, style)
        }
    }
}
