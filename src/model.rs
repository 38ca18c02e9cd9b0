use crate::error::MatrixError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Square matrix of one-way latencies in nanoseconds, row-major.
///
/// NaN marks a cell without a measurement. Construction validates shape, so every
/// `LatencyMatrix` is non-empty and N x N.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl LatencyMatrix {
    /// Build from complete rows; every row must have exactly as many cells as there are rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let size = rows.len();
        if size == 0 {
            return Err(MatrixError::Empty);
        }
        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(MatrixError::NotSquare {
                    row,
                    expected: size,
                    found: values.len(),
                });
            }
            cells.extend(values);
        }
        Ok(Self { size, cells })
    }

    /// Build from rows that may stop early (lower-triangular files); missing
    /// trailing cells become NaN.
    pub fn from_ragged_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let size = rows.len();
        if size == 0 {
            return Err(MatrixError::Empty);
        }
        let mut padded = Vec::with_capacity(size);
        for (row, mut values) in rows.into_iter().enumerate() {
            if values.len() > size {
                return Err(MatrixError::NotSquare {
                    row,
                    expected: size,
                    found: values.len(),
                });
            }
            values.resize(size, f64::NAN);
            padded.push(values);
        }
        Self::from_rows(padded)
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.size + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.cells.chunks(self.size)
    }

    /// Every cell, NaN included, in row-major order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().copied()
    }

    /// Cells strictly below the diagonal: one value per core pair.
    pub fn lower_pairs(&self) -> impl Iterator<Item = f64> + '_ {
        (1..self.size).flat_map(move |row| (0..row).map(move |col| self.get(row, col)))
    }

    /// Mirror the strictly-lower triangle onto the strictly-upper triangle.
    ///
    /// The lower triangle is authoritative: whatever the upper triangle held is
    /// discarded. The diagonal is kept unchanged.
    pub fn symmetrized(&self) -> Self {
        let n = self.size;
        let mut cells = self.cells.clone();
        for row in 0..n {
            for col in (row + 1)..n {
                cells[row * n + col] = self.cells[col * n + row];
            }
        }
        Self { size: n, cells }
    }

    /// True when (i,j) and (j,i) hold the same value for every pair (NaN matches NaN).
    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|row| {
            (0..row).all(|col| {
                let a = self.get(row, col);
                let b = self.get(col, row);
                a == b || (a.is_nan() && b.is_nan())
            })
        })
    }
}

/// How the median on the statistics line is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MedianPolicy {
    /// Strictly-lower triangle only: each core pair once, no self-latency.
    #[default]
    Pairs,
    /// Every populated cell, diagonal and mirrored duplicates included.
    Full,
}

/// Figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

impl FigureSize {
    /// Pixel dimensions at the given resolution, never smaller than 1x1.
    pub fn to_pixels(self, dpi: f64) -> (u32, u32) {
        let w = (self.width * dpi).round().max(1.0) as u32;
        let h = (self.height * dpi).round().max(1.0) as u32;
        (w, h)
    }
}

impl FromStr for FigureSize {
    type Err = String;

    /// Parse `WIDTHxHEIGHT` in inches, e.g. `12x9.5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
        let width: f64 = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width {w:?}"))?;
        let height: f64 = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height {h:?}"))?;
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(format!("figure size must be positive, got {s:?}"));
        }
        Ok(Self { width, height })
    }
}

/// Caller-controlled knobs for one render call. Anything left `None` is derived
/// from the matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderParameters {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub vmin: Option<f64>,
    #[serde(default)]
    pub vmax: Option<f64>,
    pub y_ticks: bool,
    #[serde(default)]
    pub figure_size: Option<FigureSize>,
    #[serde(default)]
    pub median: MedianPolicy,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            title: None,
            subtitle: None,
            vmin: None,
            vmax: None,
            y_ticks: true,
            figure_size: None,
            median: MedianPolicy::default(),
        }
    }
}

/// Min/median/max over the populated cells, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixStats {
    pub min: f64,
    pub median: f64,
    pub max: f64,
    /// Number of non-NaN cells in the whole matrix
    pub populated: usize,
}

/// Which picture to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotKind {
    /// Annotated, symmetrized heatmap
    Heatmap,
    /// Label-keyed color mesh with a color bar
    Mesh,
}

impl PlotKind {
    pub fn default_output(self) -> &'static str {
        match self {
            PlotKind::Heatmap => "c2clat.pdf",
            PlotKind::Mesh => "c2clat-mesh.svg",
        }
    }
}

/// Where the rendered figure goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputTarget {
    File(PathBuf),
    /// Interactive terminal view
    Display,
}

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    pub input: PathBuf,
    pub input_format: crate::loader::InputFormat,
    pub kind: PlotKind,
    pub output: OutputTarget,
    pub params: RenderParameters,
}

/// Machine-readable description of a finished run, printed by `--json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixSummary {
    pub input: PathBuf,
    pub cores: usize,
    /// Populated cells strictly below the diagonal
    pub pairs: usize,
    pub stats: MatrixStats,
    pub vmin: f64,
    pub vmax: f64,
    pub median_policy: MedianPolicy,
    #[serde(default)]
    pub output: Option<PathBuf>,
}
