use crate::loader::{self, InputFormat};
use crate::metrics;
use crate::model::{
    FigureSize, MatrixStats, MatrixSummary, MedianPolicy, OutputTarget, PlotConfig, PlotKind,
    RenderParameters,
};
use crate::render::{self, heatmap, mesh, FigureStyle};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "c2clat-plot",
    version,
    about = "Plot core-to-core latency matrices as annotated heatmaps"
)]
pub struct Cli {
    /// Input matrix file (JSON or CSV)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file; the extension picks the format (.pdf, .svg, .png, .bmp, .jpg)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Input layout; `auto` decides from the extension
    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    pub input_format: InputFormat,

    /// Render a plain color mesh with a color bar (label-keyed input)
    #[arg(long)]
    pub mesh: bool,

    /// First caption line (defaults to the host CPU model name)
    #[arg(long)]
    pub title: Option<String>,

    /// Second caption line
    #[arg(long)]
    pub subtitle: Option<String>,

    /// Lower bound of the color scale in ns (defaults to the data minimum)
    #[arg(long, allow_negative_numbers = true)]
    pub vmin: Option<f64>,

    /// Upper bound of the color scale in ns (defaults to the data maximum)
    #[arg(long, allow_negative_numbers = true)]
    pub vmax: Option<f64>,

    /// Hide the "CPU n" row labels
    #[arg(long)]
    pub no_yticks: bool,

    /// Figure size in inches, e.g. 12x10 (defaults to 0.3 in per core plus margins)
    #[arg(long, value_name = "WxH")]
    pub figsize: Option<FigureSize>,

    /// Cells used for the median on the statistics line
    #[arg(long, value_enum, default_value_t = MedianPolicy::Pairs)]
    pub median: MedianPolicy,

    /// Show the plot in the terminal instead of writing a file
    #[arg(long, conflicts_with = "out")]
    pub show: bool,

    /// Print a JSON summary on stdout
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print a text summary on stdout
    #[arg(long)]
    pub text: bool,
}

pub fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    tracing::debug!(?cfg, "resolved configuration");

    let summary = match cfg.kind {
        PlotKind::Heatmap => run_heatmap(&cfg)?,
        PlotKind::Mesh => run_mesh(&cfg)?,
    };

    if args.json {
        let out = serde_json::to_string_pretty(&summary)?;
        println!("{out}");
    } else if args.text {
        for line in crate::text_summary::build_text_summary(&summary).lines {
            println!("{line}");
        }
    }
    Ok(())
}

/// Build a `PlotConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> PlotConfig {
    let kind = if args.mesh {
        PlotKind::Mesh
    } else {
        PlotKind::Heatmap
    };

    let title = match (&args.title, kind) {
        (Some(t), _) => Some(t.clone()),
        (None, PlotKind::Heatmap) => crate::machine::cpu_model_name(),
        (None, PlotKind::Mesh) => None,
    };

    PlotConfig {
        input: args.input.clone(),
        input_format: args.input_format,
        kind,
        output: resolve_output(args, kind),
        params: RenderParameters {
            title,
            subtitle: args.subtitle.clone(),
            vmin: args.vmin,
            vmax: args.vmax,
            y_ticks: !args.no_yticks,
            figure_size: args.figsize,
            median: args.median,
        },
    }
}

/// An explicit `--out` wins; otherwise `--show` (and a mesh without `--out`)
/// opens the terminal view when it is compiled in, else the default file is written.
fn resolve_output(args: &Cli, kind: PlotKind) -> OutputTarget {
    if let Some(path) = &args.out {
        return OutputTarget::File(path.clone());
    }
    let wants_display = args.show || kind == PlotKind::Mesh;
    if wants_display && cfg!(feature = "tui") {
        OutputTarget::Display
    } else {
        OutputTarget::File(PathBuf::from(kind.default_output()))
    }
}

fn run_heatmap(cfg: &PlotConfig) -> Result<MatrixSummary> {
    let format = cfg.input_format.resolve(&cfg.input, cfg.kind);
    let loaded = loader::load_path(&cfg.input, format)
        .with_context(|| format!("failed to load {}", cfg.input.display()))?;
    let matrix = loaded.matrix.symmetrized();
    debug_assert!(matrix.is_symmetric());

    let style = FigureStyle::heatmap();
    let plan = heatmap::plan(&matrix, &cfg.params, &style)
        .with_context(|| format!("cannot plot {}", cfg.input.display()))?;

    let output = match &cfg.output {
        OutputTarget::File(path) => {
            render::save_heatmap(&plan, &style, path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Some(path.clone())
        }
        OutputTarget::Display => {
            display(heatmap_view(&plan, &style))?;
            None
        }
    };

    Ok(MatrixSummary {
        input: cfg.input.clone(),
        cores: matrix.size(),
        pairs: metrics::populated_pairs(&matrix),
        stats: plan.stats,
        vmin: plan.vmin,
        vmax: plan.vmax,
        median_policy: cfg.params.median,
        output,
    })
}

fn run_mesh(cfg: &PlotConfig) -> Result<MatrixSummary> {
    let format = cfg.input_format.resolve(&cfg.input, cfg.kind);
    let loaded = loader::load_path(&cfg.input, format)
        .with_context(|| format!("failed to load {}", cfg.input.display()))?;
    let matrix = loaded.matrix;

    let stats = metrics::compute_stats(&matrix, cfg.params.median)
        .with_context(|| format!("cannot plot {}", cfg.input.display()))?;
    let style = FigureStyle::mesh();
    let plan = mesh::plan(&matrix, loaded.labels, &cfg.params)
        .with_context(|| format!("cannot plot {}", cfg.input.display()))?;

    let output = match &cfg.output {
        OutputTarget::File(path) => {
            render::save_mesh(&plan, &style, path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Some(path.clone())
        }
        OutputTarget::Display => {
            display(mesh_view(&plan, &style, stats))?;
            None
        }
    };

    Ok(MatrixSummary {
        input: cfg.input.clone(),
        cores: matrix.size(),
        pairs: metrics::populated_pairs(&matrix),
        stats,
        vmin: plan.vmin,
        vmax: plan.vmax,
        median_policy: cfg.params.median,
        output,
    })
}

#[cfg(feature = "tui")]
type View = crate::tui::GridView;
#[cfg(not(feature = "tui"))]
type View = ();

#[cfg(feature = "tui")]
fn heatmap_view(plan: &heatmap::HeatmapPlan, style: &FigureStyle) -> View {
    crate::tui::GridView::from_heatmap(plan, style)
}

#[cfg(not(feature = "tui"))]
fn heatmap_view(_plan: &heatmap::HeatmapPlan, _style: &FigureStyle) -> View {}

#[cfg(feature = "tui")]
fn mesh_view(plan: &mesh::MeshPlan, style: &FigureStyle, stats: MatrixStats) -> View {
    crate::tui::GridView::from_mesh(plan, style, stats)
}

#[cfg(not(feature = "tui"))]
fn mesh_view(_plan: &mesh::MeshPlan, _style: &FigureStyle, _stats: MatrixStats) -> View {}

#[cfg(feature = "tui")]
fn display(view: View) -> Result<()> {
    crate::tui::run(view)
}

#[cfg(not(feature = "tui"))]
fn display(_view: View) -> Result<()> {
    // Fallback when built without TUI support; build_config never selects it.
    Err(anyhow::anyhow!(
        "built without terminal display support; pass --out to write a file"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("c2clat-plot").chain(argv.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn input_is_required() {
        let err = Cli::try_parse_from(["c2clat-plot", "-o", "x.svg"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn short_flags_and_defaults() {
        let args = parse(&["-i", "c2clat.csv"]);
        let cfg = build_config(&args);
        assert_eq!(cfg.kind, PlotKind::Heatmap);
        assert_eq!(cfg.output, OutputTarget::File(PathBuf::from("c2clat.pdf")));
        assert!(cfg.params.y_ticks);
        assert_eq!(cfg.params.median, MedianPolicy::Pairs);
        assert_eq!(cfg.params.vmin, None);
    }

    #[test]
    fn explicit_options_reach_parameters() {
        let args = parse(&[
            "--input",
            "m.json",
            "--out",
            "plot.png",
            "--title",
            "EPYC",
            "--vmin",
            "-5",
            "--vmax",
            "250",
            "--no-yticks",
            "--figsize",
            "10x8",
            "--median",
            "full",
        ]);
        let cfg = build_config(&args);
        assert_eq!(cfg.output, OutputTarget::File(PathBuf::from("plot.png")));
        assert_eq!(cfg.params.title.as_deref(), Some("EPYC"));
        assert_eq!(cfg.params.vmin, Some(-5.0));
        assert_eq!(cfg.params.vmax, Some(250.0));
        assert!(!cfg.params.y_ticks);
        assert_eq!(
            cfg.params.figure_size,
            Some(FigureSize {
                width: 10.0,
                height: 8.0
            })
        );
        assert_eq!(cfg.params.median, MedianPolicy::Full);
    }

    #[test]
    fn show_conflicts_with_out() {
        let res = Cli::try_parse_from(["c2clat-plot", "-i", "a.csv", "-o", "a.svg", "--show"]);
        assert!(res.is_err());
    }

    #[test]
    fn mesh_without_out_prefers_display() {
        let cfg = build_config(&parse(&["-i", "numa.json", "--mesh"]));
        assert_eq!(cfg.kind, PlotKind::Mesh);
        assert_eq!(cfg.params.title, None);
        if cfg!(feature = "tui") {
            assert_eq!(cfg.output, OutputTarget::Display);
        } else {
            assert_eq!(
                cfg.output,
                OutputTarget::File(PathBuf::from("c2clat-mesh.svg"))
            );
        }
    }

    fn write_input(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).expect("create input");
        f.write_all(text.as_bytes()).expect("write input");
        path
    }

    #[test]
    fn heatmap_pipeline_writes_svg() {
        let dir = TempDir::new().expect("temp dir");
        let input = write_input(&dir, "c2clat.csv", "0\n10,0\n20,15,0\n");
        let out = dir.path().join("c2clat.svg");
        let args = parse(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--title",
            "Test CPU",
        ]);

        let summary = run_heatmap(&build_config(&args)).expect("pipeline succeeds");
        assert_eq!(summary.cores, 3);
        assert_eq!(summary.pairs, 3);
        assert_eq!(summary.stats.median, 15.0);
        assert_eq!(summary.output.as_deref(), Some(out.as_path()));

        let svg = std::fs::read_to_string(&out).expect("svg written");
        assert!(svg.contains("Min=0.0ns Median=15.0ns Max=20.0ns"));
        assert!(svg.contains("CPU 3"));
        assert!(svg.contains("Test CPU"));
    }

    #[test]
    fn heatmap_pipeline_reports_empty_input() {
        let dir = TempDir::new().expect("temp dir");
        let input = write_input(&dir, "empty.csv", "");
        let out = dir.path().join("empty.svg");
        let args = parse(&["-i", input.to_str().unwrap(), "-o", out.to_str().unwrap()]);

        let err = run_heatmap(&build_config(&args)).unwrap_err();
        let root = err.root_cause().to_string();
        assert!(root.contains("empty input"), "{root}");
        assert!(!out.exists());
    }

    #[test]
    fn heatmap_pipeline_writes_pdf() {
        let dir = TempDir::new().expect("temp dir");
        let input = write_input(&dir, "c2clat.csv", "0\n10,0\n20,15,0\n");
        let out = dir.path().join("c2clat.pdf");
        let args = parse(&["-i", input.to_str().unwrap(), "-o", out.to_str().unwrap()]);

        let summary = run_heatmap(&build_config(&args)).expect("pipeline succeeds");
        assert_eq!(summary.output.as_deref(), Some(out.as_path()));
        let bytes = std::fs::read(&out).expect("pdf written");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn unknown_output_extension_is_rejected_with_context() {
        let dir = TempDir::new().expect("temp dir");
        let input = write_input(&dir, "c2clat.json", "[[0], [10, 0]]");
        let out = dir.path().join("c2clat.eps");
        let args = parse(&["-i", input.to_str().unwrap(), "-o", out.to_str().unwrap()]);

        let err = run_heatmap(&build_config(&args)).unwrap_err();
        assert!(format!("{err:#}").contains("unsupported output format"));
        assert!(!out.exists());
    }

    #[test]
    fn heatmap_pipeline_writes_png() {
        let dir = TempDir::new().expect("temp dir");
        let input = write_input(&dir, "c2clat.csv", "0\n10,0\n20,15,0\n");
        let out = dir.path().join("c2clat.png");
        let args = parse(&["-i", input.to_str().unwrap(), "-o", out.to_str().unwrap()]);

        run_heatmap(&build_config(&args)).expect("pipeline succeeds");
        let bytes = std::fs::read(&out).expect("png written");
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn hidden_row_labels_are_not_drawn() {
        let dir = TempDir::new().expect("temp dir");
        let input = write_input(&dir, "c2clat.csv", "0\n10,0\n20,15,0\n");
        let out = dir.path().join("c2clat.svg");
        let args = parse(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--title",
            "Test",
            "--no-yticks",
        ]);

        run_heatmap(&build_config(&args)).expect("pipeline succeeds");
        let svg = std::fs::read_to_string(&out).expect("svg written");
        assert!(!svg.contains("CPU 1"));
        assert!(svg.contains("Median=15.0ns"));
    }

    #[test]
    fn mesh_pipeline_writes_svg() {
        let dir = TempDir::new().expect("temp dir");
        let input = write_input(
            &dir,
            "numa.json",
            r#"{"node0": {"node0": 80, "node1": 140}, "node1": {"node0": 150, "node1": 75}}"#,
        );
        let out = dir.path().join("mesh.svg");
        let args = parse(&[
            "-i",
            input.to_str().unwrap(),
            "--mesh",
            "-o",
            out.to_str().unwrap(),
        ]);

        let summary = run_mesh(&build_config(&args)).expect("pipeline succeeds");
        assert_eq!(summary.cores, 2);
        assert_eq!(summary.vmin, 75.0);
        assert_eq!(summary.vmax, 150.0);
        let svg = std::fs::read_to_string(&out).expect("svg written");
        assert!(svg.contains("node"));
    }
}
