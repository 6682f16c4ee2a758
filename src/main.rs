use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use importscope::analysis::{analyze_directory, ExclusionFilter};
use importscope::config::Config;
use importscope::export::{self, AnalysisReport, ExportData, ExportFormat};
use importscope::graph::{Category, ImportGraph};
use importscope::layout::{LayoutEngine, LayoutSession, LayoutStrategy};
use importscope::ui::{run_app, App};

#[derive(Parser)]
#[command(name = "importscope")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Import graph analyzer with layered, circular, tree and force layouts", long_about = None)]
struct Cli {
    /// Config file (defaults to importscope.toml in the project root)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze imports in a project and print the graph
    Analyze {
        /// Path to analyze (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Output format: json or markdown
        #[arg(short, long, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Leave external packages out of the graph
        #[arg(long)]
        no_external: bool,

        /// Glob of project-relative paths to skip (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,
    },
    /// Compute node positions for an analysis report
    Layout {
        /// Report written by `analyze` (reads stdin when omitted or "-")
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// hierarchical, circular, tree or force
        #[arg(short, long)]
        strategy: Option<LayoutStrategy>,

        #[arg(long)]
        width: Option<f32>,

        #[arg(long)]
        height: Option<f32>,

        /// Force ticks to run before printing (capped at 300)
        #[arg(long)]
        ticks: Option<u32>,

        /// Seed for the force layout's starting jitter
        #[arg(long)]
        seed: Option<u64>,

        /// Category to leave out (repeatable)
        #[arg(long)]
        hide: Vec<Category>,
    },
    /// Open an interactive terminal preview of the layout
    Preview {
        /// Path to analyze (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(explicit: Option<&Path>, root: &Path) -> Result<Config> {
    match explicit {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Config::discover(root).context("failed to load project config"),
    }
}

fn analyze_project(root: &Path, config: &Config, extra_excludes: &[String]) -> Result<ImportGraph> {
    let rules = config.rule_set()?;
    let filter = ExclusionFilter::from_globs(
        config
            .analysis
            .exclude
            .iter()
            .chain(extra_excludes)
            .map(String::as_str),
    )?;
    let graph = analyze_directory(root, &rules, filter, &config.analysis_options())
        .with_context(|| format!("failed to analyze {}", root.display()))?;
    Ok(graph)
}

fn project_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| root.display().to_string())
}

fn read_report(input: Option<&Path>) -> Result<AnalysisReport> {
    match input {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("failed to open report {}", path.display()))?;
            AnalysisReport::from_reader(BufReader::new(file))
                .with_context(|| format!("failed to parse report {}", path.display()))
        }
        _ => AnalysisReport::from_reader(io::stdin().lock()).context("failed to parse report from stdin"),
    }
}

fn run_preview(root: &Path, config: &Config) -> Result<()> {
    let graph = analyze_project(root, config, &[])?;
    let (nodes, edges) = graph.to_parts();
    let mut session = LayoutSession::new(LayoutEngine::new(), config.layout_config());
    session.set_graph(nodes, edges);
    let mut app = App::new(session);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, &mut app, || {
        let rules = config.rule_set().map_err(io::Error::other)?;
        let filter = ExclusionFilter::from_globs(config.analysis.exclude.iter().map(String::as_str))?;
        analyze_directory(root, &rules, filter, &config.analysis_options())
    });

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.context("preview failed")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            path,
            format,
            no_external,
            exclude,
        } => {
            let mut config = load_config(cli.config.as_deref(), &path)?;
            if no_external {
                config.analysis.include_external = false;
            }

            let graph = analyze_project(&path, &config, &exclude)?;
            let data = ExportData::new(project_name(&path), &graph, config.analysis.max_diagnostics);
            if !data.cycles.is_empty() {
                info!(cycles = data.cycles.len(), "import cycles detected");
            }

            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            export::export(format, &data, &mut writer)?;
            writer.flush()?;
        }
        Commands::Layout {
            input,
            strategy,
            width,
            height,
            ticks,
            seed,
            hide,
        } => {
            let config = load_config(cli.config.as_deref(), Path::new("."))?;
            let mut layout_config = config.layout_config();
            if let Some(strategy) = strategy {
                layout_config.strategy = strategy;
            }
            if let Some(width) = width {
                layout_config.viewport_width = width;
            }
            if let Some(height) = height {
                layout_config.viewport_height = height;
            }
            if let Some(seed) = seed {
                layout_config.seed = seed;
            }
            layout_config.filter.hidden_categories.extend(hide);

            let report = read_report(input.as_deref())?;
            let mut engine = LayoutEngine::new();
            let layout = if layout_config.strategy == LayoutStrategy::Force {
                let mut simulation =
                    engine.start_force(report.nodes(), report.edges(), &layout_config, 0);
                let limit = ticks.unwrap_or(importscope::layout::MAX_TICKS);
                for _ in 0..limit {
                    if !simulation.tick() {
                        break;
                    }
                }
                info!(ticks = simulation.ticks(), "force layout refined");
                simulation.layout()
            } else {
                engine.compute_layout(report.nodes(), report.edges(), &layout_config)
            };

            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            serde_json::to_writer_pretty(&mut writer, &layout)?;
            writeln!(writer)?;
            writer.flush()?;
        }
        Commands::Preview { path } => {
            let config = load_config(cli.config.as_deref(), &path)?;
            run_preview(&path, &config)?;
        }
    }

    Ok(())
}
