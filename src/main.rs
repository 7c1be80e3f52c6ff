use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use graph_composer::config::ComposerConfig;
use graph_composer::graph::GraphComposer;
use graph_composer::model::{SnapshotSource, DEFAULT_SNAPSHOT_FILE};

#[derive(Parser)]
#[command(name = "graph-composer")]
#[command(version)]
#[command(about = "Dependency graph visualizer with version staleness reporting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the dependency graph and open it in the system viewer
    Show {
        #[command(flatten)]
        args: ComposeArgs,
    },
    /// Render the dependency graph to an image file
    Export {
        #[command(flatten)]
        args: ComposeArgs,

        /// Output image path (defaults to a temporary file)
        output: Option<PathBuf>,
    },
    /// Show version information
    Version,
}

#[derive(Args)]
struct ComposeArgs {
    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Image format, e.g. svg, png or dot
    #[arg(short, long)]
    format: Option<String>,

    /// Maximum depth of dependencies to draw
    #[arg(short, long)]
    depth: Option<usize>,

    /// Color packages by how outdated they are
    #[arg(short, long)]
    colorize: bool,

    /// Write dependency statistics to this file (e.g. stats.json)
    #[arg(long)]
    export: Option<PathBuf>,

    /// Exclude packages whose name matches this regex (repeatable)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Exclude dependencies whose constraint matches this regex (repeatable)
    #[arg(long)]
    exclude_constraint: Vec<String>,

    /// Leave out dev dependencies entirely
    #[arg(long)]
    no_dev: bool,

    /// Dependency snapshot file, relative to the project directory
    #[arg(long, default_value = DEFAULT_SNAPSHOT_FILE)]
    snapshot: PathBuf,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl ComposeArgs {
    /// Loads the project's configuration file and applies the flags on top.
    fn config(&self) -> Result<ComposerConfig> {
        let mut config = ComposerConfig::load(&self.dir)
            .with_context(|| format!("Failed to load configuration for {}", self.dir.display()))?;

        if let Some(format) = &self.format {
            config.format = format.clone();
        }
        if self.depth.is_some() {
            config.max_depth = self.depth;
        }
        if self.export.is_some() {
            config.export_file = self.export.clone();
        }
        config.colorize |= self.colorize;
        config.no_dev |= self.no_dev;
        config.exclude_packages.extend(self.exclude.iter().cloned());
        config
            .exclude_constraints
            .extend(self.exclude_constraint.iter().cloned());

        Ok(config)
    }

    fn composer(&self, config: &ComposerConfig) -> Result<GraphComposer> {
        let source = SnapshotSource::new(&self.snapshot);
        GraphComposer::from_config(config, &source)
            .with_context(|| format!("Failed to analyze {}", self.dir.display()))
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

/// Format implied by the output file, falling back to the configured one.
fn output_format(output: &Path, args: &ComposeArgs, config: &ComposerConfig) -> String {
    match (&args.format, output.extension().and_then(|e| e.to_str())) {
        (Some(format), _) => format.clone(),
        (None, Some(extension)) => extension.to_lowercase(),
        (None, None) => config.format.clone(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Show { args }) => {
            init_tracing(args.verbose);
            let config = args.config()?;
            let composer = args.composer(&config)?;
            let path = composer.display_graph().context("Failed to display graph")?;
            println!("{}", path.display());
        }
        Some(Commands::Export { args, output }) => {
            init_tracing(args.verbose);
            let config = args.config()?;
            let mut composer = args.composer(&config)?;

            let path = match output {
                Some(output) => {
                    composer.set_format(&output_format(&output, &args, &config));
                    composer
                        .write_image(&output)
                        .with_context(|| format!("Failed to write {}", output.display()))?;
                    output
                }
                None => composer.image_path().context("Failed to render graph")?,
            };
            println!("{}", path.display());
        }
        Some(Commands::Version) => {
            println!("graph-composer v{}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            println!("Graph Composer - dependency graph visualizer");
            println!("Run 'graph-composer show' to open the dependency graph");
            println!("Run 'graph-composer --help' for more information");
        }
    }

    Ok(())
}
