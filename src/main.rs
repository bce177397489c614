use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use okpalette::models::{Clustering, DensityArgs, ExtractionConfig, KMeansArgs};
use okpalette::services::palette_io::read_palette;
use okpalette::services::BatchProcessor;

#[derive(Parser)]
#[command(name = "okpalette")]
#[command(about = "Extract perceptually distinct color palettes from images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract palettes from an image or every image below a directory
    Extract {
        /// Input PNG file or directory
        input: PathBuf,

        /// Directory for palette JSON files and thumbnails
        #[arg(short, long)]
        output: PathBuf,

        /// YAML configuration file; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Clustering method
        #[arg(short, long, value_enum)]
        method: Option<MethodArg>,

        /// Smallest K tried (kmeans)
        #[arg(long)]
        min_k: Option<usize>,

        /// Largest K tried (kmeans)
        #[arg(long)]
        max_k: Option<usize>,

        /// Runs per K (kmeans)
        #[arg(long)]
        trials: Option<usize>,

        /// Neighbourhood radius in Oklab units (density)
        #[arg(long)]
        epsilon: Option<f32>,

        /// Neighbours needed for a dense point (density)
        #[arg(long)]
        min_points: Option<usize>,

        /// Minimum Okhsl distance between palette colors, 0 disables
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Longest image side analysed
        #[arg(long)]
        max_resolution: Option<u32>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Print the colors of palette files
    Show {
        /// Palette JSON files
        #[arg(required = true)]
        palettes: Vec<PathBuf>,
    },
    /// Print the default configuration as YAML
    Config,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    Kmeans,
    Density,
}

/// Command line values that replace configuration file values.
struct Overrides {
    method: Option<MethodArg>,
    min_k: Option<usize>,
    max_k: Option<usize>,
    trials: Option<usize>,
    epsilon: Option<f32>,
    min_points: Option<usize>,
    threshold: Option<f32>,
    max_resolution: Option<u32>,
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "okpalette=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            output,
            config,
            method,
            min_k,
            max_k,
            trials,
            epsilon,
            min_points,
            threshold,
            max_resolution,
            seed,
        } => {
            let overrides = Overrides {
                method,
                min_k,
                max_k,
                trials,
                epsilon,
                min_points,
                threshold,
                max_resolution,
                seed,
            };
            run_extract_command(&input, &output, config.as_deref(), overrides)
        }
        Commands::Show { palettes } => run_show_command(&palettes),
        Commands::Config => {
            print!("{}", ExtractionConfig::default().to_yaml_string()?);
            Ok(())
        }
    }
}

fn run_extract_command(
    input: &Path,
    output: &Path,
    config_path: Option<&Path>,
    overrides: Overrides,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => ExtractionConfig::load(path)?,
        None => ExtractionConfig::default(),
    };
    let config = apply_overrides(config, overrides);

    let processor = BatchProcessor::new(config, output)?;
    let report = processor.run(input)?;

    for out in &report.outputs {
        println!(
            "{} -> {} ({} colors)",
            out.input.display(),
            out.palette.display(),
            out.colors
        );
    }
    for (path, error) in &report.failures {
        eprintln!("{}: {error}", path.display());
    }

    if report.outputs.is_empty() && !report.failures.is_empty() {
        anyhow::bail!("No palette extracted, {} file(s) failed", report.failures.len());
    }
    Ok(())
}

fn apply_overrides(mut config: ExtractionConfig, o: Overrides) -> ExtractionConfig {
    match (o.method, &config.clustering) {
        (Some(MethodArg::Kmeans), Clustering::Density(_)) => {
            config.clustering = Clustering::KMeans(KMeansArgs::default());
        }
        (Some(MethodArg::Density), Clustering::KMeans(_)) => {
            config.clustering = Clustering::Density(DensityArgs::default());
        }
        _ => {}
    }

    match &mut config.clustering {
        Clustering::KMeans(args) => {
            args.min_k = o.min_k.unwrap_or(args.min_k);
            args.max_k = o.max_k.unwrap_or(args.max_k);
            args.trials = o.trials.unwrap_or(args.trials);
            if o.epsilon.is_some() || o.min_points.is_some() {
                tracing::warn!("--epsilon and --min-points only apply to the density method");
            }
        }
        Clustering::Density(args) => {
            args.epsilon = o.epsilon.unwrap_or(args.epsilon);
            args.min_points = o.min_points.unwrap_or(args.min_points);
            if o.min_k.is_some() || o.max_k.is_some() || o.trials.is_some() {
                tracing::warn!("--min-k, --max-k and --trials only apply to the kmeans method");
            }
        }
    }

    config.dedup_threshold = o.threshold.unwrap_or(config.dedup_threshold);
    config.max_resolution = o.max_resolution.unwrap_or(config.max_resolution);
    config.seed = o.seed.unwrap_or(config.seed);
    config
}

fn run_show_command(paths: &[PathBuf]) -> anyhow::Result<()> {
    for path in paths {
        let palette = read_palette(path)?;
        println!("{} ({} colors)", path.display(), palette.len());
        for hex in palette.hex_codes() {
            println!("  {hex}");
        }
    }
    Ok(())
}
