//! Command-line interface for the player classification pipeline.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::core::context::RunContext;
use crate::core::dataset::DataSet;
use crate::core::loaders::read_point_file;
use crate::core::writers::{write_classified_ply, write_clusters_csv};
use crate::processors::classification::ClassificationAlg;
use crate::processors::clustering::run_clustering;
use crate::processors::mva::NearestCentroidEngine;
use crate::visualization::plot_classified_clusters;

#[derive(Parser)]
#[command(name = "cloud-teams")]
#[command(about = "Find players in a coloured point cloud and sort them into teams", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster the point cloud and classify the players
    Classify {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        clustering: ClusteringArgs,
        #[command(flatten)]
        classification: ClassificationArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Cluster the whole point cloud without classification
    Cluster {
        /// Point file with `X Y Z R G B` lines
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        clustering: ClusteringArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Write the default configuration as YAML
    DefaultConfig {
        /// Output YAML file
        path: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct InputArgs {
    /// Point file with `X Y Z R G B` lines
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Fraction of points kept for evaluation
    #[arg(long)]
    evaluation_fraction: Option<f32>,
    /// Random seed of the run
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug, Default)]
struct ClusteringArgs {
    /// Put every point in its own pre-cluster
    #[arg(long)]
    skip_pre_clustering: bool,
    /// Half-width of the pre-clustering box
    #[arg(long)]
    pre_clustering_size: Option<f32>,
    /// Half-width of the density window
    #[arg(long)]
    density_window: Option<f32>,
    /// Minimum normalized density of a seed
    #[arg(long)]
    seed_threshold: Option<f32>,
    /// Outlier cut in standard deviations
    #[arg(long)]
    core_size: Option<f32>,
}

#[derive(Args, Debug, Default)]
struct ClassificationArgs {
    /// Classify with the trained engine instead of PCA + k-means
    #[arg(long)]
    supervised: bool,
    /// Layers per cluster colour profile
    #[arg(long)]
    layers: Option<usize>,
    /// Train the engine on the training clusters first
    #[arg(long)]
    run_training: bool,
    /// Engine model file to save or load
    #[arg(long)]
    engine_model: Option<PathBuf>,
    /// Ground-truth `X Z Class` file
    #[arg(long)]
    truth: Option<PathBuf>,
    /// Bootstrap sub-clusters per training cluster
    #[arg(long)]
    split_n: Option<usize>,
    /// Point inclusion probability of a sub-cluster
    #[arg(long)]
    split_f: Option<f32>,
    /// Iteration cap of k-means
    #[arg(long)]
    max_kmeans_iterations: Option<usize>,
}

#[derive(Args, Debug, Default)]
struct OutputArgs {
    /// CSV summary of the clusters
    #[arg(long)]
    csv: Option<PathBuf>,
    /// PLY file of classified core points
    #[arg(long)]
    ply: Option<PathBuf>,
    /// PNG plot of the clusters
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Maximum number of points to plot (subsamples if exceeded)
    #[arg(long, default_value_t = 1_000_000)]
    max_plot_points: usize,
}

impl InputArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(input) = &self.input {
            config.input.input_file = input.clone();
        }
        if let Some(fraction) = self.evaluation_fraction {
            config.input.evaluation_fraction = fraction;
        }
        if let Some(seed) = self.seed {
            config.input.random_seed = seed;
        }
    }
}

impl ClusteringArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        let c = &mut config.clustering;
        c.skip_pre_clustering |= self.skip_pre_clustering;
        c.pre_clustering_size = self.pre_clustering_size.unwrap_or(c.pre_clustering_size);
        c.density_window = self.density_window.unwrap_or(c.density_window);
        c.seed_density_threshold = self.seed_threshold.unwrap_or(c.seed_density_threshold);
        c.cluster_core_size = self.core_size.unwrap_or(c.cluster_core_size);
    }
}

impl ClassificationArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        let c = &mut config.classification;
        if self.supervised {
            c.unsupervised = false;
        }
        c.run_training |= self.run_training;
        c.n_layers_per_cluster = self.layers.unwrap_or(c.n_layers_per_cluster);
        if let Some(path) = &self.engine_model {
            c.engine_model_file = path.clone();
        }
        if let Some(path) = &self.truth {
            c.true_positions_file = path.clone();
        }
        c.training_clusters_split_n = self.split_n.unwrap_or(c.training_clusters_split_n);
        c.training_clusters_split_f = self.split_f.unwrap_or(c.training_clusters_split_f);
        c.max_kmeans_iterations = self
            .max_kmeans_iterations
            .unwrap_or(c.max_kmeans_iterations);
    }
}

impl OutputArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        let o = &mut config.output;
        o.clusters_csv = self.csv.clone().or(o.clusters_csv.take());
        o.classified_ply = self.ply.clone().or(o.classified_ply.take());
        o.plot = self.plot.clone().or(o.plot.take());
    }
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

/// One report line: `Name: [[x, z], ...]` with two decimals.
pub fn format_class_positions(name: &str, positions: &[[f32; 2]]) -> String {
    let items: Vec<String> = positions
        .iter()
        .map(|[x, z]| format!("[{:.2}, {:.2}]", x, z))
        .collect();
    format!("{}: [{}]", name, items.join(", "))
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let mut config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    let result = match cli.command {
        Commands::Classify {
            input,
            clustering,
            classification,
            output,
        } => {
            input.apply(&mut config);
            clustering.apply(&mut config);
            classification.apply(&mut config);
            output.apply(&mut config);
            cmd_classify(&config, output.max_plot_points)
        }
        Commands::Cluster {
            input,
            clustering,
            output,
        } => {
            if let Some(path) = input {
                config.input.input_file = path;
            }
            config.input.evaluation_fraction = 0.0;
            clustering.apply(&mut config);
            output.apply(&mut config);
            cmd_cluster(&config, output.max_plot_points)
        }
        Commands::DefaultConfig { path } => cmd_default_config(&path),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn cmd_default_config(path: &Path) -> Result<()> {
    PipelineConfig::default()
        .to_yaml(path)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    println!("Default configuration written to {}", path.display());
    Ok(())
}

fn load_and_cluster(config: &PipelineConfig, ctx: &mut RunContext) -> Result<(DataSet, DataSet)> {
    let input_file = &config.input.input_file;
    let spinner = create_spinner("Reading point file...");
    let loaded = read_point_file(input_file, config.input.evaluation_fraction, ctx)
        .with_context(|| format!("Failed to load points from {}", input_file.display()));
    let (mut training, mut evaluation) = match loaded {
        Ok(sets) => sets,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };

    spinner.set_message("Clustering...");
    for (name, ds) in [("training", &mut training), ("evaluation", &mut evaluation)] {
        if let Err(e) = run_clustering(ds, &config.clustering) {
            spinner.finish_and_clear();
            return Err(e).with_context(|| format!("Clustering of the {} data failed", name));
        }
    }
    spinner.finish_and_clear();
    Ok((training, evaluation))
}

fn write_outputs(
    config: &PipelineConfig,
    ds: &DataSet,
    class_names: &[String],
    max_plot_points: usize,
) -> Result<Vec<(&'static str, String)>> {
    let mut written = Vec::new();
    if let Some(path) = &config.output.clusters_csv {
        write_clusters_csv(path, ds, class_names)?;
        written.push(("Output CSV", path.display().to_string()));
    }
    if let Some(path) = &config.output.classified_ply {
        write_classified_ply(path, ds)?;
        written.push(("Output PLY", path.display().to_string()));
    }
    if let Some(path) = &config.output.plot {
        plot_classified_clusters(path, ds, max_plot_points)?;
        written.push(("Output PNG", path.display().to_string()));
    }
    Ok(written)
}

fn cmd_classify(config: &PipelineConfig, max_plot_points: usize) -> Result<()> {
    config.validate()?;
    let start = Instant::now();
    let cfg = &config.classification;

    println!("Classifying players...");
    println!("Input: {}", config.input.input_file.display());
    println!(
        "Mode: {}",
        if cfg.unsupervised {
            "unsupervised (PCA + k-means)"
        } else {
            "supervised"
        }
    );

    let mut ctx = RunContext::from_config(&config.input);
    let (mut training, mut evaluation) = load_and_cluster(config, &mut ctx)?;

    let mut engine = if cfg.unsupervised || cfg.run_training {
        NearestCentroidEngine::default()
    } else {
        NearestCentroidEngine::load(&cfg.engine_model_file).with_context(|| {
            format!(
                "No trained engine at {}, run with --run-training first",
                cfg.engine_model_file.display()
            )
        })?
    };

    let spinner = create_spinner("Classifying clusters...");
    let mut alg = ClassificationAlg::new();
    let classified =
        alg.classify_clusters(&mut training, &mut evaluation, cfg, &mut ctx.rng, &mut engine);
    spinner.finish_and_clear();
    classified.context("Classification failed")?;

    if !cfg.unsupervised && cfg.run_training {
        engine.save(&cfg.engine_model_file)?;
        info!("Engine model saved to {}", cfg.engine_model_file.display());
    }

    for (name, positions) in alg.positions_by_class(&evaluation) {
        println!("{}", format_class_positions(&name, &positions));
    }

    let mut items = vec![
        ("Input file", config.input.input_file.display().to_string()),
        ("Training clusters", training.clusters().len().to_string()),
        ("Evaluation clusters", evaluation.clusters().len().to_string()),
    ];
    items.extend(write_outputs(
        config,
        &evaluation,
        alg.class_names(),
        max_plot_points,
    )?);
    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("Classification Complete", &items);
    Ok(())
}

fn cmd_cluster(config: &PipelineConfig, max_plot_points: usize) -> Result<()> {
    config.validate()?;
    let start = Instant::now();

    println!("Clustering point cloud...");
    println!("Input: {}", config.input.input_file.display());
    println!("Parameters:");
    println!("  pre_clustering_size: {}", config.clustering.pre_clustering_size);
    println!("  density_window: {}", config.clustering.density_window);
    println!("  seed_density_threshold: {}", config.clustering.seed_density_threshold);
    println!("  cluster_core_size: {}", config.clustering.cluster_core_size);

    let mut ctx = RunContext::from_config(&config.input);
    let (ds, _) = load_and_cluster(config, &mut ctx)?;

    let core_points: usize = ds
        .clusters()
        .iter()
        .filter_map(|cl| cl.core())
        .map(|core| core.len())
        .sum();

    let mut items = vec![
        ("Input file", config.input.input_file.display().to_string()),
        ("Points", ds.points().len().to_string()),
        ("Pre-clusters", ds.pre_clusters().len().to_string()),
        ("Clusters found", ds.clusters().len().to_string()),
        ("Core points", core_points.to_string()),
    ];
    items.extend(write_outputs(config, &ds, &[], max_plot_points)?);
    items.push(("Duration", format!("{:.2?}", start.elapsed())));
    print_summary("Clustering Complete", &items);
    Ok(())
}
