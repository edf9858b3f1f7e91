//! Tristream CLI: streaming triangle estimation over edge-list files
//!
//! `run` streams one file through one estimator (or several seeded trials
//! in parallel); `compare` runs every sampling scheme over the same input.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::{ContentArrangement, Table};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tristream::algo::{evaluate, AccuracyReport};
use tristream::io::{read_local_counts, write_local_estimates, Delimiter, EdgeReaderOptions};
use tristream::{
    build_estimator, AdmissionRate, EdgeReader, EstimatorConfig, IoError, LocalCounts,
    RoundWeighting, SamplingScheme, TriangleEstimator, VertexId,
};

#[derive(Parser)]
#[command(name = "tristream", version, about = "Fixed-memory triangle estimation over edge streams")]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum SchemeArg {
    Bernoulli,
    Reservoir,
    RoundBatched,
    Adaptive,
    WaitingRoom,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum AdmissionArg {
    Decaying,
    Turnover,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum WeightingArg {
    PerEdge,
    Uniform,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum OnMalformed {
    /// Abort on the first malformed line
    Fail,
    /// Log and skip malformed lines
    Skip,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Edge-list file, one `u v` pair per line
    input: PathBuf,

    /// Column delimiter: `ws`, `tab`, or a single character
    #[arg(long, default_value = "ws")]
    delimiter: String,

    /// Skip the first record line
    #[arg(long)]
    skip_header: bool,

    /// What to do with lines that are not two vertex ids
    #[arg(long, value_enum, default_value = "fail")]
    on_malformed: OnMalformed,

    /// Exact per-vertex counts (`id count` lines) to score estimates against
    #[arg(long)]
    truth: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct SchemeParams {
    /// Memory budget in edges
    #[arg(short = 'k', long, default_value_t = 100_000)]
    capacity: usize,

    /// RNG seed; trial `i` uses `seed + i`
    #[arg(long)]
    seed: Option<u64>,

    /// Bernoulli sampling probability
    #[arg(long, default_value_t = 0.1)]
    probability: f64,

    /// Fixed discard rate for round-batched eviction
    #[arg(long, default_value_t = 0.2)]
    alpha: f64,

    /// Adaptive target retention
    #[arg(long, default_value_t = 0.5)]
    z: f64,

    /// Rounds that use the initial discard rate before adapting
    #[arg(long, default_value_t = 5)]
    round_bound: u32,

    /// Initial and minimum adaptive discard rate
    #[arg(long, default_value_t = 0.1)]
    init_alpha: f64,

    /// Admission probability after eviction
    #[arg(long, value_enum, default_value = "decaying")]
    admission: AdmissionArg,

    /// Triangle weighting for fixed-rate round batching; `uniform` needs decaying admission
    #[arg(long, value_enum, default_value = "per-edge")]
    weighting: WeightingArg,

    /// Fraction of the budget used as waiting room
    #[arg(long, default_value_t = 0.1)]
    alpha_wr: f64,
}

impl SchemeParams {
    fn scheme(&self, scheme: SchemeArg) -> SamplingScheme {
        let admission = match self.admission {
            AdmissionArg::Decaying => AdmissionRate::Decaying,
            AdmissionArg::Turnover => AdmissionRate::Turnover,
        };
        match scheme {
            SchemeArg::Bernoulli => SamplingScheme::Bernoulli {
                probability: self.probability,
            },
            SchemeArg::Reservoir => SamplingScheme::Reservoir,
            SchemeArg::RoundBatched => SamplingScheme::RoundBatched {
                alpha: self.alpha,
                admission,
                weighting: match self.weighting {
                    WeightingArg::PerEdge => RoundWeighting::PerEdge,
                    WeightingArg::Uniform => RoundWeighting::Uniform,
                },
            },
            SchemeArg::Adaptive => SamplingScheme::Adaptive {
                z: self.z,
                round_bound: self.round_bound,
                init_alpha: self.init_alpha,
                admission,
            },
            SchemeArg::WaitingRoom => SamplingScheme::WaitingRoom {
                alpha_wr: self.alpha_wr,
            },
        }
    }

    fn config(&self, scheme: SchemeArg) -> Result<EstimatorConfig> {
        let config = EstimatorConfig {
            capacity: self.capacity,
            seed: self.seed,
            scheme: self.scheme(scheme),
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate triangle counts for one edge stream
    Run {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        params: SchemeParams,

        /// Sampling scheme
        #[arg(long, value_enum, default_value = "adaptive")]
        scheme: SchemeArg,

        /// YAML estimator config; replaces the scheme flags, `--seed` still applies
        #[arg(long)]
        config: Option<PathBuf>,

        /// Independent trials, run in parallel
        #[arg(long, default_value_t = 1)]
        trials: usize,

        /// Log progress every N edges (0 disables)
        #[arg(long, default_value_t = 1_000_000)]
        progress_every: u64,

        /// Write per-vertex estimates here (trial mean when trials > 1)
        #[arg(long)]
        local_out: Option<PathBuf>,

        /// Write every vertex id from 0 to the largest seen
        #[arg(long)]
        dense: bool,
    },
    /// Run several sampling schemes over the same stream
    Compare {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        params: SchemeParams,

        /// Schemes to compare
        #[arg(
            long,
            value_enum,
            value_delimiter = ',',
            default_value = "bernoulli,reservoir,round-batched,adaptive,waiting-room"
        )]
        schemes: Vec<SchemeArg>,

        /// Trials per scheme
        #[arg(long, default_value_t = 1)]
        trials: usize,
    },
}

/// Outcome of one estimator run
#[derive(Debug, Clone, Serialize)]
struct TrialSummary {
    trial: usize,
    scheme: String,
    seed: Option<u64>,
    global: f64,
    discovered_triangles: u64,
    edges_processed: u64,
    sampled_edges: usize,
    round: u32,
    discard_rate: Option<f64>,
    elapsed_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    accuracy: Option<AccuracyReport>,
}

struct TrialOutcome {
    summary: TrialSummary,
    local: LocalCounts,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            input,
            params,
            scheme,
            config,
            trials,
            progress_every,
            local_out,
            dense,
        } => {
            let config = match config {
                Some(path) => load_config(&path, params.seed),
                None => params.config(scheme),
            };
            config.and_then(|config| {
                run(
                    &input,
                    &config,
                    trials,
                    progress_every,
                    local_out.as_deref(),
                    dense,
                    cli.format,
                )
            })
        }
        Commands::Compare {
            input,
            params,
            schemes,
            trials,
        } => compare(&input, &params, &schemes, trials, cli.format),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path, seed: Option<u64>) -> Result<EstimatorConfig> {
    let mut config = EstimatorConfig::from_yaml_file(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    if seed.is_some() {
        config.seed = seed;
    }
    Ok(config)
}

fn reader_options(input: &InputArgs) -> Result<EdgeReaderOptions> {
    let Some(delimiter) = Delimiter::parse(&input.delimiter) else {
        bail!("invalid delimiter {:?}", input.delimiter);
    };
    Ok(EdgeReaderOptions {
        delimiter,
        skip_header: input.skip_header,
    })
}

/// Stream every edge of the input into `sink`. Returns the number of
/// malformed lines skipped.
fn for_each_edge<F>(input: &InputArgs, mut sink: F) -> Result<usize>
where
    F: FnMut(VertexId, VertexId),
{
    let reader = EdgeReader::open(&input.input, reader_options(input)?)
        .with_context(|| format!("failed to open {}", input.input.display()))?;
    let mut skipped = 0;
    for record in reader {
        match record {
            Ok((u, v)) => sink(u, v),
            Err(IoError::Malformed { line, content }) if input.on_malformed == OnMalformed::Skip => {
                warn!("Skipping malformed line {}: {:?}", line, content);
                skipped += 1;
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to read {}", input.input.display())))
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {} malformed lines in {}", skipped, input.input.display());
    }
    Ok(skipped)
}

fn load_edges(input: &InputArgs) -> Result<Vec<(VertexId, VertexId)>> {
    let started = Instant::now();
    let mut edges = Vec::new();
    for_each_edge(input, |u, v| edges.push((u, v)))?;
    info!(
        "Loaded {} edges from {} in {:?}",
        edges.len(),
        input.input.display(),
        started.elapsed()
    );
    Ok(edges)
}

fn load_truth(input: &InputArgs) -> Result<Option<LocalCounts>> {
    let Some(path) = &input.truth else {
        return Ok(None);
    };
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let counts = read_local_counts(BufReader::new(file))
        .with_context(|| format!("failed to read {}", path.display()))?;
    info!("Loaded ground truth for {} vertices", counts.len());
    Ok(Some(counts))
}

fn trial_seed(seed: Option<u64>, trial: usize) -> Option<u64> {
    seed.map(|s| s.wrapping_add(trial as u64))
}

fn log_progress(estimator: &dyn TriangleEstimator, every: u64) {
    let processed = estimator.edges_processed();
    if every > 0 && processed % every == 0 {
        info!(
            "Processed {} edges: estimate {:.1}, {} sampled, round {}",
            processed,
            estimator.global_estimate(),
            estimator.sampled_edges(),
            estimator.round()
        );
    }
}

fn summarize(
    trial: usize,
    config: &EstimatorConfig,
    estimator: &dyn TriangleEstimator,
    started: Instant,
    truth: Option<&LocalCounts>,
) -> TrialOutcome {
    let local = estimator.local_estimates().clone();
    let accuracy = truth.map(|truth| evaluate(estimator.global_estimate(), &local, truth));
    TrialOutcome {
        summary: TrialSummary {
            trial,
            scheme: estimator.scheme_name().to_string(),
            seed: config.seed,
            global: estimator.global_estimate(),
            discovered_triangles: estimator.discovered_triangles(),
            edges_processed: estimator.edges_processed(),
            sampled_edges: estimator.sampled_edges(),
            round: estimator.round(),
            discard_rate: estimator.discard_rate(),
            elapsed_ms: started.elapsed().as_millis(),
            accuracy,
        },
        local,
    }
}

fn run_trial(
    trial: usize,
    config: &EstimatorConfig,
    edges: &[(VertexId, VertexId)],
    truth: Option<&LocalCounts>,
    progress_every: u64,
) -> Result<TrialOutcome> {
    let mut estimator = build_estimator(config)?;
    let started = Instant::now();
    for &(u, v) in edges {
        estimator.process_edge(u, v);
        log_progress(estimator.as_ref(), progress_every);
    }
    Ok(summarize(trial, config, estimator.as_ref(), started, truth))
}

fn run(
    input: &InputArgs,
    config: &EstimatorConfig,
    trials: usize,
    progress_every: u64,
    local_out: Option<&Path>,
    dense: bool,
    format: OutputFormat,
) -> Result<()> {
    if trials == 0 {
        bail!("--trials must be at least 1");
    }
    let truth = load_truth(input)?;

    let outcomes = if trials == 1 {
        let mut estimator = build_estimator(config)?;
        let started = Instant::now();
        for_each_edge(input, |u, v| {
            estimator.process_edge(u, v);
            log_progress(estimator.as_ref(), progress_every);
        })?;
        vec![summarize(0, config, estimator.as_ref(), started, truth.as_ref())]
    } else {
        let edges = load_edges(input)?;
        (0..trials)
            .into_par_iter()
            .map(|trial| {
                let trial_config = EstimatorConfig {
                    seed: trial_seed(config.seed, trial),
                    ..config.clone()
                };
                run_trial(trial, &trial_config, &edges, truth.as_ref(), progress_every)
            })
            .collect::<Result<Vec<_>>>()?
    };

    if let Some(path) = local_out {
        let locals: Vec<&LocalCounts> = outcomes.iter().map(|o| &o.local).collect();
        let mean = mean_local(&locals);
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        write_local_estimates(&mut BufWriter::new(file), &mean, dense)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote {} local estimates to {}", mean.len(), path.display());
    }

    let summaries: Vec<TrialSummary> = outcomes.into_iter().map(|o| o.summary).collect();
    print_summaries(&summaries, format)?;
    if summaries.len() > 1 && matches!(format, OutputFormat::Table) {
        let (mean, std) = mean_std(summaries.iter().map(|s| s.global));
        println!("Global estimate over {} trials: {:.2} (std {:.2})", summaries.len(), mean, std);
    }
    Ok(())
}

fn compare(
    input: &InputArgs,
    params: &SchemeParams,
    schemes: &[SchemeArg],
    trials: usize,
    format: OutputFormat,
) -> Result<()> {
    if trials == 0 {
        bail!("--trials must be at least 1");
    }
    let configs = schemes
        .iter()
        .map(|&scheme| params.config(scheme))
        .collect::<Result<Vec<_>>>()?;
    let truth = load_truth(input)?;
    let edges = load_edges(input)?;

    let jobs: Vec<(usize, EstimatorConfig)> = configs
        .iter()
        .flat_map(|config| {
            (0..trials).map(move |trial| {
                let config = EstimatorConfig {
                    seed: trial_seed(config.seed, trial),
                    ..config.clone()
                };
                (trial, config)
            })
        })
        .collect();

    let summaries = jobs
        .par_iter()
        .map(|(trial, config)| {
            run_trial(*trial, config, &edges, truth.as_ref(), 0).map(|outcome| outcome.summary)
        })
        .collect::<Result<Vec<_>>>()?;
    print_summaries(&summaries, format)
}

/// Per-vertex mean across trials; a vertex absent from a trial counts as 0
fn mean_local(locals: &[&LocalCounts]) -> LocalCounts {
    let mut mean = LocalCounts::default();
    if locals.is_empty() {
        return mean;
    }
    for local in locals {
        for (&v, &count) in local.iter() {
            *mean.entry(v).or_insert(0.0) += count;
        }
    }
    let n = locals.len() as f64;
    for count in mean.values_mut() {
        *count /= n;
    }
    mean
}

fn mean_std(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, v))
}

const COLUMNS: [&str; 12] = [
    "scheme",
    "trial",
    "seed",
    "global",
    "discovered",
    "edges",
    "sampled",
    "round",
    "alpha",
    "lape",
    "global_err",
    "ms",
];

fn summary_row(s: &TrialSummary) -> Vec<String> {
    vec![
        s.scheme.clone(),
        s.trial.to_string(),
        s.seed.map_or_else(|| "-".to_string(), |seed| seed.to_string()),
        format!("{:.2}", s.global),
        s.discovered_triangles.to_string(),
        s.edges_processed.to_string(),
        s.sampled_edges.to_string(),
        s.round.to_string(),
        optional(s.discard_rate, 4),
        optional(s.accuracy.map(|a| a.lape), 4),
        optional(s.accuracy.map(|a| a.global_relative_error), 4),
        s.elapsed_ms.to_string(),
    ]
}

fn print_summaries(summaries: &[TrialSummary], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summaries)?);
        }
        OutputFormat::Csv => {
            println!("{}", COLUMNS.join(","));
            for s in summaries {
                println!("{}", summary_row(s).join(","));
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(COLUMNS);
            for s in summaries {
                table.add_row(summary_row(s));
            }
            println!("{}", table);
            if let Some(accuracy) = summaries.first().and_then(|s| s.accuracy) {
                println!("Exact global count: {:.0}", accuracy.global_truth);
            }
        }
    }
    Ok(())
}
