mod report;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use report::{
    ComparisonReport, DivergenceReport, DivergenceRow, PathwayLine, Report, SimulationReport,
};
use util::{load_config, parse_candidates, parse_policy};
use wildfire_mdp::{
    ChoiceMode, PooledProbabilities, RewardBlend, SimulationRequest, SwmConfig,
    compare_canonical_policies, pathways_from_summaries, simulate_batch, simulate_seeded,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Run the four canonical policies side by side
    Compare,
    /// Run a single pathway and summarise it
    Simulate,
    /// Simulate a batch and score candidate policies by KL divergence
    Divergence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "wildfire-mdp-tester", version)]
#[command(about = "Simulate wildfire suppression policies and compare them")]
struct Args {
    /// What to run
    #[arg(long, value_enum, default_value_t = RunMode::Compare)]
    mode: RunMode,

    /// Policy preset code (LB, SA, CT) or comma-separated parameters
    #[arg(long, default_value = "CT", allow_hyphen_values = true)]
    policy: String,

    /// Seed of the first simulated pathway
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Timesteps per pathway
    #[arg(long, default_value_t = 1000)]
    timesteps: u32,

    /// Suppress whenever the policy value is at least one half
    #[arg(long)]
    deterministic: bool,

    /// Number of pathways to simulate (divergence mode)
    #[arg(long, default_value_t = 10)]
    pathways: u32,

    /// Candidate parameter vectors, `;`-separated (divergence mode)
    #[arg(long, default_value = "0,0;20,0;-20,0;0,20", allow_hyphen_values = true)]
    candidates: String,

    /// Share of the habitat channel in the reported rewards, 0 to 1
    #[arg(long, default_value_t = 0.0)]
    blend: f64,

    /// JSON file overriding simulator parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    const fn choice_mode(&self) -> ChoiceMode {
        if self.deterministic {
            ChoiceMode::Deterministic
        } else {
            ChoiceMode::Probabilistic
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.report == ReportFormat::Console && args.output.is_none() {
        announce_banner();
    }

    let start_time = Instant::now();
    let config = load_config(args.config.as_deref())?;
    let report = match args.mode {
        RunMode::Compare => run_compare(&args, &config)?,
        RunMode::Simulate => run_simulate(&args, &config)?,
        RunMode::Divergence => run_divergence(&args, &config)?,
    };
    log::info!("{:?} finished in {:?}", args.mode, start_time.elapsed());

    write_report(&args, &report)
}

fn announce_banner() {
    println!("{}", "🔥 Wildfire MDP Tester".bright_cyan().bold());
    println!("{}", "======================".cyan());
}

fn run_compare(args: &Args, config: &SwmConfig) -> Result<Report> {
    let policies = compare_canonical_policies(args.timesteps, args.seed, config)
        .context("canonical policy comparison failed")?;
    Ok(Report::Compare(ComparisonReport {
        timesteps: args.timesteps,
        seed: args.seed,
        policies,
    }))
}

fn run_simulate(args: &Args, config: &SwmConfig) -> Result<Report> {
    let policy = parse_policy(&args.policy)?;
    let request = SimulationRequest::new(policy.clone(), args.timesteps, args.seed)
        .with_choice_mode(args.choice_mode());
    let summary = simulate_seeded(&request, config)
        .with_context(|| format!("simulation of {} failed", policy.label()))?;
    Ok(Report::Simulate(SimulationReport::new(
        policy.label(),
        summary,
        args.verbose,
    )))
}

fn run_divergence(args: &Args, config: &SwmConfig) -> Result<Report> {
    let policy = parse_policy(&args.policy)?;
    let candidates = parse_candidates(&args.candidates)?;
    let blend = RewardBlend::new(args.blend).context("invalid --blend")?;

    let summaries = simulate_batch(&policy, args.timesteps, args.seed, args.pathways, config)
        .with_context(|| format!("batch simulation of {} failed", policy.label()))?;
    let pathways =
        pathways_from_summaries(&summaries, blend).context("pathway conversion failed")?;

    let pooled_events: usize = pathways.iter().map(|pathway| pathway.len()).sum();
    let rows: Vec<DivergenceRow> = candidates
        .into_iter()
        .map(|candidate| {
            let outcome = PooledProbabilities::pool(&pathways, &candidate)
                .and_then(|pooled| pooled.kl_divergence());
            match outcome {
                Ok(kld) => DivergenceRow {
                    candidate,
                    kl_divergence: Some(kld),
                    error: None,
                },
                Err(err) => {
                    log::warn!("candidate {candidate:?}: {err}");
                    DivergenceRow {
                        candidate,
                        kl_divergence: None,
                        error: Some(err.to_string()),
                    }
                }
            }
        })
        .collect();

    let pathway_lines = if args.verbose {
        pathways
            .iter()
            .map(|pathway| PathwayLine {
                id: pathway.id,
                net_value: pathway.net_value,
                suppressions: pathway.actions_1_taken,
                joint_probability: pathway.generation_joint_prob,
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(Report::Divergence(DivergenceReport {
        generator: policy.label(),
        generator_parameters: policy.resolve(),
        pathways: args.pathways,
        timesteps: args.timesteps,
        start_seed: args.seed,
        habitat_ratio: blend.habitat_ratio(),
        pooled_events,
        candidates: rows,
        pathway_lines,
    }))
}

fn write_report(args: &Args, report: &Report) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let writer = output_target.writer();
    match args.report {
        ReportFormat::Json => report::generate_json_report(writer, report)?,
        ReportFormat::Markdown => report::generate_markdown_report(writer, report)?,
        ReportFormat::Console => report::generate_console_report(writer, report)?,
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
