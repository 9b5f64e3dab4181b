use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use wildfire_mdp::{ChoiceMode, PolicyComparison, SimulationSummary, StepRecord};

/// Summary of one simulation with the trajectory left out unless requested.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub policy: String,
    #[serde(flatten)]
    pub overview: SimulationOverview,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<StepRecord>>,
}

#[derive(Debug, Serialize)]
pub struct SimulationOverview {
    pub id: u64,
    pub version: String,
    pub timesteps: u32,
    pub generation_policy: Vec<f64>,
    pub choice_mode: ChoiceMode,
    pub average_reward: f64,
    pub total_reward: f64,
    pub reward_std: f64,
    pub average_habitat: f64,
    pub suppressions: u32,
    pub suppression_rate: f64,
    pub average_probability: f64,
    pub joint_probability: f64,
}

impl SimulationReport {
    pub fn new(policy: String, summary: SimulationSummary, include_states: bool) -> Self {
        let overview = SimulationOverview {
            id: summary.id,
            version: summary.version,
            timesteps: summary.timesteps,
            generation_policy: summary.generation_policy,
            choice_mode: summary.choice_mode,
            average_reward: summary.average_reward,
            total_reward: summary.total_reward,
            reward_std: summary.reward_std,
            average_habitat: summary.average_habitat,
            suppressions: summary.suppressions,
            suppression_rate: summary.suppression_rate,
            average_probability: summary.average_probability,
            joint_probability: summary.joint_probability,
        };
        Self {
            policy,
            overview,
            states: include_states.then_some(summary.states),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ComparisonReport {
    pub timesteps: u32,
    pub seed: u64,
    pub policies: Vec<PolicyComparison>,
}

#[derive(Debug, Serialize)]
pub struct DivergenceRow {
    pub candidate: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kl_divergence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PathwayLine {
    pub id: u64,
    pub net_value: f64,
    pub suppressions: u32,
    pub joint_probability: f64,
}

#[derive(Debug, Serialize)]
pub struct DivergenceReport {
    pub generator: String,
    pub generator_parameters: Vec<f64>,
    pub pathways: u32,
    pub timesteps: u32,
    pub start_seed: u64,
    pub habitat_ratio: f64,
    pub pooled_events: usize,
    pub candidates: Vec<DivergenceRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pathway_lines: Vec<PathwayLine>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Report {
    Compare(ComparisonReport),
    Simulate(SimulationReport),
    Divergence(DivergenceReport),
}

pub fn generate_json_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_console_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    match report {
        Report::Compare(compare) => console_compare(out, compare),
        Report::Simulate(simulate) => console_simulate(out, simulate),
        Report::Divergence(divergence) => console_divergence(out, divergence),
    }
}

fn console_compare(out: &mut dyn Write, report: &ComparisonReport) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "🔥 Canonical Policy Comparison".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;
    writeln!(out, "Timesteps: {}  Seed: {}", report.timesteps, report.seed)?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<14} {:>16} {:>10} {:>8} {:>10} {:>10} {:>12}",
        "Policy", "Parameters", "Avg", "Std", "Supp %", "Avg prob", "Joint prob"
    )?;
    for row in &report.policies {
        writeln!(
            out,
            "{:<14} {:>16} {:>10.2} {:>8.2} {:>10.1} {:>10.3} {:>12.3e}",
            row.name.bold(),
            format!("{:?}", row.parameters),
            row.average_reward,
            row.reward_std,
            row.suppression_rate * 100.0,
            row.average_probability,
            row.joint_probability
        )?;
    }
    if let Some(best) = report
        .policies
        .iter()
        .max_by(|a, b| a.average_reward.total_cmp(&b.average_reward))
    {
        writeln!(out)?;
        writeln!(
            out,
            "Best average reward: {} ({:.2})",
            best.name.green(),
            best.average_reward
        )?;
    }
    Ok(())
}

fn console_simulate(out: &mut dyn Write, report: &SimulationReport) -> Result<()> {
    let overview = &report.overview;
    writeln!(out)?;
    writeln!(out, "{}", "🌲 Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=====================".cyan())?;
    writeln!(out, "Policy: {} {:?}", report.policy.bold(), overview.generation_policy)?;
    writeln!(out, "Seed: {}  Timesteps: {}", overview.id, overview.timesteps)?;
    writeln!(out, "Choice mode: {:?}", overview.choice_mode)?;
    writeln!(
        out,
        "Average reward: {:.2} (std {:.2})",
        overview.average_reward, overview.reward_std
    )?;
    writeln!(out, "Total reward: {:.2}", overview.total_reward)?;
    writeln!(out, "Average habitat: {:.2}", overview.average_habitat)?;
    writeln!(
        out,
        "Suppressions: {} ({:.1}%)",
        overview.suppressions.to_string().yellow(),
        overview.suppression_rate * 100.0
    )?;
    writeln!(out, "Average choice probability: {:.3}", overview.average_probability)?;
    writeln!(out, "Joint probability: {:.3e}", overview.joint_probability)?;

    if let Some(states) = &report.states {
        writeln!(out)?;
        writeln!(
            out,
            "{:>5} {:>7} {:>7} {:>7} {:>6} {:>8} {:>8}",
            "Step", "Vuln", "Timber", "Event", "Supp", "Prob", "Reward"
        )?;
        for step in states {
            writeln!(
                out,
                "{:>5} {:>7.3} {:>7.2} {:>7.3} {:>6} {:>8.3} {:>8.2}",
                step.timestep,
                step.vulnerability,
                step.timber_value,
                step.event_value,
                if step.action { "yes" } else { "no" },
                step.choice_prob,
                step.reward
            )?;
        }
    }
    Ok(())
}

fn console_divergence(out: &mut dyn Write, report: &DivergenceReport) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📐 Policy Divergence".bright_cyan().bold())?;
    writeln!(out, "{}", "====================".cyan())?;
    writeln!(
        out,
        "Generator: {} {:?}",
        report.generator.bold(),
        report.generator_parameters
    )?;
    writeln!(
        out,
        "Pathways: {} x {} steps (seeds {}..)  Habitat ratio: {:.2}",
        report.pathways, report.timesteps, report.start_seed, report.habitat_ratio
    )?;
    writeln!(out, "Pooled events: {}", report.pooled_events)?;
    writeln!(out)?;

    for row in &report.candidates {
        let label = format!("{:?}", row.candidate);
        match (&row.kl_divergence, &row.error) {
            (Some(kld), _) => writeln!(out, "  {label:<20} KL = {}", format!("{kld:.6}").green())?,
            (None, Some(error)) => writeln!(out, "  {label:<20} {}", error.red())?,
            (None, None) => writeln!(out, "  {label:<20} -")?,
        }
    }

    if !report.pathway_lines.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "Pathways".bright_yellow().bold())?;
        for line in &report.pathway_lines {
            writeln!(
                out,
                "  #{:<6} net {:>10.2}  suppressions {:>5}  joint {:.3e}",
                line.id, line.net_value, line.suppressions, line.joint_probability
            )?;
        }
    }
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    match report {
        Report::Compare(compare) => {
            writeln!(out, "# Canonical Policy Comparison\n")?;
            writeln!(
                out,
                "- **Timesteps**: {}\n- **Seed**: {}\n",
                compare.timesteps, compare.seed
            )?;
            writeln!(
                out,
                "| Policy | Parameters | Avg reward | Std | Suppression rate | Avg prob | Joint prob |"
            )?;
            writeln!(out, "|---|---|---|---|---|---|---|")?;
            for row in &compare.policies {
                writeln!(
                    out,
                    "| {} | {:?} | {:.2} | {:.2} | {:.3} | {:.3} | {:.3e} |",
                    row.name,
                    row.parameters,
                    row.average_reward,
                    row.reward_std,
                    row.suppression_rate,
                    row.average_probability,
                    row.joint_probability
                )?;
            }
        }
        Report::Simulate(simulate) => {
            let overview = &simulate.overview;
            writeln!(out, "# Simulation Summary\n")?;
            writeln!(out, "- **Policy**: {} {:?}", simulate.policy, overview.generation_policy)?;
            writeln!(out, "- **Seed**: {}", overview.id)?;
            writeln!(out, "- **Timesteps**: {}", overview.timesteps)?;
            writeln!(out, "- **Average reward**: {:.2}", overview.average_reward)?;
            writeln!(out, "- **Reward std**: {:.2}", overview.reward_std)?;
            writeln!(out, "- **Average habitat**: {:.2}", overview.average_habitat)?;
            writeln!(out, "- **Suppression rate**: {:.3}", overview.suppression_rate)?;
            writeln!(out, "- **Joint probability**: {:.3e}", overview.joint_probability)?;
            if let Some(states) = &simulate.states {
                writeln!(out, "\n| Step | Event | Suppressed | Reward |")?;
                writeln!(out, "|---|---|---|---|")?;
                for step in states {
                    writeln!(
                        out,
                        "| {} | {:.3} | {} | {:.2} |",
                        step.timestep, step.event_value, step.action, step.reward
                    )?;
                }
            }
        }
        Report::Divergence(divergence) => {
            writeln!(out, "# Policy Divergence\n")?;
            writeln!(
                out,
                "- **Generator**: {} {:?}",
                divergence.generator, divergence.generator_parameters
            )?;
            writeln!(
                out,
                "- **Pathways**: {} x {} steps",
                divergence.pathways, divergence.timesteps
            )?;
            writeln!(out, "- **Pooled events**: {}\n", divergence.pooled_events)?;
            writeln!(out, "| Candidate | KL divergence |")?;
            writeln!(out, "|---|---|")?;
            for row in &divergence.candidates {
                let value = match (&row.kl_divergence, &row.error) {
                    (Some(kld), _) => format!("{kld:.6}"),
                    (None, Some(error)) => format!("_{error}_"),
                    (None, None) => "-".to_string(),
                };
                writeln!(out, "| {:?} | {value} |", row.candidate)?;
            }
        }
    }
    Ok(())
}
