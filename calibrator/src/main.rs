use anyhow::{bail, Context};
use clap::Parser;
use generator::profile::{build_sample_set, GeneratorConfig};
use geigercore::interface::SampleSet;
use geigercore::prelude::{DEFAULT_INTERPOLATION_POINTS, DEFAULT_POLYORDER, DEFAULT_WINDOW_LENGTH};
use log::info;
use report::reporter::Reporter;
use std::path::PathBuf;
use workflow::config::{ConfigOverrides, WorkflowConfig};
use workflow::runner::Runner;

mod generator;
mod report;
mod workflow;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Estimate a Geiger-Mueller tube operating voltage from its plateau curve"
)]
struct Args {
    /// CSV table with `V` (voltage) and `C` (count) columns
    data: Option<PathBuf>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Slope (counts/V) below which the plateau starts
    #[arg(long, required_unless_present = "workflow")]
    start_threshold: Option<f64>,
    /// Slope (counts/V) above which breakdown starts
    #[arg(long, required_unless_present = "workflow")]
    end_threshold: Option<f64>,
    /// Resolution of the interpolated curve [default: 500]
    #[arg(long)]
    points: Option<usize>,
    /// Savitzky-Golay window length [default: 10]
    #[arg(long)]
    window: Option<usize>,
    /// Savitzky-Golay polynomial order [default: 3]
    #[arg(long)]
    polyorder: Option<usize>,
    /// Analyse a generated characteristic curve instead of a data file
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// Write the full analysis, curves included, as JSON
    #[arg(long)]
    export: Option<PathBuf>,
    /// Append a one-line summary of this run
    #[arg(long)]
    report_log: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let overrides = ConfigOverrides {
        start_threshold: args.start_threshold,
        end_threshold: args.end_threshold,
        interpolation_points: args.points,
        window_length: args.window,
        polyorder: args.polyorder,
    };
    let mut workflow_config = if let Some(path) = &args.workflow {
        let mut config = WorkflowConfig::load(path)?;
        config.apply_overrides(&overrides);
        config
    } else {
        WorkflowConfig::from_args(
            args.start_threshold
                .context("--start-threshold is required without --workflow")?,
            args.end_threshold
                .context("--end-threshold is required without --workflow")?,
            args.points.unwrap_or(DEFAULT_INTERPOLATION_POINTS),
            args.window.unwrap_or(DEFAULT_WINDOW_LENGTH),
            args.polyorder.unwrap_or(DEFAULT_POLYORDER),
        )
    };
    if args.data.is_some() {
        workflow_config.data = args.data.clone();
    }
    if args.synthetic && workflow_config.synthetic.is_none() {
        workflow_config.synthetic = Some(GeneratorConfig::default());
    }

    let (source, samples) = load_samples(&workflow_config)?;
    info!("loaded {} samples from {}", samples.len(), source);

    let runner = Runner::new(workflow_config);
    let analysis = runner.execute(&samples)?;

    let reporter = Reporter::new(source);
    reporter.publish(&analysis);
    if let Some(path) = &args.export {
        reporter.export_json(path, &analysis)?;
        info!("analysis exported to {}", path.display());
    }
    if let Some(path) = &args.report_log {
        reporter.append_log(path, &analysis)?;
    }

    Ok(())
}

fn load_samples(config: &WorkflowConfig) -> anyhow::Result<(String, SampleSet)> {
    if let Some(generator) = &config.synthetic {
        let samples = build_sample_set(generator)?;
        return Ok((format!("synthetic(seed={})", generator.seed), samples));
    }
    let Some(path) = &config.data else {
        bail!("no data file given; pass a CSV path or --synthetic");
    };
    let samples = SampleSet::from_csv_path(path)
        .with_context(|| format!("loading samples from {}", path.display()))?;
    Ok((path.display().to_string(), samples))
}
