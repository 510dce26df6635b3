use std::{fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use env_logger::Builder;
use log::info;

use inductive_miner::{
    conversions::to_petri_net::model_to_petri_net,
    discover,
    discovery::inductive_miner::{FallThroughKind, InductiveMinerConfig, InductiveMinerVariant},
    export_petri_net_to_pnml_path, import_uvcl_json_from_path,
};

/// Discover a process tree or POWL model from a compressed event log (JSON)
#[derive(Parser, Debug)]
#[command(name = "inductive_miner_cli")]
#[command(version)]
struct Cli {
    /// Compressed log: a JSON list of traces or of `{"activities": [..], "count": n}` records
    log: PathBuf,

    /// Algorithm variant (IM, IMf, POWL_BASIC, POWL_MAXIMAL, POWL_DYNAMIC_CLUSTERING,
    /// POWL_BRUTE_FORCE)
    #[arg(long)]
    variant: Option<InductiveMinerVariant>,

    /// Noise threshold of IMf, in [0, 1)
    #[arg(long, value_name = "F")]
    noise_threshold: Option<f64>,

    /// Minimal share of eventually-follows observations to order two blocks, in (0.5, 1]
    #[arg(long, value_name = "F")]
    order_frequency_ratio: Option<f64>,

    /// Threshold for pruning infrequent variants (POWL variants), in [0, 1)
    #[arg(long, value_name = "F")]
    filtering_threshold: Option<f64>,

    /// Skip a fall-through (empty_trace, once_per_trace, concurrent, strict_tau_loop, tau_loop)
    #[arg(long = "disable-fallthrough", value_name = "KIND")]
    disable_fallthroughs: Vec<FallThroughKind>,

    /// Read the parameters from a JSON file (flags given as well take precedence)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not simplify the discovered model
    #[arg(long)]
    no_simplify: bool,

    /// Write the Petri net of the model as PNML
    #[arg(long, value_name = "FILE")]
    pnml: Option<PathBuf>,

    /// Write the Petri net of the model as JSON
    #[arg(long, value_name = "FILE")]
    petri_net_json: Option<PathBuf>,

    /// Write the model as JSON
    #[arg(long, value_name = "FILE")]
    model_json: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

impl Cli {
    fn build_config(&self) -> Result<InductiveMinerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("Could not read config file {:?}", path))?;
                InductiveMinerConfig::from_json(&json)
                    .with_context(|| format!("Could not parse config file {:?}", path))?
            }
            None => InductiveMinerConfig::default(),
        };
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if let Some(t) = self.noise_threshold {
            config.noise_threshold = t;
        }
        if let Some(r) = self.order_frequency_ratio {
            config.order_frequency_ratio = r;
        }
        if let Some(t) = self.filtering_threshold {
            config.filtering_threshold = t;
        }
        config
            .disable_fallthroughs
            .extend(self.disable_fallthroughs.iter().copied());
        if self.no_simplify {
            config.simplify = false;
        }
        config.validate().context("Invalid parameters")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let config = cli.build_config()?;
    let log = import_uvcl_json_from_path(&cli.log)
        .with_context(|| format!("Could not import log {:?}", cli.log))?;
    info!(
        "Imported log with {} variants and {} traces",
        log.number_of_variants(),
        log.number_of_traces()
    );

    let now = Instant::now();
    let model = discover(&log, &config).context("Discovery failed")?;
    info!("Discovered model using {} in {:#?}", config.variant, now.elapsed());
    println!("{}", model);

    if let Some(path) = &cli.model_json {
        let json = model.to_json().context("Serializing model")?;
        fs::write(path, json)
            .with_context(|| format!("Writing model to {:?}", path))?;
    }
    if cli.pnml.is_some() || cli.petri_net_json.is_some() {
        let (net, _, _) =
            model_to_petri_net(&model).context("Converting model to Petri net")?;
        info!(
            "Petri net has {} places and {} transitions",
            net.places.len(),
            net.transitions.len()
        );
        if let Some(path) = &cli.pnml {
            export_petri_net_to_pnml_path(&net, path)
                .with_context(|| format!("Writing PNML to {:?}", path))?;
        }
        if let Some(path) = &cli.petri_net_json {
            let json = net.to_json().context("Serializing Petri net")?;
            fs::write(path, json)
                .with_context(|| format!("Writing Petri net to {:?}", path))?;
        }
    }
    Ok(())
}
