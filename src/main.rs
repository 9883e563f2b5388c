use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use rts_sph::{CoefficientModel, ModelConfig, ModelSummary};

#[derive(Parser, Debug)]
#[command(name = "rts-sph", version, about = "Inspect S20RTS-family .sph tomography files")]
struct Cli {
    /// sph file to read (optional when --degree is given)
    file: Option<PathBuf>,
    #[arg(long, help = "Maximum spherical-harmonic degree of the model")]
    degree: Option<usize>,
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        help = "Comma-separated spline knots in [-1, 1], outer to inner"
    )]
    knots: Option<Vec<f64>>,
    #[arg(long, help = "Inner radius in km")]
    inner_radius: Option<f64>,
    #[arg(long, help = "Outer radius in km")]
    outer_radius: Option<f64>,
    #[arg(long, help = "JSON file with model options; flags override it")]
    config: Option<PathBuf>,
    #[arg(long, help = "Output machine-readable JSON")]
    json: bool,
}

impl Cli {
    fn model_config(&self) -> Result<ModelConfig> {
        let mut config = match &self.config {
            Some(path) => ModelConfig::from_json_file(path)?,
            None => ModelConfig::default(),
        };
        if self.file.is_some() {
            config.filename = self.file.clone();
        }
        if self.degree.is_some() {
            config.degree = self.degree;
        }
        if self.knots.is_some() {
            config.knots = self.knots.clone();
        }
        if let Some(r) = self.inner_radius {
            config.inner_radius = r;
        }
        if let Some(r) = self.outer_radius {
            config.outer_radius = r;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.model_config()?;
    debug!("model options: {config:?}");

    let model = CoefficientModel::from_config(&config).with_context(|| match &config.filename {
        Some(path) => format!("loading {}", path.display()),
        None => "building empty model".to_string(),
    })?;
    let summary = ModelSummary::from_model(&model);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(())
}
