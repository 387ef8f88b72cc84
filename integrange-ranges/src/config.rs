use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use integrange_core::models::{GenomeInfo, Schema, SeqnameStyle};
use serde::{Deserialize, Serialize};

use crate::errors::{RangesError, RangesResult};
use crate::sweep::threshold_grid;

pub const DEFAULT_VALUE_COLUMN: &str = "da_log2FC";
pub const DEFAULT_WINDOW: u32 = 1000;
pub const DEFAULT_REPLICATES: u32 = 100;

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct GenomeConfig {
    pub build: String,
    pub style: SeqnameStyle,
}

impl From<&GenomeConfig> for GenomeInfo {
    fn from(config: &GenomeConfig) -> Self {
        GenomeInfo::new(&config.build, config.style)
    }
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct InputConfig {
    pub path: PathBuf,
    /// Metadata columns as `name:type,...`
    pub schema: String,
}

impl InputConfig {
    pub fn schema(&self) -> RangesResult<Schema> {
        Ok(self.schema.parse::<Schema>()?)
    }
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct InputsConfig {
    pub de_genes: InputConfig,
    pub not_de_genes: InputConfig,
    pub da_peaks: InputConfig,
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct BootstrapConfig {
    #[serde(default = "default_replicates")]
    pub replicates: u32,
    pub seed: u64,
    /// Genes per replicate; defaults to the number of DE genes.
    pub sample_size: Option<usize>,
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
#[serde(untagged)]
pub enum Thresholds {
    List(Vec<f64>),
    Grid { from: f64, to: f64, by: f64 },
}

impl Thresholds {
    pub fn values(&self) -> Vec<f64> {
        match self {
            Thresholds::List(values) => values.clone(),
            Thresholds::Grid { from, to, by } => threshold_grid(*from, *to, *by),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct SweepConfig {
    #[serde(default = "default_value_column")]
    pub value_column: String,
    pub thresholds: Thresholds,
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_window")]
    pub window: u32,
    pub output_dir: PathBuf,
    pub genome: GenomeConfig,
    pub inputs: InputsConfig,
    pub bootstrap: BootstrapConfig,
    pub sweep: SweepConfig,
}

fn default_replicates() -> u32 {
    DEFAULT_REPLICATES
}

fn default_value_column() -> String {
    DEFAULT_VALUE_COLUMN.to_string()
}

fn default_window() -> u32 {
    DEFAULT_WINDOW
}

impl PipelineConfig {
    /// Check values that deserialization cannot.
    pub fn validate(&self) -> RangesResult<()> {
        if self.window == 0 {
            return Err(RangesError::Config("`window` must be at least 1".to_string()));
        }
        match &self.sweep.thresholds {
            Thresholds::List(values) if values.is_empty() => {
                return Err(RangesError::Config(
                    "`sweep.thresholds` must not be empty".to_string(),
                ));
            }
            Thresholds::Grid { from, to, by } if *by <= 0.0 || to < from => {
                return Err(RangesError::Config(format!(
                    "invalid threshold grid from {} to {} by {}",
                    from, to, by
                )));
            }
            _ => {}
        }
        for input in [
            &self.inputs.de_genes,
            &self.inputs.not_de_genes,
            &self.inputs.da_peaks,
        ] {
            input.schema()?;
        }
        Ok(())
    }

    /// Resolve relative paths against `base`.
    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.output_dir);
        join(&mut self.inputs.de_genes.path);
        join(&mut self.inputs.not_de_genes.path);
        join(&mut self.inputs.da_peaks.path);
    }
}

impl TryFrom<&Path> for PipelineConfig {
    type Error = RangesError;

    ///
    /// Read a TOML pipeline config. Relative paths inside it are taken
    /// relative to the directory holding the file.
    ///
    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let mut config: PipelineConfig = toml::from_str(&toml_str)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        config.validate()?;
        Ok(config)
    }
}
