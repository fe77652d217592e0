//! Experiment configuration.
//!
//! Configs are read from YAML files (JSON files work too). The experiment config lists the
//! functions to simulate and points to a functions config that describes their distributions:
//!
//! ```yaml
//! f1:
//!   interarrival_distribution: poisson
//!   servicetime_distribution: lognormal
//!   distributions:
//!     poisson: { lambda: 10 }
//!     lognormal: { mu: 3.0, sigma: 0.5 }
//! ```
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::distribution::DistributionSpec;
use crate::error::{Error, Result};
use crate::hedge::{HedgePolicy, BASELINE, BUILTIN_POLICIES};

fn default_output_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_file() -> String {
    "latency_model-results.csv".to_string()
}

/// YAML-serializable experiment config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawExperimentConfig {
    pub requests_count: usize,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_output_file")]
    pub output_file: String,
    pub functions: Vec<String>,
    /// Hedging policies to evaluate, all built-in ones if empty.
    #[serde(default)]
    pub hedges: Vec<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Path to the functions config, relative paths are resolved against the experiment config.
    pub functions_config: PathBuf,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s.clone()],
            Self::Many(v) => v.clone(),
        }
    }
}

/// YAML-serializable description of a single function.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawFunctionConfig {
    pub interarrival_distribution: String,
    pub servicetime_distribution: OneOrMany,
    /// Parameters of each distribution kind: `kind -> param -> value`.
    #[serde(default)]
    pub distributions: BTreeMap<String, BTreeMap<String, f64>>,
}

impl RawFunctionConfig {
    fn distribution(&self, kind: &str) -> Result<DistributionSpec> {
        let empty = BTreeMap::new();
        let params = self.distributions.get(kind).unwrap_or(&empty);
        DistributionSpec::from_params(kind, params)
    }
}

/// Validated description of a function.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionSpec {
    pub name: String,
    pub interarrival: DistributionSpec,
    pub services: Vec<DistributionSpec>,
}

impl FunctionSpec {
    pub fn from_raw(name: &str, raw: &RawFunctionConfig) -> Result<Self> {
        Self::build(name, raw).map_err(|e| e.in_function(name))
    }

    fn build(name: &str, raw: &RawFunctionConfig) -> Result<Self> {
        let interarrival = raw.distribution(&raw.interarrival_distribution)?;
        let services = raw
            .servicetime_distribution
            .to_vec()
            .iter()
            .map(|kind| raw.distribution(kind))
            .collect::<Result<Vec<_>>>()?;
        if services.is_empty() {
            return Err(Error::Config("servicetime_distribution is empty".to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            interarrival,
            services,
        })
    }
}

/// Validated experiment config.
#[derive(Clone, Debug)]
pub struct ExperimentConfig {
    pub requests_count: usize,
    pub output_path: PathBuf,
    pub output_file: String,
    pub functions: Vec<FunctionSpec>,
    pub hedges: Vec<HedgePolicy>,
    pub seed: u64,
}

/// Resolves policy names, using all built-in policies if none are given.
pub fn resolve_hedges(names: &[String]) -> Result<Vec<HedgePolicy>> {
    if names.is_empty() {
        return BUILTIN_POLICIES.iter().map(|name| HedgePolicy::resolve(name)).collect();
    }
    let mut hedges: Vec<HedgePolicy> = Vec::with_capacity(names.len());
    for name in names {
        if name == BASELINE {
            warn!("Baseline is always reported, skipping it in the hedges list");
            continue;
        }
        let policy = HedgePolicy::resolve(name)?;
        if hedges.iter().any(|h| h.name() == policy.name()) {
            warn!("Hedging policy {} is listed more than once", policy.name());
            continue;
        }
        hedges.push(policy);
    }
    Ok(hedges)
}

impl ExperimentConfig {
    pub fn from_raw(raw: RawExperimentConfig, functions: &BTreeMap<String, RawFunctionConfig>) -> Result<Self> {
        let specs = raw
            .functions
            .iter()
            .map(|name| {
                functions
                    .get(name)
                    .ok_or_else(|| Error::UnknownFunction { function: name.clone() })
                    .and_then(|f| FunctionSpec::from_raw(name, f))
            })
            .collect::<Result<Vec<_>>>()?;
        let seed = match raw.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random();
                info!("No seed is configured, using {}", seed);
                seed
            }
        };
        Ok(Self {
            requests_count: raw.requests_count,
            output_path: raw.output_path,
            output_file: raw.output_file,
            functions: specs,
            hedges: resolve_hedges(&raw.hedges)?,
            seed,
        })
    }

    /// Loads the experiment config and the functions config it refers to.
    pub fn load(path: &Path) -> Result<Self> {
        let raw: RawExperimentConfig = serde_yaml::from_reader(File::open(path)?)?;
        let functions_path = if raw.functions_config.is_relative() {
            path.parent().unwrap_or_else(|| Path::new(".")).join(&raw.functions_config)
        } else {
            raw.functions_config.clone()
        };
        let functions: BTreeMap<String, RawFunctionConfig> = serde_yaml::from_reader(File::open(functions_path)?)?;
        Self::from_raw(raw, &functions)
    }
}
