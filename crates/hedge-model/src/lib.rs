//! A latency model for comparing request hedging policies.
//!
//! For every configured function the model draws request arrivals and service times from
//! parametric distributions and computes, for a non-hedged baseline and for each hedging policy,
//! the response time of every request and the compute time spent on it.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use hedge_model::config::ExperimentConfig;
//! use hedge_model::output::write_csv;
//! use hedge_model::parallel::generate_parallel;
//!
//! let config = ExperimentConfig::load(Path::new("config.yaml")).unwrap();
//! let rows = generate_parallel(&config, 4).unwrap();
//! write_csv(&config.output_path, &config.output_file, &rows).unwrap();
//! ```

pub mod config;
pub mod distribution;
pub mod error;
pub mod generator;
pub mod hedge;
pub mod output;
pub mod parallel;
pub mod stats;
pub mod traffic;
