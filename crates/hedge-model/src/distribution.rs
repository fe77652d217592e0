//! Parametric distributions of interarrival and service times.

use std::collections::BTreeMap;
use std::fmt;

use rand::SeedableRng;
use rand_distr::{Distribution as _, LogNormal, Poisson, Weibull};
use rand_pcg::Pcg64;
use statrs::distribution::{ContinuousCDF, DiscreteCDF, Normal};

use crate::error::{Error, Result};

/// Description of a sampling model, one variant per supported kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DistributionSpec {
    Constant { latency: f64 },
    Poisson { lambda: f64 },
    Weibull { k: f64, lambda: f64 },
    LogNormal { mu: f64, sigma: f64 },
}

fn get_param(params: &BTreeMap<String, f64>, kind: &'static str, param: &'static str) -> Result<f64> {
    params
        .get(param)
        .copied()
        .ok_or(Error::MissingParameter { kind, param })
}

fn check_positive(kind: &'static str, param: &'static str, value: f64) -> Result<()> {
    if value > 0. && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter { kind, param, value })
    }
}

fn check_finite(kind: &'static str, param: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter { kind, param, value })
    }
}

impl DistributionSpec {
    /// Builds a spec from a kind name and a `param -> value` map, as found in functions config.
    pub fn from_params(kind: &str, params: &BTreeMap<String, f64>) -> Result<Self> {
        let spec = match kind {
            "constant" => Self::Constant {
                latency: get_param(params, "constant", "latency")?,
            },
            "poisson" => Self::Poisson {
                lambda: get_param(params, "poisson", "lambda")?,
            },
            "weibull" => Self::Weibull {
                k: get_param(params, "weibull", "k")?,
                lambda: get_param(params, "weibull", "lambda")?,
            },
            "lognormal" => Self::LogNormal {
                mu: get_param(params, "lognormal", "mu")?,
                sigma: get_param(params, "lognormal", "sigma")?,
            },
            _ => {
                return Err(Error::UnknownDistribution { kind: kind.to_string() });
            }
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Constant { latency } => {
                check_finite("constant", "latency", latency)?;
                if latency < 0. {
                    return Err(Error::InvalidParameter {
                        kind: "constant",
                        param: "latency",
                        value: latency,
                    });
                }
                Ok(())
            }
            Self::Poisson { lambda } => check_positive("poisson", "lambda", lambda),
            Self::Weibull { k, lambda } => {
                check_positive("weibull", "k", k)?;
                check_positive("weibull", "lambda", lambda)
            }
            Self::LogNormal { mu, sigma } => {
                check_finite("lognormal", "mu", mu)?;
                check_positive("lognormal", "sigma", sigma)
            }
        }
    }

    /// Kind name as written in configs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Constant { .. } => "constant",
            Self::Poisson { .. } => "poisson",
            Self::Weibull { .. } => "weibull",
            Self::LogNormal { .. } => "lognormal",
        }
    }

    /// Cumulative distribution function at `x`.
    pub fn cdf(&self, x: f64) -> f64 {
        match *self {
            Self::Constant { latency } => {
                if x >= latency {
                    1.
                } else {
                    0.
                }
            }
            Self::Poisson { lambda } => {
                if x < 0. {
                    return 0.;
                }
                poisson_cdf(lambda, x.floor() as u64)
            }
            Self::Weibull { k, lambda } => {
                if x <= 0. {
                    return 0.;
                }
                1. - (-(x / lambda).powf(k)).exp()
            }
            Self::LogNormal { mu, sigma } => {
                if x <= 0. {
                    return 0.;
                }
                standard_normal().cdf((x.ln() - mu) / sigma)
            }
        }
    }

    /// Inverse of the cumulative distribution function.
    pub fn quantile(&self, p: f64) -> Result<f64> {
        if !(0. ..=1.).contains(&p) {
            return Err(Error::InvalidQuantile { p });
        }
        Ok(match *self {
            Self::Constant { latency } => latency,
            Self::Poisson { lambda } => poisson_quantile(lambda, p),
            Self::Weibull { k, lambda } => lambda * (-(1. - p).ln()).powf(1. / k),
            Self::LogNormal { mu, sigma } => (mu + sigma * standard_normal().inverse_cdf(p)).exp(),
        })
    }
}

impl fmt::Display for DistributionSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Constant { latency } => write!(f, "constant[latency={}]", latency),
            Self::Poisson { lambda } => write!(f, "poisson[lambda={}]", lambda),
            Self::Weibull { k, lambda } => write!(f, "weibull[k={},lambda={}]", k, lambda),
            Self::LogNormal { mu, sigma } => write!(f, "lognormal[mu={},sigma={}]", mu, sigma),
        }
    }
}

fn standard_normal() -> Normal {
    // (0, 1) is always a valid parametrization
    Normal::new(0., 1.).unwrap()
}

fn poisson_cdf(lambda: f64, n: u64) -> f64 {
    match statrs::distribution::Poisson::new(lambda) {
        Ok(dist) => dist.cdf(n),
        Err(_) => f64::NAN,
    }
}

/// Smallest `n` such that `P(X <= n) >= p`.
fn poisson_quantile(lambda: f64, p: f64) -> f64 {
    if p >= 1. {
        return f64::INFINITY;
    }
    let dist = match statrs::distribution::Poisson::new(lambda) {
        Ok(dist) => dist,
        Err(_) => return f64::NAN,
    };
    let mut hi = (lambda.ceil() as u64).max(1);
    while dist.cdf(hi) < p {
        if hi > u64::MAX / 4 {
            return f64::INFINITY;
        }
        hi *= 2;
    }
    let mut lo = 0;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if dist.cdf(mid) >= p {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo as f64
}

enum Sampler {
    Constant(f64),
    Poisson(Poisson<f64>),
    Weibull(Weibull<f64>),
    LogNormal(LogNormal<f64>),
}

/// A sampling model with its own random stream.
pub struct Distribution {
    spec: DistributionSpec,
    sampler: Sampler,
    rng: Pcg64,
}

impl Distribution {
    pub fn new(spec: DistributionSpec, seed: u64) -> Result<Self> {
        spec.validate()?;
        let sampler = match spec {
            DistributionSpec::Constant { latency } => Sampler::Constant(latency),
            DistributionSpec::Poisson { lambda } => Sampler::Poisson(Poisson::new(lambda).map_err(|_| {
                Error::InvalidParameter {
                    kind: "poisson",
                    param: "lambda",
                    value: lambda,
                }
            })?),
            // rand_distr orders Weibull parameters as (scale, shape)
            DistributionSpec::Weibull { k, lambda } => Sampler::Weibull(Weibull::new(lambda, k).map_err(|_| {
                Error::InvalidParameter {
                    kind: "weibull",
                    param: "k",
                    value: k,
                }
            })?),
            DistributionSpec::LogNormal { mu, sigma } => {
                Sampler::LogNormal(LogNormal::new(mu, sigma).map_err(|_| Error::InvalidParameter {
                    kind: "lognormal",
                    param: "sigma",
                    value: sigma,
                })?)
            }
        };
        Ok(Self {
            spec,
            sampler,
            rng: Pcg64::seed_from_u64(seed),
        })
    }

    pub fn spec(&self) -> &DistributionSpec {
        &self.spec
    }

    pub fn kind(&self) -> &'static str {
        self.spec.kind()
    }

    /// Draws one value.
    pub fn sample(&mut self) -> f64 {
        match &self.sampler {
            Sampler::Constant(latency) => *latency,
            Sampler::Poisson(dist) => dist.sample(&mut self.rng),
            Sampler::Weibull(dist) => dist.sample(&mut self.rng),
            Sampler::LogNormal(dist) => dist.sample(&mut self.rng),
        }
    }

    pub fn quantile(&self, p: f64) -> Result<f64> {
        self.spec.quantile(p)
    }

    pub fn cdf(&self, x: f64) -> f64 {
        self.spec.cdf(x)
    }
}
