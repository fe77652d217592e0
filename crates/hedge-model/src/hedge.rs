//! Hedging policies and their response time / system load accounting.
//!
//! A hedged request sends a copy of the original request after some delay. The response is
//! returned by whichever copy finishes first, so for every policy
//! `response_time = min(service_time, delay + copy_service_time)`.
//!
//! Policies differ in how the delay is chosen and in whether the losing copy is cancelled
//! once the winner finishes:
//!
//! - `naive_hedge`: the copy is sent right away, nothing is cancelled.
//! - `delayed_hedge_p95wc` / `delayed_naive_hedge`: the copy is sent after the 95th percentile
//!   of the service time distribution, with and without cancellation.
//! - `perfect_hedge`: an oracle which sends the copy right away only for tail requests.
//! - `assisted_hedge_90wc` / `assisted_hedge_90nc`: a predictor which catches a tail request
//!   with probability 0.9, with and without cancellation.
//!
//! Parameterized versions can be requested with the `Name[key=value,...]` syntax, e.g.
//! `delayed_hedge[percentile=0.99,cancellation=true]` or `assisted_hedge[precision=0.8]`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::error::{Error, Result};

/// A request is a tail request if its service time exceeds the copy's one at least this many times.
pub const TAIL_FACTOR: f64 = 10.;

pub const DEFAULT_PRECISION: f64 = 0.9;

pub const DEFAULT_PERCENTILE: f64 = 0.95;

/// Names of the built-in policies in their output order.
pub const BUILTIN_POLICIES: [&str; 6] = [
    "naive_hedge",
    "delayed_hedge_p95wc",
    "perfect_hedge",
    "delayed_naive_hedge",
    "assisted_hedge_90wc",
    "assisted_hedge_90nc",
];

pub const BASELINE: &str = "baseline";

pub fn is_tail(service_time: f64, copy_service_time: f64) -> bool {
    service_time >= TAIL_FACTOR * copy_service_time
}

/// Policy name with optional `key=value` parameters.
#[derive(Debug, Clone)]
pub struct PolicyParams {
    name: String,
    params: BTreeMap<String, String>,
}

impl PolicyParams {
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        let open = match s.find('[') {
            Some(open) => open,
            None => {
                return Some(Self {
                    name: s.to_string(),
                    params: BTreeMap::new(),
                })
            }
        };
        if !s.ends_with(']') {
            return None;
        }

        let mut params = BTreeMap::new();
        let inner = &s[open + 1..s.len() - 1];
        if !inner.is_empty() {
            for param in inner.split(',') {
                let (key, value) = param.split_once('=')?;
                params.insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        Some(Self {
            name: s[..open].to_string(),
            params,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns parsed parameter value, `Ok(None)` if it is absent.
    fn get<T: FromStr>(&self, param: &str) -> Result<Option<T>> {
        match self.params.get(param) {
            None => Ok(None),
            Some(s) => s.parse().map(Some).map_err(|_| Error::InvalidPolicyParam {
                name: self.to_string(),
                param: param.to_string(),
            }),
        }
    }

    fn ensure_known(&self, known: &[&str]) -> Result<()> {
        match self.params.keys().find(|k| !known.contains(&k.as_str())) {
            Some(param) => Err(Error::InvalidPolicyParam {
                name: self.to_string(),
                param: param.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for PolicyParams {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(
                f,
                "{}[{}]",
                self.name,
                self.params.iter().map(|(k, v)| format!("{k}={v}")).join(",")
            )
        }
    }
}

/// How the delay before sending the copy is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DelayRule {
    /// The copy is sent together with the original request.
    Immediate,
    /// The copy is sent after the given percentile of the service time distribution.
    Percentile(f64),
    /// The copy is sent right away for tail requests and never otherwise.
    Oracle,
    /// Like [`DelayRule::Oracle`], but a tail request is only caught with the given probability.
    Predictor { precision: f64 },
}

/// Result of applying a policy to a single request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HedgeResult {
    pub response_time: f64,
    pub system_load: f64,
    pub delay: f64,
}

/// Response time and system load of a request hedged with given delay.
pub fn hedged_request(service_time: f64, copy_service_time: f64, delay: f64, cancellation: bool) -> HedgeResult {
    let response_time = f64::min(service_time, delay + copy_service_time);
    let system_load = if response_time <= delay {
        // the copy was not sent in time to matter
        response_time
    } else if cancellation {
        // both copies run after the delay until the first one finishes
        delay + 2. * (response_time - delay)
    } else {
        service_time + copy_service_time
    };
    HedgeResult {
        response_time,
        system_load,
        delay,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HedgePolicy {
    name: String,
    delay_rule: DelayRule,
    cancellation: bool,
}

impl HedgePolicy {
    pub fn new(name: &str, delay_rule: DelayRule, cancellation: bool) -> Self {
        Self {
            name: name.to_string(),
            delay_rule,
            cancellation,
        }
    }

    /// Resolves a policy by its name.
    pub fn resolve(s: &str) -> Result<Self> {
        let params = PolicyParams::from_str(s).ok_or_else(|| Error::UnknownPolicy { name: s.to_string() })?;
        let unparameterized = params.params.is_empty();
        let policy = match params.name() {
            "naive_hedge" if unparameterized => Self::new("naive_hedge", DelayRule::Immediate, false),
            "delayed_hedge_p95wc" if unparameterized => {
                Self::new("delayed_hedge_p95wc", DelayRule::Percentile(DEFAULT_PERCENTILE), true)
            }
            "delayed_naive_hedge" if unparameterized => {
                Self::new("delayed_naive_hedge", DelayRule::Percentile(DEFAULT_PERCENTILE), false)
            }
            "perfect_hedge" if unparameterized => Self::new("perfect_hedge", DelayRule::Oracle, true),
            "assisted_hedge_90wc" if unparameterized => Self::new(
                "assisted_hedge_90wc",
                DelayRule::Predictor {
                    precision: DEFAULT_PRECISION,
                },
                true,
            ),
            "assisted_hedge_90nc" if unparameterized => Self::new(
                "assisted_hedge_90nc",
                DelayRule::Predictor {
                    precision: DEFAULT_PRECISION,
                },
                false,
            ),
            "naive_hedge" => {
                params.ensure_known(&["cancellation"])?;
                let cancellation = params.get("cancellation")?.unwrap_or(false);
                Self::new(&params.to_string(), DelayRule::Immediate, cancellation)
            }
            "perfect_hedge" => {
                params.ensure_known(&["cancellation"])?;
                let cancellation = params.get("cancellation")?.unwrap_or(true);
                Self::new(&params.to_string(), DelayRule::Oracle, cancellation)
            }
            "delayed_hedge" => {
                params.ensure_known(&["percentile", "cancellation"])?;
                let percentile = params.get("percentile")?.unwrap_or(DEFAULT_PERCENTILE);
                if !(0. ..=1.).contains(&percentile) {
                    return Err(Error::InvalidPolicyParam {
                        name: params.to_string(),
                        param: "percentile".to_string(),
                    });
                }
                let cancellation = params.get("cancellation")?.unwrap_or(true);
                Self::new(&params.to_string(), DelayRule::Percentile(percentile), cancellation)
            }
            "assisted_hedge" => {
                params.ensure_known(&["precision", "cancellation"])?;
                let precision = params.get("precision")?.unwrap_or(DEFAULT_PRECISION);
                if !(0. ..=1.).contains(&precision) {
                    return Err(Error::InvalidPolicyParam {
                        name: params.to_string(),
                        param: "precision".to_string(),
                    });
                }
                let cancellation = params.get("cancellation")?.unwrap_or(true);
                Self::new(&params.to_string(), DelayRule::Predictor { precision }, cancellation)
            }
            _ => return Err(Error::UnknownPolicy { name: s.to_string() }),
        };
        Ok(policy)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delay_rule(&self) -> DelayRule {
        self.delay_rule
    }

    pub fn cancellation(&self) -> bool {
        self.cancellation
    }

    /// Whether the policy needs a predictor draw per request.
    pub fn uses_predictor(&self) -> bool {
        matches!(self.delay_rule, DelayRule::Predictor { .. })
    }

    /// Computes the delay of the copy.
    ///
    /// `percentile_delay` is the service time percentile requested by [`DelayRule::Percentile`]
    /// and `predictor_draw` is a uniform value from [0, 1) used by [`DelayRule::Predictor`].
    /// Both are ignored by other rules.
    pub fn resolve_delay(
        &self,
        service_time: f64,
        copy_service_time: f64,
        percentile_delay: f64,
        predictor_draw: f64,
    ) -> f64 {
        // a delay beyond the service time means the copy is never useful
        let never = service_time + 1.;
        match self.delay_rule {
            DelayRule::Immediate => 0.,
            DelayRule::Percentile(_) => percentile_delay,
            DelayRule::Oracle => {
                if is_tail(service_time, copy_service_time) {
                    0.
                } else {
                    never
                }
            }
            // no false positives: only tail requests can be predicted
            DelayRule::Predictor { precision } => {
                if is_tail(service_time, copy_service_time) && predictor_draw <= precision {
                    0.
                } else {
                    never
                }
            }
        }
    }

    pub fn apply(
        &self,
        service_time: f64,
        copy_service_time: f64,
        percentile_delay: f64,
        predictor_draw: f64,
    ) -> HedgeResult {
        let delay = self.resolve_delay(service_time, copy_service_time, percentile_delay, predictor_draw);
        hedged_request(service_time, copy_service_time, delay, self.cancellation)
    }
}

impl fmt::Display for HedgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_cancellation_both_copies_counted() {
        let res = hedged_request(100., 100., 0., false);
        assert_eq!(res.response_time, 100.);
        assert_eq!(res.system_load, 200.);
    }

    #[test]
    fn test_cancellation_accounting() {
        let res = hedged_request(1000., 50., 0., true);
        assert_eq!(res.response_time, 50.);
        assert_eq!(res.system_load, 100.);
        let res = hedged_request(30., 50., 40., true);
        assert_eq!(res.response_time, 30.);
        assert_eq!(res.system_load, 30.);
    }

    #[test]
    fn test_params_parsing() {
        let params = PolicyParams::from_str("assisted_hedge[precision=0.5,cancellation=false]").unwrap();
        assert_eq!(params.name(), "assisted_hedge");
        assert_eq!(params.get::<f64>("precision").unwrap(), Some(0.5));
        assert_eq!(params.get::<bool>("cancellation").unwrap(), Some(false));
        assert_eq!(params.to_string(), "assisted_hedge[cancellation=false,precision=0.5]");
        assert!(PolicyParams::from_str("assisted_hedge[precision=0.5").is_none());
        assert!(PolicyParams::from_str("assisted_hedge[precision]").is_none());
    }
}
