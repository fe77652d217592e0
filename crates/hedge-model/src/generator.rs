//! Per-function workload generation.

use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::config::FunctionSpec;
use crate::error::{Error, Result};
use crate::hedge::{DelayRule, HedgePolicy, BASELINE};
use crate::output::HedgeOutcome;
use crate::traffic::{derive_seed, Traffic};

/// A synthetic request shared by all techniques.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request {
    pub arrival_timestamp: f64,
    pub service_time: f64,
    pub copy_service_time: f64,
}

struct PreparedPolicy {
    policy: HedgePolicy,
    /// Delay of [`DelayRule::Percentile`] for each service time distribution.
    percentile_delays: Vec<f64>,
}

pub struct WorkloadGenerator {
    function: String,
    app: String,
    traffic: Traffic,
    policies: Vec<PreparedPolicy>,
    predictor: Pcg64,
    timestamp: f64,
}

impl WorkloadGenerator {
    pub fn new(spec: &FunctionSpec, policies: &[HedgePolicy], base_seed: u64) -> Result<Self> {
        Self::build(spec, policies, base_seed).map_err(|e| e.in_function(&spec.name))
    }

    fn build(spec: &FunctionSpec, policies: &[HedgePolicy], base_seed: u64) -> Result<Self> {
        let traffic = Traffic::new(&spec.name, spec.interarrival, &spec.services, base_seed)?;
        let mut prepared = Vec::with_capacity(policies.len());
        for policy in policies {
            let percentile_delays = match policy.delay_rule() {
                DelayRule::Percentile(p) => traffic
                    .services()
                    .iter()
                    .map(|dist| dist.quantile(p))
                    .collect::<Result<Vec<_>>>()?,
                _ => vec![0.; traffic.services().len()],
            };
            prepared.push(PreparedPolicy {
                policy: policy.clone(),
                percentile_delays,
            });
        }
        if prepared.iter().any(|p| p.policy.name() == BASELINE) {
            return Err(Error::UnknownPolicy {
                name: BASELINE.to_string(),
            });
        }
        Ok(Self {
            function: spec.name.clone(),
            app: traffic.app_label(),
            traffic,
            policies: prepared,
            predictor: Pcg64::seed_from_u64(derive_seed(base_seed, &spec.name, "predictor")),
            timestamp: 0.,
        })
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    /// Number of rows emitted per request.
    pub fn techniques_count(&self) -> usize {
        self.policies.len() + 1
    }

    fn outcome(&self, technique: &str, request: &Request, response_time: f64, system_load: f64, delay: f64) -> HedgeOutcome {
        HedgeOutcome {
            technique: technique.to_string(),
            app: self.app.clone(),
            func: self.function.clone(),
            end_timestamp: request.arrival_timestamp + response_time,
            response_time,
            system_load,
            service_time: request.service_time,
            copy_service_time: request.copy_service_time,
            delay,
        }
    }

    /// Generates the next request and appends its rows for baseline and every policy to `out`.
    pub fn next_request(&mut self, out: &mut Vec<HedgeOutcome>) -> Request {
        self.timestamp += self.traffic.next_arrival();
        let (service_idx, service_time, copy_service_time) = self.traffic.next_service_pair();
        let request = Request {
            arrival_timestamp: self.timestamp,
            service_time,
            copy_service_time,
        };

        // baseline sends a single request
        out.push(HedgeOutcome {
            copy_service_time: 0.,
            ..self.outcome(BASELINE, &request, service_time, service_time, 0.)
        });

        for i in 0..self.policies.len() {
            let predictor_draw = if self.policies[i].policy.uses_predictor() {
                self.predictor.gen::<f64>()
            } else {
                0.
            };
            let prepared = &self.policies[i];
            let res = prepared.policy.apply(
                service_time,
                copy_service_time,
                prepared.percentile_delays[service_idx],
                predictor_draw,
            );
            out.push(self.outcome(
                prepared.policy.name(),
                &request,
                res.response_time,
                res.system_load,
                res.delay,
            ));
        }
        request
    }

    /// Generates `requests_count` requests.
    pub fn generate(&mut self, requests_count: usize) -> Vec<HedgeOutcome> {
        let mut rows = Vec::with_capacity(requests_count * self.techniques_count());
        for _ in 0..requests_count {
            self.next_request(&mut rows);
        }
        rows
    }
}
