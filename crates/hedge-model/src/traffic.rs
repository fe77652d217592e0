//! Arrival and service processes of a single function.

use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand_pcg::Pcg64;
use rustc_hash::FxHasher;

use crate::distribution::{Distribution, DistributionSpec};
use crate::error::{Error, Result};

/// Derives an independent seed for the random stream identified by `(function, role)`.
///
/// Seeds depend only on the names, so traces do not change when functions are reordered or
/// generated on different threads.
pub fn derive_seed(base_seed: u64, function: &str, role: &str) -> u64 {
    let mut hasher = FxHasher::default();
    base_seed.hash(&mut hasher);
    function.hash(&mut hasher);
    role.hash(&mut hasher);
    hasher.finish()
}

pub struct Traffic {
    interarrival: Distribution,
    services: Vec<Distribution>,
    selector: Pcg64,
}

impl Traffic {
    pub fn new(
        function: &str,
        interarrival: DistributionSpec,
        services: &[DistributionSpec],
        base_seed: u64,
    ) -> Result<Self> {
        if services.is_empty() {
            return Err(Error::Config("at least one service time distribution is required".to_string()));
        }
        let interarrival = Distribution::new(interarrival, derive_seed(base_seed, function, "interarrival"))?;
        let services = services
            .iter()
            .enumerate()
            .map(|(i, spec)| Distribution::new(*spec, derive_seed(base_seed, function, &format!("service/{}", i))))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            interarrival,
            services,
            selector: Pcg64::seed_from_u64(derive_seed(base_seed, function, "selector")),
        })
    }

    pub fn interarrival(&self) -> &Distribution {
        &self.interarrival
    }

    pub fn services(&self) -> &[Distribution] {
        &self.services
    }

    pub fn next_arrival(&mut self) -> f64 {
        self.interarrival.sample()
    }

    /// Picks a service distribution and draws the service times of a request and of its copy.
    ///
    /// Returns the index of the chosen distribution along with the two samples.
    pub fn next_service_pair(&mut self) -> (usize, f64, f64) {
        let idx = if self.services.len() == 1 {
            0
        } else {
            self.selector.gen_range(0..self.services.len())
        };
        let dist = &mut self.services[idx];
        let service_time = dist.sample();
        let copy_service_time = dist.sample();
        (idx, service_time, copy_service_time)
    }

    /// App label in the form `<service kind>_<interarrival kind>-app`.
    pub fn app_label(&self) -> String {
        let service_kinds: Vec<&str> = self.services.iter().map(|d| d.kind()).collect();
        format!("{}_{}-app", service_kinds.join("+"), self.interarrival.kind())
    }
}
