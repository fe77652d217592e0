#![allow(dead_code)]

use hedge_model::config::FunctionSpec;
use hedge_model::distribution::DistributionSpec;

pub fn assert_float_eq(x: f64, y: f64, eps: f64) {
    assert!(x > y - eps && x < y + eps, "{} != {} (eps = {})", x, y, eps);
}

pub fn function(name: &str, interarrival: DistributionSpec, services: Vec<DistributionSpec>) -> FunctionSpec {
    FunctionSpec {
        name: name.to_string(),
        interarrival,
        services,
    }
}
