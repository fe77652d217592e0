mod common;
use common::assert_float_eq;

use hedge_model::distribution::{Distribution, DistributionSpec};
use hedge_model::error::Error;

#[test]
fn test_constant() {
    let spec = DistributionSpec::Constant { latency: 42. };
    let mut dist = Distribution::new(spec, 1).unwrap();
    for _ in 0..10 {
        assert_eq!(dist.sample(), 42.);
    }
    for p in &[0., 0.25, 0.95, 1.] {
        assert_eq!(dist.quantile(*p).unwrap(), 42.);
    }
}

#[test]
fn test_weibull_quantile() {
    let spec = DistributionSpec::Weibull { k: 2., lambda: 3. };
    let expected = 3. * (-(0.05f64).ln()).sqrt();
    assert_float_eq(spec.quantile(0.95).unwrap(), expected, 1e-12);
    assert_eq!(spec.quantile(0.).unwrap(), 0.);
}

#[test]
fn test_lognormal_quantile() {
    let spec = DistributionSpec::LogNormal { mu: 1.5, sigma: 0.7 };
    // median of a log-normal distribution is exp(mu)
    assert_float_eq(spec.quantile(0.5).unwrap(), 1.5f64.exp(), 1e-9);
    // Phi^-1(0.95) ~ 1.6448536
    assert_float_eq(spec.quantile(0.95).unwrap(), (1.5 + 0.7 * 1.6448536269514722f64).exp(), 1e-6);
}

#[test]
fn test_continuous_round_trip() {
    let specs = [
        DistributionSpec::Weibull { k: 0.7, lambda: 40. },
        DistributionSpec::Weibull { k: 1.5, lambda: 2. },
        DistributionSpec::LogNormal { mu: 3., sigma: 1.2 },
        DistributionSpec::LogNormal { mu: -0.38, sigma: 2.36 },
    ];
    for spec in specs.iter() {
        for q in &[0.01, 0.1, 0.5, 0.9, 0.99] {
            let x = spec.quantile(*q).unwrap();
            let back = spec.quantile(spec.cdf(x)).unwrap();
            assert_float_eq(back, x, 1e-6 * x.max(1.));
        }
    }
}

#[test]
fn test_poisson_round_trip() {
    let spec = DistributionSpec::Poisson { lambda: 4. };
    for n in 0..15 {
        let p = spec.cdf(n as f64);
        assert_eq!(spec.quantile(p).unwrap(), n as f64);
    }
}

#[test]
fn test_poisson_quantile_large_lambda() {
    let spec = DistributionSpec::Poisson { lambda: 1000. };
    let median = spec.quantile(0.5).unwrap();
    assert!((995. ..=1005.).contains(&median));
    let p95 = spec.quantile(0.95).unwrap();
    // normal approximation: 1000 + 1.645 * sqrt(1000) ~ 1052
    assert!((1045. ..=1060.).contains(&p95));
}

#[test]
fn test_invalid_quantile() {
    let spec = DistributionSpec::Weibull { k: 1., lambda: 1. };
    assert!(matches!(spec.quantile(-0.1), Err(Error::InvalidQuantile { .. })));
    assert!(matches!(spec.quantile(1.5), Err(Error::InvalidQuantile { .. })));
}

#[test]
fn test_invalid_parameters() {
    assert!(Distribution::new(DistributionSpec::Poisson { lambda: -1. }, 1).is_err());
    assert!(Distribution::new(DistributionSpec::Weibull { k: 0., lambda: 1. }, 1).is_err());
    assert!(Distribution::new(DistributionSpec::Weibull { k: 1., lambda: 0. }, 1).is_err());
    assert!(Distribution::new(DistributionSpec::LogNormal { mu: 0., sigma: 0. }, 1).is_err());
    assert!(Distribution::new(DistributionSpec::Constant { latency: -5. }, 1).is_err());
    assert!(Distribution::new(DistributionSpec::Constant { latency: 0. }, 1).is_ok());
}

#[test]
fn test_sample_means() {
    let n = 100000;
    let mut poisson = Distribution::new(DistributionSpec::Poisson { lambda: 5. }, 11).unwrap();
    let mean = (0..n).map(|_| poisson.sample()).sum::<f64>() / n as f64;
    assert_float_eq(mean, 5., 0.05);

    let mut lognormal = Distribution::new(DistributionSpec::LogNormal { mu: 0., sigma: 0.5 }, 12).unwrap();
    let mean = (0..n).map(|_| lognormal.sample()).sum::<f64>() / n as f64;
    assert_float_eq(mean, 0.125f64.exp(), 0.02);

    // mean of Weibull(k = 1, lambda) is lambda
    let mut weibull = Distribution::new(DistributionSpec::Weibull { k: 1., lambda: 3. }, 13).unwrap();
    let mean = (0..n).map(|_| weibull.sample()).sum::<f64>() / n as f64;
    assert_float_eq(mean, 3., 0.05);
}

#[test]
fn test_independent_streams() {
    let spec = DistributionSpec::Weibull { k: 1.5, lambda: 2. };
    let mut a = Distribution::new(spec, 1).unwrap();
    let mut b = Distribution::new(spec, 2).unwrap();
    let xs: Vec<f64> = (0..10).map(|_| a.sample()).collect();
    let ys: Vec<f64> = (0..10).map(|_| b.sample()).collect();
    assert_ne!(xs, ys);
}
