use indexmap::IndexMap;

use crate::output::HedgeOutcome;

#[derive(Clone, Default)]
pub struct SampleMetric {
    data: Vec<f64>,
}

impl SampleMetric {
    pub fn add(&mut self, x: f64) {
        self.data.push(x);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn mean(&self) -> f64 {
        self.sum() / (self.data.len() as f64)
    }

    pub fn min(&self) -> Option<f64> {
        self.data.iter().copied().min_by(|a, b| a.total_cmp(b))
    }

    pub fn max(&self) -> Option<f64> {
        self.data.iter().copied().max_by(|a, b| a.total_cmp(b))
    }

    /// Quantile with linear interpolation between closest ranks, NaN for an empty metric.
    pub fn quantile(&self, q: f64) -> f64 {
        if self.data.is_empty() {
            return f64::NAN;
        }
        let mut data = self.data.clone();
        let pos = q.clamp(0., 1.) * (data.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let lo_val = *order_stat::kth_by(&mut data, lo, |a, b| a.total_cmp(b));
        if hi == lo {
            return lo_val;
        }
        let hi_val = *order_stat::kth_by(&mut data, hi, |a, b| a.total_cmp(b));
        lo_val + (hi_val - lo_val) * (pos - lo as f64)
    }
}

/// Response time and system load of all requests processed by a technique.
#[derive(Clone, Default)]
pub struct TechniqueStats {
    pub response_time: SampleMetric,
    pub system_load: SampleMetric,
}

/// Per-technique stats in order of first appearance.
#[derive(Clone, Default)]
pub struct Summary {
    pub techniques: IndexMap<String, TechniqueStats>,
}

impl Summary {
    pub fn from_rows(rows: &[HedgeOutcome]) -> Self {
        let mut summary = Self::default();
        for row in rows {
            summary.add(row);
        }
        summary
    }

    pub fn add(&mut self, row: &HedgeOutcome) {
        let stats = self.techniques.entry(row.technique.clone()).or_default();
        stats.response_time.add(row.response_time);
        stats.system_load.add(row.system_load);
    }

    /// Prints a table comparing every technique against the baseline.
    pub fn print_summary(&self, name: &str) {
        println!("describing {}", name);
        let baseline_load = self.techniques.get("baseline").map(|s| s.system_load.sum());
        println!(
            "{:<40} {:>10} {:>12} {:>12} {:>12} {:>12}",
            "technique", "requests", "mean rt", "p99 rt", "mean load", "rel load"
        );
        for (technique, stats) in self.techniques.iter() {
            let rel_load = match baseline_load {
                Some(base) if base > 0. => stats.system_load.sum() / base,
                _ => f64::NAN,
            };
            println!(
                "{:<40} {:>10} {:>12.3} {:>12.3} {:>12.3} {:>12.3}",
                technique,
                stats.response_time.len(),
                stats.response_time.mean(),
                stats.response_time.quantile(0.99),
                stats.system_load.mean(),
                rel_load
            );
        }
    }
}
