mod aggregator;

pub use aggregator::Aggregator;

use serde::{Deserialize, Serialize};

/// Running statistics for one url
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlStats {
    pub count: usize,
    pub time_sum: f64,
    pub time_max: f64,
    pub time_values: Vec<f64>,
}

impl UrlStats {
    pub fn add(&mut self, request_time: f64) {
        self.count += 1;
        self.time_sum += request_time;
        self.time_max = self.time_max.max(request_time);
        self.time_values.push(request_time);
    }

    pub fn time_avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.time_sum / self.count as f64
        }
    }
}

/// One url's finalized statistics as serialized into the report.
///
/// Field order matches the JSON the report template consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub count: usize,
    pub time_sum: f64,
    pub time_avg: f64,
    pub time_max: f64,
    pub url: String,
    pub time_med: f64,
    pub count_perc: f64,
    pub time_perc: f64,
}

/// Round to 3 decimal places, exact halves going to the even digit.
///
/// The decision is made on the exact value of `value * 1000`, not on the
/// rounded product, so a double slightly above or below a decimal half is
/// never mistaken for a tie.
pub fn round3(value: f64) -> f64 {
    let scaled = value * 1000.0;
    let rounded = if scaled.fract().abs() == 0.5 {
        // Error of the multiplication, exact thanks to the fused multiply-add
        let residue = value.mul_add(1000.0, -scaled);
        if residue > 0.0 {
            scaled.ceil()
        } else if residue < 0.0 {
            scaled.floor()
        } else {
            scaled.round_ties_even()
        }
    } else {
        scaled.round()
    };
    rounded / 1000.0
}

/// Share of `part` in `whole` as a percentage rounded to 3 decimals.
///
/// An empty whole gives 0 rather than NaN.
pub fn perc(whole: f64, part: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    round3(part * 100.0 / whole)
}

/// Median of `values`, averaging the two middle values for even lengths
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
