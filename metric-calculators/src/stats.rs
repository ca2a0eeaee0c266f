//! Shared sample → `MetricValue` reduction: median with an interquartile
//! confidence band, the same shape `PullRequestMedianMetricCalculator`
//! reports in the original system (median plus a spread-derived interval).

use storage_gateway::model::MetricValue;

pub fn median_with_iqr(mut samples: Vec<f64>) -> MetricValue {
    if samples.is_empty() {
        return MetricValue::absent();
    }
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = percentile(&samples, 0.5);
    if samples.len() == 1 {
        return MetricValue::exact(median);
    }
    let lo = percentile(&samples, 0.25);
    let hi = percentile(&samples, 0.75);
    MetricValue::with_interval(median, lo, hi)
}

fn percentile(sorted: &[f64], q: f64) -> f64 {
    let idx = (q * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sample_is_absent() {
        assert!(!median_with_iqr(vec![]).exists);
    }

    #[test]
    fn single_sample_is_exact() {
        let v = median_with_iqr(vec![42.0]);
        assert_eq!(v.value, Some(42.0));
        assert_eq!(v.confidence_score(), 100.0);
    }
}
