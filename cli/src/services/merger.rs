use crate::models::{MetricSet, Ticker};
use tracing::debug;

/// Overlay the supplementary source's metrics onto the primary source's.
///
/// The supplementary value wins whenever both sets carry the same KPI.
pub fn merge_metric_sets(ticker: &Ticker, primary: MetricSet, supplementary: MetricSet) -> MetricSet {
    let primary_count = primary.len();
    let supplementary_count = supplementary.len();

    let mut merged = primary;
    merged.overlay(supplementary);

    debug!(%ticker, primary_count, supplementary_count, merged_count = merged.len(), "Merged metric sets");
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Kpi, MetricValue};

    fn meta() -> Ticker {
        Ticker::new("META").unwrap()
    }

    #[test]
    fn test_supplementary_wins_on_collision() {
        let primary = MetricSet::new()
            .with(Kpi::ForwardPe, MetricValue::Numeric(23.0))
            .with(Kpi::PegRatio, MetricValue::NotAvailable);
        let supplementary = MetricSet::new().with(Kpi::PegRatio, MetricValue::Numeric(1.3));

        let merged = merge_metric_sets(&meta(), primary, supplementary);

        assert_eq!(merged.get(Kpi::PegRatio), Some(MetricValue::Numeric(1.3)));
        assert_eq!(merged.get(Kpi::ForwardPe), Some(MetricValue::Numeric(23.0)));
    }

    #[test]
    fn test_supplementary_sentinel_also_wins() {
        let primary = MetricSet::new().with(Kpi::PegRatio, MetricValue::Numeric(2.0));
        let supplementary = MetricSet::new().with(Kpi::PegRatio, MetricValue::NotAvailable);

        let merged = merge_metric_sets(&meta(), primary, supplementary);
        assert_eq!(merged.get(Kpi::PegRatio), Some(MetricValue::NotAvailable));
    }

    #[test]
    fn test_empty_primary() {
        let supplementary = MetricSet::new().with(Kpi::PegRatio, MetricValue::NotAvailable);
        let merged = merge_metric_sets(&meta(), MetricSet::new(), supplementary.clone());
        assert_eq!(merged, supplementary);
    }
}
