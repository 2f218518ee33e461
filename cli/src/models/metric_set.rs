use super::{Kpi, MetricValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// KPI values reported for one ticker, by one source or merged from several
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(BTreeMap<Kpi, MetricValue>);

impl MetricSet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, kpi: Kpi, value: MetricValue) -> Option<MetricValue> {
        self.0.insert(kpi, value)
    }

    pub fn with(mut self, kpi: Kpi, value: MetricValue) -> Self {
        self.insert(kpi, value);
        self
    }

    pub fn get(&self, kpi: Kpi) -> Option<MetricValue> {
        self.0.get(&kpi).copied()
    }

    /// Value for `kpi`, falling back to the sentinel when absent
    pub fn value_or_sentinel(&self, kpi: Kpi) -> MetricValue {
        self.get(kpi).unwrap_or(MetricValue::NotAvailable)
    }

    pub fn contains(&self, kpi: Kpi) -> bool {
        self.0.contains_key(&kpi)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copies every entry of `other` over this set; `other` wins on collision
    pub fn overlay(&mut self, other: MetricSet) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Kpi, MetricValue)> + '_ {
        self.0.iter().map(|(kpi, value)| (*kpi, *value))
    }
}

impl FromIterator<(Kpi, MetricValue)> for MetricSet {
    fn from_iter<I: IntoIterator<Item = (Kpi, MetricValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_prefers_other() {
        let mut base = MetricSet::new()
            .with(Kpi::ForwardPe, MetricValue::Numeric(20.0))
            .with(Kpi::PegRatio, MetricValue::NotAvailable);
        let other = MetricSet::new().with(Kpi::PegRatio, MetricValue::Numeric(1.4));

        base.overlay(other);

        assert_eq!(base.len(), 2);
        assert_eq!(base.get(Kpi::PegRatio), Some(MetricValue::Numeric(1.4)));
        assert_eq!(base.get(Kpi::ForwardPe), Some(MetricValue::Numeric(20.0)));
    }

    #[test]
    fn test_missing_key_reads_as_sentinel() {
        let set = MetricSet::new();
        assert!(set.is_empty());
        assert_eq!(set.get(Kpi::NetMargin), None);
        assert_eq!(set.value_or_sentinel(Kpi::NetMargin), MetricValue::NotAvailable);
    }
}
