use crate::models::{ComparisonRow, ComparisonTable, Kpi, MetricSet, MetricValue, Ticker};
use std::collections::HashMap;

/// Build the comparison table: one row per KPI in fixed order, one value per
/// ticker in request order.
///
/// A ticker without a merged set, or a set without a KPI, reads as the
/// sentinel.
pub fn build_comparison_table(tickers: &[Ticker], merged: &HashMap<Ticker, MetricSet>) -> ComparisonTable {
    let rows = Kpi::ALL
        .iter()
        .map(|&kpi| ComparisonRow {
            kpi,
            category: kpi.category(),
            values: tickers
                .iter()
                .map(|ticker| {
                    merged
                        .get(ticker)
                        .map_or(MetricValue::NotAvailable, |metrics| metrics.value_or_sentinel(kpi))
                })
                .collect(),
            notes: kpi.note().to_string(),
        })
        .collect();

    ComparisonTable {
        tickers: tickers.to_vec(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickers(symbols: &[&str]) -> Vec<Ticker> {
        symbols.iter().filter_map(|s| Ticker::new(s)).collect()
    }

    #[test]
    fn test_always_eleven_rows_in_order() {
        for count in 1..=3 {
            let requested = tickers(&["META", "AAPL", "MSFT"][..count]);
            let table = build_comparison_table(&requested, &HashMap::new());

            assert_eq!(table.rows.len(), 11);
            let order: Vec<Kpi> = table.rows.iter().map(|row| row.kpi).collect();
            assert_eq!(order, Kpi::ALL.to_vec());
            assert!(table.rows.iter().all(|row| row.values.len() == count));
        }
    }

    #[test]
    fn test_values_follow_ticker_order() {
        let requested = tickers(&["AAPL", "META"]);
        let mut merged = HashMap::new();
        merged.insert(
            requested[0].clone(),
            MetricSet::new().with(Kpi::ForwardPe, MetricValue::Numeric(28.4)),
        );
        merged.insert(
            requested[1].clone(),
            MetricSet::new().with(Kpi::ForwardPe, MetricValue::Numeric(22.8)),
        );

        let table = build_comparison_table(&requested, &merged);
        let row = table.row(Kpi::ForwardPe).unwrap();
        assert_eq!(row.values, vec![MetricValue::Numeric(28.4), MetricValue::Numeric(22.8)]);
    }

    #[test]
    fn test_missing_ticker_and_key_read_as_sentinel() {
        let requested = tickers(&["META", "GHOST"]);
        let mut merged = HashMap::new();
        merged.insert(
            requested[0].clone(),
            MetricSet::new().with(Kpi::MarketCapBillions, MetricValue::Numeric(1452.3)),
        );

        let table = build_comparison_table(&requested, &merged);

        let market_cap = table.row(Kpi::MarketCapBillions).unwrap();
        assert_eq!(market_cap.values, vec![MetricValue::Numeric(1452.3), MetricValue::NotAvailable]);
        let net_margin = table.row(Kpi::NetMargin).unwrap();
        assert_eq!(net_margin.values, vec![MetricValue::NotAvailable, MetricValue::NotAvailable]);
    }

    #[test]
    fn test_rows_carry_notes_and_category() {
        let table = build_comparison_table(&tickers(&["META"]), &HashMap::new());
        for row in &table.rows {
            assert_eq!(row.notes, row.kpi.note());
            assert_eq!(row.category, row.kpi.category());
        }
    }
}
