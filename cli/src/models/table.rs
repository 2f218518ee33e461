use super::{Kpi, KpiCategory, MetricValue, Ticker};
use serde::{Deserialize, Serialize};

/// One KPI across every requested ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub kpi: Kpi,
    pub category: KpiCategory,
    /// One value per ticker, in request order
    pub values: Vec<MetricValue>,
    pub notes: String,
}

/// Row-per-KPI, column-per-ticker comparison built for a single request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub tickers: Vec<Ticker>,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn row(&self, kpi: Kpi) -> Option<&ComparisonRow> {
        self.rows.iter().find(|row| row.kpi == kpi)
    }

    /// Value of `kpi` for `ticker`, if both are part of the table
    pub fn value(&self, ticker: &Ticker, kpi: Kpi) -> Option<MetricValue> {
        let column = self.tickers.iter().position(|t| t == ticker)?;
        self.row(kpi).and_then(|row| row.values.get(column).copied())
    }

    /// Column for one ticker, in row order
    pub fn column(&self, ticker: &Ticker) -> Option<Vec<MetricValue>> {
        let column = self.tickers.iter().position(|t| t == ticker)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.values.get(column).copied().unwrap_or(MetricValue::NotAvailable))
                .collect(),
        )
    }

    /// Header cells: `KPI`, one per ticker, then `Notes`
    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.tickers.len() + 2);
        header.push("KPI".to_string());
        header.extend(self.tickers.iter().map(|t| t.to_string()));
        header.push("Notes".to_string());
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ComparisonTable {
        ComparisonTable {
            tickers: vec![Ticker::new("meta").unwrap(), Ticker::new("aapl").unwrap()],
            rows: vec![ComparisonRow {
                kpi: Kpi::ForwardPe,
                category: KpiCategory::Valuation,
                values: vec![MetricValue::Numeric(22.1), MetricValue::NotAvailable],
                notes: Kpi::ForwardPe.note().to_string(),
            }],
        }
    }

    #[test]
    fn test_value_lookup() {
        let table = sample();
        let aapl = Ticker::new("AAPL").unwrap();
        let meta = Ticker::new("META").unwrap();

        assert_eq!(table.value(&meta, Kpi::ForwardPe), Some(MetricValue::Numeric(22.1)));
        assert_eq!(table.value(&aapl, Kpi::ForwardPe), Some(MetricValue::NotAvailable));
        assert_eq!(table.value(&aapl, Kpi::NetMargin), None);
        assert_eq!(table.column(&aapl), Some(vec![MetricValue::NotAvailable]));
    }

    #[test]
    fn test_header() {
        assert_eq!(sample().header(), vec!["KPI", "META", "AAPL", "Notes"]);
    }
}
