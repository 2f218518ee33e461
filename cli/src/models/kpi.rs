use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of compared metrics. Declaration order is row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kpi {
    #[serde(rename = "Forward P/E Ratio")]
    ForwardPe,
    #[serde(rename = "TTM P/E Ratio")]
    TrailingPe,
    #[serde(rename = "PEG Ratio (5yr expected)")]
    PegRatio,
    #[serde(rename = "Gross Margin (%)")]
    GrossMargin,
    #[serde(rename = "Net Margin (%)")]
    NetMargin,
    #[serde(rename = "TTM Revenue Growth (%)")]
    TtmRevenueGrowth,
    #[serde(rename = "Current Year Rev Growth (Est, %)")]
    CurrentYearRevenueGrowth,
    #[serde(rename = "Enterprise Value/Revenue")]
    EvToRevenue,
    #[serde(rename = "Enterprise Value/EBITDA")]
    EvToEbitda,
    #[serde(rename = "Market Cap (B)")]
    MarketCapBillions,
    #[serde(rename = "Enterprise Value (B)")]
    EnterpriseValueBillions,
}

/// Styling bucket used by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiCategory {
    Valuation,
    Profitability,
    Growth,
    Enterprise,
    Market,
}

impl KpiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            KpiCategory::Valuation => "valuation",
            KpiCategory::Profitability => "profitability",
            KpiCategory::Growth => "growth",
            KpiCategory::Enterprise => "enterprise",
            KpiCategory::Market => "market",
        }
    }
}

impl fmt::Display for KpiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Kpi {
    /// Every KPI, in table row order
    pub const ALL: [Kpi; 11] = [
        Kpi::ForwardPe,
        Kpi::TrailingPe,
        Kpi::PegRatio,
        Kpi::GrossMargin,
        Kpi::NetMargin,
        Kpi::TtmRevenueGrowth,
        Kpi::CurrentYearRevenueGrowth,
        Kpi::EvToRevenue,
        Kpi::EvToEbitda,
        Kpi::MarketCapBillions,
        Kpi::EnterpriseValueBillions,
    ];

    /// Display label, also used as the serialized name
    pub fn label(&self) -> &'static str {
        match self {
            Kpi::ForwardPe => "Forward P/E Ratio",
            Kpi::TrailingPe => "TTM P/E Ratio",
            Kpi::PegRatio => "PEG Ratio (5yr expected)",
            Kpi::GrossMargin => "Gross Margin (%)",
            Kpi::NetMargin => "Net Margin (%)",
            Kpi::TtmRevenueGrowth => "TTM Revenue Growth (%)",
            Kpi::CurrentYearRevenueGrowth => "Current Year Rev Growth (Est, %)",
            Kpi::EvToRevenue => "Enterprise Value/Revenue",
            Kpi::EvToEbitda => "Enterprise Value/EBITDA",
            Kpi::MarketCapBillions => "Market Cap (B)",
            Kpi::EnterpriseValueBillions => "Enterprise Value (B)",
        }
    }

    /// Benchmark annotation shown in the notes column
    pub fn note(&self) -> &'static str {
        match self {
            Kpi::ForwardPe => "Price vs next year's earnings. Tech avg: 20-35x",
            Kpi::TrailingPe => "Price vs trailing earnings. SaaS avg: 30-50x",
            Kpi::PegRatio => "P/E vs growth rate. Fair value: 1.0x",
            Kpi::GrossMargin => "Revenue left after COGS. SaaS avg: 70-85%",
            Kpi::NetMargin => "Profit after all expenses. Strong: >20%",
            Kpi::TtmRevenueGrowth => "Trailing 12-month revenue growth. SaaS avg: 15-30%",
            Kpi::CurrentYearRevenueGrowth => {
                "Analyst consensus for current fiscal year. Healthy: >10%"
            }
            Kpi::EvToRevenue => "EV vs revenue. SaaS avg: 8-12x",
            Kpi::EvToEbitda => "EV vs EBITDA. SaaS avg: 20-30x",
            Kpi::MarketCapBillions => "Total market value of shares. Context: Compare to peers",
            Kpi::EnterpriseValueBillions => "Total company value (debt + equity - cash)",
        }
    }

    pub fn category(&self) -> KpiCategory {
        match self {
            Kpi::ForwardPe | Kpi::TrailingPe | Kpi::PegRatio => KpiCategory::Valuation,
            Kpi::GrossMargin | Kpi::NetMargin => KpiCategory::Profitability,
            Kpi::TtmRevenueGrowth | Kpi::CurrentYearRevenueGrowth => KpiCategory::Growth,
            Kpi::EvToRevenue | Kpi::EvToEbitda => KpiCategory::Enterprise,
            Kpi::MarketCapBillions | Kpi::EnterpriseValueBillions => KpiCategory::Market,
        }
    }

    /// Look a KPI up by its display label
    pub fn from_label(label: &str) -> Option<Kpi> {
        Kpi::ALL.iter().copied().find(|kpi| kpi.label() == label)
    }
}

impl fmt::Display for Kpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
