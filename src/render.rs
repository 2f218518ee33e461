use stockkpi::models::{ComparisonTable, MAX_TICKERS};

const PAGE_STYLE: &str = r#"
    body {
        background-color: #1E1E1E;
        color: #FFFFFF;
        font-family: 'Segoe UI', sans-serif;
        max-width: 960px;
        margin: 0 auto;
        padding: 24px;
    }
    form input[type=text] {
        width: 70%;
        padding: 8px;
        background: #2E2E2E;
        color: #FFFFFF;
        border: 1px solid #444;
        border-radius: 6px;
    }
    form button {
        padding: 8px 16px;
        background: #F0A500;
        border: none;
        border-radius: 6px;
        font-weight: bold;
    }
    .table-container {
        background: #2E2E2E;
        padding: 20px;
        border-radius: 12px;
        box-shadow: 0 4px 8px rgba(0, 0, 0, 0.2);
        margin-top: 20px;
    }
    .table-header {
        font-size: 24px;
        font-weight: bold;
        margin-bottom: 10px;
        text-align: center;
        color: #F0A500;
    }
    table {
        width: 100%;
        border-collapse: collapse;
        font-size: 14px;
        margin: auto;
    }
    th, td {
        border: 1px solid #444;
        padding: 8px;
        text-align: center;
    }
    th {
        background-color: #333;
        color: #FFFFFF;
    }
    td {
        background-color: #1E1E1E;
    }
    .highlight {
        color: #F0A500;
        font-weight: bold;
    }
    .valuation { color: #F39C12; }
    .profitability { color: #27AE60; }
    .growth { color: #3498DB; }
    .enterprise { color: #9B59B6; }
    .market { color: #E74C3C; }
    .notes-column {
        width: 300px;
        text-align: left;
    }
"#;

/// Escape text for safe inclusion in HTML element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The comparison table block: header row, one row per KPI, notes last
pub fn render_table(table: &ComparisonTable) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"table-container\">\n");
    html.push_str("<div class=\"table-header\">Key Stock Metrics Comparison</div>\n");
    html.push_str("<table>\n<thead>\n<tr><th class='highlight'>KPI</th>");
    for ticker in &table.tickers {
        html.push_str(&format!("<th>{}</th>", escape_html(ticker.as_str())));
    }
    html.push_str("<th class='notes-column'>Notes</th></tr>\n</thead>\n<tbody>\n");

    for row in &table.rows {
        html.push_str(&format!(
            "<tr><td class='highlight {}'>{}</td>",
            row.category.as_str(),
            escape_html(row.kpi.label())
        ));
        for value in &row.values {
            html.push_str(&format!("<td>{}</td>", value));
        }
        html.push_str(&format!(
            "<td class='notes-column'>{}</td></tr>\n",
            escape_html(&row.notes)
        ));
    }

    html.push_str("</tbody>\n</table>\n</div>\n");
    html
}

/// Full dashboard page. `input` is echoed back into the form; the table is
/// rendered only when one was built.
pub fn render_page(input: Option<&str>, table: Option<&ComparisonTable>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Stock KPI Dashboard</title>\n<style>");
    html.push_str(PAGE_STYLE);
    html.push_str("</style>\n</head>\n<body>\n<h1>&#128202; Stock KPI Dashboard</h1>\n");
    html.push_str(&format!(
        "<form method=\"get\" action=\"/\">\n\
         <label for=\"tickers\">Enter up to {} stock tickers separated by commas (e.g., META, AAPL, MSFT):</label><br>\n\
         <input type=\"text\" id=\"tickers\" name=\"tickers\" value=\"{}\" autofocus>\n\
         <button type=\"submit\">Compare</button>\n</form>\n",
        MAX_TICKERS,
        escape_html(input.unwrap_or_default())
    ));

    if let Some(table) = table {
        html.push_str(&render_table(table));
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use stockkpi::models::{Kpi, MetricSet, MetricValue, Ticker};
    use stockkpi::services::build_comparison_table;

    fn sample_table() -> ComparisonTable {
        let tickers = vec![Ticker::new("META").unwrap(), Ticker::new("AAPL").unwrap()];
        let mut merged = HashMap::new();
        merged.insert(
            tickers[0].clone(),
            MetricSet::new().with(Kpi::GrossMargin, MetricValue::Numeric(81.5)),
        );
        build_comparison_table(&tickers, &merged)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
        assert_eq!(escape_html("META"), "META");
    }

    #[test]
    fn test_table_rows_carry_category_classes() {
        let html = render_table(&sample_table());

        assert!(html.contains("<th>META</th><th>AAPL</th><th class='notes-column'>Notes</th>"));
        assert_eq!(html.matches("<tr><td class='highlight ").count(), 11);
        assert!(html.contains("<td class='highlight valuation'>Forward P/E Ratio</td>"));
        assert!(html.contains("<td class='highlight profitability'>Gross Margin (%)</td><td>81.5</td><td>N/A</td>"));
        assert!(html.contains("<td class='highlight market'>Enterprise Value (B)</td>"));
        assert!(html.contains("Price vs next year&#x27;s earnings. Tech avg: 20-35x"));
    }

    #[test]
    fn test_page_without_table() {
        let html = render_page(None, None);
        assert!(html.contains("<form method=\"get\""));
        assert!(html.contains("value=\"\""));
        assert!(!html.contains("table-container\">"));
    }

    #[test]
    fn test_page_escapes_echoed_input() {
        let html = render_page(Some("\"><script>"), None);
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;\""));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_page_with_table() {
        let table = sample_table();
        let html = render_page(Some("meta, aapl"), Some(&table));
        assert!(html.contains("Key Stock Metrics Comparison"));
        assert!(html.contains("value=\"meta, aapl\""));
    }
}
