use crate::models::{ComparisonTable, Kpi};

/// Render the table as aligned plain text for a terminal
pub fn format_table_text(table: &ComparisonTable) -> String {
    let header = table.header();
    let body: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            let mut cells = Vec::with_capacity(row.values.len() + 2);
            cells.push(row.kpi.label().to_string());
            cells.extend(row.values.iter().map(|v| v.to_string()));
            cells.push(row.notes.clone());
            cells
        })
        .collect();

    // Notes column is left ragged
    let padded_columns = header.len() - 1;
    let widths: Vec<usize> = (0..padded_columns)
        .map(|col| {
            body.iter()
                .map(|cells| cells[col].chars().count())
                .chain(std::iter::once(header[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let render_line = |cells: &[String]| -> String {
        let mut line = String::new();
        for (col, cell) in cells.iter().enumerate() {
            if col == 0 {
                line.push_str(&format!("{:<width$}", cell, width = widths[col]));
            } else if col < padded_columns {
                line.push_str(&format!("  {:>width$}", cell, width = widths[col]));
            } else {
                line.push_str("  ");
                line.push_str(cell);
            }
        }
        line
    };

    let separator_len = widths.iter().sum::<usize>() + 2 * padded_columns + "Notes".len();
    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(render_line(&header));
    lines.push("-".repeat(separator_len));
    lines.extend(body.iter().map(|cells| render_line(cells)));
    lines.join("\n")
}

/// Render the table as CSV: `KPI,<tickers...>,Notes`
pub fn format_table_csv(table: &ComparisonTable) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.header())?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.values.len() + 2);
        record.push(row.kpi.label().to_string());
        record.extend(row.values.iter().map(|v| v.to_string()));
        record.push(row.notes.clone());
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("failed to flush CSV: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn format_table_json(table: &ComparisonTable) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(table)?)
}

/// One line per KPI: label, category and annotation
pub fn format_kpi_list() -> String {
    let width = Kpi::ALL.iter().map(|kpi| kpi.label().len()).max().unwrap_or(0);
    Kpi::ALL
        .iter()
        .map(|kpi| {
            format!(
                "{:<width$}  {:<13}  {}",
                kpi.label(),
                kpi.category().as_str(),
                kpi.note(),
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
