use crate::core::query::QueryResult;
use crate::core::FieldValue;
use std::fmt;

const NULL_CELL: &str = "<NA>";

fn cell_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => NULL_CELL.to_string(),
        other => other.to_string(),
    }
}

/// "Showing N of M" banner followed by an aligned plain-text table.
pub struct QueryReport<'a>(pub &'a QueryResult);

impl fmt::Display for QueryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        let rule = "=".repeat(80);

        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "Query Results: Displaying {} of {} rows",
            result.returned(),
            result.total_matches
        )?;
        writeln!(f, "{}\n", rule)?;

        if result.rows.is_empty() || result.columns.is_empty() {
            writeln!(f, "(no rows to display)")?;
            return write!(f, "\n{}", rule);
        }

        let cells: Vec<Vec<String>> = result
            .rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        let widths: Vec<usize> = result
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(column.name().len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = result
            .columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| format!("{:<width$}", column.name(), width = *width))
            .collect();
        writeln!(f, "{}", header.join("  ").trim_end())?;

        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect();
            writeln!(f, "{}", line.join("  ").trim_end())?;
        }

        write!(f, "\n{}", rule)
    }
}
