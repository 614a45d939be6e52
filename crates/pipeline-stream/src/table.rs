use serde_json::Value;

/// Tabular result of the `execute_sql` stage (`split`-oriented frame).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Value>>,
}

impl TableData {
    /// Parses a `{ columns, data }` value leniently.
    ///
    /// Anything that does not have that shape yields the empty table, which
    /// renderers show as a "no data" placeholder.
    pub fn from_value(value: &Value) -> Self {
        let (Some(columns), Some(rows)) = (
            value.get("columns").and_then(Value::as_array),
            value.get("data").and_then(Value::as_array),
        ) else {
            return Self::default();
        };
        let columns = columns
            .iter()
            .map(|c| match c {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        let data = rows
            .iter()
            .filter_map(|row| row.as_array().cloned())
            .collect();
        Self { columns, data }
    }

    /// True when there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.data.is_empty()
    }

    /// Rows rendered as display strings.
    ///
    /// Columns whose first-row cell is numeric get thousands separators.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        let numeric: Vec<bool> = self
            .data
            .first()
            .map(|row| row.iter().map(Value::is_number).collect())
            .unwrap_or_default();
        self.data
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(idx, cell)| {
                        if numeric.get(idx).copied().unwrap_or(false) {
                            format_cell_grouped(cell)
                        } else {
                            format_cell(cell)
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

fn format_cell(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_cell_grouped(cell: &Value) -> String {
    match cell {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                group_digits(&i.to_string())
            } else if let Some(u) = n.as_u64() {
                group_digits(&u.to_string())
            } else {
                let f = n.as_f64().unwrap_or_default();
                let rounded = format!("{f:.3}");
                let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
                group_digits(trimmed)
            }
        }
        other => format_cell(other),
    }
}

fn group_digits(text: &str) -> String {
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_payloads_become_empty() {
        assert!(TableData::from_value(&json!(null)).is_empty());
        assert!(TableData::from_value(&json!({"columns": ["a"]})).is_empty());
        assert!(TableData::from_value(&json!({"columns": "a", "data": []})).is_empty());
        assert!(TableData::from_value(&json!({"columns": ["a"], "data": []})).is_empty());
    }

    #[test]
    fn numeric_columns_are_grouped_by_thousands() {
        let table = TableData::from_value(&json!({
            "columns": ["region", "cost", "ratio"],
            "data": [["North", 1234567, 1234.5], ["South", -9876, 0.125]]
        }));
        assert_eq!(
            table.display_rows(),
            vec![
                vec!["North", "1,234,567", "1,234.5"],
                vec!["South", "-9,876", "0.125"],
            ]
        );
    }

    #[test]
    fn null_cells_render_blank() {
        let table = TableData::from_value(&json!({
            "columns": ["a", "b"],
            "data": [["x", null]]
        }));
        assert_eq!(table.display_rows(), vec![vec!["x", ""]]);
    }
}
