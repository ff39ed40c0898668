use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => Ok(render_array_table(&items)),
        Value::Object(map) => {
            // A single list-valued field (`{"findings": [...]}`) renders as rows.
            if map.len() == 1 {
                if let Some(Value::Array(items)) = map.values().next() {
                    return Ok(render_array_table(items));
                }
            }
            let headers = ["key", "value"];
            let rows = map
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            Ok(table::render_entity_table(&headers, &rows, table_options()))
        }
        scalar => {
            let headers = ["value"];
            let rows = vec![vec![value_to_cell(&scalar)]];
            Ok(table::render_entity_table(&headers, &rows, table_options()))
        }
    }
}

/// Columns shown first when present, in this order.
const LEADING_COLUMNS: &[&str] = &["reference_code", "id", "title", "status"];

/// Long-form fields left out of list tables; `get` still shows them.
const LIST_HIDDEN_COLUMNS: &[&str] = &[
    "objectives",
    "scope",
    "test_procedures",
    "description",
    "tick_marks",
    "detail",
];

fn columns_for(rows: &[&serde_json::Map<String, Value>]) -> Vec<String> {
    let mut seen = Vec::<&str>::new();
    for key in rows.iter().flat_map(|row| row.keys()) {
        if !seen.contains(&key.as_str()) && !LIST_HIDDEN_COLUMNS.contains(&key.as_str()) {
            seen.push(key);
        }
    }

    let mut columns: Vec<String> = LEADING_COLUMNS
        .iter()
        .filter(|lead| seen.contains(lead))
        .map(|lead| (*lead).to_string())
        .collect();
    columns.extend(
        seen.into_iter()
            .filter(|key| !LEADING_COLUMNS.contains(key))
            .map(String::from),
    );
    columns
}

fn render_array_table(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    let objects: Vec<_> = items.iter().filter_map(Value::as_object).collect();
    if objects.len() != items.len() {
        let rows: Vec<Vec<String>> = items.iter().map(|item| vec![value_to_cell(item)]).collect();
        return table::render_entity_table(&["value"], &rows, table_options());
    }

    let columns = columns_for(&objects);
    if columns.is_empty() {
        return String::from("(no columns)");
    }

    let rows: Vec<Vec<String>> = objects
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).map_or_else(|| String::from("-"), value_to_cell))
                .collect()
        })
        .collect();
    let headers: Vec<&str> = columns.iter().map(String::as_str).collect();
    table::render_entity_table(&headers, &rows, table_options())
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::table::{TableOptions, render_entity_table};
    use super::{columns_for, render};
    use crate::cli::OutputFormat;

    fn finding() -> serde_json::Value {
        json!({
            "reference_code": "F-003",
            "severity": "major",
            "status": "open",
            "clauses": ["9.2", "A.5.35"],
        })
    }

    #[test]
    fn json_is_pretty_and_raw_is_one_line() {
        let pretty = render(&finding(), OutputFormat::Json).expect("json render");
        assert!(pretty.contains("\n  \"reference_code\": \"F-003\""));

        let raw = render(&finding(), OutputFormat::Raw).expect("raw render");
        assert!(!raw.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("raw should parse");
        assert_eq!(parsed, finding());
    }

    #[test]
    fn single_record_renders_key_value_rows() {
        let out = render(&finding(), OutputFormat::Table).expect("table render");
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("key"));
        assert!(lines.iter().any(|line| line.contains("9.2, A.5.35")));
    }

    #[test]
    fn single_list_field_renders_as_rows() {
        let value = json!({
            "findings": [
                { "reference_code": "F-001", "clauses": ["4.1", "4.2"] },
                { "reference_code": "F-002", "clauses": [] }
            ]
        });
        let out = render(&value, OutputFormat::Table).expect("table render");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("reference_code"));
        assert!(lines[2].contains("4.1, 4.2"));
    }

    #[test]
    fn list_columns_lead_with_identity_and_skip_long_text() {
        let first = json!({
            "status": "draft",
            "objectives": "Assess Annex A controls",
            "title": "FY26 surveillance",
            "id": "pln-1",
            "created_at": "2026-01-05"
        });
        let second = json!({ "id": "pln-2", "owner": "ciso" });
        let rows = [first.as_object().unwrap(), second.as_object().unwrap()];

        assert_eq!(
            columns_for(&rows),
            vec!["id", "title", "status", "created_at", "owner"]
        );
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let out = render(&json!({ "risks": [] }), OutputFormat::Table).expect("render");
        assert_eq!(out, "(no rows)");
    }

    #[test]
    fn scalar_lists_render_one_value_per_row() {
        let out = render(&json!(["A.5.1", "A.8.8"]), OutputFormat::Table).expect("render");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[3].contains("A.8.8"));
    }

    #[test]
    fn entity_table_pads_to_widest_cell() {
        let rows = vec![
            vec!["rsk-1".to_string(), "low".to_string()],
            vec!["rsk-22".to_string(), "critical".to_string()],
        ];
        let out = render_entity_table(
            &["id", "level"],
            &rows,
            TableOptions {
                max_width: None,
                color: false,
            },
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2].find("low"), lines[3].find("critical"));
    }
}
