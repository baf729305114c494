use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(&serde_json::to_value(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

/// Objects whose only list-valued field is a list of records (`runs`,
/// `results`, `violations`) render as that list; other objects render as
/// key/value pairs.
fn render_table(value: &Value) -> anyhow::Result<String> {
    match value {
        Value::Array(items) => Ok(render_rows(items)),
        Value::Object(map) => {
            let record_lists = map
                .values()
                .filter_map(Value::as_array)
                .filter(|items| !items.is_empty() && items.iter().all(Value::is_object))
                .collect::<Vec<_>>();
            if let [items] = record_lists.as_slice() {
                return Ok(render_rows(items));
            }

            let mut entries = map.iter().collect::<Vec<_>>();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let rows = entries
                .into_iter()
                .map(|(key, value)| vec![key.clone(), value_to_cell(value)])
                .collect::<Vec<_>>();
            Ok(table::render_table(&["key", "value"], &rows, options()))
        }
        scalar => Ok(table::render_table(
            &["value"],
            &[vec![value_to_cell(scalar)]],
            options(),
        )),
    }
}

fn render_rows(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_table(&["value"], &rows, options());
    }

    // Column order follows the first record; later records may add columns.
    let mut headers = Vec::<&str>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(*header).map_or_else(|| String::from("-"), value_to_cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_table(&headers, &rows, options())
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.replace('\n', " "),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("; "),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Hit {
        id: &'static str,
        score: f32,
    }

    #[derive(Serialize)]
    struct Listing {
        query: &'static str,
        results: Vec<Hit>,
    }

    fn listing() -> Listing {
        Listing {
            query: "password storage",
            results: vec![
                Hit { id: "ab12", score: 0.5 },
                Hit { id: "cd34", score: 0.25 },
            ],
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&listing(), OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["query"], "password storage");
        assert_eq!(parsed["results"][1]["id"], "cd34");
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&listing(), OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
        assert!(serde_json::from_str::<serde_json::Value>(&out).is_ok());
    }

    #[test]
    fn table_render_lists_the_record_field() {
        let out = render(&listing(), OutputFormat::Table).expect("table render should work");
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("id"));
        assert!(lines[0].contains("score"));
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("ab12"));
    }

    #[test]
    fn table_render_for_flat_object_is_key_value() {
        #[derive(Serialize)]
        struct Stats {
            chunks: u64,
            sources: u64,
        }
        let out = render(&Stats { chunks: 55, sources: 2 }, OutputFormat::Table)
            .expect("table render should work");
        assert!(out.lines().next().is_some_and(|line| line.contains("key")));
        assert!(out.contains("chunks"));
        assert!(out.contains("55"));
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let empty: Vec<Hit> = Vec::new();
        assert_eq!(
            render(&empty, OutputFormat::Table).expect("table render should work"),
            "(no rows)"
        );
    }
}
