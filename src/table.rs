// Column resolution and row projection for table output.
//
// API responses are lists of JSON records. A RenderSpec names the columns
// of a table view and where each cell comes from inside a record. Cell
// lookup never fails: anything that cannot be resolved renders as an
// empty cell so one odd record cannot take down a whole listing.

use serde_json::{Map, Value};

/// Where a table cell comes from inside a record.
#[derive(Debug, Clone, Copy)]
pub enum ColumnSpec {
    /// A top-level field.
    Key(&'static str),
    /// A nested field path. A two-segment path whose first segment holds a
    /// list of records joins the second segment across the elements.
    Path(&'static [&'static str]),
}

/// Column layout for one resource's table view. `wide_columns` are only
/// shown when the user asks for the wide variant.
pub struct RenderSpec {
    pub columns: &'static [(&'static str, ColumnSpec)],
    pub wide_columns: &'static [(&'static str, ColumnSpec)],
}

impl RenderSpec {
    pub fn headers(&self, wide: bool) -> Vec<&'static str> {
        let extra = if wide { self.wide_columns } else { &[] };
        self.columns
            .iter()
            .chain(extra.iter())
            .map(|(header, _)| *header)
            .collect()
    }

    pub fn column_specs(&self, wide: bool) -> impl Iterator<Item = &'static ColumnSpec> {
        let extra = if wide { self.wide_columns } else { &[] };
        self.columns
            .iter()
            .chain(extra.iter())
            .map(|(_, spec)| spec)
    }

    pub fn width(&self, wide: bool) -> usize {
        self.columns.len() + if wide { self.wide_columns.len() } else { 0 }
    }
}

/// Render every record into one row of cells, in column order. Records
/// that are not JSON objects still produce a row of the right width.
pub fn project(records: &[Value], spec: &RenderSpec, wide: bool) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| match record.as_object() {
            Some(fields) => spec
                .column_specs(wide)
                .map(|column| resolve(fields, column))
                .collect(),
            None => vec![String::new(); spec.width(wide)],
        })
        .collect()
}

/// Pull one cell out of a record.
pub fn resolve(record: &Map<String, Value>, column: &ColumnSpec) -> String {
    match column {
        ColumnSpec::Key(key) => record.get(*key).map(render_value).unwrap_or_default(),
        ColumnSpec::Path(keys) => resolve_path(record, keys),
    }
}

fn resolve_path(record: &Map<String, Value>, keys: &[&str]) -> String {
    let Some(first) = keys.first() else {
        return String::new();
    };
    let Some(mut current) = record.get(*first) else {
        return String::new();
    };
    for key in &keys[1..] {
        current = match current {
            Value::Object(fields) => match fields.get(*key) {
                Some(value) => value,
                None => return String::new(),
            },
            // A list where a single record was expected. Only the
            // two-segment form projects across the elements; longer
            // paths fall through to an empty cell.
            Value::Array(items) if keys.len() == 2 => return join_field(items, key),
            _ => return String::new(),
        };
    }
    render_value(current)
}

// Joins `element[key]` across the list with commas. Null elements are
// skipped; any element that is not a record with the field present
// collapses the whole cell to empty rather than emitting a partial join.
fn join_field(items: &[Value], key: &str) -> String {
    let mut cells = Vec::new();
    for item in items {
        match item {
            Value::Null => continue,
            Value::Object(fields) => match fields.get(key) {
                Some(value) => cells.push(render_value(value)),
                None => return String::new(),
            },
            _ => return String::new(),
        }
    }
    cells.join(",")
}

/// Terminal value to cell text. Strings are unquoted, null is blank, and
/// anything still structured prints as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_resolve_top_level_key() {
        let vm = record(json!({"name": "web1", "tags": {}}));
        assert_eq!(resolve(&vm, &ColumnSpec::Key("name")), "web1");
        assert_eq!(resolve(&vm, &ColumnSpec::Key("missing")), "");
        assert_eq!(resolve(&vm, &ColumnSpec::Key("tags")), "{}");
    }

    #[test]
    fn test_resolve_nested_path() {
        let vm = record(json!({
            "name": "web1",
            "tags": {},
            "state": {"state": "running"}
        }));
        assert_eq!(resolve(&vm, &ColumnSpec::Path(&["state", "state"])), "running");
        assert_eq!(resolve(&vm, &ColumnSpec::Path(&["state", "code"])), "");
        assert_eq!(resolve(&vm, &ColumnSpec::Path(&["absent", "state"])), "");
    }

    #[test]
    fn test_resolve_through_scalar_is_empty() {
        let vm = record(json!({"state": "running"}));
        assert_eq!(resolve(&vm, &ColumnSpec::Path(&["state", "state"])), "");
    }

    #[test]
    fn test_resolve_renders_terminal_values() {
        let rec = record(json!({
            "count": 3,
            "enabled": true,
            "config": {"ports": [80, 443]}
        }));
        assert_eq!(resolve(&rec, &ColumnSpec::Key("count")), "3");
        assert_eq!(resolve(&rec, &ColumnSpec::Key("enabled")), "true");
        assert_eq!(resolve(&rec, &ColumnSpec::Path(&["config", "ports"])), "[80,443]");
    }

    #[test]
    fn test_list_projection_joins_elements() {
        let user = record(json!({"auth": [{"auth_id": "a1"}]}));
        assert_eq!(resolve(&user, &ColumnSpec::Path(&["auth", "auth_id"])), "a1");

        let user = record(json!({"auth": [{"auth_id": "a1"}, {"auth_id": "a2"}]}));
        assert_eq!(resolve(&user, &ColumnSpec::Path(&["auth", "auth_id"])), "a1,a2");
    }

    #[test]
    fn test_list_projection_empty_list() {
        let user = record(json!({"auth": []}));
        assert_eq!(resolve(&user, &ColumnSpec::Path(&["auth", "auth_id"])), "");
    }

    #[test]
    fn test_list_projection_skips_null_elements() {
        let user = record(json!({"auth": [{"auth_id": "a1"}, null, {"auth_id": "a3"}]}));
        assert_eq!(resolve(&user, &ColumnSpec::Path(&["auth", "auth_id"])), "a1,a3");
    }

    #[test]
    fn test_list_projection_collapses_on_bad_element() {
        let user = record(json!({"auth": [{"auth_id": "a1"}, "a2"]}));
        assert_eq!(resolve(&user, &ColumnSpec::Path(&["auth", "auth_id"])), "");

        let user = record(json!({"auth": [{"auth_id": "a1"}, {"other": "x"}]}));
        assert_eq!(resolve(&user, &ColumnSpec::Path(&["auth", "auth_id"])), "");
    }

    #[test]
    fn test_list_projection_requires_two_segments() {
        let cluster = record(json!({
            "nodes": [{"config": {"ip": "10.0.0.5"}}]
        }));
        assert_eq!(
            resolve(&cluster, &ColumnSpec::Path(&["nodes", "config", "ip"])),
            ""
        );
    }

    #[test]
    fn test_project_row_per_record() {
        const SPEC: RenderSpec = RenderSpec {
            columns: &[
                ("Name", ColumnSpec::Key("name")),
                ("State", ColumnSpec::Path(&["state", "state"])),
            ],
            wide_columns: &[("Created", ColumnSpec::Key("created"))],
        };
        let records = vec![
            json!({"name": "web1", "tags": {}, "state": {"state": "running"}}),
            json!({"name": "db1", "state": {}}),
        ];

        let rows = project(&records, &SPEC, false);
        assert_eq!(rows, vec![vec!["web1", "running"], vec!["db1", ""]]);

        let wide_rows = project(&records, &SPEC, true);
        assert_eq!(wide_rows[0].len(), SPEC.headers(true).len());
        assert_eq!(wide_rows[0], vec!["web1", "running", ""]);
    }

    #[test]
    fn test_project_non_record_rows() {
        const SPEC: RenderSpec = RenderSpec {
            columns: &[
                ("Name", ColumnSpec::Key("name")),
                ("Id", ColumnSpec::Key("id")),
            ],
            wide_columns: &[],
        };
        let records = vec![json!("orphan"), json!(null)];
        let rows = project(&records, &SPEC, false);
        assert_eq!(rows, vec![vec!["", ""], vec!["", ""]]);
    }

    #[test]
    fn test_project_empty_input() {
        const SPEC: RenderSpec = RenderSpec {
            columns: &[("Name", ColumnSpec::Key("name"))],
            wide_columns: &[],
        };
        assert!(project(&[], &SPEC, false).is_empty());
    }

    #[test]
    fn test_headers_follow_wide_flag() {
        const SPEC: RenderSpec = RenderSpec {
            columns: &[
                ("Name", ColumnSpec::Key("name")),
                ("Id", ColumnSpec::Key("id")),
            ],
            wide_columns: &[("Created", ColumnSpec::Key("created"))],
        };
        assert_eq!(SPEC.headers(false), vec!["Name", "Id"]);
        assert_eq!(SPEC.headers(true), vec!["Name", "Id", "Created"]);
        assert_eq!(SPEC.width(true), 3);
    }
}
