//! Row sources: JSON data files and the built-in sample.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use gridsift::{coerce, FieldDescriptor, FilterOptions, Schema, Value};
use gridsift_macros::Row;
use serde::Deserialize;
use tracing::{debug, warn};

/// A row loaded from JSON, keyed by column name.
pub type JsonRow = BTreeMap<String, Value<'static>>;

#[derive(Debug, Deserialize)]
struct DataFile {
    schema: Vec<FieldDescriptor>,
    #[serde(default)]
    rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Loads `path` and converts every row to the declared column types.
///
/// Columns missing from a row read as null. Values that do not fit their
/// column are kept as given and logged.
pub fn load(path: &Path, options: &FilterOptions) -> Result<(Schema, Vec<JsonRow>)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;
    parse(&text, options).with_context(|| format!("Invalid data file {}", path.display()))
}

pub fn parse(text: &str, options: &FilterOptions) -> Result<(Schema, Vec<JsonRow>)> {
    let file: DataFile = serde_json::from_str(text)?;
    if file.schema.is_empty() {
        bail!("schema declares no columns");
    }

    let rows = file
        .rows
        .into_iter()
        .map(|mut object| {
            file.schema
                .iter()
                .map(|column| {
                    let raw = object
                        .remove(&column.name)
                        .map_or(Value::Null, json_to_value);
                    let value = match coerce(raw.clone(), &column.name, column.field_type, options)
                    {
                        Ok(value) => value,
                        Err(err) => {
                            warn!(%err, "keeping value as given");
                            raw
                        }
                    };
                    (column.name.clone(), value)
                })
                .collect::<JsonRow>()
        })
        .collect::<Vec<_>>();

    debug!(columns = file.schema.len(), rows = rows.len(), "loaded data");
    Ok((Schema::new(file.schema), rows))
}

fn json_to_value(json: serde_json::Value) -> Value<'static> {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::from(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map_or(Value::Null, Value::from)
            }
        }
        serde_json::Value::String(s) => Value::from(s),
        other => Value::other(other.to_string()),
    }
}

/// Built-in sample rows.
#[derive(Debug, Clone, Row)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub category: Option<String>,
    pub price: f64,
    pub created_date: Option<NaiveDateTime>,
}

fn at(y: i32, m: u32, d: u32, h: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(h, 0, 0))
}

pub fn sample() -> Vec<Item> {
    let item = |id, name: &str, category: Option<&str>, price, created_date| Item {
        id,
        name: name.to_string(),
        category: category.map(str::to_string),
        price,
        created_date,
    };
    vec![
        item(1, "Item A", Some("Category 1"), 10.5, at(2024, 1, 10, 9)),
        item(2, "Item B", Some("Category 2"), 23.0, at(2024, 1, 15, 14)),
        item(3, "Item C", Some("Category 1"), 17.8, at(2023, 12, 20, 11)),
        item(4, "Item D", Some("Category 3"), 45.2, at(2024, 2, 1, 16)),
        item(5, "Item E", None, 8.0, None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsift::{FieldType, Row, TypedRow};
    use std::io::Write;

    const DATA: &str = r#"{
        "schema": [
            {"name": "name", "field_type": "string"},
            {"name": "qty", "field_type": "integer"},
            {"name": "due", "field_type": "date"}
        ],
        "rows": [
            {"name": "bolt", "qty": 10, "due": "2024-03-01"},
            {"name": "nut", "qty": "7"},
            {"name": null, "qty": 1.5, "due": "later"}
        ]
    }"#;

    #[test]
    fn parse_converts_declared_types() {
        let (schema, rows) = parse(DATA, &FilterOptions::default()).unwrap();
        assert_eq!(schema.field_type("due"), Some(FieldType::Date));
        assert_eq!(rows.len(), 3);

        assert_eq!(
            rows[0]["due"],
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(rows[1]["qty"], Value::from(7.0));
        assert_eq!(rows[1]["due"], Value::Null);
        assert_eq!(rows[2]["name"], Value::Null);
        // Unparseable dates stay text
        assert_eq!(rows[2]["due"], Value::from("later"));
    }

    #[test]
    fn parse_requires_columns() {
        assert!(parse(r#"{"schema": [], "rows": []}"#, &FilterOptions::default()).is_err());
        assert!(parse("not json", &FilterOptions::default()).is_err());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DATA.as_bytes()).unwrap();

        let (schema, rows) = load(file.path(), &FilterOptions::default()).unwrap();
        assert_eq!(schema.len(), 3);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.json"), &FilterOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to read data file"));
    }

    #[test]
    fn sample_rows() {
        let items = sample();
        assert_eq!(Item::schema().len(), 5);
        assert_eq!(Item::schema().field_type(Item::CREATED_DATE), Some(FieldType::Date));
        assert_eq!(items[4].field_value(Item::CATEGORY), Some(Value::Null));
    }
}
