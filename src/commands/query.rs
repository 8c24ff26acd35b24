use std::collections::BTreeMap;
use std::io::{self, Write};

use clap::ValueEnum;

use crate::error::Result;
use crate::query::{parse_query, QueryParameters};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryFormat {
    Table,
    Json,
}

pub struct QueryOptions {
    pub format: QueryFormat,
}

const ABSENT: &str = "(absent)";

/// Parse a URL's query string and print keys in order with their values.
pub fn run_query(url: &str, options: &QueryOptions) -> Result<()> {
    let params = parse_query(url);
    let mut out = io::stdout().lock();
    write_query(&mut out, &params, options.format)
}

pub fn write_query(
    out: &mut impl Write,
    params: &QueryParameters,
    format: QueryFormat,
) -> Result<()> {
    match format {
        QueryFormat::Json => write_json(out, params),
        QueryFormat::Table => write_table(out, params),
    }
}

fn write_json(out: &mut impl Write, params: &QueryParameters) -> Result<()> {
    let lookup: BTreeMap<&str, Option<&str>> = params
        .lookup
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_deref()))
        .collect();
    let doc = serde_json::json!({
        "keys": params.keys,
        "lookup": lookup,
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}

fn write_table(out: &mut impl Write, params: &QueryParameters) -> Result<()> {
    let rows: Vec<(&str, &str)> = params
        .iter()
        .map(|(key, value)| (key, value.unwrap_or(ABSENT)))
        .collect();

    let key_width = rows
        .iter()
        .map(|(key, _)| key.chars().count())
        .chain(std::iter::once("key".len()))
        .max()
        .unwrap_or(3);

    write_row(out, "key", "value", key_width)?;
    writeln!(out, "{}-+-{}", "-".repeat(key_width), "-".repeat(8))?;
    for (key, value) in rows {
        write_row(out, key, value, key_width)?;
    }
    Ok(())
}

fn write_row(out: &mut impl Write, key: &str, value: &str, key_width: usize) -> Result<()> {
    let pad = key_width.saturating_sub(key.chars().count());
    writeln!(out, "{key}{} | {value}", " ".repeat(pad))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(url: &str, format: QueryFormat) -> String {
        let mut buf = Vec::new();
        write_query(&mut buf, &parse_query(url), format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn table_lists_every_key_in_order() {
        let text = render("index.html?suite=smoke&flag&suite=full", QueryFormat::Table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "key   | value");
        assert_eq!(lines[2], "suite | full");
        assert_eq!(lines[3], "flag  | (absent)");
        assert_eq!(lines[4], "suite | full");
    }

    #[test]
    fn json_uses_null_for_absent_values() {
        let text = render("?a=1&b", QueryFormat::Json);
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["keys"], serde_json::json!(["a", "b"]));
        assert_eq!(doc["lookup"]["a"], "1");
        assert!(doc["lookup"]["b"].is_null());
    }
}
