use std::borrow::Cow;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::alert::StderrAlerter;
use crate::display::{escape_html, inspect};
use crate::duration::format_duration;
use crate::error::{ReportError, Result};
use crate::toggle::render_toggle_view;

pub struct ToggleOptions {
    pub content: String,
    pub closed: bool,
    pub raw_title: bool,
}

/// Print each millisecond value as a human-readable duration.
pub fn run_duration(values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(ReportError::InvalidArgs(
            "At least one duration is required".to_string(),
        ));
    }
    let mut out = io::stdout().lock();
    for value in values {
        writeln!(out, "{}", format_duration(*value))?;
    }
    Ok(())
}

pub fn run_escape(text: &str) -> Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", escape_html(text))?;
    Ok(())
}

/// Print toggle-view markup. The title is escaped unless `raw_title` is set;
/// the content is always inserted as given.
pub fn run_toggle(title: &str, options: &ToggleOptions) -> Result<()> {
    let title = if options.raw_title {
        Cow::Borrowed(title)
    } else {
        escape_html(title)
    };
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{}",
        render_toggle_view(&title, &options.content, options.closed)
    )?;
    Ok(())
}

/// Pretty-print a JSON document through the alert channel.
pub fn run_inspect(input: &Path) -> Result<()> {
    let text = if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin().lock().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(input)?
    };
    let value: serde_json::Value = serde_json::from_str(&text)?;
    inspect(&value, &StderrAlerter)
}
