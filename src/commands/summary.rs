use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use super::fetch::{build_fetcher, runtime, FetchOptions};
use crate::display::escape_html;
use crate::duration::format_elapsed;
use crate::error::Result;
use crate::model::{TestResultIndex, TestResultSummary};
use crate::toggle::ToggleViewController;

pub struct SummaryOptions {
    pub fetch: FetchOptions,
    pub name: String,
    pub output: Option<PathBuf>,
    pub title: String,
}

/// Fetch a result index and write it out as a standalone HTML page.
pub fn run_summary(options: &SummaryOptions) -> Result<()> {
    let fetcher = build_fetcher(&options.fetch.base, options.fetch.timeout())?;
    let index: TestResultIndex = runtime()?
        .block_on(fetcher.fetch_typed(&options.name, options.fetch.partition))?;

    let generated = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let html = render_summary_html(&index, &options.title, &generated)?;

    let output_path = options.output.clone().unwrap_or_else(|| PathBuf::from("-"));
    let mut out = open_output(&output_path)?;
    out.write_all(html.as_bytes())?;
    out.flush()?;

    if output_path != Path::new("-") {
        println!(
            "Wrote {} tests ({} failed) to {}",
            index.summary.len(),
            index.failed(),
            output_path.display()
        );
    }
    Ok(())
}

fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(io::stdout().lock()));
    }
    Ok(Box::new(BufWriter::new(File::create(path)?)))
}

/// Render one toggle view per test. Failed tests start open.
pub fn render_summary_html(
    index: &TestResultIndex,
    title: &str,
    generated: &str,
) -> Result<String> {
    let mut controller = ToggleViewController::new();
    let mut sections = String::new();
    for test in &index.summary {
        let (_, markup) = controller.render(&test_title(test), &test_body(test)?, test.successful);
        sections.push_str(&markup);
        sections.push('\n');
    }

    let plan = index.plan_entity_name.as_deref().unwrap_or("(unnamed plan)");
    let html = format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{css}</style>
</head>
<body>
<header>
  <h1>{title}</h1>
  <div class="meta">plan={plan} | process={process} | started={started} | generated={generated}</div>
</header>
<main>
  <div class="grid">
    <div class="card"><div class="k">tests</div><div class="v">{total}</div></div>
    <div class="card"><div class="k">passed</div><div class="v pass">{passed}</div></div>
    <div class="card"><div class="k">failed</div><div class="v fail">{failed}</div></div>
    <div class="card"><div class="k">duration</div><div class="v">{duration}</div></div>
  </div>
{sections}</main>
<script>{js}</script>
</body>
</html>
"#,
        title = escape_html(title),
        css = CSS,
        plan = escape_html(plan),
        process = index.process_id,
        started = escape_html(&format_timestamp(index.start)),
        generated = escape_html(generated),
        total = index.summary.len(),
        passed = index.passed(),
        failed = index.failed(),
        duration = format_elapsed(index.start, index.stop),
        sections = sections,
        js = JS,
    );
    Ok(html)
}

fn test_title(test: &TestResultSummary) -> String {
    let (class, label) = if test.successful {
        ("pass", "PASS")
    } else {
        ("fail", "FAIL")
    };
    let name = test.entity_name.as_deref().unwrap_or("(unnamed)");
    format!(
        "<span class=\"pill {class}\">{label}</span> {} <span class=\"muted\">({})</span>",
        escape_html(name),
        format_elapsed(test.start, test.stop)
    )
}

fn test_body(test: &TestResultSummary) -> Result<String> {
    let mut rows = Vec::new();
    if let Some(group) = test.group.as_deref() {
        rows.push(("Group", escape_html(group).into_owned()));
    }
    if let Some(thread) = test.thread_name.as_deref() {
        rows.push(("Thread", escape_html(thread).into_owned()));
    }
    rows.push(("Process", test.process_id.to_string()));
    rows.push(("Started", escape_html(&format_timestamp(test.start)).into_owned()));
    if let Some(error) = test.error_message.as_deref() {
        rows.push(("Error", format!("<pre>{}</pre>", escape_html(error))));
    }
    if !test.initial_properties.is_empty() {
        let props = serde_json::to_string_pretty(&test.initial_properties)?;
        rows.push(("Initial properties", format!("<pre>{}</pre>", escape_html(&props))));
    }

    let mut body = String::from("<table>");
    for (key, value) in rows {
        body.push_str(&format!("<tr><th>{key}</th><td>{value}</td></tr>"));
    }
    body.push_str("</table>");
    Ok(body)
}

fn format_timestamp(ms: i64) -> String {
    if ms <= 0 {
        return "-".to_string();
    }
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => "-".to_string(),
    }
}

const CSS: &str = r#"
:root{
  --bg:#0b1020;
  --panel:#111a33;
  --text:#e7ecff;
  --muted:#aab3d4;
  --line:#26325d;
  --good:#39d98a;
  --bad:#ff5c7a;
  --mono: ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, "Liberation Mono", monospace;
}
*{box-sizing:border-box}
body{margin:0; background:var(--bg); color:var(--text); font: 14px/1.4 system-ui, -apple-system, Segoe UI, Roboto, sans-serif}
header{padding:20px 24px; border-bottom:1px solid var(--line); background: rgba(17,26,51,.9)}
h1{margin:0 0 6px 0; font-size:18px}
.meta{color:var(--muted); font-family:var(--mono); font-size:12px}
main{padding:18px 24px 40px 24px; max-width:1200px; margin:0 auto}
.grid{display:grid; grid-template-columns: repeat(4, minmax(0,1fr)); gap:10px; margin:12px 0 18px 0}
.card{background:var(--panel); border:1px solid var(--line); border-radius:10px; padding:10px 12px}
.card .k{color:var(--muted); font-size:12px; font-family:var(--mono)}
.card .v{font-size:18px; margin-top:6px}
.pass{color:var(--good)}
.fail{color:var(--bad)}
.muted{color:var(--muted)}
.pill{display:inline-block; padding:2px 8px; border-radius:999px; font-family:var(--mono); font-size:12px; border:1px solid var(--line)}
.toggleView{background:var(--panel); border:1px solid var(--line); border-radius:10px; margin-bottom:8px}
.toggleViewTitle{margin:0; padding:10px 12px; cursor:pointer; font-size:14px}
.toggleViewTitlePlus{display:none}
.toggleView.closed .toggleViewTitlePlus{display:inline}
.toggleView.closed .toggleViewTitleMinus{display:none}
.toggleView.closed .togglable{display:none}
.togglable{padding:0 12px 12px 12px}
table{border-collapse:collapse}
th,td{padding:4px 10px; text-align:left; vertical-align:top}
th{font-family:var(--mono); font-size:12px; color:var(--muted)}
pre{margin:0; white-space:pre-wrap; font-family:var(--mono)}
"#;

const JS: &str = r#"
function toggleView(title){
  title.parentNode.classList.toggle('closed');
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> TestResultIndex {
        serde_json::from_str(
            r#"{
              "planEntityName": "smoke <nightly>",
              "processId": 7,
              "start": 1700000000000,
              "stop": 1700000065000,
              "summary": [
                {"entityName": "login", "successful": true, "start": 1700000000000, "stop": 1700000002000},
                {"entityName": "checkout", "group": "shop", "errorMessage": "expected <ok> got \"err\"",
                 "start": 1700000002000, "stop": 1700000065000}
              ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn renders_one_section_per_test() {
        let html = render_summary_html(&sample_index(), "Nightly", "2024-01-01T00:00:00Z").unwrap();
        assert_eq!(html.matches("class=\"toggleViewTitle\"").count(), 2);
        assert!(html.contains("<div class=\"toggleView closed\" data-section=\"0\">"));
        assert!(html.contains("<div class=\"toggleView\" data-section=\"1\">"));
        assert!(html.contains("(1 m 3 s)"));
        assert!(html.contains("<div class=\"v\">1 m 5 s</div>"));
    }

    #[test]
    fn escapes_result_text() {
        let html = render_summary_html(&sample_index(), "Nightly", "now").unwrap();
        assert!(html.contains("plan=smoke &lt;nightly&gt;"));
        assert!(html.contains("<pre>expected &lt;ok&gt; got &quot;err&quot;</pre>"));
        assert!(!html.contains("<ok>"));
    }

    #[test]
    fn missing_timestamps_render_as_dash() {
        assert_eq!(format_timestamp(0), "-");
        assert_eq!(format_timestamp(1_700_000_000_000), "2023-11-14T22:13:20.000Z");
    }
}
