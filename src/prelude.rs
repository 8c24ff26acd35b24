//! Convenience prelude for common resultview embedding tasks.

pub use crate::api::{
    escape_html, format_duration, parse_query, render_toggle_view, transport_for_base, Alerter,
    ReportError, ReportFetcher, Result, TestResultIndex, ToggleViewController,
};
