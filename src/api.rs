//! Stable, supported API surface for embedding resultview.
//!
//! This module re-exports the types and functions intended for external use.
//! Treat the contents of this module as SemVer-stable.

pub use crate::alert::{Alerter, MemoryAlerter, StderrAlerter};
pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::display::{escape_html, inspect};
pub use crate::duration::{format_duration, format_elapsed, format_std_duration};
pub use crate::error::{ReportError, Result};
pub use crate::fetch::{
    failure_message, json_src, report_failure, ReportFetcher, ResultReference, DEFAULT_PARTITION,
};
pub use crate::model::{TestResultIndex, TestResultSummary};
pub use crate::query::{parse_query, QueryParameters};
pub use crate::toggle::{
    render_toggle_view, SectionId, TitleRef, ToggleState, ToggleViewController,
};
pub use crate::transport::{
    parse_base, transport_for_base, FileTransport, HttpTransport, Transport, TransportResponse,
    STATUS_ABORTED,
};
