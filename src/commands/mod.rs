mod display;
mod fetch;
mod query;
#[cfg(feature = "serve")]
mod serve;
mod summary;

pub use display::{run_duration, run_escape, run_inspect, run_toggle, ToggleOptions};
pub use fetch::{build_fetcher, run_fetch, FetchOptions};
pub use query::{run_query, write_query, QueryFormat, QueryOptions};
#[cfg(feature = "serve")]
pub use serve::{run_serve, ServeOptions};
pub use summary::{render_summary_html, run_summary, SummaryOptions};
