use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::QueryFormat;

#[derive(Parser)]
#[command(name = "resultview")]
#[command(about = "Fetch, inspect, and render partitioned test-report results.")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a result set and print it as JSON
    Fetch {
        /// Result set name (e.g. "index")
        name: String,

        /// Partition index (default: 0)
        #[arg(short, long)]
        partition: Option<u32>,

        /// Report page URL or directory that results are resolved against
        #[arg(long)]
        base: Option<String>,

        /// Connect/read timeout in seconds (0 disables)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Split a URL's query string into ordered keys and values
    Query {
        /// URL or query string
        url: String,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<QueryFormat>,
    },

    /// Format millisecond durations as "H h M m S s"
    Duration {
        /// Durations in milliseconds
        #[arg(required = true, allow_negative_numbers = true)]
        millis: Vec<f64>,
    },

    /// Escape text for insertion into HTML
    Escape {
        /// Text to escape
        text: String,
    },

    /// Render a collapsible toggle-view fragment
    Toggle {
        /// Section title (escaped unless --raw-title)
        title: String,

        /// Section body HTML, inserted as given
        #[arg(long, default_value = "")]
        content: String,

        /// Render the section closed
        #[arg(long)]
        closed: bool,

        /// Insert the title without escaping
        #[arg(long)]
        raw_title: bool,
    },

    /// Pretty-print a JSON document (use "-" for stdin)
    Inspect {
        /// JSON file to show
        #[arg(default_value = "-")]
        input: PathBuf,
    },

    /// Fetch a result index and render it as an HTML page
    Summary {
        /// Result set holding the index
        #[arg(long)]
        name: Option<String>,

        /// Partition index (default: 0)
        #[arg(short, long)]
        partition: Option<u32>,

        /// Report page URL or directory that results are resolved against
        #[arg(long)]
        base: Option<String>,

        /// Connect/read timeout in seconds (0 disables)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Output HTML file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page title
        #[arg(long)]
        title: Option<String>,
    },

    /// Serve a report directory over HTTP
    #[cfg(feature = "serve")]
    Serve {
        /// Directory containing the report pages and results/
        root: PathBuf,

        /// Address to bind
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the resolved configuration
    Config,

    /// Generate shell completions
    #[cfg(feature = "completions")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
