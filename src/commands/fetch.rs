use std::io::{self, Write};
use std::time::Duration;

use crate::error::{ReportError, Result};
use crate::fetch::ReportFetcher;
use crate::transport::transport_for_base;

pub struct FetchOptions {
    pub base: String,
    pub partition: Option<u32>,
    pub timeout_secs: u64,
    pub compact: bool,
}

impl FetchOptions {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

pub fn build_fetcher(base: &str, timeout: Option<Duration>) -> Result<ReportFetcher> {
    let transport = transport_for_base(base, timeout)?;
    Ok(ReportFetcher::new(transport))
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

/// Fetch one result set and print it as JSON.
pub fn run_fetch(name: &str, options: &FetchOptions) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ReportError::InvalidArgs(
            "Result name cannot be empty".to_string(),
        ));
    }

    let fetcher = build_fetcher(&options.base, options.timeout())?;
    let json = runtime()?.block_on(fetcher.fetch_result(name, options.partition))?;

    let text = if options.compact {
        serde_json::to_string(&json)?
    } else {
        serde_json::to_string_pretty(&json)?
    };
    let mut out = io::stdout().lock();
    writeln!(out, "{text}")?;
    Ok(())
}
