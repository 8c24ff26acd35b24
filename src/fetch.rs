//! Fetching JSON result fragments for the report viewer.
//!
//! Results live under `results/{partition}/{name}.js` next to the report
//! page. Every request appends the current time as a cache-buster so that
//! repeated polls always see fresh data.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::alert::Alerter;
use crate::clock::{Clock, SystemClock};
use crate::error::{ReportError, Result};
use crate::transport::{Transport, TransportResponse, STATUS_ABORTED};

pub const DEFAULT_PARTITION: u32 = 0;

/// A named result set within one partition of a test run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultReference {
    pub name: String,
    pub partition_index: u32,
}

impl ResultReference {
    pub fn new(name: impl Into<String>, partition_index: Option<u32>) -> Self {
        Self {
            name: name.into(),
            partition_index: partition_index.unwrap_or(DEFAULT_PARTITION),
        }
    }

    /// Source path relative to the report page.
    pub fn src(&self, cache_buster: i64) -> String {
        format!(
            "../results/{}/{}.js?{}",
            self.partition_index, self.name, cache_buster
        )
    }
}

/// Build the cache-busted source path for a result set.
pub fn json_src(name: &str, partition_index: Option<u32>, clock: &dyn Clock) -> String {
    ResultReference::new(name, partition_index).src(clock.now_millis())
}

/// Text shown to the user when a fetch fails with an error status.
pub fn failure_message(url: &str, status: u16) -> String {
    format!("Cannot get json from: {url}\r\nStatus:\r\n{status}")
}

#[derive(Clone)]
pub struct ReportFetcher {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl ReportFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn src(&self, name: &str, partition_index: Option<u32>) -> String {
        json_src(name, partition_index, self.clock.as_ref())
    }

    /// Fetch one result set as JSON.
    ///
    /// Exactly one request is made and it is never retried. A status of 0
    /// yields [`ReportError::Aborted`]; any other non-success status, or a
    /// success body that is not JSON, yields [`ReportError::Transport`].
    pub async fn fetch_result(&self, name: &str, partition_index: Option<u32>) -> Result<Value> {
        let src = self.src(name, partition_index);
        let transport = Arc::clone(&self.transport);
        let request_src = src.clone();

        let response = match tokio::task::spawn_blocking(move || transport.get(&request_src)).await
        {
            Ok(response) => response?,
            Err(err) => {
                warn!(url = %src, error = %err, "fetch task did not finish");
                return Err(ReportError::Aborted { url: src });
            }
        };

        decode_response(src, response)
    }

    /// Fetch one result set and decode it into `T`.
    pub async fn fetch_typed<T: DeserializeOwned>(
        &self,
        name: &str,
        partition_index: Option<u32>,
    ) -> Result<T> {
        let json = self.fetch_result(name, partition_index).await?;
        Ok(serde_json::from_value(json)?)
    }

    /// Fire-and-forget fetch.
    ///
    /// Returns immediately; `handler` runs later on the current runtime,
    /// at most once and only on success. Error statuses are surfaced through
    /// `alerter`; aborted requests are dropped silently. Each call issues its
    /// own request, with no ordering between calls.
    ///
    /// Fails with [`ReportError::NoRuntime`] when called outside a tokio
    /// runtime.
    pub fn fetch_json<F>(
        &self,
        name: &str,
        partition_index: Option<u32>,
        handler: F,
        alerter: Arc<dyn Alerter>,
    ) -> Result<JoinHandle<()>>
    where
        F: FnOnce(Value) + Send + 'static,
    {
        let handle = Handle::try_current()?;
        let fetcher = self.clone();
        let name = name.to_string();
        Ok(handle.spawn(async move {
            match fetcher.fetch_result(&name, partition_index).await {
                Ok(json) => handler(json),
                Err(err) => report_failure(&err, alerter.as_ref()),
            }
        }))
    }
}

fn decode_response(src: String, response: TransportResponse) -> Result<Value> {
    if response.status == STATUS_ABORTED {
        debug!(url = %src, "fetch aborted");
        return Err(ReportError::Aborted { url: src });
    }
    if !response.is_success() {
        return Err(ReportError::Transport {
            url: src,
            status: response.status,
        });
    }
    match serde_json::from_str(&response.body) {
        Ok(json) => Ok(json),
        Err(err) => {
            warn!(url = %src, error = %err, "response body is not JSON");
            Err(ReportError::Transport {
                url: src,
                status: response.status,
            })
        }
    }
}

/// Route a fetch failure to the user, staying quiet on aborts.
pub fn report_failure(err: &ReportError, alerter: &dyn Alerter) {
    match err {
        ReportError::Transport { url, status } => alerter.alert(&failure_message(url, *status)),
        ReportError::Aborted { url } => debug!(url = %url, "ignoring aborted fetch"),
        other => alerter.alert(&other.to_string()),
    }
}
