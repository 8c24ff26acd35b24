use std::fs;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::{ReportError, Result};

/// Status reported when a request never produced a response.
pub const STATUS_ABORTED: u16 = 0;

/// Raw outcome of a single GET.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn aborted() -> Self {
        Self::new(STATUS_ABORTED, String::new())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one blocking GET for a source path relative to the report page.
///
/// Implementations never retry. Anything that prevents a status from being
/// received (connection refused, reset, cancelled read) is reported as
/// [`STATUS_ABORTED`] rather than as an error.
pub trait Transport: Send + Sync {
    fn get(&self, src: &str) -> Result<TransportResponse>;
}

/// HTTP(S) transport backed by a ureq agent.
pub struct HttpTransport {
    agent: ureq::Agent,
    base: Url,
}

impl HttpTransport {
    pub fn new(base: Url, timeout: Option<Duration>) -> Self {
        Self {
            agent: build_agent(timeout),
            base,
        }
    }
}

fn build_agent(timeout: Option<Duration>) -> ureq::Agent {
    let mut builder = ureq::AgentBuilder::new();
    if let Some(timeout) = timeout {
        builder = builder.timeout_connect(timeout).timeout_read(timeout);
    }
    builder.build()
}

impl Transport for HttpTransport {
    fn get(&self, src: &str) -> Result<TransportResponse> {
        let url = self.base.join(src)?;
        debug!(url = %url, "GET");

        let response = match self
            .agent
            .get(url.as_str())
            .set("Accept", "application/json")
            .call()
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(err)) => {
                debug!(url = %url, error = %err, "request did not complete");
                return Ok(TransportResponse::aborted());
            }
        };

        // `into_string` caps bodies at 10 MB; result sets can be larger.
        let status = response.status();
        let mut body = Vec::new();
        match response.into_reader().read_to_end(&mut body) {
            Ok(_) => Ok(TransportResponse::new(
                status,
                String::from_utf8_lossy(&body).into_owned(),
            )),
            Err(err) => {
                debug!(url = %url, error = %err, "response body was cut off");
                Ok(TransportResponse::aborted())
            }
        }
    }
}

/// Reads results straight from a report directory on disk.
pub struct FileTransport {
    base: Url,
}

impl FileTransport {
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl Transport for FileTransport {
    fn get(&self, src: &str) -> Result<TransportResponse> {
        let url = self.base.join(src)?;
        let path = url
            .to_file_path()
            .map_err(|_| ReportError::InvalidArgs(format!("Not a local file URL: {url}")))?;
        debug!(path = %path.display(), "read");

        let response = match fs::read_to_string(&path) {
            Ok(body) => TransportResponse::new(200, body),
            Err(err) => TransportResponse::new(status_for_io_error(err.kind()), err.to_string()),
        };
        Ok(response)
    }
}

fn status_for_io_error(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::NotFound => 404,
        ErrorKind::PermissionDenied => 403,
        _ => 500,
    }
}

/// Resolve a report base (URL or local path) into a transport.
///
/// Relative sources such as `../results/0/index.js` are joined against the
/// base the same way a browser resolves them against the report page, so a
/// directory base should end with a slash.
pub fn transport_for_base(base: &str, timeout: Option<Duration>) -> Result<Arc<dyn Transport>> {
    let url = parse_base(base)?;
    match url.scheme() {
        "http" | "https" => Ok(Arc::new(HttpTransport::new(url, timeout))),
        "file" => Ok(Arc::new(FileTransport::new(url))),
        other => Err(ReportError::InvalidArgs(format!(
            "Unsupported report base scheme '{other}'; use http, https, file, or a local path"
        ))),
    }
}

pub fn parse_base(base: &str) -> Result<Url> {
    match Url::parse(base) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => local_base(Path::new(base)),
        Err(err) => Err(err.into()),
    }
}

fn local_base(path: &Path) -> Result<Url> {
    let absolute = fs::canonicalize(path)?;
    let url = if absolute.is_dir() {
        Url::from_directory_path(&absolute)
    } else {
        Url::from_file_path(&absolute)
    };
    url.map_err(|_| {
        ReportError::InvalidArgs(format!(
            "Cannot use {} as a report base",
            absolute.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_transport_resolves_relative_to_report_page() {
        let tmp = TempDir::new().unwrap();
        let results = tmp.path().join("results").join("2");
        fs::create_dir_all(&results).unwrap();
        fs::create_dir_all(tmp.path().join("report")).unwrap();
        fs::write(results.join("index.js"), r#"{"ok":true}"#).unwrap();

        let base = Url::from_directory_path(tmp.path().join("report")).unwrap();
        let transport = FileTransport::new(base);
        let response = transport.get("../results/2/index.js?123").unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"ok":true}"#);
    }

    #[test]
    fn file_transport_maps_missing_file_to_404() {
        let tmp = TempDir::new().unwrap();
        let base = Url::from_directory_path(tmp.path()).unwrap();
        let transport = FileTransport::new(base);
        let response = transport.get("../results/0/missing.js?1").unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[test]
    fn local_directory_base_ends_with_slash() {
        let tmp = TempDir::new().unwrap();
        let url = parse_base(tmp.path().to_str().unwrap()).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with('/'));
    }

    /// Answer one request with `200 OK` and the given body.
    fn serve_body(body: Vec<u8>) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
        });
        Url::parse(&format!("http://{addr}/report/index.html")).unwrap()
    }

    #[test]
    fn http_transport_reads_bodies_past_ten_megabytes() {
        let item = b"\"0123456789abcdef0123456789abcdef\",";
        let mut body = b"[".to_vec();
        while body.len() < 12 * 1024 * 1024 {
            body.extend_from_slice(item);
        }
        body.extend_from_slice(b"\"end\"]");
        let expected_len = body.len();

        let transport = HttpTransport::new(serve_body(body), Some(Duration::from_secs(30)));
        let response = transport.get("../results/0/index.js?1").unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body.len(), expected_len);
        assert!(response.body.ends_with("\"end\"]"));
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(transport_for_base("ftp://example.com/report/", None).is_err());
    }
}
