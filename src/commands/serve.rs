use std::fs;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::fetch::runtime;
use crate::error::{ReportError, Result};

pub struct ServeOptions {
    pub bind: String,
    pub port: u16,
}

struct ServeState {
    root: PathBuf,
}

/// Serve a report directory over HTTP until Ctrl-C.
///
/// The directory should contain both the report pages and the `results/`
/// tree so that `../results/{partition}/{name}.js` resolves from a page.
pub fn run_serve(root: PathBuf, options: &ServeOptions) -> Result<()> {
    let root = fs::canonicalize(&root)?;
    if !root.is_dir() {
        return Err(ReportError::InvalidArgs(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let addr: SocketAddr = format!("{}:{}", options.bind, options.port)
        .parse()
        .map_err(|err| ReportError::InvalidArgs(format!("Invalid bind address: {err}")))?;

    let state = Arc::new(ServeState { root });

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let shutdown_signal = Arc::new(std::sync::Mutex::new(Some(shutdown_tx)));

    let ctrlc_state = shutdown_signal.clone();
    ctrlc::set_handler(move || {
        if let Ok(mut sender) = ctrlc_state.lock() {
            if let Some(tx) = sender.take() {
                let _ = tx.send(());
            }
        }
    })
    .map_err(|err| ReportError::InvalidArgs(format!("Failed to set ctrl+c handler: {err}")))?;

    println!(
        "Serving {} on http://{}:{}",
        state.root.display(),
        options.bind,
        options.port
    );

    runtime()?.block_on(run_server(addr, state, shutdown_rx))
}

async fn run_server(
    addr: SocketAddr,
    state: Arc<ServeState>,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<()> {
    let make_svc = make_service_fn(move |_| {
        let state = state.clone();
        async move {
            Ok::<_, std::convert::Infallible>(service_fn(move |req| {
                handle_request(req, state.clone())
            }))
        }
    });

    let server = hyper::Server::try_bind(&addr)
        .map_err(|err| ReportError::InvalidArgs(format!("Bind failed: {err}")))?
        .serve(make_svc);
    info!(%addr, "listening");

    server
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .map_err(|err| ReportError::InvalidArgs(format!("Server error: {err}")))?;

    info!("server stopped");
    Ok(())
}

async fn handle_request(
    req: Request<Body>,
    state: Arc<ServeState>,
) -> std::result::Result<Response<Body>, std::convert::Infallible> {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return Ok(plain(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"));
    }

    let Some(path) = resolve_path(&state.root, req.uri().path()) else {
        warn!(path = req.uri().path(), "rejected path");
        return Ok(plain(StatusCode::BAD_REQUEST, "Bad path"));
    };

    let read_path = path.clone();
    let read = tokio::task::spawn_blocking(move || fs::read(read_path)).await;
    let response = match read {
        Ok(Ok(bytes)) => {
            info!(path = req.uri().path(), size = bytes.len(), "200");
            file_response(&path, bytes, req.method() == Method::HEAD)
        }
        Ok(Err(err)) if err.kind() == ErrorKind::NotFound => {
            warn!(path = req.uri().path(), "404");
            plain(StatusCode::NOT_FOUND, "Not found")
        }
        Ok(Err(err)) => {
            warn!(path = req.uri().path(), error = %err, "read failed");
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Read failed")
        }
        Err(err) => {
            warn!(path = req.uri().path(), error = %err, "read task failed");
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Read failed")
        }
    };
    Ok(response)
}

/// Map a request path onto the served directory, refusing anything that
/// would step outside it. Directories resolve to their `index.html`.
///
/// Segments are percent-decoded one at a time, so an encoded `/` or `..`
/// cannot introduce new components.
fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for segment in request_path.split('/') {
        let decoded = percent_decode_str(segment).decode_utf8().ok()?;
        if decoded.contains(['/', '\\', '\0']) {
            return None;
        }
        for component in Path::new(decoded.as_ref()).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
    }
    if resolved.is_dir() {
        resolved.push("index.html");
    }
    Some(resolved)
}

fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("css") => "text/css; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("txt") | Some("log") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn file_response(path: &Path, bytes: Vec<u8>, head: bool) -> Response<Body> {
    let len = bytes.len();
    let body = if head { Body::empty() } else { Body::from(bytes) };
    Response::builder()
        .status(StatusCode::OK)
        .header(hyper::header::CONTENT_TYPE, content_type(path))
        .header(hyper::header::CONTENT_LENGTH, len)
        .header(hyper::header::CACHE_CONTROL, "no-cache")
        .body(body)
        .unwrap_or_else(|_| plain(StatusCode::INTERNAL_SERVER_ERROR, "Response build failed"))
}

fn plain(status: StatusCode, message: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolves_files_and_directory_indexes() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("report")).unwrap();
        let root = tmp.path();

        assert_eq!(
            resolve_path(root, "/results/0/index.js"),
            Some(root.join("results").join("0").join("index.js"))
        );
        assert_eq!(
            resolve_path(root, "/report/"),
            Some(root.join("report").join("index.html"))
        );
    }

    #[test]
    fn refuses_parent_traversal() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(resolve_path(tmp.path(), "/../etc/passwd"), None);
        assert_eq!(resolve_path(tmp.path(), "/results/../../secret"), None);
    }

    #[test]
    fn decodes_percent_encoded_segments() {
        let tmp = TempDir::new().unwrap();
        let results = tmp.path().join("results").join("0");
        fs::create_dir_all(&results).unwrap();
        fs::write(results.join("login test.js"), "{}").unwrap();
        fs::write(results.join("café.js"), "{}").unwrap();

        let resolved = resolve_path(tmp.path(), "/results/0/login%20test.js").unwrap();
        assert_eq!(resolved, results.join("login test.js"));
        assert!(resolved.is_file());
        assert_eq!(
            resolve_path(tmp.path(), "/results/0/caf%C3%A9.js"),
            Some(results.join("café.js"))
        );
    }

    #[test]
    fn refuses_encoded_separators_and_traversal() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(resolve_path(tmp.path(), "/results/%2e%2e/%2E%2E/secret"), None);
        assert_eq!(resolve_path(tmp.path(), "/results/..%2Fsecret"), None);
        assert_eq!(resolve_path(tmp.path(), "/results/a%5Cb"), None);
        assert_eq!(resolve_path(tmp.path(), "/results/%FF.js"), None);
    }

    #[test]
    fn picks_content_types() {
        assert_eq!(
            content_type(Path::new("results/0/index.js")),
            "application/javascript; charset=utf-8"
        );
        assert_eq!(
            content_type(Path::new("report/index.HTML")),
            "text/html; charset=utf-8"
        );
        assert_eq!(content_type(Path::new("blob")), "application/octet-stream");
    }
}
