//! Request handling
//!
//! Composes the download classifier, the static file server and the
//! listing style around a single request.

use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use dropserve_core::ServeConfig;
use dropserve_static::classify::basename;
use dropserve_static::{
    FileBody, FileServer, STYLE, Served, StyledBody, classify, content_disposition,
};
use http::request::Parts;
use http::{HeaderValue, Request, Response, StatusCode, header};
use http_body_util::{BodyExt, Full};

/// Shared, read-only state handed to every request
#[derive(Debug)]
pub struct AppState {
    pub config: ServeConfig,
    pub files: FileServer,
}

impl AppState {
    pub fn new(config: ServeConfig) -> Self {
        let files = FileServer::serve_dir(config.root.clone());
        Self { config, files }
    }
}

/// Handle one request
pub async fn handle<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote: SocketAddr,
) -> Result<Response<FileBody>, Infallible> {
    let (parts, _) = req.into_parts();
    let path = urlencoding::decode(parts.uri.path()).map(Cow::into_owned);

    let response = match &path {
        Ok(path) => respond(&parts, path, &state).await,
        Err(_) => text_response(StatusCode::BAD_REQUEST, "400 Bad Request\n"),
    };

    if !state.config.silent {
        let logged_path = path.as_deref().unwrap_or(parts.uri.path());
        log_request(&parts, logged_path, remote, response.status());
    }

    Ok(response)
}

async fn respond(parts: &Parts, path: &str, state: &AppState) -> Response<FileBody> {
    let class = classify(path);
    // Directory responses grow by the style fragment, so they are always sent whole
    let range = if class.is_directory {
        None
    } else {
        parts
            .headers
            .get(header::RANGE)
            .and_then(|v| v.to_str().ok())
    };

    let mut response = match state.files.serve(path, range).await {
        Ok(Served::Content(file)) => {
            let mut response = Response::new(file.body.into_body());
            *response.status_mut() =
                StatusCode::from_u16(file.status).unwrap_or(StatusCode::OK);

            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_str(&file.mime_type)
                    .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
            );
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(file.content_length));
            if !file.is_listing {
                headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            }
            if let Some(range) = file.content_range.and_then(|r| HeaderValue::from_str(&r).ok()) {
                headers.insert(header::CONTENT_RANGE, range);
            }
            response
        }
        Ok(Served::Redirect { trailing_slash }) => redirect(parts, trailing_slash),
        Ok(Served::NotFound) => text_response(StatusCode::NOT_FOUND, "404 page not found\n"),
        Err(e) => {
            tracing::debug!("Failed to serve {}: {}", path, e);
            match e.status_code() {
                403 => text_response(StatusCode::FORBIDDEN, "403 Forbidden\n"),
                404 => text_response(StatusCode::NOT_FOUND, "404 page not found\n"),
                _ => text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error\n"),
            }
        }
    };

    if class.forces_download {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, content_disposition(basename(path)));
    }

    if class.is_directory {
        response = append_style(response);
    }

    response
}

/// Wrap the body so the listing style follows it, fixing up the length.
fn append_style(response: Response<FileBody>) -> Response<FileBody> {
    let (mut parts, body) = response.into_parts();

    let length = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    match length {
        Some(len) => {
            parts.headers.insert(
                header::CONTENT_LENGTH,
                HeaderValue::from(len + STYLE.len() as u64),
            );
        }
        None => {
            parts.headers.remove(header::CONTENT_LENGTH);
        }
    }

    Response::from_parts(parts, StyledBody::new(body).boxed_unsync())
}

/// Redirect relative to the current path, so the target never leaves this host.
fn redirect(parts: &Parts, trailing_slash: bool) -> Response<FileBody> {
    let mut location = relative_location(parts.uri.path(), trailing_slash);
    if let Some(query) = parts.uri.query() {
        location.push('?');
        location.push_str(query);
    }

    let mut response = Response::new(empty_body());
    *response.status_mut() = StatusCode::MOVED_PERMANENTLY;
    if let Ok(value) = HeaderValue::from_str(&location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
        .headers_mut()
        .insert(header::CONTENT_LENGTH, HeaderValue::from(0u64));
    response
}

/// `images` -> `images/` when adding the slash, `readme.txt/` -> `../readme.txt`
/// when dropping it. Only the last segment of the still-encoded path is used.
fn relative_location(raw_path: &str, trailing_slash: bool) -> String {
    let segment = raw_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    if trailing_slash {
        if segment.is_empty() {
            return "/".to_string();
        }
        // A colon in the first segment would read as a URL scheme
        if segment.contains(':') {
            format!("./{}/", segment)
        } else {
            format!("{}/", segment)
        }
    } else {
        format!("../{}", segment)
    }
}

fn text_response(status: StatusCode, body: &'static str) -> Response<FileBody> {
    let mut response = Response::new(
        Full::new(Bytes::from_static(body.as_bytes()))
            .map_err(|never| match never {})
            .boxed_unsync(),
    );
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len() as u64));
    response
}

fn empty_body() -> FileBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed_unsync()
}

fn log_request(parts: &Parts, path: &str, remote: SocketAddr, status: StatusCode) {
    tracing::info!(
        target: "dropserve::access",
        status = status.as_u16(),
        "{}",
        access_line(parts, path, remote)
    );
}

/// `GET /docs/a b.pdf HTTP/1.1 192.168.1.7:51234 | curl/8.0`
fn access_line(parts: &Parts, path: &str, remote: SocketAddr) -> String {
    let user_agent = parts
        .headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    format!(
        "{} {} {:?} {} | {}",
        parts.method, path, parts.version, remote, user_agent
    )
}
