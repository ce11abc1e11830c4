//! File server implementation

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use dropserve_core::error::Result;
use futures::TryStreamExt;
use http_body::Frame;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::mime::guess_mime_type;

/// Response body type produced by the file server
pub type FileBody = UnsyncBoxBody<Bytes, std::io::Error>;

/// Configuration for the file server
#[derive(Debug, Clone)]
pub struct FileServerConfig {
    /// Root directory to serve
    pub root: PathBuf,
    /// Index files to look for
    pub index: Vec<String>,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            index: vec!["index.html".to_string(), "index.htm".to_string()],
        }
    }
}

/// Static file server
#[derive(Debug, Clone)]
pub struct FileServer {
    config: FileServerConfig,
}

/// Body of a served file
#[derive(Debug)]
pub enum ServedBody {
    /// Generated in memory (directory listings)
    Bytes(Bytes),
    /// Open file positioned at the first byte to send
    File { file: tokio::fs::File, len: u64 },
}

impl ServedBody {
    /// Convert into a streaming HTTP body
    pub fn into_body(self) -> FileBody {
        match self {
            ServedBody::Bytes(bytes) => Full::new(bytes)
                .map_err(|never| match never {})
                .boxed_unsync(),
            ServedBody::File { file, len } => {
                let stream = ReaderStream::new(file.take(len)).map_ok(Frame::data);
                StreamBody::new(stream).boxed_unsync()
            }
        }
    }
}

/// Response from file server
#[derive(Debug)]
pub struct ServedFile {
    pub body: ServedBody,
    pub mime_type: String,
    pub path: PathBuf,
    pub status: u16,
    pub content_length: u64,
    pub content_range: Option<String>,
    /// Listings are not range-capable
    pub is_listing: bool,
}

/// Outcome of [`FileServer::serve`]
#[derive(Debug)]
pub enum Served {
    /// File or listing content
    Content(ServedFile),
    /// Redirect to the same path with a trailing slash added (`true`)
    /// or removed (`false`)
    Redirect { trailing_slash: bool },
    /// Nothing at that path
    NotFound,
}

impl FileServer {
    /// Create a new file server
    pub fn new(config: FileServerConfig) -> Self {
        Self { config }
    }

    /// Create a file server for a directory
    pub fn serve_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(FileServerConfig {
            root: root.into(),
            ..Default::default()
        })
    }

    /// Root directory being served
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Serve a decoded request path
    pub async fn serve(&self, path: &str, range_header: Option<&str>) -> Result<Served> {
        let Some(relative) = clean_path(path) else {
            return Ok(Served::NotFound);
        };
        let file_path = self.config.root.join(relative);

        tracing::debug!("📁 Serving request: {} -> {:?}", path, file_path);

        let metadata = match tokio::fs::metadata(&file_path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Served::NotFound),
            Err(e) => return Err(e.into()),
        };

        let wants_dir = path.ends_with('/');

        if !metadata.is_dir() {
            if wants_dir {
                return Ok(Served::Redirect { trailing_slash: false });
            }
            return self
                .serve_file(&file_path, metadata.len(), range_header)
                .await
                .map(Served::Content);
        }

        if !wants_dir {
            return Ok(Served::Redirect { trailing_slash: true });
        }

        for index in &self.config.index {
            let index_path = file_path.join(index);
            if let Ok(m) = tokio::fs::metadata(&index_path).await {
                if m.is_file() {
                    return self
                        .serve_file(&index_path, m.len(), range_header)
                        .await
                        .map(Served::Content);
                }
            }
        }

        let listing = self.generate_listing(&file_path, path).await?;
        let content_length = listing.len() as u64;

        Ok(Served::Content(ServedFile {
            body: ServedBody::Bytes(Bytes::from(listing)),
            mime_type: "text/html; charset=utf-8".to_string(),
            path: file_path,
            status: 200,
            content_length,
            content_range: None,
            is_listing: true,
        }))
    }

    async fn serve_file(
        &self,
        file_path: &Path,
        file_size: u64,
        range_header: Option<&str>,
    ) -> Result<ServedFile> {
        let mut status = 200;
        let mut content_range = None;
        let mut start = 0;
        let mut length = file_size;

        if let Some((s, e)) = range_header.and_then(|r| parse_range(r, file_size)) {
            start = s;
            length = e - s + 1;
            status = 206;
            content_range = Some(format!("bytes {}-{}/{}", s, e, file_size));
        }

        let mut file = tokio::fs::File::open(file_path).await?;
        if start > 0 {
            file.seek(std::io::SeekFrom::Start(start)).await?;
        }

        Ok(ServedFile {
            body: ServedBody::File { file, len: length },
            mime_type: guess_mime_type(file_path).to_string(),
            path: file_path.to_path_buf(),
            status,
            content_length: length,
            content_range,
            is_listing: false,
        })
    }

    /// Generate HTML directory listing.
    ///
    /// The output is a fragment without `</html>`, so content appended
    /// after it still lands inside the document.
    async fn generate_listing(&self, dir_path: &Path, req_path: &str) -> Result<String> {
        let mut entries = tokio::fs::read_dir(dir_path).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            names.push((name, is_dir));
        }
        names.sort();

        let mut html = format!(
            "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<title>Index of {}</title>\n<pre>\n",
            escape_html(req_path)
        );

        if req_path != "/" {
            html.push_str("<a href=\"../\">../</a>\n");
        }

        for (name, is_dir) in &names {
            let slash = if *is_dir { "/" } else { "" };
            html.push_str(&format!(
                "<a href=\"{}{}\">{}{}</a>\n",
                urlencoding::encode(name),
                slash,
                escape_html(name),
                slash
            ));
        }

        html.push_str("</pre>\n");
        Ok(html)
    }
}

/// Resolve a request path to a path relative to the root.
///
/// `.` and empty segments are dropped and `..` pops a segment, never
/// climbing above the root. Segments that the OS would split further
/// (backslashes, drive prefixes, NUL) reject the path.
fn clean_path(path: &str) -> Option<PathBuf> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => {
                if s.contains(['\\', '\0']) {
                    return None;
                }
                let mut components = Path::new(s).components();
                if !matches!(
                    (components.next(), components.next()),
                    (Some(Component::Normal(_)), None)
                ) {
                    return None;
                }
                segments.push(s);
            }
        }
    }

    Some(segments.iter().collect())
}

/// Parse a single `bytes=` range against a file size.
///
/// Returns inclusive `(start, end)`; anything unsupported or
/// unsatisfiable yields `None` and the full file is served.
fn parse_range(header: &str, file_size: u64) -> Option<(u64, u64)> {
    let ranges = header.strip_prefix("bytes=")?;
    if file_size == 0 || ranges.contains(',') {
        return None;
    }

    let (start_str, end_str) = ranges.split_once('-')?;
    let last = file_size - 1;

    let (start, end) = match (start_str.trim(), end_str.trim()) {
        ("", "") => return None,
        ("", suffix) => {
            let n: u64 = suffix.parse().ok()?;
            if n == 0 {
                return None;
            }
            (file_size.saturating_sub(n), last)
        }
        (start, "") => (start.parse().ok()?, last),
        (start, end) => (start.parse().ok()?, end.parse::<u64>().ok()?.min(last)),
    };

    if start > end || start >= file_size {
        return None;
    }

    Some((start, end))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(file: ServedFile) -> String {
        let bytes = file.body.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn content(served: Served) -> ServedFile {
        match served {
            Served::Content(file) => file,
            other => panic!("expected content, got {:?}", other),
        }
    }

    fn fixture() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("hello.txt"), "Hello World").unwrap();
        std::fs::write(tmp.path().join("b&<w>.txt"), "x").unwrap();
        std::fs::create_dir(tmp.path().join("images")).unwrap();
        std::fs::write(tmp.path().join("images").join("cat.png"), [0x89, b'P', b'N', b'G']).unwrap();
        std::fs::create_dir(tmp.path().join("site")).unwrap();
        std::fs::write(tmp.path().join("site").join("index.html"), "<h1>Site</h1>").unwrap();
        tmp
    }

    #[tokio::test]
    async fn test_serve_file() {
        let tmp = fixture();
        let server = FileServer::serve_dir(tmp.path());

        let file = content(server.serve("/hello.txt", None).await.unwrap());
        assert_eq!(file.status, 200);
        assert_eq!(file.mime_type, "text/plain");
        assert_eq!(file.content_length, 11);
        assert!(!file.is_listing);
        assert_eq!(body_text(file).await, "Hello World");
    }

    #[tokio::test]
    async fn test_not_found() {
        let tmp = fixture();
        let server = FileServer::serve_dir(tmp.path());
        assert!(matches!(server.serve("/missing.txt", None).await.unwrap(), Served::NotFound));
    }

    #[tokio::test]
    async fn test_traversal_is_contained() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("public");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("hello.txt"), "hi").unwrap();

        let server = FileServer::serve_dir(&root);
        assert!(matches!(
            server.serve("/../secret.txt", None).await.unwrap(),
            Served::NotFound
        ));
        assert!(matches!(
            server.serve("/a/../../../secret.txt", None).await.unwrap(),
            Served::NotFound
        ));
        let file = content(server.serve("/../hello.txt", None).await.unwrap());
        assert_eq!(body_text(file).await, "hi");
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let tmp = fixture();
        let server = FileServer::serve_dir(tmp.path());

        let listing = content(server.serve("/", None).await.unwrap());
        assert!(listing.is_listing);
        assert_eq!(listing.mime_type, "text/html; charset=utf-8");
        let html = body_text(listing).await;

        assert!(html.contains("<a href=\"hello.txt\">hello.txt</a>"));
        assert!(html.contains("<a href=\"images/\">images/</a>"));
        assert!(html.contains("<a href=\"b%26%3Cw%3E.txt\">b&amp;&lt;w&gt;.txt</a>"));
        assert!(!html.contains("../"));
        assert!(!html.contains("</html>"));

        let sub = content(server.serve("/images/", None).await.unwrap());
        let html = body_text(sub).await;
        assert!(html.contains("<a href=\"../\">../</a>"));
        assert!(html.contains("cat.png"));
    }

    #[tokio::test]
    async fn test_listing_is_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["zeta.txt", "alpha.txt", "mid.txt"] {
            std::fs::write(tmp.path().join(name), "").unwrap();
        }
        let server = FileServer::serve_dir(tmp.path());
        let html = body_text(content(server.serve("/", None).await.unwrap())).await;

        let alpha = html.find("alpha.txt").unwrap();
        let mid = html.find("mid.txt").unwrap();
        let zeta = html.find("zeta.txt").unwrap();
        assert!(alpha < mid && mid < zeta);
    }

    #[tokio::test]
    async fn test_index_file() {
        let tmp = fixture();
        let server = FileServer::serve_dir(tmp.path());

        let file = content(server.serve("/site/", None).await.unwrap());
        assert!(!file.is_listing);
        assert_eq!(file.mime_type, "text/html");
        assert_eq!(body_text(file).await, "<h1>Site</h1>");
    }

    #[tokio::test]
    async fn test_redirects() {
        let tmp = fixture();
        let server = FileServer::serve_dir(tmp.path());

        assert!(matches!(
            server.serve("/images", None).await.unwrap(),
            Served::Redirect { trailing_slash: true }
        ));
        assert!(matches!(
            server.serve("/hello.txt/", None).await.unwrap(),
            Served::Redirect { trailing_slash: false }
        ));
    }

    #[tokio::test]
    async fn test_range_request() {
        let tmp = fixture();
        let server = FileServer::serve_dir(tmp.path());

        let file = content(server.serve("/hello.txt", Some("bytes=6-")).await.unwrap());
        assert_eq!(file.status, 206);
        assert_eq!(file.content_range.as_deref(), Some("bytes 6-10/11"));
        assert_eq!(file.content_length, 5);
        assert_eq!(body_text(file).await, "World");
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("bytes=0-4", 11), Some((0, 4)));
        assert_eq!(parse_range("bytes=6-", 11), Some((6, 10)));
        assert_eq!(parse_range("bytes=-3", 11), Some((8, 10)));
        assert_eq!(parse_range("bytes=5-100", 11), Some((5, 10)));
        assert_eq!(parse_range("bytes=-100", 11), Some((0, 10)));
        assert_eq!(parse_range("bytes=11-", 11), None);
        assert_eq!(parse_range("bytes=4-2", 11), None);
        assert_eq!(parse_range("bytes=0-1,3-4", 11), None);
        assert_eq!(parse_range("bytes=0-", 0), None);
        assert_eq!(parse_range("items=0-4", 11), None);
        assert_eq!(parse_range("bytes=x-4", 11), None);
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("/"), Some(PathBuf::new()));
        assert_eq!(clean_path("/a/./b//c"), Some(PathBuf::from("a/b/c")));
        assert_eq!(clean_path("/a/../../b"), Some(PathBuf::from("b")));
        assert_eq!(clean_path("/a\\..\\b"), None);
        assert_eq!(clean_path("/a\0b"), None);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">'&'</a>"), "&lt;a href=&#34;x&#34;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
