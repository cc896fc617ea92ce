//! Pre-loaded, pre-MIME-typed static asset cache.
//!
//! Files are read and MIME-typed once, at cache construction time, and kept
//! in memory as plain byte buffers. Serving a request is a hash lookup plus
//! a handful of cheap slice copies into the response buffer — no per-request
//! I/O or MIME sniffing.

use std::{fs, io, path::Path, sync::Arc};

use rustc_hash::FxHashMap;

use crate::{http::response::Response, Handled, StatusCode};

/// MIME type of a cached static asset, resolved once from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MimeType {
    Html,
    Css,
    Javascript,
    Json,
    Xml,
    PlainText,
    Icon,
    Png,
    Jpeg,
    Gif,
    Svg,
    Webp,
    Pdf,
    Woff,
    Woff2,
    Ttf,
    Eot,
    OctetStream,
}

impl MimeType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Css => "text/css; charset=utf-8",
            Self::Javascript => "text/javascript; charset=utf-8",
            Self::Json => "application/json; charset=utf-8",
            Self::Xml => "application/xml; charset=utf-8",
            Self::PlainText => "text/plain; charset=utf-8",
            Self::Icon => "image/x-icon",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Svg => "image/svg+xml",
            Self::Webp => "image/webp",
            Self::Pdf => "application/pdf",
            Self::Woff => "font/woff",
            Self::Woff2 => "font/woff2",
            Self::Ttf => "font/ttf",
            Self::Eot => "application/vnd.ms-fontobject",
            Self::OctetStream => "application/octet-stream",
        }
    }

    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => match ext.to_ascii_lowercase().as_str() {
                "html" | "htm" => Self::Html,
                "css" => Self::Css,
                "js" => Self::Javascript,
                "json" => Self::Json,
                "xml" => Self::Xml,
                "txt" => Self::PlainText,
                "ico" => Self::Icon,
                "png" => Self::Png,
                "jpg" | "jpeg" => Self::Jpeg,
                "gif" => Self::Gif,
                "svg" => Self::Svg,
                "webp" => Self::Webp,
                "pdf" => Self::Pdf,
                "woff" => Self::Woff,
                "woff2" => Self::Woff2,
                "ttf" => Self::Ttf,
                "eot" => Self::Eot,
                _ => Self::OctetStream,
            },
            None => Self::OctetStream,
        }
    }
}

#[derive(Clone)]
struct CachedFile {
    mime: &'static str,
    body: Arc<[u8]>,
}

/// An in-memory, read-only map from request path to pre-loaded file contents.
///
/// Build once at startup with [`from_dir`](Self::from_dir) (or incrementally
/// with [`insert`](Self::insert)), then share via [`HandlerRegistry::static_files`
/// ](crate::HandlerRegistry::static_files). Safe for concurrent readers: there
/// is no interior mutability, only plain shared ownership.
#[derive(Clone, Default)]
pub struct StaticFilesCache {
    files: Arc<FxHashMap<String, CachedFile>>,
}

impl StaticFilesCache {
    /// Walks `root` recursively and loads every regular file into memory,
    /// keyed by its path relative to `root` (always starting with `/`).
    ///
    /// A trailing `index.html` is also registered under its directory's path
    /// (`/docs/index.html` is additionally reachable as `/docs` and `/docs/`).
    pub fn from_dir(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        let mut files = FxHashMap::default();

        Self::walk(root, root, &mut files)?;

        Ok(Self {
            files: Arc::new(files),
        })
    }

    fn walk(root: &Path, dir: &Path, files: &mut FxHashMap<String, CachedFile>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                Self::walk(root, &path, files)?;
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(&path);
            let url_path = format!("/{}", relative.to_string_lossy().replace('\\', "/")).to_ascii_lowercase();
            let body: Arc<[u8]> = fs::read(&path)?.into();
            let mime = MimeType::from_path(&path).as_str();

            if let Some(dir_path) = url_path.strip_suffix("index.html") {
                let without_slash = dir_path.trim_end_matches('/');
                if !without_slash.is_empty() {
                    files.insert(without_slash.to_string(), CachedFile { mime, body: body.clone() });
                }
                files.insert(dir_path.to_string(), CachedFile { mime, body: body.clone() });
            }

            files.insert(url_path, CachedFile { mime, body });
        }

        Ok(())
    }

    /// Inserts a single file into the cache under `path` (matched case
    /// insensitively), bypassing the filesystem walk.
    pub fn insert(&mut self, path: impl Into<String>, body: impl Into<Vec<u8>>) {
        let path = path.into();
        let mime = MimeType::from_path(Path::new(&path)).as_str();
        let body: Arc<[u8]> = body.into().into();

        Arc::make_mut(&mut self.files).insert(path.to_ascii_lowercase(), CachedFile { mime, body });
    }

    /// Looks up `path` (matched case insensitively) and, if present,
    /// finalizes `resp` with the cached body.
    ///
    /// Returns `None` on a miss, leaving `resp` untouched so the caller can
    /// fall through to its own 404.
    pub fn serve(&self, path: &[u8], resp: &mut Response) -> Option<Handled> {
        let path = std::str::from_utf8(path).ok()?.to_ascii_lowercase();
        let file = self.files.get(&path)?;

        Some(
            resp.status(StatusCode::Ok)
                .header("content-type", file.mime)
                .body(file.body.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::RespLimits;
    use tempfile::tempdir;

    #[test]
    fn mime_type_resolves_known_extensions() {
        assert_eq!(MimeType::from_path(Path::new("a.html")).as_str(), "text/html; charset=utf-8");
        assert_eq!(MimeType::from_path(Path::new("a.JPG")).as_str(), "image/jpeg");
        assert_eq!(MimeType::from_path(Path::new("a.unknown")).as_str(), "application/octet-stream");
        assert_eq!(MimeType::from_path(Path::new("a")).as_str(), "application/octet-stream");
    }

    #[test]
    fn from_dir_loads_files_and_index() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("style.css"), b"body{}").unwrap();
        fs::write(dir.path().join("index.html"), b"<h1>hi</h1>").unwrap();

        let cache = StaticFilesCache::from_dir(dir.path()).unwrap();
        let mut resp = Response::new(&RespLimits::default());

        assert!(cache.serve(b"/style.css", &mut resp).is_some());
        assert!(str_from(&resp).contains("text/css"));

        let mut resp = Response::new(&RespLimits::default());
        assert!(cache.serve(b"/", &mut resp).is_some());

        let mut resp = Response::new(&RespLimits::default());
        assert!(cache.serve(b"/missing.txt", &mut resp).is_none());
    }

    #[test]
    fn insert_adds_a_single_file() {
        let mut cache = StaticFilesCache::default();
        cache.insert("/greeting.txt", b"hello".to_vec());

        let mut resp = Response::new(&RespLimits::default());
        assert!(cache.serve(b"/greeting.txt", &mut resp).is_some());
        assert!(str_from(&resp).ends_with("hello"));
    }

    fn str_from(resp: &Response) -> &str {
        std::str::from_utf8(resp.buffer()).unwrap()
    }
}
