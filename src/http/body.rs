//! Parsing for structured request bodies: URL-encoded forms and
//! `multipart/form-data`. Both operate on already-buffered `'static` slices
//! handed over by [`crate::server::connection::HttpConnection`] after the
//! raw body bytes have been located in the parser buffer.

use memchr::{memchr, memmem};

use crate::{errors::ErrorKind, query::percent_decode};

/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartPart {
    pub name: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    /// Every header line on the part, in wire order, name lowercased.
    /// Includes `content-disposition`/`content-type`, already surfaced above
    /// as the common case, plus anything else the client sent.
    pub headers: Vec<(String, String)>,
    pub data: &'static [u8],
}

impl MultipartPart {
    /// Looks up a header on this part by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Decodes an `application/x-www-form-urlencoded` body into key/value pairs.
///
/// Reuses the query-string grammar (`&`-separated `key=value` pairs), then
/// percent-decodes each side.
pub(crate) fn parse_form_urlencoded(
    body: &'static [u8],
    limit: usize,
) -> Result<Vec<(String, String)>, ErrorKind> {
    let mut raw: Vec<(&[u8], &[u8])> = Vec::new();
    crate::query::Query::parse_into(&mut raw, body, limit)?;

    Ok(raw
        .into_iter()
        .map(|(k, v)| (percent_decode(k).into_owned(), percent_decode(v).into_owned()))
        .collect())
}

/// Extracts the `boundary=` parameter from a `Content-Type: multipart/form-data; ...`
/// header value. Strips surrounding quotes if present.
pub(crate) fn boundary_of(content_type: &[u8]) -> Option<&[u8]> {
    let pos = memmem::find(content_type, b"boundary=")? + b"boundary=".len();
    let rest = &content_type[pos..];

    match rest.first() {
        Some(b'"') => {
            let end = memchr(b'"', &rest[1..])? + 1;
            Some(&rest[1..end])
        }
        _ => {
            let end = memchr(b';', rest).unwrap_or(rest.len());
            Some(trim(&rest[..end]))
        }
    }
}

/// Splits a `multipart/form-data` body into its parts.
///
/// Only the preamble/epilogue-free case is supported: the body must start
/// with `--boundary` and end with `--boundary--`, as produced by every
/// common HTTP client.
pub(crate) fn parse_multipart(
    body: &'static [u8],
    boundary: &[u8],
) -> Result<Vec<MultipartPart>, ErrorKind> {
    let mut delim = Vec::with_capacity(boundary.len() + 2);
    delim.extend_from_slice(b"--");
    delim.extend_from_slice(boundary);

    let mut pos = memmem::find(body, &delim).ok_or(ErrorKind::InvalidMultipart)? + delim.len();
    let mut parts = Vec::new();

    loop {
        if body.get(pos..pos + 2) == Some(b"--") {
            break;
        }

        match body.get(pos..pos + 2) {
            Some(b"\r\n") => pos += 2,
            _ => return Err(ErrorKind::InvalidMultipart),
        }

        let next = memmem::find(&body[pos..], &delim).ok_or(ErrorKind::InvalidMultipart)? + pos;
        let part_end = match body.get(next.saturating_sub(2)..next) {
            Some(b"\r\n") => next - 2,
            _ => next,
        };

        parts.push(parse_part(&body[pos..part_end])?);
        pos = next + delim.len();
    }

    Ok(parts)
}

fn parse_part(data: &'static [u8]) -> Result<MultipartPart, ErrorKind> {
    let header_end = memmem::find(data, b"\r\n\r\n").ok_or(ErrorKind::InvalidMultipart)?;
    let body = &data[header_end + 4..];

    let mut name = None;
    let mut filename = None;
    let mut content_type = None;
    let mut headers = Vec::new();

    for line in data[..header_end].split(|&b| b == b'\n') {
        let line = trim(line);
        if line.is_empty() {
            continue;
        }

        let Some(colon) = memchr(b':', line) else {
            continue;
        };
        let key = &line[..colon];
        let value = trim(&line[colon + 1..]);

        if key.eq_ignore_ascii_case(b"content-disposition") {
            name = extract_param(value, b"name");
            filename = extract_param(value, b"filename");
        } else if key.eq_ignore_ascii_case(b"content-type") {
            content_type = Some(String::from_utf8_lossy(value).into_owned());
        }

        headers.push((
            String::from_utf8_lossy(key).to_ascii_lowercase(),
            String::from_utf8_lossy(value).into_owned(),
        ));
    }

    Ok(MultipartPart {
        name,
        filename,
        content_type,
        headers,
        data: body,
    })
}

fn extract_param(value: &[u8], param: &[u8]) -> Option<String> {
    let mut needle = Vec::with_capacity(param.len() + 2);
    needle.extend_from_slice(param);
    needle.extend_from_slice(b"=\"");

    let pos = memmem::find(value, &needle)? + needle.len();
    let end = memchr(b'"', &value[pos..])? + pos;
    Some(percent_decode(&value[pos..end]).into_owned())
}

fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |p| p + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_urlencoded() {
        let body: &'static [u8] = b"name=John+Doe&email=j%40x.com";
        let pairs = parse_form_urlencoded(body, 10).unwrap();

        assert_eq!(pairs[0], ("name".to_string(), "John Doe".to_string()));
        assert_eq!(pairs[1], ("email".to_string(), "j@x.com".to_string()));
    }

    #[test]
    fn boundary_extraction() {
        assert_eq!(
            boundary_of(b"multipart/form-data; boundary=----abc123"),
            Some(b"----abc123".as_ref())
        );
        assert_eq!(
            boundary_of(b"multipart/form-data; boundary=\"abc 123\""),
            Some(b"abc 123".as_ref())
        );
        assert_eq!(boundary_of(b"multipart/form-data"), None);
    }

    #[test]
    fn multipart_single_field() {
        let body: &'static [u8] = b"--XYZ\r\n\
Content-Disposition: form-data; name=\"field\"\r\n\
\r\n\
value\r\n\
--XYZ--\r\n";

        let parts = parse_multipart(body, b"XYZ").unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name.as_deref(), Some("field"));
        assert_eq!(parts[0].data, b"value");
    }

    #[test]
    fn multipart_with_file() {
        let body: &'static [u8] = b"--XYZ\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\
Content-Type: text/plain\r\n\
\r\n\
hello\r\n\
--XYZ\r\n\
Content-Disposition: form-data; name=\"other\"\r\n\
\r\n\
world\r\n\
--XYZ--\r\n";

        let parts = parse_multipart(body, b"XYZ").unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].filename.as_deref(), Some("a.txt"));
        assert_eq!(parts[0].content_type.as_deref(), Some("text/plain"));
        assert_eq!(parts[0].data, b"hello");
        assert_eq!(parts[1].name.as_deref(), Some("other"));
        assert_eq!(parts[1].data, b"world");
    }

    #[test]
    fn multipart_retains_generic_headers() {
        let body: &'static [u8] = b"--XYZ\r\n\
Content-Disposition: form-data; name=\"field\"\r\n\
X-Field-Id: 42\r\n\
\r\n\
value\r\n\
--XYZ--\r\n";

        let parts = parse_multipart(body, b"XYZ").unwrap();
        assert_eq!(parts[0].header("x-field-id"), Some("42"));
        assert_eq!(parts[0].header("content-disposition"), Some("form-data; name=\"field\""));
        assert_eq!(parts[0].header("missing"), None);
    }

    #[test]
    fn multipart_missing_boundary() {
        assert_eq!(
            parse_multipart(b"no boundary here", b"XYZ"),
            Err(ErrorKind::InvalidMultipart)
        );
    }
}
