//! Streaming multipart ingestion
//!
//! Single-pass parser for `multipart/form-data` upload bodies. The body may
//! arrive as one fully buffered blob or as a live byte stream; both feed the
//! same incremental state machine through [`UploadBody`], so an already
//! received body is never mistaken for a truncated stream.
//!
//! Per part the parser decodes a CRLF-terminated header section, then
//! accumulates the body section up to the next boundary. File parts must
//! declare an `image/*` media type and respect the configured size and count
//! limits; the first violation aborts ingestion with exactly one error.
//! Plain form fields (no filename) are drained and ignored.

use bytes::{Buf, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::LocalBoxStream;
use thiserror::Error;

use crate::core::types::UploadedFile;

/// Upper bound for one part's header section.
const MAX_PART_HEADER_BYTES: usize = 16 * 1024;

/// Ingestion limits enforced while the body streams in.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// Maximum size of a single file in bytes
    pub max_file_bytes: usize,
    /// Maximum number of file parts per request
    pub max_files: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
            max_files: 20,
        }
    }
}

/// Errors produced while ingesting an upload body.
///
/// All variants are validation-class failures of the whole request; no
/// partially accepted files survive them.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A file part declared a non-image media type
    #[error("Only image files are allowed (received {found})")]
    InvalidMediaType {
        /// The media type the part declared
        found: String,
    },

    /// A file part exceeded the per-file size limit
    #[error("File too large (max {limit} bytes)")]
    FileTooLarge {
        /// The configured per-file byte limit
        limit: usize,
    },

    /// The request carried more file parts than allowed
    #[error("Too many files (max {limit} per request)")]
    TooManyFiles {
        /// The configured file count limit
        limit: usize,
    },

    /// The body was not valid multipart syntax
    #[error("Malformed multipart body: {0}")]
    Malformed(String),

    /// The underlying transport failed mid-body
    #[error("Failed reading upload stream: {0}")]
    Transport(String),
}

/// The two shapes an upload body arrives in.
///
/// `Buffered` is consumed directly without re-reading from a socket;
/// `Streamed` is polled chunk by chunk. One parsing algorithm serves both.
pub enum UploadBody {
    /// The whole multipart body, already in memory
    Buffered(Bytes),
    /// A live stream of body chunks
    Streamed(LocalBoxStream<'static, Result<Bytes, IngestError>>),
}

impl UploadBody {
    async fn next_chunk(&mut self) -> Option<Result<Bytes, IngestError>> {
        match self {
            Self::Buffered(bytes) => {
                if bytes.is_empty() {
                    None
                } else {
                    Some(Ok(std::mem::take(bytes)))
                }
            }
            Self::Streamed(stream) => stream.next().await,
        }
    }
}

/// Extract the `boundary` parameter from a `content-type` header value.
///
/// Returns `None` unless the value is `multipart/form-data` with a boundary,
/// which is the caller's signal to bypass ingestion entirely.
pub fn boundary_from_content_type(value: &str) -> Option<String> {
    let mut parts = value.split(';');
    if !parts.next()?.trim().eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    for param in parts {
        if let Some((name, value)) = param.trim().split_once('=') {
            if name.trim().eq_ignore_ascii_case("boundary") {
                let boundary = value.trim().trim_matches('"');
                if !boundary.is_empty() {
                    return Some(boundary.to_string());
                }
            }
        }
    }
    None
}

/// Incremental multipart parser with limit enforcement.
pub struct MultipartIngester {
    boundary: String,
    limits: UploadLimits,
}

impl MultipartIngester {
    /// Create an ingester for one request's boundary and limits.
    pub fn new(boundary: impl Into<String>, limits: UploadLimits) -> Self {
        Self {
            boundary: boundary.into(),
            limits,
        }
    }

    /// Consume the upload body and return the validated files in arrival
    /// order.
    ///
    /// An empty vector is a valid result; zero-file policy belongs to the
    /// caller.
    pub async fn ingest(&self, mut body: UploadBody) -> Result<Vec<UploadedFile>, IngestError> {
        let mut parser = Parser::new(&self.boundary, self.limits);
        loop {
            if parser.run()? {
                return Ok(parser.files);
            }
            match body.next_chunk().await {
                Some(Ok(chunk)) => parser.buf.extend_from_slice(&chunk),
                Some(Err(err)) => return Err(err),
                None => {
                    return Err(IngestError::Malformed(
                        "unexpected end of multipart body".to_string(),
                    ));
                }
            }
        }
    }
}

enum State {
    /// Scanning for the next boundary delimiter; bytes before it are
    /// preamble and get discarded
    Boundary,
    /// Accumulating one part's header section
    Headers,
    /// Accumulating one part's body section
    Body(Part),
    Done,
}

struct Part {
    field_name: String,
    original_name: String,
    media_type: String,
    content: BytesMut,
    is_file: bool,
}

impl Part {
    fn field() -> Self {
        Self {
            field_name: String::new(),
            original_name: String::new(),
            media_type: String::new(),
            content: BytesMut::new(),
            is_file: false,
        }
    }

    fn append(&mut self, chunk: &[u8], max_file_bytes: usize) -> Result<(), IngestError> {
        if !self.is_file {
            return Ok(());
        }
        if self.content.len() + chunk.len() > max_file_bytes {
            return Err(IngestError::FileTooLarge {
                limit: max_file_bytes,
            });
        }
        self.content.extend_from_slice(chunk);
        Ok(())
    }

    fn finish(self) -> UploadedFile {
        UploadedFile {
            field_name: self.field_name,
            original_name: self.original_name,
            media_type: self.media_type,
            content: self.content.freeze(),
        }
    }
}

enum Step {
    Again,
    NeedMore,
}

struct Parser {
    /// `\r\n--{boundary}`; the buffer starts with a virtual CRLF so the
    /// first boundary matches the same needle
    delimiter: Vec<u8>,
    limits: UploadLimits,
    buf: BytesMut,
    state: State,
    files: Vec<UploadedFile>,
    file_count: usize,
}

impl Parser {
    fn new(boundary: &str, limits: UploadLimits) -> Self {
        Self {
            delimiter: format!("\r\n--{boundary}").into_bytes(),
            limits,
            buf: BytesMut::from(&b"\r\n"[..]),
            state: State::Boundary,
            files: Vec::new(),
            file_count: 0,
        }
    }

    /// Make all possible progress with the buffered bytes. Returns `true`
    /// once the closing delimiter has been consumed.
    fn run(&mut self) -> Result<bool, IngestError> {
        loop {
            match self.advance()? {
                Step::Again => {
                    if matches!(self.state, State::Done) {
                        return Ok(true);
                    }
                }
                Step::NeedMore => return Ok(false),
            }
        }
    }

    fn advance(&mut self) -> Result<Step, IngestError> {
        let state = std::mem::replace(&mut self.state, State::Done);
        match state {
            State::Boundary => self.advance_boundary(),
            State::Headers => self.advance_headers(),
            State::Body(part) => self.advance_body(part),
            State::Done => {
                self.state = State::Done;
                Ok(Step::NeedMore)
            }
        }
    }

    /// Find the delimiter, discard anything before it, then decide between
    /// the next part (`\r\n`) and the closing terminator (`--`).
    fn advance_boundary(&mut self) -> Result<Step, IngestError> {
        let Some(pos) = find(&self.buf, &self.delimiter) else {
            let keep = self.delimiter.len() - 1;
            if self.buf.len() > keep {
                self.buf.advance(self.buf.len() - keep);
            }
            self.state = State::Boundary;
            return Ok(Step::NeedMore);
        };
        self.buf.advance(pos);
        if self.buf.len() < self.delimiter.len() + 2 {
            self.state = State::Boundary;
            return Ok(Step::NeedMore);
        }
        let tail = [
            self.buf[self.delimiter.len()],
            self.buf[self.delimiter.len() + 1],
        ];
        self.buf.advance(self.delimiter.len() + 2);
        match &tail {
            b"\r\n" => {
                self.state = State::Headers;
                Ok(Step::Again)
            }
            b"--" => {
                self.state = State::Done;
                Ok(Step::Again)
            }
            _ => Err(IngestError::Malformed(
                "invalid boundary delimiter".to_string(),
            )),
        }
    }

    fn advance_headers(&mut self) -> Result<Step, IngestError> {
        // a part with an empty header section goes straight to its body
        if self.buf.starts_with(b"\r\n") {
            self.buf.advance(2);
            self.state = State::Body(Part::field());
            return Ok(Step::Again);
        }
        let Some(pos) = find(&self.buf, b"\r\n\r\n") else {
            if self.buf.len() > MAX_PART_HEADER_BYTES {
                return Err(IngestError::Malformed(
                    "part header section too large".to_string(),
                ));
            }
            self.state = State::Headers;
            return Ok(Step::NeedMore);
        };
        let block = self.buf.split_to(pos + 4);
        let part = self.start_part(&block[..pos])?;
        self.state = State::Body(part);
        Ok(Step::Again)
    }

    fn advance_body(&mut self, mut part: Part) -> Result<Step, IngestError> {
        match find(&self.buf, &self.delimiter) {
            Some(pos) => {
                let chunk = self.buf.split_to(pos);
                part.append(&chunk, self.limits.max_file_bytes)?;
                if part.is_file {
                    self.files.push(part.finish());
                }
                // the delimiter now sits at the buffer start
                self.state = State::Boundary;
                Ok(Step::Again)
            }
            None => {
                // flush everything that cannot be a partial delimiter
                let keep = self.delimiter.len() - 1;
                if self.buf.len() > keep {
                    let chunk = self.buf.split_to(self.buf.len() - keep);
                    part.append(&chunk, self.limits.max_file_bytes)?;
                }
                self.state = State::Body(part);
                Ok(Step::NeedMore)
            }
        }
    }

    /// Decode one part's header section and open the matching part state,
    /// enforcing the media type whitelist and the file count limit.
    fn start_part(&mut self, raw: &[u8]) -> Result<Part, IngestError> {
        let text = String::from_utf8_lossy(raw);
        let mut field_name = String::new();
        let mut filename: Option<String> = None;
        let mut media_type: Option<String> = None;

        for line in text.split("\r\n") {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-disposition") {
                let (name, file) = parse_content_disposition(value);
                if let Some(name) = name {
                    field_name = name;
                }
                filename = file;
            } else if name.eq_ignore_ascii_case("content-type") {
                let mime = value.split(';').next().unwrap_or("").trim();
                media_type = Some(mime.to_string());
            }
        }

        // no filename means a plain form field, which we drain and ignore
        let Some(filename) = filename else {
            return Ok(Part::field());
        };

        self.file_count += 1;
        if self.file_count > self.limits.max_files {
            return Err(IngestError::TooManyFiles {
                limit: self.limits.max_files,
            });
        }

        let media_type =
            media_type.unwrap_or_else(|| "application/octet-stream".to_string());
        if !media_type.starts_with("image/") {
            return Err(IngestError::InvalidMediaType { found: media_type });
        }

        let original_name = if filename.is_empty() {
            field_name.clone()
        } else {
            filename
        };

        Ok(Part {
            field_name,
            original_name,
            media_type,
            content: BytesMut::new(),
            is_file: true,
        })
    }
}

/// Pull `name` and `filename` parameters out of a Content-Disposition value.
fn parse_content_disposition(value: &str) -> (Option<String>, Option<String>) {
    let mut name = None;
    let mut filename = None;
    for param in value.split(';').skip(1) {
        if let Some((key, value)) = param.trim().split_once('=') {
            let value = value.trim().trim_matches('"').to_string();
            match key.trim() {
                k if k.eq_ignore_ascii_case("name") => name = Some(value),
                k if k.eq_ignore_ascii_case("filename") => filename = Some(value),
                _ => {}
            }
        }
    }
    (name, filename)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    const BOUNDARY: &str = "----test-boundary-1234";

    fn part(field: &str, filename: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        out.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        out.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        out.extend_from_slice(content);
        out.extend_from_slice(b"\r\n");
        out
    }

    fn field_part(field: &str, value: &str) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        out.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
        );
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
        out
    }

    fn close() -> Vec<u8> {
        format!("--{BOUNDARY}--\r\n").into_bytes()
    }

    fn body_of(parts: Vec<Vec<u8>>) -> Bytes {
        let mut out = Vec::new();
        for p in parts {
            out.extend_from_slice(&p);
        }
        out.extend_from_slice(&close());
        Bytes::from(out)
    }

    fn ingester() -> MultipartIngester {
        MultipartIngester::new(BOUNDARY, UploadLimits::default())
    }

    fn streamed(body: Bytes, chunk_size: usize) -> UploadBody {
        let chunks: Vec<Result<Bytes, IngestError>> = body
            .chunks(chunk_size)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        UploadBody::Streamed(stream::iter(chunks).boxed_local())
    }

    #[tokio::test]
    async fn buffered_body_yields_files_in_order() {
        let body = body_of(vec![
            part("image", "a.jpg", "image/jpeg", b"first-bytes"),
            part("image", "b.png", "image/png", b"second-bytes"),
        ]);
        let files = ingester().ingest(UploadBody::Buffered(body)).await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].original_name, "a.jpg");
        assert_eq!(files[0].media_type, "image/jpeg");
        assert_eq!(&files[0].content[..], b"first-bytes");
        assert_eq!(files[1].original_name, "b.png");
        assert_eq!(&files[1].content[..], b"second-bytes");
    }

    #[tokio::test]
    async fn streamed_body_matches_buffered_result() {
        let content: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
        let body = body_of(vec![
            part("image", "big.jpg", "image/jpeg", &content),
            part("image", "tiny.gif", "image/gif", b"x"),
        ]);
        // tiny chunks force the parser through every partial-delimiter path
        for chunk_size in [1, 7, 64, 4096] {
            let files = ingester()
                .ingest(streamed(body.clone(), chunk_size))
                .await
                .unwrap();
            assert_eq!(files.len(), 2, "chunk size {chunk_size}");
            assert_eq!(&files[0].content[..], &content[..]);
            assert_eq!(&files[1].content[..], b"x");
        }
    }

    #[tokio::test]
    async fn non_image_part_is_rejected_once() {
        let body = body_of(vec![
            part("image", "ok.jpg", "image/jpeg", b"fine"),
            part("image", "notes.txt", "text/plain", b"oops"),
            part("image", "more.csv", "text/csv", b"also bad"),
        ]);
        let err = ingester()
            .ingest(UploadBody::Buffered(body))
            .await
            .unwrap_err();
        match err {
            IngestError::InvalidMediaType { found } => assert_eq!(found, "text/plain"),
            other => panic!("expected InvalidMediaType, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_content_type_defaults_to_octet_stream_and_fails() {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"image\"; filename=\"blob\"\r\n\r\n",
        );
        body.extend_from_slice(b"data\r\n");
        body.extend_from_slice(&close());
        let err = ingester()
            .ingest(UploadBody::Buffered(Bytes::from(body)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidMediaType { found } if found == "application/octet-stream"
        ));
    }

    #[tokio::test]
    async fn oversize_file_fails_midstream() {
        let limits = UploadLimits {
            max_file_bytes: 64,
            max_files: 20,
        };
        let body = body_of(vec![part("image", "big.jpg", "image/jpeg", &[0u8; 200])]);
        let err = MultipartIngester::new(BOUNDARY, limits)
            .ingest(streamed(body, 16))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::FileTooLarge { limit: 64 }));
    }

    #[tokio::test]
    async fn too_many_files_is_a_single_error() {
        let limits = UploadLimits {
            max_file_bytes: 1024,
            max_files: 3,
        };
        let parts = (0..5)
            .map(|i| part("image", &format!("f{i}.jpg"), "image/jpeg", b"d"))
            .collect();
        let err = MultipartIngester::new(BOUNDARY, limits)
            .ingest(UploadBody::Buffered(body_of(parts)))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::TooManyFiles { limit: 3 }));
    }

    #[tokio::test]
    async fn plain_form_fields_are_drained_and_ignored() {
        let body = body_of(vec![
            field_part("note", "hello"),
            part("image", "a.jpg", "image/jpeg", b"bytes"),
            field_part("tag", "world"),
        ]);
        let files = ingester().ingest(UploadBody::Buffered(body)).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].field_name, "image");
    }

    #[tokio::test]
    async fn zero_parts_is_a_valid_empty_result() {
        let files = ingester()
            .ingest(UploadBody::Buffered(Bytes::from(close())))
            .await
            .unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn truncated_body_is_malformed() {
        let mut body = part("image", "a.jpg", "image/jpeg", b"bytes");
        body.truncate(body.len() - 4);
        let err = ingester()
            .ingest(UploadBody::Buffered(Bytes::from(body)))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Malformed(_)));
    }

    #[tokio::test]
    async fn file_content_may_contain_boundary_lookalikes() {
        let tricky = format!("\r\n--{}", &BOUNDARY[..BOUNDARY.len() - 2]);
        let content = format!("before{tricky}after");
        let body = body_of(vec![part("image", "t.jpg", "image/jpeg", content.as_bytes())]);
        let files = ingester().ingest(streamed(body, 3)).await.unwrap();
        assert_eq!(&files[0].content[..], content.as_bytes());
    }

    #[test]
    fn boundary_is_extracted_from_content_type() {
        assert_eq!(
            boundary_from_content_type("multipart/form-data; boundary=abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(
            boundary_from_content_type("multipart/form-data; boundary=\"quoted\""),
            Some("quoted".to_string())
        );
        assert_eq!(boundary_from_content_type("application/json"), None);
        assert_eq!(boundary_from_content_type("multipart/form-data"), None);
    }
}
