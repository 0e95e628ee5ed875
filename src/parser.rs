//! The streaming HTTP/1.1 request-head and body parser.
//!
//! [`Parser`] is fed byte slices incrementally. [`Parser::parse`] advances
//! through the request-line and header section and stops the moment the
//! body framing is known; [`Parser::read_body`] is then called separately,
//! possibly many times, to drain an identity or chunked body (and, for
//! chunked requests, trailers) as slices borrowed directly from the
//! buffer passed in.
//!
//! Every `buf` argument passed to [`Parser::parse`] or [`Parser::read_body`]
//! must be the same logical, ever-growing byte stream from its start: the
//! parser never copies or compacts input, it only remembers how far it has
//! scanned ([`Parser::bytes_scanned`]) and records [`Span`]s as absolute
//! offsets into that stream. Pass the full buffer received so far on every
//! call -- there is no need to trim bytes the parser has already consumed.

use log::trace;

use crate::classify::{
    eq_ignore_ascii_case, hex_val, is_digit, is_htab, is_obs_text, is_ows, is_sp, is_tchar,
    is_uri_char, is_vchar, CR, LF,
};
use crate::config::{Config, ConfigFlags};
use crate::error::ParseError;
use crate::request::{
    BodyType, FieldValue, HeaderField, HeaderFlags, KnownHeader, Request, RequestFlags,
    TargetForm,
};
use crate::span::Span;

/// Coarse parser state, collapsing the internal byte-level phase down to
/// the stages a caller cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    RequestLine,
    Headers,
    BodyIdentity,
    BodyChunkedSize,
    BodyChunkedData,
    Trailers,
    Complete,
    Error,
}

/// Outcome of a [`Parser::parse`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseProgress {
    /// More data is required before the request head is complete.
    NeedMoreData,
    /// The request-line and header section are fully parsed. Inspect
    /// [`Parser::request`] for the result and [`Parser::state`] to see
    /// whether a body follows.
    Ready,
}

/// Outcome of a [`Parser::read_body`] call.
#[derive(Debug)]
pub enum BodyProgress<'b> {
    /// More data is required before another body chunk (or the end of the
    /// body) can be produced.
    NeedMoreData,
    /// A contiguous slice of body bytes, borrowed from the buffer passed
    /// to this call. Chunk boundaries from chunked transfer-coding are
    /// not preserved here -- this is simply as much contiguous body data
    /// as is currently available.
    Data(&'b [u8]),
    /// The body (and, for chunked requests, any trailers) is fully read.
    /// The request is now complete.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    LeadingCrlfLf,
    Method,
    PreTarget,
    Target,
    PreVersion,
    /// Index into the 7-byte literal `HTTP/1.` already matched.
    VersionLiteral(u8),
    VersionMinor,
    VersionCr,
    VersionLf,
    HeaderStart,
    HeaderName,
    HeaderValueOws,
    HeaderValue,
    HeaderValueLf,
    ObsFoldSkipOws,
    ObsFoldValue,
    EndHeadersLf,
    BodyIdentity,
    ChunkSize,
    ChunkExt,
    ChunkSizeCr,
    ChunkData,
    ChunkDataCr,
    ChunkDataLf,
    Complete,
    Error,
}

/// An incremental HTTP/1.1 request parser over a caller-owned buffer.
///
/// ```rust
/// use wireframe::{Parser, ParseProgress, BodyProgress};
///
/// let mut parser = Parser::new();
/// let buf = b"POST /upload HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\n\r\nhello";
///
/// assert!(matches!(parser.parse(buf).unwrap(), ParseProgress::Ready));
/// let req = parser.request().unwrap();
/// assert_eq!(req.method_bytes(buf), b"POST");
///
/// match parser.read_body(buf).unwrap() {
///     BodyProgress::Data(chunk) => assert_eq!(chunk, b"hello"),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub struct Parser {
    phase: Phase,
    config: Config,

    /// Absolute number of bytes of the logical stream scanned so far.
    scan_pos: usize,
    /// `scan_pos` at the start of the current `parse`/`read_body` call,
    /// used to compute an invocation-relative error offset.
    call_start: usize,
    last_error: Option<ParseError>,
    last_error_offset: usize,

    request: Request,

    leading_crlf_consumed: bool,
    line_start: usize,

    method_start: usize,
    target_start: usize,
    version_minor: u8,

    header_name_start: usize,
    header_name_end: usize,
    header_value_start: usize,
    header_value_end: usize,
    in_trailers: bool,
    /// Bytes scanned in the current header (or trailer) section, checked
    /// against `config.max_headers_size`. Reset whenever a new section
    /// starts, since headers and trailers are budgeted independently.
    section_bytes: u32,
    obs_fold_scratch: Vec<u8>,

    seen_host: bool,
    seen_content_length: bool,
    seen_transfer_encoding: bool,
    content_length_value: Option<u64>,
    connection_close: bool,
    connection_keep_alive: bool,
    connection_upgrade_token: bool,
    seen_upgrade_header: bool,

    chunk_size_digits: u32,
    chunk_size: u64,
    chunk_remaining: u64,
    chunk_ext_len: u32,

    body_delivered: u64,
    identity_remaining: u64,
}

impl Parser {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Parser {
            phase: Phase::Idle,
            config,
            scan_pos: 0,
            call_start: 0,
            last_error: None,
            last_error_offset: 0,
            request: Request::new(),
            leading_crlf_consumed: false,
            line_start: 0,
            method_start: 0,
            target_start: 0,
            version_minor: 0,
            header_name_start: 0,
            header_name_end: 0,
            header_value_start: 0,
            header_value_end: 0,
            in_trailers: false,
            section_bytes: 0,
            obs_fold_scratch: Vec::new(),
            seen_host: false,
            seen_content_length: false,
            seen_transfer_encoding: false,
            content_length_value: None,
            connection_close: false,
            connection_keep_alive: false,
            connection_upgrade_token: false,
            seen_upgrade_header: false,
            chunk_size_digits: 0,
            chunk_size: 0,
            chunk_remaining: 0,
            chunk_ext_len: 0,
            body_delivered: 0,
            identity_remaining: 0,
        }
    }

    /// Reset the parser to scan a fresh request from offset 0.
    pub fn reset(&mut self) {
        let config = self.config;
        *self = Parser::with_config(config);
    }

    /// High-level state, for diagnostics and for deciding whether
    /// `read_body` should be called next.
    pub fn state(&self) -> State {
        match self.phase {
            Phase::Idle | Phase::LeadingCrlfLf => State::Idle,
            Phase::Method
            | Phase::PreTarget
            | Phase::Target
            | Phase::PreVersion
            | Phase::VersionLiteral(_)
            | Phase::VersionMinor
            | Phase::VersionCr
            | Phase::VersionLf => State::RequestLine,
            Phase::HeaderStart
            | Phase::HeaderName
            | Phase::HeaderValueOws
            | Phase::HeaderValue
            | Phase::HeaderValueLf
            | Phase::ObsFoldSkipOws
            | Phase::ObsFoldValue
            | Phase::EndHeadersLf => {
                if self.in_trailers {
                    State::Trailers
                } else {
                    State::Headers
                }
            }
            Phase::BodyIdentity => State::BodyIdentity,
            Phase::ChunkSize | Phase::ChunkExt | Phase::ChunkSizeCr => State::BodyChunkedSize,
            Phase::ChunkData | Phase::ChunkDataCr | Phase::ChunkDataLf => State::BodyChunkedData,
            Phase::Complete => State::Complete,
            Phase::Error => State::Error,
        }
    }

    /// The parsed request head, once [`Parser::parse`] has returned
    /// [`ParseProgress::Ready`]. `None` beforehand.
    pub fn request(&self) -> Option<&Request> {
        match self.state() {
            State::Idle | State::RequestLine | State::Error => None,
            _ => Some(&self.request),
        }
    }

    /// Total bytes of the logical input stream scanned so far, across all
    /// `parse`/`read_body` calls. Bytes at or past this offset in the
    /// buffer have not yet been examined.
    pub fn bytes_scanned(&self) -> usize {
        self.scan_pos
    }

    /// Offset of the failing byte, relative to the start of the call that
    /// produced the error currently latched on this parser.
    pub fn error_offset(&self) -> Option<usize> {
        self.last_error.map(|_| self.last_error_offset)
    }

    fn fail(&mut self, e: ParseError) -> ParseError {
        self.phase = Phase::Error;
        self.last_error = Some(e);
        self.last_error_offset = self.scan_pos - self.call_start;
        trace!("parser entered error state: {}", e.name());
        e
    }

    fn field_value_byte_ok(&self, b: u8) -> bool {
        is_sp(b)
            || is_htab(b)
            || is_vchar(b)
            || (self.config.flags.contains(ConfigFlags::ALLOW_OBS_TEXT) && is_obs_text(b))
    }

    // -------------------------------------------------------------------
    // parse(): request-line + header section
    // -------------------------------------------------------------------

    pub fn parse(&mut self, buf: &[u8]) -> Result<ParseProgress, ParseError> {
        if let Some(e) = self.last_error {
            return Err(e);
        }
        if self.head_is_done() {
            return Ok(ParseProgress::Ready);
        }
        self.call_start = self.scan_pos;
        match self.run_head(buf) {
            Ok(true) => Ok(ParseProgress::Ready),
            Ok(false) => Ok(ParseProgress::NeedMoreData),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn head_is_done(&self) -> bool {
        matches!(
            self.phase,
            Phase::BodyIdentity | Phase::ChunkSize | Phase::Complete
        )
    }

    fn run_head(&mut self, buf: &[u8]) -> Result<bool, ParseError> {
        loop {
            if self.head_is_done() {
                return Ok(true);
            }
            if self.scan_pos >= buf.len() {
                return Ok(false);
            }
            let byte = buf[self.scan_pos];
            self.step_head(buf, byte)?;
            self.scan_pos += 1;
        }
    }

    fn step_head(&mut self, buf: &[u8], byte: u8) -> Result<(), ParseError> {
        if matches!(
            self.phase,
            Phase::HeaderStart
                | Phase::HeaderName
                | Phase::HeaderValueOws
                | Phase::HeaderValue
                | Phase::HeaderValueLf
                | Phase::ObsFoldSkipOws
                | Phase::ObsFoldValue
                | Phase::EndHeadersLf
        ) {
            self.section_bytes += 1;
            if self.section_bytes > self.config.max_headers_size {
                return Err(ParseError::HeadersTooLarge);
            }
        }
        match self.phase {
            Phase::Idle => self.step_idle(byte),
            Phase::LeadingCrlfLf => {
                if byte == LF {
                    self.phase = Phase::Idle;
                    self.line_start = self.scan_pos + 1;
                    Ok(())
                } else {
                    Err(ParseError::LeadingWhitespace)
                }
            }
            Phase::Method => self.step_method(byte),
            Phase::PreTarget => self.step_pre_target(byte),
            Phase::Target => self.step_target(buf, byte),
            Phase::PreVersion => self.step_pre_version(byte),
            Phase::VersionLiteral(idx) => self.step_version_literal(idx, byte),
            Phase::VersionMinor => self.step_version_minor(byte),
            Phase::VersionCr => self.step_version_cr(byte),
            Phase::VersionLf => {
                if byte == LF {
                    self.enter_headers();
                    Ok(())
                } else {
                    Err(ParseError::InvalidLineEnding)
                }
            }
            Phase::HeaderStart => self.step_header_start(buf, byte),
            Phase::HeaderName => self.step_header_name(byte),
            Phase::HeaderValueOws => self.step_header_value_ows(buf, byte),
            Phase::HeaderValue => self.step_header_value(buf, byte),
            Phase::HeaderValueLf => {
                if byte == LF {
                    self.phase = Phase::HeaderStart;
                    self.line_start = self.scan_pos + 1;
                    Ok(())
                } else {
                    Err(ParseError::InvalidLineEnding)
                }
            }
            Phase::ObsFoldSkipOws => self.step_obs_fold_skip_ows(byte),
            Phase::ObsFoldValue => self.step_obs_fold_value(byte),
            Phase::EndHeadersLf => {
                if byte == LF {
                    self.finish_header_section()
                } else {
                    Err(ParseError::InvalidLineEnding)
                }
            }
            Phase::BodyIdentity | Phase::ChunkSize | Phase::Complete => {
                unreachable!("filtered out by head_is_done before reaching step_head")
            }
            Phase::ChunkExt
            | Phase::ChunkSizeCr
            | Phase::ChunkData
            | Phase::ChunkDataCr
            | Phase::ChunkDataLf
            | Phase::Error => Err(ParseError::DataAfterComplete),
        }
    }

    fn check_line_len(&self, limit: u32) -> Result<(), ParseError> {
        if (self.scan_pos - self.line_start + 1) as u32 > limit {
            Err(ParseError::RequestLineTooLong)
        } else {
            Ok(())
        }
    }

    fn step_idle(&mut self, byte: u8) -> Result<(), ParseError> {
        let allow_leading = self.config.flags.contains(ConfigFlags::ALLOW_LEADING_CRLF);
        let strict = self.config.flags.contains(ConfigFlags::STRICT_CRLF);
        if allow_leading && !self.leading_crlf_consumed && byte == CR {
            self.leading_crlf_consumed = true;
            self.phase = Phase::LeadingCrlfLf;
        } else if allow_leading && !self.leading_crlf_consumed && byte == LF && !strict {
            self.leading_crlf_consumed = true;
            self.line_start = self.scan_pos + 1;
        } else if is_tchar(byte) {
            self.method_start = self.scan_pos;
            self.phase = Phase::Method;
        } else {
            return Err(ParseError::LeadingWhitespace);
        }
        Ok(())
    }

    fn step_method(&mut self, byte: u8) -> Result<(), ParseError> {
        if byte == b' ' {
            if self.scan_pos == self.method_start {
                return Err(ParseError::InvalidMethod);
            }
            self.request.method = Span::new(self.method_start, self.scan_pos - self.method_start);
            self.phase = Phase::PreTarget;
        } else if is_tchar(byte) {
            self.check_line_len(self.config.max_request_line_len)?;
        } else {
            return Err(ParseError::InvalidMethod);
        }
        Ok(())
    }

    fn step_pre_target(&mut self, byte: u8) -> Result<(), ParseError> {
        if byte == b' ' {
            if self.config.flags.contains(ConfigFlags::TOLERATE_SPACES) {
                Ok(())
            } else {
                Err(ParseError::InvalidTarget)
            }
        } else {
            self.target_start = self.scan_pos;
            self.phase = Phase::Target;
            // Re-validate this byte as the first target byte now that the
            // span start is recorded.
            self.revalidate_target_byte(byte)
        }
    }

    fn revalidate_target_byte(&mut self, byte: u8) -> Result<(), ParseError> {
        if is_uri_char(byte) || byte == b'?' || byte == b'#' {
            Ok(())
        } else {
            Err(ParseError::InvalidTarget)
        }
    }

    fn step_target(&mut self, buf: &[u8], byte: u8) -> Result<(), ParseError> {
        if byte == b' ' {
            if self.scan_pos == self.target_start {
                return Err(ParseError::InvalidTarget);
            }
            let target = Span::new(self.target_start, self.scan_pos - self.target_start);
            self.request.target = target;
            self.request.target_form = classify_target_form(target.as_slice(buf));
            self.phase = Phase::PreVersion;
        } else if is_uri_char(byte) || byte == b'?' || byte == b'#' {
            self.check_line_len(self.config.max_request_line_len)?;
        } else {
            return Err(ParseError::InvalidTarget);
        }
        Ok(())
    }

    fn step_pre_version(&mut self, byte: u8) -> Result<(), ParseError> {
        if byte == b' ' {
            if self.config.flags.contains(ConfigFlags::TOLERATE_SPACES) {
                Ok(())
            } else {
                Err(ParseError::InvalidVersion)
            }
        } else {
            self.phase = Phase::VersionLiteral(0);
            self.step_version_literal(0, byte)
        }
    }

    fn step_version_literal(&mut self, idx: u8, byte: u8) -> Result<(), ParseError> {
        const LITERAL: &[u8] = b"HTTP/1.";
        self.check_line_len(self.config.max_request_line_len)?;
        if byte != LITERAL[idx as usize] {
            return Err(ParseError::InvalidVersion);
        }
        self.phase = if idx as usize + 1 == LITERAL.len() {
            Phase::VersionMinor
        } else {
            Phase::VersionLiteral(idx + 1)
        };
        Ok(())
    }

    fn step_version_minor(&mut self, byte: u8) -> Result<(), ParseError> {
        self.check_line_len(self.config.max_request_line_len)?;
        match byte {
            b'0' => self.version_minor = 0,
            b'1' => self.version_minor = 1,
            _ => return Err(ParseError::InvalidVersion),
        }
        self.phase = Phase::VersionCr;
        Ok(())
    }

    fn step_version_cr(&mut self, byte: u8) -> Result<(), ParseError> {
        if byte == CR {
            self.phase = Phase::VersionLf;
        } else if byte == LF && !self.config.flags.contains(ConfigFlags::STRICT_CRLF) {
            self.enter_headers();
        } else {
            return Err(ParseError::InvalidLineEnding);
        }
        Ok(())
    }

    fn enter_headers(&mut self) {
        self.request.version = 0x0100 | self.version_minor as u16;
        self.phase = Phase::HeaderStart;
        self.line_start = self.scan_pos + 1;
        self.section_bytes = 0;
    }

    // -------------------------------------------------------------------
    // Header (and, reused, trailer) section scanning
    // -------------------------------------------------------------------

    fn step_header_start(&mut self, buf: &[u8], byte: u8) -> Result<(), ParseError> {
        if byte == CR {
            self.phase = Phase::EndHeadersLf;
            return Ok(());
        }
        if is_ows(byte) {
            if self.config.flags.contains(ConfigFlags::REJECT_OBS_FOLD) {
                return Err(ParseError::ObsFoldRejected);
            }
            let headers = if self.in_trailers {
                &mut self.request.trailers
            } else {
                &mut self.request.headers
            };
            let Some(last) = headers.last_mut() else {
                return Err(ParseError::ObsFoldRejected);
            };
            let mut scratch = match &last.value {
                FieldValue::Direct(span) => span.as_slice(buf).to_vec(),
                FieldValue::Folded(b) => b.to_vec(),
            };
            scratch.push(b' ');
            self.obs_fold_scratch = scratch;
            self.phase = Phase::ObsFoldSkipOws;
            return Ok(());
        }
        if is_tchar(byte) {
            let count = if self.in_trailers {
                self.request.trailers.len()
            } else {
                self.request.headers.len()
            };
            if count >= self.config.max_header_count as usize {
                return Err(ParseError::TooManyHeaders);
            }
            self.header_name_start = self.scan_pos;
            self.line_start = self.scan_pos;
            self.phase = Phase::HeaderName;
            return Ok(());
        }
        Err(ParseError::InvalidHeaderName)
    }

    fn step_header_name(&mut self, byte: u8) -> Result<(), ParseError> {
        if byte == b':' {
            self.header_name_end = self.scan_pos;
            self.phase = Phase::HeaderValueOws;
            Ok(())
        } else if is_tchar(byte) {
            self.check_line_len(self.config.max_header_line_len)
        } else {
            Err(ParseError::InvalidHeaderName)
        }
    }

    fn step_header_value_ows(&mut self, buf: &[u8], byte: u8) -> Result<(), ParseError> {
        if is_ows(byte) {
            self.check_line_len(self.config.max_header_line_len)
        } else if byte == CR {
            let empty = Span::new(self.scan_pos, 0);
            self.phase = Phase::HeaderValueLf;
            self.store_header(buf, empty)
        } else if self.field_value_byte_ok(byte) {
            self.check_line_len(self.config.max_header_line_len)?;
            self.header_value_start = self.scan_pos;
            self.header_value_end = self.scan_pos + 1;
            self.phase = Phase::HeaderValue;
            Ok(())
        } else {
            Err(ParseError::InvalidHeaderValue)
        }
    }

    fn step_header_value(&mut self, buf: &[u8], byte: u8) -> Result<(), ParseError> {
        if byte == CR {
            let span = Span::new(
                self.header_value_start,
                self.header_value_end - self.header_value_start,
            );
            self.phase = Phase::HeaderValueLf;
            self.store_header(buf, span)
        } else if self.field_value_byte_ok(byte) {
            self.check_line_len(self.config.max_header_line_len)?;
            if !is_ows(byte) {
                self.header_value_end = self.scan_pos + 1;
            }
            Ok(())
        } else {
            Err(ParseError::InvalidHeaderValue)
        }
    }

    fn step_obs_fold_skip_ows(&mut self, byte: u8) -> Result<(), ParseError> {
        if is_ows(byte) {
            Ok(())
        } else if byte == CR {
            self.finish_obs_fold();
            self.phase = Phase::HeaderValueLf;
            Ok(())
        } else if self.field_value_byte_ok(byte) {
            self.obs_fold_scratch.push(byte);
            self.phase = Phase::ObsFoldValue;
            Ok(())
        } else {
            Err(ParseError::InvalidHeaderValue)
        }
    }

    fn step_obs_fold_value(&mut self, byte: u8) -> Result<(), ParseError> {
        if byte == CR {
            while matches!(self.obs_fold_scratch.last(), Some(b' ') | Some(b'\t')) {
                self.obs_fold_scratch.pop();
            }
            self.finish_obs_fold();
            self.phase = Phase::HeaderValueLf;
            Ok(())
        } else if self.field_value_byte_ok(byte) {
            self.obs_fold_scratch.push(byte);
            Ok(())
        } else {
            Err(ParseError::InvalidHeaderValue)
        }
    }

    fn finish_obs_fold(&mut self) {
        let value = std::mem::take(&mut self.obs_fold_scratch).into_boxed_slice();
        let headers = if self.in_trailers {
            &mut self.request.trailers
        } else {
            &mut self.request.headers
        };
        if let Some(last) = headers.last_mut() {
            last.value = FieldValue::Folded(value);
        }
    }

    /// Record a fully-scanned header or trailer field and apply whatever
    /// semantic bookkeeping its name requires (RFC 9112 §3.2, §6.1, §9.2).
    fn store_header(&mut self, buf: &[u8], value_span: Span) -> Result<(), ParseError> {
        let name_span = Span::new(
            self.header_name_start,
            self.header_name_end - self.header_name_start,
        );
        let name_bytes = name_span.as_slice(buf);
        let known = KnownHeader::from_name_bytes(name_bytes);
        let flags = if known.is_some() {
            HeaderFlags::KNOWN_NAME
        } else {
            HeaderFlags::default()
        };

        if self.in_trailers {
            if matches!(
                known,
                Some(KnownHeader::Host)
                    | Some(KnownHeader::ContentLength)
                    | Some(KnownHeader::TransferEncoding)
                    | Some(KnownHeader::Connection)
                    | Some(KnownHeader::Expect)
                    | Some(KnownHeader::Upgrade)
            ) {
                return Err(ParseError::InvalidTrailer);
            }
            self.request.trailers.push(HeaderField {
                name: name_span,
                value: FieldValue::Direct(value_span),
                name_id: known,
                flags,
            });
            return Ok(());
        }

        let value_bytes = value_span.as_slice(buf);
        match known {
            Some(KnownHeader::Host) => {
                if self.seen_host {
                    return Err(ParseError::MultipleHost);
                }
                if !is_valid_host(value_bytes) {
                    return Err(ParseError::InvalidHost);
                }
                self.seen_host = true;
                self.request.flags.insert(RequestFlags::HAS_HOST);
            }
            Some(KnownHeader::ContentLength) => {
                let v = parse_content_length(value_bytes)?;
                if let Some(existing) = self.content_length_value {
                    if existing != v {
                        return Err(ParseError::ContentLengthMismatch);
                    }
                } else {
                    self.content_length_value = Some(v);
                }
                self.seen_content_length = true;
                self.request.flags.insert(RequestFlags::HAS_CONTENT_LENGTH);
            }
            Some(KnownHeader::TransferEncoding) => {
                validate_transfer_encoding(value_bytes)?;
                self.seen_transfer_encoding = true;
                self.request
                    .flags
                    .insert(RequestFlags::HAS_TRANSFER_ENCODING);
            }
            Some(KnownHeader::Connection) => {
                for token in split_tokens(value_bytes) {
                    if eq_ignore_ascii_case(token, b"close") {
                        self.connection_close = true;
                    } else if eq_ignore_ascii_case(token, b"keep-alive") {
                        self.connection_keep_alive = true;
                    } else if eq_ignore_ascii_case(token, b"upgrade") {
                        self.connection_upgrade_token = true;
                    }
                }
            }
            Some(KnownHeader::Expect) => {
                if eq_ignore_ascii_case(value_bytes, b"100-continue") {
                    self.request.flags.insert(RequestFlags::EXPECT_CONTINUE);
                }
            }
            Some(KnownHeader::Upgrade) => {
                self.seen_upgrade_header = true;
            }
            None => {}
        }

        let header_index = self.request.headers.len();
        self.request.headers.push(HeaderField {
            name: name_span,
            value: FieldValue::Direct(value_span),
            name_id: known,
            flags,
        });
        if let Some(k) = known {
            self.request.record_known(k, header_index);
        }
        Ok(())
    }

    fn finish_header_section(&mut self) -> Result<(), ParseError> {
        if self.in_trailers {
            self.phase = Phase::Complete;
            return Ok(());
        }
        self.determine_body_handling()
    }

    fn determine_body_handling(&mut self) -> Result<(), ParseError> {
        if self.request.version == 0x0101 && !self.seen_host {
            return Err(ParseError::MissingHost);
        }

        let keep_alive_default = self.request.version >= 0x0101;
        let keep_alive = if self.connection_close {
            false
        } else if self.connection_keep_alive {
            true
        } else {
            keep_alive_default
        };
        if keep_alive {
            self.request.flags.insert(RequestFlags::KEEP_ALIVE);
        }
        if self.seen_upgrade_header && self.connection_upgrade_token {
            self.request.flags.insert(RequestFlags::HAS_UPGRADE);
        }

        let te_conflict_rejected = self
            .config
            .flags
            .contains(ConfigFlags::REJECT_TE_CL_CONFLICT);
        if self.seen_transfer_encoding {
            if self.seen_content_length && te_conflict_rejected {
                return Err(ParseError::TransferEncodingContentLengthConflict);
            }
            self.request.body_type = BodyType::Chunked;
            self.request.flags.insert(RequestFlags::IS_CHUNKED);
            self.chunk_size_digits = 0;
            self.chunk_size = 0;
            self.phase = Phase::ChunkSize;
            self.line_start = self.scan_pos + 1;
            return Ok(());
        }

        if self.seen_content_length {
            let len = self
                .content_length_value
                .expect("seen_content_length implies content_length_value is set");
            if len > self.config.max_body_size {
                return Err(ParseError::BodyTooLarge);
            }
            self.request.content_length = len;
            self.request.body_type = BodyType::ContentLength;
            if len == 0 {
                self.phase = Phase::Complete;
            } else {
                self.identity_remaining = len;
                self.phase = Phase::BodyIdentity;
            }
            return Ok(());
        }

        self.request.body_type = BodyType::None;
        self.phase = Phase::Complete;
        Ok(())
    }

    // -------------------------------------------------------------------
    // read_body(): identity body, chunked body, trailers
    // -------------------------------------------------------------------

    pub fn read_body<'b>(&mut self, buf: &'b [u8]) -> Result<BodyProgress<'b>, ParseError> {
        if let Some(e) = self.last_error {
            return Err(e);
        }
        if self.phase == Phase::Complete {
            return Ok(BodyProgress::Complete);
        }
        self.call_start = self.scan_pos;
        match self.run_body(buf) {
            Ok(progress) => Ok(progress),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn run_body<'b>(&mut self, buf: &'b [u8]) -> Result<BodyProgress<'b>, ParseError> {
        loop {
            match self.phase {
                Phase::BodyIdentity => return self.read_identity(buf),
                Phase::ChunkData => return self.read_chunk_data(buf),
                Phase::ChunkSize | Phase::ChunkExt | Phase::ChunkSizeCr => {
                    if !self.scan_chunk_size_line(buf)? {
                        return Ok(BodyProgress::NeedMoreData);
                    }
                }
                Phase::ChunkDataCr | Phase::ChunkDataLf => {
                    if !self.scan_chunk_data_crlf(buf)? {
                        return Ok(BodyProgress::NeedMoreData);
                    }
                }
                Phase::HeaderStart
                | Phase::HeaderName
                | Phase::HeaderValueOws
                | Phase::HeaderValue
                | Phase::HeaderValueLf
                | Phase::ObsFoldSkipOws
                | Phase::ObsFoldValue
                | Phase::EndHeadersLf
                    if self.in_trailers =>
                {
                    if !self.run_head(buf)? {
                        return Ok(BodyProgress::NeedMoreData);
                    }
                }
                Phase::Complete => return Ok(BodyProgress::Complete),
                _ => return Err(ParseError::DataAfterComplete),
            }
        }
    }

    fn read_identity<'b>(&mut self, buf: &'b [u8]) -> Result<BodyProgress<'b>, ParseError> {
        if self.identity_remaining == 0 {
            self.phase = Phase::Complete;
            return Ok(BodyProgress::Complete);
        }
        let available = (buf.len() - self.scan_pos) as u64;
        if available == 0 {
            return Ok(BodyProgress::NeedMoreData);
        }
        let take = available.min(self.identity_remaining);
        let start = self.scan_pos;
        let end = start + take as usize;
        self.scan_pos = end;
        self.identity_remaining -= take;
        self.body_delivered += take;
        if self.identity_remaining == 0 {
            self.phase = Phase::Complete;
        }
        Ok(BodyProgress::Data(&buf[start..end]))
    }

    fn scan_chunk_size_line(&mut self, buf: &[u8]) -> Result<bool, ParseError> {
        while self.scan_pos < buf.len() {
            let byte = buf[self.scan_pos];
            match self.phase {
                Phase::ChunkSize => {
                    if byte == b';' {
                        if self.chunk_size_digits == 0 {
                            return Err(ParseError::InvalidChunkSize);
                        }
                        self.chunk_ext_len = 0;
                        self.phase = Phase::ChunkExt;
                    } else if byte == CR {
                        if self.chunk_size_digits == 0 {
                            return Err(ParseError::InvalidChunkSize);
                        }
                        self.phase = Phase::ChunkSizeCr;
                    } else {
                        self.accumulate_chunk_digit(byte)?;
                    }
                }
                Phase::ChunkExt => {
                    if byte == CR {
                        self.phase = Phase::ChunkSizeCr;
                    } else {
                        self.chunk_ext_len += 1;
                        if self.chunk_ext_len > self.config.max_chunk_ext_len {
                            return Err(ParseError::ChunkExtensionTooLong);
                        }
                        if !(is_tchar(byte) || byte == b'=' || byte == b'"' || is_vchar(byte)) {
                            return Err(ParseError::InvalidChunkExtension);
                        }
                    }
                }
                Phase::ChunkSizeCr => {
                    if byte != LF {
                        return Err(ParseError::InvalidLineEnding);
                    }
                    self.scan_pos += 1;
                    return self.finish_chunk_size_line();
                }
                _ => unreachable!(),
            }
            self.scan_pos += 1;
        }
        Ok(false)
    }

    fn accumulate_chunk_digit(&mut self, byte: u8) -> Result<(), ParseError> {
        let v = hex_val(byte);
        if v < 0 {
            return Err(ParseError::InvalidChunkSize);
        }
        self.chunk_size_digits += 1;
        self.chunk_size = self
            .chunk_size
            .checked_mul(16)
            .and_then(|s| s.checked_add(v as u64))
            .ok_or(ParseError::ChunkSizeOverflow)?;
        Ok(())
    }

    fn finish_chunk_size_line(&mut self) -> Result<bool, ParseError> {
        if self.chunk_size == 0 {
            self.in_trailers = true;
            self.phase = Phase::HeaderStart;
            self.line_start = self.scan_pos;
            self.section_bytes = 0;
            Ok(true)
        } else {
            let new_total = self
                .body_delivered
                .checked_add(self.chunk_size)
                .ok_or(ParseError::BodyTooLarge)?;
            if new_total > self.config.max_body_size {
                return Err(ParseError::BodyTooLarge);
            }
            self.chunk_remaining = self.chunk_size;
            self.phase = Phase::ChunkData;
            Ok(true)
        }
    }

    fn read_chunk_data<'b>(&mut self, buf: &'b [u8]) -> Result<BodyProgress<'b>, ParseError> {
        let available = (buf.len() - self.scan_pos) as u64;
        if available == 0 {
            return Ok(BodyProgress::NeedMoreData);
        }
        let take = available.min(self.chunk_remaining);
        let start = self.scan_pos;
        let end = start + take as usize;
        self.scan_pos = end;
        self.chunk_remaining -= take;
        self.body_delivered += take;
        if self.chunk_remaining == 0 {
            self.phase = Phase::ChunkDataCr;
        }
        Ok(BodyProgress::Data(&buf[start..end]))
    }

    fn scan_chunk_data_crlf(&mut self, buf: &[u8]) -> Result<bool, ParseError> {
        while self.scan_pos < buf.len() {
            let byte = buf[self.scan_pos];
            match self.phase {
                Phase::ChunkDataCr => {
                    if byte != CR {
                        return Err(ParseError::InvalidChunkData);
                    }
                    self.phase = Phase::ChunkDataLf;
                }
                Phase::ChunkDataLf => {
                    if byte != LF {
                        return Err(ParseError::InvalidChunkData);
                    }
                    self.chunk_size_digits = 0;
                    self.chunk_size = 0;
                    self.phase = Phase::ChunkSize;
                    self.scan_pos += 1;
                    return Ok(true);
                }
                _ => unreachable!(),
            }
            self.scan_pos += 1;
        }
        Ok(false)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify a request-target's grammar, per RFC 9112 §3.2. This is a
/// post-hoc inspection of the already-validated target bytes, not a
/// streaming classification: a target starting with `/` is origin-form, a
/// bare `*` is asterisk-form, a target containing `://` before any other
/// delimiter is absolute-form, and anything else (e.g. `example.com:443`
/// on a `CONNECT` request) is authority-form.
fn classify_target_form(bytes: &[u8]) -> TargetForm {
    if bytes == b"*" {
        return TargetForm::Asterisk;
    }
    if bytes.first() == Some(&b'/') {
        return TargetForm::Origin;
    }
    if bytes.windows(3).any(|w| w == b"://") {
        return TargetForm::Absolute;
    }
    TargetForm::Authority
}

/// `Content-Length` is one or more decimal digits (RFC 9112 §6.2); no
/// sign, no whitespace (OWS around it was already stripped by the
/// scanner).
fn parse_content_length(bytes: &[u8]) -> Result<u64, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::InvalidContentLength);
    }
    let mut value: u64 = 0;
    for &b in bytes {
        if !is_digit(b) {
            return Err(ParseError::InvalidContentLength);
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add((b - b'0') as u64))
            .ok_or(ParseError::ContentLengthOverflow)?;
    }
    Ok(value)
}

const TRANSFER_CODINGS: [&[u8]; 5] = [b"chunked", b"compress", b"deflate", b"gzip", b"identity"];

/// Validate a `Transfer-Encoding` value: every comma-separated token must
/// be a recognized transfer-coding, and `chunked` must be the last one
/// (RFC 9112 §6.1).
fn validate_transfer_encoding(bytes: &[u8]) -> Result<(), ParseError> {
    let tokens: Vec<&[u8]> = split_tokens(bytes).collect();
    if tokens.is_empty() {
        return Err(ParseError::InvalidTransferEncoding);
    }
    for token in &tokens {
        if !TRANSFER_CODINGS
            .iter()
            .any(|known| eq_ignore_ascii_case(token, known))
        {
            return Err(ParseError::InvalidTransferEncoding);
        }
    }
    if !eq_ignore_ascii_case(tokens[tokens.len() - 1], b"chunked") {
        return Err(ParseError::ChunkedNotFinal);
    }
    Ok(())
}

fn split_tokens(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    bytes.split(|&b| b == b',').filter_map(|raw| {
        let trimmed = trim_ows(raw);
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

fn trim_ows(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_ows(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&b| !is_ows(b)).map_or(start, |p| p + 1);
    &bytes[start..end]
}

/// A loose but safe `uri-host[":"port]` validator (RFC 3986 §3.2.2):
/// accepts an IP-literal in brackets, or a reg-name/IPv4 address made of
/// unreserved/pct-encoded/sub-delim bytes, with an optional decimal port.
fn is_valid_host(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    if bytes[0] == b'[' {
        let Some(close) = bytes.iter().position(|&b| b == b']') else {
            return false;
        };
        let inner = &bytes[1..close];
        if inner.is_empty()
            || !inner
                .iter()
                .all(|&b| b.is_ascii_hexdigit() || b == b':' || b == b'.')
        {
            return false;
        }
        let rest = &bytes[close + 1..];
        return rest.is_empty() || (rest[0] == b':' && is_port(&rest[1..]));
    }
    let colon = bytes.iter().position(|&b| b == b':');
    let (host, port) = match colon {
        Some(i) => (&bytes[..i], Some(&bytes[i + 1..])),
        None => (bytes, None),
    };
    if host.is_empty()
        || !host
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b'%'))
    {
        return false;
    }
    match port {
        Some(p) => is_port(p),
        None => true,
    }
}

fn is_port(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.iter().all(|&b| is_digit(b))
}
