//! The parsed request head: method, target, version, and header fields,
//! all recorded as [`Span`]s into the caller's buffer rather than owned
//! copies.

use crate::classify::eq_ignore_ascii_case;
use crate::span::Span;

/// Header names the parser treats semantically rather than as opaque
/// bytes. Kept as a fixed, known-small set -- resolving one of these is an
/// array index into [`Request`] rather than a linear header scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownHeader {
    Host = 0,
    ContentLength = 1,
    TransferEncoding = 2,
    Connection = 3,
    Expect = 4,
    Upgrade = 5,
}

pub const KNOWN_HEADER_COUNT: usize = 6;

impl KnownHeader {
    pub const ALL: [KnownHeader; KNOWN_HEADER_COUNT] = [
        KnownHeader::Host,
        KnownHeader::ContentLength,
        KnownHeader::TransferEncoding,
        KnownHeader::Connection,
        KnownHeader::Expect,
        KnownHeader::Upgrade,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn canonical_name(self) -> &'static str {
        match self {
            KnownHeader::Host => "Host",
            KnownHeader::ContentLength => "Content-Length",
            KnownHeader::TransferEncoding => "Transfer-Encoding",
            KnownHeader::Connection => "Connection",
            KnownHeader::Expect => "Expect",
            KnownHeader::Upgrade => "Upgrade",
        }
    }

    /// Match a header name against the known set, case-insensitively.
    pub(crate) fn from_name_bytes(name: &[u8]) -> Option<KnownHeader> {
        if eq_ignore_ascii_case(name, b"host") {
            Some(KnownHeader::Host)
        } else if eq_ignore_ascii_case(name, b"content-length") {
            Some(KnownHeader::ContentLength)
        } else if eq_ignore_ascii_case(name, b"transfer-encoding") {
            Some(KnownHeader::TransferEncoding)
        } else if eq_ignore_ascii_case(name, b"connection") {
            Some(KnownHeader::Connection)
        } else if eq_ignore_ascii_case(name, b"expect") {
            Some(KnownHeader::Expect)
        } else if eq_ignore_ascii_case(name, b"upgrade") {
            Some(KnownHeader::Upgrade)
        } else {
            None
        }
    }
}

/// Per-field bits, mirroring the reference implementation's header flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderFlags(pub u16);

impl HeaderFlags {
    pub const KNOWN_NAME: HeaderFlags = HeaderFlags(1 << 0);

    #[inline]
    pub const fn contains(self, other: HeaderFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A header field-value: the common case is a direct [`Span`] into the
/// request buffer. A continuation line (obsolete folding, tolerated only
/// when configured) cannot be represented as a single contiguous span
/// without synthesizing bytes the wire never sent contiguously, so that
/// rare case owns a small buffer instead.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Direct(Span),
    Folded(Box<[u8]>),
}

impl FieldValue {
    pub fn as_bytes<'b>(&'b self, buf: &'b [u8]) -> &'b [u8] {
        match self {
            FieldValue::Direct(span) => span.as_slice(buf),
            FieldValue::Folded(owned) => owned,
        }
    }
}

/// One parsed header or trailer field.
#[derive(Debug, Clone)]
pub struct HeaderField {
    pub name: Span,
    pub value: FieldValue,
    pub name_id: Option<KnownHeader>,
    pub flags: HeaderFlags,
}

impl HeaderField {
    pub fn name_bytes<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        self.name.as_slice(buf)
    }

    pub fn value_bytes<'b>(&'b self, buf: &'b [u8]) -> &'b [u8] {
        self.value.as_bytes(buf)
    }
}

/// Which grammar produced the request-target, per RFC 9112 §3.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetForm {
    /// `/path?query` -- the common case for origin-server requests.
    Origin,
    /// `http://host/path` -- typically seen when talking to a proxy.
    Absolute,
    /// `host:port` -- only valid with the `CONNECT` method.
    Authority,
    /// `*` -- only valid with the `OPTIONS` method.
    Asterisk,
}

/// How the request body is framed, per RFC 9112 §6.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    None,
    ContentLength,
    Chunked,
}

/// Request-level bits, mirroring the reference implementation's request
/// flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestFlags(pub u16);

impl RequestFlags {
    pub const KEEP_ALIVE: RequestFlags = RequestFlags(1 << 0);
    pub const EXPECT_CONTINUE: RequestFlags = RequestFlags(1 << 1);
    pub const HAS_UPGRADE: RequestFlags = RequestFlags(1 << 2);
    pub const HAS_HOST: RequestFlags = RequestFlags(1 << 3);
    pub const HAS_CONTENT_LENGTH: RequestFlags = RequestFlags(1 << 4);
    pub const HAS_TRANSFER_ENCODING: RequestFlags = RequestFlags(1 << 5);
    pub const IS_CHUNKED: RequestFlags = RequestFlags(1 << 6);

    #[inline]
    pub const fn contains(self, other: RequestFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub(crate) fn insert(&mut self, other: RequestFlags) {
        self.0 |= other.0;
    }
}

/// The parsed request head. Every byte range is a [`Span`] into whatever
/// buffer was passed to [`crate::Parser::parse`] -- resolve fields with the
/// same buffer the parser consumed, or a later, longer prefix of it.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Span,
    pub target: Span,
    pub target_form: TargetForm,
    /// `0x0100` for HTTP/1.0, `0x0101` for HTTP/1.1 -- `(major << 8) | minor`.
    pub version: u16,
    pub body_type: BodyType,
    pub content_length: u64,
    pub flags: RequestFlags,
    pub(crate) known_idx: [Option<u32>; KNOWN_HEADER_COUNT],
    pub headers: Vec<HeaderField>,
    pub trailers: Vec<HeaderField>,
}

impl Request {
    pub(crate) fn new() -> Self {
        Request {
            method: Span::EMPTY,
            target: Span::EMPTY,
            target_form: TargetForm::Origin,
            version: 0,
            body_type: BodyType::None,
            content_length: 0,
            flags: RequestFlags::default(),
            known_idx: [None; KNOWN_HEADER_COUNT],
            headers: Vec::new(),
            trailers: Vec::new(),
        }
    }

    pub fn version_major(&self) -> u8 {
        (self.version >> 8) as u8
    }

    pub fn version_minor(&self) -> u8 {
        (self.version & 0xFF) as u8
    }

    pub fn method_bytes<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        self.method.as_slice(buf)
    }

    pub fn target_bytes<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        self.target.as_slice(buf)
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    pub fn trailer_count(&self) -> usize {
        self.trailers.len()
    }

    /// O(1) lookup for the six headers the parser tracks semantically.
    pub fn known_header(&self, which: KnownHeader) -> Option<&HeaderField> {
        self.known_idx[which.index()].map(|i| &self.headers[i as usize])
    }

    /// Linear, case-insensitive scan over header fields by name. Use
    /// [`Request::known_header`] instead for the six headers this parser
    /// tracks.
    pub fn find_header<'b>(&self, buf: &'b [u8], name: &[u8]) -> Option<&HeaderField> {
        self.headers
            .iter()
            .find(|h| h.name.eq_case_insensitive(buf, name))
    }

    pub fn find_header_values<'a, 'b>(
        &'a self,
        buf: &'b [u8],
        name: &[u8],
    ) -> impl Iterator<Item = &'a [u8]> + 'a
    where
        'b: 'a,
    {
        self.headers
            .iter()
            .filter(move |h| h.name.eq_case_insensitive(buf, name))
            .map(move |h| h.value_bytes(buf))
    }

    pub(crate) fn record_known(&mut self, which: KnownHeader, header_index: usize) {
        self.known_idx[which.index()] = Some(header_index as u32);
    }
}
