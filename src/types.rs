//! An owned, `serde`-friendly view of a parsed request.
//!
//! [`crate::Request`] stores only [`crate::Span`]s into the caller's
//! buffer and is the type the streaming [`crate::Parser`] produces.
//! [`OwnedRequest`] copies those spans into `String`/`Vec<u8>` fields once,
//! for callers (like the CLI) that want a self-contained value to print,
//! serialize, or hold past the lifetime of the input buffer.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::request::{Request, TargetForm};

/// Standard HTTP request methods recognized by name, per RFC 9110 §9.
///
/// The streaming parser itself does not restrict the method token to this
/// set (any `tchar` sequence is a syntactically valid method) -- this
/// enum is only used when materializing an [`OwnedRequest`] for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
    /// Any other token-valid method, preserved verbatim.
    Other,
}

impl HttpMethod {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match bytes {
            b"GET" => Self::Get,
            b"HEAD" => Self::Head,
            b"POST" => Self::Post,
            b"PUT" => Self::Put,
            b"DELETE" => Self::Delete,
            b"CONNECT" => Self::Connect,
            b"OPTIONS" => Self::Options,
            b"TRACE" => Self::Trace,
            b"PATCH" => Self::Patch,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Connect => "CONNECT",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Patch => "PATCH",
            Self::Other => "OTHER",
        };
        f.write_str(s)
    }
}

/// HTTP protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVersion {
    Http10,
    Http11,
}

impl HttpVersion {
    pub fn from_major_minor(major: u8, minor: u8) -> Option<Self> {
        match (major, minor) {
            (1, 0) => Some(Self::Http10),
            (1, 1) => Some(Self::Http11),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single HTTP header field, materialized as owned strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// A fully materialized HTTP request: every [`crate::Span`] in the source
/// [`Request`] has been copied out into an owned field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedRequest {
    pub method: HttpMethod,
    pub method_raw: String,
    pub target: String,
    pub target_form: String,
    pub version: String,
    pub headers: Vec<Header>,
    #[serde(serialize_with = "serialize_body")]
    pub body: Option<Vec<u8>>,
}

fn serialize_body<S: Serializer>(body: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
    match body {
        None => s.serialize_none(),
        Some(bytes) => s.serialize_str(&String::from_utf8_lossy(bytes)),
    }
}

impl OwnedRequest {
    /// Copy a streaming [`Request`] (plus the buffer it was parsed from,
    /// plus any body bytes already collected) into an owned value.
    pub fn from_request(req: &Request, buf: &[u8], body: Option<Vec<u8>>) -> Self {
        let method_bytes = req.method_bytes(buf);
        let target_form = match req.target_form {
            TargetForm::Origin => "origin",
            TargetForm::Absolute => "absolute",
            TargetForm::Authority => "authority",
            TargetForm::Asterisk => "asterisk",
        };
        let version = match (req.version_major(), req.version_minor()) {
            (1, 0) => "HTTP/1.0",
            (1, 1) => "HTTP/1.1",
            _ => "HTTP/1.1",
        };
        OwnedRequest {
            method: HttpMethod::from_bytes(method_bytes),
            method_raw: String::from_utf8_lossy(method_bytes).into_owned(),
            target: String::from_utf8_lossy(req.target_bytes(buf)).into_owned(),
            target_form: target_form.to_string(),
            version: version.to_string(),
            headers: req
                .headers
                .iter()
                .map(|h| Header {
                    name: String::from_utf8_lossy(h.name_bytes(buf)).into_owned(),
                    value: String::from_utf8_lossy(h.value_bytes(buf)).into_owned(),
                })
                .collect(),
            body,
        }
    }

    pub fn body_as_str(&self) -> Option<&str> {
        self.body.as_ref().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn body_as_lossy_string(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
            .collect()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.header_value("content-length")
            .and_then(|v| v.trim().parse().ok())
    }

    pub fn is_chunked(&self) -> bool {
        self.header_value("transfer-encoding")
            .map(|v| v.to_ascii_lowercase().contains("chunked"))
            .unwrap_or(false)
    }
}
