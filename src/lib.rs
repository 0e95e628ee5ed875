//! # wireframe
//!
//! A **strict, streaming HTTP/1.1 request parser** implemented as a state
//! machine over a caller-owned buffer, usable both as a library and as a
//! CLI tool.
//!
//! Input is fed incrementally -- byte-by-byte or in arbitrarily-sized
//! chunks -- as long as every call passes the same logical, ever-growing
//! buffer from its start. The parser tracks how much of that buffer it has
//! scanned and records header/target/method positions as [`Span`]s rather
//! than copies, so parsing a request allocates nothing beyond the header
//! and trailer vectors themselves.
//!
//! Parsing the request head and draining its body are two separate steps:
//! [`Parser::parse`] stops the moment the header section is complete and
//! the body framing (none, `Content-Length`, or `chunked`) is known;
//! [`Parser::read_body`] is then called, possibly many times, to drain the
//! body (and, for chunked requests, any trailers).
//!
//! ## Quick start
//!
//! ```rust
//! use wireframe::{Parser, ParseProgress, BodyProgress};
//!
//! let mut parser = Parser::new();
//! let mut buf = Vec::new();
//!
//! buf.extend_from_slice(b"GET /hello HTTP/1.1\r\n");
//! assert_eq!(parser.parse(&buf).unwrap(), ParseProgress::NeedMoreData);
//!
//! buf.extend_from_slice(b"Host: example.com\r\n\r\n");
//! assert_eq!(parser.parse(&buf).unwrap(), ParseProgress::Ready);
//!
//! let request = parser.request().unwrap();
//! assert_eq!(request.method_bytes(&buf), b"GET");
//! assert_eq!(request.target_bytes(&buf), b"/hello");
//! assert!(matches!(parser.read_body(&buf).unwrap(), BodyProgress::Complete));
//! ```
//!
//! ## Owned requests
//!
//! [`OwnedRequest`] copies a [`Request`] (plus any body bytes) into owned
//! `String`/`Vec<u8>` fields, for callers that want a self-contained,
//! `serde`-serializable value -- this is what the CLI binary uses.

mod classify;
mod config;
mod error;
mod output;
mod parser;
mod request;
mod span;
mod types;

pub use config::{Config, ConfigFlags};
pub use error::ParseError;
pub use output::{format_debug, format_headers_only, format_json};
pub use parser::{BodyProgress, ParseProgress, Parser, State};
pub use request::{
    BodyType, FieldValue, HeaderField, HeaderFlags, KnownHeader, Request, RequestFlags,
    TargetForm,
};
pub use span::Span;
pub use types::{Header, HttpMethod, HttpVersion, OwnedRequest};
