//! The closed set of diagnostics this parser can raise.
//!
//! Every failure the parser can produce maps to one of these variants; there
//! is no catch-all case. Each carries a short symbolic [`name`](ParseError::name)
//! and a human [`message`](ParseError::message), mirroring the `error_name`/
//! `error_message` pair of the C reference implementation this crate's wire
//! semantics were distilled from.

use std::fmt;

/// A parse failure. The variant set is closed, so callers can exhaustively
/// match it instead of falling back on string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Leading bytes before the method are not a token character and are
    /// not an allowed leading blank line.
    LeadingWhitespace,
    /// The request method is empty or contains a non-token byte.
    InvalidMethod,
    /// The request-target contains a disallowed byte or is empty.
    InvalidTarget,
    /// The HTTP-version token is not `HTTP/1.0` or `HTTP/1.1`.
    InvalidVersion,
    /// The request-line exceeded `max_request_line_len`.
    RequestLineTooLong,
    /// A line terminator was a bare LF where CRLF was required.
    InvalidLineEnding,
    /// A header field-name is empty or contains a non-token byte.
    InvalidHeaderName,
    /// A header field-value contains a byte outside the allowed value
    /// character set (or obs-text, when obs-text is not tolerated).
    InvalidHeaderValue,
    /// A single header line exceeded `max_header_line_len`.
    HeaderLineTooLong,
    /// The number of header fields exceeded `max_header_count`.
    TooManyHeaders,
    /// The cumulative size of the header section exceeded `max_headers_size`.
    HeadersTooLarge,
    /// A continuation line (obsolete line folding) was seen while
    /// `REJECT_OBS_FOLD` is configured.
    ObsFoldRejected,
    /// An HTTP/1.1 request is missing a required `Host` header.
    MissingHost,
    /// More than one `Host` header field was present.
    MultipleHost,
    /// The `Host` header value is not a valid `uri-host[:port]`.
    InvalidHost,
    /// A `Content-Length` value is not a non-negative decimal integer.
    InvalidContentLength,
    /// Multiple `Content-Length` header fields carried differing values.
    ContentLengthMismatch,
    /// A `Content-Length` value exceeds what this implementation can
    /// represent or exceeds `max_body_size`.
    ContentLengthOverflow,
    /// A `Transfer-Encoding` token is not a recognized transfer-coding.
    InvalidTransferEncoding,
    /// `Transfer-Encoding` was present but `chunked` was not its final
    /// coding.
    ChunkedNotFinal,
    /// Both `Transfer-Encoding` and `Content-Length` were present while
    /// `REJECT_TE_CL_CONFLICT` is configured.
    TransferEncodingContentLengthConflict,
    /// The request body (identity or chunked) exceeded `max_body_size`.
    BodyTooLarge,
    /// A chunk-size line contains a non-hex-digit before its terminator.
    InvalidChunkSize,
    /// A chunk-size value overflows the representable range.
    ChunkSizeOverflow,
    /// A chunk-extension contains a disallowed byte.
    InvalidChunkExtension,
    /// A chunk-extension exceeded `max_chunk_ext_len`.
    ChunkExtensionTooLong,
    /// A chunk-data segment was not properly terminated by CRLF.
    InvalidChunkData,
    /// A trailer field is malformed or names a header forbidden in
    /// trailers (e.g. `Content-Length`, `Transfer-Encoding`, `Host`).
    InvalidTrailer,
    /// More data was presented after the parser had already reached a
    /// terminal (`Complete` or `Error`) state for this message.
    DataAfterComplete,
}

impl ParseError {
    /// Short, stable, upper-snake-case identifier -- safe to log or to
    /// compare against in tests without depending on message wording.
    pub const fn name(self) -> &'static str {
        use ParseError::*;
        match self {
            LeadingWhitespace => "LEADING_WHITESPACE",
            InvalidMethod => "INVALID_METHOD",
            InvalidTarget => "INVALID_TARGET",
            InvalidVersion => "INVALID_VERSION",
            RequestLineTooLong => "REQUEST_LINE_TOO_LONG",
            InvalidLineEnding => "INVALID_LINE_ENDING",
            InvalidHeaderName => "INVALID_HEADER_NAME",
            InvalidHeaderValue => "INVALID_HEADER_VALUE",
            HeaderLineTooLong => "HEADER_LINE_TOO_LONG",
            TooManyHeaders => "TOO_MANY_HEADERS",
            HeadersTooLarge => "HEADERS_TOO_LARGE",
            ObsFoldRejected => "OBS_FOLD_REJECTED",
            MissingHost => "MISSING_HOST",
            MultipleHost => "MULTIPLE_HOST",
            InvalidHost => "INVALID_HOST",
            InvalidContentLength => "INVALID_CONTENT_LENGTH",
            ContentLengthMismatch => "CONTENT_LENGTH_MISMATCH",
            ContentLengthOverflow => "CONTENT_LENGTH_OVERFLOW",
            InvalidTransferEncoding => "INVALID_TRANSFER_ENCODING",
            ChunkedNotFinal => "CHUNKED_NOT_FINAL",
            TransferEncodingContentLengthConflict => "TE_CL_CONFLICT",
            BodyTooLarge => "BODY_TOO_LARGE",
            InvalidChunkSize => "INVALID_CHUNK_SIZE",
            ChunkSizeOverflow => "CHUNK_SIZE_OVERFLOW",
            InvalidChunkExtension => "INVALID_CHUNK_EXTENSION",
            ChunkExtensionTooLong => "CHUNK_EXTENSION_TOO_LONG",
            InvalidChunkData => "INVALID_CHUNK_DATA",
            InvalidTrailer => "INVALID_TRAILER",
            DataAfterComplete => "DATA_AFTER_COMPLETE",
        }
    }

    /// A short human-readable description, suitable for logs or CLI output.
    pub const fn message(self) -> &'static str {
        use ParseError::*;
        match self {
            LeadingWhitespace => "unexpected whitespace before the request line",
            InvalidMethod => "request method is empty or contains an invalid character",
            InvalidTarget => "request-target is empty or contains an invalid character",
            InvalidVersion => "HTTP-version is not HTTP/1.0 or HTTP/1.1",
            RequestLineTooLong => "request-line exceeds the configured length limit",
            InvalidLineEnding => "line is not terminated by CRLF",
            InvalidHeaderName => "header field-name is empty or contains an invalid character",
            InvalidHeaderValue => "header field-value contains an invalid character",
            HeaderLineTooLong => "header line exceeds the configured length limit",
            TooManyHeaders => "number of header fields exceeds the configured limit",
            HeadersTooLarge => "header section exceeds the configured size limit",
            ObsFoldRejected => "obsolete line folding is not permitted by this configuration",
            MissingHost => "HTTP/1.1 request is missing a required Host header",
            MultipleHost => "request has more than one Host header",
            InvalidHost => "Host header value is not a valid host[:port]",
            InvalidContentLength => "Content-Length value is not a valid non-negative integer",
            ContentLengthMismatch => "multiple Content-Length headers disagree on value",
            ContentLengthOverflow => "Content-Length exceeds the representable or configured limit",
            InvalidTransferEncoding => "Transfer-Encoding names an unrecognized transfer-coding",
            ChunkedNotFinal => "chunked must be the last coding in Transfer-Encoding",
            TransferEncodingContentLengthConflict => {
                "both Transfer-Encoding and Content-Length are present"
            }
            BodyTooLarge => "request body exceeds the configured size limit",
            InvalidChunkSize => "chunk-size line contains a non-hexadecimal character",
            ChunkSizeOverflow => "chunk-size value overflows the representable range",
            InvalidChunkExtension => "chunk-extension contains an invalid character",
            ChunkExtensionTooLong => "chunk-extension exceeds the configured length limit",
            InvalidChunkData => "chunk-data is not terminated by CRLF",
            InvalidTrailer => "trailer field is malformed or not permitted in trailers",
            DataAfterComplete => "data was presented after the request was already complete",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message())
    }
}

impl std::error::Error for ParseError {}
