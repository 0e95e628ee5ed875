//! Parser limits and behavior toggles.
//!
//! [`Config`] groups the size limits that bound the parser's memory use and
//! the strictness toggles in [`ConfigFlags`]. [`Config::default`] matches
//! the defaults of the C reference implementation this crate's wire
//! semantics were distilled from: strict line endings, rejected obsolete
//! folding, tolerated obs-text in header values, one leading blank line
//! tolerated, and a hard conflict error on simultaneous Transfer-Encoding
//! and Content-Length.

use std::ops::{BitOr, BitOrAssign};

/// Strictness toggles, one bit per behavior. Combine with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigFlags(pub u32);

impl ConfigFlags {
    /// Reject bare-LF line endings anywhere a CRLF is required.
    pub const STRICT_CRLF: ConfigFlags = ConfigFlags(1 << 0);
    /// Reject header continuation lines (obsolete line folding, RFC 9112 §5.2).
    pub const REJECT_OBS_FOLD: ConfigFlags = ConfigFlags(1 << 1);
    /// Accept obs-text (bytes 0x80-0xFF) in header field values.
    pub const ALLOW_OBS_TEXT: ConfigFlags = ConfigFlags(1 << 2);
    /// Tolerate a single leading CRLF (or bare LF, if `STRICT_CRLF` is
    /// clear) before the request-line.
    pub const ALLOW_LEADING_CRLF: ConfigFlags = ConfigFlags(1 << 3);
    /// Tolerate more than one space between request-line fields.
    pub const TOLERATE_SPACES: ConfigFlags = ConfigFlags(1 << 4);
    /// Treat simultaneous Transfer-Encoding and Content-Length as an error
    /// instead of letting Transfer-Encoding silently win.
    pub const REJECT_TE_CL_CONFLICT: ConfigFlags = ConfigFlags(1 << 5);

    pub const NONE: ConfigFlags = ConfigFlags(0);

    #[inline]
    pub const fn contains(self, other: ConfigFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: ConfigFlags) -> ConfigFlags {
        ConfigFlags(self.0 | other.0)
    }
}

impl BitOr for ConfigFlags {
    type Output = ConfigFlags;
    fn bitor(self, rhs: ConfigFlags) -> ConfigFlags {
        self.union(rhs)
    }
}

impl BitOrAssign for ConfigFlags {
    fn bitor_assign(&mut self, rhs: ConfigFlags) {
        *self = self.union(rhs);
    }
}

/// Size limits and flags a [`crate::Parser`] is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on total bytes read for a single request body, whether
    /// framed by `Content-Length` or `chunked`.
    pub max_body_size: u64,
    /// Upper bound on the request-line, in bytes, CRLF included.
    pub max_request_line_len: u32,
    /// Upper bound on a single header (or trailer) line, CRLF included.
    pub max_header_line_len: u32,
    /// Upper bound on the cumulative size of the header section.
    pub max_headers_size: u32,
    /// Upper bound on the number of header fields (trailers counted
    /// separately against the same limit).
    pub max_header_count: u32,
    /// Upper bound on the length of a single chunk-extension.
    pub max_chunk_ext_len: u32,
    pub flags: ConfigFlags,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_body_size: u64::MAX,
            max_request_line_len: 8192,
            max_header_line_len: 8192,
            max_headers_size: 65536,
            max_header_count: 100,
            max_chunk_ext_len: 1024,
            flags: ConfigFlags::STRICT_CRLF
                | ConfigFlags::REJECT_OBS_FOLD
                | ConfigFlags::ALLOW_OBS_TEXT
                | ConfigFlags::ALLOW_LEADING_CRLF
                | ConfigFlags::REJECT_TE_CL_CONFLICT,
        }
    }
}
