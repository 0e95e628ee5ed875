use wireframe::{
    format_debug, format_headers_only, format_json, BodyProgress, Config, ConfigFlags,
    OwnedRequest, ParseError, ParseProgress, Parser, TargetForm,
};

/// Drive a [`Parser`] to completion over a fully-available buffer and
/// return the owned, materialized request plus any body bytes.
fn parse_all(data: &[u8]) -> Result<OwnedRequest, ParseError> {
    parse_all_with(data, Config::default())
}

fn parse_all_with(data: &[u8], config: Config) -> Result<OwnedRequest, ParseError> {
    let mut parser = Parser::with_config(config);
    assert_eq!(parser.parse(data)?, ParseProgress::Ready);
    let mut body = Vec::new();
    loop {
        match parser.read_body(data)? {
            BodyProgress::Data(chunk) => body.extend_from_slice(chunk),
            BodyProgress::Complete => break,
            BodyProgress::NeedMoreData => panic!("buffer already complete"),
        }
    }
    let req = parser.request().unwrap();
    let body = if body.is_empty() { None } else { Some(body) };
    Ok(OwnedRequest::from_request(req, data, body))
}

// =========================================================================
// Request-line parsing
// =========================================================================

#[test]
fn simple_get_request() {
    let raw = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.method_raw, "GET");
    assert_eq!(req.target, "/");
    assert_eq!(req.version, "HTTP/1.1");
    assert_eq!(req.headers.len(), 1);
    assert_eq!(req.headers[0].name, "Host");
    assert_eq!(req.headers[0].value, "example.com");
    assert!(req.body.is_none());
}

#[test]
fn get_with_query_string() {
    let raw = b"GET /api/users?page=1&limit=10 HTTP/1.1\r\nHost: api.example.com\r\nAccept: application/json\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.target, "/api/users?page=1&limit=10");
    assert_eq!(req.header_value("Accept"), Some("application/json"));
}

#[test]
fn http_10_version() {
    let raw = b"GET /legacy HTTP/1.0\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.version, "HTTP/1.0");
}

#[test]
fn all_standard_methods() {
    let methods = [
        "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
    ];
    for name in methods {
        let raw = format!("{name} / HTTP/1.1\r\nHost: h\r\n\r\n");
        let req = parse_all(raw.as_bytes()).unwrap_or_else(|e| panic!("method {name}: {e}"));
        assert_eq!(req.method_raw, name, "mismatch for method {name}");
    }
}

#[test]
fn options_asterisk_target() {
    let raw = b"OPTIONS * HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.target, "*");
    assert_eq!(req.target_form, "asterisk");
}

#[test]
fn connect_authority_form_target() {
    let raw = b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.target_form, "authority");
}

#[test]
fn absolute_form_target() {
    let raw = b"GET http://example.com/path HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.target_form, "absolute");
}

#[test]
fn empty_method_is_rejected() {
    let raw = b" / HTTP/1.1\r\nHost: h\r\n\r\n";
    assert!(parse_all(raw).is_err());
}

#[test]
fn invalid_version_literal_rejected() {
    let raw = b"GET / HTTP/2.0\r\nHost: h\r\n\r\n";
    assert_eq!(parse_all(raw), Err(ParseError::InvalidVersion));
}

#[test]
fn request_line_too_long_rejected() {
    let config = Config {
        max_request_line_len: 16,
        ..Config::default()
    };
    let raw = b"GET /a-much-too-long-path-for-the-limit HTTP/1.1\r\nHost: h\r\n\r\n";
    assert_eq!(
        parse_all_with(raw, config),
        Err(ParseError::RequestLineTooLong)
    );
}

// =========================================================================
// Header parsing
// =========================================================================

#[test]
fn multiple_headers() {
    let raw = b"GET / HTTP/1.1\r\nHost: example.com\r\nAccept: */*\r\nUser-Agent: test\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.headers.len(), 3);
    assert_eq!(req.header_value("user-agent"), Some("test"));
}

#[test]
fn header_name_is_case_insensitive_for_lookup() {
    let raw = b"GET / HTTP/1.1\r\nHOST: example.com\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.header_value("host"), Some("example.com"));
}

#[test]
fn repeated_non_special_header_preserves_all_values() {
    let raw = b"GET / HTTP/1.1\r\nHost: h\r\nX-Tag: a\r\nX-Tag: b\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.header_values("x-tag"), vec!["a", "b"]);
}

#[test]
fn invalid_header_name_byte_rejected() {
    let raw = b"GET / HTTP/1.1\r\nHost: h\r\nBad Name: x\r\n\r\n";
    assert_eq!(parse_all(raw), Err(ParseError::InvalidHeaderName));
}

#[test]
fn obs_fold_is_rejected_by_default() {
    let raw = b"GET / HTTP/1.1\r\nHost: h\r\nX-Long: first\r\n second\r\n\r\n";
    assert_eq!(parse_all(raw), Err(ParseError::ObsFoldRejected));
}

#[test]
fn obs_fold_is_merged_when_tolerated() {
    let config = Config {
        flags: ConfigFlags::STRICT_CRLF
            | ConfigFlags::ALLOW_OBS_TEXT
            | ConfigFlags::ALLOW_LEADING_CRLF
            | ConfigFlags::REJECT_TE_CL_CONFLICT,
        ..Config::default()
    };
    let raw = b"GET / HTTP/1.1\r\nHost: h\r\nX-Long: first\r\n second\r\n\r\n";
    let req = parse_all_with(raw, config).expect("obs-fold tolerated");
    assert_eq!(req.header_value("x-long"), Some("first second"));
}

#[test]
fn too_many_headers_rejected() {
    let config = Config {
        max_header_count: 2,
        ..Config::default()
    };
    let raw = b"GET / HTTP/1.1\r\nHost: h\r\nA: 1\r\nB: 2\r\n\r\n";
    assert_eq!(
        parse_all_with(raw, config),
        Err(ParseError::TooManyHeaders)
    );
}

// =========================================================================
// Host header semantics
// =========================================================================

#[test]
fn missing_host_on_http11_rejected() {
    let raw = b"GET / HTTP/1.1\r\n\r\n";
    assert_eq!(parse_all(raw), Err(ParseError::MissingHost));
}

#[test]
fn http10_without_host_accepted() {
    let raw = b"GET / HTTP/1.0\r\n\r\n";
    assert!(parse_all(raw).is_ok());
}

#[test]
fn duplicate_host_header_rejected() {
    let raw = b"GET / HTTP/1.1\r\nHost: a\r\nHost: b\r\n\r\n";
    assert_eq!(parse_all(raw), Err(ParseError::MultipleHost));
}

#[test]
fn host_with_port_accepted() {
    let raw = b"GET / HTTP/1.1\r\nHost: example.com:8080\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.header_value("host"), Some("example.com:8080"));
}

#[test]
fn ipv6_host_literal_accepted() {
    let raw = b"GET / HTTP/1.1\r\nHost: [::1]:8080\r\n\r\n";
    assert!(parse_all(raw).is_ok());
}

#[test]
fn host_with_invalid_byte_rejected() {
    let raw = b"GET / HTTP/1.1\r\nHost: exa mple.com\r\n\r\n";
    assert_eq!(parse_all(raw), Err(ParseError::InvalidHost));
}

// =========================================================================
// Content-Length body framing
// =========================================================================

#[test]
fn content_length_body_is_drained() {
    let raw = b"POST /submit HTTP/1.1\r\nHost: h\r\nContent-Length: 11\r\n\r\nhello world";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.body_as_str(), Some("hello world"));
    assert_eq!(req.content_length(), Some(11));
}

#[test]
fn zero_content_length_means_no_body() {
    let raw = b"POST /submit HTTP/1.1\r\nHost: h\r\nContent-Length: 0\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert!(req.body.is_none());
}

#[test]
fn non_numeric_content_length_rejected() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: abc\r\n\r\n";
    assert_eq!(parse_all(raw), Err(ParseError::InvalidContentLength));
}

#[test]
fn conflicting_duplicate_content_length_rejected() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 5\r\nContent-Length: 6\r\n\r\nhello";
    assert_eq!(parse_all(raw), Err(ParseError::ContentLengthMismatch));
}

#[test]
fn identical_duplicate_content_length_accepted() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 5\r\nContent-Length: 5\r\n\r\nhello";
    let req = parse_all(raw).expect("identical duplicates tolerated");
    assert_eq!(req.content_length(), Some(5));
}

#[test]
fn body_exceeding_max_size_rejected() {
    let config = Config {
        max_body_size: 4,
        ..Config::default()
    };
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 11\r\n\r\nhello world";
    assert_eq!(
        parse_all_with(raw, config),
        Err(ParseError::BodyTooLarge)
    );
}

// =========================================================================
// Chunked transfer-coding
// =========================================================================

#[test]
fn chunked_body_is_decoded() {
    let raw = b"POST /upload HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n\
4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.body_as_str(), Some("Wikipedia"));
    assert!(req.is_chunked());
}

#[test]
fn chunked_with_extension_is_decoded() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n\
5;ext=1\r\nhello\r\n0\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    assert_eq!(req.body_as_str(), Some("hello"));
}

#[test]
fn chunked_with_trailers_is_decoded() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n\
5\r\nhello\r\n0\r\nX-Checksum: abc123\r\n\r\n";
    let mut parser = Parser::new();
    assert_eq!(parser.parse(raw).unwrap(), ParseProgress::Ready);
    let mut body = Vec::new();
    loop {
        match parser.read_body(raw).unwrap() {
            BodyProgress::Data(d) => body.extend_from_slice(d),
            BodyProgress::Complete => break,
            BodyProgress::NeedMoreData => panic!("complete buffer"),
        }
    }
    assert_eq!(body, b"hello");
    let req = parser.request().unwrap();
    assert_eq!(req.trailer_count(), 1);
    assert_eq!(req.trailers[0].name_bytes(raw), b"X-Checksum");
}

#[test]
fn content_length_in_trailer_rejected() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n\
0\r\nContent-Length: 5\r\n\r\n";
    let mut parser = Parser::new();
    parser.parse(raw).unwrap();
    let mut err = None;
    loop {
        match parser.read_body(raw) {
            Ok(BodyProgress::Data(_)) => {}
            Ok(BodyProgress::Complete) => break,
            Ok(BodyProgress::NeedMoreData) => panic!("complete buffer"),
            Err(e) => {
                err = Some(e);
                break;
            }
        }
    }
    assert_eq!(err, Some(ParseError::InvalidTrailer));
}

fn drain_body_expect_trailer_error(raw: &[u8]) -> Option<ParseError> {
    let mut parser = Parser::new();
    parser.parse(raw).unwrap();
    loop {
        match parser.read_body(raw) {
            Ok(BodyProgress::Data(_)) => {}
            Ok(BodyProgress::Complete) => return None,
            Ok(BodyProgress::NeedMoreData) => panic!("complete buffer"),
            Err(e) => return Some(e),
        }
    }
}

#[test]
fn connection_in_trailer_rejected() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n\
0\r\nConnection: close\r\n\r\n";
    assert_eq!(
        drain_body_expect_trailer_error(raw),
        Some(ParseError::InvalidTrailer)
    );
}

#[test]
fn expect_in_trailer_rejected() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n\
0\r\nExpect: 100-continue\r\n\r\n";
    assert_eq!(
        drain_body_expect_trailer_error(raw),
        Some(ParseError::InvalidTrailer)
    );
}

#[test]
fn upgrade_in_trailer_rejected() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n\
0\r\nUpgrade: websocket\r\n\r\n";
    assert_eq!(
        drain_body_expect_trailer_error(raw),
        Some(ParseError::InvalidTrailer)
    );
}

#[test]
fn chunked_and_content_length_conflict_rejected_by_default() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 5\r\nTransfer-Encoding: chunked\r\n\r\nhello";
    assert_eq!(
        parse_all(raw),
        Err(ParseError::TransferEncodingContentLengthConflict)
    );
}

#[test]
fn transfer_encoding_not_ending_in_chunked_rejected() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked, gzip\r\n\r\nhello";
    assert_eq!(parse_all(raw), Err(ParseError::ChunkedNotFinal));
}

#[test]
fn unknown_transfer_coding_rejected() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: bogus\r\n\r\nhello";
    assert_eq!(parse_all(raw), Err(ParseError::InvalidTransferEncoding));
}

#[test]
fn invalid_chunk_size_rejected() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\nZZ\r\nhello\r\n0\r\n\r\n";
    let mut parser = Parser::new();
    parser.parse(raw).unwrap();
    assert_eq!(parser.read_body(raw), Err(ParseError::InvalidChunkSize));
}

// =========================================================================
// Connection / Expect / Upgrade semantics
// =========================================================================

#[test]
fn http11_keeps_alive_by_default() {
    let raw = b"GET / HTTP/1.1\r\nHost: h\r\n\r\n";
    let mut parser = Parser::new();
    parser.parse(raw).unwrap();
    assert!(parser
        .request()
        .unwrap()
        .flags
        .contains(wireframe::RequestFlags::KEEP_ALIVE));
}

#[test]
fn connection_close_overrides_default_keep_alive() {
    let raw = b"GET / HTTP/1.1\r\nHost: h\r\nConnection: close\r\n\r\n";
    let mut parser = Parser::new();
    parser.parse(raw).unwrap();
    assert!(!parser
        .request()
        .unwrap()
        .flags
        .contains(wireframe::RequestFlags::KEEP_ALIVE));
}

#[test]
fn http10_requires_explicit_keep_alive() {
    let raw = b"GET / HTTP/1.0\r\nConnection: keep-alive\r\n\r\n";
    let mut parser = Parser::new();
    parser.parse(raw).unwrap();
    assert!(parser
        .request()
        .unwrap()
        .flags
        .contains(wireframe::RequestFlags::KEEP_ALIVE));
}

#[test]
fn expect_100_continue_is_flagged() {
    let raw = b"POST / HTTP/1.1\r\nHost: h\r\nExpect: 100-continue\r\nContent-Length: 4\r\n\r\ntest";
    let mut parser = Parser::new();
    parser.parse(raw).unwrap();
    assert!(parser
        .request()
        .unwrap()
        .flags
        .contains(wireframe::RequestFlags::EXPECT_CONTINUE));
}

// =========================================================================
// Leading CRLF / line-ending strictness
// =========================================================================

#[test]
fn tolerated_leading_crlf_before_request_line() {
    let raw = b"\r\nGET / HTTP/1.1\r\nHost: h\r\n\r\n";
    assert!(parse_all(raw).is_ok());
}

#[test]
fn bare_lf_rejected_under_strict_crlf() {
    let raw = b"GET / HTTP/1.1\nHost: h\n\n";
    assert!(parse_all(raw).is_err());
}

#[test]
fn bare_lf_tolerated_when_strict_crlf_disabled() {
    let config = Config {
        flags: ConfigFlags::REJECT_OBS_FOLD
            | ConfigFlags::ALLOW_OBS_TEXT
            | ConfigFlags::ALLOW_LEADING_CRLF
            | ConfigFlags::REJECT_TE_CL_CONFLICT,
        ..Config::default()
    };
    let raw = b"GET / HTTP/1.1\nHost: h\n\n";
    assert!(parse_all_with(raw, config).is_ok());
}

// =========================================================================
// Incremental feeding
// =========================================================================

#[test]
fn byte_by_byte_feed_reaches_ready() {
    let data = b"GET /x HTTP/1.1\r\nHost: h\r\nA: b\r\n\r\n";
    let mut parser = Parser::new();
    let mut buf = Vec::new();
    let mut ready = false;
    for &b in data {
        buf.push(b);
        if parser.parse(&buf).unwrap() == ParseProgress::Ready {
            ready = true;
            break;
        }
    }
    assert!(ready);
}

#[test]
fn body_delivered_across_multiple_read_body_calls() {
    let head = b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 10\r\n\r\n";
    let mut buf = head.to_vec();
    let mut parser = Parser::new();
    assert_eq!(parser.parse(&buf).unwrap(), ParseProgress::Ready);

    buf.extend_from_slice(b"hello");
    match parser.read_body(&buf).unwrap() {
        BodyProgress::Data(d) => assert_eq!(d, b"hello"),
        other => panic!("unexpected {other:?}"),
    }

    match parser.read_body(&buf).unwrap() {
        BodyProgress::NeedMoreData => {}
        other => panic!("unexpected {other:?}"),
    }

    buf.extend_from_slice(b"world");
    match parser.read_body(&buf).unwrap() {
        BodyProgress::Data(d) => assert_eq!(d, b"world"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        parser.read_body(&buf).unwrap(),
        BodyProgress::Complete
    ));
}

// =========================================================================
// Output formatting
// =========================================================================

#[test]
fn json_output_round_trips_through_serde() {
    let raw = b"GET /x HTTP/1.1\r\nHost: h\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    let json = format_json(&req, false);
    assert!(json.contains("\"target\":\"/x\""));
}

#[test]
fn debug_output_includes_method_and_headers() {
    let raw = b"GET /x HTTP/1.1\r\nHost: h\r\n\r\n";
    let req = parse_all(raw).expect("should parse");
    let out = format_debug(&req);
    assert!(out.contains("Method:  GET (GET)"));
    assert!(out.contains("Host: h"));
}

#[test]
fn headers_only_output_omits_body() {
    let raw = b"POST /x HTTP/1.1\r\nHost: h\r\nContent-Length: 4\r\n\r\ntest";
    let req = parse_all(raw).expect("should parse");
    let out = format_headers_only(&req);
    assert!(!out.contains("test"));
    assert!(out.contains("Content-Length: 4"));
}

#[test]
fn target_form_enum_matches_string_rendering() {
    let raw = b"GET / HTTP/1.1\r\nHost: h\r\n\r\n";
    let mut parser = Parser::new();
    parser.parse(raw).unwrap();
    assert_eq!(parser.request().unwrap().target_form, TargetForm::Origin);
}
