use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser as ClapParser};
use log::{debug, trace};

use wireframe::{
    format_debug, format_headers_only, format_json, BodyProgress, Config, ConfigFlags,
    OwnedRequest, ParseProgress, Parser as RequestParser,
};

/// wireframe CLI -- strict HTTP/1.1 request parser.
///
/// Reads a raw HTTP request from a file, --raw string, or stdin and outputs
/// a structured representation in the chosen format.
///
/// Escape sequences (\r, \n, \t, \\) in the --raw value are interpreted so
/// you can pass a full HTTP request as a single shell argument.
#[derive(ClapParser)]
#[command(name = "wireframe-cli", version, about, long_about = None)]
struct Cli {
    /// Path to a file containing a raw HTTP request.
    /// Reads from stdin when neither FILE nor --raw is given.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Raw HTTP request string (escape sequences \r \n \t \\ are expanded).
    #[arg(long)]
    raw: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "json", value_enum)]
    format: OutputFormat,

    /// Pretty-print JSON output (ignored for other formats).
    #[arg(short, long)]
    pretty: bool,

    /// Maximum allowed body size in bytes.
    #[arg(long, default_value = "10485760")]
    max_body_size: u64,

    /// Maximum number of headers allowed.
    #[arg(long, default_value = "128")]
    max_headers: u32,

    /// Tolerate a bare LF as a line terminator instead of requiring CRLF.
    #[arg(long)]
    tolerate_bare_lf: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable debug output
    Debug,
    /// Request-line + headers only
    Headers,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.file.is_none() && cli.raw.is_none() && std::io::stdin().is_terminal() {
        Cli::command().print_help().ok();
        println!();
        process::exit(0);
    }

    let data = match read_input(&cli) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(1);
        }
    };

    if data.is_empty() {
        eprintln!("Error: empty input");
        process::exit(1);
    }
    debug!("read {} bytes of input", data.len());

    let mut flags = ConfigFlags::STRICT_CRLF
        | ConfigFlags::REJECT_OBS_FOLD
        | ConfigFlags::ALLOW_OBS_TEXT
        | ConfigFlags::ALLOW_LEADING_CRLF
        | ConfigFlags::REJECT_TE_CL_CONFLICT;
    if cli.tolerate_bare_lf {
        flags = ConfigFlags::REJECT_OBS_FOLD
            | ConfigFlags::ALLOW_OBS_TEXT
            | ConfigFlags::ALLOW_LEADING_CRLF
            | ConfigFlags::REJECT_TE_CL_CONFLICT;
    }
    let config = Config {
        max_body_size: cli.max_body_size,
        max_header_count: cli.max_headers,
        flags,
        ..Config::default()
    };

    let owned = match parse_all(&data, config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Parse error: {e}");
            process::exit(2);
        }
    };

    let output = match cli.format {
        OutputFormat::Json => format_json(&owned, cli.pretty),
        OutputFormat::Debug => format_debug(&owned),
        OutputFormat::Headers => format_headers_only(&owned),
    };

    print!("{output}");
}

/// Drive a [`RequestParser`] to completion over an already-fully-read
/// buffer, since the CLI has no streaming source of its own.
fn parse_all(data: &[u8], config: Config) -> Result<OwnedRequest, String> {
    let mut parser = RequestParser::with_config(config);
    if parser.parse(data).map_err(|e| e.to_string())? != ParseProgress::Ready {
        return Err("incomplete request: more data expected".to_string());
    }
    trace!("head parsed, state={:?}", parser.state());

    let mut body = Vec::new();
    loop {
        match parser.read_body(data).map_err(|e| e.to_string())? {
            BodyProgress::Data(chunk) => body.extend_from_slice(chunk),
            BodyProgress::Complete => break,
            BodyProgress::NeedMoreData => {
                return Err("incomplete request: body truncated".to_string());
            }
        }
    }

    let req = parser.request().expect("head is Ready");
    let body = if body.is_empty() { None } else { Some(body) };
    Ok(OwnedRequest::from_request(req, data, body))
}

/// Read raw HTTP bytes from --raw, a file, or stdin.
fn read_input(cli: &Cli) -> Result<Vec<u8>, std::io::Error> {
    if let Some(raw) = &cli.raw {
        return Ok(unescape(raw).into_bytes());
    }
    match &cli.file {
        Some(path) => std::fs::read(path),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Expand C-style escape sequences (`\r`, `\n`, `\t`, `\\`) in a string.
///
/// Any other `\X` sequence is kept as-is (both the backslash and `X`).
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('r') => out.push('\r'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
