use std::io::{self, BufRead, Read, Write};
use std::net::{TcpListener, TcpStream};

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::protocol::{JsonRpcRequest, JsonRpcResponse, PARSE_ERROR};
use crate::server::McpServer;

const MAX_BODY_BYTES: usize = 1024 * 1024;

impl McpServer {
    /// Serves JSON-RPC over stdin/stdout. Each request may be a single JSON
    /// line or a `Content-Length` framed body; replies use the same framing.
    pub fn serve_stdio(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut reader = io::BufReader::new(stdin.lock());
        let mut stdout = io::stdout().lock();
        info!("stdio transport ready");

        loop {
            let (payload, frame) = match next_stdio_message(&mut reader)? {
                StdioMessage::Closed => break,
                StdioMessage::Payload { body, frame } => (body, frame),
                StdioMessage::Rejected { reason, frame } => {
                    warn!(%reason, "invalid stdio frame");
                    let response = JsonRpcResponse::error(
                        Value::Null,
                        PARSE_ERROR,
                        format!("invalid stdio frame: {reason}"),
                    );
                    write_stdio_response(&mut stdout, &response, frame)?;
                    continue;
                }
            };

            let request: JsonRpcRequest = match serde_json::from_slice(&payload) {
                Ok(v) => v,
                Err(err) => {
                    let response =
                        JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {err}"));
                    write_stdio_response(&mut stdout, &response, frame)?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request) {
                write_stdio_response(&mut stdout, &response, frame)?;
            }
        }

        info!("stdin closed, stdio transport stopping");
        Ok(())
    }

    pub fn serve_http(&self, addr: &str) -> io::Result<()> {
        let listener = TcpListener::bind(addr)?;
        info!(addr = %listener.local_addr()?, "http transport listening");
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(err) = self.handle_http_connection(stream) {
                        warn!(error = %err, "http request error");
                    }
                }
                Err(err) => {
                    warn!(error = %err, "http accept error");
                }
            }
        }
        Ok(())
    }

    fn handle_http_connection(&self, mut stream: TcpStream) -> io::Result<()> {
        let Some(req) = read_http_request(&stream)? else {
            return Ok(());
        };
        debug!(method = %req.method, path = %req.path, "http request");
        self.dispatch_http_request(&req).write_to(&mut stream)
    }

    fn dispatch_http_request(&self, req: &HttpRequest) -> HttpResponse {
        match (req.method.as_str(), req.path.as_str()) {
            ("GET", "/health") => HttpResponse::json(200, &json!({"status": "ok"})),
            ("GET", "/") => HttpResponse::text(200, "text/plain; charset=utf-8", banner()),
            ("POST", "/mcp" | "/") => self.dispatch_rpc(&req.body),
            (_, "/health" | "/mcp" | "/") => HttpResponse::json(
                405,
                &json!({"error": "method_not_allowed", "message": format!("{} not allowed on {}", req.method, req.path)}),
            ),
            _ => HttpResponse::json(
                404,
                &json!({"error": "not_found", "message": format!("no route for {}", req.path)}),
            ),
        }
    }

    fn dispatch_rpc(&self, body: &[u8]) -> HttpResponse {
        let rpc: JsonRpcRequest = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(err) => {
                let response =
                    JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {err}"));
                return HttpResponse::rpc(400, &response);
            }
        };
        match self.handle_request(rpc) {
            Some(response) => HttpResponse::rpc(200, &response),
            None => HttpResponse::empty(204),
        }
    }
}

fn banner() -> String {
    format!(
        "job-portal-mcp {}\nPOST JSON-RPC 2.0 requests to /mcp\nGET /health for liveness\n",
        env!("CARGO_PKG_VERSION")
    )
}

#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

struct HttpResponse {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl HttpResponse {
    fn json(status: u16, value: &Value) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn rpc(status: u16, response: &JsonRpcResponse) -> Self {
        match serde_json::to_vec(response) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(_) => Self::json(
                500,
                &json!({"error": "internal_error", "message": "failed to serialize rpc response"}),
            ),
        }
    }

    fn text(status: u16, content_type: &'static str, body: String) -> Self {
        Self {
            status,
            content_type,
            body: body.into_bytes(),
        }
    }

    const fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: Vec::new(),
        }
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(
            out,
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            http_reason_phrase(self.status),
            self.content_type,
            self.body.len()
        )?;
        out.write_all(&self.body)?;
        out.flush()
    }
}

fn read_http_request(stream: &TcpStream) -> io::Result<Option<HttpRequest>> {
    let mut reader = io::BufReader::new(stream.try_clone()?);
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let first = line.trim_end_matches(['\r', '\n']);
    if first.is_empty() {
        return Ok(None);
    }

    let mut parts = first.split_whitespace();
    let Some(method) = parts.next() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid http request line (missing method)",
        ));
    };
    let Some(target) = parts.next() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid http request line (missing path)",
        ));
    };
    let path = target.split_once('?').map_or(target, |(path, _)| path);

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 {
            break;
        }
        let header = header.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }
        if let Some(FrameHeader::ContentLength(Some(v))) = frame_header(header) {
            content_length = v;
        }
    }
    if content_length > MAX_BODY_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("request body of {content_length} bytes exceeds {MAX_BODY_BYTES}"),
        ));
    }

    let mut body = vec![0_u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body)?;
    }
    Ok(Some(HttpRequest {
        method: method.to_string(),
        path: path.to_string(),
        body,
    }))
}

const fn http_reason_phrase(status: u16) -> &'static str {
    match status {
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StdioFrame {
    LineDelimited,
    ContentLength,
}

/// One inbound stdio message with the framing the reply should use.
#[derive(Debug, PartialEq, Eq)]
enum StdioMessage {
    Payload { body: Vec<u8>, frame: StdioFrame },
    Rejected { reason: String, frame: StdioFrame },
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameHeader {
    /// `None` when the value is not a valid length.
    ContentLength(Option<usize>),
    ContentType,
}

fn frame_header(line: &str) -> Option<FrameHeader> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.eq_ignore_ascii_case("content-length") {
        Some(FrameHeader::ContentLength(value.trim().parse().ok()))
    } else if name.eq_ignore_ascii_case("content-type") {
        Some(FrameHeader::ContentType)
    } else {
        None
    }
}

/// Reads the next message, skipping blank lines. A line that opens with a
/// frame header starts a `Content-Length` frame; anything else is one JSON line.
fn next_stdio_message<R: BufRead>(reader: &mut R) -> io::Result<StdioMessage> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(StdioMessage::Closed);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).trim_start();
        if trimmed.is_empty() {
            continue;
        }
        return match frame_header(trimmed) {
            Some(first) => read_framed_body(reader, first),
            None => Ok(StdioMessage::Payload {
                body: trimmed.as_bytes().to_vec(),
                frame: StdioFrame::LineDelimited,
            }),
        };
    }
}

fn read_framed_body<R: BufRead>(reader: &mut R, first: FrameHeader) -> io::Result<StdioMessage> {
    let rejected = |reason: String, frame: StdioFrame| -> io::Result<StdioMessage> {
        Ok(StdioMessage::Rejected { reason, frame })
    };

    let mut length = match first {
        FrameHeader::ContentLength(v) => v,
        FrameHeader::ContentType => None,
    };
    let mut raw = String::new();
    loop {
        raw.clear();
        if reader.read_line(&mut raw)? == 0 {
            return rejected(
                "unexpected eof while reading frame headers".to_string(),
                StdioFrame::LineDelimited,
            );
        }
        let header = raw.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }
        if let Some(FrameHeader::ContentLength(Some(v))) = frame_header(header) {
            length = Some(v);
        }
    }

    let Some(length) = length else {
        return rejected("missing content-length header".to_string(), StdioFrame::LineDelimited);
    };
    if length > MAX_BODY_BYTES {
        return rejected(
            format!("frame body of {length} bytes exceeds {MAX_BODY_BYTES}"),
            StdioFrame::ContentLength,
        );
    }

    let mut body = vec![0_u8; length];
    match reader.read_exact(&mut body) {
        Ok(()) => Ok(StdioMessage::Payload {
            body,
            frame: StdioFrame::ContentLength,
        }),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            rejected(format!("truncated frame body: {err}"), StdioFrame::ContentLength)
        }
        Err(err) => Err(err),
    }
}

fn write_stdio_response<W: Write>(
    out: &mut W,
    response: &JsonRpcResponse,
    frame: StdioFrame,
) -> io::Result<()> {
    let serialized = serde_json::to_vec(response)?;
    match frame {
        StdioFrame::LineDelimited => {
            out.write_all(&serialized)?;
            out.write_all(b"\n")?;
        }
        StdioFrame::ContentLength => {
            write!(out, "Content-Length: {}\r\n\r\n", serialized.len())?;
            out.write_all(&serialized)?;
        }
    }
    out.flush()
}
