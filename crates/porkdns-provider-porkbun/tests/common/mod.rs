//! Scripted loopback HTTP responder
//!
//! Each accepted connection consumes the next scripted reply; the request
//! path and decoded JSON body are captured for assertions.

#![allow(dead_code)]

use porkdns_core::config::Credentials;
use porkdns_provider_porkbun::PorkbunGateway;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const API_KEY: &str = "pk1_contract";
pub const SECRET_API_KEY: &str = "sk1_contract";

/// What the responder does with one connection
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with this status and body
    Json(u16, String),
    /// Read the request and never answer
    Hang,
}

impl Reply {
    pub fn ok(body: serde_json::Value) -> Self {
        Reply::Json(200, body.to_string())
    }
}

/// A request as received by the responder
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub body: serde_json::Value,
}

pub struct ScriptedServer {
    pub base_url: String,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl ScriptedServer {
    /// Bind a loopback listener and serve `replies` in order
    pub async fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let captured = Arc::new(Mutex::new(Vec::new()));
        let script = Arc::new(Mutex::new(VecDeque::from(replies)));

        let sink = Arc::clone(&captured);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let reply = script.lock().unwrap().pop_front();
                let sink = Arc::clone(&sink);
                tokio::spawn(async move {
                    serve(stream, reply, sink).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            captured,
        }
    }

    /// Gateway pointed at this server
    pub fn gateway(&self) -> PorkbunGateway {
        self.gateway_with_timeout(Duration::from_secs(5))
    }

    pub fn gateway_with_timeout(&self, timeout: Duration) -> PorkbunGateway {
        PorkbunGateway::new(
            Credentials::new(API_KEY, SECRET_API_KEY),
            Some(self.base_url.clone()),
            timeout,
        )
        .unwrap()
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    pub fn only_request(&self) -> Captured {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }
}

async fn serve(mut stream: TcpStream, reply: Option<Reply>, sink: Arc<Mutex<Vec<Captured>>>) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    sink.lock().unwrap().push(request);

    match reply {
        Some(Reply::Json(status, body)) => {
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason(status),
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        Some(Reply::Hang) => {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        None => {
            let body = r#"{"status":"ERROR","message":"unscripted request"}"#;
            let response = format!(
                "HTTP/1.1 500 Internal Server Error\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<Captured> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = serde_json::from_slice(&buf[header_end..]).unwrap_or(serde_json::Value::Null);
    Some(Captured { method, path, body })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
