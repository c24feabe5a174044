//! Shared helpers for the integration suites: a local HTTP server with
//! byte-range support and canned failure modes, plus bundle fixtures.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write as _;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use kiosk::models::AppDescriptor;

/// How the server treats `Range` request headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMode {
    /// Serve 206 partial content, or 416 when the offset is unsatisfiable.
    Honor,
    /// Ignore the header and always replay the full body with 200.
    Ignore,
}

struct ServerState {
    routes: Mutex<HashMap<String, Vec<u8>>>,
    range_mode: Mutex<RangeMode>,
    /// Drop every connection before responding (simulated network outage).
    fail_all: AtomicBool,
    /// Send bodies without a Content-Length header.
    omit_length: AtomicBool,
    /// Declare the full length but close the socket halfway through.
    truncate: AtomicBool,
    requests: AtomicUsize,
    bytes_served: AtomicU64,
    last_range_offset: Mutex<Option<u64>>,
}

/// Minimal HTTP/1.1 server for exercising the transfer and catalog layers
/// without touching the real network.
pub struct TestServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Bind a fresh server on a loopback port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(ServerState {
            routes: Mutex::new(HashMap::new()),
            range_mode: Mutex::new(RangeMode::Honor),
            fail_all: AtomicBool::new(false),
            omit_length: AtomicBool::new(false),
            truncate: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
            bytes_served: AtomicU64::new(0),
            last_range_offset: Mutex::new(None),
        });
        let accept_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let state = Arc::clone(&accept_state);
                tokio::spawn(async move {
                    handle_connection(socket, state).await;
                });
            }
        });
        Self { addr, state, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_body(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(path.to_string(), body.into());
    }

    pub fn set_range_mode(&self, mode: RangeMode) {
        *self.state.range_mode.lock().unwrap() = mode;
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.state.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn set_omit_length(&self, omit: bool) {
        self.state.omit_length.store(omit, Ordering::SeqCst);
    }

    pub fn set_truncate(&self, truncate: bool) {
        self.state.truncate.store(truncate, Ordering::SeqCst);
    }

    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn bytes_served(&self) -> u64 {
        self.state.bytes_served.load(Ordering::SeqCst)
    }

    /// Offset of the most recent ranged request, if any.
    pub fn last_range_offset(&self) -> Option<u64> {
        *self.state.last_range_offset.lock().unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(mut socket: TcpStream, state: Arc<ServerState>) {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if state.fail_all.load(Ordering::SeqCst) {
        // Drop without responding: the client sees a connection error.
        return;
    }

    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    loop {
        let Ok(n) = socket.read(&mut tmp).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&tmp[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    let request = String::from_utf8_lossy(&buf).into_owned();
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let range_offset = request.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if !name.eq_ignore_ascii_case("range") {
            return None;
        }
        value
            .trim()
            .strip_prefix("bytes=")?
            .trim_end_matches('-')
            .parse::<u64>()
            .ok()
    });
    if range_offset.is_some() {
        *state.last_range_offset.lock().unwrap() = range_offset;
    }

    let body = state.routes.lock().unwrap().get(&path).cloned();
    let Some(body) = body else {
        let _ = socket
            .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .await;
        return;
    };

    let honor = *state.range_mode.lock().unwrap() == RangeMode::Honor;
    let total = body.len() as u64;
    let (status_line, slice_start) = match range_offset {
        Some(offset) if honor && offset >= total => {
            let _ = socket
                .write_all(
                    b"HTTP/1.1 416 Range Not Satisfiable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                )
                .await;
            return;
        }
        Some(offset) if honor => (
            format!(
                "HTTP/1.1 206 Partial Content\r\nContent-Range: bytes {offset}-{}/{total}\r\n",
                total - 1
            ),
            offset as usize,
        ),
        _ => ("HTTP/1.1 200 OK\r\n".to_string(), 0),
    };

    let slice = &body[slice_start..];
    let mut header = status_line;
    if !state.omit_length.load(Ordering::SeqCst) {
        header.push_str(&format!("Content-Length: {}\r\n", slice.len()));
    }
    header.push_str("Connection: close\r\n\r\n");
    if socket.write_all(header.as_bytes()).await.is_err() {
        return;
    }

    let truncate_after = if state.truncate.load(Ordering::SeqCst) {
        slice.len() / 2
    } else {
        slice.len()
    };

    // Dribble the body out in small pieces so clients observe multiple
    // chunks and cancellation points.
    for piece in slice[..truncate_after].chunks(1024) {
        if socket.write_all(piece).await.is_err() {
            break;
        }
        state.bytes_served.fetch_add(piece.len() as u64, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    let _ = socket.shutdown().await;
}

/// Build an in-memory zip archive from `(name, contents)` pairs.
pub fn build_bundle_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        for (name, contents) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

/// SHA-256 checksum string in descriptor wire form.
pub fn sha256_checksum(bytes: &[u8]) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(bytes)))
}

/// Build a descriptor pointing at a bundle hosted on `server`.
pub fn descriptor_for(
    server: &TestServer,
    id: &str,
    version: &str,
    bundle: &[u8],
    entry: &str,
) -> AppDescriptor {
    let path = format!("/apps/{id}/bundle.zip");
    server.set_body(&path, bundle.to_vec());
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": format!("{id} app"),
        "version": version,
        "author": "Test Vendor",
        "description": format!("integration fixture for {id}"),
        "download": server.url(&path),
        "checksum": sha256_checksum(bundle),
        "entry": entry,
        "tags": ["test"],
    }))
    .unwrap()
}
