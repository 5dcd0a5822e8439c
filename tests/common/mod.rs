//! Shared helpers for harness integration tests
//!
//! Provides a scripted JSON-RPC stub server speaking just enough HTTP/1.1
//! for the harness's one-shot probe client, plus config builders rooted in
//! temp directories.

use localnet_harness::config::{CommandSpec, PhaseCommands, RunConfig};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// One scripted reply from the stub server
#[allow(dead_code)]
pub enum StubResponse {
    /// Valid envelope with this `result` value
    Result(Value),
    /// Valid envelope carrying a JSON-RPC error object
    Error { code: i64, message: &'static str },
    /// Read the request, then close the connection without answering
    Refuse,
    /// 200 OK with an arbitrary (possibly non-envelope) body
    Raw(&'static str),
}

/// Serves scripted responses in order and records the method of every
/// request it sees. Once the script is exhausted it refuses further calls.
pub struct StubRpcServer {
    pub endpoint: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubRpcServer {
    pub async fn start(script: Vec<StubResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let calls = Arc::new(Mutex::new(Vec::new()));
        let calls_srv = calls.clone();

        tokio::spawn(async move {
            let mut script = script.into_iter();
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let Some(request_body) = read_request_body(&mut socket).await else {
                    continue;
                };
                let method = serde_json::from_str::<Value>(&request_body)
                    .ok()
                    .and_then(|v| v["method"].as_str().map(str::to_string))
                    .unwrap_or_default();
                calls_srv.lock().await.push(method);

                match script.next() {
                    Some(StubResponse::Result(result)) => {
                        let body =
                            json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string();
                        write_response(&mut socket, &body).await;
                    }
                    Some(StubResponse::Error { code, message }) => {
                        let body = json!({
                            "jsonrpc": "2.0",
                            "id": 1,
                            "error": {"code": code, "message": message},
                        })
                        .to_string();
                        write_response(&mut socket, &body).await;
                    }
                    Some(StubResponse::Raw(body)) => {
                        write_response(&mut socket, body).await;
                    }
                    Some(StubResponse::Refuse) | None => {
                        // Close without a response; the client sees a
                        // connection error and retries.
                    }
                }
            }
        });

        Self { endpoint, calls }
    }

    /// Methods of every request received, in arrival order
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

/// An endpoint that refuses every connection (nothing listening)
#[allow(dead_code)]
pub async fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    endpoint
}

async fn read_request_body(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let header_end = buf.windows(4).position(|w| w == b"\r\n\r\n");
        if let Some(pos) = header_end {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let content_length: usize = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse().ok())?;
            let body_start = pos + 4;
            while buf.len() < body_start + content_length {
                let n = socket.read(&mut chunk).await.ok()?;
                if n == 0 {
                    return None;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            return Some(
                String::from_utf8_lossy(&buf[body_start..body_start + content_length])
                    .into_owned(),
            );
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

async fn write_response(socket: &mut TcpStream, body: &str) {
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Commands that succeed immediately without side effects
#[allow(dead_code)]
pub fn noop_commands() -> PhaseCommands {
    PhaseCommands {
        build: CommandSpec::new("true", Vec::<String>::new()),
        deploy: CommandSpec::new("true", Vec::<String>::new()),
        unit_tests: CommandSpec::new("true", Vec::<String>::new()),
        functional_tests: CommandSpec::new("true", Vec::<String>::new()),
    }
}

/// A command that records its execution by creating `marker`
#[allow(dead_code)]
pub fn marker_command(marker: &Path) -> CommandSpec {
    CommandSpec::new("touch", [marker.display().to_string()])
}

/// A RunConfig rooted in `root` with fast polling, no build, both suites
/// enabled, and no-op commands. Tests override the pieces they exercise.
#[allow(dead_code)]
pub fn test_config(root: &Path, endpoints: Vec<String>) -> RunConfig {
    let network_dir = root.join("localnet");
    std::fs::create_dir_all(&network_dir).unwrap();
    let workflow_fixture = root.join("workflows.json");
    std::fs::write(&workflow_fixture, r#"{"workflows": []}"#).unwrap();

    RunConfig {
        build: false,
        keep_alive: false,
        run_unit_tests: true,
        run_functional_tests: true,
        state_dir: network_dir.join("data"),
        network_dir,
        log_dir: root.join("logs"),
        workflow_fixture,
        endpoints,
        node_pattern: "no-such-process-pattern-8d31".to_string(),
        poll_interval: Duration::from_millis(10),
        ready_timeout: Duration::from_millis(200),
        rpc_request_timeout: Duration::from_millis(500),
        commands: noop_commands(),
    }
}
