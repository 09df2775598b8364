//! JSON-RPC over stdin/stdout
//!
//! Requests are written one JSON object per line to the child's stdin and
//! matched to responses read from its stdout by `id`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::ChildStdin;
use tokio::process::ChildStdout;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::DriverError;

/// JSON-RPC request
#[derive(Debug, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

/// JSON-RPC response
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: u64,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
}

/// JSON-RPC error
#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

type PendingResponse = oneshot::Sender<Result<Value, DriverError>>;

/// Request sender type alias
pub type RequestSender = mpsc::Sender<(RpcRequest, PendingResponse)>;

/// Request receiver type alias
pub type RequestReceiver = mpsc::Receiver<(RpcRequest, PendingResponse)>;

/// Global request ID counter
static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Create a new RPC request with auto-incremented ID
pub fn new_request(method: &str, params: Value) -> RpcRequest {
    RpcRequest {
        jsonrpc: "2.0",
        id: REQUEST_ID.fetch_add(1, Ordering::SeqCst),
        method: method.to_string(),
        params,
    }
}

/// Send an RPC request and wait for response
pub async fn send_request(
    request_tx: &RequestSender,
    method: &str,
    params: Value,
) -> Result<Value, DriverError> {
    let req = new_request(method, params);
    let (tx, rx) = oneshot::channel();

    request_tx
        .send((req, tx))
        .await
        .map_err(|_| DriverError::Disconnected)?;

    rx.await.map_err(|_| DriverError::Disconnected)?
}

/// Spawn the background communication task for JSON-RPC over stdin/stdout
pub fn spawn_communication_task(
    mut request_rx: RequestReceiver,
    stdin: ChildStdin,
    stdout: ChildStdout,
) {
    tokio::spawn(async move {
        let mut stdin = stdin;
        let mut reader = BufReader::new(stdout);
        let mut pending: HashMap<u64, PendingResponse> = HashMap::new();
        let mut line = String::new();

        loop {
            tokio::select! {
                request = request_rx.recv() => {
                    match request {
                        Some((req, response_tx)) => {
                            let id = req.id;
                            let json = match serde_json::to_string(&req) {
                                Ok(json) => json + "\n",
                                Err(e) => {
                                    let _ = response_tx.send(Err(DriverError::Serialization(e)));
                                    continue;
                                }
                            };
                            debug!(id, method = %req.method, "rpc request");
                            if stdin.write_all(json.as_bytes()).await.is_err() {
                                let _ = response_tx.send(Err(DriverError::Disconnected));
                                break;
                            }
                            pending.insert(id, response_tx);
                        }
                        None => break,
                    }
                }

                result = reader.read_line(&mut line) => {
                    match result {
                        Ok(0) => break,
                        Ok(_) => {
                            match serde_json::from_str::<RpcResponse>(&line) {
                                Ok(response) => {
                                    if let Some(tx) = pending.remove(&response.id) {
                                        let result = match response.error {
                                            Some(err) => Err(DriverError::ServerError(
                                                format!("[{}] {}", err.code, err.message)
                                            )),
                                            None => Ok(response.result.unwrap_or(Value::Null)),
                                        };
                                        let _ = tx.send(result);
                                    }
                                }
                                Err(_) => warn!(line = %line.trim_end(), "ignoring non-RPC output"),
                            }
                            line.clear();
                        }
                        Err(_) => break,
                    }
                }
            }
        }

        // Fail anything still waiting so callers do not hang
        for (_, tx) in pending.drain() {
            let _ = tx.send(Err(DriverError::Disconnected));
        }
    });
}
