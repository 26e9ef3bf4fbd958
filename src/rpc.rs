//! Minimal Ethereum JSON-RPC client for broadcasting signed transactions.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Default timeout for a single RPC request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An error that occurred talking to a JSON-RPC endpoint.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid RPC URL '{0}': expected an http or https URL")]
    InvalidUrl(String),
    #[error("RPC request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("RPC endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid JSON response from RPC: {0}")]
    InvalidResponse(String),
    #[error("{message}")]
    Rpc { code: Option<i64>, message: String },
    #[error("no transaction hash returned from RPC")]
    MissingResult,
}

/// A JSON-RPC client bound to a single endpoint.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    url: reqwest::Url,
}

impl Client {
    /// Creates a client for an `http` or `https` endpoint. The timeout
    /// covers each request from connection to the end of the response.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, Error> {
        let parsed = reqwest::Url::parse(url.trim()).map_err(|_| Error::InvalidUrl(url.into()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(url.into()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url: parsed })
    }

    /// Returns the endpoint URL.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Executes a JSON-RPC 2.0 method call.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, Error>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });
        log::debug!("sending {method} to {}", self.url);

        let response = self.http.post(self.url.clone()).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let value = match serde_json::from_str::<Value>(&body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Err(Error::Status {
                    status: status.as_u16(),
                    body,
                })
            }
            Err(err) => return Err(Error::InvalidResponse(err.to_string())),
        };

        let result = result(value)?;
        serde_json::from_value(result).map_err(|err| Error::InvalidResponse(err.to_string()))
    }

    /// Broadcasts a signed transaction with `eth_sendRawTransaction`,
    /// returning the transaction hash reported by the node.
    pub async fn send_raw_transaction(&self, transaction: &[u8]) -> Result<String, Error> {
        let raw = format!("0x{}", hex::encode(transaction));
        self.call::<_, Option<String>>("eth_sendRawTransaction", [raw])
            .await?
            .filter(|hash| !hash.is_empty())
            .ok_or(Error::MissingResult)
    }
}

/// Extracts the `result` of a JSON-RPC response, turning an `error` member
/// into an [`Error::Rpc`].
fn result(response: Value) -> Result<Value, Error> {
    let mut object = match response {
        Value::Object(object) => object,
        response => {
            return Err(Error::InvalidResponse(format!(
                "expected JSON object but got {response}"
            )))
        }
    };
    match object.remove("error") {
        None | Some(Value::Null) => {}
        Some(error) => {
            let message = match error.get("message").and_then(Value::as_str) {
                Some(message) => message.to_owned(),
                None => format!("RPC error: {error}"),
            };
            return Err(Error::Rpc {
                code: error.get("code").and_then(Value::as_i64),
                message,
            });
        }
    }
    object.remove("result").ok_or(Error::MissingResult)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt as _, AsyncWriteExt as _},
        net::TcpListener,
    };

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            Client::new("ftp://example.com", DEFAULT_TIMEOUT),
            Err(Error::InvalidUrl(_)),
        ));
        assert!(matches!(
            Client::new("not a url", DEFAULT_TIMEOUT),
            Err(Error::InvalidUrl(_)),
        ));
        assert!(Client::new("https://rpc.sepolia.org", DEFAULT_TIMEOUT).is_ok());
    }

    #[test]
    fn response_results() {
        assert_eq!(
            result(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x1234" })).unwrap(),
            json!("0x1234"),
        );
        assert_eq!(
            result(json!({ "jsonrpc": "2.0", "id": 1, "result": null, "error": null })).unwrap(),
            Value::Null,
        );
        assert!(matches!(
            result(json!({ "jsonrpc": "2.0", "id": 1 })),
            Err(Error::MissingResult),
        ));
        assert!(matches!(result(json!([])), Err(Error::InvalidResponse(_))));
    }

    #[test]
    fn response_errors() {
        let err = result(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "nonce too low" },
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "nonce too low");
        assert!(matches!(err, Error::Rpc { code: Some(-32000), .. }));

        let err = result(json!({ "error": "boom" })).unwrap_err();
        assert_eq!(err.to_string(), r#"RPC error: "boom""#);
    }

    /// Serves a single canned HTTP response and returns the request it
    /// received.
    async fn serve_once(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buffer = [0; 4096];
            loop {
                let n = stream.read(&mut buffer).await.unwrap();
                request.extend_from_slice(&buffer[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some((head, content)) = text.split_once("\r\n\r\n") {
                    let length = head
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if content.len() >= length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len(),
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8(request).unwrap()
        });
        (url, handle)
    }

    #[tokio::test]
    async fn sends_raw_transaction() {
        let (url, server) =
            serve_once(r#"{"jsonrpc":"2.0","id":1,"result":"0xcc0e555f"}"#).await;
        let client = Client::new(&url, DEFAULT_TIMEOUT).unwrap();
        let hash = client.send_raw_transaction(&[0xf8, 0x6c]).await.unwrap();
        assert_eq!(hash, "0xcc0e555f");

        let request = server.await.unwrap();
        let body = request.split_once("\r\n\r\n").unwrap().1;
        assert_eq!(
            serde_json::from_str::<Value>(body).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "method": "eth_sendRawTransaction",
                "params": ["0xf86c"],
                "id": 1,
            }),
        );
    }

    #[tokio::test]
    async fn reports_rpc_errors() {
        let (url, _server) = serve_once(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"insufficient funds"}}"#,
        )
        .await;
        let client = Client::new(&url, DEFAULT_TIMEOUT).unwrap();
        let err = client.send_raw_transaction(&[0x80]).await.unwrap_err();
        assert_eq!(err.to_string(), "insufficient funds");
    }
}
