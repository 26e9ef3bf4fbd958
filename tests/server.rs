mod util;

use keylab::{
    api::{self, Service},
    rlp, rpc, server,
    solc::{self, Compiler},
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Starts a server on an ephemeral port and returns its base URL.
async fn start() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let service = Service::new(
        Compiler::new("/nonexistent/keylab-solc", solc::DEFAULT_TIMEOUT),
        rpc::DEFAULT_TIMEOUT,
    );
    tokio::spawn(server::serve(listener, service));
    url
}

async fn post(url: &str, body: impl Into<reqwest::Body>) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(url)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn signs_transactions() {
    let url = start().await;
    let request = json!({
        "to": "0x0000000000000000000000000000000000000000",
        "value": "1.0",
        "nonce": "0",
        "gasPrice": "20",
        "gasLimit": "21000",
        "chainId": "11155111",
        "privateKey": hex::encode(util::PRIVATE_KEY),
    });

    let (status, body) = post(&format!("{url}/api/sign-transaction"), request.to_string()).await;
    assert_eq!(status, 200);
    assert_eq!(
        body["transactionHash"],
        "0xcc0e555ff3ae25e77418e582563df03ac1c11f797efa401acc9447ded73ca793"
    );
}

#[tokio::test]
async fn generates_key_pairs_without_body() {
    let url = start().await;
    let (status, body) = post(&format!("{url}/api/generate-keypair"), "").await;
    assert_eq!(status, 200);
    assert!(body["address"].as_str().unwrap().starts_with("0x"));
}

#[tokio::test]
async fn reports_errors_as_json() {
    let url = start().await;

    let (status, body) = post(&format!("{url}/api/unknown"), "{}").await;
    assert_eq!(status, 404);
    assert!(body["error"].is_string());

    let (status, body) = post(&format!("{url}/api/sign"), "{ not json").await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("invalid JSON"));

    let (status, body) = post(&format!("{url}/api/sign"), r#"{ "message": "hi" }"#).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "message and private key are required");

    let response = reqwest::get(format!("{url}/api/sign")).await.unwrap();
    assert_eq!(response.status().as_u16(), 405);
}

#[tokio::test]
async fn reports_compiler_failures() {
    let url = start().await;
    let (status, body) = post(
        &format!("{url}/api/compile-solidity"),
        json!({ "code": "contract A {}" }).to_string(),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("failed to run solidity compiler"));
}

#[tokio::test]
async fn rejects_oversized_bodies() {
    let url = start().await;
    let (status, body) = post(
        &format!("{url}/api/sign"),
        vec![b' '; api::MAX_BODY_SIZE + 1],
    )
    .await;
    assert_eq!(status, 413);
    assert!(body["error"].as_str().unwrap().contains("exceeds"));
}

#[tokio::test]
async fn rejects_deeply_nested_transactions() {
    let url = start().await;

    let mut prefixes = Vec::new();
    let mut size = 0;
    for _ in 0..200_000 {
        let prefix = rlp::len(size, 0xc0);
        size += prefix.len();
        prefixes.push(prefix);
    }
    let transaction = prefixes.into_iter().rev().flatten().collect::<Vec<_>>();

    let (status, body) = post(
        &format!("{url}/api/submit-transaction"),
        json!({
            "rpcUrl": "http://127.0.0.1:8545",
            "signedTransaction": format!("0x{}", hex::encode(transaction)),
        })
        .to_string(),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("nested"));
}
