//! JSON request handlers for every operation exposed over HTTP.
//!
//! Each endpoint takes a JSON object and produces either a JSON response or
//! an [`Error`] carrying the HTTP status and message to report. Handlers are
//! independent and keep no state between requests.

use crate::{
    abi,
    account::{KeyPair, PrivateKey, PublicKey},
    canonical,
    cipher::{self, Encrypted},
    hash, rlp, rpc, solc, transaction,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{
    fmt::{self, Display, Formatter},
    time::Duration,
};
use thiserror::Error;

/// Maximum accepted request body size.
pub const MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

/// An API error.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input.
    #[error("{0}")]
    Invalid(String),
    /// A cryptographic operation failed.
    #[error("{0}")]
    Crypto(String),
    /// The compiler or RPC endpoint reported an error.
    #[error("{message}")]
    Upstream {
        message: String,
        errors: Vec<String>,
    },
    #[error("unknown API endpoint {0}")]
    NotFound(String),
    #[error("method {0} not allowed, use POST")]
    MethodNotAllowed(String),
    #[error("request body exceeds {} bytes", MAX_BODY_SIZE)]
    TooLarge,
}

impl Error {
    fn invalid(err: anyhow::Error) -> Self {
        Self::Invalid(format!("{err:#}"))
    }

    fn crypto(err: anyhow::Error) -> Self {
        Self::Crypto(format!("{err:#}"))
    }

    fn upstream(message: impl Display) -> Self {
        Self::Upstream {
            message: message.to_string(),
            errors: Vec::new(),
        }
    }

    /// Returns the HTTP status code for the error.
    pub fn status(&self) -> u16 {
        match self {
            Error::Invalid(_) | Error::Upstream { .. } => 400,
            Error::NotFound(_) => 404,
            Error::MethodNotAllowed(_) => 405,
            Error::TooLarge => 413,
            Error::Crypto(_) => 500,
        }
    }

    /// Returns the JSON error body.
    pub fn body(&self) -> Value {
        let mut body = serde_json::json!({ "error": self.to_string() });
        if let Error::Upstream { errors, .. } = self {
            if !errors.is_empty() {
                body["errors"] = errors.clone().into();
            }
        }
        body
    }
}

/// An API endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endpoint {
    GenerateKeyPair,
    Sign,
    Verify,
    Encrypt,
    Decrypt,
    SignTransaction,
    EncodeFunction,
    SubmitTransaction,
    CompileSolidity,
}

impl Endpoint {
    pub const ALL: [Endpoint; 9] = [
        Endpoint::GenerateKeyPair,
        Endpoint::Sign,
        Endpoint::Verify,
        Endpoint::Encrypt,
        Endpoint::Decrypt,
        Endpoint::SignTransaction,
        Endpoint::EncodeFunction,
        Endpoint::SubmitTransaction,
        Endpoint::CompileSolidity,
    ];

    /// Returns the endpoint's URL path.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::GenerateKeyPair => "/api/generate-keypair",
            Endpoint::Sign => "/api/sign",
            Endpoint::Verify => "/api/verify",
            Endpoint::Encrypt => "/api/encrypt",
            Endpoint::Decrypt => "/api/decrypt",
            Endpoint::SignTransaction => "/api/sign-transaction",
            Endpoint::EncodeFunction => "/api/encode-function",
            Endpoint::SubmitTransaction => "/api/submit-transaction",
            Endpoint::CompileSolidity => "/api/compile-solidity",
        }
    }

    /// Finds the endpoint for a URL path.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        Self::ALL.into_iter().find(|endpoint| endpoint.path() == path)
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Handles the endpoints that talk to external collaborators.
#[derive(Clone, Debug)]
pub struct Service {
    compiler: solc::Compiler,
    rpc_timeout: Duration,
}

impl Service {
    pub fn new(compiler: solc::Compiler, rpc_timeout: Duration) -> Self {
        Self {
            compiler,
            rpc_timeout,
        }
    }

    /// Dispatches a JSON request body to an endpoint.
    pub async fn handle(&self, endpoint: Endpoint, body: Value) -> Result<Value, Error> {
        match endpoint {
            Endpoint::GenerateKeyPair => respond(generate_key_pair()),
            Endpoint::Sign => respond(sign_message(&request(body)?)),
            Endpoint::Verify => respond(verify_signature(&request(body)?)),
            Endpoint::Encrypt => respond(encrypt(&request(body)?)),
            Endpoint::Decrypt => respond(decrypt(&request(body)?)),
            Endpoint::SignTransaction => respond(sign_transaction(&request(body)?)),
            Endpoint::EncodeFunction => respond(encode_function_call(&request(body)?)),
            Endpoint::SubmitTransaction => {
                respond(submit_transaction(&request(body)?, self.rpc_timeout).await)
            }
            Endpoint::CompileSolidity => {
                respond(compile_solidity(&self.compiler, &request(body)?).await)
            }
        }
    }
}

fn request<T>(body: Value) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let body = match body {
        Value::Null => Value::Object(Default::default()),
        body => body,
    };
    serde_json::from_value(body).map_err(|err| Error::Invalid(format!("invalid request: {err}")))
}

fn respond<T>(result: Result<T, Error>) -> Result<Value, Error>
where
    T: Serialize,
{
    let response = result?;
    serde_json::to_value(response).map_err(|err| Error::Crypto(err.to_string()))
}

/// Returns the trimmed value of a field unless it is missing or blank.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn hex_field(name: &str, value: &str) -> Result<Vec<u8>, Error> {
    canonical::hex(value).map_err(|err| Error::invalid(err.context(format!("invalid {name}"))))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPairResponse {
    pub private_key: String,
    pub public_key: String,
    pub public_key_uncompressed: String,
    pub address: String,
}

impl From<&KeyPair> for KeyPairResponse {
    fn from(pair: &KeyPair) -> Self {
        let public = pair.public_key.encode_uncompressed();
        Self {
            private_key: hex::encode(pair.private_key.secret()),
            public_key: hex::encode(public),
            public_key_uncompressed: hex::encode(&public[1..]),
            address: format!("0x{}", hex::encode(*pair.address)),
        }
    }
}

/// Generates a random key pair.
pub fn generate_key_pair() -> Result<KeyPairResponse, Error> {
    let pair = KeyPair::generate().map_err(Error::crypto)?;
    Ok(KeyPairResponse::from(&pair))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub private_key_hex: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub message: String,
    pub message_hash: String,
    pub signature: MessageSignature,
}

#[derive(Debug, Serialize)]
pub struct MessageSignature {
    pub r: String,
    pub s: String,
    pub recovery: u8,
    pub full: String,
}

/// Signs the Keccak-256 digest of a UTF-8 message.
pub fn sign_message(request: &SignRequest) -> Result<SignResponse, Error> {
    let (Some(message), Some(key)) = (
        request.message.as_deref().filter(|m| !m.is_empty()),
        present(&request.private_key_hex),
    ) else {
        return Err(Error::Invalid("message and private key are required".into()));
    };
    let key = PrivateKey::from_hex(key).map_err(Error::crypto)?;
    let digest = hash::message(message);
    let signature = key.sign(digest).map_err(Error::crypto)?;

    Ok(SignResponse {
        message: message.to_owned(),
        message_hash: hex::encode(digest),
        signature: MessageSignature {
            r: hex::encode(signature.r()),
            s: hex::encode(signature.s()),
            recovery: signature.recovery_id(),
            full: signature.to_string(),
        },
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub signature_hex: Option<String>,
    #[serde(default)]
    pub public_key_hex: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    pub message: String,
    pub message_hash: String,
}

/// Verifies a 64-byte `r || s` signature of a message.
pub fn verify_signature(request: &VerifyRequest) -> Result<VerifyResponse, Error> {
    let (Some(message), Some(signature), Some(public)) = (
        request.message.as_deref().filter(|m| !m.is_empty()),
        present(&request.signature_hex),
        present(&request.public_key_hex),
    ) else {
        return Err(Error::Invalid(
            "message, signature and public key are required".into(),
        ));
    };
    let signature = hex_field("signature", signature)?;
    let public = PublicKey::from_hex(public).map_err(Error::invalid)?;
    let digest = hash::message(message);
    let is_valid = public.verify(digest, &signature).map_err(Error::invalid)?;

    Ok(VerifyResponse {
        is_valid,
        message: message.to_owned(),
        message_hash: hex::encode(digest),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub public_key_hex: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EncryptResponse {
    pub encrypted: String,
    pub iv: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

/// Encrypts a message with the demonstration public key cipher.
pub fn encrypt(request: &EncryptRequest) -> Result<EncryptResponse, Error> {
    let (Some(message), Some(public_hex)) = (
        request.message.as_deref().filter(|m| !m.is_empty()),
        present(&request.public_key_hex),
    ) else {
        return Err(Error::Invalid("message and public key are required".into()));
    };
    let public = PublicKey::from_hex(public_hex).map_err(Error::invalid)?;
    let encrypted = cipher::encrypt(&public, message.as_bytes()).map_err(Error::crypto)?;

    Ok(EncryptResponse {
        encrypted: hex::encode(encrypted.ciphertext),
        iv: hex::encode(encrypted.iv),
        public_key: public_hex.to_owned(),
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptRequest {
    #[serde(default)]
    pub encrypted: Option<String>,
    #[serde(default)]
    pub iv_hex: Option<String>,
    #[serde(default)]
    pub private_key_hex: Option<String>,
    #[serde(default)]
    pub public_key_hex: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DecryptResponse {
    pub decrypted: String,
    pub original: String,
}

/// Decrypts a message produced by [`encrypt`].
pub fn decrypt(request: &DecryptRequest) -> Result<DecryptResponse, Error> {
    let (Some(encrypted), Some(iv), Some(private), Some(public)) = (
        present(&request.encrypted),
        present(&request.iv_hex),
        present(&request.private_key_hex),
        present(&request.public_key_hex),
    ) else {
        return Err(Error::Invalid("all fields are required for decryption".into()));
    };
    let ciphertext = hex_field("ciphertext", encrypted)?;
    let iv = canonical::fixed_hex::<{ cipher::IV_LEN }>(iv)
        .map_err(|err| Error::invalid(err.context("invalid IV")))?;
    let private = PrivateKey::from_hex(private).map_err(Error::invalid)?;
    let public = PublicKey::from_hex(public).map_err(Error::invalid)?;
    let decrypted =
        cipher::decrypt(&private, &public, &Encrypted { ciphertext, iv }).map_err(Error::crypto)?;

    Ok(DecryptResponse {
        decrypted,
        original: encrypted.to_owned(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTransactionResponse {
    pub raw_transaction: RawTransaction,
    pub signed_transaction: String,
    pub transaction_hash: String,
    pub recovery_id: u8,
    pub signature: TransactionSignature,
}

/// The normalized unsigned transaction fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub nonce: String,
    pub gas_price: String,
    pub gas_limit: String,
    pub to: Option<String>,
    pub value: String,
    pub data: String,
    pub chain_id: u64,
}

#[derive(Debug, Serialize)]
pub struct TransactionSignature {
    pub r: String,
    pub s: String,
    pub v: String,
}

impl From<&transaction::SignedTransaction> for SignTransactionResponse {
    fn from(signed: &transaction::SignedTransaction) -> Self {
        let tx = &signed.transaction;
        Self {
            raw_transaction: RawTransaction {
                nonce: format!("{:#x}", tx.nonce),
                gas_price: format!("{:#x}", tx.gas_price),
                gas_limit: format!("{:#x}", tx.gas),
                to: tx.to.map(|to| format!("0x{}", hex::encode(*to))),
                value: format!("{:#x}", tx.value),
                data: format!("0x{}", hex::encode(&tx.data)),
                chain_id: tx.chain_id,
            },
            signed_transaction: format!("0x{}", hex::encode(&signed.encoded)),
            transaction_hash: format!("0x{}", hex::encode(signed.hash)),
            recovery_id: signed.signature.recovery_id(),
            signature: TransactionSignature {
                r: format!("0x{}", hex::encode(signed.signature.r())),
                s: format!("0x{}", hex::encode(signed.signature.s())),
                v: format!("{:#x}", signed.v()),
            },
        }
    }
}

/// Validates and signs a legacy EIP-155 transaction.
pub fn sign_transaction(
    request: &transaction::Request,
) -> Result<SignTransactionResponse, Error> {
    let (key, tx) = request.validate().map_err(Error::invalid)?;
    let signed = tx.sign(&key).map_err(Error::crypto)?;
    log::debug!(
        "signed transaction 0x{} from {}",
        hex::encode(signed.hash),
        key.address(),
    );
    Ok(SignTransactionResponse::from(&signed))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeFunctionRequest {
    #[serde(default)]
    pub function_signature: Option<String>,
    #[serde(default)]
    pub parameters: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeFunctionResponse {
    pub function_selector: String,
    pub encoded_parameters: String,
    pub data: String,
}

impl From<&abi::FunctionCall> for EncodeFunctionResponse {
    fn from(call: &abi::FunctionCall) -> Self {
        Self {
            function_selector: format!("0x{}", hex::encode(call.selector)),
            encoded_parameters: format!("0x{}", hex::encode(&call.arguments)),
            data: format!("0x{}", hex::encode(call.data())),
        }
    }
}

/// ABI encodes a function call.
pub fn encode_function_call(
    request: &EncodeFunctionRequest,
) -> Result<EncodeFunctionResponse, Error> {
    let signature = present(&request.function_signature)
        .ok_or_else(|| Error::Invalid("function signature is required".into()))?;
    let parameters = request.parameters.as_deref().unwrap_or_default();
    let call = abi::encode_function_call(signature, parameters).map_err(Error::invalid)?;
    Ok(EncodeFunctionResponse::from(&call))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTransactionRequest {
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub signed_transaction: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTransactionResponse {
    pub transaction_hash: String,
    pub rpc_url: String,
}

/// Broadcasts a signed transaction to a JSON-RPC endpoint.
pub async fn submit_transaction(
    request: &SubmitTransactionRequest,
    rpc_timeout: Duration,
) -> Result<SubmitTransactionResponse, Error> {
    let (Some(rpc_url), Some(signed)) = (
        present(&request.rpc_url),
        present(&request.signed_transaction),
    ) else {
        return Err(Error::Invalid(
            "RPC URL and signed transaction are required".into(),
        ));
    };
    if !signed.starts_with("0x") {
        return Err(Error::Invalid("signed transaction must start with 0x".into()));
    }
    let transaction = canonical::hex(signed)
        .map_err(|err| Error::invalid(err.context("invalid signed transaction")))?;
    match rlp::decode(&transaction) {
        Ok(rlp::Item::List(_)) => {}
        Ok(rlp::Item::Bytes(_)) => {
            return Err(Error::Invalid(
                "signed transaction is not an RLP list".into(),
            ))
        }
        Err(err) => return Err(Error::Invalid(format!("invalid signed transaction: {err}"))),
    }

    let client = rpc::Client::new(rpc_url, rpc_timeout).map_err(|err| match err {
        rpc::Error::InvalidUrl(_) => Error::Invalid(err.to_string()),
        err => Error::upstream(err),
    })?;
    let transaction_hash = client
        .send_raw_transaction(&transaction)
        .await
        .map_err(|err| {
            log::warn!("transaction submission to {rpc_url} failed: {err}");
            Error::upstream(err)
        })?;
    log::info!("submitted transaction {transaction_hash} to {rpc_url}");

    Ok(SubmitTransactionResponse {
        transaction_hash,
        rpc_url: rpc_url.to_owned(),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct CompileRequest {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResponse {
    pub bytecode: String,
    pub contract_name: String,
}

/// Compiles Solidity source code.
pub async fn compile_solidity(
    compiler: &solc::Compiler,
    request: &CompileRequest,
) -> Result<CompileResponse, Error> {
    let code = present(&request.code)
        .ok_or_else(|| Error::Invalid("Solidity code is required".into()))?;
    let contract = compiler.compile(code).await.map_err(|err| {
        log::warn!("solidity compilation failed: {err}");
        match err {
            solc::Error::Diagnostics(errors) => Error::Upstream {
                message: "Compilation errors".into(),
                errors,
            },
            err => Error::upstream(err),
        }
    })?;

    Ok(CompileResponse {
        bytecode: hex::encode(&contract.bytecode),
        contract_name: contract.name,
    })
}
