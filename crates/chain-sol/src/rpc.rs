//! JSON-RPC client for a Solana node.
//!
//! [`RpcTransport`] is the seam between the typed client and the network:
//! [`HttpTransport`] posts JSON-RPC 2.0 requests with `reqwest`, tests plug
//! in canned responses. Transport failures and timeouts surface as
//! `RemoteUnavailable`, error objects returned by the node as `SolError::Rpc`
//! and results of an unexpected shape as `MalformedResponse`, so callers can
//! tell them apart.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::address::Address;
use crate::config::{ChainConfig, Commitment};
use crate::error::SolError;
use crate::signature::Signature;
use crate::transaction::Blockhash;

/// JSON-RPC error code for a transaction that failed preflight simulation.
pub const PREFLIGHT_FAILURE: i64 = -32002;
/// JSON-RPC error code for a transaction whose signatures do not verify.
pub const SIGNATURE_VERIFICATION_FAILURE: i64 = -32003;
/// JSON-RPC error code for malformed parameters.
pub const INVALID_PARAMS: i64 = -32602;

/// Sends one JSON-RPC call and returns its `result` member.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value, SolError>;
}

// ---------------------------------------------------------------------------
// HTTP transport
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcErrorObject {
    fn into_error(self) -> SolError {
        // Preflight failures carry the simulation error and logs in `data`.
        let detail = self
            .data
            .as_ref()
            .and_then(|d| d.get("err"))
            .filter(|e| !e.is_null())
            .map(|e| format!(" ({e})"))
            .unwrap_or_default();
        SolError::Rpc {
            code: self.code,
            message: format!("{}{detail}", self.message),
        }
    }
}

/// `reqwest`-backed transport with a per-request timeout.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SolError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| SolError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, SolError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, id, url = %self.url, "sending rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(method, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SolError::RemoteUnavailable(format!(
                "{method}: HTTP {status}"
            )));
        }

        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| transport_error(method, e))?;

        if let Some(error) = envelope.error {
            tracing::debug!(method, code = error.code, message = %error.message, "rpc error response");
            return Err(error.into_error());
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }
}

fn transport_error(method: &str, e: reqwest::Error) -> SolError {
    if e.is_timeout() {
        SolError::RemoteUnavailable(format!("{method}: request timed out"))
    } else if e.is_decode() {
        SolError::RemoteUnavailable(format!("{method}: malformed response: {e}"))
    } else {
        SolError::RemoteUnavailable(format!("{method}: {e}"))
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

/// Token amount as reported by `getTokenAccountBalance`.
///
/// Every field is optional; the balance reader uses whichever is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    /// Raw base-unit amount as a decimal string.
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub ui_amount_string: Option<String>,
}

/// Account fetched with `getAccountInfo`, data already base64-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub lamports: u64,
    pub owner: Address,
    pub data: Vec<u8>,
}

#[derive(Deserialize)]
struct RawAccountInfo {
    lamports: u64,
    owner: Address,
    data: (String, String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestBlockhash {
    blockhash: String,
}

/// Confirmation details of an indexed transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedTxInfo {
    pub slot: u64,
    /// Unix timestamp assigned by the cluster, when known.
    pub block_time: Option<i64>,
    /// On-chain execution error, `None` when the transaction succeeded.
    pub err: Option<Value>,
    pub fee: Option<u64>,
}

impl ConfirmedTxInfo {
    pub fn succeeded(&self) -> bool {
        self.err.is_none()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    slot: u64,
    #[serde(default)]
    block_time: Option<i64>,
    #[serde(default)]
    meta: Option<RawTransactionMeta>,
}

#[derive(Deserialize)]
struct RawTransactionMeta {
    #[serde(default)]
    err: Option<Value>,
    #[serde(default)]
    fee: Option<u64>,
}

/// Entry of a `getSignatureStatuses` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    /// True once the status has reached at least `level`.
    pub fn reached(&self, level: Commitment) -> bool {
        let rank = |c: Commitment| match c {
            Commitment::Processed => 0,
            Commitment::Confirmed => 1,
            Commitment::Finalized => 2,
        };
        self.confirmation_status
            .map(|status| rank(status) >= rank(level))
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Typed client
// ---------------------------------------------------------------------------

/// Typed Solana RPC client. Cheap to clone; holds no mutable state.
#[derive(Clone)]
pub struct SolanaRpc {
    transport: Arc<dyn RpcTransport>,
    commitment: Commitment,
}

impl SolanaRpc {
    pub fn new(transport: Arc<dyn RpcTransport>, commitment: Commitment) -> Self {
        Self {
            transport,
            commitment,
        }
    }

    /// HTTP client for the node and timeout in `config`.
    pub fn from_config(config: &ChainConfig) -> Result<Self, SolError> {
        let transport = HttpTransport::new(config.rpc_url.clone(), config.request_timeout())?;
        Ok(Self::new(Arc::new(transport), config.commitment))
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, SolError> {
        let result = self.transport.call(method, params).await?;
        serde_json::from_value(result).map_err(|e| {
            SolError::MalformedResponse(format!("{method}: unexpected response shape: {e}"))
        })
    }

    /// Native balance in lamports.
    pub async fn get_balance(&self, address: &Address) -> Result<u64, SolError> {
        let response: WithContext<u64> = self
            .request(
                "getBalance",
                json!([address.to_string(), { "commitment": self.commitment.as_str() }]),
            )
            .await?;
        Ok(response.value)
    }

    /// Structured balance of a token account.
    ///
    /// Nodes answer with an error object when the account does not exist.
    pub async fn get_token_account_balance(
        &self,
        token_account: &Address,
    ) -> Result<Option<UiTokenAmount>, SolError> {
        let response: WithContext<Option<UiTokenAmount>> = self
            .request(
                "getTokenAccountBalance",
                json!([token_account.to_string(), { "commitment": self.commitment.as_str() }]),
            )
            .await?;
        Ok(response.value)
    }

    /// Raw account, or `None` when it does not exist.
    pub async fn get_account_info(&self, address: &Address) -> Result<Option<AccountInfo>, SolError> {
        let response: WithContext<Option<RawAccountInfo>> = self
            .request(
                "getAccountInfo",
                json!([
                    address.to_string(),
                    { "encoding": "base64", "commitment": self.commitment.as_str() }
                ]),
            )
            .await?;

        let Some(raw) = response.value else {
            return Ok(None);
        };
        let (encoded, encoding) = raw.data;
        if encoding != "base64" {
            return Err(SolError::RemoteUnavailable(format!(
                "getAccountInfo: unexpected data encoding {encoding}"
            )));
        }
        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| SolError::RemoteUnavailable(format!("getAccountInfo: bad base64: {e}")))?;

        Ok(Some(AccountInfo {
            lamports: raw.lamports,
            owner: raw.owner,
            data,
        }))
    }

    pub async fn get_latest_blockhash(&self) -> Result<Blockhash, SolError> {
        let response: WithContext<LatestBlockhash> = self
            .request(
                "getLatestBlockhash",
                json!([{ "commitment": self.commitment.as_str() }]),
            )
            .await?;
        response
            .value
            .blockhash
            .parse()
            .map_err(|e| SolError::RemoteUnavailable(format!("getLatestBlockhash: {e}")))
    }

    /// Submit signed wire bytes with preflight simulation enabled.
    pub async fn send_transaction(
        &self,
        wire: &[u8],
        preflight_commitment: Commitment,
    ) -> Result<Signature, SolError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(wire);
        let signature: String = self
            .request(
                "sendTransaction",
                json!([
                    encoded,
                    {
                        "encoding": "base64",
                        "skipPreflight": false,
                        "preflightCommitment": preflight_commitment.as_str(),
                    }
                ]),
            )
            .await?;
        signature
            .parse()
            .map_err(|e| SolError::RemoteUnavailable(format!("sendTransaction: {e}")))
    }

    /// Look up a transaction. `None` until the node has indexed it.
    pub async fn get_transaction(
        &self,
        signature: &Signature,
    ) -> Result<Option<ConfirmedTxInfo>, SolError> {
        // getTransaction does not accept "processed".
        let commitment = match self.commitment {
            Commitment::Processed => Commitment::Confirmed,
            other => other,
        };
        let raw: Option<RawTransaction> = self
            .request(
                "getTransaction",
                json!([
                    signature.to_string(),
                    {
                        "encoding": "json",
                        "commitment": commitment.as_str(),
                        "maxSupportedTransactionVersion": 0,
                    }
                ]),
            )
            .await?;

        Ok(raw.map(|tx| {
            let (err, fee) = match tx.meta {
                Some(meta) => (meta.err.filter(|e| !e.is_null()), meta.fee),
                None => (None, None),
            };
            ConfirmedTxInfo {
                slot: tx.slot,
                block_time: tx.block_time,
                err,
                fee,
            }
        }))
    }

    pub async fn get_signature_statuses(
        &self,
        signatures: &[Signature],
    ) -> Result<Vec<Option<SignatureStatus>>, SolError> {
        let texts: Vec<String> = signatures.iter().map(ToString::to_string).collect();
        let response: WithContext<Vec<Option<SignatureStatus>>> = self
            .request(
                "getSignatureStatuses",
                json!([texts, { "searchTransactionHistory": true }]),
            )
            .await?;
        Ok(response.value)
    }
}
