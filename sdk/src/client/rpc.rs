//! JSON-RPC implementation of the ledger gateway.
//!
//! Speaks the Solana JSON-RPC protocol over HTTP: `getAccountInfo`,
//! `getProgramAccounts`, `getLatestBlockhash`, `sendTransaction`, and
//! `getSignatureStatuses`. Responses and error payloads are normalized
//! into [`ClientError`] here, including extraction of structured custom
//! program error codes from `data.err`.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use solana_sdk::{hash::Hash, pubkey::Pubkey, transaction::Transaction};

use super::config::ClientConfig;
use super::error::ClientError;
use super::LedgerGateway;

/// Interval between confirmation polls.
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    data: Option<serde_json::Value>,
}

/// Responses wrapped in `{context, value}`.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

/// Raw account payload.
#[derive(Debug, Deserialize)]
struct AccountValue {
    data: (String, String),
}

/// One entry from `getProgramAccounts`.
#[derive(Debug, Deserialize)]
struct KeyedAccount {
    pubkey: String,
    account: AccountValue,
}

/// `getLatestBlockhash` payload.
#[derive(Debug, Deserialize)]
struct BlockhashValue {
    blockhash: String,
}

/// One entry from `getSignatureStatuses`.
#[derive(Debug, Deserialize)]
struct SignatureStatus {
    err: Option<serde_json::Value>,
    #[serde(rename = "confirmationStatus")]
    confirmation_status: Option<String>,
}

/// Pulls a custom program error code out of a transaction error value.
///
/// Accepts both the bare error (`{"InstructionError": [0, {"Custom": 6003}]}`)
/// and the enclosing `{"err": ...}` wrapper that preflight failures carry.
fn extract_custom_code(value: &serde_json::Value) -> Option<u32> {
    let err = value.get("err").unwrap_or(value);
    let instruction_error = err.get("InstructionError")?.as_array()?;
    let detail = instruction_error.get(1)?;
    let custom = detail.get("Custom")?.as_u64()?;
    u32::try_from(custom).ok()
}

/// Decodes an account `data` field, which is always requested as base64.
fn decode_account_data(data: &(String, String)) -> Result<Vec<u8>, ClientError> {
    if data.1 != "base64" {
        return Err(ClientError::Deserialization(format!(
            "unexpected account encoding: {}",
            data.1
        )));
    }
    BASE64
        .decode(&data.0)
        .map_err(|e| ClientError::Deserialization(e.to_string()))
}

/// JSON-RPC gateway to the ledger.
#[derive(Debug)]
pub struct RpcGateway {
    config: ClientConfig,
    http: reqwest::Client,
    request_id: AtomicU64,
}

impl RpcGateway {
    /// Creates a new gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP
    /// client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(&config.user_agent)
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            config,
            http,
            request_id: AtomicU64::new(1),
        })
    }

    /// Creates a gateway for the given endpoint with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_url(rpc_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(ClientConfig::new(rpc_url))
    }

    /// Returns the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Makes one JSON-RPC call and unwraps the envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, ClientError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": self.request_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await?;

        let envelope: JsonRpcResponse<T> = response
            .json()
            .await
            .map_err(|e| ClientError::Deserialization(e.to_string()))?;

        if let Some(error) = envelope.error {
            let custom_code = error.data.as_ref().and_then(extract_custom_code);
            if custom_code.is_some() || method == "sendTransaction" {
                return Err(ClientError::Transaction {
                    custom_code,
                    message: error.message,
                });
            }
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        envelope
            .result
            .ok_or_else(|| ClientError::Deserialization("missing result field".to_string()))
    }
}

#[async_trait]
impl LedgerGateway for RpcGateway {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ClientError> {
        let result: WithContext<Option<AccountValue>> = self
            .call(
                "getAccountInfo",
                json!([address.to_string(), {"encoding": "base64"}]),
            )
            .await?;

        result
            .value
            .map(|account| decode_account_data(&account.data))
            .transpose()
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        data_size: u64,
        memcmp_offset: usize,
        memcmp_bytes: &[u8],
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, ClientError> {
        let filters = json!([
            {"dataSize": data_size},
            {"memcmp": {
                "offset": memcmp_offset,
                "bytes": bs58::encode(memcmp_bytes).into_string(),
            }},
        ]);

        let result: Vec<KeyedAccount> = self
            .call(
                "getProgramAccounts",
                json!([
                    program_id.to_string(),
                    {"encoding": "base64", "filters": filters},
                ]),
            )
            .await?;

        result
            .into_iter()
            .map(|entry| {
                let pubkey = Pubkey::from_str(&entry.pubkey)
                    .map_err(|e| ClientError::Deserialization(e.to_string()))?;
                let data = decode_account_data(&entry.account.data)?;
                Ok((pubkey, data))
            })
            .collect()
    }

    async fn latest_blockhash(&self) -> Result<Hash, ClientError> {
        let result: WithContext<BlockhashValue> =
            self.call("getLatestBlockhash", json!([])).await?;

        Hash::from_str(&result.value.blockhash)
            .map_err(|e| ClientError::Deserialization(e.to_string()))
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<String, ClientError> {
        let wire = bincode::serialize(transaction)
            .map_err(|e| ClientError::Deserialization(e.to_string()))?;

        self.call(
            "sendTransaction",
            json!([BASE64.encode(wire), {"encoding": "base64"}]),
        )
        .await
    }

    async fn confirm(&self, signature: &str) -> Result<(), ClientError> {
        let started = Instant::now();

        loop {
            let result: WithContext<Vec<Option<SignatureStatus>>> = self
                .call("getSignatureStatuses", json!([[signature]]))
                .await?;

            if let Some(Some(status)) = result.value.first() {
                if let Some(err) = &status.err {
                    return Err(ClientError::Transaction {
                        custom_code: extract_custom_code(err),
                        message: err.to_string(),
                    });
                }
                if matches!(
                    status.confirmation_status.as_deref(),
                    Some("confirmed") | Some("finalized")
                ) {
                    return Ok(());
                }
            }

            if started.elapsed() >= self.config.confirm_timeout {
                return Err(ClientError::Dropped {
                    signature: signature.to_string(),
                });
            }

            tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_custom_code_bare() {
        let err = json!({"InstructionError": [0, {"Custom": 6003}]});
        assert_eq!(extract_custom_code(&err), Some(6003));
    }

    #[test]
    fn test_extract_custom_code_wrapped() {
        let data = json!({
            "err": {"InstructionError": [0, {"Custom": 6009}]},
            "logs": ["Program log: AnchorError"],
        });
        assert_eq!(extract_custom_code(&data), Some(6009));
    }

    #[test]
    fn test_extract_custom_code_non_custom() {
        let err = json!({"InstructionError": [0, "PrivilegeEscalation"]});
        assert_eq!(extract_custom_code(&err), None);

        let err = json!({"AccountNotFound": null});
        assert_eq!(extract_custom_code(&err), None);
    }

    #[test]
    fn test_decode_account_data() {
        let data = (BASE64.encode([1u8, 2, 3]), "base64".to_string());
        assert_eq!(decode_account_data(&data).expect("decode"), vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_account_data_wrong_encoding() {
        let data = ("abc".to_string(), "base58".to_string());
        assert!(decode_account_data(&data).is_err());
    }

    #[test]
    fn test_gateway_new() {
        let gateway = RpcGateway::with_url("https://rpc.example.com");
        assert!(gateway.is_ok());
    }

    #[test]
    fn test_gateway_new_invalid_url() {
        let gateway = RpcGateway::with_url("not-a-url");
        assert!(gateway.is_err());
    }
}
