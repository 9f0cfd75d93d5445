//! Response decoding shared by the operations

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;
use studio_core::error::ClientError;

pub(crate) fn network_failure(err: reqwest::Error) -> ClientError {
    ClientError::NetworkFailure(err.to_string())
}

/// Decode a successful body into `T`.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            ClientError::InvalidResponse(e.to_string())
        } else {
            network_failure(e)
        }
    })
}

/// The `message` field of an error body, when the server sent a usable one.
pub(crate) async fn server_message(response: Response) -> Option<String> {
    let body: Value = response.json().await.ok()?;
    body.get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
