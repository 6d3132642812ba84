use log::{debug, error, info, warn};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;

use crate::error::{ClientError, ClientResult};
use crate::masking::mask_token;

/// Sends a GET with the optional bearer token and logs the exchange.
///
/// Only transport failures are errors here; status handling is left to
/// [`read_json`].
pub async fn execute_get(
    client: &Client,
    url: Url,
    auth_token: Option<&str>,
) -> ClientResult<Response> {
    let mut request_builder = client.get(url.clone());

    if let Some(token) = auth_token {
        request_builder = request_builder.bearer_auth(token);
        debug!("Authorization: Bearer {}", mask_token(token));
    }

    info!("Sending GET request to {}", url);
    let start_time = std::time::Instant::now();

    match request_builder.send().await {
        Ok(resp) => {
            info!(
                "Got response from {} after {:?} with status {}",
                url,
                start_time.elapsed(),
                resp.status()
            );
            Ok(resp)
        }
        Err(e) => {
            error!("Failed HTTP request to {}: {}", url, e);
            if let Some(source) = e.source() {
                error!("Error source: {:?}", source);
            }
            if e.is_timeout() {
                error!("Request timed out");
            }
            if e.is_connect() {
                error!("Connection error");
            }

            Err(ClientError::Transport {
                url: url.to_string(),
                source: e,
            })
        }
    }
}

/// Reads a response body as JSON.
///
/// Non-2xx responses become [`ClientError::Status`] carrying the `message`
/// field of the error body when there is one.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let url = response.url().to_string();
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ClientError::Transport {
            url: url.clone(),
            source,
        })?;

    if !status.is_success() {
        warn!("{} responded with {}: {}", url, status, body);
        return Err(ClientError::Status {
            url,
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| {
        error!("Failed to decode response from {}: {}", url, source);
        ClientError::Decode { url, source }
    })
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
