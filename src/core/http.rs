use std::time::Duration;

use reqwest::{
    blocking,
    header::USER_AGENT,
    Client,
    StatusCode,
    Url,
};
use tracing::warn;

use crate::core::PickerError;

const AGENT: &str = "pictopick/0.1 (+reqwest)";
const MAX_ATTEMPTS: usize = 3;

pub fn http_client(timeout: Duration) -> Result<Client, PickerError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(AGENT)
        .build()
        .map_err(|e| PickerError::Custom(format!("HTTP client build failed: {e}")))
}

pub fn blocking_client(timeout: Duration) -> Result<blocking::Client, PickerError> {
    blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PickerError::Custom(format!("HTTP client build failed: {e}")))
}

pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>, PickerError> {
    let resp = client.get(url).send().await?;
    ensure_success(resp.status(), resp.url())?;
    Ok(resp.bytes().await?.to_vec())
}

/// Downloads `url` with the blocking client, retrying transient failures.
pub fn download_bytes(client: &blocking::Client, url: &str) -> Result<Vec<u8>, PickerError> {
    let mut attempts: usize = 0;
    loop {
        attempts += 1;

        let resp = client.get(url).header(USER_AGENT, AGENT).send();

        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                if attempts < MAX_ATTEMPTS {
                    warn!(url, attempt = attempts, "download failed: {e}");
                    std::thread::sleep(Duration::from_millis(500 * attempts as u64));
                    continue;
                }
                return Err(PickerError::Custom(format!("Failed HTTP GET {}: {}", url, e)));
            }
        };

        ensure_success(resp.status(), resp.url())?;

        match resp.bytes() {
            Ok(bytes) if !bytes.is_empty() => return Ok(bytes.to_vec()),
            Ok(_) | Err(_) => {
                if attempts < MAX_ATTEMPTS {
                    std::thread::sleep(Duration::from_millis(500 * attempts as u64));
                    continue;
                }
                return Err(PickerError::Custom(format!("Empty response body from {}", url)));
            }
        }
    }
}

fn ensure_success(status: StatusCode, url: &Url) -> Result<(), PickerError> {
    if !status.is_success() {
        return Err(PickerError::Custom(format!("HTTP error {} from {}", status, url)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_success_status_is_an_error() {
        let url = Url::parse("https://example.org/icon.png").unwrap();
        assert!(ensure_success(StatusCode::OK, &url).is_ok());
        let err = ensure_success(StatusCode::NOT_FOUND, &url).unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
