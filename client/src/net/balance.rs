//! HTTP client for the account balance endpoints.

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;

pub const BALANCE_PATH: &str = "/get_user_balance";
pub const TOP_UP_PATH: &str = "/balance/top-up";

#[derive(Debug, Deserialize)]
struct BalanceBody {
    #[serde(default)]
    user_balance: Value,
}

#[derive(Debug, Clone)]
pub struct BalanceClient {
    http: reqwest::Client,
    balance_url: String,
    top_up_url: String,
}

impl BalanceClient {
    /// Build a client that sends the configured session cookie with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie is not a valid header value or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http,
            balance_url: config.http_url(BALANCE_PATH),
            top_up_url: config.http_url(TOP_UP_PATH),
        })
    }

    /// Current balance, or `None` when the backend reports no balance
    /// (anonymous session).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn fetch_balance(&self) -> Result<Option<f64>, ClientError> {
        let response = self.http.get(&self.balance_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus { status: status.as_u16(), path: BALANCE_PATH.to_owned() });
        }

        let body: BalanceBody = response.json().await?;
        let balance = balance_from_value(&body.user_balance);
        debug!(?balance, "fetched balance");
        Ok(balance)
    }

    /// Add `amount` to the balance.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn top_up(&self, amount: f64) -> Result<(), ClientError> {
        let form = [("amount", amount.to_string())];
        let response = self.http.post(&self.top_up_url).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus { status: status.as_u16(), path: TOP_UP_PATH.to_owned() });
        }
        debug!(amount, "balance top-up accepted");
        Ok(())
    }
}

fn balance_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => match raw.trim().parse::<f64>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!(raw = %raw, "balance is not a number");
                None
            }
        },
        Value::Null => None,
        other => {
            warn!(value = %other, "unexpected balance payload");
            None
        }
    }
}

/// Render a balance for the status line, e.g. `12.50$`.
#[must_use]
pub fn format_balance(balance: f64) -> String {
    format!("{balance:.2}$")
}

#[cfg(test)]
#[path = "balance_test.rs"]
mod tests;
