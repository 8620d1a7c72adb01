#![allow(dead_code)]

// std
use std::time::Duration;
// crates.io
use httpmock::MockServer;
use serde_json::{Value, json};
// self
use plaid_link_broker::{
	client::PlaidClient,
	http::ReqwestHttpClient,
	provider::{Credentials, RetryPolicy},
	url::Url,
};

pub const CLIENT_ID: &str = "client-test";
pub const SECRET: &str = "secret-test";

/// Retry policy with millisecond backoff so retry tests stay fast.
pub fn fast_retry(max_retries: u32) -> RetryPolicy {
	RetryPolicy::new(max_retries).with_backoff(Duration::from_millis(1), Duration::from_millis(5))
}

pub fn client_for(server: &MockServer, retry: RetryPolicy) -> PlaidClient {
	client_with_timeout(server, retry, Duration::from_secs(5))
}

pub fn client_with_timeout(
	server: &MockServer,
	retry: RetryPolicy,
	timeout: Duration,
) -> PlaidClient {
	let base_url = Url::parse(&server.base_url()).expect("Mock server URL should parse.");
	let credentials =
		Credentials::new(CLIENT_ID, SECRET).expect("Credential fixture should be valid.");
	let http = ReqwestHttpClient::new(timeout).expect("HTTP client should build.");

	PlaidClient::with_http_client(base_url, credentials, http).with_retry_policy(retry)
}

/// Request body for `/transactions/get` as the client sends it.
pub fn transactions_request(access_token: &str, start: &str, end: &str, offset: usize) -> Value {
	json!({
		"client_id": CLIENT_ID,
		"secret": SECRET,
		"access_token": access_token,
		"start_date": start,
		"end_date": end,
		"options": { "count": 500, "offset": offset },
	})
}

pub fn transaction(id: &str, name: &str, amount: f64, date: &str) -> Value {
	json!({
		"transaction_id": id,
		"account_id": "acct-1",
		"name": name,
		"amount": amount,
		"date": date,
		"category": ["Shops"],
		"pending": false,
		"iso_currency_code": "USD",
		"merchant_name": null,
	})
}

pub fn transactions_page(records: Vec<Value>, total: usize) -> Value {
	json!({
		"accounts": [],
		"transactions": records,
		"total_transactions": total,
		"request_id": "req-page",
	})
}

pub fn api_error(error_type: &str, error_code: &str, message: &str) -> Value {
	json!({
		"error_type": error_type,
		"error_code": error_code,
		"error_message": message,
		"display_message": null,
		"request_id": "req-error",
	})
}
