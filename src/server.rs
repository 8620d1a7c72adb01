//! JSON HTTP surface over a [`LinkBroker`].
//!
//! Handlers are thin: they decode the request, call one broker operation, and reshape the
//! result. Every broker error becomes `{"error": message}` with status 400 when the caller or
//! the provider is at fault and 500 otherwise.

// crates.io
use axum::{
	Json, Router,
	body::Bytes,
	extract::{MatchedPath, Request, State},
	http::StatusCode,
	response::{Html, IntoResponse, Response},
	routing::{get, post},
};
use tower_http::trace::TraceLayer;
// self
use crate::{_prelude::*, auth::ItemId, client::AggregationClient, flows::LinkBroker};

const LANDING_PAGE: &str = include_str!("../static/index.html");

/// Broker error rendered as a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub Error);
impl ApiError {
	/// Status code the error maps to.
	pub fn status(&self) -> StatusCode {
		if self.0.is_client_facing() {
			StatusCode::BAD_REQUEST
		} else {
			StatusCode::INTERNAL_SERVER_ERROR
		}
	}
}
impl From<Error> for ApiError {
	fn from(e: Error) -> Self {
		Self(e)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = ?self.0, "Request failed.");
		} else {
			tracing::warn!(error = %self.0, "Request rejected.");
		}

		(status, Json(ErrorBody { error: self.0.to_string() })).into_response()
	}
}

#[derive(Serialize)]
struct ErrorBody {
	error: String,
}

#[derive(Serialize)]
struct LinkTokenBody {
	link_token: String,
}

#[derive(Default, Deserialize)]
struct ExchangeRequest {
	#[serde(default)]
	public_token: Option<String>,
}

#[derive(Serialize)]
struct ExchangeBody<'a> {
	access_token: &'a str,
	item_id: &'a str,
	message: &'a str,
}

#[derive(Serialize)]
struct ItemsBody {
	items: Vec<ItemId>,
	count: usize,
}

#[derive(Serialize)]
struct HealthBody {
	status: &'static str,
}

/// Builds the application router over `broker`.
pub fn router<C>(broker: Arc<LinkBroker<C>>) -> Router
where
	C: AggregationClient,
{
	Router::new()
		.route("/", get(landing_page))
		.route("/health", get(health))
		.route("/api/create_link_token", post(create_link_token::<C>))
		.route("/api/exchange_public_token", post(exchange_public_token::<C>))
		.route("/api/transactions", get(list_transactions::<C>))
		.route("/api/items", get(list_items::<C>))
		.with_state(broker)
}

/// Wraps `router` in a request-tracing layer.
pub fn with_trace_layer(router: Router) -> Router {
	let trace_layer = TraceLayer::new_for_http()
		.make_span_with(|req: &Request| {
			let method = req.method();
			let uri = req.uri();
			let matched_path =
				req.extensions().get::<MatchedPath>().map(|matched_path| matched_path.as_str());

			tracing::info_span!("request", %method, %uri, matched_path)
		})
		// Handler errors are logged by `ApiError`.
		.on_failure(());

	router.layer(trace_layer)
}

/// Resolves once the process receives Ctrl-C.
pub async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "Failed to listen for the shutdown signal.");

		std::future::pending::<()>().await;
	}

	tracing::info!("Shutdown signal received.");
}

async fn landing_page() -> Html<&'static str> {
	Html(LANDING_PAGE)
}

async fn health() -> Json<HealthBody> {
	Json(HealthBody { status: "ok" })
}

async fn create_link_token<C>(
	State(broker): State<Arc<LinkBroker<C>>>,
) -> Result<Json<LinkTokenBody>, ApiError>
where
	C: AggregationClient,
{
	let token = broker.begin_link().await?;

	Ok(Json(LinkTokenBody { link_token: token.link_token }))
}

async fn exchange_public_token<C>(
	State(broker): State<Arc<LinkBroker<C>>>,
	body: Bytes,
) -> Result<Response, ApiError>
where
	C: AggregationClient,
{
	// A missing or malformed body is treated like a missing token.
	let request = serde_json::from_slice::<ExchangeRequest>(&body).unwrap_or_default();
	let public_token = request.public_token.as_deref().unwrap_or_default();
	let completion = broker.complete_link(public_token).await?;

	Ok(Json(ExchangeBody {
		access_token: completion.access_token.expose(),
		item_id: &completion.item_id,
		message: completion.message,
	})
	.into_response())
}

async fn list_transactions<C>(
	State(broker): State<Arc<LinkBroker<C>>>,
) -> Result<Response, ApiError>
where
	C: AggregationClient,
{
	let report = broker.list_transactions().await?;

	Ok(Json(report).into_response())
}

async fn list_items<C>(
	State(broker): State<Arc<LinkBroker<C>>>,
) -> Result<Json<ItemsBody>, ApiError>
where
	C: AggregationClient,
{
	let items = broker.connected_items().await?;

	Ok(Json(ItemsBody { count: items.len(), items }))
}

#[cfg(test)]
mod tests {
	// crates.io
	use axum::{body::Body, http::Request};
	use http_body_util::BodyExt;
	use serde_json::{Value, json};
	use tower::ServiceExt;
	// self
	use super::*;
	use crate::{_preludet::*, error::UpstreamError, store::StoreError};

	fn app(stub: StubClient) -> (Router, Arc<StubClient>) {
		let (broker, client, _store) = build_stub_broker(stub);

		(router(Arc::new(broker)), client)
	}

	async fn send(router: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
		let request = Request::builder()
			.method(method)
			.uri(uri)
			.header("content-type", "application/json")
			.body(body)
			.expect("Request fixture should build.");
		let response = router.clone().oneshot(request).await.expect("Router should respond.");
		let status = response.status();
		let bytes = response
			.into_body()
			.collect()
			.await
			.expect("Response body should be readable.")
			.to_bytes();

		(status, serde_json::from_slice(&bytes).expect("Response body should be JSON."))
	}

	#[tokio::test]
	async fn link_token_route_returns_only_the_token() {
		let (router, _client) = app(StubClient::default().with_link_token("link-abc"));
		let (status, body) = send(&router, "POST", "/api/create_link_token", Body::empty()).await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, json!({ "link_token": "link-abc" }));
	}

	#[tokio::test]
	async fn provider_errors_map_to_bad_request() {
		let (router, _client) = app(StubClient::default());
		let (status, body) = send(&router, "POST", "/api/create_link_token", Body::empty()).await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body, json!({ "error": "link token not scripted" }));
	}

	#[tokio::test]
	async fn missing_public_token_is_rejected_without_exchange() {
		let (router, client) = app(StubClient::default());

		for body in ["", "not json", "{}", r#"{"public_token":""}"#, r#"{"public_token":null}"#] {
			let (status, payload) =
				send(&router, "POST", "/api/exchange_public_token", Body::from(body)).await;

			assert_eq!(status, StatusCode::BAD_REQUEST, "Body {body:?} should be rejected.");
			assert_eq!(payload, json!({ "error": "public_token is required" }));
		}

		assert!(client.exchanged.lock().is_empty());
	}

	#[tokio::test]
	async fn link_then_list_round_trip() {
		let (router, _client) = app(
			StubClient::default()
				.with_exchange("public-xyz", "access-123", "item-1")
				.with_transactions(
					"access-123",
					vec![
						raw_transaction("tx-1", "Coffee", 4.5, "2026-10-01"),
						raw_transaction("tx-2", "Groceries", 52.1, "2026-10-02"),
					],
				),
		);
		let (status, body) = send(
			&router,
			"POST",
			"/api/exchange_public_token",
			Body::from(r#"{"public_token":"public-xyz"}"#),
		)
		.await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(
			body,
			json!({
				"access_token": "access-123",
				"item_id": "item-1",
				"message": "Successfully connected bank account",
			})
		);

		let (status, body) = send(&router, "GET", "/api/transactions", Body::empty()).await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["total_transactions"], 2);
		assert_eq!(body["accounts"][0]["item_id"], "item-1");
		assert_eq!(body["accounts"][0]["transactions"][1]["name"], "Groceries");
		assert_eq!(
			body["accounts"][0]["transactions"][0]["category"],
			json!(["Food and Drink", "Restaurants"])
		);

		let (status, body) = send(&router, "GET", "/api/items", Body::empty()).await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, json!({ "items": ["item-1"], "count": 1 }));
	}

	#[tokio::test]
	async fn transactions_without_connections_is_bad_request() {
		let (router, client) = app(StubClient::default());
		let (status, body) = send(&router, "GET", "/api/transactions", Body::empty()).await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body, json!({ "error": "No bank accounts connected" }));
		assert_eq!(client.fetch_count(), 0);
	}

	#[tokio::test]
	async fn health_and_landing_page_are_served() {
		let (router, _client) = app(StubClient::default());
		let (status, body) = send(&router, "GET", "/health", Body::empty()).await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, json!({ "status": "ok" }));

		let request =
			Request::builder().uri("/").body(Body::empty()).expect("Request fixture should build.");
		let response = router.oneshot(request).await.expect("Router should respond.");

		assert_eq!(response.status(), StatusCode::OK);

		let bytes = response
			.into_body()
			.collect()
			.await
			.expect("Response body should be readable.")
			.to_bytes();

		assert!(String::from_utf8_lossy(&bytes).contains("/api/create_link_token"));
	}

	#[test]
	fn storage_errors_map_to_server_error() {
		let storage = ApiError(Error::Storage(StoreError::Backend { message: "disk full".into() }));
		let upstream =
			ApiError(Error::Upstream(UpstreamError::Timeout { endpoint: "/transactions/get" }));

		assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(upstream.status(), StatusCode::BAD_REQUEST);
		assert_eq!(ApiError::from(Error::NoConnections).status(), StatusCode::BAD_REQUEST);
	}
}
