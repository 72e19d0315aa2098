//! Authenticated request execution with cache-first token resolution.
//!
//! Every call resolves a token (cache hit, or authorize + save on a miss), attaches it as the
//! `access_token` parameter, and dispatches through the transport. When the server reports
//! the token as expired the cache entry is deleted if it still holds that token; with
//! [`ClientOptions::token_refresh`](crate::options::ClientOptions::token_refresh) enabled the
//! call is then replayed at most once, which re-authorizes unless another caller already
//! stored a fresh token.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	cache::ACCESS_TOKEN_KEY,
	client::DocBuild,
	http::{ApiRequest, Method, RequestParams, ResponseBody, Transport},
	obs::{self, OperationKind, OperationOutcome, OperationSpan, TokenEvent},
};

/// Request parameter carrying the access token.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

const MAX_EXPIRY_RETRIES: u8 = 1;

impl<T> DocBuild<T>
where
	T: ?Sized + Transport,
{
	/// Performs one authenticated call and returns the response body untouched.
	///
	/// Any `access_token` already present in `params` is overwritten with the resolved token.
	/// Only [`Error::TokenExpired`] is intercepted; every other failure propagates as-is and
	/// leaves the cache alone.
	pub async fn perform_request(
		&self,
		method: Method,
		resource: impl Into<String>,
		params: RequestParams,
		headers: BTreeMap<String, String>,
	) -> Result<ResponseBody> {
		let request = ApiRequest::new(method, resource).with_params(params).with_headers(headers);

		self.execute(request).await
	}

	/// Authenticated `GET` without extra headers.
	pub async fn get(
		&self,
		resource: impl Into<String>,
		params: RequestParams,
	) -> Result<ResponseBody> {
		self.execute(ApiRequest::get(resource).with_params(params)).await
	}

	/// Authenticated `POST` without extra headers.
	pub async fn post(
		&self,
		resource: impl Into<String>,
		params: RequestParams,
	) -> Result<ResponseBody> {
		self.execute(ApiRequest::post(resource).with_params(params)).await
	}

	async fn execute(&self, request: ApiRequest) -> Result<ResponseBody> {
		const KIND: OperationKind = OperationKind::Request;

		let span = OperationSpan::new(KIND, &request.resource);

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span.instrument(self.execute_with_retry(request)).await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	async fn execute_with_retry(&self, mut request: ApiRequest) -> Result<ResponseBody> {
		let mut retries = 0;

		loop {
			let token = self.resolve_token().await?;

			request.params.insert(ACCESS_TOKEN_PARAM, token.expose());

			match self.transport.execute(&request).await {
				Ok(response) => return Ok(response.body),
				Err(e) if e.is_token_expired() => {
					self.invalidate_token(&token).await?;

					if !self.options.token_refresh || retries >= MAX_EXPIRY_RETRIES {
						return Err(e);
					}

					retries += 1;

					obs::record_operation_outcome(OperationKind::Request, OperationOutcome::Retry);
				},
				Err(e) => return Err(e),
			}
		}
	}

	async fn resolve_token(&self) -> Result<AccessToken> {
		let _singleflight = self.token_guard.lock().await;

		// The entry may vanish between the two calls; treat that as a miss.
		if self.cache.contains(ACCESS_TOKEN_KEY).await?
			&& let Some(token) = self.cache.fetch(ACCESS_TOKEN_KEY).await?
		{
			obs::record_token_event(TokenEvent::CacheHit);

			return Ok(AccessToken::new(token));
		}

		obs::record_token_event(TokenEvent::CacheMiss);

		let token = self.authorizer.authorize(&self.credentials).await?;

		self.cache.save(ACCESS_TOKEN_KEY, token.expose().to_owned()).await?;
		obs::record_token_event(TokenEvent::Stored);

		Ok(token)
	}

	async fn invalidate_token(&self, rejected: &AccessToken) -> Result<()> {
		let _singleflight = self.token_guard.lock().await;

		// Another caller may already have replaced the rejected token.
		if self.cache.fetch(ACCESS_TOKEN_KEY).await?.as_deref() != Some(rejected.expose()) {
			return Ok(());
		}

		self.cache.delete(ACCESS_TOKEN_KEY).await?;
		obs::record_token_event(TokenEvent::Invalidated);

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::time::Duration;
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::{
		_preludet::*,
		auth::Credentials,
		cache::{CacheError, TokenCache},
		http::ParamValue,
		options::ClientOptions,
	};

	fn expired() -> Error {
		Error::TokenExpired { reason: "The access token provided has expired.".into() }
	}

	fn documents() -> serde_json::Value {
		json!([
			{ "id": 1, "name": "Test File 1", "extension": "docx", "status": "stored" },
			{ "id": 2, "name": "Test File 2", "extension": "pdf", "status": "stored" },
		])
	}

	fn token_param(request: &ApiRequest) -> Option<&str> {
		request.params.get(ACCESS_TOKEN_PARAM).and_then(ParamValue::as_text)
	}

	fn request_entry(method: Method, resource: &str) -> JournalEntry {
		JournalEntry::Request { method, resource: resource.into() }
	}

	#[tokio::test]
	async fn cached_token_skips_authorization() {
		let h = harness();
		let client = build_test_client(&h, ClientOptions::default());

		h.cache.seed(ACCESS_TOKEN_KEY, "myapitoken");
		h.transport.respond_json(200, documents());

		let body = client.get_documents().await.expect("Listing documents should succeed.");

		assert_eq!(body, ResponseBody::Json(documents()));
		assert_eq!(
			h.journal.entries(),
			vec![
				JournalEntry::CacheContains(ACCESS_TOKEN_KEY.into()),
				JournalEntry::CacheFetch(ACCESS_TOKEN_KEY.into()),
				request_entry(Method::Get, "documents"),
			]
		);

		let requests = h.transport.requests();

		assert_eq!(token_param(&requests[0]), Some("myapitoken"));
		assert_eq!(requests[0].params.len(), 1);
		assert!(requests[0].headers.is_empty());
	}

	#[tokio::test]
	async fn miss_authorizes_and_saves_before_request() {
		let h = harness();
		let client = build_test_client(&h, ClientOptions::default());

		h.transport.respond_json(
			200,
			json!({ "access_token": "newtoken", "expires_in": 3600, "token_type": "bearer" }),
		);
		h.transport.respond_json(200, documents());
		h.transport.respond_json(200, documents());

		client.get_documents().await.expect("First listing should succeed.");

		assert_eq!(
			h.journal.entries(),
			vec![
				JournalEntry::CacheContains(ACCESS_TOKEN_KEY.into()),
				request_entry(Method::Get, "oauth/token"),
				JournalEntry::CacheSave(ACCESS_TOKEN_KEY.into(), "newtoken".into()),
				request_entry(Method::Get, "documents"),
			]
		);

		client.get_documents().await.expect("Second listing should succeed.");

		let requests = h.transport.requests();

		assert_eq!(h.journal.requested_resources(), ["oauth/token", "documents", "documents"]);
		assert_eq!(token_param(&requests[1]), Some("newtoken"));
		assert_eq!(token_param(&requests[2]), Some("newtoken"));
	}

	#[tokio::test]
	async fn authorization_failure_skips_request() {
		let h = harness();
		let client = build_test_client(&h, ClientOptions::default());

		h.transport.respond_json(500, json!({ "error": "server_error" }));

		let err = client.get_documents().await.expect_err("Authorization failure must surface.");

		assert!(matches!(err, Error::Authorization { status: Some(500), .. }));
		assert_eq!(h.journal.requested_resources(), ["oauth/token"]);
		assert!(h.cache.peek(ACCESS_TOKEN_KEY).is_none());
	}

	#[tokio::test]
	async fn rejected_credentials_skip_request() {
		let h = harness();
		let client = build_test_client(&h, ClientOptions::default());

		h.transport.fail(
			401,
			Error::Unauthorized {
				status: 401,
				reason: "The client credentials are invalid".into(),
			},
		);

		let err = client.get_documents().await.expect_err("Rejected credentials must surface.");

		assert!(matches!(err, Error::Unauthorized { status: 401, .. }));
		assert_eq!(h.journal.requested_resources(), ["oauth/token"]);
	}

	#[tokio::test]
	async fn expiry_clears_cache_and_retries_once() {
		let h = harness();
		let client = build_test_client(&h, ClientOptions::default());

		h.cache.seed(ACCESS_TOKEN_KEY, "expiredtoken");
		h.transport.fail(401, expired());
		h.transport.respond_json(200, json!({ "access_token": "newtoken" }));
		h.transport.respond_json(200, documents());

		let body =
			client.get_documents().await.expect("Retry after re-authorization should succeed.");

		assert_eq!(body, ResponseBody::Json(documents()));
		assert_eq!(
			h.journal.entries(),
			vec![
				JournalEntry::CacheContains(ACCESS_TOKEN_KEY.into()),
				JournalEntry::CacheFetch(ACCESS_TOKEN_KEY.into()),
				request_entry(Method::Get, "documents"),
				JournalEntry::CacheFetch(ACCESS_TOKEN_KEY.into()),
				JournalEntry::CacheDelete(ACCESS_TOKEN_KEY.into()),
				JournalEntry::CacheContains(ACCESS_TOKEN_KEY.into()),
				request_entry(Method::Get, "oauth/token"),
				JournalEntry::CacheSave(ACCESS_TOKEN_KEY.into(), "newtoken".into()),
				request_entry(Method::Get, "documents"),
			]
		);

		let requests = h.transport.requests();

		assert_eq!(token_param(&requests[0]), Some("expiredtoken"));
		assert_eq!(token_param(&requests[2]), Some("newtoken"));
		assert_eq!(h.cache.peek(ACCESS_TOKEN_KEY).as_deref(), Some("newtoken"));
	}

	#[tokio::test]
	async fn second_expiry_propagates() {
		let h = harness();
		let client = build_test_client(&h, ClientOptions::default());

		h.cache.seed(ACCESS_TOKEN_KEY, "expiredtoken");
		h.transport.fail(401, expired());
		h.transport.respond_json(200, json!({ "access_token": "newtoken" }));
		h.transport.fail(401, expired());

		let err = client.get_documents().await.expect_err("A second expiry must not be retried.");

		assert!(err.is_token_expired());
		assert_eq!(h.journal.requested_resources(), ["documents", "oauth/token", "documents"]);
		assert!(h.cache.peek(ACCESS_TOKEN_KEY).is_none());
		assert_eq!(h.transport.pending(), 0);
	}

	#[tokio::test]
	async fn late_expiry_keeps_token_stored_by_another_caller() {
		let h = harness();
		let client = build_test_client(&h, ClientOptions::default());
		let other = client.clone();

		h.cache.seed(ACCESS_TOKEN_KEY, "expiredtoken");
		h.transport.fail_after(401, expired(), tokio::time::sleep(Duration::from_millis(20)));
		h.transport.fail_after(401, expired(), tokio::time::sleep(Duration::from_millis(100)));
		h.transport.respond_json(200, json!({ "access_token": "newtoken1" }));
		h.transport.respond_json(200, documents());
		h.transport.respond_json(200, documents());

		let (first, second) = tokio::join!(client.get_documents(), other.get_documents());

		first.expect("The first caller should recover from expiry.");
		second.expect("The second caller should reuse the replacement token.");

		let requests = h.transport.requests();
		let authorizations =
			requests.iter().filter(|request| request.resource == "oauth/token").count();

		assert_eq!(authorizations, 1);
		assert_eq!(token_param(&requests[3]), Some("newtoken1"));
		assert_eq!(token_param(&requests[4]), Some("newtoken1"));
		assert_eq!(h.cache.peek(ACCESS_TOKEN_KEY).as_deref(), Some("newtoken1"));
		assert_eq!(h.transport.pending(), 0);
	}

	#[tokio::test]
	async fn expiry_without_refresh_deletes_and_surfaces() {
		let h = harness();
		let client = build_test_client(&h, ClientOptions::default().with_token_refresh(false));

		h.cache.seed(ACCESS_TOKEN_KEY, "expiredtoken");
		h.transport.fail(401, expired());

		let err = client.get_documents().await.expect_err("Expiry must surface without refresh.");

		assert!(err.is_token_expired());
		assert_eq!(
			h.journal.entries().last(),
			Some(&JournalEntry::CacheDelete(ACCESS_TOKEN_KEY.into()))
		);
		assert_eq!(h.journal.requested_resources(), ["documents"]);
		assert!(h.cache.peek(ACCESS_TOKEN_KEY).is_none());
	}

	#[tokio::test]
	async fn other_failures_leave_cache_untouched() {
		let h = harness();
		let client = build_test_client(&h, ClientOptions::default());

		h.cache.seed(ACCESS_TOKEN_KEY, "myapitoken");
		h.transport.fail(404, Error::Http { status: 404, reason: "Not Found".into() });

		let err = client.get_documents().await.expect_err("HTTP failures must surface.");

		assert!(matches!(err, Error::Http { status: 404, .. }));
		assert!(
			!h.journal.entries().iter().any(|entry| matches!(entry, JournalEntry::CacheDelete(_)))
		);
		assert_eq!(h.cache.peek(ACCESS_TOKEN_KEY).as_deref(), Some("myapitoken"));
		assert_eq!(client.last_status_code(), Some(404));
	}

	#[tokio::test]
	async fn caller_params_and_headers_are_forwarded() {
		let h = harness();
		let client = build_test_client(&h, ClientOptions::default());
		let params = RequestParams::new().with("page", "2").with(ACCESS_TOKEN_PARAM, "stale");
		let headers = BTreeMap::from([("accept".to_owned(), "application/json".to_owned())]);

		h.cache.seed(ACCESS_TOKEN_KEY, "myapitoken");
		h.transport.respond_json(200, json!([]));

		client
			.perform_request(Method::Get, "documents", params, headers.clone())
			.await
			.expect("Request should succeed.");

		let request = &h.transport.requests()[0];

		assert_eq!(token_param(request), Some("myapitoken"));
		assert_eq!(request.params.get("page"), Some(&ParamValue::from("2")));
		assert_eq!(request.headers, headers);
	}

	#[tokio::test]
	async fn cache_failures_surface() {
		let h = harness();
		let cache: Arc<dyn TokenCache> = Arc::new(BrokenCache);
		let client: DocBuild<ScriptedTransport> = DocBuild::with_parts(
			Credentials::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET),
			ClientOptions::default(),
			h.transport.clone(),
			cache,
		)
		.expect("Client construction should succeed.");
		let err = client.get_documents().await.expect_err("Cache failures must surface.");

		assert!(matches!(err, Error::Cache(CacheError::Backend { .. })));
		assert!(h.transport.requests().is_empty());
	}
}
