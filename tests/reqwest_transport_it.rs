#![cfg(feature = "reqwest")]

// std
use std::{env, fs, process};
// crates.io
use httpmock::prelude::*;
use url::Url;
// self
use docbuild::{
	error::{ConfigError, Error},
	file::FileAttachment,
	http::{ApiRequest, ReqwestTransport, RequestParams, ResponseBody, Transport},
};

fn transport_for(server: &MockServer) -> ReqwestTransport {
	let transport = ReqwestTransport::default();

	transport
		.set_base_url(Url::parse(&server.base_url()).expect("Mock server URL should parse."));

	transport
}

#[tokio::test]
async fn get_sends_query_and_records_metadata() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/documents").query_param("access_token", "myapitoken");
			then.status(200)
				.header("content-type", "application/json")
				.header("x-request-id", "req-1")
				.body("[{\"id\":1,\"name\":\"Test File 1\",\"extension\":\"docx\"}]");
		})
		.await;
	let transport = transport_for(&server);
	let request = ApiRequest::get("documents").param("access_token", "myapitoken");
	let response = transport.execute(&request).await.expect("GET request should succeed.");
	let json = response.body.as_json().expect("JSON responses should decode as JSON.");

	assert_eq!(json[0]["name"], "Test File 1");
	assert_eq!(response.metadata.status, 200);
	assert_eq!(response.metadata.header("X-Request-Id"), Some(&["req-1".to_owned()][..]));
	assert_eq!(transport.last_response(), Some(response.metadata));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn post_form_expands_lists() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/combine")
				.header("content-type", "application/x-www-form-urlencoded")
				.body_includes("name=Combined+Document+2")
				.body_includes("source%5B0%5D=abc")
				.body_includes("source%5B1%5D=def");
			then.status(201).header("content-type", "application/json").body("{\"id\":\"xyz\"}");
		})
		.await;
	let transport = transport_for(&server);
	let params = RequestParams::new()
		.with("name", "Combined Document 2")
		.with("source", vec!["abc".to_owned(), "def".to_owned()])
		.with("access_token", "myapitoken");
	let body = transport
		.execute(&ApiRequest::post("combine").with_params(params))
		.await
		.expect("Form POST should succeed.")
		.body;

	assert_eq!(body.as_json().and_then(|json| json["id"].as_str()), Some("xyz"));
	assert_eq!(transport.last_response().map(|meta| meta.status), Some(201));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn post_with_file_uses_multipart() {
	let path = env::temp_dir().join(format!("docbuild_transport_{}_upload.docx", process::id()));

	fs::write(&path, b"docx payload bytes").expect("Failed to write temporary upload.");

	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/documents/abc/payload")
				.body_includes("name=\"access_token\"")
				.body_includes("name=\"document[file]\"")
				.body_includes("docx payload bytes");
			then.status(200).header("content-type", "application/json").body("{\"id\":\"abc\"}");
		})
		.await;
	let transport = transport_for(&server);
	let attachment = FileAttachment::open(&path).expect("Temporary upload should validate.");
	let request = ApiRequest::post("documents/abc/payload")
		.param("access_token", "myapitoken")
		.param("document[file]", attachment);

	transport.execute(&request).await.expect("Multipart POST should succeed.");

	mock.assert_calls_async(1).await;

	fs::remove_file(&path).expect("Failed to remove temporary upload.");
}

#[tokio::test]
async fn failures_are_classified() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/documents").query_param("access_token", "expiredtoken");
			then.status(401).header("content-type", "application/json").body(
				"{\"error\":\"invalid_grant\",\"error_description\":\"The access token provided has expired.\"}",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/token");
			then.status(401).header("content-type", "application/json").body(
				"{\"error\":\"invalid_client\",\"error_description\":\"The client credentials are invalid\"}",
			);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/documents/missing");
			then.status(404).body("Not Found");
		})
		.await;

	let transport = transport_for(&server);
	let expired = transport
		.execute(&ApiRequest::get("documents").param("access_token", "expiredtoken"))
		.await
		.expect_err("Expired tokens should fail.");

	assert!(expired.is_token_expired());
	assert_eq!(transport.last_response().map(|meta| meta.status), Some(401));

	let unauthorized = transport
		.execute(&ApiRequest::get("oauth/token").param("client_secret", "anincorrectsecret"))
		.await
		.expect_err("Rejected credentials should fail.");

	assert!(matches!(unauthorized, Error::Unauthorized { status: 401, .. }));

	let missing = transport
		.execute(&ApiRequest::get("documents/missing"))
		.await
		.expect_err("Missing resources should fail.");

	match missing {
		Error::Http { status, reason } => {
			assert_eq!(status, 404);
			assert_eq!(reason, "Not Found");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn binary_payloads_pass_through() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/documents/abc/payload");
			then.status(200)
				.header("content-type", "application/pdf")
				.header("content-disposition", "attachment; filename=\"Test File 1.pdf\"")
				.body("%PDF-1.7 binary");
		})
		.await;

	let transport = transport_for(&server);
	let body = transport
		.execute(&ApiRequest::get("documents/abc/payload"))
		.await
		.expect("Download should succeed.")
		.body;

	assert_eq!(body, ResponseBody::Binary(b"%PDF-1.7 binary".to_vec()));

	let meta = transport.last_response().expect("Metadata should be recorded.");

	assert_eq!(
		meta.header("Content-Disposition"),
		Some(&["attachment; filename=\"Test File 1.pdf\"".to_owned()][..])
	);
}

#[tokio::test]
async fn missing_base_url_is_a_config_error() {
	let err = ReqwestTransport::default()
		.execute(&ApiRequest::get("documents"))
		.await
		.expect_err("Requests without a base URL must fail.");

	assert!(matches!(err, Error::Config(ConfigError::InvalidBaseUrl { .. })));
}

#[tokio::test]
async fn rejected_requests_clear_stale_metadata() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/documents");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;

	let path = env::temp_dir().join(format!("docbuild_transport_{}_stale.docx", process::id()));

	fs::write(&path, b"docx payload bytes").expect("Failed to write temporary upload.");

	let transport = transport_for(&server);

	transport.execute(&ApiRequest::get("documents")).await.expect("GET request should succeed.");

	assert_eq!(transport.last_response().map(|meta| meta.status), Some(200));

	let attachment = FileAttachment::open(&path).expect("Temporary upload should validate.");
	let err = transport
		.execute(&ApiRequest::get("documents").param("document[file]", attachment))
		.await
		.expect_err("Files cannot travel in a query string.");

	assert!(matches!(err, Error::Config(ConfigError::UnsupportedParam { .. })));
	assert!(transport.last_response().is_none());

	fs::remove_file(&path).expect("Failed to remove temporary upload.");
}
