//! Uploads a document and queues a PDF conversion against a mocked doc.build API. The first
//! call authorizes and caches a token on disk; the second one reuses it.

// std
use std::{env, fs, process};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use docbuild::{client::DocBuild, document::DocumentId, options::ClientOptions};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/token").query_param("grant_type", "client_credentials");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-token\",\"expires_in\":3600}");
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/documents").body_includes("demo-token");
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"id\":\"report-2024\",\"name\":\"Quarterly Report\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/pdf").body_includes("source=report-2024");
			then.status(202).header("content-type", "application/json").body("{\"queued\":true}");
		})
		.await;

	let workdir = env::temp_dir().join(format!("docbuild_demo_{}", process::id()));

	fs::create_dir_all(&workdir)?;

	let upload = workdir.join("report.docx");

	fs::write(&upload, b"quarterly numbers")?;

	let options = ClientOptions::default()
		.with_base_url(server.base_url())
		.with_cache_dir(workdir.join("cache"));
	let client = DocBuild::new("demo-client", "demo-secret", options)?;
	let created = client.create_document("Quarterly Report", "docx", Some(&upload)).await?;

	println!("Created document: {:?}.", created.as_json());

	let id = DocumentId::new("report-2024")?;
	let callback = Url::parse("https://hooks.example.com/docbuild")?;
	let queued = client.convert_to_pdf(&id, &callback).await?;

	println!(
		"Conversion queued with HTTP {:?}: {:?}.",
		client.last_status_code(),
		queued.as_json()
	);

	token_mock.assert_calls_async(1).await;
	fs::remove_dir_all(&workdir)?;

	Ok(())
}
