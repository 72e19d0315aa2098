//! Document operations: one method per API endpoint.

// self
use crate::{
	_prelude::*,
	client::DocBuild,
	document::DocumentId,
	file::FileAttachment,
	http::{RequestParams, ResponseBody, Transport},
};

const DOCUMENT_NAME: &str = "document[name]";
const DOCUMENT_EXTENSION: &str = "document[extension]";
const DOCUMENT_FILE: &str = "document[file]";

impl<T> DocBuild<T>
where
	T: ?Sized + Transport,
{
	/// Lists stored documents.
	pub async fn get_documents(&self) -> Result<ResponseBody> {
		self.get("documents", RequestParams::new()).await
	}

	/// Fetches a single document record.
	pub async fn get_document(&self, id: &DocumentId) -> Result<ResponseBody> {
		self.get(format!("documents/{id}"), RequestParams::new()).await
	}

	/// Downloads the raw payload of a document.
	///
	/// Use [`DocBuild::last_response_headers`] afterwards to read e.g. `Content-Disposition`.
	pub async fn download_document(&self, id: &DocumentId) -> Result<ResponseBody> {
		self.get(format!("documents/{id}/payload"), RequestParams::new()).await
	}

	/// Creates a document, optionally uploading its payload in the same call.
	///
	/// The file is validated before the cache or the network is touched.
	pub async fn create_document(
		&self,
		name: &str,
		extension: &str,
		path: Option<&Path>,
	) -> Result<ResponseBody> {
		let mut params =
			RequestParams::new().with(DOCUMENT_NAME, name).with(DOCUMENT_EXTENSION, extension);

		if let Some(path) = path {
			params.insert(DOCUMENT_FILE, FileAttachment::open(path)?);
		}

		self.post("documents", params).await
	}

	/// Replaces the payload of an existing document.
	///
	/// The file is validated before the cache or the network is touched.
	pub async fn upload_document(
		&self,
		id: &DocumentId,
		path: impl AsRef<Path>,
	) -> Result<ResponseBody> {
		let params = RequestParams::new().with(DOCUMENT_FILE, FileAttachment::open(path)?);

		self.post(format!("documents/{id}/payload"), params).await
	}

	/// Registers `url` to be notified about `source`.
	pub async fn create_callback(&self, source: &DocumentId, url: &Url) -> Result<ResponseBody> {
		let params =
			RequestParams::new().with("source", source.to_string()).with("url", url.as_str());

		self.post("callback", params).await
	}

	/// Merges `sources` into a new document named `name`, reporting to `callback` when done.
	pub async fn combine_document(
		&self,
		name: &str,
		sources: &[DocumentId],
		callback: &Url,
	) -> Result<ResponseBody> {
		let sources: Vec<String> = sources.iter().map(|id| id.to_string()).collect();
		let params = RequestParams::new()
			.with("name", name)
			.with("source", sources)
			.with("callback", callback.as_str());

		self.post("combine", params).await
	}

	/// Converts `source` to PDF, reporting to `callback` when done.
	pub async fn convert_to_pdf(
		&self,
		source: &DocumentId,
		callback: &Url,
	) -> Result<ResponseBody> {
		let params = RequestParams::new()
			.with("source", source.to_string())
			.with("callback", callback.as_str());

		self.post("pdf", params).await
	}
}
