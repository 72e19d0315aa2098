//! Default [`Transport`] backed by reqwest.

// crates.io
use reqwest::{
	RequestBuilder,
	header::{CONTENT_TYPE, HeaderMap},
	multipart::{Form, Part},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	http::{
		ApiRequest, ApiResponse, DefaultFailureClassifier, FailureClassifier, FailureContext,
		Method, ParamValue, RequestParams, ResponseBody, ResponseMetadata, ResponseMetadataSlot,
		Transport, TransportFuture, join_resource,
	},
};

/// Reqwest-backed transport.
///
/// `GET` parameters travel in the query string. `POST` parameters travel as a URL-encoded
/// form, or as a multipart body when any value is a file. Non-2xx responses are classified by
/// the configured [`FailureClassifier`].
#[derive(Clone)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	base_url: Arc<RwLock<Option<Url>>>,
	classifier: Arc<dyn FailureClassifier>,
	last: ResponseMetadataSlot,
}
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self {
			client,
			base_url: Default::default(),
			classifier: Arc::new(DefaultFailureClassifier),
			last: Default::default(),
		}
	}

	/// Replaces the failure classifier.
	pub fn with_classifier(mut self, classifier: Arc<dyn FailureClassifier>) -> Self {
		self.classifier = classifier;

		self
	}

	/// Returns the configured base URL.
	pub fn base_url(&self) -> Option<Url> {
		self.base_url.read().clone()
	}

	fn endpoint(&self, resource: &str) -> Result<Url, ConfigError> {
		let guard = self.base_url.read();
		let base = guard.as_ref().ok_or(ConfigError::InvalidBaseUrl {
			value: String::new(),
			source: None,
		})?;

		join_resource(base, resource)
	}

	fn build(&self, request: &ApiRequest) -> Result<RequestBuilder> {
		let url = self.endpoint(&request.resource)?;
		let mut builder = match request.method {
			Method::Get => self.client.get(url).query(&request.params.encode_pairs(Method::Get)?),
			Method::Post if request.params.has_files() =>
				self.client.post(url).multipart(multipart_form(&request.params)?),
			Method::Post => self.client.post(url).form(&request.params.encode_pairs(Method::Post)?),
		};

		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}

		Ok(builder)
	}
}
impl Default for ReqwestTransport {
	fn default() -> Self {
		Self::with_client(ReqwestClient::default())
	}
}
impl Debug for ReqwestTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestTransport").field("base_url", &self.base_url()).finish()
	}
}
impl Transport for ReqwestTransport {
	fn set_base_url(&self, url: Url) {
		*self.base_url.write() = Some(url);
	}

	fn execute<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a, ApiResponse> {
		Box::pin(async move {
			self.last.take();

			let builder = self.build(request)?;
			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let headers = collect_headers(response.headers());
			let content_type = response
				.headers()
				.get(CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(str::to_owned);

			let metadata = ResponseMetadata { status, headers };
			let bytes = response.bytes().await;

			// Stored even when reading the body fails.
			self.last.store(metadata.clone());

			let bytes = bytes.map_err(TransportError::from)?;

			if !(200..300).contains(&status) {
				let ctx = FailureContext::from_response(status, &bytes);
				let kind = self.classifier.classify(&ctx);

				return Err(ctx.into_error(kind));
			}

			let body = ResponseBody::decode(status, content_type.as_deref(), &bytes)?;

			Ok(ApiResponse { metadata, body })
		})
	}

	fn last_response(&self) -> Option<ResponseMetadata> {
		self.last.get()
	}
}

fn multipart_form(params: &RequestParams) -> Result<Form> {
	let mut form = Form::new();

	for (key, value) in params {
		match value {
			ParamValue::Text(text) => form = form.text(key.clone(), text.clone()),
			ParamValue::List(items) =>
				for (idx, item) in items.iter().enumerate() {
					form = form.text(format!("{key}[{idx}]"), item.clone());
				},
			ParamValue::File(file) => {
				let part = Part::bytes(file.read()?).file_name(file.file_name().to_owned());

				form = form.part(key.clone(), part);
			},
		}
	}

	Ok(form)
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
	let mut collected: BTreeMap<String, Vec<String>> = BTreeMap::new();

	for (name, value) in headers {
		collected
			.entry(name.as_str().to_owned())
			.or_default()
			.push(String::from_utf8_lossy(value.as_bytes()).into_owned());
	}

	collected
}
