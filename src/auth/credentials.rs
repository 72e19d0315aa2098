//! Client-credentials pair owned by a single client instance.

// self
use crate::{_prelude::*, auth::ClientSecret};

/// OAuth client id + secret used for the client-credentials grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	client_id: String,
	client_secret: ClientSecret,
}
impl Credentials {
	/// Creates a credentials pair.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<ClientSecret>) -> Self {
		Self { client_id: client_id.into(), client_secret: client_secret.into() }
	}

	/// Returns the client id.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Returns the client secret wrapper.
	pub fn client_secret(&self) -> &ClientSecret {
		&self.client_secret
	}

	/// Replaces the client id.
	pub fn set_client_id(&mut self, client_id: impl Into<String>) {
		self.client_id = client_id.into();
	}

	/// Replaces the client secret.
	pub fn set_client_secret(&mut self, client_secret: impl Into<ClientSecret>) {
		self.client_secret = client_secret.into();
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.finish()
	}
}
