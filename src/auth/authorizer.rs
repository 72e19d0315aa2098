//! Client-credentials exchange against the token endpoint.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Credentials, GrantType},
	http::{ApiRequest, Transport},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
};

/// Resource path of the token endpoint, relative to the base URL.
pub const TOKEN_RESOURCE: &str = "oauth/token";

/// Exchanges credentials for a fresh access token.
///
/// The authorizer is stateless: persisting the token is the caller's job. Transport failures
/// (including [`Error::Unauthorized`] when the credentials are refused) pass through untouched.
pub struct Authorizer<T>
where
	T: ?Sized + Transport,
{
	transport: Arc<T>,
}
impl<T> Authorizer<T>
where
	T: ?Sized + Transport,
{
	/// Creates an authorizer that dispatches through `transport`.
	pub fn new(transport: Arc<T>) -> Self {
		Self { transport }
	}

	/// Requests a token with the client-credentials grant.
	///
	/// Succeeds only when the token response itself carries HTTP 200 and a JSON body with a
	/// string `access_token`; every other response becomes [`Error::Authorization`] with the
	/// observed status.
	pub async fn authorize(&self, credentials: &Credentials) -> Result<AccessToken> {
		const KIND: OperationKind = OperationKind::Authorize;

		let span = OperationSpan::new(KIND, TOKEN_RESOURCE);

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span.instrument(self.exchange(credentials)).await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	async fn exchange(&self, credentials: &Credentials) -> Result<AccessToken> {
		let request = ApiRequest::get(TOKEN_RESOURCE)
			.param("client_id", credentials.client_id())
			.param("client_secret", credentials.client_secret().expose())
			.param("grant_type", GrantType::ClientCredentials.as_str());
		let response = self.transport.execute(&request).await?;
		let status = response.metadata.status;

		if status != 200 {
			return Err(Error::Authorization {
				status: Some(status),
				reason: format!("token endpoint answered with HTTP {status}"),
			});
		}

		response
			.body
			.as_json()
			.and_then(|json| json.get("access_token"))
			.and_then(|token| token.as_str())
			.map(AccessToken::from)
			.ok_or_else(|| Error::Authorization {
				status: Some(status),
				reason: "token response is missing `access_token`".into(),
			})
	}
}
impl<T> Clone for Authorizer<T>
where
	T: ?Sized + Transport,
{
	fn clone(&self) -> Self {
		Self { transport: self.transport.clone() }
	}
}
impl<T> Debug for Authorizer<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authorizer").field("resource", &TOKEN_RESOURCE).finish()
	}
}
