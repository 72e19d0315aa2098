//! Credentials, redacted secrets, and the client-credentials authorizer.

pub mod authorizer;
pub mod credentials;
pub mod grant;
pub mod secret;

pub use authorizer::*;
pub use credentials::*;
pub use grant::*;
pub use secret::*;
