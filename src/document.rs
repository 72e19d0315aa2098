//! Strongly typed document identifiers.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;
const RESERVED_CHARS: [char; 5] = ['/', '?', '#', '%', '\\'];

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Document identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Document identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier contains a character that would alter the resource path.
	#[error("Document identifier contains the reserved character `{0}`.")]
	ReservedCharacter(char),
	/// The identifier exceeded the allowed character count.
	#[error("Document identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Identifier of a stored document; safe to embed as a single path segment.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);
impl DocumentId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for DocumentId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for DocumentId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<DocumentId> for String {
	fn from(value: DocumentId) -> Self {
		value.0
	}
}
impl TryFrom<String> for DocumentId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Debug for DocumentId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Document({})", self.0)
	}
}
impl Display for DocumentId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for DocumentId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if let Some(reserved) = view.chars().find(|ch| RESERVED_CHARS.contains(ch)) {
		return Err(IdentifierError::ReservedCharacter(reserved));
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
