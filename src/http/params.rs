//! Request parameter maps shared by every transport.

// std
use std::collections::btree_map::Iter;
// self
use crate::{_prelude::*, error::ConfigError, file::FileAttachment, http::Method};

/// Single request parameter value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
	/// Plain text value.
	Text(String),
	/// Ordered list, sent as `key[0]`, `key[1]`, ...
	List(Vec<String>),
	/// Validated file attached to a multipart body.
	File(FileAttachment),
}
impl ParamValue {
	/// Returns the text value, if this is one.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(value) => Some(value),
			_ => None,
		}
	}
}
impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}
impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl From<Vec<String>> for ParamValue {
	fn from(value: Vec<String>) -> Self {
		Self::List(value)
	}
}
impl From<FileAttachment> for ParamValue {
	fn from(value: FileAttachment) -> Self {
		Self::File(value)
	}
}

/// Ordered parameter map attached to an [`ApiRequest`](crate::http::ApiRequest).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestParams(BTreeMap<String, ParamValue>);
impl RequestParams {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.insert(key, value);

		self
	}

	/// Inserts or replaces a parameter, returning the previous value.
	pub fn insert(
		&mut self,
		key: impl Into<String>,
		value: impl Into<ParamValue>,
	) -> Option<ParamValue> {
		self.0.insert(key.into(), value.into())
	}

	/// Returns the value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&ParamValue> {
		self.0.get(key)
	}

	/// Removes and returns the value stored under `key`.
	pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
		self.0.remove(key)
	}

	/// Returns `true` when `key` is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no parameters are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates parameters in key order.
	pub fn iter(&self) -> Iter<'_, String, ParamValue> {
		self.0.iter()
	}

	/// Returns `true` when any value is a file, which forces a multipart body.
	pub fn has_files(&self) -> bool {
		self.0.values().any(|value| matches!(value, ParamValue::File(_)))
	}

	/// Flattens text and list values into key/value pairs for query strings and URL-encoded
	/// forms.
	///
	/// Files cannot be flattened and fail with [`ConfigError::UnsupportedParam`].
	pub fn encode_pairs(&self, method: Method) -> Result<Vec<(String, String)>, ConfigError> {
		let mut pairs = Vec::with_capacity(self.0.len());

		for (key, value) in &self.0 {
			match value {
				ParamValue::Text(text) => pairs.push((key.clone(), text.clone())),
				ParamValue::List(items) =>
					for (idx, item) in items.iter().enumerate() {
						pairs.push((format!("{key}[{idx}]"), item.clone()));
					},
				ParamValue::File(_) =>
					return Err(ConfigError::UnsupportedParam {
						key: key.clone(),
						method: method.as_str(),
					}),
			}
		}

		Ok(pairs)
	}
}
impl<K, V> FromIterator<(K, V)> for RequestParams
where
	K: Into<String>,
	V: Into<ParamValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}
impl<'a> IntoIterator for &'a RequestParams {
	type IntoIter = Iter<'a, String, ParamValue>;
	type Item = (&'a String, &'a ParamValue);

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn lists_flatten_with_indices() {
		let params = RequestParams::new()
			.with("name", "Combined Document 2")
			.with("source", vec!["a".to_owned(), "b".to_owned()]);
		let pairs =
			params.encode_pairs(Method::Post).expect("Text and list params should flatten.");

		assert_eq!(
			pairs,
			vec![
				("name".to_owned(), "Combined Document 2".to_owned()),
				("source[0]".to_owned(), "a".to_owned()),
				("source[1]".to_owned(), "b".to_owned()),
			]
		);
	}

	#[test]
	fn insert_overwrites_previous_value() {
		let mut params: RequestParams = [("access_token", "stale")].into_iter().collect();
		let previous = params.insert("access_token", "fresh");

		assert_eq!(previous, Some(ParamValue::Text("stale".into())));
		assert_eq!(params.get("access_token").and_then(ParamValue::as_text), Some("fresh"));
		assert_eq!(params.len(), 1);
		assert!(!params.has_files());
	}
}
