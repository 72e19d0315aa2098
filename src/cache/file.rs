//! File-backed [`TokenCache`] that survives process restarts.

// std
use std::{
	env,
	fs::{self, File},
	io::{ErrorKind, Write},
};
// crates.io
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	cache::{CacheError, CacheFuture, TokenCache},
};

/// On-disk representation of one cached value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct CacheEntry {
	key: String,
	value: String,
	saved_at: OffsetDateTime,
}

/// Stores each key in its own JSON file named by the SHA-256 digest of the key.
///
/// Writes go through a temporary file and a rename, so readers never observe a partially
/// written entry.
#[derive(Clone, Debug)]
pub struct FileCache {
	dir: PathBuf,
	lock: Arc<RwLock<()>>,
}
impl FileCache {
	/// Opens (or creates) a cache rooted at `dir`.
	pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
		let dir = dir.into();

		fs::create_dir_all(&dir).map_err(|e| CacheError::Backend {
			message: format!("Failed to create cache directory {}: {e}", dir.display()),
		})?;

		Ok(Self { dir, lock: Default::default() })
	}

	/// Default cache directory: `docbuild` under the system temp directory.
	pub fn default_dir() -> PathBuf {
		env::temp_dir().join("docbuild")
	}

	/// Directory holding the entries.
	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Returns when the value under `key` was written, if present.
	pub fn saved_at(&self, key: &str) -> Result<Option<OffsetDateTime>, CacheError> {
		let _guard = self.lock.read();

		Ok(self.load(key)?.map(|entry| entry.saved_at))
	}

	fn entry_path(&self, key: &str) -> PathBuf {
		let digest = Sha256::digest(key.as_bytes());
		let name: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();

		self.dir.join(format!("{name}.json"))
	}

	fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
		let path = self.entry_path(key);
		let bytes = match fs::read(&path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) =>
				return Err(CacheError::Backend {
					message: format!("Failed to read {}: {e}", path.display()),
				}),
		};
		let entry: CacheEntry =
			serde_json::from_slice(&bytes).map_err(|e| CacheError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		// Digest collisions are not expected, but a foreign entry must never be returned.
		Ok(Some(entry).filter(|entry| entry.key == key))
	}

	fn persist(&self, entry: &CacheEntry) -> Result<(), CacheError> {
		let path = self.entry_path(&entry.key);
		let serialized =
			serde_json::to_vec_pretty(entry).map_err(|e| CacheError::Serialization {
				message: format!("Failed to serialize cache entry: {e}"),
			})?;
		let mut tmp_path = path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| CacheError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| CacheError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| CacheError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &path).map_err(|e| CacheError::Backend {
			message: format!("Failed to replace {}: {e}", path.display()),
		})
	}

	fn remove(&self, key: &str) -> Result<bool, CacheError> {
		let path = self.entry_path(key);

		match fs::remove_file(&path) {
			Ok(()) => Ok(true),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
			Err(e) => Err(CacheError::Backend {
				message: format!("Failed to remove {}: {e}", path.display()),
			}),
		}
	}
}
impl TokenCache for FileCache {
	fn contains<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool> {
		Box::pin(async move {
			let _guard = self.lock.read();

			Ok(self.load(key)?.is_some())
		})
	}

	fn fetch<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
		Box::pin(async move {
			let _guard = self.lock.read();

			Ok(self.load(key)?.map(|entry| entry.value))
		})
	}

	fn save<'a>(&'a self, key: &'a str, value: String) -> CacheFuture<'a, ()> {
		Box::pin(async move {
			let entry =
				CacheEntry { key: key.to_owned(), value, saved_at: OffsetDateTime::now_utc() };
			let _guard = self.lock.write();

			self.persist(&entry)
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool> {
		Box::pin(async move {
			let _guard = self.lock.write();

			self.remove(key)
		})
	}
}
