//! File attachments validated before any network I/O.

// std
use std::{
	fs::{self, File},
	io,
};
// self
use crate::_prelude::*;

/// Error raised when a path cannot be attached to a request.
#[derive(Debug, ThisError)]
pub enum FileError {
	/// Nothing exists at the path.
	#[error("File {} does not exist.", .path.display())]
	NotFound {
		/// Offending path.
		path: PathBuf,
	},
	/// The path exists but is not a regular file.
	#[error("Path {} is not a regular file.", .path.display())]
	NotAFile {
		/// Offending path.
		path: PathBuf,
	},
	/// The file exists but cannot be read.
	#[error("File {} cannot be read.", .path.display())]
	Unreadable {
		/// Offending path.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: io::Error,
	},
}

/// Readable regular file ready to be attached to a multipart request.
///
/// Construction checks existence, file type, and read permission; the bytes themselves are
/// only loaded when a transport encodes the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileAttachment {
	path: PathBuf,
	file_name: String,
}
impl FileAttachment {
	/// Validates `path` and wraps it.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, FileError> {
		let path = path.as_ref();
		let metadata = fs::metadata(path).map_err(|e| match e.kind() {
			io::ErrorKind::NotFound => FileError::NotFound { path: path.to_owned() },
			_ => FileError::Unreadable { path: path.to_owned(), source: e },
		})?;

		if !metadata.is_file() {
			return Err(FileError::NotAFile { path: path.to_owned() });
		}

		File::open(path)
			.map_err(|e| FileError::Unreadable { path: path.to_owned(), source: e })?;

		let file_name = path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| "file".to_owned());

		Ok(Self { path: path.to_owned(), file_name })
	}

	/// Path the attachment was validated from.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// File name sent in the multipart `Content-Disposition`.
	pub fn file_name(&self) -> &str {
		&self.file_name
	}

	/// Reads the file contents.
	pub fn read(&self) -> Result<Vec<u8>, FileError> {
		fs::read(&self.path)
			.map_err(|e| FileError::Unreadable { path: self.path.clone(), source: e })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"docbuild_file_{label}_{}_{}",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn open_accepts_readable_file() {
		let path = temp_path("valid.docx");

		fs::write(&path, b"payload").expect("Failed to write temporary attachment.");

		let attachment = FileAttachment::open(&path).expect("Readable file should validate.");

		assert_eq!(attachment.path(), path.as_path());
		assert!(attachment.file_name().ends_with("valid.docx"));
		assert_eq!(attachment.read().expect("Attachment should be readable."), b"payload");

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary attachment {}: {e}", path.display())
		});
	}

	#[test]
	fn open_rejects_missing_paths_and_directories() {
		let missing = FileAttachment::open("notafile").expect_err("Missing path should fail.");

		assert!(matches!(missing, FileError::NotFound { .. }));

		let dir = FileAttachment::open(env::temp_dir()).expect_err("Directory should fail.");

		assert!(matches!(dir, FileError::NotAFile { .. }));
	}
}
