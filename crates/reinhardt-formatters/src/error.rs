//! Error types for output formatting.

use thiserror::Error;

/// Errors that can occur while negotiating or writing a formatted response.
///
/// A formatter that cannot handle a value is not an error: applicability is
/// reported as `false` by [`OutputFormatter::can_write_result`] so that the
/// caller can move on to the next formatter.
///
/// [`OutputFormatter::can_write_result`]: crate::OutputFormatter::can_write_result
#[derive(Debug, Error)]
pub enum FormatterError {
	/// A required argument was missing or unusable.
	#[error("Invalid argument `{name}`: {reason}")]
	InvalidArgument {
		/// Name of the offending argument.
		name: &'static str,
		/// What was wrong with it.
		reason: String,
	},

	/// A media type string could not be parsed.
	#[error("Invalid media type: {0}")]
	InvalidMediaType(String),

	/// A charset label does not name an encoding that can be written.
	#[error("Unsupported encoding: {0}")]
	UnsupportedEncoding(String),

	/// The value could not be serialized.
	#[error("Serialization error: {0}")]
	Serialization(String),

	/// No registered formatter accepted the value and request.
	#[error("No output formatter can write the result")]
	NoFormatter,

	/// The underlying transport failed while writing the body.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

impl FormatterError {
	pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidArgument {
			name,
			reason: reason.into(),
		}
	}
}

impl From<serde_json::Error> for FormatterError {
	fn from(err: serde_json::Error) -> Self {
		Self::Serialization(err.to_string())
	}
}

/// Result type alias for formatter operations.
pub type FormatterResult<T> = Result<T, FormatterError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_invalid_argument_message() {
		let error = FormatterError::invalid_argument("media_types", "must not be empty");
		assert_eq!(
			error.to_string(),
			"Invalid argument `media_types`: must not be empty"
		);
	}

	#[rstest]
	fn test_io_error_from() {
		let io_error = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
		let error: FormatterError = io_error.into();
		assert!(matches!(error, FormatterError::Io(_)));
	}

	#[rstest]
	fn test_json_error_from() {
		let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
		let error: FormatterError = json_error.into();
		assert!(matches!(error, FormatterError::Serialization(_)));
	}
}
