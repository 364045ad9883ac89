//! Serializable formatter configuration
//!
//! Projects usually declare formatter capabilities in code, but the same
//! declaration can be embedded in a settings document and converted at
//! startup.

use serde::{Deserialize, Serialize};

use crate::capabilities::FormatterCapabilities;
use crate::encoding::TextEncoding;
use crate::error::{FormatterError, FormatterResult};

/// Media types and charset labels for one formatter.
///
/// # Examples
///
/// ```
/// use reinhardt_formatters::{FormatterCapabilities, FormatterSettings};
///
/// let settings: FormatterSettings = serde_json::from_str(
///     r#"{"media_types": ["text/plain"], "encodings": ["utf-8", "utf-16"]}"#,
/// )
/// .unwrap();
///
/// let capabilities = FormatterCapabilities::try_from(settings).unwrap();
/// assert_eq!(capabilities.default_content_type(), "text/plain; charset=utf-8");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterSettings {
	/// Supported media types, default first
	#[serde(default)]
	pub media_types: Vec<String>,
	/// Supported charset labels, default first
	#[serde(default)]
	pub encodings: Vec<String>,
}

impl FormatterSettings {
	/// Settings matching the built-in plain text formatter
	pub fn text_plain() -> Self {
		Self {
			media_types: vec!["text/plain".to_string()],
			encodings: vec!["utf-8".to_string(), "utf-16".to_string()],
		}
	}
}

impl TryFrom<FormatterSettings> for FormatterCapabilities {
	type Error = FormatterError;

	fn try_from(settings: FormatterSettings) -> FormatterResult<Self> {
		let mut builder = FormatterCapabilities::builder();
		for media_type in settings.media_types {
			if media_type.trim().is_empty() {
				return Err(FormatterError::invalid_argument(
					"media_types",
					"media type entries must not be blank",
				));
			}
			builder = builder.media_type(media_type);
		}
		for label in &settings.encodings {
			builder = builder.encoding(TextEncoding::for_label(label)?);
		}
		builder.build()
	}
}
