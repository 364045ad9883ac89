//! Supported media types and encodings of a formatter
//!
//! A formatter declares what it can produce once, at construction. The
//! declaration is immutable afterwards and is shared read-only between all
//! requests, so formatters hold it behind an [`Arc`].

use std::sync::Arc;

use crate::encoding::TextEncoding;
use crate::error::{FormatterError, FormatterResult};
use crate::media_type::MediaType;

/// Media types and text encodings a formatter supports.
///
/// Both lists are non-empty and ordered; the first entry of each is the
/// default used when a request does not ask for anything more specific.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatterCapabilities {
	media_types: Vec<MediaType>,
	encodings: Vec<TextEncoding>,
}

impl FormatterCapabilities {
	/// Starts building a capability declaration
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::{FormatterCapabilities, TextEncoding};
	///
	/// let capabilities = FormatterCapabilities::builder()
	///     .media_type("text/plain")
	///     .encoding(TextEncoding::utf8())
	///     .encoding(TextEncoding::utf16le())
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(capabilities.default_media_type().to_string(), "text/plain");
	/// assert_eq!(capabilities.default_encoding(), TextEncoding::utf8());
	/// assert_eq!(capabilities.supported_encodings().len(), 2);
	/// ```
	pub fn builder() -> FormatterCapabilitiesBuilder {
		FormatterCapabilitiesBuilder::default()
	}

	/// Declaration for built-in formatters whose lists are known to be valid
	pub(crate) fn from_parts(media_types: Vec<MediaType>, encodings: Vec<TextEncoding>) -> Self {
		debug_assert!(!media_types.is_empty() && !encodings.is_empty());
		Self {
			media_types,
			encodings,
		}
	}

	/// Supported media types in registration order
	pub fn supported_media_types(&self) -> &[MediaType] {
		&self.media_types
	}

	/// Supported encodings in registration order
	pub fn supported_encodings(&self) -> &[TextEncoding] {
		&self.encodings
	}

	/// First registered media type
	pub fn default_media_type(&self) -> &MediaType {
		// Non-empty, enforced by the builder.
		&self.media_types[0]
	}

	/// First registered encoding
	pub fn default_encoding(&self) -> TextEncoding {
		self.encodings[0]
	}

	/// `<default media type>; charset=<default charset>`
	pub fn default_content_type(&self) -> String {
		self.default_media_type()
			.with_charset(&self.default_encoding().charset())
			.to_string()
	}

	/// Whether `encoding` is one of the supported encodings
	pub fn supports_encoding(&self, encoding: &TextEncoding) -> bool {
		self.encodings.contains(encoding)
	}

	/// Finds the supported media type compatible with `requested`.
	///
	/// A supported type matches when it is a subset of the requested one
	/// (`text/plain` for `text/*`), or when the requested type is a subset of
	/// it (`text/plain; charset=utf-8` for `text/plain`). Supported wildcard
	/// types such as `application/*+json` only match in the second way.
	pub fn find_media_type(&self, requested: &MediaType) -> Option<&MediaType> {
		self.media_types
			.iter()
			.find(|supported| !supported.has_wildcard() && supported.is_subset_of(requested))
			.or_else(|| {
				self.media_types
					.iter()
					.find(|supported| requested.is_subset_of(supported))
			})
	}

	/// Wraps the declaration for sharing between formatters and requests
	pub fn into_shared(self) -> Arc<Self> {
		Arc::new(self)
	}
}

/// Builder for [`FormatterCapabilities`]
///
/// Media types are parsed at [`build`](Self::build) time so that the builder
/// chain stays infallible.
#[derive(Debug, Default)]
pub struct FormatterCapabilitiesBuilder {
	media_types: Vec<String>,
	encodings: Vec<TextEncoding>,
}

impl FormatterCapabilitiesBuilder {
	/// Registers a supported media type
	pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
		self.media_types.push(media_type.into());
		self
	}

	/// Registers a supported encoding
	pub fn encoding(mut self, encoding: TextEncoding) -> Self {
		self.encodings.push(encoding);
		self
	}

	/// Validates and freezes the declaration.
	///
	/// Fails when either list is empty or a media type cannot be parsed.
	/// Duplicate entries are dropped, keeping the first occurrence.
	pub fn build(self) -> FormatterResult<FormatterCapabilities> {
		if self.media_types.is_empty() {
			return Err(FormatterError::invalid_argument(
				"media_types",
				"at least one supported media type is required",
			));
		}
		if self.encodings.is_empty() {
			return Err(FormatterError::invalid_argument(
				"encodings",
				"at least one supported encoding is required",
			));
		}

		let mut media_types: Vec<MediaType> = Vec::with_capacity(self.media_types.len());
		for raw in &self.media_types {
			let parsed: MediaType = raw.parse()?;
			if !media_types.contains(&parsed) {
				media_types.push(parsed);
			}
		}

		let mut encodings: Vec<TextEncoding> = Vec::with_capacity(self.encodings.len());
		for encoding in self.encodings {
			if !encodings.contains(&encoding) {
				encodings.push(encoding);
			}
		}

		Ok(FormatterCapabilities {
			media_types,
			encodings,
		})
	}
}
