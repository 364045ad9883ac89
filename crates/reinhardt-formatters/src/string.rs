//! Plain text formatter

use std::sync::Arc;

use async_trait::async_trait;

use crate::capabilities::FormatterCapabilities;
use crate::context::{ObjectType, OutputFormatterContext, ResultValue};
use crate::encoding::TextEncoding;
use crate::error::{FormatterError, FormatterResult};
use crate::formatter::{OutputFormatter, TextOutputFormatter, write_text};
use crate::media_type::MediaType;

/// Writes string results as-is, encoded with the negotiated charset.
///
/// Supports `text/plain` in UTF-8 (default) and UTF-16 by default. Once the
/// request's media-type constraints are satisfied, the negotiated content
/// type is always the default media type with the default charset; an outer
/// negotiation step may still replace it before writing.
///
/// # Examples
///
/// ```
/// use http::HeaderMap;
/// use reinhardt_formatters::{
///     HttpContext, ObjectType, OutputFormatter, OutputFormatterContext, StringOutputFormatter,
/// };
///
/// # #[tokio::main]
/// # async fn main() {
/// let formatter = StringOutputFormatter::new();
/// let mut body: Vec<u8> = Vec::new();
/// let mut context = OutputFormatterContext::new(
///     HttpContext::new(HeaderMap::new(), &mut body),
///     ObjectType::String,
///     Some("hello".into()),
/// );
///
/// assert!(formatter.can_write_result(&mut context));
/// assert_eq!(context.content_type(), Some("text/plain; charset=utf-8"));
///
/// formatter.write(&mut context).await.unwrap();
/// drop(context);
/// assert_eq!(body, b"hello");
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StringOutputFormatter {
	capabilities: Arc<FormatterCapabilities>,
}

impl StringOutputFormatter {
	/// Creates a `text/plain` formatter supporting UTF-8 and UTF-16
	pub fn new() -> Self {
		let capabilities = FormatterCapabilities::from_parts(
			vec![MediaType::new("text", "plain")],
			vec![TextEncoding::utf8(), TextEncoding::utf16le()],
		);
		Self {
			capabilities: capabilities.into_shared(),
		}
	}

	/// Creates a formatter with custom capabilities
	pub fn with_capabilities(capabilities: Arc<FormatterCapabilities>) -> Self {
		Self { capabilities }
	}
}

impl Default for StringOutputFormatter {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl OutputFormatter for StringOutputFormatter {
	fn name(&self) -> &'static str {
		"string"
	}

	fn can_write_result(&self, context: &mut OutputFormatterContext<'_>) -> bool {
		if !self.can_write_type(context.object_type(), context.object()) {
			return false;
		}
		if !self.can_write_media_type(context) {
			return false;
		}

		context.set_content_type(self.capabilities.default_content_type());
		true
	}

	async fn write(&self, context: &mut OutputFormatterContext<'_>) -> FormatterResult<()> {
		write_text(self, context).await
	}
}

#[async_trait]
impl TextOutputFormatter for StringOutputFormatter {
	fn capabilities(&self) -> &FormatterCapabilities {
		&self.capabilities
	}

	fn can_write_type(&self, object_type: ObjectType, object: Option<&ResultValue>) -> bool {
		object_type == ObjectType::String || matches!(object, Some(ResultValue::Text(_)))
	}

	async fn write_response_body(
		&self,
		context: &mut OutputFormatterContext<'_>,
		encoding: TextEncoding,
	) -> FormatterResult<()> {
		let (object, response) = context.object_and_response();
		let text = match object {
			None => return Ok(()),
			Some(ResultValue::Text(text)) => text,
			Some(other) => {
				return Err(FormatterError::invalid_argument(
					"context",
					format!("expected a string value, got {:?}", other.object_type()),
				));
			}
		};
		// No preamble or framing for empty payloads.
		if text.is_empty() {
			return Ok(());
		}

		let bytes = encoding.encode(text);
		response.write_body(&bytes).await?;
		tracing::trace!(
			bytes = bytes.len(),
			charset = %encoding,
			"Wrote string response body"
		);
		Ok(())
	}
}
