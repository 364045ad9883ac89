//! JSON formatter

use std::sync::Arc;

use async_trait::async_trait;

use crate::capabilities::FormatterCapabilities;
use crate::context::{ObjectType, OutputFormatterContext, ResultValue};
use crate::encoding::TextEncoding;
use crate::error::{FormatterError, FormatterResult};
use crate::formatter::{OutputFormatter, TextOutputFormatter, write_text};
use crate::media_type::MediaType;

/// Serializes JSON results with `serde_json`.
///
/// Supports `application/json`, `text/json` and any `application/*+json`
/// media type, in UTF-8 (default) and UTF-16. An absent value is written as
/// `null`.
#[derive(Debug, Clone)]
pub struct JsonOutputFormatter {
	capabilities: Arc<FormatterCapabilities>,
	/// Whether to pretty-print the output
	pub pretty: bool,
}

impl Default for JsonOutputFormatter {
	fn default() -> Self {
		let capabilities = FormatterCapabilities::from_parts(
			vec![
				MediaType::new("application", "json"),
				MediaType::new("text", "json"),
				MediaType::new("application", "*+json"),
			],
			vec![TextEncoding::utf8(), TextEncoding::utf16le()],
		);
		Self {
			capabilities: capabilities.into_shared(),
			pretty: false,
		}
	}
}

impl JsonOutputFormatter {
	/// Creates a new JSON formatter with compact output
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::JsonOutputFormatter;
	///
	/// let formatter = JsonOutputFormatter::new();
	/// assert!(!formatter.pretty);
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets whether to pretty-print the output
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::JsonOutputFormatter;
	///
	/// let formatter = JsonOutputFormatter::new().pretty(true);
	/// assert!(formatter.pretty);
	/// ```
	pub fn pretty(mut self, pretty: bool) -> Self {
		self.pretty = pretty;
		self
	}

	/// Replaces the supported media types and encodings
	pub fn with_capabilities(mut self, capabilities: Arc<FormatterCapabilities>) -> Self {
		self.capabilities = capabilities;
		self
	}

	fn serialize(&self, value: &serde_json::Value) -> FormatterResult<String> {
		let json = if self.pretty {
			serde_json::to_string_pretty(value)?
		} else {
			serde_json::to_string(value)?
		};
		Ok(json)
	}
}

#[async_trait]
impl OutputFormatter for JsonOutputFormatter {
	fn name(&self) -> &'static str {
		"json"
	}

	fn can_write_result(&self, context: &mut OutputFormatterContext<'_>) -> bool {
		self.can_write_type(context.object_type(), context.object()) && self.can_write_media_type(context)
	}

	async fn write(&self, context: &mut OutputFormatterContext<'_>) -> FormatterResult<()> {
		write_text(self, context).await
	}
}

#[async_trait]
impl TextOutputFormatter for JsonOutputFormatter {
	fn capabilities(&self) -> &FormatterCapabilities {
		&self.capabilities
	}

	fn can_write_type(&self, object_type: ObjectType, object: Option<&ResultValue>) -> bool {
		object_type == ObjectType::Json || matches!(object, Some(ResultValue::Json(_)))
	}

	async fn write_response_body(
		&self,
		context: &mut OutputFormatterContext<'_>,
		encoding: TextEncoding,
	) -> FormatterResult<()> {
		let (object, response) = context.object_and_response();
		let json = match object {
			None => self.serialize(&serde_json::Value::Null)?,
			Some(ResultValue::Json(value)) => self.serialize(value)?,
			Some(ResultValue::Text(text)) => serde_json::to_string(text)?,
			Some(ResultValue::Bytes(_)) => {
				return Err(FormatterError::Serialization(
					"raw bytes cannot be written as JSON".to_string(),
				));
			}
		};

		let bytes = encoding.encode(&json);
		response.write_body(&bytes).await?;
		tracing::trace!(
			bytes = bytes.len(),
			charset = %encoding,
			"Wrote JSON response body"
		);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::HttpContext;
	use http::header::{ACCEPT, CONTENT_TYPE};
	use http::{HeaderMap, HeaderValue};
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn formatter() -> JsonOutputFormatter {
		JsonOutputFormatter::new()
	}

	fn accept(value: &'static str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(ACCEPT, HeaderValue::from_static(value));
		headers
	}

	#[rstest]
	fn test_json_value_is_applicable(formatter: JsonOutputFormatter) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::for_value(
			HttpContext::new(HeaderMap::new(), &mut body),
			json!({"id": 1}).into(),
		);
		assert!(formatter.can_write_result(&mut context));
		assert_eq!(context.content_type(), Some("application/json"));
	}

	#[rstest]
	fn test_string_value_is_not_applicable(formatter: JsonOutputFormatter) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::for_value(
			HttpContext::new(HeaderMap::new(), &mut body),
			"plain".into(),
		);
		assert!(!formatter.can_write_result(&mut context));
	}

	#[rstest]
	#[case("text/json", "text/json")]
	#[case("application/problem+json", "application/problem+json")]
	#[case("application/*", "application/json")]
	#[case("application/*+json, application/json; q=0.5", "application/json")]
	fn test_accept_selects_media_type(
		formatter: JsonOutputFormatter,
		#[case] header: &'static str,
		#[case] expected: &str,
	) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::for_value(
			HttpContext::new(accept(header), &mut body),
			json!([]).into(),
		);
		assert!(formatter.can_write_result(&mut context));
		assert_eq!(context.content_type(), Some(expected));
	}

	#[rstest]
	#[tokio::test]
	async fn test_suffix_wildcard_never_reaches_content_type(formatter: JsonOutputFormatter) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::for_value(
			HttpContext::new(accept("application/*+json"), &mut body),
			json!({"a": 1}).into(),
		);
		assert!(!formatter.can_write_result(&mut context));
		assert!(context.content_type().is_none());

		let formatters = crate::FormatterCollection::new().register(formatter);
		formatters.write(&mut context).await.unwrap();

		let http = context.into_http();
		assert_eq!(
			http.response.headers.get(CONTENT_TYPE).unwrap(),
			"application/json; charset=utf-8"
		);
		drop(http);
		assert_eq!(body, br#"{"a":1}"#);
	}

	#[rstest]
	fn test_expected_suffix_wildcard_is_declined(formatter: JsonOutputFormatter) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::for_value(
			HttpContext::new(HeaderMap::new(), &mut body),
			json!({"a": 1}).into(),
		);
		context.set_content_type("application/*+json");
		assert!(!formatter.can_write_result(&mut context));
		assert_eq!(context.content_type(), Some("application/*+json"));

		context.set_content_type("application/*");
		assert!(formatter.can_write_result(&mut context));
		assert_eq!(context.content_type(), Some("application/json"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_write_compact(formatter: JsonOutputFormatter) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::for_value(
			HttpContext::new(HeaderMap::new(), &mut body),
			json!({"message": "hello"}).into(),
		);
		assert!(formatter.can_write_result(&mut context));
		formatter.write(&mut context).await.unwrap();

		let http = context.into_http();
		assert_eq!(
			http.response.headers.get(CONTENT_TYPE).unwrap(),
			"application/json; charset=utf-8"
		);
		drop(http);
		assert_eq!(body, br#"{"message":"hello"}"#);
	}

	#[rstest]
	#[tokio::test]
	async fn test_write_pretty() {
		let formatter = JsonOutputFormatter::new().pretty(true);
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::for_value(
			HttpContext::new(HeaderMap::new(), &mut body),
			json!({"a": 1}).into(),
		);
		formatter
			.write_response_body(&mut context, TextEncoding::utf8())
			.await
			.unwrap();
		drop(context);
		assert_eq!(String::from_utf8(body).unwrap(), "{\n  \"a\": 1\n}");
	}

	#[rstest]
	#[tokio::test]
	async fn test_absent_value_is_null(formatter: JsonOutputFormatter) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::new(
			HttpContext::new(HeaderMap::new(), &mut body),
			ObjectType::Json,
			None,
		);
		formatter
			.write_response_body(&mut context, TextEncoding::utf8())
			.await
			.unwrap();
		drop(context);
		assert_eq!(body, b"null");
	}

	#[rstest]
	#[tokio::test]
	async fn test_text_declared_json_is_quoted(formatter: JsonOutputFormatter) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::new(
			HttpContext::new(HeaderMap::new(), &mut body),
			ObjectType::Json,
			Some("say \"hi\"".into()),
		);
		formatter
			.write_response_body(&mut context, TextEncoding::utf8())
			.await
			.unwrap();
		drop(context);
		assert_eq!(body, br#""say \"hi\"""#);
	}

	#[rstest]
	#[tokio::test]
	async fn test_bytes_are_rejected(formatter: JsonOutputFormatter) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::new(
			HttpContext::new(HeaderMap::new(), &mut body),
			ObjectType::Json,
			Some(bytes::Bytes::from_static(b"\x01").into()),
		);
		let result = formatter
			.write_response_body(&mut context, TextEncoding::utf8())
			.await;
		assert!(matches!(result, Err(FormatterError::Serialization(_))));
	}
}
