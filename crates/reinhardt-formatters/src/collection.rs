//! Ordered formatter registry
//!
//! [`FormatterCollection`] asks each registered formatter in turn whether it
//! can write the result and hands the write to the first one that accepts.
//! Formatters are not ranked against each other; registration order decides.

use std::fmt;
use std::sync::Arc;

use crate::context::OutputFormatterContext;
use crate::error::{FormatterError, FormatterResult};
use crate::formatter::OutputFormatter;
use crate::json::JsonOutputFormatter;
use crate::no_content::NoContentOutputFormatter;
use crate::string::StringOutputFormatter;

/// Registry of output formatters in priority order.
///
/// # Examples
///
/// ```
/// use http::HeaderMap;
/// use reinhardt_formatters::{FormatterCollection, HttpContext, OutputFormatterContext};
///
/// # #[tokio::main]
/// # async fn main() {
/// let formatters = FormatterCollection::with_defaults();
///
/// let mut body: Vec<u8> = Vec::new();
/// let mut context = OutputFormatterContext::for_value(
///     HttpContext::new(HeaderMap::new(), &mut body),
///     "hello".into(),
/// );
/// formatters.write(&mut context).await.unwrap();
/// drop(context);
/// assert_eq!(body, b"hello");
/// # }
/// ```
#[derive(Clone, Default)]
pub struct FormatterCollection {
	formatters: Vec<Arc<dyn OutputFormatter>>,
	return_http_not_acceptable: bool,
}

impl FormatterCollection {
	/// Creates an empty collection
	pub fn new() -> Self {
		Self::default()
	}

	/// No-content, string and JSON formatters, in that order
	pub fn with_defaults() -> Self {
		Self::new()
			.register(NoContentOutputFormatter::new())
			.register(StringOutputFormatter::new())
			.register(JsonOutputFormatter::new())
	}

	/// Appends a formatter
	pub fn register<F: OutputFormatter + 'static>(mut self, formatter: F) -> Self {
		self.formatters.push(Arc::new(formatter));
		self
	}

	/// Appends an already shared formatter
	pub fn register_shared(mut self, formatter: Arc<dyn OutputFormatter>) -> Self {
		self.formatters.push(formatter);
		self
	}

	/// When `false` (the default) and no formatter satisfies the request's
	/// `Accept` header, selection is retried with the header ignored.
	pub fn return_http_not_acceptable(mut self, enabled: bool) -> Self {
		self.return_http_not_acceptable = enabled;
		self
	}

	pub fn len(&self) -> usize {
		self.formatters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.formatters.is_empty()
	}

	/// Returns the first formatter that can write the context's result.
	///
	/// The selected formatter has already recorded the negotiated content
	/// type on the context.
	pub fn select(&self, context: &mut OutputFormatterContext<'_>) -> Option<Arc<dyn OutputFormatter>> {
		if let Some(formatter) = self.first_applicable(context) {
			return Some(formatter);
		}

		let accept_present = !context.request().accept().is_empty();
		if self.return_http_not_acceptable || !accept_present || context.content_type().is_some() {
			return None;
		}

		tracing::debug!("No formatter matches the Accept header, retrying without it");
		context.set_ignore_accept_header(true);
		let selected = self.first_applicable(context);
		context.set_ignore_accept_header(false);
		selected
	}

	/// Selects a formatter and writes the result with it.
	///
	/// Fails with [`FormatterError::NoFormatter`] when nothing applies;
	/// callers usually answer `406 Not Acceptable` in that case.
	pub async fn write(&self, context: &mut OutputFormatterContext<'_>) -> FormatterResult<()> {
		let formatter = self.select(context).ok_or(FormatterError::NoFormatter)?;
		formatter.write(context).await
	}

	fn names(&self) -> Vec<&'static str> {
		self.formatters.iter().map(|f| f.name()).collect()
	}

	fn first_applicable(&self, context: &mut OutputFormatterContext<'_>) -> Option<Arc<dyn OutputFormatter>> {
		for formatter in &self.formatters {
			if formatter.can_write_result(context) {
				tracing::debug!(
					formatter = formatter.name(),
					content_type = context.content_type(),
					"Selected output formatter"
				);
				return Some(Arc::clone(formatter));
			}
			tracing::trace!(formatter = formatter.name(), "Output formatter declined result");
		}
		None
	}
}

impl fmt::Debug for FormatterCollection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FormatterCollection")
			.field("formatters", &self.names())
			.field("return_http_not_acceptable", &self.return_http_not_acceptable)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::{HttpContext, ObjectType};
	use http::header::ACCEPT;
	use http::{HeaderMap, HeaderValue, StatusCode};
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn formatters() -> FormatterCollection {
		FormatterCollection::with_defaults()
	}

	fn accept(value: &'static str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(ACCEPT, HeaderValue::from_static(value));
		headers
	}

	#[rstest]
	fn test_with_defaults_order(formatters: FormatterCollection) {
		assert_eq!(formatters.names(), vec!["no_content", "string", "json"]);
		assert_eq!(formatters.len(), 3);
	}

	#[rstest]
	fn test_shared_formatter_serves_several_collections() {
		let string: Arc<dyn OutputFormatter> = Arc::new(StringOutputFormatter::new());
		let plain = FormatterCollection::new().register_shared(Arc::clone(&string));
		let full = FormatterCollection::new()
			.register(NoContentOutputFormatter::new())
			.register_shared(Arc::clone(&string));
		assert_eq!(plain.names(), vec!["string"]);
		assert_eq!(full.names(), vec!["no_content", "string"]);
		assert_eq!(Arc::strong_count(&string), 3);

		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::for_value(
			HttpContext::new(HeaderMap::new(), &mut body),
			"hello".into(),
		);
		let selected = full.select(&mut context).unwrap();
		assert!(Arc::ptr_eq(&selected, &string));
	}

	#[rstest]
	fn test_selects_json_for_json_value(formatters: FormatterCollection) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::for_value(
			HttpContext::new(HeaderMap::new(), &mut body),
			json!({"ok": true}).into(),
		);
		let selected = formatters.select(&mut context).unwrap();
		assert_eq!(selected.name(), "json");
	}

	#[rstest]
	fn test_absent_string_goes_to_no_content(formatters: FormatterCollection) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::new(
			HttpContext::new(HeaderMap::new(), &mut body),
			ObjectType::String,
			None,
		);
		let selected = formatters.select(&mut context).unwrap();
		assert_eq!(selected.name(), "no_content");
	}

	#[rstest]
	fn test_falls_back_when_accept_unsatisfiable(formatters: FormatterCollection) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::for_value(
			HttpContext::new(accept("application/xml"), &mut body),
			"hello".into(),
		);
		let selected = formatters.select(&mut context).unwrap();
		assert_eq!(selected.name(), "string");
		assert_eq!(context.content_type(), Some("text/plain; charset=utf-8"));
		assert!(!context.ignores_accept_header());
	}

	#[rstest]
	#[tokio::test]
	async fn test_not_acceptable_when_enabled() {
		let formatters = FormatterCollection::with_defaults().return_http_not_acceptable(true);
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::for_value(
			HttpContext::new(accept("application/xml"), &mut body),
			"hello".into(),
		);
		let result = formatters.write(&mut context).await;
		assert!(matches!(result, Err(FormatterError::NoFormatter)));
		assert!(context.content_type().is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_empty_collection_has_no_formatter() {
		let formatters = FormatterCollection::new();
		assert!(formatters.is_empty());
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::for_value(
			HttpContext::new(HeaderMap::new(), &mut body),
			"hello".into(),
		);
		assert!(matches!(
			formatters.write(&mut context).await,
			Err(FormatterError::NoFormatter)
		));
	}

	#[rstest]
	#[tokio::test]
	async fn test_write_unit_result(formatters: FormatterCollection) {
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::new(
			HttpContext::new(HeaderMap::new(), &mut body),
			ObjectType::Unit,
			None,
		);
		formatters.write(&mut context).await.unwrap();
		let http = context.into_http();
		assert_eq!(http.response.status, StatusCode::NO_CONTENT);
		assert_eq!(http.response.bytes_written(), 0);
	}
}
