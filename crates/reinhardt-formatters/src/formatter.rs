//! Output formatter contracts
//!
//! Every formatter implements [`OutputFormatter`]: a synchronous
//! applicability check followed by an asynchronous write. Formatters that
//! produce text additionally implement [`TextOutputFormatter`], which supplies
//! the shared media-type check, charset selection and the [`write_text`]
//! pipeline (pick encoding, set `Content-Type`, write the body).

use async_trait::async_trait;
use http::HeaderValue;
use http::header::CONTENT_TYPE;

use crate::capabilities::FormatterCapabilities;
use crate::context::{ObjectType, OutputFormatterContext, ResultValue};
use crate::encoding::{AcceptCharset, TextEncoding};
use crate::error::{FormatterError, FormatterResult};
use crate::media_type::{MediaType, replace_encoding};

/// A strategy that writes one kind of result to an HTTP response.
#[async_trait]
pub trait OutputFormatter: Send + Sync {
	/// Short name used in log output
	fn name(&self) -> &'static str;

	/// Decides whether this formatter handles the context's value and request.
	///
	/// Returning `false` is the normal way to decline; it lets the caller try
	/// the next formatter. An applicable formatter may record the negotiated
	/// content type on the context.
	fn can_write_result(&self, context: &mut OutputFormatterContext<'_>) -> bool;

	/// Writes the result. Only called after `can_write_result` returned `true`.
	async fn write(&self, context: &mut OutputFormatterContext<'_>) -> FormatterResult<()>;
}

/// A formatter that serializes results to text in one of several encodings.
#[async_trait]
pub trait TextOutputFormatter: OutputFormatter {
	/// Supported media types and encodings
	fn capabilities(&self) -> &FormatterCapabilities;

	/// Whether values of this declared type, or this runtime value, can be
	/// written. Either one matching is enough.
	fn can_write_type(&self, object_type: ObjectType, object: Option<&ResultValue>) -> bool;

	/// Checks the request's media-type constraints against the supported
	/// media types.
	///
	/// - An expected content type already on the context must be compatible
	///   with a supported media type. Wildcards in it are narrowed to a
	///   concrete supported type; a range that only a supported wildcard
	///   type covers is declined.
	/// - Otherwise the first `Accept` range that matches a supported type
	///   becomes the content type.
	/// - Without an `Accept` header (or when the context ignores it) the
	///   default media type is used.
	///
	/// The content type is only touched when `true` is returned.
	fn can_write_media_type(&self, context: &mut OutputFormatterContext<'_>) -> bool {
		let capabilities = self.capabilities();

		if let Some(expected) = context.content_type() {
			let Some(expected) = MediaType::parse(expected) else {
				tracing::warn!(
					formatter = self.name(),
					content_type = expected,
					"Ignoring formatter for unparseable content type"
				);
				return false;
			};
			return match capabilities.find_media_type(&expected) {
				Some(_) if !expected.has_wildcard() => true,
				Some(supported) if !supported.has_wildcard() => {
					let narrowed = supported.to_string();
					context.set_content_type(narrowed);
					true
				}
				_ => {
					tracing::debug!(
						formatter = self.name(),
						content_type = %expected,
						"Content type not supported by formatter"
					);
					false
				}
			};
		}

		let accept = context.request().accept();
		if accept.is_empty() || context.ignores_accept_header() {
			context.set_content_type(capabilities.default_media_type().to_string());
			return true;
		}

		match accept.find_best_match(capabilities.supported_media_types()) {
			Some(matched) => {
				context.set_content_type(matched.to_string());
				true
			}
			None => {
				tracing::debug!(
					formatter = self.name(),
					"No accepted media type is supported by formatter"
				);
				false
			}
		}
	}

	/// Chooses the encoding for the response body.
	///
	/// The `Accept-Charset` header is consulted first, then a charset on the
	/// negotiated content type. Either must name a supported encoding;
	/// otherwise the default encoding is used.
	fn select_character_encoding(&self, context: &OutputFormatterContext<'_>) -> TextEncoding {
		let capabilities = self.capabilities();

		if let Some(header) = context.request().accept_charset()
			&& let Some(encoding) = AcceptCharset::parse(header).select(capabilities.supported_encodings())
		{
			return encoding;
		}

		if let Some(content_type) = context.content_type().and_then(MediaType::parse)
			&& let Some(charset) = content_type.charset()
			&& let Ok(encoding) = TextEncoding::for_label(charset)
			&& capabilities.supports_encoding(&encoding)
		{
			return encoding;
		}

		capabilities.default_encoding()
	}

	/// Serializes the value and writes it to the response body using
	/// `encoding` as given.
	async fn write_response_body(
		&self,
		context: &mut OutputFormatterContext<'_>,
		encoding: TextEncoding,
	) -> FormatterResult<()>;
}

/// Write path shared by text formatters.
///
/// Resolves the encoding, stores `<media type>; charset=<charset>` both on
/// the context and in the response's `Content-Type` header, then delegates to
/// [`TextOutputFormatter::write_response_body`]. The body stream is flushed
/// before returning, so errors from buffered transports surface here.
pub async fn write_text<F>(formatter: &F, context: &mut OutputFormatterContext<'_>) -> FormatterResult<()>
where
	F: TextOutputFormatter + ?Sized,
{
	let encoding = formatter.select_character_encoding(context);
	let media_type = match context.content_type() {
		Some(content_type) => content_type.to_string(),
		None => formatter.capabilities().default_media_type().to_string(),
	};
	let content_type = replace_encoding(&media_type, &encoding.charset());

	let header = HeaderValue::from_str(&content_type)
		.map_err(|_| FormatterError::InvalidMediaType(content_type.clone()))?;
	context.response_mut().headers.insert(CONTENT_TYPE, header);
	context.set_content_type(content_type);

	tracing::debug!(
		formatter = formatter.name(),
		content_type = context.content_type(),
		"Writing response body"
	);
	formatter.write_response_body(context, encoding).await?;
	context.response_mut().flush().await?;
	Ok(())
}
