//! `204 No Content` formatter

use async_trait::async_trait;
use http::StatusCode;

use crate::context::{ObjectType, OutputFormatterContext};
use crate::error::FormatterResult;
use crate::formatter::OutputFormatter;

/// Answers results without a value with `204 No Content`.
///
/// Applies to handlers declaring no result at all and, unless disabled, to
/// any absent value. Writes no body and no `Content-Type`.
///
/// # Examples
///
/// ```
/// use http::{HeaderMap, StatusCode};
/// use reinhardt_formatters::{
///     HttpContext, NoContentOutputFormatter, ObjectType, OutputFormatter, OutputFormatterContext,
/// };
///
/// # #[tokio::main]
/// # async fn main() {
/// let formatter = NoContentOutputFormatter::new();
/// let mut body: Vec<u8> = Vec::new();
/// let mut context = OutputFormatterContext::new(
///     HttpContext::new(HeaderMap::new(), &mut body),
///     ObjectType::Unit,
///     None,
/// );
///
/// assert!(formatter.can_write_result(&mut context));
/// formatter.write(&mut context).await.unwrap();
/// assert_eq!(context.into_http().response.status, StatusCode::NO_CONTENT);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NoContentOutputFormatter {
	/// Treat an absent value of any declared type as "no content"
	pub treat_null_as_no_content: bool,
}

impl Default for NoContentOutputFormatter {
	fn default() -> Self {
		Self {
			treat_null_as_no_content: true,
		}
	}
}

impl NoContentOutputFormatter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets whether absent values are answered with 204
	pub fn treat_null_as_no_content(mut self, enabled: bool) -> Self {
		self.treat_null_as_no_content = enabled;
		self
	}
}

#[async_trait]
impl OutputFormatter for NoContentOutputFormatter {
	fn name(&self) -> &'static str {
		"no_content"
	}

	fn can_write_result(&self, context: &mut OutputFormatterContext<'_>) -> bool {
		context.object_type() == ObjectType::Unit
			|| (self.treat_null_as_no_content && context.object().is_none())
	}

	async fn write(&self, context: &mut OutputFormatterContext<'_>) -> FormatterResult<()> {
		let response = context.response_mut();
		if response.status == StatusCode::OK {
			response.status = StatusCode::NO_CONTENT;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::{HttpContext, ResultValue};
	use http::HeaderMap;
	use rstest::rstest;

	#[rstest]
	#[case(ObjectType::Unit, None, true, true)]
	#[case(ObjectType::String, None, true, true)]
	#[case(ObjectType::String, None, false, false)]
	#[case(ObjectType::Unit, None, false, true)]
	#[case(ObjectType::String, Some(ResultValue::Text("x".into())), true, false)]
	fn test_can_write_result(
		#[case] object_type: ObjectType,
		#[case] object: Option<ResultValue>,
		#[case] treat_null: bool,
		#[case] expected: bool,
	) {
		let formatter = NoContentOutputFormatter::new().treat_null_as_no_content(treat_null);
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::new(
			HttpContext::new(HeaderMap::new(), &mut body),
			object_type,
			object,
		);
		assert_eq!(formatter.can_write_result(&mut context), expected);
		assert!(context.content_type().is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_write_keeps_explicit_status() {
		let formatter = NoContentOutputFormatter::new();
		let mut body: Vec<u8> = Vec::new();
		let mut context = OutputFormatterContext::new(
			HttpContext::new(HeaderMap::new(), &mut body),
			ObjectType::Unit,
			None,
		);
		context.response_mut().status = StatusCode::ACCEPTED;
		formatter.write(&mut context).await.unwrap();

		let http = context.into_http();
		assert_eq!(http.response.status, StatusCode::ACCEPTED);
		assert_eq!(http.response.bytes_written(), 0);
	}
}
