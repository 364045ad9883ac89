//! Per-request formatting context
//!
//! An [`OutputFormatterContext`] is created for every response that goes
//! through formatter selection. It carries the value produced by the handler,
//! the type the handler declared for it, the HTTP exchange the response is
//! written to, and the content type negotiated so far.

use std::fmt;

use bytes::Bytes;
use http::header::{ACCEPT, ACCEPT_CHARSET, AsHeaderName};
use http::{HeaderMap, Method, StatusCode, Uri};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::accept::AcceptHeader;

/// Declared (static) type of a handler result.
///
/// `Object` stands for a dynamically typed result whose concrete kind is only
/// known from the runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
	/// A string result
	String,
	/// A JSON document
	Json,
	/// Raw bytes
	Bytes,
	/// The handler produces no result
	Unit,
	/// A dynamically typed result
	Object,
}

/// Runtime value of a handler result
#[derive(Debug, Clone, PartialEq)]
pub enum ResultValue {
	Text(String),
	Json(serde_json::Value),
	Bytes(Bytes),
}

impl ResultValue {
	/// The declared type matching this value
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::{ObjectType, ResultValue};
	///
	/// assert_eq!(ResultValue::from("hi").object_type(), ObjectType::String);
	/// assert_eq!(
	///     ResultValue::from(serde_json::json!({"a": 1})).object_type(),
	///     ObjectType::Json
	/// );
	/// ```
	pub fn object_type(&self) -> ObjectType {
		match self {
			ResultValue::Text(_) => ObjectType::String,
			ResultValue::Json(_) => ObjectType::Json,
			ResultValue::Bytes(_) => ObjectType::Bytes,
		}
	}

	/// The string payload, when this is a text value
	pub fn as_text(&self) -> Option<&str> {
		match self {
			ResultValue::Text(text) => Some(text),
			_ => None,
		}
	}
}

impl From<String> for ResultValue {
	fn from(value: String) -> Self {
		ResultValue::Text(value)
	}
}

impl From<&str> for ResultValue {
	fn from(value: &str) -> Self {
		ResultValue::Text(value.to_string())
	}
}

impl From<serde_json::Value> for ResultValue {
	fn from(value: serde_json::Value) -> Self {
		ResultValue::Json(value)
	}
}

impl From<Bytes> for ResultValue {
	fn from(value: Bytes) -> Self {
		ResultValue::Bytes(value)
	}
}

/// Request line and headers of the exchange being answered
#[derive(Debug, Clone, Default)]
pub struct RequestHead {
	pub method: Method,
	pub uri: Uri,
	pub headers: HeaderMap,
}

impl RequestHead {
	/// Creates a GET request head for `/` with the given headers
	pub fn with_headers(headers: HeaderMap) -> Self {
		Self {
			headers,
			..Self::default()
		}
	}

	/// Returns a header value as a string, if present and valid UTF-8
	pub fn header_str<K: AsHeaderName>(&self, name: K) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// Parsed `Accept` header; all `Accept` lines are combined
	pub fn accept(&self) -> AcceptHeader {
		let combined = self
			.headers
			.get_all(ACCEPT)
			.iter()
			.filter_map(|value| value.to_str().ok())
			.collect::<Vec<_>>()
			.join(",");
		AcceptHeader::parse(&combined)
	}

	/// Raw `Accept-Charset` header value
	pub fn accept_charset(&self) -> Option<&str> {
		self.header_str(ACCEPT_CHARSET)
	}
}

/// Response half of the exchange: status, headers and the body stream.
///
/// The body is an arbitrary [`AsyncWrite`], typically the transport's
/// connection or a body channel. Writes go straight to it.
pub struct HttpResponse<'a> {
	pub status: StatusCode,
	pub headers: HeaderMap,
	body: Box<dyn AsyncWrite + Send + Unpin + 'a>,
	bytes_written: u64,
}

impl<'a> HttpResponse<'a> {
	/// Creates a `200 OK` response writing into `body`
	pub fn new(body: impl AsyncWrite + Send + Unpin + 'a) -> Self {
		Self {
			status: StatusCode::OK,
			headers: HeaderMap::new(),
			body: Box::new(body),
			bytes_written: 0,
		}
	}

	/// Appends bytes to the response body.
	///
	/// Transport errors are returned as-is; nothing is retried.
	pub async fn write_body(&mut self, bytes: &[u8]) -> std::io::Result<()> {
		self.body.write_all(bytes).await?;
		self.bytes_written += bytes.len() as u64;
		Ok(())
	}

	/// Flushes the body stream
	pub async fn flush(&mut self) -> std::io::Result<()> {
		self.body.flush().await
	}

	/// Total number of body bytes written so far
	pub fn bytes_written(&self) -> u64 {
		self.bytes_written
	}
}

impl fmt::Debug for HttpResponse<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HttpResponse")
			.field("status", &self.status)
			.field("headers", &self.headers)
			.field("bytes_written", &self.bytes_written)
			.finish_non_exhaustive()
	}
}

/// The HTTP exchange a result is formatted for
#[derive(Debug)]
pub struct HttpContext<'a> {
	pub request: RequestHead,
	pub response: HttpResponse<'a>,
}

impl<'a> HttpContext<'a> {
	/// Creates an exchange from request headers and a response body stream
	///
	/// # Examples
	///
	/// ```
	/// use http::HeaderMap;
	/// use reinhardt_formatters::HttpContext;
	///
	/// let mut body: Vec<u8> = Vec::new();
	/// let http = HttpContext::new(HeaderMap::new(), &mut body);
	/// assert_eq!(http.response.bytes_written(), 0);
	/// ```
	pub fn new(request_headers: HeaderMap, body: impl AsyncWrite + Send + Unpin + 'a) -> Self {
		Self {
			request: RequestHead::with_headers(request_headers),
			response: HttpResponse::new(body),
		}
	}
}

/// Everything a formatter needs to decide on and write one result.
#[derive(Debug)]
pub struct OutputFormatterContext<'a> {
	http: HttpContext<'a>,
	object: Option<ResultValue>,
	object_type: ObjectType,
	content_type: Option<String>,
	ignore_accept_header: bool,
}

impl<'a> OutputFormatterContext<'a> {
	/// Creates a context for `object`, declared as `object_type`
	///
	/// # Examples
	///
	/// ```
	/// use http::HeaderMap;
	/// use reinhardt_formatters::{HttpContext, ObjectType, OutputFormatterContext};
	///
	/// let mut body: Vec<u8> = Vec::new();
	/// let http = HttpContext::new(HeaderMap::new(), &mut body);
	/// let context = OutputFormatterContext::new(http, ObjectType::String, Some("hello".into()));
	///
	/// assert_eq!(context.object_type(), ObjectType::String);
	/// assert!(context.content_type().is_none());
	/// ```
	pub fn new(http: HttpContext<'a>, object_type: ObjectType, object: Option<ResultValue>) -> Self {
		Self {
			http,
			object,
			object_type,
			content_type: None,
			ignore_accept_header: false,
		}
	}

	/// Creates a context whose declared type is taken from the value itself
	pub fn for_value(http: HttpContext<'a>, object: ResultValue) -> Self {
		let object_type = object.object_type();
		Self::new(http, object_type, Some(object))
	}

	/// The value to format, `None` for an absent result
	pub fn object(&self) -> Option<&ResultValue> {
		self.object.as_ref()
	}

	/// The declared type of the value
	pub fn object_type(&self) -> ObjectType {
		self.object_type
	}

	/// Content type negotiated so far
	pub fn content_type(&self) -> Option<&str> {
		self.content_type.as_deref()
	}

	/// Sets the expected or negotiated content type
	pub fn set_content_type(&mut self, content_type: impl Into<String>) {
		self.content_type = Some(content_type.into());
	}

	/// Clears the negotiated content type
	pub fn clear_content_type(&mut self) {
		self.content_type = None;
	}

	/// Whether the request's `Accept` header is disregarded during selection
	pub fn ignores_accept_header(&self) -> bool {
		self.ignore_accept_header
	}

	/// Makes media-type checks disregard the request's `Accept` header
	pub fn set_ignore_accept_header(&mut self, ignore: bool) {
		self.ignore_accept_header = ignore;
	}

	pub fn http(&self) -> &HttpContext<'a> {
		&self.http
	}

	pub fn http_mut(&mut self) -> &mut HttpContext<'a> {
		&mut self.http
	}

	pub fn request(&self) -> &RequestHead {
		&self.http.request
	}

	pub fn response_mut(&mut self) -> &mut HttpResponse<'a> {
		&mut self.http.response
	}

	/// Borrows the value and the response together, for writing the former
	/// into the latter.
	pub fn object_and_response(&mut self) -> (Option<&ResultValue>, &mut HttpResponse<'a>) {
		(self.object.as_ref(), &mut self.http.response)
	}

	/// Ends formatting and hands back the exchange
	pub fn into_http(self) -> HttpContext<'a> {
		self.http
	}
}
