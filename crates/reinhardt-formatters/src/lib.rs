//! Output formatters for the Reinhardt framework.
//!
//! An output formatter turns the value returned by a handler into the bytes
//! of an HTTP response. This crate provides the negotiation and write step:
//!
//! - **Capabilities**: each formatter declares its supported media types and
//!   text encodings once, at construction ([`FormatterCapabilities`]).
//! - **Applicability**: [`OutputFormatter::can_write_result`] checks the
//!   value's type and the request's media-type constraints, and records the
//!   negotiated content type on the [`OutputFormatterContext`].
//! - **Write**: [`OutputFormatter::write`] resolves the charset, sets the
//!   `Content-Type` header and streams the encoded body.
//!
//! # Built-in formatters
//!
//! - [`StringOutputFormatter`]: `text/plain` in UTF-8 or UTF-16
//! - [`JsonOutputFormatter`]: `application/json` via `serde_json`
//! - [`NoContentOutputFormatter`]: `204 No Content` for absent results
//!
//! [`FormatterCollection`] tries registered formatters in order and writes
//! with the first one that accepts the result.
//!
//! # Quick Start
//!
//! ```
//! use http::HeaderMap;
//! use http::header::CONTENT_TYPE;
//! use reinhardt_formatters::{
//!     HttpContext, ObjectType, OutputFormatter, OutputFormatterContext, StringOutputFormatter,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let formatter = StringOutputFormatter::new();
//!
//! let mut body: Vec<u8> = Vec::new();
//! let mut context = OutputFormatterContext::new(
//!     HttpContext::new(HeaderMap::new(), &mut body),
//!     ObjectType::String,
//!     Some("hello".into()),
//! );
//!
//! if formatter.can_write_result(&mut context) {
//!     formatter.write(&mut context).await.unwrap();
//! }
//!
//! let http = context.into_http();
//! assert_eq!(
//!     http.response.headers.get(CONTENT_TYPE).unwrap(),
//!     "text/plain; charset=utf-8"
//! );
//! drop(http);
//! assert_eq!(body, b"hello");
//! # }
//! ```

pub mod accept;
pub mod capabilities;
pub mod collection;
pub mod context;
pub mod encoding;
pub mod error;
pub mod formatter;
pub mod json;
pub mod media_type;
pub mod no_content;
pub mod settings;
pub mod string;

pub use accept::AcceptHeader;
pub use capabilities::{FormatterCapabilities, FormatterCapabilitiesBuilder};
pub use collection::FormatterCollection;
pub use context::{HttpContext, HttpResponse, ObjectType, OutputFormatterContext, RequestHead, ResultValue};
pub use encoding::TextEncoding;
pub use error::{FormatterError, FormatterResult};
pub use formatter::{OutputFormatter, TextOutputFormatter, write_text};
pub use json::JsonOutputFormatter;
pub use media_type::MediaType;
pub use no_content::NoContentOutputFormatter;
pub use settings::FormatterSettings;
pub use string::StringOutputFormatter;
