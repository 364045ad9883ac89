//! Text encodings for formatted response bodies
//!
//! [`TextEncoding`] wraps an [`encoding_rs::Encoding`] and knows how to turn a
//! `&str` into the bytes written to the response. UTF-16 is encoded directly
//! (little or big endian, never with a byte-order mark) because `encoding_rs`
//! only decodes it.
//!
//! [`AcceptCharset`] parses the `Accept-Charset` request header used by the
//! default encoding selection of [`TextOutputFormatter::select_character_encoding`].
//!
//! [`TextOutputFormatter::select_character_encoding`]: crate::TextOutputFormatter::select_character_encoding

use std::borrow::Cow;
use std::fmt;

use encoding_rs::Encoding;

use crate::error::{FormatterError, FormatterResult};

/// A character encoding a text formatter can write with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding {
	inner: &'static Encoding,
}

impl TextEncoding {
	/// UTF-8
	pub fn utf8() -> Self {
		Self {
			inner: encoding_rs::UTF_8,
		}
	}

	/// UTF-16, little endian. This is what the `utf-16` label resolves to.
	pub fn utf16le() -> Self {
		Self {
			inner: encoding_rs::UTF_16LE,
		}
	}

	/// UTF-16, big endian
	pub fn utf16be() -> Self {
		Self {
			inner: encoding_rs::UTF_16BE,
		}
	}

	/// Looks up an encoding by charset label (case-insensitive, WHATWG labels).
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::TextEncoding;
	///
	/// assert_eq!(TextEncoding::for_label("UTF8").unwrap(), TextEncoding::utf8());
	/// assert_eq!(TextEncoding::for_label("utf-16").unwrap(), TextEncoding::utf16le());
	/// assert_eq!(TextEncoding::for_label("latin1").unwrap().charset(), "windows-1252");
	/// assert!(TextEncoding::for_label("klingon").is_err());
	/// ```
	pub fn for_label(label: &str) -> FormatterResult<Self> {
		let inner = Encoding::for_label(label.trim().as_bytes())
			.filter(|encoding| *encoding != encoding_rs::REPLACEMENT)
			.ok_or_else(|| FormatterError::UnsupportedEncoding(label.to_string()))?;
		Ok(Self { inner })
	}

	/// Canonical charset name as written into `Content-Type` headers
	pub fn charset(&self) -> String {
		self.inner.name().to_ascii_lowercase()
	}

	/// The wrapped `encoding_rs` encoding
	pub fn as_encoding(&self) -> &'static Encoding {
		self.inner
	}

	/// Encodes `text` without any preamble.
	///
	/// Characters the target encoding cannot represent are written as HTML
	/// numeric character references, following the WHATWG encoder rules.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::TextEncoding;
	///
	/// assert_eq!(TextEncoding::utf8().encode("hi").as_ref(), b"hi");
	/// assert_eq!(TextEncoding::utf16le().encode("hi").as_ref(), &[b'h', 0, b'i', 0]);
	/// assert_eq!(TextEncoding::utf16be().encode("hi").as_ref(), &[0, b'h', 0, b'i']);
	/// ```
	pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
		if self.inner == encoding_rs::UTF_8 {
			Cow::Borrowed(text.as_bytes())
		} else if self.inner == encoding_rs::UTF_16LE {
			Cow::Owned(text.encode_utf16().flat_map(u16::to_le_bytes).collect())
		} else if self.inner == encoding_rs::UTF_16BE {
			Cow::Owned(text.encode_utf16().flat_map(u16::to_be_bytes).collect())
		} else {
			let (bytes, _, _) = self.inner.encode(text);
			bytes
		}
	}
}

impl fmt::Display for TextEncoding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.charset())
	}
}

/// A single `Accept-Charset` entry
#[derive(Debug, Clone, PartialEq)]
pub struct CharsetQuality {
	/// Charset label as sent by the client, or `*`
	pub charset: String,
	/// Quality factor (0.0 to 1.0)
	pub quality: f32,
}

impl CharsetQuality {
	/// Parses an entry such as `utf-8;q=0.7`
	pub fn parse(s: &str) -> Option<Self> {
		let mut parts = s.split(';');
		let charset = parts.next()?.trim();
		if charset.is_empty() {
			return None;
		}

		let mut quality = 1.0;
		for param in parts {
			if let Some((key, value)) = param.split_once('=')
				&& key.trim().eq_ignore_ascii_case("q")
				&& let Ok(q) = value.trim().parse::<f32>()
			{
				quality = q.clamp(0.0, 1.0);
			}
		}

		Some(Self {
			charset: charset.to_string(),
			quality,
		})
	}
}

/// Parsed `Accept-Charset` header, sorted by quality (highest first)
#[derive(Debug, Clone, Default)]
pub struct AcceptCharset {
	pub charsets: Vec<CharsetQuality>,
}

impl AcceptCharset {
	/// Parses an `Accept-Charset` header value
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::encoding::AcceptCharset;
	///
	/// let accept = AcceptCharset::parse("iso-8859-5, utf-16;q=0.8, *;q=0.1");
	/// assert_eq!(accept.charsets.len(), 3);
	/// assert_eq!(accept.charsets[0].charset, "iso-8859-5");
	/// assert_eq!(accept.charsets[2].charset, "*");
	/// ```
	pub fn parse(header: &str) -> Self {
		let mut charsets: Vec<CharsetQuality> = header
			.split(',')
			.filter_map(|s| CharsetQuality::parse(s.trim()))
			.collect();

		charsets.sort_by(|a, b| b.quality.total_cmp(&a.quality));

		Self { charsets }
	}

	/// Picks the first supported encoding the client accepts.
	///
	/// `*` selects the first supported encoding. Labels that name no known
	/// encoding and entries with `q=0` are skipped.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::TextEncoding;
	/// use reinhardt_formatters::encoding::AcceptCharset;
	///
	/// let supported = [TextEncoding::utf8(), TextEncoding::utf16le()];
	///
	/// let accept = AcceptCharset::parse("utf-8;q=0.5, utf-16");
	/// assert_eq!(accept.select(&supported), Some(TextEncoding::utf16le()));
	///
	/// let none = AcceptCharset::parse("iso-8859-5");
	/// assert_eq!(none.select(&supported), None);
	/// ```
	pub fn select(&self, supported: &[TextEncoding]) -> Option<TextEncoding> {
		for entry in self.charsets.iter().filter(|c| c.quality > 0.0) {
			if entry.charset == "*" {
				return supported.first().copied();
			}
			let Ok(requested) = TextEncoding::for_label(&entry.charset) else {
				continue;
			};
			if let Some(found) = supported.iter().find(|enc| **enc == requested) {
				return Some(*found);
			}
		}
		None
	}
}
