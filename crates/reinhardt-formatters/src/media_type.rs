//! Media type parsing and matching

use std::fmt;
use std::str::FromStr;

use crate::error::FormatterError;

/// A parsed media type such as `text/plain; charset=utf-8`.
///
/// The quality factor of an `Accept` entry is kept separately from the other
/// parameters and is never rendered back by [`fmt::Display`].
#[derive(Debug, Clone, PartialEq)]
pub struct MediaType {
	/// Top level type (e.g., "text", "application", "*")
	pub main_type: String,
	/// Subtype (e.g., "plain", "json", "*+json")
	pub subtype: String,
	/// Parameters other than `q`, with lowercase names
	pub parameters: Vec<(String, String)>,
	/// Quality factor (0.0 to 1.0)
	pub quality: f32,
}

impl MediaType {
	/// Creates a media type without parameters and with quality 1.0
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::MediaType;
	///
	/// let plain = MediaType::new("text", "plain");
	/// assert_eq!(plain.to_string(), "text/plain");
	/// assert_eq!(plain.quality, 1.0);
	/// ```
	pub fn new(main_type: impl Into<String>, subtype: impl Into<String>) -> Self {
		Self {
			main_type: main_type.into().to_ascii_lowercase(),
			subtype: subtype.into().to_ascii_lowercase(),
			parameters: Vec::new(),
			quality: 1.0,
		}
	}

	/// Parses a single media type or media range.
	///
	/// Returns `None` when the input has no `/` or an empty type or subtype.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::MediaType;
	///
	/// let media = MediaType::parse("text/html; charset=\"UTF-8\"; q=0.8").unwrap();
	/// assert_eq!(media.main_type, "text");
	/// assert_eq!(media.subtype, "html");
	/// assert_eq!(media.charset(), Some("UTF-8"));
	/// assert_eq!(media.quality, 0.8);
	///
	/// assert!(MediaType::parse("plain").is_none());
	/// ```
	pub fn parse(s: &str) -> Option<Self> {
		let mut parts = s.split(';');
		let essence = parts.next()?.trim();
		let (main_type, subtype) = essence.split_once('/')?;
		let (main_type, subtype) = (main_type.trim(), subtype.trim());
		if main_type.is_empty() || subtype.is_empty() {
			return None;
		}

		let mut media = Self::new(main_type, subtype);
		for param in parts {
			let Some((key, value)) = param.split_once('=') else {
				continue;
			};
			let key = key.trim().to_ascii_lowercase();
			let value = value.trim().trim_matches('"');
			if key == "q" {
				if let Ok(q) = value.parse::<f32>() {
					media.quality = q.clamp(0.0, 1.0);
				}
			} else if !key.is_empty() {
				media.parameters.push((key, value.to_string()));
			}
		}

		Some(media)
	}

	/// Returns the value of a parameter, matching its name case-insensitively
	pub fn parameter(&self, name: &str) -> Option<&str> {
		self.parameters
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Returns the `charset` parameter, if any
	pub fn charset(&self) -> Option<&str> {
		self.parameter("charset")
	}

	/// Returns a copy of this media type with its `charset` parameter replaced
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::MediaType;
	///
	/// let media = MediaType::parse("text/plain; charset=iso-8859-1").unwrap();
	/// assert_eq!(
	///     media.with_charset("utf-8").to_string(),
	///     "text/plain; charset=utf-8"
	/// );
	/// ```
	pub fn with_charset(&self, charset: &str) -> Self {
		let mut media = self.clone();
		media
			.parameters
			.retain(|(key, _)| !key.eq_ignore_ascii_case("charset"));
		media
			.parameters
			.push(("charset".to_string(), charset.to_string()));
		media
	}

	/// Whether the type or subtype contains a wildcard
	pub fn has_wildcard(&self) -> bool {
		self.main_type == "*" || self.subtype == "*" || self.subtype.starts_with("*+")
	}

	/// Whether this media type is the same as, or more specific than, `set`.
	///
	/// `set` may use `*` for the type or subtype and `*+suffix` for structured
	/// syntax suffixes. Every parameter of `set` must also be present on this
	/// media type; the `charset` value is compared case-insensitively.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::MediaType;
	///
	/// let plain = MediaType::parse("text/plain; charset=utf-8").unwrap();
	/// assert!(plain.is_subset_of(&MediaType::parse("text/*").unwrap()));
	/// assert!(plain.is_subset_of(&MediaType::parse("text/plain").unwrap()));
	/// assert!(!MediaType::new("text", "plain")
	///     .is_subset_of(&MediaType::parse("text/plain; charset=utf-8").unwrap()));
	///
	/// let problem = MediaType::new("application", "problem+json");
	/// assert!(problem.is_subset_of(&MediaType::new("application", "*+json")));
	/// ```
	pub fn is_subset_of(&self, set: &MediaType) -> bool {
		let type_matches = set.main_type == "*" || set.main_type == self.main_type;
		if !type_matches {
			return false;
		}

		let subtype_matches = if set.subtype == "*" || set.subtype == self.subtype {
			true
		} else if let Some(suffix) = set.subtype.strip_prefix("*+") {
			self.subtype
				.rsplit_once('+')
				.is_some_and(|(_, own_suffix)| own_suffix == suffix)
		} else {
			false
		};
		if !subtype_matches {
			return false;
		}

		set.parameters.iter().all(|(key, value)| {
			self.parameter(key).is_some_and(|own| {
				if key == "charset" {
					own.eq_ignore_ascii_case(value)
				} else {
					own == value
				}
			})
		})
	}

	/// Checks if either media type covers the other.
	///
	/// This is the symmetric match used when intersecting an `Accept` range
	/// with a formatter's supported media types.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::MediaType;
	///
	/// let any = MediaType::parse("*/*").unwrap();
	/// let plain = MediaType::new("text", "plain");
	/// assert!(any.matches(&plain));
	/// assert!(plain.matches(&any));
	/// assert!(!plain.matches(&MediaType::new("application", "json")));
	/// ```
	pub fn matches(&self, other: &MediaType) -> bool {
		self.is_subset_of(other) || other.is_subset_of(self)
	}
}

impl FromStr for MediaType {
	type Err = FormatterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s).ok_or_else(|| FormatterError::InvalidMediaType(s.to_string()))
	}
}

impl fmt::Display for MediaType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.main_type, self.subtype)?;
		for (key, value) in &self.parameters {
			write!(f, "; {}={}", key, value)?;
		}
		Ok(())
	}
}

/// Replaces (or adds) the `charset` parameter of a media type string.
///
/// Unparseable input is returned with the charset appended so that the
/// caller's header is never silently dropped.
///
/// # Examples
///
/// ```
/// use reinhardt_formatters::media_type::replace_encoding;
///
/// assert_eq!(replace_encoding("text/plain", "utf-8"), "text/plain; charset=utf-8");
/// assert_eq!(
///     replace_encoding("text/plain; charset=utf-16le", "utf-8"),
///     "text/plain; charset=utf-8"
/// );
/// ```
pub fn replace_encoding(media_type: &str, charset: &str) -> String {
	match MediaType::parse(media_type) {
		Some(parsed) => parsed.with_charset(charset).to_string(),
		None => format!("{}; charset={}", media_type.trim(), charset),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_lowercases_type() {
		let media = MediaType::parse("Text/Plain").unwrap();
		assert_eq!(media.main_type, "text");
		assert_eq!(media.subtype, "plain");
	}

	#[rstest]
	#[case("text/")]
	#[case("/plain")]
	#[case("")]
	#[case("text")]
	fn test_parse_rejects_malformed(#[case] input: &str) {
		assert!(MediaType::parse(input).is_none());
		assert!(matches!(
			input.parse::<MediaType>(),
			Err(FormatterError::InvalidMediaType(_))
		));
	}

	#[rstest]
	fn test_quality_is_clamped_and_not_rendered() {
		let media = MediaType::parse("text/plain;q=3").unwrap();
		assert_eq!(media.quality, 1.0);
		assert_eq!(media.to_string(), "text/plain");
	}

	#[rstest]
	#[case("text/plain", "text/plain", true)]
	#[case("text/plain", "text/*", true)]
	#[case("text/plain", "*/*", true)]
	#[case("text/*", "text/plain", false)]
	#[case("application/json", "text/plain", false)]
	#[case("text/plain; charset=UTF-8", "text/plain; charset=utf-8", true)]
	#[case("text/plain", "text/plain; charset=utf-8", false)]
	#[case("application/vnd.api+json", "application/*+json", true)]
	#[case("application/json", "application/*+json", false)]
	fn test_is_subset_of(#[case] media: &str, #[case] set: &str, #[case] expected: bool) {
		let media = MediaType::parse(media).unwrap();
		let set = MediaType::parse(set).unwrap();
		assert_eq!(media.is_subset_of(&set), expected);
	}

	#[rstest]
	fn test_with_charset_keeps_other_parameters() {
		let media = MediaType::parse("text/plain; format=flowed; charset=ascii").unwrap();
		assert_eq!(
			media.with_charset("utf-8").to_string(),
			"text/plain; format=flowed; charset=utf-8"
		);
	}

	#[rstest]
	fn test_has_wildcard() {
		assert!(MediaType::parse("*/*").unwrap().has_wildcard());
		assert!(MediaType::parse("text/*").unwrap().has_wildcard());
		assert!(MediaType::parse("application/*+json").unwrap().has_wildcard());
		assert!(!MediaType::parse("text/plain").unwrap().has_wildcard());
	}

	#[rstest]
	fn test_replace_encoding_unparseable_input() {
		assert_eq!(replace_encoding("garbage", "utf-8"), "garbage; charset=utf-8");
	}
}
