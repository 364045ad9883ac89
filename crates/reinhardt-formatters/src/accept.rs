//! Accept header parsing

use crate::media_type::MediaType;

/// Represents an Accept header
#[derive(Debug, Clone, Default)]
pub struct AcceptHeader {
	pub media_types: Vec<MediaType>,
}

impl AcceptHeader {
	/// Parses an Accept header string into an AcceptHeader struct.
	///
	/// Entries are sorted by quality, highest first. Entries with equal
	/// quality keep the order in which the client listed them.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::AcceptHeader;
	///
	/// let accept = AcceptHeader::parse("application/json; q=0.9, text/plain");
	/// assert_eq!(accept.media_types.len(), 2);
	/// assert_eq!(accept.media_types[0].subtype, "plain");
	/// assert_eq!(accept.media_types[1].quality, 0.9);
	/// ```
	pub fn parse(header: &str) -> Self {
		let mut media_types: Vec<MediaType> = header
			.split(',')
			.filter_map(|s| MediaType::parse(s.trim()))
			.collect();

		media_types.sort_by(|a, b| b.quality.total_cmp(&a.quality));

		Self { media_types }
	}

	/// Creates an empty AcceptHeader with no media types
	pub fn empty() -> Self {
		Self::default()
	}

	/// Whether the header lists no usable media ranges
	pub fn is_empty(&self) -> bool {
		self.media_types.is_empty()
	}

	/// Finds the first available media type the client accepts.
	///
	/// Ranges with `q=0` are explicit refusals and never match. When an
	/// accepted range is more specific than the available type (for instance
	/// it carries a charset), the accepted range is returned. The result is
	/// always a concrete media type: a wildcard range only matches concrete
	/// available types.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_formatters::{AcceptHeader, MediaType};
	///
	/// let accept = AcceptHeader::parse("application/json, text/*");
	/// let available = vec![MediaType::new("text", "plain")];
	/// let best = accept.find_best_match(&available).unwrap();
	/// assert_eq!(best.to_string(), "text/plain");
	///
	/// let refused = AcceptHeader::parse("text/plain; q=0");
	/// assert!(refused.find_best_match(&available).is_none());
	/// ```
	pub fn find_best_match(&self, available: &[MediaType]) -> Option<MediaType> {
		for accepted in self.media_types.iter().filter(|m| m.quality > 0.0) {
			for available_type in available {
				if !available_type.has_wildcard() && available_type.is_subset_of(accepted) {
					return Some(available_type.clone());
				}
				if !accepted.has_wildcard() && accepted.is_subset_of(available_type) {
					let mut chosen = accepted.clone();
					chosen.quality = 1.0;
					return Some(chosen);
				}
			}
		}
		None
	}
}
