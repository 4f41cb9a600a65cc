use std::fmt;
use std::ops::Range;

use regex::Regex;

use crate::SectionerError;
use crate::SectionerResult;

/// Describes how one phase of a rule finds its boundary in the content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Matcher {
	/// An HTML tag name such as `h2`. A leading `/` (e.g. `/h2`) targets the
	/// closing tag instead.
	Tag(String),
	/// A raw regular expression, either bare (`<hr\s*/?>`) or wrapped in
	/// delimiters with trailing flags (`/<hr\s*\/?>/i`).
	Pattern(String),
	/// The phase is disabled and never matches.
	#[default]
	None,
}

impl Matcher {
	/// Build a matcher from the optional tag and regex fields of a rule
	/// config. An explicit regex wins over the tag. Empty values count as
	/// absent.
	pub fn from_parts(tag: Option<&str>, regex: Option<&str>) -> Self {
		let regex = regex.filter(|regex| !regex.is_empty());
		match (regex, tag) {
			(Some(regex), tag) => {
				if let Some(tag) = tag.filter(|tag| !tag.is_empty()) {
					tracing::warn!(tag, regex, "both a tag and a regex were given, using the regex");
				}
				Self::Pattern(regex.to_string())
			}
			(None, Some(tag)) if !tag.is_empty() => Self::Tag(tag.to_string()),
			_ => Self::None,
		}
	}

	/// Turn the matcher into a compiled search pattern. Returns `Ok(None)`
	/// for [`Matcher::None`].
	pub fn resolve(&self) -> SectionerResult<Option<SearchPattern>> {
		let source = match self {
			Self::Tag(name) => tag_pattern(name)?,
			Self::Pattern(raw) => explicit_pattern(raw),
			Self::None => return Ok(None),
		};

		let regex = Regex::new(&source).map_err(|e| {
			SectionerError::InvalidPattern {
				pattern: self.to_string(),
				reason: e.to_string(),
			}
		})?;

		Ok(Some(SearchPattern { regex }))
	}
}

impl fmt::Display for Matcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Tag(name) => write!(f, "<{name}>"),
			Self::Pattern(raw) => f.write_str(raw),
			Self::None => f.write_str("none"),
		}
	}
}

/// A compiled pattern that finds the next match at or after a cursor.
#[derive(Debug, Clone)]
pub struct SearchPattern {
	regex: Regex,
}

impl SearchPattern {
	/// Byte range of the first match starting at or after `offset`.
	pub fn find_at(&self, content: &str, offset: usize) -> Option<Range<usize>> {
		if offset > content.len() {
			return None;
		}

		self.regex.find_at(content, offset).map(|m| m.range())
	}
}

/// Build the source of a case-insensitive pattern for an HTML tag. The tag
/// must be followed by `>`, `/>`, or whitespace and attributes up to `>`.
fn tag_pattern(name: &str) -> SectionerResult<String> {
	let (slash, bare) = match name.strip_prefix('/') {
		Some(rest) => ("/", rest),
		None => ("", name),
	};
	let bare = bare.trim();

	if bare.is_empty() {
		return Err(SectionerError::EmptyTag(name.to_string()));
	}

	Ok(format!(
		r"(?i)<{slash}{}(?:>|/>|\s[^>]*>)",
		regex::escape(bare)
	))
}

/// Modifiers accepted after the closing delimiter. `u` is a no-op since
/// patterns are always Unicode aware.
const PATTERN_FLAGS: &str = "imsxuU";

/// Accept `/body/flags` delimited patterns alongside bare ones.
fn explicit_pattern(raw: &str) -> String {
	let Some((body, flags)) = split_delimited(raw) else {
		return raw.to_string();
	};

	let mut inline = String::new();
	for flag in flags.chars().filter(|flag| *flag != 'u') {
		if !inline.contains(flag) {
			inline.push(flag);
		}
	}

	if inline.is_empty() {
		body.to_string()
	} else {
		format!("(?{inline}){body}")
	}
}

/// Split `/body/flags` into its body and flags. A trailing part that is not
/// made of known flags means the pattern is bare, e.g. `/a/b`.
fn split_delimited(raw: &str) -> Option<(&str, &str)> {
	let inner = raw.strip_prefix('/')?;
	let close = inner.rfind('/')?;
	let (body, flags) = (&inner[..close], &inner[close + 1..]);

	if flags.chars().all(|c| PATTERN_FLAGS.contains(c)) {
		Some((body, flags))
	} else {
		None
	}
}
