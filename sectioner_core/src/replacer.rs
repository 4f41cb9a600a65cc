use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::NoExpand;
use regex::Regex;

use crate::Policy;
use crate::Rule;

/// Placeholder replaced by the occurrence index, e.g. `{{i}}` or `{{ i }}`.
pub static OCCURRENCE_PLACEHOLDER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\{\{\s*i\s*\}\}").expect("placeholder pattern is valid"));

/// Position from which the next search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cursor {
	/// A byte offset into the content.
	At(usize),
	/// The last search found nothing more to continue from.
	Exhausted,
}

impl Cursor {
	pub fn start() -> Self {
		Self::At(0)
	}

	pub fn offset(self) -> Option<usize> {
		match self {
			Self::At(offset) => Some(offset),
			Self::Exhausted => None,
		}
	}

	pub fn is_exhausted(self) -> bool {
		matches!(self, Self::Exhausted)
	}
}

impl Default for Cursor {
	fn default() -> Self {
		Self::start()
	}
}

impl fmt::Display for Cursor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::At(offset) => write!(f, "{offset}"),
			Self::Exhausted => f.write_str("exhausted"),
		}
	}
}

/// Result of applying one rule once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOutcome {
	pub content: String,
	pub cursor: Cursor,
	/// Range of the opening match in the content as it was searched. `None`
	/// when nothing was applied.
	pub open_match: Option<Range<usize>>,
}

impl BlockOutcome {
	fn unmatched(content: String) -> Self {
		Self {
			content,
			cursor: Cursor::Exhausted,
			open_match: None,
		}
	}

	/// Whether the rule was applied by this call.
	pub fn applied(&self) -> bool {
		self.open_match.is_some()
	}
}

/// Expand every occurrence placeholder in `template` to `occurrence`.
pub fn render_insert(template: &str, occurrence: usize) -> String {
	if !template.contains("{{") {
		return template.to_string();
	}

	let index = occurrence.to_string();
	OCCURRENCE_PLACEHOLDER
		.replace_all(template, NoExpand(&index))
		.into_owned()
}

/// Apply `rule` once to `content`, searching from `cursor`.
///
/// The opening match gets its insert first. When the rule has a closing
/// phase, the closing match is searched from the cursor left by the opening
/// phase. A missing closing match appends the closing insert to the end of
/// the content unless the rule is strict, and in both cases exhausts the
/// cursor.
pub fn replace_block(
	content: String,
	cursor: Cursor,
	rule: &Rule,
	occurrence: usize,
) -> BlockOutcome {
	let Some(from) = cursor.offset() else {
		return BlockOutcome::unmatched(content);
	};
	let Some(open_pattern) = rule.open.pattern() else {
		return BlockOutcome::unmatched(content);
	};
	let Some(open_match) = open_pattern.find_at(&content, from) else {
		tracing::trace!(from, "no opening match");
		return BlockOutcome::unmatched(content);
	};

	let insert = render_insert(&rule.open.insert, occurrence);
	let (content, after_open) = apply_open(&content, &open_match, &insert, rule.open.policy);
	tracing::trace!(?open_match, cursor = after_open, "applied opening insert");

	let Some(close_pattern) = rule.close.pattern() else {
		return BlockOutcome {
			content,
			cursor: Cursor::At(after_open),
			open_match: Some(open_match),
		};
	};

	let insert = render_insert(&rule.close.insert, occurrence);
	let Some(close_match) = close_pattern.find_at(&content, after_open) else {
		let content = if rule.close_strict {
			tracing::trace!("no closing match, strict rule leaves the end untouched");
			content
		} else {
			tracing::trace!("no closing match, appending closing insert");
			let mut content = content;
			content.push_str(&insert);
			content
		};

		return BlockOutcome {
			content,
			cursor: Cursor::Exhausted,
			open_match: Some(open_match),
		};
	};

	let (content, after_close) = apply_close(&content, &close_match, &insert, rule.close.policy);
	tracing::trace!(?close_match, cursor = after_close, "applied closing insert");

	BlockOutcome {
		content,
		cursor: Cursor::At(after_close),
		open_match: Some(open_match),
	}
}

/// Apply an opening insert. The returned cursor always lies past the
/// original match so it cannot be found again.
fn apply_open(content: &str, found: &Range<usize>, insert: &str, policy: Policy) -> (String, usize) {
	let matched = found.len();
	match policy {
		Policy::Replace => {
			(
				splice(content, found.clone(), insert),
				found.start + insert.len(),
			)
		}
		Policy::Before => {
			(
				splice(content, found.start..found.start, insert),
				found.start + insert.len() + matched,
			)
		}
		Policy::After => {
			(
				splice(content, found.end..found.end, insert),
				found.end + insert.len(),
			)
		}
	}
}

/// Apply a closing insert. With [`Policy::Before`] the cursor stops in front
/// of the closing match so the next block can open on it.
fn apply_close(content: &str, found: &Range<usize>, insert: &str, policy: Policy) -> (String, usize) {
	match policy {
		Policy::Replace => {
			(
				splice(content, found.clone(), insert),
				found.start + insert.len(),
			)
		}
		Policy::Before => {
			(
				splice(content, found.start..found.start, insert),
				found.start + insert.len(),
			)
		}
		Policy::After => {
			(
				splice(content, found.end..found.end, insert),
				found.end + insert.len(),
			)
		}
	}
}

/// Replace `range` of `content` with `insert`.
fn splice(content: &str, range: Range<usize>, insert: &str) -> String {
	let mut buf = String::with_capacity(content.len() - range.len() + insert.len());
	buf.push_str(&content[..range.start]);
	buf.push_str(insert);
	buf.push_str(&content[range.end..]);
	buf
}
