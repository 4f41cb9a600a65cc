use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::Matcher;
use crate::SearchPattern;
use crate::SectionerResult;

/// How a rule positions the shared cursor before it runs and how many
/// times it applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	/// Restart from the top of the content and apply once.
	First,
	/// Continue from where the previous rule stopped and apply once. Skipped
	/// when the previous rule ran out of matches.
	Next,
	/// Restart from the top and apply to every occurrence.
	#[default]
	All,
	/// Continue from where the previous rule stopped and apply to every
	/// remaining occurrence.
	Remaining,
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::First => "first",
			Self::Next => "next",
			Self::All => "all",
			Self::Remaining => "remaining",
		};
		f.write_str(name)
	}
}

/// Where inserted text lands relative to a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
	/// Substitute the matched text.
	#[default]
	Replace,
	/// Insert in front of the matched text.
	Before,
	/// Insert behind the matched text.
	After,
}

impl fmt::Display for Policy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Replace => "replace",
			Self::Before => "before",
			Self::After => "after",
		};
		f.write_str(name)
	}
}

/// User-facing rule options. Every field has a default so a config only
/// names what it changes.
///
/// ```toml
/// [[rules]]
/// mode = "all"
/// open_tag = "h2"
/// open_insert = "<div class=\"section\" id=\"section-{{i}}\">\n"
/// open_policy = "before"
/// close_tag = "h2"
/// close_insert = "</div>"
/// close_policy = "before"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleConfig {
	/// Text inserted at the opening match. `{{i}}` expands to the occurrence
	/// index.
	pub open_insert: String,
	pub open_policy: Policy,
	/// Tag whose opening (or, with a leading `/`, closing) form starts the
	/// block.
	pub open_tag: String,
	/// Raw pattern for the opening match. Takes precedence over `open_tag`.
	pub open_regex: Option<String>,
	/// Text inserted at the closing match.
	pub close_insert: String,
	pub close_policy: Policy,
	pub close_tag: Option<String>,
	pub close_regex: Option<String>,
	/// When set, a missing closing match no longer appends `close_insert` to
	/// the end of the content.
	pub close_strict: bool,
}

impl RuleConfig {
	/// A config that opens on `tag` and otherwise uses the defaults.
	pub fn tag(tag: impl Into<String>) -> Self {
		Self {
			open_tag: tag.into(),
			..Self::default()
		}
	}

	/// A config that opens on the raw pattern `regex`.
	pub fn regex(regex: impl Into<String>) -> Self {
		Self {
			open_regex: Some(regex.into()),
			..Self::default()
		}
	}

	pub fn open_insert(mut self, insert: impl Into<String>) -> Self {
		self.open_insert = insert.into();
		self
	}

	pub fn open_policy(mut self, policy: Policy) -> Self {
		self.open_policy = policy;
		self
	}

	pub fn close_tag(mut self, tag: impl Into<String>) -> Self {
		self.close_tag = Some(tag.into());
		self
	}

	pub fn close_regex(mut self, regex: impl Into<String>) -> Self {
		self.close_regex = Some(regex.into());
		self
	}

	pub fn close_insert(mut self, insert: impl Into<String>) -> Self {
		self.close_insert = insert.into();
		self
	}

	pub fn close_policy(mut self, policy: Policy) -> Self {
		self.close_policy = policy;
		self
	}

	pub fn close_strict(mut self, strict: bool) -> Self {
		self.close_strict = strict;
		self
	}

	pub fn open_matcher(&self) -> Matcher {
		Matcher::from_parts(Some(&self.open_tag), self.open_regex.as_deref())
	}

	pub fn close_matcher(&self) -> Matcher {
		Matcher::from_parts(self.close_tag.as_deref(), self.close_regex.as_deref())
	}
}

/// One side of a block: how to find it and what to put there.
#[derive(Debug, Clone)]
pub struct Phase {
	pub matcher: Matcher,
	pub insert: String,
	pub policy: Policy,
	pattern: Option<SearchPattern>,
}

impl Phase {
	/// Resolve `matcher` into a search pattern up front so malformed patterns
	/// surface at registration.
	pub fn new(matcher: Matcher, insert: impl Into<String>, policy: Policy) -> SectionerResult<Self> {
		let pattern = matcher.resolve()?;

		Ok(Self {
			matcher,
			insert: insert.into(),
			policy,
			pattern,
		})
	}

	/// The compiled pattern, or `None` when the phase is disabled.
	pub fn pattern(&self) -> Option<&SearchPattern> {
		self.pattern.as_ref()
	}
}

/// A registered rule. Rules are immutable once built.
#[derive(Debug, Clone)]
pub struct Rule {
	pub mode: Mode,
	pub open: Phase,
	pub close: Phase,
	pub close_strict: bool,
}

impl Rule {
	pub fn new(mode: Mode, config: &RuleConfig) -> SectionerResult<Self> {
		let open = Phase::new(
			config.open_matcher(),
			config.open_insert.as_str(),
			config.open_policy,
		)?;
		let close = Phase::new(
			config.close_matcher(),
			config.close_insert.as_str(),
			config.close_policy,
		)?;

		Ok(Self {
			mode,
			open,
			close,
			close_strict: config.close_strict,
		})
	}

	/// Whether the rule has a closing phase.
	pub fn has_close(&self) -> bool {
		self.close.pattern().is_some()
	}
}

impl fmt::Display for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {} {}", self.mode, self.open.policy, self.open.matcher)?;
		if self.has_close() {
			write!(f, " .. {} {}", self.close.policy, self.close.matcher)?;
			if self.close_strict {
				f.write_str(" (strict)")?;
			}
		}
		Ok(())
	}
}
