use serde::Serialize;

use crate::BlockOutcome;
use crate::Cursor;
use crate::Mode;
use crate::Rule;
use crate::RuleConfig;
use crate::SectionerConfig;
use crate::SectionerError;
use crate::SectionerResult;
use crate::replace_block;

/// How many times one rule applied during a [`Sectioner::go`] pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
	/// Zero-based registration index of the rule.
	pub index: usize,
	pub mode: Mode,
	/// Number of matches the rule applied.
	pub applied: usize,
}

/// Summary of a [`Sectioner::go`] pass, one entry per registered rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GoReport {
	pub rules: Vec<RuleReport>,
}

impl GoReport {
	/// Total number of matches applied across all rules.
	pub fn applied(&self) -> usize {
		self.rules.iter().map(|rule| rule.applied).sum()
	}
}

/// An ordered set of rules applied to content with a shared search cursor.
///
/// Rules run in the order they were registered. Their [`Mode`] only decides
/// where the cursor starts and whether the rule repeats:
///
/// ```rust
/// use sectioner_core::Policy;
/// use sectioner_core::RuleConfig;
/// use sectioner_core::Sectioner;
///
/// let mut sectioner = Sectioner::new();
/// sectioner
/// 	.replace_first(RuleConfig::tag("hr").open_insert(r#"<hr class="first">"#))?
/// 	.replace_next(RuleConfig::tag("hr").open_insert(r#"<hr class="next">"#))?;
///
/// let output = sectioner.go("<hr>\n<hr>\n<hr>")?;
/// assert_eq!(output, "<hr class=\"first\">\n<hr class=\"next\">\n<hr>");
/// # Ok::<(), sectioner_core::SectionerError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Sectioner {
	rules: Vec<Rule>,
}

impl Sectioner {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register every rule of a loaded config, in file order.
	pub fn from_config(config: &SectionerConfig) -> SectionerResult<Self> {
		let mut sectioner = Self::new();
		for entry in &config.rules {
			sectioner.register(entry.mode, &entry.rule)?;
		}
		Ok(sectioner)
	}

	/// Apply the rule to every occurrence, starting from the top.
	pub fn replace_all(&mut self, config: RuleConfig) -> SectionerResult<&mut Self> {
		self.register(Mode::All, &config)
	}

	/// Apply the rule to the first occurrence only.
	pub fn replace_first(&mut self, config: RuleConfig) -> SectionerResult<&mut Self> {
		self.register(Mode::First, &config)
	}

	/// Apply the rule once, continuing where the previous rule stopped.
	pub fn replace_next(&mut self, config: RuleConfig) -> SectionerResult<&mut Self> {
		self.register(Mode::Next, &config)
	}

	/// Apply the rule to every occurrence after where the previous rule
	/// stopped.
	pub fn replace_remaining(&mut self, config: RuleConfig) -> SectionerResult<&mut Self> {
		self.register(Mode::Remaining, &config)
	}

	/// Register a rule with an explicit mode.
	pub fn register(&mut self, mode: Mode, config: &RuleConfig) -> SectionerResult<&mut Self> {
		let rule = Rule::new(mode, config)?;
		Ok(self.push(rule))
	}

	/// Append an already built rule.
	pub fn push(&mut self, rule: Rule) -> &mut Self {
		tracing::debug!(index = self.rules.len(), %rule, "registered rule");
		self.rules.push(rule);
		self
	}

	pub fn rules(&self) -> &[Rule] {
		&self.rules
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	/// Run every rule over `content` and return the rewritten content.
	pub fn go(&self, content: &str) -> SectionerResult<String> {
		self.go_with_report(content).map(|(content, _)| content)
	}

	/// Like [`Sectioner::go`], also reporting how often each rule applied.
	pub fn go_with_report(&self, content: &str) -> SectionerResult<(String, GoReport)> {
		let mut content = content.to_string();
		let mut cursor = Cursor::start();
		let mut report = GoReport::default();

		for (index, rule) in self.rules.iter().enumerate() {
			let _span = tracing::debug_span!("rule", index, mode = %rule.mode).entered();

			let applied = match rule.mode {
				Mode::First => {
					let outcome = replace_block(content, Cursor::start(), rule, 1);
					cursor = outcome.cursor;
					content = outcome.content;
					usize::from(outcome.open_match.is_some())
				}
				Mode::Next => {
					if cursor.is_exhausted() {
						tracing::debug!("previous rule is exhausted, skipping");
						0
					} else {
						let outcome = replace_block(content, cursor, rule, 1);
						cursor = outcome.cursor;
						content = outcome.content;
						usize::from(outcome.open_match.is_some())
					}
				}
				Mode::All | Mode::Remaining => {
					let from = if rule.mode == Mode::All {
						Cursor::start()
					} else {
						cursor
					};
					let (rewritten, applied) = repeat(content, from, rule, index)?;
					content = rewritten;
					cursor = Cursor::start();
					applied
				}
			};

			tracing::debug!(applied, %cursor, "rule finished");
			report.rules.push(RuleReport {
				index,
				mode: rule.mode,
				applied,
			});
		}

		Ok((content, report))
	}
}

/// Apply `rule` until the cursor is exhausted. Returns the content and the
/// number of applied matches.
///
/// Every applied match either consumes content past the cursor or leaves the
/// unsearched tail as long as it was. Two applications in a row that leave
/// the tail as long as it was can repeat forever and fail with
/// [`SectionerError::StalledCursor`].
fn repeat(
	mut content: String,
	mut cursor: Cursor,
	rule: &Rule,
	index: usize,
) -> SectionerResult<(String, usize)> {
	let mut occurrence = 1;
	let mut idle = 0;

	while let Some(from) = cursor.offset() {
		let remaining = content.len().saturating_sub(from);
		let BlockOutcome {
			content: rewritten,
			cursor: next,
			open_match,
		} = replace_block(content, cursor, rule, occurrence);
		content = rewritten;
		cursor = next;

		let Some(open_match) = open_match else {
			break;
		};

		tracing::debug!(occurrence, ?open_match, "applied match");
		occurrence += 1;

		let Some(offset) = cursor.offset() else {
			break;
		};

		if content.len().saturating_sub(offset) < remaining {
			idle = 0;
		} else {
			idle += 1;
			if idle == 2 {
				return Err(SectionerError::StalledCursor {
					rule: index + 1,
					offset: from,
				});
			}
		}
	}

	Ok((content, occurrence - 1))
}
