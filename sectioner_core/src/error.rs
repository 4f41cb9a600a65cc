use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SectionerError {
	#[error(transparent)]
	#[diagnostic(code(sectioner::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid pattern `{pattern}`: {reason}")]
	#[diagnostic(
		code(sectioner::invalid_pattern),
		help("patterns use the `regex` crate syntax, optionally wrapped as `/pattern/flags`")
	)]
	InvalidPattern { pattern: String, reason: String },

	#[error("empty tag name in `{0}`")]
	#[diagnostic(
		code(sectioner::empty_tag),
		help("name the tag to match, e.g. `h2`, or `/h2` for its closing tag")
	)]
	EmptyTag(String),

	#[error("rule #{rule} stopped advancing at offset {offset}")]
	#[diagnostic(
		code(sectioner::stalled_cursor),
		help(
			"the pattern matched an empty span at the search cursor twice in a row; make it \
			 consume at least one character"
		)
	)]
	StalledCursor { rule: usize, offset: usize },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(sectioner::config_parse),
		help("check that sectioner.toml is valid TOML with one `[[rules]]` table per rule")
	)]
	ConfigParse(String),

	#[error("no config file found in `{0}`")]
	#[diagnostic(
		code(sectioner::missing_config),
		help("run `sectioner init` to create a sectioner.toml, or pass `--config <path>`")
	)]
	MissingConfig(String),

	#[error("config file `{0}` defines no rules")]
	#[diagnostic(
		code(sectioner::empty_rule_set),
		help("add at least one `[[rules]]` table")
	)]
	EmptyRuleSet(String),

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(sectioner::file_too_large),
		help("increase `max_file_size` in sectioner.toml")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },
}

pub type SectionerResult<T> = Result<T, SectionerError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
