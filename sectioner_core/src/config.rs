use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::Mode;
use crate::RuleConfig;
use crate::SectionerError;
use crate::SectionerResult;

/// Default maximum file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"sectioner.toml",
	".sectioner.toml",
	".config/sectioner.toml",
];

/// Configuration loaded from a `sectioner.toml` file.
///
/// ```toml
/// max_file_size = 10485760
///
/// [[rules]]
/// mode = "first"
/// open_tag = "hr"
/// open_insert = "<hr class=\"first\">"
///
/// [[rules]]
/// mode = "remaining"
/// open_tag = "hr"
/// open_insert = "<hr class=\"rest\">"
/// ```
#[derive(Debug, Deserialize)]
pub struct SectionerConfig {
	/// Rules in the order they are applied.
	#[serde(default)]
	pub rules: Vec<RuleEntry>,
	/// Maximum size in bytes of a file the CLI will rewrite. Defaults to
	/// 10 MB.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
}

/// A `[[rules]]` table: a mode plus the rule options.
#[derive(Debug, Deserialize)]
pub struct RuleEntry {
	#[serde(default)]
	pub mode: Mode,
	#[serde(flatten)]
	pub rule: RuleConfig,
	/// Keys that are not rule options. Rejected when the config loads.
	#[serde(flatten)]
	unknown: BTreeMap<String, toml::Value>,
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

impl SectionerConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> SectionerResult<Option<SectionerConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&config_path).map(Some)
	}

	/// Load the config from an explicit path.
	pub fn load_file(path: &Path) -> SectionerResult<SectionerConfig> {
		tracing::debug!(path = %path.display(), "loading config");
		let content = std::fs::read_to_string(path)?;
		let config = Self::parse(&content)?;

		if config.rules.is_empty() {
			return Err(SectionerError::EmptyRuleSet(path.display().to_string()));
		}

		Ok(config)
	}

	/// Parse config from a TOML string.
	pub fn parse(content: &str) -> SectionerResult<SectionerConfig> {
		let config: SectionerConfig =
			toml::from_str(content).map_err(|e| SectionerError::ConfigParse(e.to_string()))?;

		for (index, entry) in config.rules.iter().enumerate() {
			if let Some(key) = entry.unknown.keys().next() {
				return Err(SectionerError::ConfigParse(format!(
					"unknown option `{key}` in rule #{}",
					index + 1
				)));
			}
		}

		Ok(config)
	}
}

impl Default for SectionerConfig {
	fn default() -> Self {
		Self {
			rules: Vec::new(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
		}
	}
}
