use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Rewrite marked-up content into sections with ordered, cursor-driven rules.",
	long_about = "sectioner applies the rules of a sectioner.toml file to content, in order. Each \
	              rule finds an opening tag or pattern, optionally a closing one, and inserts or \
	              replaces text around them. Rules share a search cursor, so `first`, `next` \
	              and `remaining` rules can pick up where the previous rule stopped.\n\nQuick \
	              start:\n  sectioner init             Create a sample sectioner.toml\n  sectioner \
	              apply page.html  Print the rewritten page\n  sectioner check page.html  Fail \
	              if the page would change\n  sectioner rules            List the configured rules"
)]
pub struct SectionerCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root used to discover `sectioner.toml`.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Explicit path to a rules file. Skips discovery.
	#[arg(long, short, global = true)]
	pub config: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a sample `sectioner.toml` in the project root.
	///
	/// If a config file already exists, this command is a no-op and exits
	/// successfully.
	Init,
	/// Apply the configured rules to content.
	///
	/// Without files, reads content from stdin and prints the rewritten
	/// content to stdout. With files, prints the rewritten content of each
	/// file, or writes it back with `--write`.
	Apply {
		/// Files to rewrite.
		files: Vec<PathBuf>,

		/// Write the rewritten content back to each file instead of printing
		/// it.
		#[arg(long, default_value_t = false)]
		write: bool,

		/// Print a unified diff of the changes instead of the rewritten
		/// content.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
	/// Check whether applying the rules would change any file.
	///
	/// Exits with a non-zero status code when at least one file would change.
	/// Without files, checks content read from stdin.
	Check {
		/// Files to check.
		files: Vec<PathBuf>,

		/// Show a unified diff for each file that would change.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List the configured rules in the order they run.
	Rules,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
