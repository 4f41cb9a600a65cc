use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use sectioner_cli::Commands;
use sectioner_cli::OutputFormat;
use sectioner_cli::SectionerCli;
use sectioner_core::GoReport;
use sectioner_core::Sectioner;
use sectioner_core::SectionerConfig;
use sectioner_core::SectionerError;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

const SAMPLE_CONFIG: &str = r#"# sectioner configuration
# Rules run in order and share one search cursor.
# mode: first | next | all | remaining
# policy: replace | before | after

# Wrap every h2 and the content that follows it in a numbered section.
[[rules]]
mode = "all"
open_tag = "h2"
open_insert = "<section id=\"section-{{i}}\">\n"
open_policy = "before"
close_tag = "h2"
close_insert = "</section>\n"
close_policy = "before"
"#;

fn main() {
	let args = SectionerCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Apply {
			ref files,
			write,
			diff,
		}) => run_apply(&args, files, write, diff),
		Some(Commands::Check {
			ref files,
			diff,
			format,
		}) => run_check(&args, files, diff, format),
		Some(Commands::Rules) => run_rules(&args),
		None => {
			eprintln!("No subcommand specified. Run `sectioner --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<SectionerError>() {
			Ok(sectioner_err) => {
				let report: miette::Report = (*sectioner_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr so stdout stays clean for rewritten content. `RUST_LOG`
/// overrides the level picked by `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let level = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.try_init()
		.ok();
}

fn resolve_root(args: &SectionerCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Load the rules from `--config`, or discover them under the project root.
fn load_config(args: &SectionerCli) -> Result<SectionerConfig, Box<dyn std::error::Error>> {
	if let Some(path) = &args.config {
		return Ok(SectionerConfig::load_file(path)?);
	}

	let root = resolve_root(args);
	match SectionerConfig::load(&root)? {
		Some(config) => Ok(config),
		None => Err(SectionerError::MissingConfig(root.display().to_string()).into()),
	}
}

fn build_sectioner(config: &SectionerConfig) -> Result<Sectioner, Box<dyn std::error::Error>> {
	let sectioner = Sectioner::from_config(config)?;
	tracing::debug!(rules = sectioner.len(), "loaded rules");
	Ok(sectioner)
}

/// Read a file, refusing anything larger than the configured limit.
fn read_input(path: &Path, limit: u64) -> Result<String, SectionerError> {
	let size = std::fs::metadata(path)?.len();
	if size > limit {
		return Err(SectionerError::FileTooLarge {
			path: path.display().to_string(),
			size,
			limit,
		});
	}

	Ok(std::fs::read_to_string(path)?)
}

/// Read stdin, refusing more than `limit` bytes.
fn read_stdin(limit: u64) -> Result<String, SectionerError> {
	let mut bytes = Vec::new();
	std::io::stdin()
		.take(limit.saturating_add(1))
		.read_to_end(&mut bytes)?;

	let size = bytes.len() as u64;
	if size > limit {
		return Err(SectionerError::FileTooLarge {
			path: "<stdin>".to_string(),
			size,
			limit,
		});
	}

	String::from_utf8(bytes)
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

/// The outcome of running the rules over one input.
struct Rewrite {
	path: Option<PathBuf>,
	original: String,
	updated: String,
	report: GoReport,
}

impl Rewrite {
	fn changed(&self) -> bool {
		self.original != self.updated
	}

	fn label(&self, root: &Path) -> String {
		self.path
			.as_deref()
			.map_or_else(|| "<stdin>".to_string(), |path| make_relative(path, root))
	}
}

/// Run the rules over every file, or over stdin when no files are given.
fn rewrite_inputs(
	sectioner: &Sectioner,
	config: &SectionerConfig,
	files: &[PathBuf],
) -> Result<Vec<Rewrite>, Box<dyn std::error::Error>> {
	if files.is_empty() {
		let original = read_stdin(config.max_file_size)?;
		let (updated, report) = sectioner.go_with_report(&original)?;
		return Ok(vec![Rewrite {
			path: None,
			original,
			updated,
			report,
		}]);
	}

	let mut rewrites = Vec::with_capacity(files.len());
	for path in files {
		let _span = tracing::debug_span!("file", path = %path.display()).entered();
		let original = read_input(path, config.max_file_size)?;
		let (updated, report) = sectioner.go_with_report(&original)?;
		tracing::debug!(applied = report.applied(), "rewrote file");
		rewrites.push(Rewrite {
			path: Some(path.clone()),
			original,
			updated,
			report,
		});
	}

	Ok(rewrites)
}

fn run_init(args: &SectionerCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);

	if let Some(existing) = SectionerConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join("sectioner.toml");
	std::fs::write(&config_path, SAMPLE_CONFIG)?;
	println!("Created {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Edit sectioner.toml to describe your sections");
	println!("  2. Run `sectioner rules` to review the rule order");
	println!("  3. Run `sectioner apply <file>` to preview the result");

	Ok(())
}

fn run_apply(
	args: &SectionerCli,
	files: &[PathBuf],
	write: bool,
	show_diff: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let config = load_config(args)?;
	let sectioner = build_sectioner(&config)?;
	let root = resolve_root(args);
	let rewrites = rewrite_inputs(&sectioner, &config, files)?;

	if !write {
		for rewrite in &rewrites {
			if show_diff {
				if rewrite.changed() {
					eprintln!("{}", colored!(rewrite.label(&root), bold));
					print_diff(&rewrite.original, &rewrite.updated);
				}
			} else {
				print!("{}", rewrite.updated);
			}
		}
		return Ok(());
	}

	let mut updated = 0;
	for rewrite in &rewrites {
		if !rewrite.changed() {
			continue;
		}

		let label = rewrite.label(&root);
		if show_diff {
			eprintln!("{}", colored!(label, bold));
			print_diff(&rewrite.original, &rewrite.updated);
		}

		match &rewrite.path {
			Some(path) => {
				std::fs::write(path, &rewrite.updated)?;
				updated += 1;
				if args.verbose {
					println!(
						"  {} {label} ({} match(es))",
						colored!("updated", green),
						rewrite.report.applied()
					);
				}
			}
			None => print!("{}", rewrite.updated),
		}
	}

	if files.is_empty() {
		return Ok(());
	}

	if updated == 0 {
		println!("All files are already sectioned.");
	} else {
		println!("Updated {updated} file(s).");
	}

	Ok(())
}

fn run_check(
	args: &SectionerCli,
	files: &[PathBuf],
	show_diff: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let config = load_config(args)?;
	let sectioner = build_sectioner(&config)?;
	let root = resolve_root(args);
	let rewrites = rewrite_inputs(&sectioner, &config, files)?;
	let (changed, unchanged): (Vec<&Rewrite>, Vec<&Rewrite>) =
		rewrites.iter().partition(|rewrite| rewrite.changed());

	match format {
		OutputFormat::Json => {
			let changed_entries: Vec<serde_json::Value> = changed
				.iter()
				.map(|rewrite| {
					serde_json::json!({
						"file": rewrite.label(&root),
						"applied": rewrite.report.applied(),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": changed.is_empty(),
				"changed": changed_entries,
				"unchanged": unchanged.len(),
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			if changed.is_empty() {
				println!("Check passed: no content would change.");
			} else {
				for rewrite in &changed {
					eprintln!(
						"{} {} ({} match(es))",
						colored!("would change:", yellow),
						rewrite.label(&root),
						rewrite.report.applied()
					);
					if show_diff {
						print_diff(&rewrite.original, &rewrite.updated);
					}
				}
				eprintln!();
				eprintln!(
					"{} {} file(s) would change. Run `sectioner apply --write` to update them.",
					colored!("Check failed:", red),
					changed.len()
				);
			}
		}
	}

	if !changed.is_empty() {
		process::exit(1);
	}

	Ok(())
}

fn run_rules(args: &SectionerCli) -> Result<(), Box<dyn std::error::Error>> {
	let config = load_config(args)?;
	let sectioner = build_sectioner(&config)?;

	println!("{}", colored!(format!("{} rule(s)", sectioner.len()), bold));
	for (index, rule) in sectioner.rules().iter().enumerate() {
		println!("  {:>2}. {rule}", index + 1);
	}

	Ok(())
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
