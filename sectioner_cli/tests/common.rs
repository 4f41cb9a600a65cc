#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

/// Wraps every h2 and what follows it in a numbered section.
pub const SECTIONS_CONFIG: &str = r#"[[rules]]
mode = "all"
open_tag = "h2"
open_insert = "<section id=\"section-{{i}}\">\n"
open_policy = "before"
close_tag = "h2"
close_insert = "</section>\n"
close_policy = "before"
"#;

pub const PAGE: &str = "<h2>A</h2>\n<p>a</p>\n<h2>B</h2>\n";

pub const SECTIONED_PAGE: &str = "<section id=\"section-1\">\n<h2>A</h2>\n<p>a</p>\n</section>\n<section \
                                  id=\"section-2\">\n<h2>B</h2>\n</section>\n";

pub fn sectioner_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("sectioner"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

pub fn write_config(root: &Path, content: &str) -> std::io::Result<()> {
	std::fs::write(root.join("sectioner.toml"), content)
}
