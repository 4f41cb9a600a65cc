mod common;

use sectioner_core::AnyEmptyResult;
use sectioner_core::SectionerConfig;
use similar_asserts::assert_eq;

#[test]
fn init_creates_a_working_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::sectioner_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("init")
		.assert()
		.success()
		.stdout(predicates::str::contains("Created"))
		.stdout(predicates::str::contains("Next steps:"));

	let config = SectionerConfig::load_file(&tmp.path().join("sectioner.toml"))?;
	assert_eq!(config.rules.len(), 1);

	let output = common::sectioner_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("apply")
		.write_stdin(common::PAGE)
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	assert_eq!(String::from_utf8(output)?, common::SECTIONED_PAGE);

	Ok(())
}

#[test]
fn init_leaves_an_existing_config_alone() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir(tmp.path().join(".config"))?;
	let existing = tmp.path().join(".config/sectioner.toml");
	std::fs::write(&existing, common::SECTIONS_CONFIG)?;

	common::sectioner_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("init")
		.assert()
		.success()
		.stdout(predicates::str::contains("already exists"));

	assert!(!tmp.path().join("sectioner.toml").exists());
	assert_eq!(std::fs::read_to_string(&existing)?, common::SECTIONS_CONFIG);

	Ok(())
}

#[test]
fn init_prefers_the_root_config_on_discovery() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_config(
		tmp.path(),
		"[[rules]]\nmode = \"first\"\nopen_tag = \"p\"\nopen_insert = \"<p class=\\\"lead\\\">\"\n",
	)?;
	std::fs::write(tmp.path().join(".sectioner.toml"), common::SECTIONS_CONFIG)?;

	common::sectioner_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("apply")
		.write_stdin("<p>a</p><p>b</p>")
		.assert()
		.success()
		.stdout("<p class=\"lead\">a</p><p>b</p>");

	Ok(())
}
