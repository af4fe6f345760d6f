//! Binary-level tests driving `bundle_variants` as a subprocess.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A project root containing the fixture manifest.
fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(fixture("package.json"), dir.path().join("package.json")).unwrap();
    dir
}

fn cmd(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bundle_variants").unwrap();
    cmd.env_clear().arg("--root").arg(root);
    cmd
}

fn configs(stdout: &[u8]) -> Vec<Value> {
    serde_json::from_slice(stdout).unwrap()
}

#[test]
fn no_arguments_emit_every_variant() {
    let root = project();
    let output = cmd(root.path()).assert().success().get_output().stdout.clone();
    let names: Vec<String> = configs(&output)
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["debug", "dist", "light", "light-dist", "demo", "debug", "demo"]
    );
}

#[test]
fn summary_line_goes_to_stderr() {
    let root = project();
    cmd(root.path())
        .args(["light", "dist"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Building configs: dist, light."));
}

#[test]
fn environment_flags_shape_the_light_build() {
    let root = project();
    let output = cmd(root.path())
        .env("EME_DRM", "1")
        .args(["--env", "light"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let configs = configs(&output);
    assert_eq!(configs.len(), 1);

    let light = &configs[0];
    assert_eq!(light["output"]["filename"], "hls.light.js");
    assert_eq!(light["plugins"][0]["options"]["__USE_EME_DRM__"], "true");
    assert_eq!(light["plugins"][0]["options"]["__VERSION__"], "\"1.5.0\"");
    let alias = light["resolve"]["alias"].as_object().unwrap();
    assert!(!alias.contains_key("./controller/eme-controller"));
    assert!(alias.contains_key("./controller/cmcd-controller"));
}

#[test]
fn unknown_variant_fails_listing_known_names() {
    let root = project();
    cmd(root.path())
        .arg("not-a-real-name")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "Couldn't find a valid config with the names [\"not-a-real-name\"]",
        ))
        .stderr(predicate::str::contains(
            "Known configs are: debug, dist, light, light-dist, demo, debug, demo",
        ));
}

#[test]
fn reserved_keys_are_ignored() {
    let root = project();
    let output = cmd(root.path())
        .args(["--env", "WEBPACK_BUNDLE=true", "--env", "dist"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(configs(&output).len(), 1);
}

#[test]
fn list_prints_catalog_names() {
    let root = project();
    cmd(root.path())
        .arg("--list")
        .assert()
        .success()
        .stdout("debug\ndist\nlight\nlight-dist\ndemo\ndebug\ndemo\n");
}

#[test]
fn custom_catalog_replaces_builtin_variants() {
    let root = project();
    let output = cmd(root.path())
        .arg("--catalog")
        .arg(fixture("catalog.toml"))
        .arg("--pkg-version")
        .arg("2.0.0-rc.1")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let configs = configs(&output);
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0]["devtool"], false);
    assert_eq!(
        configs[1]["output"]["path"],
        root.path().join("build").to_string_lossy().into_owned()
    );
    assert_eq!(configs[1]["plugins"][0]["options"]["__VERSION__"], "\"2.0.0-rc.1\"");
}

#[test]
fn output_flag_writes_a_file() {
    let root = project();
    let target = root.path().join("out").join("configs.json");
    cmd(root.path())
        .arg("light-dist")
        .arg("--output")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let written: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(target).unwrap()).unwrap();
    assert_eq!(written[0]["mode"], "production");
}

#[test]
fn transform_applies_production_rules() {
    let root = project();
    let output = cmd(root.path())
        .arg("dist")
        .arg("--transform")
        .arg(fixture("source.ts"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let source = String::from_utf8(output).unwrap();

    assert!(source.starts_with("import { MAX_SAFE_INTEGER, isFiniteNumber } from "));
    assert!(source.contains("polyfills/number"));
    assert!(!source.contains("console.assert"));
    assert!(!source.contains("console.debug"));
    assert!(source.contains("console.warn('checking');"));
    assert!(source.contains("return duration < MAX_SAFE_INTEGER;"));
}

#[test]
fn transform_in_development_keeps_diagnostics() {
    let root = project();
    cmd(root.path())
        .arg("debug")
        .arg("--transform")
        .arg(fixture("source.ts"))
        .assert()
        .success()
        .stdout(predicate::str::contains("console.assert(isFiniteNumber(duration), 'duration');"));
}

#[test]
fn missing_manifest_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("package.json"));
}

#[test]
fn unknown_variant_is_reported_before_the_manifest_is_read() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("not-a-real-name")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Couldn't find a valid config"))
        .stderr(predicate::str::contains("package.json").not());
}

#[test]
fn transform_leaves_the_polyfill_module_alone() {
    let root = project();
    let polyfills = root.path().join("src").join("polyfills");
    std::fs::create_dir_all(&polyfills).unwrap();
    let source = "export const isFiniteNumber =\n  Number.isFinite ||\n  function (value) {\n    return typeof value === 'number' && isFinite(value);\n  };\n\nexport const MAX_SAFE_INTEGER = Number.MAX_SAFE_INTEGER || 9007199254740991;\n";
    let file = polyfills.join("number.ts");
    std::fs::write(&file, source).unwrap();

    cmd(root.path())
        .arg("dist")
        .arg("--transform")
        .arg(&file)
        .assert()
        .success()
        .stdout(source);
}
