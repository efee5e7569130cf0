use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn texforge_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("texforge"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("TEXFORGE_TEMPLATE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

fn init_templates(home: &TempDir, dir: &Path) {
    texforge_cmd(home.path())
        .args(["init", "-t"])
        .arg(dir)
        .assert()
        .success()
        .stdout(contains("example.tex.j2"));
}

#[test]
fn init_then_list_and_info_show_the_example() {
    let home = TempDir::new().expect("home");
    let templates = home.path().join("templates");
    init_templates(&home, &templates);

    assert!(templates.join("example.tex.j2").is_file());
    assert!(templates.join("example.yaml").is_file());

    texforge_cmd(home.path())
        .args(["list", "-t"])
        .arg(&templates)
        .assert()
        .success()
        .stdout(contains("example"))
        .stdout(contains("A simple article to start from"));

    texforge_cmd(home.path())
        .args(["info", "example", "-t"])
        .arg(&templates)
        .assert()
        .success()
        .stdout(contains("Example Template"))
        .stdout(contains("introduction"))
        .stdout(contains("multiline"));
}

#[test]
fn init_refuses_to_replace_without_force() {
    let home = TempDir::new().expect("home");
    let templates = home.path().join("templates");
    init_templates(&home, &templates);

    texforge_cmd(home.path())
        .args(["init", "-t"])
        .arg(&templates)
        .assert()
        .failure()
        .stderr(contains("--force"));

    texforge_cmd(home.path())
        .args(["init", "--force", "-t"])
        .arg(&templates)
        .assert()
        .success();
}

#[test]
fn generate_writes_document_from_file_and_set_values() {
    let home = TempDir::new().expect("home");
    let templates = home.path().join("templates");
    init_templates(&home, &templates);

    let values = home.path().join("values.yaml");
    fs::write(&values, "title: Lab Notes\nauthor: Ada Lovelace\n").expect("write values");
    let out = home.path().join("out").join("notes.tex");

    texforge_cmd(home.path())
        .args(["generate", "example"])
        .arg(&out)
        .arg("-v")
        .arg(&values)
        .args(["--set", "introduction=First steps", "-t"])
        .arg(&templates)
        .assert()
        .success()
        .stdout(contains("Generated"));

    let text = fs::read_to_string(&out).expect("read output");
    assert!(text.contains("\\title{Lab Notes}"), "{text}");
    assert!(text.contains("\\author{Ada Lovelace}"));
    assert!(text.contains("\\usepackage{amsmath}"));
    assert!(text.contains("First steps"));
    assert!(!text.contains("\\begin{abstract}"));
}

#[test]
fn generate_refuses_to_overwrite_existing_output() {
    let home = TempDir::new().expect("home");
    let templates = home.path().join("templates");
    init_templates(&home, &templates);
    let out = home.path().join("notes.tex");
    fs::write(&out, "keep me").expect("seed output");

    let generate = |extra: &[&str]| {
        let mut cmd = texforge_cmd(home.path());
        cmd.args(["generate", "example"])
            .arg(&out)
            .args(["--set", "title=T", "--set", "author=A", "--set", "introduction=I", "-t"])
            .arg(&templates)
            .args(extra);
        cmd
    };

    generate(&[])
        .assert()
        .failure()
        .stderr(contains("--overwrite"));
    assert_eq!(fs::read_to_string(&out).unwrap(), "keep me");

    generate(&["--overwrite"]).assert().success();
    assert!(fs::read_to_string(&out).unwrap().contains("\\title{T}"));
}

#[test]
fn generate_reports_undefined_variables() {
    let home = TempDir::new().expect("home");
    let templates = home.path().join("templates");
    init_templates(&home, &templates);
    let out = home.path().join("notes.tex");

    texforge_cmd(home.path())
        .args(["generate", "example"])
        .arg(&out)
        .arg("-t")
        .arg(&templates)
        .assert()
        .failure()
        .stderr(contains("title"));
    assert!(!out.exists());
}

#[test]
fn generate_rejects_unknown_values_extension() {
    let home = TempDir::new().expect("home");
    let templates = home.path().join("templates");
    init_templates(&home, &templates);
    let values = home.path().join("values.txt");
    fs::write(&values, "title: x").expect("write values");

    texforge_cmd(home.path())
        .args(["generate", "example"])
        .arg(home.path().join("notes.tex"))
        .arg("-v")
        .arg(&values)
        .arg("-t")
        .arg(&templates)
        .assert()
        .failure()
        .stderr(contains("must be YAML"));
}

#[test]
fn unknown_template_fails() {
    let home = TempDir::new().expect("home");
    let templates = home.path().join("templates");
    fs::create_dir_all(&templates).expect("mkdir");

    texforge_cmd(home.path())
        .args(["info", "thesis", "-t"])
        .arg(&templates)
        .assert()
        .failure()
        .stderr(contains("thesis"));
}

#[test]
fn compile_missing_source_fails() {
    let home = TempDir::new().expect("home");

    texforge_cmd(home.path())
        .arg("compile")
        .arg(home.path().join("absent.tex"))
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn assets_import_and_list() {
    let home = TempDir::new().expect("home");
    let project = home.path().join("project");
    fs::create_dir_all(&project).expect("mkdir");
    let font = home.path().join("Inter.ttf");
    fs::write(&font, vec![0u8; 2048]).expect("write font");

    texforge_cmd(home.path())
        .args(["assets", "import", "font"])
        .arg(&font)
        .arg("--root")
        .arg(&project)
        .assert()
        .success()
        .stdout(contains("Imported"));
    assert!(project.join("assets/fonts/Inter.ttf").is_file());

    texforge_cmd(home.path())
        .args(["assets", "list", "--root"])
        .arg(&project)
        .assert()
        .success()
        .stdout(contains("Inter.ttf"))
        .stdout(contains("TTF"));
}
