//! End-to-end tests driving the `metacraft` binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn metacraft() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_metacraft"));
    cmd.env_remove("METACRAFT_BASE_URL").env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) -> Output {
    metacraft().args(args).output().expect("failed to run metacraft")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_config(dir: &Path, content: &str) -> String {
    let path = dir.join("config.toml");
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn gen_config_prints_parseable_toml() {
    let out = run(&["gen-config"]);
    assert!(out.status.success());
    let text = stdout(&out);
    let value: toml::Value = toml::from_str(&text).expect("stock config is valid TOML");
    for table in ["server", "defaults", "image", "snippet", "sync"] {
        assert!(value.get(table).is_some(), "missing [{table}]");
    }
}

#[test]
fn gen_config_output_is_loadable() {
    let tmp = TempDir::new().unwrap();
    let text = stdout(&run(&["gen-config"]));
    let config = write_config(tmp.path(), &text);
    let out = run(&["--config", &config, "snippet"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn snippet_reflects_query() {
    let out = run(&["snippet", "title=Hello&canonical=https://example.com/x"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.starts_with("<title>Hello</title>"));
    assert!(text.contains(r#"<link rel="canonical" href="https://example.com/x" />"#));
    assert!(text.contains("http://localhost:3000/api/og?title="));
}

#[test]
fn snippet_accepts_full_url() {
    let out = run(&["snippet", "http://localhost:3000/?title=From+URL"]);
    assert!(stdout(&out).starts_with("<title>From URL</title>"));
}

#[test]
fn snippet_escapes_unless_raw() {
    let escaped = stdout(&run(&["snippet", "title=%3Cb%3E"]));
    assert!(escaped.starts_with("<title>&lt;b&gt;</title>"));

    let raw = stdout(&run(&["snippet", "--raw", "title=%3Cb%3E"]));
    assert!(raw.starts_with("<title><b></title>"));
}

#[test]
fn base_url_from_environment() {
    let out = metacraft()
        .env("METACRAFT_BASE_URL", "https://meta.example/")
        .args(["snippet", "title=Hi"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(stdout(&out).contains("https://meta.example/api/og?title="));
}

#[test]
fn base_url_flag_beats_config() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(
        tmp.path(),
        "[server]\nbase_url = \"https://from-config.example\"\n",
    );
    let from_config = stdout(&run(&["--config", &config, "snippet"]));
    assert!(from_config.contains("https://from-config.example/api/og"));

    let from_flag = stdout(&run(&[
        "--config",
        &config,
        "--base-url",
        "https://from-flag.example",
        "snippet",
    ]));
    assert!(from_flag.contains("https://from-flag.example/api/og"));
}

#[test]
fn config_defaults_fill_missing_fields() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), "[defaults]\nsiteName = \"Acme\"\n");
    let text = stdout(&run(&["--config", &config, "snippet", "title=Hi"]));
    assert!(text.contains(r#"<meta property="og:site_name" content="Acme" />"#));
}

#[test]
fn unknown_config_key_fails() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(tmp.path(), "[server]\nport = 8080\n");
    let out = run(&["--config", &config, "snippet"]);
    assert!(!out.status.success());
}

#[test]
fn missing_config_file_fails() {
    let out = run(&["--config", "/nonexistent/metacraft.toml", "snippet"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("metacraft.toml"));
}

#[test]
fn json_ld_prints_schema() {
    let out = run(&[
        "json-ld",
        "title=Post&canonical=https://example.com/p&jsonldType=Article&author=Ana",
    ]);
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(v["@context"], "https://schema.org");
    assert_eq!(v["@type"], "Article");
    assert_eq!(v["name"], "Post");
    assert_eq!(v["url"], "https://example.com/p");
    assert_eq!(v["author"]["name"], "Ana");
}

#[test]
fn check_passes_for_defaults() {
    let out = run(&["check"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("    title: ok"));
    assert!(text.contains("All fields valid"));
}

#[test]
fn check_reports_invalid_fields() {
    let out = run(&["check", "canonical=not-a-url&ogBg=blue"]);
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    assert!(text.contains("    canonical: URL inválida (not-a-url)"));
    assert!(text.contains("    ogBg: Cor inválida (blue)"));
    assert!(text.contains("2 fields with errors"));
}

#[test]
fn check_reports_contrast() {
    let text = stdout(&run(&["check", "ogBg=%23000000&ogFg=%23ffffff"]));
    assert!(text.contains("21.00:1"));
    assert!(text.contains("Bom contraste"));
}

#[test]
fn og_writes_png() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("card.png");
    let out = run(&[
        "og",
        "title=Page&ogImageText=Hello&ogBg=%23102030",
        "-o",
        path.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).starts_with("Hello → "));

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (1200, 630));
    assert_eq!(img.get_pixel(0, 0).0, [0x10, 0x20, 0x30, 0xff]);
}

#[test]
fn og_format_follows_extension() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("card.jpg");
    let out = run(&["og", "title=Hi", "-o", path.to_str().unwrap()]);
    assert!(out.status.success());
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..3], &[0xff, 0xd8, 0xff]);
    assert!(stdout(&out).contains("jpeg"));
}

#[test]
fn edit_mirrors_final_url() {
    let tmp = TempDir::new().unwrap();
    let location = tmp.path().join("url.txt");
    let mut child = metacraft()
        .args(["edit", "--location", location.to_str().unwrap()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let mut stdin = child.stdin.take().unwrap();
        writeln!(stdin, "title=First").unwrap();
        writeln!(stdin, "title=Edited").unwrap();
        writeln!(stdin, "ogBg=%23000000&canonical=nope").unwrap();
    }
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());

    let text = stdout(&out);
    assert!(text.contains("title = Edited"));
    assert!(text.contains("canonical = nope\n    URL inválida"));
    assert!(text.contains("4 edits → "));

    let url = std::fs::read_to_string(&location).unwrap();
    assert!(url.starts_with("http://localhost:3000/?title=Edited&"));
    assert!(url.contains("canonical=nope"));
    assert!(url.contains("ogBg=%23000000"));
    assert!(!url.contains("First"));
}

#[test]
fn edit_resumes_from_existing_location() {
    let tmp = TempDir::new().unwrap();
    let location = tmp.path().join("url.txt");
    std::fs::write(&location, "http://localhost:3000/?title=Saved&siteName=Acme\n").unwrap();

    let mut child = metacraft()
        .args(["edit", "--location", location.to_str().unwrap()])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .unwrap();
    {
        let mut stdin = child.stdin.take().unwrap();
        writeln!(stdin, "author=Ana").unwrap();
    }
    assert!(child.wait().unwrap().success());

    let url = std::fs::read_to_string(&location).unwrap();
    assert!(url.contains("title=Saved"));
    assert!(url.contains("siteName=Acme"));
    assert!(url.contains("author=Ana"));
}
