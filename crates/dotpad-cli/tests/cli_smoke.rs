use assert_cmd::Command;
use std::fs;

const GRAPH: &str = "digraph G { a -> b; b -> \"ü\" }\n";

fn cli() -> Command {
    Command::new(assert_cmd::cargo_bin!("dotpad-cli"))
}

fn graphviz_available() -> bool {
    std::process::Command::new("dot")
        .arg("-V")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn share_link(args: &[&str]) -> String {
    let out = cli()
        .arg("share")
        .args(args)
        .write_stdin(GRAPH)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(out).expect("utf-8 link").trim().to_string()
}

#[test]
fn share_prints_a_playground_link() {
    let link = share_link(&["--engine", "neato", "--format", "png"]);
    assert!(
        link.starts_with("https://dreampuf.github.io/GraphvizOnline/?"),
        "{link}"
    );
    assert!(link.contains("compressed="), "{link}");
    assert!(link.contains("engine=neato"), "{link}");
    assert!(link.contains("format=png"), "{link}");
}

#[test]
fn share_honors_a_custom_base() {
    let link = share_link(&["--base", "https://play.example/app/#old"]);
    assert!(link.starts_with("https://play.example/app/?"), "{link}");
    assert!(!link.contains('#'), "{link}");
}

#[test]
fn shared_links_open_to_the_same_source() {
    let link = share_link(&[]);
    cli().args(["open", &link]).assert().success().stdout(GRAPH);
}

#[test]
fn open_reads_raw_and_fragment_sources() {
    cli()
        .args(["open", "https://play.example/?raw=graph%20G%20%7B%7D"])
        .assert()
        .success()
        .stdout("graph G {}");
    cli()
        .args(["open", "https://play.example/#digraph%20%7Ba-%3Eb%7D"])
        .assert()
        .success()
        .stdout("digraph {a->b}");
}

#[test]
fn open_without_a_source_fails() {
    let assert = cli()
        .args(["open", "https://play.example/?engine=dot"])
        .assert()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("no graph source"), "{stderr}");
}

#[test]
fn open_reports_bad_parameters_but_still_loads() {
    let assert = cli()
        .args(["open", "https://play.example/?engine=bogus&raw=graph"])
        .assert()
        .success()
        .stdout("graph");
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(
        stderr.contains("Invalid 'engine' parameter: bogus"),
        "{stderr}"
    );
}

#[test]
fn open_reports_corrupt_share_links() {
    let assert = cli()
        .args(["open", "https://play.example/?compressed=wAAA"])
        .assert()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("URL Generation Failed: "), "{stderr}");
}

#[test]
fn open_accepts_an_empty_document_link() {
    cli()
        .args(["open", "https://play.example/?compressed=Q&engine=dot&format=svg"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn help_and_bad_arguments_exit_with_usage() {
    cli().arg("--help").assert().code(2);
    cli().args(["--format", "gif"]).assert().code(2);
    cli().args(["--engine", "Dot"]).assert().code(2);
    cli().arg("open").assert().code(2);
}

#[test]
fn missing_graphviz_is_a_render_error() {
    let assert = cli()
        .args(["--dot", "/nonexistent/graphviz/dot"])
        .write_stdin(GRAPH)
        .assert()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("failed to run"), "{stderr}");
}

#[test]
fn renders_svg_with_graphviz() {
    if !graphviz_available() {
        return;
    }
    let out = cli()
        .arg("render")
        .write_stdin(GRAPH)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let svg = String::from_utf8(out).expect("utf-8 svg");
    assert!(svg.contains("<svg"), "{svg}");
}

#[test]
fn renders_png_next_to_the_input() {
    if !graphviz_available() {
        return;
    }
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = tmp.path().join("graph.dot");
    fs::write(&input, GRAPH).expect("write input");

    cli()
        .args(["--format", "png", "--scale", "1"])
        .arg(&input)
        .assert()
        .success();

    let bytes = fs::read(input.with_extension("png")).expect("read png");
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "output is not a PNG");
}
