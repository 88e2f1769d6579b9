use std::io::Write;
use std::process::{Command, Stdio};

#[test]
fn onr_lsp_binary_starts_and_stops() {
    let exe = env!("CARGO_BIN_EXE_onr-lsp");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start onr-lsp binary");

    // Immediately terminate the server; we only need to ensure it starts.
    child.kill().expect("failed to stop onr-lsp binary");
    let _ = child.wait();
}

#[test]
fn version_subcommand_prints_banner() {
    let exe = env!("CARGO_BIN_EXE_onr-lsp");
    let output = Command::new(exe)
        .arg("version")
        .output()
        .expect("run version");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.starts_with("onr-lsp version="));
}

#[test]
fn format_subcommand_formats_stdin() {
    let exe = env!("CARGO_BIN_EXE_onr-lsp");
    let mut child = Command::new(exe)
        .arg("format")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("start format");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(
            b"provider \"x\" {\ndefaults {\nrequest {\nreq_map openai_chat_to_openai_responses;\n}\n}\n}\n",
        )
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(
        stdout,
        "provider \"x\" {\n  defaults {\n    request {\n      req_map openai_chat_to_openai_responses;\n    }\n  }\n}\n"
    );
}

#[test]
fn format_write_without_path_fails() {
    let exe = env!("CARGO_BIN_EXE_onr-lsp");
    let mut child = Command::new(exe)
        .args(["format", "-w"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("start format");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"a;\n")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("--write requires a file path"));
}
