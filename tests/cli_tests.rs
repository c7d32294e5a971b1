use std::io::Write;
use std::process::{Command, Stdio};

fn httpbridge() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_httpbridge"));
    cmd.env("HTTPBRIDGE_LOG_LEVEL", "error");
    cmd
}

#[test]
fn test_cli_classify_fixture() {
    let output = httpbridge()
        .args(["classify", "--payload", "tests/testpayloads/apigateway_v2.json"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "apigateway_v2\n");
}

#[test]
fn test_cli_classify_unknown_reports_error() {
    let output = httpbridge()
        .args(["classify", "--payload", "tests/testpayloads/unknown.json"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("error: unsupported request type"));
}

#[test]
fn test_cli_invoke_reads_stdin() {
    let mut child = httpbridge()
        .arg("invoke")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn cli");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(include_bytes!("testpayloads/alb_target_group.json"))
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let reply: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reply["statusCode"], 200);
    assert_eq!(reply["statusDescription"], "200 OK");
    assert_eq!(reply["headers"]["Content-Type"], "application/json");
    let echoed: serde_json::Value = serde_json::from_str(reply["body"].as_str().unwrap()).unwrap();
    assert_eq!(echoed["path"], "/lambda");
    assert_eq!(echoed["remote_addr"], "72.12.164.125");
}

#[test]
fn test_cli_missing_payload_fails() {
    let output = httpbridge()
        .args(["invoke", "--payload", "/nonexistent/payload.json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
}
