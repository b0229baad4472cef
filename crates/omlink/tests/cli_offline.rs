#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const GET_NODE_ID_RSP: &str = "AA 55 06 8F 56 34 12 00 BD";

fn omlink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_omlink"))
        .env_remove("RUST_LOG")
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("omlink should run")
}

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "omlink-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

#[test]
fn decode_hex_prints_response_text() {
    let out = omlink(&["--format", "raw", "decode", "--hex", GET_NODE_ID_RSP]);
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.starts_with("MCU_RSP_GET_NODE_ID. NodeId:1193046"),
        "stdout: {stdout}"
    );
    assert!(stdout.contains("STATUS_SUCCESS"));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("frames=1 responses=1 events=0 errors=0"));
}

#[test]
fn decode_json_emits_one_object_per_message() {
    let hex = format!("{GET_NODE_ID_RSP} AA 55 03 80 00 97");
    let out = omlink(&["--format", "json", "decode", "--hex", &hex]);
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be json"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["kind"], "response");
    assert_eq!(lines[0]["id"], "0x8F");
    assert_eq!(lines[1]["id"], "0x80");
    assert_eq!(lines[1]["timestamp_ms"], 14);

    let stats: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&out.stderr).trim())
            .expect("stats should be json");
    assert_eq!(stats["frames"], 2);
    assert_eq!(stats["checksum_errors"], 0);
}

#[test]
fn decode_reports_checksum_errors_and_fails() {
    let out = omlink(&[
        "--format",
        "raw",
        "decode",
        "--hex",
        "AA 55 06 8F 56 34 12 00 BE",
    ]);
    assert_eq!(out.status.code(), Some(60));
    assert!(out.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("checksum mismatch"), "stderr: {stderr}");
    assert!(stderr.contains("errors=1"));
}

#[test]
fn decode_reads_binary_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_omlink"))
        .args(["--log-level", "error", "--format", "raw", "decode"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("decode should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(&[0x00, 0xAA, 0x55, 0x03, 0x80, 0x00, 0x97, 0x13])
        .expect("stdin write should succeed");

    let out = child.wait_with_output().expect("decode should finish");
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("MCU_RSP_NOP. "));
}

#[test]
fn decode_reads_capture_file() {
    let dir = unique_temp_dir("decode-file");
    let path = dir.join("capture.bin");
    std::fs::write(&path, [0xAA, 0x55, 0x02, 0x09, 0x92]).expect("capture should be writable");

    let out = omlink(&[
        "--format",
        "raw",
        "decode",
        "--file",
        path.to_str().expect("utf-8 path"),
    ]);

    // NODE_DISCONNECTED needs a node id and a reason.
    assert_eq!(out.status.code(), Some(60));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn decode_missing_file_is_usage_error() {
    let out = omlink(&["decode", "--file", "/nonexistent/omlink/capture.bin"]);
    assert_eq!(out.status.code(), Some(64));
}

#[test]
fn decode_rejects_bad_hex() {
    let out = omlink(&["decode", "--hex", "AA 5"]);
    assert_eq!(out.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&out.stderr).contains("odd number of hex digits"));
}

#[test]
fn encode_prints_spaced_frame() {
    let out = omlink(&["--format", "pretty", "encode", "getnodeid"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "AA 55 02 0F 80\n");
}

#[test]
fn encode_raw_writes_frame_bytes() {
    let out = omlink(&["--format", "raw", "encode", "connect", "9"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(out.stdout, [0xAA, 0x55, 0x05, 0x1E, 0x09, 0x00, 0x00, 0x69]);
}

#[test]
fn encode_json_describes_payload() {
    let out = omlink(&["--format", "json", "encode", "tx", "9", "hi"]);
    assert_eq!(out.status.code(), Some(0));

    let value: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("encode should emit json");
    assert_eq!(value["command"], "TX_PAYLOAD DestNodeId:9, Ack:0, Len:2");
    assert_eq!(value["payload"], "2B09000000026869");
    assert_eq!(value["frame"], "AA55092B0900000002686944");
    assert_eq!(value["length"], 12);
}

#[test]
fn encode_unknown_command_is_usage_error() {
    let out = omlink(&["encode", "selfdestruct"]);
    assert_eq!(out.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&out.stderr).contains("selfdestruct"));
}

#[test]
fn encode_oversized_payload_is_data_error() {
    let text = "x".repeat(300);
    let out = omlink(&["encode", "tx", "9", &text]);
    assert_eq!(out.status.code(), Some(60));
}

#[test]
fn verbose_logging_keeps_stdout_clean() {
    let out = Command::new(env!("CARGO_BIN_EXE_omlink"))
        .env_remove("RUST_LOG")
        .args(["-vv", "--format", "raw", "decode", "--hex", GET_NODE_ID_RSP])
        .output()
        .expect("omlink should run");
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().count(), 1, "stdout: {stdout}");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("dispatched"), "stderr: {stderr}");
}

#[test]
fn version_prints_name_and_version() {
    let out = omlink(&["version"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        format!("omlink {}", env!("CARGO_PKG_VERSION"))
    );

    let extended = omlink(&["version", "--extended"]);
    let stdout = String::from_utf8_lossy(&extended.stdout);
    assert!(stdout.starts_with("omlink "));
    assert!(stdout.contains("link: 1000000 baud, payload <= 254 bytes"));
}
