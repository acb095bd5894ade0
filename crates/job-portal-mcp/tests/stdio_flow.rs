use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

use serde_json::{json, Value};

#[test]
fn line_delimited_create_and_read_flow_works() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_job-portal-mcp"))
        .env("JOB_PORTAL_SEED", "empty")
        .env("JOB_PORTAL_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn job-portal-mcp");

    let mut child_stdin = child.stdin.take().expect("stdin");
    let child_stdout = child.stdout.take().expect("stdout");
    let mut reader = BufReader::new(child_stdout);

    let create = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {
            "name": "create_profile",
            "arguments": {
                "name": "Jahnavi Jha",
                "email": "jahnavi@example.com",
                "phone": "9876543210",
                "skills": ["Python", "Django"],
                "experience": [
                    {"company": "StartupHub", "role": "Junior Developer", "duration": "1 year"}
                ],
                "location": "Bangalore"
            }
        }
    });
    writeln!(child_stdin, "{create}").expect("write create");
    // Notifications produce no output line.
    writeln!(
        child_stdin,
        "{}",
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"})
    )
    .expect("write notification");
    writeln!(child_stdin, "not json").expect("write garbage");
    let read = json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "resources/read",
        "params": {"uri": "profiles://filter?role=junior"}
    });
    writeln!(child_stdin, "{read}").expect("write read");
    drop(child_stdin);

    let mut line = String::new();
    reader.read_line(&mut line).expect("read create response");
    let created: Value = serde_json::from_str(&line).expect("parse create response");
    assert_eq!(created["id"], 1);
    assert_eq!(created["result"]["structuredContent"]["data"]["id"], 1);

    line.clear();
    reader.read_line(&mut line).expect("read parse error");
    let garbage: Value = serde_json::from_str(&line).expect("parse error response");
    assert_eq!(garbage["error"]["code"], -32700);
    assert_eq!(garbage["id"], Value::Null);

    line.clear();
    reader.read_line(&mut line).expect("read resource response");
    let read: Value = serde_json::from_str(&line).expect("parse resource response");
    assert_eq!(read["id"], 2);
    let text = read["result"]["contents"][0]["text"].as_str().expect("text");
    let profiles: Value = serde_json::from_str(text).expect("profiles json");
    assert_eq!(profiles[0]["name"], "Jahnavi Jha");

    let status = child.wait().expect("wait child");
    assert!(status.success());
}

fn write_framed(stdin: &mut std::process::ChildStdin, payload: &Value) {
    let body = serde_json::to_vec(payload).expect("serialize payload");
    let frame = format!("Content-Length: {}\r\n\r\n", body.len());
    stdin
        .write_all(frame.as_bytes())
        .expect("write frame header");
    stdin.write_all(&body).expect("write frame body");
    stdin.flush().expect("flush frame");
}

fn read_framed(reader: &mut BufReader<std::process::ChildStdout>) -> Value {
    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read frame header");
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse::<usize>().ok();
            }
        }
    }

    let len = content_length.expect("content-length header");
    let mut body = vec![0_u8; len];
    std::io::Read::read_exact(reader, &mut body).expect("read frame body");
    serde_json::from_slice(&body).expect("parse framed response")
}

#[test]
fn stdio_content_length_initialize_tools_and_completion_work() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_job-portald"))
        .env("JOB_PORTAL_TRANSPORT", "stdio")
        .env("JOB_PORTAL_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn job-portald");

    let mut child_stdin = child.stdin.take().expect("stdin");
    let child_stdout = child.stdout.take().expect("stdout");
    let mut reader = BufReader::new(child_stdout);

    write_framed(
        &mut child_stdin,
        &json!({
            "jsonrpc":"2.0",
            "id":1,
            "method":"initialize",
            "params":{
                "protocolVersion":"2024-11-05",
                "capabilities":{},
                "clientInfo":{"name":"stdio-test","version":"1.0.0"}
            }
        }),
    );
    let init = read_framed(&mut reader);
    assert_eq!(
        init["result"]["protocolVersion"].as_str(),
        Some("2024-11-05")
    );
    assert_eq!(
        init["result"]["serverInfo"]["name"].as_str(),
        Some("job-portal-mcp")
    );

    write_framed(
        &mut child_stdin,
        &json!({
            "jsonrpc":"2.0",
            "id":2,
            "method":"tools/list",
            "params":{}
        }),
    );
    let tools = read_framed(&mut reader);
    let names = tools["result"]["tools"]
        .as_array()
        .expect("tools array")
        .iter()
        .filter_map(|tool| tool.get("name").and_then(Value::as_str))
        .collect::<Vec<_>>();
    assert!(names.contains(&"create_profile"));
    assert!(names.contains(&"match_profiles_for_job"));

    write_framed(
        &mut child_stdin,
        &json!({
            "jsonrpc":"2.0",
            "id":3,
            "method":"completion/complete",
            "params":{
                "ref":{"type":"ref/resource","uri":"job://{id}"},
                "argument":{"name":"id","value":"3"}
            }
        }),
    );
    let completion = read_framed(&mut reader);
    assert_eq!(completion["result"]["completion"]["values"], json!(["3"]));

    drop(child_stdin);
    let status = child.wait().expect("wait child");
    assert!(status.success());
}

#[test]
fn oversized_frame_gets_parse_error_and_server_keeps_running() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_job-portal-mcp"))
        .env("JOB_PORTAL_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn job-portal-mcp");

    let mut child_stdin = child.stdin.take().expect("stdin");
    let child_stdout = child.stdout.take().expect("stdout");
    let mut reader = BufReader::new(child_stdout);

    child_stdin
        .write_all(b"Content-Length: 1000000000000000\r\n\r\n")
        .expect("write oversized header");
    child_stdin.flush().expect("flush header");
    let rejected = read_framed(&mut reader);
    assert_eq!(rejected["error"]["code"], -32700);
    assert_eq!(rejected["id"], Value::Null);
    assert!(rejected["error"]["message"]
        .as_str()
        .is_some_and(|message| message.contains("exceeds")));

    write_framed(
        &mut child_stdin,
        &json!({"jsonrpc":"2.0","id":9,"method":"ping","params":{}}),
    );
    let ping = read_framed(&mut reader);
    assert_eq!(ping["id"], 9);
    assert_eq!(ping["result"], json!({}));

    drop(child_stdin);
    let status = child.wait().expect("wait child");
    assert!(status.success());
}

#[test]
fn bad_configuration_exits_non_zero() {
    let output = Command::new(env!("CARGO_BIN_EXE_job-portald"))
        .env("JOB_PORTAL_TRANSPORT", "carrier-pigeon")
        .env("JOB_PORTAL_LOG", "off")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("run job-portald");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
