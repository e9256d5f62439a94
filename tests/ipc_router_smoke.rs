use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_studentd");
    let mut child = Command::new(exe)
        .env_remove("STUDENTD_DATA_FILE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn studentd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> Option<&str> {
    assert_eq!(value.get("ok").and_then(|v| v.as_bool()), Some(false));
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str())
}

fn codes(result: &serde_json::Value) -> Vec<String> {
    result["students"]
        .as_array()
        .expect("students array")
        .iter()
        .map(|s| s["code"].as_str().expect("code").to_string())
        .collect()
}

#[test]
fn health_and_unknown_method() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health.get("version").is_some());
    assert!(health["dataFile"].is_null());

    let unknown = request(&mut stdin, &mut reader, "2", "grades.explode", json!({}));
    assert_eq!(error_code(&unknown), Some("not_implemented"));

    let early = request(&mut stdin, &mut reader, "3", "students.list", json!({}));
    assert_eq!(error_code(&early), Some("no_store"));
}

#[test]
fn student_crud_flow_over_ipc() {
    let dir = temp_dir("studentd-ipc-crud");
    let path = dir.join("studentMarks.txt");
    std::fs::write(
        &path,
        "3\n1001,Ann Lee,15,12,18,67\nbroken line\n1002,Raj Patel,20,20,20,100\n1003,Mia Wong,5,6,7,20\n",
    )
    .expect("write marks");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "store.open",
        json!({ "path": path.to_string_lossy() }),
    );
    assert_eq!(opened["count"], 3);
    assert_eq!(opened["skipped"][0]["lineNo"], 3);

    let listed = request_ok(&mut stdin, &mut reader, "2", "students.list", json!({}));
    assert_eq!(codes(&listed), vec!["1001", "1002", "1003"]);
    assert_eq!(listed["students"][0]["percentage"], 70.0);
    assert_eq!(listed["students"][0]["grade"], "A");
    assert_eq!(listed["students"][0]["courseworkTotal"], 45);

    let added = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.add",
        json!({ "code": 2001, "name": "Zoe Quinn", "c1": "10", "c2": 10, "c3": 10, "exam": 48 }),
    );
    assert_eq!(added["count"], 4);
    assert_eq!(added["student"]["code"], "2001");
    assert_eq!(added["student"]["percentage"], 48.75);

    let bad = request(
        &mut stdin,
        &mut reader,
        "4",
        "students.add",
        json!({ "code": "2002", "name": "Bad Input", "c1": "ten", "c2": 1, "c3": 1, "exam": 1 }),
    );
    assert_eq!(error_code(&bad), Some("bad_input"));
    assert_eq!(bad["error"]["details"]["field"], "c1");

    let dup = request(
        &mut stdin,
        &mut reader,
        "5",
        "students.add",
        json!({ "code": "1001", "name": "Again", "c1": 1, "c2": 1, "c3": 1, "exam": 1 }),
    );
    assert_eq!(error_code(&dup), Some("duplicate_code"));

    let found = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.search",
        json!({ "query": "wong" }),
    );
    assert_eq!(codes(&found), vec!["1003"]);

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "students.update",
        json!({ "code": "1003", "exam": 90 }),
    );
    assert_eq!(updated["student"]["percentage"], 67.5);
    assert_eq!(updated["student"]["grade"], "B");

    let highest = request_ok(&mut stdin, &mut reader, "8", "students.highest", json!({}));
    assert_eq!(highest["student"]["code"], "1002");
    let lowest = request_ok(&mut stdin, &mut reader, "9", "students.lowest", json!({}));
    assert_eq!(lowest["student"]["code"], "2001");

    let sorted = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "students.sort",
        json!({ "direction": "desc" }),
    );
    assert_eq!(codes(&sorted), vec!["1002", "1001", "1003", "2001"]);

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "students.delete",
        json!({ "code": "2001" }),
    );
    assert_eq!(deleted["count"], 3);
    let missing = request(
        &mut stdin,
        &mut reader,
        "12",
        "students.delete",
        json!({ "code": "2001" }),
    );
    assert_eq!(error_code(&missing), Some("not_found"));

    let summary = request_ok(&mut stdin, &mut reader, "13", "reports.summary", json!({}));
    assert_eq!(summary["count"], 3);
    assert_eq!(summary["grades"]["a"], 2);

    let text = request_ok(&mut stdin, &mut reader, "14", "reports.text", json!({}));
    assert!(text["text"]
        .as_str()
        .expect("text")
        .contains("Total Students: 3"));

    let on_disk = std::fs::read_to_string(&path).expect("read marks");
    assert_eq!(
        on_disk,
        "3\n1002,Raj Patel,20,20,20,100\n1001,Ann Lee,15,12,18,67\n1003,Mia Wong,5,6,7,90\n"
    );

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn backup_export_and_import_over_ipc() {
    let dir = temp_dir("studentd-ipc-backup");
    let path = dir.join("studentMarks.txt");
    let original = "1\n1001,Ann Lee,15,12,18,67\n";
    std::fs::write(&path, original).expect("write marks");
    let bundle = dir.join("out").join("marks.zip");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "store.open",
        json!({ "path": path.to_string_lossy() }),
    );
    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "backup.export",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    assert_eq!(exported["bundleFormat"], "studentd-marks-v1");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.delete",
        json!({ "code": "1001" }),
    );
    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "backup.import",
        json!({ "inPath": bundle.to_string_lossy() }),
    );
    assert_eq!(imported["count"], 1);
    assert_eq!(imported["bundleFormatDetected"], "studentd-marks-v1");
    assert_eq!(std::fs::read_to_string(&path).expect("read"), original);

    let _ = std::fs::remove_dir_all(dir);
}
