mod common;

use assert_cmd::Command;
use common::{config_text, not_found, ok, FakeS3};
use std::path::Path;

fn s3share(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("s3share").unwrap();
    cmd.env("S3SHARE_CONFIG", config)
        .env_remove("AWS_ACCESS_KEY_ID")
        .env_remove("AWS_SECRET_ACCESS_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_config_exits_1_with_template() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join(".s3share");

    let out = s3share(&config).arg("whatever.txt").output().unwrap();

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Config file does not exist"));
    assert!(stderr.contains("[S3]"));
    assert!(out.stdout.is_empty());
}

#[test]
fn config_without_s3_section_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join(".s3share");
    std::fs::write(&config, "[other]\nkey = value\n").unwrap();

    let out = s3share(&config).arg("whatever.txt").output().unwrap();

    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("bucket_name"));
}

#[test]
fn missing_local_file_exits_3_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join(".s3share");
    // An unroutable endpoint: reaching the network would fail with code 4.
    std::fs::write(&config, "[S3]\nbucket_name = test-bucket\nhost = 127.0.0.1:1\nis_secure = false\n").unwrap();
    let missing = dir.path().join("nope.pdf");

    let out = s3share(&config).arg(&missing).output().unwrap();

    assert_eq!(out.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("File does not exist"));
    assert!(stderr.contains("nope.pdf"));
}

#[test]
fn unreachable_service_exits_4() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join(".s3share");
    std::fs::write(&config, "[S3]\nbucket_name = test-bucket\nhost = 127.0.0.1:1\nis_secure = false\n").unwrap();
    let file = dir.path().join("report.pdf");
    std::fs::write(&file, b"data").unwrap();

    let out = s3share(&config).arg(&file).arg("--no-progress").output().unwrap();

    assert_eq!(out.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Error while connecting to S3."));
    assert!(out.stdout.is_empty());
}

#[test]
fn successful_share_prints_only_the_page_url() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("report.pdf");
    std::fs::write(&file, vec![b'p'; 1_048_576]).unwrap();

    let server = FakeS3::start(vec![ok(), not_found(), ok(), ok()]);
    let config = dir.path().join(".s3share");
    std::fs::write(&config, config_text(&server.addr, "test-bucket")).unwrap();

    let out = s3share(&config).arg(&file).output().unwrap();
    let addr = server.addr.clone();
    let heads = server.finish();

    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1, "{stdout:?}");
    assert!(stdout.ends_with('\n'));
    let prefix = format!("http://{}/test-bucket/", addr);
    let key = stdout.trim_end().strip_prefix(&prefix).expect("page url");
    assert_eq!(key.len(), 8);
    assert!(key.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));

    assert_eq!(heads.len(), 4);
    assert!(heads[0].starts_with("HEAD /test-bucket"));
    assert!(heads[1].starts_with("HEAD /test-bucket/report.pdf "));
    assert!(heads[2].starts_with("PUT /test-bucket/report.pdf "));
    assert!(heads[2].to_lowercase().contains("content-type: application/pdf"));
    assert!(heads[3].starts_with(&format!("PUT /test-bucket/{key} ")));
    assert!(heads[3].to_lowercase().contains("content-type: text/html"));
}

#[test]
fn existing_object_exits_5_without_uploading() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("report.pdf");
    std::fs::write(&file, b"data").unwrap();

    let server = FakeS3::start(vec![ok(), ok()]);
    let config = dir.path().join(".s3share");
    std::fs::write(&config, config_text(&server.addr, "test-bucket")).unwrap();

    let out = s3share(&config).arg(&file).arg("--no-progress").output().unwrap();
    let heads = server.finish();

    assert_eq!(out.status.code(), Some(5));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("--overwrite"));
    assert_eq!(heads.len(), 2);
    assert!(heads.iter().all(|h| h.starts_with("HEAD ")), "{heads:?}");
}
