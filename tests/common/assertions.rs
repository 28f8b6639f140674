//! Custom test assertions

use actix_web::http::StatusCode;
use serde_json::Value;

/// Assert an error envelope: `{"error": {"message", "type", "code"}}`
pub fn assert_error(status: StatusCode, body: &Value, expected_status: u16, error_type: &str, code: &str) {
    assert_eq!(status.as_u16(), expected_status, "unexpected status, body: {}", body);
    assert_eq!(body["error"]["type"], error_type, "body: {}", body);
    assert_eq!(body["error"]["code"], code, "body: {}", body);
    assert!(
        body["error"]["message"].as_str().is_some_and(|m| !m.is_empty()),
        "Expected a non-empty error message, body: {}",
        body
    );
}

/// Count regular files directly inside a directory
pub fn file_count(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .count()
        })
        .unwrap_or(0)
}

/// Poll until a directory holds no files, giving up after `timeout_ms`
pub async fn wait_until_empty(dir: &std::path::Path, timeout_ms: u64) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
    loop {
        if file_count(dir) == 0 {
            return true;
        }
        if std::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
}
