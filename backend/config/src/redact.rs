//! Config redaction: produce safe-to-share config snapshots by masking
//! tokens, cookie headers and credentials.

use serde_json::Value;

/// Keys whose string values are always masked.
static SENSITIVE_KEYS: &[&str] = &[
    "cookieHeader",
    "cookie_header",
    "cookie",
    "accessToken",
    "access_token",
    "token",
    "password",
    "secret",
    "authorization",
];

/// Redact a config JSON value, replacing all sensitive fields with a short
/// hint followed by `***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if !is_sensitive_key(key) || s.is_empty() {
        return Value::String(s.to_string());
    }
    let hint: String = s.chars().take(4).collect();
    if s.chars().count() > 4 {
        Value::String(format!("{hint}***"))
    } else {
        Value::String("***".to_string())
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}

/// Collect all field paths that were redacted (for diagnostics).
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths_recursive(value, "", &mut paths);
    paths
}

fn collect_paths_recursive(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.is_empty() => {
            let key = path.rsplit('.').next().unwrap_or("");
            if is_sensitive_key(key) {
                out.push(path.to_string());
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                collect_paths_recursive(v, &child_path, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_cookie_header() {
        let v = json!({ "storage": { "cookieHeader": "access_token=eyJhbGciOi" } });
        let redacted = redact(&v);
        let header = redacted["storage"]["cookieHeader"].as_str().unwrap();
        assert_eq!(header, "acce***");
    }

    #[test]
    fn short_secret_fully_masked() {
        let v = json!({ "token": "abc" });
        assert_eq!(redact(&v)["token"], "***");
    }

    #[test]
    fn passthrough_non_sensitive() {
        let v = json!({ "backend": { "url": "http://localhost:8005" } });
        assert_eq!(redact(&v)["backend"]["url"], "http://localhost:8005");
    }

    #[test]
    fn collects_paths() {
        let v = json!({ "storage": { "cookieHeader": "x=1", "dir": "/tmp" } });
        assert_eq!(collect_redacted_paths(&v), vec!["storage.cookieHeader"]);
    }
}
