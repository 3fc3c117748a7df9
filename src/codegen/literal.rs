//! Rendering of values as literals of the generated program.

use regex::Regex;
use std::sync::LazyLock;

static ENV_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid pattern"));

/// A single-line string literal.
pub fn py_str(value: &str) -> String {
    // JSON string escapes are a subset of the target's escapes.
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// A string literal that keeps line breaks readable: triple-quoted when the
/// text spans several lines, a plain literal otherwise.
pub fn py_text(value: &str) -> String {
    if value.contains('\n') {
        format!("\"\"\"{}\"\"\"", escape_triple(value))
    } else {
        py_str(value)
    }
}

/// A docstring line; always triple-quoted.
pub fn py_docstring(value: &str) -> String {
    format!("\"\"\"{}\"\"\"", escape_triple(value.trim()))
}

fn escape_triple(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn py_float(value: f64) -> String {
    if value.is_finite() {
        format!("{:?}", value)
    } else {
        "None".to_string()
    }
}

pub fn py_list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

pub fn py_dict(entries: &[(String, String)]) -> String {
    let body: Vec<String> = entries
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect();
    format!("{{{}}}", body.join(", "))
}

/// Whether a configured value refers to the execution environment.
pub fn has_env_reference(value: &str) -> bool {
    ENV_REFERENCE.is_match(value)
}

/// A value that may contain `${NAME}` references, rendered so that each
/// reference is read from the environment when the program runs.
pub fn py_env_value(value: &str) -> String {
    let mut parts = Vec::new();
    let mut last = 0;
    for caps in ENV_REFERENCE.captures_iter(value) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            parts.push(py_str(&value[last..whole.start()]));
        }
        parts.push(py_env_lookup(name.as_str(), Some("")));
        last = whole.end();
    }
    if parts.is_empty() {
        return py_str(value);
    }
    if last < value.len() {
        parts.push(py_str(&value[last..]));
    }
    parts.join(" + ")
}

/// `os.environ.get("NAME")`, with an optional default.
pub fn py_env_lookup(name: &str, default: Option<&str>) -> String {
    match default {
        Some(default) => format!("os.environ.get({}, {})", py_str(name), py_str(default)),
        None => format!("os.environ.get({})", py_str(name)),
    }
}
