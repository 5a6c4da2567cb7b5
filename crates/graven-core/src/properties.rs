use std::collections::BTreeMap;
use std::path::Path;

/// Name of the per-project secrets file.
pub const ENV_FILE: &str = ".graven.env";

/// Loads a `.graven.env` file (shell-style `KEY=value` format).
///
/// `.graven.env` holds publishing secrets (repository URLs, usernames,
/// passwords) that should stay out of `graven.toml`. Values are available via
/// `${env:VAR}` interpolation and as fallback publishing properties.
pub fn load_env_file(path: &Path) -> miette::Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    if !path.is_file() {
        return Ok(map);
    }
    let content = std::fs::read_to_string(path).map_err(graven_util::errors::GravenError::Io)?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        if let Some((key, value)) = trimmed.split_once('=') {
            map.insert(key.trim().to_string(), unquote(value.trim()).to_string());
        }
    }
    Ok(map)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Look up a property: `.graven.env` entries first, then the process environment.
pub fn lookup(key: &str, env_overrides: &BTreeMap<String, String>) -> Option<String> {
    env_overrides
        .get(key)
        .cloned()
        .or_else(|| std::env::var(key).ok())
        .filter(|v| !v.is_empty())
}

/// Interpolate `${env:VAR}` references in a string.
///
/// Unknown variables expand to the empty string.
pub fn interpolate(input: &str, env_overrides: &BTreeMap<String, String>) -> String {
    let mut result = input.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${env:") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let end = start + end;
        let key = &result[start + 6..end];
        let value = lookup(key, env_overrides).unwrap_or_default();
        result.replace_range(start..=end, &value);
        from = start + value.len();
    }
    result
}
