//! Run settings, resolved per key: flags -> env -> `bf.toml` -> defaults.
//!
//! The config file lives in the XDG config home (`~/.config/bf.toml` on all
//! platforms) unless `BF_CONFIG` names a different path. Only its `[run]`
//! section is read:
//!
//! ```toml
//! [run]
//! eof = "max"     # zero | unchanged | max | 0-255
//! trace = false
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cross_xdg::BaseDirs;

use crate::io::{EofPolicy, InvalidEofPolicy};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid BF_EOF value: {0}")]
    EnvEof(#[source] InvalidEofPolicy),

    #[error("invalid BF_TRACE value '{0}', must be one of 1, 0, true, false, yes, no, on, off")]
    EnvTrace(String),

    #[error("{}: line {line}: {message}", path.display())]
    File { path: PathBuf, line: usize, message: String },
}

/// Effective settings for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub eof: EofPolicy,
    pub trace: bool,
}

/// Values given on the command line. `None` defers to lower layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub eof: Option<EofPolicy>,
    pub trace: Option<bool>,
}

/// Values found in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileSettings {
    pub eof: Option<EofPolicy>,
    pub trace: Option<bool>,
}

impl Settings {
    /// Resolve against the real process environment and config file.
    pub fn load(flags: Overrides) -> Result<Self, ConfigError> {
        let file = load_file()?;
        Self::resolve(flags, |key| env::var(key).ok(), file)
    }

    pub fn resolve<E>(flags: Overrides, env: E, file: FileSettings) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let env_eof = match env("BF_EOF") {
            Some(v) => Some(v.parse::<EofPolicy>().map_err(ConfigError::EnvEof)?),
            None => None,
        };
        let env_trace = match env("BF_TRACE") {
            Some(v) => Some(parse_bool(&v).ok_or(ConfigError::EnvTrace(v))?),
            None => None,
        };

        Ok(Self {
            eof: flags.eof.or(env_eof).or(file.eof).unwrap_or_default(),
            trace: flags.trace.or(env_trace).or(file.trace).unwrap_or(false),
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Where the config file is looked for.
pub fn config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("BF_CONFIG") {
        return Some(PathBuf::from(p));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");
    Some(path)
}

/// Read the config file. A missing or unreadable file means no settings.
pub fn load_file() -> Result<FileSettings, ConfigError> {
    let Some(path) = config_path() else {
        return Ok(FileSettings::default());
    };
    match fs::read_to_string(&path) {
        Ok(content) => parse_file(&path, &content),
        Err(_) => Ok(FileSettings::default()),
    }
}

/// Very small line-oriented parser: `[run]` section and `key = value` pairs.
/// Values may be quoted. Unknown sections and keys are ignored.
pub fn parse_file(path: &Path, content: &str) -> Result<FileSettings, ConfigError> {
    let mut settings = FileSettings::default();
    let mut in_run = false;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_run = line[1..line.len() - 1].trim() == "run";
            continue;
        }
        if !in_run {
            continue;
        }

        let fail = |message: String| ConfigError::File {
            path: path.to_path_buf(),
            line: index + 1,
            message,
        };

        let Some((key, value)) = line.split_once('=') else {
            return Err(fail(format!("expected `key = value`, found `{line}`")));
        };
        let key = key.trim();
        let value = unquote(strip_comment(value.trim()));

        match key {
            "eof" => {
                let policy = value.parse::<EofPolicy>().map_err(|e| fail(e.to_string()))?;
                settings.eof = Some(policy);
            }
            "trace" => {
                let flag = parse_bool(value).ok_or_else(|| fail(format!("invalid trace value '{value}'")))?;
                settings.trace = Some(flag);
            }
            _ => {}
        }
    }

    Ok(settings)
}

fn strip_comment(value: &str) -> &str {
    if value.starts_with('"') {
        // A '#' inside quotes is part of the value.
        if let Some(end) = value[1..].find('"') {
            return &value[..end + 2];
        }
        return value;
    }
    match value.find('#') {
        Some(i) => value[..i].trim_end(),
        None => value,
    }
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    fn parse(content: &str) -> Result<FileSettings, ConfigError> {
        parse_file(Path::new("bf.toml"), content)
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let s = Settings::resolve(Overrides::default(), env_of(&[]), FileSettings::default()).unwrap();
        assert_eq!(s, Settings { eof: EofPolicy::Zero, trace: false });
    }

    #[test]
    fn flags_beat_env_beat_file() {
        let file = FileSettings { eof: Some(EofPolicy::Value(7)), trace: Some(true) };

        let from_file = Settings::resolve(Overrides::default(), env_of(&[]), file).unwrap();
        assert_eq!(from_file, Settings { eof: EofPolicy::Value(7), trace: true });

        let from_env = Settings::resolve(
            Overrides::default(),
            env_of(&[("BF_EOF", "unchanged"), ("BF_TRACE", "0")]),
            file,
        )
        .unwrap();
        assert_eq!(from_env, Settings { eof: EofPolicy::Unchanged, trace: false });

        let flags = Overrides { eof: Some(EofPolicy::Value(255)), trace: Some(true) };
        let from_flags = Settings::resolve(flags, env_of(&[("BF_EOF", "zero"), ("BF_TRACE", "no")]), file).unwrap();
        assert_eq!(from_flags, Settings { eof: EofPolicy::Value(255), trace: true });

        let trace_off = Overrides { eof: None, trace: Some(false) };
        let silenced = Settings::resolve(trace_off, env_of(&[("BF_TRACE", "1")]), file).unwrap();
        assert!(!silenced.trace);
    }

    #[test]
    fn invalid_env_values_are_errors() {
        let bad_eof = Settings::resolve(Overrides::default(), env_of(&[("BF_EOF", "sometimes")]), FileSettings::default());
        assert!(matches!(bad_eof, Err(ConfigError::EnvEof(_))));
        let bad_trace = Settings::resolve(Overrides::default(), env_of(&[("BF_TRACE", "loud")]), FileSettings::default());
        assert!(matches!(bad_trace, Err(ConfigError::EnvTrace(v)) if v == "loud"));
    }

    #[test]
    fn reads_run_section_only() {
        let content = r#"
# top comment
[colors]
eof = "bogus"

[run]
eof = "max"   # like C
trace = true
extra = 1
"#;
        let s = parse(content).unwrap();
        assert_eq!(s, FileSettings { eof: Some(EofPolicy::Value(255)), trace: Some(true) });
    }

    #[test]
    fn unquoted_values_are_accepted() {
        let s = parse("[run]\neof = unchanged\n").unwrap();
        assert_eq!(s.eof, Some(EofPolicy::Unchanged));
        assert_eq!(s.trace, None);
    }

    #[test]
    fn bad_file_values_name_the_line() {
        let err = parse("[run]\n\ntrace = maybe\n").unwrap_err();
        assert!(matches!(err, ConfigError::File { line: 3, .. }));
        assert!(err.to_string().starts_with("bf.toml: line 3:"));

        let err = parse("[run]\neof\n").unwrap_err();
        assert!(matches!(err, ConfigError::File { line: 2, .. }));
    }

    #[test]
    fn empty_file_has_no_settings() {
        assert_eq!(parse("").unwrap(), FileSettings::default());
    }
}
