use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// YAML / TOML parse or deserialization error.
    ConfigParse(String),
    /// Config validation error (no urls, bad url, zero timeout, etc.).
    ConfigValidation(String),
    /// Config file has an extension we don't know how to parse.
    UnsupportedConfigFormat(String),
    /// IO error (config file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnsupportedConfigFormat(ext) => {
                write!(f, "unsupported config format '{ext}' (expected .yaml, .yml or .toml)")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
