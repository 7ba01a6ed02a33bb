use crate::{Error, Result};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\$(?:(\$)|([_A-Za-z][_A-Za-z0-9]*)|\{([_A-Za-z][_A-Za-z0-9]*)\})").unwrap();
}

/// Text with `$name` / `${name}` placeholders; `$$` is a literal `$`
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Loading report template: {}", path.display());

        let source = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                Error::Template(format!("template not found: {}", path.display()))
            }
            _ => Error::Io(e),
        })?;

        if !PLACEHOLDER.is_match(&source) {
            tracing::warn!("Template {} has no placeholders", path.display());
        }

        Ok(Self::new(source))
    }

    /// Replace the placeholders named in `vars`.
    ///
    /// Unknown names and stray `$` characters are left exactly as written.
    pub fn safe_substitute(&self, vars: &HashMap<&str, String>) -> String {
        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures| {
                if caps.get(1).is_some() {
                    return "$".to_string();
                }
                let name = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                match vars.get(name) {
                    Some(value) => value.clone(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
