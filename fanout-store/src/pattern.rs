//! Redis-style glob patterns for in-process key matching.
use regex::Regex;

use crate::StoreError;

/// Compiled form of a key pattern such as `social-read:*`.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    regex: Regex,
}

impl KeyPattern {
    pub fn new(pattern: &str) -> Result<Self, StoreError> {
        if pattern.is_empty() {
            return Err(StoreError::Pattern("empty pattern".to_string()));
        }

        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            match c {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                '\\' => match chars.next() {
                    Some(escaped) => {
                        expr.push_str(&regex::escape(&escaped.to_string()))
                    }
                    None => expr.push_str(r"\\"),
                },
                other => expr.push_str(&regex::escape(&other.to_string())),
            }
        }
        expr.push('$');

        let regex =
            Regex::new(&expr).map_err(|e| StoreError::Pattern(e.to_string()))?;
        Ok(Self { regex })
    }

    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}
