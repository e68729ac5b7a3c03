use crate::errors::{BuildError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Literal find/replace applied to a bundle body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub from: String,
    pub to: String,
}

impl RewriteRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Result<Self> {
        let rule = Self {
            from: from.into(),
            to: to.into(),
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn validate(&self) -> Result<()> {
        if self.from.is_empty() {
            return Err(BuildError::InvalidSpec(
                "rewrite token to replace must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Replace every non-overlapping occurrence of `from`, scanning left to
    /// right, returning the rewritten bytes and the number of replacements.
    /// Bytes outside the matches are copied unchanged, so non-UTF-8 input
    /// passes through intact.
    pub fn apply(&self, text: &[u8]) -> (Vec<u8>, usize) {
        let from = self.from.as_bytes();
        let to = self.to.as_bytes();

        let mut out = Vec::with_capacity(text.len());
        let mut count = 0;
        let mut rest = text;
        while !rest.is_empty() {
            if rest.starts_with(from) {
                out.extend_from_slice(to);
                rest = &rest[from.len()..];
                count += 1;
            } else {
                out.push(rest[0]);
                rest = &rest[1..];
            }
        }
        (out, count)
    }
}

impl FromStr for RewriteRule {
    type Err = BuildError;

    /// Parses `FROM=TO`
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((from, to)) => RewriteRule::new(from, to),
            None => Err(BuildError::InvalidSpec(format!(
                "rewrite rule '{}' must have the form FROM=TO",
                s
            ))),
        }
    }
}

impl fmt::Display for RewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
