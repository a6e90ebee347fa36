use std::fmt;
use std::str::FromStr;

use crate::error::{MergeError, MergeResult};

/// A parsed dotted path into a configuration tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigPath {
    segments: Vec<String>,
}

impl ConfigPath {
    /// Parse `a.b.c`. Empty input, empty segments and surrounding whitespace
    /// in a segment are rejected.
    pub fn parse(input: &str) -> MergeResult<Self> {
        let segments: Vec<String> = input.split('.').map(str::to_string).collect();
        let valid = !input.is_empty()
            && segments
                .iter()
                .all(|s| !s.is_empty() && s.trim() == s.as_str());
        if !valid {
            return Err(MergeError::InvalidPath(input.to_string()));
        }
        Ok(Self { segments })
    }

    /// Path components, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for ConfigPath {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
