use fancy_regex::Regex as FancyRegex;

use crate::error::Result;

/// Patterns marking identity-bearing tokens such as distinguished error codes.
///
/// A protected token is never absorbed by an existing wildcard position and
/// never silently replaced by one: lines that differ in a protected token end
/// up in separate clusters.
#[derive(Debug, Clone, Default)]
pub struct ProtectedPatterns {
    patterns: Vec<FancyRegex>,
}

impl ProtectedPatterns {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| FancyRegex::new(pattern.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_protected(&self, token: &str) -> bool {
        self.patterns.iter().any(|re| match re.is_match(token) {
            Ok(matched) => matched,
            Err(e) => {
                log::warn!("protected pattern {} failed on {:?}: {}", re.as_str(), token, e);
                false
            }
        })
    }
}
