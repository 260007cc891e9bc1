use fancy_regex::Regex as FancyRegex;

use crate::error::Result;
use crate::template::WILDCARD;

/// Masks known variable fields (block ids, IPs, numbers...) before
/// tokenizing, so they cluster as wildcards from the first line on.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    patterns: Vec<FancyRegex>,
}

impl Preprocessor {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| FancyRegex::new(pattern.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Replace every match of every pattern, in order, with `<*>`
    pub fn apply(&self, line: &str) -> Result<String> {
        let mut result = line.to_string();
        for current_rex in &self.patterns {
            result = current_rex.try_replacen(&result, 0, WILDCARD)?.into_owned();
        }
        Ok(result)
    }

    pub fn tokenize(&self, line: &str) -> Result<Vec<String>> {
        Ok(self
            .apply(line)?
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hdfs_patterns() -> Vec<&'static str> {
        vec![
            r"blk_(|-)[0-9]+",
            r"(/|)([0-9]+\.){3}[0-9]+(:[0-9]+|)(:|)",
            r"(?<=[^A-Za-z0-9])(\-?\+?\d+)(?=[^A-Za-z0-9])|[0-9]+$",
        ]
    }

    #[test]
    fn test_no_patterns_only_splits() {
        let preprocessor = Preprocessor::default();
        assert_eq!(
            preprocessor.tokenize("  a  b\tc ").unwrap(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_hdfs_masks() {
        let preprocessor = Preprocessor::new(&hdfs_patterns()).unwrap();
        let tokens = preprocessor
            .tokenize(concat!(
                "Receiving block blk_-1608999687919862906 ",
                "src: /10.250.19.102:54106 dest: /10.250.19.102:50010",
            ))
            .unwrap();
        assert_eq!(
            tokens,
            vec!["Receiving", "block", "<*>", "src:", "<*>", "dest:", "<*>"]
        );
    }

    #[test]
    fn test_lookaround_number_mask() {
        let preprocessor = Preprocessor::new(&hdfs_patterns()).unwrap();
        assert_eq!(
            preprocessor.apply("PacketResponder 1 for block terminating").unwrap(),
            "PacketResponder <*> for block terminating"
        );
        assert_eq!(preprocessor.apply("served 42").unwrap(), "served <*>");
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(Preprocessor::new(&["[unclosed"]).is_err());
    }
}
