use crate::protected::ProtectedPatterns;

/// Token standing for "any value at this position"
pub const WILDCARD: &str = "<*>";

pub fn is_wildcard(token: &str) -> bool {
    token == WILDCARD
}

/// Tokens carrying a digit are treated as variable when growing the tree
pub fn has_numbers(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
}

/// Whether merging `seq` into a cluster with `template` would erase a
/// protected token.
///
/// Only positions present in both sequences are compared.
pub fn must_split(
    template: &[String],
    seq: &[String],
    protected: &ProtectedPatterns,
) -> bool {
    if protected.is_empty() {
        return false;
    }
    template.iter().zip(seq).any(|(existing, incoming)| {
        existing != incoming
            && (protected.is_protected(existing) || protected.is_protected(incoming))
    })
}

/// Generalize `template` against `seq`: agreeing positions are kept,
/// differing ones become [`WILDCARD`] unless a protected token is involved,
/// in which case the template's own token stays.
///
/// # Panics
///
/// Panics if the sequences differ in length. Clusters are bucketed by
/// length, so this only happens on a broken call path.
pub fn get_template(
    seq: &[String],
    template: &[String],
    protected: &ProtectedPatterns,
) -> Vec<String> {
    assert_eq!(
        seq.len(),
        template.len(),
        "Sequences must be of the same length"
    );

    seq.iter()
        .zip(template)
        .map(|(word, existing)| {
            if word == existing {
                word.clone()
            } else if protected.is_protected(word) || protected.is_protected(existing) {
                existing.clone()
            } else {
                WILDCARD.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_has_numbers() {
        assert!(has_numbers("blk_123"));
        assert!(has_numbers("10.0.0.1"));
        assert!(!has_numbers("Receiving"));
        assert!(!has_numbers(WILDCARD));
        assert!(!has_numbers(""));
    }

    #[test]
    fn test_get_template_generalizes_differences() {
        let protected = ProtectedPatterns::default();
        let template = get_template(
            &tokens("user 2 login ok"),
            &tokens("user 1 login ok"),
            &protected,
        );
        assert_eq!(template, tokens("user <*> login ok"));
    }

    #[test]
    fn test_get_template_keeps_existing_wildcards() {
        let protected = ProtectedPatterns::default();
        let template = get_template(
            &tokens("user 3 login"),
            &tokens("user <*> login"),
            &protected,
        );
        assert_eq!(template, tokens("user <*> login"));
    }

    #[test]
    fn test_get_template_keeps_protected_existing_token() {
        let protected = ProtectedPatterns::new(&[r"^ERR\d+$"]).unwrap();
        let template = get_template(
            &tokens("start ERR2 done"),
            &tokens("start ERR1 done"),
            &protected,
        );
        assert_eq!(template, tokens("start ERR1 done"));

        let template = get_template(
            &tokens("start ERR2 done"),
            &tokens("start later done"),
            &protected,
        );
        assert_eq!(template, tokens("start later done"));
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_get_template_length_mismatch_panics() {
        let protected = ProtectedPatterns::default();
        get_template(&tokens("a b"), &tokens("a b c"), &protected);
    }

    #[test]
    fn test_must_split() {
        let protected = ProtectedPatterns::new(&[r"^ERR\d+$"]).unwrap();
        assert!(must_split(&tokens("start ERR1 done"), &tokens("start ERR2 done"), &protected));
        assert!(must_split(&tokens("start <*> done"), &tokens("start ERR2 done"), &protected));
        assert!(!must_split(&tokens("start ERR1 done"), &tokens("start ERR1 later"), &protected));
        assert!(!must_split(&tokens("start ERR1 done"), &tokens("start ERR1 done"), &protected));
    }

    #[test]
    fn test_must_split_compares_common_prefix_only() {
        let protected = ProtectedPatterns::new(&[r"^ERR\d+$"]).unwrap();
        assert!(!must_split(&tokens("start ERR1"), &tokens("start ERR1 ERR9"), &protected));
    }

    #[test]
    fn test_must_split_without_patterns() {
        assert!(!must_split(&tokens("a b"), &tokens("c d"), &ProtectedPatterns::default()));
    }
}
