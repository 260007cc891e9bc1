use crate::cluster::{ClusterId, ClusterStore};
use crate::protected::ProtectedPatterns;
use crate::template::is_wildcard;
use crate::tree::PrefixTree;

/// Outcome of comparing a cluster template with an incoming sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    /// A wildcard position would swallow a protected token
    Disqualified,
    Scored {
        /// Exactly matching positions over sequence length
        similarity: f64,
        /// Wildcard positions in the template
        params: usize,
    },
}

/// Score `template` against `seq`.
///
/// # Panics
///
/// Panics if the sequences differ in length.
pub fn seq_dist(template: &[String], seq: &[String], protected: &ProtectedPatterns) -> Distance {
    assert_eq!(
        template.len(),
        seq.len(),
        "The sequences must have the same length."
    );

    let mut sim_tokens = 0usize;
    let mut params = 0usize;

    for (token1, token2) in template.iter().zip(seq) {
        if is_wildcard(token1) {
            if protected.is_protected(token2) {
                return Distance::Disqualified;
            }
            params += 1;
            continue;
        }
        if token1 == token2 {
            sim_tokens += 1;
        }
    }

    // two empty sequences are identical
    let similarity = if seq.is_empty() {
        1.0
    } else {
        sim_tokens as f64 / seq.len() as f64
    };

    Distance::Scored { similarity, params }
}

/// Pick the most similar cluster among `candidates`, preferring the one with
/// more wildcards on ties, and accept it only at or above `threshold`.
pub fn fast_match(
    candidates: &[ClusterId],
    store: &ClusterStore,
    seq: &[String],
    threshold: f64,
    protected: &ProtectedPatterns,
) -> Option<ClusterId> {
    let mut best: Option<(ClusterId, f64, usize)> = None;

    for &id in candidates {
        let (similarity, params) = match seq_dist(store.get(id).template(), seq, protected) {
            Distance::Scored { similarity, params } => (similarity, params),
            Distance::Disqualified => continue,
        };
        let better = match best {
            None => true,
            Some((_, max_sim, max_params)) => {
                similarity > max_sim || (similarity == max_sim && params > max_params)
            }
        };
        if better {
            best = Some((id, similarity, params));
        }
    }

    best.filter(|&(_, similarity, _)| similarity >= threshold)
        .map(|(id, _, _)| id)
}

/// Locate the leaf bucket for `seq` and return its best matching cluster.
pub fn tree_search(
    tree: &PrefixTree,
    store: &ClusterStore,
    seq: &[String],
    threshold: f64,
    protected: &ProtectedPatterns,
) -> Option<ClusterId> {
    let candidates = tree.leaf_for(seq)?;
    fast_match(candidates, store, seq, threshold, protected)
}
