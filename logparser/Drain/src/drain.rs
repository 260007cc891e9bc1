use std::collections::HashMap;

use crate::cluster::{ClusterId, ClusterStore, LogCluster};
use crate::config::DrainConfig;
use crate::error::Result;
use crate::matcher::tree_search;
use crate::protected::ProtectedPatterns;
use crate::template::{get_template, must_split};
use crate::tree::PrefixTree;

/// What happened to a line fed into [`Drain::add_log_message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// No cluster matched; a new one was created
    Created(ClusterId),
    /// A cluster matched but a differing protected token forced a new one
    Split { matched: ClusterId, created: ClusterId },
    /// The line joined an existing cluster
    Merged {
        cluster: ClusterId,
        template_changed: bool,
    },
}

impl AddOutcome {
    pub fn cluster(&self) -> ClusterId {
        match *self {
            AddOutcome::Created(id) => id,
            AddOutcome::Split { created, .. } => created,
            AddOutcome::Merged { cluster, .. } => cluster,
        }
    }
}

/// Online log template miner.
///
/// Feed token sequences one at a time with [`Drain::add_log_message`]; each
/// either joins (and possibly generalizes) the best matching cluster or
/// starts a new one. Decisions are never revisited.
#[derive(Debug)]
pub struct Drain {
    similarity_threshold: f64,
    protected: ProtectedPatterns,
    tree: PrefixTree,
    clusters: ClusterStore,
    // line id -> owning cluster, first assignment wins
    owners: HashMap<u64, ClusterId>,
}

impl Drain {
    pub fn new(config: &DrainConfig) -> Result<Self> {
        config.validate()?;
        let protected = ProtectedPatterns::new(&config.protected_patterns)?;
        Ok(Self {
            similarity_threshold: config.similarity_threshold,
            protected,
            tree: PrefixTree::new(config.effective_depth(), config.max_child),
            clusters: ClusterStore::new(),
            owners: HashMap::new(),
        })
    }

    /// Drop every cluster and tree node from a previous run
    pub fn reset(&mut self) {
        self.tree.clear();
        self.clusters.clear();
        self.owners.clear();
    }

    pub fn add_log_message(&mut self, line_id: u64, tokens: Vec<String>) -> AddOutcome {
        let matched = self.search(&tokens);

        let Some(matched) = matched else {
            let created = self.create_cluster(line_id, tokens);
            log::debug!("line {line_id}: new cluster {created}");
            return AddOutcome::Created(created);
        };

        let existing = self.clusters.get(matched).template();
        if must_split(existing, &tokens, &self.protected) {
            let created = self.create_cluster(line_id, tokens);
            log::debug!(
                "line {line_id}: protected token differs from {matched}, new cluster {created}"
            );
            return AddOutcome::Split { matched, created };
        }

        let new_template = get_template(&tokens, existing, &self.protected);
        let template_changed = self.clusters.absorb(matched, line_id, new_template);
        self.owners.entry(line_id).or_insert(matched);
        if template_changed {
            log::debug!(
                "line {line_id}: cluster {matched} generalized to {:?}",
                self.clusters.get(matched).template_str()
            );
        }
        AddOutcome::Merged {
            cluster: matched,
            template_changed,
        }
    }

    /// Best matching cluster for `tokens`, without modifying anything
    pub fn search(&self, tokens: &[String]) -> Option<ClusterId> {
        tree_search(
            &self.tree,
            &self.clusters,
            tokens,
            self.similarity_threshold,
            &self.protected,
        )
    }

    pub fn cluster(&self, id: ClusterId) -> &LogCluster {
        self.clusters.get(id)
    }

    /// Clusters in creation order
    pub fn clusters(&self) -> &[LogCluster] {
        self.clusters.as_slice()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Every line id fed so far, mapped to the cluster that owns it
    pub fn line_assignments(&self) -> &HashMap<u64, ClusterId> {
        &self.owners
    }

    /// Owning cluster of `line_id`. A line id fed twice keeps its first owner.
    pub fn cluster_of(&self, line_id: u64) -> Option<ClusterId> {
        self.owners.get(&line_id).copied()
    }

    pub fn tree(&self) -> &PrefixTree {
        &self.tree
    }

    pub fn into_clusters(self) -> Vec<LogCluster> {
        self.clusters.into_vec()
    }

    fn create_cluster(&mut self, line_id: u64, tokens: Vec<String>) -> ClusterId {
        let id = self.clusters.create(tokens, line_id);
        self.tree.insert(id, self.clusters.get(id).template());
        self.owners.entry(line_id).or_insert(id);
        id
    }
}
