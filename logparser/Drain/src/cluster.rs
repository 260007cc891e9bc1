use std::fmt;

use serde::Serialize;

use crate::template::is_wildcard;

/// Index of a cluster inside its [`ClusterStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClusterId(usize);

impl ClusterId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A group of log lines sharing one template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogCluster {
    template: Vec<String>,
    line_ids: Vec<u64>,
}

impl LogCluster {
    fn new(template: Vec<String>, line_id: u64) -> Self {
        Self {
            template,
            line_ids: vec![line_id],
        }
    }

    pub fn template(&self) -> &[String] {
        &self.template
    }

    pub fn template_str(&self) -> String {
        self.template.join(" ")
    }

    pub fn line_ids(&self) -> &[u64] {
        &self.line_ids
    }

    pub fn size(&self) -> usize {
        self.line_ids.len()
    }

    pub fn wildcard_count(&self) -> usize {
        self.template.iter().filter(|t| is_wildcard(t)).count()
    }
}

/// Append-only collection of clusters for one parse run
#[derive(Debug, Default)]
pub struct ClusterStore {
    clusters: Vec<LogCluster>,
}

impl ClusterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, template: Vec<String>, line_id: u64) -> ClusterId {
        let id = ClusterId(self.clusters.len());
        self.clusters.push(LogCluster::new(template, line_id));
        id
    }

    pub fn get(&self, id: ClusterId) -> &LogCluster {
        &self.clusters[id.0]
    }

    /// Record `line_id` as a member and install `template` if it differs.
    /// Returns whether the template changed.
    ///
    /// # Panics
    ///
    /// Panics if `template` would change the cluster's length.
    pub fn absorb(&mut self, id: ClusterId, line_id: u64, template: Vec<String>) -> bool {
        let cluster = &mut self.clusters[id.0];
        assert_eq!(
            cluster.template.len(),
            template.len(),
            "cluster template length is fixed"
        );
        cluster.line_ids.push(line_id);
        if cluster.template == template {
            return false;
        }
        cluster.template = template;
        true
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn clear(&mut self) {
        self.clusters.clear();
    }

    pub fn as_slice(&self) -> &[LogCluster] {
        &self.clusters
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, &LogCluster)> {
        self.clusters
            .iter()
            .enumerate()
            .map(|(idx, cluster)| (ClusterId(idx), cluster))
    }

    pub fn into_vec(self) -> Vec<LogCluster> {
        self.clusters
    }
}
