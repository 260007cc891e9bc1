use std::collections::HashMap;
use std::fmt::Write as _;

use crate::cluster::ClusterId;
use crate::template::{has_numbers, WILDCARD};

/// What hangs below a node: either more token levels or the clusters that
/// end at this path.
#[derive(Debug)]
pub enum Slot {
    Children(HashMap<String, Node>),
    Leaf(Vec<ClusterId>),
}

#[derive(Debug)]
pub struct Node {
    depth: usize,
    key: String,
    slot: Slot,
}

impl Node {
    fn new(depth: usize, key: String) -> Self {
        Node {
            depth,
            key,
            slot: Slot::Children(HashMap::new()),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Token (or sequence length, for the first layer) this node is keyed by
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    /// Clusters of a leaf bucket; `None` for inner nodes
    pub fn clusters(&self) -> Option<&[ClusterId]> {
        match &self.slot {
            Slot::Leaf(clusters) => Some(clusters),
            Slot::Children(_) => None,
        }
    }

    pub fn child_count(&self) -> usize {
        match &self.slot {
            Slot::Children(children) => children.len(),
            Slot::Leaf(_) => 0,
        }
    }

    fn attach(&mut self, id: ClusterId) {
        if let Slot::Leaf(clusters) = &mut self.slot {
            if !clusters.contains(&id) {
                clusters.push(id);
            }
            return;
        }
        self.slot = Slot::Leaf(vec![id]);
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        if let Slot::Children(children) = &self.slot {
            for child in children.values() {
                child.visit(f);
            }
        }
    }
}

/// Fixed-depth search index over token sequences.
///
/// The first layer is keyed by sequence length, the next `depth - 1` layers
/// by leading tokens (or [`WILDCARD`]), and the node where a path stops holds
/// the leaf bucket of clusters.
#[derive(Debug)]
pub struct PrefixTree {
    root: HashMap<usize, Node>,
    depth: usize,
    max_child: usize,
}

impl PrefixTree {
    /// `depth` is the effective depth (token levels walked, at least 1)
    pub fn new(depth: usize, max_child: usize) -> Self {
        Self {
            root: HashMap::new(),
            depth: depth.max(1),
            max_child,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_child(&self) -> usize {
        self.max_child
    }

    pub fn clear(&mut self) {
        self.root.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn lookup_bucket(&self, seq_len: usize) -> Option<&Node> {
        self.root.get(&seq_len)
    }

    pub fn ensure_bucket(&mut self, seq_len: usize) -> &mut Node {
        self.root
            .entry(seq_len)
            .or_insert_with(|| Node::new(1, seq_len.to_string()))
    }

    /// Follow `seq` down the tree without creating anything and return the
    /// leaf bucket it lands in.
    pub fn leaf_for(&self, seq: &[String]) -> Option<&[ClusterId]> {
        let seq_len = seq.len();
        let mut node = self.lookup_bucket(seq_len)?;

        let mut current_depth = 1;
        for token in seq {
            if current_depth >= self.depth || current_depth > seq_len {
                break;
            }
            let children = match &node.slot {
                Slot::Children(children) => children,
                Slot::Leaf(_) => return None,
            };
            node = children
                .get(token.as_str())
                .or_else(|| children.get(WILDCARD))?;
            current_depth += 1;
        }

        node.clusters()
    }

    /// Index cluster `id` under `template`, growing the path as needed.
    /// Inserting the same cluster again with the same template is a no-op.
    pub fn insert(&mut self, id: ClusterId, template: &[String]) {
        let seq_len = template.len();
        let depth = self.depth;
        let max_child = self.max_child;
        let mut node = self.ensure_bucket(seq_len);

        let mut current_depth = 1;
        loop {
            if current_depth >= depth || current_depth > seq_len {
                node.attach(id);
                return;
            }

            let token = &template[current_depth - 1];
            let children = match &mut node.slot {
                Slot::Children(children) => children,
                Slot::Leaf(_) => unreachable!("leaf bucket above depth {depth}"),
            };
            let key = next_key(children, token, max_child);
            node = children
                .entry(key)
                .or_insert_with_key(|key| Node::new(current_depth + 1, key.clone()));
            current_depth += 1;
        }
    }

    /// Number of nodes below the root
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        for node in self.root.values() {
            node.visit(&mut |_| count += 1);
        }
        count
    }

    /// Largest child count of any token node. The root is keyed by length
    /// and is not bounded by `max_child`.
    pub fn max_branching(&self) -> usize {
        let mut max = 0;
        for node in self.root.values() {
            node.visit(&mut |n| max = max.max(n.child_count()));
        }
        max
    }

    /// Indented dump of the tree, one node per line, children sorted
    pub fn render(&self) -> String {
        let mut out = String::from("Root\n");
        let mut lengths: Vec<_> = self.root.keys().copied().collect();
        lengths.sort_unstable();
        for len in lengths {
            render_node(&self.root[&len], 1, &mut out);
        }
        out
    }
}

/// Pick the child key `token` descends into, honoring the branching cap.
fn next_key(children: &HashMap<String, Node>, token: &str, max_child: usize) -> String {
    if children.contains_key(token) {
        return token.to_string();
    }

    // tokens with digits are variable by nature
    if has_numbers(token) {
        return WILDCARD.to_string();
    }

    let branches = children.len();
    let literal_fits = if children.contains_key(WILDCARD) {
        branches < max_child
    } else {
        // the last free slot is kept for the wildcard child
        branches + 1 < max_child
    };

    if literal_fits {
        token.to_string()
    } else {
        WILDCARD.to_string()
    }
}

fn render_node(node: &Node, indent: usize, out: &mut String) {
    for _ in 0..indent {
        out.push('\t');
    }
    if node.depth == 1 {
        let _ = write!(out, "<{}>", node.key);
    } else {
        out.push_str(&node.key);
    }

    match &node.slot {
        Slot::Leaf(clusters) => {
            let ids: Vec<String> = clusters.iter().map(ToString::to_string).collect();
            let _ = writeln!(out, " -> [{}]", ids.join(", "));
        }
        Slot::Children(children) => {
            out.push('\n');
            let mut keys: Vec<&String> = children.keys().collect();
            keys.sort();
            for key in keys {
                render_node(&children[key], indent + 1, out);
            }
        }
    }
}
