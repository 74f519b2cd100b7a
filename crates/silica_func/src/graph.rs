//! Generic hash-consed node storage.
//!
//! [`ComputeGraph`] stores nodes keyed for deduplication by
//! `(function, ordered argument list)`: adding a sealed node that is
//! structurally identical to an existing one returns the existing node's
//! id. Nodes created *open* skip deduplication; their argument lists may
//! grow until they are sealed, which supports placeholder and
//! multi-driver nodes whose arguments are not known at creation time.
//!
//! Beyond the function payload, each node carries a non-deduplicated
//! attribute (its sort), an optional sparse attribute (a naming hint),
//! and may be registered under a secondary key (named ports). The graph
//! invariants are producer bugs when violated, so they are checked with
//! assertions rather than returned as errors.

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Index of a node in a [`ComputeGraph`].
///
/// Ids are invalidated by [`ComputeGraph::topological_sort`], which
/// renumbers every node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a `NodeId` from a raw index.
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or_else(|_| panic!("node index {index} out of range")))
    }

    /// Returns the raw index of this id.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

struct Entry<F, A, S> {
    function: F,
    attr: A,
    args: Vec<NodeId>,
    sparse_attr: Option<S>,
    sealed: bool,
}

/// Deduplicating append-only node store.
///
/// Type parameters: `F` is the function payload (the deduplication
/// subject), `A` the per-node attribute, `S` the sparse attribute, and
/// `K` the secondary port key.
pub struct ComputeGraph<F, A, S, K> {
    entries: Vec<Entry<F, A, S>>,
    dedup: HashMap<(F, Vec<NodeId>), NodeId>,
    keys: HashMap<K, NodeId>,
}

impl<F, A, S, K> ComputeGraph<F, A, S, K>
where
    F: Clone + Eq + Hash,
    K: Clone + Eq + Hash,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            dedup: HashMap::new(),
            keys: HashMap::new(),
        }
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push_entry(&mut self, function: F, attr: A, args: Vec<NodeId>, sealed: bool) -> NodeId {
        for arg in &args {
            assert!(arg.index() < self.entries.len(), "argument node out of range");
        }
        let id = NodeId::from_index(self.entries.len());
        self.entries.push(Entry {
            function,
            attr,
            args,
            sparse_attr: None,
            sealed,
        });
        id
    }

    /// Adds a sealed node, returning an existing node if one with the
    /// same function and arguments already exists.
    ///
    /// On a deduplication hit the `attr` is dropped; the existing node's
    /// attribute is kept.
    pub fn add(&mut self, function: F, attr: A, args: Vec<NodeId>) -> NodeId {
        let key = (function.clone(), args.clone());
        if let Some(&existing) = self.dedup.get(&key) {
            return existing;
        }
        let id = self.push_entry(function, attr, args, true);
        self.dedup.insert(key, id);
        id
    }

    /// Adds an open node with an empty argument list.
    ///
    /// Open nodes are never deduplicated; their arguments are appended
    /// with [`append_arg`](Self::append_arg) and the node is frozen with
    /// [`seal`](Self::seal).
    pub fn add_open(&mut self, function: F, attr: A) -> NodeId {
        self.push_entry(function, attr, Vec::new(), false)
    }

    /// Appends an argument to an open node.
    ///
    /// # Panics
    ///
    /// Panics if the node is sealed.
    pub fn append_arg(&mut self, node: NodeId, arg: NodeId) {
        assert!(arg.index() < self.entries.len(), "argument node out of range");
        let entry = &mut self.entries[node.index()];
        assert!(!entry.sealed, "append_arg on a sealed node");
        entry.args.push(arg);
    }

    /// Seals an open node. Sealed nodes are immutable.
    ///
    /// Late-sealed nodes keep their identity and do not join the
    /// deduplication index.
    pub fn seal(&mut self, node: NodeId) {
        self.entries[node.index()].sealed = true;
    }

    /// Returns `true` if the node is sealed.
    pub fn is_sealed(&self, node: NodeId) -> bool {
        self.entries[node.index()].sealed
    }

    /// Returns the function payload of a node.
    pub fn function(&self, node: NodeId) -> &F {
        &self.entries[node.index()].function
    }

    /// Returns the attribute of a node.
    pub fn attr(&self, node: NodeId) -> &A {
        &self.entries[node.index()].attr
    }

    /// Returns the argument list of a node.
    pub fn args(&self, node: NodeId) -> &[NodeId] {
        &self.entries[node.index()].args
    }

    /// Returns the sparse attribute of a node, if set.
    pub fn sparse_attr(&self, node: NodeId) -> Option<&S> {
        self.entries[node.index()].sparse_attr.as_ref()
    }

    /// Sets the sparse attribute of a node.
    pub fn set_sparse_attr(&mut self, node: NodeId, value: S) {
        self.entries[node.index()].sparse_attr = Some(value);
    }

    /// Registers a node under a secondary key. A later registration for
    /// the same key replaces the earlier one.
    pub fn assign_key(&mut self, key: K, node: NodeId) {
        self.keys.insert(key, node);
    }

    /// Looks up the node registered under a secondary key.
    pub fn key_node(&self, key: &K) -> Option<NodeId> {
        self.keys.get(key).copied()
    }

    /// Redirects every reference to a pass-through node to that node's
    /// target, collapsing chains transitively.
    ///
    /// `passthrough` returns the target node for transparent nodes (a
    /// filled placeholder forwarding its single argument) and `None` for
    /// everything else. Secondary keys are redirected too; the bypassed
    /// nodes themselves remain in the graph.
    ///
    /// # Panics
    ///
    /// Panics if the pass-through nodes form a cycle.
    pub fn bypass<P>(&mut self, mut passthrough: P)
    where
        P: FnMut(&F, &[NodeId]) -> Option<NodeId>,
    {
        let len = self.entries.len();
        let step: Vec<Option<NodeId>> = self
            .entries
            .iter()
            .map(|entry| passthrough(&entry.function, &entry.args))
            .collect();

        // Resolve chains with path compression.
        let mut target: Vec<Option<NodeId>> = vec![None; len];
        for start in 0..len {
            let mut chain = Vec::new();
            let mut at = NodeId::from_index(start);
            while target[at.index()].is_none() {
                match step[at.index()] {
                    Some(next) => {
                        chain.push(at);
                        assert!(
                            !chain.contains(&next),
                            "cycle through pass-through nodes in compute graph"
                        );
                        at = next;
                    }
                    None => break,
                }
            }
            let end = target[at.index()].unwrap_or(at);
            for node in chain {
                target[node.index()] = Some(end);
            }
        }

        for entry in &mut self.entries {
            for arg in &mut entry.args {
                *arg = target[arg.index()].unwrap_or(*arg);
            }
        }
        for node in self.keys.values_mut() {
            *node = target[node.index()].unwrap_or(*node);
        }
        self.rebuild_dedup();
    }

    /// Renumbers the nodes so every node's arguments precede it.
    ///
    /// All previously obtained [`NodeId`]s are invalidated.
    ///
    /// # Panics
    ///
    /// Panics if the graph contains a dependency cycle. Cycles through
    /// unresolved placeholders are legal only as temporary construction
    /// artifacts and must be resolved before sorting.
    pub fn topological_sort(&mut self) {
        let mut digraph = DiGraph::<(), ()>::new();
        let indices: Vec<_> = self.entries.iter().map(|_| digraph.add_node(())).collect();
        for (index, entry) in self.entries.iter().enumerate() {
            for arg in &entry.args {
                digraph.add_edge(indices[arg.index()], indices[index], ());
            }
        }
        let order = match toposort(&digraph, None) {
            Ok(order) => order,
            Err(_) => panic!("cycle in compute graph"),
        };

        // remap[old] = new
        let mut remap = vec![NodeId::from_index(0); self.entries.len()];
        for (new_index, petgraph_index) in order.iter().enumerate() {
            remap[petgraph_index.index()] = NodeId::from_index(new_index);
        }

        let mut reordered: Vec<Option<Entry<F, A, S>>> =
            self.entries.drain(..).map(Some).collect();
        let mut entries = Vec::with_capacity(reordered.len());
        for petgraph_index in &order {
            let mut entry = reordered[petgraph_index.index()]
                .take()
                .unwrap_or_else(|| panic!("topological order visited a node twice"));
            for arg in &mut entry.args {
                *arg = remap[arg.index()];
            }
            entries.push(entry);
        }
        self.entries = entries;

        for node in self.keys.values_mut() {
            *node = remap[node.index()];
        }
        self.rebuild_dedup();
    }

    fn rebuild_dedup(&mut self) {
        self.dedup.clear();
        for (index, entry) in self.entries.iter().enumerate() {
            if !entry.sealed {
                continue;
            }
            self.dedup
                .entry((entry.function.clone(), entry.args.clone()))
                .or_insert(NodeId::from_index(index));
        }
    }
}

impl<F, A, S, K> Default for ComputeGraph<F, A, S, K>
where
    F: Clone + Eq + Hash,
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestGraph = ComputeGraph<&'static str, u32, String, &'static str>;

    #[test]
    fn sealed_nodes_are_deduplicated() {
        let mut graph = TestGraph::new();
        let a = graph.add("const", 1, vec![]);
        let b = graph.add("const", 1, vec![]);
        assert_eq!(a, b);
        assert_eq!(graph.len(), 1);

        let sum1 = graph.add("add", 1, vec![a, a]);
        let sum2 = graph.add("add", 1, vec![a, a]);
        assert_eq!(sum1, sum2);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn different_args_are_distinct() {
        let mut graph = TestGraph::new();
        let a = graph.add("x", 1, vec![]);
        let b = graph.add("y", 1, vec![]);
        let ab = graph.add("add", 1, vec![a, b]);
        let ba = graph.add("add", 1, vec![b, a]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn open_nodes_skip_dedup() {
        let mut graph = TestGraph::new();
        let a = graph.add_open("buf", 1);
        let b = graph.add_open("buf", 1);
        assert_ne!(a, b);
        assert!(!graph.is_sealed(a));

        let value = graph.add("const", 1, vec![]);
        graph.append_arg(a, value);
        graph.seal(a);
        assert!(graph.is_sealed(a));
        assert_eq!(graph.args(a), &[value]);
    }

    #[test]
    #[should_panic(expected = "append_arg on a sealed node")]
    fn append_to_sealed_panics() {
        let mut graph = TestGraph::new();
        let a = graph.add("const", 1, vec![]);
        graph.append_arg(a, a);
    }

    #[test]
    fn keys_track_nodes() {
        let mut graph = TestGraph::new();
        let a = graph.add("x", 1, vec![]);
        let b = graph.add("y", 1, vec![]);
        graph.assign_key("out", a);
        graph.assign_key("out", b);
        assert_eq!(graph.key_node(&"out"), Some(b));
        assert_eq!(graph.key_node(&"other"), None);
    }

    #[test]
    fn bypass_collapses_chains() {
        let mut graph = TestGraph::new();
        let value = graph.add("const", 1, vec![]);
        let buf1 = graph.add_open("buf", 1);
        graph.append_arg(buf1, value);
        graph.seal(buf1);
        let buf2 = graph.add_open("buf", 1);
        graph.append_arg(buf2, buf1);
        graph.seal(buf2);
        let user = graph.add("not", 1, vec![buf2]);
        graph.assign_key("out", buf2);

        graph.bypass(|function, args| {
            if *function == "buf" && args.len() == 1 {
                Some(args[0])
            } else {
                None
            }
        });

        assert_eq!(graph.args(user), &[value]);
        assert_eq!(graph.key_node(&"out"), Some(value));
    }

    #[test]
    #[should_panic(expected = "cycle through pass-through nodes")]
    fn bypass_cycle_panics() {
        let mut graph = TestGraph::new();
        let a = graph.add_open("buf", 1);
        let b = graph.add_open("buf", 1);
        graph.append_arg(a, b);
        graph.append_arg(b, a);
        graph.bypass(|function, args| {
            if *function == "buf" && args.len() == 1 {
                Some(args[0])
            } else {
                None
            }
        });
    }

    #[test]
    fn topological_sort_orders_args_first() {
        let mut graph = TestGraph::new();
        // Build out of order via an open node filled late.
        let pending = graph.add_open("buf", 1);
        let user = graph.add("not", 1, vec![pending]);
        let value = graph.add("const", 1, vec![]);
        graph.append_arg(pending, value);
        graph.seal(pending);
        graph.assign_key("out", user);

        graph.topological_sort();

        for index in 0..graph.len() {
            let id = NodeId::from_index(index);
            for arg in graph.args(id) {
                assert!(arg.index() < index, "argument must precede its user");
            }
        }
        let out = graph.key_node(&"out").unwrap();
        assert_eq!(*graph.function(out), "not");
    }

    #[test]
    #[should_panic(expected = "cycle in compute graph")]
    fn topological_sort_rejects_cycles() {
        let mut graph = TestGraph::new();
        let a = graph.add_open("buf", 1);
        let b = graph.add_open("buf", 1);
        graph.append_arg(a, b);
        graph.append_arg(b, a);
        graph.topological_sort();
    }
}
