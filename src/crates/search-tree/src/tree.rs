//! Arena-based search tree: an immutable-parent DAG of nodes.
//!
//! Nodes are addressed by [`NodeId`] rather than owned references, so the
//! tree never fights Rust's ownership rules while remaining trivially
//! introspectable (every node is reachable by index for debugging/dumping).

use llm::Message;
use std::collections::BTreeMap;
use workspace::{FileMap, Workspace};

/// Opaque handle to a node in a [`Tree`]. Never reused after the owning tree
/// is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// A vertex of the search tree.
///
/// `files` and `messages` hold only what was produced *at this node* — not
/// the cumulative trajectory. Callers merge along root→node with
/// [`Tree::trajectory_files`]/[`Tree::trajectory_messages`].
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub workspace: Box<dyn Workspace>,
    pub messages: Vec<Message>,
    pub files: FileMap,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// An arena of [`Node`]s rooted at a single seed node.
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Build a tree with a single root node carrying the actor's seed
    /// prompt and a freshly cloned workspace.
    pub fn new(workspace: Box<dyn Workspace>, seed_messages: Vec<Message>) -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            workspace,
            messages: seed_messages,
            files: FileMap::new(),
        };
        Self { nodes: vec![root], root: NodeId(0) }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Append a new child under `parent`, returning the new node's id.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        workspace: Box<dyn Workspace>,
        messages: Vec<Message>,
        files: FileMap,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            workspace,
            messages,
            files,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Every node in the tree with no children, root included when the tree
    /// has not yet been expanded.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_leaf())
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.get(current).parent() {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Concatenation of every node's messages from root to `id`, in order.
    pub fn trajectory_messages(&self, id: NodeId) -> Vec<Message> {
        self.path_to_root(id)
            .into_iter()
            .flat_map(|n| self.get(n).messages.clone())
            .collect()
    }

    /// Map-merge (last writer wins) of every node's files from root to `id`.
    pub fn trajectory_files(&self, id: NodeId) -> FileMap {
        let mut merged: BTreeMap<String, String> = BTreeMap::new();
        for n in self.path_to_root(id) {
            merged.extend(self.get(n).files.clone());
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workspace::MemoryWorkspace;

    #[test]
    fn trajectory_files_merges_last_writer_wins() {
        let mut tree = Tree::new(Box::new(MemoryWorkspace::empty()), vec![]);
        let root = tree.root();

        let mut first_files = FileMap::new();
        first_files.insert("a.txt".into(), "v1".into());
        let child = tree.add_child(root, Box::new(MemoryWorkspace::empty()), vec![], first_files);

        let mut second_files = FileMap::new();
        second_files.insert("a.txt".into(), "v2".into());
        second_files.insert("b.txt".into(), "new".into());
        let grandchild = tree.add_child(child, Box::new(MemoryWorkspace::empty()), vec![], second_files);

        let merged = tree.trajectory_files(grandchild);
        assert_eq!(merged.get("a.txt").unwrap(), "v2");
        assert_eq!(merged.get("b.txt").unwrap(), "new");
    }

    #[test]
    fn leaves_returns_only_childless_nodes() {
        let mut tree = Tree::new(Box::new(MemoryWorkspace::empty()), vec![]);
        let root = tree.root();
        assert_eq!(tree.leaves(), vec![root]);

        let child = tree.add_child(root, Box::new(MemoryWorkspace::empty()), vec![], FileMap::new());
        assert_eq!(tree.leaves(), vec![child]);
    }
}
