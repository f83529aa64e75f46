//! Generic labeled tree shared by schema trees and result trees.
//!
//! A node is a leaf iff it has no children. Leaves carry the payload that
//! ends up in output rows; branch nodes only group their children.
//!
//! Trees are plain owned values. Anything that needs to edit a tree that
//! is still referenced elsewhere clones it first (`Clone` is a deep copy),
//! so variants produced during expansion never alias each other.

/// A node in an ordered tree with an optional payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<T> {
    payload: Option<T>,
    children: Vec<TreeNode<T>>,
}

impl<T> Default for TreeNode<T> {
    fn default() -> Self {
        Self::structural()
    }
}

impl<T> TreeNode<T> {
    /// Create a node with an optional payload and no children
    pub fn new(payload: Option<T>) -> Self {
        Self {
            payload,
            children: Vec::new(),
        }
    }

    /// Create a leaf carrying `payload`
    pub fn leaf(payload: T) -> Self {
        Self::new(Some(payload))
    }

    /// Create a payload-less node, used to group children
    pub fn structural() -> Self {
        Self::new(None)
    }

    /// Create a payload-less node owning `children`
    pub fn with_children(children: Vec<TreeNode<T>>) -> Self {
        Self {
            payload: None,
            children,
        }
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn children(&self) -> &[TreeNode<T>] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&TreeNode<T>> {
        self.children.get(index)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn push_child(&mut self, child: TreeNode<T>) {
        self.children.push(child);
    }

    /// Insert a child at `index`, shifting later children right.
    ///
    /// # Panics
    ///
    /// Panics if `index > child_count()`.
    pub fn insert_child(&mut self, index: usize, child: TreeNode<T>) {
        self.children.insert(index, child);
    }

    /// Remove and return the child at `index`, if there is one
    pub fn remove_child(&mut self, index: usize) -> Option<TreeNode<T>> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    /// Replace the child at `index` with `replacement`, in order.
    ///
    /// Returns the removed child, or `None` (leaving the node untouched) if
    /// `index` is out of range.
    pub fn splice_child<I>(&mut self, index: usize, replacement: I) -> Option<TreeNode<T>>
    where
        I: IntoIterator<Item = TreeNode<T>>,
    {
        if index >= self.children.len() {
            return None;
        }
        self.children.splice(index..=index, replacement).next()
    }

    /// Number of leaves under this node (a leaf counts itself)
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(TreeNode::leaf_count).sum()
        }
    }

    /// Pre-order iterator over leaf nodes
    pub fn leaves(&self) -> Leaves<'_, T> {
        Leaves { stack: vec![self] }
    }
}

impl<T: Clone> TreeNode<T> {
    /// Pre-order collection of leaf payloads under this node.
    ///
    /// Every leaf contributes exactly one slot, `None` when it carries no
    /// payload. A bare node with no children therefore flattens to a single
    /// `None` placeholder.
    pub fn flatten(&self) -> Vec<Option<T>> {
        self.leaves().map(|leaf| leaf.payload.clone()).collect()
    }
}

/// Iterator returned by [`TreeNode::leaves`]
pub struct Leaves<'a, T> {
    stack: Vec<&'a TreeNode<T>>,
}

impl<'a, T> Iterator for Leaves<'a, T> {
    type Item = &'a TreeNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if node.is_leaf() {
                return Some(node);
            }
            self.stack.extend(node.children.iter().rev());
        }
        None
    }
}
