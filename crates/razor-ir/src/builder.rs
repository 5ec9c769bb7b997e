//! A cursor for building intermediate trees top down.

use crate::node::IntermediateNode;

struct Frame {
    node: IntermediateNode,
    /// Where the next child goes; `None` appends.
    insert_at: Option<usize>,
}

/// Keeps a stack of open nodes. [`push`](Self::push) opens a node,
/// [`pop`](Self::pop) closes it and attaches it to its parent.
pub struct IntermediateNodeBuilder {
    stack: Vec<Frame>,
}

impl IntermediateNodeBuilder {
    pub fn new(root: IntermediateNode) -> Self {
        Self {
            stack: vec![Frame {
                node: root,
                insert_at: None,
            }],
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current(&self) -> &IntermediateNode {
        &self.top().node
    }

    pub fn current_mut(&mut self) -> &mut IntermediateNode {
        &mut self.top_mut().node
    }

    /// Adds a finished node to the current one.
    pub fn add(&mut self, node: IntermediateNode) {
        Self::add_to(self.top_mut(), node);
    }

    /// Adds a finished node to the root, ahead of anything still open.
    pub fn add_to_root(&mut self, node: IntermediateNode) {
        Self::add_to(&mut self.stack[0], node);
    }

    /// Makes the following [`add`](Self::add)s insert at `index` of the
    /// current node, advancing past each insertion.
    pub fn set_insertion_index(&mut self, index: Option<usize>) {
        self.top_mut().insert_at = index;
    }

    pub fn push(&mut self, node: IntermediateNode) {
        self.stack.push(Frame {
            node,
            insert_at: None,
        });
    }

    /// Closes the current node. Returns `false` when only the root is open.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() == 1 {
            return false;
        }
        match self.stack.pop() {
            Some(frame) => {
                self.add(frame.node);
                true
            }
            None => false,
        }
    }

    /// Closes every open node and returns the root.
    pub fn build(mut self) -> IntermediateNode {
        while self.pop() {}
        match self.stack.pop() {
            Some(frame) => frame.node,
            None => IntermediateNode::document(),
        }
    }

    fn add_to(frame: &mut Frame, node: IntermediateNode) {
        match frame.insert_at.as_mut() {
            Some(index) => {
                let at = (*index).min(frame.node.children.len());
                frame.node.children.insert(at, node);
                *index = at + 1;
            }
            None => frame.node.children.push(node),
        }
    }

    fn top(&self) -> &Frame {
        // The root frame is never popped off by `pop`.
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }
}
