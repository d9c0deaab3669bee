use domus_automation::{Node, Sequence, Slot};

/// Visitor pattern for traversing node trees immutably
///
/// This trait provides default implementations that walk the entire tree.
/// Override specific visit_* methods to perform custom actions on nodes.
pub trait Visitor: Sized {
    fn visit_sequence(&mut self, sequence: &Sequence) {
        walk_sequence(self, sequence);
    }

    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }

    fn visit_child_sequence(&mut self, _slot: Slot, sequence: &Sequence) {
        walk_sequence(self, sequence);
    }
}

/// Mutable visitor pattern for transforming node trees
///
/// Similar to Visitor, but provides mutable access to nodes.
/// Use this when you need to modify the tree during traversal.
pub trait VisitorMut: Sized {
    fn visit_sequence_mut(&mut self, sequence: &mut Sequence) {
        walk_sequence_mut(self, sequence);
    }

    fn visit_node_mut(&mut self, node: &mut Node) {
        walk_node_mut(self, node);
    }

    fn visit_child_sequence_mut(&mut self, _slot: Slot, sequence: &mut Sequence) {
        walk_sequence_mut(self, sequence);
    }
}

// Default walk implementations for immutable visitor

pub fn walk_sequence<V: Visitor>(visitor: &mut V, sequence: &Sequence) {
    for node in sequence {
        visitor.visit_node(node);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node) {
    for (slot, sequence) in &node.children {
        visitor.visit_child_sequence(*slot, sequence);
    }
}

// Default walk implementations for mutable visitor

pub fn walk_sequence_mut<V: VisitorMut>(visitor: &mut V, sequence: &mut Sequence) {
    for node in sequence {
        visitor.visit_node_mut(node);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut Node) {
    for (slot, sequence) in node.children.iter_mut() {
        visitor.visit_child_sequence_mut(*slot, sequence);
    }
}

/// Collect the identity keys of every node in a tree
pub fn collect_keys(sequence: &Sequence) -> Vec<String> {
    struct KeyCollector {
        keys: Vec<String>,
    }

    impl Visitor for KeyCollector {
        fn visit_node(&mut self, node: &Node) {
            self.keys.push(node.key.clone());
            walk_node(self, node);
        }
    }

    let mut collector = KeyCollector { keys: Vec::new() };
    collector.visit_sequence(sequence);
    collector.keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use domus_automation::{Config, NodeKind, NodeSort, Slot};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn leaf(key: &str) -> Node {
        let mut config = Config::new();
        config.insert("delay".to_string(), json!(""));
        Node {
            key: key.to_string(),
            kind: NodeKind::of(NodeSort::Action, &config),
            config,
            children: BTreeMap::new(),
        }
    }

    #[test]
    fn test_collect_keys_covers_nested_sequences() {
        let mut block = leaf("block");
        block.children.insert(Slot::Then, vec![leaf("then-1")]);
        block
            .children
            .insert(Slot::Conditions, vec![leaf("cond-1"), leaf("cond-2")]);

        let root = vec![leaf("a"), block, leaf("b")];
        let keys = collect_keys(&root);

        assert_eq!(keys.len(), 6);
        for expected in ["a", "block", "cond-1", "cond-2", "then-1", "b"] {
            assert!(keys.iter().any(|key| key == expected), "missing {expected}");
        }
    }
}
