//! # Recursive Composition
//!
//! Building-block variants hold one or more nested node sequences inside
//! their value (`choose[i].sequence`, `repeat.sequence`, `if.then`, ...).
//! Decomposition lifts those arrays out of the raw value into keyed child
//! sequences, so each level can be edited through the same mutation and
//! sync contracts; composition is the inverse and re-inlines them.
//!
//! Mandatory branches absent from the value are normalized to empty
//! sequences during decomposition. A nested array containing non-mapping
//! entries is left in the raw value untouched; the validator flags it and
//! the node is held in text mode instead of losing data.

use domus_automation::{
    ActionKind, Config, ConditionKind, KeyGenerator, Node, NodeKind, NodeSort, Sequence, Slot,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Build a keyed node tree from a raw value
pub fn decompose(sort: NodeSort, mut config: Config, keys: &mut KeyGenerator) -> Node {
    let key = keys.next_key();
    let kind = NodeKind::of(sort, &config);
    let mut children = BTreeMap::new();

    if let Some(kind) = kind {
        extract_children(kind, &mut config, &mut children, keys);
    }

    Node {
        key,
        kind,
        config,
        children,
    }
}

/// Decompose a list of raw values into a sequence
pub fn decompose_all(sort: NodeSort, configs: Vec<Config>, keys: &mut KeyGenerator) -> Sequence {
    configs
        .into_iter()
        .map(|config| decompose(sort, config, keys))
        .collect()
}

/// Re-inline a node's child sequences into a raw value
pub fn compose_config(node: &Node) -> Config {
    let mut config = node.config.clone();
    if let Some(kind) = node.kind {
        write_children(kind, &mut config, &node.children);
    }
    config
}

pub fn compose(node: &Node) -> Value {
    Value::Object(compose_config(node))
}

pub fn compose_all(sequence: &Sequence) -> Vec<Value> {
    sequence.iter().map(compose).collect()
}

fn extract_children(
    kind: NodeKind,
    config: &mut Config,
    children: &mut BTreeMap<Slot, Sequence>,
    keys: &mut KeyGenerator,
) {
    match kind {
        NodeKind::Action(ActionKind::Choose) => {
            if let Some(Value::Array(options)) = config.get_mut("choose") {
                for (index, option) in options.iter_mut().enumerate() {
                    if let Value::Object(option) = option {
                        take_into(option, "conditions", Slot::OptionConditions(index), true, children, keys);
                        take_into(option, "sequence", Slot::OptionSequence(index), true, children, keys);
                    }
                }
            }
            take_into(config, "default", Slot::Default, false, children, keys);
        }
        NodeKind::Action(ActionKind::If) => {
            take_into(config, "if", Slot::Conditions, true, children, keys);
            take_into(config, "then", Slot::Then, true, children, keys);
            take_into(config, "else", Slot::Else, false, children, keys);
        }
        NodeKind::Action(ActionKind::Repeat) => {
            if let Some(Value::Object(repeat)) = config.get_mut("repeat") {
                take_into(repeat, "sequence", Slot::Sequence, true, children, keys);
                take_into(repeat, "while", Slot::While, false, children, keys);
                take_into(repeat, "until", Slot::Until, false, children, keys);
            }
        }
        NodeKind::Action(ActionKind::Parallel) => {
            take_into(config, "parallel", Slot::Sequence, true, children, keys);
        }
        NodeKind::Action(ActionKind::Sequence) => {
            take_into(config, "sequence", Slot::Sequence, true, children, keys);
        }
        NodeKind::Action(ActionKind::CheckCondition) => {
            // A condition step may itself be a condition building block
            if ConditionKind::of(config).is_some_and(|condition| condition.is_building_block()) {
                take_into(config, "conditions", Slot::Conditions, true, children, keys);
            }
        }
        NodeKind::Condition(condition) if condition.is_building_block() => {
            take_into(config, "conditions", Slot::Conditions, true, children, keys);
        }
        _ => {}
    }
}

/// Lift one nested array out of a raw value into a child sequence
fn take_into(
    config: &mut Config,
    field: &str,
    slot: Slot,
    mandatory: bool,
    children: &mut BTreeMap<Slot, Sequence>,
    keys: &mut KeyGenerator,
) {
    let extractable = match config.get(field) {
        None => {
            if mandatory {
                children.insert(slot, Sequence::new());
            }
            return;
        }
        Some(Value::Array(items)) => items.iter().all(Value::is_object),
        // Malformed branch: leave the raw data for validation to flag
        Some(_) => false,
    };
    if !extractable {
        return;
    }

    let configs: Vec<Config> = match config.remove(field) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    children.insert(slot, decompose_all(slot.sort(), configs, keys));
}

fn write_children(kind: NodeKind, config: &mut Config, children: &BTreeMap<Slot, Sequence>) {
    match kind {
        NodeKind::Action(ActionKind::Choose) => {
            if let Some(Value::Array(options)) = config.get_mut("choose") {
                for (index, option) in options.iter_mut().enumerate() {
                    if let Value::Object(option) = option {
                        write_slot(option, "conditions", Slot::OptionConditions(index), children);
                        write_slot(option, "sequence", Slot::OptionSequence(index), children);
                    }
                }
            }
            write_slot(config, "default", Slot::Default, children);
        }
        NodeKind::Action(ActionKind::If) => {
            write_slot(config, "if", Slot::Conditions, children);
            write_slot(config, "then", Slot::Then, children);
            write_slot(config, "else", Slot::Else, children);
        }
        NodeKind::Action(ActionKind::Repeat) => {
            if let Some(Value::Object(repeat)) = config.get_mut("repeat") {
                write_slot(repeat, "sequence", Slot::Sequence, children);
                write_slot(repeat, "while", Slot::While, children);
                write_slot(repeat, "until", Slot::Until, children);
            }
        }
        NodeKind::Action(ActionKind::Parallel) => {
            write_slot(config, "parallel", Slot::Sequence, children);
        }
        NodeKind::Action(ActionKind::Sequence) => {
            write_slot(config, "sequence", Slot::Sequence, children);
        }
        NodeKind::Action(ActionKind::CheckCondition) => {
            write_slot(config, "conditions", Slot::Conditions, children);
        }
        NodeKind::Condition(condition) if condition.is_building_block() => {
            write_slot(config, "conditions", Slot::Conditions, children);
        }
        _ => {}
    }
}

fn write_slot(config: &mut Config, field: &str, slot: Slot, children: &BTreeMap<Slot, Sequence>) {
    if let Some(sequence) = children.get(&slot) {
        config.insert(field.to_string(), Value::Array(compose_all(sequence)));
    }
}

/// Append an empty option to a choose node
pub fn add_choose_option(node: &mut Node) {
    if let Some(Value::Array(options)) = node.config.get_mut("choose") {
        options.push(Value::Object(Config::new()));
        let index = options.len() - 1;
        node.children
            .insert(Slot::OptionConditions(index), Sequence::new());
        node.children
            .insert(Slot::OptionSequence(index), Sequence::new());
    }
}

/// Remove an option from a choose node, re-indexing later options
pub fn remove_choose_option(node: &mut Node, index: usize) {
    if let Some(Value::Array(options)) = node.config.get_mut("choose") {
        if index >= options.len() {
            return;
        }
        let count = options.len();
        options.remove(index);

        node.children.remove(&Slot::OptionConditions(index));
        node.children.remove(&Slot::OptionSequence(index));
        for later in index + 1..count {
            if let Some(sequence) = node.children.remove(&Slot::OptionConditions(later)) {
                node.children
                    .insert(Slot::OptionConditions(later - 1), sequence);
            }
            if let Some(sequence) = node.children.remove(&Slot::OptionSequence(later)) {
                node.children
                    .insert(Slot::OptionSequence(later - 1), sequence);
            }
        }
    }
}

/// Materialize an optional branch (`else`, `default`, ...) as an empty
/// child sequence so it can be edited
pub fn add_branch(node: &mut Node, slot: Slot) {
    node.children.entry(slot).or_default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> Config {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_leaf_has_no_children() {
        let mut keys = KeyGenerator::new("test");
        let node = decompose(NodeSort::Action, config(json!({"delay": "00:01:00"})), &mut keys);

        assert!(node.children.is_empty());
        assert_eq!(node.kind, Some(NodeKind::Action(ActionKind::Delay)));
    }

    #[test]
    fn test_if_branches_are_normalized() {
        let mut keys = KeyGenerator::new("test");
        // `then` is absent but mandatory; `else` is absent and optional
        let node = decompose(NodeSort::Action, config(json!({"if": []})), &mut keys);

        assert_eq!(node.children.get(&Slot::Conditions), Some(&Sequence::new()));
        assert_eq!(node.children.get(&Slot::Then), Some(&Sequence::new()));
        assert!(!node.children.contains_key(&Slot::Else));

        // Composition writes the normalized branches back
        let composed = compose_config(&node);
        assert_eq!(composed.get("if"), Some(&json!([])));
        assert_eq!(composed.get("then"), Some(&json!([])));
        assert!(!composed.contains_key("else"));
    }

    #[test]
    fn test_choose_options_decompose_independently() {
        let mut keys = KeyGenerator::new("test");
        let node = decompose(
            NodeSort::Action,
            config(json!({
                "choose": [
                    {
                        "conditions": [{"condition": "sun", "after": "sunset"}],
                        "sequence": [{"scene": "scene.evening"}]
                    },
                    {"conditions": [], "sequence": []}
                ],
                "default": [{"delay": "00:00:10"}]
            })),
            &mut keys,
        );

        assert_eq!(node.children[&Slot::OptionConditions(0)].len(), 1);
        assert_eq!(node.children[&Slot::OptionSequence(0)].len(), 1);
        assert_eq!(node.children[&Slot::OptionConditions(1)].len(), 0);
        assert_eq!(node.children[&Slot::Default].len(), 1);

        // Nested conditions resolve with the condition sort
        let sunset = &node.children[&Slot::OptionConditions(0)][0];
        assert_eq!(
            sunset.kind,
            Some(NodeKind::Condition(ConditionKind::Sun))
        );
    }

    #[test]
    fn test_compose_round_trips_structurally() {
        let raw = json!({
            "repeat": {
                "count": 3,
                "sequence": [
                    {"delay": "00:00:01"},
                    {"if": [], "then": [{"event": "ping", "event_data": {}}]}
                ]
            }
        });

        let mut keys = KeyGenerator::new("test");
        let node = decompose(NodeSort::Action, config(raw.clone()), &mut keys);
        assert_eq!(compose(&node), raw);
    }

    #[test]
    fn test_malformed_branch_is_left_in_place() {
        let mut keys = KeyGenerator::new("test");
        let raw = json!({"sequence": ["not a mapping"]});
        let node = decompose(NodeSort::Action, config(raw.clone()), &mut keys);

        // No child sequence was lifted; the raw data survives composition
        assert!(!node.children.contains_key(&Slot::Sequence));
        assert_eq!(compose(&node), raw);
    }

    #[test]
    fn test_nested_building_block_condition_step() {
        let mut keys = KeyGenerator::new("test");
        let node = decompose(
            NodeSort::Action,
            config(json!({
                "condition": "or",
                "conditions": [
                    {"condition": "state", "entity_id": "light.porch", "state": "on"}
                ]
            })),
            &mut keys,
        );

        assert_eq!(node.kind, Some(NodeKind::Action(ActionKind::CheckCondition)));
        assert_eq!(node.children[&Slot::Conditions].len(), 1);
    }

    #[test]
    fn test_add_and_remove_choose_option() {
        let mut keys = KeyGenerator::new("test");
        let mut node = decompose(NodeSort::Action, config(json!({"choose": []})), &mut keys);

        add_choose_option(&mut node);
        add_choose_option(&mut node);
        node.children
            .get_mut(&Slot::OptionSequence(1))
            .unwrap()
            .push(decompose(
                NodeSort::Action,
                config(json!({"delay": ""})),
                &mut keys,
            ));

        remove_choose_option(&mut node, 0);

        // The second option shifted down and kept its contents
        assert_eq!(node.children[&Slot::OptionSequence(0)].len(), 1);
        assert!(!node.children.contains_key(&Slot::OptionSequence(1)));

        let composed = compose_config(&node);
        let options = composed.get("choose").and_then(Value::as_array).unwrap();
        assert_eq!(options.len(), 1);
    }
}
