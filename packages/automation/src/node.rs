use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Raw attribute map of a node, excluding nested child sequences
pub type Config = Map<String, Value>;

/// Whether a sequence holds automation steps or boolean checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeSort {
    Action,
    Condition,
}

/// Action variants, discriminated by presence of a unique key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Service,
    Delay,
    Wait,
    Event,
    Scene,
    Device,
    Stop,
    Variables,
    WaitForTrigger,
    CheckCondition,
    Choose,
    If,
    Repeat,
    Parallel,
    Sequence,
}

impl ActionKind {
    pub const ALL: [ActionKind; 15] = [
        ActionKind::Service,
        ActionKind::Delay,
        ActionKind::Wait,
        ActionKind::Event,
        ActionKind::Scene,
        ActionKind::Device,
        ActionKind::Stop,
        ActionKind::Variables,
        ActionKind::WaitForTrigger,
        ActionKind::CheckCondition,
        ActionKind::Choose,
        ActionKind::If,
        ActionKind::Repeat,
        ActionKind::Parallel,
        ActionKind::Sequence,
    ];

    pub fn type_key(&self) -> &'static str {
        match self {
            ActionKind::Service => "service",
            ActionKind::Delay => "delay",
            ActionKind::Wait => "wait_template",
            ActionKind::Event => "event",
            ActionKind::Scene => "scene",
            ActionKind::Device => "device_id",
            ActionKind::Stop => "stop",
            ActionKind::Variables => "variables",
            ActionKind::WaitForTrigger => "wait_for_trigger",
            ActionKind::CheckCondition => "condition",
            ActionKind::Choose => "choose",
            ActionKind::If => "if",
            ActionKind::Repeat => "repeat",
            ActionKind::Parallel => "parallel",
            ActionKind::Sequence => "sequence",
        }
    }

    /// Resolve the variant of an action value from its shape
    ///
    /// Checked in a fixed order; the first uniquely-identifying key wins.
    /// Returns `None` for shapes with no recognizable discriminant.
    pub fn of(config: &Config) -> Option<ActionKind> {
        if config.contains_key("delay") {
            Some(ActionKind::Delay)
        } else if config.contains_key("wait_template") {
            Some(ActionKind::Wait)
        } else if config.contains_key("condition") {
            Some(ActionKind::CheckCondition)
        } else if config.contains_key("event") {
            Some(ActionKind::Event)
        } else if config.contains_key("scene") {
            Some(ActionKind::Scene)
        } else if config.contains_key("stop") {
            Some(ActionKind::Stop)
        } else if config.contains_key("variables") {
            Some(ActionKind::Variables)
        } else if config.contains_key("wait_for_trigger") {
            Some(ActionKind::WaitForTrigger)
        } else if config.contains_key("repeat") {
            Some(ActionKind::Repeat)
        } else if config.contains_key("choose") {
            Some(ActionKind::Choose)
        } else if config.contains_key("if") {
            Some(ActionKind::If)
        } else if config.contains_key("parallel") {
            Some(ActionKind::Parallel)
        } else if config.contains_key("sequence") {
            Some(ActionKind::Sequence)
        } else if config.contains_key("device_id") {
            Some(ActionKind::Device)
        } else if config.contains_key("service") || config.contains_key("action") {
            Some(ActionKind::Service)
        } else {
            None
        }
    }

    /// Building blocks carry one or more nested node sequences
    pub fn is_building_block(&self) -> bool {
        matches!(
            self,
            ActionKind::Choose
                | ActionKind::If
                | ActionKind::Repeat
                | ActionKind::Parallel
                | ActionKind::Sequence
        )
    }
}

/// Condition variants, discriminated by the explicit `condition` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    State,
    NumericState,
    Sun,
    Zone,
    Time,
    Template,
    Device,
    Trigger,
    And,
    Or,
    Not,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 11] = [
        ConditionKind::State,
        ConditionKind::NumericState,
        ConditionKind::Sun,
        ConditionKind::Zone,
        ConditionKind::Time,
        ConditionKind::Template,
        ConditionKind::Device,
        ConditionKind::Trigger,
        ConditionKind::And,
        ConditionKind::Or,
        ConditionKind::Not,
    ];

    pub fn type_key(&self) -> &'static str {
        match self {
            ConditionKind::State => "state",
            ConditionKind::NumericState => "numeric_state",
            ConditionKind::Sun => "sun",
            ConditionKind::Zone => "zone",
            ConditionKind::Time => "time",
            ConditionKind::Template => "template",
            ConditionKind::Device => "device",
            ConditionKind::Trigger => "trigger",
            ConditionKind::And => "and",
            ConditionKind::Or => "or",
            ConditionKind::Not => "not",
        }
    }

    pub fn from_key(key: &str) -> Option<ConditionKind> {
        ConditionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.type_key() == key)
    }

    pub fn of(config: &Config) -> Option<ConditionKind> {
        config
            .get("condition")
            .and_then(Value::as_str)
            .and_then(ConditionKind::from_key)
    }

    pub fn is_building_block(&self) -> bool {
        matches!(
            self,
            ConditionKind::And | ConditionKind::Or | ConditionKind::Not
        )
    }
}

/// Resolved variant of a node, with its sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Action(ActionKind),
    Condition(ConditionKind),
}

impl NodeKind {
    /// Structurally discriminate a value within a sequence of the given sort
    pub fn of(sort: NodeSort, config: &Config) -> Option<NodeKind> {
        match sort {
            NodeSort::Action => ActionKind::of(config).map(NodeKind::Action),
            NodeSort::Condition => ConditionKind::of(config).map(NodeKind::Condition),
        }
    }

    pub fn type_key(&self) -> &'static str {
        match self {
            NodeKind::Action(kind) => kind.type_key(),
            NodeKind::Condition(kind) => kind.type_key(),
        }
    }

    pub fn sort(&self) -> NodeSort {
        match self {
            NodeKind::Action(_) => NodeSort::Action,
            NodeKind::Condition(_) => NodeSort::Condition,
        }
    }

    pub fn is_building_block(&self) -> bool {
        match self {
            NodeKind::Action(kind) => kind.is_building_block(),
            NodeKind::Condition(kind) => kind.is_building_block(),
        }
    }
}

/// Nested-sequence positions a building block can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// The main nested sequence (`sequence`, `parallel`, `repeat.sequence`)
    Sequence,
    /// `if.then`
    Then,
    /// `if.else`
    Else,
    /// `choose.default`
    Default,
    /// Condition list of an `if` action or an and/or/not condition
    Conditions,
    /// `repeat.while`
    While,
    /// `repeat.until`
    Until,
    /// Conditions of the n-th `choose` option
    OptionConditions(usize),
    /// Sequence of the n-th `choose` option
    OptionSequence(usize),
}

impl Slot {
    /// Sort of the nodes a slot contains
    pub fn sort(&self) -> NodeSort {
        match self {
            Slot::Conditions | Slot::While | Slot::Until | Slot::OptionConditions(_) => {
                NodeSort::Condition
            }
            Slot::Sequence | Slot::Then | Slot::Else | Slot::Default | Slot::OptionSequence(_) => {
                NodeSort::Action
            }
        }
    }
}

/// One node of the editing tree
///
/// `key` is the identity token used to correlate UI state across
/// mutations; it is minted once and never serialized into the value.
/// `children` holds the nested sequences of building-block variants,
/// keyed by slot; leaf variants have no children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub key: String,
    pub kind: Option<NodeKind>,
    pub config: Config,
    pub children: BTreeMap<Slot, Sequence>,
}

/// An ordered list of nodes; order is execution/evaluation order
pub type Sequence = Vec<Node>;

impl Node {
    /// Human alias, if set
    pub fn alias(&self) -> Option<&str> {
        self.config.get("alias").and_then(Value::as_str)
    }

    pub fn set_alias(&mut self, alias: Option<&str>) {
        match alias {
            Some(text) if !text.is_empty() => {
                self.config
                    .insert("alias".to_string(), Value::String(text.to_string()));
            }
            _ => {
                self.config.remove("alias");
            }
        }
    }

    /// Enabled flag; absent means enabled
    pub fn enabled(&self) -> bool {
        self.config
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config
            .insert("enabled".to_string(), Value::Bool(enabled));
    }

    pub fn type_key(&self) -> Option<&'static str> {
        self.kind.map(|kind| kind.type_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: serde_json::Value) -> Config {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_action_discrimination() {
        assert_eq!(
            ActionKind::of(&config(json!({"delay": "00:01:00"}))),
            Some(ActionKind::Delay)
        );
        assert_eq!(
            ActionKind::of(&config(json!({"service": "light.turn_on"}))),
            Some(ActionKind::Service)
        );
        // The modern `action` spelling resolves to the same variant
        assert_eq!(
            ActionKind::of(&config(json!({"action": "light.turn_on"}))),
            Some(ActionKind::Service)
        );
        assert_eq!(
            ActionKind::of(&config(json!({"choose": [], "default": []}))),
            Some(ActionKind::Choose)
        );
        assert_eq!(
            ActionKind::of(&config(json!({"condition": "state", "entity_id": "a.b"}))),
            Some(ActionKind::CheckCondition)
        );
        assert_eq!(ActionKind::of(&config(json!({"unknown_key": 1}))), None);
    }

    #[test]
    fn test_condition_discrimination() {
        assert_eq!(
            ConditionKind::of(&config(json!({"condition": "numeric_state"}))),
            Some(ConditionKind::NumericState)
        );
        assert_eq!(
            ConditionKind::of(&config(json!({"condition": "frobnicate"}))),
            None
        );
        // Missing discriminant field
        assert_eq!(ConditionKind::of(&config(json!({"entity_id": "a.b"}))), None);
    }

    #[test]
    fn test_enabled_defaults_to_true() {
        let node = Node {
            key: "k-1".to_string(),
            kind: Some(NodeKind::Action(ActionKind::Delay)),
            config: config(json!({"delay": ""})),
            children: BTreeMap::new(),
        };
        assert!(node.enabled());
    }

    #[test]
    fn test_alias_set_and_clear() {
        let mut node = Node {
            key: "k-1".to_string(),
            kind: Some(NodeKind::Action(ActionKind::Delay)),
            config: config(json!({"delay": ""})),
            children: BTreeMap::new(),
        };

        node.set_alias(Some("Wait a minute"));
        assert_eq!(node.alias(), Some("Wait a minute"));

        // Empty string clears the alias entirely
        node.set_alias(Some(""));
        assert_eq!(node.alias(), None);
        assert!(!node.config.contains_key("alias"));
    }

    #[test]
    fn test_slot_sorts() {
        assert_eq!(Slot::Conditions.sort(), NodeSort::Condition);
        assert_eq!(Slot::OptionConditions(3).sort(), NodeSort::Condition);
        assert_eq!(Slot::Then.sort(), NodeSort::Action);
        assert_eq!(Slot::OptionSequence(0).sort(), NodeSort::Action);
    }
}
