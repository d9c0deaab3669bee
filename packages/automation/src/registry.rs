//! # Node Registry
//!
//! Maps a type discriminator to its default configuration, structural
//! schema, and form-editor capability. Unknown type keys resolve to
//! nothing; the editor treats them as unsupported and holds the node in
//! text mode.

use crate::node::{ActionKind, Config, ConditionKind, NodeKind, NodeSort};
use crate::schema::{Field, Schema, Shape};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Per-variant behavior record
#[derive(Debug, Clone)]
pub struct Descriptor {
    type_key: &'static str,
    has_form_editor: bool,
    schema: Schema,
    default_template: Value,
}

impl Descriptor {
    pub fn type_key(&self) -> &'static str {
        self.type_key
    }

    /// Whether a structured form exists for this variant
    pub fn has_form_editor(&self) -> bool {
        self.has_form_editor
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// A fresh, independent default configuration
    pub fn default_config(&self) -> Config {
        match self.default_template.clone() {
            Value::Object(map) => map,
            _ => Config::new(),
        }
    }
}

/// Registry of all known variants, keyed by sort and type key
#[derive(Debug)]
pub struct Registry {
    actions: HashMap<&'static str, Descriptor>,
    conditions: HashMap<&'static str, Descriptor>,
}

impl Registry {
    pub fn new() -> Self {
        let mut actions = HashMap::new();
        for kind in ActionKind::ALL {
            let descriptor = action_descriptor(kind);
            actions.insert(descriptor.type_key, descriptor);
        }

        let mut conditions = HashMap::new();
        for kind in ConditionKind::ALL {
            let descriptor = condition_descriptor(kind);
            conditions.insert(descriptor.type_key, descriptor);
        }

        Self {
            actions,
            conditions,
        }
    }

    pub fn lookup(&self, sort: NodeSort, type_key: &str) -> Option<&Descriptor> {
        match sort {
            NodeSort::Action => self.actions.get(type_key),
            NodeSort::Condition => self.conditions.get(type_key),
        }
    }

    pub fn lookup_kind(&self, kind: NodeKind) -> Option<&Descriptor> {
        self.lookup(kind.sort(), kind.type_key())
    }

    /// Resolve the descriptor for a concrete value
    ///
    /// A condition used as an action step is dispatched to the condition
    /// table, so it is validated against the schema of the condition it
    /// actually holds.
    pub fn descriptor_for(&self, sort: NodeSort, config: &Config) -> Option<&Descriptor> {
        let kind = NodeKind::of(sort, config)?;
        match kind {
            NodeKind::Action(ActionKind::CheckCondition) => ConditionKind::of(config)
                .and_then(|condition| self.lookup(NodeSort::Condition, condition.type_key())),
            other => self.lookup_kind(other),
        }
    }

    /// All type keys registered for a sort
    pub fn type_keys(&self, sort: NodeSort) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = match sort {
            NodeSort::Action => self.actions.keys().copied().collect(),
            NodeSort::Condition => self.conditions.keys().copied().collect(),
        };
        keys.sort_unstable();
        keys
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Duration: template string, seconds, or an hours/minutes/seconds object
fn duration_shape() -> Shape {
    Shape::Union(vec![
        Shape::String,
        Shape::Number,
        Shape::Object(vec![
            Field::optional("hours", Shape::Number),
            Field::optional("minutes", Shape::Number),
            Field::optional("seconds", Shape::Number),
            Field::optional("milliseconds", Shape::Number),
        ]),
    ])
}

fn entity_list_shape() -> Shape {
    Shape::Union(vec![Shape::String, Shape::List(Box::new(Shape::String))])
}

fn weekday_shape() -> Shape {
    let days: Vec<String> = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"]
        .iter()
        .map(|day| day.to_string())
        .collect();
    Shape::Union(vec![
        Shape::Enum(days.clone()),
        Shape::List(Box::new(Shape::Enum(days))),
    ])
}

fn sun_event_shape() -> Shape {
    Shape::Enum(vec!["sunrise".to_string(), "sunset".to_string()])
}

fn action_descriptor(kind: ActionKind) -> Descriptor {
    match kind {
        ActionKind::Service => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::optional("service", Shape::String),
                Field::optional("action", Shape::String),
                Field::optional("entity_id", entity_list_shape()),
                Field::optional("target", Shape::Any),
                Field::optional("data", Shape::Any),
                Field::optional("response_variable", Shape::String),
            ]),
            default_template: json!({"service": "", "data": {}}),
        },
        ActionKind::Delay => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![Field::required("delay", duration_shape())]),
            default_template: json!({"delay": ""}),
        },
        ActionKind::Wait => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::required("wait_template", Shape::String),
                Field::optional("timeout", duration_shape()),
                Field::optional("continue_on_timeout", Shape::Boolean),
            ]),
            default_template: json!({"wait_template": ""}),
        },
        ActionKind::Event => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::required("event", Shape::String),
                Field::optional("event_data", Shape::Any),
            ]),
            default_template: json!({"event": "", "event_data": {}}),
        },
        ActionKind::Scene => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![Field::required("scene", Shape::String)]),
            default_template: json!({"scene": ""}),
        },
        ActionKind::Device => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            // Device actions grow extra fields once capabilities are
            // fetched; the base schema covers the linkage only.
            schema: Schema::new(vec![
                Field::required("device_id", Shape::String),
                Field::optional("domain", Shape::String),
                Field::optional("type", Shape::String),
                Field::optional("entity_id", Shape::String),
            ]),
            default_template: json!({"device_id": ""}),
        },
        ActionKind::Stop => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::required("stop", Shape::String),
                Field::optional("error", Shape::Boolean),
                Field::optional("response_variable", Shape::String),
            ]),
            default_template: json!({"stop": ""}),
        },
        ActionKind::Variables => Descriptor {
            type_key: kind.type_key(),
            // Free-form template data; no structured form exists
            has_form_editor: false,
            schema: Schema::new(vec![Field::required("variables", Shape::Any)]),
            default_template: json!({"variables": {}}),
        },
        ActionKind::WaitForTrigger => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::required("wait_for_trigger", Shape::List(Box::new(Shape::Any))),
                Field::optional("timeout", duration_shape()),
                Field::optional("continue_on_timeout", Shape::Boolean),
            ]),
            default_template: json!({"wait_for_trigger": []}),
        },
        ActionKind::CheckCondition => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            // Values are re-dispatched to the held condition's schema via
            // `descriptor_for`; this schema covers only the default.
            schema: Schema::new(vec![
                Field::required("entity_id", entity_list_shape()),
                Field::required("state", Shape::Union(vec![Shape::String, Shape::Number])),
            ]),
            default_template: json!({"condition": "state", "entity_id": "", "state": ""}),
        },
        ActionKind::Choose => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::required(
                    "choose",
                    Shape::List(Box::new(Shape::Object(vec![
                        Field::optional("alias", Shape::String),
                        Field::optional("conditions", Shape::List(Box::new(Shape::Any))),
                        Field::optional("sequence", Shape::List(Box::new(Shape::Any))),
                    ]))),
                ),
                Field::optional("default", Shape::List(Box::new(Shape::Any))),
            ]),
            default_template: json!({"choose": []}),
        },
        ActionKind::If => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::required("if", Shape::List(Box::new(Shape::Any))),
                Field::required("then", Shape::List(Box::new(Shape::Any))),
                Field::optional("else", Shape::List(Box::new(Shape::Any))),
            ]),
            default_template: json!({"if": [], "then": []}),
        },
        ActionKind::Repeat => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![Field::required(
                "repeat",
                Shape::Object(vec![
                    Field::optional("count", Shape::Union(vec![Shape::Integer, Shape::String])),
                    Field::optional("while", Shape::List(Box::new(Shape::Any))),
                    Field::optional("until", Shape::List(Box::new(Shape::Any))),
                    Field::optional("for_each", Shape::Any),
                    Field::required("sequence", Shape::List(Box::new(Shape::Any))),
                ]),
            )]),
            default_template: json!({"repeat": {"count": 2, "sequence": []}}),
        },
        ActionKind::Parallel => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![Field::required(
                "parallel",
                Shape::List(Box::new(Shape::Any)),
            )]),
            default_template: json!({"parallel": []}),
        },
        ActionKind::Sequence => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![Field::required(
                "sequence",
                Shape::List(Box::new(Shape::Any)),
            )]),
            default_template: json!({"sequence": []}),
        },
    }
}

fn condition_descriptor(kind: ConditionKind) -> Descriptor {
    match kind {
        ConditionKind::State => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::required("entity_id", entity_list_shape()),
                Field::required(
                    "state",
                    Shape::Union(vec![
                        Shape::String,
                        Shape::Number,
                        Shape::List(Box::new(Shape::String)),
                    ]),
                ),
                Field::optional("attribute", Shape::String),
                Field::optional("for", duration_shape()),
            ]),
            default_template: json!({"condition": "state", "entity_id": "", "state": ""}),
        },
        ConditionKind::NumericState => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::required("entity_id", entity_list_shape()),
                Field::optional("above", Shape::Union(vec![Shape::Number, Shape::String])),
                Field::optional("below", Shape::Union(vec![Shape::Number, Shape::String])),
                Field::optional("attribute", Shape::String),
                Field::optional("value_template", Shape::String),
            ]),
            default_template: json!({"condition": "numeric_state", "entity_id": ""}),
        },
        ConditionKind::Sun => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::optional("before", sun_event_shape()),
                Field::optional("after", sun_event_shape()),
                Field::optional("before_offset", Shape::String),
                Field::optional("after_offset", Shape::String),
            ]),
            default_template: json!({"condition": "sun"}),
        },
        ConditionKind::Zone => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::required("entity_id", entity_list_shape()),
                Field::required("zone", Shape::String),
            ]),
            default_template: json!({"condition": "zone", "entity_id": "", "zone": ""}),
        },
        ConditionKind::Time => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::optional("after", Shape::String),
                Field::optional("before", Shape::String),
                Field::optional("weekday", weekday_shape()),
            ]),
            default_template: json!({"condition": "time"}),
        },
        ConditionKind::Template => Descriptor {
            type_key: kind.type_key(),
            // Template conditions are free text; editing happens in text
            // mode only.
            has_form_editor: false,
            schema: Schema::new(vec![Field::required("value_template", Shape::String)]),
            default_template: json!({"condition": "template", "value_template": ""}),
        },
        ConditionKind::Device => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![
                Field::required("device_id", Shape::String),
                Field::optional("domain", Shape::String),
                Field::optional("type", Shape::String),
                Field::optional("entity_id", Shape::String),
            ]),
            default_template: json!({"condition": "device", "device_id": ""}),
        },
        ConditionKind::Trigger => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![Field::required("id", entity_list_shape())]),
            default_template: json!({"condition": "trigger", "id": ""}),
        },
        ConditionKind::And | ConditionKind::Or | ConditionKind::Not => Descriptor {
            type_key: kind.type_key(),
            has_form_editor: true,
            schema: Schema::new(vec![Field::required(
                "conditions",
                Shape::List(Box::new(Shape::Any)),
            )]),
            default_template: json!({"condition": kind.type_key(), "conditions": []}),
        },
    }
}
