use serde::{Deserialize, Serialize};

/// Declarative field list for one node variant
///
/// Supplied per variant by the registry; hosts may extend it with
/// capability-fetched fields for device-linked variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

/// One field descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub required: bool,
    pub shape: Shape,
}

/// Allowed shape of a field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    String,
    Boolean,
    Integer,
    Number,
    /// Closed set of string values
    Enum(Vec<String>),
    /// Nested object with its own field list
    Object(Vec<Field>),
    /// Homogeneous list
    List(Box<Shape>),
    /// Any of several alternatives
    Union(Vec<Shape>),
    /// Unconstrained
    Any,
}

impl Shape {
    /// Short name used in failure messages
    pub fn name(&self) -> String {
        match self {
            Shape::String => "string".to_string(),
            Shape::Boolean => "boolean".to_string(),
            Shape::Integer => "integer".to_string(),
            Shape::Number => "number".to_string(),
            Shape::Enum(options) => options.join(" | "),
            Shape::Object(_) => "object".to_string(),
            Shape::List(inner) => format!("list of {}", inner.name()),
            Shape::Union(alternatives) => alternatives
                .iter()
                .map(Shape::name)
                .collect::<Vec<_>>()
                .join(" | "),
            Shape::Any => "any".to_string(),
        }
    }
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Merge capability-fetched fields into the schema
    ///
    /// A field with the same name replaces the existing descriptor;
    /// new names are appended.
    pub fn extend(&mut self, extra: Vec<Field>) {
        for field in extra {
            match self.fields.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => *existing = field,
                None => self.fields.push(field),
            }
        }
    }
}

impl Field {
    pub fn required(name: &str, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            required: true,
            shape,
        }
    }

    pub fn optional(name: &str, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            shape,
        }
    }
}
