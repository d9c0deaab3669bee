pub mod codec;
pub mod id;
pub mod node;
pub mod registry;
pub mod schema;
pub mod validate;

pub use codec::{Codec, CodecError, CodecResult, JsonCodec};
pub use id::{scope_id, KeyGenerator};
pub use node::{ActionKind, Config, ConditionKind, Node, NodeKind, NodeSort, Sequence, Slot};
pub use registry::{Descriptor, Registry};
pub use schema::{Field, Schema, Shape};
pub use validate::{validate, Failure, FailureKind, ValidationResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_and_discriminant_agree() {
        let registry = Registry::new();
        for sort in [NodeSort::Action, NodeSort::Condition] {
            for key in registry.type_keys(sort) {
                let config = registry.lookup(sort, key).unwrap().default_config();
                let kind = NodeKind::of(sort, &config).expect("default config must discriminate");
                assert_eq!(kind.type_key(), key);
            }
        }
    }
}
