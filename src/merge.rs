//! Deep-merge of variable mappings.

use serde_yaml::{Mapping, Value};

/// Combine two variable mappings, with `b` taking precedence.
///
/// Nested mappings merge recursively key-by-key. For any other conflict
/// (scalar vs scalar, sequence vs sequence, or mixed kinds) the value from
/// `b` replaces the value from `a` wholesale. Keys keep the insertion order
/// of `a`, with keys new in `b` appended in their own order.
pub fn combine_vars(a: Mapping, b: Mapping) -> Mapping {
    let mut merged = a;

    for (key, value) in b {
        if let Some(slot) = merged.get_mut(&key) {
            let existing = std::mem::take(slot);
            *slot = match (existing, value) {
                (Value::Mapping(inner_a), Value::Mapping(inner_b)) => {
                    Value::Mapping(combine_vars(inner_a, inner_b))
                }
                (_, incoming) => incoming,
            };
        } else {
            merged.insert(key, value);
        }
    }

    merged
}
