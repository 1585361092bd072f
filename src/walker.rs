//! Shape-preserving resolution of secret references in a document tree.

use serde_yaml::{Mapping, Value};

use crate::backend::SecretBackend;
use crate::error::VarsError;

/// Nesting depth past which resolution fails instead of risking the call
/// stack. Far beyond anything a hand-written vars file reaches.
const MAX_DEPTH: usize = 128;

/// Resolve every scalar leaf of `node` through the secret backend.
///
/// Mappings keep their keys and insertion order, sequences keep their length
/// and order; only scalar leaves are replaced. Scalars that are not strings
/// (booleans, numbers, null) are rendered to their string form and looked up
/// like any other reference.
pub fn resolve_tree(node: Value, backend: &dyn SecretBackend) -> Result<Value, VarsError> {
    resolve_at(node, backend, 0)
}

fn resolve_at(node: Value, backend: &dyn SecretBackend, depth: usize) -> Result<Value, VarsError> {
    if depth > MAX_DEPTH {
        return Err(VarsError::Unexpected {
            message: format!("vars document nested deeper than {MAX_DEPTH} levels"),
        });
    }

    match node {
        Value::Mapping(mapping) => {
            let mut resolved = Mapping::with_capacity(mapping.len());
            for (key, value) in mapping {
                resolved.insert(key, resolve_at(value, backend, depth + 1)?);
            }
            Ok(Value::Mapping(resolved))
        }
        Value::Sequence(sequence) => {
            let mut resolved = Vec::with_capacity(sequence.len());
            for item in sequence {
                resolved.push(resolve_at(item, backend, depth + 1)?);
            }
            Ok(Value::Sequence(resolved))
        }
        scalar => {
            let reference = reference_of(&scalar);
            Ok(Value::String(backend.read(&reference)?))
        }
    }
}

/// Render a scalar leaf to the reference string passed to the backend.
fn reference_of(scalar: &Value) -> String {
    match scalar {
        Value::String(reference) => reference.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|rendered| rendered.trim_end().to_string())
            .unwrap_or_default(),
    }
}
