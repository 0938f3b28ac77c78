//! Homogeneous list validation.
//!
//! Decides whether a bound value can travel as one array parameter. A
//! rejection is never an error: the caller keeps the original node.

use crate::ast::{ElemKind, Value};

/// Element type shared by every member of an accepted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Primitive(ElemKind),
    /// A [`BindValue`](crate::ast::BindValue) type, by concrete type name.
    Custom(&'static str),
}

/// Why a value or list was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The value is a scalar, not a sequence.
    NotSequence(&'static str),
    Empty,
    Mixed {
        first: &'static str,
        other: &'static str,
    },
    Unsupported(&'static str),
    /// The fragment does not carry exactly one parameter.
    ParamCount(usize),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::NotSequence(ty) => write!(f, "{} is not a sequence", ty),
            Rejection::Empty => write!(f, "empty list"),
            Rejection::Mixed { first, other } => {
                write!(f, "mixed element types {} and {}", first, other)
            }
            Rejection::Unsupported(ty) => write!(f, "unsupported element type {}", ty),
            Rejection::ParamCount(n) => write!(f, "expected 1 parameter, found {}", n),
        }
    }
}

/// Validate the single value bound to a matched `IN (?)` fragment.
///
/// Typed arrays carry their element kind; loose lists must pass
/// [`homogeneous_type`].
pub fn sequence_element_type(value: &Value) -> Result<ElementType, Rejection> {
    match value {
        Value::Array(array) if array.is_empty() => Err(Rejection::Empty),
        Value::Array(array) => Ok(ElementType::Primitive(array.kind())),
        Value::List(items) => homogeneous_type(items),
        other => Err(Rejection::NotSequence(other.type_name())),
    }
}

/// Check that every value has the identical concrete type, and that the
/// type is supported. No coercion is attempted.
pub fn homogeneous_type(values: &[Value]) -> Result<ElementType, Rejection> {
    let first = values.first().ok_or(Rejection::Empty)?;
    let first_name = first.type_name();
    if let Some(other) = values.iter().find(|v| v.type_name() != first_name) {
        return Err(Rejection::Mixed {
            first: first_name,
            other: other.type_name(),
        });
    }
    element_type(first)
}

fn element_type(value: &Value) -> Result<ElementType, Rejection> {
    match value {
        Value::Custom(custom) => Ok(ElementType::Custom(custom.type_name())),
        other => other
            .kind()
            .map(ElementType::Primitive)
            .ok_or(Rejection::Unsupported(other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BindValue;

    #[derive(Debug)]
    struct Sku(&'static str);

    impl BindValue for Sku {
        fn bind_value(&self) -> Value {
            Value::from(self.0)
        }
    }

    #[test]
    fn test_typed_array_is_accepted() {
        assert_eq!(
            sequence_element_type(&Value::from(vec![1i64, 2, 3])),
            Ok(ElementType::Primitive(ElemKind::Int64))
        );
        assert_eq!(
            sequence_element_type(&Value::from(vec![true])),
            Ok(ElementType::Primitive(ElemKind::Bool))
        );
    }

    #[test]
    fn test_empty_is_rejected() {
        assert_eq!(
            sequence_element_type(&Value::from(Vec::<i64>::new())),
            Err(Rejection::Empty)
        );
        assert_eq!(homogeneous_type(&[]), Err(Rejection::Empty));
    }

    #[test]
    fn test_scalar_is_not_a_sequence() {
        assert_eq!(
            sequence_element_type(&Value::Int64(1)),
            Err(Rejection::NotSequence("int64"))
        );
        assert_eq!(
            sequence_element_type(&Value::opaque(vec![1i64])),
            Err(Rejection::NotSequence("opaque"))
        );
    }

    #[test]
    fn test_mixed_list_is_rejected() {
        let list = vec![Value::Int64(1), Value::from("a")];
        assert_eq!(
            sequence_element_type(&Value::List(list)),
            Err(Rejection::Mixed {
                first: "int64",
                other: "text"
            })
        );

        // Same numeric value, different width: still mixed.
        let widths = [Value::Int32(1), Value::Int64(1)];
        assert!(matches!(homogeneous_type(&widths), Err(Rejection::Mixed { .. })));
    }

    #[test]
    fn test_unsupported_element_types() {
        assert_eq!(
            homogeneous_type(&[Value::Null, Value::Null]),
            Err(Rejection::Unsupported("null"))
        );
        let nested = [Value::from(vec![1i64]), Value::from(vec![2i64])];
        assert_eq!(homogeneous_type(&nested), Err(Rejection::Unsupported("int64[]")));
    }

    #[test]
    fn test_custom_values_opt_in() {
        let skus = [Value::custom(Sku("a-1")), Value::custom(Sku("b-2"))];
        match homogeneous_type(&skus) {
            Ok(ElementType::Custom(name)) => assert!(name.ends_with("Sku")),
            other => panic!("unexpected {:?}", other),
        }

        let mixed = [Value::custom(Sku("a-1")), Value::from("b-2")];
        assert!(matches!(homogeneous_type(&mixed), Err(Rejection::Mixed { .. })));
    }
}
