use std::sync::Arc;

use crate::ast::{ElemKind, TypedArray};

/// An application type that knows how to turn itself into a bindable value.
///
/// Implementing this lets opaque types take part in list rewriting without
/// the codec knowing about them.
pub trait BindValue: std::fmt::Debug + Send + Sync {
    /// The value bound in place of this one.
    fn bind_value(&self) -> Value;

    /// Concrete type name, compared when checking that a list is homogeneous.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a [`BindValue`].
#[derive(Clone)]
pub struct CustomValue(Arc<dyn BindValue>);

impl CustomValue {
    pub fn new<T: BindValue + 'static>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    pub fn bind_value(&self) -> Value {
        self.0.bind_value()
    }
}

impl std::fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.bind_value() == other.bind_value()
    }
}

/// Wraps a value that must be bound as exactly one parameter.
///
/// Statement builders check for this before their "sequence → one
/// placeholder per element" rule, so the whole array travels as a single
/// argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Opaque(Box<Value>);

impl Opaque {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Box::new(value.into()))
    }

    /// The wrapped value, unexpanded.
    pub fn get(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        *self.0
    }
}

/// A loosely typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    /// Binary data (bytea)
    Bytes(Vec<u8>),
    /// A typed sequence; every element has the same kind.
    Array(TypedArray),
    /// A list whose elements are typed independently.
    List(Vec<Value>),
    Custom(CustomValue),
    Opaque(Opaque),
}

impl Value {
    pub fn custom<T: BindValue + 'static>(value: T) -> Self {
        Value::Custom(CustomValue::new(value))
    }

    pub fn opaque(value: impl Into<Value>) -> Self {
        Value::Opaque(Opaque::new(value))
    }

    /// Primitive kind of a scalar value, `None` for anything else.
    pub fn kind(&self) -> Option<ElemKind> {
        let kind = match self {
            Value::Bool(_) => ElemKind::Bool,
            Value::Int8(_) => ElemKind::Int8,
            Value::Int16(_) => ElemKind::Int16,
            Value::Int32(_) => ElemKind::Int32,
            Value::Int64(_) => ElemKind::Int64,
            Value::Uint8(_) => ElemKind::Uint8,
            Value::Uint16(_) => ElemKind::Uint16,
            Value::Uint32(_) => ElemKind::Uint32,
            Value::Uint64(_) => ElemKind::Uint64,
            Value::Float32(_) => ElemKind::Float32,
            Value::Float64(_) => ElemKind::Float64,
            Value::String(_) => ElemKind::String,
            _ => return None,
        };
        Some(kind)
    }

    /// Name of the concrete type held, as shown in errors and logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bytes(_) => "bytes",
            Value::Array(array) => array.kind().array_name(),
            Value::List(_) => "list",
            Value::Custom(custom) => custom.type_name(),
            Value::Opaque(_) => "opaque",
            scalar => scalar.kind().map(ElemKind::name).unwrap_or("unknown"),
        }
    }

    /// Ordered, indexable, and not a single scalar.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Array(_) | Value::List(_))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int8(n) => write!(f, "{}", n),
            Value::Int16(n) => write!(f, "{}", n),
            Value::Int32(n) => write!(f, "{}", n),
            Value::Int64(n) => write!(f, "{}", n),
            Value::Uint8(n) => write!(f, "{}", n),
            Value::Uint16(n) => write!(f, "{}", n),
            Value::Uint32(n) => write!(f, "{}", n),
            Value::Uint64(n) => write!(f, "{}", n),
            Value::Float32(n) => write!(f, "{}", n),
            Value::Float64(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "'{}'", s),
            Value::Bytes(bytes) => {
                write!(f, "'\\x")?;
                for byte in bytes {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, "'")
            }
            Value::Array(array) => write!(f, "'{}'", crate::codec::encode_array(array)),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
            Value::Custom(custom) => write!(f, "{}", custom.bind_value()),
            Value::Opaque(opaque) => write!(f, "{}", opaque.get()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::Array(TypedArray::from(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Opaque> for Value {
    fn from(opaque: Opaque) -> Self {
        Value::Opaque(opaque)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Cents(i64);

    impl BindValue for Cents {
        fn bind_value(&self) -> Value {
            Value::Int64(self.0)
        }
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::from(7i32).type_name(), "int32");
        assert_eq!(Value::from("x").type_name(), "text");
        assert_eq!(Value::from(vec![1u16, 2]).type_name(), "uint16[]");
        assert_eq!(Value::Null.type_name(), "null");
        assert!(Value::custom(Cents(5)).type_name().ends_with("Cents"));
    }

    #[test]
    fn test_opaque_exposes_value_unchanged() {
        let inner = Value::from(vec![1i64, 2, 3]);
        let opaque = Opaque::new(inner.clone());
        assert_eq!(opaque.get(), &inner);
        assert_eq!(opaque.into_inner(), inner);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(vec![1i64, 2]).to_string(), "'{1,2}'");
        assert_eq!(
            Value::List(vec![Value::Int64(1), "a".into()]).to_string(),
            "(1, 'a')"
        );
        assert_eq!(Value::custom(Cents(250)).to_string(), "250");
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }
}
