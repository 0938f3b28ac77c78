use serde::{Deserialize, Serialize};

use crate::ast::Value;

/// Element kind of a typed array.
///
/// The kind comes from the field's declared type, never from looking at
/// the values it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElemKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    #[serde(rename = "text")]
    String,
}

impl ElemKind {
    /// Every kind, in declaration order.
    pub const ALL: [ElemKind; 12] = [
        ElemKind::Bool,
        ElemKind::Int8,
        ElemKind::Int16,
        ElemKind::Int32,
        ElemKind::Int64,
        ElemKind::Uint8,
        ElemKind::Uint16,
        ElemKind::Uint32,
        ElemKind::Uint64,
        ElemKind::Float32,
        ElemKind::Float64,
        ElemKind::String,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ElemKind::Bool => "bool",
            ElemKind::Int8 => "int8",
            ElemKind::Int16 => "int16",
            ElemKind::Int32 => "int32",
            ElemKind::Int64 => "int64",
            ElemKind::Uint8 => "uint8",
            ElemKind::Uint16 => "uint16",
            ElemKind::Uint32 => "uint32",
            ElemKind::Uint64 => "uint64",
            ElemKind::Float32 => "float32",
            ElemKind::Float64 => "float64",
            ElemKind::String => "text",
        }
    }

    /// Name of a sequence of this kind, used in type mismatch messages.
    pub fn array_name(self) -> &'static str {
        match self {
            ElemKind::Bool => "bool[]",
            ElemKind::Int8 => "int8[]",
            ElemKind::Int16 => "int16[]",
            ElemKind::Int32 => "int32[]",
            ElemKind::Int64 => "int64[]",
            ElemKind::Uint8 => "uint8[]",
            ElemKind::Uint16 => "uint16[]",
            ElemKind::Uint32 => "uint32[]",
            ElemKind::Uint64 => "uint64[]",
            ElemKind::Float32 => "float32[]",
            ElemKind::Float64 => "float64[]",
            ElemKind::String => "text[]",
        }
    }

    /// `uint8` sequences encode but are never decoded.
    pub fn supports_decode(self) -> bool {
        self != ElemKind::Uint8
    }
}

impl std::fmt::Display for ElemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ElemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => ElemKind::Bool,
            "int8" | "i8" => ElemKind::Int8,
            "int16" | "i16" => ElemKind::Int16,
            "int32" | "i32" => ElemKind::Int32,
            "int64" | "i64" | "int" => ElemKind::Int64,
            "uint8" | "u8" => ElemKind::Uint8,
            "uint16" | "u16" => ElemKind::Uint16,
            "uint32" | "u32" => ElemKind::Uint32,
            "uint64" | "u64" | "uint" => ElemKind::Uint64,
            "float32" | "f32" => ElemKind::Float32,
            "float64" | "f64" | "float" => ElemKind::Float64,
            "text" | "string" | "str" => ElemKind::String,
            other => return Err(format!("unknown element kind '{}'", other)),
        };
        Ok(kind)
    }
}

/// A native sequence of one primitive element kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedArray {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
    Uint64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    String(Vec<String>),
}

macro_rules! typed_arrays {
    ($(($ty:ty, $variant:ident)),* $(,)?) => {
        impl TypedArray {
            pub fn kind(&self) -> ElemKind {
                match self {
                    $(TypedArray::$variant(_) => ElemKind::$variant,)*
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $(TypedArray::$variant(v) => v.len(),)*
                }
            }

            /// An empty sequence of the given kind.
            pub fn empty(kind: ElemKind) -> Self {
                match kind {
                    $(ElemKind::$variant => TypedArray::$variant(Vec::new()),)*
                }
            }

            /// Split the sequence into independently typed scalar values.
            pub fn to_values(&self) -> Vec<Value> {
                match self {
                    $(TypedArray::$variant(v) => v.iter().cloned().map(Value::$variant).collect(),)*
                }
            }

            /// Pack scalar values of exactly `kind` into a typed sequence.
            ///
            /// Returns `None` as soon as one value is of another type.
            pub fn from_values(kind: ElemKind, values: &[Value]) -> Option<Self> {
                match kind {
                    $(ElemKind::$variant => values
                        .iter()
                        .map(|value| match value {
                            Value::$variant(v) => Some(v.clone()),
                            _ => None,
                        })
                        .collect::<Option<Vec<$ty>>>()
                        .map(TypedArray::$variant),)*
                }
            }
        }

        $(
            impl From<Vec<$ty>> for TypedArray {
                fn from(v: Vec<$ty>) -> Self {
                    TypedArray::$variant(v)
                }
            }

            impl From<Vec<$ty>> for Value {
                fn from(v: Vec<$ty>) -> Self {
                    Value::Array(TypedArray::$variant(v))
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

typed_arrays! {
    (bool, Bool),
    (i8, Int8),
    (i16, Int16),
    (i32, Int32),
    (i64, Int64),
    (u8, Uint8),
    (u16, Uint16),
    (u32, Uint32),
    (u64, Uint64),
    (f32, Float32),
    (f64, Float64),
    (String, String),
}

impl TypedArray {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<&str>> for TypedArray {
    fn from(v: Vec<&str>) -> Self {
        TypedArray::String(v.into_iter().map(str::to_string).collect())
    }
}

impl From<TypedArray> for Value {
    fn from(array: TypedArray) -> Self {
        Value::Array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_parse_back() {
        for kind in ElemKind::ALL {
            assert_eq!(kind.name().parse::<ElemKind>(), Ok(kind));
        }
        assert_eq!("INT".parse::<ElemKind>(), Ok(ElemKind::Int64));
        assert!("decimal".parse::<ElemKind>().is_err());
    }

    #[test]
    fn test_only_uint8_skips_decode() {
        let skipped: Vec<ElemKind> = ElemKind::ALL
            .into_iter()
            .filter(|k| !k.supports_decode())
            .collect();
        assert_eq!(skipped, vec![ElemKind::Uint8]);
    }

    #[test]
    fn test_from_values_requires_exact_kind() {
        let values = vec![Value::Int64(1), Value::Int64(2)];
        assert_eq!(
            TypedArray::from_values(ElemKind::Int64, &values),
            Some(TypedArray::Int64(vec![1, 2]))
        );
        assert_eq!(TypedArray::from_values(ElemKind::Int32, &values), None);

        let mixed = vec![Value::Int64(1), Value::String("a".into())];
        assert_eq!(TypedArray::from_values(ElemKind::Int64, &mixed), None);
    }

    #[test]
    fn test_to_values_keeps_order() {
        let array = TypedArray::from(vec!["b", "a"]);
        assert_eq!(array.kind(), ElemKind::String);
        assert_eq!(
            array.to_values(),
            vec![Value::String("b".into()), Value::String("a".into())]
        );
    }
}
