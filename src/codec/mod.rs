//! PostgreSQL array literal codec.
//!
//! Converts typed sequences to and from the `{e1,e2,...}` text form.
//! Encoding never quotes or escapes, so strings containing `,`, `{` or `}`
//! do not survive a round trip. Decoding strips at most one pair of
//! surrounding double quotes per element and does not handle nested arrays.

mod element;
mod field;

pub use element::{ArrayElement, DecodeElement};
pub use field::{FieldCodec, ScanFn};

use crate::ast::{ElemKind, TypedArray, Value};
use crate::error::{AnysetError, AnysetResult};

/// Encode a typed sequence as an array literal. `[]` encodes to `{}`.
pub fn encode<T: ArrayElement>(items: &[T]) -> String {
    let mut out = String::with_capacity(2 + items.len() * 4);
    out.push('{');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        item.write_element(&mut out);
    }
    out.push('}');
    out
}

/// Decode an array literal into a sequence of `T`.
///
/// An element that does not parse as `T` is left at `T::default()` and the
/// rest of the literal still decodes.
// TODO: surface unparsable elements instead of zeroing them once callers
// can handle a per-element error.
pub fn decode_literal<T: DecodeElement>(literal: &str) -> Vec<T> {
    let inner = literal.strip_prefix('{').unwrap_or(literal);
    let inner = inner.strip_suffix('}').unwrap_or(inner);
    if inner.is_empty() {
        return Vec::new();
    }

    inner
        .split(',')
        .enumerate()
        .map(|(i, raw)| {
            let elem = unquote(raw);
            T::parse_element(elem).unwrap_or_else(|| {
                tracing::debug!(
                    "Array element {} ('{}') is not a valid {}, using zero value",
                    i,
                    elem,
                    T::KIND
                );
                T::default()
            })
        })
        .collect()
}

/// Decode a stored value. NULL is an empty sequence; any source other
/// than text or NULL is a type mismatch.
pub fn decode<T: DecodeElement>(src: &Value) -> AnysetResult<Vec<T>> {
    match src {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(decode_literal(s)),
        other => Err(AnysetError::mismatch(other.type_name(), T::KIND)),
    }
}

/// Encode a typed array of any kind.
pub fn encode_array(array: &TypedArray) -> String {
    match array {
        TypedArray::Bool(v) => encode(v),
        TypedArray::Int8(v) => encode(v),
        TypedArray::Int16(v) => encode(v),
        TypedArray::Int32(v) => encode(v),
        TypedArray::Int64(v) => encode(v),
        TypedArray::Uint8(v) => encode(v),
        TypedArray::Uint16(v) => encode(v),
        TypedArray::Uint32(v) => encode(v),
        TypedArray::Uint64(v) => encode(v),
        TypedArray::Float32(v) => encode(v),
        TypedArray::Float64(v) => encode(v),
        TypedArray::String(v) => encode(v),
    }
}

/// Decode a stored value into a typed array of `kind`.
pub fn decode_array(kind: ElemKind, src: &Value) -> AnysetResult<TypedArray> {
    FieldCodec::lookup(kind).scan(src)
}

fn unquote(elem: &str) -> &str {
    let elem = elem.strip_prefix('"').unwrap_or(elem);
    elem.strip_suffix('"').unwrap_or(elem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_joins_without_spaces() {
        assert_eq!(encode(&[1i32, -2, 3]), "{1,-2,3}");
        assert_eq!(encode(&[true, false]), "{true,false}");
        assert_eq!(encode(&[0.5f64, 1.25]), "{0.5,1.25}");
        assert_eq!(encode(&["a".to_string(), "b c".to_string()]), "{a,b c}");
    }

    #[test]
    fn test_empty_sequence_law() {
        assert_eq!(encode::<i64>(&[]), "{}");
        assert_eq!(decode_literal::<i64>("{}"), Vec::<i64>::new());
        assert_eq!(decode::<String>(&Value::Null).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_round_trip_per_kind() {
        let bools = vec![true, false, true];
        assert_eq!(decode_literal::<bool>(&encode(&bools)), bools);

        let i8s = vec![i8::MIN, 0, i8::MAX];
        assert_eq!(decode_literal::<i8>(&encode(&i8s)), i8s);

        let i64s = vec![i64::MIN, -1, 0, i64::MAX];
        assert_eq!(decode_literal::<i64>(&encode(&i64s)), i64s);

        let u64s = vec![0, 42, u64::MAX];
        assert_eq!(decode_literal::<u64>(&encode(&u64s)), u64s);

        let f32s = vec![0.1f32, -3.5, f32::MAX, f32::MIN_POSITIVE];
        assert_eq!(decode_literal::<f32>(&encode(&f32s)), f32s);

        let f64s = vec![0.1f64, 1e-7, 123456789.125, f64::INFINITY];
        assert_eq!(decode_literal::<f64>(&encode(&f64s)), f64s);

        let strings = vec!["alpha".to_string(), "with space".to_string(), String::new()];
        assert_eq!(decode_literal::<String>(&encode(&strings)), strings);
    }

    #[test]
    fn test_quoting_tolerance() {
        let quoted = decode_literal::<String>("{\"a\",\"b\"}");
        let bare = decode_literal::<String>("{a,b}");
        assert_eq!(quoted, vec!["a", "b"]);
        assert_eq!(quoted, bare);

        assert_eq!(decode_literal::<i32>("{\"1\",2}"), vec![1, 2]);
        // Only one layer is stripped.
        assert_eq!(decode_literal::<String>("{\"\"x\"\"}"), vec!["\"x\""]);
    }

    #[test]
    fn test_lenient_element_parse() {
        assert_eq!(decode_literal::<i64>("{1,notanumber,3}"), vec![1, 0, 3]);
        assert_eq!(decode_literal::<bool>("{t,maybe,f}"), vec![true, false, false]);
        assert_eq!(decode_literal::<f64>("{1.5,x}"), vec![1.5, 0.0]);
        assert_eq!(decode_literal::<i8>("{300}"), vec![0]);
        // No trimming: Postgres never emits spaces after commas.
        assert_eq!(decode_literal::<i32>("{1, 2}"), vec![1, 0]);
    }

    #[test]
    fn test_braces_stripped_once() {
        assert_eq!(decode_literal::<i32>("1,2"), vec![1, 2]);
        assert_eq!(decode_literal::<String>("{{a,b}}"), vec!["{a", "b}"]);
    }

    #[test]
    fn test_strings_with_commas_do_not_round_trip() {
        let strings = vec!["a,b".to_string()];
        assert_eq!(encode(&strings), "{a,b}");
        assert_eq!(decode_literal::<String>(&encode(&strings)), vec!["a", "b"]);
    }

    #[test]
    fn test_decode_rejects_non_text_sources() {
        let err = decode::<i64>(&Value::Int64(5)).unwrap_err();
        assert!(matches!(
            err,
            AnysetError::TypeMismatch {
                found: "int64",
                target: ElemKind::Int64
            }
        ));

        let err = decode::<String>(&Value::Bytes(b"{a}".to_vec())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported conversion from bytes to text array"
        );
    }

    #[test]
    fn test_dynamic_dispatch() {
        let array = TypedArray::Uint32(vec![1, 2]);
        let literal = encode_array(&array);
        assert_eq!(literal, "{1,2}");
        assert_eq!(
            decode_array(ElemKind::Uint32, &Value::String(literal)).unwrap(),
            array
        );
        assert_eq!(
            decode_array(ElemKind::Float64, &Value::Null).unwrap(),
            TypedArray::Float64(vec![])
        );
    }
}
