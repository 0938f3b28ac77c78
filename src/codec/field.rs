use crate::ast::{ElemKind, TypedArray, Value};
use crate::codec::{decode, encode_array, DecodeElement};
use crate::error::{AnysetError, AnysetResult};

/// Reads a stored value into a typed array.
pub type ScanFn = fn(&Value) -> AnysetResult<TypedArray>;

/// Scan/value adapter for one array field.
///
/// Resolve it once from the field's declared element kind and reuse it for
/// every row; it holds no state between calls.
#[derive(Debug, Clone, Copy)]
pub struct FieldCodec {
    kind: ElemKind,
    scan: Option<ScanFn>,
}

impl FieldCodec {
    pub fn lookup(kind: ElemKind) -> Self {
        Self {
            kind,
            scan: scanner(kind),
        }
    }

    pub fn kind(&self) -> ElemKind {
        self.kind
    }

    pub fn supports_decode(&self) -> bool {
        self.scan.is_some()
    }

    /// Decode a stored value (text literal or NULL).
    pub fn scan(&self, src: &Value) -> AnysetResult<TypedArray> {
        match self.scan {
            Some(scan) => scan(src),
            None => Err(AnysetError::UnsupportedKind(self.kind)),
        }
    }

    /// The value to store for `array`: its literal as text.
    pub fn value(&self, array: &TypedArray) -> AnysetResult<Value> {
        if array.kind() != self.kind {
            return Err(AnysetError::mismatch(array.kind().array_name(), self.kind));
        }
        Ok(Value::String(encode_array(array)))
    }
}

fn scanner(kind: ElemKind) -> Option<ScanFn> {
    let scan: ScanFn = match kind {
        ElemKind::Bool => scan_as::<bool>,
        ElemKind::Int8 => scan_as::<i8>,
        ElemKind::Int16 => scan_as::<i16>,
        ElemKind::Int32 => scan_as::<i32>,
        ElemKind::Int64 => scan_as::<i64>,
        ElemKind::Uint8 => return None,
        ElemKind::Uint16 => scan_as::<u16>,
        ElemKind::Uint32 => scan_as::<u32>,
        ElemKind::Uint64 => scan_as::<u64>,
        ElemKind::Float32 => scan_as::<f32>,
        ElemKind::Float64 => scan_as::<f64>,
        ElemKind::String => scan_as::<String>,
    };
    Some(scan)
}

fn scan_as<T>(src: &Value) -> AnysetResult<TypedArray>
where
    T: DecodeElement,
    TypedArray: From<Vec<T>>,
{
    decode::<T>(src).map(TypedArray::from)
}
