//! Parameter binding onto sqlx Postgres queries.
//!
//! Postgres has no unsigned integers, so unsigned values widen to the next
//! signed type. Sequences (`Array`, `List`, `Opaque`) always bind as a single
//! array parameter, which is what `= ANY($n)` expects.

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

use crate::ast::{ElemKind, TypedArray, Value};
use crate::error::{AnysetError, AnysetResult};

/// A Postgres query with positional arguments.
pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Bind every parameter in order.
///
/// # Example
///
/// ```rust,ignore
/// let out = rewrite_where_clauses(expr).to_sql_parameterized();
/// let rows = bind_params(sqlx::query(&out.sql), &out.params)?
///     .fetch_all(&pool)
///     .await?;
/// ```
pub fn bind_params<'q>(mut query: PgQuery<'q>, params: &[Value]) -> AnysetResult<PgQuery<'q>> {
    for param in params {
        query = bind_value(query, param)?;
    }
    Ok(query)
}

/// Bind a single value as one parameter.
pub fn bind_value<'q>(query: PgQuery<'q>, value: &Value) -> AnysetResult<PgQuery<'q>> {
    let query = match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(v) => query.bind(*v),
        Value::Int8(v) => query.bind(i16::from(*v)),
        Value::Int16(v) => query.bind(*v),
        Value::Int32(v) => query.bind(*v),
        Value::Int64(v) => query.bind(*v),
        Value::Uint8(v) => query.bind(i16::from(*v)),
        Value::Uint16(v) => query.bind(i32::from(*v)),
        Value::Uint32(v) => query.bind(i64::from(*v)),
        Value::Uint64(v) => query.bind(to_int8(*v)?),
        Value::Float32(v) => query.bind(*v),
        Value::Float64(v) => query.bind(*v),
        Value::String(s) => query.bind(s.clone()),
        Value::Bytes(b) => query.bind(b.clone()),
        Value::Array(array) => bind_array(query, array)?,
        Value::List(items) => bind_array(query, &pack_list(items)?)?,
        Value::Custom(custom) => bind_value(query, &custom.bind_value())?,
        Value::Opaque(opaque) => bind_value(query, opaque.get())?,
    };
    Ok(query)
}

fn bind_array<'q>(query: PgQuery<'q>, array: &TypedArray) -> AnysetResult<PgQuery<'q>> {
    let query = match array {
        TypedArray::Bool(v) => query.bind(v.clone()),
        TypedArray::Int8(v) => query.bind(widen::<_, i16>(v)),
        TypedArray::Int16(v) => query.bind(v.clone()),
        TypedArray::Int32(v) => query.bind(v.clone()),
        TypedArray::Int64(v) => query.bind(v.clone()),
        // Vec<u8> would bind as bytea.
        TypedArray::Uint8(v) => query.bind(widen::<_, i16>(v)),
        TypedArray::Uint16(v) => query.bind(widen::<_, i32>(v)),
        TypedArray::Uint32(v) => query.bind(widen::<_, i64>(v)),
        TypedArray::Uint64(v) => {
            let v = v.iter().copied().map(to_int8).collect::<AnysetResult<Vec<_>>>()?;
            query.bind(v)
        }
        TypedArray::Float32(v) => query.bind(v.clone()),
        TypedArray::Float64(v) => query.bind(v.clone()),
        TypedArray::String(v) => query.bind(v.clone()),
    };
    Ok(query)
}

fn widen<S: Copy, T: From<S>>(v: &[S]) -> Vec<T> {
    v.iter().copied().map(T::from).collect()
}

fn to_int8(value: u64) -> AnysetResult<i64> {
    i64::try_from(value).map_err(|_| AnysetError::OutOfRange {
        value,
        target: "int8",
    })
}

/// Pack a loose list into one typed array, resolving custom values first.
fn pack_list(items: &[Value]) -> AnysetResult<TypedArray> {
    let resolved: Vec<Value> = items.iter().map(resolve).collect();

    let Some(first) = resolved.first() else {
        return Err(AnysetError::Bind(
            "cannot infer the element type of an empty list".to_string(),
        ));
    };
    let kind: ElemKind = first.kind().ok_or_else(|| {
        AnysetError::Bind(format!("cannot bind a list of {} as an array", first.type_name()))
    })?;

    TypedArray::from_values(kind, &resolved).ok_or_else(|| {
        AnysetError::Bind(format!("list elements are not all of type {kind}"))
    })
}

fn resolve(value: &Value) -> Value {
    match value {
        Value::Custom(custom) => resolve(&custom.bind_value()),
        other => other.clone(),
    }
}
