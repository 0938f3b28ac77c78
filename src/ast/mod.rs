//! Expression tree and parameter values handed over by the query builder.

pub mod array;
pub mod expr;
pub mod values;

pub use array::{ElemKind, TypedArray};
pub use expr::{ColumnRef, Comparison, EqAny, Expr, Fragment, InList, NamedFragment, Operator};
pub use values::{BindValue, CustomValue, Opaque, Value};
