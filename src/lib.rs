//! # pg-anyset: stable prepared statements for list parameters
//!
//! > **One list, one placeholder.**
//!
//! `col IN (?)` with a list expands to one placeholder per element, so every
//! list length produces different SQL and a fresh prepared statement.
//! pg-anyset rewrites those predicates to `col = ANY(?)` (and `NOT IN` to
//! `!= ALL(?)`) with the whole list bound as a single PostgreSQL array.
//!
//! ## Quick Example
//!
//! ```rust
//! use pg_anyset::prelude::*;
//!
//! let expr = Expr::Where(vec![
//!     Expr::fragment("status = ?", vec!["open".into()]),
//!     Expr::fragment("id IN (?)", vec![Value::from(vec![1i64, 2, 3])]),
//! ]);
//!
//! let out = rewrite_where_clauses(expr).to_sql_parameterized();
//! assert_eq!(out.sql, "status = $1 AND id = ANY($2)");
//! assert_eq!(out.params.len(), 2);
//! ```
//!
//! ## Modules
//!
//! | Module       | Role                                              |
//! |--------------|---------------------------------------------------|
//! | `parser`     | Matches `[tbl.]col [NOT] IN (?)` fragments        |
//! | `validate`   | Checks that a list is non-empty and homogeneous   |
//! | `rewrite`    | Walks a WHERE tree and rewrites eligible nodes    |
//! | `codec`      | `{a,b,c}` array literal encode/decode             |
//! | `transpiler` | Renders a tree as `$n` SQL plus parameters        |
//! | `bind`       | Binds parameters onto sqlx Postgres queries       |

pub mod ast;
pub mod bind;
pub mod codec;
pub mod config;
pub mod error;
pub mod parser;
pub mod rewrite;
pub mod transpiler;
pub mod validate;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::bind::{bind_params, bind_value, PgQuery};
    pub use crate::codec::{decode, decode_array, encode, encode_array, FieldCodec};
    pub use crate::config::{Config, RewriteConfig};
    pub use crate::error::*;
    pub use crate::rewrite::{rewrite_where_clauses, Rewriter};
    pub use crate::transpiler::{ToSqlParameterized, TranspileResult};
}

pub use rewrite::rewrite_where_clauses;
