//! Rewrites `col IN (?)` and `col NOT IN (?)` into `col = ANY(?)` and
//! `col != ALL(?)`.
//!
//! The two forms differ in how they play with prepared statements:
//!
//! 1. `col IN (?)` bound to a list expands to `col IN ($1,$2,...)`, one
//!    placeholder per element, so every list length is a different
//!    statement.
//! 2. `col = ANY(?)` always expands to `col = ANY($1)` and the list is sent
//!    as a single array argument, so one prepared statement serves every
//!    length.
//!
//! The rewritten parameter is wrapped in [`Opaque`] so the statement
//! builder binds it once instead of expanding it.

use crate::ast::{ElemKind, EqAny, Expr, Fragment, InList, NamedFragment, Opaque, TypedArray, Value};
use crate::config::RewriteConfig;
use crate::parser;
use crate::validate::{self, ElementType, Rejection};

/// Rewrite a WHERE tree with every form enabled.
pub fn rewrite_where_clauses(expr: Expr) -> Expr {
    Rewriter::default().rewrite(expr)
}

/// Depth-first, structure-preserving tree rewriter.
#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    config: RewriteConfig,
}

impl Rewriter {
    pub fn new(config: RewriteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Rewrite a tree. Only matching fragments and IN nodes are replaced;
    /// every other node keeps its kind, position and children.
    pub fn rewrite(&self, expr: Expr) -> Expr {
        match expr {
            Expr::Fragment(fragment) => Expr::Fragment(self.rewrite_fragment(fragment)),
            Expr::Named(named) => Expr::Named(self.rewrite_named(named)),
            Expr::In(list) => self.rewrite_in(list),

            Expr::Where(exprs) => Expr::Where(self.rewrite_all(exprs)),
            Expr::And(exprs) => Expr::And(self.rewrite_all(exprs)),
            Expr::Or(exprs) => Expr::Or(self.rewrite_all(exprs)),
            Expr::Not(exprs) => Expr::Not(self.rewrite_all(exprs)),

            other => other,
        }
    }

    fn rewrite_all(&self, exprs: Vec<Expr>) -> Vec<Expr> {
        exprs.into_iter().map(|e| self.rewrite(e)).collect()
    }

    fn rewrite_fragment(&self, fragment: Fragment) -> Fragment {
        let Some(sql) = parser::match_membership(&fragment.sql)
            .filter(|m| self.config.allows(m.membership))
            .map(|m| m.rewritten_sql())
        else {
            return fragment;
        };

        let checked = match fragment.params.as_slice() {
            [param] => validate::sequence_element_type(param),
            params => Err(Rejection::ParamCount(params.len())),
        };
        if let Err(reason) = checked {
            tracing::trace!("Keeping '{}': {}", fragment.sql, reason);
            return fragment;
        }

        tracing::trace!("Rewriting '{}' as '{}'", fragment.sql, sql);
        Fragment {
            sql,
            params: fragment.params.into_iter().map(|p| Value::Opaque(Opaque::new(p))).collect(),
            without_parentheses: fragment.without_parentheses,
        }
    }

    fn rewrite_named(&self, named: NamedFragment) -> NamedFragment {
        let NamedFragment { name, sql, params } = named;
        let rewritten = self.rewrite_fragment(Fragment::new(sql, params));
        NamedFragment {
            name,
            sql: rewritten.sql,
            params: rewritten.params,
        }
    }

    fn rewrite_in(&self, list: InList) -> Expr {
        if !self.config.membership_nodes {
            return Expr::In(list);
        }

        match validate::homogeneous_type(&list.values) {
            Ok(element) => {
                tracing::trace!("Rewriting {} IN (...) as = ANY", list.column);
                Expr::EqAny(EqAny {
                    column: list.column,
                    values: Opaque::new(pack(element, list.values)),
                })
            }
            Err(reason) => {
                tracing::trace!("Keeping {} IN (...): {}", list.column, reason);
                Expr::In(list)
            }
        }
    }
}

/// Turn a validated list into the single value bound for it: primitive
/// lists become a typed array, custom values stay a list.
fn pack(element: ElementType, values: Vec<Value>) -> Value {
    match element {
        ElementType::Primitive(kind) => pack_primitive(kind, values),
        ElementType::Custom(_) => Value::List(values),
    }
}

fn pack_primitive(kind: ElemKind, values: Vec<Value>) -> Value {
    match TypedArray::from_values(kind, &values) {
        Some(array) => Value::Array(array),
        None => Value::List(values),
    }
}
