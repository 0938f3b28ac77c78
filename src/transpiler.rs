//! SQL transpiler for expression trees.
//!
//! Renders a tree as `$n`-placeholder SQL plus its ordered parameters.
//! Sequences bound to a placeholder expand to one placeholder per element;
//! [`Opaque`] values are checked first and always take exactly one.

use std::borrow::Cow;

use crate::ast::*;

/// Keywords PostgreSQL will not accept as a bare column or table name,
/// including those only allowed as function or type names. Sorted.
const POSTGRES_RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "binary", "both", "case", "cast", "check", "collate", "collation",
    "column", "concurrently", "constraint", "create", "cross", "current_catalog",
    "current_date", "current_role", "current_schema", "current_time", "current_timestamp",
    "current_user", "default", "deferrable", "desc", "distinct", "do", "else", "end",
    "except", "false", "fetch", "for", "foreign", "freeze", "from", "full", "grant", "group",
    "having", "ilike", "in", "initially", "inner", "intersect", "into", "is", "isnull",
    "join", "lateral", "leading", "left", "like", "limit", "localtime", "localtimestamp",
    "natural", "not", "notnull", "null", "offset", "on", "only", "or", "order", "outer",
    "overlaps", "placing", "primary", "references", "returning", "right", "select",
    "session_user", "similar", "some", "symmetric", "system_user", "table", "tablesample",
    "then", "to", "trailing", "true", "union", "unique", "user", "using", "variadic",
    "verbose", "when", "where", "window", "with",
];

/// Render one part of a column reference.
///
/// Quoted tokens are emitted verbatim. Bare `[A-Za-z0-9_]` words are kept
/// as written unless they start with a digit or are reserved; anything
/// else is wrapped in double quotes with embedded quotes doubled.
pub fn quote_identifier(part: &str) -> Cow<'_, str> {
    if crate::parser::is_quoted(part) {
        return Cow::Borrowed(part);
    }

    let bare = part
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && POSTGRES_RESERVED
            .binary_search(&part.to_ascii_lowercase().as_str())
            .is_err();

    if bare {
        Cow::Borrowed(part)
    } else {
        Cow::Owned(format!("\"{}\"", part.replace('"', "\"\"")))
    }
}

/// SQL text with `$n` placeholders and the values bound to them.
#[derive(Debug, Clone, PartialEq)]
pub struct TranspileResult {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Trait for converting AST nodes to parameterized SQL.
pub trait ToSqlParameterized {
    fn to_sql_parameterized(&self) -> TranspileResult;
}

impl ToSqlParameterized for Expr {
    fn to_sql_parameterized(&self) -> TranspileResult {
        let mut builder = SqlBuilder::default();
        builder.write_expr(self);
        TranspileResult {
            sql: builder.sql,
            params: builder.params,
        }
    }
}

#[derive(Default)]
struct SqlBuilder {
    sql: String,
    params: Vec<Value>,
}

impl SqlBuilder {
    fn write_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Fragment(f) => self.write_fragment(&f.sql, &f.params),
            Expr::Named(n) => self.write_fragment(&n.sql, &n.params),
            Expr::In(list) => self.write_in(list),
            Expr::EqAny(eq) => {
                self.write_column(&eq.column);
                self.sql.push_str(" = ANY(");
                self.add_opaque(&eq.values);
                self.sql.push(')');
            }
            Expr::Compare(cmp) => {
                self.write_column(&cmp.column);
                self.sql.push(' ');
                self.sql.push_str(cmp.op.sql_symbol());
                self.sql.push(' ');
                self.add_var(&cmp.value);
            }
            Expr::Where(exprs) | Expr::And(exprs) => self.write_joined(expr, exprs, " AND "),
            Expr::Or(exprs) => self.write_joined(expr, exprs, " OR "),
            Expr::Not(exprs) => match rendered(exprs).as_slice() {
                [] => {}
                [single] => {
                    self.sql.push_str("NOT ");
                    self.write_child(expr, single, false);
                }
                _ => {
                    self.sql.push_str("NOT (");
                    self.write_joined(expr, exprs, " AND ");
                    self.sql.push(')');
                }
            },
        }
    }

    /// Empty groups render nothing, so they are skipped along with their
    /// joiner.
    fn write_joined(&mut self, parent: &Expr, exprs: &[Expr], joiner: &str) {
        let children = rendered(exprs);
        let several = children.len() > 1;
        for (i, child) in children.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(joiner);
            }
            self.write_child(parent, child, several);
        }
    }

    fn write_child(&mut self, parent: &Expr, child: &Expr, several: bool) {
        if needs_parentheses(parent, child, several) {
            self.sql.push('(');
            self.write_expr(child);
            self.sql.push(')');
        } else {
            self.write_expr(child);
        }
    }

    /// Replace each `?` with the next parameter. Extra `?` stay literal.
    fn write_fragment(&mut self, sql: &str, params: &[Value]) {
        let mut params = params.iter();
        for c in sql.chars() {
            match c {
                '?' => match params.next() {
                    Some(value) => self.add_var(value),
                    None => self.sql.push('?'),
                },
                _ => self.sql.push(c),
            }
        }
    }

    fn write_in(&mut self, list: &InList) {
        self.write_column(&list.column);
        match list.values.as_slice() {
            [] => self.sql.push_str(" IN (NULL)"),
            [single] if !single.is_sequence() => {
                self.sql.push_str(" = ");
                self.add_var(single);
            }
            values => {
                self.sql.push_str(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.sql.push(',');
                    }
                    self.add_var(value);
                }
                self.sql.push(')');
            }
        }
    }

    fn write_column(&mut self, column: &ColumnRef) {
        if let Some(table) = &column.table {
            self.sql.push_str(&quote_identifier(table));
            self.sql.push('.');
        }
        self.sql.push_str(&quote_identifier(&column.name));
    }

    fn add_var(&mut self, value: &Value) {
        match value {
            Value::Opaque(opaque) => self.add_opaque(opaque),
            Value::Array(array) => self.add_each(&array.to_values()),
            Value::List(items) => self.add_each(items),
            other => self.placeholder(other.clone()),
        }
    }

    fn add_each(&mut self, values: &[Value]) {
        if values.is_empty() {
            self.sql.push_str("NULL");
            return;
        }
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.sql.push(',');
            }
            self.add_var(value);
        }
    }

    fn add_opaque(&mut self, opaque: &Opaque) {
        self.placeholder(opaque.get().clone());
    }

    fn placeholder(&mut self, value: Value) {
        self.params.push(value);
        self.sql.push('$');
        self.sql.push_str(itoa::Buffer::new().format(self.params.len()));
    }
}

/// Groups nested under a different group kind, and fragments carrying
/// their own AND/OR, are parenthesized when they share a level with
/// siblings.
fn needs_parentheses(parent: &Expr, child: &Expr, several: bool) -> bool {
    match child {
        Expr::Fragment(f) => {
            (several || matches!(parent, Expr::Not(_)))
                && !f.without_parentheses
                && has_logical_operator(&f.sql)
        }
        Expr::Named(n) => {
            (several || matches!(parent, Expr::Not(_))) && has_logical_operator(&n.sql)
        }
        Expr::And(c) | Expr::Where(c) => {
            rendered(c).len() > 1 && !matches!(parent, Expr::And(_) | Expr::Where(_))
        }
        Expr::Or(c) => rendered(c).len() > 1 && !matches!(parent, Expr::Or(_)),
        _ => false,
    }
}

/// Children that produce SQL text.
fn rendered(exprs: &[Expr]) -> Vec<&Expr> {
    exprs.iter().filter(|e| !is_empty_group(e)).collect()
}

fn is_empty_group(expr: &Expr) -> bool {
    expr.is_group() && expr.children().iter().all(is_empty_group)
}

/// `AND` / `OR` as a whole word between any kind of whitespace.
fn has_logical_operator(sql: &str) -> bool {
    sql.split_whitespace()
        .any(|word| word.eq_ignore_ascii_case("and") || word.eq_ignore_ascii_case("or"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::rewrite_where_clauses;

    fn sql(expr: &Expr) -> String {
        expr.to_sql_parameterized().sql
    }

    #[test]
    fn test_reserved_list_is_sorted() {
        assert!(POSTGRES_RESERVED.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "users");
        assert_eq!(quote_identifier("UserId"), "UserId");
        assert_eq!(quote_identifier("order"), "\"order\"");
        assert_eq!(quote_identifier("Select"), "\"Select\"");
        assert_eq!(quote_identifier("1st"), "\"1st\"");
        assert_eq!(quote_identifier("my-col"), "\"my-col\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
        // Already quoted: verbatim.
        assert_eq!(quote_identifier("\"Id\""), "\"Id\"");
        assert_eq!(quote_identifier("\"order\""), "\"order\"");
    }

    #[test]
    fn test_quoted_column_refs_are_not_requoted() {
        let expr = Expr::is_in("\"Users\".\"Id\"", vec![Value::Int64(1), Value::Int64(2)]);
        let out = rewrite_where_clauses(expr).to_sql_parameterized();
        assert_eq!(out.sql, "\"Users\".\"Id\" = ANY($1)");

        let cmp = Expr::compare("\"t\".total", Operator::Gte, 10i64);
        assert_eq!(sql(&cmp), "\"t\".total >= $1");
    }

    #[test]
    fn test_empty_groups_render_nothing() {
        let expr = Expr::Where(vec![
            Expr::fragment("a = ?", vec![Value::Int64(1)]),
            Expr::And(vec![]),
        ]);
        assert_eq!(sql(&expr), "a = $1");

        assert_eq!(sql(&Expr::Not(vec![])), "");
        assert_eq!(sql(&Expr::Where(vec![])), "");

        let expr = Expr::Where(vec![
            Expr::Or(vec![]),
            Expr::Not(vec![Expr::And(vec![])]),
            Expr::compare("a", Operator::Eq, 1i64),
            Expr::Or(vec![Expr::compare("b", Operator::Eq, 2i64), Expr::Or(vec![])]),
        ]);
        assert_eq!(sql(&expr), "a = $1 AND b = $2");

        let not = Expr::Not(vec![Expr::And(vec![]), Expr::compare("a", Operator::Eq, 1i64)]);
        assert_eq!(sql(&not), "NOT a = $1");
    }

    #[test]
    fn test_logical_operator_on_any_whitespace() {
        let expr = Expr::Where(vec![
            Expr::fragment("a = 1\nOR b = 2", vec![]),
            Expr::fragment("c = 3\tand d = 4", vec![]),
            Expr::fragment("brand = 'x'", vec![]),
        ]);
        assert_eq!(
            sql(&expr),
            "(a = 1\nOR b = 2) AND (c = 3\tand d = 4) AND brand = 'x'"
        );
    }

    #[test]
    fn test_sequence_param_expands() {
        let expr = Expr::fragment("c IN (?)", vec![Value::from(vec![1i64, 2, 3])]);
        let out = expr.to_sql_parameterized();
        assert_eq!(out.sql, "c IN ($1,$2,$3)");
        assert_eq!(out.params, vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]);
    }

    #[test]
    fn test_opaque_param_binds_once() {
        let expr = Expr::fragment("c = ANY(?)", vec![Value::opaque(vec![1i64, 2, 3])]);
        let out = expr.to_sql_parameterized();
        assert_eq!(out.sql, "c = ANY($1)");
        assert_eq!(out.params, vec![Value::from(vec![1i64, 2, 3])]);
    }

    #[test]
    fn test_rewritten_sql_is_stable_across_lengths() {
        let render = |n: i64| {
            let ids: Vec<i64> = (0..n).collect();
            let expr = Expr::Where(vec![
                Expr::fragment("status = ?", vec!["open".into()]),
                Expr::fragment("id in (?)", vec![Value::from(ids)]),
            ]);
            rewrite_where_clauses(expr).to_sql_parameterized()
        };

        let short = render(2);
        let long = render(50);
        assert_eq!(short.sql, "status = $1 AND id = ANY($2)");
        assert_eq!(short.sql, long.sql);
        assert_eq!(long.params.len(), 2);
    }

    #[test]
    fn test_in_node_rendering() {
        assert_eq!(sql(&Expr::is_in("id", vec![])), "id IN (NULL)");
        assert_eq!(sql(&Expr::is_in("id", vec![Value::Int64(4)])), "id = $1");
        assert_eq!(
            sql(&Expr::is_in("user.id", vec![Value::Int64(4), Value::Int64(5)])),
            "\"user\".id IN ($1,$2)"
        );
    }

    #[test]
    fn test_eq_any_rendering() {
        let expr = rewrite_where_clauses(Expr::is_in("id", vec![Value::Int64(4), Value::Int64(5)]));
        let out = expr.to_sql_parameterized();
        assert_eq!(out.sql, "id = ANY($1)");
        assert_eq!(out.params, vec![Value::from(vec![4i64, 5])]);
    }

    #[test]
    fn test_group_parentheses() {
        let expr = Expr::Where(vec![
            Expr::compare("a", Operator::Eq, 1i64),
            Expr::Or(vec![
                Expr::compare("b", Operator::Lt, 2i64),
                Expr::compare("c", Operator::Gt, 3i64),
            ]),
            Expr::fragment("d = ? or e = ?", vec![Value::Int64(4), Value::Int64(5)]),
            Expr::Fragment(Fragment::new("f = 1 OR g = 2", vec![]).without_parentheses()),
        ]);
        assert_eq!(
            sql(&expr),
            "a = $1 AND (b < $2 OR c > $3) AND (d = $4 or e = $5) AND f = 1 OR g = 2"
        );
    }

    #[test]
    fn test_not_rendering() {
        let single = Expr::Not(vec![Expr::fragment("a = ? OR b = ?", vec![1i64.into(), 2i64.into()])]);
        assert_eq!(sql(&single), "NOT (a = $1 OR b = $2)");

        let several = Expr::Not(vec![
            Expr::compare("a", Operator::Eq, 1i64),
            Expr::compare("b", Operator::Eq, 2i64),
        ]);
        assert_eq!(sql(&several), "NOT (a = $1 AND b = $2)");
    }

    #[test]
    fn test_extra_placeholders_stay_literal() {
        let expr = Expr::fragment("a = ? AND b = ?", vec![Value::Int64(1)]);
        assert_eq!(sql(&expr), "a = $1 AND b = ?");
    }
}
