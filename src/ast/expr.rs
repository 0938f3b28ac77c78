use crate::ast::{Opaque, Value};

/// A raw SQL fragment with positional `?` parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub params: Vec<Value>,
    /// Never wrap this fragment in parentheses when composing it.
    pub without_parentheses: bool,
}

impl Fragment {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
            without_parentheses: false,
        }
    }

    pub fn without_parentheses(mut self) -> Self {
        self.without_parentheses = true;
        self
    }
}

/// A fragment registered under a name by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedFragment {
    pub name: String,
    pub sql: String,
    pub params: Vec<Value>,
}

/// A column, optionally qualified by its table or alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub name: String,
}

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }
}

/// `users.id` and `"Users"."Id"` split on the dot between the two
/// identifiers, keeping any quotes. Anything that is not a bare or quoted
/// `[qualifier.]column` becomes a single unqualified name.
impl From<&str> for ColumnRef {
    fn from(s: &str) -> Self {
        match crate::parser::split_column_ref(s) {
            Some((Some(table), name)) => ColumnRef::qualified(table, name),
            Some((None, name)) => ColumnRef::new(name),
            None => ColumnRef::new(s),
        }
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// `column IN (values...)` built by the query builder rather than from text.
#[derive(Debug, Clone, PartialEq)]
pub struct InList {
    pub column: ColumnRef,
    pub values: Vec<Value>,
}

/// `column = ANY(values)` with the whole sequence bound once.
#[derive(Debug, Clone, PartialEq)]
pub struct EqAny {
    pub column: ColumnRef,
    pub values: Opaque,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
        }
    }
}

/// `column <op> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: ColumnRef,
    pub op: Operator,
    pub value: Value,
}

/// A node of a WHERE clause expression tree.
///
/// Node kinds the rewriter does not know are passed through untouched, so
/// new variants can be added without breaking it.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Expr {
    Fragment(Fragment),
    Named(NamedFragment),
    In(InList),
    EqAny(EqAny),
    Compare(Comparison),
    /// Top-level conjunction of a WHERE clause
    Where(Vec<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Vec<Expr>),
}

impl Expr {
    pub fn fragment(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Expr::Fragment(Fragment::new(sql, params))
    }

    pub fn named(name: impl Into<String>, sql: impl Into<String>, params: Vec<Value>) -> Self {
        Expr::Named(NamedFragment {
            name: name.into(),
            sql: sql.into(),
            params,
        })
    }

    pub fn is_in(column: impl Into<ColumnRef>, values: Vec<Value>) -> Self {
        Expr::In(InList {
            column: column.into(),
            values,
        })
    }

    pub fn compare(column: impl Into<ColumnRef>, op: Operator, value: impl Into<Value>) -> Self {
        Expr::Compare(Comparison {
            column: column.into(),
            op,
            value: value.into(),
        })
    }

    /// Child nodes of a group; empty for leaves.
    pub fn children(&self) -> &[Expr] {
        match self {
            Expr::Where(c) | Expr::And(c) | Expr::Or(c) | Expr::Not(c) => c,
            _ => &[],
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Expr::Where(_) | Expr::And(_) | Expr::Or(_) | Expr::Not(_))
    }

    /// Leaf nodes in left-to-right order.
    pub fn leaves(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Expr>) {
        if self.is_group() {
            for child in self.children() {
                child.collect_leaves(out);
            }
        } else {
            out.push(self);
        }
    }
}

impl From<Fragment> for Expr {
    fn from(fragment: Fragment) -> Self {
        Expr::Fragment(fragment)
    }
}
