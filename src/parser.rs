//! Column membership matcher using nom.
//!
//! Recognizes the one fragment shape the rewriter cares about:
//!
//! ```text
//! "tbl"."col"  NOT IN  (?)
//! ───┬─── ──┬── ───┬─── ─┬─
//!    │      │      │     └── exactly one placeholder
//!    │      │      └── IN or NOT IN, any case
//!    │      └── column, bare or quoted
//!    └── optional qualifier, bare or quoted, with its dot
//! ```
//!
//! Identifiers are `[A-Za-z0-9_]+`, optionally wrapped in double quotes.
//! This is looser than SQL (a bare `123abc` is accepted) and stricter than
//! it (quoted names may not contain other characters); Postgres rejects
//! whatever slips through. Anything else is not a match.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::char,
    combinator::{eof, opt, recognize, value},
    sequence::{delimited, terminated, tuple},
    IResult,
};

/// Which membership test a fragment expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    In,
    NotIn,
}

impl Membership {
    /// The single-parameter set-membership operator replacing this test.
    pub fn set_operator(&self) -> &'static str {
        match self {
            Membership::In => "= ANY(?)",
            Membership::NotIn => "!= ALL(?)",
        }
    }
}

/// A fragment recognized as `[qualifier]column [NOT] IN (?)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMatch<'a> {
    /// Table or alias including its trailing `.`, quotes kept.
    pub qualifier: Option<&'a str>,
    /// Column token, quotes kept.
    pub column: &'a str,
    pub membership: Membership,
}

impl ColumnMatch<'_> {
    /// `<qualifier><column> = ANY(?)` or `<qualifier><column> != ALL(?)`.
    pub fn rewritten_sql(&self) -> String {
        format!(
            "{}{} {}",
            self.qualifier.unwrap_or(""),
            self.column,
            self.membership.set_operator()
        )
    }
}

/// Match a fragment against the membership grammar.
///
/// Returns `None` for every fragment of any other shape.
pub fn match_membership(sql: &str) -> Option<ColumnMatch<'_>> {
    parse_column_membership(sql).ok().map(|(_, m)| m)
}

/// Split a column reference into its qualifier (without the dot) and
/// column, both with quotes kept. The dot only separates outside quotes.
///
/// Returns `None` when `s` is not a bare or quoted `[qualifier.]column`.
pub fn split_column_ref(s: &str) -> Option<(Option<&str>, &str)> {
    let parsed: IResult<&str, (Option<&str>, &str)> = tuple((
        opt(terminated(parse_identifier, char('.'))),
        terminated(parse_identifier, eof),
    ))(s);
    parsed.ok().map(|(_, parts)| parts)
}

/// True for a `"..."` token.
pub fn is_quoted(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('"') && token.ends_with('"')
}

fn parse_column_membership(input: &str) -> IResult<&str, ColumnMatch<'_>> {
    let (input, _) = space0(input)?;
    let (input, qualifier) = opt(parse_qualifier)(input)?;
    let (input, column) = parse_identifier(input)?;
    let (input, _) = space1(input)?;
    let (input, membership) = parse_membership(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = tag("(?)")(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = eof(input)?;

    Ok((
        input,
        ColumnMatch {
            qualifier,
            column,
            membership,
        },
    ))
}

/// Parse `IN` or `NOT <ws> IN`, case-insensitively.
fn parse_membership(input: &str) -> IResult<&str, Membership> {
    alt((
        value(
            Membership::NotIn,
            tuple((tag_no_case("not"), space1, tag_no_case("in"))),
        ),
        value(Membership::In, tag_no_case("in")),
    ))(input)
}

/// Parse a qualifier with its separator (`tbl.` or `"tbl".`).
fn parse_qualifier(input: &str) -> IResult<&str, &str> {
    recognize(terminated(parse_identifier, char('.')))(input)
}

/// Parse a bare or double-quoted identifier, keeping the quotes.
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    alt((recognize(delimited(char('"'), parse_word, char('"'))), parse_word))(input)
}

fn parse_word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn space0(input: &str) -> IResult<&str, &str> {
    take_while(is_space)(input)
}

fn space1(input: &str) -> IResult<&str, &str> {
    take_while1(is_space)(input)
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')
}
