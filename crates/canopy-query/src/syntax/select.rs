//! SELECT projection parser using chumsky.
//!
//! Parses queries like:
//! - `SELECT Id, Name FROM Account`
//! - `SELECT Name, Account.Name acct FROM Contact WHERE LastName = 'Ng'`
//! - `SELECT MIN(Amount) lowest, Count() FROM Opportunity`
//! - `SELECT Name, (SELECT LastName FROM Contacts LIMIT 5) FROM Account`
//!
//! Only the projection list and the FROM target are structured; everything
//! after the FROM target is kept as verbatim text.

use crate::error::ParseError;
use crate::ir::{AggregateCall, ColumnRef, ProjectionItem, SelectQuery};
use crate::syntax::common::{balanced_text, format_errors, ident, kw, Extra};
use chumsky::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fast prefix check for the SELECT keyword
static SELECT_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*SELECT\b").unwrap());

/// Words that end a projection item rather than alias it
const RESERVED: &[&str] = &["FROM", "AS"];

/// Cheap check whether `input` looks like a SELECT statement
pub fn can_handle(input: &str) -> bool {
    SELECT_PREFIX_RE.is_match(input)
}

/// Parse SELECT text into a [`SelectQuery`]
pub fn parse_select(input: &str) -> Result<SelectQuery, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    if !can_handle(input) {
        return Err(ParseError::NotSelect {
            input: input.to_string(),
        });
    }

    select_parser()
        .padded()
        .then_ignore(end())
        .parse(input)
        .into_result()
        .map_err(|errs| ParseError::Syntax {
            errors: format_errors(&errs, input),
        })
}

// ============================================================================
// Main parser
// ============================================================================

/// SELECT item [, item]* FROM target [tail]
fn select_parser<'src>() -> impl Parser<'src, &'src str, SelectQuery, Extra<'src>> {
    recursive(|select| {
        let sub_query = select
            .delimited_by(just('(').padded(), just(')').padded())
            .map(|query| ProjectionItem::SubQuery(Box::new(query)))
            .labelled("sub-select like (SELECT Name FROM Contacts)");

        let item = choice((sub_query, aggregate_parser(), column_parser())).padded();

        kw("SELECT")
            .ignore_then(
                item.separated_by(just(','))
                    .at_least(1)
                    .collect::<Vec<_>>(),
            )
            .then_ignore(kw("FROM"))
            .then(ident().padded().labelled("entity or relationship name"))
            .then(balanced_text())
            .map(|((items, from), tail)| SelectQuery::new(from, items).with_tail(tail))
    })
}

// ============================================================================
// Projection items
// ============================================================================

/// Dotted field path: Account.Owner.Name
fn path_parser<'src>() -> impl Parser<'src, &'src str, Vec<String>, Extra<'src>> + Clone {
    ident()
        .separated_by(just('.'))
        .at_least(1)
        .collect::<Vec<_>>()
        .labelled("field path like Account.Name")
}

/// Optional alias: `AS name` or a bare trailing identifier
fn alias_parser<'src>() -> impl Parser<'src, &'src str, Option<String>, Extra<'src>> + Clone {
    let explicit = kw("AS").ignore_then(ident().padded());

    let bare = ident().padded().try_map(|s: String, span| {
        if RESERVED.iter().any(|r| s.eq_ignore_ascii_case(r)) {
            Err(Rich::custom(span, format!("'{}' cannot be an alias", s)))
        } else {
            Ok(s)
        }
    });

    choice((explicit, bare)).or_not()
}

fn column_parser<'src>() -> impl Parser<'src, &'src str, ProjectionItem, Extra<'src>> + Clone {
    path_parser()
        .then(alias_parser())
        .map(|(path, alias)| ProjectionItem::Column(ColumnRef { path, alias }))
}

/// FUNC() or FUNC(path [, path]*)
fn aggregate_parser<'src>() -> impl Parser<'src, &'src str, ProjectionItem, Extra<'src>> + Clone
{
    let args = path_parser()
        .padded()
        .map(|path| ColumnRef { path, alias: None })
        .separated_by(just(','))
        .collect::<Vec<_>>()
        .delimited_by(just('(').padded(), just(')').padded());

    ident()
        .then(args)
        .then(alias_parser())
        .map(|((function, args), alias)| {
            ProjectionItem::Aggregate(AggregateCall {
                function,
                args,
                alias,
            })
        })
        .labelled("aggregate like MIN(Amount)")
}
