//! Shared parser primitives for the projection syntax.

use chumsky::extra;
use chumsky::prelude::*;

/// Extra type for parsers - uses Rich errors for better messages
pub type Extra<'src> = extra::Err<Rich<'src, char>>;

// ============================================================================
// Primitive parsers
// ============================================================================

/// Parser for identifiers: alphanumeric + underscore
pub fn ident<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.to_string())
        .labelled("identifier")
}

/// Case-insensitive keyword parser.
///
/// Matches a whole identifier, so `FROM` does not match the start of `FROMAGE`.
pub fn kw<'src>(keyword: &'static str) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .to_slice()
        .try_map(move |s: &str, span| {
            if s.eq_ignore_ascii_case(keyword) {
                Ok(())
            } else {
                Err(Rich::custom(span, format!("expected keyword '{}'", keyword)))
            }
        })
        .padded()
}

/// Parser for single-quoted string literals with backslash escapes: 'O\'Brien'
pub fn quoted<'src>() -> impl Parser<'src, &'src str, &'src str, Extra<'src>> + Clone {
    let escaped = just('\\').then(any()).ignored();
    let plain = none_of("\\'").ignored();

    just('\'')
        .then(choice((escaped, plain)).repeated())
        .then(just('\''))
        .to_slice()
        .labelled("single-quoted string")
}

/// Raw text up to the first unbalanced `)` or end of input.
///
/// Parentheses must balance and quoted strings are skipped over, so a
/// `)` inside `'...'` does not terminate the text.
pub fn balanced_text<'src>() -> impl Parser<'src, &'src str, &'src str, Extra<'src>> + Clone {
    let unit = recursive(|unit| {
        let group = just('(')
            .then(unit.repeated())
            .then(just(')'))
            .ignored();
        let other = none_of("()'").ignored();

        choice((quoted().ignored(), group, other))
    });

    unit.repeated().to_slice()
}

// ============================================================================
// Error formatting
// ============================================================================

/// Format chumsky errors for human consumption
pub fn format_errors(errs: &[Rich<'_, char>], input: &str) -> String {
    errs.iter()
        .map(|e| {
            let span = e.span();
            let start = span.start;
            let line = input[..start].matches('\n').count() + 1;
            let col = start - input[..start].rfind('\n').map_or(0, |i| i + 1);

            let found = e
                .found()
                .map_or("end of input".to_string(), |c| format!("'{}'", c));

            let reason = format!("{}", e.reason());

            format!(
                "Line {}, column {}: {} (found {})",
                line,
                col + 1,
                reason,
                found
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
