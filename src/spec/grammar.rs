//! Parser for spec notation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::lexer::{self, Token};
use super::{Options, Spanned, Value};
use crate::error::SpecError;

/// Parse spec notation into a single value
pub fn parse(input: &str) -> Result<Spanned<Value>, Vec<SpecError>> {
    let len = input.len();

    let mut tokens = Vec::new();
    for (tok, span) in lexer::lex(input) {
        match tok {
            Ok(t) => tokens.push((t, SimpleSpan::from(span))),
            Err(()) => {
                let found = input.get(span.clone()).unwrap_or_default().to_string();
                return Err(vec![SpecError::syntax(
                    span,
                    format!("Unexpected character '{}'", found),
                    Vec::new(),
                )]);
            }
        }
    }

    let token_stream = Stream::from_iter(tokens.into_iter())
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    value_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn value_parser<'a, I>() -> impl Parser<'a, I, Spanned<Value>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|value| {
        let number = just(Token::Minus)
            .or_not()
            .then(select! { Token::Number(n) => n })
            .map(|(minus, n)| if minus.is_some() { -n } else { n });

        // Bare identifiers and quoted strings are interchangeable
        let text = select! {
            Token::Ident(s) => s,
            Token::String(s) => s,
        };

        let boolean = choice((just(Token::True).to(true), just(Token::False).to(false)));

        let list = value
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BracketOpen), just(Token::BracketClose));

        let key = text
            .clone()
            .map_with(|k, e| Spanned::new(k, span_range(&e.span())));

        let entry = key.then_ignore(just(Token::Colon)).then(value);

        let map = entry
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BraceOpen), just(Token::BraceClose));

        choice((
            number.map(Value::Number),
            boolean.map(Value::Bool),
            text.map(Value::Str),
            list.map(Value::List),
            map.map(|entries| Value::Map(Options::from_entries(entries))),
        ))
        .map_with(|v, e| Spanned::new(v, span_range(&e.span())))
        .boxed()
    })
}
