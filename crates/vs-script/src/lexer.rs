//! Tokenizer for script lines.

use logos::Logos;
use std::fmt;

use crate::ast::Span;

/// The `///` divider separating dialogue or directive text from its modifiers.
pub const DIVIDER: &str = "///";

/// Token type for a modifier block (`mod1; mod2(arg, arg)`).
///
/// Argument words are not interpreted here; multi-word arguments are joined
/// back together by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Left parenthesis `(`.
    LParen,
    /// Right parenthesis `)`.
    RParen,
    /// Argument separator `,`.
    Comma,
    /// Modifier separator `;`.
    Semicolon,
    /// A run of any other non-whitespace characters.
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Word(w) => write!(f, "{w}"),
        }
    }
}

/// Internal logos token; borrows from the source.
/// Converted to owned `Token` after lexing.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r]+")]
enum RawToken {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[regex(r"[^ \t\r\n(),;]+")]
    Word,
}

/// Lex a modifier block into `(Token, Span)` pairs.
///
/// Spans are shifted by `base` so they index into the whole document. Every
/// character outside whitespace produces a token, so lexing never fails;
/// malformed shapes are reported by the parser.
pub fn lex_modifiers(block: &str, base: usize) -> Vec<(Token, Span)> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(block);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = match result {
            Ok(RawToken::LParen) => Token::LParen,
            Ok(RawToken::RParen) => Token::RParen,
            Ok(RawToken::Comma) => Token::Comma,
            Ok(RawToken::Semicolon) => Token::Semicolon,
            Ok(RawToken::Word) | Err(()) => Token::Word(lexer.slice().to_string()),
        };
        tokens.push((token, base + span.start..base + span.end));
    }

    tokens
}

/// Split a line into its body and the text after each `///` divider.
pub fn split_dividers(line: &str) -> (&str, Vec<(&str, usize)>) {
    let mut parts = line.split(DIVIDER);
    let body = parts.next().unwrap_or_default();
    let mut blocks = Vec::new();
    let mut offset = body.len() + DIVIDER.len();
    for part in parts {
        blocks.push((part, offset));
        offset += part.len() + DIVIDER.len();
    }
    (body, blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<String> {
        lex_modifiers(src, 0)
            .iter()
            .map(|(t, _)| t.to_string())
            .collect()
    }

    #[test]
    fn lex_single_flag() {
        assert_eq!(kinds(" hasblade "), vec!["hasblade"]);
    }

    #[test]
    fn lex_arguments() {
        assert_eq!(
            kinds("checkvoice(cold, hero); interrupt"),
            vec!["checkvoice", "(", "cold", ",", "hero", ")", ";", "interrupt"]
        );
    }

    #[test]
    fn spans_are_shifted() {
        let tokens = lex_modifiers("harsh", 10);
        assert_eq!(tokens[0].1, 10..15);
    }

    #[test]
    fn multi_word_arguments_stay_separate_words() {
        assert_eq!(
            kinds("ifstring(the mound)"),
            vec!["ifstring", "(", "the", "mound", ")"]
        );
    }

    #[test]
    fn split_without_divider() {
        let (body, blocks) = split_dividers("narrator: Hello.");
        assert_eq!(body, "narrator: Hello.");
        assert!(blocks.is_empty());
    }

    #[test]
    fn split_with_dividers() {
        let (body, blocks) = split_dividers("text /// a /// b");
        assert_eq!(body, "text ");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], (" a ", 8));
        assert_eq!(blocks[1], (" b", 14));
    }
}
