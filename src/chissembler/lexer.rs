use std::rc::Rc;

use crate::chissembler::error::AssemblerError;
use crate::chissembler::source_span::SourceSpan;
use crate::chissembler::token::{Token, TokenKind};

/// Scans `source` into a flat token stream, terminated by a single [`TokenKind::EndOfInput`]
/// token. A `;` begins a line comment that runs to (but does not consume) the next newline.
///
/// Newlines are significant statement terminators in the grammar, so they are emitted as
/// [`TokenKind::Newline`] tokens rather than being treated as whitespace.
pub(crate) fn tokenize(filename: &str, source: &str) -> Result<Vec<Token>, AssemblerError> {
    let filename: Rc<str> = Rc::from(filename);
    let full_source: Rc<str> = Rc::from(source);
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut offset = 0usize;

    while offset < bytes.len() {
        let ch = bytes[offset] as char;
        match ch {
            ' ' | '\t' | '\r' => {
                offset += 1;
            }
            ';' => {
                while offset < bytes.len() && bytes[offset] != b'\n' {
                    offset += 1;
                }
            }
            '\n' => {
                tokens.push(Token::new(
                    TokenKind::Newline,
                    SourceSpan::new(filename.clone(), full_source.clone(), offset, 1),
                ));
                offset += 1;
            }
            ':' => {
                tokens.push(Token::new(
                    TokenKind::Colon,
                    SourceSpan::new(filename.clone(), full_source.clone(), offset, 1),
                ));
                offset += 1;
            }
            '+' => {
                tokens.push(Token::new(
                    TokenKind::Plus,
                    SourceSpan::new(filename.clone(), full_source.clone(), offset, 1),
                ));
                offset += 1;
            }
            c if c.is_ascii_digit() => {
                let start = offset;
                while offset < bytes.len() && (bytes[offset] as char).is_ascii_digit() {
                    offset += 1;
                }
                tokens.push(Token::new(
                    TokenKind::IntegerLiteral,
                    SourceSpan::new(filename.clone(), full_source.clone(), start, offset - start),
                ));
            }
            c if is_word_start(c) => {
                let start = offset;
                while offset < bytes.len() && is_word_continue(bytes[offset] as char) {
                    offset += 1;
                }
                let span = SourceSpan::new(filename.clone(), full_source.clone(), start, offset - start);
                tokens.push(classify_word(span));
            }
            other => {
                let (line, column) = SourceSpan::new(filename.clone(), full_source.clone(), offset, 1).line_column();
                return Err(AssemblerError::InvalidCharacter {
                    filename: filename.to_string(),
                    line,
                    column,
                    character: other,
                });
            }
        }
    }

    tokens.push(Token::new(
        TokenKind::EndOfInput,
        SourceSpan::new(filename.clone(), full_source.clone(), offset, 0),
    ));
    Ok(tokens)
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A register is the fixed lexeme `V` followed by one uppercase hex digit (`V0`..`VF`);
/// anything else that looks like a word is either a reserved mnemonic keyword or a label
/// identifier. Register names are case-sensitive: a lowercase `v0` is not a register, since
/// the grammar defines register names as uppercase `V` plus an uppercase hex digit.
fn classify_word(span: SourceSpan) -> Token {
    let lexeme = span.lexeme();
    if is_register_lexeme(lexeme) {
        return Token::new(TokenKind::Register, span);
    }
    let kind = match lexeme.to_ascii_lowercase().as_str() {
        "copy" => TokenKind::Copy,
        "add" => TokenKind::Add,
        "sub" => TokenKind::Sub,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "xor" => TokenKind::Xor,
        "jump" => TokenKind::Jump,
        _ => TokenKind::Identifier,
    };
    Token::new(kind, span)
}

fn is_register_lexeme(lexeme: &str) -> bool {
    let mut chars = lexeme.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('V'), Some(digit), None) => digit.is_ascii_uppercase() && digit.is_ascii_hexdigit(),
        _ => false,
    }
}
