use crate::chissembler::ast::{Instruction, JumpTarget, Location, Target};
use crate::chissembler::error::AssemblerError;
use crate::chissembler::token::{Token, TokenKind};

/// Parses a flat token stream into a sequence of [`Instruction`]s. Label resolution (checking
/// for duplicate or unknown labels) happens later, in emission: the parser only builds the
/// abstract syntax, enforcing nothing beyond what's structurally required to build it
/// (operand kind per mnemonic, operand range, `V0`-only jump offsets).
pub(crate) fn parse(tokens: &[Token]) -> Result<Vec<Instruction>, AssemblerError> {
    let mut cursor = Cursor { tokens, position: 0 };
    let mut instructions = Vec::new();

    cursor.skip_newlines();
    while !cursor.at_end() {
        instructions.push(parse_statement(&mut cursor)?);
        cursor.expect_terminator()?;
        cursor.skip_newlines();
    }
    Ok(instructions)
}

struct Cursor<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfInput
    }

    fn advance(&mut self) -> &Token {
        let token = &self.tokens[self.position];
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn skip_newlines(&mut self) {
        while self.peek().kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn error_location(&self) -> (String, usize, usize) {
        let (line, column) = self.peek().span.line_column();
        (self.peek().span.filename().to_string(), line, column)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token, AssemblerError> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            let (filename, line, column) = self.error_location();
            Err(AssemblerError::UnexpectedToken {
                filename,
                line,
                column,
                found: self.peek().kind.description(),
                expected: kind.description(),
            })
        }
    }

    /// The final statement in a program may be terminated by either a newline or immediate
    /// end of input, as a minor convenience beyond requiring a trailing blank line.
    fn expect_terminator(&mut self) -> Result<(), AssemblerError> {
        match self.peek().kind {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::EndOfInput => Ok(()),
            _ => {
                let (filename, line, column) = self.error_location();
                Err(AssemblerError::UnexpectedToken {
                    filename,
                    line,
                    column,
                    found: self.peek().kind.description(),
                    expected: "a newline",
                })
            }
        }
    }
}

fn parse_statement(cursor: &mut Cursor) -> Result<Instruction, AssemblerError> {
    match cursor.peek().kind {
        TokenKind::Identifier => parse_label_definition(cursor),
        TokenKind::Jump => parse_jump(cursor),
        TokenKind::Copy => parse_binary_arithmetic(cursor, TokenKind::Copy, Instruction::Copy),
        TokenKind::Add => parse_binary_arithmetic(cursor, TokenKind::Add, Instruction::Add),
        TokenKind::Sub => parse_binary_arithmetic(cursor, TokenKind::Sub, Instruction::Sub),
        TokenKind::And => parse_register_only_arithmetic(cursor, TokenKind::And, "and", Instruction::And),
        TokenKind::Or => parse_register_only_arithmetic(cursor, TokenKind::Or, "or", Instruction::Or),
        TokenKind::Xor => parse_register_only_arithmetic(cursor, TokenKind::Xor, "xor", Instruction::Xor),
        _ => {
            let (filename, line, column) = cursor.error_location();
            Err(AssemblerError::UnexpectedToken {
                filename,
                line,
                column,
                found: cursor.peek().kind.description(),
                expected: "a statement",
            })
        }
    }
}

fn parse_label_definition(cursor: &mut Cursor) -> Result<Instruction, AssemblerError> {
    let name_token = cursor.expect(TokenKind::Identifier)?.clone();
    let (line, column) = name_token.span.line_column();
    cursor.expect(TokenKind::Colon)?;
    Ok(Instruction::Label {
        name: name_token.span.lexeme().to_string(),
        location: Location {
            filename: name_token.span.filename().to_string(),
            line,
            column,
        },
    })
}

fn parse_jump(cursor: &mut Cursor) -> Result<Instruction, AssemblerError> {
    let jump_token = cursor.expect(TokenKind::Jump)?.clone();
    let (line, column) = jump_token.span.line_column();
    let location = Location {
        filename: jump_token.span.filename().to_string(),
        line,
        column,
    };
    let target = match cursor.peek().kind {
        TokenKind::IntegerLiteral => {
            let value = parse_address_literal(cursor)?;
            if cursor.peek().kind == TokenKind::Plus {
                expect_v0_offset(cursor)?;
                JumpTarget::AddressPlusV0(value)
            } else {
                JumpTarget::Address(value)
            }
        }
        TokenKind::Identifier => {
            let label = cursor.advance().span.lexeme().to_string();
            if cursor.peek().kind == TokenKind::Plus {
                expect_v0_offset(cursor)?;
                JumpTarget::LabelPlusV0(label)
            } else {
                JumpTarget::Label(label)
            }
        }
        _ => {
            let (filename, line, column) = cursor.error_location();
            return Err(AssemblerError::UnexpectedToken {
                filename,
                line,
                column,
                found: cursor.peek().kind.description(),
                expected: "an address or a label",
            });
        }
    };
    Ok(Instruction::Jump { target, location })
}

fn expect_v0_offset(cursor: &mut Cursor) -> Result<(), AssemblerError> {
    cursor.expect(TokenKind::Plus)?;
    let register_token = cursor.expect(TokenKind::Register)?.clone();
    let register = parse_register_index(register_token.span.lexeme());
    if register != 0 {
        let (line, column) = register_token.span.line_column();
        return Err(AssemblerError::InvalidOffsetRegister {
            filename: register_token.span.filename().to_string(),
            line,
            column,
            register: register_token.span.lexeme().to_string(),
        });
    }
    Ok(())
}

/// Parses `copy`/`add`/`sub`, whose source operand may be either an immediate or a register.
fn parse_binary_arithmetic(
    cursor: &mut Cursor,
    mnemonic: TokenKind,
    build: fn(Target, u8) -> Instruction,
) -> Result<Instruction, AssemblerError> {
    cursor.expect(mnemonic)?;
    let src = match cursor.peek().kind {
        TokenKind::IntegerLiteral => Target::U8Immediate(parse_u8_literal(cursor)?),
        TokenKind::Register => {
            let token = cursor.advance().clone();
            Target::DataRegister(parse_register_index(token.span.lexeme()))
        }
        _ => {
            let (filename, line, column) = cursor.error_location();
            return Err(AssemblerError::UnexpectedToken {
                filename,
                line,
                column,
                found: cursor.peek().kind.description(),
                expected: "an integer literal or a register",
            });
        }
    };
    let dst_token = cursor.expect(TokenKind::Register)?.clone();
    let dst = parse_register_index(dst_token.span.lexeme());
    Ok(build(src, dst))
}

/// Parses `and`/`or`/`xor`, which only ever accept two register operands.
fn parse_register_only_arithmetic(
    cursor: &mut Cursor,
    mnemonic: TokenKind,
    mnemonic_name: &'static str,
    build: fn(u8, u8) -> Instruction,
) -> Result<Instruction, AssemblerError> {
    cursor.expect(mnemonic)?;
    if cursor.peek().kind == TokenKind::IntegerLiteral {
        let (filename, line, column) = cursor.error_location();
        return Err(AssemblerError::ImmediateOperandNotAllowed {
            filename,
            line,
            column,
            mnemonic: mnemonic_name,
        });
    }
    let src_token = cursor.expect(TokenKind::Register)?.clone();
    let dst_token = cursor.expect(TokenKind::Register)?.clone();
    Ok(build(
        parse_register_index(src_token.span.lexeme()),
        parse_register_index(dst_token.span.lexeme()),
    ))
}

fn parse_register_index(lexeme: &str) -> u8 {
    let digit = lexeme.chars().nth(1).expect("register lexeme is always 'V' + one hex digit");
    digit.to_digit(16).expect("register lexeme's second character is always a hex digit") as u8
}

fn parse_u8_literal(cursor: &mut Cursor) -> Result<u8, AssemblerError> {
    let token = cursor.expect(TokenKind::IntegerLiteral)?.clone();
    let value: i64 = token.span.lexeme().parse().expect("lexer only emits ASCII digit runs");
    u8::try_from(value).map_err(|_| {
        let (line, column) = token.span.line_column();
        AssemblerError::ImmediateOutOfRange {
            filename: token.span.filename().to_string(),
            line,
            column,
            value,
        }
    })
}

fn parse_address_literal(cursor: &mut Cursor) -> Result<u16, AssemblerError> {
    let token = cursor.expect(TokenKind::IntegerLiteral)?.clone();
    let value: i64 = token.span.lexeme().parse().expect("lexer only emits ASCII digit runs");
    if value > 0x0FFF {
        let (line, column) = token.span.line_column();
        return Err(AssemblerError::AddressOutOfRange {
            filename: token.span.filename().to_string(),
            line,
            column,
            value,
        });
    }
    Ok(value as u16)
}
