use std::rc::Rc;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::Num;

use crate::js::common::unicode::{
    get_binary_value, get_hex_value, get_octal_value, is_ascii, is_ascii_newline,
    is_ascii_whitespace, is_continuation_byte, is_decimal_digit, is_id_part_ascii,
    is_id_part_unicode, is_id_start_ascii, is_id_start_unicode, is_newline, is_unicode_newline,
    is_unicode_whitespace,
};

use super::loc::{Loc, Pos};
use super::parse_error::{LocalizedParseError, ParseError, ParseResult};
use super::source::Source;
use super::token::{Token, TokenFlags};

pub struct Lexer<'a> {
    pub source: &'a Rc<Source>,
    buf: &'a str,
    current: char,
    pos: Pos,
    is_new_line_before_current: bool,
    is_current_escaped: bool,
    pub in_strict_mode: bool,
    /// Whether legacy web compatibility syntax (HTML-like comments, legacy octals) is accepted.
    pub allow_web_compat: bool,
}

/// A save point for the lexer, can be used to restore the lexer to a particular position.
pub struct SavedLexerState {
    current: char,
    pos: Pos,
    is_new_line_before_current: bool,
    is_current_escaped: bool,
}

pub type LexResult = ParseResult<(Token, Loc)>;

/// Character that marks an EOF. Not a valid unicode character.
const EOF_CHAR: char = '\u{ffff}';

/// Replacement for escape sequences that encode a lone surrogate.
const REPLACEMENT_CHAR: char = '\u{fffd}';

impl<'a> Lexer<'a> {
    pub fn new(source: &'a Rc<Source>) -> Lexer<'a> {
        let buf = &source.contents;
        let current = match buf.as_bytes().first() {
            None => EOF_CHAR,
            Some(byte) => (*byte).into(),
        };

        Lexer {
            source,
            buf,
            current,
            pos: 0,
            is_new_line_before_current: false,
            is_current_escaped: false,
            in_strict_mode: false,
            allow_web_compat: true,
        }
    }

    pub fn save(&self) -> SavedLexerState {
        SavedLexerState {
            current: self.current,
            pos: self.pos,
            is_new_line_before_current: self.is_new_line_before_current,
            is_current_escaped: self.is_current_escaped,
        }
    }

    pub fn restore(&mut self, save_state: &SavedLexerState) {
        self.current = save_state.current;
        self.pos = save_state.pos;
        self.is_new_line_before_current = save_state.is_new_line_before_current;
        self.is_current_escaped = save_state.is_current_escaped;
    }

    /// Flags for the most recently lexed token.
    pub fn token_flags(&self) -> TokenFlags {
        let mut flags = TokenFlags::empty();
        flags.set(TokenFlags::NEW_LINE_BEFORE, self.is_new_line_before_current);
        flags.set(TokenFlags::ESCAPED, self.is_current_escaped);
        flags
    }

    #[inline]
    fn advance_n(&mut self, n: usize) {
        self.pos += n;
        if self.pos < self.buf.len() {
            self.current = self.buf.as_bytes()[self.pos].into();
        } else {
            self.current = EOF_CHAR;
            self.pos = self.buf.len();
        }
    }

    fn advance(&mut self) {
        self.advance_n(1);
    }

    fn advance2(&mut self) {
        self.advance_n(2);
    }

    fn advance3(&mut self) {
        self.advance_n(3);
    }

    fn advance4(&mut self) {
        self.advance_n(4);
    }

    #[inline]
    fn peek_n(&self, n: usize) -> char {
        let next_pos = self.pos + n;
        if next_pos < self.buf.len() {
            self.buf.as_bytes()[next_pos].into()
        } else {
            EOF_CHAR
        }
    }

    fn peek(&self) -> char {
        self.peek_n(1)
    }

    fn peek2(&self) -> char {
        self.peek_n(2)
    }

    fn peek3(&self) -> char {
        self.peek_n(3)
    }

    fn mark_loc(&self, start_pos: Pos) -> Loc {
        Loc { start: start_pos, end: self.pos }
    }

    fn emit(&self, token: Token, start_pos: Pos) -> LexResult {
        Ok((token, self.mark_loc(start_pos)))
    }

    fn error<T>(&self, loc: Loc, error: ParseError) -> ParseResult<T> {
        let source = (*self.source).clone();
        Err(LocalizedParseError { error, source_loc: Some((loc, source)) })
    }

    /// Error for legacy octal syntax in a context that does not accept it.
    fn legacy_octal_error(&self, strict_mode_error: ParseError) -> Option<ParseError> {
        if self.in_strict_mode {
            Some(strict_mode_error)
        } else if !self.allow_web_compat {
            Some(ParseError::LegacyOctalWithoutWebCompat)
        } else {
            None
        }
    }

    pub fn next(&mut self) -> LexResult {
        self.is_new_line_before_current = false;
        self.is_current_escaped = false;

        loop {
            // Fast pass for skipping ASCII whitespace and newlines
            while is_ascii(self.current) {
                if is_ascii_whitespace(self.current) {
                    self.advance();
                } else if is_ascii_newline(self.current) {
                    self.is_new_line_before_current = true;
                    self.advance();
                } else {
                    break;
                }
            }

            let start_pos = self.pos;

            return match self.current {
                '+' => match self.peek() {
                    '+' => {
                        self.advance2();
                        self.emit(Token::Increment, start_pos)
                    }
                    '=' => {
                        self.advance2();
                        self.emit(Token::AddEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Plus, start_pos)
                    }
                },
                '-' => match self.peek() {
                    // HTML close comment is only recognized at the start of a line
                    '-' if self.peek2() == '>'
                        && self.allow_web_compat
                        && (self.is_new_line_before_current || start_pos == 0) =>
                    {
                        self.advance3();
                        self.skip_line_comment()?;
                        continue;
                    }
                    '-' => {
                        self.advance2();
                        self.emit(Token::Decrement, start_pos)
                    }
                    '=' => {
                        self.advance2();
                        self.emit(Token::SubtractEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Minus, start_pos)
                    }
                },
                '*' => match self.peek() {
                    '*' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::ExponentEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::Exponent, start_pos)
                        }
                    },
                    '=' => {
                        self.advance2();
                        self.emit(Token::MultiplyEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Multiply, start_pos)
                    }
                },
                '/' => match self.peek() {
                    '/' => {
                        self.advance2();
                        self.skip_line_comment()?;
                        continue;
                    }
                    '*' => {
                        self.advance2();
                        self.skip_block_comment(start_pos)?;
                        continue;
                    }
                    '=' => {
                        self.advance2();
                        self.emit(Token::DivideEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Divide, start_pos)
                    }
                },
                '%' => match self.peek() {
                    '=' => {
                        self.advance2();
                        self.emit(Token::RemainderEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Remainder, start_pos)
                    }
                },
                '&' => match self.peek() {
                    '&' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::LogicalAndEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::LogicalAnd, start_pos)
                        }
                    },
                    '=' => {
                        self.advance2();
                        self.emit(Token::AndEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::BitwiseAnd, start_pos)
                    }
                },
                '|' => match self.peek() {
                    '|' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::LogicalOrEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::LogicalOr, start_pos)
                        }
                    },
                    '=' => {
                        self.advance2();
                        self.emit(Token::OrEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::BitwiseOr, start_pos)
                    }
                },
                '?' => match self.peek() {
                    '?' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::NullishCoalesceEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::NullishCoalesce, start_pos)
                        }
                    },
                    // ?.d is parsed as a question mark followed by a decimal literal
                    '.' if !is_decimal_digit(self.peek2()) => {
                        self.advance2();
                        self.emit(Token::QuestionDot, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Question, start_pos)
                    }
                },
                '^' => match self.peek() {
                    '=' => {
                        self.advance2();
                        self.emit(Token::XorEq, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::BitwiseXor, start_pos)
                    }
                },
                '>' => match self.peek() {
                    '>' => match self.peek2() {
                        '>' => match self.peek3() {
                            '=' => {
                                self.advance4();
                                self.emit(Token::ShiftRightLogicalEq, start_pos)
                            }
                            _ => {
                                self.advance3();
                                self.emit(Token::ShiftRightLogical, start_pos)
                            }
                        },
                        '=' => {
                            self.advance3();
                            self.emit(Token::ShiftRightArithmeticEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::ShiftRightArithmetic, start_pos)
                        }
                    },
                    '=' => {
                        self.advance2();
                        self.emit(Token::GreaterThanOrEqual, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::GreaterThan, start_pos)
                    }
                },
                '<' => match self.peek() {
                    // HTML open comment
                    '!' if self.peek2() == '-' && self.peek3() == '-' && self.allow_web_compat => {
                        self.advance4();
                        self.skip_line_comment()?;
                        continue;
                    }
                    '<' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::ShiftLeftEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::ShiftLeft, start_pos)
                        }
                    },
                    '=' => {
                        self.advance2();
                        self.emit(Token::LessThanOrEqual, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::LessThan, start_pos)
                    }
                },
                '~' => {
                    self.advance();
                    self.emit(Token::BitwiseNot, start_pos)
                }
                '=' => match self.peek() {
                    '=' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::EqEqEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::EqEq, start_pos)
                        }
                    },
                    '>' => {
                        self.advance2();
                        self.emit(Token::Arrow, start_pos)
                    }
                    _ => {
                        self.advance();
                        self.emit(Token::Equals, start_pos)
                    }
                },
                '!' => match self.peek() {
                    '=' => match self.peek2() {
                        '=' => {
                            self.advance3();
                            self.emit(Token::NotEqEq, start_pos)
                        }
                        _ => {
                            self.advance2();
                            self.emit(Token::NotEq, start_pos)
                        }
                    },
                    _ => {
                        self.advance();
                        self.emit(Token::LogicalNot, start_pos)
                    }
                },
                '(' => {
                    self.advance();
                    self.emit(Token::LeftParen, start_pos)
                }
                ')' => {
                    self.advance();
                    self.emit(Token::RightParen, start_pos)
                }
                '{' => {
                    self.advance();
                    self.emit(Token::LeftBrace, start_pos)
                }
                '}' => {
                    self.advance();
                    self.emit(Token::RightBrace, start_pos)
                }
                '[' => {
                    self.advance();
                    self.emit(Token::LeftBracket, start_pos)
                }
                ']' => {
                    self.advance();
                    self.emit(Token::RightBracket, start_pos)
                }
                ';' => {
                    self.advance();
                    self.emit(Token::Semicolon, start_pos)
                }
                ',' => {
                    self.advance();
                    self.emit(Token::Comma, start_pos)
                }
                '.' => {
                    let next_char = self.peek();
                    if next_char == '.' && self.peek2() == '.' {
                        self.advance3();
                        self.emit(Token::Spread, start_pos)
                    } else if is_decimal_digit(next_char) {
                        let token = self.lex_decimal_literal()?;
                        self.error_if_cannot_follow_numeric_literal()?;
                        Ok(token)
                    } else {
                        self.advance();
                        self.emit(Token::Period, start_pos)
                    }
                }
                ':' => {
                    self.advance();
                    self.emit(Token::Colon, start_pos)
                }
                '#' => {
                    // Parse hashbang comment if it starts at the first byte in the file
                    if self.pos == 0 && self.peek() == '!' {
                        self.advance2();
                        self.skip_line_comment()?;
                        continue;
                    }

                    self.advance();
                    self.emit(Token::Hash, start_pos)
                }
                '0' => {
                    let token = match self.peek() {
                        'b' | 'B' => self.lex_binary_literal()?,
                        'o' | 'O' => self.lex_octal_literal()?,
                        'x' | 'X' => self.lex_hex_literal()?,
                        '0'..='9' => {
                            if let Some(error) =
                                self.legacy_octal_error(ParseError::LegacyOctalLiteralInStrictMode)
                            {
                                self.advance();
                                let loc = self.mark_loc(start_pos);
                                return self.error(loc, error);
                            }

                            if let Some(token) = self.lex_legacy_octal_literal() {
                                self.emit(token, start_pos)?
                            } else {
                                self.lex_decimal_literal()?
                            }
                        }
                        _ => self.lex_decimal_literal()?,
                    };

                    self.error_if_cannot_follow_numeric_literal()?;
                    Ok(token)
                }
                '1'..='9' => {
                    let token = self.lex_decimal_literal()?;
                    self.error_if_cannot_follow_numeric_literal()?;
                    Ok(token)
                }
                '"' | '\'' => self.lex_string_literal(),
                '`' => {
                    let start_pos = self.pos;
                    self.advance();
                    self.lex_template_literal(start_pos, true)
                }
                EOF_CHAR if self.pos >= self.buf.len() => self.emit(Token::Eof, start_pos),
                char if is_id_start_ascii(char) => self.lex_identifier_ascii(start_pos),
                // Escape sequence at the start of an identifier
                '\\' => {
                    let code_point = self.lex_identifier_unicode_escape_sequence()?;
                    if !is_id_start_ascii(code_point) && !is_id_start_unicode(code_point) {
                        let loc = self.mark_loc(start_pos);
                        return self.error(loc, ParseError::UnknownToken(code_point.into()));
                    }

                    self.is_current_escaped = true;
                    self.lex_identifier_non_ascii(start_pos, code_point.into())
                }
                other => {
                    if is_ascii(other) {
                        self.advance();
                        let loc = self.mark_loc(start_pos);
                        self.error(loc, ParseError::UnknownToken(other.into()))
                    } else {
                        let code_point = self.lex_utf8_codepoint()?;
                        if is_id_start_unicode(code_point) {
                            self.lex_identifier_non_ascii(start_pos, code_point.into())
                        } else if is_unicode_whitespace(code_point) {
                            continue;
                        } else if is_unicode_newline(code_point) {
                            self.is_new_line_before_current = true;
                            continue;
                        } else {
                            let loc = self.mark_loc(start_pos);
                            self.error(loc, ParseError::UnknownToken(code_point.into()))
                        }
                    }
                }
            };
        }
    }

    fn skip_line_comment(&mut self) -> ParseResult<()> {
        loop {
            match self.current {
                '\n' | '\r' => {
                    self.advance();
                    self.is_new_line_before_current = true;
                    return Ok(());
                }
                EOF_CHAR if self.pos >= self.buf.len() => return Ok(()),
                other => {
                    if is_ascii(other) {
                        self.advance()
                    } else {
                        let code_point = self.lex_utf8_codepoint()?;
                        if is_unicode_newline(code_point) {
                            self.is_new_line_before_current = true;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn skip_block_comment(&mut self, start_pos: Pos) -> ParseResult<()> {
        loop {
            match self.current {
                '*' if self.peek() == '/' => {
                    self.advance2();
                    break;
                }
                '\n' | '\r' => {
                    self.advance();
                    self.is_new_line_before_current = true;
                }
                EOF_CHAR if self.pos >= self.buf.len() => {
                    let loc = self.mark_loc(start_pos);
                    return self.error(loc, ParseError::UnterminatedBlockComment);
                }
                other => {
                    if is_ascii(other) {
                        self.advance()
                    } else {
                        let code_point = self.lex_utf8_codepoint()?;
                        if is_unicode_newline(code_point) {
                            self.is_new_line_before_current = true;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn error_invalid_unicode<T>(&self, start_pos: Pos) -> ParseResult<T> {
        let loc = self.mark_loc(start_pos);
        self.error(loc, ParseError::InvalidUnicode)
    }

    /// Lex a non-ascii unicode codepoint. Source text is always valid UTF-8, so this decodes the
    /// next char and advances past all of its bytes.
    fn lex_utf8_codepoint(&mut self) -> ParseResult<char> {
        let start_pos = self.pos;
        let bytes = self.buf.as_bytes();

        if start_pos >= bytes.len() || is_continuation_byte(bytes[start_pos]) {
            self.advance();
            return self.error_invalid_unicode(start_pos);
        }

        match self.buf[start_pos..].chars().next() {
            Some(char) => {
                self.advance_n(char.len_utf8());
                Ok(char)
            }
            None => {
                self.advance();
                self.error_invalid_unicode(start_pos)
            }
        }
    }

    /// Skip a series of decimal digits, possibly separated by numeric separators. Numeric
    /// separators must be adjacent to a numeric digit on both sides.
    ///
    /// Return whether any numeric separator was encountered.
    fn skip_decimal_digits(&mut self, allow_numeric_separator: bool) -> ParseResult<bool> {
        // First digit must be a decimal digit
        if !is_decimal_digit(self.current) {
            return Ok(false);
        }

        self.advance();

        // Middle digits may be decimal numbers or numeric separators
        let mut has_numeric_separator = false;
        let mut is_last_char_numeric_separator = false;

        loop {
            is_last_char_numeric_separator = if is_decimal_digit(self.current) {
                false
            } else if self.current == '_' && allow_numeric_separator {
                if is_last_char_numeric_separator {
                    let loc = self.mark_loc(self.pos);
                    return self.error(loc, ParseError::AdjacentNumericSeparators);
                }

                has_numeric_separator = true;

                true
            } else {
                break;
            };

            self.advance()
        }

        // Last digit cannot be a separator
        if is_last_char_numeric_separator {
            let loc = self.mark_loc(self.pos - 1);
            return self.error(loc, ParseError::TrailingNumericSeparator);
        }

        Ok(has_numeric_separator)
    }

    fn lex_decimal_literal(&mut self) -> LexResult {
        let start_pos = self.pos;
        let mut has_numeric_separator = false;

        let has_leading_zero = self.current == '0';
        let allow_numeric_separator = !has_leading_zero;

        // Read optional digits before the decimal point
        has_numeric_separator |= self.skip_decimal_digits(allow_numeric_separator)?;

        // This is a bigint literal
        if self.current == 'n' {
            // BigInts do not allow a leading zeros
            if has_leading_zero && self.pos - 1 != start_pos {
                let loc = self.mark_loc(start_pos);
                return self.error(loc, ParseError::BigIntLeadingZero);
            }

            let digits = self.buf[start_pos..self.pos].replace('_', "");
            self.advance();

            return self.emit_bigint(&digits, 10, start_pos);
        }

        // Read optional decimal point with its optional following digits
        if self.current == '.' {
            self.advance();
            has_numeric_separator |= self.skip_decimal_digits(true)?;
        }

        // Read optional exponent
        if self.current == 'e' || self.current == 'E' {
            self.advance();

            // Exponent has optional sign
            if self.current == '-' || self.current == '+' {
                self.advance();
            }

            if !is_decimal_digit(self.current) {
                let loc = self.mark_loc(start_pos);
                return self.error(loc, ParseError::MalformedNumericLiteral);
            }

            has_numeric_separator |= self.skip_decimal_digits(true)?;
        }

        // Rust stdlib cannot parse numeric separators, so strip them first if there were any
        let end_pos = self.pos;
        let parsed = if has_numeric_separator {
            f64::from_str(&self.buf[start_pos..end_pos].replace('_', ""))
        } else {
            f64::from_str(&self.buf[start_pos..end_pos])
        };

        match parsed {
            Ok(value) => self.emit(Token::NumberLiteral(value), start_pos),
            Err(_) => {
                let loc = self.mark_loc(start_pos);
                self.error(loc, ParseError::MalformedNumericLiteral)
            }
        }
    }

    fn emit_bigint(&self, digits: &str, radix: u32, start_pos: Pos) -> LexResult {
        match BigInt::from_str_radix(digits, radix) {
            Ok(value) => self.emit(Token::BigIntLiteral(value), start_pos),
            Err(_) => {
                let loc = self.mark_loc(start_pos);
                self.error(loc, ParseError::MalformedNumericLiteral)
            }
        }
    }

    #[inline]
    fn lex_literal_with_base(
        &mut self,
        radix: u32,
        char_to_digit: fn(char) -> Option<u32>,
    ) -> LexResult {
        let start_pos = self.pos;
        self.advance2();

        let mut value: f64;

        // First digit must be a digit in the base
        if let Some(digit) = char_to_digit(self.current) {
            value = digit as f64;
            self.advance()
        } else {
            let loc = self.mark_loc(start_pos);
            return self.error(loc, ParseError::MalformedNumericLiteral);
        }

        // Middle digits may be digits or numeric separators
        let mut is_last_char_numeric_separator = false;
        loop {
            is_last_char_numeric_separator = if let Some(digit) = char_to_digit(self.current) {
                value = value * (radix as f64) + (digit as f64);

                false
            } else if self.current == '_' {
                if is_last_char_numeric_separator {
                    let loc = self.mark_loc(self.pos);
                    return self.error(loc, ParseError::AdjacentNumericSeparators);
                }

                true
            } else {
                break;
            };

            self.advance()
        }

        // Last digit cannot be a separator
        if is_last_char_numeric_separator {
            let loc = self.mark_loc(self.pos - 1);
            return self.error(loc, ParseError::TrailingNumericSeparator);
        }

        if self.current == 'n' {
            let digits = self.buf[(start_pos + 2)..self.pos].replace('_', "");
            self.advance();

            return self.emit_bigint(&digits, radix, start_pos);
        }

        self.emit(Token::NumberLiteral(value), start_pos)
    }

    fn lex_binary_literal(&mut self) -> LexResult {
        self.lex_literal_with_base(2, get_binary_value)
    }

    fn lex_octal_literal(&mut self) -> LexResult {
        self.lex_literal_with_base(8, get_octal_value)
    }

    fn lex_hex_literal(&mut self) -> LexResult {
        self.lex_literal_with_base(16, get_hex_value)
    }

    fn lex_legacy_octal_literal(&mut self) -> Option<Token> {
        let save_state = self.save();

        let mut value: f64 = 0.0;

        while let Some(digit) = get_octal_value(self.current) {
            value = value * 8.0 + digit as f64;
            self.advance();
        }

        // Reparse as decimal literal if we encounter a non-octal digit
        if self.current == '8' || self.current == '9' {
            self.restore(&save_state);
            return None;
        }

        Some(Token::NumberLiteral(value))
    }

    fn error_if_cannot_follow_numeric_literal(&mut self) -> ParseResult<()> {
        let start_pos = self.pos;

        let cannot_follow_numeric_literal;
        let end_pos;

        if is_ascii(self.current) {
            cannot_follow_numeric_literal = is_id_start_ascii(self.current)
                || is_decimal_digit(self.current)
                || self.current == '\\';
            end_pos = self.pos + 1;
        } else if self.current == EOF_CHAR && self.pos >= self.buf.len() {
            cannot_follow_numeric_literal = false;
            end_pos = self.pos;
        } else {
            // Peek at next code point
            let save_state = self.save();
            let code_point = self.lex_utf8_codepoint()?;

            cannot_follow_numeric_literal = is_id_start_unicode(code_point);
            end_pos = self.pos;

            self.restore(&save_state);
        }

        if cannot_follow_numeric_literal {
            let loc = Loc { start: start_pos, end: end_pos };
            self.error(loc, ParseError::InvalidNumericLiteralNextChar)
        } else {
            Ok(())
        }
    }

    fn lex_string_literal(&mut self) -> LexResult {
        let quote_char = self.current;
        let start_pos = self.pos;
        self.advance();

        let mut value = String::new();

        loop {
            match self.current {
                quote if quote == quote_char => break,
                // Escape sequences
                '\\' => match self.peek() {
                    // Single character escapes
                    'n' => {
                        value.push('\n');
                        self.advance2()
                    }
                    't' => {
                        value.push('\t');
                        self.advance2()
                    }
                    'r' => {
                        value.push('\r');
                        self.advance2()
                    }
                    'b' => {
                        value.push('\x08');
                        self.advance2()
                    }
                    'v' => {
                        value.push('\x0B');
                        self.advance2()
                    }
                    'f' => {
                        value.push('\x0C');
                        self.advance2()
                    }
                    // Null character escape
                    '0' if !is_decimal_digit(self.peek2()) => {
                        value.push('\x00');
                        self.advance2()
                    }
                    // Legacy octal escape
                    first_digit @ ('0'..='7') => {
                        let escape_start_pos = self.pos;
                        self.advance2();

                        let mut octal_value = first_digit as u32 - '0' as u32;

                        if let Some(next_digit) = get_octal_value(self.current) {
                            octal_value = octal_value * 8 + next_digit;
                            self.advance();

                            if first_digit <= '3' {
                                if let Some(next_digit) = get_octal_value(self.current) {
                                    octal_value = octal_value * 8 + next_digit;
                                    self.advance();
                                }
                            }
                        }

                        if let Some(error) = self
                            .legacy_octal_error(ParseError::LegacyOctalEscapeSequenceInStrictMode)
                        {
                            let loc = self.mark_loc(escape_start_pos);
                            return self.error(loc, error);
                        }

                        value.push(char::from(octal_value as u8))
                    }
                    // Legacy non-octal escape
                    char @ ('8' | '9') => {
                        let escape_start_pos = self.pos;
                        self.advance2();

                        if let Some(error) = self.legacy_octal_error(
                            ParseError::LegacyNonOctalEscapeSequenceInStrictMode,
                        ) {
                            let loc = self.mark_loc(escape_start_pos);
                            return self.error(loc, error);
                        }

                        value.push(char)
                    }
                    // Hex escape sequence
                    'x' => {
                        self.advance2();
                        let escaped_char = self.lex_hex_escape_sequence()?;
                        value.push(escaped_char);
                    }
                    // Unicode escape sequence
                    'u' => {
                        let escape_start_pos = self.pos;
                        self.advance2();
                        let code_point = self.lex_unicode_escape_sequence(escape_start_pos)?;
                        value.push(code_point)
                    }
                    // Line continuations, either LF, CR, or CRLF. Ignored in string value.
                    '\n' => self.advance2(),
                    '\r' => {
                        self.advance2();

                        if self.current == '\n' {
                            self.advance()
                        }
                    }
                    // Non-escape character, use character directly
                    other => {
                        if is_ascii(other) {
                            self.advance2();
                            value.push(other);
                        } else if other == EOF_CHAR && self.pos + 1 >= self.buf.len() {
                            self.advance();
                            let loc = self.mark_loc(self.pos);
                            return self.error(loc, ParseError::UnterminatedStringLiteral);
                        } else {
                            self.advance();
                            let code_point = self.lex_utf8_codepoint()?;

                            // Unicode line continuations are ignored in string value
                            if !is_unicode_newline(code_point) {
                                value.push(code_point);
                            }
                        }
                    }
                },
                // Unterminated string literal
                '\n' | '\r' => {
                    let loc = self.mark_loc(self.pos);
                    return self.error(loc, ParseError::UnterminatedStringLiteral);
                }
                EOF_CHAR if self.pos >= self.buf.len() => {
                    let loc = self.mark_loc(self.pos);
                    return self.error(loc, ParseError::UnterminatedStringLiteral);
                }
                _ => value.push(self.lex_ascii_or_unicode_character()?),
            }
        }

        self.advance();

        self.emit(Token::StringLiteral(value), start_pos)
    }

    /// Lex the two hex digits of a hex escape, called after the `\x` prefix.
    fn lex_hex_escape_sequence(&mut self) -> ParseResult<char> {
        if let Some(x1) = get_hex_value(self.current) {
            if let Some(x2) = get_hex_value(self.peek()) {
                self.advance2();
                return Ok(char::from((x1 * 16 + x2) as u8));
            }
        }

        let loc = self.mark_loc(self.pos);
        self.error(loc, ParseError::MalformedEscapeSequence)
    }

    // Lex a regexp literal. Must be called when the previously lexed token was a '/' or '/='.
    pub fn next_regexp_literal(&mut self, start_pos: Pos) -> LexResult {
        let pattern_start_pos = start_pos + 1;
        self.current = '/';
        self.pos = start_pos;
        self.advance();

        // RegularExpressionFirstChar
        self.lex_regex_character(false)?;

        // RegularExpressionChars
        while self.current != '/' {
            self.lex_regex_character(false)?;
        }

        let pattern_end_pos = self.pos;

        self.advance();

        // Consume optional flags, which are IdentifierPartChars
        let flags_start_pos = self.pos;

        loop {
            // EOF signals the end of the flags
            if self.current == EOF_CHAR && self.pos >= self.buf.len() {
                break;
            }

            if is_ascii(self.current) {
                if is_id_part_ascii(self.current) {
                    self.advance();
                } else {
                    break;
                }
            } else {
                // Otherwise must be a utf-8 encoded codepoint
                let save_state = self.save();
                let code_point = self.lex_utf8_codepoint()?;
                if !is_id_part_unicode(code_point) {
                    // Restore to before codepoint if not part of the flags
                    self.restore(&save_state);
                    break;
                }
            }
        }

        let pattern = String::from(&self.buf[pattern_start_pos..pattern_end_pos]);
        let flags = String::from(&self.buf[flags_start_pos..self.pos]);
        let raw = String::from(&self.buf[start_pos..self.pos]);

        self.emit(Token::RegExpLiteral { raw, pattern, flags }, start_pos)
    }

    fn lex_regex_character(&mut self, in_class: bool) -> ParseResult<()> {
        match self.current {
            '\\' => {
                self.advance();
                self.lex_regexp_character_non_line_terminator()?;
            }
            EOF_CHAR if self.pos >= self.buf.len() => {
                let loc = self.mark_loc(self.pos);
                return self.error(loc, ParseError::UnterminatedRegExpLiteral);
            }
            '[' if !in_class => {
                self.advance();

                while self.current != ']' {
                    self.lex_regex_character(true)?;
                }

                self.advance();
            }
            _ => {
                self.lex_regexp_character_non_line_terminator()?;
            }
        }

        Ok(())
    }

    fn lex_regexp_character_non_line_terminator(&mut self) -> ParseResult<()> {
        if self.current == EOF_CHAR && self.pos >= self.buf.len() {
            let loc = self.mark_loc(self.pos);
            return self.error(loc, ParseError::UnterminatedRegExpLiteral);
        }

        let char = self.lex_ascii_or_unicode_character()?;

        if is_newline(char) {
            let loc = self.mark_loc(self.pos);
            self.error(loc, ParseError::UnterminatedRegExpLiteral)
        } else {
            Ok(())
        }
    }

    // Get the next template part after the end of a template expression. Must be called when the
    // previously lexed token was a '}'.
    pub fn next_template_part(&mut self) -> LexResult {
        let start_pos = self.pos - 1;
        self.lex_template_literal(start_pos, false)
    }

    fn lex_template_literal(&mut self, start_pos: Pos, is_head: bool) -> LexResult {
        let mut value = String::new();

        let is_tail;
        let raw_start_pos = self.pos;
        let raw_end_pos;

        let mut has_cr = false;
        let mut malformed_error_loc = None;

        loop {
            match self.current {
                // Escape sequences
                '\\' => match self.peek() {
                    // Single character escapes
                    'n' => {
                        value.push('\n');
                        self.advance2()
                    }
                    't' => {
                        value.push('\t');
                        self.advance2()
                    }
                    'r' => {
                        value.push('\r');
                        self.advance2()
                    }
                    'b' => {
                        value.push('\x08');
                        self.advance2()
                    }
                    'v' => {
                        value.push('\x0B');
                        self.advance2()
                    }
                    'f' => {
                        value.push('\x0C');
                        self.advance2()
                    }
                    '0' if !is_decimal_digit(self.peek2()) => {
                        value.push('\x00');
                        self.advance2()
                    }
                    // Octal escape sequences are never allowed in templates
                    '0'..='9' => {
                        malformed_error_loc = Some(self.mark_loc(self.pos));
                        self.advance2();
                    }
                    // Hex escape sequence
                    'x' => {
                        self.advance2();

                        match self.lex_hex_escape_sequence() {
                            Ok(escaped_char) => value.push(escaped_char),
                            Err(err) => malformed_error_loc = err.source_loc.map(|(loc, _)| loc),
                        }
                    }
                    // Unicode escape sequence
                    'u' => {
                        let escape_start_pos = self.pos;
                        self.advance2();

                        match self.lex_unicode_escape_sequence(escape_start_pos) {
                            Ok(code_point) => value.push(code_point),
                            Err(err) => malformed_error_loc = err.source_loc.map(|(loc, _)| loc),
                        }
                    }
                    // Line continuations, which are excluded in cooked value
                    '\n' => self.advance2(),
                    '\r' => {
                        self.advance2();

                        has_cr = true;

                        if self.current == '\n' {
                            self.advance()
                        }
                    }
                    // Non-escape character, use character directly
                    other => {
                        if is_ascii(other) {
                            self.advance2();
                            value.push(other);
                        } else if other == EOF_CHAR && self.pos + 1 >= self.buf.len() {
                            let loc = self.mark_loc(start_pos);
                            return self.error(loc, ParseError::UnterminatedTemplateLiteral);
                        } else {
                            self.advance();
                            let code_point = self.lex_utf8_codepoint()?;

                            // Unicode line continuations are ignored in string value
                            if !is_unicode_newline(code_point) {
                                value.push(code_point);
                            }
                        }
                    }
                },
                // Start of an expression in the template literal
                '$' if self.peek() == '{' => {
                    raw_end_pos = self.pos;
                    is_tail = false;

                    self.advance2();

                    break;
                }
                // End of the entire template literal
                '`' => {
                    raw_end_pos = self.pos;
                    is_tail = true;

                    self.advance();

                    break;
                }
                // CR and CRLF are converted to LF to both raw and cooked strings
                '\r' => {
                    self.advance();

                    has_cr = true;
                    value.push('\n');

                    if self.current == '\n' {
                        self.advance()
                    }
                }
                EOF_CHAR if self.pos >= self.buf.len() => {
                    let loc = self.mark_loc(start_pos);
                    return self.error(loc, ParseError::UnterminatedTemplateLiteral);
                }
                _ => value.push(self.lex_ascii_or_unicode_character()?),
            }
        }

        let mut raw = String::from(&self.buf[raw_start_pos..raw_end_pos]);

        // CR and CRLF are both converted to LF in raw string. This requires copying the string
        // again, so only perform the replace if a CR was encountered.
        if has_cr {
            raw = raw.replace("\r\n", "\n").replace('\r', "\n");
        }

        // Only return cooked string if a malformed error location was not found
        let cooked = match malformed_error_loc {
            None => Ok(value),
            Some(loc) => Err(loc),
        };

        self.emit(Token::TemplatePart { raw, cooked, is_head, is_tail }, start_pos)
    }

    #[inline]
    fn lex_ascii_or_unicode_character(&mut self) -> ParseResult<char> {
        if is_ascii(self.current) {
            let ascii_char = self.current;
            self.advance();
            Ok(ascii_char)
        } else {
            self.lex_utf8_codepoint()
        }
    }

    // Lex a single unicode escape sequence, called after the '\u' prefix has already been processed
    fn lex_unicode_escape_sequence(&mut self, start_pos: Pos) -> ParseResult<char> {
        let value = self.lex_unicode_escape_value(start_pos)?;

        // A high surrogate escape may be followed by a low surrogate escape, forming a pair
        if (0xD800..=0xDBFF).contains(&value) && self.current == '\\' && self.peek() == 'u' {
            let save_state = self.save();
            let low_start_pos = self.pos;
            self.advance2();

            if let Ok(low) = self.lex_unicode_escape_value(low_start_pos) {
                if (0xDC00..=0xDFFF).contains(&low) {
                    let code_point = 0x10000 + ((value - 0xD800) << 10) + (low - 0xDC00);
                    return Ok(char::from_u32(code_point).unwrap_or(REPLACEMENT_CHAR));
                }
            }

            self.restore(&save_state);
        }

        Ok(char::from_u32(value).unwrap_or(REPLACEMENT_CHAR))
    }

    fn lex_unicode_escape_value(&mut self, start_pos: Pos) -> ParseResult<u32> {
        // Escape sequence has form \u{HEX_DIGITS}
        if self.current == '{' {
            self.advance();

            if self.current == '}' {
                let loc = self.mark_loc(start_pos);
                return self.error(loc, ParseError::MalformedEscapeSequence);
            }

            let mut value: u32 = 0;
            while let Some(hex_value) = get_hex_value(self.current) {
                self.advance();
                value = value * 16 + hex_value;

                // Check that value is not out of range (greater than 0x10FFFF)
                if value > 0x10FFFF {
                    let loc = self.mark_loc(start_pos);
                    return self.error(loc, ParseError::MalformedEscapeSequence);
                }
            }

            if self.current != '}' {
                let loc = self.mark_loc(start_pos);
                return self.error(loc, ParseError::MalformedEscapeSequence);
            }

            self.advance();

            return Ok(value);
        }

        // Otherwise this is \uXXXX so expect exactly four hex digits
        let mut value = 0;
        for _ in 0..4 {
            if let Some(hex_value) = get_hex_value(self.current) {
                self.advance();
                value = value * 16 + hex_value;
            } else {
                let loc = self.mark_loc(start_pos);
                return self.error(loc, ParseError::MalformedEscapeSequence);
            }
        }

        Ok(value)
    }

    // Fast path for lexing a purely ASCII identifier
    fn lex_identifier_ascii(&mut self, start_pos: Pos) -> LexResult {
        // Consume the id start ASCII character
        self.advance();

        loop {
            if is_id_part_ascii(self.current) {
                self.advance();
            } else if (is_ascii(self.current) && self.current != '\\')
                || (self.current == EOF_CHAR && self.pos >= self.buf.len())
            {
                break;
            } else {
                // Start of an escape sequence or non-ASCII character so bail to slow path,
                // copying over ASCII string that has been created so far.
                let string_builder = String::from(&self.buf[start_pos..self.pos]);
                return self.lex_identifier_non_ascii(start_pos, string_builder);
            }
        }

        let id_string = &self.buf[start_pos..self.pos];

        match Token::keyword_from_str(id_string) {
            Some(keyword_token) => self.emit(keyword_token, start_pos),
            None => self.emit(Token::Identifier(String::from(id_string)), start_pos),
        }
    }

    // Slow path for lexing an identifier with at least one unicode character or escape sequence.
    // Input the string that has been created so far before falling back to this slow path.
    fn lex_identifier_non_ascii(
        &mut self,
        start_pos: Pos,
        mut string_builder: String,
    ) -> LexResult {
        loop {
            // Check if ASCII
            if is_ascii(self.current) {
                if is_id_part_ascii(self.current) {
                    string_builder.push(self.current);
                    self.advance();
                } else if self.current == '\\' {
                    let code_point = self.lex_identifier_unicode_escape_sequence()?;
                    if !is_id_part_ascii(code_point) && !is_id_part_unicode(code_point) {
                        let loc = self.mark_loc(self.pos);
                        return self.error(loc, ParseError::UnknownToken(code_point.into()));
                    }

                    self.is_current_escaped = true;
                    string_builder.push(code_point);
                } else {
                    break;
                }
            } else if self.current == EOF_CHAR && self.pos >= self.buf.len() {
                break;
            } else {
                // Otherwise must be a utf-8 encoded codepoint
                let save_state = self.save();
                let code_point = self.lex_utf8_codepoint()?;
                if is_id_part_unicode(code_point) {
                    string_builder.push(code_point);
                } else {
                    // Restore to before codepoint if not part of the id
                    self.restore(&save_state);
                    break;
                }
            }
        }

        // Escaped keywords are identifiers flagged as escaped, so that they are never treated as
        // keywords.
        if !self.is_current_escaped {
            if let Some(keyword_token) = Token::keyword_from_str(&string_builder) {
                return self.emit(keyword_token, start_pos);
            }
        }

        self.emit(Token::Identifier(string_builder), start_pos)
    }

    fn lex_identifier_unicode_escape_sequence(&mut self) -> ParseResult<char> {
        let escape_start_pos = self.pos;
        self.advance();

        if self.current == 'u' {
            self.advance();
            self.lex_unicode_escape_sequence(escape_start_pos)
        } else {
            let loc = self.mark_loc(escape_start_pos);
            self.error(loc, ParseError::MalformedEscapeSequence)
        }
    }
}
