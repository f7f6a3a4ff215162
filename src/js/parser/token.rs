use std::fmt;

use bitflags::bitflags;
use num_bigint::BigInt;

use super::loc::Loc;

bitflags! {
    /// Facts about how a token appeared in the source, independent of its kind.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TokenFlags: u8 {
        /// The token was written with at least one unicode escape sequence.
        const ESCAPED = 1 << 0;
        /// A line terminator appeared between the previous token and this token.
        const NEW_LINE_BEFORE = 1 << 1;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Identifier(String),
    NumberLiteral(f64),
    BigIntLiteral(BigInt),
    StringLiteral(String),
    TemplatePart {
        raw: String,
        /// Cooked string value, or the location of the first malformed escape sequence
        cooked: Result<String, Loc>,
        is_head: bool,
        is_tail: bool,
    },
    RegExpLiteral {
        raw: String,
        pattern: String,
        flags: String,
    },
    Eof,
    // Operators
    Equals,
    AddEq,
    SubtractEq,
    MultiplyEq,
    DivideEq,
    RemainderEq,
    ExponentEq,
    AndEq,
    OrEq,
    XorEq,
    ShiftLeftEq,
    ShiftRightArithmeticEq,
    ShiftRightLogicalEq,
    LogicalAndEq,
    LogicalOrEq,
    NullishCoalesceEq,
    Plus,
    Minus,
    Multiply,
    Divide,
    Remainder,
    Exponent,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ShiftLeft,
    ShiftRightArithmetic,
    ShiftRightLogical,
    Increment,
    Decrement,
    LogicalNot,
    BitwiseNot,
    LogicalAnd,
    LogicalOr,
    NullishCoalesce,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    // Punctuation
    Semicolon,
    Comma,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Question,
    QuestionDot,
    Colon,
    Period,
    Spread,
    Arrow,
    Hash,
    // Reserved words
    Var,
    Const,
    Function,
    This,
    If,
    Else,
    Switch,
    Case,
    Default,
    For,
    While,
    Do,
    With,
    Return,
    Break,
    Continue,
    Try,
    Catch,
    Finally,
    Throw,
    Null,
    True,
    False,
    In,
    InstanceOf,
    New,
    Typeof,
    Void,
    Delete,
    Debugger,
    Class,
    Extends,
    Super,
    Import,
    Export,
    Enum,
    // Words that are only keywords in some contexts
    Let,
    Static,
    Yield,
    Await,
    Async,
    Of,
    Get,
    Set,
    Target,
    // Reserved only in strict mode code
    Implements,
    Interface,
    Package,
    Private,
    Protected,
    Public,
}

impl Token {
    /// Map a word to its keyword token, if the word is a keyword in any context.
    pub fn keyword_from_str(word: &str) -> Option<Token> {
        let token = match word {
            "var" => Token::Var,
            "let" => Token::Let,
            "const" => Token::Const,
            "function" => Token::Function,
            "async" => Token::Async,
            "this" => Token::This,
            "if" => Token::If,
            "else" => Token::Else,
            "switch" => Token::Switch,
            "case" => Token::Case,
            "default" => Token::Default,
            "for" => Token::For,
            "of" => Token::Of,
            "while" => Token::While,
            "do" => Token::Do,
            "with" => Token::With,
            "return" => Token::Return,
            "break" => Token::Break,
            "continue" => Token::Continue,
            "try" => Token::Try,
            "catch" => Token::Catch,
            "finally" => Token::Finally,
            "throw" => Token::Throw,
            "null" => Token::Null,
            "true" => Token::True,
            "false" => Token::False,
            "in" => Token::In,
            "instanceof" => Token::InstanceOf,
            "new" => Token::New,
            "typeof" => Token::Typeof,
            "void" => Token::Void,
            "delete" => Token::Delete,
            "debugger" => Token::Debugger,
            "static" => Token::Static,
            "class" => Token::Class,
            "extends" => Token::Extends,
            "super" => Token::Super,
            "get" => Token::Get,
            "set" => Token::Set,
            "target" => Token::Target,
            "import" => Token::Import,
            "export" => Token::Export,
            "await" => Token::Await,
            "yield" => Token::Yield,
            "enum" => Token::Enum,
            "implements" => Token::Implements,
            "interface" => Token::Interface,
            "package" => Token::Package,
            "private" => Token::Private,
            "protected" => Token::Protected,
            "public" => Token::Public,
            _ => return None,
        };

        Some(token)
    }

    /// The source text of a keyword token, or None for all other tokens.
    pub fn keyword_str(&self) -> Option<&'static str> {
        let str = match self {
            Token::Var => "var",
            Token::Let => "let",
            Token::Const => "const",
            Token::Function => "function",
            Token::Async => "async",
            Token::This => "this",
            Token::If => "if",
            Token::Else => "else",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::For => "for",
            Token::Of => "of",
            Token::While => "while",
            Token::Do => "do",
            Token::With => "with",
            Token::Return => "return",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Try => "try",
            Token::Catch => "catch",
            Token::Finally => "finally",
            Token::Throw => "throw",
            Token::Null => "null",
            Token::True => "true",
            Token::False => "false",
            Token::In => "in",
            Token::InstanceOf => "instanceof",
            Token::New => "new",
            Token::Typeof => "typeof",
            Token::Void => "void",
            Token::Delete => "delete",
            Token::Debugger => "debugger",
            Token::Static => "static",
            Token::Class => "class",
            Token::Extends => "extends",
            Token::Super => "super",
            Token::Get => "get",
            Token::Set => "set",
            Token::Target => "target",
            Token::Import => "import",
            Token::Export => "export",
            Token::Await => "await",
            Token::Yield => "yield",
            Token::Enum => "enum",
            Token::Implements => "implements",
            Token::Interface => "interface",
            Token::Package => "package",
            Token::Private => "private",
            Token::Protected => "protected",
            Token::Public => "public",
            _ => return None,
        };

        Some(str)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(keyword) = self.keyword_str() {
            return f.write_str(keyword);
        }

        let str = match self {
            Token::Identifier(name) => return f.write_str(name),
            Token::NumberLiteral(value) => return write!(f, "{}", value),
            Token::BigIntLiteral(value) => return write!(f, "{}n", value),
            Token::StringLiteral(value) => return write!(f, "\"{}\"", value),
            Token::TemplatePart { raw, .. } => return write!(f, "`{}`", raw),
            Token::RegExpLiteral { raw, .. } => return f.write_str(raw),
            Token::Eof => "<EOF>",
            Token::Equals => "=",
            Token::AddEq => "+=",
            Token::SubtractEq => "-=",
            Token::MultiplyEq => "*=",
            Token::DivideEq => "/=",
            Token::RemainderEq => "%=",
            Token::ExponentEq => "**=",
            Token::AndEq => "&=",
            Token::OrEq => "|=",
            Token::XorEq => "^=",
            Token::ShiftLeftEq => "<<=",
            Token::ShiftRightArithmeticEq => ">>=",
            Token::ShiftRightLogicalEq => ">>>=",
            Token::LogicalAndEq => "&&=",
            Token::LogicalOrEq => "||=",
            Token::NullishCoalesceEq => "??=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Multiply => "*",
            Token::Divide => "/",
            Token::Remainder => "%",
            Token::Exponent => "**",
            Token::BitwiseAnd => "&",
            Token::BitwiseOr => "|",
            Token::BitwiseXor => "^",
            Token::ShiftLeft => "<<",
            Token::ShiftRightArithmetic => ">>",
            Token::ShiftRightLogical => ">>>",
            Token::Increment => "++",
            Token::Decrement => "--",
            Token::LogicalNot => "!",
            Token::BitwiseNot => "~",
            Token::LogicalAnd => "&&",
            Token::LogicalOr => "||",
            Token::NullishCoalesce => "??",
            Token::EqEq => "==",
            Token::EqEqEq => "===",
            Token::NotEq => "!=",
            Token::NotEqEq => "!==",
            Token::GreaterThan => ">",
            Token::GreaterThanOrEqual => ">=",
            Token::LessThan => "<",
            Token::LessThanOrEqual => "<=",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::Question => "?",
            Token::QuestionDot => "?.",
            Token::Colon => ":",
            Token::Period => ".",
            Token::Spread => "...",
            Token::Arrow => "=>",
            Token::Hash => "#",
            _ => "<keyword>",
        };

        f.write_str(str)
    }
}
