use std::error::Error;
use std::rc::Rc;
use std::{fmt, io};

use super::{loc::Loc, source::Source, token::Token};

/// Errors that the language requires to be reported before any code runs, beyond plain grammar
/// violations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EarlyError {
    /// A `yield` expression or `yield` keyword appears where it is not allowed.
    InvalidYieldUsage,
    /// An expression cannot be reinterpreted as an assignment or binding pattern.
    InvalidDestructuringTarget,
    /// The same name is bound twice where duplicates are forbidden.
    DuplicateBinding(String),
    /// A reserved word or restricted name is used as a binding identifier.
    ReservedWordBinding(String),
}

impl fmt::Display for EarlyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EarlyError::InvalidYieldUsage => write!(f, "Yield expression not allowed here"),
            EarlyError::InvalidDestructuringTarget => write!(f, "Invalid destructuring target"),
            EarlyError::DuplicateBinding(name) => write!(f, "Duplicate binding {}", name),
            EarlyError::ReservedWordBinding(name) => {
                write!(f, "'{}' cannot be used as a binding identifier here", name)
            }
        }
    }
}

/// Coarse classification of a parse error, used by callers that only care about which rule was
/// violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    SyntaxError,
    InvalidYieldUsage,
    InvalidDestructuringTarget,
    DuplicateBinding,
    ReservedWordBinding,
}

#[derive(Debug)]
pub enum ParseError {
    Io(io::Error),
    Early(EarlyError),
    UnknownToken(String),
    UnexpectedToken(Token),
    ExpectedToken(Token, Token),
    InvalidUnicode,
    UnterminatedStringLiteral,
    UnterminatedTemplateLiteral,
    UnterminatedRegExpLiteral,
    UnterminatedBlockComment,
    MalformedEscapeSequence,
    MalformedNumericLiteral,
    InvalidNumericLiteralNextChar,
    BigIntLeadingZero,
    TrailingNumericSeparator,
    AdjacentNumericSeparators,
    LegacyOctalLiteralInStrictMode,
    LegacyOctalEscapeSequenceInStrictMode,
    LegacyNonOctalEscapeSequenceInStrictMode,
    LegacyOctalWithoutWebCompat,
    RestTrailingComma,
    RestNotLast,
    ThrowArgumentOnNewLine,
    ArrowOnNewLine,
    AmbiguousLetBracket,
    InvalidAssignmentLeftHandSide,
    InvalidForLeftHandSide,
    InvalidUpdateExpressionArgument,
    IdentifierIsReservedWord(String),
    AwaitNotAllowed,
    AwaitInParameters,
    ExpectedNewTarget,
    ForEachInitInvalidVarDecl,
    DuplicateLabel,
    LabelNotFound,
    WithInStrictMode,
    DeleteIdentifierInStrictMode,
    AssignEvalInStrictMode,
    AssignArgumentsInStrictMode,
    UseStrictFunctionNonSimpleParameterList,
    InvalidLabeledFunction(bool),
    FunctionDeclarationNotAllowed,
    ReturnOutsideFunction,
    ContinueOutsideIterable,
    UnlabeledBreakOutsideBreakable,
    MultipleConstructors,
    NonSimpleConstructor,
    ClassStaticPrototype,
    InvalidPatternInitializer,
    NewTargetOutsideFunction,
    SuperPropertyOutsideMethod,
    SuperCallOutsideDerivedConstructor,
    DuplicateProtoProperty,
    ConstWithoutInitializer,
    GetterWrongNumberOfParams,
    SetterWrongNumberOfParams,
    NullishCoalesceMixedWithLogical,
    ExponentLeftHandSideUnary,
    TaggedTemplateInOptionalChain,
    ParenthesizedListNotAnExpression,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Io(_) => ErrorKind::Io,
            ParseError::Early(EarlyError::InvalidYieldUsage) => ErrorKind::InvalidYieldUsage,
            ParseError::Early(EarlyError::InvalidDestructuringTarget) => {
                ErrorKind::InvalidDestructuringTarget
            }
            ParseError::Early(EarlyError::DuplicateBinding(_)) => ErrorKind::DuplicateBinding,
            ParseError::Early(EarlyError::ReservedWordBinding(_)) => ErrorKind::ReservedWordBinding,
            _ => ErrorKind::SyntaxError,
        }
    }
}

impl From<EarlyError> for ParseError {
    fn from(error: EarlyError) -> ParseError {
        ParseError::Early(error)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Io(io_error) => {
                f.write_str("Error: ")?;
                io_error.fmt(f)
            }
            ParseError::Early(early_error) => early_error.fmt(f),
            ParseError::UnknownToken(token) => write!(f, "Unknown token {}", token),
            ParseError::UnexpectedToken(token) => write!(f, "Unexpected token {}", token),
            ParseError::ExpectedToken(actual, expected) => {
                write!(f, "Unexpected token {}, expected {}", actual, expected)
            }
            ParseError::InvalidUnicode => write!(f, "Invalid utf-8 sequence"),
            ParseError::UnterminatedStringLiteral => write!(f, "Unterminated string literal"),
            ParseError::UnterminatedTemplateLiteral => write!(f, "Unterminated template literal"),
            ParseError::UnterminatedRegExpLiteral => {
                write!(f, "Unterminated regular expression literal")
            }
            ParseError::UnterminatedBlockComment => write!(f, "Unterminated block comment"),
            ParseError::MalformedEscapeSequence => write!(f, "Malformed escape sequence"),
            ParseError::MalformedNumericLiteral => write!(f, "Malformed numeric literal"),
            ParseError::InvalidNumericLiteralNextChar => {
                write!(
                    f,
                    "Numeric literal cannot be immediately followed by an identifier or digit"
                )
            }
            ParseError::BigIntLeadingZero => write!(f, "BigInt cannot have a leading zero"),
            ParseError::TrailingNumericSeparator => write!(
                f,
                "Underscore can appear only between digits, not after the last digit in a number"
            ),
            ParseError::AdjacentNumericSeparators => {
                write!(f, "Number cannot contain multiple adjacent underscores")
            }
            ParseError::LegacyOctalLiteralInStrictMode => {
                write!(f, "Legacy octal literals are not allowed in strict mode")
            }
            ParseError::LegacyOctalEscapeSequenceInStrictMode => {
                write!(f, "Octal escape sequences are not allowed in strict mode")
            }
            ParseError::LegacyNonOctalEscapeSequenceInStrictMode => {
                write!(f, "\\8 and \\9 are not allowed in strict mode")
            }
            ParseError::LegacyOctalWithoutWebCompat => {
                write!(f, "Legacy octal syntax requires web compatibility")
            }
            ParseError::RestTrailingComma => {
                write!(f, "Rest element may not have a trailing comma")
            }
            ParseError::RestNotLast => write!(f, "Rest element must be last element"),
            ParseError::ThrowArgumentOnNewLine => {
                write!(f, "No line break is allowed between 'throw' and its expression")
            }
            ParseError::ArrowOnNewLine => {
                write!(f, "No line break is allowed between arrow arguments and '=>'")
            }
            ParseError::AmbiguousLetBracket => {
                write!(f, "Expression cannot start with ambiguous `let [`")
            }
            ParseError::InvalidAssignmentLeftHandSide => {
                write!(f, "Invalid left hand side of assignment")
            }
            ParseError::InvalidForLeftHandSide => {
                write!(f, "Invalid left hand side of for statement")
            }
            ParseError::InvalidUpdateExpressionArgument => {
                write!(f, "Invalid increment/decrement operand")
            }
            ParseError::IdentifierIsReservedWord(name) => {
                write!(f, "Identifier '{}' is a reserved word", name)
            }
            ParseError::AwaitNotAllowed => write!(f, "Await expression not allowed here"),
            ParseError::AwaitInParameters => {
                write!(f, "Await is not allowed in async function parameters")
            }
            ParseError::ExpectedNewTarget => write!(f, "Expected new.target"),
            ParseError::ForEachInitInvalidVarDecl => {
                write!(
                    f,
                    "Variable declarations in the left hand side of a for each loop must contain a \
                    single declaration with no initializer"
                )
            }
            ParseError::DuplicateLabel => write!(f, "Duplicate label"),
            ParseError::LabelNotFound => write!(f, "Label not found"),
            ParseError::WithInStrictMode => {
                write!(f, "Strict mode code may not contain 'with' statements")
            }
            ParseError::DeleteIdentifierInStrictMode => {
                write!(f, "Cannot delete variables in strict mode code")
            }
            ParseError::AssignEvalInStrictMode => {
                write!(f, "Cannot assign to 'eval' in strict mode code")
            }
            ParseError::AssignArgumentsInStrictMode => {
                write!(f, "Cannot assign to 'arguments' in strict mode code")
            }
            ParseError::UseStrictFunctionNonSimpleParameterList => {
                write!(f, "'use strict' only allowed in functions with simple parameter lists")
            }
            ParseError::InvalidLabeledFunction(true) => write!(f, "Functions cannot be labeled"),
            ParseError::InvalidLabeledFunction(false) => {
                write!(f, "Functions can only be labeled inside blocks")
            }
            ParseError::FunctionDeclarationNotAllowed => {
                write!(f, "Function declarations are not allowed in this position")
            }
            ParseError::ReturnOutsideFunction => write!(f, "Return must be inside function"),
            ParseError::ContinueOutsideIterable => write!(f, "Continue must be inside loop"),
            ParseError::UnlabeledBreakOutsideBreakable => {
                write!(f, "Unlabeled break must be inside loop or switch")
            }
            ParseError::MultipleConstructors => {
                write!(f, "Class can only have a single constructor")
            }
            ParseError::NonSimpleConstructor => write!(f, "Constructors must be simple methods"),
            ParseError::ClassStaticPrototype => {
                write!(f, "Classes cannot have a static prototype field or method")
            }
            ParseError::InvalidPatternInitializer => {
                write!(f, "Object property initializers do not use `=`")
            }
            ParseError::NewTargetOutsideFunction => {
                write!(f, "new.target only allowed in functions")
            }
            ParseError::SuperPropertyOutsideMethod => {
                write!(f, "Super property accesses only allowed in methods")
            }
            ParseError::SuperCallOutsideDerivedConstructor => {
                write!(f, "Super calls only allowed in derived constructors")
            }
            ParseError::DuplicateProtoProperty => {
                write!(f, "Duplicate __proto__ properties are not allowed in object literals")
            }
            ParseError::ConstWithoutInitializer => {
                write!(f, "Const declarations must have an initializer")
            }
            ParseError::GetterWrongNumberOfParams => {
                write!(f, "Getter functions must have no parameters")
            }
            ParseError::SetterWrongNumberOfParams => {
                write!(f, "Setter functions must have exactly one parameter")
            }
            ParseError::NullishCoalesceMixedWithLogical => {
                write!(f, "Cannot mix ?? with || or && without parentheses")
            }
            ParseError::ExponentLeftHandSideUnary => {
                write!(f, "Unary operator cannot be the left operand of **")
            }
            ParseError::TaggedTemplateInOptionalChain => {
                write!(f, "Tagged templates cannot appear in optional chains")
            }
            ParseError::ParenthesizedListNotAnExpression => {
                write!(f, "Parenthesized list is only valid as arrow function parameters")
            }
        }
    }
}

pub struct LocalizedParseError {
    pub error: ParseError,
    pub source_loc: Option<(Loc, Rc<Source>)>,
}

impl LocalizedParseError {
    fn new_without_loc(error: ParseError) -> LocalizedParseError {
        LocalizedParseError { error, source_loc: None }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn loc(&self) -> Option<Loc> {
        self.source_loc.as_ref().map(|(loc, _)| *loc)
    }
}

impl Error for LocalizedParseError {}

impl fmt::Display for LocalizedParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source_loc {
            None => write!(f, "SyntaxError: {}", self.error),
            Some((loc, source)) => {
                let line_col = source.line_col_for_pos(loc.start);
                write!(
                    f,
                    "SyntaxError: {}:{}:{} {}",
                    source.file_path, line_col.line, line_col.column, self.error
                )
            }
        }
    }
}

impl fmt::Debug for LocalizedParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        <LocalizedParseError as fmt::Display>::fmt(self, f)
    }
}

impl From<io::Error> for LocalizedParseError {
    fn from(error: io::Error) -> LocalizedParseError {
        LocalizedParseError::new_without_loc(ParseError::Io(error))
    }
}

pub type ParseResult<T> = Result<T, LocalizedParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn early_errors_have_their_own_kind() {
        assert_eq!(
            ParseError::Early(EarlyError::InvalidYieldUsage).kind(),
            ErrorKind::InvalidYieldUsage
        );
        assert_eq!(
            ParseError::from(EarlyError::DuplicateBinding("a".into())).kind(),
            ErrorKind::DuplicateBinding
        );
        assert_eq!(ParseError::DuplicateLabel.kind(), ErrorKind::SyntaxError);
    }

    #[test]
    fn localized_display_includes_position() {
        let source = Rc::new(Source::new_from_string("test.js", "a;\n  b c".to_owned()));
        let error = LocalizedParseError {
            error: ParseError::UnexpectedToken(Token::Identifier("c".to_owned())),
            source_loc: Some((Loc::new(7, 8), source)),
        };

        assert_eq!(error.to_string(), "SyntaxError: test.js:2:4 Unexpected token c");
    }
}
