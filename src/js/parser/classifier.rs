//! Decides what role an identifier-like token plays in the current context.
//!
//! Every function here is pure: the answer depends only on the token, how it was written, and
//! the [`ParseContext`] in effect.

use super::{
    context::ParseContext,
    parse_error::EarlyError,
    token::{Token, TokenFlags},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextualKeyword {
    Yield,
    Await,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentifierRole {
    /// Usable as an identifier reference or binding identifier.
    PlainIdentifier,
    /// Reserved in this context, never usable as an identifier.
    ReservedWord,
    /// A word that acts as a keyword in this context.
    ContextualKeyword(ContextualKeyword),
    /// Not an identifier at all, or a reserved word spelled with escape sequences.
    Invalid,
}

/// The kinds of declarations that introduce a binding identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    /// `let`, `const`, and class declarations.
    Lexical,
    Function,
    Class,
    Parameter,
    CatchParameter,
    Label,
}

pub fn classify(token: &Token, flags: TokenFlags, ctx: ParseContext) -> IdentifierRole {
    match token {
        Token::Identifier(name) if flags.contains(TokenFlags::ESCAPED) => {
            match Token::keyword_from_str(name) {
                // An escaped word is never a keyword. It can only be used as an identifier if the
                // unescaped word would have been an identifier here.
                Some(keyword) => match classify_keyword(&keyword, ctx) {
                    IdentifierRole::PlainIdentifier => IdentifierRole::PlainIdentifier,
                    _ => IdentifierRole::Invalid,
                },
                None => IdentifierRole::PlainIdentifier,
            }
        }
        Token::Identifier(_) => IdentifierRole::PlainIdentifier,
        other => classify_keyword(other, ctx),
    }
}

/// Classify a name that has already been accepted as an identifier somewhere, for example when
/// an expression is reinterpreted as a pattern in a different context than it was parsed in.
pub fn classify_name(name: &str, ctx: ParseContext) -> IdentifierRole {
    match Token::keyword_from_str(name) {
        Some(keyword) => classify_keyword(&keyword, ctx),
        None => IdentifierRole::PlainIdentifier,
    }
}

fn classify_keyword(token: &Token, ctx: ParseContext) -> IdentifierRole {
    match token {
        Token::Yield => {
            if ctx.is_strict() || ctx.in_generator() || ctx.web_compat_disabled() {
                IdentifierRole::ContextualKeyword(ContextualKeyword::Yield)
            } else {
                IdentifierRole::PlainIdentifier
            }
        }
        Token::Await => {
            if ctx.in_async() || ctx.await_allowed() {
                IdentifierRole::ContextualKeyword(ContextualKeyword::Await)
            } else {
                IdentifierRole::PlainIdentifier
            }
        }
        // Only reserved in strict mode code
        Token::Let
        | Token::Static
        | Token::Implements
        | Token::Interface
        | Token::Package
        | Token::Private
        | Token::Protected
        | Token::Public => {
            if ctx.is_strict() {
                IdentifierRole::ReservedWord
            } else {
                IdentifierRole::PlainIdentifier
            }
        }
        // Never reserved
        Token::Async | Token::Of | Token::Get | Token::Set | Token::Target => {
            IdentifierRole::PlainIdentifier
        }
        other if other.keyword_str().is_some() => IdentifierRole::ReservedWord,
        _ => IdentifierRole::Invalid,
    }
}

/// Whether the token is spelled like an identifier, regardless of whether it is reserved.
pub fn is_identifier_name(token: &Token) -> bool {
    matches!(token, Token::Identifier(_)) || token.keyword_str().is_some()
}

/// Whether a name may be introduced by a declaration of the given kind in the given context.
///
/// Callers pick the context the name is bound in: function declarations use the enclosing
/// context, generator and async function expressions use their own, and class names are always
/// checked in strict mode.
pub fn check_binding_identifier(
    name: &str,
    kind: BindingKind,
    ctx: ParseContext,
) -> Result<(), EarlyError> {
    match classify_name(name, ctx) {
        IdentifierRole::PlainIdentifier => {}
        _ => return Err(EarlyError::ReservedWordBinding(name.to_owned())),
    }

    if kind == BindingKind::Lexical && name == "let" {
        return Err(EarlyError::ReservedWordBinding(name.to_owned()));
    }

    if kind != BindingKind::Label && ctx.is_strict() && is_restricted_strict_name(name) {
        return Err(EarlyError::ReservedWordBinding(name.to_owned()));
    }

    Ok(())
}

/// `eval` and `arguments` cannot be bound or assigned in strict mode code.
pub fn is_restricted_strict_name(name: &str) -> bool {
    name == "eval" || name == "arguments"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sloppy() -> ParseContext {
        ParseContext::for_script(false, false)
    }

    fn strict() -> ParseContext {
        ParseContext::for_script(true, false)
    }

    fn generator() -> ParseContext {
        sloppy().for_function_body(true, false)
    }

    #[test]
    fn yield_is_plain_in_sloppy_code() {
        assert_eq!(
            classify(&Token::Yield, TokenFlags::empty(), sloppy()),
            IdentifierRole::PlainIdentifier
        );
    }

    #[test]
    fn yield_is_keyword_in_strict_generator_or_without_web_compat() {
        let yield_keyword = IdentifierRole::ContextualKeyword(ContextualKeyword::Yield);

        assert_eq!(classify(&Token::Yield, TokenFlags::empty(), strict()), yield_keyword);
        assert_eq!(classify(&Token::Yield, TokenFlags::empty(), generator()), yield_keyword);
        assert_eq!(
            classify(&Token::Yield, TokenFlags::empty(), ParseContext::for_script(false, true)),
            yield_keyword
        );
    }

    #[test]
    fn yield_in_function_nested_in_generator_is_plain() {
        let nested = generator().for_function_body(false, false);
        assert_eq!(classify_name("yield", nested), IdentifierRole::PlainIdentifier);
    }

    #[test]
    fn await_is_keyword_only_in_async_code() {
        assert_eq!(classify_name("await", sloppy()), IdentifierRole::PlainIdentifier);
        assert_eq!(
            classify_name("await", sloppy().for_function_body(false, true)),
            IdentifierRole::ContextualKeyword(ContextualKeyword::Await)
        );
    }

    #[test]
    fn strict_future_reserved_words() {
        assert_eq!(classify_name("implements", sloppy()), IdentifierRole::PlainIdentifier);
        assert_eq!(classify_name("implements", strict()), IdentifierRole::ReservedWord);
        assert_eq!(classify_name("let", strict()), IdentifierRole::ReservedWord);
        assert_eq!(classify_name("async", strict()), IdentifierRole::PlainIdentifier);
        assert_eq!(classify_name("class", sloppy()), IdentifierRole::ReservedWord);
    }

    #[test]
    fn escaped_reserved_words_are_invalid() {
        let escaped = TokenFlags::ESCAPED;
        let var = Token::Identifier("var".to_owned());
        let yield_id = Token::Identifier("yield".to_owned());
        let async_id = Token::Identifier("async".to_owned());

        assert_eq!(classify(&var, escaped, sloppy()), IdentifierRole::Invalid);
        assert_eq!(classify(&yield_id, escaped, generator()), IdentifierRole::Invalid);
        assert_eq!(classify(&yield_id, escaped, sloppy()), IdentifierRole::PlainIdentifier);
        assert_eq!(classify(&async_id, escaped, strict()), IdentifierRole::PlainIdentifier);
    }

    #[test]
    fn punctuation_is_not_an_identifier() {
        assert_eq!(classify(&Token::Comma, TokenFlags::empty(), sloppy()), IdentifierRole::Invalid);
        assert!(!is_identifier_name(&Token::Comma));
        assert!(is_identifier_name(&Token::Class));
    }

    #[test]
    fn yield_bindings() {
        assert!(check_binding_identifier("yield", BindingKind::Var, sloppy()).is_ok());
        assert!(check_binding_identifier("yield", BindingKind::Var, strict()).is_err());
        assert!(check_binding_identifier("yield", BindingKind::Lexical, generator()).is_err());
        assert!(check_binding_identifier("yield", BindingKind::Parameter, generator()).is_err());
    }

    #[test]
    fn let_is_never_a_lexical_binding() {
        assert!(check_binding_identifier("let", BindingKind::Var, sloppy()).is_ok());
        assert_eq!(
            check_binding_identifier("let", BindingKind::Lexical, sloppy()),
            Err(EarlyError::ReservedWordBinding("let".to_owned()))
        );
    }

    #[test]
    fn eval_and_arguments_in_strict_mode() {
        assert!(check_binding_identifier("eval", BindingKind::Var, sloppy()).is_ok());
        assert!(check_binding_identifier("arguments", BindingKind::Parameter, strict()).is_err());
        assert!(check_binding_identifier("eval", BindingKind::Label, strict()).is_ok());
    }
}
