//! Early errors on function parameter lists that can only be checked once the whole list, and
//! for arrow functions the arrow itself, has been seen.

use std::collections::HashSet;

use super::ast::*;
use super::classifier::{self, BindingKind};
use super::context::ParseContext;
use super::loc::Loc;
use super::parse_error::{EarlyError, ParseError, ParseResult};
use super::parser::Parser;

/// How a parameter list's bound names are checked.
pub(super) struct ParameterRules {
    /// Whether the same name may be bound more than once.
    pub(super) allow_duplicates: bool,
    /// The context the names are bound in, which may be stricter than the one they were parsed
    /// in if the body contains a "use strict" directive.
    pub(super) ctx: ParseContext,
}

/// A construct that may not appear in arrow function parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ArrowParameterViolation {
    Yield(Loc),
    Await(Loc),
}

impl<'a> Parser<'a> {
    /// Check every name bound by a parameter list.
    pub(super) fn check_parameters(
        &self,
        params: &[FunctionParam],
        rules: ParameterRules,
    ) -> ParseResult<()> {
        let mut ids = vec![];
        for param in params {
            param.iter_bound_names(&mut |id| ids.push(id));
        }

        let mut seen_names = HashSet::new();
        for id in ids {
            if let Err(error) =
                classifier::check_binding_identifier(&id.name, BindingKind::Parameter, rules.ctx)
            {
                return self.early_error(id.loc, error);
            }

            if !seen_names.insert(id.name.as_str()) && !rules.allow_duplicates {
                return self.early_error(id.loc, EarlyError::DuplicateBinding(id.name.clone()));
            }
        }

        Ok(())
    }

    /// Arrow parameters are parsed before they are known to be parameters, so expressions in
    /// their default values and computed keys are checked here. Neither `yield` nor an await
    /// expression may appear in them, and `await` may not appear at all in the parameters of an
    /// async arrow.
    pub(super) fn check_arrow_parameters(
        &self,
        params: &[FunctionParam],
        is_async: bool,
    ) -> ParseResult<()> {
        let violation = params.iter().find_map(|param| match param {
            FunctionParam::Pattern(pattern) => find_in_pattern(pattern, is_async),
            FunctionParam::Rest(rest) => find_in_pattern(&rest.argument, is_async),
        });

        match violation {
            None => Ok(()),
            Some(ArrowParameterViolation::Yield(loc)) => {
                self.early_error(loc, EarlyError::InvalidYieldUsage)
            }
            Some(ArrowParameterViolation::Await(loc)) => {
                self.error(loc, ParseError::AwaitInParameters)
            }
        }
    }
}

fn find_in_pattern(pattern: &Pattern, is_async: bool) -> Option<ArrowParameterViolation> {
    match pattern {
        // Bound names are checked separately
        Pattern::Id(_) => None,
        Pattern::Array(array) => array.elements.iter().find_map(|element| match element {
            ArrayPatternElement::Pattern(pattern) => find_in_pattern(pattern, is_async),
            ArrayPatternElement::Rest(rest) => find_in_pattern(&rest.argument, is_async),
            ArrayPatternElement::Hole(_) => None,
        }),
        Pattern::Object(object) => object.properties.iter().find_map(|property| {
            let key = match &property.key {
                Some(key) if property.is_computed => find_in_expression(key, is_async),
                _ => None,
            };

            key.or_else(|| find_in_pattern(&property.value, is_async))
        }),
        Pattern::Assign(assign) => find_in_pattern(&assign.left, is_async)
            .or_else(|| find_in_expression(&assign.right, is_async)),
        Pattern::Member(member) => find_in_member(member, is_async),
        Pattern::SuperMember(member) if member.is_computed => {
            find_in_expression(&member.property, is_async)
        }
        Pattern::SuperMember(_) => None,
    }
}

fn find_in_member(member: &MemberExpression, is_async: bool) -> Option<ArrowParameterViolation> {
    find_in_expression(&member.object, is_async).or_else(|| {
        if member.is_computed {
            find_in_expression(&member.property, is_async)
        } else {
            None
        }
    })
}

fn find_in_arguments(
    arguments: &[CallArgument],
    is_async: bool,
) -> Option<ArrowParameterViolation> {
    arguments.iter().find_map(|argument| match argument {
        CallArgument::Expression(expr) => find_in_expression(expr, is_async),
        CallArgument::Spread(spread) => find_in_expression(&spread.argument, is_async),
    })
}

/// Find a yield or await in an expression, without entering the bodies of nested functions.
fn find_in_expression(expr: &Expression, is_async: bool) -> Option<ArrowParameterViolation> {
    match expr {
        Expression::Yield(yield_) => Some(ArrowParameterViolation::Yield(yield_.loc)),
        Expression::Await(await_) => Some(ArrowParameterViolation::Await(await_.loc)),
        Expression::Id(id) if id.name == "yield" => Some(ArrowParameterViolation::Yield(id.loc)),
        Expression::Id(id) if is_async && id.name == "await" => {
            Some(ArrowParameterViolation::Await(id.loc))
        }

        Expression::Id(_)
        | Expression::Null(_)
        | Expression::Boolean(_)
        | Expression::Number(_)
        | Expression::String(_)
        | Expression::BigInt(_)
        | Expression::RegExp(_)
        | Expression::This(_)
        | Expression::MetaProperty(_)
        | Expression::Function(_) => None,

        Expression::Unary(unary) => find_in_expression(&unary.argument, is_async),
        Expression::Update(update) => find_in_expression(&update.argument, is_async),
        Expression::Binary(binary) => find_in_expression(&binary.left, is_async)
            .or_else(|| find_in_expression(&binary.right, is_async)),
        Expression::Logical(logical) => find_in_expression(&logical.left, is_async)
            .or_else(|| find_in_expression(&logical.right, is_async)),
        Expression::Assign(assign) => find_in_pattern(&assign.left, is_async)
            .or_else(|| find_in_expression(&assign.right, is_async)),
        Expression::Conditional(cond) => find_in_expression(&cond.test, is_async)
            .or_else(|| find_in_expression(&cond.conseq, is_async))
            .or_else(|| find_in_expression(&cond.altern, is_async)),
        Expression::Sequence(sequence) => sequence
            .expressions
            .iter()
            .find_map(|expr| find_in_expression(expr, is_async)),

        Expression::Member(member) => find_in_member(member, is_async),
        Expression::Chain(chain) => find_in_expression(&chain.expression, is_async),
        Expression::Call(call) => find_in_expression(&call.callee, is_async)
            .or_else(|| find_in_arguments(&call.arguments, is_async)),
        Expression::New(new) => find_in_expression(&new.callee, is_async)
            .or_else(|| find_in_arguments(&new.arguments, is_async)),
        Expression::SuperMember(member) if member.is_computed => {
            find_in_expression(&member.property, is_async)
        }
        Expression::SuperMember(_) => None,
        Expression::SuperCall(call) => find_in_arguments(&call.arguments, is_async),
        Expression::Import(import) => find_in_expression(&import.source, is_async),

        Expression::Array(array) => array.elements.iter().find_map(|element| match element {
            ArrayElement::Expression(expr) => find_in_expression(expr, is_async),
            ArrayElement::Spread(spread) => find_in_expression(&spread.argument, is_async),
            ArrayElement::Hole(_) => None,
        }),
        Expression::Object(object) => object
            .properties
            .iter()
            .find_map(|property| find_in_property(property, is_async)),

        Expression::Template(template) => template
            .expressions
            .iter()
            .find_map(|expr| find_in_expression(expr, is_async)),
        Expression::TaggedTemplate(tagged) => {
            find_in_expression(&tagged.tag, is_async).or_else(|| {
                tagged
                    .quasi
                    .expressions
                    .iter()
                    .find_map(|expr| find_in_expression(expr, is_async))
            })
        }

        // Nested arrow parameters and concise bodies are part of the enclosing parameter list's
        // text, block bodies are not searched.
        Expression::ArrowFunction(func) => {
            let in_params = func.params.iter().find_map(|param| match param {
                FunctionParam::Pattern(pattern) => find_in_pattern(pattern, is_async),
                FunctionParam::Rest(rest) => find_in_pattern(&rest.argument, is_async),
            });

            in_params.or_else(|| match func.body.as_ref() {
                FunctionBody::Expression(body) => find_in_expression(body, is_async),
                FunctionBody::Block(_) => None,
            })
        }
        // The heritage and computed keys of a class are evaluated in the enclosing scope
        Expression::Class(class) => {
            let in_super_class = class
                .super_class
                .as_ref()
                .and_then(|super_class| find_in_expression(super_class, is_async));

            in_super_class.or_else(|| {
                class.body.iter().find_map(|element| match element {
                    ClassElement::Method(method) if method.is_computed => {
                        find_in_expression(&method.key, is_async)
                    }
                    ClassElement::Property(property) if property.is_computed => {
                        find_in_expression(&property.key, is_async)
                    }
                    _ => None,
                })
            })
        }

        Expression::Parenthesized(expr) => find_in_expression(&expr.expression, is_async),
        Expression::Cover(cover) => find_in_arguments(&cover.elements, is_async),
    }
}

fn find_in_property(property: &Property, is_async: bool) -> Option<ArrowParameterViolation> {
    match &property.kind {
        // The spread argument is stored as the key
        PropertyKind::Spread(_) => find_in_expression(&property.key, is_async),
        // Shorthand properties reference the key
        PropertyKind::Init | PropertyKind::PatternInitializer(_) if property.value.is_none() => {
            let in_key = find_in_expression(&property.key, is_async);
            match &property.kind {
                PropertyKind::PatternInitializer(initializer) => {
                    in_key.or_else(|| find_in_expression(initializer, is_async))
                }
                _ => in_key,
            }
        }
        _ => {
            let in_key = if property.is_computed {
                find_in_expression(&property.key, is_async)
            } else {
                None
            };

            // Method values are functions, which are not searched
            in_key.or_else(|| match &property.value {
                Some(value) if !property.is_method => find_in_expression(value, is_async),
                _ => None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::js::parser::{
        context::ParseContext, parse_error::ErrorKind, parser::parse_program, source::Source,
    };

    fn error_kind(source: &str) -> Option<ErrorKind> {
        let source = Rc::new(Source::new_from_string("<test>", source.to_owned()));
        parse_program(&source, ParseContext::for_script(false, false))
            .err()
            .map(|error| error.kind())
    }

    #[test]
    fn yield_in_arrow_defaults() {
        let sources = [
            "(a = yield) => 1",
            "({a = yield}) => 1",
            "([a = yield]) => 1",
            "({[yield]: a}) => 1",
            "(a = {yield}) => 1",
            "(a = (b = yield) => b) => 1",
            "(a = () => yield) => 1",
            "(a = class extends yield {}) => 1",
            "function *g() { (a = yield 1) => 1 }",
            "function *g() { (...[a = yield]) => 1 }",
        ];

        for source in sources {
            assert_eq!(error_kind(source), Some(ErrorKind::InvalidYieldUsage), "{}", source);
        }
    }

    #[test]
    fn yield_outside_arrow_defaults() {
        let sources = [
            "(yield) => 1",
            "(a = b.yield) => 1",
            "(a = {yield: 1}) => 1",
            "(a = function () { yield }) => 1",
            "(a = () => { yield }) => 1",
            "(a = {m() { yield }}) => 1",
        ];

        for source in sources {
            assert_eq!(error_kind(source), None, "{}", source);
        }
    }

    #[test]
    fn await_in_arrow_parameters() {
        assert_eq!(error_kind("async (a = await) => 1"), Some(ErrorKind::SyntaxError));
        assert_eq!(
            error_kind("async function f() { (a = await b) => 1 }"),
            Some(ErrorKind::SyntaxError)
        );
        assert_eq!(error_kind("(a = await) => 1"), None);
    }

    #[test]
    fn parameter_names() {
        assert_eq!(error_kind("function f(a, a) {}"), None);
        assert_eq!(error_kind("function f(a, ...a) {}"), Some(ErrorKind::DuplicateBinding));
        assert_eq!(error_kind("({ m(a, a) {} })"), Some(ErrorKind::DuplicateBinding));
        assert_eq!(error_kind("(a, {b: a}) => 1"), Some(ErrorKind::DuplicateBinding));
        assert_eq!(
            error_kind("function f(eval) { 'use strict' }"),
            Some(ErrorKind::ReservedWordBinding)
        );
        assert_eq!(
            error_kind("function f(a, a) { 'use strict' }"),
            Some(ErrorKind::DuplicateBinding)
        );
    }
}
