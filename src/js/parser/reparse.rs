//! Reinterpretation of expressions as patterns.
//!
//! Object and array literals, and parenthesized lists followed by `=>`, are first parsed as
//! expressions. Once the following token shows they were actually the target of a destructuring
//! assignment or a list of arrow parameters they are converted here, rejecting any node that has
//! no pattern equivalent.

use tracing::trace;

use super::ast::*;
use super::classifier::{self, BindingKind, IdentifierRole};
use super::context::ParseContext;
use super::loc::Loc;
use super::parse_error::{EarlyError, ParseError, ParseResult};
use super::parser::Parser;

/// What a reinterpreted pattern will be used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum PatternKind {
    /// The left hand side of an assignment or for-in/of loop, where member expressions are
    /// valid targets.
    Assignment,
    /// Arrow function parameters, which may only bind identifiers.
    Binding,
}

impl<'a> Parser<'a> {
    /// `eval` and `arguments` may not be assigned in strict mode code.
    pub(super) fn check_assignable_identifier(&self, id: &Identifier) -> ParseResult<()> {
        if !self.ctx.is_strict() {
            return Ok(());
        }

        match id.name.as_str() {
            "eval" => self.error(id.loc, ParseError::AssignEvalInStrictMode),
            "arguments" => self.error(id.loc, ParseError::AssignArgumentsInStrictMode),
            _ => Ok(()),
        }
    }

    fn invalid_target<T>(&self, loc: Loc) -> ParseResult<T> {
        trace!(start = loc.start, "expression is not a valid pattern");
        self.early_error(loc, EarlyError::InvalidDestructuringTarget)
    }

    fn check_pattern_identifier(
        &self,
        id: &Identifier,
        kind: PatternKind,
        ctx: ParseContext,
    ) -> ParseResult<()> {
        match kind {
            PatternKind::Binding => {
                match classifier::check_binding_identifier(&id.name, BindingKind::Parameter, ctx) {
                    Ok(()) => Ok(()),
                    Err(error) => self.early_error(id.loc, error),
                }
            }
            PatternKind::Assignment => {
                if classifier::classify_name(&id.name, ctx) != IdentifierRole::PlainIdentifier {
                    return self.invalid_target(id.loc);
                }

                self.check_assignable_identifier(id)
            }
        }
    }

    /// Convert an expression into the pattern it covers, checking identifiers against `ctx`.
    pub(super) fn reinterpret_as_pattern(
        &self,
        expr: Expression,
        kind: PatternKind,
        ctx: ParseContext,
    ) -> ParseResult<Pattern> {
        match expr {
            Expression::Id(id) => {
                self.check_pattern_identifier(&id, kind, ctx)?;
                Ok(Pattern::Id(id))
            }
            Expression::Array(array) => self.reinterpret_array(array, kind, ctx),
            Expression::Object(object) => self.reinterpret_object(object, kind, ctx),
            Expression::Member(member) if kind == PatternKind::Assignment => {
                Ok(Pattern::Member(member))
            }
            Expression::SuperMember(member) if kind == PatternKind::Assignment => {
                Ok(Pattern::SuperMember(member))
            }
            // Only simple targets may be parenthesized, `([a]) = b` is not a pattern
            Expression::Parenthesized(expr) if kind == PatternKind::Assignment => {
                match *expr.expression {
                    inner @ (Expression::Id(_)
                    | Expression::Member(_)
                    | Expression::SuperMember(_)
                    | Expression::Parenthesized(_)) => {
                        self.reinterpret_as_pattern(inner, kind, ctx)
                    }
                    _ => self.invalid_target(expr.loc),
                }
            }
            other => self.invalid_target(other.loc()),
        }
    }

    /// Convert an element of an array or property value, where a plain `=` assignment is a
    /// target with a default value.
    fn reinterpret_element(
        &self,
        expr: Expression,
        kind: PatternKind,
        ctx: ParseContext,
    ) -> ParseResult<Pattern> {
        match expr {
            Expression::Assign(AssignmentExpression {
                loc,
                operator: AssignmentOperator::Equals,
                left,
                right,
            }) => {
                let left = self.reinterpret_pattern(*left, kind, ctx)?;
                Ok(Pattern::Assign(AssignmentPattern { loc, left: p(left), right }))
            }
            other => self.reinterpret_as_pattern(other, kind, ctx),
        }
    }

    fn reinterpret_array(
        &self,
        array: ArrayExpression,
        kind: PatternKind,
        ctx: ParseContext,
    ) -> ParseResult<Pattern> {
        let num_elements = array.elements.len();
        let mut elements = Vec::with_capacity(num_elements);

        for (i, element) in array.elements.into_iter().enumerate() {
            let element = match element {
                ArrayElement::Hole(pos) => ArrayPatternElement::Hole(pos),
                ArrayElement::Expression(expr) => {
                    ArrayPatternElement::Pattern(self.reinterpret_element(expr, kind, ctx)?)
                }
                ArrayElement::Spread(spread) => {
                    if spread.has_trailing_comma || i != num_elements - 1 {
                        return self.invalid_target(spread.loc);
                    }

                    let argument = self.reinterpret_as_pattern(*spread.argument, kind, ctx)?;
                    let rest = RestElement { loc: spread.loc, argument: p(argument) };
                    ArrayPatternElement::Rest(rest)
                }
            };

            elements.push(element);
        }

        Ok(Pattern::Array(ArrayPattern { loc: array.loc, elements }))
    }

    fn reinterpret_object(
        &self,
        object: ObjectExpression,
        kind: PatternKind,
        ctx: ParseContext,
    ) -> ParseResult<Pattern> {
        let num_properties = object.properties.len();
        let mut properties = Vec::with_capacity(num_properties);

        for (i, property) in object.properties.into_iter().enumerate() {
            let Property { loc, key, value, is_computed, is_method, kind: property_kind } =
                property;

            if is_method {
                return self.invalid_target(loc);
            }

            let pattern_property = match property_kind {
                PropertyKind::Get | PropertyKind::Set => return self.invalid_target(loc),
                PropertyKind::Spread(has_trailing_comma) => {
                    if has_trailing_comma || i != num_properties - 1 {
                        return self.invalid_target(loc);
                    }

                    // The spread argument is stored as the key
                    let argument = self.reinterpret_as_pattern(*key, kind, ctx)?;
                    if matches!(argument, Pattern::Array(_) | Pattern::Object(_)) {
                        return self.invalid_target(argument.loc());
                    }

                    ObjectPatternProperty {
                        loc,
                        key: None,
                        value: p(argument),
                        is_computed: false,
                        is_rest: true,
                    }
                }
                PropertyKind::PatternInitializer(initializer) => {
                    let id = self.reinterpret_shorthand_key(*key, kind, ctx)?;
                    let value = Pattern::Assign(AssignmentPattern {
                        loc,
                        left: p(Pattern::Id(id)),
                        right: initializer,
                    });

                    ObjectPatternProperty {
                        loc,
                        key: None,
                        value: p(value),
                        is_computed: false,
                        is_rest: false,
                    }
                }
                PropertyKind::Init => match value {
                    None => {
                        let id = self.reinterpret_shorthand_key(*key, kind, ctx)?;
                        ObjectPatternProperty {
                            loc,
                            key: None,
                            value: p(Pattern::Id(id)),
                            is_computed: false,
                            is_rest: false,
                        }
                    }
                    Some(value) => {
                        let value = self.reinterpret_element(*value, kind, ctx)?;
                        ObjectPatternProperty {
                            loc,
                            key: Some(key),
                            value: p(value),
                            is_computed,
                            is_rest: false,
                        }
                    }
                },
            };

            properties.push(pattern_property);
        }

        Ok(Pattern::Object(ObjectPattern { loc: object.loc, properties }))
    }

    fn reinterpret_shorthand_key(
        &self,
        key: Expression,
        kind: PatternKind,
        ctx: ParseContext,
    ) -> ParseResult<Identifier> {
        match key {
            Expression::Id(id) => {
                self.check_pattern_identifier(&id, kind, ctx)?;
                Ok(id)
            }
            other => self.invalid_target(other.loc()),
        }
    }

    /// Check a pattern that was already built for one use against another, for example the
    /// target of `a = 1` once that assignment turns out to be an arrow parameter with a default.
    /// Checking a pattern against the kind it was built for leaves it unchanged.
    pub(super) fn reinterpret_pattern(
        &self,
        pattern: Pattern,
        kind: PatternKind,
        ctx: ParseContext,
    ) -> ParseResult<Pattern> {
        match pattern {
            Pattern::Id(id) => {
                self.check_pattern_identifier(&id, kind, ctx)?;
                Ok(Pattern::Id(id))
            }
            Pattern::Array(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());
                for element in array.elements {
                    elements.push(match element {
                        ArrayPatternElement::Pattern(pattern) => {
                            let pattern = self.reinterpret_pattern(pattern, kind, ctx)?;
                            ArrayPatternElement::Pattern(pattern)
                        }
                        ArrayPatternElement::Rest(rest) => {
                            let argument = self.reinterpret_pattern(*rest.argument, kind, ctx)?;
                            let rest = RestElement { loc: rest.loc, argument: p(argument) };
                            ArrayPatternElement::Rest(rest)
                        }
                        ArrayPatternElement::Hole(pos) => ArrayPatternElement::Hole(pos),
                    });
                }

                Ok(Pattern::Array(ArrayPattern { loc: array.loc, elements }))
            }
            Pattern::Object(object) => {
                let mut properties = Vec::with_capacity(object.properties.len());
                for property in object.properties {
                    let value = self.reinterpret_pattern(*property.value, kind, ctx)?;
                    properties.push(ObjectPatternProperty { value: p(value), ..property });
                }

                Ok(Pattern::Object(ObjectPattern { loc: object.loc, properties }))
            }
            Pattern::Assign(assign) => {
                let left = self.reinterpret_pattern(*assign.left, kind, ctx)?;
                Ok(Pattern::Assign(AssignmentPattern { left: p(left), ..assign }))
            }
            Pattern::Member(member) => match kind {
                PatternKind::Assignment => Ok(Pattern::Member(member)),
                PatternKind::Binding => self.invalid_target(member.loc),
            },
            Pattern::SuperMember(member) => match kind {
                PatternKind::Assignment => Ok(Pattern::SuperMember(member)),
                PatternKind::Binding => self.invalid_target(member.loc),
            },
        }
    }

    /// Convert the elements of a parenthesized list into arrow function parameters.
    pub(super) fn reinterpret_arrow_parameters(
        &self,
        elements: Vec<CallArgument>,
        ctx: ParseContext,
    ) -> ParseResult<Vec<FunctionParam>> {
        let num_elements = elements.len();
        trace!(num_elements, "reinterpreting parenthesized list as arrow parameters");

        let mut params = Vec::with_capacity(num_elements);

        for (i, element) in elements.into_iter().enumerate() {
            let param = match element {
                CallArgument::Expression(expr) => {
                    let pattern = self.reinterpret_element(expr, PatternKind::Binding, ctx)?;
                    FunctionParam::Pattern(pattern)
                }
                CallArgument::Spread(spread) => {
                    if i != num_elements - 1 {
                        return self.error(spread.loc, ParseError::RestNotLast);
                    }

                    if spread.has_trailing_comma {
                        return self.error(spread.loc, ParseError::RestTrailingComma);
                    }

                    // Rest parameters cannot have a default value
                    let argument =
                        self.reinterpret_as_pattern(*spread.argument, PatternKind::Binding, ctx)?;

                    FunctionParam::Rest(RestElement { loc: spread.loc, argument: p(argument) })
                }
            };

            params.push(param);
        }

        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::js::parser::{lexer::Lexer, parse_error::ErrorKind, source::Source};

    fn reinterpret(source: &str, kind: PatternKind, strict: bool) -> ParseResult<Pattern> {
        let source = Rc::new(Source::new_from_string("<test>", source.to_owned()));
        let ctx = ParseContext::for_script(strict, false);
        let mut parser = Parser::new(Lexer::new(&source), ctx);

        parser.advance()?;
        let expr = parser.parse_assignment_expression_maybe_pattern()?;
        parser.reinterpret_as_pattern(*expr, kind, ctx)
    }

    fn assignment_target(source: &str) -> Pattern {
        reinterpret(source, PatternKind::Assignment, false).unwrap()
    }

    fn error_kind(source: &str, kind: PatternKind) -> ErrorKind {
        match reinterpret(source, kind, false) {
            Ok(_) => panic!("expected {:?} to be an invalid target", source),
            Err(error) => error.kind(),
        }
    }

    fn bound_names(pattern: &Pattern) -> Vec<String> {
        let mut names = vec![];
        pattern.iter_bound_names(&mut |id| names.push(id.name.clone()));
        names
    }

    #[test]
    fn nested_patterns() {
        let pattern = assignment_target("[a, {b, c: [d = 1], ...e}, , ...f]");
        assert_eq!(bound_names(&pattern), vec!["a", "b", "d", "e", "f"]);

        match &pattern {
            Pattern::Array(array) => {
                assert_eq!(array.elements.len(), 4);
                assert!(matches!(array.elements[2], ArrayPatternElement::Hole(_)));
                assert!(matches!(array.elements[3], ArrayPatternElement::Rest(_)));
            }
            _ => panic!("expected array pattern"),
        }
    }

    #[test]
    fn shorthand_initializer_becomes_default() {
        match assignment_target("{a = 1}") {
            Pattern::Object(object) => {
                let property = &object.properties[0];
                assert!(property.key.is_none());
                assert!(matches!(property.value.as_ref(), Pattern::Assign(_)));
            }
            _ => panic!("expected object pattern"),
        }
    }

    #[test]
    fn member_targets_only_in_assignments() {
        assert!(matches!(assignment_target("[a.b]"), Pattern::Array(_)));
        assert!(matches!(assignment_target("(a.b)"), Pattern::Member(_)));

        assert_eq!(
            error_kind("[a.b]", PatternKind::Binding),
            ErrorKind::InvalidDestructuringTarget
        );
        assert_eq!(error_kind("(a)", PatternKind::Binding), ErrorKind::InvalidDestructuringTarget);
    }

    #[test]
    fn invalid_targets() {
        let sources = [
            "[a + 1]",
            "{a: 1}",
            "{a() {}}",
            "{get a() {}}",
            "[...a, b]",
            "[...a,]",
            "{...a, b}",
            "[([a])]",
            "{...[a]}",
            "[f()]",
        ];

        for source in sources {
            assert_eq!(
                error_kind(source, PatternKind::Assignment),
                ErrorKind::InvalidDestructuringTarget,
                "{}",
                source
            );
        }
    }

    #[test]
    fn strict_mode_identifiers() {
        assert!(reinterpret("[eval]", PatternKind::Assignment, false).is_ok());
        assert_eq!(
            reinterpret("[eval]", PatternKind::Assignment, true).unwrap_err().kind(),
            ErrorKind::SyntaxError
        );
        assert_eq!(
            reinterpret("{arguments}", PatternKind::Binding, true).unwrap_err().kind(),
            ErrorKind::ReservedWordBinding
        );
    }

    #[test]
    fn reinterpreting_again_is_unchanged() {
        let ctx = ParseContext::for_script(false, false);
        let source = Rc::new(Source::new_from_string("<test>", String::new()));
        let parser = Parser::new(Lexer::new(&source), ctx);

        let pattern = assignment_target("[a, {b: c = 1, ...d}, [e.f]]");
        let again = parser
            .reinterpret_pattern(pattern.clone(), PatternKind::Assignment, ctx)
            .unwrap();
        assert_eq!(pattern, again);

        let binding = reinterpret("[a, {b: c = 1}]", PatternKind::Binding, false).unwrap();
        let again = parser
            .reinterpret_pattern(binding.clone(), PatternKind::Binding, ctx)
            .unwrap();
        assert_eq!(binding, again);
    }
}
