use std::rc::Rc;

use bitflags::bitflags;
use tracing::{debug, trace};

use super::ast::*;
use super::classifier::{self, BindingKind, ContextualKeyword, IdentifierRole};
use super::context::{ContextOverrides, ParseContext};
use super::early_errors::ParameterRules;
use super::lexer::{Lexer, SavedLexerState};
use super::loc::{Loc, Pos, EMPTY_LOC};
use super::parse_error::{EarlyError, LocalizedParseError, ParseError, ParseResult};
use super::reparse::PatternKind;
use super::scope::{NameKind, ScopeBuilder};
use super::source::Source;
use super::token::{Token, TokenFlags};

/// Expression operator precedence. A lower number binds tighter than a larger number.
#[derive(Clone, Copy)]
enum Precedence {
    Exponentiation = 0,
    Multiplication = 1,
    Addition = 2,
    Shift = 3,
    Relational = 4, // Includes in and instanceof
    Equality = 5,
    BitwiseAnd = 6,
    BitwiseXor = 7,
    BitwiseOr = 8,
    LogicalAnd = 9,
    LogicalOr = 10,
    // Weaker than both logical operators so that unparenthesized logical operands of a nullish
    // coalesce are absorbed into its operands, where they can be rejected.
    NullishCoalesce = 11,
    Conditional = 12,
}

impl Precedence {
    fn is_weaker_than(self, other: Precedence) -> bool {
        (self as i32) > (other as i32)
    }
}

bitflags! {
    /// Where a statement is parsed, which decides whether a function declaration may appear
    /// there and how its name is scoped.
    #[derive(Clone, Copy, PartialEq, Eq)]
    struct FunctionContext: u8 {
        /// Declarations are allowed in this position.
        const DECLARATION = 1 << 0;
        /// At the toplevel of a script or function body (ignoring labels), where function
        /// declarations are var scoped.
        const TOPLEVEL = 1 << 1;
        /// The body of a labeled statement.
        const LABELED = 1 << 2;
        /// A labeled statement in this position may label a function declaration.
        const ALLOW_LABELED = 1 << 3;
        /// The body of an if statement, where web compatibility allows a plain function
        /// declaration.
        const IF_BODY = 1 << 4;
    }
}

/// The syntactic form a function is parsed from, which decides its context flags and the
/// restrictions on its parameters.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum FunctionKind {
    Declaration,
    Expression,
    Method,
    Getter,
    Setter,
    Constructor { is_derived: bool },
}

impl FunctionKind {
    fn add_method_flags(self, ctx: ParseContext) -> ParseContext {
        match self {
            FunctionKind::Declaration | FunctionKind::Expression => ctx,
            FunctionKind::Constructor { is_derived: true } => {
                ctx | ParseContext::IN_METHOD | ParseContext::IN_DERIVED_CONSTRUCTOR
            }
            _ => ctx | ParseContext::IN_METHOD,
        }
    }
}

/// Modifiers and name at the start of an object property or class element.
struct PropertyHead {
    loc_start: Pos,
    key: P<Expression>,
    is_computed: bool,
    is_async: bool,
    is_generator: bool,
    accessor: Option<PropertyKind>,
    /// The token an identifier key was written with, needed if the property is a shorthand.
    key_token: Option<(Token, TokenFlags)>,
}

impl PropertyHead {
    fn is_method_like(&self) -> bool {
        self.is_async || self.is_generator || self.accessor.is_some()
    }

    /// Whether the key is the literal name `name`, written as an identifier or string.
    fn has_static_name(&self, name: &str) -> bool {
        if self.is_computed {
            return false;
        }

        match self.key.as_ref() {
            Expression::Id(id) => id.name == name,
            Expression::String(lit) => lit.value == name,
            _ => false,
        }
    }
}

pub(super) struct Parser<'a> {
    pub(super) lexer: Lexer<'a>,
    pub(super) token: Token,
    pub(super) loc: Loc,
    /// Flags for the current token
    pub(super) flags: TokenFlags,
    pub(super) prev_loc: Loc,
    /// Grammatical context in effect for the current token
    pub(super) ctx: ParseContext,
    /// Tracks declared names and labels in every open scope
    pub(super) scope_builder: ScopeBuilder,
}

/// A save point for the parser, can be used to restore the parser to a particular position.
pub(super) struct ParserSaveState {
    saved_lexer_state: SavedLexerState,
    token: Token,
    loc: Loc,
    flags: TokenFlags,
    prev_loc: Loc,
}

/// The name an identifier-like token is spelled as, including keywords.
fn identifier_token_name(token: &Token) -> Option<String> {
    match token {
        Token::Identifier(name) => Some(name.clone()),
        other => other.keyword_str().map(String::from),
    }
}

impl<'a> Parser<'a> {
    // Must prime parser by calling advance before using.
    pub(super) fn new(lexer: Lexer<'a>, ctx: ParseContext) -> Parser<'a> {
        let mut parser = Parser {
            lexer,
            token: Token::Eof,
            loc: EMPTY_LOC,
            flags: TokenFlags::empty(),
            prev_loc: EMPTY_LOC,
            ctx,
            scope_builder: ScopeBuilder::new(),
        };

        parser.set_context(ctx);
        parser
    }

    pub(super) fn error<T>(&self, loc: Loc, error: ParseError) -> ParseResult<T> {
        debug!(start = loc.start, end = loc.end, %error, "parse error");
        let source = (*self.lexer.source).clone();
        Err(LocalizedParseError { error, source_loc: Some((loc, source)) })
    }

    pub(super) fn early_error<T>(&self, loc: Loc, error: EarlyError) -> ParseResult<T> {
        self.error(loc, ParseError::Early(error))
    }

    fn save(&self) -> ParserSaveState {
        ParserSaveState {
            saved_lexer_state: self.lexer.save(),
            token: self.token.clone(),
            loc: self.loc,
            flags: self.flags,
            prev_loc: self.prev_loc,
        }
    }

    fn restore(&mut self, save_state: ParserSaveState) {
        self.lexer.restore(&save_state.saved_lexer_state);
        self.token = save_state.token;
        self.loc = save_state.loc;
        self.flags = save_state.flags;
        self.prev_loc = save_state.prev_loc;
    }

    /// Make `ctx` the current context, keeping the lexer's mode in sync with it.
    fn set_context(&mut self, ctx: ParseContext) {
        self.ctx = ctx;
        self.lexer.in_strict_mode = ctx.is_strict();
        self.lexer.allow_web_compat = !ctx.web_compat_disabled();
    }

    /// Run `f` with `ctx` as the current context. The previous context is restored afterwards,
    /// whether or not `f` succeeds.
    pub(super) fn with_context<T>(
        &mut self,
        ctx: ParseContext,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let old_ctx = self.ctx;
        self.set_context(ctx);
        let result = f(self);
        self.set_context(old_ctx);
        result
    }

    /// Run `f` in a context where the `in` operator is allowed, as it is inside any brackets.
    fn with_in_allowed<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let ctx = self.ctx.enter(ContextOverrides::new().disallow_in(false));
        self.with_context(ctx, f)
    }

    pub(super) fn advance(&mut self) -> ParseResult<()> {
        let (token, loc) = self.lexer.next()?;
        self.prev_loc = self.loc;
        self.token = token;
        self.loc = loc;
        self.flags = self.lexer.token_flags();

        Ok(())
    }

    fn advance_template_part(&mut self) -> ParseResult<()> {
        let (token, loc) = self.lexer.next_template_part()?;
        self.prev_loc = self.loc;
        self.token = token;
        self.loc = loc;
        self.flags = self.lexer.token_flags();

        Ok(())
    }

    fn advance_regexp_literal(&mut self) -> ParseResult<()> {
        let (token, loc) = self.lexer.next_regexp_literal(self.loc.start)?;
        self.token = token;
        self.loc = loc;
        self.flags = self.lexer.token_flags();

        Ok(())
    }

    fn peek_with_flags(&mut self) -> ParseResult<(Token, TokenFlags)> {
        let save_state = self.lexer.save();
        let (next_token, _) = self.lexer.next()?;
        let next_flags = self.lexer.token_flags();
        self.lexer.restore(&save_state);

        Ok((next_token, next_flags))
    }

    fn peek(&mut self) -> ParseResult<Token> {
        Ok(self.peek_with_flags()?.0)
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.token != token {
            return self.error_expected_token(self.loc, &self.token, &token);
        }

        self.advance()?;
        Ok(())
    }

    fn error_unexpected_token<T>(&self, loc: Loc, token: &Token) -> ParseResult<T> {
        self.error(loc, ParseError::UnexpectedToken(token.clone()))
    }

    fn error_expected_token<T>(
        &self,
        loc: Loc,
        actual_token: &Token,
        expected_token: &Token,
    ) -> ParseResult<T> {
        self.error(loc, ParseError::ExpectedToken(actual_token.clone(), expected_token.clone()))
    }

    fn current_start_pos(&self) -> Pos {
        self.loc.start
    }

    fn mark_loc(&self, start_pos: Pos) -> Loc {
        Loc { start: start_pos, end: self.prev_loc.end }
    }

    fn has_new_line_before(&self) -> bool {
        self.flags.contains(TokenFlags::NEW_LINE_BEFORE)
    }

    fn is_escaped(&self) -> bool {
        self.flags.contains(TokenFlags::ESCAPED)
    }

    /// The current token is an unescaped `token`, so it may act as a contextual keyword.
    fn is_unescaped(&self, token: &Token) -> bool {
        self.token == *token && !self.is_escaped()
    }

    fn classify_current(&self) -> IdentifierRole {
        classifier::classify(&self.token, self.flags, self.ctx)
    }

    fn is_yield_keyword(&self) -> bool {
        let keyword = IdentifierRole::ContextualKeyword(ContextualKeyword::Yield);
        self.token == Token::Yield && self.classify_current() == keyword
    }

    fn is_await_keyword(&self) -> bool {
        let keyword = IdentifierRole::ContextualKeyword(ContextualKeyword::Await);
        self.token == Token::Await && self.classify_current() == keyword
    }

    /// The source text covered by a location.
    fn source_text(&self, loc: Loc) -> &str {
        &self.lexer.source.contents[loc.to_range()]
    }

    fn expect_semicolon(&mut self) -> ParseResult<()> {
        match &self.token {
            Token::Semicolon => {
                self.advance()?;
                Ok(())
            }
            // Semicolons are automatically inserted at the end of a block, the end of the
            // input, and before a token on a new line.
            Token::RightBrace | Token::Eof => Ok(()),
            _ if self.has_new_line_before() => Ok(()),
            other => self.error_unexpected_token(self.loc, other),
        }
    }

    fn parse_script(&mut self) -> ParseResult<Program> {
        debug!(strict = self.ctx.is_strict(), "parsing script");

        // Scan the directive prologue once to find strictness, then lex the program again from
        // the start in the correct mode.
        let initial_state = self.save();
        self.advance()?;
        let has_use_strict_directive = self.scan_for_use_strict()?;
        self.restore(initial_state);

        if has_use_strict_directive {
            self.set_context(self.ctx | ParseContext::STRICT);
        }

        self.advance()?;
        self.scope_builder.enter_toplevel_scope();

        let mut body = vec![];
        while self.token != Token::Eof {
            body.push(self.parse_statement_list_item(FunctionContext::TOPLEVEL)?);
        }

        self.scope_builder.exit_scope();
        self.mark_directives(&mut body);

        let loc = Loc { start: 0, end: self.lexer.source.contents.len() };

        Ok(Program {
            loc,
            body,
            is_strict_mode: self.ctx.is_strict(),
            has_use_strict_directive,
        })
    }

    /// Scan the directive prologue starting at the current token and return whether it contains
    /// a "use strict" directive. The parser is restored to the current token afterwards.
    fn scan_for_use_strict(&mut self) -> ParseResult<bool> {
        let save_state = self.save();
        let mut has_use_strict_directive = false;

        while let Token::StringLiteral(_) = &self.token {
            let token_loc = self.loc;
            let stmt = self.parse_statement_list_item(FunctionContext::empty())?;

            match stmt {
                Statement::Expr(ExpressionStatement { expr, .. })
                    if matches!(expr.as_ref(), Expression::String(_)) && expr.loc() == token_loc =>
                {
                    // Directives may not contain escapes or line continuations
                    let raw = self.source_text(token_loc);
                    if raw == "'use strict'" || raw == "\"use strict\"" {
                        has_use_strict_directive = true;
                    }
                }
                _ => break,
            }
        }

        self.restore(save_state);

        Ok(has_use_strict_directive)
    }

    /// Record the raw text of each directive in the prologue at the start of `body`.
    fn mark_directives(&self, body: &mut [Statement]) {
        for stmt in body {
            match stmt {
                Statement::Expr(stmt) => match stmt.expr.as_ref() {
                    Expression::String(lit) => {
                        let raw = self.source_text(lit.loc);
                        stmt.directive = Some(raw[1..raw.len() - 1].to_owned());
                    }
                    _ => return,
                },
                _ => return,
            }
        }
    }

    fn parse_statement_list_item(&mut self, ctx_flags: FunctionContext) -> ParseResult<Statement> {
        let is_async_function = self.is_async_function_start()?;
        let is_let_declaration = self.is_let_declaration_start()?;

        match &self.token {
            Token::Function => {
                self.parse_function_declaration(ctx_flags | FunctionContext::DECLARATION)
            }
            Token::Async if is_async_function => {
                self.parse_function_declaration(ctx_flags | FunctionContext::DECLARATION)
            }
            Token::Class => Ok(Statement::ClassDecl(self.parse_class(true)?)),
            Token::Const => Ok(Statement::VarDecl(self.parse_variable_declaration(false)?)),
            Token::Let if is_let_declaration => {
                Ok(Statement::VarDecl(self.parse_variable_declaration(false)?))
            }
            _ => self.parse_statement_with_function_context(
                ctx_flags | FunctionContext::ALLOW_LABELED,
            ),
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        self.parse_statement_with_function_context(FunctionContext::empty())
    }

    fn parse_statement_with_function_context(
        &mut self,
        ctx_flags: FunctionContext,
    ) -> ParseResult<Statement> {
        let is_async_function = self.is_async_function_start()?;
        let is_let_bracket = self.token == Token::Let && self.peek()? == Token::LeftBracket;

        match &self.token {
            Token::Var => Ok(Statement::VarDecl(self.parse_variable_declaration(false)?)),
            Token::LeftBrace => Ok(Statement::Block(self.parse_block()?)),
            Token::If => self.parse_if_statement(),
            Token::Switch => self.parse_switch_statement(),
            Token::For => self.parse_any_for_statement(),
            Token::While => self.parse_while_statement(),
            Token::Do => self.parse_do_while_statement(),
            Token::With => self.parse_with_statement(),
            Token::Try => self.parse_try_statement(),
            Token::Throw => self.parse_throw_statement(),
            Token::Return => self.parse_return_statement(),
            Token::Break => self.parse_break_statement(),
            Token::Continue => self.parse_continue_statement(),
            Token::Semicolon => {
                let loc = self.loc;
                self.advance()?;
                Ok(Statement::Empty(loc))
            }
            Token::Debugger => {
                let start_pos = self.current_start_pos();
                self.advance()?;
                self.expect_semicolon()?;
                Ok(Statement::Debugger(self.mark_loc(start_pos)))
            }
            Token::Function => {
                if ctx_flags.contains(FunctionContext::IF_BODY) && self.ctx.allows_web_compat() {
                    self.parse_if_body_function_declaration()
                } else {
                    self.error(self.loc, ParseError::FunctionDeclarationNotAllowed)
                }
            }
            Token::Async if is_async_function => {
                self.error(self.loc, ParseError::FunctionDeclarationNotAllowed)
            }
            Token::Class => self.error_unexpected_token(self.loc, &Token::Class),
            Token::Let if is_let_bracket => {
                self.error(self.loc, ParseError::AmbiguousLetBracket)
            }
            _ => {
                let start_pos = self.current_start_pos();
                let expr = self.parse_expression()?;

                // Identifier followed by a colon starts a labeled statement
                if let Expression::Id(id) = expr.as_ref() {
                    if self.token == Token::Colon {
                        let label = Label { loc: id.loc, name: id.name.clone() };
                        return self.parse_labeled_statement(label, start_pos, ctx_flags);
                    }
                }

                self.expect_semicolon()?;
                let loc = self.mark_loc(start_pos);

                Ok(Statement::Expr(ExpressionStatement { loc, expr, directive: None }))
            }
        }
    }

    /// Whether the current token is an unescaped `async` that starts an async function, with no
    /// line terminator between `async` and `function`.
    fn is_async_function_start(&mut self) -> ParseResult<bool> {
        if self.token != Token::Async || self.is_escaped() {
            return Ok(false);
        }

        let (next_token, next_flags) = self.peek_with_flags()?;
        Ok(next_token == Token::Function && !next_flags.contains(TokenFlags::NEW_LINE_BEFORE))
    }

    fn is_let_declaration_start(&mut self) -> ParseResult<bool> {
        if self.token != Token::Let {
            return Ok(false);
        }

        if self.ctx.is_strict() {
            return Ok(true);
        }

        // In sloppy mode `let` is an identifier unless followed by something that can only
        // start a binding
        let next_token = self.peek()?;
        Ok(match next_token {
            Token::LeftBracket | Token::LeftBrace => true,
            Token::In | Token::InstanceOf | Token::Of => false,
            other => {
                classifier::is_identifier_name(&other)
                    && classifier::classify(&other, TokenFlags::empty(), self.ctx)
                        != IdentifierRole::ReservedWord
            }
        })
    }

    fn parse_variable_declaration(
        &mut self,
        is_for_init: bool,
    ) -> ParseResult<VariableDeclaration> {
        let start_pos = self.current_start_pos();

        let kind = match &self.token {
            Token::Var => VarKind::Var,
            Token::Let => VarKind::Let,
            Token::Const => VarKind::Const,
            other => return self.error_unexpected_token(self.loc, other),
        };
        self.advance()?;

        let (binding_kind, name_kind) = match kind {
            VarKind::Var => (BindingKind::Var, NameKind::Var),
            VarKind::Let => (BindingKind::Lexical, NameKind::Let),
            VarKind::Const => (BindingKind::Lexical, NameKind::Const),
        };

        let mut declarations = vec![];
        loop {
            let start_pos = self.current_start_pos();
            let id = self.parse_pattern(binding_kind)?;
            self.declare_pattern_names(&id, name_kind)?;

            let init = if self.token == Token::Equals {
                self.advance()?;
                Some(self.parse_assignment_expression()?)
            } else {
                // Initializers are checked by the for statement when this is a for init
                if !is_for_init {
                    self.check_declarator_has_initializer(kind, &id)?;
                }

                None
            };

            let loc = self.mark_loc(start_pos);
            declarations.push(VariableDeclarator { loc, id: p(id), init });

            if self.token == Token::Comma {
                self.advance()?;
            } else {
                break;
            }
        }

        if !is_for_init {
            self.expect_semicolon()?;
        }

        let loc = self.mark_loc(start_pos);

        Ok(VariableDeclaration { loc, kind, declarations })
    }

    /// Const declarations and destructuring declarations must have an initializer.
    fn check_declarator_has_initializer(&self, kind: VarKind, id: &Pattern) -> ParseResult<()> {
        if !id.is_id() {
            return self.error_expected_token(self.loc, &self.token, &Token::Equals);
        }

        if kind == VarKind::Const {
            return self.error(id.loc(), ParseError::ConstWithoutInitializer);
        }

        Ok(())
    }

    /// Declare every name bound by a pattern in the current scope.
    fn declare_pattern_names(&mut self, pattern: &Pattern, kind: NameKind) -> ParseResult<()> {
        let mut ids = vec![];
        pattern.iter_bound_names(&mut |id| ids.push(id));

        for id in ids {
            self.declare_name(id, kind)?;
        }

        Ok(())
    }

    fn declare_name(&mut self, id: &Identifier, kind: NameKind) -> ParseResult<()> {
        let result = match kind {
            NameKind::Var | NameKind::FunctionParameter => {
                self.scope_builder.add_var_declared_name(&id.name, kind)
            }
            _ => self.scope_builder.add_lex_declared_name(&id.name, kind),
        };

        match result {
            Ok(()) => Ok(()),
            Err(error) => self.early_error(id.loc, error),
        }
    }

    fn parse_function_declaration(&mut self, ctx_flags: FunctionContext) -> ParseResult<Statement> {
        let func = self.parse_function(FunctionKind::Declaration)?;

        if let Some(id) = &func.id {
            let name_kind = if ctx_flags.contains(FunctionContext::TOPLEVEL) {
                NameKind::Var
            } else if self.ctx.allows_web_compat() && !func.is_async() && !func.is_generator() {
                NameKind::SloppyBlockFunction
            } else {
                NameKind::Function
            };

            let id = id.as_ref().clone();
            self.declare_name(&id, name_kind)?;
        }

        Ok(Statement::FuncDecl(func))
    }

    /// A plain function declaration as the body of an if statement, which web compatibility
    /// treats as if it were wrapped in a block.
    fn parse_if_body_function_declaration(&mut self) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();

        self.scope_builder.enter_block_scope();
        let stmt = self.parse_function_declaration(FunctionContext::DECLARATION)?;
        self.scope_builder.exit_scope();

        if let Statement::FuncDecl(func) = &stmt {
            if func.is_async() || func.is_generator() {
                return self.error(func.loc, ParseError::FunctionDeclarationNotAllowed);
            }
        }

        let loc = self.mark_loc(start_pos);

        Ok(Statement::Block(Block { loc, body: vec![stmt] }))
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        self.scope_builder.enter_block_scope();
        let block = self.parse_block_in_current_scope()?;
        self.scope_builder.exit_scope();

        Ok(block)
    }

    fn parse_block_in_current_scope(&mut self) -> ParseResult<Block> {
        let start_pos = self.current_start_pos();
        self.expect(Token::LeftBrace)?;

        let mut body = vec![];
        while self.token != Token::RightBrace {
            if self.token == Token::Eof {
                return self.error_expected_token(self.loc, &self.token, &Token::RightBrace);
            }

            body.push(self.parse_statement_list_item(FunctionContext::empty())?);
        }

        self.advance()?;
        let loc = self.mark_loc(start_pos);

        Ok(Block { loc, body })
    }

    fn parse_if_statement(&mut self) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        self.expect(Token::LeftParen)?;
        let test = self.parse_expression()?;
        self.expect(Token::RightParen)?;

        let conseq = p(self.parse_statement_with_function_context(FunctionContext::IF_BODY)?);

        let altern = if self.token == Token::Else {
            self.advance()?;
            Some(p(self.parse_statement_with_function_context(FunctionContext::IF_BODY)?))
        } else {
            None
        };

        let loc = self.mark_loc(start_pos);

        Ok(Statement::If(IfStatement { loc, test, conseq, altern }))
    }

    fn parse_switch_statement(&mut self) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        self.expect(Token::LeftParen)?;
        let discriminant = self.parse_expression()?;
        self.expect(Token::RightParen)?;
        self.expect(Token::LeftBrace)?;

        // The case block is a single scope shared by all cases
        self.scope_builder.enter_block_scope();
        let switch_ctx = self.ctx | ParseContext::IN_SWITCH;
        let cases = self.with_context(switch_ctx, |p| p.parse_switch_cases())?;
        self.scope_builder.exit_scope();

        self.advance()?;
        let loc = self.mark_loc(start_pos);

        Ok(Statement::Switch(SwitchStatement { loc, discriminant, cases }))
    }

    /// Parse cases until the closing brace of the case block, which is not consumed.
    fn parse_switch_cases(&mut self) -> ParseResult<Vec<SwitchCase>> {
        let mut cases = vec![];
        let mut seen_default = false;

        while self.token != Token::RightBrace {
            let case_start_pos = self.current_start_pos();
            let test = match &self.token {
                Token::Case => {
                    self.advance()?;
                    Some(self.parse_expression()?)
                }
                Token::Default if !seen_default => {
                    seen_default = true;
                    self.advance()?;
                    None
                }
                other => return self.error_unexpected_token(self.loc, other),
            };

            self.expect(Token::Colon)?;

            let mut body = vec![];
            while !matches!(
                self.token,
                Token::Case | Token::Default | Token::RightBrace | Token::Eof
            ) {
                body.push(self.parse_statement_list_item(FunctionContext::empty())?);
            }

            let loc = self.mark_loc(case_start_pos);
            cases.push(SwitchCase { loc, test, body });
        }

        Ok(cases)
    }

    fn parse_loop_body(&mut self) -> ParseResult<P<Statement>> {
        let loop_ctx = self.ctx | ParseContext::IN_ITERATION;
        let body = self.with_context(loop_ctx, |p| p.parse_statement())?;
        Ok(p(body))
    }

    fn parse_any_for_statement(&mut self) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let is_await = if self.is_await_keyword() && self.ctx.await_allowed() {
            self.advance()?;
            true
        } else {
            false
        };

        self.expect(Token::LeftParen)?;

        // Lexical declarations in the head are scoped to the loop
        self.scope_builder.enter_block_scope();
        let stmt = self.parse_for_head_and_body(start_pos, is_await)?;
        self.scope_builder.exit_scope();

        Ok(stmt)
    }

    fn parse_for_head_and_body(
        &mut self,
        start_pos: Pos,
        is_await: bool,
    ) -> ParseResult<Statement> {
        let head_ctx = self.ctx.enter(ContextOverrides::new().disallow_in(true));
        let is_let_declaration = self.is_let_declaration_start()?;

        match &self.token {
            Token::Semicolon if !is_await => self.parse_for_statement(None, start_pos),
            Token::Var | Token::Const => self.parse_for_with_declaration(start_pos, is_await),
            Token::Let if is_let_declaration => {
                self.parse_for_with_declaration(start_pos, is_await)
            }
            _ => {
                let starts_with_let = self.token == Token::Let && !self.is_escaped();
                let expr = self.with_context(head_ctx, |p| p.parse_for_init_expression())?;

                if matches!(self.token, Token::In | Token::Of) {
                    // The left hand side of a for-of may not start with `let`
                    if self.token == Token::Of && starts_with_let {
                        return self.error_unexpected_token(self.loc, &self.token);
                    }

                    if self.token == Token::Of
                        && matches!(expr.as_ref(), Expression::Id(id) if id.name == "async")
                        && !is_await
                    {
                        return self.error_unexpected_token(self.loc, &self.token);
                    }

                    if !matches!(expr.as_ref(), Expression::Array(_) | Expression::Object(_)) {
                        self.check_simple_assignment_target(
                            &expr,
                            ParseError::InvalidForLeftHandSide,
                        )?;
                    }

                    let pattern =
                        self.reinterpret_as_pattern(*expr, PatternKind::Assignment, self.ctx)?;
                    let left = p(ForEachInit::Pattern(pattern));
                    return self.parse_for_each_statement(left, start_pos, is_await);
                }

                if is_await {
                    return self.error_expected_token(self.loc, &self.token, &Token::Of);
                }

                self.confirm_expression(&expr)?;
                self.parse_for_statement(Some(p(ForInit::Expression(*expr))), start_pos)
            }
        }
    }

    fn parse_for_with_declaration(
        &mut self,
        start_pos: Pos,
        is_await: bool,
    ) -> ParseResult<Statement> {
        let head_ctx = self.ctx.enter(ContextOverrides::new().disallow_in(true));
        let var_decl = self.with_context(head_ctx, |p| p.parse_variable_declaration(true))?;

        if matches!(self.token, Token::In | Token::Of) {
            self.check_for_each_declaration(&var_decl)?;
            let left = p(ForEachInit::VarDecl(var_decl));
            return self.parse_for_each_statement(left, start_pos, is_await);
        }

        if is_await {
            return self.error_expected_token(self.loc, &self.token, &Token::Of);
        }

        for declarator in &var_decl.declarations {
            if declarator.init.is_none() {
                self.check_declarator_has_initializer(var_decl.kind, &declarator.id)?;
            }
        }

        self.parse_for_statement(Some(p(ForInit::VarDecl(var_decl))), start_pos)
    }

    /// The declaration in a for-in or for-of head must be a single binding without an
    /// initializer. Web compatibility allows an initializer on a simple `var` in a for-in.
    fn check_for_each_declaration(&self, var_decl: &VariableDeclaration) -> ParseResult<()> {
        if var_decl.declarations.len() != 1 {
            return self.error(var_decl.loc, ParseError::ForEachInitInvalidVarDecl);
        }

        let declarator = &var_decl.declarations[0];
        if declarator.init.is_some() {
            let is_legacy_initializer = self.token == Token::In
                && var_decl.kind == VarKind::Var
                && declarator.id.is_id()
                && self.ctx.allows_web_compat();

            if !is_legacy_initializer {
                return self.error(var_decl.loc, ParseError::ForEachInitInvalidVarDecl);
            }
        }

        Ok(())
    }

    /// Parse an expression in a for head, where the expression may turn out to be the left hand
    /// side of a for-in or for-of loop.
    fn parse_for_init_expression(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        let expr = self.parse_assignment_expression_maybe_pattern()?;

        if self.token != Token::Comma {
            return Ok(expr);
        }

        self.confirm_expression(&expr)?;

        let mut expressions = vec![*expr];
        while self.token == Token::Comma {
            self.advance()?;
            expressions.push(*self.parse_assignment_expression()?);
        }

        let loc = self.mark_loc(start_pos);

        Ok(p(Expression::Sequence(SequenceExpression { loc, expressions })))
    }

    fn parse_for_statement(
        &mut self,
        init: Option<P<ForInit>>,
        start_pos: Pos,
    ) -> ParseResult<Statement> {
        self.expect(Token::Semicolon)?;

        let test = match self.token {
            Token::Semicolon => None,
            _ => Some(self.parse_expression()?),
        };
        self.expect(Token::Semicolon)?;

        let update = match self.token {
            Token::RightParen => None,
            _ => Some(self.parse_expression()?),
        };
        self.expect(Token::RightParen)?;

        let body = self.parse_loop_body()?;
        let loc = self.mark_loc(start_pos);

        Ok(Statement::For(ForStatement { loc, init, test, update, body }))
    }

    fn parse_for_each_statement(
        &mut self,
        left: P<ForEachInit>,
        start_pos: Pos,
        is_await: bool,
    ) -> ParseResult<Statement> {
        let kind = match self.token {
            Token::In if !is_await => ForEachKind::In,
            Token::Of => ForEachKind::Of,
            _ => return self.error_unexpected_token(self.loc, &self.token),
        };
        self.advance()?;

        let right = match kind {
            ForEachKind::In => self.parse_expression()?,
            ForEachKind::Of => self.parse_assignment_expression()?,
        };
        self.expect(Token::RightParen)?;

        let body = self.parse_loop_body()?;
        let loc = self.mark_loc(start_pos);

        Ok(Statement::ForEach(ForEachStatement { loc, kind, left, right, body, is_await }))
    }

    fn parse_while_statement(&mut self) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        self.expect(Token::LeftParen)?;
        let test = self.parse_expression()?;
        self.expect(Token::RightParen)?;

        let body = self.parse_loop_body()?;
        let loc = self.mark_loc(start_pos);

        Ok(Statement::While(WhileStatement { loc, test, body }))
    }

    fn parse_do_while_statement(&mut self) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let body = self.parse_loop_body()?;

        self.expect(Token::While)?;
        self.expect(Token::LeftParen)?;
        let test = self.parse_expression()?;
        self.expect(Token::RightParen)?;

        // A semicolon is always inserted after a do-while statement if one is missing
        if self.token == Token::Semicolon {
            self.advance()?;
        }

        let loc = self.mark_loc(start_pos);

        Ok(Statement::DoWhile(DoWhileStatement { loc, test, body }))
    }

    fn parse_with_statement(&mut self) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();

        if self.ctx.is_strict() {
            return self.error(self.loc, ParseError::WithInStrictMode);
        }

        self.advance()?;

        self.expect(Token::LeftParen)?;
        let object = self.parse_expression()?;
        self.expect(Token::RightParen)?;

        let body = p(self.parse_statement()?);
        let loc = self.mark_loc(start_pos);

        Ok(Statement::With(WithStatement { loc, object, body }))
    }

    fn parse_try_statement(&mut self) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let block = p(self.parse_block()?);

        let handler = if self.token == Token::Catch {
            let catch_start_pos = self.current_start_pos();
            self.advance()?;

            // The catch parameter and body share a single scope
            self.scope_builder.enter_block_scope();

            let param = if self.token == Token::LeftParen {
                self.advance()?;
                let param = self.parse_pattern(BindingKind::CatchParameter)?;
                let name_kind = if param.is_id() {
                    NameKind::CatchParameter
                } else {
                    NameKind::Let
                };
                self.declare_pattern_names(&param, name_kind)?;
                self.expect(Token::RightParen)?;
                Some(p(param))
            } else {
                None
            };

            let body = p(self.parse_block_in_current_scope()?);
            self.scope_builder.exit_scope();

            let loc = self.mark_loc(catch_start_pos);
            Some(p(CatchClause { loc, param, body }))
        } else {
            None
        };

        let finalizer = if self.token == Token::Finally {
            self.advance()?;
            Some(p(self.parse_block()?))
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return self.error_expected_token(self.loc, &self.token, &Token::Catch);
        }

        let loc = self.mark_loc(start_pos);

        Ok(Statement::Try(TryStatement { loc, block, handler, finalizer }))
    }

    fn parse_throw_statement(&mut self) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        if self.has_new_line_before() {
            return self.error(self.loc, ParseError::ThrowArgumentOnNewLine);
        }

        let argument = self.parse_expression()?;
        self.expect_semicolon()?;
        let loc = self.mark_loc(start_pos);

        Ok(Statement::Throw(ThrowStatement { loc, argument }))
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();

        if !self.ctx.in_function() {
            return self.error(self.loc, ParseError::ReturnOutsideFunction);
        }

        self.advance()?;

        let argument = if matches!(self.token, Token::Semicolon | Token::RightBrace | Token::Eof)
            || self.has_new_line_before()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.expect_semicolon()?;
        let loc = self.mark_loc(start_pos);

        Ok(Statement::Return(ReturnStatement { loc, argument }))
    }

    /// Parse the optional label after `break` or `continue`, which must be on the same line.
    fn parse_jump_label(&mut self, is_continue: bool) -> ParseResult<Option<Label>> {
        if self.has_new_line_before() || !classifier::is_identifier_name(&self.token) {
            return Ok(None);
        }

        let id = self.parse_identifier_reference()?;
        if let Err(error) = self.scope_builder.check_label_target(&id.name, is_continue) {
            return self.error(id.loc, error);
        }

        Ok(Some(Label { loc: id.loc, name: id.name }))
    }

    fn parse_break_statement(&mut self) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let label = self.parse_jump_label(false)?;
        if label.is_none() && !self.ctx.in_breakable() {
            return self.error(self.mark_loc(start_pos), ParseError::UnlabeledBreakOutsideBreakable);
        }

        self.expect_semicolon()?;
        let loc = self.mark_loc(start_pos);

        Ok(Statement::Break(BreakStatement { loc, label }))
    }

    fn parse_continue_statement(&mut self) -> ParseResult<Statement> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        if !self.ctx.in_iteration() {
            return self.error(self.mark_loc(start_pos), ParseError::ContinueOutsideIterable);
        }

        let label = self.parse_jump_label(true)?;

        self.expect_semicolon()?;
        let loc = self.mark_loc(start_pos);

        Ok(Statement::Continue(ContinueStatement { loc, label }))
    }

    fn parse_labeled_statement(
        &mut self,
        label: Label,
        start_pos: Pos,
        ctx_flags: FunctionContext,
    ) -> ParseResult<Statement> {
        if let Err(error) =
            classifier::check_binding_identifier(&label.name, BindingKind::Label, self.ctx)
        {
            return self.early_error(label.loc, error);
        }

        // Skip the colon
        self.advance()?;

        let is_loop = self.is_labeled_loop_ahead()?;
        if let Err(error) = self.scope_builder.push_label(&label.name, is_loop) {
            return self.error(label.loc, error);
        }

        let body = if self.token == Token::Function {
            self.parse_labeled_function(ctx_flags)?
        } else {
            let inner_flags = FunctionContext::LABELED
                | (ctx_flags & (FunctionContext::ALLOW_LABELED | FunctionContext::TOPLEVEL));
            self.parse_statement_with_function_context(inner_flags)?
        };

        self.scope_builder.pop_label();
        let loc = self.mark_loc(start_pos);

        Ok(Statement::Labeled(LabeledStatement { loc, label: p(label), body: p(body) }))
    }

    /// A function declaration as the body of a labeled statement, only allowed by web
    /// compatibility and only where a declaration could appear.
    fn parse_labeled_function(&mut self, ctx_flags: FunctionContext) -> ParseResult<Statement> {
        if !self.ctx.allows_web_compat() {
            return self.error(self.loc, ParseError::InvalidLabeledFunction(true));
        }

        if !ctx_flags.contains(FunctionContext::ALLOW_LABELED) {
            return self.error(self.loc, ParseError::InvalidLabeledFunction(false));
        }

        let flags = FunctionContext::DECLARATION
            | FunctionContext::LABELED
            | (ctx_flags & FunctionContext::TOPLEVEL);
        let stmt = self.parse_function_declaration(flags)?;

        if let Statement::FuncDecl(func) = &stmt {
            if func.is_async() || func.is_generator() {
                return self.error(func.loc, ParseError::InvalidLabeledFunction(true));
            }
        }

        Ok(stmt)
    }

    /// Whether the statement after a label is a loop, looking through any further labels.
    fn is_labeled_loop_ahead(&mut self) -> ParseResult<bool> {
        let save_state = self.save();

        let result = loop {
            match &self.token {
                Token::For | Token::While | Token::Do => break Ok(true),
                token if classifier::is_identifier_name(token) => {
                    if let Err(error) = self.advance() {
                        break Err(error);
                    }

                    if self.token != Token::Colon {
                        break Ok(false);
                    }

                    if let Err(error) = self.advance() {
                        break Err(error);
                    }
                }
                _ => break Ok(false),
            }
        };

        self.restore(save_state);
        result
    }

    /// Check that an identifier-like token can be used as an identifier reference in the
    /// current context, returning its name.
    fn check_identifier_reference(
        &self,
        token: &Token,
        flags: TokenFlags,
        loc: Loc,
    ) -> ParseResult<String> {
        match classifier::classify(token, flags, self.ctx) {
            IdentifierRole::PlainIdentifier => match identifier_token_name(token) {
                Some(name) => Ok(name),
                None => self.error_unexpected_token(loc, token),
            },
            IdentifierRole::ContextualKeyword(ContextualKeyword::Yield) => {
                self.early_error(loc, EarlyError::InvalidYieldUsage)
            }
            IdentifierRole::ContextualKeyword(ContextualKeyword::Await) => {
                if self.ctx.in_parameters() {
                    self.error(loc, ParseError::AwaitInParameters)
                } else {
                    self.error(loc, ParseError::AwaitNotAllowed)
                }
            }
            IdentifierRole::ReservedWord | IdentifierRole::Invalid => {
                match identifier_token_name(token) {
                    // Escaped keywords and words that are only reserved in strict mode look like
                    // identifiers, so report them as reserved words
                    Some(name)
                        if matches!(token, Token::Identifier(_))
                            || classifier::classify_name(&name, self.ctx - ParseContext::STRICT)
                                == IdentifierRole::PlainIdentifier =>
                    {
                        self.error(loc, ParseError::IdentifierIsReservedWord(name))
                    }
                    _ => self.error_unexpected_token(loc, token),
                }
            }
        }
    }

    fn parse_identifier_reference(&mut self) -> ParseResult<Identifier> {
        let loc = self.loc;
        let name = self.check_identifier_reference(&self.token, self.flags, loc)?;
        self.advance()?;

        Ok(Identifier::new(loc, name))
    }

    fn parse_binding_identifier(&mut self, kind: BindingKind) -> ParseResult<Identifier> {
        self.parse_binding_identifier_in_context(kind, self.ctx)
    }

    /// Parse a binding identifier, checking the name against `ctx` which may differ from the
    /// context the token was lexed in.
    fn parse_binding_identifier_in_context(
        &mut self,
        kind: BindingKind,
        ctx: ParseContext,
    ) -> ParseResult<Identifier> {
        let loc = self.loc;
        let name = match identifier_token_name(&self.token) {
            Some(name) => name,
            None => return self.error_unexpected_token(loc, &self.token),
        };

        if let Err(error) = classifier::check_binding_identifier(&name, kind, ctx) {
            return self.early_error(loc, error);
        }

        self.advance()?;

        Ok(Identifier::new(loc, name))
    }

    /// Parse a binding pattern without a default value.
    fn parse_pattern(&mut self, kind: BindingKind) -> ParseResult<Pattern> {
        match &self.token {
            Token::LeftBracket => self.parse_array_pattern(kind),
            Token::LeftBrace => self.parse_object_pattern(kind),
            _ => Ok(Pattern::Id(self.parse_binding_identifier(kind)?)),
        }
    }

    /// Parse a binding pattern optionally followed by a default value.
    fn parse_pattern_with_default(&mut self, kind: BindingKind) -> ParseResult<Pattern> {
        let start_pos = self.current_start_pos();
        let pattern = self.parse_pattern(kind)?;

        if self.token != Token::Equals {
            return Ok(pattern);
        }

        self.advance()?;
        let right = self.with_in_allowed(|parser| parser.parse_assignment_expression())?;
        let loc = self.mark_loc(start_pos);

        Ok(Pattern::Assign(AssignmentPattern { loc, left: p(pattern), right }))
    }

    fn parse_binding_rest_element(&mut self, kind: BindingKind) -> ParseResult<RestElement> {
        let start_pos = self.current_start_pos();
        self.expect(Token::Spread)?;

        let argument = self.parse_pattern(kind)?;
        let loc = self.mark_loc(start_pos);

        Ok(RestElement { loc, argument: p(argument) })
    }

    /// A rest element must be the last element of its list, with no trailing comma.
    fn check_rest_is_last(&mut self) -> ParseResult<()> {
        if self.token != Token::Comma {
            return Ok(());
        }

        let comma_loc = self.loc;
        match self.peek()? {
            Token::RightParen | Token::RightBracket | Token::RightBrace => {
                self.error(comma_loc, ParseError::RestTrailingComma)
            }
            _ => self.error(comma_loc, ParseError::RestNotLast),
        }
    }

    fn parse_array_pattern(&mut self, kind: BindingKind) -> ParseResult<Pattern> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let mut elements = vec![];
        while self.token != Token::RightBracket {
            match &self.token {
                Token::Comma => {
                    elements.push(ArrayPatternElement::Hole(self.current_start_pos()));
                    self.advance()?;
                    continue;
                }
                Token::Spread => {
                    let rest = self.parse_binding_rest_element(kind)?;
                    self.check_rest_is_last()?;
                    elements.push(ArrayPatternElement::Rest(rest));
                    break;
                }
                _ => elements.push(ArrayPatternElement::Pattern(
                    self.parse_pattern_with_default(kind)?,
                )),
            }

            if self.token == Token::Comma {
                self.advance()?;
            } else {
                break;
            }
        }

        self.expect(Token::RightBracket)?;
        let loc = self.mark_loc(start_pos);

        Ok(Pattern::Array(ArrayPattern { loc, elements }))
    }

    fn parse_object_pattern(&mut self, kind: BindingKind) -> ParseResult<Pattern> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        let mut properties = vec![];
        while self.token != Token::RightBrace {
            let property_start_pos = self.current_start_pos();

            if self.token == Token::Spread {
                self.advance()?;
                let argument = self.parse_binding_identifier(kind)?;
                self.check_rest_is_last()?;

                let loc = self.mark_loc(property_start_pos);
                properties.push(ObjectPatternProperty {
                    loc,
                    key: None,
                    value: p(Pattern::Id(argument)),
                    is_computed: false,
                    is_rest: true,
                });
                break;
            }

            let is_shorthand_candidate = classifier::is_identifier_name(&self.token);
            let name_token_loc = self.loc;
            let (key, is_computed) = self.parse_property_name()?;

            let property = if self.token == Token::Colon {
                self.advance()?;
                let value = self.parse_pattern_with_default(kind)?;
                let loc = self.mark_loc(property_start_pos);

                ObjectPatternProperty {
                    loc,
                    key: Some(key),
                    value: p(value),
                    is_computed,
                    is_rest: false,
                }
            } else {
                // Shorthand properties bind the key itself
                let name = match key.as_ref() {
                    Expression::Id(id) if is_shorthand_candidate && !is_computed => id.name.clone(),
                    _ => return self.error_expected_token(self.loc, &self.token, &Token::Colon),
                };

                if let Err(error) = classifier::check_binding_identifier(&name, kind, self.ctx) {
                    return self.early_error(name_token_loc, error);
                }

                let mut value = Pattern::Id(Identifier::new(name_token_loc, name));
                if self.token == Token::Equals {
                    self.advance()?;
                    let right =
                        self.with_in_allowed(|parser| parser.parse_assignment_expression())?;
                    let loc = self.mark_loc(property_start_pos);
                    value = Pattern::Assign(AssignmentPattern { loc, left: p(value), right });
                }

                let loc = self.mark_loc(property_start_pos);
                ObjectPatternProperty {
                    loc,
                    key: None,
                    value: p(value),
                    is_computed: false,
                    is_rest: false,
                }
            };

            properties.push(property);

            if self.token == Token::Comma {
                self.advance()?;
            } else {
                break;
            }
        }

        self.expect(Token::RightBrace)?;
        let loc = self.mark_loc(start_pos);

        Ok(Pattern::Object(ObjectPattern { loc, properties }))
    }

    /// Parse the name of an object property, class element, or object pattern property.
    /// Returns the key and whether it is computed.
    fn parse_property_name(&mut self) -> ParseResult<(P<Expression>, bool)> {
        let loc = self.loc;
        let key = match &self.token {
            Token::StringLiteral(value) => {
                Expression::String(StringLiteral { loc, value: value.clone() })
            }
            Token::NumberLiteral(value) => Expression::Number(NumberLiteral { loc, value: *value }),
            Token::BigIntLiteral(value) => {
                Expression::BigInt(BigIntLiteral { loc, value: value.clone() })
            }
            Token::LeftBracket => {
                self.advance()?;
                let key = self.with_in_allowed(|parser| parser.parse_assignment_expression())?;
                self.expect(Token::RightBracket)?;

                return Ok((key, true));
            }
            other => match identifier_token_name(other) {
                Some(name) => Expression::Id(Identifier::new(loc, name)),
                None => return self.error_unexpected_token(loc, other),
            },
        };

        self.advance()?;

        Ok((p(key), false))
    }

    pub(super) fn parse_function(&mut self, kind: FunctionKind) -> ParseResult<P<Function>> {
        let start_pos = self.current_start_pos();

        let is_async = self.is_unescaped(&Token::Async);
        if is_async {
            self.advance()?;
        }

        self.expect(Token::Function)?;

        let is_generator = self.token == Token::Multiply;
        if is_generator {
            self.advance()?;
        }

        let id = if kind == FunctionKind::Expression && self.token == Token::LeftParen {
            None
        } else {
            // Function expression names are bound inside the function itself, so are checked
            // with the function's own generator and async status
            let name_ctx = match kind {
                FunctionKind::Expression => self.ctx.for_function_params(is_generator, is_async),
                _ => self.ctx,
            };

            Some(p(self.parse_binding_identifier_in_context(BindingKind::Function, name_ctx)?))
        };

        self.parse_function_params_and_body(start_pos, id, kind, is_async, is_generator)
    }

    fn parse_function_params_and_body(
        &mut self,
        start_pos: Pos,
        id: Option<P<Identifier>>,
        kind: FunctionKind,
        is_async: bool,
        is_generator: bool,
    ) -> ParseResult<P<Function>> {
        trace!(is_async, is_generator, "parsing function");

        let params_ctx =
            kind.add_method_flags(self.ctx.for_function_params(is_generator, is_async));
        let body_ctx = kind.add_method_flags(self.ctx.for_function_body(is_generator, is_async));

        self.scope_builder.enter_function_scope();

        let params = self.with_context(params_ctx, |parser| parser.parse_function_params())?;
        for param in &params {
            self.declare_param_names(param)?;
        }

        let (body, has_use_strict_directive) = self.parse_function_block_body(body_ctx)?;

        self.scope_builder.exit_scope();

        let has_simple_parameter_list = params.iter().all(FunctionParam::is_simple);
        let is_strict_mode = body_ctx.is_strict() || has_use_strict_directive;

        let final_params_ctx = if has_use_strict_directive {
            params_ctx | ParseContext::STRICT
        } else {
            params_ctx
        };

        // Duplicate parameters are only allowed in plain sloppy functions with simple parameter
        // lists
        let allow_duplicates = !is_strict_mode
            && has_simple_parameter_list
            && matches!(kind, FunctionKind::Declaration | FunctionKind::Expression);
        self.check_parameters(&params, ParameterRules { allow_duplicates, ctx: final_params_ctx })?;

        if has_use_strict_directive {
            if !has_simple_parameter_list {
                return self.error(body.loc, ParseError::UseStrictFunctionNonSimpleParameterList);
            }

            // The name of the function is also subject to the directive
            if let Some(id) = &id {
                let name_ctx = match kind {
                    FunctionKind::Declaration => self.ctx | ParseContext::STRICT,
                    _ => final_params_ctx,
                };

                if let Err(error) =
                    classifier::check_binding_identifier(&id.name, BindingKind::Function, name_ctx)
                {
                    return self.early_error(id.loc, error);
                }
            }
        }

        match kind {
            FunctionKind::Getter if !params.is_empty() => {
                return self.error(self.mark_loc(start_pos), ParseError::GetterWrongNumberOfParams);
            }
            FunctionKind::Setter
                if params.len() != 1 || matches!(params[0], FunctionParam::Rest(_)) =>
            {
                return self.error(self.mark_loc(start_pos), ParseError::SetterWrongNumberOfParams);
            }
            _ => {}
        }

        let mut flags = FunctionFlags::empty();
        flags.set(FunctionFlags::IS_ASYNC, is_async);
        flags.set(FunctionFlags::IS_GENERATOR, is_generator);
        flags.set(FunctionFlags::HAS_SIMPLE_PARAMETER_LIST, has_simple_parameter_list);
        flags.set(FunctionFlags::IS_STRICT_MODE, is_strict_mode);
        flags.set(FunctionFlags::HAS_USE_STRICT_DIRECTIVE, has_use_strict_directive);

        let loc = self.mark_loc(start_pos);

        Ok(p(Function {
            loc,
            id,
            params,
            body: p(FunctionBody::Block(body)),
            flags,
        }))
    }

    fn declare_param_names(&mut self, param: &FunctionParam) -> ParseResult<()> {
        let mut ids = vec![];
        param.iter_bound_names(&mut |id| ids.push(id));

        for id in ids {
            self.declare_name(id, NameKind::FunctionParameter)?;
        }

        Ok(())
    }

    fn parse_function_params(&mut self) -> ParseResult<Vec<FunctionParam>> {
        self.expect(Token::LeftParen)?;

        let mut params = vec![];
        while self.token != Token::RightParen {
            if self.token == Token::Spread {
                let rest = self.parse_binding_rest_element(BindingKind::Parameter)?;
                self.check_rest_is_last()?;
                params.push(FunctionParam::Rest(rest));
                break;
            }

            params.push(FunctionParam::Pattern(
                self.parse_pattern_with_default(BindingKind::Parameter)?,
            ));

            if self.token == Token::Comma {
                self.advance()?;
            } else {
                break;
            }
        }

        self.expect(Token::RightParen)?;

        Ok(params)
    }

    /// Parse a function body in braces under `body_ctx`. The directive prologue is scanned first
    /// so that the whole body is lexed and parsed in strict mode if it contains "use strict".
    ///
    /// Returns the body and whether it has a "use strict" directive.
    fn parse_function_block_body(
        &mut self,
        body_ctx: ParseContext,
    ) -> ParseResult<(FunctionBlockBody, bool)> {
        let start_pos = self.current_start_pos();
        if self.token != Token::LeftBrace {
            return self.error_expected_token(self.loc, &self.token, &Token::LeftBrace);
        }

        let brace_state = self.save();
        let has_use_strict_directive = self.with_context(body_ctx, |parser| {
            parser.advance()?;
            parser.scan_for_use_strict()
        })?;
        self.restore(brace_state);

        let body_ctx = if has_use_strict_directive {
            body_ctx | ParseContext::STRICT
        } else {
            body_ctx
        };

        let mut body = self.with_context(body_ctx, |parser| {
            parser.advance()?;
            parser.parse_statements_until_right_brace(FunctionContext::TOPLEVEL)
        })?;

        // The token after the closing brace belongs to the enclosing context
        self.expect(Token::RightBrace)?;
        self.mark_directives(&mut body);

        let loc = self.mark_loc(start_pos);

        Ok((FunctionBlockBody { loc, body }, has_use_strict_directive))
    }

    /// Parse statements up to a closing brace, which is left as the current token.
    fn parse_statements_until_right_brace(
        &mut self,
        ctx_flags: FunctionContext,
    ) -> ParseResult<Vec<Statement>> {
        let mut body = vec![];
        while self.token != Token::RightBrace {
            if self.token == Token::Eof {
                return self.error_expected_token(self.loc, &self.token, &Token::RightBrace);
            }

            body.push(self.parse_statement_list_item(ctx_flags)?);
        }

        Ok(body)
    }

    fn parse_class(&mut self, is_declaration: bool) -> ParseResult<P<Class>> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        // All parts of a class are strict mode code, including its name
        let class_ctx = self.ctx | ParseContext::STRICT;

        let has_name = is_declaration
            || !matches!(self.token, Token::Extends | Token::LeftBrace);
        let id = if has_name {
            let id = self.parse_binding_identifier_in_context(BindingKind::Class, class_ctx)?;
            if is_declaration {
                self.declare_name(&id, NameKind::Class)?;
            }

            Some(p(id))
        } else {
            None
        };

        let (super_class, body_start_pos, body) =
            self.with_context(class_ctx, |parser| parser.parse_class_tail())?;

        // The token after the closing brace belongs to the enclosing context
        self.expect(Token::RightBrace)?;
        let body_loc = self.mark_loc(body_start_pos);
        let loc = self.mark_loc(start_pos);

        Ok(p(Class { loc, id, super_class, body_loc, body }))
    }

    /// Parse the heritage and elements of a class, leaving the closing brace as the current
    /// token.
    fn parse_class_tail(
        &mut self,
    ) -> ParseResult<(Option<P<Expression>>, Pos, Vec<ClassElement>)> {
        let super_class = if self.token == Token::Extends {
            self.advance()?;
            let expr = self.parse_left_hand_side_expression()?;
            self.confirm_expression(&expr)?;
            Some(expr)
        } else {
            None
        };

        let body_start_pos = self.current_start_pos();
        self.expect(Token::LeftBrace)?;

        let has_super_class = super_class.is_some();
        let mut has_constructor = false;
        let mut body = vec![];

        while self.token != Token::RightBrace {
            match &self.token {
                Token::Semicolon => self.advance()?,
                Token::Eof => {
                    return self.error_expected_token(self.loc, &self.token, &Token::RightBrace)
                }
                _ => body.push(self.parse_class_element(has_super_class, &mut has_constructor)?),
            }
        }

        Ok((super_class, body_start_pos, body))
    }

    fn parse_class_element(
        &mut self,
        has_super_class: bool,
        has_constructor: &mut bool,
    ) -> ParseResult<ClassElement> {
        let start_pos = self.current_start_pos();

        let mut is_static = false;
        if self.is_unescaped(&Token::Static) {
            match self.peek()? {
                Token::LeftBrace => return self.parse_class_static_block(),
                // A property or method named `static`
                Token::LeftParen | Token::Equals | Token::Semicolon | Token::RightBrace => {}
                _ => {
                    self.advance()?;
                    is_static = true;
                }
            }
        }

        let head = self.parse_property_head()?;

        if self.token == Token::LeftParen || head.is_method_like() {
            let is_constructor = !is_static && head.has_static_name("constructor");
            if is_constructor {
                if head.is_method_like() {
                    return self.error(head.key.loc(), ParseError::NonSimpleConstructor);
                }

                if *has_constructor {
                    return self.error(head.key.loc(), ParseError::MultipleConstructors);
                }

                *has_constructor = true;
            }

            if is_static && head.has_static_name("prototype") {
                return self.error(head.key.loc(), ParseError::ClassStaticPrototype);
            }

            let (function_kind, kind) = match head.accessor {
                Some(PropertyKind::Get) => (FunctionKind::Getter, ClassMethodKind::Get),
                Some(PropertyKind::Set) => (FunctionKind::Setter, ClassMethodKind::Set),
                _ if is_constructor => (
                    FunctionKind::Constructor { is_derived: has_super_class },
                    ClassMethodKind::Constructor,
                ),
                _ => (FunctionKind::Method, ClassMethodKind::Method),
            };

            let value = self.parse_function_params_and_body(
                self.current_start_pos(),
                None,
                function_kind,
                head.is_async,
                head.is_generator,
            )?;

            let loc = self.mark_loc(start_pos);

            return Ok(ClassElement::Method(ClassMethod {
                loc,
                key: head.key,
                value,
                kind,
                is_computed: head.is_computed,
                is_static,
            }));
        }

        // Otherwise this is a field
        if head.has_static_name("constructor") {
            return self.error(head.key.loc(), ParseError::NonSimpleConstructor);
        }

        if is_static && head.has_static_name("prototype") {
            return self.error(head.key.loc(), ParseError::ClassStaticPrototype);
        }

        let value = if self.token == Token::Equals {
            self.advance()?;

            let field_ctx = self.ctx.for_class_field();
            self.scope_builder.enter_function_scope();
            let value =
                self.with_context(field_ctx, |parser| parser.parse_assignment_expression())?;
            self.scope_builder.exit_scope();

            Some(value)
        } else {
            None
        };

        self.expect_semicolon()?;
        let loc = self.mark_loc(start_pos);

        Ok(ClassElement::Property(ClassProperty {
            loc,
            key: head.key,
            value,
            is_computed: head.is_computed,
            is_static,
        }))
    }

    fn parse_class_static_block(&mut self) -> ParseResult<ClassElement> {
        let start_pos = self.current_start_pos();

        // Skip the `static` keyword
        self.advance()?;

        let block_ctx = self.ctx.for_static_block();
        self.scope_builder.enter_function_scope();
        let body = self.with_context(block_ctx, |parser| {
            parser.expect(Token::LeftBrace)?;
            parser.parse_statements_until_right_brace(FunctionContext::TOPLEVEL)
        })?;
        self.scope_builder.exit_scope();

        self.expect(Token::RightBrace)?;
        let loc = self.mark_loc(start_pos);

        Ok(ClassElement::StaticBlock(StaticBlock { loc, body }))
    }

    /// Whether the token after the current one ends a property name, meaning the current token
    /// is the name itself rather than a modifier.
    fn is_property_name_end_ahead(&mut self) -> ParseResult<bool> {
        Ok(matches!(
            self.peek()?,
            Token::LeftParen
                | Token::Colon
                | Token::Comma
                | Token::RightBrace
                | Token::Equals
                | Token::Semicolon
        ))
    }

    /// Parse the modifiers and name at the start of an object property or class element.
    fn parse_property_head(&mut self) -> ParseResult<PropertyHead> {
        let loc_start = self.current_start_pos();

        let mut is_async = false;
        if self.is_unescaped(&Token::Async) && !self.is_property_name_end_ahead()? {
            let (_, next_flags) = self.peek_with_flags()?;
            if !next_flags.contains(TokenFlags::NEW_LINE_BEFORE) {
                self.advance()?;
                is_async = true;
            }
        }

        let is_generator = self.token == Token::Multiply;
        if is_generator {
            self.advance()?;
        }

        let mut accessor = None;
        if !is_async
            && !is_generator
            && (self.is_unescaped(&Token::Get) || self.is_unescaped(&Token::Set))
            && !self.is_property_name_end_ahead()?
        {
            accessor =
                Some(if self.token == Token::Get { PropertyKind::Get } else { PropertyKind::Set });
            self.advance()?;
        }

        let key_token = if classifier::is_identifier_name(&self.token) {
            Some((self.token.clone(), self.flags))
        } else {
            None
        };

        let (key, is_computed) = self.parse_property_name()?;

        Ok(PropertyHead {
            loc_start,
            key,
            is_computed,
            is_async,
            is_generator,
            accessor,
            key_token: if is_computed { None } else { key_token },
        })
    }

    /// Reject an expression that is only valid as a pattern or as arrow function parameters,
    /// now that it is known to be used as an expression.
    pub(super) fn confirm_expression(&self, expr: &Expression) -> ParseResult<()> {
        if let Expression::Cover(cover) = expr {
            return self.error(cover.loc, ParseError::ParenthesizedListNotAnExpression);
        }

        match expr.cover_marker() {
            Some(CoverMarker::ShorthandInitializer(loc)) => {
                self.error(loc, ParseError::InvalidPatternInitializer)
            }
            Some(CoverMarker::DuplicateProto(loc)) => {
                self.error(loc, ParseError::DuplicateProtoProperty)
            }
            None => Ok(()),
        }
    }

    pub(super) fn parse_expression(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        let expr = self.parse_assignment_expression()?;

        if self.token != Token::Comma {
            return Ok(expr);
        }

        let mut expressions = vec![*expr];
        while self.token == Token::Comma {
            self.advance()?;
            expressions.push(*self.parse_assignment_expression()?);
        }

        let loc = self.mark_loc(start_pos);

        Ok(p(Expression::Sequence(SequenceExpression { loc, expressions })))
    }

    pub(super) fn parse_assignment_expression(&mut self) -> ParseResult<P<Expression>> {
        let expr = self.parse_assignment_expression_maybe_pattern()?;
        self.confirm_expression(&expr)?;

        Ok(expr)
    }

    /// Parse an assignment expression that may still turn out to be a pattern, for example an
    /// array element that is later reinterpreted as part of a destructuring assignment. Object
    /// and array literals in the result may carry an unresolved cover marker.
    pub(super) fn parse_assignment_expression_maybe_pattern(
        &mut self,
    ) -> ParseResult<P<Expression>> {
        if self.is_yield_keyword() {
            return self.parse_yield_expression();
        }

        let start_pos = self.current_start_pos();

        if self.is_unescaped(&Token::Async) && self.is_async_arrow_with_identifier_ahead()? {
            return self.parse_async_arrow_with_identifier();
        }

        let expr = self.parse_conditional_expression()?;

        match &self.token {
            Token::Arrow => self.parse_arrow_function_from_head(expr, start_pos),
            Token::Equals => {
                if !matches!(expr.as_ref(), Expression::Array(_) | Expression::Object(_)) {
                    self.check_simple_assignment_target(
                        &expr,
                        ParseError::InvalidAssignmentLeftHandSide,
                    )?;
                }

                let left = self.reinterpret_as_pattern(*expr, PatternKind::Assignment, self.ctx)?;
                self.parse_assignment_right_side(left, AssignmentOperator::Equals, start_pos)
            }
            token => match compound_assignment_operator(token) {
                Some(operator) => {
                    self.check_simple_assignment_target(
                        &expr,
                        ParseError::InvalidAssignmentLeftHandSide,
                    )?;

                    let left =
                        self.reinterpret_as_pattern(*expr, PatternKind::Assignment, self.ctx)?;
                    self.parse_assignment_right_side(left, operator, start_pos)
                }
                None => Ok(expr),
            },
        }
    }

    fn parse_assignment_right_side(
        &mut self,
        left: Pattern,
        operator: AssignmentOperator,
        start_pos: Pos,
    ) -> ParseResult<P<Expression>> {
        // Skip the assignment operator
        self.advance()?;

        let right = self.parse_assignment_expression()?;
        let loc = self.mark_loc(start_pos);

        Ok(p(Expression::Assign(AssignmentExpression { loc, operator, left: p(left), right })))
    }

    /// Targets of compound assignment and update expressions must be identifiers or member
    /// expressions, optionally parenthesized.
    fn check_simple_assignment_target(
        &self,
        expr: &Expression,
        error: ParseError,
    ) -> ParseResult<()> {
        match expr.unparenthesized() {
            Expression::Id(id) => self.check_assignable_identifier(id),
            Expression::Member(_) | Expression::SuperMember(_) => Ok(()),
            _ => self.error(expr.loc(), error),
        }
    }

    fn parse_yield_expression(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();

        if !self.ctx.yield_allowed() {
            return self.early_error(self.loc, EarlyError::InvalidYieldUsage);
        }

        self.advance()?;

        let (argument, is_delegate) =
            if self.token == Token::Multiply && !self.has_new_line_before() {
                self.advance()?;
                (Some(self.parse_assignment_expression()?), true)
            } else if self.is_yield_argument_omitted() {
                (None, false)
            } else {
                (Some(self.parse_assignment_expression()?), false)
            };

        let loc = self.mark_loc(start_pos);

        Ok(p(Expression::Yield(YieldExpression { loc, argument, is_delegate })))
    }

    /// A yield has no argument if followed by a new line or a token that cannot start an
    /// expression.
    fn is_yield_argument_omitted(&self) -> bool {
        if self.has_new_line_before() {
            return true;
        }

        match &self.token {
            Token::RightParen
            | Token::RightBracket
            | Token::RightBrace
            | Token::Comma
            | Token::Colon
            | Token::Semicolon
            | Token::Eof
            | Token::In => true,
            Token::Of => self.ctx.disallow_in(),
            _ => false,
        }
    }

    fn parse_conditional_expression(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        let expr = self.parse_expression_with_precedence(Precedence::Conditional)?;

        if self.token != Token::Question {
            return Ok(expr);
        }

        self.confirm_expression(&expr)?;
        self.advance()?;

        let conseq = self.with_in_allowed(|parser| parser.parse_assignment_expression())?;
        self.expect(Token::Colon)?;
        let altern = self.parse_assignment_expression()?;

        let loc = self.mark_loc(start_pos);

        Ok(p(Expression::Conditional(ConditionalExpression { loc, test: expr, conseq, altern })))
    }

    fn parse_expression_with_precedence(
        &mut self,
        precedence: Precedence,
    ) -> ParseResult<P<Expression>> {
        // A yield expression extends as far right as possible, so it is always the last operand
        if self.is_yield_keyword() {
            return self.parse_yield_expression();
        }

        let start_pos = self.current_start_pos();
        let mut expr = self.parse_expression_prefix()?;

        while let Some((operator, operator_precedence)) = self.infix_operator() {
            if !precedence.is_weaker_than(operator_precedence) {
                break;
            }

            self.advance()?;

            expr = match operator {
                InfixOperator::Binary(BinaryOperator::Exponent) => self.parse_binary_expression(
                    expr,
                    start_pos,
                    BinaryOperator::Exponent,
                    // Right associative, so the right side is parsed at a lower precedence
                    Precedence::Multiplication,
                )?,
                InfixOperator::Binary(operator) => {
                    self.parse_binary_expression(expr, start_pos, operator, operator_precedence)?
                }
                InfixOperator::Logical(operator) => {
                    self.parse_logical_expression(expr, start_pos, operator, operator_precedence)?
                }
            };
        }

        Ok(expr)
    }

    /// The binary or logical operator at the current token along with its precedence.
    fn infix_operator(&self) -> Option<(InfixOperator, Precedence)> {
        let binary = |operator, precedence| Some((InfixOperator::Binary(operator), precedence));
        let logical = |operator, precedence| Some((InfixOperator::Logical(operator), precedence));

        match &self.token {
            Token::Plus => binary(BinaryOperator::Add, Precedence::Addition),
            Token::Minus => binary(BinaryOperator::Subtract, Precedence::Addition),
            Token::Multiply => binary(BinaryOperator::Multiply, Precedence::Multiplication),
            Token::Divide => binary(BinaryOperator::Divide, Precedence::Multiplication),
            Token::Remainder => binary(BinaryOperator::Remainder, Precedence::Multiplication),
            Token::Exponent => binary(BinaryOperator::Exponent, Precedence::Exponentiation),
            Token::BitwiseAnd => binary(BinaryOperator::And, Precedence::BitwiseAnd),
            Token::BitwiseOr => binary(BinaryOperator::Or, Precedence::BitwiseOr),
            Token::BitwiseXor => binary(BinaryOperator::Xor, Precedence::BitwiseXor),
            Token::ShiftLeft => binary(BinaryOperator::ShiftLeft, Precedence::Shift),
            Token::ShiftRightArithmetic => {
                binary(BinaryOperator::ShiftRightArithmetic, Precedence::Shift)
            }
            Token::ShiftRightLogical => {
                binary(BinaryOperator::ShiftRightLogical, Precedence::Shift)
            }
            Token::EqEq => binary(BinaryOperator::EqEq, Precedence::Equality),
            Token::NotEq => binary(BinaryOperator::NotEq, Precedence::Equality),
            Token::EqEqEq => binary(BinaryOperator::EqEqEq, Precedence::Equality),
            Token::NotEqEq => binary(BinaryOperator::NotEqEq, Precedence::Equality),
            Token::LessThan => binary(BinaryOperator::LessThan, Precedence::Relational),
            Token::LessThanOrEqual => {
                binary(BinaryOperator::LessThanOrEqual, Precedence::Relational)
            }
            Token::GreaterThan => binary(BinaryOperator::GreaterThan, Precedence::Relational),
            Token::GreaterThanOrEqual => {
                binary(BinaryOperator::GreaterThanOrEqual, Precedence::Relational)
            }
            Token::InstanceOf => binary(BinaryOperator::InstanceOf, Precedence::Relational),
            Token::In if !self.ctx.disallow_in() => {
                binary(BinaryOperator::In, Precedence::Relational)
            }
            Token::LogicalAnd => logical(LogicalOperator::And, Precedence::LogicalAnd),
            Token::LogicalOr => logical(LogicalOperator::Or, Precedence::LogicalOr),
            Token::NullishCoalesce => {
                logical(LogicalOperator::NullishCoalesce, Precedence::NullishCoalesce)
            }
            _ => None,
        }
    }

    fn parse_binary_expression(
        &mut self,
        left: P<Expression>,
        start_pos: Pos,
        operator: BinaryOperator,
        precedence: Precedence,
    ) -> ParseResult<P<Expression>> {
        self.confirm_expression(&left)?;

        // The left side of an exponentiation cannot be an unparenthesized unary expression
        if operator == BinaryOperator::Exponent
            && matches!(left.as_ref(), Expression::Unary(_) | Expression::Await(_))
        {
            return self.error(left.loc(), ParseError::ExponentLeftHandSideUnary);
        }

        let right = self.parse_expression_with_precedence(precedence)?;
        self.confirm_expression(&right)?;

        let loc = self.mark_loc(start_pos);

        Ok(p(Expression::Binary(BinaryExpression { loc, operator, left, right })))
    }

    fn parse_logical_expression(
        &mut self,
        left: P<Expression>,
        start_pos: Pos,
        operator: LogicalOperator,
        precedence: Precedence,
    ) -> ParseResult<P<Expression>> {
        self.confirm_expression(&left)?;

        let right = self.parse_expression_with_precedence(precedence)?;
        self.confirm_expression(&right)?;

        let loc = self.mark_loc(start_pos);

        // Nullish coalescing cannot be mixed with other logical operators without parentheses
        let is_mixed = match operator {
            LogicalOperator::NullishCoalesce => is_and_or(&left) || is_and_or(&right),
            LogicalOperator::And | LogicalOperator::Or => is_nullish(&left) || is_nullish(&right),
        };

        if is_mixed {
            return self.error(loc, ParseError::NullishCoalesceMixedWithLogical);
        }

        Ok(p(Expression::Logical(LogicalExpression { loc, operator, left, right })))
    }

    fn parse_expression_prefix(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();

        if let Some(operator) = unary_operator(&self.token) {
            self.advance()?;

            let argument = self.parse_expression_prefix()?;
            self.confirm_expression(&argument)?;

            if operator == UnaryOperator::Delete
                && self.ctx.is_strict()
                && matches!(argument.unparenthesized(), Expression::Id(_))
            {
                return self.error(argument.loc(), ParseError::DeleteIdentifierInStrictMode);
            }

            let loc = self.mark_loc(start_pos);
            return Ok(p(Expression::Unary(UnaryExpression { loc, operator, argument })));
        }

        match &self.token {
            Token::Increment | Token::Decrement => {
                let operator = update_operator(&self.token);
                self.advance()?;

                let argument = self.parse_expression_prefix()?;
                self.check_simple_assignment_target(
                    &argument,
                    ParseError::InvalidUpdateExpressionArgument,
                )?;

                let loc = self.mark_loc(start_pos);

                Ok(p(Expression::Update(UpdateExpression {
                    loc,
                    operator,
                    argument,
                    is_prefix: true,
                })))
            }
            _ if self.is_await_keyword() && self.ctx.await_allowed() => {
                self.advance()?;

                let argument = self.parse_expression_prefix()?;
                self.confirm_expression(&argument)?;

                let loc = self.mark_loc(start_pos);

                Ok(p(Expression::Await(AwaitExpression { loc, argument })))
            }
            _ => {
                let expr = self.parse_left_hand_side_expression()?;

                // Postfix update operators must be on the same line as their argument
                if !matches!(self.token, Token::Increment | Token::Decrement)
                    || self.has_new_line_before()
                {
                    return Ok(expr);
                }

                self.check_simple_assignment_target(
                    &expr,
                    ParseError::InvalidUpdateExpressionArgument,
                )?;

                let operator = update_operator(&self.token);
                self.advance()?;
                let loc = self.mark_loc(start_pos);

                Ok(p(Expression::Update(UpdateExpression {
                    loc,
                    operator,
                    argument: expr,
                    is_prefix: false,
                })))
            }
        }
    }

    fn parse_left_hand_side_expression(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();

        let expr = match &self.token {
            Token::New => {
                let (expr, has_arguments) = self.parse_new_expression()?;

                // A new expression without arguments cannot be called
                if !has_arguments {
                    return Ok(expr);
                }

                expr
            }
            Token::Super => self.parse_super_expression()?,
            Token::Import => self.parse_import_expression()?,
            _ => self.parse_primary_expression()?,
        };

        self.parse_member_and_call_expression(expr, start_pos, true)
    }

    /// Parse the chain of member accesses, calls, and tagged templates following `expr`.
    fn parse_member_and_call_expression(
        &mut self,
        expr: P<Expression>,
        start_pos: Pos,
        allow_call: bool,
    ) -> ParseResult<P<Expression>> {
        let mut expr = expr;
        let mut in_optional_chain = false;

        loop {
            expr = match &self.token {
                Token::Period => {
                    self.confirm_expression(&expr)?;
                    self.advance()?;
                    let property = self.parse_member_property_name()?;

                    self.member_expression(expr, property, start_pos, false, false)
                }
                Token::LeftBracket => {
                    self.confirm_expression(&expr)?;
                    self.advance()?;
                    let property = self.with_in_allowed(|parser| parser.parse_expression())?;
                    self.expect(Token::RightBracket)?;

                    self.member_expression(expr, property, start_pos, true, false)
                }
                Token::LeftParen if allow_call => {
                    self.confirm_expression(&expr)?;
                    let arguments = self.parse_call_arguments()?;

                    self.call_expression(expr, arguments, start_pos, false)
                }
                Token::TemplatePart { .. } => {
                    self.confirm_expression(&expr)?;
                    if in_optional_chain {
                        return self.error(self.loc, ParseError::TaggedTemplateInOptionalChain);
                    }

                    let quasi = self.parse_template_literal(true)?;
                    let loc = self.mark_loc(start_pos);

                    let tagged = TaggedTemplateExpression { loc, tag: expr, quasi };
                    p(Expression::TaggedTemplate(tagged))
                }
                Token::QuestionDot if allow_call => {
                    self.confirm_expression(&expr)?;
                    self.advance()?;
                    in_optional_chain = true;

                    match &self.token {
                        Token::LeftParen => {
                            let arguments = self.parse_call_arguments()?;
                            self.call_expression(expr, arguments, start_pos, true)
                        }
                        Token::LeftBracket => {
                            self.advance()?;
                            let property =
                                self.with_in_allowed(|parser| parser.parse_expression())?;
                            self.expect(Token::RightBracket)?;

                            self.member_expression(expr, property, start_pos, true, true)
                        }
                        Token::TemplatePart { .. } => {
                            return self.error(self.loc, ParseError::TaggedTemplateInOptionalChain)
                        }
                        _ => {
                            let property = self.parse_member_property_name()?;
                            self.member_expression(expr, property, start_pos, false, true)
                        }
                    }
                }
                _ => break,
            };
        }

        if in_optional_chain {
            let loc = self.mark_loc(start_pos);
            expr = p(Expression::Chain(ChainExpression { loc, expression: expr }));
        }

        Ok(expr)
    }

    fn member_expression(
        &self,
        object: P<Expression>,
        property: P<Expression>,
        start_pos: Pos,
        is_computed: bool,
        is_optional: bool,
    ) -> P<Expression> {
        let loc = self.mark_loc(start_pos);
        p(Expression::Member(MemberExpression { loc, object, property, is_computed, is_optional }))
    }

    fn call_expression(
        &self,
        callee: P<Expression>,
        arguments: Vec<CallArgument>,
        start_pos: Pos,
        is_optional: bool,
    ) -> P<Expression> {
        let loc = self.mark_loc(start_pos);
        p(Expression::Call(CallExpression { loc, callee, arguments, is_optional }))
    }

    /// The name after a `.` in a member expression, which may be any identifier name.
    fn parse_member_property_name(&mut self) -> ParseResult<P<Expression>> {
        let loc = self.loc;
        match identifier_token_name(&self.token) {
            Some(name) => {
                self.advance()?;
                Ok(p(Expression::Id(Identifier::new(loc, name))))
            }
            None => self.error_unexpected_token(loc, &self.token),
        }
    }

    fn parse_call_arguments(&mut self) -> ParseResult<Vec<CallArgument>> {
        let (arguments, _) = self.parse_parenthesized_elements()?;

        for argument in &arguments {
            match argument {
                CallArgument::Expression(expr) => self.confirm_expression(expr)?,
                CallArgument::Spread(spread) => self.confirm_expression(&spread.argument)?,
            }
        }

        Ok(arguments)
    }

    /// Parse a comma separated list in parentheses whose elements may be spreads, and which may
    /// turn out to be arrow function parameters. Returns the elements and whether the list had a
    /// trailing comma.
    fn parse_parenthesized_elements(&mut self) -> ParseResult<(Vec<CallArgument>, bool)> {
        self.with_in_allowed(|parser| {
            parser.expect(Token::LeftParen)?;

            let mut elements = vec![];
            let mut has_trailing_comma = false;

            while parser.token != Token::RightParen {
                if parser.token == Token::Spread {
                    elements.push(CallArgument::Spread(parser.parse_spread_element()?));
                } else {
                    let expr = parser.parse_assignment_expression_maybe_pattern()?;
                    elements.push(CallArgument::Expression(*expr));
                }

                if parser.token == Token::Comma {
                    parser.advance()?;
                    has_trailing_comma = parser.token == Token::RightParen;
                } else {
                    break;
                }
            }

            parser.expect(Token::RightParen)?;

            Ok((elements, has_trailing_comma))
        })
    }

    fn parse_spread_element(&mut self) -> ParseResult<SpreadElement> {
        let start_pos = self.current_start_pos();
        self.expect(Token::Spread)?;

        let argument = self.parse_assignment_expression_maybe_pattern()?;
        let loc = self.mark_loc(start_pos);
        let has_trailing_comma = self.token == Token::Comma;

        Ok(SpreadElement { loc, argument, has_trailing_comma })
    }

    /// Returns the new expression and whether it had an argument list. Member accesses are
    /// part of the callee, so `new a.b()` constructs `a.b`.
    fn parse_new_expression(&mut self) -> ParseResult<(P<Expression>, bool)> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        if self.token == Token::Period {
            return Ok((self.parse_new_target(start_pos)?, true));
        }

        let callee_start_pos = self.current_start_pos();
        let callee = match &self.token {
            Token::New => self.parse_new_expression()?.0,
            Token::Super => self.parse_super_expression()?,
            Token::Import => return self.error_unexpected_token(self.loc, &Token::Import),
            _ => self.parse_primary_expression()?,
        };

        let callee = self.parse_member_and_call_expression(callee, callee_start_pos, false)?;
        self.confirm_expression(&callee)?;

        let (arguments, has_arguments) = if self.token == Token::LeftParen {
            (self.parse_call_arguments()?, true)
        } else {
            (vec![], false)
        };

        let loc = self.mark_loc(start_pos);

        Ok((p(Expression::New(NewExpression { loc, callee, arguments })), has_arguments))
    }

    fn parse_new_target(&mut self, start_pos: Pos) -> ParseResult<P<Expression>> {
        // Skip the period
        self.advance()?;

        if !self.is_unescaped(&Token::Target) {
            return self.error(self.loc, ParseError::ExpectedNewTarget);
        }

        self.advance()?;
        let loc = self.mark_loc(start_pos);

        if !self.ctx.new_target_allowed() {
            return self.error(loc, ParseError::NewTargetOutsideFunction);
        }

        Ok(p(Expression::MetaProperty(MetaProperty { loc, kind: MetaPropertyKind::NewTarget })))
    }

    fn parse_super_expression(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        let super_ = self.loc;
        self.advance()?;

        match &self.token {
            Token::LeftParen => {
                if !self.ctx.in_derived_constructor() {
                    return self.error(super_, ParseError::SuperCallOutsideDerivedConstructor);
                }

                let arguments = self.parse_call_arguments()?;
                let loc = self.mark_loc(start_pos);

                Ok(p(Expression::SuperCall(SuperCallExpression { loc, super_, arguments })))
            }
            Token::Period | Token::LeftBracket => {
                if !self.ctx.in_method() {
                    return self.error(super_, ParseError::SuperPropertyOutsideMethod);
                }

                let is_computed = self.token == Token::LeftBracket;
                self.advance()?;

                let property = if is_computed {
                    let property = self.with_in_allowed(|parser| parser.parse_expression())?;
                    self.expect(Token::RightBracket)?;
                    property
                } else {
                    self.parse_member_property_name()?
                };

                let loc = self.mark_loc(start_pos);

                Ok(p(Expression::SuperMember(SuperMemberExpression {
                    loc,
                    super_,
                    property,
                    is_computed,
                })))
            }
            other => self.error_unexpected_token(self.loc, other),
        }
    }

    fn parse_import_expression(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        self.advance()?;

        if self.token != Token::LeftParen {
            return self.error_expected_token(self.loc, &self.token, &Token::LeftParen);
        }

        let source = self.with_in_allowed(|parser| {
            parser.advance()?;
            let source = parser.parse_assignment_expression()?;
            parser.expect(Token::RightParen)?;
            Ok(source)
        })?;

        let loc = self.mark_loc(start_pos);

        Ok(p(Expression::Import(ImportExpression { loc, source })))
    }

    fn parse_primary_expression(&mut self) -> ParseResult<P<Expression>> {
        let loc = self.loc;

        let expr = match &self.token {
            Token::Null => Expression::Null(loc),
            Token::True => Expression::Boolean(BooleanLiteral { loc, value: true }),
            Token::False => Expression::Boolean(BooleanLiteral { loc, value: false }),
            Token::NumberLiteral(value) => Expression::Number(NumberLiteral { loc, value: *value }),
            Token::StringLiteral(value) => {
                Expression::String(StringLiteral { loc, value: value.clone() })
            }
            Token::BigIntLiteral(value) => {
                Expression::BigInt(BigIntLiteral { loc, value: value.clone() })
            }
            Token::This => Expression::This(loc),
            Token::Divide | Token::DivideEq => return self.parse_regexp_literal(),
            Token::TemplatePart { .. } => {
                return Ok(p(Expression::Template(*self.parse_template_literal(false)?)))
            }
            Token::LeftParen => return self.parse_parenthesized_expression(),
            Token::LeftBracket => return self.parse_array_literal(),
            Token::LeftBrace => return self.parse_object_literal(),
            Token::Function => {
                return Ok(p(Expression::Function(self.parse_function(FunctionKind::Expression)?)))
            }
            Token::Class => return Ok(p(Expression::Class(self.parse_class(false)?))),
            Token::Async if !self.is_escaped() => return self.parse_async_primary(),
            _ => return Ok(p(Expression::Id(self.parse_identifier_reference()?))),
        };

        self.advance()?;

        Ok(p(expr))
    }

    fn parse_regexp_literal(&mut self) -> ParseResult<P<Expression>> {
        // The slash was lexed as a division operator, so lex again as a regular expression
        self.advance_regexp_literal()?;

        let loc = self.loc;
        let expr = match &self.token {
            Token::RegExpLiteral { pattern, flags, .. } => Expression::RegExp(RegExpLiteral {
                loc,
                pattern: pattern.clone(),
                flags: flags.clone(),
            }),
            other => return self.error_unexpected_token(loc, other),
        };

        self.advance()?;

        Ok(p(expr))
    }

    fn parse_template_literal(&mut self, is_tagged: bool) -> ParseResult<P<TemplateLiteral>> {
        let start_pos = self.current_start_pos();

        let mut quasis = vec![];
        let mut expressions = vec![];

        loop {
            let part_loc = self.loc;
            let (raw, cooked, is_tail) = match &self.token {
                Token::TemplatePart { raw, cooked, is_tail, .. } => {
                    (raw.clone(), cooked.clone(), *is_tail)
                }
                other => return self.error_unexpected_token(part_loc, other),
            };

            // Malformed escape sequences are only allowed in tagged templates
            let cooked = match cooked {
                Ok(cooked) => Some(cooked),
                Err(_) if is_tagged => None,
                Err(escape_loc) => {
                    return self.error(escape_loc, ParseError::MalformedEscapeSequence)
                }
            };

            // Element locations exclude the surrounding backtick, `}`, and `${` delimiters
            let end_delimiter_len = if is_tail { 1 } else { 2 };
            let loc = Loc::new(part_loc.start + 1, part_loc.end - end_delimiter_len);
            quasis.push(TemplateElement { loc, raw, cooked, is_tail });

            if is_tail {
                self.advance()?;
                break;
            }

            self.advance()?;
            let expr = self.with_in_allowed(|parser| parser.parse_expression())?;
            expressions.push(*expr);

            if self.token != Token::RightBrace {
                return self.error_expected_token(self.loc, &self.token, &Token::RightBrace);
            }

            self.advance_template_part()?;
        }

        let loc = self.mark_loc(start_pos);

        Ok(p(TemplateLiteral { loc, quasis, expressions }))
    }

    /// Parse a parenthesized expression, or the parameters of an arrow function if the closing
    /// parenthesis is followed by an arrow.
    fn parse_parenthesized_expression(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        let (elements, has_trailing_comma) = self.parse_parenthesized_elements()?;
        let loc = self.mark_loc(start_pos);

        if self.token == Token::Arrow {
            if self.has_new_line_before() {
                return self.error(self.loc, ParseError::ArrowOnNewLine);
            }

            return Ok(p(Expression::Cover(CoverParenthesized {
                loc,
                elements,
                has_trailing_comma,
                is_async: false,
            })));
        }

        if elements.is_empty() || has_trailing_comma {
            return self.error(loc, ParseError::ParenthesizedListNotAnExpression);
        }

        let mut expressions = vec![];
        for element in elements {
            match element {
                CallArgument::Expression(expr) => {
                    self.confirm_expression(&expr)?;
                    expressions.push(expr);
                }
                CallArgument::Spread(spread) => {
                    return self.error(spread.loc, ParseError::ParenthesizedListNotAnExpression)
                }
            }
        }

        let expression = if expressions.len() == 1 {
            expressions.remove(0)
        } else {
            let first_loc = expressions[0].loc();
            let last_loc = expressions[expressions.len() - 1].loc();
            let loc = first_loc.join(last_loc);

            Expression::Sequence(SequenceExpression { loc, expressions })
        };

        Ok(p(Expression::Parenthesized(ParenthesizedExpression {
            loc,
            expression: p(expression),
        })))
    }

    fn parse_array_literal(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();

        let (elements, cover_marker) = self.with_in_allowed(|parser| {
            parser.advance()?;

            let mut elements = vec![];
            let mut cover_marker = None;

            while parser.token != Token::RightBracket {
                match &parser.token {
                    Token::Comma => {
                        elements.push(ArrayElement::Hole(parser.current_start_pos()));
                        parser.advance()?;
                        continue;
                    }
                    Token::Spread => {
                        let spread = parser.parse_spread_element()?;
                        cover_marker = cover_marker.or(spread.argument.cover_marker());
                        elements.push(ArrayElement::Spread(spread));
                    }
                    _ => {
                        let expr = parser.parse_assignment_expression_maybe_pattern()?;
                        cover_marker = cover_marker.or(expr.cover_marker());
                        elements.push(ArrayElement::Expression(*expr));
                    }
                }

                if parser.token == Token::Comma {
                    parser.advance()?;
                } else {
                    break;
                }
            }

            parser.expect(Token::RightBracket)?;

            Ok((elements, cover_marker))
        })?;

        let loc = self.mark_loc(start_pos);

        Ok(p(Expression::Array(ArrayExpression { loc, elements, cover_marker })))
    }

    fn parse_object_literal(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();

        let (properties, cover_marker) = self.with_in_allowed(|parser| {
            parser.advance()?;

            let mut properties = vec![];
            let mut cover_marker = None;
            let mut has_proto = false;

            while parser.token != Token::RightBrace {
                let property = parser.parse_object_property(&mut cover_marker, &mut has_proto)?;
                properties.push(property);

                if parser.token == Token::Comma {
                    parser.advance()?;
                } else {
                    break;
                }
            }

            parser.expect(Token::RightBrace)?;

            Ok((properties, cover_marker))
        })?;

        let loc = self.mark_loc(start_pos);

        Ok(p(Expression::Object(ObjectExpression { loc, properties, cover_marker })))
    }

    fn parse_object_property(
        &mut self,
        cover_marker: &mut Option<CoverMarker>,
        has_proto: &mut bool,
    ) -> ParseResult<Property> {
        let start_pos = self.current_start_pos();

        if self.token == Token::Spread {
            self.advance()?;

            let argument = self.parse_assignment_expression_maybe_pattern()?;
            *cover_marker = cover_marker.or(argument.cover_marker());

            let has_trailing_comma = self.token == Token::Comma;
            let loc = self.mark_loc(start_pos);

            return Ok(Property {
                loc,
                key: argument,
                value: None,
                is_computed: false,
                is_method: false,
                kind: PropertyKind::Spread(has_trailing_comma),
            });
        }

        let head = self.parse_property_head()?;

        if self.token == Token::LeftParen || head.is_method_like() {
            let (function_kind, kind) = match head.accessor {
                Some(PropertyKind::Get) => (FunctionKind::Getter, PropertyKind::Get),
                Some(PropertyKind::Set) => (FunctionKind::Setter, PropertyKind::Set),
                _ => (FunctionKind::Method, PropertyKind::Init),
            };

            let is_method = kind == PropertyKind::Init;
            let value = self.parse_function_params_and_body(
                self.current_start_pos(),
                None,
                function_kind,
                head.is_async,
                head.is_generator,
            )?;

            let loc = self.mark_loc(start_pos);

            return Ok(Property {
                loc,
                key: head.key,
                value: Some(p(Expression::Function(value))),
                is_computed: head.is_computed,
                is_method,
                kind,
            });
        }

        if self.token == Token::Colon {
            self.advance()?;

            let value = self.parse_assignment_expression_maybe_pattern()?;
            *cover_marker = cover_marker.or(value.cover_marker());

            if head.has_static_name("__proto__") {
                if *has_proto && cover_marker.is_none() {
                    *cover_marker = Some(CoverMarker::DuplicateProto(head.key.loc()));
                }

                *has_proto = true;
            }

            let loc = self.mark_loc(start_pos);

            return Ok(Property {
                loc,
                key: head.key,
                value: Some(value),
                is_computed: head.is_computed,
                is_method: false,
                kind: PropertyKind::Init,
            });
        }

        // Otherwise this is a shorthand property, which must be a valid identifier reference
        let (key_token, key_flags) = match &head.key_token {
            Some(key_token) => key_token.clone(),
            None => return self.error_unexpected_token(self.loc, &self.token),
        };
        self.check_identifier_reference(&key_token, key_flags, head.key.loc())?;

        let kind = if self.token == Token::Equals {
            self.advance()?;
            let initializer = self.parse_assignment_expression()?;

            // Only valid if this object is reinterpreted as a pattern
            let marker_loc = self.mark_loc(head.loc_start);
            if cover_marker.is_none() {
                *cover_marker = Some(CoverMarker::ShorthandInitializer(marker_loc));
            }

            PropertyKind::PatternInitializer(initializer)
        } else {
            PropertyKind::Init
        };

        let loc = self.mark_loc(start_pos);

        Ok(Property { loc, key: head.key, value: None, is_computed: false, is_method: false, kind })
    }

    /// Parse a primary expression starting with `async`, which may be an async function, the
    /// head of an async arrow function, a call to a function named `async`, or an identifier.
    fn parse_async_primary(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();
        let async_loc = self.loc;

        let (next_token, next_flags) = self.peek_with_flags()?;
        let is_same_line = !next_flags.contains(TokenFlags::NEW_LINE_BEFORE);

        match next_token {
            Token::Function if is_same_line => {
                Ok(p(Expression::Function(self.parse_function(FunctionKind::Expression)?)))
            }
            Token::LeftParen if is_same_line => {
                self.advance()?;
                let (elements, has_trailing_comma) = self.parse_parenthesized_elements()?;
                let loc = self.mark_loc(start_pos);

                if self.token == Token::Arrow {
                    if self.has_new_line_before() {
                        return self.error(self.loc, ParseError::ArrowOnNewLine);
                    }

                    return Ok(p(Expression::Cover(CoverParenthesized {
                        loc,
                        elements,
                        has_trailing_comma,
                        is_async: true,
                    })));
                }

                // Otherwise this is a call to a function named `async`
                for element in &elements {
                    match element {
                        CallArgument::Expression(expr) => self.confirm_expression(expr)?,
                        CallArgument::Spread(spread) => self.confirm_expression(&spread.argument)?,
                    }
                }

                let callee = p(Expression::Id(Identifier::new(async_loc, "async".to_owned())));

                Ok(self.call_expression(callee, elements, start_pos, false))
            }
            _ => Ok(p(Expression::Id(self.parse_identifier_reference()?))),
        }
    }

    /// Whether the current `async` token is followed by an identifier on the same line, which
    /// can only start an async arrow function with a single parameter.
    fn is_async_arrow_with_identifier_ahead(&mut self) -> ParseResult<bool> {
        let (next_token, next_flags) = self.peek_with_flags()?;
        if next_flags.contains(TokenFlags::NEW_LINE_BEFORE) {
            return Ok(false);
        }

        Ok(classifier::is_identifier_name(&next_token)
            && next_token != Token::Function
            && classifier::classify(&next_token, next_flags, self.ctx)
                != IdentifierRole::ReservedWord)
    }

    fn parse_async_arrow_with_identifier(&mut self) -> ParseResult<P<Expression>> {
        let start_pos = self.current_start_pos();

        // Skip the `async` keyword
        self.advance()?;

        let arrow_ctx = self.ctx.for_arrow(true);
        let param = self.parse_binding_identifier_in_context(BindingKind::Parameter, arrow_ctx)?;

        if self.token != Token::Arrow {
            return self.error_expected_token(self.loc, &self.token, &Token::Arrow);
        }

        let params = vec![FunctionParam::Pattern(Pattern::Id(param))];
        self.parse_arrow_function(start_pos, params, true)
    }

    /// Parse an arrow function whose head has already been parsed as `head`, which must be
    /// parenthesized arrow parameters or a single identifier.
    fn parse_arrow_function_from_head(
        &mut self,
        head: P<Expression>,
        start_pos: Pos,
    ) -> ParseResult<P<Expression>> {
        match *head {
            Expression::Cover(cover) => {
                let arrow_ctx = self.ctx.for_arrow(cover.is_async);
                let params = self.reinterpret_arrow_parameters(cover.elements, arrow_ctx)?;
                self.parse_arrow_function(start_pos, params, cover.is_async)
            }
            Expression::Id(id) => {
                let arrow_ctx = self.ctx.for_arrow(false);
                let checked = classifier::check_binding_identifier(
                    &id.name,
                    BindingKind::Parameter,
                    arrow_ctx,
                );
                if let Err(error) = checked {
                    return self.early_error(id.loc, error);
                }

                let params = vec![FunctionParam::Pattern(Pattern::Id(id))];
                self.parse_arrow_function(start_pos, params, false)
            }
            _ => self.error_unexpected_token(self.loc, &Token::Arrow),
        }
    }

    fn parse_arrow_function(
        &mut self,
        start_pos: Pos,
        params: Vec<FunctionParam>,
        is_async: bool,
    ) -> ParseResult<P<Expression>> {
        if self.has_new_line_before() {
            return self.error(self.loc, ParseError::ArrowOnNewLine);
        }

        trace!(is_async, num_params = params.len(), "parsing arrow function");
        self.check_arrow_parameters(&params, is_async)?;

        let arrow_ctx = self.ctx.for_arrow(is_async);

        self.scope_builder.enter_function_scope();
        for param in &params {
            self.declare_param_names(param)?;
        }

        self.expect(Token::Arrow)?;

        let (body, has_use_strict_directive) = if self.token == Token::LeftBrace {
            let (body, has_use_strict_directive) = self.parse_function_block_body(arrow_ctx)?;
            (FunctionBody::Block(body), has_use_strict_directive)
        } else {
            // A concise body is part of the enclosing expression, so `in` is only allowed if it
            // is allowed in the enclosing context
            let body_ctx =
                arrow_ctx.enter(ContextOverrides::new().disallow_in(self.ctx.disallow_in()));
            let body = self.with_context(body_ctx, |parser| parser.parse_assignment_expression())?;
            (FunctionBody::Expression(*body), false)
        };

        self.scope_builder.exit_scope();

        let has_simple_parameter_list = params.iter().all(FunctionParam::is_simple);
        let is_strict_mode = arrow_ctx.is_strict() || has_use_strict_directive;

        let params_ctx = if has_use_strict_directive {
            arrow_ctx | ParseContext::STRICT
        } else {
            arrow_ctx
        };

        // Arrow functions never allow duplicate parameters
        let rules = ParameterRules { allow_duplicates: false, ctx: params_ctx };
        self.check_parameters(&params, rules)?;

        if has_use_strict_directive && !has_simple_parameter_list {
            return self.error(
                self.mark_loc(start_pos),
                ParseError::UseStrictFunctionNonSimpleParameterList,
            );
        }

        let mut flags = FunctionFlags::IS_ARROW;
        flags.set(FunctionFlags::IS_ASYNC, is_async);
        flags.set(FunctionFlags::HAS_SIMPLE_PARAMETER_LIST, has_simple_parameter_list);
        flags.set(FunctionFlags::IS_STRICT_MODE, is_strict_mode);
        flags.set(FunctionFlags::HAS_USE_STRICT_DIRECTIVE, has_use_strict_directive);

        let loc = self.mark_loc(start_pos);

        Ok(p(Expression::ArrowFunction(p(Function {
            loc,
            id: None,
            params,
            body: p(body),
            flags,
        }))))
    }
}

enum InfixOperator {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

fn unary_operator(token: &Token) -> Option<UnaryOperator> {
    match token {
        Token::Plus => Some(UnaryOperator::Plus),
        Token::Minus => Some(UnaryOperator::Minus),
        Token::LogicalNot => Some(UnaryOperator::LogicalNot),
        Token::BitwiseNot => Some(UnaryOperator::BitwiseNot),
        Token::Typeof => Some(UnaryOperator::TypeOf),
        Token::Void => Some(UnaryOperator::Void),
        Token::Delete => Some(UnaryOperator::Delete),
        _ => None,
    }
}

fn update_operator(token: &Token) -> UpdateOperator {
    if *token == Token::Increment {
        UpdateOperator::Increment
    } else {
        UpdateOperator::Decrement
    }
}

fn compound_assignment_operator(token: &Token) -> Option<AssignmentOperator> {
    match token {
        Token::AddEq => Some(AssignmentOperator::Add),
        Token::SubtractEq => Some(AssignmentOperator::Subtract),
        Token::MultiplyEq => Some(AssignmentOperator::Multiply),
        Token::DivideEq => Some(AssignmentOperator::Divide),
        Token::RemainderEq => Some(AssignmentOperator::Remainder),
        Token::ExponentEq => Some(AssignmentOperator::Exponent),
        Token::AndEq => Some(AssignmentOperator::And),
        Token::OrEq => Some(AssignmentOperator::Or),
        Token::XorEq => Some(AssignmentOperator::Xor),
        Token::ShiftLeftEq => Some(AssignmentOperator::ShiftLeft),
        Token::ShiftRightArithmeticEq => Some(AssignmentOperator::ShiftRightArithmetic),
        Token::ShiftRightLogicalEq => Some(AssignmentOperator::ShiftRightLogical),
        Token::LogicalAndEq => Some(AssignmentOperator::LogicalAnd),
        Token::LogicalOrEq => Some(AssignmentOperator::LogicalOr),
        Token::NullishCoalesceEq => Some(AssignmentOperator::NullishCoalesce),
        _ => None,
    }
}

fn is_and_or(expr: &Expression) -> bool {
    matches!(
        expr,
        Expression::Logical(LogicalExpression {
            operator: LogicalOperator::And | LogicalOperator::Or,
            ..
        })
    )
}

fn is_nullish(expr: &Expression) -> bool {
    matches!(
        expr,
        Expression::Logical(LogicalExpression { operator: LogicalOperator::NullishCoalesce, .. })
    )
}

/// Parse a script with the given context, returning the program along with the context the
/// parser ended in.
pub(super) fn parse_program(
    source: &Rc<Source>,
    ctx: ParseContext,
) -> ParseResult<(Program, ParseContext)> {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer, ctx);
    let program = parser.parse_script()?;

    Ok((program, parser.ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::js::parser::parse_error::ErrorKind;

    fn parse_in(
        source: &str,
        strict: bool,
        disable_web_compat: bool,
    ) -> ParseResult<(Program, ParseContext)> {
        let source = Rc::new(Source::new_from_string("<test>", source.to_owned()));
        parse_program(&source, ParseContext::for_script(strict, disable_web_compat))
    }

    fn parse(source: &str) -> Program {
        parse_in(source, false, false).unwrap().0
    }

    fn error_kind(source: &str) -> ErrorKind {
        error_kind_in(source, false, false)
    }

    fn error_kind_in(source: &str, strict: bool, disable_web_compat: bool) -> ErrorKind {
        match parse_in(source, strict, disable_web_compat) {
            Ok(_) => panic!("expected parse error for {:?}", source),
            Err(error) => error.kind(),
        }
    }

    fn function_body(stmt: &Statement) -> &[Statement] {
        match stmt {
            Statement::FuncDecl(func) => match func.body.as_ref() {
                FunctionBody::Block(block) => &block.body,
                FunctionBody::Expression(_) => panic!("expected block body"),
            },
            _ => panic!("expected function declaration"),
        }
    }

    fn expression(stmt: &Statement) -> &Expression {
        match stmt {
            Statement::Expr(stmt) => &stmt.expr,
            _ => panic!("expected expression statement"),
        }
    }

    fn number_value(expr: &Expression) -> f64 {
        match expr {
            Expression::Number(lit) => lit.value,
            _ => panic!("expected number literal"),
        }
    }

    #[test]
    fn generator_with_sequential_yields() {
        let program = parse("function *g(){ yield 1; yield 2; yield 3 }");

        let func = match &program.body[0] {
            Statement::FuncDecl(func) => func,
            _ => panic!("expected function declaration"),
        };
        assert!(func.is_generator());

        let body = function_body(&program.body[0]);
        assert_eq!(body.len(), 3);

        for (stmt, expected) in body.iter().zip([1.0, 2.0, 3.0]) {
            match expression(stmt) {
                Expression::Yield(YieldExpression {
                    argument: Some(argument),
                    is_delegate,
                    ..
                }) => {
                    assert!(!is_delegate);
                    assert_eq!(number_value(argument), expected);
                }
                _ => panic!("expected yield expression"),
            }
        }
    }

    #[test]
    fn yield_as_right_operand() {
        let program = parse("function *g() { yield 3 + yield 4; }");
        let body = function_body(&program.body[0]);

        let argument = match expression(&body[0]) {
            Expression::Yield(YieldExpression { argument: Some(argument), .. }) => argument,
            _ => panic!("expected yield expression"),
        };

        match argument.as_ref() {
            Expression::Binary(BinaryExpression {
                operator: BinaryOperator::Add,
                left,
                right,
                ..
            }) => {
                assert_eq!(number_value(left), 3.0);
                match right.as_ref() {
                    Expression::Yield(YieldExpression { argument: Some(inner), .. }) => {
                        assert_eq!(number_value(inner), 4.0)
                    }
                    _ => panic!("expected nested yield"),
                }
            }
            _ => panic!("expected binary expression"),
        }
    }

    #[test]
    fn yield_in_arrow_parameter_default() {
        assert_eq!(error_kind("(a = yield) => {}"), ErrorKind::InvalidYieldUsage);
        assert_eq!(
            error_kind("function *g() { (a = yield) => {} }"),
            ErrorKind::InvalidYieldUsage
        );
        assert_eq!(error_kind("(a = [yield]) => {}"), ErrorKind::InvalidYieldUsage);
    }

    #[test]
    fn yield_in_generator_parameters() {
        assert_eq!(error_kind("function *g(a = yield) {}"), ErrorKind::InvalidYieldUsage);
        assert_eq!(error_kind("function *g(a = yield 1) {}"), ErrorKind::InvalidYieldUsage);

        // Parameters of a nested non-generator function are classified by that function
        parse("function *g() { function f(a = yield) {} }");
    }

    #[test]
    fn yield_binding_in_strict_function() {
        assert_eq!(
            error_kind("\"use strict\"; function f() { var {yield = 0} = {}; }"),
            ErrorKind::ReservedWordBinding
        );

        let program = parse("function f() { var {yield = 0} = {}; }");
        let body = function_body(&program.body[0]);
        match &body[0] {
            Statement::VarDecl(decl) => {
                let mut names = vec![];
                decl.declarations[0].id.iter_bound_names(&mut |id| names.push(id.name.clone()));
                assert_eq!(names, vec!["yield".to_owned()]);
            }
            _ => panic!("expected variable declaration"),
        }
    }

    #[test]
    fn yield_is_identifier_in_sloppy_script() {
        let program = parse("yield");
        match expression(&program.body[0]) {
            Expression::Id(id) => assert_eq!(id.name, "yield"),
            _ => panic!("expected identifier"),
        }

        assert_eq!(error_kind_in("yield", true, false), ErrorKind::InvalidYieldUsage);
        assert_eq!(error_kind_in("yield", false, true), ErrorKind::InvalidYieldUsage);
    }

    #[test]
    fn yield_argument_forms() {
        let program = parse("function *g() { yield\n1; yield* a; (yield); [yield]; }");
        let body = function_body(&program.body[0]);

        // A new line ends a yield without an argument
        match expression(&body[0]) {
            Expression::Yield(YieldExpression { argument: None, is_delegate: false, .. }) => {}
            _ => panic!("expected yield without argument"),
        }
        assert!(matches!(expression(&body[1]), Expression::Number(_)));

        match expression(&body[2]) {
            Expression::Yield(YieldExpression { argument: Some(_), is_delegate: true, .. }) => {}
            _ => panic!("expected delegating yield"),
        }

        assert_eq!(error_kind("function *g() { yield*; }"), ErrorKind::SyntaxError);
    }

    #[test]
    fn yield_not_allowed_in_nested_arrow_body() {
        assert_eq!(
            error_kind("function *g() { () => yield 1; }"),
            ErrorKind::InvalidYieldUsage
        );
        assert_eq!(
            error_kind("function *g() { () => { yield 1; } }"),
            ErrorKind::InvalidYieldUsage
        );
    }

    #[test]
    fn sloppy_arrow_with_yield_parameter() {
        let program = parse("yield => yield ? foo : bar");
        assert!(matches!(expression(&program.body[0]), Expression::ArrowFunction(_)));

        assert_eq!(error_kind_in("yield => 1", false, true), ErrorKind::InvalidYieldUsage);
    }

    #[test]
    fn context_restored_after_nested_functions() {
        let sources = [
            "function *g() { function f() {} (x) => x; }",
            "async function f() { await (async () => 1)(); }",
            "class C { static { let a; } m() { super.x; } }",
            "for (var x in y) { while (1) { break; } }",
            "function f() { \"use strict\"; }",
        ];

        for source in sources {
            let (_, ctx) = parse_in(source, false, false).unwrap();
            assert_eq!(ctx, ParseContext::for_script(false, false), "{}", source);
        }
    }

    #[test]
    fn use_strict_directive_applies_to_whole_body() {
        let program = parse("function f() { 'use strict'; return 1 }");
        match &program.body[0] {
            Statement::FuncDecl(func) => {
                assert!(func.is_strict_mode());
                assert!(func.has_use_strict_directive());
            }
            _ => panic!("expected function declaration"),
        }

        assert!(parse("'use strict'; a").is_strict_mode);
        assert_eq!(
            error_kind("function f(a = 1) { 'use strict'; }"),
            ErrorKind::SyntaxError
        );
        assert_eq!(
            error_kind("function eval() { 'use strict'; }"),
            ErrorKind::ReservedWordBinding
        );
    }

    #[test]
    fn cover_grammar_errors() {
        assert_eq!(error_kind("[a + b] = c"), ErrorKind::InvalidDestructuringTarget);
        assert_eq!(error_kind("({a: 1} = b)"), ErrorKind::InvalidDestructuringTarget);
        assert_eq!(error_kind("({a() {}} = b)"), ErrorKind::InvalidDestructuringTarget);
        assert_eq!(error_kind("[...a, b] = c"), ErrorKind::InvalidDestructuringTarget);
        assert_eq!(error_kind("(a.b) => 1"), ErrorKind::InvalidDestructuringTarget);
        assert_eq!(error_kind("((a)) => 1"), ErrorKind::InvalidDestructuringTarget);

        // Shorthand initializers are only valid in patterns
        assert_eq!(error_kind("({a = 1})"), ErrorKind::SyntaxError);
        parse("({a = 1} = b)");
        parse("({a = 1}) => a");
        parse("[{a = 1}] = b");

        // Parenthesized lists are only valid as arrow parameters
        parse("(a, b)");
        assert_eq!(error_kind("(a, b,)"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("()"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("(...a)"), ErrorKind::SyntaxError);
    }

    #[test]
    fn assignment_targets() {
        parse("a = 1; a.b = 1; a[0] += 1; (a) = 1; [a, b.c, ...d] = e; ({a, b: c.d} = e)");

        assert_eq!(error_kind("1 = a"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("a + b += 1"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("({a}) = 1"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("a++ = 1"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("++a()"), ErrorKind::SyntaxError);
        assert_eq!(error_kind_in("eval = 1", true, false), ErrorKind::SyntaxError);
    }

    #[test]
    fn duplicate_bindings() {
        assert_eq!(error_kind("let a; let a;"), ErrorKind::DuplicateBinding);
        assert_eq!(error_kind("let a; var a;"), ErrorKind::DuplicateBinding);
        assert_eq!(error_kind("function f(a) { let a; }"), ErrorKind::DuplicateBinding);
        assert_eq!(error_kind("(a, a) => 1"), ErrorKind::DuplicateBinding);
        assert_eq!(error_kind("function f(a, [a]) {}"), ErrorKind::DuplicateBinding);
        assert_eq!(error_kind_in("function f(a, a) {}", true, false), ErrorKind::DuplicateBinding);

        parse("var a; var a; function f(a, a) {}");
        parse("try {} catch (e) { var e; }");
        parse("{ let a; } { let a; }");
    }

    #[test]
    fn web_compat_toggles() {
        // Plain functions in blocks may be redeclared
        parse("{ function f() {} function f() {} }");
        assert_eq!(
            error_kind_in("{ function f() {} function f() {} }", false, true),
            ErrorKind::DuplicateBinding
        );

        // Function declarations as if statement bodies
        parse("if (a) function f() {}");
        assert_eq!(error_kind_in("if (a) function f() {}", false, true), ErrorKind::SyntaxError);

        // Labeled functions
        parse("l: function f() {}");
        assert_eq!(error_kind_in("l: function f() {}", false, true), ErrorKind::SyntaxError);
        assert_eq!(error_kind_in("l: function f() {}", true, false), ErrorKind::SyntaxError);

        // Initializers in for-in heads
        parse("for (var a = 1 in b);");
        assert_eq!(error_kind_in("for (var a = 1 in b);", false, true), ErrorKind::SyntaxError);
    }

    #[test]
    fn await_handling() {
        let program = parse("await");
        assert!(matches!(expression(&program.body[0]), Expression::Id(_)));

        parse("async function f() { await a; for await (x of y); }");
        assert_eq!(error_kind("async function f(a = await 1) {}"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("async (a = await) => a"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("async function f() { (a = await 1) => a }"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("async function f() { var await; }"), ErrorKind::ReservedWordBinding);
        assert_eq!(error_kind("async function f() { -a ** 2 }"), ErrorKind::SyntaxError);
    }

    #[test]
    fn async_arrows_and_calls() {
        let program = parse("async (a, b) => a; async(a, b); async x => x; async\n(x)");

        let is_async_arrow =
            |expr: &Expression| matches!(expr, Expression::ArrowFunction(func) if func.is_async());

        assert!(is_async_arrow(expression(&program.body[0])));
        assert!(matches!(expression(&program.body[1]), Expression::Call(_)));
        assert!(is_async_arrow(expression(&program.body[2])));
        assert!(matches!(expression(&program.body[3]), Expression::Call(_)));
    }

    #[test]
    fn operators() {
        let program = parse("a ?? b; (a || b) ?? c; a ** b ** c; 2 ** -a");

        assert!(matches!(expression(&program.body[0]), Expression::Logical(_)));

        match expression(&program.body[2]) {
            Expression::Binary(BinaryExpression { right, .. }) => {
                assert!(matches!(right.as_ref(), Expression::Binary(_)))
            }
            _ => panic!("expected binary expression"),
        }

        assert_eq!(error_kind("a || b ?? c"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("a ?? b && c"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("-a ** b"), ErrorKind::SyntaxError);
    }

    #[test]
    fn in_operator_in_for_heads() {
        parse("for (var a = (b in c); ;) {}");
        parse("for (var a = () => { b in c }; ;) {}");
        parse("for (a in b);");
        parse("for ([a, b] of c);");

        assert_eq!(error_kind("for (a + b in c);"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("for (let [a] = 1, b of c);"), ErrorKind::SyntaxError);
    }

    #[test]
    fn let_starting_for_of_head() {
        assert_eq!(error_kind("for (let of x);"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("for (let.x of y);"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("for (async of x);"), ErrorKind::SyntaxError);

        // Only for-of heads are restricted
        parse("for (let in x);");
        parse("for (let.x in y);");
    }

    #[test]
    fn declaration_lookahead() {
        let program = parse("async function f() {} async\nfunction g() {} let; let\nx; let = 1;");
        assert!(matches!(program.body[0], Statement::FuncDecl(_)));
        assert!(matches!(program.body[1], Statement::Expr(_)));
        assert!(matches!(program.body[2], Statement::FuncDecl(_)));
        assert!(matches!(program.body[3], Statement::Expr(_)));
        assert!(matches!(program.body[4], Statement::VarDecl(_)));
        assert!(matches!(program.body[5], Statement::Expr(_)));

        assert_eq!(error_kind("if (a) async function f() {}"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("if (a) let [b] = c;"), ErrorKind::SyntaxError);
        parse("if (a) let\nb = c;");
    }

    #[test]
    fn statement_context_errors() {
        assert_eq!(error_kind("return 1"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("break"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("continue"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("l: { continue l; }"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("l: l: ;"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("new.target"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("super.x"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("class A { constructor() { super(); } }"), ErrorKind::SyntaxError);
        assert_eq!(error_kind_in("with (a) {}", true, false), ErrorKind::SyntaxError);
        assert_eq!(error_kind("throw\na"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("let [a] = 1; let [b];"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("const a;"), ErrorKind::SyntaxError);

        parse("l: for (;;) { continue l; } switch (a) { case 1: break; }");
        parse("function f() { new.target; return; }");
        parse("class A extends B { constructor() { super(); super.x; } }");
        parse("({ m() { return super.x; } })");
    }

    #[test]
    fn classes() {
        parse(
            "class A { static x = 1; y; static { this.z = 1; } get a() { return 1 } set a(v) {} \
             *g() {} async m() {} }",
        );

        assert_eq!(
            error_kind("class A { constructor() {} constructor() {} }"),
            ErrorKind::SyntaxError
        );
        assert_eq!(error_kind("class A { static prototype() {} }"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("class A { get constructor() {} }"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("class A { get a(b) {} }"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("class A { set a() {} }"), ErrorKind::SyntaxError);

        // Class bodies are strict
        assert_eq!(error_kind("class A { m() { with (a) {} } }"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("class yield {}"), ErrorKind::ReservedWordBinding);
    }

    #[test]
    fn templates_and_regexps() {
        let program = parse("`a${b}c`; tag`\\unicode`; /ab+c/gi; a / b / c");

        match expression(&program.body[0]) {
            Expression::Template(template) => {
                assert_eq!(template.quasis.len(), 2);
                assert_eq!(template.expressions.len(), 1);
                assert_eq!(template.quasis[0].raw, "a");
                assert_eq!(template.quasis[0].loc, Loc::new(1, 2));
            }
            _ => panic!("expected template literal"),
        }

        match expression(&program.body[1]) {
            Expression::TaggedTemplate(tagged) => assert_eq!(tagged.quasi.quasis[0].cooked, None),
            _ => panic!("expected tagged template"),
        }

        match expression(&program.body[2]) {
            Expression::RegExp(regexp) => {
                assert_eq!(regexp.pattern, "ab+c");
                assert_eq!(regexp.flags, "gi");
            }
            _ => panic!("expected regexp literal"),
        }

        assert_eq!(error_kind("`\\unicode`"), ErrorKind::SyntaxError);
        assert_eq!(error_kind("a?.b`c`"), ErrorKind::SyntaxError);
    }

    #[test]
    fn directives_are_marked() {
        let program = parse("'use strict'; \"other\"; a; 'not a directive'");

        let directives: Vec<Option<String>> = program
            .body
            .iter()
            .map(|stmt| match stmt {
                Statement::Expr(stmt) => stmt.directive.clone(),
                _ => None,
            })
            .collect();

        assert_eq!(
            directives,
            vec![Some("use strict".to_owned()), Some("other".to_owned()), None, None]
        );
    }
}
