use serde_json::{json, Map, Value};

use super::ast::*;
use super::loc::Loc;
use super::source::Source;

/// Converts an AST to ESTree JSON.
struct Printer<'a> {
    source: &'a Source,
    /// Whether every node carries `start`, `end`, and `loc` properties
    record_locations: bool,
}

impl<'a> Printer<'a> {
    fn new(source: &'a Source, record_locations: bool) -> Printer<'a> {
        Printer { source, record_locations }
    }

    fn node(&self, name: &str, loc: Loc, properties: Value) -> Value {
        let mut node = Map::new();
        node.insert("type".to_owned(), Value::from(name));

        if self.record_locations {
            let start = self.source.line_col_for_pos(loc.start);
            let end = self.source.line_col_for_pos(loc.end);

            node.insert("start".to_owned(), Value::from(loc.start));
            node.insert("end".to_owned(), Value::from(loc.end));
            node.insert(
                "loc".to_owned(),
                json!({
                    "start": { "line": start.line, "column": start.column },
                    "end": { "line": end.line, "column": end.column },
                }),
            );
        }

        if let Value::Object(properties) = properties {
            node.extend(properties);
        }

        Value::Object(node)
    }

    fn raw(&self, loc: Loc) -> &str {
        &self.source.contents[loc.to_range()]
    }

    fn list<T>(&self, items: &[T], print_fn: impl Fn(&Self, &T) -> Value) -> Value {
        Value::Array(items.iter().map(|item| print_fn(self, item)).collect())
    }

    fn optional<T>(&self, item: Option<&T>, print_fn: impl Fn(&Self, &T) -> Value) -> Value {
        match item {
            Some(item) => print_fn(self, item),
            None => Value::Null,
        }
    }

    fn print_program(&self, program: &Program) -> Value {
        self.node(
            "Program",
            program.loc,
            json!({
                "body": self.list(&program.body, Printer::print_statement),
                "sourceType": "script",
            }),
        )
    }

    fn print_statement(&self, stmt: &Statement) -> Value {
        match stmt {
            Statement::VarDecl(var_decl) => self.print_variable_declaration(var_decl),
            Statement::FuncDecl(func) => self.print_function(func, "FunctionDeclaration"),
            Statement::ClassDecl(class) => self.print_class(class, "ClassDeclaration"),
            Statement::Expr(stmt) => self.print_expression_statement(stmt),
            Statement::Block(block) => self.print_block(block),
            Statement::If(stmt) => self.node(
                "IfStatement",
                stmt.loc,
                json!({
                    "test": self.print_expression(&stmt.test),
                    "consequent": self.print_statement(&stmt.conseq),
                    "alternate": self.optional(stmt.altern.as_deref(), Printer::print_statement),
                }),
            ),
            Statement::Switch(stmt) => self.node(
                "SwitchStatement",
                stmt.loc,
                json!({
                    "discriminant": self.print_expression(&stmt.discriminant),
                    "cases": self.list(&stmt.cases, Printer::print_switch_case),
                }),
            ),
            Statement::For(stmt) => self.print_for_statement(stmt),
            Statement::ForEach(stmt) => self.print_for_each_statement(stmt),
            Statement::While(stmt) => self.node(
                "WhileStatement",
                stmt.loc,
                json!({
                    "test": self.print_expression(&stmt.test),
                    "body": self.print_statement(&stmt.body),
                }),
            ),
            Statement::DoWhile(stmt) => self.node(
                "DoWhileStatement",
                stmt.loc,
                json!({
                    "body": self.print_statement(&stmt.body),
                    "test": self.print_expression(&stmt.test),
                }),
            ),
            Statement::With(stmt) => self.node(
                "WithStatement",
                stmt.loc,
                json!({
                    "object": self.print_expression(&stmt.object),
                    "body": self.print_statement(&stmt.body),
                }),
            ),
            Statement::Try(stmt) => self.print_try_statement(stmt),
            Statement::Throw(stmt) => self.node(
                "ThrowStatement",
                stmt.loc,
                json!({ "argument": self.print_expression(&stmt.argument) }),
            ),
            Statement::Return(stmt) => self.node(
                "ReturnStatement",
                stmt.loc,
                json!({
                    "argument": self.optional(stmt.argument.as_deref(), Printer::print_expression),
                }),
            ),
            Statement::Break(stmt) => self.node(
                "BreakStatement",
                stmt.loc,
                json!({ "label": self.optional(stmt.label.as_ref(), Printer::print_label) }),
            ),
            Statement::Continue(stmt) => self.node(
                "ContinueStatement",
                stmt.loc,
                json!({ "label": self.optional(stmt.label.as_ref(), Printer::print_label) }),
            ),
            Statement::Labeled(stmt) => self.node(
                "LabeledStatement",
                stmt.loc,
                json!({
                    "label": self.print_label(&stmt.label),
                    "body": self.print_statement(&stmt.body),
                }),
            ),
            Statement::Empty(loc) => self.node("EmptyStatement", *loc, json!({})),
            Statement::Debugger(loc) => self.node("DebuggerStatement", *loc, json!({})),
        }
    }

    fn print_variable_declaration(&self, var_decl: &VariableDeclaration) -> Value {
        let kind = match var_decl.kind {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        };

        self.node(
            "VariableDeclaration",
            var_decl.loc,
            json!({
                "declarations":
                    self.list(&var_decl.declarations, Printer::print_variable_declarator),
                "kind": kind,
            }),
        )
    }

    fn print_variable_declarator(&self, declarator: &VariableDeclarator) -> Value {
        self.node(
            "VariableDeclarator",
            declarator.loc,
            json!({
                "id": self.print_pattern(&declarator.id),
                "init": self.optional(declarator.init.as_deref(), Printer::print_expression),
            }),
        )
    }

    fn print_expression_statement(&self, stmt: &ExpressionStatement) -> Value {
        let mut properties = json!({ "expression": self.print_expression(&stmt.expr) });
        if let (Some(directive), Value::Object(properties)) = (&stmt.directive, &mut properties) {
            properties.insert("directive".to_owned(), Value::from(directive.as_str()));
        }

        self.node("ExpressionStatement", stmt.loc, properties)
    }

    fn print_block(&self, block: &Block) -> Value {
        self.node(
            "BlockStatement",
            block.loc,
            json!({ "body": self.list(&block.body, Printer::print_statement) }),
        )
    }

    fn print_switch_case(&self, case: &SwitchCase) -> Value {
        self.node(
            "SwitchCase",
            case.loc,
            json!({
                "test": self.optional(case.test.as_deref(), Printer::print_expression),
                "consequent": self.list(&case.body, Printer::print_statement),
            }),
        )
    }

    fn print_for_statement(&self, stmt: &ForStatement) -> Value {
        let init = match stmt.init.as_deref() {
            None => Value::Null,
            Some(ForInit::Expression(expr)) => self.print_expression(expr),
            Some(ForInit::VarDecl(var_decl)) => self.print_variable_declaration(var_decl),
        };

        self.node(
            "ForStatement",
            stmt.loc,
            json!({
                "init": init,
                "test": self.optional(stmt.test.as_deref(), Printer::print_expression),
                "update": self.optional(stmt.update.as_deref(), Printer::print_expression),
                "body": self.print_statement(&stmt.body),
            }),
        )
    }

    fn print_for_each_statement(&self, stmt: &ForEachStatement) -> Value {
        let left = match stmt.left.as_ref() {
            ForEachInit::VarDecl(var_decl) => self.print_variable_declaration(var_decl),
            ForEachInit::Pattern(pattern) => self.print_pattern(pattern),
        };

        let right = self.print_expression(&stmt.right);
        let body = self.print_statement(&stmt.body);

        match stmt.kind {
            ForEachKind::In => self.node(
                "ForInStatement",
                stmt.loc,
                json!({ "left": left, "right": right, "body": body }),
            ),
            ForEachKind::Of => self.node(
                "ForOfStatement",
                stmt.loc,
                json!({ "await": stmt.is_await, "left": left, "right": right, "body": body }),
            ),
        }
    }

    fn print_try_statement(&self, stmt: &TryStatement) -> Value {
        let handler = stmt.handler.as_ref().map(|handler| {
            self.node(
                "CatchClause",
                handler.loc,
                json!({
                    "param": self.optional(handler.param.as_deref(), Printer::print_pattern),
                    "body": self.print_block(&handler.body),
                }),
            )
        });

        self.node(
            "TryStatement",
            stmt.loc,
            json!({
                "block": self.print_block(&stmt.block),
                "handler": handler,
                "finalizer": self.optional(stmt.finalizer.as_deref(), Printer::print_block),
            }),
        )
    }

    fn print_label(&self, label: &Label) -> Value {
        self.node("Identifier", label.loc, json!({ "name": label.name }))
    }

    fn print_identifier(&self, id: &Identifier) -> Value {
        self.node("Identifier", id.loc, json!({ "name": id.name }))
    }

    fn print_function(&self, func: &Function, name: &str) -> Value {
        let (body, is_expression) = match func.body.as_ref() {
            FunctionBody::Block(block) => (
                self.node(
                    "BlockStatement",
                    block.loc,
                    json!({ "body": self.list(&block.body, Printer::print_statement) }),
                ),
                false,
            ),
            FunctionBody::Expression(expr) => (self.print_expression(expr), true),
        };

        self.node(
            name,
            func.loc,
            json!({
                "id": self.optional(func.id.as_deref(), Printer::print_identifier),
                "expression": is_expression,
                "generator": func.is_generator(),
                "async": func.is_async(),
                "params": self.list(&func.params, Printer::print_function_param),
                "body": body,
            }),
        )
    }

    fn print_function_param(&self, param: &FunctionParam) -> Value {
        match param {
            FunctionParam::Pattern(pattern) => self.print_pattern(pattern),
            FunctionParam::Rest(rest) => self.print_rest_element(rest),
        }
    }

    fn print_rest_element(&self, rest: &RestElement) -> Value {
        let argument = self.print_pattern(&rest.argument);
        self.node("RestElement", rest.loc, json!({ "argument": argument }))
    }

    fn print_class(&self, class: &Class, name: &str) -> Value {
        self.node(
            name,
            class.loc,
            json!({
                "id": self.optional(class.id.as_deref(), Printer::print_identifier),
                "superClass":
                    self.optional(class.super_class.as_deref(), Printer::print_expression),
                "body": self.node(
                    "ClassBody",
                    class.body_loc,
                    json!({ "body": self.list(&class.body, Printer::print_class_element) }),
                ),
            }),
        )
    }

    fn print_class_element(&self, element: &ClassElement) -> Value {
        match element {
            ClassElement::Method(method) => {
                let kind = match method.kind {
                    ClassMethodKind::Method => "method",
                    ClassMethodKind::Constructor => "constructor",
                    ClassMethodKind::Get => "get",
                    ClassMethodKind::Set => "set",
                };

                self.node(
                    "MethodDefinition",
                    method.loc,
                    json!({
                        "static": method.is_static,
                        "computed": method.is_computed,
                        "key": self.print_expression(&method.key),
                        "kind": kind,
                        "value": self.print_function(&method.value, "FunctionExpression"),
                    }),
                )
            }
            ClassElement::Property(property) => self.node(
                "PropertyDefinition",
                property.loc,
                json!({
                    "static": property.is_static,
                    "computed": property.is_computed,
                    "key": self.print_expression(&property.key),
                    "value": self.optional(property.value.as_deref(), Printer::print_expression),
                }),
            ),
            ClassElement::StaticBlock(block) => self.node(
                "StaticBlock",
                block.loc,
                json!({ "body": self.list(&block.body, Printer::print_statement) }),
            ),
        }
    }

    fn print_expression(&self, expr: &Expression) -> Value {
        match expr {
            Expression::Id(id) => self.print_identifier(id),
            Expression::Null(loc) => self.print_literal(*loc, Value::Null),
            Expression::Boolean(lit) => self.print_literal(lit.loc, Value::from(lit.value)),
            Expression::Number(lit) => self.print_literal(lit.loc, number_value(lit.value)),
            Expression::String(lit) => self.print_literal(lit.loc, Value::from(lit.value.as_str())),
            Expression::BigInt(lit) => self.node(
                "Literal",
                lit.loc,
                json!({
                    "value": null,
                    "raw": self.raw(lit.loc),
                    "bigint": lit.value.to_string(),
                }),
            ),
            Expression::RegExp(lit) => self.node(
                "Literal",
                lit.loc,
                json!({
                    "value": null,
                    "raw": self.raw(lit.loc),
                    "regex": { "pattern": lit.pattern, "flags": lit.flags },
                }),
            ),
            Expression::Unary(expr) => self.node(
                "UnaryExpression",
                expr.loc,
                json!({
                    "operator": unary_operator_str(expr.operator),
                    "prefix": true,
                    "argument": self.print_expression(&expr.argument),
                }),
            ),
            Expression::Binary(expr) => self.node(
                "BinaryExpression",
                expr.loc,
                json!({
                    "left": self.print_expression(&expr.left),
                    "operator": binary_operator_str(expr.operator),
                    "right": self.print_expression(&expr.right),
                }),
            ),
            Expression::Logical(expr) => {
                let operator = match expr.operator {
                    LogicalOperator::And => "&&",
                    LogicalOperator::Or => "||",
                    LogicalOperator::NullishCoalesce => "??",
                };

                self.node(
                    "LogicalExpression",
                    expr.loc,
                    json!({
                        "left": self.print_expression(&expr.left),
                        "operator": operator,
                        "right": self.print_expression(&expr.right),
                    }),
                )
            }
            Expression::Assign(expr) => self.node(
                "AssignmentExpression",
                expr.loc,
                json!({
                    "operator": assignment_operator_str(expr.operator),
                    "left": self.print_pattern(&expr.left),
                    "right": self.print_expression(&expr.right),
                }),
            ),
            Expression::Update(expr) => {
                let operator = match expr.operator {
                    UpdateOperator::Increment => "++",
                    UpdateOperator::Decrement => "--",
                };

                self.node(
                    "UpdateExpression",
                    expr.loc,
                    json!({
                        "operator": operator,
                        "prefix": expr.is_prefix,
                        "argument": self.print_expression(&expr.argument),
                    }),
                )
            }
            Expression::Member(expr) => self.print_member_expression(expr),
            Expression::Chain(expr) => self.node(
                "ChainExpression",
                expr.loc,
                json!({ "expression": self.print_expression(&expr.expression) }),
            ),
            Expression::Conditional(expr) => self.node(
                "ConditionalExpression",
                expr.loc,
                json!({
                    "test": self.print_expression(&expr.test),
                    "consequent": self.print_expression(&expr.conseq),
                    "alternate": self.print_expression(&expr.altern),
                }),
            ),
            Expression::Call(expr) => self.node(
                "CallExpression",
                expr.loc,
                json!({
                    "callee": self.print_expression(&expr.callee),
                    "arguments": self.list(&expr.arguments, Printer::print_call_argument),
                    "optional": expr.is_optional,
                }),
            ),
            Expression::New(expr) => self.node(
                "NewExpression",
                expr.loc,
                json!({
                    "callee": self.print_expression(&expr.callee),
                    "arguments": self.list(&expr.arguments, Printer::print_call_argument),
                }),
            ),
            Expression::Sequence(expr) => self.node(
                "SequenceExpression",
                expr.loc,
                json!({ "expressions": self.list(&expr.expressions, Printer::print_expression) }),
            ),
            Expression::Array(expr) => {
                let elements: Vec<Value> = expr
                    .elements
                    .iter()
                    .map(|element| match element {
                        ArrayElement::Expression(expr) => self.print_expression(expr),
                        ArrayElement::Spread(spread) => self.print_spread_element(spread),
                        ArrayElement::Hole(_) => Value::Null,
                    })
                    .collect();

                self.node("ArrayExpression", expr.loc, json!({ "elements": elements }))
            }
            Expression::Object(expr) => self.node(
                "ObjectExpression",
                expr.loc,
                json!({ "properties": self.list(&expr.properties, Printer::print_property) }),
            ),
            Expression::Function(func) => self.print_function(func, "FunctionExpression"),
            Expression::ArrowFunction(func) => self.print_function(func, "ArrowFunctionExpression"),
            Expression::Class(class) => self.print_class(class, "ClassExpression"),
            Expression::This(loc) => self.node("ThisExpression", *loc, json!({})),
            Expression::Await(expr) => self.node(
                "AwaitExpression",
                expr.loc,
                json!({ "argument": self.print_expression(&expr.argument) }),
            ),
            Expression::Yield(expr) => self.node(
                "YieldExpression",
                expr.loc,
                json!({
                    "delegate": expr.is_delegate,
                    "argument": self.optional(expr.argument.as_deref(), Printer::print_expression),
                }),
            ),
            Expression::SuperMember(expr) => self.node(
                "MemberExpression",
                expr.loc,
                json!({
                    "object": self.node("Super", expr.super_, json!({})),
                    "property": self.print_expression(&expr.property),
                    "computed": expr.is_computed,
                    "optional": false,
                }),
            ),
            Expression::SuperCall(expr) => self.node(
                "CallExpression",
                expr.loc,
                json!({
                    "callee": self.node("Super", expr.super_, json!({})),
                    "arguments": self.list(&expr.arguments, Printer::print_call_argument),
                    "optional": false,
                }),
            ),
            Expression::Template(template) => self.print_template_literal(template),
            Expression::TaggedTemplate(expr) => self.node(
                "TaggedTemplateExpression",
                expr.loc,
                json!({
                    "tag": self.print_expression(&expr.tag),
                    "quasi": self.print_template_literal(&expr.quasi),
                }),
            ),
            Expression::MetaProperty(expr) => self.print_meta_property(expr),
            Expression::Import(expr) => self.node(
                "ImportExpression",
                expr.loc,
                json!({ "source": self.print_expression(&expr.source) }),
            ),
            // Parentheses only group, they have no node of their own
            Expression::Parenthesized(expr) => self.print_expression(&expr.expression),
            Expression::Cover(cover) => self.node(
                "SequenceExpression",
                cover.loc,
                json!({ "expressions": self.list(&cover.elements, Printer::print_call_argument) }),
            ),
        }
    }

    fn print_literal(&self, loc: Loc, value: Value) -> Value {
        self.node("Literal", loc, json!({ "value": value, "raw": self.raw(loc) }))
    }

    fn print_member_expression(&self, expr: &MemberExpression) -> Value {
        self.node(
            "MemberExpression",
            expr.loc,
            json!({
                "object": self.print_expression(&expr.object),
                "property": self.print_expression(&expr.property),
                "computed": expr.is_computed,
                "optional": expr.is_optional,
            }),
        )
    }

    fn print_call_argument(&self, argument: &CallArgument) -> Value {
        match argument {
            CallArgument::Expression(expr) => self.print_expression(expr),
            CallArgument::Spread(spread) => self.print_spread_element(spread),
        }
    }

    fn print_spread_element(&self, spread: &SpreadElement) -> Value {
        self.node(
            "SpreadElement",
            spread.loc,
            json!({ "argument": self.print_expression(&spread.argument) }),
        )
    }

    fn print_property(&self, property: &Property) -> Value {
        let key = self.print_expression(&property.key);

        let (kind, value, is_shorthand) = match &property.kind {
            PropertyKind::Spread(_) => {
                return self.node("SpreadElement", property.loc, json!({ "argument": key }))
            }
            PropertyKind::Get => ("get", property.value.as_deref(), false),
            PropertyKind::Set => ("set", property.value.as_deref(), false),
            PropertyKind::Init | PropertyKind::PatternInitializer(_) => {
                ("init", property.value.as_deref(), property.value.is_none())
            }
        };

        // Shorthand properties repeat the key as their value
        let value = match value {
            Some(value) => self.print_expression(value),
            None => key.clone(),
        };

        self.node(
            "Property",
            property.loc,
            json!({
                "method": property.is_method,
                "shorthand": is_shorthand,
                "computed": property.is_computed,
                "key": key,
                "value": value,
                "kind": kind,
            }),
        )
    }

    fn print_template_literal(&self, template: &TemplateLiteral) -> Value {
        let quasis: Vec<Value> = template
            .quasis
            .iter()
            .map(|quasi| {
                self.node(
                    "TemplateElement",
                    quasi.loc,
                    json!({
                        "value": { "raw": quasi.raw, "cooked": quasi.cooked },
                        "tail": quasi.is_tail,
                    }),
                )
            })
            .collect();

        self.node(
            "TemplateLiteral",
            template.loc,
            json!({
                "expressions": self.list(&template.expressions, Printer::print_expression),
                "quasis": quasis,
            }),
        )
    }

    fn print_meta_property(&self, expr: &MetaProperty) -> Value {
        let (meta, property) = match expr.kind {
            MetaPropertyKind::NewTarget => ("new", "target"),
        };

        let meta_loc = Loc::new(expr.loc.start, expr.loc.start + meta.len());
        let property_loc = Loc::new(expr.loc.end - property.len(), expr.loc.end);

        self.node(
            "MetaProperty",
            expr.loc,
            json!({
                "meta": self.node("Identifier", meta_loc, json!({ "name": meta })),
                "property": self.node("Identifier", property_loc, json!({ "name": property })),
            }),
        )
    }

    fn print_pattern(&self, pattern: &Pattern) -> Value {
        match pattern {
            Pattern::Id(id) => self.print_identifier(id),
            Pattern::Array(array) => {
                let elements: Vec<Value> = array
                    .elements
                    .iter()
                    .map(|element| match element {
                        ArrayPatternElement::Pattern(pattern) => self.print_pattern(pattern),
                        ArrayPatternElement::Rest(rest) => self.print_rest_element(rest),
                        ArrayPatternElement::Hole(_) => Value::Null,
                    })
                    .collect();

                self.node("ArrayPattern", array.loc, json!({ "elements": elements }))
            }
            Pattern::Object(object) => self.node(
                "ObjectPattern",
                object.loc,
                json!({
                    "properties":
                        self.list(&object.properties, Printer::print_object_pattern_property),
                }),
            ),
            Pattern::Assign(assign) => self.node(
                "AssignmentPattern",
                assign.loc,
                json!({
                    "left": self.print_pattern(&assign.left),
                    "right": self.print_expression(&assign.right),
                }),
            ),
            Pattern::Member(expr) => self.print_member_expression(expr),
            Pattern::SuperMember(expr) => self.node(
                "MemberExpression",
                expr.loc,
                json!({
                    "object": self.node("Super", expr.super_, json!({})),
                    "property": self.print_expression(&expr.property),
                    "computed": expr.is_computed,
                    "optional": false,
                }),
            ),
        }
    }

    fn print_object_pattern_property(&self, property: &ObjectPatternProperty) -> Value {
        let value = self.print_pattern(&property.value);

        if property.is_rest {
            return self.node("RestElement", property.loc, json!({ "argument": value }));
        }

        let key = match &property.key {
            Some(key) => self.print_expression(key),
            // Shorthand properties bind the key, possibly with a default value
            None => match property.value.as_ref() {
                Pattern::Assign(assign) => self.print_pattern(&assign.left),
                other => self.print_pattern(other),
            },
        };

        self.node(
            "Property",
            property.loc,
            json!({
                "method": false,
                "shorthand": property.key.is_none(),
                "computed": property.is_computed,
                "key": key,
                "value": value,
                "kind": "init",
            }),
        )
    }
}

/// Integral numbers are printed without a fractional part.
fn number_value(value: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9007199254740991.0;

    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

fn unary_operator_str(operator: UnaryOperator) -> &'static str {
    match operator {
        UnaryOperator::Plus => "+",
        UnaryOperator::Minus => "-",
        UnaryOperator::LogicalNot => "!",
        UnaryOperator::BitwiseNot => "~",
        UnaryOperator::TypeOf => "typeof",
        UnaryOperator::Void => "void",
        UnaryOperator::Delete => "delete",
    }
}

fn binary_operator_str(operator: BinaryOperator) -> &'static str {
    match operator {
        BinaryOperator::Add => "+",
        BinaryOperator::Subtract => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Remainder => "%",
        BinaryOperator::Exponent => "**",
        BinaryOperator::EqEq => "==",
        BinaryOperator::EqEqEq => "===",
        BinaryOperator::NotEq => "!=",
        BinaryOperator::NotEqEq => "!==",
        BinaryOperator::LessThan => "<",
        BinaryOperator::LessThanOrEqual => "<=",
        BinaryOperator::GreaterThan => ">",
        BinaryOperator::GreaterThanOrEqual => ">=",
        BinaryOperator::And => "&",
        BinaryOperator::Or => "|",
        BinaryOperator::Xor => "^",
        BinaryOperator::ShiftLeft => "<<",
        BinaryOperator::ShiftRightArithmetic => ">>",
        BinaryOperator::ShiftRightLogical => ">>>",
        BinaryOperator::In => "in",
        BinaryOperator::InstanceOf => "instanceof",
    }
}

fn assignment_operator_str(operator: AssignmentOperator) -> &'static str {
    match operator {
        AssignmentOperator::Equals => "=",
        AssignmentOperator::Add => "+=",
        AssignmentOperator::Subtract => "-=",
        AssignmentOperator::Multiply => "*=",
        AssignmentOperator::Divide => "/=",
        AssignmentOperator::Remainder => "%=",
        AssignmentOperator::Exponent => "**=",
        AssignmentOperator::And => "&=",
        AssignmentOperator::Or => "|=",
        AssignmentOperator::Xor => "^=",
        AssignmentOperator::ShiftLeft => "<<=",
        AssignmentOperator::ShiftRightArithmetic => ">>=",
        AssignmentOperator::ShiftRightLogical => ">>>=",
        AssignmentOperator::LogicalAnd => "&&=",
        AssignmentOperator::LogicalOr => "||=",
        AssignmentOperator::NullishCoalesce => "??=",
    }
}

/// Convert a program to its ESTree representation.
pub fn program_to_estree(program: &Program, source: &Source, record_locations: bool) -> Value {
    Printer::new(source, record_locations).print_program(program)
}

/// Print a program as pretty printed ESTree JSON.
pub fn print_program(program: &Program, source: &Source, record_locations: bool) -> String {
    format!("{:#}", program_to_estree(program, source, record_locations))
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use serde_json::json;

    use super::program_to_estree;
    use crate::js::parser::{context::ParseContext, parser::parse_program, source::Source};

    fn estree(source: &str, record_locations: bool) -> serde_json::Value {
        let source = Rc::new(Source::new_from_string("<test>", source.to_owned()));
        let (program, _) = parse_program(&source, ParseContext::for_script(false, false)).unwrap();
        program_to_estree(&program, &source, record_locations)
    }

    fn first_expression(source: &str) -> serde_json::Value {
        estree(source, false)["body"][0]["expression"].clone()
    }

    #[test]
    fn yield_expressions() {
        let program = estree("function *g() { yield; yield* a; }", false);
        let body = &program["body"][0]["body"]["body"];

        assert_eq!(
            body[0]["expression"],
            json!({ "type": "YieldExpression", "delegate": false, "argument": null })
        );
        assert_eq!(body[1]["expression"]["delegate"], json!(true));
        assert_eq!(program["body"][0]["generator"], json!(true));
        assert_eq!(program["sourceType"], json!("script"));
    }

    #[test]
    fn literals_carry_raw_text() {
        assert_eq!(
            first_expression("0x10"),
            json!({ "type": "Literal", "value": 16, "raw": "0x10" })
        );
        assert_eq!(
            first_expression("'a\\x62'"),
            json!({ "type": "Literal", "value": "ab", "raw": "'a\\x62'" })
        );
        assert_eq!(first_expression("1.5")["value"], json!(1.5));
        assert_eq!(first_expression("10n")["bigint"], json!("10"));
        assert_eq!(
            first_expression("/a/g")["regex"],
            json!({ "pattern": "a", "flags": "g" })
        );
    }

    #[test]
    fn parentheses_are_transparent() {
        assert_eq!(first_expression("((a))"), json!({ "type": "Identifier", "name": "a" }));
    }

    #[test]
    fn arrow_functions() {
        let arrow = first_expression("(a, ...b) => a");

        assert_eq!(arrow["type"], json!("ArrowFunctionExpression"));
        assert_eq!(arrow["expression"], json!(true));
        assert_eq!(arrow["async"], json!(false));
        assert_eq!(arrow["params"][1]["type"], json!("RestElement"));
    }

    #[test]
    fn shorthand_properties() {
        let object = first_expression("({a})");
        assert_eq!(object["properties"][0]["shorthand"], json!(true));
        assert_eq!(object["properties"][0]["value"], json!({ "type": "Identifier", "name": "a" }));

        let assign = first_expression("({a = 1} = b)");
        let property = &assign["left"]["properties"][0];
        assert_eq!(property["shorthand"], json!(true));
        assert_eq!(property["key"]["name"], json!("a"));
        assert_eq!(property["value"]["type"], json!("AssignmentPattern"));
    }

    #[test]
    fn source_locations() {
        let program = estree("a;\n  b", true);

        assert_eq!(program["start"], json!(0));
        assert_eq!(program["end"], json!(6));

        let id = &program["body"][1]["expression"];
        assert_eq!(id["start"], json!(5));
        assert_eq!(
            id["loc"],
            json!({ "start": { "line": 2, "column": 2 }, "end": { "line": 2, "column": 3 } })
        );
    }
}
