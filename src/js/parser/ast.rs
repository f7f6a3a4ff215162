use bitflags::bitflags;
use num_bigint::BigInt;

use super::loc::{Loc, Pos};

pub type P<T> = Box<T>;

pub fn p<T>(node: T) -> P<T> {
    Box::new(node)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub loc: Loc,
    pub body: Vec<Statement>,
    /// Whether the program is in strict mode, either from a directive or from the parse options
    pub is_strict_mode: bool,
    /// Whether the program has a "use strict" directive
    pub has_use_strict_directive: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub loc: Loc,
    pub name: String,
}

impl Identifier {
    pub fn new(loc: Loc, name: String) -> Identifier {
        Identifier { loc, name }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    VarDecl(VariableDeclaration),
    FuncDecl(P<Function>),
    ClassDecl(P<Class>),
    Expr(ExpressionStatement),
    Block(Block),
    If(IfStatement),
    Switch(SwitchStatement),
    For(ForStatement),
    ForEach(ForEachStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    With(WithStatement),
    Try(TryStatement),
    Throw(ThrowStatement),
    Return(ReturnStatement),
    Break(BreakStatement),
    Continue(ContinueStatement),
    Labeled(LabeledStatement),
    Empty(Loc),
    Debugger(Loc),
}

impl Statement {
    pub fn loc(&self) -> Loc {
        match self {
            Statement::VarDecl(stmt) => stmt.loc,
            Statement::FuncDecl(func) => func.loc,
            Statement::ClassDecl(class) => class.loc,
            Statement::Expr(stmt) => stmt.loc,
            Statement::Block(stmt) => stmt.loc,
            Statement::If(stmt) => stmt.loc,
            Statement::Switch(stmt) => stmt.loc,
            Statement::For(stmt) => stmt.loc,
            Statement::ForEach(stmt) => stmt.loc,
            Statement::While(stmt) => stmt.loc,
            Statement::DoWhile(stmt) => stmt.loc,
            Statement::With(stmt) => stmt.loc,
            Statement::Try(stmt) => stmt.loc,
            Statement::Throw(stmt) => stmt.loc,
            Statement::Return(stmt) => stmt.loc,
            Statement::Break(stmt) => stmt.loc,
            Statement::Continue(stmt) => stmt.loc,
            Statement::Labeled(stmt) => stmt.loc,
            Statement::Empty(loc) => *loc,
            Statement::Debugger(loc) => *loc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDeclaration {
    pub loc: Loc,
    pub kind: VarKind,
    pub declarations: Vec<VariableDeclarator>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDeclarator {
    pub loc: Loc,
    pub id: P<Pattern>,
    pub init: Option<P<Expression>>,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FunctionFlags: u8 {
        const IS_ASYNC = 1 << 0;
        const IS_GENERATOR = 1 << 1;
        const IS_ARROW = 1 << 2;
        const HAS_SIMPLE_PARAMETER_LIST = 1 << 3;
        /// Whether the function is in strict mode, which could be inherited from surrounding
        /// context
        const IS_STRICT_MODE = 1 << 4;
        /// Whether the function has a "use strict" directive
        const HAS_USE_STRICT_DIRECTIVE = 1 << 5;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub loc: Loc,
    pub id: Option<P<Identifier>>,
    pub params: Vec<FunctionParam>,
    pub body: P<FunctionBody>,
    pub flags: FunctionFlags,
}

impl Function {
    pub fn is_async(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_ASYNC)
    }

    pub fn is_generator(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_GENERATOR)
    }

    pub fn is_arrow(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_ARROW)
    }

    pub fn has_simple_parameter_list(&self) -> bool {
        self.flags
            .contains(FunctionFlags::HAS_SIMPLE_PARAMETER_LIST)
    }

    pub fn is_strict_mode(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_STRICT_MODE)
    }

    pub fn has_use_strict_directive(&self) -> bool {
        self.flags.contains(FunctionFlags::HAS_USE_STRICT_DIRECTIVE)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FunctionParam {
    Pattern(Pattern),
    Rest(RestElement),
}

impl FunctionParam {
    pub fn loc(&self) -> Loc {
        match self {
            FunctionParam::Pattern(pattern) => pattern.loc(),
            FunctionParam::Rest(rest) => rest.loc,
        }
    }

    /// A parameter is simple if it is a plain identifier, without a default or destructuring.
    pub fn is_simple(&self) -> bool {
        matches!(self, FunctionParam::Pattern(Pattern::Id(_)))
    }

    pub fn iter_bound_names<'a, F: FnMut(&'a Identifier)>(&'a self, f: &mut F) {
        match self {
            FunctionParam::Pattern(pattern) => pattern.iter_bound_names(f),
            FunctionParam::Rest(rest) => rest.argument.iter_bound_names(f),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FunctionBody {
    Block(FunctionBlockBody),
    Expression(Expression),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionBlockBody {
    pub loc: Loc,
    pub body: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Class {
    pub loc: Loc,
    pub id: Option<P<Identifier>>,
    pub super_class: Option<P<Expression>>,
    /// Location of the braces surrounding the class body
    pub body_loc: Loc,
    pub body: Vec<ClassElement>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClassElement {
    Method(ClassMethod),
    Property(ClassProperty),
    StaticBlock(StaticBlock),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassMethod {
    pub loc: Loc,
    pub key: P<Expression>,
    pub value: P<Function>,
    pub kind: ClassMethodKind,
    pub is_computed: bool,
    pub is_static: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassMethodKind {
    Method,
    Constructor,
    Get,
    Set,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassProperty {
    pub loc: Loc,
    pub key: P<Expression>,
    pub value: Option<P<Expression>>,
    pub is_computed: bool,
    pub is_static: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StaticBlock {
    pub loc: Loc,
    pub body: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionStatement {
    pub loc: Loc,
    pub expr: P<Expression>,
    /// The raw text of the string literal between its quotes, if this statement is a directive
    pub directive: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub loc: Loc,
    pub body: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStatement {
    pub loc: Loc,
    pub test: P<Expression>,
    pub conseq: P<Statement>,
    pub altern: Option<P<Statement>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchStatement {
    pub loc: Loc,
    pub discriminant: P<Expression>,
    pub cases: Vec<SwitchCase>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub loc: Loc,
    pub test: Option<P<Expression>>,
    pub body: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForStatement {
    pub loc: Loc,
    pub init: Option<P<ForInit>>,
    pub test: Option<P<Expression>>,
    pub update: Option<P<Expression>>,
    pub body: P<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ForInit {
    Expression(Expression),
    VarDecl(VariableDeclaration),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForEachStatement {
    pub loc: Loc,
    pub kind: ForEachKind,
    pub left: P<ForEachInit>,
    pub right: P<Expression>,
    pub body: P<Statement>,
    pub is_await: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForEachKind {
    In,
    Of,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ForEachInit {
    VarDecl(VariableDeclaration),
    Pattern(Pattern),
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileStatement {
    pub loc: Loc,
    pub test: P<Expression>,
    pub body: P<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DoWhileStatement {
    pub loc: Loc,
    pub test: P<Expression>,
    pub body: P<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WithStatement {
    pub loc: Loc,
    pub object: P<Expression>,
    pub body: P<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TryStatement {
    pub loc: Loc,
    pub block: P<Block>,
    pub handler: Option<P<CatchClause>>,
    pub finalizer: Option<P<Block>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub loc: Loc,
    pub param: Option<P<Pattern>>,
    pub body: P<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThrowStatement {
    pub loc: Loc,
    pub argument: P<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStatement {
    pub loc: Loc,
    pub argument: Option<P<Expression>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BreakStatement {
    pub loc: Loc,
    pub label: Option<Label>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContinueStatement {
    pub loc: Loc,
    pub label: Option<Label>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabeledStatement {
    pub loc: Loc,
    pub label: P<Label>,
    pub body: P<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub loc: Loc,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Id(Identifier),
    Null(Loc),
    Boolean(BooleanLiteral),
    Number(NumberLiteral),
    String(StringLiteral),
    BigInt(BigIntLiteral),
    RegExp(RegExpLiteral),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Logical(LogicalExpression),
    Assign(AssignmentExpression),
    Update(UpdateExpression),
    Member(MemberExpression),
    Chain(ChainExpression),
    Conditional(ConditionalExpression),
    Call(CallExpression),
    New(NewExpression),
    Sequence(SequenceExpression),
    Array(ArrayExpression),
    Object(ObjectExpression),
    Function(P<Function>),
    ArrowFunction(P<Function>),
    Class(P<Class>),
    This(Loc),
    Await(AwaitExpression),
    Yield(YieldExpression),
    SuperMember(SuperMemberExpression),
    SuperCall(SuperCallExpression),
    Template(TemplateLiteral),
    TaggedTemplate(TaggedTemplateExpression),
    MetaProperty(MetaProperty),
    Import(ImportExpression),
    /// An expression wrapped in parentheses. Kept so that later checks can distinguish `(a) = b`
    /// from `({a}) = b`, but transparent in the printed output.
    Parenthesized(ParenthesizedExpression),
    /// A parenthesized list that has not yet been confirmed as an arrow function's parameters.
    /// Never appears in a finished AST.
    Cover(CoverParenthesized),
}

impl Expression {
    /// The source location of the expression.
    pub fn loc(&self) -> Loc {
        match self {
            Expression::Id(id) => id.loc,
            Expression::Null(loc) => *loc,
            Expression::Boolean(lit) => lit.loc,
            Expression::Number(lit) => lit.loc,
            Expression::String(lit) => lit.loc,
            Expression::BigInt(lit) => lit.loc,
            Expression::RegExp(lit) => lit.loc,
            Expression::Unary(expr) => expr.loc,
            Expression::Binary(expr) => expr.loc,
            Expression::Logical(expr) => expr.loc,
            Expression::Assign(expr) => expr.loc,
            Expression::Update(expr) => expr.loc,
            Expression::Member(expr) => expr.loc,
            Expression::Chain(expr) => expr.loc,
            Expression::Conditional(expr) => expr.loc,
            Expression::Call(expr) => expr.loc,
            Expression::New(expr) => expr.loc,
            Expression::Sequence(expr) => expr.loc,
            Expression::Array(expr) => expr.loc,
            Expression::Object(expr) => expr.loc,
            Expression::Function(expr) => expr.loc,
            Expression::ArrowFunction(expr) => expr.loc,
            Expression::Class(expr) => expr.loc,
            Expression::This(loc) => *loc,
            Expression::Await(expr) => expr.loc,
            Expression::Yield(expr) => expr.loc,
            Expression::SuperMember(expr) => expr.loc,
            Expression::SuperCall(expr) => expr.loc,
            Expression::Template(expr) => expr.loc,
            Expression::TaggedTemplate(expr) => expr.loc,
            Expression::MetaProperty(expr) => expr.loc,
            Expression::Import(expr) => expr.loc,
            Expression::Parenthesized(expr) => expr.loc,
            Expression::Cover(expr) => expr.loc,
        }
    }

    /// The source position of the start of the expression.
    pub fn pos(&self) -> Pos {
        self.loc().start
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expression {
        match self {
            Expression::Parenthesized(expr) => expr.expression.unparenthesized(),
            other => other,
        }
    }

    /// Syntax that makes this node valid only once reinterpreted as a pattern, if any is still
    /// pending.
    pub fn cover_marker(&self) -> Option<CoverMarker> {
        match self {
            Expression::Object(object) => object.cover_marker,
            Expression::Array(array) => array.cover_marker,
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BooleanLiteral {
    pub loc: Loc,
    pub value: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NumberLiteral {
    pub loc: Loc,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringLiteral {
    pub loc: Loc,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BigIntLiteral {
    pub loc: Loc,
    pub value: BigInt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegExpLiteral {
    pub loc: Loc,
    pub pattern: String,
    pub flags: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
    LogicalNot,
    BitwiseNot,
    TypeOf,
    Void,
    Delete,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryExpression {
    pub loc: Loc,
    pub operator: UnaryOperator,
    pub argument: P<Expression>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Exponent,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
    Xor,
    ShiftLeft,
    ShiftRightArithmetic,
    ShiftRightLogical,
    In,
    InstanceOf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpression {
    pub loc: Loc,
    pub operator: BinaryOperator,
    pub left: P<Expression>,
    pub right: P<Expression>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    NullishCoalesce,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogicalExpression {
    pub loc: Loc,
    pub operator: LogicalOperator,
    pub left: P<Expression>,
    pub right: P<Expression>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentOperator {
    Equals,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Exponent,
    And,
    Or,
    Xor,
    ShiftLeft,
    ShiftRightArithmetic,
    ShiftRightLogical,
    LogicalAnd,
    LogicalOr,
    NullishCoalesce,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentExpression {
    pub loc: Loc,
    pub operator: AssignmentOperator,
    pub left: P<Pattern>,
    pub right: P<Expression>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateExpression {
    pub loc: Loc,
    pub operator: UpdateOperator,
    pub argument: P<Expression>,
    pub is_prefix: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MemberExpression {
    pub loc: Loc,
    pub object: P<Expression>,
    pub property: P<Expression>,
    pub is_computed: bool,
    pub is_optional: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChainExpression {
    pub loc: Loc,
    pub expression: P<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalExpression {
    pub loc: Loc,
    pub test: P<Expression>,
    pub conseq: P<Expression>,
    pub altern: P<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallExpression {
    pub loc: Loc,
    pub callee: P<Expression>,
    pub arguments: Vec<CallArgument>,
    pub is_optional: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallArgument {
    Expression(Expression),
    Spread(SpreadElement),
}

impl CallArgument {
    pub fn loc(&self) -> Loc {
        match self {
            CallArgument::Expression(expr) => expr.loc(),
            CallArgument::Spread(spread) => spread.loc,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewExpression {
    pub loc: Loc,
    pub callee: P<Expression>,
    pub arguments: Vec<CallArgument>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SequenceExpression {
    pub loc: Loc,
    pub expressions: Vec<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayExpression {
    pub loc: Loc,
    pub elements: Vec<ArrayElement>,
    /// First pattern-only syntax nested in this array, if any
    pub cover_marker: Option<CoverMarker>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ArrayElement {
    Expression(Expression),
    Spread(SpreadElement),
    Hole(Pos),
}

/// Syntax that is accepted inside an object or array literal only because the literal may later
/// turn out to be a destructuring pattern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CoverMarker {
    /// A shorthand property with an initializer, `{a = 1}`
    ShorthandInitializer(Loc),
    /// A second `__proto__: value` property in the same object literal
    DuplicateProto(Loc),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpreadElement {
    pub loc: Loc,
    pub argument: P<Expression>,
    /// Whether the spread is followed by a comma, which is not allowed for rest elements
    pub has_trailing_comma: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectExpression {
    pub loc: Loc,
    pub properties: Vec<Property>,
    /// First pattern-only syntax nested in this object, if any
    pub cover_marker: Option<CoverMarker>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub loc: Loc,
    pub key: P<Expression>,
    pub value: Option<P<Expression>>,
    pub is_computed: bool,
    pub is_method: bool,
    pub kind: PropertyKind,
}

impl Property {
    pub fn is_shorthand(&self) -> bool {
        self.value.is_none() && !matches!(self.kind, PropertyKind::Spread(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
    // For spread properties the key is the argument and all other fields are ignored. The single
    // bool argument is whether the spread property is followed by a comma.
    Spread(bool),
    // A shorthand property with an initializer, only valid once reinterpreted as an object
    // pattern property. The single expression argument is the initializer.
    PatternInitializer(P<Expression>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AwaitExpression {
    pub loc: Loc,
    pub argument: P<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct YieldExpression {
    pub loc: Loc,
    pub argument: Option<P<Expression>>,
    pub is_delegate: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SuperMemberExpression {
    pub loc: Loc,
    pub super_: Loc,
    pub property: P<Expression>,
    pub is_computed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SuperCallExpression {
    pub loc: Loc,
    pub super_: Loc,
    pub arguments: Vec<CallArgument>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TemplateLiteral {
    pub loc: Loc,
    pub quasis: Vec<TemplateElement>,
    pub expressions: Vec<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TemplateElement {
    pub loc: Loc,
    pub raw: String,
    /// Guaranteed to exist for template literals. Tagged templates allow this to be None.
    pub cooked: Option<String>,
    pub is_tail: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaggedTemplateExpression {
    pub loc: Loc,
    pub tag: P<Expression>,
    pub quasi: P<TemplateLiteral>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetaProperty {
    pub loc: Loc,
    pub kind: MetaPropertyKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetaPropertyKind {
    NewTarget,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportExpression {
    pub loc: Loc,
    pub source: P<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParenthesizedExpression {
    pub loc: Loc,
    pub expression: P<Expression>,
}

/// The contents of `( ... )` or `async ( ... )` directly followed by `=>`.
#[derive(Clone, Debug, PartialEq)]
pub struct CoverParenthesized {
    pub loc: Loc,
    pub elements: Vec<CallArgument>,
    pub has_trailing_comma: bool,
    pub is_async: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    Id(Identifier),
    Array(ArrayPattern),
    Object(ObjectPattern),
    Assign(AssignmentPattern),
    Member(MemberExpression),
    SuperMember(SuperMemberExpression),
}

impl Pattern {
    pub fn is_id(&self) -> bool {
        matches!(self, Pattern::Id(_))
    }

    pub fn iter_bound_names<'a, F: FnMut(&'a Identifier)>(&'a self, f: &mut F) {
        match self {
            Pattern::Id(id) => f(id),
            Pattern::Array(patt) => {
                for element in &patt.elements {
                    match element {
                        ArrayPatternElement::Pattern(pattern) => pattern.iter_bound_names(f),
                        ArrayPatternElement::Rest(rest) => rest.argument.iter_bound_names(f),
                        ArrayPatternElement::Hole(_) => {}
                    }
                }
            }
            Pattern::Object(patt) => {
                for prop in &patt.properties {
                    prop.value.iter_bound_names(f)
                }
            }
            Pattern::Assign(patt) => patt.left.iter_bound_names(f),
            Pattern::Member(_) | Pattern::SuperMember(_) => {}
        }
    }

    pub fn loc(&self) -> Loc {
        match self {
            Pattern::Id(patt) => patt.loc,
            Pattern::Array(patt) => patt.loc,
            Pattern::Object(patt) => patt.loc,
            Pattern::Assign(patt) => patt.loc,
            Pattern::Member(expr) => expr.loc,
            Pattern::SuperMember(expr) => expr.loc,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayPattern {
    pub loc: Loc,
    pub elements: Vec<ArrayPatternElement>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ArrayPatternElement {
    Pattern(Pattern),
    Rest(RestElement),
    Hole(Pos),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RestElement {
    pub loc: Loc,
    pub argument: P<Pattern>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectPattern {
    pub loc: Loc,
    pub properties: Vec<ObjectPatternProperty>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectPatternProperty {
    pub loc: Loc,
    /// Missing for shorthand and rest properties
    pub key: Option<P<Expression>>,
    pub value: P<Pattern>,
    pub is_computed: bool,
    // For rest properties the value is the argument and must be an id. All other fields are
    // ignored.
    pub is_rest: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentPattern {
    pub loc: Loc,
    pub left: P<Pattern>,
    pub right: P<Expression>,
}
