//! Abstract Syntax Tree types for the Nota compiler

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    String,
    Color,
    Boolean,
    /// A merged value run such as `10px`, `50%` or `1px solid red`
    Keyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Expression tree. Cloning is a deep copy.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal { value: String, kind: LiteralKind },
    /// Dotted path such as `theme.primary` or `parent.width`
    Reference(String),
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    List(Vec<Expression>),
    StructInit {
        name: String,
        fields: Vec<(String, Expression)>,
    },
    /// Raw script code from a `{ ... }` property value
    Block(String),
}

impl Expression {
    pub fn literal(value: impl Into<String>, kind: LiteralKind) -> Self {
        Expression::Literal {
            value: value.into(),
            kind,
        }
    }

    pub fn number(value: impl Into<String>) -> Self {
        Self::literal(value, LiteralKind::Number)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(value, LiteralKind::String)
    }

    pub fn reference(path: impl Into<String>) -> Self {
        Expression::Reference(path.into())
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// A `name: value` member. Dotted names on instances are deep overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Expression,
    pub line: usize,
}

impl Property {
    pub fn new(name: impl Into<String>, value: Expression, line: usize) -> Self {
        Self {
            name: name.into(),
            value,
            line,
        }
    }

    pub fn is_deep_override(&self) -> bool {
        self.name.contains('.')
    }
}

/// A typed `property <type> <name>[: default]` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub ty: String,
    pub name: String,
    pub default: Option<Expression>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNode {
    pub type_name: String,
    pub name: Option<String>,
    pub is_exported: bool,
    /// Template this node was instantiated from at parse time
    pub template: Option<String>,
    pub children: Vec<Node>,
    pub line: usize,
}

impl ComponentNode {
    pub fn new(type_name: impl Into<String>, line: usize) -> Self {
        Self {
            type_name: type_name.into(),
            name: None,
            is_exported: false,
            template: None,
            children: Vec::new(),
            line,
        }
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.children.iter().filter_map(|child| match child {
            Node::Property(prop) => Some(prop),
            _ => None,
        })
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties().find(|prop| prop.name == name)
    }

    /// Overwrite a same-named property in place, or append it
    pub fn set_property(&mut self, prop: Property) {
        for child in self.children.iter_mut() {
            if let Node::Property(existing) = child {
                if existing.name == prop.name {
                    *existing = prop;
                    return;
                }
            }
        }
        self.children.push(Node::Property(prop));
    }

    pub fn property_decls(&self) -> impl Iterator<Item = &PropertyDecl> {
        self.children.iter().filter_map(|child| match child {
            Node::PropertyDecl(decl) => Some(decl),
            _ => None,
        })
    }

    /// Literal `id` property, if any
    pub fn id(&self) -> Option<String> {
        match self.property("id").map(|prop| &prop.value) {
            Some(Expression::Literal { value, .. }) => Some(value.clone()),
            Some(Expression::Reference(path)) => Some(path.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalNode {
    pub condition: Expression,
    pub then_branch: Vec<Node>,
    /// `else if` nests another conditional here
    pub else_branch: Option<Vec<Node>>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForNode {
    pub iterator: String,
    pub collection: String,
    pub body: Vec<Node>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelegateNode {
    pub events: Vec<String>,
    pub target: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub ty: String,
    pub name: String,
    pub default: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDefinition {
    pub name: String,
    pub fields: Vec<StructField>,
    pub line: usize,
}

/// Member of a component body
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Property(Property),
    PropertyDecl(PropertyDecl),
    Component(ComponentNode),
    Conditional(ConditionalNode),
    For(ForNode),
    Delegate(DelegateNode),
    Struct(StructDefinition),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Import { path: String, alias: Option<String> },
    Package(String),
    Struct(StructDefinition),
    /// Template definition, registered at parse time and never rendered
    Definition(ComponentNode),
    Component(ComponentNode),
    Conditional(ConditionalNode),
    For(ForNode),
}

impl Statement {
    pub fn is_renderable(&self) -> bool {
        matches!(
            self,
            Statement::Component(_) | Statement::Conditional(_) | Statement::For(_)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn renderables(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(|stmt| stmt.is_renderable())
    }

    pub fn package(&self) -> Option<&str> {
        self.statements.iter().find_map(|stmt| match stmt {
            Statement::Package(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ComponentNode> {
        self.statements.iter().filter_map(|stmt| match stmt {
            Statement::Definition(node) => Some(node),
            _ => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.statements.iter().filter_map(|stmt| match stmt {
            Statement::Import { path, alias } => Some((path.as_str(), alias.as_deref())),
            _ => None,
        })
    }

    pub fn structs(&self) -> impl Iterator<Item = &StructDefinition> {
        self.statements.iter().filter_map(|stmt| match stmt {
            Statement::Struct(def) => Some(def),
            _ => None,
        })
    }
}
