//! Recursive descent parser for the Nota language

use crate::compiler::frontend::ast::*;
use crate::compiler::frontend::lexer::{Token, TokenKind};
use crate::compiler::middle_end::registry::ComponentRegistry;
use crate::core::constants::{is_known_unit, DEFINITION_KEYWORD};
use crate::error::{CompilerError, Result};

/// Parser over a token stream. Template definitions are registered into the
/// borrowed registry as soon as they are parsed, so later uses in the same
/// file instantiate them.
pub struct Parser<'r> {
    tokens: Vec<Token>,
    current: usize,
    registry: &'r mut ComponentRegistry,
    file: String,
    struct_init_allowed: bool,
}

impl<'r> Parser<'r> {
    pub fn new(tokens: Vec<Token>, registry: &'r mut ComponentRegistry, file: impl Into<String>) -> Self {
        Self {
            tokens,
            current: 0,
            registry,
            file: file.into(),
            struct_init_allowed: true,
        }
    }

    pub fn parse(&mut self) -> Result<Program> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if self.match_separator() {
                continue;
            }

            let statement = match self.peek().kind {
                TokenKind::Import => self.parse_import()?,
                TokenKind::Package => {
                    self.advance();
                    Statement::Package(self.parse_path("package name")?)
                }
                TokenKind::Struct => Statement::Struct(self.parse_struct()?),
                TokenKind::Export => {
                    self.advance();
                    if !self.check(TokenKind::Item) {
                        return Err(self.error_expected("'Item' after 'export'"));
                    }
                    Statement::Definition(self.parse_definition(true)?)
                }
                TokenKind::Item if self.is_definition_start() => {
                    Statement::Definition(self.parse_definition(false)?)
                }
                TokenKind::If => Statement::Conditional(self.parse_conditional()?),
                TokenKind::For => Statement::For(self.parse_for()?),
                TokenKind::Item | TokenKind::Identifier => Statement::Component(self.parse_component()?),
                _ => return Err(self.error_expected("a component, import, package or definition")),
            };
            statements.push(statement);
        }

        Ok(Program { statements })
    }

    fn parse_import(&mut self) -> Result<Statement> {
        self.consume(TokenKind::Import, "'import'")?;
        let path = if self.check(TokenKind::String) {
            self.advance().lexeme.clone()
        } else {
            self.parse_path("import path")?
        };

        let alias = if self.match_token(TokenKind::As) {
            Some(self.consume(TokenKind::Identifier, "alias after 'as'")?.lexeme.clone())
        } else {
            None
        };

        Ok(Statement::Import { path, alias })
    }

    /// `[export] Item Name { ... }`: parse and register a template
    fn parse_definition(&mut self, is_exported: bool) -> Result<ComponentNode> {
        let line = self.consume(TokenKind::Item, "'Item'")?.line;
        let name = self.consume(TokenKind::Identifier, "template name")?.lexeme.clone();
        self.consume(TokenKind::LeftBrace, "'{'")?;

        let mut node = ComponentNode::new(DEFINITION_KEYWORD, line);
        node.name = Some(name.clone());
        node.is_exported = is_exported;
        node.children = self.parse_members()?;

        log::trace!("Parsed template '{}' (exported: {})", name, is_exported);
        self.registry.register(name, node.clone());
        Ok(node)
    }

    /// `Type [name] { ... }`, instantiating a registered template when one matches
    fn parse_component(&mut self) -> Result<ComponentNode> {
        let line = self.peek().line;
        let type_name = if self.match_token(TokenKind::Item) {
            DEFINITION_KEYWORD.to_string()
        } else {
            self.parse_path("component type")?
        };

        let name = if self.check(TokenKind::Identifier) {
            Some(self.advance().lexeme.clone())
        } else {
            None
        };
        self.consume(TokenKind::LeftBrace, "'{'")?;
        let members = self.parse_members()?;

        let mut node = match self.registry.lookup(&type_name) {
            Some(template) => {
                let mut instance = template.clone();
                instance.template = Some(type_name.clone());
                instance.is_exported = false;
                instance.line = line;
                instance
            }
            None => ComponentNode::new(type_name, line),
        };
        node.name = name;

        let is_instance = node.template.is_some();
        for member in members {
            match member {
                Node::Property(prop) if is_instance => node.set_property(prop),
                other => node.children.push(other),
            }
        }

        Ok(node)
    }

    /// Parse body members up to and including the closing brace
    fn parse_members(&mut self) -> Result<Vec<Node>> {
        let mut members = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if self.match_separator() {
                continue;
            }

            let member = match self.peek().kind {
                TokenKind::Property => Node::PropertyDecl(self.parse_property_decl()?),
                TokenKind::If => Node::Conditional(self.parse_conditional()?),
                TokenKind::For => Node::For(self.parse_for()?),
                TokenKind::Delegate => Node::Delegate(self.parse_delegate()?),
                TokenKind::Struct => Node::Struct(self.parse_struct()?),
                TokenKind::Item => Node::Component(self.parse_component()?),
                TokenKind::Identifier => {
                    let after_path = self.path_end(self.current);
                    match self.kind_at(after_path) {
                        TokenKind::Colon => Node::Property(self.parse_property()?),
                        TokenKind::LeftBrace => Node::Component(self.parse_component()?),
                        TokenKind::Identifier
                            if self.kind_at(after_path + 1) == TokenKind::LeftBrace =>
                        {
                            Node::Component(self.parse_component()?)
                        }
                        _ => {
                            self.current = after_path;
                            return Err(self.error_expected("':' or '{'"));
                        }
                    }
                }
                _ => return Err(self.error_expected("a property or component")),
            };
            members.push(member);
        }

        self.consume(TokenKind::RightBrace, "'}'")?;
        Ok(members)
    }

    fn parse_property(&mut self) -> Result<Property> {
        let line = self.peek().line;
        let name = self.parse_path("property name")?;
        self.consume(TokenKind::Colon, "':'")?;

        let value = if self.match_token(TokenKind::LeftBrace) {
            Expression::Block(self.parse_script_code()?)
        } else {
            self.parse_expression()?
        };

        Ok(Property::new(name, value, line))
    }

    /// `property <type> <name>[: default]`
    fn parse_property_decl(&mut self) -> Result<PropertyDecl> {
        let line = self.consume(TokenKind::Property, "'property'")?.line;
        let ty = self.consume(TokenKind::Identifier, "property type")?.lexeme.clone();
        let name = self.consume(TokenKind::Identifier, "property name")?.lexeme.clone();
        let default = if self.match_token(TokenKind::Colon) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(PropertyDecl { ty, name, default, line })
    }

    fn parse_conditional(&mut self) -> Result<ConditionalNode> {
        let line = self.consume(TokenKind::If, "'if'")?.line;

        let previous = std::mem::replace(&mut self.struct_init_allowed, false);
        let condition = self.parse_expression();
        self.struct_init_allowed = previous;
        let condition = condition?;

        self.consume(TokenKind::LeftBrace, "'{' after condition")?;
        let then_branch = self.parse_members()?;

        let else_branch = if self.match_token(TokenKind::Else) {
            if self.check(TokenKind::If) {
                Some(vec![Node::Conditional(self.parse_conditional()?)])
            } else {
                self.consume(TokenKind::LeftBrace, "'{' after 'else'")?;
                Some(self.parse_members()?)
            }
        } else {
            None
        };

        Ok(ConditionalNode {
            condition,
            then_branch,
            else_branch,
            line,
        })
    }

    /// `for (item in path) { ... }` with optional parentheses
    fn parse_for(&mut self) -> Result<ForNode> {
        let line = self.consume(TokenKind::For, "'for'")?.line;
        let parenthesized = self.match_token(TokenKind::LeftParen);
        let iterator = self.consume(TokenKind::Identifier, "loop variable")?.lexeme.clone();
        self.consume(TokenKind::In, "'in'")?;
        let collection = self.parse_path("collection")?;
        if parenthesized {
            self.consume(TokenKind::RightParen, "')'")?;
        }
        self.consume(TokenKind::LeftBrace, "'{'")?;
        let body = self.parse_members()?;

        Ok(ForNode {
            iterator,
            collection,
            body,
            line,
        })
    }

    /// `delegate [click, hover] for target`
    fn parse_delegate(&mut self) -> Result<DelegateNode> {
        let line = self.consume(TokenKind::Delegate, "'delegate'")?.line;
        let mut events = Vec::new();

        if self.match_token(TokenKind::LeftBracket) {
            while !self.check(TokenKind::RightBracket) && !self.is_at_end() {
                if self.match_token(TokenKind::Comma) {
                    continue;
                }
                let event = if self.check(TokenKind::String) || self.check(TokenKind::Identifier) {
                    self.advance().lexeme.clone()
                } else {
                    return Err(self.error_expected("event name"));
                };
                events.push(event);
            }
            self.consume(TokenKind::RightBracket, "']'")?;
        } else {
            events.push(self.consume(TokenKind::Identifier, "event name or '['")?.lexeme.clone());
        }

        self.consume(TokenKind::For, "'for'")?;
        let target = self.parse_path("delegate target")?;

        Ok(DelegateNode { events, target, line })
    }

    /// `struct Name { type field[: default] ... }`
    fn parse_struct(&mut self) -> Result<StructDefinition> {
        let line = self.consume(TokenKind::Struct, "'struct'")?.line;
        let name = self.consume(TokenKind::Identifier, "struct name")?.lexeme.clone();
        self.consume(TokenKind::LeftBrace, "'{'")?;

        let mut fields = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if self.match_separator() {
                continue;
            }
            let ty = self.consume(TokenKind::Identifier, "field type")?.lexeme.clone();
            let field = self.consume(TokenKind::Identifier, "field name")?.lexeme.clone();
            let default = if self.match_token(TokenKind::Colon) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            fields.push(StructField { ty, name: field, default });
        }
        self.consume(TokenKind::RightBrace, "'}'")?;

        Ok(StructDefinition { name, fields, line })
    }

    // Expressions

    pub fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut expr = self.parse_and()?;
        while self.match_token(TokenKind::OrOr) {
            let right = self.parse_and()?;
            expr = Expression::binary(BinaryOp::Or, expr, right);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut expr = self.parse_equality()?;
        while self.match_token(TokenKind::AndAnd) {
            let right = self.parse_equality()?;
            expr = Expression::binary(BinaryOp::And, expr, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expression> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::EqualEquals => BinaryOp::Eq,
                TokenKind::NotEquals => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            expr = Expression::binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        let mut expr = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Less => BinaryOp::Lt,
                TokenKind::LessEqual => BinaryOp::LtEq,
                TokenKind::Greater => BinaryOp::Gt,
                TokenKind::GreaterEqual => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            expr = Expression::binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expression> {
        let mut expr = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            expr = Expression::binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> Result<Expression> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            expr = Expression::binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        match self.peek().kind {
            TokenKind::Number => {
                let token = self.advance().clone();
                Ok(self.parse_value_run(token.lexeme, LiteralKind::Number, true))
            }
            TokenKind::String => {
                let token = self.advance().clone();
                Ok(self.parse_value_run(token.lexeme, LiteralKind::String, false))
            }
            TokenKind::Color => {
                let token = self.advance().clone();
                Ok(Expression::literal(token.lexeme, LiteralKind::Color))
            }
            TokenKind::Boolean => {
                let token = self.advance().clone();
                Ok(Expression::literal(token.lexeme, LiteralKind::Boolean))
            }
            TokenKind::LeftParen => {
                self.advance();
                let previous = std::mem::replace(&mut self.struct_init_allowed, true);
                let expr = self.parse_expression();
                self.struct_init_allowed = previous;
                let expr = expr?;
                self.consume(TokenKind::RightParen, "')'")?;
                Ok(expr)
            }
            TokenKind::LeftBracket => self.parse_list(),
            TokenKind::LeftBrace => {
                self.advance();
                Ok(Expression::Block(self.parse_script_code()?))
            }
            TokenKind::Identifier => {
                let path = self.parse_path("identifier")?;
                if self.struct_init_allowed && self.check(TokenKind::LeftBrace) {
                    return self.parse_struct_init(path);
                }
                if path.contains('.') {
                    return Ok(Expression::Reference(path));
                }
                match self.parse_value_run(path.clone(), LiteralKind::Keyword, false) {
                    Expression::Literal { value, .. } if value == path => Ok(Expression::Reference(path)),
                    merged => Ok(merged),
                }
            }
            _ => Err(self.error_expected("an expression")),
        }
    }

    /// Merge a CSS value run such as `1px solid black` into one literal
    fn parse_value_run(&mut self, first: String, kind: LiteralKind, first_is_number: bool) -> Expression {
        let mut value = first;
        let mut merged = false;
        let mut last_was_number = first_is_number;

        loop {
            if last_was_number && self.check(TokenKind::Percent) {
                self.advance();
                value.push('%');
                merged = true;
                last_was_number = false;
                continue;
            }

            if last_was_number
                && self.check(TokenKind::Identifier)
                && is_known_unit(&self.peek().lexeme)
                && !self.starts_construct(self.current)
            {
                let unit = self.advance().lexeme.clone();
                value.push_str(&unit);
                merged = true;
                last_was_number = false;
                continue;
            }

            if !self.is_run_continuation() {
                break;
            }

            let token = self.advance().clone();
            value.push(' ');
            match token.kind {
                TokenKind::String => {
                    value.push('"');
                    value.push_str(&token.lexeme);
                    value.push('"');
                }
                _ => value.push_str(&token.lexeme),
            }
            merged = true;
            last_was_number = token.kind == TokenKind::Number;
        }

        if merged {
            Expression::literal(value, LiteralKind::Keyword)
        } else {
            Expression::literal(value, kind)
        }
    }

    fn is_run_continuation(&self) -> bool {
        match self.peek().kind {
            TokenKind::Number | TokenKind::String | TokenKind::Color => true,
            TokenKind::Identifier => !self.starts_construct(self.current),
            _ => false,
        }
    }

    /// True when the identifier at `index` begins `name:`, `name{`, `name.` or `Type name {`
    fn starts_construct(&self, index: usize) -> bool {
        match self.kind_at(index + 1) {
            TokenKind::Colon | TokenKind::LeftBrace | TokenKind::Dot => true,
            TokenKind::Identifier => self.kind_at(index + 2) == TokenKind::LeftBrace,
            _ => false,
        }
    }

    fn parse_list(&mut self) -> Result<Expression> {
        self.consume(TokenKind::LeftBracket, "'['")?;
        let previous = std::mem::replace(&mut self.struct_init_allowed, true);
        let mut items = Vec::new();

        while !self.check(TokenKind::RightBracket) && !self.is_at_end() {
            if self.match_token(TokenKind::Comma) {
                continue;
            }
            match self.parse_expression() {
                Ok(item) => items.push(item),
                Err(err) => {
                    self.struct_init_allowed = previous;
                    return Err(err);
                }
            }
        }
        self.struct_init_allowed = previous;

        self.consume(TokenKind::RightBracket, "']'")?;
        Ok(Expression::List(items))
    }

    fn parse_struct_init(&mut self, name: String) -> Result<Expression> {
        self.consume(TokenKind::LeftBrace, "'{'")?;
        let mut fields = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if self.match_separator() {
                continue;
            }
            let field = self.consume(TokenKind::Identifier, "field name")?.lexeme.clone();
            self.consume(TokenKind::Colon, "':'")?;
            let value = self.parse_expression()?;
            fields.push((field, value));
        }
        self.consume(TokenKind::RightBrace, "'}'")?;

        Ok(Expression::StructInit { name, fields })
    }

    /// Rebuild raw code between braces from tokens. The opening brace is already consumed.
    fn parse_script_code(&mut self) -> Result<String> {
        let mut code = String::new();
        let mut depth = 1;

        while !self.is_at_end() {
            let token = self.advance().clone();
            match token.kind {
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(code.trim().to_string());
                    }
                }
                _ => {}
            }

            let text = match token.kind {
                TokenKind::String => format!("'{}'", crate::utils::escape_js_string(&token.lexeme)),
                _ => token.lexeme.clone(),
            };

            let glue_left = matches!(
                token.kind,
                TokenKind::Dot
                    | TokenKind::Comma
                    | TokenKind::Semicolon
                    | TokenKind::RightParen
                    | TokenKind::RightBracket
                    | TokenKind::LeftParen
                    | TokenKind::LeftBracket
                    | TokenKind::Percent
            );
            let after_glue = code.ends_with(|c: char| matches!(c, '.' | '(' | '[' | '!'));

            if !code.is_empty() && !glue_left && !after_glue {
                code.push(' ');
            }
            // Calls glue to their callee; a group after an operator keeps its space
            if token.kind == TokenKind::LeftParen
                && code.ends_with(|c: char| !(c.is_alphanumeric() || "_)]([.!".contains(c)))
            {
                code.push(' ');
            }
            code.push_str(&text);
        }

        Err(self.error_expected("'}' to close code block"))
    }

    // Token helpers

    /// Consume `ident(.ident)*` and return the joined path
    fn parse_path(&mut self, what: &str) -> Result<String> {
        let mut path = self.consume(TokenKind::Identifier, what)?.lexeme.clone();
        while self.check(TokenKind::Dot) && self.kind_at(self.current + 1) == TokenKind::Identifier {
            self.advance();
            path.push('.');
            path.push_str(&self.advance().lexeme);
        }
        Ok(path)
    }

    /// Index just past the dotted path starting at `index`
    fn path_end(&self, index: usize) -> usize {
        let mut end = index + 1;
        while self.kind_at(end) == TokenKind::Dot && self.kind_at(end + 1) == TokenKind::Identifier {
            end += 2;
        }
        end
    }

    fn is_definition_start(&self) -> bool {
        self.kind_at(self.current + 1) == TokenKind::Identifier
            && self.kind_at(self.current + 2) == TokenKind::LeftBrace
    }

    fn match_separator(&mut self) -> bool {
        self.match_token(TokenKind::Semicolon) || self.match_token(TokenKind::Comma)
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn kind_at(&self, index: usize) -> TokenKind {
        self.tokens.get(index).map_or(TokenKind::Eof, |t| t.kind)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.current.min(last)]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn consume(&mut self, kind: TokenKind, expected: &str) -> Result<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(expected))
        }
    }

    fn error_expected(&self, expected: &str) -> CompilerError {
        let token = self.peek();
        let found = if token.kind == TokenKind::Eof {
            "end of file"
        } else {
            token.lexeme.as_str()
        };
        CompilerError::parse(
            self.file.clone(),
            token.line,
            token.column,
            format!("Expected {}, found '{}'", expected, found),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::frontend::lexer::Lexer;

    fn parse_with(source: &str, registry: &mut ComponentRegistry) -> Result<Program> {
        let tokens = Lexer::new(source, "test.nota").tokenize()?;
        Parser::new(tokens, registry, "test.nota").parse()
    }

    fn parse(source: &str) -> Program {
        let mut registry = ComponentRegistry::new();
        parse_with(source, &mut registry).unwrap()
    }

    fn first_component(program: &Program) -> &ComponentNode {
        program
            .renderables()
            .find_map(|stmt| match stmt {
                Statement::Component(node) => Some(node),
                _ => None,
            })
            .expect("component")
    }

    fn value_of(source: &str) -> Expression {
        let program = parse(&format!("App {{ value: {} }}", source));
        first_component(&program).property("value").unwrap().value.clone()
    }

    #[test]
    fn test_parse_simple_app() {
        let program = parse("App { width: 100; Text greeting { text: \"Hi\" } }");
        let app = first_component(&program);
        assert_eq!(app.type_name, "App");
        assert_eq!(app.property("width").unwrap().value, Expression::number("100"));

        let text = app
            .children
            .iter()
            .find_map(|c| match c {
                Node::Component(node) => Some(node),
                _ => None,
            })
            .unwrap();
        assert_eq!(text.type_name, "Text");
        assert_eq!(text.name.as_deref(), Some("greeting"));
        assert_eq!(text.property("text").unwrap().value, Expression::string("Hi"));
    }

    #[test]
    fn test_value_run_merging() {
        assert_eq!(value_of("10px"), Expression::literal("10px", LiteralKind::Keyword));
        assert_eq!(value_of("50%"), Expression::literal("50%", LiteralKind::Keyword));
        assert_eq!(
            value_of("1px solid black"),
            Expression::literal("1px solid black", LiteralKind::Keyword)
        );
        assert_eq!(value_of("left top"), Expression::literal("left top", LiteralKind::Keyword));
        assert_eq!(value_of("red"), Expression::reference("red"));
    }

    #[test]
    fn test_value_run_stops_at_next_property() {
        let program = parse("App { border: 2px dashed\n width: 10\n Rect box { } }");
        let app = first_component(&program);
        assert_eq!(
            app.property("border").unwrap().value,
            Expression::literal("2px dashed", LiteralKind::Keyword)
        );
        assert_eq!(app.property("width").unwrap().value, Expression::number("10"));
        assert_eq!(app.children.len(), 3);
    }

    #[test]
    fn test_precedence() {
        let expr = value_of("10 + 20 * 5");
        match expr {
            Expression::Binary { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(*right, Expression::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected expression {:?}", other),
        }

        let logical = value_of("a || b && c == 1");
        assert!(matches!(logical, Expression::Binary { op: BinaryOp::Or, .. }));
    }

    #[test]
    fn test_dotted_disambiguation() {
        let program = parse("App { rect1.color: green; theme.Card { }; width: theme.size }");
        let app = first_component(&program);
        assert!(app.property("rect1.color").unwrap().is_deep_override());
        assert_eq!(app.property("width").unwrap().value, Expression::reference("theme.size"));
        assert!(app.children.iter().any(|c| matches!(c, Node::Component(n) if n.type_name == "theme.Card")));
    }

    #[test]
    fn test_definition_registers_template() {
        let mut registry = ComponentRegistry::new();
        let program = parse_with("export Item Button { color: red }", &mut registry).unwrap();

        assert_eq!(program.renderables().count(), 0);
        let template = registry.lookup("Button").unwrap();
        assert!(template.is_exported);
        assert_eq!(template.type_name, "Item");
    }

    #[test]
    fn test_instance_overrides_and_appends() {
        let program = parse(
            "Item Box { color: red; Rect { id: r1 } }\n\
             App { Box { color: blue; padding: 4; Rect { id: r2 } } }",
        );
        let app = first_component(&program);
        let boxed = match &app.children[0] {
            Node::Component(node) => node,
            other => panic!("unexpected {:?}", other),
        };

        assert_eq!(boxed.template.as_deref(), Some("Box"));
        let colors: Vec<_> = boxed.properties().filter(|p| p.name == "color").collect();
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].value, Expression::reference("blue"));

        let ids: Vec<_> = boxed
            .children
            .iter()
            .filter_map(|c| match c {
                Node::Component(n) => n.id(),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["r1".to_string(), "r2".to_string()]);
    }

    #[test]
    fn test_instance_does_not_alias_template() {
        let mut registry = ComponentRegistry::new();
        parse_with("Item Box { color: red }\nApp { Box { color: blue } }", &mut registry).unwrap();
        assert_eq!(
            registry.lookup("Box").unwrap().property("color").unwrap().value,
            Expression::reference("red")
        );
    }

    #[test]
    fn test_conditional_and_loop() {
        let program = parse(
            "App {\n  if (count > 1) { Text { text: \"many\" } } else if flag { Rect { } } else { }\n  for (item in data.items) { Text { text: item.label } }\n}",
        );
        let app = first_component(&program);
        let cond = app.children.iter().find_map(|c| match c {
            Node::Conditional(c) => Some(c),
            _ => None,
        });
        let cond = cond.unwrap();
        assert!(matches!(cond.condition, Expression::Binary { op: BinaryOp::Gt, .. }));
        assert!(matches!(cond.else_branch.as_deref(), Some([Node::Conditional(_)])));

        let for_node = app.children.iter().find_map(|c| match c {
            Node::For(f) => Some(f),
            _ => None,
        });
        let for_node = for_node.unwrap();
        assert_eq!(for_node.iterator, "item");
        assert_eq!(for_node.collection, "data.items");
    }

    #[test]
    fn test_states_list_with_struct_init() {
        let expr = value_of("[State { name: \"hover\", when: onHover, color: red }]");
        match expr {
            Expression::List(items) => match &items[0] {
                Expression::StructInit { name, fields } => {
                    assert_eq!(name, "State");
                    assert_eq!(fields.len(), 3);
                    assert_eq!(fields[1].1, Expression::reference("onHover"));
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_block_value() {
        let program = parse("App { onClick: { counter.value = counter.value + 1; alert(\"hi\") } }");
        let app = first_component(&program);
        assert_eq!(
            app.property("onClick").unwrap().value,
            Expression::Block("counter.value = counter.value + 1; alert('hi')".to_string())
        );
    }

    #[test]
    fn test_property_decl_delegate_struct_and_imports() {
        let program = parse(
            "package ui\nimport shared.theme as t\nimport \"lib/card.nota\"\n\
             struct Point { int x: 0, int y }\n\
             Item Panel { property int size: 10\n delegate [click, hover] for parent }",
        );
        let imports: Vec<_> = program.imports().collect();
        assert_eq!(imports, vec![("shared.theme", Some("t")), ("lib/card.nota", None)]);
        assert_eq!(program.package(), Some("ui"));

        let point = program.structs().next().unwrap();
        assert_eq!(point.fields.len(), 2);
        assert_eq!(point.fields[0].default, Some(Expression::number("0")));

        let panel = program.definitions().next().unwrap();
        let decl = panel.property_decls().next().unwrap();
        assert_eq!((decl.ty.as_str(), decl.name.as_str()), ("int", "size"));
        assert!(panel.children.iter().any(|c| matches!(
            c,
            Node::Delegate(d) if d.events == vec!["click", "hover"] && d.target == "parent"
        )));
    }

    #[test]
    fn test_parse_error_reports_location() {
        let mut registry = ComponentRegistry::new();
        let err = parse_with("App {\n  width 10\n}", &mut registry).unwrap_err();
        assert_eq!(err.location(), Some((2, 9)));
        assert!(err.to_string().contains("Expected ':' or '{', found '10'"));
    }

    #[test]
    fn test_unclosed_body() {
        let mut registry = ComponentRegistry::new();
        let err = parse_with("App { Rect {", &mut registry).unwrap_err();
        assert!(err.to_string().contains("found 'end of file'"));
    }
}
