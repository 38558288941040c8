//! Expression evaluation to CSS-ready value strings
//!
//! Evaluation never fails. Arithmetic the evaluator cannot fold safely is
//! deferred to the browser as `calc()`, and unresolved names pass through as
//! bare CSS keywords.
//!
//! References rooted at an active loop iterator evaluate to a runtime
//! placeholder delimited by [`RUNTIME_OPEN`] and [`RUNTIME_CLOSE`]. The loop
//! emitter later turns those into `${...}` template-literal interpolations.

use crate::compiler::frontend::ast::{BinaryOp, Expression, LiteralKind, UnaryOp};
use crate::compiler::middle_end::scope::Scope;
use crate::core::constants::{is_dimensional, PARENT_EXTENT_PATHS, PARENT_PREFIX};
use crate::utils::{escape_js_string, escape_template_literal, format_number};
use once_cell::sync::Lazy;
use regex::Regex;

pub const RUNTIME_OPEN: char = '\u{E000}';
pub const RUNTIME_CLOSE: char = '\u{E001}';

static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+(?:\.\d+)?)([a-zA-Z%]*)$").unwrap());

/// Evaluate `expr` as the value of `property`, inferring `px` once at the outermost value
pub fn evaluate(expr: &Expression, scope: &Scope, property: &str) -> String {
    infer_unit(evaluate_raw(expr, scope), property)
}

/// Append `px` to a plain number consumed by a dimensional property
pub fn infer_unit(value: String, property: &str) -> String {
    if is_dimensional(property) && matches!(parse_numeric(&value), Some((_, ""))) {
        format!("{}px", value)
    } else {
        value
    }
}

pub fn evaluate_raw(expr: &Expression, scope: &Scope) -> String {
    match expr {
        Expression::Literal { value, .. } => value.clone(),
        Expression::Reference(path) => resolve_reference(path, scope),
        Expression::Binary { op, left, right } => {
            let left = evaluate_raw(left, scope);
            let right = evaluate_raw(right, scope);
            evaluate_binary(*op, &left, &right)
        }
        Expression::Unary { op, operand } => {
            let value = evaluate_raw(operand, scope);
            evaluate_unary(*op, &value)
        }
        Expression::List(items) => {
            let items: Vec<String> = items.iter().map(|item| js_value(item, scope)).collect();
            format!("[{}]", items.join(", "))
        }
        Expression::StructInit { name, fields } => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(field, value)| format!("{}: {}", field, js_value(value, scope)))
                .collect();
            format!("new {}({{{}}})", name, fields.join(", "))
        }
        Expression::Block(code) => code.clone(),
    }
}

fn resolve_reference(path: &str, scope: &Scope) -> String {
    if PARENT_EXTENT_PATHS.contains(&path) {
        return "100%".to_string();
    }

    let root = path.split('.').next().unwrap_or(path);
    if scope.is_iterator(root) {
        return runtime(path);
    }

    let resolved = match path.strip_prefix(PARENT_PREFIX) {
        Some(name) => scope.lookup_parent(name),
        None => scope.lookup(path),
    };
    resolved.map_or_else(|| path.to_string(), str::to_string)
}

/// Render an expression as a JS literal for lists and struct fields
fn js_value(expr: &Expression, scope: &Scope) -> String {
    match expr {
        Expression::List(_) | Expression::StructInit { .. } => evaluate_raw(expr, scope),
        Expression::Literal {
            value,
            kind: LiteralKind::Number | LiteralKind::Boolean,
        } => value.clone(),
        _ => js_operand(&evaluate_raw(expr, scope)),
    }
}

fn evaluate_binary(op: BinaryOp, left: &str, right: &str) -> String {
    let is_runtime = has_runtime(left) || has_runtime(right);

    match op {
        BinaryOp::And | BinaryOp::Or => {
            if is_runtime {
                return runtime(&format!("({} {} {})", js_operand(left), op, js_operand(right)));
            }
            let result = match op {
                BinaryOp::And => is_truthy(left) && is_truthy(right),
                _ => is_truthy(left) || is_truthy(right),
            };
            bool_string(result)
        }
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            if is_runtime {
                let symbol = match op {
                    BinaryOp::Eq => "===",
                    BinaryOp::NotEq => "!==",
                    other => other.symbol(),
                };
                return runtime(&format!("({} {} {})", js_operand(left), symbol, js_operand(right)));
            }
            bool_string(compare(op, left, right))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            if is_runtime {
                if let (Some(l), Some(r)) = (runtime_number(left), runtime_number(right)) {
                    return runtime(&format!("({} {} {})", l, op, r));
                }
            }
            fold_arithmetic(op, left, right)
        }
    }
}

fn fold_arithmetic(op: BinaryOp, left: &str, right: &str) -> String {
    if let (Some((a, left_unit)), Some((b, right_unit))) = (parse_numeric(left), parse_numeric(right)) {
        let unit = if left_unit.is_empty() { right_unit } else { left_unit };
        let scalar = left_unit.is_empty() || right_unit.is_empty();

        let folded = match op {
            BinaryOp::Add if left_unit == right_unit => Some(a + b),
            BinaryOp::Sub if left_unit == right_unit => Some(a - b),
            BinaryOp::Mul if scalar => Some(a * b),
            BinaryOp::Div if scalar && b != 0.0 => Some(a / b),
            _ => None,
        };

        if let Some(value) = folded {
            return format!("{}{}", format_number(value), unit);
        }
    }

    format!("calc({} {} {})", left, op, right)
}

fn compare(op: BinaryOp, left: &str, right: &str) -> bool {
    if let (Some((a, left_unit)), Some((b, right_unit))) = (parse_numeric(left), parse_numeric(right)) {
        if left_unit == right_unit {
            return match op {
                BinaryOp::Eq => a == b,
                BinaryOp::NotEq => a != b,
                BinaryOp::Lt => a < b,
                BinaryOp::LtEq => a <= b,
                BinaryOp::Gt => a > b,
                BinaryOp::GtEq => a >= b,
                _ => false,
            };
        }
    }

    match op {
        BinaryOp::Eq => left == right,
        BinaryOp::NotEq => left != right,
        BinaryOp::Lt => left < right,
        BinaryOp::LtEq => left <= right,
        BinaryOp::Gt => left > right,
        BinaryOp::GtEq => left >= right,
        _ => false,
    }
}

fn evaluate_unary(op: UnaryOp, value: &str) -> String {
    if let Some(inner) = runtime_expression(value) {
        return match op {
            UnaryOp::Neg => runtime(&format!("(-{})", inner)),
            UnaryOp::Not => runtime(&format!("(!{})", inner)),
        };
    }

    match op {
        UnaryOp::Not => bool_string(!is_truthy(value)),
        UnaryOp::Neg => match parse_numeric(value) {
            Some((number, unit)) => format!("{}{}", format_number(-number), unit),
            None => format!("calc(-1 * {})", value),
        },
    }
}

/// Split a value into its numeric part and unit suffix
pub fn parse_numeric(value: &str) -> Option<(f64, &str)> {
    let captures = NUMERIC.captures(value)?;
    let number = captures.get(1)?.as_str().parse::<f64>().ok()?;
    let unit = captures.get(2).map_or("", |m| m.as_str());
    Some((number, unit))
}

/// A value is false when it is `false`, empty or `0`
pub fn is_truthy(value: &str) -> bool {
    !(value == "false" || value.is_empty() || value == "0")
}

fn bool_string(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

// Runtime placeholders

pub fn runtime(js: &str) -> String {
    format!("{}{}{}", RUNTIME_OPEN, js, RUNTIME_CLOSE)
}

pub fn has_runtime(value: &str) -> bool {
    value.contains(RUNTIME_OPEN)
}

/// The JS expression when `value` is exactly one runtime placeholder
pub fn runtime_expression(value: &str) -> Option<&str> {
    let inner = value.strip_prefix(RUNTIME_OPEN)?.strip_suffix(RUNTIME_CLOSE)?;
    if inner.contains(RUNTIME_OPEN) || inner.contains(RUNTIME_CLOSE) {
        None
    } else {
        Some(inner)
    }
}

fn runtime_number(value: &str) -> Option<String> {
    match runtime_expression(value) {
        Some(inner) => Some(inner.to_string()),
        None => match parse_numeric(value) {
            Some((_, "")) => Some(value.to_string()),
            _ => None,
        },
    }
}

/// Render an evaluated value as a JS operand
pub fn js_operand(value: &str) -> String {
    if let Some(inner) = runtime_expression(value) {
        return inner.to_string();
    }
    if value == "true" || value == "false" || matches!(parse_numeric(value), Some((_, ""))) {
        return value.to_string();
    }
    if has_runtime(value) {
        return format!("`{}`", to_template_literal(value));
    }
    format!("'{}'", escape_js_string(value))
}

/// Apply `text` to the plain segments of `value` and `placeholder` to each
/// runtime expression
fn map_segments<T, P>(value: &str, text: T, placeholder: P) -> String
where
    T: Fn(&str) -> String,
    P: Fn(&str) -> String,
{
    let mut output = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find(RUNTIME_OPEN) {
        output.push_str(&text(&rest[..start]));
        let after = &rest[start + RUNTIME_OPEN.len_utf8()..];
        match after.find(RUNTIME_CLOSE) {
            Some(end) => {
                output.push_str(&placeholder(&after[..end]));
                rest = &after[end + RUNTIME_CLOSE.len_utf8()..];
            }
            None => rest = after,
        }
    }
    output.push_str(&text(rest));
    output
}

/// Escape the plain segments of `value`, leaving runtime placeholders intact
pub fn map_text_segments<T: Fn(&str) -> String>(value: &str, text: T) -> String {
    map_segments(value, text, runtime)
}

/// Convert text carrying runtime placeholders into template-literal content
pub fn to_template_literal(text: &str) -> String {
    map_segments(text, escape_template_literal, |js| format!("${{{}}}", js))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::frontend::lexer::Lexer;
    use crate::compiler::frontend::parser::Parser;
    use crate::compiler::middle_end::registry::ComponentRegistry;

    fn expr(source: &str) -> Expression {
        let tokens = Lexer::new(source, "expr.nota").tokenize().unwrap();
        let mut registry = ComponentRegistry::new();
        let mut parser = Parser::new(tokens, &mut registry, "expr.nota");
        parser.parse_expression().unwrap()
    }

    fn eval(source: &str, property: &str) -> String {
        evaluate(&expr(source), &Scope::new(), property)
    }

    #[test]
    fn test_unit_inference() {
        assert_eq!(eval("10", "width"), "10px");
        assert_eq!(eval("10", "index"), "10");
        assert_eq!(eval("0.5", "opacity"), "0.5");
        assert_eq!(eval("10em", "width"), "10em");
        assert_eq!(eval("50%", "height"), "50%");
    }

    #[test]
    fn test_arithmetic_fold_respects_precedence() {
        assert_eq!(eval("10 + 20 * 5", "width"), "110px");
        assert_eq!(eval("(10 + 20) * 5", "width"), "150px");
        assert_eq!(eval("10px * 2", "width"), "20px");
        assert_eq!(eval("1 / 3", "opacity"), "0.3333");
        assert_eq!(eval("5vw - 2vw", "left"), "3vw");
    }

    #[test]
    fn test_calc_fallback() {
        assert_eq!(eval("100% - 20px", "width"), "calc(100% - 20px)");
        assert_eq!(eval("2px * 3px", "width"), "calc(2px * 3px)");
        assert_eq!(eval("10 / 0", "width"), "calc(10 / 0)");
        assert_eq!(eval("gutter + 4", "padding"), "calc(gutter + 4)");
    }

    #[test]
    fn test_logical_truthiness() {
        assert_eq!(eval("true && 0", "visible"), "false");
        assert_eq!(eval("false || \"yes\"", "visible"), "true");
        assert_eq!(eval("!false", "visible"), "true");
        assert_eq!(eval("!1", "visible"), "false");
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("3 > 2", "flag"), "true");
        assert_eq!(eval("10px == 10px", "flag"), "true");
        assert_eq!(eval("10px == 10em", "flag"), "false");
        assert_eq!(eval("2 <= 2", "flag"), "true");
        assert_eq!(eval("\"dark\" == \"dark\"", "flag"), "true");
        assert_eq!(eval("\"a\" != \"b\"", "flag"), "true");
    }

    #[test]
    fn test_negation() {
        assert_eq!(eval("-5", "x"), "-5px");
        assert_eq!(eval("-offset", "x"), "calc(-1 * offset)");
    }

    #[test]
    fn test_references() {
        let mut scope = Scope::new();
        scope.push_component();
        scope.define("gutter", "8px");
        scope.push_component();
        scope.define("gutter", "4px");
        scope.define("size", "10");

        assert_eq!(evaluate(&expr("gutter * 2"), &scope, "padding"), "8px");
        assert_eq!(evaluate(&expr("parent.gutter"), &scope, "padding"), "8px");
        assert_eq!(evaluate(&expr("size + 5"), &scope, "width"), "15px");
        assert_eq!(evaluate(&expr("parent.width"), &scope, "width"), "100%");
        assert_eq!(evaluate(&expr("parent.width - 20px"), &scope, "width"), "calc(100% - 20px)");
        assert_eq!(evaluate(&expr("red"), &scope, "color"), "red");
    }

    #[test]
    fn test_keywords_pass_through_ancestor_bindings() {
        let mut scope = Scope::new();
        scope.push_component();
        scope.define("red", "#ff0000");
        scope.define("top", "40px");
        scope.define_shared("accent", "teal");
        scope.push_component();

        assert_eq!(evaluate(&expr("red"), &scope, "color"), "red");
        assert_eq!(evaluate(&expr("top"), &scope, "position"), "top");
        assert_eq!(evaluate(&expr("accent"), &scope, "color"), "teal");
        assert_eq!(evaluate(&expr("parent.top"), &scope, "y"), "40px");
    }

    #[test]
    fn test_lists_and_structs() {
        assert_eq!(eval("[\"a\", 2, b]", "items"), "['a', 2, 'b']");
        assert_eq!(
            eval("Point { x: 1, label: \"origin\" }", "value"),
            "new Point({x: 1, label: 'origin'})"
        );
    }

    #[test]
    fn test_iterator_references_become_placeholders() {
        let mut scope = Scope::new();
        scope.push_loop("item");

        let label = evaluate(&expr("item.label"), &scope, "text");
        assert_eq!(runtime_expression(&label), Some("item.label"));
        assert_eq!(to_template_literal(&label), "${item.label}");

        let doubled = evaluate(&expr("item.size * 2"), &scope, "width");
        assert_eq!(runtime_expression(&doubled), Some("(item.size * 2)"));

        let check = evaluate(&expr("item.kind == \"big\""), &scope, "flag");
        assert_eq!(runtime_expression(&check), Some("(item.kind === 'big')"));

        let mixed = evaluate(&expr("item.size * 2px"), &scope, "width");
        assert_eq!(to_template_literal(&mixed), "calc(${item.size} * 2px)");
    }

    #[test]
    fn test_map_text_segments_preserves_placeholders() {
        let value = format!("<{}>", runtime("a < b"));
        let escaped = map_text_segments(&value, crate::utils::escape_html);
        assert_eq!(to_template_literal(&escaped), "&lt;${a < b}&gt;");
    }

    #[test]
    fn test_template_literal_escaping() {
        let text = format!("cost: `$5` {}", runtime("price"));
        assert_eq!(to_template_literal(&text), "cost: \\`$5\\` ${price}");
    }
}
