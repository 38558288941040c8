//! HTML, CSS and JS generation from a parsed program

use crate::compiler::backend::runtime::state_event;
use crate::compiler::backend::style::{build_styles, css_name, StyleOutput};
use crate::compiler::frontend::ast::*;
use crate::compiler::middle_end::evaluator::{
    evaluate, evaluate_raw, has_runtime, is_truthy, js_operand, map_text_segments, runtime,
    runtime_expression, to_template_literal,
};
use crate::compiler::middle_end::registry::ComponentRegistry;
use crate::compiler::middle_end::scope::Scope;
use crate::core::constants::{
    event_attribute, html_tag, CLASS_PREFIX, CONDITIONAL_ID_PREFIX, ELEMENT_CLASS_PREFIX,
    ELEMENT_ID_PREFIX, LOOP_ID_PREFIX,
};
use crate::error::Result;
use crate::utils::{escape_html, escape_js_string};
use crate::{CompilerOptions, StyleMode};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

/// Deep overrides waiting to be applied, keyed by target id
type Overrides = HashMap<String, Vec<Property>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedOutput {
    pub html: String,
    pub css: String,
    pub js: String,
}

#[derive(Debug, Clone, Default)]
pub struct GenerationStats {
    pub element_count: usize,
    pub conditional_count: usize,
    pub loop_count: usize,
    pub stateful_count: usize,
    pub warnings: Vec<String>,
}

pub struct CodeGenerator<'a> {
    registry: &'a ComponentRegistry,
    options: &'a CompilerOptions,
    css: String,
    js: String,
    struct_js: String,
    counter: usize,
    scope: Scope,
    /// Templates currently being expanded, innermost last
    expanding: Vec<String>,
    stats: GenerationStats,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(registry: &'a ComponentRegistry, options: &'a CompilerOptions) -> Self {
        Self {
            registry,
            options,
            css: String::new(),
            js: String::new(),
            struct_js: String::new(),
            counter: 0,
            scope: Scope::new(),
            expanding: Vec::new(),
            stats: GenerationStats::default(),
        }
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    pub fn generate(&mut self, program: &Program) -> Result<GeneratedOutput> {
        self.css.clear();
        self.js.clear();
        self.struct_js.clear();
        self.counter = 0;
        self.scope = Scope::new();
        self.expanding.clear();
        self.stats = GenerationStats::default();

        for definition in program.structs() {
            self.emit_struct(definition);
        }

        let mut html = String::new();
        let no_overrides = Overrides::new();
        for statement in program.renderables() {
            match statement {
                Statement::Component(node) => self.render_component(node, &no_overrides, &mut html)?,
                Statement::Conditional(cond) => self.render_conditional(cond, &no_overrides, &mut html)?,
                Statement::For(for_node) => self.render_for(for_node, &no_overrides, &mut html)?,
                _ => {}
            }
        }

        if self.options.debug_mode {
            log::debug!(
                "Generated {} elements, {} conditionals, {} loops",
                self.stats.element_count,
                self.stats.conditional_count,
                self.stats.loop_count
            );
        }

        Ok(GeneratedOutput {
            html,
            css: self.css.clone(),
            js: format!("{}{}", self.struct_js, self.js),
        })
    }

    fn next_id(&mut self) -> usize {
        self.counter += 1;
        self.counter
    }

    fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.stats.warnings.push(message);
    }

    fn render_node(
        &mut self,
        node: &Node,
        overrides: &Overrides,
        element_id: Option<&str>,
        out: &mut String,
    ) -> Result<()> {
        match node {
            Node::Component(component) => self.render_component(component, overrides, out),
            Node::Conditional(cond) => self.render_conditional(cond, overrides, out),
            Node::For(for_node) => self.render_for(for_node, overrides, out),
            Node::Delegate(delegate) => {
                self.emit_delegate(delegate, element_id);
                Ok(())
            }
            Node::Struct(definition) => {
                self.emit_struct(definition);
                Ok(())
            }
            Node::Property(_) | Node::PropertyDecl(_) => Ok(()),
        }
    }

    fn render_component(&mut self, node: &ComponentNode, inherited: &Overrides, out: &mut String) -> Result<()> {
        let registry = self.registry;
        // Parse-time instances already carry their template's members
        let template = match node.template {
            Some(_) => None,
            None => registry.lookup(&node.type_name),
        };
        let template = match template {
            Some(_) if self.expanding.iter().any(|name| *name == node.type_name) => {
                self.warn(format!(
                    "Template '{}' used inside itself on line {} is not expanded",
                    node.type_name, node.line
                ));
                None
            }
            other => other,
        };

        let base_type = template.map_or(node.type_name.as_str(), |t| t.type_name.as_str());
        let template_name = node
            .template
            .as_deref()
            .or_else(|| template.map(|_| node.type_name.as_str()));

        let id = node.id().or_else(|| template.and_then(ComponentNode::id));
        let incoming: &[Property] = id
            .as_deref()
            .and_then(|id| inherited.get(id))
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        // Merge: template, then instance, then overrides addressed to this id
        let mut properties: Vec<Property> = Vec::new();
        let mut pending = Overrides::new();
        let merged = template
            .into_iter()
            .flat_map(|t| t.properties())
            .chain(node.properties())
            .chain(incoming.iter());
        for prop in merged {
            match prop.name.split_once('.') {
                Some((target, field)) => pending
                    .entry(target.to_string())
                    .or_default()
                    .push(Property::new(field, prop.value.clone(), prop.line)),
                None => match properties.iter_mut().find(|p| p.name == prop.name) {
                    Some(existing) => existing.value = prop.value.clone(),
                    None => properties.push(prop.clone()),
                },
            }
        }
        for (target, props) in inherited {
            if Some(target.as_str()) != id.as_deref() {
                pending.entry(target.clone()).or_default().extend(props.iter().cloned());
            }
        }

        // Typed defaults evaluate in the enclosing scope
        let decls: Vec<&PropertyDecl> = template
            .into_iter()
            .flat_map(|t| t.property_decls())
            .chain(node.property_decls())
            .collect();
        let declared: HashSet<&str> = decls.iter().map(|decl| decl.name.as_str()).collect();
        let defaults: Vec<(String, String)> = decls
            .iter()
            .filter_map(|decl| {
                decl.default
                    .as_ref()
                    .map(|value| (decl.name.clone(), evaluate(value, &self.scope, &decl.name)))
            })
            .collect();

        self.scope.push_component();
        for (name, value) in defaults {
            self.scope.define_shared(name, value);
        }

        let mut values: Vec<(String, String)> = Vec::new();
        let mut states: Option<&Expression> = None;
        for prop in &properties {
            if prop.name == "states" {
                states = Some(&prop.value);
                continue;
            }
            let value = evaluate(&prop.value, &self.scope, &prop.name);
            if declared.contains(prop.name.as_str()) {
                self.scope.define_shared(prop.name.clone(), value.clone());
            } else {
                self.scope.define(prop.name.clone(), value.clone());
            }
            values.push((prop.name.clone(), value));
        }

        let children: Vec<&Node> = template
            .into_iter()
            .flat_map(|t| t.children.iter())
            .chain(node.children.iter())
            .filter(|child| !matches!(child, Node::Property(_) | Node::PropertyDecl(_)))
            .collect();
        let has_delegates = children.iter().any(|child| matches!(child, Node::Delegate(_)));

        let in_loop = self.scope.in_loop();
        if in_loop && (states.is_some() || has_delegates) {
            self.warn(format!(
                "States and delegates inside loop bodies are not supported (line {})",
                node.line
            ));
        }
        let wants_script = !in_loop && (states.is_some() || has_delegates);

        let mut element_id = values
            .iter()
            .find(|(name, _)| name == "id")
            .map(|(_, value)| value.clone());
        if element_id.is_none() && wants_script {
            element_id = Some(format!("{}{}", ELEMENT_ID_PREFIX, self.next_id()));
        }

        self.stats.element_count += 1;
        let style = build_styles(base_type, &values);
        let tag = html_tag(base_type);
        self.open_element(tag, base_type, template_name, element_id.as_deref(), &values, &style, out);

        if let Some((_, text)) = values.iter().find(|(name, _)| name == "text") {
            out.push_str(&map_text_segments(text, escape_html));
        }

        if let Some(name) = template_name {
            self.expanding.push(name.to_string());
        }
        for child in children {
            self.render_node(child, &pending, element_id.as_deref(), out)?;
        }
        if template_name.is_some() {
            self.expanding.pop();
        }
        let _ = write!(out, "</{}>", tag);

        if let (Some(states), Some(id), true) = (states, element_id.as_deref(), wants_script) {
            self.emit_states(id, base_type, states);
        }

        self.scope.pop()
    }

    #[allow(clippy::too_many_arguments)]
    fn open_element(
        &mut self,
        tag: &str,
        base_type: &str,
        template_name: Option<&str>,
        element_id: Option<&str>,
        values: &[(String, String)],
        style: &StyleOutput,
        out: &mut String,
    ) {
        let mut classes = vec![format!("{}-{}", CLASS_PREFIX, class_slug(base_type))];
        if let Some(template_name) = template_name {
            classes.push(format!("{}-{}", CLASS_PREFIX, class_slug(template_name)));
        }

        let inline = self.options.style_mode == StyleMode::Inline || self.scope.in_loop();
        let declarations = style.declaration_text();
        if !inline && !declarations.is_empty() {
            let class_name = format!("{}{}", ELEMENT_CLASS_PREFIX, self.next_id());
            let _ = writeln!(self.css, ".{} {{ {} }}", class_name, declarations);
            classes.push(class_name);
        }

        let _ = write!(out, "<{}", tag);
        if let Some(id) = element_id {
            let _ = write!(out, " id=\"{}\"", escape_attribute(id));
        }
        let _ = write!(out, " class=\"{}\"", classes.join(" "));
        if inline && !declarations.is_empty() {
            let _ = write!(out, " style=\"{}\"", escape_attribute(&declarations));
        }
        for (name, value) in &style.data_attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape_attribute(value));
        }
        for (name, value) in values {
            if let Some(attribute) = event_attribute(name) {
                let _ = write!(out, " {}=\"{}\"", attribute, escape_attribute(value));
            }
        }
        out.push('>');
    }

    fn render_conditional(&mut self, cond: &ConditionalNode, overrides: &Overrides, out: &mut String) -> Result<()> {
        self.stats.conditional_count += 1;
        let id = format!("{}{}", CONDITIONAL_ID_PREFIX, self.next_id());
        let condition = evaluate_raw(&cond.condition, &self.scope);

        let (then_style, else_style) = match runtime_expression(&condition) {
            Some(js) => (
                runtime(&format!("({}) ? '' : 'none'", js)),
                runtime(&format!("({}) ? 'none' : ''", js)),
            ),
            None => {
                if has_runtime(&condition) {
                    self.warn(format!("Condition on line {} cannot be folded; treating as true", cond.line));
                }
                if is_truthy(&condition) {
                    (String::new(), "none".to_string())
                } else {
                    ("none".to_string(), String::new())
                }
            }
        };

        let _ = write!(out, "<div class=\"nota-if\" id=\"{}\">", id);
        self.render_branch(&format!("{}-then", id), "nota-if-then", &then_style, &cond.then_branch, overrides, out)?;
        if let Some(else_branch) = &cond.else_branch {
            self.render_branch(&format!("{}-else", id), "nota-if-else", &else_style, else_branch, overrides, out)?;
        }
        out.push_str("</div>");
        Ok(())
    }

    fn render_branch(
        &mut self,
        id: &str,
        class: &str,
        display: &str,
        nodes: &[Node],
        overrides: &Overrides,
        out: &mut String,
    ) -> Result<()> {
        let _ = write!(out, "<div class=\"{}\" id=\"{}\"", class, id);
        if !display.is_empty() {
            let _ = write!(out, " style=\"display: {}\"", display);
        }
        out.push('>');
        for node in nodes {
            if let Node::Property(prop) = node {
                self.warn(format!(
                    "Property '{}' inside a conditional branch on line {} is ignored",
                    prop.name, prop.line
                ));
                continue;
            }
            self.render_node(node, overrides, None, out)?;
        }
        out.push_str("</div>");
        Ok(())
    }

    fn render_for(&mut self, for_node: &ForNode, overrides: &Overrides, out: &mut String) -> Result<()> {
        self.stats.loop_count += 1;
        let collection = self.collection_expression(&for_node.collection);

        let mut body = String::new();
        self.scope.push_loop(&for_node.iterator);
        for node in &for_node.body {
            self.render_node(node, overrides, None, &mut body)?;
        }
        self.scope.pop()?;
        let template = to_template_literal(&body);

        if self.scope.in_loop() {
            out.push_str(&runtime(&format!(
                "({} || []).map(({}) => `{}`).join('')",
                collection, for_node.iterator, template
            )));
            return Ok(());
        }

        let id = format!("{}{}", LOOP_ID_PREFIX, self.next_id());
        let _ = write!(out, "<div class=\"nota-for\" id=\"{}\"></div>", id);
        let _ = writeln!(
            self.js,
            "(() => {{\n  const el = document.getElementById('{id}');\n  if (!el) return;\n  \
             const render = ({iter}) => `{template}`;\n  \
             const list = (() => {{ try {{ return {collection}; }} catch (e) {{ return []; }} }})();\n  \
             el.innerHTML = (list || []).map(render).join('');\n}})();",
            id = id,
            iter = for_node.iterator,
            template = template,
            collection = collection,
        );
        Ok(())
    }

    /// JS expression for a loop's collection: a bound list literal, an outer
    /// iterator path, or the runtime global of that name
    fn collection_expression(&self, path: &str) -> String {
        let root = path.split('.').next().unwrap_or(path);
        if self.scope.is_iterator(root) {
            return path.to_string();
        }
        match self.scope.lookup_any(path) {
            Some(value) if value.starts_with('[') => value.to_string(),
            _ => path.to_string(),
        }
    }

    fn emit_states(&mut self, id: &str, base_type: &str, states: &Expression) {
        let Expression::List(items) = states else {
            self.warn(format!("'states' on '{}' must be a list of State entries", id));
            return;
        };

        let mut entries = Vec::new();
        for item in items {
            let Expression::StructInit { fields, .. } = item else {
                self.warn(format!("Ignoring malformed state entry on '{}'", id));
                continue;
            };

            let mut name = String::new();
            let mut when = None;
            let mut style = Vec::new();
            for (field, value) in fields {
                match field.as_str() {
                    "name" => name = state_label(value, &self.scope),
                    "when" => when = Some(state_event(&state_label(value, &self.scope)).to_string()),
                    other => {
                        let css = css_name(other, base_type);
                        let value = evaluate(value, &self.scope, other);
                        style.push(format!("'{}': {}", css, js_operand(&value)));
                    }
                }
            }

            let when = when.map_or_else(|| "null".to_string(), |w| format!("'{}'", escape_js_string(&w)));
            entries.push(format!(
                "{{name: '{}', when: {}, style: {{{}}}}}",
                escape_js_string(&name),
                when,
                style.join(", ")
            ));
        }

        self.stats.stateful_count += 1;
        let id = escape_js_string(id);
        let _ = writeln!(
            self.js,
            "nota_elements['{id}'] = new NotaComponent(document.getElementById('{id}'), {{states: [{}]}});",
            entries.join(", "),
            id = id,
        );
    }

    fn emit_delegate(&mut self, delegate: &DelegateNode, element_id: Option<&str>) {
        if self.scope.in_loop() {
            return;
        }
        let Some(id) = element_id else {
            self.warn(format!("Delegate on line {} has no enclosing element", delegate.line));
            return;
        };

        let events: Vec<String> = delegate
            .events
            .iter()
            .map(|event| format!("'{}'", escape_js_string(state_event(event))))
            .collect();
        let _ = writeln!(
            self.js,
            "nota.delegate('{}', [{}], '{}');",
            escape_js_string(id),
            events.join(", "),
            escape_js_string(&delegate.target)
        );
    }

    fn emit_struct(&mut self, definition: &StructDefinition) {
        let _ = writeln!(self.struct_js, "class {} {{\n  constructor(fields = {{}}) {{", definition.name);
        for field in &definition.fields {
            let default = field.default.as_ref().map_or_else(
                || "null".to_string(),
                |value| js_operand(&evaluate_raw(value, &self.scope)),
            );
            let _ = writeln!(
                self.struct_js,
                "    this.{name} = fields.{name} !== undefined ? fields.{name} : {default};",
                name = field.name,
                default = default
            );
        }
        self.struct_js.push_str("  }\n}\n");
    }
}

/// State names and events are written as bare words; they never resolve
/// against the component's own properties
fn state_label(value: &Expression, scope: &Scope) -> String {
    match value {
        Expression::Reference(path) => path.clone(),
        Expression::Literal { value, .. } => value.clone(),
        other => evaluate_raw(other, scope),
    }
}

/// `ui.FancyButton` becomes `ui-fancybutton`
fn class_slug(name: &str) -> String {
    name.replace('.', "-").to_ascii_lowercase()
}

fn escape_attribute(value: &str) -> String {
    map_text_segments(value, escape_html)
}
