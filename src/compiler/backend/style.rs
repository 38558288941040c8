//! Mapping of evaluated properties onto CSS declarations and data attributes

use crate::core::constants::{event_attribute, CSS_WHITELIST, RESERVED_PROPERTIES};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleOutput {
    pub declarations: Vec<(String, String)>,
    pub data_attributes: Vec<(String, String)>,
}

impl StyleOutput {
    /// `k: v; k: v;` as used in rules and `style` attributes
    pub fn declaration_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(name, value)| format!("{}: {};", name, value))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn push(&mut self, name: &str, value: impl Into<String>) {
        self.declarations.push((name.to_string(), value.into()));
    }
}

/// CSS property name for a whitelisted Nota property
pub fn css_name(property: &str, type_name: &str) -> String {
    match property {
        "color" if type_name == "Text" => "color".to_string(),
        "color" => "background-color".to_string(),
        "index" => "z-index".to_string(),
        "spacing" => "gap".to_string(),
        "radius" => "border-radius".to_string(),
        other => other.to_string(),
    }
}

/// Build the declarations for one element from its merged, evaluated properties
pub fn build_styles(type_name: &str, properties: &[(String, String)]) -> StyleOutput {
    let mut output = StyleOutput::default();
    let lookup = |name: &str| {
        properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };

    for (name, value) in properties {
        if RESERVED_PROPERTIES.contains(&name.as_str()) || event_attribute(name).is_some() {
            continue;
        }
        match name.as_str() {
            "x" | "y" | "position" => {}
            _ if CSS_WHITELIST.contains(&name.as_str()) => output.push(&css_name(name, type_name), value.clone()),
            _ => output
                .data_attributes
                .push((format!("data-{}", name.to_ascii_lowercase()), value.clone())),
        }
    }

    apply_positioning(&mut output, lookup("x"), lookup("y"), lookup("position"));
    output
}

fn apply_positioning(output: &mut StyleOutput, x: Option<&str>, y: Option<&str>, position: Option<&str>) {
    let Some(position) = position.map(str::trim) else {
        if x.is_none() && y.is_none() {
            output.push("position", "relative");
            return;
        }
        if let Some(x) = x {
            output.push("left", x);
        }
        if let Some(y) = y {
            output.push("top", y);
        }
        output.push("position", "absolute");
        return;
    };

    match position {
        "center" => {
            output.push("left", "50%");
            output.push("top", "50%");
            output.push("transform", "translate(-50%, -50%)");
            output.push("position", "absolute");
        }
        "left top" | "top left" => {
            output.push("left", x.unwrap_or("0"));
            output.push("top", y.unwrap_or("0"));
            output.push("position", "absolute");
        }
        "relative" | "absolute" | "fixed" | "sticky" | "static" => {
            if let Some(x) = x {
                output.push("left", x);
            }
            if let Some(y) = y {
                output.push("top", y);
            }
            output.push("position", position);
        }
        other => {
            let fragments: Vec<&str> = other
                .split_whitespace()
                .filter(|word| matches!(*word, "left" | "right" | "top" | "bottom"))
                .collect();
            if fragments.is_empty() {
                output.push("position", other);
                return;
            }
            for fragment in fragments {
                let offset = match fragment {
                    "left" | "right" => x.unwrap_or("0"),
                    _ => y.unwrap_or("0"),
                };
                output.push(fragment, offset);
            }
            output.push("position", "absolute");
        }
    }
}
