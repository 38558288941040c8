// FILE: src/core/constants.rs

/// Source file extension used when resolving dotted module imports
pub const SOURCE_EXTENSION: &str = "nota";

/// Keyword that introduces a component template definition
pub const DEFINITION_KEYWORD: &str = "Item";

/// Units recognised when merging a number with a trailing identifier
pub const KNOWN_UNITS: &[&str] = &["px", "em", "rem", "vw", "vh", "%", "s", "ms", "deg", "rad"];

/// Properties whose bare numbers are implicitly pixels
pub const DIMENSIONAL_PROPERTIES: &[&str] = &[
    "width", "height", "padding", "spacing", "radius", "x", "y", "left", "top", "right", "bottom",
];

/// Property names that are emitted as CSS declarations
pub const CSS_WHITELIST: &[&str] = &[
    "width", "height", "color", "radius", "spacing", "padding", "index", "left", "top", "right",
    "bottom", "position", "display", "opacity", "border",
];

/// Properties consumed by the generator itself and never emitted as styles
pub const RESERVED_PROPERTIES: &[&str] = &["text", "id", "states", "onClick", "onHover"];

/// Reserved reference paths that always evaluate to the full extent of the container
pub const PARENT_EXTENT_PATHS: &[&str] = &["parent.width", "parent.height"];

/// Prefix used by the `parent.<name>` reference form
pub const PARENT_PREFIX: &str = "parent.";

// Generated class and id prefixes
pub const CLASS_PREFIX: &str = "nota";
pub const ELEMENT_CLASS_PREFIX: &str = "nota-e";
pub const ELEMENT_ID_PREFIX: &str = "nota-el-";
pub const CONDITIONAL_ID_PREFIX: &str = "nota-if-";
pub const LOOP_ID_PREFIX: &str = "nota-for-";

/// Maximum fractional digits kept when folding arithmetic
pub const MAX_FRACTION_DIGITS: usize = 4;

/// Maps a Nota event property or `when:` name to its DOM event
pub fn dom_event_name(name: &str) -> &str {
    match name {
        "onClick" | "click" => "click",
        "onHover" | "hover" => "mouseenter",
        "onLeave" | "leave" => "mouseleave",
        "onPress" | "press" => "mousedown",
        "onRelease" | "release" => "mouseup",
        "onFocus" | "focus" => "focus",
        "onBlur" | "blur" => "blur",
        "onChange" | "change" => "change",
        other => other,
    }
}

/// Maps an `on<Event>` property to its HTML attribute, e.g. `onClick` to `onclick`
pub fn event_attribute(property: &str) -> Option<String> {
    let event = property.strip_prefix("on")?;
    if !event.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    let mapped = dom_event_name(property);
    if mapped == property {
        Some(format!("on{}", event.to_ascii_lowercase()))
    } else {
        Some(format!("on{}", mapped))
    }
}

/// Maps a component type to its HTML tag
pub fn html_tag(type_name: &str) -> &'static str {
    match type_name {
        "App" => "body",
        "Text" => "span",
        _ => "div",
    }
}

pub fn is_dimensional(property: &str) -> bool {
    DIMENSIONAL_PROPERTIES.contains(&property)
}

pub fn is_known_unit(unit: &str) -> bool {
    KNOWN_UNITS.contains(&unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_mapping() {
        assert_eq!(html_tag("App"), "body");
        assert_eq!(html_tag("Text"), "span");
        assert_eq!(html_tag("Rect"), "div");
        assert_eq!(html_tag("ui.FancyButton"), "div");
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(dom_event_name("onClick"), "click");
        assert_eq!(dom_event_name("onHover"), "mouseenter");
        assert_eq!(dom_event_name("dblclick"), "dblclick");
        assert_eq!(event_attribute("onClick").as_deref(), Some("onclick"));
        assert_eq!(event_attribute("onHover").as_deref(), Some("onmouseenter"));
        assert_eq!(event_attribute("onDblclick").as_deref(), Some("ondblclick"));
        assert_eq!(event_attribute("online"), None);
        assert_eq!(event_attribute("color"), None);
    }

    #[test]
    fn test_dimensional_set_excludes_stacking_and_opacity() {
        assert!(is_dimensional("width"));
        assert!(is_dimensional("y"));
        assert!(!is_dimensional("index"));
        assert!(!is_dimensional("opacity"));
    }
}
