//! Layered evaluation scope
//!
//! Each rendered component pushes a frame holding its typed property
//! defaults and its assigned properties. Loop bodies push a frame that marks
//! the loop variable as an active iterator.
//!
//! A reference sees every binding of the innermost component. Outer
//! components only expose names declared with a typed `property`, so their
//! plain style properties never capture a bare CSS keyword below them.

use crate::error::{CompilerError, Result};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub enum FrameKind {
    Global,
    Component,
    Loop { iterator: String },
}

#[derive(Debug, Clone)]
struct Frame {
    kind: FrameKind,
    bindings: HashMap<String, String>,
    /// Names visible to descendant components
    shared: HashSet<String>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            bindings: HashMap::new(),
            shared: HashSet::new(),
        }
    }

    fn exposes(&self, name: &str) -> bool {
        self.kind == FrameKind::Global || self.shared.contains(name)
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    frames: Vec<Frame>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(FrameKind::Global)],
        }
    }

    pub fn push_component(&mut self) {
        self.frames.push(Frame::new(FrameKind::Component));
    }

    pub fn push_loop(&mut self, iterator: impl Into<String>) {
        self.frames.push(Frame::new(FrameKind::Loop {
            iterator: iterator.into(),
        }));
    }

    pub fn pop(&mut self) -> Result<()> {
        if self.frames.len() <= 1 {
            return Err(CompilerError::codegen("Cannot pop the global scope"));
        }
        self.frames.pop();
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind a name in the innermost frame
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.bindings.insert(name.into(), value.into());
        }
    }

    /// Bind a name in the innermost frame and expose it to descendants
    pub fn define_shared(&mut self, name: impl Into<String>, value: impl Into<String>) {
        if let Some(frame) = self.frames.last_mut() {
            let name = name.into();
            frame.shared.insert(name.clone());
            frame.bindings.insert(name, value.into());
        }
    }

    /// Resolve a name from the innermost component, then through the
    /// declared properties of its ancestors
    pub fn lookup(&self, name: &str) -> Option<&str> {
        let mut inside_component = true;
        for frame in self.frames.iter().rev() {
            if inside_component || frame.exposes(name) {
                if let Some(value) = frame.bindings.get(name) {
                    return Some(value);
                }
            }
            if frame.kind == FrameKind::Component {
                inside_component = false;
            }
        }
        None
    }

    /// Resolve a name through every frame, ignoring visibility
    pub fn lookup_any(&self, name: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(name))
            .map(String::as_str)
    }

    /// Look a name up starting from the frame enclosing the innermost component
    pub fn lookup_parent(&self, name: &str) -> Option<&str> {
        let innermost = self
            .frames
            .iter()
            .rposition(|frame| frame.kind == FrameKind::Component)?;
        self.frames[..innermost]
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(name))
            .map(String::as_str)
    }

    /// True when `name` is the variable of an enclosing loop and no inner
    /// component binding shadows it
    pub fn is_iterator(&self, name: &str) -> bool {
        for frame in self.frames.iter().rev() {
            if let FrameKind::Loop { iterator } = &frame.kind {
                if iterator == name {
                    return true;
                }
            }
            if frame.bindings.contains_key(name) {
                return false;
            }
        }
        false
    }

    pub fn in_loop(&self) -> bool {
        self.frames
            .iter()
            .any(|frame| matches!(frame.kind, FrameKind::Loop { .. }))
    }
}
