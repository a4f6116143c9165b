//! Template renderer — turns one element tree into indented markup.
//!
//! Registered elements go through their descriptor: default class, data
//! attributes, allow/deny attribute policy, child filtering and content
//! template expansion. Unregistered elements are emitted literally under
//! their original name.

use crate::diagnostics::{Diagnostics, Warning};
use crate::registry::{ComponentDescriptor, Registry};

use super::ast::{Element, PropertyMap};
use super::error::CompileError;
use super::parser::MAX_NESTING_DEPTH;
use super::placeholder::{expand, resolve_data};

/// One indentation level.
pub const INDENT: &str = "  ";

const CHILDREN: &str = "{{children}}";
const TEXT_AND_CHILDREN: &str = "{{*}}";

pub struct Renderer<'a> {
    registry: &'a Registry,
    diagnostics: &'a mut Diagnostics,
    nesting: usize,
}

impl<'a> Renderer<'a> {
    pub fn new(registry: &'a Registry, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            registry,
            diagnostics,
            nesting: 0,
        }
    }

    /// Render `element` with its opening tag indented `depth` levels.
    pub fn render(&mut self, element: &Element, depth: usize) -> Result<String, CompileError> {
        if self.nesting >= MAX_NESTING_DEPTH {
            return Err(CompileError::render(format!(
                "<{}> is nested deeper than {MAX_NESTING_DEPTH} levels",
                element.name
            )));
        }
        self.nesting += 1;
        let registry = self.registry;
        let result = match registry.get(&element.name) {
            Some(descriptor) => self.render_component(element, descriptor, depth),
            None => self.render_literal(element, depth),
        };
        self.nesting -= 1;
        result
    }

    fn render_children(
        &mut self,
        children: &[&Element],
        depth: usize,
    ) -> Result<String, CompileError> {
        let mut lines = Vec::with_capacity(children.len());
        for child in children {
            lines.push(self.render(child, depth)?);
        }
        Ok(lines.join("\n"))
    }

    fn render_component(
        &mut self,
        element: &Element,
        descriptor: &ComponentDescriptor,
        depth: usize,
    ) -> Result<String, CompileError> {
        let pad = INDENT.repeat(depth);
        let component = element.key();
        let tag = &descriptor.tag;

        let candidates = effective_properties(element, descriptor);
        let props = self.filter_attributes(&component, descriptor, candidates);
        let attrs = serialize_attributes(descriptor, &props);
        let open = if attrs.is_empty() {
            format!("<{tag}")
        } else {
            format!("<{tag} {attrs}")
        };

        if descriptor.self_closing {
            return Ok(format!("{pad}{open} />"));
        }

        let children = self.filter_children(&component, descriptor, &element.children);
        let consumes_children =
            descriptor.content.contains(CHILDREN) || descriptor.content.contains(TEXT_AND_CHILDREN);

        // Embedded children start at column zero; the content lines they end
        // up in are indented as a whole below.
        let embedded = if consumes_children {
            self.render_children(&children, 0)?
        } else {
            String::new()
        };

        let content = expand(&descriptor.content, |name| {
            if let Some(value) = resolve_data(name, &element.data) {
                return Some(value);
            }
            if let Some(value) = props.get(name) {
                return Some(value.to_string());
            }
            match name {
                "*" => {
                    let text = props.get("text").map(str::trim).unwrap_or_default();
                    Some(join_nonempty(text, &embedded))
                }
                "children" => Some(embedded.clone()),
                _ => None,
            }
        });
        let content = content.trim();

        if content.is_empty() && children.is_empty() {
            return Ok(format!("{pad}{open}></{tag}>"));
        }
        if children.is_empty() && !content.contains('\n') {
            return Ok(format!("{pad}{open}>{content}</{tag}>"));
        }

        let mut parts = vec![format!("{pad}{open}>")];
        push_indented(&mut parts, content, &pad);
        if !children.is_empty() && !consumes_children {
            parts.push(self.render_children(&children, depth + 1)?);
        }
        parts.push(format!("{pad}</{tag}>"));
        Ok(parts.join("\n"))
    }

    fn render_literal(&mut self, element: &Element, depth: usize) -> Result<String, CompileError> {
        let pad = INDENT.repeat(depth);
        let name = &element.name;
        let text = element.property("text").map(str::trim).unwrap_or_default();

        if text.is_empty() && element.children.is_empty() {
            return Ok(format!("{pad}<{name}></{name}>"));
        }

        let mut parts = vec![format!("{pad}<{name}>")];
        push_indented(&mut parts, text, &pad);
        if !element.children.is_empty() {
            let children: Vec<&Element> = element.children.iter().collect();
            parts.push(self.render_children(&children, depth + 1)?);
        }
        parts.push(format!("{pad}</{name}>"));
        Ok(parts.join("\n"))
    }

    /// Drop denied attributes, then anything outside an explicit allow list.
    fn filter_attributes(
        &mut self,
        component: &str,
        descriptor: &ComponentDescriptor,
        props: PropertyMap,
    ) -> PropertyMap {
        let mut kept = PropertyMap::default();
        for (key, value) in props.iter() {
            if descriptor.denies(key) {
                self.diagnostics.warn(Warning::DeniedAttribute {
                    attribute: key.to_string(),
                    component: component.to_string(),
                });
                continue;
            }
            if !descriptor.allow_attrs.permits(key) {
                self.diagnostics.warn(Warning::DisallowedAttribute {
                    attribute: key.to_string(),
                    component: component.to_string(),
                });
                continue;
            }
            kept.insert(key.to_string(), value.to_string());
        }
        kept
    }

    fn filter_children<'e>(
        &mut self,
        component: &str,
        descriptor: &ComponentDescriptor,
        children: &'e [Element],
    ) -> Vec<&'e Element> {
        let mut kept = Vec::with_capacity(children.len());
        for child in children {
            if descriptor.allow_children.permits(&child.name) {
                kept.push(child);
            } else {
                self.diagnostics.warn(Warning::DisallowedChild {
                    child: child.name.clone(),
                    component: component.to_string(),
                });
            }
        }
        kept
    }
}

/// Source properties plus the synthesized default class and data attributes.
fn effective_properties(element: &Element, descriptor: &ComponentDescriptor) -> PropertyMap {
    let mut props = element.property_map();

    let has_class = props.get("class").is_some_and(|c| !c.is_empty());
    if !descriptor.default_css.is_empty() && descriptor.declares("class") && !has_class {
        props.insert("class".to_string(), element.key());
    }

    if !element.data.is_empty() {
        props.insert("data".to_string(), element.data.join(","));
        for (i, value) in element.data.iter().enumerate() {
            props.insert(format!("data-{}", i + 1), value.clone());
        }
    }

    props
}

/// `key="value"` pairs for the opening tag. `text` is never an attribute.
fn serialize_attributes(descriptor: &ComponentDescriptor, props: &PropertyMap) -> String {
    props
        .iter()
        .filter(|(key, _)| *key != "text")
        .filter(|(key, _)| {
            if descriptor.allow_attrs.is_restrictive() {
                descriptor.allow_attrs.permits(key)
            } else if !descriptor.attrs.is_empty() {
                descriptor.declares(key)
            } else {
                true
            }
        })
        .map(|(key, value)| format!("{key}=\"{value}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_nonempty(text: &str, children: &str) -> String {
    match (text.is_empty(), children.is_empty()) {
        (false, false) => format!("{text}\n{children}"),
        (false, true) => text.to_string(),
        _ => children.to_string(),
    }
}

fn push_indented(parts: &mut Vec<String>, block: &str, pad: &str) {
    if block.is_empty() {
        return;
    }
    for line in block.lines() {
        if line.is_empty() {
            parts.push(String::new());
        } else {
            parts.push(format!("{pad}{INDENT}{line}"));
        }
    }
}
