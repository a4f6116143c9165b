//! Diagnostics — the ordered side-channel of soft compilation warnings.
//!
//! Every warning is recorded in encounter order and also logged through
//! `tracing` so a subscriber sees it as it happens.

use std::fmt;

/// A non-fatal policy drop.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Attribute listed in the component's `deny_attrs`.
    DeniedAttribute { attribute: String, component: String },
    /// Attribute missing from an explicit `allow_attrs` list.
    DisallowedAttribute { attribute: String, component: String },
    /// Child missing from an explicit `allow_children` list.
    DisallowedChild { child: String, component: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DeniedAttribute {
                attribute,
                component,
            } => write!(
                f,
                "attribute '{attribute}' on <{component}> denied by plugin rules; dropping"
            ),
            Warning::DisallowedAttribute {
                attribute,
                component,
            } => write!(
                f,
                "attribute '{attribute}' not in allow_attrs for <{component}>; dropping"
            ),
            Warning::DisallowedChild { child, component } => write!(
                f,
                "child '<{child}>' not allowed inside '<{component}>' by plugin rules; dropping"
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it.
    pub fn warn(&mut self, warning: Warning) {
        match &warning {
            Warning::DeniedAttribute {
                attribute,
                component,
            }
            | Warning::DisallowedAttribute {
                attribute,
                component,
            } => tracing::warn!(%component, %attribute, "{warning}"),
            Warning::DisallowedChild { child, component } => {
                tracing::warn!(%component, %child, "{warning}")
            }
        }
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }
}
