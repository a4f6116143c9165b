//! Component descriptors — the template and policy record of one component.

use std::collections::BTreeSet;

use serde::Deserialize;

/// Template used when a descriptor does not provide one.
pub const DEFAULT_CONTENT: &str = "{{text}}";

/// A set of names that may also be the wildcard `*`.
///
/// An empty set places no restriction, same as the wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "NameSetRepr")]
pub enum NameSet {
    Any,
    #[default]
    Unrestricted,
    Only(BTreeSet<String>),
}

impl NameSet {
    /// Build from raw names. Any `*` entry turns the whole set into the wildcard.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.as_ref().trim();
            if name == "*" {
                return NameSet::Any;
            }
            if !name.is_empty() {
                set.insert(name.to_lowercase());
            }
        }
        if set.is_empty() {
            NameSet::Unrestricted
        } else {
            NameSet::Only(set)
        }
    }

    /// True for an explicit, non-wildcard list.
    pub fn is_restrictive(&self) -> bool {
        matches!(self, NameSet::Only(_))
    }

    /// Case-insensitive membership. Non-restrictive sets permit everything.
    pub fn permits(&self, name: &str) -> bool {
        match self {
            NameSet::Any | NameSet::Unrestricted => true,
            NameSet::Only(set) => set.contains(&name.to_lowercase()),
        }
    }
}

/// YAML shape: either a single string (`"*"`) or a list of names.
#[derive(Deserialize)]
#[serde(untagged)]
enum NameSetRepr {
    One(String),
    Many(Vec<String>),
}

impl From<NameSetRepr> for NameSet {
    fn from(repr: NameSetRepr) -> Self {
        match repr {
            NameSetRepr::One(name) => NameSet::from_names([name]),
            NameSetRepr::Many(names) => NameSet::from_names(names),
        }
    }
}

/// Everything the renderer needs to know about one component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDescriptor {
    /// Output tag name.
    pub tag: String,
    /// Content template with `{{...}}` placeholders.
    pub content: String,
    pub self_closing: bool,
    /// Attributes the component advertises, in declaration order.
    pub attrs: Vec<String>,
    pub default_css: String,
    pub default_script: String,
    pub allow_children: NameSet,
    pub allow_attrs: NameSet,
    /// Lowercased attribute names that are always dropped.
    pub deny_attrs: BTreeSet<String>,
}

impl ComponentDescriptor {
    /// A descriptor with the defaults for component `name`: tag is the
    /// lowercased name and the template renders the `text` property.
    pub fn new(name: &str) -> Self {
        Self {
            tag: name.to_lowercase(),
            content: DEFAULT_CONTENT.to_string(),
            self_closing: false,
            attrs: Vec::new(),
            default_css: String::new(),
            default_script: String::new(),
            allow_children: NameSet::Unrestricted,
            allow_attrs: NameSet::Unrestricted,
            deny_attrs: BTreeSet::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn self_closing(mut self, self_closing: bool) -> Self {
        self.self_closing = self_closing;
        self
    }

    pub fn with_attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attrs.extend(attrs.into_iter().map(Into::into));
        self
    }

    pub fn with_default_css(mut self, css: impl Into<String>) -> Self {
        self.default_css = css.into();
        self
    }

    pub fn with_default_script(mut self, script: impl Into<String>) -> Self {
        self.default_script = script.into();
        self
    }

    pub fn with_allow_children(mut self, names: NameSet) -> Self {
        self.allow_children = names;
        self
    }

    pub fn with_allow_attrs(mut self, names: NameSet) -> Self {
        self.allow_attrs = names;
        self
    }

    pub fn with_deny_attrs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.deny_attrs
            .extend(names.into_iter().map(|n| n.as_ref().trim().to_lowercase()));
        self
    }

    /// Whether `attr` is one of the advertised attributes.
    pub fn declares(&self, attr: &str) -> bool {
        self.attrs.iter().any(|a| a.eq_ignore_ascii_case(attr))
    }

    pub fn denies(&self, attr: &str) -> bool {
        self.deny_attrs.contains(&attr.to_lowercase())
    }
}
