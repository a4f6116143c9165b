//! `.box` plugin files.
//!
//! ```text
//! name("Cards") author("Jo") version("1.0")
//!
//! define Card(
//!     tag("div");
//!     content("<h3>{{title}}</h3>{{children}}");
//!     attr("class");
//!     default_css(".card{padding:10px}");
//!     allow_children("p", "span");
//!     deny_attrs("onclick");
//! )
//! ```
//!
//! Files are tokenized with the markup lexer, so field values must be double
//! quoted and the wildcard is written `"*"`.

use std::path::{Path, PathBuf};

use crate::dsl::lexer::Lexer;
use crate::dsl::token::{Token, TokenKind};

use super::descriptor::{ComponentDescriptor, NameSet};
use super::{ComponentSource, LoadError, PluginMetadata, Registry};

/// A parsed-on-demand `.box` plugin.
#[derive(Debug, Clone)]
pub struct BoxPlugin {
    path: PathBuf,
    source: String,
}

/// A `define` block with its raw fields.
#[derive(Debug, Clone, PartialEq)]
struct Definition {
    name: String,
    fields: Vec<(String, Vec<String>)>,
}

impl BoxPlugin {
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_source(path, source))
    }

    /// Wrap already-loaded text; `path` is only used in error messages.
    pub fn from_source(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }

    fn syntax_error(&self, token: Option<&Token>, message: impl Into<String>) -> LoadError {
        let (line, col) = token.map_or((0, 0), |t| (t.line, t.col));
        LoadError::Syntax {
            path: self.path.clone(),
            line,
            col,
            message: message.into(),
        }
    }

    fn parse(&self) -> Result<(PluginMetadata, Vec<Definition>), LoadError> {
        let tokens = Lexer::new(&self.source).tokenize();
        let mut metadata = PluginMetadata::default();
        let mut definitions = Vec::new();
        let mut pos = 0;

        while pos < tokens.len() {
            match tokens[pos].ident() {
                Some("define") => {
                    let (definition, next) = self.parse_define(&tokens, pos)?;
                    definitions.push(definition);
                    pos = next;
                }
                Some(key @ ("name" | "author" | "version" | "description")) => {
                    if let Some((values, next)) = field_values(&tokens, pos + 1) {
                        let value = values.into_iter().next().unwrap_or_default();
                        match key {
                            "name" => metadata.name = value,
                            "author" => metadata.author = value,
                            "version" => metadata.version = value,
                            _ => metadata.description = value,
                        }
                        pos = next;
                    } else {
                        pos += 1;
                    }
                }
                _ => pos += 1,
            }
        }

        Ok((metadata, definitions))
    }

    /// Parse `define Name( ... )` starting at the `define` keyword.
    fn parse_define(
        &self,
        tokens: &[Token],
        start: usize,
    ) -> Result<(Definition, usize), LoadError> {
        let name = tokens
            .get(start + 1)
            .and_then(Token::ident)
            .ok_or_else(|| {
                self.syntax_error(tokens.get(start), "expected component name after 'define'")
            })?
            .to_string();
        if tokens.get(start + 2).map(|t| &t.kind) != Some(&TokenKind::LParen) {
            return Err(self.syntax_error(
                tokens.get(start + 1),
                format!("expected '(' after 'define {name}'"),
            ));
        }

        let mut fields = Vec::new();
        let mut pos = start + 3;
        loop {
            let Some(token) = tokens.get(pos) else {
                return Err(self.syntax_error(
                    tokens.get(start),
                    format!("unterminated definition of '{name}'"),
                ));
            };
            match &token.kind {
                TokenKind::RParen => break,
                TokenKind::Ident(key) => match field_values(tokens, pos + 1) {
                    Some((values, next)) => {
                        fields.push((key.clone(), values));
                        pos = next;
                    }
                    None => pos += 1,
                },
                _ => pos += 1,
            }
        }

        Ok((Definition { name, fields }, pos + 1))
    }
}

/// Read `( "a", "b" )` starting at the `(`. Returns the strings and the
/// position after the closing `)`.
fn field_values(tokens: &[Token], start: usize) -> Option<(Vec<String>, usize)> {
    if tokens.get(start)?.kind != TokenKind::LParen {
        return None;
    }
    let mut values = Vec::new();
    let mut pos = start + 1;
    loop {
        let token = tokens.get(pos)?;
        match &token.kind {
            TokenKind::RParen => return Some((values, pos + 1)),
            TokenKind::Str(s) => values.push(s.clone()),
            TokenKind::Comma => {}
            _ => return None,
        }
        pos += 1;
    }
}

impl Definition {
    fn first(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    fn list(&self, key: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    fn into_descriptor(self) -> ComponentDescriptor {
        let mut d = ComponentDescriptor::new(&self.name);
        if let Some(tag) = self.first("tag") {
            d.tag = tag.to_string();
        }
        if let Some(content) = self.first("content") {
            d.content = content.to_string();
        }
        d.self_closing = self.first("selfclosing") == Some("true");
        d.default_css = self.first("default_css").map(unescape).unwrap_or_default();
        d.default_script = self.first("default_script").map(unescape).unwrap_or_default();
        if let Some(names) = self.list("allow_children") {
            d.allow_children = NameSet::from_names(names);
        }
        if let Some(names) = self.list("allow_attrs") {
            d.allow_attrs = NameSet::from_names(names);
        }
        if let Some(names) = self.list("deny_attrs") {
            d = d.with_deny_attrs(names);
        }
        for (key, values) in &self.fields {
            match key.as_str() {
                "attr" => d.attrs.extend(values.iter().cloned()),
                "tag" | "content" | "selfclosing" | "default_css" | "default_script"
                | "allow_children" | "allow_attrs" | "deny_attrs" => {}
                other => {
                    tracing::warn!(
                        component = %self.name,
                        field = other,
                        "unknown plugin field ignored"
                    )
                }
            }
        }
        d
    }
}

/// Resolve backslash escapes. Unknown sequences are kept verbatim.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

impl ComponentSource for BoxPlugin {
    fn populate(&self, registry: &mut Registry) -> Result<(), LoadError> {
        let (metadata, definitions) = self.parse()?;
        if !metadata.is_empty() {
            registry.add_metadata(metadata);
        }
        for definition in definitions {
            let name = definition.name.clone();
            tracing::debug!(
                component = %name,
                path = %self.path.display(),
                "registering component"
            );
            registry.register(&name, definition.into_descriptor());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(src: &str) -> Registry {
        let mut reg = Registry::new();
        BoxPlugin::from_source("test.box", src)
            .populate(&mut reg)
            .unwrap();
        reg
    }

    #[test]
    fn define_block_fields() {
        let reg = load(
            r#"
name("Cards") author("Jo") version("1.0") description("card widgets")
define Card(
    tag("section");
    content("<h3>{{title}}</h3>{{children}}");
    attr("class"); attr("id");
    default_css(".card{padding:10px}\n.card h3{margin:0}");
    allow_children("p", "Span");
    allow_attrs("*");
    deny_attrs("onclick")
)
"#,
        );
        let card = reg.get("card").unwrap();
        assert_eq!(card.tag, "section");
        assert_eq!(card.content, "<h3>{{title}}</h3>{{children}}");
        assert_eq!(card.attrs, vec!["class", "id"]);
        assert_eq!(card.default_css, ".card{padding:10px}\n.card h3{margin:0}");
        assert!(card.allow_children.permits("span"));
        assert!(!card.allow_children.permits("div"));
        assert_eq!(card.allow_attrs, NameSet::Any);
        assert!(card.denies("onclick"));

        assert_eq!(reg.metadata().len(), 1);
        assert_eq!(reg.metadata()[0].to_string(), "Cards v1.0 by Jo");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let reg = load(r#"define Badge(selfclosing("true"))"#);
        let badge = reg.get("badge").unwrap();
        assert_eq!(badge.tag, "badge");
        assert_eq!(badge.content, "{{text}}");
        assert!(badge.self_closing);
        assert!(reg.metadata().is_empty());
    }

    #[test]
    fn several_definitions_in_one_file() {
        let reg = load(
            r#"define A(tag("a")) define B(tag("b"); selfclosing("false"))"#,
        );
        assert_eq!(reg.len(), 2);
        assert!(!reg.get("b").unwrap().self_closing);
    }

    #[test]
    fn script_is_unescaped_but_content_is_not() {
        let reg = load(r#"define X(content("a\nb"); default_script("go();\nstop();"))"#);
        let x = reg.get("x").unwrap();
        assert_eq!(x.content, "a\\nb");
        assert_eq!(x.default_script, "go();\nstop();");
    }

    #[test]
    fn unterminated_define_is_an_error() {
        let mut reg = Registry::new();
        let err = BoxPlugin::from_source("bad.box", r#"define Card(tag("div");"#)
            .populate(&mut reg)
            .unwrap_err();
        assert!(matches!(err, LoadError::Syntax { .. }));
        assert!(err.to_string().contains("unterminated definition of 'Card'"));
    }

    #[test]
    fn define_without_parens_is_an_error() {
        let mut reg = Registry::new();
        let err = BoxPlugin::from_source("bad.box", "define Card tag")
            .populate(&mut reg)
            .unwrap_err();
        assert!(err.to_string().contains("expected '(' after 'define Card'"));
    }

    #[test]
    fn unescape_sequences() {
        assert_eq!(unescape(r"a\nb\tc\\d\q"), "a\nb\tc\\d\\q");
        assert_eq!(unescape(r"trailing\"), "trailing\\");
    }
}
