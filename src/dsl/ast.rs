//! Element tree produced by the parser.

/// One element invocation, e.g. `Card{"a","b"}(title("Hi"); Text(...))`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Name as written in the source. Registry lookups lowercase it.
    pub name: String,
    /// Properties in source order. Duplicate keys are kept.
    pub properties: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Raw values of the `{...}` data list.
    pub data: Vec<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_data<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data.extend(values.into_iter().map(Into::into));
        self
    }

    /// Lowercased name used for registry lookups.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// The effective value of `key`: the last occurrence wins.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Collapse duplicate keys into a lookup mapping.
    pub fn property_map(&self) -> PropertyMap {
        let mut map = PropertyMap::default();
        for (k, v) in &self.properties {
            map.insert(k.clone(), v.clone());
        }
        map
    }

    /// Pre-order walk over this element and all of its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Insertion-ordered string mapping.
///
/// A key keeps the position of its first insertion; re-inserting replaces
/// the value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyMap {
    entries: Vec<(String, String)>,
}

impl PropertyMap {
    pub fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut map = PropertyMap::default();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_property_shadows_earlier() {
        let el = Element::new("Card")
            .with_property("title", "first")
            .with_property("class", "x")
            .with_property("title", "second");
        assert_eq!(el.property("title"), Some("second"));

        let map = el.property_map();
        assert_eq!(map.len(), 2);
        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![("title", "second"), ("class", "x")]);
    }

    #[test]
    fn walk_is_preorder() {
        let tree = Element::new("A")
            .with_child(Element::new("B").with_child(Element::new("C")))
            .with_child(Element::new("D"));
        let mut names = Vec::new();
        tree.walk(&mut |e| names.push(e.name.as_str()));
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn key_is_lowercase() {
        assert_eq!(Element::new("MyCard").key(), "mycard");
    }
}
