//! Owned element tree for RDML documents.
//!
//! # Responsibility
//! - Hold one parsed document as an ordered, owned tree.
//! - Provide the read and mutation primitives used by the repository layer.
//!
//! # Invariants
//! - Child order is document order; inserting one child never reorders others.
//! - `name` is the qualified name as written, `namespace` the resolved URI.
//! - Elements created by the core inherit the prefix of their parent, so the
//!   serialized tree stays bound to the same namespace.

/// Namespace URI of every RDML element.
pub const RDML_NAMESPACE: &str = "http://www.rdml.org";

/// One-based line/column of an element start tag in its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

/// One element node with attributes, optional text and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
    position: Option<SourcePosition>,
}

impl Element {
    /// Creates a detached element with a qualified name and resolved namespace.
    pub fn new(name: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            position: None,
        }
    }

    /// Creates an unprefixed element in the RDML namespace.
    pub fn rdml(local_name: &str) -> Self {
        Self::new(local_name, Some(RDML_NAMESPACE))
    }

    /// Creates a detached element meant to become a child of `self`.
    ///
    /// The new element reuses this element's prefix and namespace.
    pub fn new_child(&self, local_name: &str) -> Self {
        let name = match self.prefix() {
            Some(prefix) => format!("{prefix}:{local_name}"),
            None => local_name.to_string(),
        };
        Self::new(name, self.namespace.as_deref())
    }

    /// Builder-style text setter.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns whether this element is `local_name` in the RDML namespace.
    pub fn is_rdml(&self, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(RDML_NAMESPACE) && self.local_name() == local_name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Attributes in source order, namespace declarations included.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Sets or replaces one attribute, keeping the original attribute order.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(name, _)| name == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Inserts `child` at `index`, clamped to the current child count.
    ///
    /// Returns the index the child landed at.
    pub fn insert_child(&mut self, index: usize, child: Element) -> usize {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
        index
    }

    /// Detaches and returns the child at `index`.
    ///
    /// # Panics
    /// - When `index` is not below the child count, like `Vec::remove`.
    pub fn remove_child(&mut self, index: usize) -> Element {
        self.children.remove(index)
    }

    pub fn position(&self) -> Option<SourcePosition> {
        self.position
    }

    pub fn set_position(&mut self, position: Option<SourcePosition>) {
        self.position = position;
    }
}
