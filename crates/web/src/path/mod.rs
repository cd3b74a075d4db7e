//! A segment trie mapping route patterns to values.
//!
//! Patterns and paths are split on `/`; empty segments are dropped, so `//a//b/` and `/a/b`
//! are the same path. Literal segments match case-insensitively. In a trie created with
//! [`PathTrie::new`], a `*` segment is a wildcard matching any single segment and `\*` is a
//! literal star; [`PathTrie::literal`] turns wildcard semantics off.
//!
//! Resolution never backtracks: at every node a matching literal edge wins, and the wildcard
//! edge is only followed when no literal matches. Segments matched by wildcards are captured,
//! in order, into the returned [`PathParams`].
//!
//! # Example
//!
//! ```
//! use switchyard_web::path::PathTrie;
//!
//! let mut trie = PathTrie::new();
//! trie.insert("/users/*", "user");
//! trie.insert("/users/me", "me");
//!
//! let found = trie.resolve("/users/42").unwrap();
//! assert_eq!(*found.value, "user");
//! assert_eq!(found.params.get(0), Some("42"));
//!
//! assert_eq!(*trie.resolve("/USERS/ME").unwrap().value, "me");
//! ```

mod node;

use node::{Label, Node};
use switchyard_http::protocol::PathParams;

const ESCAPED_STAR: &str = "\\*";

#[derive(Debug)]
pub struct PathTrie<T> {
    root: Node<T>,
    wildcards: bool,
    len: usize,
}

/// A successful [`PathTrie::resolve`].
#[derive(Debug)]
pub struct Resolution<'t, T> {
    pub value: &'t T,
    pub params: PathParams,
}

impl<T> PathTrie<T> {
    /// A trie where `*` segments are wildcards.
    pub const fn new() -> Self {
        Self { root: Node::new(), wildcards: true, len: 0 }
    }

    /// A trie where every segment, `*` included, is a literal.
    pub const fn literal() -> Self {
        Self { root: Node::new(), wildcards: false, len: 0 }
    }

    #[inline]
    pub fn has_wildcards(&self) -> bool {
        self.wildcards
    }

    /// Number of patterns holding a value.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn labels<'p>(&self, pattern: &'p str) -> impl Iterator<Item = Label> + use<'p, T> {
        let wildcards = self.wildcards;
        segments(pattern).map(move |segment| match segment {
            "*" if wildcards => Label::Wildcard,
            ESCAPED_STAR if wildcards => Label::Literal("*".to_string()),
            literal => Label::Literal(literal.to_string()),
        })
    }

    /// Sets the value at `pattern`, returning the value it replaces.
    pub fn insert(&mut self, pattern: &str, value: T) -> Option<T> {
        let labels: Vec<Label> = self.labels(pattern).collect();
        let previous = self.root.descend_or_insert(labels).value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    fn node(&self, pattern: &str) -> Option<&Node<T>> {
        let mut node = &self.root;
        for label in self.labels(pattern) {
            node = node.child(&label)?;
        }
        Some(node)
    }

    /// The value stored at exactly `pattern`; `*` matches only the wildcard edge itself.
    pub fn get(&self, pattern: &str) -> Option<&T> {
        self.node(pattern)?.value.as_ref()
    }

    pub fn get_mut(&mut self, pattern: &str) -> Option<&mut T> {
        let labels: Vec<Label> = self.labels(pattern).collect();
        let mut node = &mut self.root;
        for label in &labels {
            node = node.child_mut(label)?;
        }
        node.value.as_mut()
    }

    pub fn get_or_insert_with<F: FnOnce() -> T>(&mut self, pattern: &str, f: F) -> &mut T {
        let labels: Vec<Label> = self.labels(pattern).collect();
        let node = self.root.descend_or_insert(labels);
        if node.value.is_none() {
            self.len += 1;
        }
        node.value.get_or_insert_with(f)
    }

    /// Resolves a request path to the most specific value, capturing wildcard segments.
    pub fn resolve(&self, path: &str) -> Option<Resolution<'_, T>> {
        let mut node = &self.root;
        let mut params = PathParams::new();

        for segment in segments(path) {
            node = match node.literal_child(segment) {
                Some(child) => child,
                None => {
                    let child = node.wildcard_child()?;
                    params.push(segment);
                    child
                }
            };
        }

        node.value.as_ref().map(|value| Resolution { value, params })
    }

    /// Every pattern holding a value, with its value, in pre-order.
    pub fn entries(&self) -> Vec<(String, &T)> {
        let mut entries = Vec::with_capacity(self.len);
        let mut stack = vec![(String::new(), &self.root)];

        while let Some((prefix, node)) = stack.pop() {
            if let Some(value) = &node.value {
                entries.push((display(&prefix), value));
            }
            // reversed, so the smallest label is popped first
            for edge in node.edges.iter().rev() {
                stack.push((format!("{prefix}/{}", self.render(&edge.label)), &edge.node));
            }
        }

        entries
    }

    /// Every pattern holding a value, in pre-order.
    pub fn keys(&self) -> Vec<String> {
        self.entries().into_iter().map(|(key, _)| key).collect()
    }

    /// The patterns of the direct children of `pattern`, with or without a value.
    pub fn child_keys(&self, pattern: &str) -> Vec<String> {
        let Some(node) = self.node(pattern) else {
            return Vec::new();
        };

        let prefix: String = self.labels(pattern).map(|label| format!("/{}", self.render(&label))).collect();
        node.edges.iter().map(|edge| format!("{prefix}/{}", self.render(&edge.label))).collect()
    }

    fn render<'l>(&self, label: &'l Label) -> &'l str {
        match label {
            Label::Wildcard => "*",
            Label::Literal(literal) if self.wildcards && literal == "*" => ESCAPED_STAR,
            Label::Literal(literal) => literal,
        }
    }
}

impl<T> Default for PathTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn display(prefix: &str) -> String {
    if prefix.is_empty() { "/".to_string() } else { prefix.to_string() }
}
