use std::cmp::Ordering;

/// The label of a trie edge: one path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Label {
    Literal(String),
    Wildcard,
}

impl Label {
    /// Literals compare case-insensitively; the wildcard sorts after every literal.
    pub(crate) fn order(&self, other: &Label) -> Ordering {
        match (self, other) {
            (Label::Literal(a), Label::Literal(b)) => compare_ignore_case(a, b),
            (Label::Literal(_), Label::Wildcard) => Ordering::Less,
            (Label::Wildcard, Label::Literal(_)) => Ordering::Greater,
            (Label::Wildcard, Label::Wildcard) => Ordering::Equal,
        }
    }
}

pub(crate) fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars().flat_map(char::to_lowercase).cmp(b.chars().flat_map(char::to_lowercase))
}

#[derive(Debug)]
pub(crate) struct Edge<T> {
    pub(crate) label: Label,
    pub(crate) node: Node<T>,
}

#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: Option<T>,
    // sorted by `Label::order`, so a wildcard edge can only be the last one
    pub(crate) edges: Vec<Edge<T>>,
}

impl<T> Node<T> {
    pub(crate) const fn new() -> Self {
        Self { value: None, edges: Vec::new() }
    }

    fn position(&self, label: &Label) -> Result<usize, usize> {
        self.edges.binary_search_by(|edge| edge.label.order(label))
    }

    pub(crate) fn child(&self, label: &Label) -> Option<&Node<T>> {
        self.position(label).ok().map(|i| &self.edges[i].node)
    }

    pub(crate) fn child_mut(&mut self, label: &Label) -> Option<&mut Node<T>> {
        self.position(label).ok().map(|i| &mut self.edges[i].node)
    }

    /// Returns the child behind `label`, creating it if missing.
    ///
    /// A literal differing only in case reuses the existing edge and keeps its original label.
    pub(crate) fn child_or_insert(&mut self, label: Label) -> &mut Node<T> {
        let index = match self.position(&label) {
            Ok(i) => i,
            Err(i) => {
                self.edges.insert(i, Edge { label, node: Node::new() });
                i
            }
        };
        &mut self.edges[index].node
    }

    pub(crate) fn descend_or_insert(&mut self, labels: impl IntoIterator<Item = Label>) -> &mut Node<T> {
        let mut node = self;
        for label in labels {
            node = node.child_or_insert(label);
        }
        node
    }

    /// The child matching `segment` as a literal, case-insensitively.
    pub(crate) fn literal_child(&self, segment: &str) -> Option<&Node<T>> {
        self.edges
            .binary_search_by(|edge| match &edge.label {
                Label::Literal(literal) => compare_ignore_case(literal, segment),
                Label::Wildcard => Ordering::Greater,
            })
            .ok()
            .map(|i| &self.edges[i].node)
    }

    pub(crate) fn wildcard_child(&self) -> Option<&Node<T>> {
        self.edges.last().filter(|edge| edge.label == Label::Wildcard).map(|edge| &edge.node)
    }
}
