//! A small document model for the Graphviz DOT language, plus a builder
//! that lays out either machine form as a left-to-right state diagram.

use std::fmt;

use itertools::Itertools;
use uuid::Uuid;

use crate::alphabet::Symbol;
use crate::error::Error;
use crate::math::Map;

/// An attribute of a graph, node or edge, rendered as `name="value"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    name: String,
    value: String,
}

impl Attr {
    /// Creates an attribute. Fails with [`Error::AttrNameEmpty`] if the
    /// name is empty.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::AttrNameEmpty);
        }
        Ok(Self {
            name,
            value: value.into(),
        })
    }

    /// The attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attribute value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.value)
    }
}

fn bracketed(attrs: &[Attr]) -> String {
    if attrs.is_empty() {
        String::new()
    } else {
        format!(" [{}]", attrs.iter().join(" "))
    }
}

/// A node statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    attrs: Vec<Attr>,
}

impl Node {
    /// Creates a node. Fails with [`Error::NodeNameEmpty`] if the name is
    /// empty.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::NodeNameEmpty);
        }
        Ok(Self {
            name,
            attrs: Vec::new(),
        })
    }

    /// The node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends an attribute.
    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, bracketed(&self.attrs))
    }
}

/// An edge statement `start -> end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    start: String,
    end: String,
    attrs: Vec<Attr>,
}

impl Edge {
    /// Creates an edge between two node names. Fails with
    /// [`Error::InvalidEdge`] if either endpoint is missing.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Result<Self, Error> {
        let (start, end) = (start.into(), end.into());
        if start.is_empty() || end.is_empty() {
            return Err(Error::InvalidEdge);
        }
        Ok(Self {
            start,
            end,
            attrs: Vec::new(),
        })
    }

    /// The source node name.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// The target node name.
    pub fn end(&self) -> &str {
        &self.end
    }

    /// Appends an attribute.
    pub fn with_attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}{}", self.start, self.end, bracketed(&self.attrs))
    }
}

/// A `digraph { … }` document: attributes first, then nodes, then edges,
/// each on its own two-space indented line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Digraph {
    attrs: Vec<Attr>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Digraph {
    /// Appends a graph attribute.
    pub fn push_attr(&mut self, attr: Attr) {
        self.attrs.push(attr);
    }

    /// Appends a node.
    pub fn push_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Appends an edge.
    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Renders the document as DOT source.
    pub fn as_dot(&self) -> String {
        let mut out = String::from("digraph {\n");
        for a in &self.attrs {
            out.push_str(&format!("  {a}\n"));
        }
        for n in &self.nodes {
            out.push_str(&format!("  {n}\n"));
        }
        for e in &self.edges {
            out.push_str(&format!("  {e}\n"));
        }
        out.push('}');
        out
    }
}

impl fmt::Display for Digraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_dot())
    }
}

/// A fresh name for an invisible start-point node: the alphabetic characters
/// of a random UUID. Valid in DOT and practically collision-free.
fn point_name() -> String {
    loop {
        let name: String = Uuid::new_v4()
            .to_string()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        if !name.is_empty() {
            return name;
        }
    }
}

/// Lays out a finite automaton as a DOT document: `rankdir="LR"`, accept
/// states drawn as double circles, other states as circles, one labeled
/// edge per transition triple, and an invisible point node with an
/// unlabeled edge into each start state.
#[derive(Debug, Default)]
pub struct FaDotBuilder {
    start_states: Vec<String>,
    states: Vec<String>,
    accept_states: Vec<String>,
    transitions: Vec<(String, Symbol, String)>,
}

impl FaDotBuilder {
    /// Declares the start states.
    pub fn with_start_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.start_states = states.into_iter().map(Into::into).collect();
        self
    }

    /// Declares all states.
    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = states.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the accept states.
    pub fn with_accept_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept_states = states.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one transition triple.
    pub fn with_transition(
        mut self,
        from: impl Into<String>,
        symbol: Symbol,
        to: impl Into<String>,
    ) -> Self {
        self.transitions.push((from.into(), symbol, to.into()));
        self
    }

    /// Builds the document. Fails with [`Error::MissingState`] if a start
    /// state was never declared, and with [`Error::InvalidEdge`] if a
    /// transition endpoint was never declared.
    pub fn build(self) -> Result<Digraph, Error> {
        let mut g = Digraph::default();
        g.push_attr(Attr::new("rankdir", "LR")?);

        // accept states first so the double-circle shape wins for states
        // that are both declared and accepting
        let mut nodes: Map<String, Node> = Map::new();
        for state in &self.accept_states {
            let node = Node::new(state.clone())?.with_attr(Attr::new("shape", "doublecircle")?);
            nodes.insert(state.clone(), node);
        }
        for state in &self.states {
            if nodes.contains_key(state) {
                continue;
            }
            let node = Node::new(state.clone())?.with_attr(Attr::new("shape", "circle")?);
            nodes.insert(state.clone(), node);
        }

        for start in &self.start_states {
            if !nodes.contains_key(start) {
                return Err(Error::MissingState);
            }
            let point = Node::new(point_name())?.with_attr(Attr::new("shape", "point")?);
            let entry = Edge::new(point.name(), start.clone())?;
            g.push_node(point);
            g.push_edge(entry);
        }

        for node in nodes.values() {
            g.push_node(node.clone());
        }

        for (from, symbol, to) in &self.transitions {
            if !nodes.contains_key(from) || !nodes.contains_key(to) {
                return Err(Error::InvalidEdge);
            }
            let edge =
                Edge::new(from.clone(), to.clone())?.with_attr(Attr::new("label", symbol.to_string())?);
            g.push_edge(edge);
        }
        Ok(g)
    }
}
