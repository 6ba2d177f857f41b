//! Field directive tree: the parsed shape of a protocol description.

/// Root of a protocol description: top-level directives in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectiveTree {
    pub nodes: Vec<Directive>,
}

/// One node of the description (e.g. "parse a mnemonic field named X").
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Directive kind as written (`eventdef`, `timestamp`, `condition`, ...).
    pub kind: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Directive>,
}

/// Directive kinds the compiler understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    EventDef,
    Timestamp,
    Integer,
    Mnemonic,
    Condition,
    ByteStream,
}

impl DirectiveKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eventdef" => Some(DirectiveKind::EventDef),
            "timestamp" => Some(DirectiveKind::Timestamp),
            "integer" => Some(DirectiveKind::Integer),
            "mnemonic" => Some(DirectiveKind::Mnemonic),
            "condition" => Some(DirectiveKind::Condition),
            "bytestream" => Some(DirectiveKind::ByteStream),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveKind::EventDef => "eventdef",
            DirectiveKind::Timestamp => "timestamp",
            DirectiveKind::Integer => "integer",
            DirectiveKind::Mnemonic => "mnemonic",
            DirectiveKind::Condition => "condition",
            DirectiveKind::ByteStream => "bytestream",
        }
    }
}

impl Directive {
    pub fn new(kind: impl Into<String>) -> Self {
        Directive {
            kind: kind.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder helper: append an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder helper: append a child directive.
    pub fn with_child(mut self, child: Directive) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First attribute in document order (the identifier/value pair of a condition).
    pub fn first_attribute(&self) -> Option<(&str, &str)> {
        self.attributes
            .first()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn kind(&self) -> Option<DirectiveKind> {
        DirectiveKind::from_name(&self.kind)
    }
}

impl DirectiveTree {
    pub fn new(nodes: Vec<Directive>) -> Self {
        DirectiveTree { nodes }
    }
}
