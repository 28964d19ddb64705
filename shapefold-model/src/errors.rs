use std::fmt::{Debug, Display, Formatter};

/// The kind of type graph error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A reference does not designate a node of the graph under construction.
    InvalidReference,
    /// A type was used where another kind of type is expected.
    InvalidType,
    /// A forwarding reference was never resolved to an actual node.
    UnresolvedForward,
    /// A forwarding reference was resolved more than once.
    DuplicateForward,
    /// A union holds several members of the same kind.
    DuplicateUnionKind,
    /// The groups of types submitted for replacement are malformed.
    InvalidGroup,
    /// A replacement did not resolve the forwarding reference it was given.
    InvalidReplacement,
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Kind::InvalidReference => "invalid type reference",
            Kind::InvalidType => "invalid type",
            Kind::UnresolvedForward => "unresolved forwarding reference",
            Kind::DuplicateForward => "forwarding reference resolved twice",
            Kind::DuplicateUnionKind => "union members must have distinct kinds",
            Kind::InvalidGroup => "invalid replacement group",
            Kind::InvalidReplacement => "invalid replacement",
        };
        f.write_str(s)
    }
}

/// The type graph error type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {msg}")]
pub struct Error {
    pub kind: Kind,
    msg: String,
    details: Vec<String>,
}

impl Error {
    pub fn new(kind: Kind, msg: &str) -> Self {
        Error {
            kind,
            msg: msg.to_owned(),
            details: Vec::new(),
        }
    }

    /// Attaches a detail to the error.
    pub fn with<T: Debug>(mut self, detail: &T) -> Self {
        self.details.push(format!("{detail:?}"));
        self
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }
}

pub type Result<T> = std::result::Result<T, Error>;
