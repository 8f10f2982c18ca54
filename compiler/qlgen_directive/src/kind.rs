//! Directive kinds and their evaluation priority.

use std::fmt;

/// Evaluation order of a directive's fragment. Lower runs first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    pub const STRUCTURE: Priority = Priority(0);
    pub const SCANNER: Priority = Priority(1);
    pub const FUNCTION: Priority = Priority(2);
    /// Malformed directives run last so every well-formed fragment before
    /// them is still checked.
    pub const MALFORMED: Priority = Priority(u8::MAX);

    pub fn value(self) -> u8 {
        self.0
    }
}

/// The closed set of directive shapes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Structure,
    Scanner,
    Function,
    Insert,
    InsertBatch,
    QueryAutogen,
}

impl DirectiveKind {
    /// Matching order. The first kind whose marker matches a declaration
    /// wins.
    pub const ALL: [DirectiveKind; 6] = [
        DirectiveKind::Structure,
        DirectiveKind::Scanner,
        DirectiveKind::Function,
        DirectiveKind::Insert,
        DirectiveKind::InsertBatch,
        DirectiveKind::QueryAutogen,
    ];

    /// Name of the marker type in the `qlgen` crate.
    pub fn marker(self) -> &'static str {
        match self {
            DirectiveKind::Structure => "Structure",
            DirectiveKind::Scanner => "Scanner",
            DirectiveKind::Function => "Function",
            DirectiveKind::Insert => "Insert",
            DirectiveKind::InsertBatch => "InsertBatch",
            DirectiveKind::QueryAutogen => "QueryAutogen",
        }
    }

    pub fn from_marker(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.marker() == name)
    }

    pub fn priority(self) -> Priority {
        match self {
            DirectiveKind::Structure => Priority::STRUCTURE,
            DirectiveKind::Scanner => Priority::SCANNER,
            DirectiveKind::Function
            | DirectiveKind::Insert
            | DirectiveKind::InsertBatch
            | DirectiveKind::QueryAutogen => Priority::FUNCTION,
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(Priority::STRUCTURE < Priority::SCANNER);
        assert!(Priority::SCANNER < Priority::FUNCTION);
        assert!(Priority::FUNCTION < Priority::MALFORMED);
    }

    #[test]
    fn test_kind_priorities() {
        let priorities: Vec<u8> = DirectiveKind::ALL
            .iter()
            .map(|kind| kind.priority().value())
            .collect();
        assert_eq!(priorities, vec![0, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn test_marker_round_trip() {
        for kind in DirectiveKind::ALL {
            assert_eq!(DirectiveKind::from_marker(kind.marker()), Some(kind));
        }
        assert_eq!(DirectiveKind::from_marker("Insertbatch"), None);
    }
}
