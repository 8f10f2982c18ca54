//! Directive errors.

use qlgen_context::DialectError;

use crate::kind::DirectiveKind;
use crate::location::Location;

/// A directive could not produce its fragment.
///
/// Messages do not include the location; the package compiler attaches it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    /// The marker was recognised but the declaration does not have the
    /// directive's shape.
    #[error("malformed {kind} directive `{name}`: {reason}")]
    Malformed {
        location: Location,
        kind: DirectiveKind,
        name: String,
        reason: String,
    },
    /// The declaration is well formed but its fragment cannot be rendered
    /// against the current evaluation context.
    #[error("{kind} directive `{name}`: {message}")]
    Generate {
        kind: DirectiveKind,
        name: String,
        message: String,
    },
    #[error("{kind} directive `{name}`: dialect error")]
    Dialect {
        kind: DirectiveKind,
        name: String,
        #[source]
        source: DialectError,
    },
}
