//! Matched directives awaiting generation.

use std::fmt;

use crate::errors::DirectiveError;
use crate::kind::{DirectiveKind, Priority};
use crate::location::Location;
use crate::registry::{FragmentError, GenerationEnv};

/// Deferred fragment computation.
pub type FragmentGenerator =
    Box<dyn FnOnce(&GenerationEnv<'_>) -> Result<String, DirectiveError>>;

/// One matched directive.
///
/// Results are sorted by `priority` (stable, so equal priorities keep source
/// order) and their generators run in that order.
pub struct CompileResult {
    pub location: Location,
    pub priority: Priority,
    pub kind: DirectiveKind,
    /// Name of the directive function.
    pub name: String,
    generator: FragmentGenerator,
}

impl CompileResult {
    pub fn new(
        location: Location,
        kind: DirectiveKind,
        name: String,
        fragment: Box<dyn crate::registry::Fragment>,
    ) -> Self {
        let generator_name = name.clone();
        CompileResult {
            location,
            priority: kind.priority(),
            kind,
            name,
            generator: Box::new(move |env| {
                fragment.generate(env).map_err(|err| match err {
                    FragmentError::Message(message) => DirectiveError::Generate {
                        kind,
                        name: generator_name,
                        message,
                    },
                    FragmentError::Dialect(source) => DirectiveError::Dialect {
                        kind,
                        name: generator_name,
                        source,
                    },
                })
            }),
        }
    }

    /// A recognised directive with an invalid shape. Sorted last; its
    /// generator always fails.
    pub fn malformed(location: Location, kind: DirectiveKind, name: String, reason: String) -> Self {
        let error = DirectiveError::Malformed {
            location: location.clone(),
            kind,
            name: name.clone(),
            reason,
        };
        CompileResult {
            location,
            priority: Priority::MALFORMED,
            kind,
            name,
            generator: Box::new(move |_| Err(error)),
        }
    }

    pub fn is_malformed(&self) -> bool {
        self.priority == Priority::MALFORMED
    }

    /// Produce the fragment text against the current evaluation state.
    pub fn generate(self, env: &GenerationEnv<'_>) -> Result<String, DirectiveError> {
        (self.generator)(env)
    }
}

impl fmt::Debug for CompileResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileResult")
            .field("location", &self.location)
            .field("priority", &self.priority)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
