//! Name → specification registry.
//!
//! Program templates refer to other node types only by identifier, so the
//! library must hold every referenced specification before anything that
//! uses it is instantiated.

use crate::config::EngineConfig;
use crate::error::{InstantiateError, LibraryError};
use crate::graph::Graph;
use crate::instantiate::Replay;
use crate::primitive::Primitive;
use crate::program::Program;
use crate::specification::Specification;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Knobs for one instantiation.
#[derive(Debug, Clone, Default)]
pub struct InstantiateOptions {
    pub config: EngineConfig,
    /// Build every node with its trace flag set
    pub trace: bool,
    /// Which implementation of the root specification to replay
    pub implementation: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Library {
    specifications: FxHashMap<Arc<str>, Specification>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding the native adder and bit register.
    pub fn with_primitives() -> Self {
        let mut library = Self::new();
        for primitive in Primitive::ALL {
            library
                .specifications
                .insert(Arc::from(primitive.identifier()), Specification::primitive(primitive));
        }
        library
    }

    /// Register `spec`. An existing identifier is left untouched.
    pub fn add_specification(&mut self, spec: Specification) -> Result<(), LibraryError> {
        if self.specifications.contains_key(spec.identifier()) {
            log::warn!("specification `{}` already exists, keeping the first", spec.identifier());
            return Err(LibraryError::DuplicateSpecification(spec.identifier().to_string()));
        }
        log::debug!("adding specification `{}`", spec.identifier());
        self.specifications.insert(spec.identifier_arc(), spec);
        Ok(())
    }

    pub fn contains_specification(&self, identifier: &str) -> bool {
        self.specifications.contains_key(identifier)
    }

    pub(crate) fn get(&self, identifier: &str) -> Option<&Specification> {
        self.specifications.get(identifier)
    }

    pub fn select_specification(&self, identifier: &str) -> Result<&Specification, LibraryError> {
        self.get(identifier).ok_or_else(|| {
            log::warn!("no specification `{identifier}` in library");
            LibraryError::UnknownSpecification(identifier.to_string())
        })
    }

    pub fn select_specification_mut(
        &mut self,
        identifier: &str,
    ) -> Result<&mut Specification, LibraryError> {
        self.specifications.get_mut(identifier).ok_or_else(|| {
            log::warn!("no specification `{identifier}` in library");
            LibraryError::UnknownSpecification(identifier.to_string())
        })
    }

    /// Identifiers in lexicographic order.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.specifications.keys().map(|id| id.as_ref()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn specifications(&self) -> impl Iterator<Item = &Specification> {
        self.specifications.values()
    }

    pub fn len(&self) -> usize {
        self.specifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specifications.is_empty()
    }

    pub fn instantiate(&self, identifier: &str) -> Result<Program, InstantiateError> {
        self.instantiate_with(identifier, &InstantiateOptions::default())
    }

    /// Same graph as [`Library::instantiate`], with every node traced.
    pub fn instantiate_debug(&self, identifier: &str) -> Result<Program, InstantiateError> {
        self.instantiate_with(
            identifier,
            &InstantiateOptions {
                trace: true,
                ..Default::default()
            },
        )
    }

    pub fn instantiate_with(
        &self,
        identifier: &str,
        options: &InstantiateOptions,
    ) -> Result<Program, InstantiateError> {
        let spec = self.select_specification(identifier)?;
        let mut graph = Graph::new();
        let mut replay = Replay::new(self, &mut graph, options.config.max_nesting_depth, options.trace);
        let root = replay.instantiate(spec, options.implementation, 0)?;
        let issues = replay.into_issues();

        log::debug!(
            "instantiated `{}`: {} nodes, {} variables, {} issue(s)",
            identifier,
            graph.instance_count(),
            graph.variable_count(),
            issues.len()
        );
        Ok(Program::new(graph, root, options.config.clone(), issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_is_rejected_and_first_kept() {
        let mut library = Library::with_primitives();
        let mut first = Specification::program("p", 1, 1);
        first.add_implementation().unwrap().add_bug("+", "a");
        library.add_specification(first).unwrap();

        let second = Specification::program("p", 2, 2);
        assert_eq!(
            library.add_specification(second),
            Err(LibraryError::DuplicateSpecification("p".into()))
        );

        let kept = library.select_specification("p").unwrap();
        assert_eq!(kept.num_data_in(), 1);
        assert_eq!(kept.implementations().len(), 1);
    }

    #[test]
    fn unknown_lookup_fails() {
        let library = Library::with_primitives();
        assert_eq!(
            library.select_specification("nope").unwrap_err(),
            LibraryError::UnknownSpecification("nope".into())
        );
        assert!(matches!(
            library.instantiate("nope"),
            Err(InstantiateError::Library(LibraryError::UnknownSpecification(_)))
        ));
    }

    #[test]
    fn identifiers_are_sorted() {
        let library = Library::with_primitives();
        assert_eq!(library.identifiers(), vec!["!", "+"]);
        assert_eq!(library.len(), 2);
    }

    #[test]
    fn self_nesting_is_fatal() {
        let mut library = Library::with_primitives();
        let mut spec = Specification::program("loop", 0, 1);
        spec.add_implementation().unwrap().add_bug("loop", "inner");
        library.add_specification(spec).unwrap();

        let options = InstantiateOptions {
            config: EngineConfig {
                max_nesting_depth: 8,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            library.instantiate_with("loop", &options).unwrap_err(),
            InstantiateError::NestingTooDeep {
                specification: "loop".into(),
                limit: 8,
            }
        );
    }
}
