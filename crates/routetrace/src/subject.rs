//! Subjects and their expected routes.
//!
//! A [`Subject`] names a unit under test (a module and a routine) and owns
//! the ordered list of [`Route`]s it is expected to call. Insertion order
//! *is* the expected call order; routes are never reordered.
//!
//! The [`Registry`] owns every live subject and hands out [`SubjectId`]
//! handles. Clearing the registry releases all subjects together and
//! invalidates every handle issued before the clear.

use crate::config::Limits;
use log::{debug, warn};
use std::fmt;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════
//  Error type
// ═══════════════════════════════════════════════════════════════════════

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid argument: {0} must not be empty")]
    InvalidArgument(&'static str),

    #[error("Capacity exceeded: limit of {limit} reached")]
    CapacityExceeded { limit: usize },

    #[error("Unknown subject handle {0}")]
    UnknownSubject(SubjectId),
}

// ═══════════════════════════════════════════════════════════════════════
//  Routes and subjects
// ═══════════════════════════════════════════════════════════════════════

/// One expected callee.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    routine: String,
}

impl Route {
    pub fn routine(&self) -> &str {
        &self.routine
    }
}

impl AsRef<str> for Route {
    fn as_ref(&self) -> &str {
        &self.routine
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.routine)
    }
}

/// A unit under test plus the routes it is expected to take, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    module: String,
    routine: String,
    routes: Vec<Route>,
}

impl Subject {
    /// Create a subject with no routes. Both names must be non-empty.
    pub fn new(module: &str, routine: &str) -> Result<Self, RegistryError> {
        if module.is_empty() {
            return Err(RegistryError::InvalidArgument("module name"));
        }
        if routine.is_empty() {
            return Err(RegistryError::InvalidArgument("routine name"));
        }
        Ok(Self {
            module: module.to_string(),
            routine: routine.to_string(),
            routes: Vec::new(),
        })
    }

    /// Append a route, honouring `max_routes` (`None` = unbounded).
    pub fn push_route(&mut self, routine: &str, max_routes: Option<usize>) -> Result<(), RegistryError> {
        if routine.is_empty() {
            return Err(RegistryError::InvalidArgument("routine name"));
        }
        if let Some(limit) = max_routes {
            if self.routes.len() >= limit {
                return Err(RegistryError::CapacityExceeded { limit });
            }
        }
        self.routes.push(Route {
            routine: routine.to_string(),
        });
        Ok(())
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn routine(&self) -> &str {
        &self.routine
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route_names(&self) -> Vec<&str> {
        self.routes.iter().map(Route::routine).collect()
    }

    /// `module::routine`, for reports.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.module, self.routine)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{} [", self.module, self.routine)?;
        for (i, route) in self.routes.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", route)?;
        }
        f.write_str("]")
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Registry
// ═══════════════════════════════════════════════════════════════════════

/// Handle to a subject inside a [`Registry`].
///
/// Carries the registry generation it was issued in, so a handle kept
/// across a clear no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectId {
    generation: u32,
    index: usize,
}

impl SubjectId {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// Every live subject, in creation order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    subjects: Vec<Subject>,
    limits: Limits,
    generation: u32,
}

impl Registry {
    pub fn new(limits: Limits) -> Self {
        Self {
            subjects: Vec::new(),
            limits,
            generation: 0,
        }
    }

    /// Register a new subject.
    ///
    /// Fails without registering anything if either name is empty or the
    /// registry is at its subject limit.
    pub fn create_subject(&mut self, module: &str, routine: &str) -> Result<SubjectId, RegistryError> {
        if let Some(limit) = self.limits.max_subjects {
            if self.subjects.len() >= limit {
                warn!("Subject {}::{} rejected: registry holds {} subjects", module, routine, limit);
                return Err(RegistryError::CapacityExceeded { limit });
            }
        }

        let subject = Subject::new(module, routine)?;
        let id = SubjectId {
            generation: self.generation,
            index: self.subjects.len(),
        };
        debug!("Registered subject {} as {}", subject.qualified_name(), id);
        self.subjects.push(subject);
        Ok(id)
    }

    /// Append a route to a registered subject.
    ///
    /// Leaves the subject untouched when the handle is stale, the name is
    /// empty, or the subject is at its route limit.
    pub fn add_route(&mut self, id: SubjectId, routine: &str) -> Result<(), RegistryError> {
        let max_routes = self.limits.max_routes;
        let subject = self.get_mut(id).ok_or(RegistryError::UnknownSubject(id))?;
        match subject.push_route(routine, max_routes) {
            Ok(()) => {
                debug!("Route {} added to {}", routine, subject.qualified_name());
                Ok(())
            }
            Err(e) => {
                warn!("Route {:?} not added to {}: {}", routine, subject.qualified_name(), e);
                Err(e)
            }
        }
    }

    /// Look up a subject. `None` for handles from another generation.
    pub fn get(&self, id: SubjectId) -> Option<&Subject> {
        if id.generation != self.generation {
            return None;
        }
        self.subjects.get(id.index)
    }

    fn get_mut(&mut self, id: SubjectId) -> Option<&mut Subject> {
        if id.generation != self.generation {
            return None;
        }
        self.subjects.get_mut(id.index)
    }

    /// Release every subject and its routes. Safe to call when empty.
    pub fn clear(&mut self) {
        if !self.subjects.is_empty() {
            debug!("Releasing {} subjects", self.subjects.len());
        }
        self.subjects.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
