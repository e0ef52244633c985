//! Severity-based fan-out to output streams.
//!
//! The router only decides *where* a record goes; writing is the caller's
//! job. Overlapping ranges are allowed and duplicate records into every
//! matching stream. The router warns when one is added, since the
//! canonical topologies (one catch-all stream, or an info/debug split) are
//! disjoint.

use crate::level::{Level, LevelRange};

#[derive(Debug)]
pub struct Route<W> {
    name: String,
    range: LevelRange,
    target: W,
}

impl<W> Route<W> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn range(&self) -> LevelRange {
        self.range
    }

    pub fn target(&self) -> &W {
        &self.target
    }
}

#[derive(Debug)]
pub struct LevelRouter<W> {
    routes: Vec<Route<W>>,
}

impl<W> Default for LevelRouter<W> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<W> LevelRouter<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// One stream that accepts every severity.
    pub fn single(name: impl Into<String>, target: W) -> Self {
        let mut router = Self::new();
        router.push(name, LevelRange::all(), target);
        router
    }

    pub fn with_route(mut self, name: impl Into<String>, range: LevelRange, target: W) -> Self {
        self.push(name, range, target);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, range: LevelRange, target: W) {
        let name = name.into();
        for existing in self.routes.iter().filter(|r| r.range.overlaps(&range)) {
            tracing::warn!(
                stream = %name,
                range = %range,
                other = %existing.name,
                other_range = %existing.range,
                "Overlapping severity ranges, matching records will be duplicated"
            );
        }
        self.routes.push(Route {
            name,
            range,
            target,
        });
    }

    /// Every stream whose range contains `level`, in insertion order.
    pub fn route(&self, level: Level) -> impl Iterator<Item = &Route<W>> + '_ {
        self.routes.iter().filter(move |r| r.range.contains(level))
    }

    pub fn accepts(&self, level: Level) -> bool {
        self.route(level).next().is_some()
    }

    /// Least severe level any stream accepts.
    pub fn min_level(&self) -> Option<Level> {
        self.routes.iter().map(|r| r.range.min()).min()
    }

    pub fn routes(&self) -> &[Route<W>] {
        &self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn has_overlap(&self) -> bool {
        self.routes.iter().enumerate().any(|(i, a)| {
            self.routes[i + 1..]
                .iter()
                .any(|b| a.range.overlaps(&b.range))
        })
    }
}
