//! Branch Oracle
//!
//! Tracks which outcomes of which conditionals were exercised across the
//! concrete executions of a campaign.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  worker 1 ─┐                                                  │
//! │  worker 2 ─┼─► on_branch(loc, bool) ─► BranchPoint bits (OR)  │
//! │  worker N ─┘                                  │               │
//! │  fixture  ───► assert_reached(loc, true) ─► tag counters      │
//! │                                               ▼               │
//! │  driver   ◄── is_complete(loc) / report() ◄───┘               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Branch point state is an atomic bit set, so concurrent reports of the
//! same outcome merge without coordination. The assertion primitive is
//! telemetry only: it never panics and never alters the caller.

mod location;
mod report;

pub use location::{BranchState, LocationId, Polarity};
pub use report::{BranchPointReport, BranchReport, BranchSummary, TagReport};

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::panic::Location;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
struct PointCell {
    bits: AtomicU8,
    true_hits: AtomicU64,
    false_hits: AtomicU64,
}

#[derive(Debug, Default)]
struct TagCell {
    true_tags: AtomicU64,
    false_tags: AtomicU64,
}

/// Marker emitted by the no-op assertion primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssertionTag {
    /// Where the assertion was called
    pub location: LocationId,
    /// Literal passed to the assertion
    pub literal: bool,
}

/// Campaign-wide branch coverage tracker
#[derive(Debug, Default)]
pub struct BranchOracle {
    points: RwLock<HashMap<LocationId, Arc<PointCell>>>,
    tags: RwLock<HashMap<LocationId, Arc<TagCell>>>,
    labels: RwLock<HashMap<LocationId, String>>,
}

impl BranchOracle {
    /// Create an empty oracle
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty oracle ready to be shared between workers
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn cell<T: Default>(
        map: &RwLock<HashMap<LocationId, Arc<T>>>,
        location: LocationId,
    ) -> Arc<T> {
        if let Some(cell) = map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&location)
        {
            return Arc::clone(cell);
        }
        let mut points = map.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(points.entry(location).or_default())
    }

    /// Record one evaluation of the condition at `location`
    ///
    /// Creates the branch point on first use. Re-reaching a polarity only
    /// bumps its hit counter.
    pub fn on_branch(&self, location: LocationId, outcome: bool) {
        let polarity = Polarity::from(outcome);
        let cell = Self::cell(&self.points, location);
        let previous = cell.bits.fetch_or(polarity.bit(), Ordering::AcqRel);
        let counter = match polarity {
            Polarity::True => &cell.true_hits,
            Polarity::False => &cell.false_hits,
        };
        let _ = counter.fetch_add(1, Ordering::Relaxed);

        let before = BranchState::from_bits(previous);
        let after = before.after(polarity);
        if before != after {
            tracing::trace!(%location, ?before, ?after, "branch point advanced");
        }
    }

    /// No-op assertion marking `location` as a reached goal
    ///
    /// Always succeeds. Both arms of a tracked conditional pass `true`;
    /// the literal is recorded but never checked.
    pub fn assert_reached(&self, location: LocationId, literal: bool) {
        let cell = Self::cell(&self.tags, location);
        let counter = if literal {
            &cell.true_tags
        } else {
            &cell.false_tags
        };
        let _ = counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an [`AssertionTag`]
    pub fn tag(&self, tag: AssertionTag) {
        self.assert_reached(tag.location, tag.literal);
    }

    /// Current state of the branch point at `location`
    #[must_use]
    pub fn state(&self, location: LocationId) -> BranchState {
        self.points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&location)
            .map_or(BranchState::Unreached, |cell| {
                BranchState::from_bits(cell.bits.load(Ordering::Acquire))
            })
    }

    /// Both outcomes at `location` were reached at least once
    #[must_use]
    pub fn is_complete(&self, location: LocationId) -> bool {
        self.state(location).is_complete()
    }

    /// Every branch point in `locations` is complete
    #[must_use]
    pub fn all_complete<'a>(
        &self,
        locations: impl IntoIterator<Item = &'a LocationId>,
    ) -> bool {
        locations.into_iter().all(|loc| self.is_complete(*loc))
    }

    /// Assertion tag counts at `location`, as `(true, false)`
    #[must_use]
    pub fn tags(&self, location: LocationId) -> (u64, u64) {
        self.tags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&location)
            .map_or((0, 0), |cell| {
                (
                    cell.true_tags.load(Ordering::Relaxed),
                    cell.false_tags.load(Ordering::Relaxed),
                )
            })
    }

    /// Attach a human-readable label to a location for reports
    pub fn label(&self, location: LocationId, label: impl Into<String>) {
        let _ = self
            .labels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(location, label.into());
    }

    /// Locations of every branch point seen so far
    #[must_use]
    pub fn branch_points(&self) -> Vec<LocationId> {
        let mut locations: Vec<LocationId> = self
            .points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        locations.sort_unstable();
        locations
    }

    /// State of every branch point seen so far
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<LocationId, BranchState> {
        self.points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(location, cell)| {
                (
                    *location,
                    BranchState::from_bits(cell.bits.load(Ordering::Acquire)),
                )
            })
            .collect()
    }

    /// Forget all branch points and tags; labels are kept
    pub fn reset(&self) {
        self.points
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.tags
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!("branch oracle reset");
    }

    /// Point-in-time coverage report
    #[must_use]
    pub fn report(&self) -> BranchReport {
        let labels = self.labels.read().unwrap_or_else(PoisonError::into_inner);
        let points = self
            .points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(location, cell)| BranchPointReport {
                location: *location,
                label: labels.get(location).cloned(),
                state: BranchState::from_bits(cell.bits.load(Ordering::Acquire)),
                true_hits: cell.true_hits.load(Ordering::Relaxed),
                false_hits: cell.false_hits.load(Ordering::Relaxed),
            })
            .collect();
        let tags = self
            .tags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(location, cell)| TagReport {
                location: *location,
                label: labels.get(location).cloned(),
                true_tags: cell.true_tags.load(Ordering::Relaxed),
                false_tags: cell.false_tags.load(Ordering::Relaxed),
            })
            .collect();
        BranchReport::new(points, tags)
    }

    /// Install this oracle as the target of [`reached`] on the current thread
    ///
    /// The previous oracle, if any, is restored when the guard drops.
    #[must_use]
    pub fn enter(self: &Arc<Self>) -> OracleGuard {
        let previous = CURRENT.with(|current| current.replace(Some(Arc::clone(self))));
        OracleGuard { previous }
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Arc<BranchOracle>>> = const { RefCell::new(None) };
}

/// Restores the previously installed oracle on drop
#[derive(Debug)]
pub struct OracleGuard {
    previous: Option<Arc<BranchOracle>>,
}

impl Drop for OracleGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| {
            let _ = current.replace(previous);
        });
    }
}

/// Assertion primitive for fixture code
///
/// Tags the caller's source position on the oracle installed with
/// [`BranchOracle::enter`]. Without an installed oracle this does nothing.
#[track_caller]
pub fn reached(literal: bool) {
    let location = LocationId::from_source(Location::caller());
    CURRENT.with(|current| {
        if let Some(oracle) = current.borrow().as_ref() {
            oracle.assert_reached(location, literal);
        }
    });
}
