use super::Observation;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::watch;

/// Outcome of waiting on a task's dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Readiness {
    Ready,
    /// The round's task stream has ended and these indices were never
    /// scheduled, so they will never be observed.
    Dangling(Vec<u32>),
}

/// Observation map for one round, shared by every worker.
///
/// Each index is written at most once. Waiters are woken through the watch
/// channel whenever a new observation lands or the round's index set is
/// sealed.
pub(crate) struct ObservationBoard {
    observations: watch::Sender<BTreeMap<u32, Observation>>,
    scheduled: watch::Sender<Option<BTreeSet<u32>>>,
}

impl ObservationBoard {
    pub(crate) fn new(initial: BTreeMap<u32, Observation>) -> Self {
        Self {
            observations: watch::Sender::new(initial),
            scheduled: watch::Sender::new(None),
        }
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&BTreeMap<u32, Observation>) -> R) -> R {
        f(&self.observations.borrow())
    }

    /// Record `observation` under `idx`. Returns `false` when the index was
    /// already taken; the existing value is kept.
    pub(crate) fn publish(&self, idx: u32, observation: Observation) -> bool {
        self.observations.send_if_modified(|map| match map.entry(idx) {
            Entry::Vacant(slot) => {
                slot.insert(observation);
                true
            }
            Entry::Occupied(_) => false,
        })
    }

    /// Seal the round: no index outside `scheduled` will ever be produced.
    pub(crate) fn seal(&self, scheduled: BTreeSet<u32>) {
        self.scheduled.send_replace(Some(scheduled));
    }

    pub(crate) async fn wait_for(&self, dependencies: &BTreeSet<u32>) -> Readiness {
        let mut observed_rx = self.observations.subscribe();
        let mut sealed_rx = self.scheduled.subscribe();

        loop {
            let missing: Vec<u32> = {
                let map = observed_rx.borrow_and_update();
                dependencies
                    .iter()
                    .filter(|idx| !map.contains_key(idx))
                    .copied()
                    .collect()
            };
            if missing.is_empty() {
                return Readiness::Ready;
            }

            // Dangling only once every scheduled dependency has landed.
            let dangling = {
                let sealed = sealed_rx.borrow_and_update();
                sealed
                    .as_ref()
                    .is_some_and(|scheduled| missing.iter().all(|idx| !scheduled.contains(idx)))
            };
            if dangling {
                return Readiness::Dangling(missing);
            }

            let changed = tokio::select! {
                res = observed_rx.changed() => res,
                res = sealed_rx.changed() => res,
            };
            if changed.is_err() {
                return Readiness::Dangling(missing);
            }
        }
    }
}
