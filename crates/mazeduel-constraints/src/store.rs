//! Per-session constraint logs with conflict resolution.
//!
//! Both roles watch the same duel and record what they see, so the two logs
//! routinely contain contradictory or duplicated observations (one side
//! "escaping" while the other was actually blocked or teleported away, a
//! "showing up" that was really a wall being shot down). Every insertion runs
//! the same five steps:
//!
//! 1. **Pre-filter**: drop `escaping` if the other role recorded `blocking` or
//!    `teleport` within [`SUPPRESSION_WINDOW`]; drop `showingUp` if the other
//!    role recorded `teleport` within the same window.
//! 2. **Append** and persist the role's snapshot.
//! 3. **Escaping pair**: when a wall blocked the line of sight, the two roles'
//!    most recent `escaping` entries within [`PAIR_WINDOW`] of each other are
//!    the same event; the entry of the role closer to the wall is removed.
//! 4. **Wall cancellation**: a `showingUp` within [`PAIR_WINDOW`] of a
//!    `wallBetweenDestroyed` in the same log removes both, and stops here.
//! 5. **Post-filter**: `blocking` / `teleport` retroactively remove the other
//!    role's `escaping` within [`SUPPRESSION_WINDOW`]; `teleport` also removes
//!    its `showingUp`.
//!
//! At session end [`ConstraintStore::merge`] appends both logs to the
//! cumulative merged log.

use crate::{
    Action, Constraint, Obstruction, Role,
    schema::ConstraintRecord,
    storage::{self, ConstraintStorage, Slot, StorageError},
};

/// Window for suppressing and retroactively removing conflicting entries.
pub const SUPPRESSION_WINDOW: f64 = 0.5;

/// Window for pairing `escaping` entries and cancelling `showingUp`.
pub const PAIR_WINDOW: f64 = 0.3;

/// Result of [`ConstraintStore::add_constraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum InsertOutcome {
    /// Dropped before appending because the other role recorded `by`.
    Suppressed { by: Action },
    /// Appended, then removed together with a matching `wallBetweenDestroyed`.
    Cancelled,
    Recorded {
        /// Role whose `escaping` was removed as the closer half of a pair.
        /// May be the inserting role, in which case the new entry is gone.
        pair_pruned: Option<Role>,
        /// Entries removed from the other role's log by the post-filter.
        post_filtered: usize,
    },
}

/// The two per-role logs of a session plus access to the merged log.
#[derive(Debug)]
pub struct ConstraintStore<S> {
    storage: S,
    logs: [Vec<Constraint>; 2],
}

impl<S> ConstraintStore<S>
where
    S: ConstraintStorage,
{
    /// Starts a fresh session: both role snapshots are deleted and both logs
    /// start empty. The merged log is left untouched.
    pub fn start_session(mut storage: S) -> Result<Self, StorageError> {
        for role in Role::ALL {
            storage.remove(Slot::Role(role))?;
            tracing::debug!(%role, "cleared role snapshot");
        }
        Ok(Self {
            storage,
            logs: [vec![], vec![]],
        })
    }

    /// Continues a session from the role snapshots in `storage`.
    ///
    /// An unreadable snapshot starts that role empty.
    pub fn resume(storage: S) -> Result<Self, StorageError> {
        let server = storage::load_or_empty(&storage, Slot::Role(Role::Server))?;
        let client = storage::load_or_empty(&storage, Slot::Role(Role::Client))?;
        tracing::debug!(server = server.len(), client = client.len(), "resumed session");
        Ok(Self {
            storage,
            logs: [server, client],
        })
    }

    #[must_use]
    pub fn log(&self, role: Role) -> &[Constraint] {
        &self.logs[role.index()]
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Reads the cumulative merged log. Missing or unreadable logs are empty.
    pub fn merged_log(&self) -> Result<Vec<Constraint>, StorageError> {
        storage::load_or_empty(&self.storage, Slot::Merged)
    }

    /// Records `constraint` for `role`, applying the conflict rules described
    /// in the [module documentation](self).
    ///
    /// `obstruction` is only consulted for `escaping`.
    pub fn add_constraint(
        &mut self,
        role: Role,
        constraint: Constraint,
        obstruction: Obstruction,
    ) -> Result<InsertOutcome, StorageError> {
        let action = constraint.action();
        let timestamp = constraint.timestamp();
        let other = role.other();

        if let Some(by) = self.suppressing_action(other, &constraint) {
            tracing::debug!(%role, %action, timestamp, %by, "suppressed by other role");
            return Ok(InsertOutcome::Suppressed { by });
        }

        self.logs[role.index()].push(constraint);
        tracing::debug!(%role, %action, timestamp, "recorded constraint");
        self.persist(role)?;

        let mut pair_pruned = None;
        if action == Action::Escaping
            && let Some(closer) = obstruction.closer()
            && self.prune_escaping_pair(closer)
        {
            self.persist(closer)?;
            pair_pruned = Some(closer);
        }

        if action == Action::ShowingUp && self.cancel_wall_destruction(role, timestamp) {
            self.persist(role)?;
            return Ok(InsertOutcome::Cancelled);
        }

        let post_filtered = self.post_filter(other, action, timestamp);
        if post_filtered > 0 {
            self.persist(other)?;
        }

        Ok(InsertOutcome::Recorded {
            pair_pruned,
            post_filtered,
        })
    }

    /// Appends both roles' logs (server first) to the merged log and returns
    /// its new length.
    ///
    /// Records already in the merged log are carried over as stored, even
    /// those that no longer decode. The role logs are not cleared, so merge
    /// once per session.
    pub fn merge(&mut self) -> Result<usize, StorageError> {
        let mut merged = storage::load_file_or_empty(&self.storage, Slot::Merged)?;
        let previous = merged.constraints.len();
        for role in Role::ALL {
            merged
                .constraints
                .extend(self.log(role).iter().map(ConstraintRecord::from));
        }
        storage::save_file(&mut self.storage, Slot::Merged, &merged)?;
        let total = merged.constraints.len();
        tracing::info!(
            previous,
            added = total - previous,
            total,
            "merged constraint logs"
        );
        Ok(total)
    }

    fn persist(&mut self, role: Role) -> Result<(), StorageError> {
        storage::save(&mut self.storage, Slot::Role(role), &self.logs[role.index()])
    }

    fn suppressing_action(&self, other: Role, constraint: &Constraint) -> Option<Action> {
        let blockers: &[Action] = match constraint.action() {
            Action::Escaping => &[Action::Blocking, Action::Teleport],
            Action::ShowingUp => &[Action::Teleport],
            _ => return None,
        };
        self.log(other)
            .iter()
            .find(|c| {
                blockers.contains(&c.action())
                    && c.is_within(constraint.timestamp(), SUPPRESSION_WINDOW)
            })
            .map(Constraint::action)
    }

    /// Removes the closer role's latest `escaping` if it pairs with the other
    /// role's latest one.
    fn prune_escaping_pair(&mut self, closer: Role) -> bool {
        let latest_escaping = |log: &[Constraint]| log.iter().rposition(|c| c.action().is_escaping());
        let closer_log = &self.logs[closer.index()];
        let other_log = &self.logs[closer.other().index()];
        let (Some(closer_idx), Some(other_idx)) =
            (latest_escaping(closer_log), latest_escaping(other_log))
        else {
            return false;
        };
        let other_ts = other_log[other_idx].timestamp();
        if !closer_log[closer_idx].is_within(other_ts, PAIR_WINDOW) {
            return false;
        }
        let removed = self.logs[closer.index()].remove(closer_idx);
        tracing::debug!(
            role = %closer,
            timestamp = removed.timestamp(),
            other_timestamp = other_ts,
            "removed escaping of role closer to the wall"
        );
        true
    }

    /// Removes the just-appended `showingUp` together with a nearby
    /// `wallBetweenDestroyed` in the same log, searching newest first.
    fn cancel_wall_destruction(&mut self, role: Role, timestamp: f64) -> bool {
        let log = &mut self.logs[role.index()];
        let Some(wall_idx) = log
            .iter()
            .rposition(|c| c.action().is_wall_between_destroyed() && c.is_within(timestamp, PAIR_WINDOW))
        else {
            return false;
        };
        log.pop();
        let wall = log.remove(wall_idx);
        tracing::debug!(
            %role,
            timestamp,
            wall_timestamp = wall.timestamp(),
            "showing up cancelled by wall destruction"
        );
        true
    }

    fn post_filter(&mut self, other: Role, action: Action, timestamp: f64) -> usize {
        let stale: &[Action] = match action {
            Action::Blocking => &[Action::Escaping],
            Action::Teleport => &[Action::Escaping, Action::ShowingUp],
            _ => return 0,
        };
        let log = &mut self.logs[other.index()];
        let before = log.len();
        log.retain(|c| !(stale.contains(&c.action()) && c.is_within(timestamp, SUPPRESSION_WINDOW)));
        let removed = before - log.len();
        if removed > 0 {
            tracing::debug!(role = %other, removed, %action, timestamp, "removed stale entries");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StateVector, storage::MemoryStorage};

    fn c(action: Action, timestamp: f64) -> Constraint {
        Constraint::new(StateVector::new([0.5, 1.0, 0.0, 0.0, 0.5]), action, timestamp)
    }

    fn store() -> ConstraintStore<MemoryStorage> {
        ConstraintStore::start_session(MemoryStorage::new()).unwrap()
    }

    fn actions(store: &ConstraintStore<MemoryStorage>, role: Role) -> Vec<(Action, f64)> {
        store
            .log(role)
            .iter()
            .map(|c| (c.action(), c.timestamp()))
            .collect()
    }

    fn add(store: &mut ConstraintStore<MemoryStorage>, role: Role, action: Action, t: f64) -> InsertOutcome {
        store.add_constraint(role, c(action, t), Obstruction::Clear).unwrap()
    }

    mod pre_filter {
        use super::*;

        #[test]
        fn test_escaping_suppressed_by_blocking() {
            let mut s = store();
            add(&mut s, Role::Client, Action::Blocking, 10.0);
            let outcome = add(&mut s, Role::Server, Action::Escaping, 10.3);
            assert_eq!(outcome, InsertOutcome::Suppressed { by: Action::Blocking });
            assert!(s.log(Role::Server).is_empty());
        }

        #[test]
        fn test_escaping_suppressed_by_teleport() {
            let mut s = store();
            add(&mut s, Role::Server, Action::Teleport, 3.0);
            let outcome = add(&mut s, Role::Client, Action::Escaping, 2.75);
            assert!(outcome.is_suppressed());
            assert!(s.log(Role::Client).is_empty());
        }

        #[test]
        fn test_escaping_outside_window_is_kept() {
            let mut s = store();
            add(&mut s, Role::Client, Action::Blocking, 10.0);
            let outcome = add(&mut s, Role::Server, Action::Escaping, 10.75);
            assert!(outcome.is_recorded());
            assert_eq!(actions(&s, Role::Server), vec![(Action::Escaping, 10.75)]);
        }

        #[test]
        fn test_same_role_does_not_suppress() {
            let mut s = store();
            add(&mut s, Role::Server, Action::Blocking, 1.0);
            assert!(add(&mut s, Role::Server, Action::Escaping, 1.25).is_recorded());
            assert_eq!(s.log(Role::Server).len(), 2);
        }

        #[test]
        fn test_showing_up_suppressed_only_by_teleport() {
            let mut s = store();
            add(&mut s, Role::Client, Action::Blocking, 5.0);
            assert!(add(&mut s, Role::Server, Action::ShowingUp, 5.25).is_recorded());
            add(&mut s, Role::Client, Action::Teleport, 6.0);
            assert_eq!(
                add(&mut s, Role::Server, Action::ShowingUp, 6.5),
                InsertOutcome::Suppressed { by: Action::Teleport }
            );
            assert_eq!(actions(&s, Role::Server), vec![(Action::ShowingUp, 5.25)]);
        }
    }

    mod escaping_pair {
        use super::*;

        fn add_escaping(
            s: &mut ConstraintStore<MemoryStorage>,
            role: Role,
            t: f64,
            obstruction: Obstruction,
        ) -> InsertOutcome {
            s.add_constraint(role, c(Action::Escaping, t), obstruction).unwrap()
        }

        #[test]
        fn test_closer_role_entry_removed() {
            let mut s = store();
            add_escaping(&mut s, Role::Server, 7.0, Obstruction::Clear);
            let outcome = add_escaping(
                &mut s,
                Role::Client,
                7.25,
                Obstruction::Wall { closer: Role::Server },
            );
            assert_eq!(
                outcome,
                InsertOutcome::Recorded {
                    pair_pruned: Some(Role::Server),
                    post_filtered: 0
                }
            );
            assert!(s.log(Role::Server).is_empty());
            assert_eq!(actions(&s, Role::Client), vec![(Action::Escaping, 7.25)]);
        }

        #[test]
        fn test_inserting_role_can_be_the_closer() {
            let mut s = store();
            add_escaping(&mut s, Role::Server, 7.0, Obstruction::Clear);
            add_escaping(
                &mut s,
                Role::Client,
                7.125,
                Obstruction::Wall { closer: Role::Client },
            );
            assert!(s.log(Role::Client).is_empty());
            assert_eq!(actions(&s, Role::Server), vec![(Action::Escaping, 7.0)]);
        }

        #[test]
        fn test_no_wall_no_pruning() {
            let mut s = store();
            add_escaping(&mut s, Role::Server, 7.0, Obstruction::Clear);
            add_escaping(&mut s, Role::Client, 7.125, Obstruction::Clear);
            assert_eq!(s.log(Role::Server).len(), 1);
            assert_eq!(s.log(Role::Client).len(), 1);
        }

        #[test]
        fn test_far_apart_not_paired() {
            let mut s = store();
            add_escaping(&mut s, Role::Server, 7.0, Obstruction::Clear);
            let outcome = add_escaping(
                &mut s,
                Role::Client,
                7.5,
                Obstruction::Wall { closer: Role::Server },
            );
            assert_eq!(
                outcome,
                InsertOutcome::Recorded {
                    pair_pruned: None,
                    post_filtered: 0
                }
            );
            assert_eq!(s.log(Role::Server).len(), 1);
        }

        #[test]
        fn test_only_latest_escaping_considered() {
            let mut s = store();
            add_escaping(&mut s, Role::Server, 2.0, Obstruction::Clear);
            add_escaping(&mut s, Role::Server, 9.0, Obstruction::Clear);
            add_escaping(
                &mut s,
                Role::Client,
                2.125,
                Obstruction::Wall { closer: Role::Server },
            );
            // the server's latest escaping (9.0) is far from 2.125
            assert_eq!(s.log(Role::Server).len(), 2);
        }

        #[test]
        fn test_obstruction_ignored_for_other_actions() {
            let mut s = store();
            add_escaping(&mut s, Role::Server, 1.0, Obstruction::Clear);
            add_escaping(&mut s, Role::Client, 1.125, Obstruction::Clear);
            s.add_constraint(
                Role::Client,
                c(Action::Laser, 1.25),
                Obstruction::Wall { closer: Role::Server },
            )
            .unwrap();
            assert_eq!(s.log(Role::Server).len(), 1);
        }
    }

    mod wall_cancellation {
        use super::*;

        #[test]
        fn test_showing_up_cancels_with_wall_event() {
            let mut s = store();
            add(&mut s, Role::Server, Action::Laser, 3.0);
            add(&mut s, Role::Server, Action::WallBetweenDestroyed, 4.0);
            add(&mut s, Role::Server, Action::Charging, 4.125);
            let outcome = add(&mut s, Role::Server, Action::ShowingUp, 4.25);
            assert_eq!(outcome, InsertOutcome::Cancelled);
            assert_eq!(
                actions(&s, Role::Server),
                vec![(Action::Laser, 3.0), (Action::Charging, 4.125)]
            );
        }

        #[test]
        fn test_other_role_wall_event_does_not_cancel() {
            let mut s = store();
            add(&mut s, Role::Client, Action::WallBetweenDestroyed, 4.0);
            assert!(add(&mut s, Role::Server, Action::ShowingUp, 4.125).is_recorded());
            assert_eq!(s.log(Role::Server).len(), 1);
            assert_eq!(s.log(Role::Client).len(), 1);
        }

        #[test]
        fn test_wall_event_outside_window() {
            let mut s = store();
            add(&mut s, Role::Server, Action::WallBetweenDestroyed, 4.0);
            assert!(add(&mut s, Role::Server, Action::ShowingUp, 4.5).is_recorded());
            assert_eq!(s.log(Role::Server).len(), 2);
        }

        #[test]
        fn test_newest_wall_event_removed() {
            let mut s = store();
            add(&mut s, Role::Server, Action::WallBetweenDestroyed, 4.0);
            add(&mut s, Role::Server, Action::WallBetweenDestroyed, 4.25);
            add(&mut s, Role::Server, Action::ShowingUp, 4.125);
            assert_eq!(
                actions(&s, Role::Server),
                vec![(Action::WallBetweenDestroyed, 4.0)]
            );
        }
    }

    mod post_filter {
        use super::*;

        #[test]
        fn test_teleport_removes_other_escaping() {
            let mut s = store();
            add(&mut s, Role::Server, Action::Escaping, 5.0);
            let outcome = add(&mut s, Role::Client, Action::Teleport, 5.2);
            assert_eq!(
                outcome,
                InsertOutcome::Recorded {
                    pair_pruned: None,
                    post_filtered: 1
                }
            );
            assert!(s.log(Role::Server).is_empty());
            assert_eq!(actions(&s, Role::Client), vec![(Action::Teleport, 5.2)]);
        }

        #[test]
        fn test_blocking_removes_all_escaping_in_window() {
            let mut s = store();
            add(&mut s, Role::Server, Action::Escaping, 4.75);
            add(&mut s, Role::Server, Action::Escaping, 5.25);
            add(&mut s, Role::Server, Action::ShowingUp, 5.0);
            add(&mut s, Role::Server, Action::Escaping, 6.0);
            let outcome = add(&mut s, Role::Client, Action::Blocking, 5.0);
            assert!(matches!(
                outcome,
                InsertOutcome::Recorded {
                    post_filtered: 2,
                    ..
                }
            ));
            assert_eq!(
                actions(&s, Role::Server),
                vec![(Action::ShowingUp, 5.0), (Action::Escaping, 6.0)]
            );
        }

        #[test]
        fn test_teleport_removes_showing_up() {
            let mut s = store();
            add(&mut s, Role::Server, Action::ShowingUp, 8.0);
            add(&mut s, Role::Server, Action::Laser, 8.125);
            add(&mut s, Role::Client, Action::Teleport, 8.25);
            assert_eq!(actions(&s, Role::Server), vec![(Action::Laser, 8.125)]);
        }
    }

    mod persistence {
        use super::*;

        #[test]
        fn test_snapshots_follow_every_change() {
            let mut s = store();
            add(&mut s, Role::Server, Action::Escaping, 5.0);
            add(&mut s, Role::Client, Action::Teleport, 5.125);

            let storage = s.into_storage();
            let server = storage::load(&storage, Slot::Role(Role::Server)).unwrap();
            let client = storage::load(&storage, Slot::Role(Role::Client)).unwrap();
            assert!(server.is_empty());
            assert_eq!(client.len(), 1);
        }

        #[test]
        fn test_suppressed_insert_writes_nothing() {
            let mut s = store();
            add(&mut s, Role::Client, Action::Blocking, 1.0);
            let writes = s.storage().write_count();
            add(&mut s, Role::Server, Action::Escaping, 1.125);
            assert_eq!(s.storage().write_count(), writes);
        }

        #[test]
        fn test_start_session_clears_snapshots_but_not_merged() {
            let mut s = store();
            add(&mut s, Role::Server, Action::Laser, 1.0);
            s.merge().unwrap();

            let s = ConstraintStore::start_session(s.into_storage()).unwrap();
            assert!(s.log(Role::Server).is_empty());
            assert!(s.storage().document(Slot::Role(Role::Server)).is_none());
            assert_eq!(s.merged_log().unwrap().len(), 1);
        }

        #[test]
        fn test_resume_recovers_corrupt_snapshot() {
            let mut s = store();
            add(&mut s, Role::Server, Action::Laser, 1.0);
            let storage = s
                .into_storage()
                .with_document(Slot::Role(Role::Client), "][");
            let s = ConstraintStore::resume(storage).unwrap();
            assert_eq!(s.log(Role::Server).len(), 1);
            assert!(s.log(Role::Client).is_empty());
        }
    }

    mod merge {
        use super::*;

        #[test]
        fn test_merge_accumulates_across_sessions() {
            let mut s = store();
            add(&mut s, Role::Server, Action::Laser, 1.0);
            add(&mut s, Role::Server, Action::Charging, 2.0);
            add(&mut s, Role::Server, Action::Hindering, 3.0);
            add(&mut s, Role::Client, Action::Laser, 1.5);
            add(&mut s, Role::Client, Action::Blocking, 2.5);
            assert_eq!(s.merge().unwrap(), 5);

            let mut s = ConstraintStore::start_session(s.into_storage()).unwrap();
            add(&mut s, Role::Client, Action::Charging, 0.5);
            add(&mut s, Role::Server, Action::Laser, 0.75);
            assert_eq!(s.merge().unwrap(), 7);

            let merged = s.merged_log().unwrap();
            let order: Vec<_> = merged.iter().map(|c| (c.action(), c.timestamp())).collect();
            assert_eq!(
                order,
                vec![
                    (Action::Laser, 1.0),
                    (Action::Charging, 2.0),
                    (Action::Hindering, 3.0),
                    (Action::Laser, 1.5),
                    (Action::Blocking, 2.5),
                    (Action::Laser, 0.75),
                    (Action::Charging, 0.5),
                ]
            );
        }

        #[test]
        fn test_merge_over_corrupt_log_starts_fresh() {
            let storage = MemoryStorage::new().with_document(Slot::Merged, "garbage");
            let mut s = ConstraintStore::start_session(storage).unwrap();
            add(&mut s, Role::Server, Action::Laser, 1.0);
            assert_eq!(s.merge().unwrap(), 1);
        }

        #[test]
        fn test_merge_keeps_undecodable_history() {
            let storage = MemoryStorage::new().with_document(
                Slot::Merged,
                r#"{"constraints":[
                    {"state":[0,0,0,0,0],"chosenAction":"Laser","timestamp":1},
                    {"state":[0,0,0,0,0],"chosenAction":"dodge","timestamp":2},
                    {"state":[0,0,0,0],"chosenAction":"Laser","timestamp":3}
                ]}"#,
            );
            let mut s = ConstraintStore::start_session(storage).unwrap();
            add(&mut s, Role::Server, Action::Laser, 4.0);
            assert_eq!(s.merge().unwrap(), 4);

            let file = storage::load_file(s.storage(), Slot::Merged).unwrap();
            let labels: Vec<_> = file.constraints.iter().map(|r| r.chosen_action.as_str()).collect();
            assert_eq!(labels, ["Laser", "dodge", "Laser", "Laser"]);
            assert_eq!(file.constraints[2].state.len(), 4);
            // decoding still skips what it cannot read
            assert_eq!(s.merged_log().unwrap().len(), 2);
        }
    }
}
