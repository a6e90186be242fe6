//! The draw operations exposed to the rest of the application.
//!
//! `run_draw` is the only path to a drawn record: parse → search → commit. A failed
//! search returns before the store is touched, so the previous record survives.

use std::sync::Arc;

use rand::Rng;
use tracing::info;

use crate::draw::engine::{Assignment, AssignmentEngine};
use crate::draw::errors::DrawError;
use crate::draw::exclusions::parse_exclusions;
use crate::draw::store::{DrawRecord, DrawStore};

#[derive(Debug, Clone)]
pub struct DrawService {
    store: Arc<DrawStore>,
    engine: AssignmentEngine,
}

impl DrawService {
    pub fn new(store: Arc<DrawStore>, engine: AssignmentEngine) -> Self {
        Self { store, engine }
    }

    pub fn run_draw(
        &self,
        participants: &[String],
        exclusion_text: &str,
    ) -> Result<Assignment, DrawError> {
        self.run_draw_with(participants, exclusion_text, &mut rand::rng())
    }

    /// [`Self::run_draw`] with a caller-supplied random source.
    pub fn run_draw_with<R: Rng + ?Sized>(
        &self,
        participants: &[String],
        exclusion_text: &str,
        rng: &mut R,
    ) -> Result<Assignment, DrawError> {
        let exclusions = parse_exclusions(exclusion_text);
        info!(
            participants = participants.len(),
            exclusions = exclusions.len(),
            "running draw"
        );

        let assignment = self.engine.assign(participants, &exclusions, rng)?;
        self.store.commit_draw(&assignment.mapping, &exclusions)?;
        Ok(assignment)
    }

    pub fn get_draw_state(&self) -> Result<DrawRecord, DrawError> {
        Ok(self.store.load()?)
    }

    pub fn reset_draw(&self) -> Result<(), DrawError> {
        self.store.reset()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::{tempdir, TempDir};

    fn service() -> (TempDir, DrawService) {
        let dir = tempdir().unwrap();
        let store = Arc::new(DrawStore::new(dir.path().join("draw_state.json")));
        (dir, DrawService::new(store, AssignmentEngine::default()))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_successful_draw_is_committed() {
        let (_dir, svc) = service();
        let people = names(&["Ana", "Bea", "Carlos", "Dani"]);
        let mut rng = StdRng::seed_from_u64(7);

        let assignment = svc
            .run_draw_with(&people, "Ana -> Bea\nnot a rule\nCarlos: Dani", &mut rng)
            .unwrap();
        assert_ne!(assignment.mapping["Ana"], "Bea");
        assert_ne!(assignment.mapping["Carlos"], "Dani");

        let state = svc.get_draw_state().unwrap();
        assert!(state.done);
        assert_eq!(state.assignments, assignment.mapping);
        assert_eq!(
            state.forbidden_pairs.iter().cloned().collect::<Vec<_>>(),
            vec!["Ana::Bea".to_string(), "Carlos::Dani".to_string()]
        );
    }

    #[test]
    fn test_failed_draw_leaves_state_untouched() {
        let (_dir, svc) = service();
        let people = names(&["A", "B", "C"]);
        svc.run_draw(&people, "A -> C").unwrap();
        let before = svc.get_draw_state().unwrap();

        let err = svc.run_draw(&people, "A -> B\nA -> C").unwrap_err();
        assert!(matches!(err, DrawError::NoFeasibleAssignment { .. }));
        assert_eq!(svc.get_draw_state().unwrap(), before);
    }

    #[test]
    fn test_insufficient_participants_commits_nothing() {
        let (_dir, svc) = service();
        let err = svc.run_draw(&names(&["solo"]), "").unwrap_err();
        assert!(matches!(
            err,
            DrawError::InsufficientParticipants { count: 1 }
        ));

        let state = svc.get_draw_state().unwrap();
        assert!(!state.done);
        assert!(state.assignments.is_empty());
    }

    #[test]
    fn test_two_participants_report_no_feasible_assignment() {
        let (_dir, svc) = service();
        let err = svc.run_draw(&names(&["A", "B"]), "").unwrap_err();
        assert!(matches!(err, DrawError::NoFeasibleAssignment { .. }));
        assert!(!svc.get_draw_state().unwrap().done);
    }

    #[test]
    fn test_reset_keeps_audit_trail_and_allows_fresh_draw() {
        let (_dir, svc) = service();
        let people = names(&["A", "B", "C"]);

        // A -> B excluded forces A -> C -> B -> A.
        let first = svc.run_draw(&people, "A -> B").unwrap();
        assert_eq!(first.mapping["A"], "C");

        svc.reset_draw().unwrap();
        let after_reset = svc.get_draw_state().unwrap();
        assert!(!after_reset.done);
        assert!(after_reset.assignments.is_empty());
        // Retained across reset, not cleared.
        assert!(after_reset.forbidden_pairs.contains("A::B"));

        // The retained trail does not constrain the next draw: with A -> C excluded
        // instead, A -> B is now the only option.
        let second = svc.run_draw(&people, "A -> C").unwrap();
        assert_eq!(second.mapping["A"], "B");

        let state = svc.get_draw_state().unwrap();
        assert!(state.done);
        assert!(state.forbidden_pairs.contains("A::B"));
        assert!(state.forbidden_pairs.contains("A::C"));
    }

    #[test]
    fn test_storage_failure_surfaces_and_keeps_previous_state() {
        let (dir, svc) = service();
        let people = names(&["A", "B", "C", "D"]);
        svc.run_draw(&people, "A -> B").unwrap();
        let before = svc.get_draw_state().unwrap();

        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let failing = DrawService::new(
            Arc::new(DrawStore::with_staging_dir(
                dir.path().join("draw_state.json"),
                &blocker,
            )),
            AssignmentEngine::default(),
        );

        let err = failing.run_draw(&people, "C -> D").unwrap_err();
        assert!(matches!(err, DrawError::Persistence(_)));
        let err = failing.reset_draw().unwrap_err();
        assert!(matches!(err, DrawError::Persistence(_)));

        assert_eq!(failing.get_draw_state().unwrap(), before);
        assert_eq!(svc.get_draw_state().unwrap(), before);
    }

    #[test]
    fn test_redraw_replaces_previous_assignment() {
        let (_dir, svc) = service();
        let people = names(&["A", "B", "C", "D", "E"]);
        svc.run_draw(&people, "").unwrap();
        let second = svc.run_draw(&people, "").unwrap();
        assert_eq!(svc.get_draw_state().unwrap().assignments, second.mapping);
    }
}
