//! Assignment Engine: randomized backtracking search for a constrained derangement.
//!
//! Algorithm:
//! 1. Candidates for each giver = everyone else minus the giver's exclusions.
//! 2. Any giver with no candidates → infeasible, no search is attempted.
//! 3. Shuffle the giver order, then stable-sort by candidate count (most constrained first,
//!    ties broken randomly).
//! 4. Depth-first search over that order, trying each giver's untaken candidates in random
//!    order and refusing any candidate that already gives to the current giver.
//! 5. On failure, reshuffle and retry up to `max_attempts` times.
//!
//! The search is CPU-bound and synchronous; async callers run it inside
//! `tokio::task::spawn_blocking`.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::draw::errors::DrawError;
use crate::draw::exclusions::ExclusionPair;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 200;

/// giver → receiver
pub type AssignmentMap = BTreeMap<String, String>;

/// A successful draw.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub mapping: AssignmentMap,
    /// 1-based index of the attempt that succeeded.
    pub attempts: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct AssignmentEngine {
    max_attempts: u32,
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl AssignmentEngine {
    /// A bound of zero is raised to one so every call searches at least once.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Searches for an assignment of `participants` that respects `exclusions`.
    ///
    /// Participants are de-duplicated by exact string equality. Exclusions naming
    /// someone outside the participant set have no effect. "Provably infeasible" and
    /// "search bound exhausted" are both reported as `NoFeasibleAssignment`.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        participants: &[String],
        exclusions: &[ExclusionPair],
        rng: &mut R,
    ) -> Result<Assignment, DrawError> {
        let people: Vec<&str> = participants
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let n = people.len();
        if n < 2 {
            return Err(DrawError::InsufficientParticipants { count: n });
        }

        let excluded: HashSet<(&str, &str)> = exclusions
            .iter()
            .map(|p| (p.giver.as_str(), p.receiver.as_str()))
            .collect();

        let candidates: Vec<Vec<usize>> = (0..n)
            .map(|giver| {
                (0..n)
                    .filter(|&receiver| {
                        receiver != giver && !excluded.contains(&(people[giver], people[receiver]))
                    })
                    .collect()
            })
            .collect();

        if let Some(stuck) = candidates.iter().position(Vec::is_empty) {
            warn!(
                participant = people[stuck],
                "participant has no allowed recipients; draw is infeasible"
            );
            return Err(DrawError::NoFeasibleAssignment { attempts: 0 });
        }

        let mut order: Vec<usize> = (0..n).collect();
        for attempt in 1..=self.max_attempts {
            order.shuffle(rng);
            order.sort_by_key(|&giver| candidates[giver].len());

            let mut search = Search::new(&candidates);
            if search.extend(&order, 0, rng) {
                let mapping = search
                    .recipient_of
                    .iter()
                    .enumerate()
                    .filter_map(|(giver, receiver)| {
                        receiver.map(|r| (people[giver].to_string(), people[r].to_string()))
                    })
                    .collect();
                info!(participants = n, attempt, "draw assignment found");
                return Ok(Assignment {
                    mapping,
                    attempts: attempt,
                });
            }
            debug!(attempt, "draw attempt exhausted its search tree");
        }

        warn!(
            participants = n,
            attempts = self.max_attempts,
            "no draw assignment found within the attempt bound"
        );
        Err(DrawError::NoFeasibleAssignment {
            attempts: self.max_attempts,
        })
    }
}

/// Partial assignment for one attempt. Recursion depth equals the participant count.
struct Search<'a> {
    candidates: &'a [Vec<usize>],
    recipient_of: Vec<Option<usize>>,
    taken: Vec<bool>,
}

impl<'a> Search<'a> {
    fn new(candidates: &'a [Vec<usize>]) -> Self {
        let n = candidates.len();
        Self {
            candidates,
            recipient_of: vec![None; n],
            taken: vec![false; n],
        }
    }

    fn extend<R: Rng + ?Sized>(&mut self, order: &[usize], depth: usize, rng: &mut R) -> bool {
        let Some(&giver) = order.get(depth) else {
            return true;
        };

        let mut options: Vec<usize> = self.candidates[giver]
            .iter()
            .copied()
            .filter(|&r| !self.taken[r])
            .collect();
        options.shuffle(rng);

        for receiver in options {
            // receiver already gives to giver: would close a two-cycle
            if self.recipient_of[receiver] == Some(giver) {
                continue;
            }

            self.recipient_of[giver] = Some(receiver);
            self.taken[receiver] = true;
            if self.extend(order, depth + 1, rng) {
                return true;
            }
            self.recipient_of[giver] = None;
            self.taken[receiver] = false;
        }

        false
    }
}
