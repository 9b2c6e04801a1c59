use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

use super::config::SearchConfig;
use super::initial::initial_network;
use crate::error::Result;
use crate::inference::{Evaluation, LikelihoodScorer};
use crate::network::{DataTable, Edge, Network, VariableId};

/// Scores closer than this are treated as equal, so structures with the
/// same likelihood in exact arithmetic tie instead of racing on rounding.
pub const SCORE_TOLERANCE: f64 = 1e-9;

fn improves(score: f64, over: f64) -> bool {
    score > over + SCORE_TOLERANCE
}

/// One structural mutation considered during a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Add(Edge),
    Remove(Edge),
    Reverse(Edge),
}

impl Move {
    /// Applies the move in place; false if the graph rejected it.
    pub fn apply(&self, network: &mut Network) -> bool {
        match self {
            Move::Add(edge) => network.add_edge(edge.parent, edge.child),
            Move::Remove(edge) => network.remove_edge(edge),
            Move::Reverse(edge) => network.reverse_edge(edge),
        }
    }

    pub fn describe(&self, network: &Network) -> String {
        match self {
            Move::Add(edge) => format!("add {}", network.describe_edge(edge)),
            Move::Remove(edge) => format!("remove {}", network.describe_edge(edge)),
            Move::Reverse(edge) => format!("reverse {}", network.describe_edge(edge)),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Add(edge) => write!(f, "add {}", edge),
            Move::Remove(edge) => write!(f, "remove {}", edge),
            Move::Reverse(edge) => write!(f, "reverse {}", edge),
        }
    }
}

/// A scored, valid network reached from the current one by a single move.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub applied: Move,
    pub network: Network,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No single move improved the score.
    Converged,
    RoundBudget,
    TimeBudget,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub network: Network,
    pub evaluation: Evaluation,
    /// Rounds run across all climbs.
    pub rounds: usize,
    pub restarts_run: usize,
    pub stop_reason: StopReason,
}

/// Round and wall-clock accounting shared by every climb of one search.
struct Budget {
    started: Instant,
    rounds: usize,
    config_rounds: Option<usize>,
    config_time: Option<Duration>,
}

impl Budget {
    fn new(config: &SearchConfig) -> Self {
        Budget {
            started: Instant::now(),
            rounds: 0,
            config_rounds: config.max_rounds,
            config_time: config.time_limit(),
        }
    }

    /// Checked before a round starts, never in the middle of one.
    fn exhausted(&self) -> Option<StopReason> {
        if let Some(max) = self.config_rounds {
            if self.rounds >= max {
                return Some(StopReason::RoundBudget);
            }
        }
        if let Some(limit) = self.config_time {
            if self.started.elapsed() >= limit {
                return Some(StopReason::TimeBudget);
            }
        }
        None
    }
}

/// Greedy hill-climbing search over DAG structures.
pub struct HillClimber<'a> {
    data: &'a DataTable,
    scorer: LikelihoodScorer<'a>,
    config: SearchConfig,
}

impl<'a> HillClimber<'a> {
    pub fn new(data: &'a DataTable, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(HillClimber {
            data,
            scorer: LikelihoodScorer::new(data, config.penalty),
            config,
        })
    }

    pub fn scorer(&self) -> &LikelihoodScorer<'a> {
        &self.scorer
    }

    /// Every move considered in a round, in evaluation order: adds for each
    /// ordered pair of distinct variables, then removals, then reversals.
    pub fn candidate_moves(network: &Network) -> Vec<Move> {
        let n = network.variable_count();
        let mut moves = Vec::with_capacity(n * n + 2 * network.edge_count());
        for parent in 0..n {
            for child in 0..n {
                if parent != child {
                    moves.push(Move::Add(Edge::new(VariableId(parent), VariableId(child))));
                }
            }
        }
        moves.extend(network.edges().iter().map(|e| Move::Remove(*e)));
        moves.extend(network.edges().iter().map(|e| Move::Reverse(*e)));
        moves
    }

    /// Whether a mutated network may be scored at all.
    fn admissible(&self, network: &Network) -> bool {
        if let Some(max) = self.config.max_parents {
            if network.variables().iter().any(|v| v.parents().len() > max) {
                return false;
            }
        }
        network.is_acyclic()
    }

    /// Runs one round: applies every move to a fresh copy of `current`,
    /// discards rejected or invalid results, and returns the best-scoring
    /// survivor. Ties keep the earliest candidate.
    pub fn best_move(&self, current: &Network) -> Result<Option<Candidate>> {
        let mut best: Option<Candidate> = None;

        for candidate_move in Self::candidate_moves(current) {
            let mut network = current.clone();
            if !candidate_move.apply(&mut network) {
                trace!("best_move - {} rejected by graph", candidate_move.describe(current));
                continue;
            }
            if !self.admissible(&network) {
                trace!("best_move - {} not admissible", candidate_move.describe(current));
                continue;
            }

            let evaluation = self.scorer.evaluate(&network)?;
            debug!(
                "best_move - {} scores {:.6}",
                candidate_move.describe(current),
                evaluation.score
            );

            let better = match &best {
                Some(b) => improves(evaluation.score, b.evaluation.score),
                None => true,
            };
            if better {
                best = Some(Candidate {
                    applied: candidate_move,
                    network,
                    evaluation,
                });
            }
        }

        Ok(best)
    }

    /// Climbs from `start` until no move improves the score or the budget
    /// runs out.
    fn climb(&self, start: Network, budget: &mut Budget) -> Result<(Network, Evaluation, StopReason)> {
        let mut current = start;
        let mut evaluation = self.scorer.evaluate(&current)?;
        info!("Climb starts at score {:.6}", evaluation.score);

        loop {
            if let Some(reason) = budget.exhausted() {
                info!("Budget exhausted after {} rounds ({:?})", budget.rounds, reason);
                return Ok((current, evaluation, reason));
            }
            budget.rounds += 1;

            match self.best_move(&current)? {
                Some(candidate) if improves(candidate.evaluation.score, evaluation.score) => {
                    info!(
                        "Round {}: {} -> score {:.6}",
                        budget.rounds,
                        candidate.applied.describe(&current),
                        candidate.evaluation.score
                    );
                    current = candidate.network;
                    evaluation = candidate.evaluation;
                }
                _ => {
                    info!("Round {}: no improving move, local optimum reached", budget.rounds);
                    return Ok((current, evaluation, StopReason::Converged));
                }
            }
        }
    }

    /// Applies up to `moves` random admissible moves to a copy of `network`,
    /// never more than there are ordered variable pairs.
    fn perturb(&self, network: &Network, moves: usize, rng: &mut StdRng) -> Network {
        let n = network.variable_count();
        let moves = moves.min(n.saturating_mul(n));
        let max_attempts = moves.saturating_mul(20);
        let mut perturbed = network.clone();
        let mut applied = 0;
        let mut attempts = 0;
        // Bounded so a saturated graph cannot spin forever.
        while applied < moves && attempts < max_attempts {
            attempts += 1;
            let options = Self::candidate_moves(&perturbed);
            if options.is_empty() {
                break;
            }
            let pick = options[rng.gen_range(0..options.len())];
            let mut next = perturbed.clone();
            if pick.apply(&mut next) && self.admissible(&next) {
                trace!("perturb - {}", pick.describe(&perturbed));
                perturbed = next;
                applied += 1;
            }
        }
        perturbed
    }

    /// Full search from `start`, including any configured restarts.
    pub fn search_from(&self, start: Network) -> Result<SearchOutcome> {
        let mut budget = Budget::new(&self.config);
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let (mut best, mut best_evaluation, mut stop_reason) = self.climb(start, &mut budget)?;
        let mut restarts_run = 0;

        for restart in 0..self.config.restarts {
            if budget.exhausted().is_some() {
                break;
            }
            let start = self.perturb(&best, self.config.perturbation_moves, &mut rng);
            info!("Restart {} from a perturbed copy of the best network", restart + 1);
            let (network, evaluation, reason) = self.climb(start, &mut budget)?;
            restarts_run += 1;
            stop_reason = reason;

            if improves(evaluation.score, best_evaluation.score) {
                info!(
                    "Restart {} improved score {:.6} -> {:.6}",
                    restart + 1,
                    best_evaluation.score,
                    evaluation.score
                );
                best = network;
                best_evaluation = evaluation;
            }
        }

        info!(
            "Search finished after {} rounds: {} edges, score {:.6} ({:?})",
            budget.rounds,
            best.edge_count(),
            best_evaluation.score,
            stop_reason
        );

        Ok(SearchOutcome {
            network: best,
            evaluation: best_evaluation,
            rounds: budget.rounds,
            restarts_run,
            stop_reason,
        })
    }

    /// Builds the configured initial structure from `declared` and searches.
    pub fn search(&self, declared: &Network) -> Result<SearchOutcome> {
        let start = initial_network(self.config.initial, declared, self.data)?;
        self.search_from(start)
    }
}
