use crate::error::SessionError;
use crate::game::{Move, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// How much strength sharpens the move distribution
const SHARPNESS: f64 = 4.0;

/// Transposition entries kept by [`SearchOracle`] before it starts over
const MAX_TABLE_ENTRIES: usize = 1 << 20;

/// Outcome of a position for the side to move, with distance to mate in plies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Evaluation {
    Win(u32),
    Loss(u32),
    Draw,
}

impl Evaluation {
    /// Value of the move that leads to a position evaluated as `self`,
    /// seen from the player who made it
    pub fn after_move(self) -> Evaluation {
        match self {
            Evaluation::Win(n) => Evaluation::Loss(n.saturating_add(1)),
            Evaluation::Loss(n) => Evaluation::Win(n.saturating_add(1)),
            Evaluation::Draw => Evaluation::Draw,
        }
    }

    pub fn is_decisive(&self) -> bool {
        !matches!(self, Evaluation::Draw)
    }

    /// Map onto a line: quick wins near +2, slow wins near +1, draws at 0
    pub fn score(&self) -> f64 {
        match self {
            Evaluation::Win(n) => 1.0 + 1.0 / (*n).max(1) as f64,
            Evaluation::Loss(n) => -1.0 - 1.0 / (*n).max(1) as f64,
            Evaluation::Draw => 0.0,
        }
    }

    fn rank(&self) -> (u8, i64) {
        match self {
            Evaluation::Win(n) => (2, -(*n as i64)),
            Evaluation::Draw => (1, 0),
            Evaluation::Loss(n) => (0, *n as i64),
        }
    }
}

impl Ord for Evaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Evaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Win(n) => write!(f, "#{}", n),
            Evaluation::Loss(n) => write!(f, "#-{}", n),
            Evaluation::Draw => write!(f, "0"),
        }
    }
}

/// Source of position evaluations consulted for automated play
pub trait Oracle: Send {
    /// Get the name of the oracle
    fn name(&self) -> &str;

    /// Evaluate `position` for the side to move
    fn lookup(&mut self, position: &Position) -> Evaluation;
}

/// Built-in oracle: a depth-limited solver. Positions it cannot decide
/// within its horizon count as draws.
pub struct SearchOracle {
    depth: u32,
    table: HashMap<Position, (u32, Evaluation)>,
}

impl SearchOracle {
    pub fn new(depth: u32) -> Self {
        SearchOracle {
            depth,
            table: HashMap::new(),
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    fn solve(&mut self, position: &Position, depth: u32) -> Evaluation {
        if depth == 0 {
            return Evaluation::Draw;
        }

        // decisive results stay valid at any depth
        if let Some(&(searched, evaluation)) = self.table.get(position) {
            if searched >= depth || evaluation.is_decisive() {
                return evaluation;
            }
        }

        // no moves at all loses on the spot
        let mut best = Evaluation::Loss(0);
        for mv in position.legal_moves() {
            let mut child = *position;
            let evaluation = if child.apply_move(mv) {
                Evaluation::Win(1)
            } else {
                self.solve(&child, depth - 1).after_move()
            };

            if evaluation > best {
                best = evaluation;
                if best == Evaluation::Win(1) {
                    break;
                }
            }
        }

        if self.table.len() >= MAX_TABLE_ENTRIES {
            self.table.clear();
        }
        self.table.insert(*position, (depth, best));

        best
    }
}

impl Default for SearchOracle {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Oracle for SearchOracle {
    fn name(&self) -> &str {
        "search"
    }

    fn lookup(&mut self, position: &Position) -> Evaluation {
        self.solve(position, self.depth)
    }
}

/// One candidate move with its evaluation and chance of being played
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Analysis {
    pub mv: Move,
    pub evaluation: Evaluation,
    pub probability: f64,
}

/// Evaluate every legal move and the probability of choosing it at the
/// given strength, best moves first
pub fn analyze_position<O: Oracle + ?Sized>(
    oracle: &mut O,
    position: &Position,
    strength: f64,
) -> Vec<Analysis> {
    let mut lines: Vec<Analysis> = position
        .legal_moves()
        .into_iter()
        .map(|mv| {
            let mut child = *position;
            let evaluation = if child.apply_move(mv) {
                Evaluation::Win(1)
            } else {
                oracle.lookup(&child).after_move()
            };
            Analysis {
                mv,
                evaluation,
                probability: 0.0,
            }
        })
        .collect();

    let best = lines
        .iter()
        .map(|line| line.evaluation.score())
        .fold(f64::NEG_INFINITY, f64::max);

    let mut total = 0.0;
    for line in &mut lines {
        let gap = line.evaluation.score() - best;
        // the best lines keep weight one however large the strength
        line.probability = if gap == 0.0 {
            1.0
        } else {
            (strength * SHARPNESS * gap).exp()
        };
        total += line.probability;
    }
    for line in &mut lines {
        line.probability /= total;
    }

    lines.sort_by(|a, b| b.evaluation.cmp(&a.evaluation));
    lines
}

/// Pick a move at random, weighted by [`analyze_position`]
pub fn select_move<O: Oracle + ?Sized, R: Rng>(
    oracle: &mut O,
    position: &Position,
    rng: &mut R,
    strength: f64,
) -> Result<Move, SessionError> {
    let lines = analyze_position(oracle, position, strength);
    let Some(last) = lines.last() else {
        return Err(SessionError::NoLegalMoves);
    };

    let mut pick: f64 = rng.random();
    for line in &lines {
        if pick < line.probability {
            debug!(
                oracle = oracle.name(),
                mv = %line.mv,
                evaluation = %line.evaluation,
                probability = line.probability,
                "selected move"
            );
            return Ok(line.mv);
        }
        pick -= line.probability;
    }

    // rounding left a sliver of probability unassigned
    Ok(last.mv)
}
