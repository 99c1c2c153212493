use dobutsu_arena::{Evaluation, Oracle, Position};
use std::collections::HashMap;

/// Cached evaluations kept before the cache starts over
const MAX_CACHE_ENTRIES: usize = 1 << 20;

/// An oracle that only sees one full move ahead: it knows when the side to
/// move can win at once, or when every move it has allows an immediate win.
/// Everything else is a draw as far as it can tell.
pub struct TacticsOracle {
    name: String,
    cache: HashMap<Position, Evaluation>,
    cache_limit: usize,
}

impl Default for TacticsOracle {
    fn default() -> Self {
        Self {
            name: "TacticsPlugin".to_string(),
            cache: HashMap::new(),
            cache_limit: MAX_CACHE_ENTRIES,
        }
    }
}

impl TacticsOracle {
    /// Does the side to move have a move that ends the game in its favour?
    fn has_winning_move(position: &Position) -> bool {
        position.legal_moves().into_iter().any(|mv| {
            let mut child = *position;
            child.apply_move(mv)
        })
    }

    fn evaluate(position: &Position) -> Evaluation {
        let moves = position.legal_moves();
        if moves.is_empty() {
            return Evaluation::Loss(0);
        }

        let mut all_lose = true;
        for mv in moves {
            let mut child = *position;
            if child.apply_move(mv) {
                return Evaluation::Win(1);
            }
            if all_lose && !Self::has_winning_move(&child) {
                all_lose = false;
            }
        }

        if all_lose {
            Evaluation::Loss(2)
        } else {
            Evaluation::Draw
        }
    }
}

impl Oracle for TacticsOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&mut self, position: &Position) -> Evaluation {
        if let Some(&evaluation) = self.cache.get(position) {
            return evaluation;
        }

        let evaluation = Self::evaluate(position);
        if self.cache.len() >= self.cache_limit {
            self.cache.clear();
        }
        self.cache.insert(*position, evaluation);
        evaluation
    }
}

// Export the oracle using the macro
dobutsu_arena::export_oracle!(TacticsOracle);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_win() {
        let mut oracle = TacticsOracle::default();
        let position = Position::parse("S/g--/-l-/-G-/E-L/-").unwrap();

        assert_eq!(oracle.lookup(&position), Evaluation::Win(1));
    }

    #[test]
    fn test_every_move_loses() {
        let mut oracle = TacticsOracle::default();
        let position = Position::parse("G/l--/G-L/-E-/---/-").unwrap();

        assert_eq!(oracle.lookup(&position), Evaluation::Loss(2));
    }

    #[test]
    fn test_cache_stays_within_limit() {
        let mut oracle = TacticsOracle {
            cache_limit: 2,
            ..TacticsOracle::default()
        };
        let positions = [
            Position::initial(),
            Position::parse("S/g--/-l-/-G-/E-L/-").unwrap(),
            Position::parse("G/l--/G-L/-E-/---/-").unwrap(),
        ];

        for position in &positions {
            oracle.lookup(position);
            assert!(oracle.cache.len() <= 2);
        }
        assert_eq!(oracle.lookup(&positions[1]), Evaluation::Win(1));
    }

    #[test]
    fn test_quiet_position_is_draw() {
        let mut oracle = TacticsOracle::default();

        assert_eq!(oracle.lookup(&Position::initial()), Evaluation::Draw);
        assert_eq!(oracle.name(), "TacticsPlugin");
    }
}
