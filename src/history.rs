use crate::game::{Move, Position};
use serde::Serialize;

/// One recorded position with its ply index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub position: Position,
    pub move_number: u32,
    /// The move that led here; `None` for the root
    pub last_move: Option<Move>,
}

struct Node {
    snapshot: Snapshot,
    previous: Option<Box<Node>>,
}

/// The undo log: a chain of snapshots where each node owns its predecessor.
///
/// The chain always holds at least the root snapshot. The newest node is
/// the current game state.
pub struct History {
    head: Box<Node>,
}

impl History {
    pub fn new(position: Position) -> Self {
        History {
            head: Box::new(Node {
                snapshot: Snapshot {
                    position,
                    move_number: 1,
                    last_move: None,
                },
                previous: None,
            }),
        }
    }

    /// Discard every recorded snapshot and begin again from `position`
    pub fn start(&mut self, position: Position) {
        *self = History::new(position);
    }

    /// Apply `mv` to the current position and record the result.
    /// Returns whether the move ended the game.
    pub fn push(&mut self, mv: Move) -> bool {
        let current = &self.head.snapshot;
        let mut position = current.position;
        let terminal = position.apply_move(mv);

        let node = Box::new(Node {
            snapshot: Snapshot {
                position,
                move_number: current.move_number + 1,
                last_move: Some(mv),
            },
            previous: None,
        });

        let previous = std::mem::replace(&mut self.head, node);
        self.head.previous = Some(previous);

        terminal
    }

    /// Drop the newest snapshot. Fails without touching anything at the root.
    pub fn pop(&mut self) -> bool {
        match self.head.previous.take() {
            Some(previous) => {
                self.head = previous;
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> &Snapshot {
        &self.head.snapshot
    }

    /// Number of snapshots in the chain
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Snapshots from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        std::iter::successors(Some(&*self.head), |node| node.previous.as_deref())
            .map(|node| &node.snapshot)
    }

    /// Moves from the root to the current snapshot, oldest first
    pub fn moves(&self) -> Vec<Move> {
        let mut moves: Vec<Move> = self.iter().filter_map(|s| s.last_move).collect();
        moves.reverse();
        moves
    }

    /// Check if the current position has occurred three times in this game
    pub fn is_threefold_repetition(&self) -> bool {
        let position = &self.head.snapshot.position;
        let mut repetitions = 1;

        for snapshot in self.iter().skip(1) {
            if snapshot.position == *position {
                repetitions += 1;
                if repetitions == 3 {
                    return true;
                }
            }
        }

        false
    }
}

// Unlink nodes one at a time so long games do not recurse on drop
impl Drop for History {
    fn drop(&mut self) {
        let mut next = self.head.previous.take();
        while let Some(mut node) = next {
            next = node.previous.take();
        }
    }
}
