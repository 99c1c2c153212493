use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Board dimensions
pub const BOARD_COLS: usize = 3;
pub const BOARD_ROWS: usize = 4;
pub const BOARD_SQUARES: usize = BOARD_COLS * BOARD_ROWS;

/// Setup string of the standard starting layout
pub const INITIAL_SETUP: &str = "S/gle/-c-/-C-/ELG/-";

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Sente, // moves first, home rank 4
    Gote,  // home rank 1
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Sente => Side::Gote,
            Side::Gote => Side::Sente,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Side::Sente => 0,
            Side::Gote => 1,
        }
    }

    /// Row delta of one step "forward" for this side
    fn forward(&self) -> i8 {
        match self {
            Side::Sente => -1,
            Side::Gote => 1,
        }
    }

    /// The opponent's home rank, where chicks promote and lions win by try
    pub fn far_row(&self) -> u8 {
        match self {
            Side::Sente => 0,
            Side::Gote => (BOARD_ROWS - 1) as u8,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Side::Sente => "Sente",
            Side::Gote => "Gote",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Piece {
    Lion,
    Giraffe,
    Elephant,
    Chick,
    Hen,
}

const LION_STEPS: &[(i8, i8)] = &[
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const GIRAFFE_STEPS: &[(i8, i8)] = &[(-1, 0), (1, 0), (0, -1), (0, 1)];
const ELEPHANT_STEPS: &[(i8, i8)] = &[(-1, -1), (-1, 1), (1, -1), (1, 1)];
const CHICK_STEPS: &[(i8, i8)] = &[(-1, 0)];
const HEN_STEPS: &[(i8, i8)] = &[(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0)];

impl Piece {
    /// Pieces that can be held in hand, in hand-slot order
    pub const IN_HAND: [Piece; 3] = [Piece::Chick, Piece::Giraffe, Piece::Elephant];

    /// Step offsets as (row, col), written from Sente's point of view
    fn steps(&self) -> &'static [(i8, i8)] {
        match self {
            Piece::Lion => LION_STEPS,
            Piece::Giraffe => GIRAFFE_STEPS,
            Piece::Elephant => ELEPHANT_STEPS,
            Piece::Chick => CHICK_STEPS,
            Piece::Hen => HEN_STEPS,
        }
    }

    fn hand_slot(&self) -> Option<usize> {
        match self {
            Piece::Chick => Some(0),
            Piece::Giraffe => Some(1),
            Piece::Elephant => Some(2),
            Piece::Lion | Piece::Hen => None,
        }
    }

    /// What a captured piece turns into in the capturer's hand
    fn demoted(&self) -> Piece {
        match self {
            Piece::Hen => Piece::Chick,
            other => *other,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Piece::Lion => 'L',
            Piece::Giraffe => 'G',
            Piece::Elephant => 'E',
            Piece::Chick => 'C',
            Piece::Hen => 'H',
        }
    }

    pub fn from_letter(c: char) -> Option<Piece> {
        match c.to_ascii_uppercase() {
            'L' => Some(Piece::Lion),
            'G' => Some(Piece::Giraffe),
            'E' => Some(Piece::Elephant),
            'C' => Some(Piece::Chick),
            'H' => Some(Piece::Hen),
            _ => None,
        }
    }
}

/// A square on the board, indexed row-major from a1
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub fn new(row: u8, col: u8) -> Self {
        Coord { row, col }
    }

    fn from_index(index: usize) -> Self {
        Coord::new((index / BOARD_COLS) as u8, (index % BOARD_COLS) as u8)
    }

    fn index(&self) -> usize {
        self.row as usize * BOARD_COLS + self.col as usize
    }

    fn offset(&self, dr: i8, dc: i8) -> Option<Coord> {
        let r = self.row as i8 + dr;
        let c = self.col as i8 + dc;

        if r < 0 || r >= BOARD_ROWS as i8 || c < 0 || c >= BOARD_COLS as i8 {
            return None;
        }

        Some(Coord::new(r as u8, c as u8))
    }

    /// Parse a square name such as `b3`
    fn parse(s: &str) -> Option<Coord> {
        let mut chars = s.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }

        let col = (file as u32).checked_sub('a' as u32)?;
        let row = rank.to_digit(10)?.checked_sub(1)?;
        if col >= BOARD_COLS as u32 || row >= BOARD_ROWS as u32 {
            return None;
        }

        Some(Coord::new(row as u8, col as u8))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col) as char, self.row + 1)
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Step { from: Coord, to: Coord },
    Drop { piece: Piece, to: Coord },
}

impl Move {
    pub fn step(from: Coord, to: Coord) -> Self {
        Move::Step { from, to }
    }

    pub fn drop(piece: Piece, to: Coord) -> Self {
        Move::Drop { piece, to }
    }

    pub fn to(&self) -> Coord {
        match self {
            Move::Step { to, .. } | Move::Drop { to, .. } => *to,
        }
    }
}

/// Bare from-to notation; use [`Position::move_string`] for the annotated form
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Step { from, to } => write!(f, "{}{}", from, to),
            Move::Drop { piece, to } => write!(f, "{}*{}", piece.letter(), to),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    #[error("invalid position: {0}")]
    InvalidPosition(String),
    #[error("invalid move: {0}")]
    InvalidMove(String),
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub piece: Piece,
    pub owner: Side,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    board: [Option<Cell>; BOARD_SQUARES],
    /// Per side: chicks, giraffes, elephants in hand
    hands: [[u8; 3]; 2],
    side: Side,
}

impl Position {
    /// The standard starting layout, Sente to move
    pub fn initial() -> Self {
        let mut position = Position::empty(Side::Sente);

        let gote = [Piece::Giraffe, Piece::Lion, Piece::Elephant];
        let sente = [Piece::Elephant, Piece::Lion, Piece::Giraffe];
        for col in 0..BOARD_COLS as u8 {
            position.put(Coord::new(0, col), gote[col as usize], Side::Gote);
            position.put(Coord::new(3, col), sente[col as usize], Side::Sente);
        }
        position.put(Coord::new(1, 1), Piece::Chick, Side::Gote);
        position.put(Coord::new(2, 1), Piece::Chick, Side::Sente);

        position
    }

    fn empty(side: Side) -> Self {
        Position {
            board: [None; BOARD_SQUARES],
            hands: [[0; 3]; 2],
            side,
        }
    }

    fn put(&mut self, at: Coord, piece: Piece, owner: Side) {
        self.board[at.index()] = Some(Cell { piece, owner });
    }

    pub fn side_to_move(&self) -> Side {
        self.side
    }

    pub fn get(&self, at: Coord) -> Option<Cell> {
        self.board[at.index()]
    }

    /// Number of `piece` held in hand by `side` (zero for lions and hens)
    pub fn in_hand(&self, side: Side, piece: Piece) -> u8 {
        piece
            .hand_slot()
            .map_or(0, |slot| self.hands[side.index()][slot])
    }

    fn targets(&self, from: Coord, cell: Cell) -> impl Iterator<Item = Coord> + '_ {
        let forward = cell.owner.forward();
        cell.piece
            .steps()
            .iter()
            .filter_map(move |&(dr, dc)| from.offset(dr * -forward, dc))
    }

    /// Check if any piece of `side` could step onto `at`
    fn attacked_by(&self, side: Side, at: Coord) -> bool {
        (0..BOARD_SQUARES).any(|index| match self.board[index] {
            Some(cell) if cell.owner == side => self
                .targets(Coord::from_index(index), cell)
                .any(|to| to == at),
            _ => false,
        })
    }

    /// Get all legal moves for the side to move
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();

        for index in 0..BOARD_SQUARES {
            let Some(cell) = self.board[index] else {
                continue;
            };
            if cell.owner != self.side {
                continue;
            }

            let from = Coord::from_index(index);
            for to in self.targets(from, cell) {
                match self.get(to) {
                    Some(target) if target.owner == self.side => {}
                    _ => moves.push(Move::step(from, to)),
                }
            }
        }

        for piece in Piece::IN_HAND {
            if self.in_hand(self.side, piece) == 0 {
                continue;
            }

            for index in 0..BOARD_SQUARES {
                if self.board[index].is_none() {
                    moves.push(Move::drop(piece, Coord::from_index(index)));
                }
            }
        }

        moves
    }

    /// Play `mv`, which must be legal in this position, and report whether it
    /// ends the game with the mover as winner.
    pub fn apply_move(&mut self, mv: Move) -> bool {
        let mover = self.side;
        let mut terminal = false;

        match mv {
            Move::Step { from, to } => {
                let Some(mut cell) = self.board[from.index()].take() else {
                    debug_assert!(false, "no piece on {}", from);
                    return false;
                };

                if let Some(captured) = self.board[to.index()].take() {
                    match captured.piece.demoted().hand_slot() {
                        Some(slot) => self.hands[mover.index()][slot] += 1,
                        None => terminal = true, // lion taken
                    }
                }

                if cell.piece == Piece::Chick && to.row == mover.far_row() {
                    cell.piece = Piece::Hen;
                }
                self.board[to.index()] = Some(cell);

                // Lion reaching the far rank wins unless it can be taken there
                if cell.piece == Piece::Lion
                    && to.row == mover.far_row()
                    && !self.attacked_by(mover.opponent(), to)
                {
                    terminal = true;
                }
            }
            Move::Drop { piece, to } => {
                if let Some(slot) = piece.hand_slot() {
                    let held = &mut self.hands[mover.index()][slot];
                    *held = held.saturating_sub(1);
                }
                self.put(to, piece, mover);
            }
        }

        self.side = mover.opponent();

        // check that opposite party has legal moves
        if !terminal && self.legal_moves().is_empty() {
            terminal = true;
        }

        terminal
    }

    /// Describe `mv` as played from this position, e.g. `Cb3xb2+` or `G*a2`
    pub fn move_string(&self, mv: Move) -> String {
        match mv {
            Move::Step { from, to } => {
                let piece = self.get(from).map_or('?', |cell| cell.piece.letter());
                let capture = if self.get(to).is_some() { "x" } else { "" };
                let promotes = piece == 'C' && to.row == self.side.far_row();
                format!(
                    "{}{}{}{}{}",
                    piece,
                    from,
                    capture,
                    to,
                    if promotes { "+" } else { "" }
                )
            }
            Move::Drop { .. } => mv.to_string(),
        }
    }

    /// Parse a move in this position and check it is legal
    pub fn parse_move(&self, text: &str) -> Result<Move, GameError> {
        let invalid = || GameError::InvalidMove(text.to_string());
        let text = text.trim();

        let mv = if let Some((piece, to)) = text.split_once('*') {
            let mut letters = piece.chars();
            let piece = match (letters.next(), letters.next()) {
                (Some(c), None) => Piece::from_letter(c).ok_or_else(invalid)?,
                _ => return Err(invalid()),
            };
            Move::drop(piece, Coord::parse(to).ok_or_else(invalid)?)
        } else {
            // [P]from[x|-]to[+]
            let body = text.strip_suffix('+').unwrap_or(text);
            let body = match body.chars().next() {
                Some(c) if c.is_ascii_uppercase() && Piece::from_letter(c).is_some() => &body[1..],
                _ => body,
            };
            if body.len() < 4 || !body.is_ascii() {
                return Err(invalid());
            }
            let (from, rest) = body.split_at(2);
            let to = rest
                .strip_prefix('x')
                .or_else(|| rest.strip_prefix('-'))
                .unwrap_or(rest);
            Move::step(
                Coord::parse(from).ok_or_else(invalid)?,
                Coord::parse(to).ok_or_else(invalid)?,
            )
        };

        if !self.legal_moves().contains(&mv) {
            return Err(GameError::InvalidMove(format!("{} is not legal", text)));
        }

        Ok(mv)
    }

    /// Decode a setup string such as [`INITIAL_SETUP`]
    pub fn parse(text: &str) -> Result<Self, GameError> {
        let invalid = |why: &str| GameError::InvalidPosition(format!("{}: {}", why, text));

        let fields: Vec<&str> = text.trim().split('/').collect();
        if fields.len() != BOARD_ROWS + 2 {
            return Err(invalid("expected side, four rows and hand"));
        }

        let side = match fields[0] {
            "S" | "s" => Side::Sente,
            "G" | "g" => Side::Gote,
            _ => return Err(invalid("side to move must be S or G")),
        };

        let mut position = Position::empty(side);
        let mut lions = [0; 2];
        let mut totals = [0; 3];

        for (row, field) in fields[1..=BOARD_ROWS].iter().enumerate() {
            let chars: Vec<char> = field.chars().collect();
            if chars.len() != BOARD_COLS {
                return Err(invalid("rows must have three squares"));
            }

            for (col, &c) in chars.iter().enumerate() {
                if c == '-' {
                    continue;
                }
                let piece = Piece::from_letter(c).ok_or_else(|| invalid("unknown piece"))?;
                let owner = if c.is_ascii_uppercase() { Side::Sente } else { Side::Gote };

                match piece.demoted().hand_slot() {
                    Some(slot) => totals[slot] += 1,
                    None => lions[owner.index()] += 1,
                }
                position.put(Coord::new(row as u8, col as u8), piece, owner);
            }
        }

        let hand = fields[BOARD_ROWS + 1];
        if hand != "-" {
            for c in hand.chars() {
                let piece = Piece::from_letter(c).ok_or_else(|| invalid("unknown piece in hand"))?;
                let slot = piece
                    .hand_slot()
                    .ok_or_else(|| invalid("only chicks, giraffes and elephants go in hand"))?;
                let owner = if c.is_ascii_uppercase() { Side::Sente } else { Side::Gote };
                position.hands[owner.index()][slot] += 1;
                totals[slot] += 1;
            }
        }

        if lions != [1, 1] {
            return Err(invalid("each side needs exactly one lion"));
        }
        if totals.iter().any(|&n| n > 2) {
            return Err(invalid("too many pieces of one kind"));
        }

        Ok(position)
    }

    /// Encode as a setup string accepted by [`Position::parse`]
    pub fn to_setup_string(&self) -> String {
        let mut result = String::new();
        result.push(match self.side {
            Side::Sente => 'S',
            Side::Gote => 'G',
        });

        for row in 0..BOARD_ROWS as u8 {
            result.push('/');
            for col in 0..BOARD_COLS as u8 {
                result.push(match self.get(Coord::new(row, col)) {
                    Some(cell) => cell_letter(cell),
                    None => '-',
                });
            }
        }

        result.push('/');
        let mut hand = String::new();
        for side in [Side::Sente, Side::Gote] {
            for piece in Piece::IN_HAND {
                for _ in 0..self.in_hand(side, piece) {
                    hand.push(cell_letter(Cell { piece, owner: side }));
                }
            }
        }
        if hand.is_empty() {
            hand.push('-');
        }
        result.push_str(&hand);

        result
    }

    /// Get a string representation of the board
    pub fn render(&self) -> String {
        let mut result = String::new();

        result.push_str(&format!("Gote hand: {}\n", self.hand_string(Side::Gote)));
        result.push_str("   a  b  c\n");
        for row in 0..BOARD_ROWS as u8 {
            result.push_str(&format!("{} ", row + 1));
            for col in 0..BOARD_COLS as u8 {
                let c = match self.get(Coord::new(row, col)) {
                    Some(cell) => cell_letter(cell),
                    None => '.',
                };
                result.push_str(&format!(" {} ", c));
            }
            result.push('\n');
        }
        result.push_str(&format!("Sente hand: {}\n", self.hand_string(Side::Sente)));
        result.push_str(&format!("{} to move\n", self.side));

        result
    }

    fn hand_string(&self, side: Side) -> String {
        let hand: String = Piece::IN_HAND
            .iter()
            .flat_map(|&piece| {
                std::iter::repeat_n(piece.letter(), self.in_hand(side, piece) as usize)
            })
            .collect();
        if hand.is_empty() { "-".to_string() } else { hand }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::initial()
    }
}

fn cell_letter(cell: Cell) -> char {
    match cell.owner {
        Side::Sente => cell.piece.letter(),
        Side::Gote => cell.piece.letter().to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Coord {
        Coord::parse(name).unwrap()
    }

    fn setup(text: &str) -> Position {
        Position::parse(text).unwrap()
    }

    #[test]
    fn test_initial_setup() {
        let game = Position::initial();

        assert_eq!(game.side_to_move(), Side::Sente);
        assert_eq!(
            game.get(sq("b4")),
            Some(Cell { piece: Piece::Lion, owner: Side::Sente })
        );
        assert_eq!(
            game.get(sq("b1")),
            Some(Cell { piece: Piece::Lion, owner: Side::Gote })
        );
        assert_eq!(
            game.get(sq("b3")),
            Some(Cell { piece: Piece::Chick, owner: Side::Sente })
        );
        assert_eq!(game.to_setup_string(), INITIAL_SETUP);
        assert_eq!(setup(INITIAL_SETUP), game);
    }

    #[test]
    fn test_initial_moves() {
        let game = Position::initial();
        let moves = game.legal_moves();

        // chick takes chick, lion to a3/c3, giraffe to c3, elephant cannot move
        assert!(moves.contains(&Move::step(sq("b3"), sq("b2"))));
        assert!(moves.contains(&Move::step(sq("b4"), sq("a3"))));
        assert!(moves.contains(&Move::step(sq("b4"), sq("c3"))));
        assert!(moves.contains(&Move::step(sq("c4"), sq("c3"))));
        assert!(!moves.iter().any(|mv| matches!(mv, Move::Step { from, .. } if *from == sq("a4"))));
        assert_eq!(moves.len(), 4);
    }

    #[test]
    fn test_capture_goes_to_hand() {
        let mut game = Position::initial();

        assert!(!game.apply_move(Move::step(sq("b3"), sq("b2"))));
        assert_eq!(game.in_hand(Side::Sente, Piece::Chick), 1);
        assert_eq!(game.side_to_move(), Side::Gote);

        let moves = game.legal_moves();
        assert!(!moves.iter().any(|mv| matches!(mv, Move::Drop { .. })));
    }

    #[test]
    fn test_drop_from_hand() {
        let mut game = setup("S/gl-/---/---/-L-/C");
        let mv = Move::drop(Piece::Chick, sq("a2"));

        assert!(game.legal_moves().contains(&mv));
        assert!(!game.apply_move(mv));
        assert_eq!(game.in_hand(Side::Sente, Piece::Chick), 0);
        assert_eq!(
            game.get(sq("a2")),
            Some(Cell { piece: Piece::Chick, owner: Side::Sente })
        );
    }

    #[test]
    fn test_chick_promotes_on_far_rank() {
        let mut game = setup("S/-l-/C--/---/--L/-");

        game.apply_move(Move::step(sq("a2"), sq("a1")));
        assert_eq!(
            game.get(sq("a1")),
            Some(Cell { piece: Piece::Hen, owner: Side::Sente })
        );
    }

    #[test]
    fn test_dropped_chick_does_not_promote() {
        let mut game = setup("S/-l-/---/---/--L/C");

        game.apply_move(Move::drop(Piece::Chick, sq("c1")));
        assert_eq!(
            game.get(sq("c1")),
            Some(Cell { piece: Piece::Chick, owner: Side::Sente })
        );
    }

    #[test]
    fn test_captured_hen_returns_as_chick() {
        let mut game = setup("G/-l-/-H-/---/--L/-");

        assert!(!game.apply_move(Move::step(sq("b1"), sq("b2"))));
        assert_eq!(game.in_hand(Side::Gote, Piece::Chick), 1);
        assert_eq!(game.in_hand(Side::Gote, Piece::Hen), 0);
    }

    #[test]
    fn test_capturing_lion_ends_game() {
        let mut game = setup("S/---/-l-/-G-/--L/-");

        assert!(game.apply_move(Move::step(sq("b3"), sq("b2"))));
    }

    #[test]
    fn test_lion_try_wins_when_safe() {
        let mut game = setup("S/---/L--/---/-l-/-");

        assert!(game.apply_move(Move::step(sq("a2"), sq("a1"))));
    }

    #[test]
    fn test_lion_try_fails_when_attacked() {
        let mut game = setup("S/--g/L--/---/-l-/-");

        // gote giraffe on c1 guards b1
        assert!(!game.apply_move(Move::step(sq("a2"), sq("b1"))));
    }

    #[test]
    fn test_gote_moves_downwards() {
        let game = setup("G/-l-/-c-/---/-L-/-");
        let moves = game.legal_moves();

        assert!(moves.contains(&Move::step(sq("b2"), sq("b3"))));
        assert!(!moves.contains(&Move::step(sq("b2"), sq("b1"))));
    }

    #[test]
    fn test_pieces_cannot_capture_own_side() {
        let game = Position::initial();

        assert!(!game.legal_moves().contains(&Move::step(sq("b4"), sq("b3"))));
    }

    #[test]
    fn test_move_string() {
        let game = Position::initial();

        assert_eq!(game.move_string(Move::step(sq("b3"), sq("b2"))), "Cb3xb2");
        assert_eq!(game.move_string(Move::step(sq("c4"), sq("c3"))), "Gc4c3");
        assert_eq!(
            setup("S/-l-/C--/---/--L/-").move_string(Move::step(sq("a2"), sq("a1"))),
            "Ca2a1+"
        );
        assert_eq!(Move::drop(Piece::Giraffe, sq("a2")).to_string(), "G*a2");
    }

    #[test]
    fn test_parse_move() {
        let game = Position::initial();

        assert_eq!(game.parse_move("b3b2"), Ok(Move::step(sq("b3"), sq("b2"))));
        assert_eq!(game.parse_move("Cb3xb2"), Ok(Move::step(sq("b3"), sq("b2"))));
        assert_eq!(game.parse_move("c4-c3"), Ok(Move::step(sq("c4"), sq("c3"))));
        assert!(matches!(game.parse_move("a4a3"), Err(GameError::InvalidMove(_))));
        assert!(matches!(game.parse_move("show"), Err(GameError::InvalidMove(_))));
        assert!(matches!(game.parse_move("C*a2"), Err(GameError::InvalidMove(_))));

        let with_hand = setup("S/gl-/---/---/-L-/C");
        assert_eq!(with_hand.parse_move("c*a2"), Ok(Move::drop(Piece::Chick, sq("a2"))));
    }

    #[test]
    fn test_parse_rejects_bad_setups() {
        for text in [
            "",
            "X/gle/-c-/-C-/ELG/-",
            "S/gle/-c-/-C-/ELG",
            "S/gle/-c-/-C-/EL/-",
            "S/gle/-c-/-C-/EGG/-",
            "S/gle/-c-/-C-/ELG/H",
            "S/gle/-c-/-C-/ELG/L",
            "S/gle/-c-/-C-/ELG/C",
            "S/gle/-q-/-C-/ELG/-",
        ] {
            assert!(
                matches!(Position::parse(text), Err(GameError::InvalidPosition(_))),
                "{:?} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_setup_string_keeps_hands() {
        let text = "G/-l-/---/---/-L-/CGce";
        let game = setup(text);

        assert_eq!(game.in_hand(Side::Sente, Piece::Giraffe), 1);
        assert_eq!(game.in_hand(Side::Gote, Piece::Elephant), 1);
        assert_eq!(game.to_setup_string(), text);
    }

    #[test]
    fn test_render_shows_board_and_hands() {
        let rendered = setup("S/gle/---/-C-/ELG/c").render();

        assert!(rendered.contains("1  g  l  e"));
        assert!(rendered.contains("Gote hand: C"));
        assert!(rendered.contains("Sente hand: -"));
        assert!(rendered.ends_with("Sente to move\n"));
    }

    #[test]
    fn test_drops_cover_every_empty_square() {
        let game = setup("S/gl-/---/---/-L-/CC");
        let drops = game
            .legal_moves()
            .into_iter()
            .filter(|mv| matches!(mv, Move::Drop { .. }))
            .count();

        // one drop per empty square, duplicates in hand are not repeated
        assert_eq!(drops, BOARD_SQUARES - 3);
    }
}
