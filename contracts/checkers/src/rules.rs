//! # Checkers rules
//!
//! Pure position logic for the standard 8x8 board: text encoding, move
//! legality, captures, promotion and win detection. Nothing in here touches
//! storage or the host, so every function is deterministic over its inputs.
//!
//! ## Board encoding
//! Eight rows of eight cells joined by `|`, row 0 first:
//!
//! ```text
//! *b*b*b*b|b*b*b*b*|*b*b*b*b|********|********|r*r*r*r*|*r*r*r*r|r*r*r*r*
//! ```
//!
//! `*` empty, `b`/`B` black man/king, `r`/`R` red man/king. Pieces only ever
//! stand on dark squares, where `x + y` is odd. Black starts on rows 0-2 and
//! advances toward row 7; red starts on rows 5-7 and advances toward row 0.

pub const BOARD_SIZE: u8 = 8;

/// 8 rows of 8 cells plus 7 row separators.
pub const ENCODED_LEN: usize = 71;

const ROW_SEPARATOR: u8 = b'|';
const ROW_STRIDE: usize = BOARD_SIZE as usize + 1;

const EMPTY_CELL: u8 = b'*';
const BLACK_MAN: u8 = b'b';
const BLACK_KING: u8 = b'B';
const RED_MAN: u8 = b'r';
const RED_KING: u8 = b'R';

const ALL_DIAGONALS: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
const BLACK_FORWARD: [(i8, i8); 2] = [(1, 1), (-1, 1)];
const RED_FORWARD: [(i8, i8); 2] = [(1, -1), (-1, -1)];

// ═══════════════════════════════════════════════════════════════════════════════
//  Pieces & squares
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Color {
    Black,
    Red,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::Red,
            Color::Red => Color::Black,
        }
    }

    /// Row delta of a man's forward step.
    fn forward(self) -> i8 {
        match self {
            Color::Black => 1,
            Color::Red => -1,
        }
    }

    fn promotion_row(self) -> u8 {
        match self {
            Color::Black => BOARD_SIZE - 1,
            Color::Red => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Kind {
    Man,
    King,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Piece {
    pub color: Color,
    pub kind: Kind,
}

impl Piece {
    pub const fn man(color: Color) -> Piece {
        Piece { color, kind: Kind::Man }
    }

    pub const fn king(color: Color) -> Piece {
        Piece { color, kind: Kind::King }
    }

    fn directions(self) -> &'static [(i8, i8)] {
        match (self.kind, self.color) {
            (Kind::King, _) => &ALL_DIAGONALS,
            (Kind::Man, Color::Black) => &BLACK_FORWARD,
            (Kind::Man, Color::Red) => &RED_FORWARD,
        }
    }
}

fn cell_to_byte(cell: Option<Piece>) -> u8 {
    match cell {
        None => EMPTY_CELL,
        Some(Piece { color: Color::Black, kind: Kind::Man }) => BLACK_MAN,
        Some(Piece { color: Color::Black, kind: Kind::King }) => BLACK_KING,
        Some(Piece { color: Color::Red, kind: Kind::Man }) => RED_MAN,
        Some(Piece { color: Color::Red, kind: Kind::King }) => RED_KING,
    }
}

fn cell_from_byte(byte: u8) -> Result<Option<Piece>, DecodeError> {
    match byte {
        EMPTY_CELL => Ok(None),
        BLACK_MAN => Ok(Some(Piece::man(Color::Black))),
        BLACK_KING => Ok(Some(Piece::king(Color::Black))),
        RED_MAN => Ok(Some(Piece::man(Color::Red))),
        RED_KING => Ok(Some(Piece::king(Color::Red))),
        _ => Err(DecodeError::UnknownCell),
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Square {
    pub x: u8,
    pub y: u8,
}

impl Square {
    pub const fn new(x: u8, y: u8) -> Square {
        Square { x, y }
    }

    pub fn from_coords(x: u32, y: u32) -> Result<Square, MoveError> {
        if x >= BOARD_SIZE as u32 || y >= BOARD_SIZE as u32 {
            return Err(MoveError::OffBoard);
        }
        Ok(Square::new(x as u8, y as u8))
    }

    pub fn is_playable(self) -> bool {
        (self.x + self.y) % 2 == 1
    }

    fn offset(self, dx: i8, dy: i8) -> Option<Square> {
        let x = self.x as i8 + dx;
        let y = self.y as i8 + dy;
        if x < 0 || y < 0 || x >= BOARD_SIZE as i8 || y >= BOARD_SIZE as i8 {
            return None;
        }
        Some(Square::new(x as u8, y as u8))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Errors & policy
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DecodeError {
    WrongLength,
    MisplacedSeparator,
    UnknownCell,
    PieceOnLightSquare,
}

/// Why a proposed move was refused.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MoveError {
    OffBoard,
    NoPieceAtSource,
    NotYourPiece,
    DestinationOccupied,
    NotDiagonal,
    /// More than one diagonal hop in a single call.
    TooFar,
    WrongDirection,
    /// The jumped square is empty or holds one of the mover's own pieces.
    NothingToCapture,
    CaptureRequired,
    MustContinueCapture,
}

/// Capture conventions that differ between rule sets.
///
/// `forced_capture`: a simple move is refused while the side to move has any
/// capture available.
///
/// `mandatory_continuation`: after a capture that leaves the same piece with a
/// further capture, the next move must be a capture by that piece. When off,
/// the side keeps the turn but may move any piece.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CapturePolicy {
    pub forced_capture: bool,
    pub mandatory_continuation: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Position
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    /// Indexed `[y][x]`.
    cells: [[Option<Piece>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
}

impl Position {
    pub fn empty() -> Position {
        Position {
            cells: [[None; BOARD_SIZE as usize]; BOARD_SIZE as usize],
        }
    }

    /// Standard opening: three rows of men per side.
    pub fn initial() -> Position {
        let mut position = Position::empty();
        for square in all_squares() {
            if !square.is_playable() {
                continue;
            }
            match square.y {
                0..=2 => position.set(square, Some(Piece::man(Color::Black))),
                5..=7 => position.set(square, Some(Piece::man(Color::Red))),
                _ => {}
            }
        }
        position
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.cells[square.y as usize][square.x as usize]
    }

    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.cells[square.y as usize][square.x as usize] = piece;
    }

    pub fn decode(bytes: &[u8]) -> Result<Position, DecodeError> {
        if bytes.len() != ENCODED_LEN {
            return Err(DecodeError::WrongLength);
        }
        let mut position = Position::empty();
        for y in 0..BOARD_SIZE {
            let row_start = y as usize * ROW_STRIDE;
            if y > 0 && bytes[row_start - 1] != ROW_SEPARATOR {
                return Err(DecodeError::MisplacedSeparator);
            }
            for x in 0..BOARD_SIZE {
                let square = Square::new(x, y);
                let cell = cell_from_byte(bytes[row_start + x as usize])?;
                if cell.is_some() && !square.is_playable() {
                    return Err(DecodeError::PieceOnLightSquare);
                }
                position.set(square, cell);
            }
        }
        Ok(position)
    }

    pub fn encode(&self) -> [u8; ENCODED_LEN] {
        let mut out = [ROW_SEPARATOR; ENCODED_LEN];
        for square in all_squares() {
            out[square.y as usize * ROW_STRIDE + square.x as usize] =
                cell_to_byte(self.piece_at(square));
        }
        out
    }

    pub fn count(&self, color: Color) -> u32 {
        all_squares()
            .filter(|&sq| matches!(self.piece_at(sq), Some(p) if p.color == color))
            .count() as u32
    }

    /// Landing square of a capture by the piece on `from` in direction
    /// `(dx, dy)`, if that capture is available.
    fn capture_landing(&self, from: Square, piece: Piece, dx: i8, dy: i8) -> Option<Square> {
        let over = from.offset(dx, dy)?;
        let landing = from.offset(2 * dx, 2 * dy)?;
        match (self.piece_at(over), self.piece_at(landing)) {
            (Some(jumped), None) if jumped.color != piece.color => Some(landing),
            _ => None,
        }
    }

    pub fn can_capture_from(&self, from: Square) -> bool {
        let Some(piece) = self.piece_at(from) else {
            return false;
        };
        piece
            .directions()
            .iter()
            .any(|&(dx, dy)| self.capture_landing(from, piece, dx, dy).is_some())
    }

    fn can_step_from(&self, from: Square) -> bool {
        let Some(piece) = self.piece_at(from) else {
            return false;
        };
        piece.directions().iter().any(|&(dx, dy)| {
            from.offset(dx, dy)
                .map_or(false, |to| self.piece_at(to).is_none())
        })
    }

    fn squares_of(&self, color: Color) -> impl Iterator<Item = Square> + '_ {
        all_squares().filter(move |&sq| matches!(self.piece_at(sq), Some(p) if p.color == color))
    }

    pub fn has_any_capture(&self, color: Color) -> bool {
        self.squares_of(color).any(|sq| self.can_capture_from(sq))
    }

    pub fn has_any_move(&self, color: Color) -> bool {
        self.squares_of(color)
            .any(|sq| self.can_step_from(sq) || self.can_capture_from(sq))
    }
}

fn all_squares() -> impl Iterator<Item = Square> {
    (0..BOARD_SIZE).flat_map(|y| (0..BOARD_SIZE).map(move |x| Square::new(x, y)))
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Moves
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MoveResult {
    pub position: Position,
    pub captured: Option<Square>,
    pub promoted: bool,
    /// Same as the mover when the moved piece must (or may) keep capturing.
    pub next_turn: Color,
}

/// Validate and play a single step or single jump for `turn`.
///
/// `chain_from` is the square of the piece that captured last and still has a
/// capture available, if the previous move left the turn with `turn`.
pub fn apply_move(
    position: &Position,
    turn: Color,
    from: Square,
    to: Square,
    policy: CapturePolicy,
    chain_from: Option<Square>,
) -> Result<MoveResult, MoveError> {
    let piece = position.piece_at(from).ok_or(MoveError::NoPieceAtSource)?;
    if piece.color != turn {
        return Err(MoveError::NotYourPiece);
    }
    let chained = policy.mandatory_continuation && chain_from.is_some();
    if chained && chain_from != Some(from) {
        return Err(MoveError::MustContinueCapture);
    }
    if position.piece_at(to).is_some() {
        return Err(MoveError::DestinationOccupied);
    }

    let dx = to.x as i8 - from.x as i8;
    let dy = to.y as i8 - from.y as i8;
    if dx == 0 || dx.abs() != dy.abs() {
        return Err(MoveError::NotDiagonal);
    }
    if dx.abs() > 2 {
        return Err(MoveError::TooFar);
    }
    if piece.kind == Kind::Man && dy.signum() != turn.forward() {
        return Err(MoveError::WrongDirection);
    }

    let mut next = position.clone();
    let captured = if dx.abs() == 2 {
        let over = Square::new(
            (from.x as i8 + dx / 2) as u8,
            (from.y as i8 + dy / 2) as u8,
        );
        match position.piece_at(over) {
            Some(jumped) if jumped.color != turn => {}
            _ => return Err(MoveError::NothingToCapture),
        }
        next.set(over, None);
        Some(over)
    } else {
        if chained {
            return Err(MoveError::MustContinueCapture);
        }
        if policy.forced_capture && position.has_any_capture(turn) {
            return Err(MoveError::CaptureRequired);
        }
        None
    };

    let promoted = piece.kind == Kind::Man && to.y == turn.promotion_row();
    next.set(from, None);
    next.set(to, Some(if promoted { Piece::king(turn) } else { piece }));

    let next_turn = if captured.is_some() && next.can_capture_from(to) {
        turn
    } else {
        turn.opponent()
    };

    Ok(MoveResult {
        position: next,
        captured,
        promoted,
        next_turn,
    })
}

/// A side with no pieces, or with no legal move on its turn, has lost.
pub fn winner(position: &Position, to_move: Color) -> Option<Color> {
    if position.count(Color::Black) == 0 {
        return Some(Color::Red);
    }
    if position.count(Color::Red) == 0 {
        return Some(Color::Black);
    }
    if !position.has_any_move(to_move) {
        return Some(to_move.opponent());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &[u8; ENCODED_LEN] =
        b"*b*b*b*b|b*b*b*b*|*b*b*b*b|********|********|r*r*r*r*|*r*r*r*r|r*r*r*r*";

    const LENIENT: CapturePolicy = CapturePolicy {
        forced_capture: false,
        mandatory_continuation: false,
    };
    const STRICT: CapturePolicy = CapturePolicy {
        forced_capture: true,
        mandatory_continuation: true,
    };

    fn position(rows: [&str; 8]) -> Position {
        let mut buf = [ROW_SEPARATOR; ENCODED_LEN];
        for (y, row) in rows.iter().enumerate() {
            buf[y * ROW_STRIDE..y * ROW_STRIDE + 8].copy_from_slice(row.as_bytes());
        }
        Position::decode(&buf).unwrap()
    }

    fn sq(x: u8, y: u8) -> Square {
        Square::new(x, y)
    }

    #[test]
    fn initial_position_encodes_to_start_board() {
        assert_eq!(&Position::initial().encode(), START);
        assert_eq!(Position::initial().count(Color::Black), 12);
        assert_eq!(Position::initial().count(Color::Red), 12);
    }

    #[test]
    fn decode_encode_is_exact() {
        let board = b"*b*B****|********|***r****|R*******|*****b**|********|*r******|********";
        let decoded = Position::decode(board).unwrap();
        assert_eq!(&decoded.encode(), board);
        assert_eq!(decoded.piece_at(sq(3, 0)), Some(Piece::king(Color::Black)));
        assert_eq!(decoded.piece_at(sq(0, 3)), Some(Piece::king(Color::Red)));
    }

    #[test]
    fn decode_rejects_malformed_boards() {
        assert_eq!(Position::decode(b"*b*b"), Err(DecodeError::WrongLength));

        let mut bad_char = *START;
        bad_char[1] = b'x';
        assert_eq!(Position::decode(&bad_char), Err(DecodeError::UnknownCell));

        let mut bad_separator = *START;
        bad_separator[8] = b'*';
        assert_eq!(
            Position::decode(&bad_separator),
            Err(DecodeError::MisplacedSeparator)
        );

        let mut light_square = *START;
        light_square[0] = b'b';
        assert_eq!(
            Position::decode(&light_square),
            Err(DecodeError::PieceOnLightSquare)
        );
    }

    #[test]
    fn simple_step_flips_turn() {
        let result = apply_move(
            &Position::initial(),
            Color::Black,
            sq(1, 2),
            sq(2, 3),
            LENIENT,
            None,
        )
        .unwrap();
        assert_eq!(result.captured, None);
        assert!(!result.promoted);
        assert_eq!(result.next_turn, Color::Red);
        assert_eq!(result.position.piece_at(sq(1, 2)), None);
        assert_eq!(
            result.position.piece_at(sq(2, 3)),
            Some(Piece::man(Color::Black))
        );
    }

    #[test]
    fn non_diagonal_move_is_refused() {
        let start = Position::initial();
        assert_eq!(
            apply_move(&start, Color::Black, sq(1, 2), sq(1, 3), LENIENT, None),
            Err(MoveError::NotDiagonal)
        );
        assert_eq!(
            apply_move(&start, Color::Black, sq(1, 2), sq(3, 3), LENIENT, None),
            Err(MoveError::NotDiagonal)
        );
    }

    #[test]
    fn source_and_destination_are_checked() {
        let start = Position::initial();
        assert_eq!(
            apply_move(&start, Color::Black, sq(0, 3), sq(1, 4), LENIENT, None),
            Err(MoveError::NoPieceAtSource)
        );
        assert_eq!(
            apply_move(&start, Color::Black, sq(0, 5), sq(1, 4), LENIENT, None),
            Err(MoveError::NotYourPiece)
        );
        assert_eq!(
            apply_move(&start, Color::Black, sq(0, 1), sq(1, 2), LENIENT, None),
            Err(MoveError::DestinationOccupied)
        );
        assert_eq!(Square::from_coords(8, 0), Err(MoveError::OffBoard));
        assert_eq!(Square::from_coords(0, 3), Ok(sq(0, 3)));
    }

    #[test]
    fn men_cannot_move_backward() {
        let board = position([
            "********", "********", "********", "**b*****",
            "********", "********", "*r******", "********",
        ]);
        assert_eq!(
            apply_move(&board, Color::Black, sq(2, 3), sq(1, 2), LENIENT, None),
            Err(MoveError::WrongDirection)
        );
        assert_eq!(
            apply_move(&board, Color::Red, sq(1, 6), sq(0, 7), LENIENT, None),
            Err(MoveError::WrongDirection)
        );
    }

    #[test]
    fn two_hops_in_one_call_are_refused() {
        let board = position([
            "********", "**b*****", "***r****", "********",
            "*****r**", "********", "********", "********",
        ]);
        assert_eq!(
            apply_move(&board, Color::Black, sq(2, 1), sq(6, 5), LENIENT, None),
            Err(MoveError::TooFar)
        );
    }

    #[test]
    fn jump_removes_the_captured_piece() {
        let board = position([
            "********", "********", "********", "**b*****",
            "***r****", "********", "*r******", "********",
        ]);
        let result =
            apply_move(&board, Color::Black, sq(2, 3), sq(4, 5), LENIENT, None).unwrap();
        assert_eq!(result.captured, Some(sq(3, 4)));
        assert_eq!(result.position.piece_at(sq(3, 4)), None);
        assert_eq!(result.position.count(Color::Red), 1);
        assert_eq!(result.next_turn, Color::Red);
    }

    #[test]
    fn jump_needs_an_opposing_piece() {
        let board = position([
            "********", "********", "********", "**b*****",
            "***b****", "********", "*r******", "********",
        ]);
        assert_eq!(
            apply_move(&board, Color::Black, sq(2, 3), sq(4, 5), LENIENT, None),
            Err(MoveError::NothingToCapture)
        );
        let empty_jump = position([
            "********", "********", "********", "**b*****",
            "********", "********", "*r******", "********",
        ]);
        assert_eq!(
            apply_move(&empty_jump, Color::Black, sq(2, 3), sq(4, 5), LENIENT, None),
            Err(MoveError::NothingToCapture)
        );
    }

    #[test]
    fn man_reaching_far_row_is_crowned_and_moves_backward() {
        let board = position([
            "********", "********", "********", "********",
            "********", "********", "*b*****r", "********",
        ]);
        let crowned =
            apply_move(&board, Color::Black, sq(1, 6), sq(0, 7), LENIENT, None).unwrap();
        assert!(crowned.promoted);
        assert_eq!(
            crowned.position.piece_at(sq(0, 7)),
            Some(Piece::king(Color::Black))
        );

        let back = apply_move(
            &crowned.position,
            Color::Black,
            sq(0, 7),
            sq(1, 6),
            LENIENT,
            None,
        )
        .unwrap();
        assert_eq!(
            back.position.piece_at(sq(1, 6)),
            Some(Piece::king(Color::Black))
        );
        assert!(!back.promoted);
    }

    #[test]
    fn kings_capture_backward() {
        let board = position([
            "********", "********", "********", "**r*****",
            "***B****", "********", "*r******", "********",
        ]);
        let result =
            apply_move(&board, Color::Black, sq(3, 4), sq(1, 2), LENIENT, None).unwrap();
        assert_eq!(result.captured, Some(sq(2, 3)));
    }

    #[test]
    fn further_capture_keeps_the_turn() {
        let board = position([
            "********", "b*b*****", "***r****", "********",
            "*****r**", "********", "********", "********",
        ]);
        let first =
            apply_move(&board, Color::Black, sq(2, 1), sq(4, 3), STRICT, None).unwrap();
        assert_eq!(first.next_turn, Color::Black);

        let second = apply_move(
            &first.position,
            Color::Black,
            sq(4, 3),
            sq(6, 5),
            STRICT,
            Some(sq(4, 3)),
        )
        .unwrap();
        assert_eq!(second.captured, Some(sq(5, 4)));
        assert_eq!(winner(&second.position, second.next_turn), Some(Color::Black));
    }

    #[test]
    fn mandatory_continuation_pins_the_capturing_piece() {
        let board = position([
            "********", "b*b*****", "***r****", "********",
            "*****r**", "********", "********", "********",
        ]);
        let first =
            apply_move(&board, Color::Black, sq(2, 1), sq(4, 3), STRICT, None).unwrap();

        assert_eq!(
            apply_move(
                &first.position,
                Color::Black,
                sq(0, 1),
                sq(1, 2),
                STRICT,
                Some(sq(4, 3)),
            ),
            Err(MoveError::MustContinueCapture)
        );
        assert_eq!(
            apply_move(
                &first.position,
                Color::Black,
                sq(4, 3),
                sq(5, 4),
                STRICT,
                Some(sq(4, 3)),
            ),
            Err(MoveError::DestinationOccupied)
        );
        assert_eq!(
            apply_move(
                &first.position,
                Color::Black,
                sq(4, 3),
                sq(3, 4),
                STRICT,
                Some(sq(4, 3)),
            ),
            Err(MoveError::MustContinueCapture)
        );
    }

    #[test]
    fn voluntary_continuation_allows_any_piece() {
        let board = position([
            "********", "b*b*****", "***r****", "********",
            "*****r**", "********", "********", "********",
        ]);
        let first =
            apply_move(&board, Color::Black, sq(2, 1), sq(4, 3), LENIENT, None).unwrap();
        let other = apply_move(
            &first.position,
            Color::Black,
            sq(0, 1),
            sq(1, 2),
            LENIENT,
            Some(sq(4, 3)),
        )
        .unwrap();
        assert_eq!(other.next_turn, Color::Red);
    }

    #[test]
    fn forced_capture_refuses_simple_moves() {
        let board = position([
            "********", "******b*", "********", "**b*****",
            "***r****", "********", "*r******", "********",
        ]);
        let forced = CapturePolicy {
            forced_capture: true,
            mandatory_continuation: false,
        };
        assert_eq!(
            apply_move(&board, Color::Black, sq(6, 1), sq(7, 2), forced, None),
            Err(MoveError::CaptureRequired)
        );
        assert!(apply_move(&board, Color::Black, sq(6, 1), sq(7, 2), LENIENT, None).is_ok());
        assert!(apply_move(&board, Color::Black, sq(2, 3), sq(4, 5), forced, None).is_ok());
    }

    #[test]
    fn winner_by_elimination_and_blockade() {
        assert_eq!(winner(&Position::initial(), Color::Black), None);

        let no_red = position([
            "*b******", "********", "********", "********",
            "********", "********", "********", "********",
        ]);
        assert_eq!(winner(&no_red, Color::Red), Some(Color::Black));

        let blocked = position([
            "********", "********", "********", "********",
            "********", "**b*****", "*b******", "r*******",
        ]);
        assert_eq!(winner(&blocked, Color::Red), Some(Color::Black));
        assert_eq!(winner(&blocked, Color::Black), None);
    }
}
