#![no_std]

//! # Checkers
//!
//! Two-player checkers with an optional wager per game, held in escrow by
//! this contract until the game is decided.
//!
//! ## Game flow
//! 1. Anyone creates a game for a black and a red player with a wager. The
//!    game joins the tail of the expiry FIFO with a deadline one turn away.
//! 2. Players alternate `play_move` calls, black first. Black's first move
//!    pulls black's wager into the pool; red's first move pulls red's.
//! 3. Every accepted move refreshes the deadline and moves the game to the
//!    FIFO tail, so the FIFO stays ordered by deadline.
//! 4. A move that leaves the opponent without pieces or without a legal move
//!    wins, and the pool pays `2 × wager` to the winner.
//! 5. Before funding completes, either side may reject the game. Black's wager
//!    is refunded if it was taken and the game is deleted.
//! 6. `sweep` walks the FIFO from the head and forfeits every overdue game
//!    against the side that failed to move.
//!
//! ## Failure model
//! Bad input, illegal moves and failed wager collection return a
//! `CheckersError` and leave no trace. A payout that fails after funds were
//! collected, a missing `SystemInfo` or a broken FIFO link means the
//! contract's own state is corrupt: those abort with `panic_with_error!`, which
//! discards every write and transfer of the invocation.

mod escrow;
mod fifo;
pub mod rules;
mod storage;
mod wager;

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, panic_with_error,
    Address, BytesN, Env, String, Vec,
};

use escrow::Escrow;
use rules::{CapturePolicy, Color, MoveError, MoveResult, Position, Square};
pub use wager::EscrowState;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvGameCreated {
    pub index: u64,
    pub black: Address,
    pub red: Address,
    pub wager: i128,
}

#[contractevent]
pub struct EvMovePlayed {
    pub index: u64,
    pub player: Address,
    pub from: Pos,
    pub to: Pos,
    pub captured: Option<Pos>,
    pub promoted: bool,
    pub move_count: u64,
}

#[contractevent]
pub struct EvGameWon {
    pub index: u64,
    pub winner: Player,
    pub board: String,
}

#[contractevent]
pub struct EvGameRejected {
    pub index: u64,
    pub player: Address,
}

/// Emitted by `sweep`. `move_count <= 1` means the game was deleted rather
/// than kept with a winner.
#[contractevent]
pub struct EvGameForfeited {
    pub index: u64,
    pub winner: Player,
    pub move_count: u64,
}

#[contractevent]
pub struct EvWagerCollected {
    pub index: u64,
    pub player: Address,
    pub amount: i128,
}

#[contractevent]
pub struct EvWagerPaid {
    pub index: u64,
    pub player: Address,
    pub amount: i128,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum CheckersError {
    GameNotFound = 1,
    GameFinished = 2,
    NotAPlayer = 3,
    NotYourTurn = 4,
    SelfPlayNotAllowed = 5,
    InvalidWager = 6,
    BlackAlreadyPlayed = 7,
    RedAlreadyPlayed = 8,
    BlackCannotPay = 9,
    RedCannotPay = 10,
    AdminNotSet = 11,
    TokenNotSet = 12,
    RulesNotSet = 13,

    // Rule violations
    OffBoard = 20,
    NoPieceAtSource = 21,
    NotYourPiece = 22,
    DestinationOccupied = 23,
    NotDiagonal = 24,
    TooFar = 25,
    WrongDirection = 26,
    NothingToCapture = 27,
    CaptureRequired = 28,
    MustContinueCapture = 29,

    // Corrupted state. Raised with panic_with_error!, never returned.
    SystemInfoNotFound = 50,
    PayoutFailed = 51,
    FifoCorrupted = 52,
    BoardNotParseable = 53,
}

impl From<MoveError> for CheckersError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::OffBoard => CheckersError::OffBoard,
            MoveError::NoPieceAtSource => CheckersError::NoPieceAtSource,
            MoveError::NotYourPiece => CheckersError::NotYourPiece,
            MoveError::DestinationOccupied => CheckersError::DestinationOccupied,
            MoveError::NotDiagonal => CheckersError::NotDiagonal,
            MoveError::TooFar => CheckersError::TooFar,
            MoveError::WrongDirection => CheckersError::WrongDirection,
            MoveError::NothingToCapture => CheckersError::NothingToCapture,
            MoveError::CaptureRequired => CheckersError::CaptureRequired,
            MoveError::MustContinueCapture => CheckersError::MustContinueCapture,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Game state
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Player {
    None = 0,
    Black = 1,
    Red = 2,
}

impl Player {
    pub fn color(self) -> Option<Color> {
        match self {
            Player::None => None,
            Player::Black => Some(Color::Black),
            Player::Red => Some(Color::Red),
        }
    }
}

impl From<Color> for Player {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Player::Black,
            Color::Red => Player::Red,
        }
    }
}

/// Board coordinate: `x` is the column, `y` the row, row 0 is black's home row.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pos {
    pub x: u32,
    pub y: u32,
}

impl Pos {
    fn square(self) -> Result<Square, CheckersError> {
        Ok(Square::from_coords(self.x, self.y)?)
    }
}

impl From<Square> for Pos {
    fn from(square: Square) -> Self {
        Pos {
            x: square.x as u32,
            y: square.y as u32,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameRecord {
    pub index: u64,
    pub board: String,
    /// `Player::None` once the game is decided.
    pub turn: Player,
    pub black: Address,
    pub red: Address,
    pub wager: i128,
    pub move_count: u64,
    /// Ledger timestamp after which `sweep` may forfeit the game.
    pub deadline: u64,
    pub before_index: Option<u64>,
    pub after_index: Option<u64>,
    pub winner: Player,
    /// Piece that must keep capturing, when the last move kept the turn.
    pub chain_from: Option<Pos>,
}

impl GameRecord {
    pub fn is_resolved(&self) -> bool {
        self.winner != Player::None
    }

    fn color_of(&self, player: &Address) -> Result<Color, CheckersError> {
        if *player == self.black {
            Ok(Color::Black)
        } else if *player == self.red {
            Ok(Color::Red)
        } else {
            Err(CheckersError::NotAPlayer)
        }
    }

    fn position(&self, env: &Env) -> Position {
        if self.board.len() as usize != rules::ENCODED_LEN {
            panic_with_error!(env, CheckersError::BoardNotParseable);
        }
        let mut buf = [0u8; rules::ENCODED_LEN];
        self.board.copy_into_slice(&mut buf);
        match Position::decode(&buf) {
            Ok(position) => position,
            Err(_) => panic_with_error!(env, CheckersError::BoardNotParseable),
        }
    }
}

/// Singleton bookkeeping: id counter and the ends of the expiry FIFO.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SystemInfo {
    pub next_id: u64,
    pub fifo_head: Option<u64>,
    pub fifo_tail: Option<u64>,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RulesConfig {
    pub forced_capture: bool,
    pub mandatory_continuation: bool,
}

impl From<RulesConfig> for CapturePolicy {
    fn from(config: RulesConfig) -> Self {
        CapturePolicy {
            forced_capture: config.forced_capture,
            mandatory_continuation: config.mandatory_continuation,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MoveOutcome {
    pub captured: Option<Pos>,
    /// The moved man was crowned on this move.
    pub promoted: bool,
    pub winner: Player,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Every move gets the same 24 hours.
pub const MAX_TURN_DURATION_SECS: u64 = 24 * 60 * 60;

/// Upper bound on games forfeited by one `sweep` call. The next call resumes
/// from the same FIFO head.
pub const MAX_SWEEP_PER_CALL: u32 = 64;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct CheckersContract;

#[contractimpl]
impl CheckersContract {
    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Constructor
    // ───────────────────────────────────────────────────────────────────────────

    pub fn __constructor(env: Env, admin: Address, token: Address, rules: RulesConfig) {
        storage::write_admin(&env, &admin);
        storage::write_token(&env, &token);
        storage::write_rules(&env, &rules);
        storage::write_system_info(
            &env,
            &SystemInfo {
                next_id: 1,
                fifo_head: None,
                fifo_tail: None,
            },
        );
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Game lifecycle
    // ───────────────────────────────────────────────────────────────────────────

    /// Create a game and queue it for expiry. Returns the new game index.
    pub fn create_game(
        env: Env,
        creator: Address,
        black: Address,
        red: Address,
        wager: i128,
    ) -> Result<u64, CheckersError> {
        creator.require_auth();

        if wager < 0 {
            return Err(CheckersError::InvalidWager);
        }
        if black == red {
            return Err(CheckersError::SelfPlayNotAllowed);
        }

        let mut info = storage::read_system_info(&env);
        let index = info.next_id;

        let mut game = GameRecord {
            index,
            board: Self::board_string(&env, &Position::initial()),
            turn: Player::Black,
            black,
            red,
            wager,
            move_count: 0,
            deadline: Self::next_deadline(&env),
            before_index: None,
            after_index: None,
            winner: Player::None,
            chain_from: None,
        };

        fifo::push_tail(&env, &mut game, &mut info);
        info.next_id += 1;

        storage::write_game(&env, &game);
        storage::write_system_info(&env, &info);
        storage::add_player_game(&env, &game.black, index);
        storage::add_player_game(&env, &game.red, index);

        EvGameCreated {
            index,
            black: game.black,
            red: game.red,
            wager,
        }
        .publish(&env);

        Ok(index)
    }

    /// Play one step or one jump. A multi-capture is played as a sequence of
    /// calls by the same side.
    pub fn play_move(
        env: Env,
        player: Address,
        index: u64,
        from: Pos,
        to: Pos,
    ) -> Result<MoveOutcome, CheckersError> {
        player.require_auth();

        let mut game = storage::load_game(&env, index)?;
        let result = Self::check_move(&env, &game, &player, from, to)?;
        let mover = game.color_of(&player)?;

        let escrow = Escrow::new(&env, &storage::load_token(&env)?);
        wager::collect_if_due(&env, &escrow, &game)?;

        // Nothing below can fail short of corrupted state.
        let mut info = storage::read_system_info(&env);
        game.move_count += 1;
        game.deadline = Self::next_deadline(&env);
        game.board = Self::board_string(&env, &result.position);

        match rules::winner(&result.position, result.next_turn) {
            Some(color) => {
                fifo::remove(&env, &mut game, &mut info);
                game.winner = Player::from(color);
                game.turn = Player::None;
                game.chain_from = None;
                wager::resolve(&env, &escrow, &game);

                EvGameWon {
                    index,
                    winner: game.winner,
                    board: game.board.clone(),
                }
                .publish(&env);
            }
            None => {
                fifo::move_to_tail(&env, &mut game, &mut info);
                game.turn = Player::from(result.next_turn);
                game.chain_from = if result.next_turn == mover {
                    Some(to)
                } else {
                    None
                };
            }
        }

        storage::write_game(&env, &game);
        storage::write_system_info(&env, &info);

        let captured = result.captured.map(Pos::from);
        EvMovePlayed {
            index,
            player,
            from,
            to,
            captured,
            promoted: result.promoted,
            move_count: game.move_count,
        }
        .publish(&env);

        Ok(MoveOutcome {
            captured,
            promoted: result.promoted,
            winner: game.winner,
        })
    }

    /// Reject a game before the rejecting side has paid its wager. The game is
    /// deleted; black's wager is refunded when it was already collected.
    pub fn reject_game(env: Env, player: Address, index: u64) -> Result<(), CheckersError> {
        player.require_auth();

        let mut game = storage::load_game(&env, index)?;
        if game.is_resolved() {
            return Err(CheckersError::GameFinished);
        }
        match game.color_of(&player)? {
            Color::Black if game.move_count > 0 => {
                return Err(CheckersError::BlackAlreadyPlayed);
            }
            Color::Red if game.move_count > 1 => {
                return Err(CheckersError::RedAlreadyPlayed);
            }
            _ => {}
        }
        let escrow = Escrow::new(&env, &storage::load_token(&env)?);

        let mut info = storage::read_system_info(&env);
        fifo::remove(&env, &mut game, &mut info);
        storage::remove_game(&env, &game);
        wager::resolve(&env, &escrow, &game);
        storage::write_system_info(&env, &info);

        EvGameRejected { index, player }.publish(&env);
        Ok(())
    }

    /// Forfeit every overdue game, oldest deadline first, against the side
    /// whose turn it was. Returns how many games were resolved.
    pub fn sweep(env: Env) -> Result<u32, CheckersError> {
        let escrow = Escrow::new(&env, &storage::load_token(&env)?);
        let now = env.ledger().timestamp();
        let mut info = storage::read_system_info(&env);
        let mut resolved: u32 = 0;

        while resolved < MAX_SWEEP_PER_CALL {
            let Some(head) = fifo::peek_head(&info) else {
                break;
            };
            let mut game = match storage::read_game(&env, head) {
                Some(game) => game,
                None => panic_with_error!(&env, CheckersError::FifoCorrupted),
            };
            // The FIFO is in deadline order: nothing behind a live head is due.
            if game.deadline >= now {
                break;
            }

            fifo::remove(&env, &mut game, &mut info);
            Self::forfeit(&env, &escrow, &mut game);
            resolved += 1;
        }

        if resolved > 0 {
            storage::write_system_info(&env, &info);
        }
        Ok(resolved)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Read
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_game(env: Env, index: u64) -> Result<GameRecord, CheckersError> {
        storage::load_game(&env, index)
    }

    pub fn get_system_info(env: Env) -> SystemInfo {
        storage::read_system_info(&env)
    }

    /// Indices of all unresolved games, soonest deadline first.
    pub fn get_fifo(env: Env) -> Vec<u64> {
        let info = storage::read_system_info(&env);
        fifo::walk(&env, &info)
    }

    /// Indices of every stored game `player` plays in, oldest first. Games
    /// that were rejected or swept before full funding are gone from the list;
    /// decided games stay.
    pub fn get_player_games(env: Env, player: Address) -> Vec<u64> {
        storage::read_player_games(&env, &player)
    }

    pub fn get_escrow_state(env: Env, index: u64) -> Result<EscrowState, CheckersError> {
        let game = storage::load_game(&env, index)?;
        Ok(EscrowState::of(&game))
    }

    /// Run every `play_move` check without committing anything.
    pub fn can_play_move(
        env: Env,
        player: Address,
        index: u64,
        from: Pos,
        to: Pos,
    ) -> Result<(), CheckersError> {
        let game = storage::load_game(&env, index)?;
        Self::check_move(&env, &game, &player, from, to)?;
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Admin
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_admin(env: Env) -> Result<Address, CheckersError> {
        storage::load_admin(&env)
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), CheckersError> {
        let admin = storage::load_admin(&env)?;
        admin.require_auth();
        storage::write_admin(&env, &new_admin);
        Ok(())
    }

    pub fn get_token(env: Env) -> Result<Address, CheckersError> {
        storage::load_token(&env)
    }

    pub fn get_rules(env: Env) -> Result<RulesConfig, CheckersError> {
        storage::load_rules(&env)
    }

    /// Change the capture policy. Applies to every move from now on,
    /// including moves in games already in progress.
    pub fn set_rules(env: Env, rules: RulesConfig) -> Result<(), CheckersError> {
        let admin = storage::load_admin(&env)?;
        admin.require_auth();
        storage::write_rules(&env, &rules);
        Ok(())
    }

    pub fn upgrade(env: Env, new_wasm_hash: BytesN<32>) -> Result<(), CheckersError> {
        let admin = storage::load_admin(&env)?;
        admin.require_auth();
        env.deployer().update_current_contract_wasm(new_wasm_hash);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Move validation
    // ═══════════════════════════════════════════════════════════════════════════

    fn check_move(
        env: &Env,
        game: &GameRecord,
        player: &Address,
        from: Pos,
        to: Pos,
    ) -> Result<MoveResult, CheckersError> {
        if game.is_resolved() {
            return Err(CheckersError::GameFinished);
        }
        let color = game.color_of(player)?;
        if game.turn != Player::from(color) {
            return Err(CheckersError::NotYourTurn);
        }

        let policy: CapturePolicy = storage::load_rules(env)?.into();
        let chain_from = match game.chain_from {
            Some(pos) => Some(pos.square()?),
            None => None,
        };
        let position = game.position(env);

        Ok(rules::apply_move(
            &position,
            color,
            from.square()?,
            to.square()?,
            policy,
            chain_from,
        )?)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Forfeiture
    // ═══════════════════════════════════════════════════════════════════════════

    /// Resolve an overdue game that has already been unlinked from the FIFO.
    fn forfeit(env: &Env, escrow: &Escrow, game: &mut GameRecord) {
        let loser = match game.turn.color() {
            Some(color) => color,
            None => panic_with_error!(env, CheckersError::FifoCorrupted),
        };
        let winner = Player::from(loser.opponent());

        if game.move_count <= 1 {
            // Never fully funded: drop the game, hand back anything taken.
            storage::remove_game(env, game);
            wager::resolve(env, escrow, game);
        } else {
            game.winner = winner;
            game.turn = Player::None;
            game.chain_from = None;
            wager::resolve(env, escrow, game);
            storage::write_game(env, game);
        }

        EvGameForfeited {
            index: game.index,
            winner,
            move_count: game.move_count,
        }
        .publish(env);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal: Helpers
    // ═══════════════════════════════════════════════════════════════════════════

    fn next_deadline(env: &Env) -> u64 {
        env.ledger().timestamp().saturating_add(MAX_TURN_DURATION_SECS)
    }

    fn board_string(env: &Env, position: &Position) -> String {
        String::from_bytes(env, &position.encode())
    }
}
