//! Wager collection and settlement.
//!
//! Each side pays its wager with its own first move: black at move 0, red at
//! move 1. Funding is therefore a function of `move_count` and needs no state
//! of its own.

use soroban_sdk::{contracttype, panic_with_error, Env};

use crate::escrow::Escrow;
use crate::{CheckersError, EvWagerCollected, EvWagerPaid, GameRecord, Player};

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum EscrowState {
    Unfunded = 0,
    BlackFunded = 1,
    FullyFunded = 2,
    Resolved = 3,
}

impl EscrowState {
    pub fn of(game: &GameRecord) -> EscrowState {
        if game.is_resolved() {
            return EscrowState::Resolved;
        }
        match game.move_count {
            0 => EscrowState::Unfunded,
            1 => EscrowState::BlackFunded,
            _ => EscrowState::FullyFunded,
        }
    }
}

/// Take the mover's wager if this is their first move. `game` is the record
/// before the move is applied.
pub(crate) fn collect_if_due(
    env: &Env,
    escrow: &Escrow,
    game: &GameRecord,
) -> Result<(), CheckersError> {
    let (player, err) = match game.move_count {
        0 => (&game.black, CheckersError::BlackCannotPay),
        1 => (&game.red, CheckersError::RedCannotPay),
        _ => return Ok(()),
    };
    escrow.debit(player, game.wager).map_err(|_| err)?;

    if game.wager > 0 {
        EvWagerCollected {
            index: game.index,
            player: player.clone(),
            amount: game.wager,
        }
        .publish(env);
    }
    Ok(())
}

/// Pay out whatever the pool holds for `game`.
///
/// With one wager collected it goes back to black; with both collected the
/// winner takes the pair. The money is already in the pool, so any failure
/// here aborts the whole invocation.
pub(crate) fn resolve(env: &Env, escrow: &Escrow, game: &GameRecord) {
    let (player, amount) = match game.move_count {
        0 => return,
        1 => (&game.black, game.wager),
        _ => {
            let player = match game.winner {
                Player::Black => &game.black,
                Player::Red => &game.red,
                Player::None => panic_with_error!(env, CheckersError::PayoutFailed),
            };
            match game.wager.checked_mul(2) {
                Some(amount) => (player, amount),
                None => panic_with_error!(env, CheckersError::PayoutFailed),
            }
        }
    };

    if escrow.credit(player, amount).is_err() {
        panic_with_error!(env, CheckersError::PayoutFailed);
    }

    if amount > 0 {
        EvWagerPaid {
            index: game.index,
            player: player.clone(),
            amount,
        }
        .publish(env);
    }
}
