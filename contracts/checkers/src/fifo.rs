//! Expiry queue threaded through the game records themselves.
//!
//! Every unresolved game sits in one doubly-linked list ordered by deadline:
//! each accepted move gives the mover's opponent a fresh full turn, so the
//! game that just moved always has the latest deadline and goes to the tail.
//! The head is therefore the first game to expire.
//!
//! These functions update the neighbours in storage directly. The record
//! being linked or unlinked and the `SystemInfo` are only changed in memory;
//! the caller persists both (or deletes the record).

use soroban_sdk::{panic_with_error, Env, Vec};

use crate::{storage, CheckersError, GameRecord, SystemInfo};

fn load_neighbor(env: &Env, index: u64) -> GameRecord {
    match storage::read_game(env, index) {
        Some(game) => game,
        None => panic_with_error!(env, CheckersError::FifoCorrupted),
    }
}

pub(crate) fn peek_head(info: &SystemInfo) -> Option<u64> {
    info.fifo_head
}

/// Link `game` in as the new tail. `game` must not be linked already.
pub(crate) fn push_tail(env: &Env, game: &mut GameRecord, info: &mut SystemInfo) {
    game.before_index = info.fifo_tail;
    game.after_index = None;

    match info.fifo_tail {
        Some(tail) => {
            let mut prev = load_neighbor(env, tail);
            prev.after_index = Some(game.index);
            storage::write_game(env, &prev);
        }
        None => info.fifo_head = Some(game.index),
    }
    info.fifo_tail = Some(game.index);
}

/// Unlink `game`, joining its neighbours to each other.
pub(crate) fn remove(env: &Env, game: &mut GameRecord, info: &mut SystemInfo) {
    match game.before_index {
        Some(before) => {
            let mut prev = load_neighbor(env, before);
            prev.after_index = game.after_index;
            storage::write_game(env, &prev);
        }
        None => {
            if info.fifo_head != Some(game.index) {
                panic_with_error!(env, CheckersError::FifoCorrupted);
            }
            info.fifo_head = game.after_index;
        }
    }

    match game.after_index {
        Some(after) => {
            let mut next = load_neighbor(env, after);
            next.before_index = game.before_index;
            storage::write_game(env, &next);
        }
        None => {
            if info.fifo_tail != Some(game.index) {
                panic_with_error!(env, CheckersError::FifoCorrupted);
            }
            info.fifo_tail = game.before_index;
        }
    }

    game.before_index = None;
    game.after_index = None;
}

pub(crate) fn move_to_tail(env: &Env, game: &mut GameRecord, info: &mut SystemInfo) {
    if info.fifo_tail == Some(game.index) {
        return;
    }
    remove(env, game, info);
    push_tail(env, game, info);
}

/// Indices from head to tail. A list longer than the number of games ever
/// created can only be a cycle.
pub(crate) fn walk(env: &Env, info: &SystemInfo) -> Vec<u64> {
    let mut out = Vec::new(env);
    let mut cursor = info.fifo_head;
    let mut steps: u64 = 0;

    while let Some(index) = cursor {
        steps += 1;
        if steps > info.next_id {
            panic_with_error!(env, CheckersError::FifoCorrupted);
        }
        out.push_back(index);
        cursor = load_neighbor(env, index).after_index;
    }
    out
}
