use soroban_sdk::{contracttype, panic_with_error, Address, Env, Vec};

use crate::{CheckersError, GameRecord, RulesConfig, SystemInfo};

#[contracttype]
#[derive(Clone)]
enum StorageKey {
    Admin,
    Token,
    Rules,
    SystemInfo,
    Game(u64),
    /// Indices of every stored game the address plays in, oldest first.
    PlayerGames(Address),
}

// TTLs are set in ledgers; one ledger closes about every 5 seconds.
const LEDGER_RATE_SECS: u32 = 5;

// A turn lasts at most a day; 30 days leaves room for slow sweeps.
const TTL_SECONDS: u32 = 30 * 24 * 60 * 60;

/// TTL for game and singleton storage in ledgers: 518,400 ledgers
pub(crate) const GAME_TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

// ───────────────────────────────────────────────────────────────────────────────
//  Games
// ───────────────────────────────────────────────────────────────────────────────

pub(crate) fn read_game(env: &Env, index: u64) -> Option<GameRecord> {
    env.storage().persistent().get(&StorageKey::Game(index))
}

pub(crate) fn load_game(env: &Env, index: u64) -> Result<GameRecord, CheckersError> {
    read_game(env, index).ok_or(CheckersError::GameNotFound)
}

pub(crate) fn write_game(env: &Env, game: &GameRecord) {
    let key = StorageKey::Game(game.index);
    env.storage().persistent().set(&key, game);
    env.storage()
        .persistent()
        .extend_ttl(&key, GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);
}

/// Delete the record and its entries in both players' indices.
pub(crate) fn remove_game(env: &Env, game: &GameRecord) {
    env.storage().persistent().remove(&StorageKey::Game(game.index));
    remove_player_game(env, &game.black, game.index);
    remove_player_game(env, &game.red, game.index);
}

// ───────────────────────────────────────────────────────────────────────────────
//  Per-player index
// ───────────────────────────────────────────────────────────────────────────────

pub(crate) fn read_player_games(env: &Env, player: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&StorageKey::PlayerGames(player.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

fn write_player_games(env: &Env, player: &Address, games: &Vec<u64>) {
    let key = StorageKey::PlayerGames(player.clone());
    if games.is_empty() {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, games);
    env.storage()
        .persistent()
        .extend_ttl(&key, GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);
}

pub(crate) fn add_player_game(env: &Env, player: &Address, index: u64) {
    let mut games = read_player_games(env, player);
    games.push_back(index);
    write_player_games(env, player, &games);
}

fn remove_player_game(env: &Env, player: &Address, index: u64) {
    let mut games = read_player_games(env, player);
    if let Some(pos) = games.first_index_of(index) {
        games.remove(pos);
        write_player_games(env, player, &games);
    }
}

// ───────────────────────────────────────────────────────────────────────────────
//  Singleton
// ───────────────────────────────────────────────────────────────────────────────

/// The constructor always writes `SystemInfo`, so a miss is corruption.
pub(crate) fn read_system_info(env: &Env) -> SystemInfo {
    match env.storage().instance().get(&StorageKey::SystemInfo) {
        Some(info) => info,
        None => panic_with_error!(env, CheckersError::SystemInfoNotFound),
    }
}

pub(crate) fn write_system_info(env: &Env, info: &SystemInfo) {
    env.storage().instance().set(&StorageKey::SystemInfo, info);
    // Keep instance storage (admin, token, rules) alive alongside it
    env.storage()
        .instance()
        .extend_ttl(GAME_TTL_LEDGERS, GAME_TTL_LEDGERS);
}

// ───────────────────────────────────────────────────────────────────────────────
//  Configuration
// ───────────────────────────────────────────────────────────────────────────────

pub(crate) fn load_admin(env: &Env) -> Result<Address, CheckersError> {
    env.storage()
        .instance()
        .get(&StorageKey::Admin)
        .ok_or(CheckersError::AdminNotSet)
}

pub(crate) fn write_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&StorageKey::Admin, admin);
}

pub(crate) fn load_token(env: &Env) -> Result<Address, CheckersError> {
    env.storage()
        .instance()
        .get(&StorageKey::Token)
        .ok_or(CheckersError::TokenNotSet)
}

pub(crate) fn write_token(env: &Env, token: &Address) {
    env.storage().instance().set(&StorageKey::Token, token);
}

pub(crate) fn load_rules(env: &Env) -> Result<RulesConfig, CheckersError> {
    env.storage()
        .instance()
        .get(&StorageKey::Rules)
        .ok_or(CheckersError::RulesNotSet)
}

pub(crate) fn write_rules(env: &Env, rules: &RulesConfig) {
    env.storage().instance().set(&StorageKey::Rules, rules);
}
