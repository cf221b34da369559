use soroban_sdk::{token::TokenClient, Address, Env};

/// A transfer the token contract refused: missing balance, missing
/// authorization or a frozen account.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct TransferFailed;

/// The wager pool: this contract's own balance of the configured token.
pub(crate) struct Escrow<'a> {
    env: &'a Env,
    token: TokenClient<'a>,
}

impl<'a> Escrow<'a> {
    pub(crate) fn new(env: &'a Env, token: &Address) -> Self {
        Escrow {
            env,
            token: TokenClient::new(env, token),
        }
    }

    /// Move `amount` from `account` into the pool.
    pub(crate) fn debit(&self, account: &Address, amount: i128) -> Result<(), TransferFailed> {
        let pool = self.env.current_contract_address();
        self.transfer(account, &pool, amount)
    }

    /// Move `amount` from the pool to `account`.
    pub(crate) fn credit(&self, account: &Address, amount: i128) -> Result<(), TransferFailed> {
        let pool = self.env.current_contract_address();
        self.transfer(&pool, account, amount)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: i128) -> Result<(), TransferFailed> {
        if amount == 0 {
            return Ok(());
        }
        match self.token.try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => Err(TransferFailed),
        }
    }
}
