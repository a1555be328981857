use crate::error::Error;
use crate::storage::Storage;
use soroban_sdk::{contractclient, Address, Env};

/// Calls the platform makes into the token contract. The platform must hold
/// the token's operator role.
#[allow(dead_code)]
#[contractclient(name = "TokenServiceClient")]
pub trait TokenService {
    fn mint(env: Env, operator: Address, to: Address, amount: i128);
    fn transfer(env: Env, from: Address, to: Address, amount: i128);
    fn transfer_from(env: Env, spender: Address, from: Address, to: Address, amount: i128);
    fn balance_of(env: Env, owner: Address) -> i128;
    fn allowance(env: Env, owner: Address, spender: Address) -> i128;
}

/// Token movements in and out of the platform's own balance
pub struct Custody<'a> {
    env: &'a Env,
    client: TokenServiceClient<'a>,
}

impl<'a> Custody<'a> {
    pub fn new(env: &'a Env) -> Result<Self, Error> {
        let token = Storage::token(env)?;
        Ok(Custody {
            env,
            client: TokenServiceClient::new(env, &token),
        })
    }

    /// Mint freshly issued sale stock into custody
    pub fn mint(&self, amount: i128) {
        let this = self.env.current_contract_address();
        self.client.mint(&this, &this, &amount);
    }

    /// Fail unless `owner` holds and has approved at least `amount`
    pub fn check_pull(&self, owner: &Address, amount: i128) -> Result<(), Error> {
        if self.client.balance_of(owner) < amount {
            return Err(Error::InsufficientTokens);
        }
        let this = self.env.current_contract_address();
        if self.client.allowance(owner, &this) < amount {
            return Err(Error::InsufficientAllowance);
        }
        Ok(())
    }

    /// Move `amount` tokens from `owner` into custody using the allowance
    /// the owner granted the platform
    pub fn pull(&self, owner: &Address, amount: i128) {
        let this = self.env.current_contract_address();
        self.client.transfer_from(&this, owner, &this, &amount);
    }

    /// Send `amount` tokens out of custody
    pub fn release(&self, to: &Address, amount: i128) {
        if amount > 0 {
            self.client
                .transfer(&self.env.current_contract_address(), to, &amount);
        }
    }

    pub fn balance(&self) -> i128 {
        self.client.balance_of(&self.env.current_contract_address())
    }
}
