#![no_std]

mod error;
mod events;
mod storage;

pub use error::Error;
use events::{ApproveEvent, BurnEvent, MintEvent, TransferEvent};
use storage::DataKey;

use soroban_sdk::{contract, contractimpl, Address, Env, Symbol};

#[contract]
pub struct TradeToken;

#[contractimpl]
impl TradeToken {
    /// Initialize the token contract
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    pub fn initialize(env: Env, admin: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Admin, &admin);

        Ok(())
    }

    /// Grant the minter and burner roles to an operator (the trade platform)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    pub fn add_operator(env: Env, operator: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage()
            .instance()
            .set(&DataKey::Operators(operator), &true);

        Ok(())
    }

    /// Revoke the minter and burner roles
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `Unauthorized`: Caller is not admin
    pub fn remove_operator(env: Env, operator: Address) -> Result<(), Error> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(Error::NotInitialized)?;
        admin.require_auth();

        env.storage()
            .instance()
            .remove(&DataKey::Operators(operator));

        Ok(())
    }

    /// Mint tokens (only operators)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotOperator`: Caller does not hold the minter role
    /// - `InvalidAmount`: Amount <= 0
    pub fn mint(env: Env, operator: Address, to: Address, amount: i128) -> Result<(), Error> {
        Self::check_operator(&env, &operator)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let new_balance = storage::balance(&env, &to)
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;
        let new_supply = storage::total_supply(&env)
            .checked_add(amount)
            .ok_or(Error::InvalidAmount)?;

        storage::set_balance(&env, &to, new_balance);
        storage::set_total_supply(&env, new_supply);

        env.events().publish(
            (Symbol::new(&env, "mint"), to.clone()),
            MintEvent {
                operator,
                to,
                amount,
            },
        );

        Ok(())
    }

    /// Burn tokens (only operators)
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `NotOperator`: Caller does not hold the burner role
    /// - `InvalidAmount`: Amount <= 0
    /// - `InsufficientBalance`: Not enough balance
    pub fn burn(env: Env, operator: Address, from: Address, amount: i128) -> Result<(), Error> {
        Self::check_operator(&env, &operator)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let current_balance = storage::balance(&env, &from);
        if current_balance < amount {
            return Err(Error::InsufficientBalance);
        }

        storage::set_balance(&env, &from, current_balance - amount);
        storage::set_total_supply(&env, storage::total_supply(&env) - amount);

        env.events().publish(
            (Symbol::new(&env, "burn"), from.clone()),
            BurnEvent {
                operator,
                from,
                amount,
            },
        );

        Ok(())
    }

    /// Transfer tokens between users
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `Unauthorized`: From address did not authorize
    /// - `InsufficientBalance`: Not enough balance
    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        from.require_auth();

        Self::move_balance(&env, &from, &to, amount)
    }

    /// Allow `spender` to move up to `amount` of the owner's tokens
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount < 0
    pub fn approve(env: Env, owner: Address, spender: Address, amount: i128) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        if amount < 0 {
            return Err(Error::InvalidAmount);
        }

        owner.require_auth();

        storage::set_allowance(&env, &owner, &spender, amount);

        env.events().publish(
            (Symbol::new(&env, "approve"), owner.clone()),
            ApproveEvent {
                owner,
                spender,
                amount,
            },
        );

        Ok(())
    }

    /// Move tokens on behalf of `from`, consuming the spender's allowance
    ///
    /// # Errors
    /// - `NotInitialized`: Contract not initialized
    /// - `InvalidAmount`: Amount <= 0
    /// - `InsufficientAllowance`: Spender allowance too low
    /// - `InsufficientBalance`: Not enough balance
    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), Error> {
        Self::check_initialized(&env)?;

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        spender.require_auth();

        let allowance = storage::allowance(&env, &from, &spender);
        if allowance < amount {
            return Err(Error::InsufficientAllowance);
        }

        Self::move_balance(&env, &from, &to, amount)?;
        storage::set_allowance(&env, &from, &spender, allowance - amount);

        Ok(())
    }

    /// Get balance for a user
    pub fn balance_of(env: Env, owner: Address) -> i128 {
        storage::balance(&env, &owner)
    }

    /// Remaining amount `spender` may move on behalf of `owner`
    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        storage::allowance(&env, &owner, &spender)
    }

    pub fn total_supply(env: Env) -> i128 {
        storage::total_supply(&env)
    }

    /// Check if address is an operator
    pub fn is_operator(env: Env, address: Address) -> bool {
        env.storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Operators(address))
            .unwrap_or(false)
    }

    fn check_initialized(env: &Env) -> Result<(), Error> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    fn check_operator(env: &Env, operator: &Address) -> Result<(), Error> {
        Self::check_initialized(env)?;

        operator.require_auth();

        let allowed = env
            .storage()
            .instance()
            .get::<DataKey, bool>(&DataKey::Operators(operator.clone()))
            .unwrap_or(false);
        if !allowed {
            return Err(Error::NotOperator);
        }
        Ok(())
    }

    fn move_balance(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), Error> {
        let from_balance = storage::balance(env, from);
        if from_balance < amount {
            return Err(Error::InsufficientBalance);
        }

        // Self-transfers leave balances untouched.
        if from != to {
            let new_to_balance = storage::balance(env, to)
                .checked_add(amount)
                .ok_or(Error::InvalidAmount)?;
            storage::set_balance(env, from, from_balance - amount);
            storage::set_balance(env, to, new_to_balance);
        }

        env.events().publish(
            (Symbol::new(env, "transfer"), from.clone(), to.clone()),
            TransferEvent {
                from: from.clone(),
                to: to.clone(),
                amount,
            },
        );

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::{testutils::Address as _, Address, Env};

    struct Setup {
        env: Env,
        client: TradeTokenClient<'static>,
        operator: Address,
    }

    fn setup() -> Setup {
        let env = Env::default();
        env.mock_all_auths();

        let contract_id = env.register(TradeToken, ());
        let client = TradeTokenClient::new(&env, &contract_id);

        let admin = Address::generate(&env);
        let operator = Address::generate(&env);
        client.initialize(&admin);
        client.add_operator(&operator);

        Setup {
            env,
            client,
            operator,
        }
    }

    #[test]
    fn test_initialize() {
        let s = setup();
        let admin = Address::generate(&s.env);

        let result = s.client.try_initialize(&admin);
        assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
    }

    #[test]
    fn test_mint_and_balance() {
        let s = setup();
        let user = Address::generate(&s.env);

        s.client.mint(&s.operator, &user, &1000);

        assert_eq!(s.client.balance_of(&user), 1000);
        assert_eq!(s.client.total_supply(), 1000);
    }

    #[test]
    fn test_mint_requires_operator_role() {
        let s = setup();
        let stranger = Address::generate(&s.env);
        let user = Address::generate(&s.env);

        let result = s.client.try_mint(&stranger, &user, &1000);
        assert_eq!(result, Err(Ok(Error::NotOperator)));

        s.client.remove_operator(&s.operator);
        let result = s.client.try_mint(&s.operator, &user, &1000);
        assert_eq!(result, Err(Ok(Error::NotOperator)));
        assert!(!s.client.is_operator(&s.operator));
    }

    #[test]
    fn test_transfer() {
        let s = setup();
        let user1 = Address::generate(&s.env);
        let user2 = Address::generate(&s.env);

        s.client.mint(&s.operator, &user1, &1000);
        s.client.transfer(&user1, &user2, &500);

        assert_eq!(s.client.balance_of(&user1), 500);
        assert_eq!(s.client.balance_of(&user2), 500);
        assert_eq!(s.client.total_supply(), 1000);
    }

    #[test]
    fn test_burn() {
        let s = setup();
        let user = Address::generate(&s.env);

        s.client.mint(&s.operator, &user, &1000);
        s.client.burn(&s.operator, &user, &400);

        assert_eq!(s.client.balance_of(&user), 600);
        assert_eq!(s.client.total_supply(), 600);

        let result = s.client.try_burn(&s.operator, &user, &601);
        assert_eq!(result, Err(Ok(Error::InsufficientBalance)));
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let s = setup();
        let owner = Address::generate(&s.env);
        let spender = Address::generate(&s.env);

        s.client.mint(&s.operator, &owner, &1000);
        s.client.approve(&owner, &spender, &300);

        let result = s.client.try_transfer_from(&spender, &owner, &spender, &301);
        assert_eq!(result, Err(Ok(Error::InsufficientAllowance)));

        s.client.transfer_from(&spender, &owner, &spender, &200);
        assert_eq!(s.client.allowance(&owner, &spender), 100);
        assert_eq!(s.client.balance_of(&owner), 800);
        assert_eq!(s.client.balance_of(&spender), 200);
    }

    #[test]
    fn test_insufficient_balance_error() {
        let s = setup();
        let user1 = Address::generate(&s.env);
        let user2 = Address::generate(&s.env);

        s.client.mint(&s.operator, &user1, &1000);

        let result = s.client.try_transfer(&user1, &user2, &1500);
        assert_eq!(result, Err(Ok(Error::InsufficientBalance)));

        s.client.approve(&user1, &user2, &5000);
        let result = s.client.try_transfer_from(&user2, &user1, &user2, &1500);
        assert_eq!(result, Err(Ok(Error::InsufficientBalance)));
    }
}
