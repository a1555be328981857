#![no_std]

mod error;
mod events;
mod fees;
mod order_book;
mod pricing;
mod referral;
mod rounds;
mod storage;
mod token_service;

pub use error::Error;
pub use referral::ReferrerChain;
pub use storage::{
    Order, Participant, RoundPhase, RoundWindow, SaleState, TradeState, INITIAL_PRICE,
    INITIAL_SUPPLY, MAX_ORDER_PRICE, MAX_SALE_SUPPLY, PRICE_INCREMENT, PRICE_SCALE,
};

use order_book::OrderBook;
use referral::Referrals;
use rounds::Rounds;
use storage::{DataKey, Storage};
use token_service::Custody;

use soroban_sdk::{contract, contractimpl, Address, Env};

#[contract]
pub struct TradePlatform;

#[contractimpl]
impl TradePlatform {
    // ============================================
    // INITIALIZATION
    // ============================================

    /// Initialize the platform
    ///
    /// The platform starts in a trade round whose window has already elapsed,
    /// so the first sale round can be opened right away. It must be granted
    /// the token's operator role before that.
    ///
    /// # Errors
    /// - `AlreadyInitialized`: Contract already initialized
    /// - `InvalidRoundTime`: round_time is zero
    /// - `InvalidToken`: token is this contract or the payment asset
    pub fn initialize(
        env: Env,
        token: Address,
        payment_asset: Address,
        treasury: Address,
        round_time: u64,
    ) -> Result<(), Error> {
        if Storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        if round_time == 0 {
            return Err(Error::InvalidRoundTime);
        }
        if token == env.current_contract_address() || token == payment_asset {
            return Err(Error::InvalidToken);
        }

        treasury.require_auth();

        env.storage().instance().set(&DataKey::Initialized, &true);
        env.storage().instance().set(&DataKey::Token, &token);
        env.storage()
            .instance()
            .set(&DataKey::PaymentAsset, &payment_asset);
        env.storage().instance().set(&DataKey::Treasury, &treasury);
        env.storage().instance().set(&DataKey::RoundTime, &round_time);

        Storage::set_phase(&env, RoundPhase::Trade);
        Storage::set_window(&env, &RoundWindow { start: 0, end: 0 });
        Storage::set_sale(
            &env,
            &SaleState {
                round: 0,
                unit_price: 0,
                remaining_supply: 0,
                sold: 0,
            },
        );
        Storage::set_trade(
            &env,
            &TradeState {
                carry_over_value: 0,
                open_order_value: 0,
                pending_order_value: 0,
                traded_volume: 0,
            },
        );
        Storage::extend_instance(&env);

        Ok(())
    }

    // ============================================
    // ROUNDS
    // ============================================

    /// Open a sale round (anyone may call once the trade round is over)
    ///
    /// Returns the phase the platform is in afterwards: `Trade` when there
    /// was nothing to issue and the sale round was skipped.
    ///
    /// # Errors
    /// - `InvalidPhase`: Not in a trade round
    /// - `RoundNotElapsed`: Trade round window still open
    pub fn start_sale_round(env: Env) -> Result<RoundPhase, Error> {
        Self::check_initialized(&env)?;
        Rounds::start_sale_round(&env)
    }

    /// Open a trade round (anyone may call once the sale round is over)
    ///
    /// # Errors
    /// - `InvalidPhase`: Not in a sale round
    /// - `RoundNotElapsed`: Sale window still open and supply not sold out
    /// - `NothingToTrade`: First sale round sold nothing
    pub fn start_trade_round(env: Env) -> Result<(), Error> {
        Self::check_initialized(&env)?;
        Rounds::start_trade_round(&env)
    }

    /// Buy tokens in the sale round
    ///
    /// `payment` is the most the buyer is willing to pay; only
    /// `amount × unit_price` is charged.
    ///
    /// # Errors
    /// - `WrongPhase`: Not in a sale round
    /// - `ZeroAmount`: amount must be positive
    /// - `InsufficientSupply`: Not enough tokens left in the round
    /// - `InsufficientFunds`: payment below cost
    pub fn buy_token(env: Env, buyer: Address, amount: i128, payment: i128) -> Result<(), Error> {
        Self::check_initialized(&env)?;
        buyer.require_auth();
        Rounds::buy_token(&env, &buyer, amount, payment)
    }

    // ============================================
    // REFERRALS
    // ============================================

    /// Become a referrer, optionally under an existing referrer
    ///
    /// # Errors
    /// - `AlreadyReferrer`: Caller already registered
    /// - `SelfReferral`: referrer is the caller
    /// - `UnknownReferrer`: referrer is not registered
    pub fn register(env: Env, caller: Address, referrer: Option<Address>) -> Result<(), Error> {
        Self::check_initialized(&env)?;
        caller.require_auth();
        Referrals::register(&env, &caller, referrer)
    }

    // ============================================
    // ORDER BOOK
    // ============================================

    /// List tokens for sale; the seller must have approved the platform
    ///
    /// # Errors
    /// - `WrongPhase`: Not in a trade round
    /// - `ZeroAmount`: amount must be positive
    /// - `InvalidPrice`: unit_price must be positive and at most `MAX_ORDER_PRICE`
    /// - `InsufficientTokens`: Seller balance too low
    /// - `InsufficientAllowance`: Platform allowance too low
    pub fn add_order(
        env: Env,
        seller: Address,
        amount: i128,
        unit_price: i128,
    ) -> Result<u64, Error> {
        Self::check_initialized(&env)?;
        seller.require_auth();
        OrderBook::add_order(&env, &seller, amount, unit_price)
    }

    /// Buy tokens out of an order
    ///
    /// # Errors
    /// - `InvalidIndex`: No such order
    /// - `WrongPhase`: Not in a trade round
    /// - `ClosedOrder`: Order already closed
    /// - `ZeroAmount`: amount must be positive
    /// - `InvalidAmount`: amount exceeds the tokens left in the order
    /// - `InsufficientFunds`: payment below cost
    pub fn redeem_order(
        env: Env,
        buyer: Address,
        index: u64,
        amount: i128,
        payment: i128,
    ) -> Result<(), Error> {
        Self::check_initialized(&env)?;
        buyer.require_auth();
        OrderBook::redeem_order(&env, &buyer, index, amount, payment)
    }

    /// Withdraw an order and take back its remaining tokens
    ///
    /// # Errors
    /// - `InvalidIndex`: No such order
    /// - `WrongPhase`: Not in a trade round
    /// - `NotSeller`: Caller did not create the order
    /// - `ClosedOrder`: Order already closed
    pub fn remove_order(env: Env, seller: Address, index: u64) -> Result<(), Error> {
        Self::check_initialized(&env)?;
        seller.require_auth();
        OrderBook::remove_order(&env, &seller, index)
    }

    // ============================================
    // VIEW FUNCTIONS
    // ============================================

    pub fn phase(env: Env) -> Result<RoundPhase, Error> {
        Storage::phase(&env)
    }

    pub fn round_window(env: Env) -> Result<RoundWindow, Error> {
        Storage::window(&env)
    }

    pub fn round_start_time(env: Env) -> Result<u64, Error> {
        Ok(Storage::window(&env)?.start)
    }

    pub fn round_end_time(env: Env) -> Result<u64, Error> {
        Ok(Storage::window(&env)?.end)
    }

    pub fn round_time(env: Env) -> Result<u64, Error> {
        Storage::round_time(&env)
    }

    pub fn token(env: Env) -> Result<Address, Error> {
        Storage::token(&env)
    }

    /// Price of one token in the current (or last) sale round
    pub fn unit_price(env: Env) -> Result<i128, Error> {
        Ok(Storage::sale(&env)?.unit_price)
    }

    /// Tokens still for sale in the current sale round
    pub fn remaining_supply(env: Env) -> Result<i128, Error> {
        Ok(Storage::sale(&env)?.remaining_supply)
    }

    /// Carried-over value for the next sale round, without open orders
    ///
    /// The next round is backed by this plus `pending_order_value` from
    /// `trade_state`.
    pub fn carry_over_value(env: Env) -> Result<i128, Error> {
        Ok(Storage::trade(&env)?.carry_over_value)
    }

    pub fn sale_state(env: Env) -> Result<SaleState, Error> {
        Storage::sale(&env)
    }

    pub fn trade_state(env: Env) -> Result<TradeState, Error> {
        Storage::trade(&env)
    }

    /// Tokens held by the platform: unsold stock plus listed orders
    pub fn custody_balance(env: Env) -> Result<i128, Error> {
        Ok(Custody::new(&env)?.balance())
    }

    pub fn order_count(env: Env) -> u64 {
        Storage::order_count(&env)
    }

    pub fn get_order(env: Env, index: u64) -> Result<Order, Error> {
        Storage::order(&env, index)
    }

    pub fn get_participant(env: Env, participant: Address) -> Participant {
        Storage::participant(&env, &participant)
    }

    pub fn referrer_chain(env: Env, participant: Address) -> ReferrerChain {
        Referrals::chain(&env, &participant)
    }

    // ============================================
    // INTERNAL HELPERS
    // ============================================

    fn check_initialized(env: &Env) -> Result<(), Error> {
        if !Storage::is_initialized(env) {
            return Err(Error::NotInitialized);
        }
        Storage::extend_instance(env);
        Ok(())
    }
}
