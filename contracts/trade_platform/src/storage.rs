use crate::error::Error;
use soroban_sdk::{contracttype, Address, Env};

// Constants
pub const PRICE_SCALE: i128 = 1_000_000_000_000_000_000; // 18 decimals
/// Price of one token in the first sale round (0.00001)
pub const INITIAL_PRICE: i128 = PRICE_SCALE / 100_000;
/// Additive term of the sale price step (0.000004)
pub const PRICE_INCREMENT: i128 = 4 * PRICE_SCALE / 1_000_000;
/// Tokens minted for the first sale round
pub const INITIAL_SUPPLY: i128 = 100_000;
/// Highest unit price an order may ask (1,000,000 payment units)
pub const MAX_ORDER_PRICE: i128 = 1_000_000 * PRICE_SCALE;
/// Most tokens a single sale round may issue
pub const MAX_SALE_SUPPLY: i128 = 1_000_000_000_000;

const DAY_IN_LEDGERS: u32 = 17_280;
pub const ENTRY_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
pub const ENTRY_LIFETIME_THRESHOLD: u32 = ENTRY_BUMP_AMOUNT - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundPhase {
    /// Fixed-price primary issuance
    Sale = 0,
    /// Peer-to-peer order book
    Trade = 1,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundWindow {
    pub start: u64,
    pub end: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleState {
    /// Number of sale rounds opened so far
    pub round: u32,
    /// Price of one token in the current (or last) sale round
    pub unit_price: i128,
    /// Tokens still for sale in custody
    pub remaining_supply: i128,
    /// Tokens sold in the current sale round
    pub sold: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TradeState {
    /// Value rolled into the next sale round's supply
    pub carry_over_value: i128,
    /// Σ tokens_remaining × unit_price over open orders
    pub open_order_value: i128,
    /// Part of `open_order_value` listed since the last sale round opened.
    /// Only this part still has to back a future sale round.
    pub pending_order_value: i128,
    /// Value redeemed during the current trade round
    pub traded_volume: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Order {
    pub seller: Address,
    pub tokens_remaining: i128,
    pub unit_price: i128,
    pub closed: bool,
    /// Sale round count when the order was listed; the order's value has
    /// backed issuance once a later sale round opened
    pub listed_round: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Participant {
    /// Upward referrer, `None` for top-level or unregistered participants
    pub referrer: Option<Address>,
    pub is_referrer: bool,
    /// Tokens bought in sale rounds
    pub cumulative_purchased: i128,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Token,
    PaymentAsset,
    Treasury,
    RoundTime,
    Phase,
    Window,
    Sale,
    Trade,
    OrderCount,
    Order(u64),
    Participant(Address),
    Initialized,
}

pub struct Storage;

impl Storage {
    // Configuration
    pub fn is_initialized(env: &Env) -> bool {
        env.storage().instance().has(&DataKey::Initialized)
    }

    pub fn token(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(Error::NotInitialized)
    }

    pub fn payment_asset(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::PaymentAsset)
            .ok_or(Error::NotInitialized)
    }

    pub fn treasury(env: &Env) -> Result<Address, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Treasury)
            .ok_or(Error::NotInitialized)
    }

    pub fn round_time(env: &Env) -> Result<u64, Error> {
        env.storage()
            .instance()
            .get(&DataKey::RoundTime)
            .ok_or(Error::NotInitialized)
    }

    // Round state
    pub fn phase(env: &Env) -> Result<RoundPhase, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Phase)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_phase(env: &Env, phase: RoundPhase) {
        env.storage().instance().set(&DataKey::Phase, &phase);
    }

    pub fn window(env: &Env) -> Result<RoundWindow, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Window)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_window(env: &Env, window: &RoundWindow) {
        env.storage().instance().set(&DataKey::Window, window);
    }

    pub fn sale(env: &Env) -> Result<SaleState, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Sale)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_sale(env: &Env, sale: &SaleState) {
        env.storage().instance().set(&DataKey::Sale, sale);
    }

    pub fn trade(env: &Env) -> Result<TradeState, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Trade)
            .ok_or(Error::NotInitialized)
    }

    pub fn set_trade(env: &Env, trade: &TradeState) {
        env.storage().instance().set(&DataKey::Trade, trade);
    }

    // Orders
    pub fn order_count(env: &Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::OrderCount)
            .unwrap_or(0)
    }

    /// Append an order at the next index and return that index
    pub fn push_order(env: &Env, order: &Order) -> u64 {
        let index = Self::order_count(env);
        Self::set_order(env, index, order);
        env.storage()
            .instance()
            .set(&DataKey::OrderCount, &(index + 1));
        index
    }

    pub fn order(env: &Env, index: u64) -> Result<Order, Error> {
        if index >= Self::order_count(env) {
            return Err(Error::InvalidIndex);
        }
        env.storage()
            .persistent()
            .get(&DataKey::Order(index))
            .ok_or(Error::InvalidIndex)
    }

    pub fn set_order(env: &Env, index: u64, order: &Order) {
        let key = DataKey::Order(index);
        env.storage().persistent().set(&key, order);
        env.storage()
            .persistent()
            .extend_ttl(&key, ENTRY_LIFETIME_THRESHOLD, ENTRY_BUMP_AMOUNT);
    }

    // Participants
    pub fn participant(env: &Env, who: &Address) -> Participant {
        env.storage()
            .persistent()
            .get(&DataKey::Participant(who.clone()))
            .unwrap_or(Participant {
                referrer: None,
                is_referrer: false,
                cumulative_purchased: 0,
            })
    }

    pub fn set_participant(env: &Env, who: &Address, participant: &Participant) {
        let key = DataKey::Participant(who.clone());
        env.storage().persistent().set(&key, participant);
        env.storage()
            .persistent()
            .extend_ttl(&key, ENTRY_LIFETIME_THRESHOLD, ENTRY_BUMP_AMOUNT);
    }

    pub fn extend_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(ENTRY_LIFETIME_THRESHOLD, ENTRY_BUMP_AMOUNT);
    }
}
