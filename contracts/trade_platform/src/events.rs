use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug)]
pub struct SaleRoundStartedEvent {
    pub round: u32,
    pub unit_price: i128,
    pub supply: i128,
    pub start: u64,
    pub end: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct SaleRoundSkippedEvent {
    pub start: u64,
    pub end: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TradeRoundStartedEvent {
    pub sale_round: u32,
    pub unsold: i128,
    pub carry_over_value: i128,
    pub start: u64,
    pub end: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct TokensPurchasedEvent {
    pub buyer: Address,
    pub amount: i128,
    pub cost: i128,
    pub unit_price: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RegisteredEvent {
    pub participant: Address,
    pub referrer: Option<Address>,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ReferralPaidEvent {
    pub payer: Address,
    pub referrer: Address,
    pub level: u32,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct OrderAddedEvent {
    pub index: u64,
    pub seller: Address,
    pub amount: i128,
    pub unit_price: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct OrderRedeemedEvent {
    pub index: u64,
    pub buyer: Address,
    pub amount: i128,
    pub cost: i128,
    pub closed: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct OrderRemovedEvent {
    pub index: u64,
    pub seller: Address,
    pub returned: i128,
}
