use soroban_sdk::{contracttype, Address, Env};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Operators(Address),
    Balance(Address),
    Allowance(Address, Address), // (owner, spender)
    TotalSupply,
    Initialized,
}

pub fn balance(env: &Env, owner: &Address) -> i128 {
    env.storage()
        .instance()
        .get::<DataKey, i128>(&DataKey::Balance(owner.clone()))
        .unwrap_or(0)
}

pub fn set_balance(env: &Env, owner: &Address, amount: i128) {
    let key = DataKey::Balance(owner.clone());
    if amount == 0 {
        env.storage().instance().remove(&key);
    } else {
        env.storage().instance().set(&key, &amount);
    }
}

pub fn allowance(env: &Env, owner: &Address, spender: &Address) -> i128 {
    env.storage()
        .instance()
        .get::<DataKey, i128>(&DataKey::Allowance(owner.clone(), spender.clone()))
        .unwrap_or(0)
}

pub fn set_allowance(env: &Env, owner: &Address, spender: &Address, amount: i128) {
    let key = DataKey::Allowance(owner.clone(), spender.clone());
    if amount == 0 {
        env.storage().instance().remove(&key);
    } else {
        env.storage().instance().set(&key, &amount);
    }
}

pub fn total_supply(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get::<DataKey, i128>(&DataKey::TotalSupply)
        .unwrap_or(0)
}

pub fn set_total_supply(env: &Env, amount: i128) {
    env.storage().instance().set(&DataKey::TotalSupply, &amount);
}
