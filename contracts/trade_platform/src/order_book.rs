use crate::error::Error;
use crate::events::{OrderAddedEvent, OrderRedeemedEvent, OrderRemovedEvent};
use crate::fees::{FeeDistributor, Payments, REDEMPTION};
use crate::pricing::cost_of;
use crate::referral::Referrals;
use crate::storage::{Order, RoundPhase, Storage, TradeState, MAX_ORDER_PRICE};
use crate::token_service::Custody;
use soroban_sdk::{Address, Env, Symbol};

pub struct OrderBook;

impl OrderBook {
    /// List `amount` of the seller's tokens at `unit_price`
    pub fn add_order(
        env: &Env,
        seller: &Address,
        amount: i128,
        unit_price: i128,
    ) -> Result<u64, Error> {
        Self::require_trade(env)?;

        if amount <= 0 {
            return Err(Error::ZeroAmount);
        }
        if unit_price <= 0 || unit_price > MAX_ORDER_PRICE {
            return Err(Error::InvalidPrice);
        }

        let custody = Custody::new(env)?;
        custody.check_pull(seller, amount)?;

        let value = cost_of(amount, unit_price)?;
        let mut trade = Storage::trade(env)?;
        trade.open_order_value = trade
            .open_order_value
            .checked_add(value)
            .ok_or(Error::ArithmeticOverflow)?;
        trade.pending_order_value = trade
            .pending_order_value
            .checked_add(value)
            .ok_or(Error::ArithmeticOverflow)?;

        let index = Storage::push_order(
            env,
            &Order {
                seller: seller.clone(),
                tokens_remaining: amount,
                unit_price,
                closed: false,
                listed_round: Storage::sale(env)?.round,
            },
        );
        Storage::set_trade(env, &trade);

        custody.pull(seller, amount);

        env.events().publish(
            (Symbol::new(env, "order_added"), index),
            OrderAddedEvent {
                index,
                seller: seller.clone(),
                amount,
                unit_price,
            },
        );

        Ok(index)
    }

    /// Buy `amount` tokens out of order `index`, offering up to `payment`
    pub fn redeem_order(
        env: &Env,
        buyer: &Address,
        index: u64,
        amount: i128,
        payment: i128,
    ) -> Result<(), Error> {
        let mut order = Storage::order(env, index)?;
        Self::require_trade(env)?;

        if order.closed {
            return Err(Error::ClosedOrder);
        }
        if amount <= 0 {
            return Err(Error::ZeroAmount);
        }
        if amount > order.tokens_remaining {
            return Err(Error::InvalidAmount);
        }

        let cost = cost_of(amount, order.unit_price)?;
        if payment < cost {
            return Err(Error::InsufficientFunds);
        }

        // An order listed before the current sale round already backed its
        // issuance, so its redemptions add nothing to the carry-over
        let backed = Self::has_backed_issuance(env, &order)?;
        let mut trade = Storage::trade(env)?;
        Self::withdraw_value(&mut trade, cost, backed)?;
        if !backed {
            trade.carry_over_value = trade
                .carry_over_value
                .checked_add(cost)
                .ok_or(Error::ArithmeticOverflow)?;
        }
        trade.traded_volume = trade
            .traded_volume
            .checked_add(cost)
            .ok_or(Error::ArithmeticOverflow)?;

        order.tokens_remaining -= amount;
        if order.tokens_remaining == 0 {
            Self::close(&mut order);
        }
        Storage::set_order(env, index, &order);
        Storage::set_trade(env, &trade);

        let payments = Payments::load(env)?;
        let chain = Referrals::chain(env, &order.seller);
        FeeDistributor::distribute(
            env,
            &payments,
            buyer,
            cost,
            &chain,
            &order.seller,
            &REDEMPTION,
        )?;
        Custody::new(env)?.release(buyer, amount);

        env.events().publish(
            (Symbol::new(env, "order_redeemed"), index),
            OrderRedeemedEvent {
                index,
                buyer: buyer.clone(),
                amount,
                cost,
                closed: order.closed,
            },
        );

        Ok(())
    }

    /// Withdraw order `index`, returning its unsold tokens to the seller
    pub fn remove_order(env: &Env, seller: &Address, index: u64) -> Result<(), Error> {
        let mut order = Storage::order(env, index)?;
        Self::require_trade(env)?;

        if order.seller != *seller {
            return Err(Error::NotSeller);
        }
        if order.closed {
            return Err(Error::ClosedOrder);
        }

        let returned = order.tokens_remaining;
        let mut trade = Storage::trade(env)?;
        let value = cost_of(returned, order.unit_price)?;
        Self::withdraw_value(&mut trade, value, Self::has_backed_issuance(env, &order)?)?;

        Self::close(&mut order);
        Storage::set_order(env, index, &order);
        Storage::set_trade(env, &trade);

        Custody::new(env)?.release(seller, returned);

        env.events().publish(
            (Symbol::new(env, "order_removed"), index),
            OrderRemovedEvent {
                index,
                seller: seller.clone(),
                returned,
            },
        );

        Ok(())
    }

    fn require_trade(env: &Env) -> Result<(), Error> {
        if Storage::phase(env)? != RoundPhase::Trade {
            return Err(Error::WrongPhase);
        }
        Ok(())
    }

    fn has_backed_issuance(env: &Env, order: &Order) -> Result<bool, Error> {
        Ok(Storage::sale(env)?.round > order.listed_round)
    }

    /// Take `value` out of the open order value, and out of the pending
    /// order value unless the order already backed a sale round
    fn withdraw_value(trade: &mut TradeState, value: i128, backed: bool) -> Result<(), Error> {
        trade.open_order_value = trade
            .open_order_value
            .checked_sub(value)
            .ok_or(Error::ArithmeticOverflow)?;
        if !backed {
            trade.pending_order_value = trade
                .pending_order_value
                .checked_sub(value)
                .ok_or(Error::ArithmeticOverflow)?;
        }
        Ok(())
    }

    fn close(order: &mut Order) {
        order.tokens_remaining = 0;
        order.unit_price = 0;
        order.closed = true;
    }
}
