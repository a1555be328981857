use crate::error::Error;
use crate::events::{
    SaleRoundSkippedEvent, SaleRoundStartedEvent, TokensPurchasedEvent, TradeRoundStartedEvent,
};
use crate::fees::{FeeDistributor, Payments, PURCHASE};
use crate::pricing::{cost_of, next_unit_price, sale_supply};
use crate::referral::Referrals;
use crate::storage::{
    RoundPhase, RoundWindow, SaleState, Storage, INITIAL_PRICE, INITIAL_SUPPLY,
};
use crate::token_service::Custody;
use soroban_sdk::{log, Address, Env, Symbol};

pub struct Rounds;

impl Rounds {
    /// Close the trade round and open a sale round
    ///
    /// The first sale round issues `INITIAL_SUPPLY` at `INITIAL_PRICE`. Later
    /// rounds step the price and issue as many tokens as the carried-over
    /// value plus the value of orders listed since the last sale round buys
    /// at the new price. With nothing to issue the sale round is skipped and
    /// a fresh trade round starts instead.
    pub fn start_sale_round(env: &Env) -> Result<RoundPhase, Error> {
        if Storage::phase(env)? != RoundPhase::Trade {
            return Err(Error::InvalidPhase);
        }
        Self::require_elapsed(env)?;

        let mut sale = Storage::sale(env)?;
        let mut trade = Storage::trade(env)?;

        let (unit_price, supply) = if sale.round == 0 {
            (INITIAL_PRICE, INITIAL_SUPPLY)
        } else {
            // Saturates; sale_supply caps the result
            let carry = trade
                .carry_over_value
                .saturating_add(trade.pending_order_value);
            let price = next_unit_price(sale.unit_price)?;
            (price, sale_supply(carry, price)?)
        };

        if supply == 0 {
            trade.traded_volume = 0;
            Storage::set_trade(env, &trade);
            let window = Self::open_window(env)?;

            log!(env, "sale round skipped: nothing to issue");
            env.events().publish(
                (Symbol::new(env, "sale_skipped"),),
                SaleRoundSkippedEvent {
                    start: window.start,
                    end: window.end,
                },
            );
            return Ok(RoundPhase::Trade);
        }

        sale.round += 1;
        sale.unit_price = unit_price;
        sale.remaining_supply = supply;
        sale.sold = 0;
        trade.carry_over_value = 0;
        trade.pending_order_value = 0;

        Storage::set_sale(env, &sale);
        Storage::set_trade(env, &trade);
        Storage::set_phase(env, RoundPhase::Sale);
        let window = Self::open_window(env)?;

        Custody::new(env)?.mint(supply);

        log!(env, "sale round started", sale.round, unit_price, supply);
        env.events().publish(
            (Symbol::new(env, "sale_started"), sale.round),
            SaleRoundStartedEvent {
                round: sale.round,
                unit_price,
                supply,
                start: window.start,
                end: window.end,
            },
        );

        Ok(RoundPhase::Sale)
    }

    /// Close the sale round and open a trade round
    ///
    /// Allowed once the window has elapsed or the supply is sold out.
    pub fn start_trade_round(env: &Env) -> Result<(), Error> {
        if Storage::phase(env)? != RoundPhase::Sale {
            return Err(Error::InvalidPhase);
        }

        let sale = Storage::sale(env)?;
        if sale.remaining_supply > 0 {
            Self::require_elapsed(env)?;
        }

        if sale.round == 1 && sale.sold == 0 {
            return Err(Error::NothingToTrade);
        }

        Self::begin_trade(env, sale)
    }

    /// Buy `amount` tokens at the sale price, offering up to `payment`
    pub fn buy_token(env: &Env, buyer: &Address, amount: i128, payment: i128) -> Result<(), Error> {
        if Storage::phase(env)? != RoundPhase::Sale {
            return Err(Error::WrongPhase);
        }
        if amount <= 0 {
            return Err(Error::ZeroAmount);
        }

        let mut sale = Storage::sale(env)?;
        if amount > sale.remaining_supply {
            return Err(Error::InsufficientSupply);
        }

        let cost = cost_of(amount, sale.unit_price)?;
        if payment < cost {
            return Err(Error::InsufficientFunds);
        }

        sale.remaining_supply -= amount;
        sale.sold += amount;
        Storage::set_sale(env, &sale);
        Referrals::record_purchase(env, buyer, amount)?;

        let payments = Payments::load(env)?;
        let chain = Referrals::chain(env, buyer);
        FeeDistributor::distribute(
            env,
            &payments,
            buyer,
            cost,
            &chain,
            &payments.treasury,
            &PURCHASE,
        )?;
        Custody::new(env)?.release(buyer, amount);

        env.events().publish(
            (Symbol::new(env, "purchased"), buyer.clone()),
            TokensPurchasedEvent {
                buyer: buyer.clone(),
                amount,
                cost,
                unit_price: sale.unit_price,
            },
        );

        if sale.remaining_supply == 0 {
            Self::begin_trade(env, sale)?;
        }

        Ok(())
    }

    fn begin_trade(env: &Env, mut sale: SaleState) -> Result<(), Error> {
        let mut trade = Storage::trade(env)?;

        let unsold = sale.remaining_supply;
        let unsold_value = cost_of(unsold, sale.unit_price)?;
        trade.carry_over_value = trade
            .carry_over_value
            .checked_add(unsold_value)
            .ok_or(Error::ArithmeticOverflow)?;
        trade.traded_volume = 0;
        sale.remaining_supply = 0;

        Storage::set_sale(env, &sale);
        Storage::set_trade(env, &trade);
        Storage::set_phase(env, RoundPhase::Trade);
        let window = Self::open_window(env)?;

        log!(env, "trade round started", sale.round, unsold, trade.carry_over_value);
        env.events().publish(
            (Symbol::new(env, "trade_started"), sale.round),
            TradeRoundStartedEvent {
                sale_round: sale.round,
                unsold,
                carry_over_value: trade.carry_over_value,
                start: window.start,
                end: window.end,
            },
        );

        Ok(())
    }

    fn require_elapsed(env: &Env) -> Result<(), Error> {
        let window = Storage::window(env)?;
        if env.ledger().timestamp() < window.end {
            return Err(Error::RoundNotElapsed);
        }
        Ok(())
    }

    fn open_window(env: &Env) -> Result<RoundWindow, Error> {
        let start = env.ledger().timestamp();
        let end = start
            .checked_add(Storage::round_time(env)?)
            .ok_or(Error::ArithmeticOverflow)?;

        let window = RoundWindow { start, end };
        Storage::set_window(env, &window);
        Ok(window)
    }
}
