#![cfg(test)]

use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, Env,
};
use trade_platform::{
    RoundPhase, TradePlatform, TradePlatformClient, INITIAL_PRICE, INITIAL_SUPPLY,
    PRICE_INCREMENT, PRICE_SCALE,
};
use trade_token::{TradeToken, TradeTokenClient};

// Constants
const ROUND_TIME: u64 = 60;
const UNIT: i128 = PRICE_SCALE;

struct TestContext {
    env: Env,
    treasury: Address,
    signer: Address,
    acc1: Address,
    acc2: Address,
    acc3: Address,
    platform_id: Address,
    platform: TradePlatformClient<'static>,
    token: TradeTokenClient<'static>,
    payment: token::Client<'static>,
}

fn setup_test() -> TestContext {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let treasury = Address::generate(&env);
    let signer = Address::generate(&env);
    let acc1 = Address::generate(&env);
    let acc2 = Address::generate(&env);
    let acc3 = Address::generate(&env);

    // Payment asset (Stellar Asset Contract)
    let payment_id = env
        .register_stellar_asset_contract_v2(admin.clone())
        .address();
    let payment_admin = token::StellarAssetClient::new(&env, &payment_id);
    for user in [&signer, &acc1, &acc2, &acc3] {
        payment_admin.mint(user, &(1_000_000 * UNIT));
    }

    // Platform token
    let token_id = env.register(TradeToken, ());
    let token = TradeTokenClient::new(&env, &token_id);
    token.initialize(&admin);

    // Platform, granted the mint / burn roles
    let platform_id = env.register(TradePlatform, ());
    let platform = TradePlatformClient::new(&env, &platform_id);
    platform.initialize(&token_id, &payment_id, &treasury, &ROUND_TIME);
    token.add_operator(&platform_id);
    assert!(token.is_operator(&platform_id));

    let payment = token::Client::new(&env, &payment_id);

    TestContext {
        env,
        treasury,
        signer,
        acc1,
        acc2,
        acc3,
        platform_id,
        platform,
        token,
        payment,
    }
}

fn advance(ctx: &TestContext, seconds: u64) {
    ctx.env.ledger().with_mut(|li| li.timestamp += seconds);
}

fn balances(ctx: &TestContext, who: &[&Address]) -> [i128; 5] {
    let mut out = [0i128; 5];
    for (slot, addr) in out.iter_mut().zip(who.iter()) {
        *slot = ctx.payment.balance(addr);
    }
    out
}

fn assert_token_conservation(ctx: &TestContext) {
    let held = [&ctx.signer, &ctx.acc1, &ctx.acc2, &ctx.acc3]
        .iter()
        .map(|a| ctx.token.balance_of(a))
        .sum::<i128>();
    assert_eq!(
        ctx.token.total_supply(),
        held + ctx.token.balance_of(&ctx.platform_id)
    );
}

#[test]
fn test_full_cycle_with_referral_chain() {
    let ctx = setup_test();
    let (signer, acc1, acc2, acc3) = (&ctx.signer, &ctx.acc1, &ctx.acc2, &ctx.acc3);

    // acc2 -> acc1 -> signer
    ctx.platform.register(signer, &None);
    ctx.platform.register(acc1, &Some(signer.clone()));
    ctx.platform.register(acc2, &Some(acc1.clone()));

    // Sale round 1
    assert_eq!(ctx.platform.start_sale_round(), RoundPhase::Sale);
    for buyer in [signer, acc1, acc2] {
        ctx.platform.buy_token(buyer, &100, &(UNIT / 100));
    }
    assert_eq!(ctx.platform.remaining_supply(), INITIAL_SUPPLY - 300);
    assert_token_conservation(&ctx);

    // Trade round 1
    advance(&ctx, ROUND_TIME);
    ctx.platform.start_trade_round();
    let unsold_value = (INITIAL_SUPPLY - 300) * INITIAL_PRICE;
    assert_eq!(ctx.platform.carry_over_value(), unsold_value);

    for seller in [signer, acc1, acc2] {
        ctx.token.approve(seller, &ctx.platform_id, &100);
        ctx.platform.add_order(seller, &100, &UNIT);
    }
    assert_eq!(ctx.platform.order_count(), 3);

    // acc3 redeems the entire order of signer, who has no referrer:
    // signer 95%, platform 5%
    let before = balances(&ctx, &[acc3, signer, &ctx.treasury]);
    ctx.platform.redeem_order(acc3, &0, &100, &(100 * UNIT));
    let after = balances(&ctx, &[acc3, signer, &ctx.treasury]);
    assert_eq!(after[0] - before[0], -100 * UNIT);
    assert_eq!(after[1] - before[1], 95 * UNIT);
    assert_eq!(after[2] - before[2], 5 * UNIT);

    let order = ctx.platform.get_order(&0);
    assert!(order.closed);
    assert_eq!(order.tokens_remaining, 0);
    assert_eq!(order.unit_price, 0);

    // acc3 redeems half of acc1's order; acc1's referrer is signer:
    // acc1 95%, signer 2.5%, platform 2.5%
    let before = balances(&ctx, &[acc3, acc1, signer, &ctx.treasury]);
    ctx.platform.redeem_order(acc3, &1, &50, &(51 * UNIT));
    let after = balances(&ctx, &[acc3, acc1, signer, &ctx.treasury]);
    assert_eq!(after[0] - before[0], -50 * UNIT);
    assert_eq!(after[1] - before[1], 475 * UNIT / 10);
    assert_eq!(after[2] - before[2], 125 * UNIT / 100);
    assert_eq!(after[3] - before[3], 125 * UNIT / 100);

    let order = ctx.platform.get_order(&1);
    assert!(!order.closed);
    assert_eq!(order.tokens_remaining, 50);
    assert_eq!(order.unit_price, UNIT);

    let trade = ctx.platform.trade_state();
    assert_eq!(trade.carry_over_value, unsold_value + 150 * UNIT);
    assert_eq!(trade.traded_volume, 150 * UNIT);
    assert_eq!(trade.open_order_value, 150 * UNIT);
    assert_eq!(trade.pending_order_value, 150 * UNIT);
    assert_token_conservation(&ctx);

    // Sale round 2: carry-over plus the still open orders back the supply
    advance(&ctx, ROUND_TIME);
    assert_eq!(ctx.platform.start_sale_round(), RoundPhase::Sale);
    let price = INITIAL_PRICE * 103 / 100 + PRICE_INCREMENT;
    assert_eq!(ctx.platform.unit_price(), price);
    assert_eq!(
        ctx.platform.remaining_supply(),
        (unsold_value + 300 * UNIT) / price
    );
    assert_eq!(ctx.platform.carry_over_value(), 0);
    assert_token_conservation(&ctx);

    // Trade round 2: open orders survive the round change
    advance(&ctx, ROUND_TIME + 1);
    ctx.platform.start_trade_round();
    let order = ctx.platform.get_order(&1);
    assert!(!order.closed);
    assert_eq!(order.tokens_remaining, 50);
    let carry = ctx.platform.carry_over_value();
    assert_eq!(ctx.platform.trade_state().pending_order_value, 0);

    // acc3 redeems the entire order of acc2; chain acc1 -> signer:
    // acc2 95%, acc1 2.5%, signer 2.5%, platform nothing
    let before = balances(&ctx, &[acc3, acc2, acc1, signer, &ctx.treasury]);
    ctx.platform.redeem_order(acc3, &2, &100, &(100 * UNIT));
    let after = balances(&ctx, &[acc3, acc2, acc1, signer, &ctx.treasury]);
    assert_eq!(after[0] - before[0], -100 * UNIT);
    assert_eq!(after[1] - before[1], 95 * UNIT);
    assert_eq!(after[2] - before[2], 25 * UNIT / 10);
    assert_eq!(after[3] - before[3], 25 * UNIT / 10);
    assert_eq!(after[4], before[4]);
    // acc2's order already backed sale round 2
    assert_eq!(ctx.platform.carry_over_value(), carry);

    // acc1 takes back the rest of its order
    ctx.platform.remove_order(acc1, &1);
    assert_eq!(ctx.token.balance_of(acc1), 50);
    assert_eq!(ctx.token.balance_of(acc3), 250);
    assert_eq!(ctx.platform.trade_state().open_order_value, 0);
    assert_token_conservation(&ctx);
}

#[test]
fn test_phases_alternate_strictly() {
    let ctx = setup_test();
    let signer = &ctx.signer;

    ctx.platform.start_sale_round();
    assert!(ctx.platform.try_start_sale_round().is_err());

    ctx.platform.buy_token(signer, &10, &UNIT);
    advance(&ctx, ROUND_TIME);
    ctx.platform.start_trade_round();
    assert!(ctx.platform.try_start_trade_round().is_err());

    advance(&ctx, ROUND_TIME);
    assert_eq!(ctx.platform.start_sale_round(), RoundPhase::Sale);
    assert!(ctx.platform.try_start_sale_round().is_err());
    assert_eq!(ctx.platform.phase(), RoundPhase::Sale);
}
