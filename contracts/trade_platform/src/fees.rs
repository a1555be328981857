use crate::error::Error;
use crate::events::ReferralPaidEvent;
use crate::referral::ReferrerChain;
use crate::storage::Storage;
use soroban_sdk::{token, Address, Env, Symbol};

pub const BASIS_POINTS: i128 = 10_000; // 100% = 10,000 basis points

/// How a gross payment is cut up
///
/// `target_bps == None` means the credit target takes the residual and the
/// platform gets nothing separately.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FeeSchedule {
    pub target_bps: Option<i128>,
    pub level1_bps: i128,
    pub level2_bps: i128,
}

/// Primary market: 5% / 3% to referrers, rest to the treasury
pub const PURCHASE: FeeSchedule = FeeSchedule {
    target_bps: None,
    level1_bps: 500,
    level2_bps: 300,
};

/// Secondary market: seller keeps 95%, the 5% fee goes 2.5% per referrer
/// level and whatever is left to the treasury
pub const REDEMPTION: FeeSchedule = FeeSchedule {
    target_bps: Some(9_500),
    level1_bps: 250,
    level2_bps: 250,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FeeSplit {
    pub target: i128,
    pub level1: i128,
    pub level2: i128,
    pub platform: i128,
}

fn bps_of(gross: i128, bps: i128) -> Result<i128, Error> {
    gross
        .checked_mul(bps)
        .map(|v| v / BASIS_POINTS)
        .ok_or(Error::ArithmeticOverflow)
}

/// Split `gross` for a payer with `referrers` upward levels (0, 1 or 2)
///
/// Example (purchase, two referrers, gross 1,000):
/// - level1: 50, level2: 30, target: 920, platform: 0
pub fn split(gross: i128, referrers: u32, schedule: &FeeSchedule) -> Result<FeeSplit, Error> {
    let level1 = if referrers >= 1 {
        bps_of(gross, schedule.level1_bps)?
    } else {
        0
    };
    let level2 = if referrers >= 2 {
        bps_of(gross, schedule.level2_bps)?
    } else {
        0
    };

    let residual = gross - level1 - level2;
    match schedule.target_bps {
        None => Ok(FeeSplit {
            target: residual,
            level1,
            level2,
            platform: 0,
        }),
        Some(bps) => {
            let target = bps_of(gross, bps)?;
            Ok(FeeSplit {
                target,
                level1,
                level2,
                platform: residual - target,
            })
        }
    }
}

/// Where payments are made and where the platform's share ends up
pub struct Payments {
    pub asset: Address,
    pub treasury: Address,
}

impl Payments {
    pub fn load(env: &Env) -> Result<Self, Error> {
        Ok(Payments {
            asset: Storage::payment_asset(env)?,
            treasury: Storage::treasury(env)?,
        })
    }
}

pub struct FeeDistributor;

impl FeeDistributor {
    /// Pay `gross` from `payer` to `credit_target`, the referrers in `chain`
    /// and the treasury according to `schedule`
    pub fn distribute(
        env: &Env,
        payments: &Payments,
        payer: &Address,
        gross: i128,
        chain: &ReferrerChain,
        credit_target: &Address,
        schedule: &FeeSchedule,
    ) -> Result<FeeSplit, Error> {
        let parts = split(gross, chain.depth(), schedule)?;
        let client = token::Client::new(env, &payments.asset);

        if let Some(referrer) = &chain.level1 {
            Self::pay_referrer(env, &client, payer, referrer, 1, parts.level1);
        }
        if let Some(referrer) = &chain.level2 {
            Self::pay_referrer(env, &client, payer, referrer, 2, parts.level2);
        }
        if parts.target > 0 {
            client.transfer(payer, credit_target, &parts.target);
        }
        if parts.platform > 0 {
            client.transfer(payer, &payments.treasury, &parts.platform);
        }

        Ok(parts)
    }

    fn pay_referrer(
        env: &Env,
        client: &token::Client,
        payer: &Address,
        referrer: &Address,
        level: u32,
        amount: i128,
    ) {
        if amount <= 0 {
            return;
        }
        client.transfer(payer, referrer, &amount);

        env.events().publish(
            (Symbol::new(env, "referral_paid"), referrer.clone()),
            ReferralPaidEvent {
                payer: payer.clone(),
                referrer: referrer.clone(),
                level,
                amount,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(s: &FeeSplit) -> i128 {
        s.target + s.level1 + s.level2 + s.platform
    }

    #[test]
    fn test_purchase_table() {
        let gross = 1_000_000;

        let none = split(gross, 0, &PURCHASE).unwrap();
        assert_eq!(none, FeeSplit { target: 1_000_000, level1: 0, level2: 0, platform: 0 });

        let one = split(gross, 1, &PURCHASE).unwrap();
        assert_eq!(one, FeeSplit { target: 950_000, level1: 50_000, level2: 0, platform: 0 });

        let two = split(gross, 2, &PURCHASE).unwrap();
        assert_eq!(two, FeeSplit { target: 920_000, level1: 50_000, level2: 30_000, platform: 0 });
    }

    #[test]
    fn test_redemption_table() {
        let gross = 100_000;

        let none = split(gross, 0, &REDEMPTION).unwrap();
        assert_eq!(none, FeeSplit { target: 95_000, level1: 0, level2: 0, platform: 5_000 });

        let one = split(gross, 1, &REDEMPTION).unwrap();
        assert_eq!(one, FeeSplit { target: 95_000, level1: 2_500, level2: 0, platform: 2_500 });

        let two = split(gross, 2, &REDEMPTION).unwrap();
        assert_eq!(two, FeeSplit { target: 95_000, level1: 2_500, level2: 2_500, platform: 0 });
    }

    #[test]
    fn test_dust_goes_to_residual() {
        // 5% of 19 = 0.95 -> 0, 3% of 19 = 0.57 -> 0
        let purchase = split(19, 2, &PURCHASE).unwrap();
        assert_eq!(purchase.target, 19);

        // 95% of 39 = 37.05 -> 37, 2.5% of 39 = 0.975 -> 0
        let redemption = split(39, 1, &REDEMPTION).unwrap();
        assert_eq!(redemption.target, 37);
        assert_eq!(redemption.level1, 0);
        assert_eq!(redemption.platform, 2);
    }

    #[test]
    fn test_parts_always_sum_to_gross() {
        for gross in [0i128, 1, 7, 99, 101, 12_345, 1_000_000_007] {
            for referrers in 0..=2 {
                assert_eq!(total(&split(gross, referrers, &PURCHASE).unwrap()), gross);
                assert_eq!(total(&split(gross, referrers, &REDEMPTION).unwrap()), gross);
            }
        }
    }
}
