use crate::error::Error;
use crate::events::RegisteredEvent;
use crate::storage::Storage;
use soroban_sdk::{contracttype, Address, Env, Symbol};

/// Up to two upward referrers of a participant
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReferrerChain {
    pub level1: Option<Address>,
    pub level2: Option<Address>,
}

impl ReferrerChain {
    pub fn depth(&self) -> u32 {
        match (&self.level1, &self.level2) {
            (None, _) => 0,
            (Some(_), None) => 1,
            (Some(_), Some(_)) => 2,
        }
    }
}

pub struct Referrals;

impl Referrals {
    /// Register `caller` as a referrer, optionally below `referrer`
    pub fn register(env: &Env, caller: &Address, referrer: Option<Address>) -> Result<(), Error> {
        let mut participant = Storage::participant(env, caller);

        if participant.is_referrer {
            return Err(Error::AlreadyReferrer);
        }

        if let Some(upline) = &referrer {
            if upline == caller {
                return Err(Error::SelfReferral);
            }
            if !Storage::participant(env, upline).is_referrer {
                return Err(Error::UnknownReferrer);
            }
        }

        participant.referrer = referrer.clone();
        participant.is_referrer = true;
        Storage::set_participant(env, caller, &participant);

        env.events().publish(
            (Symbol::new(env, "registered"), caller.clone()),
            RegisteredEvent {
                participant: caller.clone(),
                referrer,
            },
        );

        Ok(())
    }

    pub fn chain(env: &Env, who: &Address) -> ReferrerChain {
        let level1 = Storage::participant(env, who).referrer;
        let level2 = level1
            .as_ref()
            .and_then(|upline| Storage::participant(env, upline).referrer);

        ReferrerChain { level1, level2 }
    }

    /// Record a primary purchase, creating the participant on first use
    pub fn record_purchase(env: &Env, buyer: &Address, amount: i128) -> Result<(), Error> {
        let mut participant = Storage::participant(env, buyer);
        participant.cumulative_purchased = participant
            .cumulative_purchased
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        Storage::set_participant(env, buyer, &participant);
        Ok(())
    }
}
