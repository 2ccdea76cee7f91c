//! A fixed-interval stand-in for the cron-like schedulers themselves,
//! which are out of scope here. The validator only ever asks for
//! `last_trigger_at(type, now)`, so this supplies exactly that: the
//! largest `epoch + n * interval` not after `now`, per scheduled type.

use std::collections::HashMap;

use ambernet_tx::TransactionType;
use chrono::{DateTime, Duration, Utc};

use ambernet_validate::Schedulers;

pub struct FixedIntervalSchedulers {
    epoch: DateTime<Utc>,
    intervals: HashMap<TransactionType, Duration>,
}

impl FixedIntervalSchedulers {
    /// `epoch` is the reference instant every schedule's first trigger is
    /// computed from; `intervals` gives each scheduled type's period.
    /// Types absent from `intervals` trigger only at `epoch` itself.
    pub fn new(epoch: DateTime<Utc>, intervals: HashMap<TransactionType, Duration>) -> Self {
        Self { epoch, intervals }
    }

    /// A node's three built-in schedules: node shared secrets renew daily,
    /// node rewards hourly, oracle polling every ten minutes. Mint rewards
    /// has no fixed period of its own — it fires once per node-rewards
    /// cycle since both settle the same summary — so it reuses that
    /// interval.
    pub fn with_defaults(epoch: DateTime<Utc>) -> Self {
        let mut intervals = HashMap::new();
        intervals.insert(TransactionType::NodeSharedSecrets, Duration::days(1));
        intervals.insert(TransactionType::NodeRewards, Duration::hours(1));
        intervals.insert(TransactionType::MintRewards, Duration::hours(1));
        intervals.insert(TransactionType::Oracle, Duration::minutes(10));
        Self::new(epoch, intervals)
    }
}

impl Schedulers for FixedIntervalSchedulers {
    fn last_trigger_at(&self, tx_type: TransactionType, now: DateTime<Utc>) -> DateTime<Utc> {
        let Some(interval) = self.intervals.get(&tx_type) else {
            return self.epoch;
        };
        if now <= self.epoch || interval.num_seconds() <= 0 {
            return self.epoch;
        }
        let elapsed = now - self.epoch;
        let ticks = elapsed.num_seconds() / interval.num_seconds();
        self.epoch + *interval * ticks as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_trigger_never_runs_ahead_of_now() {
        let epoch: DateTime<Utc> = "2022-01-01T00:00:00Z".parse().unwrap();
        let schedulers = FixedIntervalSchedulers::with_defaults(epoch);
        let now: DateTime<Utc> = "2022-01-01T00:10:03Z".parse().unwrap();

        let trigger = schedulers.last_trigger_at(TransactionType::Oracle, now);
        assert!(trigger <= now);
        assert_eq!(trigger, epoch + Duration::minutes(1));
    }

    #[test]
    fn unscheduled_type_always_resolves_to_epoch() {
        let epoch: DateTime<Utc> = "2022-01-01T00:00:00Z".parse().unwrap();
        let schedulers = FixedIntervalSchedulers::new(epoch, HashMap::new());
        let now: DateTime<Utc> = "2023-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(schedulers.last_trigger_at(TransactionType::Transfer, now), epoch);
    }
}
