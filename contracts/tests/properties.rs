//! Property tests for ledger conservation, atomicity and the discount table.

use std::sync::Arc;

use proptest::prelude::*;
use proptest::sample::select;

use hydro_contracts::{BalancePath, CallContext, DiscountTierTable, ErrorKind, Hydro, Ownable};
use hydro_protocol::asset::{MemoryNative, MemoryToken, NativeCurrency, TokenContract};
use hydro_protocol::config::{HydroConfig, MAX_DISCOUNT_THRESHOLD};
use hydro_protocol::discount::{DiscountConfig, DiscountTier, PackedDiscountConfig};
use hydro_protocol::{Address, Amount, Asset};

const USERS: [&str; 3] = ["alice", "bob", "carol"];
const SEED: Amount = 1_000;

fn owner() -> Address {
    Address::derive("owner")
}

fn custody() -> Address {
    Address::derive("hydro")
}

/// An instance where every user has `SEED` native units in `Common`.
fn seeded() -> (Hydro, Arc<MemoryNative>, Arc<MemoryToken>) {
    let hot = Arc::new(MemoryToken::new(Address::derive("hot"), "HOT", 18));
    let native = Arc::new(MemoryNative::new());
    let hydro = Hydro::new(
        &HydroConfig::new(owner(), hot.address()),
        custody(),
        native.clone(),
        hot.clone(),
    )
    .unwrap();

    for name in USERS {
        let user = Address::derive(name);
        native.fund(user, SEED).unwrap();
        hydro
            .deposit(CallContext::new(user).with_value(SEED), Asset::NATIVE, SEED)
            .unwrap();
    }
    (hydro, native, hot)
}

/// Proptest strategy for a balance path among a few users and markets.
fn path() -> impl Strategy<Value = BalancePath> {
    (select(USERS.to_vec()), 0u16..3, any::<bool>()).prop_map(|(name, market, collateral)| {
        let user = Address::derive(name);
        if collateral {
            BalancePath::collateral(market, user)
        } else {
            // Common paths with a stray market id must land on the same slot.
            BalancePath {
                market_id: market,
                ..BalancePath::common(user)
            }
        }
    })
}

/// Proptest strategy for a transfer: source, destination, amount.
fn transfer() -> impl Strategy<Value = (BalancePath, BalancePath, Amount)> {
    (path(), path(), 0..2 * SEED)
}

/// Proptest strategy for a discount table with strictly descending thresholds
/// and non-increasing rates, richest tier first.
fn descending_table() -> impl Strategy<Value = DiscountConfig> {
    (
        prop::collection::btree_set(1u64..10_000, 1..=6),
        prop::collection::vec(0u16..=100, 6),
    )
        .prop_map(|(thresholds, mut rates)| {
            rates.sort_unstable();
            let tiers = thresholds
                .into_iter()
                .rev()
                .zip(rates)
                .map(|(threshold, rate)| DiscountTier::new(threshold, rate))
                .collect();
            DiscountConfig::new(tiers).unwrap()
        })
}

/// Proptest strategy for any valid tier list, unused slots included.
fn any_tiers() -> impl Strategy<Value = Vec<DiscountTier>> {
    prop::collection::vec(
        (0..=MAX_DISCOUNT_THRESHOLD, 0u16..=100).prop_map(|(t, r)| DiscountTier::new(t, r)),
        0..=6,
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    #[test]
    fn transfers_conserve_total(transfers in prop::collection::vec(transfer(), 1..40)) {
        let (hydro, native, _) = seeded();
        let total = SEED * USERS.len() as Amount;

        for (from, to, amount) in transfers {
            let before_from = hydro.balance_at(Asset::NATIVE, &from);
            let before_to = hydro.balance_at(Asset::NATIVE, &to);

            match hydro.transfer(Asset::NATIVE, from, to, amount) {
                Ok(()) => prop_assert!(before_from >= amount),
                Err(err) => {
                    prop_assert!(before_from < amount);
                    prop_assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
                    prop_assert_eq!(hydro.balance_at(Asset::NATIVE, &from), before_from);
                    prop_assert_eq!(hydro.balance_at(Asset::NATIVE, &to), before_to);
                }
            }
            prop_assert_eq!(hydro.total_balance(Asset::NATIVE), Some(total));
        }

        prop_assert_eq!(native.balance_of(custody()), total);
    }

    #[test]
    fn oversized_transfer_changes_nothing(from in path(), to in path(), excess in 1..SEED) {
        let (hydro, _, _) = seeded();
        let available = hydro.balance_at(Asset::NATIVE, &from);
        let before_to = hydro.balance_at(Asset::NATIVE, &to);

        let err = hydro
            .transfer(Asset::NATIVE, from, to, available + excess)
            .unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
        prop_assert_eq!(hydro.balance_at(Asset::NATIVE, &from), available);
        prop_assert_eq!(hydro.balance_at(Asset::NATIVE, &to), before_to);
    }

    #[test]
    fn deposit_withdraw_round_trip(amount in 0..=SEED, native_asset in any::<bool>()) {
        let (hydro, native, hot) = seeded();
        let user = Address::derive("dave");
        let (asset, value) = if native_asset {
            native.fund(user, SEED).unwrap();
            (Asset::NATIVE, amount)
        } else {
            hot.mint(user, SEED).unwrap();
            hot.approve(user, custody(), Amount::MAX);
            (Asset::token(hot.address()), 0)
        };
        let external = |asset: Asset| {
            if asset.is_native() {
                native.balance_of(user)
            } else {
                hot.balance_of(user)
            }
        };

        let before = hydro.balance_of(asset, user);
        let external_before = external(asset);

        hydro.deposit(CallContext::new(user).with_value(value), asset, amount).unwrap();
        prop_assert_eq!(hydro.balance_of(asset, user), before + amount);

        hydro.withdraw(user, asset, amount).unwrap();
        prop_assert_eq!(hydro.balance_of(asset, user), before);
        prop_assert_eq!(external(asset), external_before);
    }

    #[test]
    fn discount_is_non_increasing(
        config in descending_table(),
        low in 0u128..12_000,
        extra in 0u128..12_000,
    ) {
        let hot = Arc::new(MemoryToken::new(Address::derive("hot"), "HOT", 0));
        let table = DiscountTierTable::new(hot.address(), hot.clone(), 0, config);
        let user = Address::derive("holder");

        hot.mint(user, low).unwrap();
        let rate_low = table.get_discounted_rate(user);
        hot.mint(user, extra).unwrap();
        let rate_high = table.get_discounted_rate(user);

        prop_assert!(rate_high <= rate_low);
        prop_assert!(rate_low <= 100);
    }

    #[test]
    fn config_round_trips(tiers in any_tiers()) {
        let config = DiscountConfig::new(tiers).unwrap();
        let packed = config.encode();
        prop_assert_eq!(packed.decode().unwrap(), config);

        let reparsed = PackedDiscountConfig::from_hex(&packed.to_hex()).unwrap();
        prop_assert_eq!(reparsed, packed);
    }

    #[test]
    fn only_owner_reconfigures(caller in any::<[u8; 20]>(), tiers in any_tiers()) {
        let caller = Address::from_bytes(caller);
        prop_assume!(caller != owner());

        let hot = Arc::new(MemoryToken::new(Address::derive("hot"), "HOT", 18));
        let access = Ownable::new(owner());
        let mut table =
            DiscountTierTable::new(hot.address(), hot, 18, DiscountConfig::default());
        let packed = DiscountConfig::new(tiers).unwrap().encode();

        let err = table.change_discount_config(&access, caller, &packed).unwrap_err();
        let is_not_owner = matches!(
            err,
            hydro_contracts::DiscountError::Access(hydro_contracts::AccessError::NotOwner { .. })
        );
        prop_assert!(is_not_owner);
        prop_assert_eq!(table.discount_config(), &DiscountConfig::default());
    }
}
