// Ledger and discount benchmarks for the Hydro settlement core.
//
// Covers native deposit + withdraw cycles, internal transfers between
// balance paths at several ledger sizes, discount rate lookups and the
// packed discount config codec.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use hydro_contracts::{BalancePath, CallContext, Hydro};
use hydro_protocol::asset::{MemoryNative, MemoryToken};
use hydro_protocol::config::HydroConfig;
use hydro_protocol::discount::{DiscountConfig, DiscountTier};
use hydro_protocol::{Address, Amount, Asset};

const UNIT: Amount = 1_000_000_000_000_000_000;

/// Builds an instance with `users` funded accounts, each holding `UNIT` in
/// their common balance.
fn setup(users: usize) -> (Hydro, Arc<MemoryToken>, Vec<Address>) {
    let owner = Address::derive("owner");
    let hot = Arc::new(MemoryToken::new(Address::derive("hot"), "HOT", 18));
    let native = Arc::new(MemoryNative::new());
    let hydro = Hydro::new(
        &HydroConfig::new(owner, hot.address()),
        Address::derive("hydro"),
        native.clone(),
        hot.clone(),
    )
    .unwrap();

    let accounts: Vec<_> = (0..users)
        .map(|i| {
            let user = Address::derive(&format!("user-{i}"));
            native.fund(user, UNIT).unwrap();
            hydro
                .deposit(CallContext::new(user).with_value(UNIT), Asset::NATIVE, UNIT)
                .unwrap();
            user
        })
        .collect();

    (hydro, hot, accounts)
}

fn tiers() -> DiscountConfig {
    DiscountConfig::new(vec![
        DiscountTier::new(100_000, 10),
        DiscountTier::new(50_000, 20),
        DiscountTier::new(10_000, 40),
        DiscountTier::new(5_000, 60),
        DiscountTier::new(1_000, 80),
        DiscountTier::new(100, 90),
    ])
    .unwrap()
}

fn bench_deposit_withdraw(c: &mut Criterion) {
    let (hydro, _, accounts) = setup(1);
    let user = accounts[0];

    c.bench_function("ledger/deposit_withdraw_native", |b| {
        b.iter(|| {
            hydro.withdraw(user, Asset::NATIVE, UNIT).unwrap();
            hydro
                .deposit(CallContext::new(user).with_value(UNIT), Asset::NATIVE, UNIT)
                .unwrap();
            hydro.take_events()
        });
    });
}

fn bench_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger/transfer");

    for size in [10, 100, 1_000] {
        let (hydro, _, accounts) = setup(size);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &accounts, |b, accounts| {
            let user = accounts[size / 2];
            let common = BalancePath::common(user);
            let collateral = BalancePath::collateral(1, user);
            b.iter(|| {
                hydro.transfer(Asset::NATIVE, common, collateral, UNIT).unwrap();
                hydro.transfer(Asset::NATIVE, collateral, common, UNIT).unwrap();
                hydro.take_events()
            });
        });
    }

    group.finish();
}

fn bench_discounted_rate(c: &mut Criterion) {
    let (hydro, hot, _) = setup(1);
    let owner = Address::derive("owner");
    hydro
        .change_discount_config(owner, &tiers().encode())
        .unwrap();
    let holder = Address::derive("holder");
    hot.mint(holder, 7_500 * UNIT).unwrap();

    c.bench_function("discount/get_discounted_rate", |b| {
        b.iter(|| hydro.get_discounted_rate(holder));
    });
}

fn bench_codec(c: &mut Criterion) {
    let config = tiers();
    let packed = config.encode();

    c.bench_function("discount/encode", |b| {
        b.iter(|| config.encode());
    });
    c.bench_function("discount/decode", |b| {
        b.iter(|| packed.decode().unwrap());
    });
}

criterion_group!(
    benches,
    bench_deposit_withdraw,
    bench_transfer,
    bench_discounted_rate,
    bench_codec,
);
criterion_main!(benches);
