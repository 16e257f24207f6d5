use cart::{
    CartAction, CartEngine, CartState, CouponCatalog, InMemoryCartRemote, InMemoryStore,
    ProductListing,
};
use common::Money;
use criterion::{Criterion, criterion_group, criterion_main};

fn listings(n: usize) -> Vec<ProductListing> {
    (0..n)
        .map(|i| {
            ProductListing::new(
                format!("SKU-{i:04}"),
                format!("Handloom Item {i}"),
                Money::from_paise(9_900 + i as i64),
            )
        })
        .collect()
}

fn bench_reducer_add(c: &mut Criterion) {
    let products = listings(50);

    c.bench_function("cart/reducer_add_50_lines", |b| {
        b.iter(|| {
            let mut state = CartState::default();
            for listing in &products {
                let action = state.add_item(listing, 2).unwrap();
                state.apply(action);
            }
            state
        });
    });
}

fn bench_reducer_merge_and_remove(c: &mut Criterion) {
    let products = listings(50);
    let mut base = CartState::default();
    for listing in &products {
        let action = base.add_item(listing, 1).unwrap();
        base.apply(action);
    }

    c.bench_function("cart/reducer_merge_then_remove", |b| {
        b.iter(|| {
            let mut state = base.clone();
            for listing in &products {
                let action = state.add_item(listing, 1).unwrap();
                state.apply(action);
            }
            for listing in &products {
                state.apply(CartAction::ItemRemoved {
                    id: listing.id.clone(),
                });
            }
            state
        });
    });
}

fn bench_coupon_and_summary(c: &mut Criterion) {
    let catalog = CouponCatalog::default();
    let mut state = CartState::default();
    for listing in &listings(20) {
        let action = state.add_item(listing, 1).unwrap();
        state.apply(action);
    }

    c.bench_function("cart/apply_coupon_and_summary", |b| {
        b.iter(|| {
            let mut state = state.clone();
            let action = state.apply_coupon(&catalog, "BHARATSHAALA10").unwrap();
            state.apply(action);
            state.summary()
        });
    });
}

fn bench_engine_add(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let products = listings(10);

    c.bench_function("cart/engine_add_with_sync_and_persist", |b| {
        b.iter(|| {
            rt.block_on(async {
                let engine = CartEngine::new(InMemoryCartRemote::new(), InMemoryStore::new());
                for listing in &products {
                    engine.add_item(listing, 1).await.unwrap();
                }
            });
        });
    });
}

criterion_group!(
    benches,
    bench_reducer_add,
    bench_reducer_merge_and_remove,
    bench_coupon_and_summary,
    bench_engine_add
);
criterion_main!(benches);
