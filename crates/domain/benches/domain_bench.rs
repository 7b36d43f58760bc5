use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    AddCartItem, BranchId, CartService, CompleteCart, CreateCart, CustomerId, Money,
    NotificationDispatcher, ProductId, Sale, SaleId, SaleItem,
};
use sale_store::InMemorySaleStore;

fn items(count: usize) -> Vec<SaleItem> {
    (0..count)
        .map(|_| SaleItem::new(ProductId::new(), 2, Money::from_cents(1000)))
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    c.bench_function("domain/aggregate_create_add_complete", |b| {
        b.iter(|| {
            let mut sale = Sale::create(
                SaleId::new(),
                "S-BENCH",
                CustomerId::new(),
                BranchId::new(),
                items(5),
            )
            .unwrap();
            for item in items(5) {
                sale.add_item(item).unwrap();
            }
            sale.complete().unwrap();
        });
    });
}

fn bench_create_cart(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = CartService::new(InMemorySaleStore::new(), NotificationDispatcher::empty());

    c.bench_function("domain/create_cart", |b| {
        b.iter(|| {
            rt.block_on(async {
                let cmd = CreateCart::new(CustomerId::new(), BranchId::new(), items(3));
                service.create_cart(cmd).await.unwrap();
            });
        });
    });
}

fn bench_add_item(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = CartService::new(InMemorySaleStore::new(), NotificationDispatcher::empty());
    let cmd = CreateCart::new(CustomerId::new(), BranchId::new(), items(1));
    let sale_id = cmd.sale_id;
    rt.block_on(async { service.create_cart(cmd).await.unwrap() });
    let product_id = ProductId::new();

    c.bench_function("domain/add_item", |b| {
        b.iter(|| {
            rt.block_on(async {
                let item = SaleItem::new(product_id, 1, Money::from_cents(100));
                service
                    .add_item(AddCartItem::new(sale_id, item))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_full_command_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/full_create_add_complete", |b| {
        b.iter(|| {
            rt.block_on(async {
                let service = CartService::new(
                    InMemorySaleStore::new(),
                    NotificationDispatcher::empty(),
                );
                let cmd = CreateCart::new(CustomerId::new(), BranchId::new(), items(2));
                let sale_id = cmd.sale_id;
                service.create_cart(cmd).await.unwrap();
                service
                    .add_item(AddCartItem::new(
                        sale_id,
                        SaleItem::new(ProductId::new(), 1, Money::from_cents(500)),
                    ))
                    .await
                    .unwrap();
                service
                    .complete_cart(CompleteCart::new(sale_id))
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_aggregate,
    bench_create_cart,
    bench_add_item,
    bench_full_command_cycle
);
criterion_main!(benches);
