//! End-to-end resolution: JSON records through the engine to formatted output.

use filigree::{format, prelude::*};
use jiff::Timestamp;
use rusty_money::{Money, iso};
use serde_json::json;
use testresult::TestResult;

fn product(id: ProductId, name: &str, price_minor: i64) -> Product<'static> {
    Product {
        id,
        name: name.to_string(),
        price: Money::from_minor(price_minor, iso::USD),
    }
}

fn percentage_record(id: DiscountId, percent: u32) -> serde_json::Value {
    json!({
        "id": id,
        "type": "PERCENTAGE",
        "value": percent,
        "isActive": true,
        "startDate": "2026-01-01T00:00:00Z",
    })
}

fn evaluation_time() -> TestResult<Timestamp> {
    Ok("2026-08-01T12:00:00Z".parse()?)
}

#[tokio::test]
async fn cart_discount_end_to_end() -> TestResult {
    let ring = ProductId::new();
    let chain = ProductId::new();

    let cart = Cart::with_items(
        [
            CartItem::new(product(ring, "solitaire ring", 25_000), 1),
            CartItem::new(product(chain, "rope chain", 5_000), 2),
        ],
        iso::USD,
    )?;

    let percent_id = DiscountId::new();
    let fixed_id = DiscountId::new();

    let mut repository = InMemoryDiscountRepository::new();

    repository.insert(percent_id, percentage_record(percent_id, 10));
    repository.insert(
        fixed_id,
        json!({
            "id": fixed_id,
            "type": "FIXED",
            "value": 20_000,
            "isActive": true,
            "startDate": "2026-01-01T00:00:00Z",
        }),
    );

    let engine = DiscountEngine::new(repository);

    let resolution = engine
        .cart_discount_at(&cart, &[fixed_id, percent_id], evaluation_time()?)
        .await?;

    // The percentage sits higher in the hierarchy even though the fixed
    // amount is worth more: 10% of $350.00 beats nothing but $200.00.
    assert_eq!(
        resolution.discount_amount,
        Money::from_minor(3_500, iso::USD)
    );
    assert_eq!(resolution.final_amount, Money::from_minor(31_500, iso::USD));
    assert_eq!(resolution.applied.len(), 1);
    assert_eq!(
        resolution.selected.as_ref().map(DiscountRule::id),
        Some(percent_id)
    );

    assert_eq!(format::currency(&resolution.final_amount), "$315.00");

    Ok(())
}

#[tokio::test]
async fn expired_and_inactive_discounts_are_never_selected() -> TestResult {
    let cart = Cart::with_items(
        [CartItem::new(product(ProductId::new(), "studs", 10_000), 1)],
        iso::USD,
    )?;

    let expired = DiscountId::new();
    let upcoming = DiscountId::new();
    let disabled = DiscountId::new();

    let mut repository = InMemoryDiscountRepository::new();

    repository.insert(
        expired,
        json!({
            "id": expired,
            "type": "PERCENTAGE",
            "value": 50,
            "isActive": true,
            "startDate": "2025-01-01T00:00:00Z",
            "endDate": "2025-12-31T00:00:00Z",
        }),
    );
    repository.insert(
        upcoming,
        json!({
            "id": upcoming,
            "type": "PERCENTAGE",
            "value": 50,
            "isActive": true,
            "startDate": "2027-01-01T00:00:00Z",
        }),
    );
    repository.insert(
        disabled,
        json!({
            "id": disabled,
            "type": "PERCENTAGE",
            "value": 50,
            "isActive": false,
            "startDate": "2026-01-01T00:00:00Z",
        }),
    );

    let engine = DiscountEngine::new(repository);

    let resolution = engine
        .cart_discount_at(&cart, &[expired, upcoming, disabled], evaluation_time()?)
        .await?;

    assert!(resolution.applied.is_empty());
    assert_eq!(resolution.original_amount, resolution.final_amount);

    Ok(())
}

#[tokio::test]
async fn line_discounts_scope_by_allowlist_and_surface_hints() -> TestResult {
    let bracelet = ProductId::new();
    let anklet = ProductId::new();

    let cart = Cart::with_items(
        [
            CartItem::new(product(bracelet, "tennis bracelet", 40_000), 1),
            CartItem::new(product(anklet, "bead anklet", 1_500), 4),
        ],
        iso::USD,
    )?;

    let percent_id = DiscountId::new();
    let bundle_id = DiscountId::new();

    let mut repository = InMemoryDiscountRepository::new();

    repository.insert(
        percent_id,
        json!({
            "id": percent_id,
            "type": "PERCENTAGE",
            "value": 10,
            "items": [bracelet],
            "isActive": true,
            "startDate": "2026-01-01T00:00:00Z",
        }),
    );
    repository.insert(
        bundle_id,
        json!({
            "id": bundle_id,
            "type": "BUY_X_GET_Y",
            "value": 2,
            "minQuantity": 2,
            "maxQuantity": 3,
            "items": [anklet],
            "isActive": true,
            "startDate": "2026-01-01T00:00:00Z",
        }),
    );

    let engine = DiscountEngine::new(repository);

    let resolution = engine
        .line_discounts_at(&cart, &[percent_id, bundle_id], evaluation_time()?)
        .await?;

    assert_eq!(resolution.lines.len(), 2);

    let bracelet_line = &resolution.lines[0];
    let bracelet_applied = bracelet_line.applied.as_ref().expect("bracelet winner");

    assert_eq!(bracelet_applied.discount, percent_id);
    assert_eq!(bracelet_applied.amount, Money::from_minor(4_000, iso::USD));
    assert!(bracelet_line.hint.is_none());

    // Four anklets in a pay-2-take-3 offer: one full bundle saved, one unit
    // short of the next pay threshold.
    let anklet_line = &resolution.lines[1];
    let anklet_applied = anklet_line.applied.as_ref().expect("anklet winner");

    assert_eq!(anklet_applied.discount, bundle_id);
    assert_eq!(anklet_applied.amount, Money::from_minor(1_500, iso::USD));

    let hint = anklet_line.hint.expect("anklet hint");

    assert_eq!(hint.add_quantity, 1);
    assert_eq!(hint.suggested_quantity, 5);
    assert_eq!(hint.bundle_quantity, 6);
    assert_eq!(
        format::bundle_hint(&hint),
        "Add 1 more to take 6 for the price of 4 and save up to 33.33%"
    );

    assert_eq!(
        resolution.discount_amount,
        Money::from_minor(5_500, iso::USD)
    );
    assert_eq!(resolution.final_amount, Money::from_minor(40_500, iso::USD));

    Ok(())
}

#[tokio::test]
async fn cart_and_line_bundle_paths_price_differently() -> TestResult {
    let pricey = ProductId::new();
    let cheap = ProductId::new();

    let cart = Cart::with_items(
        [
            CartItem::new(product(pricey, "gold hoop", 2_000), 2),
            CartItem::new(product(cheap, "silver hoop", 500), 1),
        ],
        iso::USD,
    )?;

    let bundle_id = DiscountId::new();

    let mut repository = InMemoryDiscountRepository::new();

    repository.insert(
        bundle_id,
        json!({
            "id": bundle_id,
            "type": "BUY_X_GET_Y",
            "value": 2,
            "minQuantity": 2,
            "maxQuantity": 3,
            "isActive": true,
            "startDate": "2026-01-01T00:00:00Z",
        }),
    );

    let engine = DiscountEngine::new(repository);
    let at = evaluation_time()?;

    // Cart path: three matching units form one bundle, freed unit priced at
    // the cheapest line.
    let cart_resolution = engine.cart_discount_at(&cart, &[bundle_id], at).await?;

    assert_eq!(
        cart_resolution.discount_amount,
        Money::from_minor(500, iso::USD)
    );

    // Line path: neither line holds a full bundle on its own, so nothing is
    // saved. The two-unit line already sits at the pay threshold (no hint);
    // the single-unit line is one short and carries the nudge.
    let line_resolution = engine.line_discounts_at(&cart, &[bundle_id], at).await?;

    assert_eq!(
        line_resolution.discount_amount,
        Money::from_minor(0, iso::USD)
    );

    let pricey_line = &line_resolution.lines[0];

    assert!(pricey_line.applied.is_none());
    assert!(pricey_line.hint.is_none());

    let cheap_line = &line_resolution.lines[1];
    let cheap_applied = cheap_line.applied.as_ref().expect("zero-amount entry");

    assert_eq!(cheap_applied.amount, Money::from_minor(0, iso::USD));
    assert!(cheap_line.hint.is_some());

    Ok(())
}
