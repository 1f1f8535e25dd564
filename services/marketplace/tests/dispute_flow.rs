//! Dispute Flow Tests
//!
//! Coverage of the dispute arbitration layer:
//! - Open/cancel reversibility (status and balance restored exactly)
//! - Mediator-only resolution with all-or-nothing leg validation
//! - Over-allocation rejection leaves everything untouched
//! - Shortfall residual disposition (paid to the fee collector)
//! - Escrow frozen while disputed

use rust_decimal::Decimal;

use escrow::errors::VaultError;
use escrow::gateway::{LedgerGateway, TokenGateway};
use marketplace::errors::MarketplaceError;
use marketplace::receipts::RecordingReceiptIssuer;
use marketplace::Marketplace;
use types::errors::OrderError;
use types::ids::{AccountId, ListingId, OrderId, StoreId};
use types::listing::ListingMetadata;
use types::order::{OrderAction, OrderStatus};
use types::store::StoreProfile;
use types::token::PaymentToken;

const T0: i64 = 1_708_123_456_789_000_000;

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

struct Harness {
    market: Marketplace,
    gateway: LedgerGateway,
    receipts: RecordingReceiptIssuer,
    mediator: AccountId,
    collector: AccountId,
    seller: AccountId,
    buyer: AccountId,
    listing_id: ListingId,
    store_id: StoreId,
}

/// Marketplace at 200 bps with one native listing: price 10, quantity 5.
fn setup() -> Harness {
    let owner = AccountId::new();
    let mediator = AccountId::new();
    let collector = AccountId::new();
    let seller = AccountId::new();
    let buyer = AccountId::new();

    let mut market = Marketplace::new(owner, mediator, 200, collector).unwrap();
    let store_id = market
        .create_store(seller, StoreProfile::default(), T0)
        .unwrap();
    let listing_id = market
        .create_listing(
            seller,
            PaymentToken::Native,
            dec(10),
            ListingMetadata::default(),
            5,
            store_id,
            T0,
        )
        .unwrap();

    let mut gateway = LedgerGateway::new();
    gateway.mint(buyer, PaymentToken::Native, dec(1_000));

    Harness {
        market,
        gateway,
        receipts: RecordingReceiptIssuer::new(),
        mediator,
        collector,
        seller,
        buyer,
        listing_id,
        store_id,
    }
}

/// Drive an order to `Escrowed` holding 21 (2 × 10 + shipping 1).
fn escrowed_order(h: &mut Harness) -> OrderId {
    let order_id = h
        .market
        .create_order_request(h.buyer, h.listing_id, 2, "pier 7".to_string(), T0 + 1)
        .unwrap();
    h.market
        .seller_set_shipping(order_id, &h.seller, dec(1), 3, T0 + 2)
        .unwrap();
    h.market
        .buyer_confirm_and_pay(&mut h.gateway, order_id, &h.buyer, dec(21), T0 + 3)
        .unwrap();
    order_id
}

// ═══════════════════════════════════════════════════════════════════
// Opening Disputes
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_open_dispute_freezes_order() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);

    h.market.open_dispute(order_id, &h.buyer, T0 + 4).unwrap();

    let order = h.market.order(order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Disputed);
    let dispute = order.dispute.unwrap();
    assert_eq!(dispute.initiator, h.buyer);
    assert_eq!(dispute.previous_status, OrderStatus::Escrowed);
    // balance untouched by the freeze
    assert_eq!(h.market.escrow_balance(order_id), dec(21));
    assert!(order.funds_escrowed);
}

#[test]
fn test_seller_may_open_from_shipped() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    h.market.mark_shipped(order_id, &h.seller, T0 + 4).unwrap();

    h.market.open_dispute(order_id, &h.seller, T0 + 5).unwrap();
    let order = h.market.order(order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Disputed);
    assert_eq!(order.dispute.unwrap().previous_status, OrderStatus::Shipped);
}

#[test]
fn test_stranger_cannot_open() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    let eve = AccountId::new();

    let err = h.market.open_dispute(order_id, &eve, T0 + 4).unwrap_err();
    assert_eq!(err, MarketplaceError::Order(OrderError::Unauthorized));
}

#[test]
fn test_open_before_escrow_rejected() {
    let mut h = setup();
    let order_id = h
        .market
        .create_order_request(h.buyer, h.listing_id, 2, "pier 7".to_string(), T0 + 1)
        .unwrap();

    let err = h.market.open_dispute(order_id, &h.buyer, T0 + 2).unwrap_err();
    assert_eq!(
        err,
        MarketplaceError::Order(OrderError::InvalidTransition {
            from: OrderStatus::Requested,
            action: OrderAction::OpenDispute,
        })
    );
}

#[test]
fn test_no_nested_dispute() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    h.market.open_dispute(order_id, &h.buyer, T0 + 4).unwrap();

    let err = h.market.open_dispute(order_id, &h.seller, T0 + 5).unwrap_err();
    assert_eq!(
        err,
        MarketplaceError::Order(OrderError::InvalidTransition {
            from: OrderStatus::Disputed,
            action: OrderAction::OpenDispute,
        })
    );
}

// ═══════════════════════════════════════════════════════════════════
// Dispute Reversibility
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_cancel_restores_pre_dispute_state() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    let balance_before = h.market.escrow_balance(order_id);

    h.market.open_dispute(order_id, &h.buyer, T0 + 4).unwrap();
    h.market.cancel_dispute(order_id, &h.buyer, T0 + 5).unwrap();

    let order = h.market.order(order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Escrowed);
    assert_eq!(order.dispute, None);
    assert_eq!(h.market.escrow_balance(order_id), balance_before);
}

#[test]
fn test_cancel_restores_shipped_status() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    h.market.mark_shipped(order_id, &h.seller, T0 + 4).unwrap();

    h.market.open_dispute(order_id, &h.seller, T0 + 5).unwrap();
    h.market.cancel_dispute(order_id, &h.seller, T0 + 6).unwrap();

    assert_eq!(
        h.market.order(order_id).unwrap().status,
        OrderStatus::Shipped
    );
}

#[test]
fn test_only_initiator_cancels() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    h.market.open_dispute(order_id, &h.buyer, T0 + 4).unwrap();

    // the counterparty cannot withdraw someone else's dispute
    let err = h
        .market
        .cancel_dispute(order_id, &h.seller, T0 + 5)
        .unwrap_err();
    assert_eq!(err, MarketplaceError::Order(OrderError::Unauthorized));

    // neither can the mediator
    let err = h
        .market
        .cancel_dispute(order_id, &h.mediator, T0 + 5)
        .unwrap_err();
    assert_eq!(err, MarketplaceError::Order(OrderError::Unauthorized));

    assert_eq!(
        h.market.order(order_id).unwrap().status,
        OrderStatus::Disputed
    );
}

#[test]
fn test_lifecycle_continues_after_cancelled_dispute() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    h.market.open_dispute(order_id, &h.buyer, T0 + 4).unwrap();
    h.market.cancel_dispute(order_id, &h.buyer, T0 + 5).unwrap();

    h.market.mark_shipped(order_id, &h.seller, T0 + 6).unwrap();
    h.market
        .confirm_delivery(
            &mut h.gateway,
            &mut h.receipts,
            order_id,
            &h.buyer,
            true,
            String::new(),
            String::new(),
            T0 + 7,
        )
        .unwrap();

    assert_eq!(
        h.market.order(order_id).unwrap().status,
        OrderStatus::Released
    );
    assert_eq!(h.market.escrow_balance(order_id), Decimal::ZERO);
}

// ═══════════════════════════════════════════════════════════════════
// The Escrow Is Frozen While Disputed
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_disputed_order_blocks_normal_transitions() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    h.market.open_dispute(order_id, &h.buyer, T0 + 4).unwrap();

    let err = h
        .market
        .mark_shipped(order_id, &h.seller, T0 + 5)
        .unwrap_err();
    assert!(matches!(
        err,
        MarketplaceError::Order(OrderError::InvalidTransition { .. })
    ));

    let err = h
        .market
        .buyer_cancel_and_refund(&mut h.gateway, order_id, &h.buyer, T0 + 5)
        .unwrap_err();
    assert!(matches!(
        err,
        MarketplaceError::Order(OrderError::InvalidTransition { .. })
    ));

    assert_eq!(h.market.escrow_balance(order_id), dec(21));
}

// ═══════════════════════════════════════════════════════════════════
// Resolution
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_resolution_splits_escrow_exactly() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    h.market.open_dispute(order_id, &h.buyer, T0 + 4).unwrap();

    h.market
        .resolve_dispute(
            &mut h.gateway,
            &mut h.receipts,
            order_id,
            &h.mediator,
            dec(10),
            dec(11),
            "ipfs://receipt/d1".to_string(),
            T0 + 5,
        )
        .unwrap();

    let order = h.market.order(order_id).unwrap();
    assert_eq!(order.status, OrderStatus::DisputeResolved);
    assert!(order.completed);
    assert!(!order.funds_escrowed);
    assert!(order.receipt.is_some());

    assert_eq!(h.market.escrow_balance(order_id), Decimal::ZERO);
    assert_eq!(
        h.gateway.balance_of(&h.buyer, &PaymentToken::Native),
        dec(989)
    );
    assert_eq!(
        h.gateway.balance_of(&h.seller, &PaymentToken::Native),
        dec(11)
    );
    assert_eq!(
        h.gateway.balance_of(&h.collector, &PaymentToken::Native),
        Decimal::ZERO
    );

    // resolution does not touch the store rating
    let store = h.market.store(h.store_id).unwrap();
    assert_eq!(store.positive_ratings + store.negative_ratings, 0);
}

#[test]
fn test_over_allocation_rejected_atomically() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    h.market.open_dispute(order_id, &h.buyer, T0 + 4).unwrap();

    let err = h
        .market
        .resolve_dispute(
            &mut h.gateway,
            &mut h.receipts,
            order_id,
            &h.mediator,
            dec(15),
            dec(10),
            String::new(),
            T0 + 5,
        )
        .unwrap_err();
    assert_eq!(
        err,
        MarketplaceError::Vault(VaultError::OverAllocation {
            requested: dec(25),
            available: dec(21),
        })
    );

    // nothing moved, order still disputed
    let order = h.market.order(order_id).unwrap();
    assert_eq!(order.status, OrderStatus::Disputed);
    assert!(!order.completed);
    assert_eq!(h.market.escrow_balance(order_id), dec(21));
    assert_eq!(
        h.gateway.balance_of(&h.buyer, &PaymentToken::Native),
        dec(979)
    );
    assert_eq!(
        h.gateway.balance_of(&h.seller, &PaymentToken::Native),
        Decimal::ZERO
    );
    assert!(h.receipts.minted().is_empty());

    // a correct resolution still goes through afterwards
    h.market
        .resolve_dispute(
            &mut h.gateway,
            &mut h.receipts,
            order_id,
            &h.mediator,
            dec(21),
            Decimal::ZERO,
            String::new(),
            T0 + 6,
        )
        .unwrap();
    assert_eq!(
        h.gateway.balance_of(&h.buyer, &PaymentToken::Native),
        dec(1_000)
    );
}

#[test]
fn test_shortfall_residual_goes_to_collector() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    h.market.open_dispute(order_id, &h.seller, T0 + 4).unwrap();

    h.market
        .resolve_dispute(
            &mut h.gateway,
            &mut h.receipts,
            order_id,
            &h.mediator,
            dec(10),
            dec(5),
            String::new(),
            T0 + 5,
        )
        .unwrap();

    assert_eq!(
        h.gateway.balance_of(&h.buyer, &PaymentToken::Native),
        dec(989)
    );
    assert_eq!(
        h.gateway.balance_of(&h.seller, &PaymentToken::Native),
        dec(5)
    );
    assert_eq!(
        h.gateway.balance_of(&h.collector, &PaymentToken::Native),
        dec(6)
    );
    assert_eq!(h.market.escrow_balance(order_id), Decimal::ZERO);
}

#[test]
fn test_only_mediator_resolves() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    h.market.open_dispute(order_id, &h.buyer, T0 + 4).unwrap();

    for caller in [h.buyer, h.seller, AccountId::new()] {
        let err = h
            .market
            .resolve_dispute(
                &mut h.gateway,
                &mut h.receipts,
                order_id,
                &caller,
                dec(10),
                dec(11),
                String::new(),
                T0 + 5,
            )
            .unwrap_err();
        assert_eq!(err, MarketplaceError::Order(OrderError::Unauthorized));
    }
    assert_eq!(h.market.escrow_balance(order_id), dec(21));
}

#[test]
fn test_resolve_requires_open_dispute() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);

    let err = h
        .market
        .resolve_dispute(
            &mut h.gateway,
            &mut h.receipts,
            order_id,
            &h.mediator,
            dec(10),
            dec(11),
            String::new(),
            T0 + 4,
        )
        .unwrap_err();
    assert_eq!(
        err,
        MarketplaceError::Order(OrderError::InvalidTransition {
            from: OrderStatus::Escrowed,
            action: OrderAction::ResolveDispute,
        })
    );
}

#[test]
fn test_no_double_resolution() {
    let mut h = setup();
    let order_id = escrowed_order(&mut h);
    h.market.open_dispute(order_id, &h.buyer, T0 + 4).unwrap();
    h.market
        .resolve_dispute(
            &mut h.gateway,
            &mut h.receipts,
            order_id,
            &h.mediator,
            dec(21),
            Decimal::ZERO,
            String::new(),
            T0 + 5,
        )
        .unwrap();

    let err = h
        .market
        .resolve_dispute(
            &mut h.gateway,
            &mut h.receipts,
            order_id,
            &h.mediator,
            dec(21),
            Decimal::ZERO,
            String::new(),
            T0 + 6,
        )
        .unwrap_err();
    assert_eq!(err, MarketplaceError::Order(OrderError::AlreadyCompleted));
    assert_eq!(
        h.gateway.balance_of(&h.buyer, &PaymentToken::Native),
        dec(1_000)
    );
}

#[test]
fn test_mediator_change_applies_to_later_resolutions() {
    let mut h = setup();
    let owner = *h.market.owner();
    let order_id = escrowed_order(&mut h);
    h.market.open_dispute(order_id, &h.buyer, T0 + 4).unwrap();

    let new_mediator = AccountId::new();
    h.market.set_mediator(&owner, new_mediator).unwrap();

    // the replaced mediator lost the role
    let err = h
        .market
        .resolve_dispute(
            &mut h.gateway,
            &mut h.receipts,
            order_id,
            &h.mediator,
            dec(21),
            Decimal::ZERO,
            String::new(),
            T0 + 5,
        )
        .unwrap_err();
    assert_eq!(err, MarketplaceError::Order(OrderError::Unauthorized));

    h.market
        .resolve_dispute(
            &mut h.gateway,
            &mut h.receipts,
            order_id,
            &new_mediator,
            dec(21),
            Decimal::ZERO,
            String::new(),
            T0 + 6,
        )
        .unwrap();
    assert_eq!(
        h.market.order(order_id).unwrap().status,
        OrderStatus::DisputeResolved
    );
}
