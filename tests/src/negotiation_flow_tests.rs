use crate::utils::{start_server, TestServer, ALICE, BOB, CAROL};
use anyhow::Result;
use reprise_client::{
    Affordance, CardError, CardState, ClientError, MarketplaceApi, NegotiationCard, Role,
};
use reprise_types::{CreateOrderRequest, DeliveryMethod, OrderStatus};

/// Alice offers her bike (150) for Bob's phone (200) with a 50 balance.
async fn open_order(server: &TestServer) -> Result<u64> {
    let request = CreateOrderRequest::new(10, 20, 50.0, DeliveryMethod::Delivery, Some(1));
    let created = server.client(ALICE)?.create_order(&request).await?;
    Ok(created.order.id)
}

fn role(card: &NegotiationCard<reprise_client::HttpApi>) -> Option<Role> {
    match card.state() {
        CardState::PriceNegotiation(step) => Some(step.role),
        _ => None,
    }
}

#[tokio::test]
async fn test_counter_proposal_then_delivery_settles_order() -> Result<()> {
    let server = start_server().await?;
    let order_id = open_order(&server).await?;

    let mut alice = NegotiationCard::open(server.client(ALICE)?, ALICE, order_id).await?;
    let mut bob = NegotiationCard::open(server.client(BOB)?, BOB, order_id).await?;
    assert_eq!(role(&alice), Some(Role::Author));
    assert_eq!(alice.affordance(), Affordance::None);
    assert_eq!(role(&bob), Some(Role::Recipient));
    assert_eq!(bob.affordance(), Affordance::Accept);

    // Bob counters at 40 and becomes the author.
    bob.edit_amount("40")?;
    assert_eq!(bob.affordance(), Affordance::Propose);
    bob.propose().await?;
    assert_eq!(role(&bob), Some(Role::Author));

    alice.refresh().await?;
    assert_eq!(role(&alice), Some(Role::Recipient));
    assert_eq!(alice.affordance(), Affordance::Accept);
    alice.accept().await?;
    assert_eq!(alice.state().step_number(), Some(2));

    bob.refresh().await?;
    match bob.state() {
        CardState::DeliveryNegotiation(step) => {
            assert!(!step.is_order_sender());
            assert_eq!(
                step.waiting_message().as_deref(),
                Some("Waiting for Alice Martin to choose the delivery method…")
            );
        }
        other => panic!("expected step 2, got {other:?}"),
    }
    assert_eq!(
        bob.choose_method(DeliveryMethod::Delivery),
        Err(CardError::NotOrderSender)
    );

    alice.choose_method(DeliveryMethod::Delivery)?;
    alice.choose_carrier("ozonexpress").await?;
    match alice.state() {
        CardState::Settled { order } => {
            assert_eq!(order.status, OrderStatus::DeliveryScheduled);
            assert_eq!(order.balance_amount, 40.0);
            let delivery = order
                .delivery
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("no delivery arrangement"))?;
            assert_eq!(delivery.carrier.as_deref(), Some("ozonexpress"));
            assert_eq!(delivery.price, Some(48.0));
        }
        other => panic!("expected settled, got {other:?}"),
    }

    bob.refresh().await?;
    assert!(matches!(bob.state(), CardState::Settled { .. }));
    Ok(())
}

#[tokio::test]
async fn test_pickup_confirmation_settles_without_carrier() -> Result<()> {
    let server = start_server().await?;
    let order_id = open_order(&server).await?;
    server.client(BOB)?.accept(order_id).await?;

    let mut alice = NegotiationCard::open(server.client(ALICE)?, ALICE, order_id).await?;
    alice.choose_method(DeliveryMethod::Pickup)?;
    alice.confirm_pickup().await?;

    match alice.state() {
        CardState::Settled { order } => {
            let delivery = order
                .delivery
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("no delivery arrangement"))?;
            assert_eq!(delivery.method, DeliveryMethod::Pickup);
            assert_eq!(delivery.carrier, None);
        }
        other => panic!("expected settled, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_stale_card_reports_server_rejection() -> Result<()> {
    let server = start_server().await?;
    let order_id = open_order(&server).await?;

    let mut stale = NegotiationCard::open(server.client(BOB)?, BOB, order_id).await?;
    // Accepted from another device in the meantime.
    server.client(BOB)?.accept(order_id).await?;

    let err = stale.accept().await.unwrap_err();
    assert!(matches!(
        err,
        CardError::Api(ClientError::Api { status: 400, .. })
    ));
    assert_eq!(stale.state().step_number(), Some(1));
    assert_eq!(
        stale.last_error(),
        Some("Only a pending order can be accepted (status: accepted)")
    );

    stale.refresh().await?;
    assert_eq!(stale.state().step_number(), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_outsider_and_unknown_order_cannot_be_resumed() -> Result<()> {
    let server = start_server().await?;
    let order_id = open_order(&server).await?;

    let mut carol = NegotiationCard::new(server.client(CAROL)?, CAROL, order_id);
    assert!(carol.refresh().await.is_err());
    assert_eq!(
        carol.state(),
        &CardState::Unavailable {
            message: "You are not a party to this order".into()
        }
    );

    let mut missing = NegotiationCard::new(server.client(ALICE)?, ALICE, 999);
    assert!(missing.refresh().await.is_err());
    assert_eq!(
        missing.state(),
        &CardState::Unavailable {
            message: "Order not found".into()
        }
    );
    Ok(())
}
