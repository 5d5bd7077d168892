use crate::utils::{offer, start_server, ALICE, BOB, CAROL};
use anyhow::Result;
use reprise_client::{RepriseWizard, WizardError, WizardStep};
use reprise_types::{DeliveryMethod, Direction, Location, OrderStatus};
use std::time::Duration;

/// Wait until the wizard's location dropdown is populated.
async fn wait_for_locations<A>(wizard: &RepriseWizard<A>) -> Result<Vec<Location>>
where
    A: reprise_client::MarketplaceApi + 'static,
{
    let search = wizard
        .location_search()
        .ok_or_else(|| anyhow::anyhow!("location search not started"))?;
    let mut updates = search.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = updates.borrow_and_update().clone();
            if !snapshot.searching && !snapshot.results.is_empty() {
                return;
            }
            if updates.changed().await.is_err() {
                return;
            }
        }
    })
    .await?;
    Ok(wizard.location_results())
}

#[tokio::test]
async fn test_delivery_order_created_end_to_end() -> Result<()> {
    let server = start_server().await?;
    let api = server.client(ALICE)?;
    let target = offer(20, BOB, "Phone", 200.0);
    let mut wizard = RepriseWizard::open(api, ALICE, target, &server.client_config());

    let offers = wizard.load_my_offers().await?;
    assert_eq!(offers.len(), 2);
    wizard.select_offer(10)?;
    wizard.confirm_selection()?;

    let quote = wizard.quote().ok_or_else(|| anyhow::anyhow!("no quote"))?;
    assert_eq!(quote.direction, Direction::Payer);
    assert_eq!(wizard.effective_difference(), 50.0);
    wizard.set_override("35")?;
    wizard.continue_to_delivery()?;

    wizard.type_location("casa")?;
    let results = wait_for_locations(&wizard).await?;
    assert_eq!(results[0].address_name, "Gare Casa Port");
    wizard.select_location(&results[0])?;
    assert_eq!(wizard.location_text(), "Casablanca, Centre");
    assert!(wizard.location_results().is_empty());

    let confirmation = wizard.submit().await?;
    assert_eq!(confirmation.order.status, OrderStatus::Pending);
    assert_eq!(confirmation.order.balance_amount, 35.0);
    assert_eq!(confirmation.order.balance_payer_id, Some(ALICE));
    assert!(wizard.is_closed());
    assert!(wizard.draft().is_none());

    let catalog = server.state.store.read()?;
    let order = catalog
        .orders
        .get(&confirmation.order.id)
        .ok_or_else(|| anyhow::anyhow!("order not stored"))?;
    assert_eq!(order.location_id, Some(1));
    assert_eq!(order.sender.user_id, ALICE);
    assert_eq!(order.receiver.user_id, BOB);
    Ok(())
}

#[tokio::test]
async fn test_pickup_order_sends_no_location() -> Result<()> {
    let server = start_server().await?;
    let api = server.client(ALICE)?;
    let target = offer(30, CAROL, "Lamp", 80.0);
    let mut wizard = RepriseWizard::open(api, ALICE, target, &server.client_config());

    wizard.load_my_offers().await?;
    wizard.select_offer(11)?;
    wizard.confirm_selection()?;
    assert_eq!(
        wizard.quote().map(|q| q.direction),
        Some(Direction::Recevoir)
    );
    wizard.continue_to_delivery()?;
    wizard.set_delivery_method(DeliveryMethod::Pickup)?;

    let confirmation = wizard.submit().await?;
    assert_eq!(confirmation.order.balance_amount, 220.0);
    assert_eq!(confirmation.order.balance_payer_id, Some(CAROL));

    let catalog = server.state.store.read()?;
    let order = catalog
        .orders
        .get(&confirmation.order.id)
        .ok_or_else(|| anyhow::anyhow!("order not stored"))?;
    assert_eq!(order.location_id, None);
    Ok(())
}

#[tokio::test]
async fn test_excessive_balance_is_rejected_and_wizard_stays_open() -> Result<()> {
    let server = start_server().await?;
    let api = server.client(ALICE)?;
    let target = offer(20, BOB, "Phone", 200.0);
    let mut wizard = RepriseWizard::open(api, ALICE, target, &server.client_config());

    wizard.load_my_offers().await?;
    wizard.select_offer(10)?;
    wizard.confirm_selection()?;
    wizard.set_override("80")?;
    wizard.continue_to_delivery()?;
    wizard.set_delivery_method(DeliveryMethod::Pickup)?;

    let err = wizard.submit().await.unwrap_err();
    assert!(matches!(err, WizardError::Api(_)));
    assert_eq!(wizard.step(), WizardStep::Delivery);
    assert_eq!(
        wizard.last_error(),
        Some("differenceAmount exceeds the maximum allowed difference")
    );
    assert!(server.state.store.read()?.orders.is_empty());

    // Lowering the amount lets the same draft go through.
    wizard.back()?;
    wizard.set_override("50")?;
    wizard.continue_to_delivery()?;
    let confirmation = wizard.submit().await?;
    assert_eq!(confirmation.order.balance_amount, 50.0);
    Ok(())
}

#[tokio::test]
async fn test_seller_without_other_offers_is_sent_to_offer_creation() -> Result<()> {
    let server = start_server().await?;
    let api = server.client(BOB)?;
    let target = offer(10, ALICE, "City bike", 150.0);
    let mut wizard = RepriseWizard::open(api, BOB, target, &server.client_config());

    // Bob only owns the phone, which is tradeable.
    wizard.load_my_offers().await?;
    assert!(!wizard.can_create_offer());

    let api = server.client(CAROL)?;
    let target = offer(30, CAROL, "Lamp", 80.0);
    let mut own = RepriseWizard::open(api, CAROL, target, &server.client_config());
    own.load_my_offers().await?;
    assert!(own.can_create_offer());
    let exit = own.exit_to_offer_creation()?;
    assert_eq!(exit.target_offer_id, 30);
    assert!(own.is_closed());
    Ok(())
}
