use chrono::Utc;
use uuid::Uuid;

use super::record::OrderRecord;
use super::session::OrderSession;

// ============================================================================
// Order Finalizer
// ============================================================================

/// Snapshot a paid session into an immutable record.
///
/// The state machine only reaches this point with at least one completed
/// drink and a payment method; anything else is a bug, not a customer error.
pub fn finalize(session: &OrderSession, display_name: &str) -> OrderRecord {
    assert!(
        !session.items().is_empty(),
        "finalize called for customer {} with no completed items",
        session.customer_id()
    );
    let Some(payment_method) = session.payment_method() else {
        panic!(
            "finalize called for customer {} before a payment method was chosen",
            session.customer_id()
        );
    };

    let record = OrderRecord {
        order_id: Uuid::now_v7(),
        customer_id: session.customer_id(),
        display_name: display_name.to_string(),
        items: session.items().to_vec(),
        total: session.total(),
        payment_method,
        created_at: Utc::now(),
    };

    tracing::info!(
        order_id = %record.order_id,
        customer_id = %record.customer_id,
        item_count = record.items.len(),
        total = %record.total,
        payment_method = record.payment_method.as_str(),
        "Order finalized"
    );

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::menu::{Category, MenuCatalog, MenuItem, Money};
    use crate::domain::order::{CustomerId, DecisionContext, OrderCommand, PaymentMethod};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn paid_session(catalog: &MenuCatalog, drinks: &[(&str, &str)], method: &str) -> OrderSession {
        let ctx = DecisionContext { catalog, max_items: drinks.len().max(1), store_open: true };
        let mut session = OrderSession::new(CustomerId(9));
        for (i, (category, item)) in drinks.iter().enumerate() {
            if i > 0 {
                session.handle(&OrderCommand::OrderMore, &ctx).unwrap();
            }
            session.handle(&OrderCommand::ChooseCategory(category.to_string()), &ctx).unwrap();
            session.handle(&OrderCommand::ChooseItem(item.to_string()), &ctx).unwrap();
            session.handle(&OrderCommand::ChooseSweetness("Normal sweet".into()), &ctx).unwrap();
        }
        session.handle(&OrderCommand::Confirm, &ctx).unwrap();
        session.handle(&OrderCommand::ChoosePayment(method.into()), &ctx).unwrap();
        session
    }

    fn two_item_catalog() -> MenuCatalog {
        MenuCatalog::new(vec![Category {
            name: "Drinks".into(),
            items: vec![
                MenuItem { name: "A".into(), price: Money::from_cents(125) },
                MenuItem { name: "B".into(), price: Money::from_cents(150) },
            ],
        }])
        .unwrap()
    }

    #[test]
    fn test_finalize_exact_total() {
        let catalog = two_item_catalog();
        let session = paid_session(&catalog, &[("Drinks", "A"), ("Drinks", "B")], "cash");

        let record = finalize(&session, "alice");

        assert_eq!(record.total, Money::from_cents(275));
        assert_eq!(record.total.to_string(), "$2.75");
        assert_eq!(record.payment_method, PaymentMethod::Cash);
        assert_eq!(record.display_name, "alice");
        assert_eq!(record.customer_id, CustomerId(9));
        assert_eq!(record.items.len(), 2);
    }

    #[test]
    fn test_finalize_does_not_mutate_session() {
        let catalog = two_item_catalog();
        let session = paid_session(&catalog, &[("Drinks", "A")], "aba");
        let before = session.clone();

        let _ = finalize(&session, "bob");

        assert_eq!(session, before);
    }

    #[test]
    fn test_randomized_totals_are_exact() {
        let catalog = MenuCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let menu: Vec<(String, String, i64)> = catalog
            .categories()
            .into_iter()
            .flat_map(|c| {
                catalog
                    .items(c)
                    .unwrap()
                    .iter()
                    .map(move |i| (c.to_string(), i.name.clone(), i.price.cents()))
            })
            .collect();

        for _ in 0..1000 {
            let count = rng.gen_range(1..=4);
            let picks: Vec<_> = (0..count).map(|_| &menu[rng.gen_range(0..menu.len())]).collect();
            let drinks: Vec<(&str, &str)> = picks.iter().map(|(c, i, _)| (c.as_str(), i.as_str())).collect();
            let expected: i64 = picks.iter().map(|(_, _, cents)| cents).sum();

            let session = paid_session(&catalog, &drinks, "cash");
            let record = finalize(&session, "rng");

            assert_eq!(record.total.cents(), expected);
        }
    }

    #[test]
    #[should_panic(expected = "no completed items")]
    fn test_finalize_empty_session_panics() {
        let session = OrderSession::new(CustomerId(1));
        let _ = finalize(&session, "nobody");
    }
}
