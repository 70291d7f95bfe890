use crate::domain::menu::{MenuCatalog, Money};
use super::commands::OrderCommand;
use super::effects::Effect;
use super::errors::{InvalidEvent, OrderError};
use super::events::SessionEvent;
use super::value_objects::*;

// ============================================================================
// Order Session - one customer's ordering dialog
// ============================================================================
//
// State machine:
//
//   SelectingCategory --category--> SelectingItem --item--> SelectingSweetness
//          ^                                                     |
//          |                                                 sweetness
//      order more                                                v
//          +------------------------------------------- ConfirmingOrder
//                                                               |
//                                                            confirm
//                                                               v
//                                   (finalize + reset) <-- SelectingPayment
//
// `decide` validates a command and returns events without touching the
// session; `apply` mutates. A rejected command therefore never changes state.
//
// ============================================================================

/// Read-only inputs the state machine consults
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub catalog: &'a MenuCatalog,
    pub max_items: usize,
    pub store_open: bool,
}

/// Result of one accepted command
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub events: Vec<SessionEvent>,
    pub effects: Vec<Effect>,
    /// Set when the customer picked a payment method; the order must now be finalized
    pub finalize: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSession {
    customer_id: CustomerId,
    state: OrderState,
    items: Vec<LineItem>,
    pending: Option<PendingItem>,
    payment_method: Option<PaymentMethod>,
}

impl OrderSession {
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            state: OrderState::SelectingCategory,
            items: Vec::new(),
            pending: None,
            payment_method: None,
        }
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn pending(&self) -> Option<&PendingItem> {
        self.pending.as_ref()
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// Sum of completed lines; the drink under construction never counts
    pub fn total(&self) -> Money {
        self.items.iter().map(|l| l.unit_price).sum()
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary::from_lines(self.items.clone())
    }

    pub fn can_add_more(&self, max_items: usize) -> bool {
        self.items.len() < max_items
    }

    /// Back to a blank dialog; the customer id is kept
    pub fn reset(&mut self) {
        self.state = OrderState::SelectingCategory;
        self.items.clear();
        self.pending = None;
        self.payment_method = None;
    }

    /// Validate a command against the current state
    pub fn decide(
        &self,
        command: &OrderCommand,
        ctx: &DecisionContext<'_>,
    ) -> Result<Vec<SessionEvent>, OrderError> {
        match command {
            OrderCommand::EnterOrdering => {
                if !ctx.store_open {
                    return Err(OrderError::StoreClosed);
                }
                Ok(vec![SessionEvent::OrderingStarted])
            }

            OrderCommand::ChooseCategory(category) => {
                self.expect_state(command, OrderState::SelectingCategory)?;
                if !ctx.catalog.contains_category(category) {
                    return Err(InvalidEvent::UnknownCategory(category.clone()).into());
                }
                Ok(vec![SessionEvent::CategorySelected { category: category.clone() }])
            }

            OrderCommand::ChooseItem(item) => {
                self.expect_state(command, OrderState::SelectingItem)?;
                let category = self
                    .pending
                    .as_ref()
                    .map(|p| p.category())
                    .ok_or(InvalidEvent::UnexpectedInState { event: command.name(), state: self.state })?;

                let unit_price = ctx.catalog.price(category, item).map_err(|_| InvalidEvent::UnknownItem {
                    category: category.to_string(),
                    item: item.clone(),
                })?;

                Ok(vec![SessionEvent::ItemSelected { item: item.clone(), unit_price }])
            }

            OrderCommand::ChooseSweetness(level) => {
                self.expect_state(command, OrderState::SelectingSweetness)?;
                let sweetness: SweetnessLevel = level
                    .parse()
                    .map_err(InvalidEvent::UnknownSweetness)?;
                if !self.can_add_more(ctx.max_items) {
                    return Err(OrderError::LimitReached { max_items: ctx.max_items });
                }
                Ok(vec![SessionEvent::ItemCompleted { sweetness }])
            }

            OrderCommand::OrderMore => {
                self.expect_state(command, OrderState::ConfirmingOrder)?;
                if !self.can_add_more(ctx.max_items) {
                    return Err(OrderError::LimitReached { max_items: ctx.max_items });
                }
                Ok(vec![SessionEvent::MoreRequested])
            }

            OrderCommand::Confirm => {
                self.expect_state(command, OrderState::ConfirmingOrder)?;
                Ok(vec![SessionEvent::OrderConfirmed])
            }

            OrderCommand::ChoosePayment(method) => {
                self.expect_state(command, OrderState::SelectingPayment)?;
                let method: PaymentMethod = method
                    .parse()
                    .map_err(InvalidEvent::UnknownPaymentMethod)?;
                Ok(vec![SessionEvent::PaymentSelected { method }])
            }
        }
    }

    /// Apply a decided event
    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::OrderingStarted | SessionEvent::SessionReset => self.reset(),

            SessionEvent::CategorySelected { category } => {
                self.pending = Some(PendingItem::new(category.clone()));
                self.state = OrderState::SelectingItem;
            }

            SessionEvent::ItemSelected { item, unit_price } => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.select(item.clone(), *unit_price);
                    self.state = OrderState::SelectingSweetness;
                }
            }

            SessionEvent::ItemCompleted { sweetness } => {
                match self.pending.take().and_then(|p| p.complete(*sweetness)) {
                    Some(line) => {
                        self.items.push(line);
                        self.state = OrderState::ConfirmingOrder;
                    }
                    None => {
                        tracing::warn!(
                            customer_id = %self.customer_id,
                            "ItemCompleted applied without a selected item"
                        );
                    }
                }
            }

            SessionEvent::MoreRequested => {
                self.state = OrderState::SelectingCategory;
            }

            SessionEvent::OrderConfirmed => {
                self.state = OrderState::SelectingPayment;
            }

            SessionEvent::PaymentSelected { method } => {
                self.payment_method = Some(*method);
            }
        }
    }

    /// Decide, apply and describe what the customer should see next
    pub fn handle(
        &mut self,
        command: &OrderCommand,
        ctx: &DecisionContext<'_>,
    ) -> Result<Transition, OrderError> {
        let events = self.decide(command, ctx)?;
        let mut effects = Vec::new();
        let mut finalize = false;

        for event in &events {
            self.apply(event);
            if let SessionEvent::PaymentSelected { .. } = event {
                finalize = true;
            }
            if let Some(effect) = self.effect_for(event, ctx) {
                effects.push(effect);
            }
        }

        Ok(Transition { events, effects, finalize })
    }

    fn effect_for(&self, event: &SessionEvent, ctx: &DecisionContext<'_>) -> Option<Effect> {
        match event {
            SessionEvent::OrderingStarted | SessionEvent::MoreRequested => Some(Effect::ShowCategories {
                categories: ctx.catalog.categories().into_iter().map(String::from).collect(),
            }),
            SessionEvent::CategorySelected { category } => Some(Effect::ShowItems {
                category: category.clone(),
                items: ctx.catalog.items(category).map(<[_]>::to_vec).unwrap_or_default(),
            }),
            SessionEvent::ItemSelected { .. } => Some(Effect::ShowSweetnessLevels {
                levels: SweetnessLevel::ALL.to_vec(),
            }),
            SessionEvent::ItemCompleted { .. } => Some(Effect::ShowOrderSummary {
                summary: self.summary(),
                can_order_more: self.can_add_more(ctx.max_items),
            }),
            SessionEvent::OrderConfirmed => Some(Effect::ShowPaymentOptions {
                summary: self.summary(),
                methods: PaymentMethod::ALL.to_vec(),
            }),
            // Confirmation needs the finalized record; the command handler emits it
            SessionEvent::PaymentSelected { .. } | SessionEvent::SessionReset => None,
        }
    }

    fn expect_state(&self, command: &OrderCommand, expected: OrderState) -> Result<(), InvalidEvent> {
        if self.state == expected {
            Ok(())
        } else {
            Err(InvalidEvent::UnexpectedInState { event: command.name(), state: self.state })
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(catalog: &MenuCatalog) -> DecisionContext<'_> {
        DecisionContext { catalog, max_items: 4, store_open: true }
    }

    fn run(session: &mut OrderSession, catalog: &MenuCatalog, commands: &[OrderCommand]) {
        for command in commands {
            session.handle(command, &ctx(catalog)).unwrap();
        }
    }

    fn one_drink(category: &str, item: &str, sweetness: &str) -> Vec<OrderCommand> {
        vec![
            OrderCommand::ChooseCategory(category.into()),
            OrderCommand::ChooseItem(item.into()),
            OrderCommand::ChooseSweetness(sweetness.into()),
        ]
    }

    #[test]
    fn test_new_session_is_blank() {
        let session = OrderSession::new(CustomerId(7));
        assert_eq!(session.state(), OrderState::SelectingCategory);
        assert!(session.items().is_empty());
        assert!(session.pending().is_none());
        assert!(session.payment_method().is_none());
    }

    #[test]
    fn test_full_walk_to_payment() {
        let catalog = MenuCatalog::builtin();
        let mut session = OrderSession::new(CustomerId(1));

        let t = session.handle(&OrderCommand::EnterOrdering, &ctx(&catalog)).unwrap();
        assert!(matches!(t.effects[..], [Effect::ShowCategories { .. }]));

        let t = session.handle(&OrderCommand::ChooseCategory("Coffee".into()), &ctx(&catalog)).unwrap();
        assert_eq!(session.state(), OrderState::SelectingItem);
        match &t.effects[..] {
            [Effect::ShowItems { category, items }] => {
                assert_eq!(category, "Coffee");
                assert_eq!(items.len(), 4);
            }
            other => panic!("unexpected effects: {:?}", other),
        }

        session.handle(&OrderCommand::ChooseItem("Americano".into()), &ctx(&catalog)).unwrap();
        assert_eq!(session.state(), OrderState::SelectingSweetness);
        assert_eq!(session.pending().and_then(|p| p.price()), Some(Money::from_cents(150)));

        let t = session.handle(&OrderCommand::ChooseSweetness("Less sweet".into()), &ctx(&catalog)).unwrap();
        assert_eq!(session.state(), OrderState::ConfirmingOrder);
        assert_eq!(session.items().len(), 1);
        assert!(session.pending().is_none());
        assert!(matches!(
            t.effects[..],
            [Effect::ShowOrderSummary { can_order_more: true, .. }]
        ));

        let t = session.handle(&OrderCommand::Confirm, &ctx(&catalog)).unwrap();
        assert_eq!(session.state(), OrderState::SelectingPayment);
        assert!(matches!(t.effects[..], [Effect::ShowPaymentOptions { .. }]));
        assert!(session.payment_method().is_none());

        let t = session.handle(&OrderCommand::ChoosePayment("cash".into()), &ctx(&catalog)).unwrap();
        assert!(t.finalize);
        assert_eq!(session.payment_method(), Some(PaymentMethod::Cash));
    }

    #[test]
    fn test_pending_item_excluded_from_total() {
        let catalog = MenuCatalog::builtin();
        let mut session = OrderSession::new(CustomerId(1));
        run(&mut session, &catalog, &one_drink("Coffee", "Iced Latte", "Normal sweet"));
        run(
            &mut session,
            &catalog,
            &[
                OrderCommand::OrderMore,
                OrderCommand::ChooseCategory("Matcha".into()),
                OrderCommand::ChooseItem("Matcha Latte".into()),
            ],
        );

        assert_eq!(session.total(), Money::from_cents(200));
        assert_eq!(session.summary().lines.len(), 1);
    }

    #[test]
    fn test_unknown_category_leaves_session_unchanged() {
        let catalog = MenuCatalog::builtin();
        let mut session = OrderSession::new(CustomerId(1));
        let before = session.clone();

        let err = session
            .handle(&OrderCommand::ChooseCategory("Tea".into()), &ctx(&catalog))
            .unwrap_err();

        assert_eq!(err, OrderError::InvalidEvent(InvalidEvent::UnknownCategory("Tea".into())));
        assert_eq!(session, before);
    }

    #[test]
    fn test_item_from_other_category_is_rejected() {
        let catalog = MenuCatalog::builtin();
        let mut session = OrderSession::new(CustomerId(1));
        run(&mut session, &catalog, &[OrderCommand::ChooseCategory("Soda".into())]);
        let before = session.clone();

        let err = session
            .handle(&OrderCommand::ChooseItem("Americano".into()), &ctx(&catalog))
            .unwrap_err();

        assert!(matches!(err, OrderError::InvalidEvent(InvalidEvent::UnknownItem { .. })));
        assert_eq!(session, before);
    }

    #[test]
    fn test_unknown_sweetness_and_payment_rejected() {
        let catalog = MenuCatalog::builtin();
        let mut session = OrderSession::new(CustomerId(1));
        run(
            &mut session,
            &catalog,
            &[OrderCommand::ChooseCategory("Soda".into()), OrderCommand::ChooseItem("Passion Soda".into())],
        );

        let err = session
            .handle(&OrderCommand::ChooseSweetness("Extra sweet".into()), &ctx(&catalog))
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidEvent(InvalidEvent::UnknownSweetness(_))));
        assert_eq!(session.state(), OrderState::SelectingSweetness);

        run(&mut session, &catalog, &[OrderCommand::ChooseSweetness("No sweet".into()), OrderCommand::Confirm]);
        let before = session.clone();
        let err = session
            .handle(&OrderCommand::ChoosePayment("card".into()), &ctx(&catalog))
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidEvent(InvalidEvent::UnknownPaymentMethod(_))));
        assert_eq!(session, before);
    }

    #[test]
    fn test_events_out_of_order_are_rejected() {
        let catalog = MenuCatalog::builtin();
        let mut session = OrderSession::new(CustomerId(1));
        let before = session.clone();

        for command in [
            OrderCommand::ChooseItem("Americano".into()),
            OrderCommand::ChooseSweetness("Normal sweet".into()),
            OrderCommand::OrderMore,
            OrderCommand::Confirm,
            OrderCommand::ChoosePayment("cash".into()),
        ] {
            let err = session.handle(&command, &ctx(&catalog)).unwrap_err();
            assert!(
                matches!(err, OrderError::InvalidEvent(InvalidEvent::UnexpectedInState { .. })),
                "{:?} should be unexpected",
                command
            );
            assert_eq!(session, before);
        }
    }

    #[test]
    fn test_order_more_at_limit() {
        let catalog = MenuCatalog::builtin();
        let mut session = OrderSession::new(CustomerId(1));
        let limited = DecisionContext { catalog: &catalog, max_items: 2, store_open: true };

        for (i, drink) in ["Americano", "Hot Latte"].iter().enumerate() {
            if i > 0 {
                session.handle(&OrderCommand::OrderMore, &limited).unwrap();
            }
            for command in one_drink("Coffee", drink, "Normal sweet") {
                session.handle(&command, &limited).unwrap();
            }
        }

        let before = session.clone();
        let err = session.handle(&OrderCommand::OrderMore, &limited).unwrap_err();
        assert_eq!(err, OrderError::LimitReached { max_items: 2 });
        assert_eq!(session, before);
        assert_eq!(session.state(), OrderState::ConfirmingOrder);
    }

    #[test]
    fn test_summary_hides_order_more_at_limit() {
        let catalog = MenuCatalog::builtin();
        let mut session = OrderSession::new(CustomerId(1));
        let single = DecisionContext { catalog: &catalog, max_items: 1, store_open: true };

        let mut last = None;
        for command in one_drink("Soda", "Blueberry Soda", "More sweet") {
            last = Some(session.handle(&command, &single).unwrap());
        }

        assert!(matches!(
            last.unwrap().effects[..],
            [Effect::ShowOrderSummary { can_order_more: false, .. }]
        ));
    }

    #[test]
    fn test_store_closed_blocks_entry() {
        let catalog = MenuCatalog::builtin();
        let mut session = OrderSession::new(CustomerId(1));
        let closed = DecisionContext { catalog: &catalog, max_items: 4, store_open: false };
        let before = session.clone();

        let err = session.handle(&OrderCommand::EnterOrdering, &closed).unwrap_err();
        assert_eq!(err, OrderError::StoreClosed);
        assert_eq!(session, before);
    }

    #[test]
    fn test_enter_ordering_restarts_dialog() {
        let catalog = MenuCatalog::builtin();
        let mut session = OrderSession::new(CustomerId(1));
        run(&mut session, &catalog, &one_drink("Coffee", "Americano", "Normal sweet"));
        run(&mut session, &catalog, &[OrderCommand::Confirm]);

        run(&mut session, &catalog, &[OrderCommand::EnterOrdering]);

        assert_eq!(session, OrderSession::new(CustomerId(1)));
    }

    #[test]
    fn test_item_count_matches_sweetness_events() {
        let catalog = MenuCatalog::builtin();
        let mut session = OrderSession::new(CustomerId(1));
        let mut sweetness_events = 0;

        for (i, (category, item)) in [("Coffee", "Americano"), ("Matcha", "Matcha Latte"), ("Soda", "Passion Soda")]
            .iter()
            .enumerate()
        {
            if i > 0 {
                run(&mut session, &catalog, &[OrderCommand::OrderMore]);
            }
            run(&mut session, &catalog, &one_drink(category, item, "Less sweet"));
            sweetness_events += 1;
        }
        run(&mut session, &catalog, &[OrderCommand::Confirm]);

        assert_eq!(session.state(), OrderState::SelectingPayment);
        assert_eq!(session.items().len(), sweetness_events);
        assert_eq!(session.total(), Money::from_cents(150 + 225 + 175));
    }
}
