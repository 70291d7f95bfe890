use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

use crate::domain::order::{CustomerId, Dispatch, Recipient};
use super::render::{render, Rendered};

// ============================================================================
// Effect Dispatch
// ============================================================================
//
// The ordering core hands over `Dispatch` values; a dispatcher turns them
// into messages for a concrete chat transport. Delivery failures are the
// dispatcher's to log; they never flow back into a session.
//
// ============================================================================

#[async_trait]
pub trait EffectDispatcher: Send + Sync {
    async fn dispatch(&self, dispatch: &Dispatch);

    async fn dispatch_all(&self, dispatches: &[Dispatch]) {
        for dispatch in dispatches {
            self.dispatch(dispatch).await;
        }
    }
}

/// Resolves `Recipient::Operator` against the configured operator chat
fn chat_id(recipient: Recipient, operator: CustomerId) -> CustomerId {
    match recipient {
        Recipient::Customer(id) => id,
        Recipient::Operator => operator,
    }
}

/// Writes rendered messages to stdout, for local runs
pub struct ConsoleDispatcher {
    operator: CustomerId,
}

impl ConsoleDispatcher {
    pub fn new(operator: CustomerId) -> Self {
        Self { operator }
    }

    pub fn format(&self, dispatch: &Dispatch) -> String {
        let Rendered { text, buttons } = render(&dispatch.effect);
        let mut out = format!("[to {}]\n{}\n", chat_id(dispatch.recipient, self.operator), text);
        for row in buttons {
            let labels: Vec<String> = row
                .iter()
                .map(|(label, payload)| format!("[{} => {}]", label, payload))
                .collect();
            out.push_str(&labels.join(" "));
            out.push('\n');
        }
        out
    }
}

#[async_trait]
impl EffectDispatcher for ConsoleDispatcher {
    async fn dispatch(&self, dispatch: &Dispatch) {
        let message = self.format(dispatch);
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", message) {
            tracing::warn!(error = %e, "Failed to write message to console");
        }
    }
}

/// Keeps every dispatch in memory; used by tests and embedding callers
pub struct RecordingDispatcher {
    sent: Mutex<Vec<(CustomerId, Dispatch)>>,
    operator: CustomerId,
}

impl RecordingDispatcher {
    pub fn new(operator: CustomerId) -> Self {
        Self { sent: Mutex::new(Vec::new()), operator }
    }

    pub fn take(&self) -> Vec<(CustomerId, Dispatch)> {
        match self.sent.lock() {
            Ok(mut sent) => std::mem::take(&mut *sent),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

#[async_trait]
impl EffectDispatcher for RecordingDispatcher {
    async fn dispatch(&self, dispatch: &Dispatch) {
        let chat = chat_id(dispatch.recipient, self.operator);
        match self.sent.lock() {
            Ok(mut sent) => sent.push((chat, dispatch.clone())),
            Err(poisoned) => poisoned.into_inner().push((chat, dispatch.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Effect;

    #[tokio::test]
    async fn test_operator_dispatch_resolves_to_operator_chat() {
        let dispatcher = RecordingDispatcher::new(CustomerId(1000));
        dispatcher
            .dispatch_all(&[
                Dispatch::to_operator(Effect::OperatorOnly),
                Dispatch::to_customer(CustomerId(7), Effect::NotifyCustomerReady),
            ])
            .await;

        let sent = dispatcher.take();
        assert_eq!(sent[0].0, CustomerId(1000));
        assert_eq!(sent[1].0, CustomerId(7));
        assert!(dispatcher.take().is_empty());
    }

    #[test]
    fn test_console_format_shows_buttons() {
        let dispatcher = ConsoleDispatcher::new(CustomerId(1));
        let out = dispatcher.format(&Dispatch::to_customer(CustomerId(2), Effect::ShowWelcome));

        assert!(out.starts_with("[to 2]"));
        assert!(out.contains("[Order Now => order_now]"));
    }
}
