//! The plumbing underneath the fulfillment event hooks.
//!
//! Each event type gets its own bounded mpsc channel. The [`EventHandler`] owns the receiving end and a single
//! async callback; [`EventProducer`] clones hand the sending end to whoever emits the event. Handlers are
//! stateless, they see the event payload and nothing else.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, listener) = mpsc::channel(buffer_size);
        Self { listener, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Consumes events until every producer has been dropped, then waits for in-flight callbacks to finish. Each
    /// callback runs on its own task so a slow hook never holds up the queue.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // The receiver only reports a closed channel once the internal sender is gone too
        drop(self.sender);
        let mut in_flight = JoinSet::new();
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Dispatching event");
            let handler = Arc::clone(&self.handler);
            in_flight.spawn(async move { (handler)(ev).await });
            // Reap whatever has already finished so the set does not grow without bound
            while in_flight.try_join_next().is_some() {}
        }
        while let Some(result) = in_flight.join_next().await {
            if let Err(e) = result {
                warn!("📬️ An event callback panicked: {e}");
            }
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicI64, Ordering};

    use bnl_common::Money;

    use super::*;

    #[derive(Debug, Clone)]
    struct WalletCredited {
        seller_id: &'static str,
        amount: Money,
    }

    #[tokio::test]
    async fn every_published_event_is_handled_before_shutdown() {
        let _ = env_logger::try_init();
        let credited = Arc::new(AtomicI64::new(0));
        let total = credited.clone();
        let handler = Arc::new(move |ev: WalletCredited| {
            let credited = credited.clone();
            Box::pin(async move {
                debug!("Crediting {} to {}", ev.amount, ev.seller_id);
                // A deliberately slow hook, so shutdown has something to wait for
                tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
                credited.fetch_add(ev.amount.value(), Ordering::SeqCst);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let event_handler = EventHandler::new(2, handler);
        let sales = event_handler.subscribe();
        let adjustments = event_handler.subscribe();
        tokio::spawn(async move {
            for _ in 0..5 {
                sales.publish_event(WalletCredited { seller_id: "s1", amount: Money::from_cents(9_50) }).await;
            }
        });
        tokio::spawn(async move {
            for _ in 0..3 {
                adjustments.publish_event(WalletCredited { seller_id: "s2", amount: Money::from_cents(-2_00) }).await;
            }
        });

        event_handler.start_handler().await;
        // 5 x 950 - 3 x 200, with the slow callbacks all finished before start_handler returned
        assert_eq!(total.load(Ordering::SeqCst), 4150);
    }
}
