//! Publish/subscribe fan-out of [`ChangeEvent`]s.
//!
//! Every subscriber owns its own queue, so a slow consumer never holds up the
//! publisher or other consumers. What happens when a consumer falls behind is
//! decided by the [`BufferPolicy`]:
//!
//! - `Unbounded`: one unbounded mpsc queue per subscriber. Nothing is lost;
//!   memory grows with the backlog of a stalled subscriber.
//! - `DropOldest { capacity }`: a broadcast ring of `capacity` events. A
//!   subscriber that lags further than that skips the oldest events and keeps going.

use futures_util::future;
use futures_util::stream::{BoxStream, StreamExt};
use parking_lot::Mutex;
use technotes_core::BufferPolicy;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, UnboundedReceiverStream};
use tracing::{trace, warn};

use crate::events::ChangeEvent;

pub type ChangeStream = BoxStream<'static, ChangeEvent>;

enum Fanout {
    Unbounded(Mutex<Vec<mpsc::UnboundedSender<ChangeEvent>>>),
    DropOldest(broadcast::Sender<ChangeEvent>),
}

pub struct ChangeNotifier {
    fanout: Fanout,
    policy: BufferPolicy,
}

impl ChangeNotifier {
    pub fn new(policy: BufferPolicy) -> Self {
        let fanout = match policy {
            BufferPolicy::Unbounded => Fanout::Unbounded(Mutex::new(Vec::new())),
            BufferPolicy::DropOldest { capacity } => {
                let (sender, _) = broadcast::channel(capacity.max(1));
                Fanout::DropOldest(sender)
            }
        };
        Self { fanout, policy }
    }

    pub fn policy(&self) -> BufferPolicy {
        self.policy
    }

    /// Publishes `event` to every current subscriber. Never blocks.
    pub fn notify_change(&self, event: ChangeEvent) {
        match &self.fanout {
            Fanout::Unbounded(subscribers) => {
                let mut subscribers = subscribers.lock();
                // Subscribers whose stream was dropped are pruned here.
                subscribers.retain(|tx| tx.send(event.clone()).is_ok());
                trace!(key = %event.key(), subscribers = subscribers.len(), "Published change event");
            }
            Fanout::DropOldest(sender) => match sender.send(event) {
                Ok(receivers) => trace!(subscribers = receivers, "Published change event"),
                Err(_) => trace!("Published change event with no subscribers"),
            },
        }
    }

    /// Every event published after this call.
    pub fn observe_changes(&self) -> ChangeStream {
        match &self.fanout {
            Fanout::Unbounded(subscribers) => {
                let (tx, rx) = mpsc::unbounded_channel();
                subscribers.lock().push(tx);
                UnboundedReceiverStream::new(rx).boxed()
            }
            Fanout::DropOldest(sender) => BroadcastStream::new(sender.subscribe())
                .filter_map(|item| {
                    future::ready(match item {
                        Ok(event) => Some(event),
                        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                            warn!(skipped, "Change subscriber lagged behind, oldest events dropped");
                            None
                        }
                    })
                })
                .boxed(),
        }
    }

    /// Events for `key`, plus every store-wide clear.
    pub fn observe_key_changes(&self, key: impl Into<String>) -> ChangeStream {
        let key = key.into();
        self.observe_changes()
            .filter(move |event| future::ready(event.concerns(&key)))
            .boxed()
    }

    pub fn subscriber_count(&self) -> usize {
        match &self.fanout {
            Fanout::Unbounded(subscribers) => subscribers.lock().iter().filter(|tx| !tx.is_closed()).count(),
            Fanout::DropOldest(sender) => sender.receiver_count(),
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(BufferPolicy::Unbounded)
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("policy", &self.policy)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
