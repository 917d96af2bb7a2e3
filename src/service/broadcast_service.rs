//! Broadcast service: fans a payload out to every member of a channel.

use std::sync::Arc;

use crate::domain::{ChannelId, Hub, Payload};
use crate::supervisor::Supervisor;

/// Outcome of one fan-out, used for logging only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Members in the snapshot.
    pub recipients: usize,
    /// Members whose queue accepted the payload.
    pub delivered: usize,
    /// Members that were closed or too slow.
    pub failed: usize,
}

/// Fire-and-forget dispatcher on top of the [`Hub`].
///
/// Delivery is best effort: each member is tried independently and a
/// failure is logged, never escalated. A failed delivery does not remove
/// the member; only its own connection task does that.
#[derive(Debug, Clone)]
pub struct BroadcastService {
    hub: Arc<Hub>,
    supervisor: Supervisor,
}

impl BroadcastService {
    /// Creates a new `BroadcastService`.
    #[must_use]
    pub fn new(hub: Arc<Hub>, supervisor: Supervisor) -> Self {
        Self { hub, supervisor }
    }

    /// Returns a reference to the inner [`Hub`].
    #[must_use]
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Starts delivering `payload` to `channel` on its own task and returns
    /// immediately.
    pub fn dispatch(&self, channel: ChannelId, payload: Payload) {
        let service = self.clone();
        self.supervisor.spawn(async move {
            service.deliver(&channel, payload).await;
        });
    }

    /// Delivers `payload` to every current member of `channel`.
    ///
    /// Members that join after the snapshot is taken are not included.
    pub async fn deliver(&self, channel: &ChannelId, payload: Payload) -> DeliveryReport {
        let members = self.hub.snapshot(channel).await;
        let mut report = DeliveryReport {
            recipients: members.len(),
            ..DeliveryReport::default()
        };

        for member in members {
            match member.try_deliver(Arc::clone(&payload)) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        %channel,
                        connection_id = %member.id(),
                        error = %e,
                        "broadcast delivery failed"
                    );
                }
            }
        }

        tracing::debug!(
            %channel,
            recipients = report.recipients,
            delivered = report.delivered,
            failed = report.failed,
            "broadcast delivered"
        );
        report
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::ConnectionHandle;

    fn channel(name: &str) -> ChannelId {
        let Ok(id) = ChannelId::new(name) else {
            panic!("valid channel");
        };
        id
    }

    fn service() -> BroadcastService {
        BroadcastService::new(Arc::new(Hub::new()), Supervisor::new())
    }

    async fn member(svc: &BroadcastService, name: &str) -> mpsc::Receiver<Payload> {
        let (handle, rx) = ConnectionHandle::new(8);
        svc.hub().join(&channel(name), handle).await;
        rx
    }

    #[tokio::test]
    async fn delivers_to_channel_members_only() {
        let svc = service();
        let mut a = member(&svc, "room1").await;
        let mut b = member(&svc, "room1").await;
        let mut other = member(&svc, "room2").await;

        let report = svc.deliver(&channel("room1"), Payload::from("hi")).await;
        assert_eq!(
            report,
            DeliveryReport {
                recipients: 2,
                delivered: 2,
                failed: 0
            }
        );

        for rx in [&mut a, &mut b] {
            let Ok(msg) = rx.try_recv() else {
                panic!("member should have a queued payload");
            };
            assert_eq!(&*msg, "hi");
        }
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_channel_delivers_to_nobody() {
        let svc = service();
        let report = svc.deliver(&channel("ghost"), Payload::from("hi")).await;
        assert_eq!(report, DeliveryReport::default());
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_rest() {
        let svc = service();
        let room = channel("room1");
        let closed = member(&svc, "room1").await;
        drop(closed);
        let mut alive = member(&svc, "room1").await;

        let report = svc.deliver(&room, Payload::from("still here")).await;
        assert_eq!(report.recipients, 2);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert!(alive.try_recv().is_ok());

        // Failed members stay registered until their own task leaves.
        assert_eq!(svc.hub().member_count(&room).await, 2);
    }

    #[tokio::test]
    async fn per_connection_order_is_preserved() {
        let svc = service();
        let room = channel("room1");
        let mut rx = member(&svc, "room1").await;

        for msg in ["one", "two", "three"] {
            svc.deliver(&room, Payload::from(msg)).await;
        }
        let mut got = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            got.push(msg.to_string());
        }
        assert_eq!(got, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn dispatch_returns_before_delivery_and_then_delivers() {
        let svc = service();
        let mut rx = member(&svc, "room1").await;

        svc.dispatch(channel("room1"), Payload::from("async"));

        let got = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
        let Ok(Some(msg)) = got else {
            panic!("dispatched payload should arrive");
        };
        assert_eq!(&*msg, "async");
    }
}
