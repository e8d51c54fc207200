use crate::value::PropertyMap;

/// The one trait analytics channel authors implement.
///
/// The router calls `setup` exactly once while it initializes, before any
/// event is sent, and then `send_event` once per dispatched event. Delivery,
/// batching and retries are the client's own business.
pub trait AnalyticsClient: Send + Sync {
    /// Prepare the underlying SDK or connection.
    fn setup(&self);

    /// Hand one fully materialized event to the channel.
    fn send_event(&self, props: PropertyMap);
}
