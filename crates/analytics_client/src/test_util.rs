use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use crate::{client::AnalyticsClient, value::PropertyMap};

/// An in-memory client that records every event it is handed.
#[derive(Debug, Default, Clone)]
pub struct RecordingClient {
    events: Arc<Mutex<Vec<PropertyMap>>>,
    setup_calls: Arc<AtomicUsize>,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<PropertyMap> {
        self.events.lock().unwrap().clone()
    }

    pub fn flush_events(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn setup_calls(&self) -> usize {
        self.setup_calls.load(Ordering::SeqCst)
    }
}

impl AnalyticsClient for RecordingClient {
    fn setup(&self) {
        self.setup_calls.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().clear();
    }

    fn send_event(&self, props: PropertyMap) {
        self.events.lock().unwrap().push(props);
    }
}
