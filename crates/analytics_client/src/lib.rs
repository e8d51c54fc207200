pub mod client;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_util;

pub use client::AnalyticsClient;
pub use value::{PropertyMap, Value, ValueError, props_from_json};
