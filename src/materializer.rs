use analytics_client::{PropertyMap, Value};

use crate::{
    error::ResolutionError,
    overrides::DevOverrides,
    path,
    schema::{CellValue, CsvProperties},
};

/// The event built for one channel, and why it stopped early if it did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Materialized {
    pub props: PropertyMap,
    pub error: Option<ResolutionError>,
}

impl Materialized {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Build the event properties for one (trigger, channel) pair.
///
/// Literal cells are written as-is; developer-provided cells are looked up in
/// `runtime_props` through the channel's override path. The first key that
/// cannot be resolved stops the walk: keys after it are not attempted and the
/// props built so far are returned alongside the error.
pub fn materialize(
    channel: &str,
    trigger: &str,
    csv_properties: &CsvProperties,
    overrides: &DevOverrides,
    runtime_props: Option<&PropertyMap>,
) -> Materialized {
    let mut props = PropertyMap::new();
    for (key, cell) in csv_properties {
        if let Err(error) = resolve_key(channel, trigger, key, cell, overrides, runtime_props, &mut props) {
            return Materialized {
                props,
                error: Some(error),
            };
        }
    }
    Materialized { props, error: None }
}

fn resolve_key(
    channel: &str,
    trigger: &str,
    key: &str,
    cell: &CellValue,
    overrides: &DevOverrides,
    runtime_props: Option<&PropertyMap>,
    props: &mut PropertyMap,
) -> Result<(), ResolutionError> {
    let value = match cell {
        CellValue::Literal(literal) => Value::String(literal.clone()),
        CellValue::DeveloperProvided => {
            let source = overrides.get(key).ok_or_else(|| ResolutionError::KeyNotOverridden {
                key: key.to_string(),
                channel: channel.to_string(),
                trigger: trigger.to_string(),
            })?;
            let runtime_props = runtime_props.ok_or_else(|| ResolutionError::PropsMissing {
                channel: channel.to_string(),
                trigger: trigger.to_string(),
            })?;
            path::get(runtime_props, source)
                .cloned()
                .ok_or_else(|| ResolutionError::PathNotFound {
                    path: source.clone(),
                    channel: channel.to_string(),
                    trigger: trigger.to_string(),
                })?
        }
    };

    if path::set(props, key, value) {
        Ok(())
    } else {
        Err(ResolutionError::PathConflict {
            key: key.to_string(),
            channel: channel.to_string(),
            trigger: trigger.to_string(),
        })
    }
}
