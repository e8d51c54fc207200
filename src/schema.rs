use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    Channel, EventKey, Trigger,
    diagnostics::Diagnostics,
    error::MappingGapError,
    overrides::OverrideTable,
};

/// Cell text marking a property the developer supplies at trigger time.
pub const DEV_PROVIDED: &str = "devToProvide";

/// Column holding the trigger name in every channel csv.
pub const TRIGGER_COLUMN: &str = "trigger";

/// One csv cell: a value sent verbatim, or a slot filled from runtime props.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CellValue {
    Literal(String),
    DeveloperProvided,
}

impl CellValue {
    pub fn parse(cell: &str) -> Self {
        if cell == DEV_PROVIDED {
            CellValue::DeveloperProvided
        } else {
            CellValue::Literal(cell.to_string())
        }
    }

    pub fn is_developer_provided(&self) -> bool {
        matches!(self, CellValue::DeveloperProvided)
    }
}

/// Event key → cell, in csv column order.
pub type CsvProperties = IndexMap<EventKey, CellValue>;

/// Raw csv rows as handed over by the loader: trigger → column → cell.
pub type CsvRows = IndexMap<String, IndexMap<String, String>>;

/// The triggers one channel understands, and the properties each one carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaTable {
    triggers: IndexMap<Trigger, CsvProperties>,
}

impl SchemaTable {
    pub fn from_rows(rows: CsvRows) -> Self {
        let triggers = rows
            .into_iter()
            .map(|(trigger, columns)| {
                let properties = columns
                    .into_iter()
                    .filter(|(column, _)| column != TRIGGER_COLUMN)
                    .map(|(column, cell)| {
                        let value = CellValue::parse(&cell);
                        (column, value)
                    })
                    .collect();
                (trigger, properties)
            })
            .collect();
        Self { triggers }
    }

    pub fn get(&self, trigger: &str) -> Option<&CsvProperties> {
        self.triggers.get(trigger)
    }

    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.keys()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

/// Report every trigger of `channel` the integrator did not map, and every
/// developer-provided key with no override. Runs once, at initialization.
/// Returns the number of gaps found.
pub fn validate_overrides(
    channel: &Channel,
    schema: &SchemaTable,
    overrides: &OverrideTable,
    diagnostics: &Diagnostics,
) -> usize {
    let mut gaps = 0;
    for (trigger, properties) in &schema.triggers {
        let Some(dev_overrides) = overrides.channel_overrides(trigger, channel) else {
            diagnostics.log(MappingGapError::MissingOverride {
                trigger: trigger.clone(),
                channel: channel.clone(),
            });
            gaps += 1;
            continue;
        };
        for (key, cell) in properties {
            if cell.is_developer_provided() && !dev_overrides.contains_key(key) {
                diagnostics.log(MappingGapError::MissingOverrideKey {
                    trigger: trigger.clone(),
                    channel: channel.clone(),
                    key: key.clone(),
                });
                gaps += 1;
            }
        }
    }
    gaps
}
