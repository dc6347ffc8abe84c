use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{scalar_text, FieldMap};
use crate::fetch_error::FetchError;
use crate::models::RawReading;
use crate::utils::parse_observation_time;

/// Parse a bulk observation dataset
///
/// Accepts a top-level array of records or an object wrapping it in `data`.
/// Records without a station key are skipped; records with an unparseable
/// timestamp are kept with `observed_at = None`.
#[instrument(skip(text, fields), fields(text_size = text.len(), station_field = %fields.station))]
pub fn parse_bulk(text: &str, fields: &FieldMap) -> Result<Vec<RawReading>, FetchError> {
    let document: Value = serde_json::from_str(text)?;

    let records = match &document {
        Value::Array(records) => records,
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(records)) => records,
            _ => return Err(FetchError::MissingColumn("data".to_string())),
        },
        _ => return Err(FetchError::EmptyDocument),
    };

    let mut readings = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for record in records {
        let Some(object) = record.as_object() else {
            skipped += 1;
            continue;
        };

        let Some(station_key) = object.get(&fields.station).and_then(scalar_text) else {
            skipped += 1;
            continue;
        };

        let observed_at = object
            .get(&fields.time)
            .and_then(scalar_text)
            .and_then(|t| parse_observation_time(&t));

        let row: BTreeMap<String, String> = object
            .iter()
            .filter_map(|(k, v)| scalar_text(v).map(|text| (k.clone(), text)))
            .collect();

        readings.push(RawReading {
            station_key,
            observed_at,
            fields: row,
        });
    }

    if skipped > 0 {
        warn!("Skipped {} bulk records without a station key", skipped);
    }
    debug!("Parsed {} bulk readings", readings.len());

    Ok(readings)
}
