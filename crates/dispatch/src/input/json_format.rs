use serde::Deserialize;

use crate::error::DispatchError;
use crate::inventory::UnitEntry;
use crate::resolver::DispatchRequest;
use crate::resource_type::TypeCodeTable;
use crate::road_graph::{checked_distance, Location, Road};

use super::DispatchBatch;

/// A type code as it appears in JSON: `1` or `"fire"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CodeToken {
    Number(u64),
    Text(String),
}

impl CodeToken {
    fn as_code(&self) -> String {
        match self {
            CodeToken::Number(n) => n.to_string(),
            CodeToken::Text(s) => s.clone(),
        }
    }
}

#[derive(Deserialize)]
struct RawUnit {
    #[serde(alias = "zip")]
    location: Location,
    #[serde(alias = "type")]
    resource: CodeToken,
    count: u32,
}

#[derive(Deserialize)]
struct RawRequest {
    #[serde(alias = "zip")]
    location: Location,
    #[serde(alias = "type")]
    resource: CodeToken,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBatch {
    #[serde(default)]
    roads: Vec<Road>,
    #[serde(default, alias = "vehicles")]
    units: Vec<RawUnit>,
    #[serde(default)]
    requests: Vec<RawRequest>,
}

/// Parse a JSON batch document.
///
/// Shape errors (wrong types, unknown keys) are reported as
/// [`DispatchError::MalformedInput`] with the JSON line they occurred on.
/// Invalid road distances name the road instead.
pub fn parse_json(text: &str, table: &TypeCodeTable) -> Result<DispatchBatch, DispatchError> {
    let raw: RawBatch = serde_json::from_str(text).map_err(|e| DispatchError::MalformedInput {
        line: Some(e.line()),
        reason: e.to_string(),
    })?;

    for (i, road) in raw.roads.iter().enumerate() {
        checked_distance(road.distance).map_err(|reason| DispatchError::MalformedInput {
            line: None,
            reason: format!("road #{}: {reason}", i + 1),
        })?;
    }

    let units = raw
        .units
        .iter()
        .map(|u| {
            Ok(UnitEntry {
                location: u.location,
                resource: table.translate(&u.resource.as_code(), None)?,
                count: u.count,
            })
        })
        .collect::<Result<Vec<_>, DispatchError>>()?;

    let requests = raw
        .requests
        .iter()
        .map(|q| {
            Ok(DispatchRequest {
                location: q.location,
                resource: table.translate(&q.resource.as_code(), None)?,
            })
        })
        .collect::<Result<Vec<_>, DispatchError>>()?;

    Ok(DispatchBatch {
        roads: raw.roads,
        units,
        requests,
    })
}
