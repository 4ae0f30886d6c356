//! Line-oriented batch format:
//!
//! ```text
//! n m                  locations, roads
//! u v distance         (m lines)
//! k
//! location code count  (k lines)
//! q
//! location code        (q lines)
//! ```
//!
//! Blank lines are ignored. Every other line must have exactly the expected
//! number of fields, and nothing may follow the last request.

use std::collections::BTreeSet;

use bevy::log::warn;

use crate::error::DispatchError;
use crate::inventory::UnitEntry;
use crate::resolver::DispatchRequest;
use crate::resource_type::{ResourceType, TypeCodeTable};
use crate::road_graph::{checked_distance, Distance, Location, Road};

use super::DispatchBatch;

/// Non-blank lines paired with their 1-based line numbers.
struct LineCursor<'a> {
    lines: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty())
            .collect();
        Self { lines, pos: 0 }
    }

    /// Next line split into exactly `arity` fields.
    fn fields(&mut self, arity: usize, what: &str) -> Result<(usize, Vec<&'a str>), DispatchError> {
        let Some(&(line, text)) = self.lines.get(self.pos) else {
            return Err(DispatchError::MalformedInput {
                line: None,
                reason: format!("unexpected end of input, expected {what}"),
            });
        };
        self.pos += 1;
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() != arity {
            return Err(DispatchError::malformed(
                line,
                format!(
                    "expected {what} ({arity} fields), found {} fields",
                    fields.len()
                ),
            ));
        }
        Ok((line, fields))
    }

    fn count(&mut self, what: &str) -> Result<usize, DispatchError> {
        let (line, fields) = self.fields(1, what)?;
        parse_count(line, fields[0], what)
    }

    fn remaining(&self) -> Option<usize> {
        self.lines.get(self.pos).map(|&(line, _)| line)
    }
}

fn parse_count(line: usize, field: &str, what: &str) -> Result<usize, DispatchError> {
    field
        .parse::<usize>()
        .map_err(|_| {
            DispatchError::malformed(
                line,
                format!("{what} must be a non-negative integer, got {field:?}"),
            )
        })
}

fn parse_location(line: usize, field: &str) -> Result<Location, DispatchError> {
    field
        .parse::<u32>()
        .map(Location)
        .map_err(|_| DispatchError::malformed(line, format!("invalid location {field:?}")))
}

fn parse_distance(line: usize, field: &str) -> Result<Distance, DispatchError> {
    let value = field
        .parse::<f64>()
        .map_err(|_| DispatchError::malformed(line, format!("invalid road distance {field:?}")))?;
    checked_distance(value).map_err(|reason| DispatchError::malformed(line, reason))
}

fn parse_unit_count(line: usize, field: &str) -> Result<u32, DispatchError> {
    field.parse::<u32>().map_err(|_| {
        let reason = if field.starts_with('-') {
            format!("unit count must not be negative, got {field}")
        } else {
            format!("invalid unit count {field:?}")
        };
        DispatchError::malformed(line, reason)
    })
}

/// Parse a text batch, translating type codes through `table`.
pub fn parse_text(text: &str, table: &TypeCodeTable) -> Result<DispatchBatch, DispatchError> {
    let mut cursor = LineCursor::new(text);

    let (header_line, header) = cursor.fields(2, "header `locations roads`")?;
    let declared_locations = parse_count(header_line, header[0], "location count")?;
    let road_count = parse_count(header_line, header[1], "road count")?;

    let mut roads = Vec::with_capacity(road_count);
    for _ in 0..road_count {
        let (line, f) = cursor.fields(3, "road `u v distance`")?;
        roads.push(Road {
            a: parse_location(line, f[0])?,
            b: parse_location(line, f[1])?,
            distance: parse_distance(line, f[2])?.into_inner(),
        });
    }

    let unit_rows = cursor.count("inventory row count")?;
    let mut units = Vec::with_capacity(unit_rows);
    for _ in 0..unit_rows {
        let (line, f) = cursor.fields(3, "inventory row `location code count`")?;
        units.push(UnitEntry {
            location: parse_location(line, f[0])?,
            resource: table.translate(f[1], Some(line))?,
            count: parse_unit_count(line, f[2])?,
        });
    }

    let request_rows = cursor.count("request count")?;
    let mut requests = Vec::with_capacity(request_rows);
    for _ in 0..request_rows {
        let (line, f) = cursor.fields(2, "request `location code`")?;
        requests.push(DispatchRequest {
            location: parse_location(line, f[0])?,
            resource: table.translate(f[1], Some(line))?,
        });
    }

    if let Some(line) = cursor.remaining() {
        return Err(DispatchError::malformed(
            line,
            format!("unexpected content after the {request_rows} declared requests"),
        ));
    }

    let distinct: BTreeSet<Location> = roads.iter().flat_map(|r| [r.a, r.b]).collect();
    if distinct.len() != declared_locations {
        warn!(
            "Header declares {} locations but roads mention {}",
            declared_locations,
            distinct.len()
        );
    }

    Ok(DispatchBatch {
        roads,
        units,
        requests,
    })
}

/// Render `batch` back into the text format. Types are written with the
/// table's preferred code, or their name when the table has none.
pub fn render_text(batch: &DispatchBatch, table: &TypeCodeTable) -> String {
    let code = |r: ResourceType| table.code_for(r).unwrap_or(r.name()).to_string();
    let distinct: BTreeSet<Location> = batch.roads.iter().flat_map(|r| [r.a, r.b]).collect();

    let mut lines = Vec::new();
    lines.push(format!("{} {}", distinct.len(), batch.roads.len()));
    lines.extend(
        batch
            .roads
            .iter()
            .map(|road| format!("{} {} {}", road.a, road.b, road.distance)),
    );
    lines.push(batch.units.len().to_string());
    lines.extend(
        batch
            .units
            .iter()
            .map(|unit| format!("{} {} {}", unit.location, code(unit.resource), unit.count)),
    );
    lines.push(batch.requests.len().to_string());
    lines.extend(
        batch
            .requests
            .iter()
            .map(|request| format!("{} {}", request.location, code(request.resource))),
    );

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
