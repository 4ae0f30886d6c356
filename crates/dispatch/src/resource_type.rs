//! Emergency unit categories and the input-boundary code table.
//!
//! Batches name unit types with small codes (`1`, `2`, ...) or short tokens
//! (`fire`). Translation into [`ResourceType`] happens exactly once, while the
//! batch is parsed; the ledger, search and resolver only ever see the enum.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The kind of emergency unit a location stocks and a request asks for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Ambulance,
    Fire,
    Police,
    Rescue,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Ambulance,
        ResourceType::Fire,
        ResourceType::Police,
        ResourceType::Rescue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceType::Ambulance => "ambulance",
            ResourceType::Fire => "fire",
            ResourceType::Police => "police",
            ResourceType::Rescue => "rescue",
        }
    }

    /// Numeric code used by the line-oriented batch format.
    pub fn default_code(self) -> &'static str {
        match self {
            ResourceType::Ambulance => "1",
            ResourceType::Fire => "2",
            ResourceType::Police => "3",
            ResourceType::Rescue => "4",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Code table
// ---------------------------------------------------------------------------

/// Maps raw type codes from a batch to [`ResourceType`].
///
/// Lookups are case-insensitive for the word tokens. Unknown codes are an
/// error rather than a silent fallback to some default type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, ResourceType>",
    into = "BTreeMap<String, ResourceType>"
)]
pub struct TypeCodeTable {
    codes: BTreeMap<String, ResourceType>,
}

impl Default for TypeCodeTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for resource in ResourceType::ALL {
            table.insert(resource.default_code(), resource);
            table.insert(resource.name(), resource);
        }
        table
    }
}

impl From<BTreeMap<String, ResourceType>> for TypeCodeTable {
    fn from(raw: BTreeMap<String, ResourceType>) -> Self {
        let mut table = Self::empty();
        for (code, resource) in raw {
            table.insert(&code, resource);
        }
        table
    }
}

impl From<TypeCodeTable> for BTreeMap<String, ResourceType> {
    fn from(table: TypeCodeTable) -> Self {
        table.codes
    }
}

impl TypeCodeTable {
    pub fn empty() -> Self {
        Self {
            codes: BTreeMap::new(),
        }
    }

    /// Register (or replace) a code. Codes are stored lowercased.
    pub fn insert(&mut self, code: &str, resource: ResourceType) {
        self.codes.insert(code.trim().to_ascii_lowercase(), resource);
    }

    pub fn get(&self, code: &str) -> Option<ResourceType> {
        self.codes.get(&code.trim().to_ascii_lowercase()).copied()
    }

    /// Translate `code`, reporting `line` on failure.
    pub fn translate(&self, code: &str, line: Option<usize>) -> Result<ResourceType, DispatchError> {
        self.get(code).ok_or_else(|| DispatchError::UnknownTypeCode {
            line,
            code: code.to_string(),
        })
    }

    /// The code written back out when rendering a batch as text. Prefers a
    /// numeric code when the table has one for `resource`.
    pub fn code_for(&self, resource: ResourceType) -> Option<&str> {
        let mut fallback = None;
        for (code, &r) in &self.codes {
            if r != resource {
                continue;
            }
            if code.bytes().all(|b| b.is_ascii_digit()) {
                return Some(code.as_str());
            }
            fallback.get_or_insert(code.as_str());
        }
        fallback
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
