//! Text formats for board data.
//!
//! A layout is one space per line, in board order:
//!
//! ```text
//! # comment
//! start
//! terrain 1:1
//! tax 1
//! railroad 1
//! ```
//!
//! A terrain table has one row per terrain:
//!
//! ```text
//! 1:1 brown 60 2 10 30 90 160 250 50
//! ```
//!
//! columns being reference, color, price, six rents (bare, one to four
//! houses, hotel) and the house price. Blank lines and `#` comments are
//! ignored in both.

use std::collections::{BTreeMap, HashSet};

use crate::board::SpaceType;
use crate::error::LoadError;
use crate::rules::Money;

/// One parsed layout line. Group and ids are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceDescriptor {
    /// Start.
    Start,
    /// Jail.
    Jail,
    /// Free parking.
    FreeParking,
    /// Go to jail.
    GoToJail,
    /// Tax with its amount id.
    Tax {
        /// Tax id.
        id: u8,
    },
    /// Terrain by group and id.
    Terrain {
        /// Color group.
        group: u8,
        /// Id within the group.
        id: u8,
    },
    /// Railroad by id.
    Railroad {
        /// Railroad id.
        id: u8,
    },
    /// Company by id.
    Company {
        /// Company id.
        id: u8,
    },
    /// Chance.
    Chance,
    /// Community Chest.
    CommunityChest,
}

impl SpaceDescriptor {
    /// Type tag of the described space.
    #[must_use]
    pub const fn space_type(self) -> SpaceType {
        match self {
            Self::Start => SpaceType::Start,
            Self::Jail => SpaceType::Jail,
            Self::FreeParking => SpaceType::FreeParking,
            Self::GoToJail => SpaceType::GoToJail,
            Self::Tax { .. } => SpaceType::Tax,
            Self::Terrain { .. } => SpaceType::Terrain,
            Self::Railroad { .. } => SpaceType::Railroad,
            Self::Company { .. } => SpaceType::Company,
            Self::Chance => SpaceType::Chance,
            Self::CommunityChest => SpaceType::CommunityChest,
        }
    }
}

/// Economics of one terrain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainEconomics {
    /// Group color name.
    pub color: String,
    /// Purchase price.
    pub price: Money,
    /// Rent by improvement level.
    pub rents: [Money; 6],
    /// Price of a house or hotel.
    pub house_price: Money,
}

/// Terrain economics keyed by `(group, id)`.
pub type TerrainTable = BTreeMap<(u8, u8), TerrainEconomics>;

/// Lines that carry content, with their 1-based line numbers.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
}

/// Parse a positive 1-based number.
fn parse_ordinal(text: &str, line: usize) -> Result<u8, LoadError> {
    match text.parse::<u8>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(LoadError::MalformedReference {
            line,
            text: text.to_string(),
        }),
    }
}

/// Parse a `group:id` pair.
fn parse_pair(text: &str, line: usize) -> Result<(u8, u8), LoadError> {
    let (group, id) = text.split_once(':').ok_or_else(|| LoadError::MalformedReference {
        line,
        text: text.to_string(),
    })?;
    Ok((parse_ordinal(group, line)?, parse_ordinal(id, line)?))
}

/// Parse a layout into descriptors, one per board position.
///
/// # Errors
///
/// Returns a [`LoadError`] for unknown space types, malformed or missing
/// references, and ownable references that appear twice.
pub fn parse_layout(text: &str) -> Result<Vec<SpaceDescriptor>, LoadError> {
    let mut spaces = Vec::new();
    let mut seen = HashSet::new();

    for (line, content) in content_lines(text) {
        let mut parts = content.split_whitespace();
        let token = parts.next().unwrap_or_default();
        let arg = parts.next();

        let kind = SpaceType::from_token(token).ok_or_else(|| LoadError::UnknownSpaceType {
            line,
            kind: token.to_string(),
        })?;

        let needs_arg = matches!(
            kind,
            SpaceType::Tax | SpaceType::Terrain | SpaceType::Railroad | SpaceType::Company
        );
        let arg = match (needs_arg, arg) {
            (true, Some(a)) => a,
            (true, None) => {
                return Err(LoadError::MalformedReference {
                    line,
                    text: content.to_string(),
                });
            }
            (false, _) => "",
        };

        let descriptor = match kind {
            SpaceType::Start => SpaceDescriptor::Start,
            SpaceType::Jail => SpaceDescriptor::Jail,
            SpaceType::FreeParking => SpaceDescriptor::FreeParking,
            SpaceType::GoToJail => SpaceDescriptor::GoToJail,
            SpaceType::Chance => SpaceDescriptor::Chance,
            SpaceType::CommunityChest => SpaceDescriptor::CommunityChest,
            SpaceType::Tax => SpaceDescriptor::Tax {
                id: parse_ordinal(arg, line)?,
            },
            SpaceType::Terrain => {
                let (group, id) = parse_pair(arg, line)?;
                SpaceDescriptor::Terrain { group, id }
            }
            SpaceType::Railroad => SpaceDescriptor::Railroad {
                id: parse_ordinal(arg, line)?,
            },
            SpaceType::Company => SpaceDescriptor::Company {
                id: parse_ordinal(arg, line)?,
            },
        };

        if kind.is_ownable() && !seen.insert(descriptor) {
            return Err(LoadError::DuplicateReference {
                line,
                text: content.to_string(),
            });
        }

        spaces.push(descriptor);
    }

    Ok(spaces)
}

/// Parse a terrain economics table.
///
/// # Errors
///
/// Returns [`LoadError::MalformedTerrainRow`] for rows with the wrong
/// column count or non-numeric amounts, and
/// [`LoadError::MalformedReference`] for a bad `group:id`.
pub fn parse_terrains(text: &str) -> Result<TerrainTable, LoadError> {
    let mut table = TerrainTable::new();

    for (line, content) in content_lines(text) {
        let columns: Vec<&str> = content.split_whitespace().collect();
        let [reference, color, price, r0, r1, r2, r3, r4, r5, house] = *columns.as_slice() else {
            return Err(LoadError::MalformedTerrainRow { line });
        };

        let key = parse_pair(reference, line)?;
        let amount = |text: &str| {
            text.parse::<Money>()
                .map_err(|_| LoadError::MalformedTerrainRow { line })
        };

        table.insert(
            key,
            TerrainEconomics {
                color: color.to_string(),
                price: amount(price)?,
                rents: [
                    amount(r0)?,
                    amount(r1)?,
                    amount(r2)?,
                    amount(r3)?,
                    amount(r4)?,
                    amount(r5)?,
                ],
                house_price: amount(house)?,
            },
        );
    }

    Ok(table)
}
