//! The board: a fixed cycle of spaces.
//!
//! A [`Board`] is built once from parsed descriptors plus terrain economics
//! and rules. Its shape never changes afterwards; only ownership, mortgage
//! flags and improvements mutate during play.

mod layout;
mod loader;
mod space;

use std::collections::BTreeMap;

pub use layout::{SpaceDescriptor, TerrainEconomics, TerrainTable, parse_layout, parse_terrains};
pub use loader::{BoardLoader, BoardSource, BuiltinLoader, DEFAULT_LAYOUT, DirectoryLoader};
pub use space::{Company, Deed, Railroad, Space, SpaceKind, SpaceType, Terrain};

use crate::error::LoadError;
use crate::game::AgentId;
use crate::rules::{Money, Rules};

/// A cyclic board of spaces.
#[derive(Debug, Clone)]
pub struct Board {
    spaces: Vec<Space>,
    start: usize,
    jail: usize,
    /// Number of terrains in each color group.
    group_sizes: BTreeMap<u8, usize>,
}

impl Board {
    /// Build a board from descriptors, assigning positions in order.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if a terrain has no economics row, a tax,
    /// railroad or company id is outside the rules tables, or the layout
    /// does not hold exactly one start and one jail.
    pub fn build(
        layout: &[SpaceDescriptor],
        terrains: &TerrainTable,
        rules: &Rules,
    ) -> Result<Self, LoadError> {
        let mut spaces = Vec::with_capacity(layout.len());
        let mut start = None;
        let mut jail = None;
        let mut group_sizes = BTreeMap::new();

        for (position, descriptor) in layout.iter().copied().enumerate() {
            let kind = match descriptor {
                SpaceDescriptor::Start => {
                    if start.replace(position).is_some() {
                        return Err(LoadError::DuplicateSpace("start"));
                    }
                    SpaceKind::Start
                }
                SpaceDescriptor::Jail => {
                    if jail.replace(position).is_some() {
                        return Err(LoadError::DuplicateSpace("jail"));
                    }
                    SpaceKind::Jail
                }
                SpaceDescriptor::FreeParking => SpaceKind::FreeParking,
                SpaceDescriptor::GoToJail => SpaceKind::GoToJail,
                SpaceDescriptor::Chance => SpaceKind::Chance,
                SpaceDescriptor::CommunityChest => SpaceKind::CommunityChest,
                SpaceDescriptor::Tax { id } => {
                    let amount = usize::from(id)
                        .checked_sub(1)
                        .and_then(|i| rules.tax_amounts.get(i))
                        .copied()
                        .ok_or(LoadError::UnknownTax { id })?;
                    SpaceKind::Tax { id, amount }
                }
                SpaceDescriptor::Terrain { group, id } => {
                    let row = terrains
                        .get(&(group, id))
                        .ok_or(LoadError::MissingTerrainData { group, id })?;
                    *group_sizes.entry(group).or_insert(0) += 1;
                    SpaceKind::Terrain(Terrain {
                        deed: Deed::new(row.price),
                        group,
                        id,
                        color: row.color.clone(),
                        rents: row.rents,
                        house_price: row.house_price,
                        houses: 0,
                        hotels: 0,
                    })
                }
                SpaceDescriptor::Railroad { id } => {
                    if id == 0 || usize::from(id) > rules.railroad_rents.len() {
                        return Err(LoadError::UnknownRailroad { id });
                    }
                    SpaceKind::Railroad(Railroad {
                        deed: Deed::new(rules.railroad_price),
                        id,
                    })
                }
                SpaceDescriptor::Company { id } => {
                    if id == 0 || usize::from(id) > rules.company_multipliers.len() {
                        return Err(LoadError::UnknownCompany { id });
                    }
                    SpaceKind::Company(Company {
                        deed: Deed::new(rules.company_price),
                        id,
                    })
                }
            };
            spaces.push(Space { position, kind });
        }

        Ok(Self {
            spaces,
            start: start.ok_or(LoadError::MissingSpace("start"))?,
            jail: jail.ok_or(LoadError::MissingSpace("jail"))?,
            group_sizes,
        })
    }

    /// Load a named layout through a loader and build it.
    ///
    /// # Errors
    ///
    /// Returns any loader or build error.
    pub fn load(loader: &dyn BoardLoader, name: &str, rules: &Rules) -> Result<Self, LoadError> {
        let source = loader.load(name)?;
        Self::build(&source.layout, &source.terrains, rules)
    }

    /// Number of spaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    /// Always false: a built board has at least a start and a jail.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    /// Space at a position, wrapping around the cycle.
    #[must_use]
    pub fn space(&self, position: usize) -> &Space {
        &self.spaces[position % self.spaces.len()]
    }

    /// Mutable space at a position, wrapping around the cycle.
    pub fn space_mut(&mut self, position: usize) -> &mut Space {
        let len = self.spaces.len();
        &mut self.spaces[position % len]
    }

    /// Every space in board order.
    #[must_use]
    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    /// Position of the start space.
    #[must_use]
    pub const fn start_position(&self) -> usize {
        self.start
    }

    /// Position of the jail.
    #[must_use]
    pub const fn jail_position(&self) -> usize {
        self.jail
    }

    /// Position of a terrain by group and id.
    #[must_use]
    pub fn terrain_position(&self, group: u8, id: u8) -> Option<usize> {
        self.spaces
            .iter()
            .find(|s| s.terrain().is_some_and(|t| t.group == group && t.id == id))
            .map(|s| s.position)
    }

    /// Position of a railroad by id.
    #[must_use]
    pub fn railroad_position(&self, id: u8) -> Option<usize> {
        self.spaces
            .iter()
            .find(|s| matches!(&s.kind, SpaceKind::Railroad(r) if r.id == id))
            .map(|s| s.position)
    }

    /// Position of a company by id.
    #[must_use]
    pub fn company_position(&self, id: u8) -> Option<usize> {
        self.spaces
            .iter()
            .find(|s| matches!(&s.kind, SpaceKind::Company(c) if c.id == id))
            .map(|s| s.position)
    }

    /// Positions of every terrain in a color group.
    #[must_use]
    pub fn group_positions(&self, group: u8) -> Vec<usize> {
        self.spaces
            .iter()
            .filter(|s| s.terrain().is_some_and(|t| t.group == group))
            .map(|s| s.position)
            .collect()
    }

    /// Number of terrains in a color group, derived from the layout.
    #[must_use]
    pub fn group_size(&self, group: u8) -> usize {
        self.group_sizes.get(&group).copied().unwrap_or(0)
    }

    /// Color groups with their sizes.
    pub fn groups(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.group_sizes.iter().map(|(g, n)| (*g, *n))
    }

    /// Number of spaces of a type.
    #[must_use]
    pub fn count_type(&self, kind: SpaceType) -> usize {
        self.spaces.iter().filter(|s| s.space_type() == kind).count()
    }

    /// First space of a type strictly after `from`, scanning forward.
    ///
    /// The scan covers one full cycle, so `from` itself is found last.
    /// Returns `None` if the board has no space of that type.
    #[must_use]
    pub fn nearest(&self, from: usize, kind: SpaceType) -> Option<usize> {
        let len = self.spaces.len();
        (1..=len)
            .map(|step| (from + step) % len)
            .find(|p| self.spaces[*p].space_type() == kind)
    }

    /// Number of spaces of a type owned by an agent.
    #[must_use]
    pub fn count_owned(&self, owner: AgentId, kind: SpaceType) -> usize {
        self.spaces
            .iter()
            .filter(|s| s.space_type() == kind && s.owner() == Some(owner))
            .count()
    }

    /// True if the agent owns every terrain of a non-empty group.
    #[must_use]
    pub fn owns_group(&self, owner: AgentId, group: u8) -> bool {
        let owned = self
            .spaces
            .iter()
            .filter_map(Space::terrain)
            .filter(|t| t.group == group && t.deed.is_owned_by(owner))
            .count();
        owned > 0 && owned == self.group_size(group)
    }

    /// Houses and hotels standing on an agent's terrains.
    #[must_use]
    pub fn improvements_of(&self, owner: AgentId) -> (u32, u32) {
        self.spaces
            .iter()
            .filter_map(Space::terrain)
            .filter(|t| t.deed.is_owned_by(owner))
            .fold((0, 0), |(houses, hotels), t| {
                (houses + u32::from(t.houses), hotels + u32::from(t.hotels))
            })
    }

    /// Value of an agent's property: prices plus buildings, mortgaged
    /// spaces counting at their mortgage value.
    #[must_use]
    pub fn property_value(&self, owner: AgentId) -> Money {
        self.spaces
            .iter()
            .filter_map(|s| s.deed().filter(|d| d.is_owned_by(owner)).map(|d| (s, d)))
            .map(|(s, d)| {
                let price = if d.mortgaged {
                    Rules::mortgage_value(d.price)
                } else {
                    d.price
                };
                price + s.terrain().map_or(0, Terrain::improvement_value)
            })
            .sum()
    }

    /// Return every space an agent owns to the bank: unowned, unmortgaged
    /// and unimproved. Returns the released positions.
    pub fn release(&mut self, owner: AgentId) -> Vec<usize> {
        let mut released = Vec::new();
        for space in &mut self.spaces {
            let position = space.position;
            let Some(deed) = space.deed_mut() else {
                continue;
            };
            if !deed.is_owned_by(owner) {
                continue;
            }
            deed.owner = None;
            deed.mortgaged = false;
            if let Some(terrain) = space.terrain_mut() {
                terrain.houses = 0;
                terrain.hotels = 0;
            }
            released.push(position);
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usa() -> Board {
        Board::load(&BuiltinLoader, DEFAULT_LAYOUT, &Rules::default()).unwrap()
    }

    fn build(layout: &str) -> Result<Board, LoadError> {
        let table = parse_terrains(
            "1:1 red 60 2 10 30 90 160 250 50\n1:2 red 60 4 20 60 180 320 450 50\n",
        )?;
        Board::build(&parse_layout(layout)?, &table, &Rules::default())
    }

    #[test]
    fn test_usa_shape() {
        let board = usa();
        assert_eq!(board.len(), 40);
        assert_eq!(board.start_position(), 0);
        assert_eq!(board.jail_position(), 10);
        assert_eq!(board.count_type(SpaceType::Terrain), 22);
        assert_eq!(board.count_type(SpaceType::Railroad), 4);
        assert_eq!(board.count_type(SpaceType::Company), 2);
        let sizes: Vec<usize> = board.groups().map(|(_, n)| n).collect();
        assert_eq!(sizes, vec![2, 3, 3, 3, 3, 3, 3, 2]);
    }

    #[test]
    fn test_space_wraps() {
        let board = usa();
        for p in 0..40 {
            assert_eq!(board.space(p), board.space(p + 40));
            assert_eq!(board.space(p).position, p);
        }
    }

    #[test]
    fn test_lookups() {
        let board = usa();
        assert_eq!(board.terrain_position(8, 2), Some(39));
        assert_eq!(board.terrain_position(9, 1), None);
        assert_eq!(board.railroad_position(1), Some(5));
        assert_eq!(board.company_position(2), Some(28));
        assert_eq!(board.group_positions(2), vec![6, 8, 9]);
        assert!(matches!(board.space(4).kind, SpaceKind::Tax { amount: 200, .. }));
    }

    #[test]
    fn test_nearest_scans_forward_and_wraps() {
        let board = usa();
        assert_eq!(board.nearest(7, SpaceType::Railroad), Some(15));
        assert_eq!(board.nearest(36, SpaceType::Railroad), Some(5));
        assert_eq!(board.nearest(22, SpaceType::Company), Some(28));
        assert_eq!(board.nearest(5, SpaceType::Start), Some(0));
        // Only one jail: a scan from it comes all the way round.
        assert_eq!(board.nearest(10, SpaceType::Jail), Some(10));
    }

    #[test]
    fn test_nearest_missing_type_terminates() {
        let board = build("start\njail\nterrain 1:1\n").unwrap();
        assert_eq!(board.nearest(0, SpaceType::Railroad), None);
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(build("jail\n"), Err(LoadError::MissingSpace("start"))));
        assert!(matches!(build("start\n"), Err(LoadError::MissingSpace("jail"))));
        assert!(matches!(
            build("start\njail\njail\n"),
            Err(LoadError::DuplicateSpace("jail"))
        ));
        assert!(matches!(
            build("start\njail\nterrain 2:1\n"),
            Err(LoadError::MissingTerrainData { group: 2, id: 1 })
        ));
        assert!(matches!(build("start\njail\ntax 3\n"), Err(LoadError::UnknownTax { id: 3 })));
        assert!(matches!(
            build("start\njail\nrailroad 5\n"),
            Err(LoadError::UnknownRailroad { id: 5 })
        ));
        assert!(matches!(
            build("start\njail\ncompany 3\n"),
            Err(LoadError::UnknownCompany { id: 3 })
        ));
    }

    #[test]
    fn test_ownership_queries_and_release() {
        let mut board = build("start\nterrain 1:1\njail\nterrain 1:2\nrailroad 1\n").unwrap();
        board.space_mut(1).deed_mut().unwrap().owner = Some(1);
        assert!(!board.owns_group(1, 1));

        board.space_mut(3).deed_mut().unwrap().owner = Some(1);
        board.space_mut(3).terrain_mut().unwrap().houses = 2;
        board.space_mut(4).deed_mut().unwrap().owner = Some(1);
        board.space_mut(4).deed_mut().unwrap().mortgaged = true;
        assert!(board.owns_group(1, 1));
        assert!(!board.owns_group(2, 1));
        assert_eq!(board.count_owned(1, SpaceType::Railroad), 1);
        assert_eq!(board.improvements_of(1), (2, 0));
        // 60 + 60 + 2 houses at 50 + railroad at half price.
        assert_eq!(board.property_value(1), 60 + 60 + 100 + 100);

        assert_eq!(board.release(1), vec![1, 3, 4]);
        assert_eq!(board.space(3).owner(), None);
        assert_eq!(board.space(3).terrain().unwrap().houses, 0);
        assert!(!board.space(4).deed().unwrap().mortgaged);
        assert_eq!(board.property_value(1), 0);
    }
}
