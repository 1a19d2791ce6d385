//! Spaces and the ownable deeds layered onto some of them.

use serde::{Deserialize, Serialize};

use crate::game::AgentId;
use crate::rules::Money;

/// Type tag of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceType {
    /// Start: salary is paid when passing it.
    Start,
    /// Jail, or just visiting.
    Jail,
    /// Free parking.
    FreeParking,
    /// Sends the agent to jail.
    GoToJail,
    /// Charges a fixed tax.
    Tax,
    /// Improvable property in a color group.
    Terrain,
    /// Railroad.
    Railroad,
    /// Utility company.
    Company,
    /// Draws a Chance card.
    Chance,
    /// Draws a Community Chest card.
    CommunityChest,
}

impl SpaceType {
    /// Token used for this type in layout files.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Jail => "jail",
            Self::FreeParking => "free_parking",
            Self::GoToJail => "go_to_jail",
            Self::Tax => "tax",
            Self::Terrain => "terrain",
            Self::Railroad => "railroad",
            Self::Company => "company",
            Self::Chance => "chance",
            Self::CommunityChest => "community_chest",
        }
    }

    /// Parse a layout token. `go` and `go_jail` are accepted as aliases.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "start" | "go" => Self::Start,
            "jail" => Self::Jail,
            "free_parking" => Self::FreeParking,
            "go_to_jail" | "go_jail" => Self::GoToJail,
            "tax" => Self::Tax,
            "terrain" => Self::Terrain,
            "railroad" => Self::Railroad,
            "company" => Self::Company,
            "chance" => Self::Chance,
            "community_chest" => Self::CommunityChest,
            _ => return None,
        })
    }

    /// Whether spaces of this type can be bought.
    #[must_use]
    pub const fn is_ownable(self) -> bool {
        matches!(self, Self::Terrain | Self::Railroad | Self::Company)
    }
}

/// Ownership state shared by every ownable space.
///
/// The owner is only a back-reference by id: agents hold the list of what
/// they own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deed {
    /// Purchase price.
    pub price: Money,
    /// Current owner, if any.
    pub owner: Option<AgentId>,
    /// Mortgaged spaces charge no rent.
    pub mortgaged: bool,
}

impl Deed {
    /// An unowned, unmortgaged deed.
    #[must_use]
    pub const fn new(price: Money) -> Self {
        Self {
            price,
            owner: None,
            mortgaged: false,
        }
    }

    /// True if nobody owns the space.
    #[must_use]
    pub const fn is_for_sale(&self) -> bool {
        self.owner.is_none()
    }

    /// True if `agent` owns the space.
    #[must_use]
    pub fn is_owned_by(&self, agent: AgentId) -> bool {
        self.owner == Some(agent)
    }
}

/// A terrain in a color group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Terrain {
    /// Ownership state.
    pub deed: Deed,
    /// Color group (1-based).
    pub group: u8,
    /// Id within the group (1-based).
    pub id: u8,
    /// Group color name.
    pub color: String,
    /// Rent by improvement level: bare, 1..=4 houses, hotel.
    pub rents: [Money; 6],
    /// Price of one house; a hotel costs the same.
    pub house_price: Money,
    /// Houses built (0 when a hotel stands).
    pub houses: u8,
    /// Hotels built (0 or 1).
    pub hotels: u8,
}

impl Terrain {
    /// Rent before any card multiplier.
    ///
    /// A hotel charges the top rate whatever the house count says. A bare
    /// terrain charges double when its owner holds the whole group.
    #[must_use]
    pub fn base_rent(&self, owner_has_group: bool) -> Money {
        if self.hotels > 0 {
            self.rents[5]
        } else if self.houses > 0 {
            self.rents[usize::from(self.houses).min(4)]
        } else if owner_has_group {
            2 * self.rents[0]
        } else {
            self.rents[0]
        }
    }

    /// True if any house or hotel stands here.
    #[must_use]
    pub const fn is_improved(&self) -> bool {
        self.houses > 0 || self.hotels > 0
    }

    /// Money sunk into buildings: a hotel stands on four traded-in houses.
    #[must_use]
    pub fn improvement_value(&self) -> Money {
        (Money::from(self.houses) + 5 * Money::from(self.hotels)) * self.house_price
    }
}

/// A railroad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Railroad {
    /// Ownership state.
    pub deed: Deed,
    /// Railroad id (1-based).
    pub id: u8,
}

/// A utility company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Company {
    /// Ownership state.
    pub deed: Deed,
    /// Company id (1-based).
    pub id: u8,
}

/// Type-specific data of a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum SpaceKind {
    /// Start.
    Start,
    /// Jail.
    Jail,
    /// Free parking.
    FreeParking,
    /// Go to jail.
    GoToJail,
    /// Tax.
    Tax {
        /// Tax id (1-based).
        id: u8,
        /// Amount charged.
        amount: Money,
    },
    /// Terrain.
    Terrain(Terrain),
    /// Railroad.
    Railroad(Railroad),
    /// Company.
    Company(Company),
    /// Chance.
    Chance,
    /// Community Chest.
    CommunityChest,
}

/// One position on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Space {
    /// Board position.
    pub position: usize,
    /// Type-specific data.
    pub kind: SpaceKind,
}

impl Space {
    /// Type tag.
    #[must_use]
    pub const fn space_type(&self) -> SpaceType {
        match &self.kind {
            SpaceKind::Start => SpaceType::Start,
            SpaceKind::Jail => SpaceType::Jail,
            SpaceKind::FreeParking => SpaceType::FreeParking,
            SpaceKind::GoToJail => SpaceType::GoToJail,
            SpaceKind::Tax { .. } => SpaceType::Tax,
            SpaceKind::Terrain(_) => SpaceType::Terrain,
            SpaceKind::Railroad(_) => SpaceType::Railroad,
            SpaceKind::Company(_) => SpaceType::Company,
            SpaceKind::Chance => SpaceType::Chance,
            SpaceKind::CommunityChest => SpaceType::CommunityChest,
        }
    }

    /// Ownership state, for ownable spaces.
    #[must_use]
    pub const fn deed(&self) -> Option<&Deed> {
        match &self.kind {
            SpaceKind::Terrain(t) => Some(&t.deed),
            SpaceKind::Railroad(r) => Some(&r.deed),
            SpaceKind::Company(c) => Some(&c.deed),
            _ => None,
        }
    }

    /// Mutable ownership state, for ownable spaces.
    pub fn deed_mut(&mut self) -> Option<&mut Deed> {
        match &mut self.kind {
            SpaceKind::Terrain(t) => Some(&mut t.deed),
            SpaceKind::Railroad(r) => Some(&mut r.deed),
            SpaceKind::Company(c) => Some(&mut c.deed),
            _ => None,
        }
    }

    /// Terrain data, for terrains.
    #[must_use]
    pub const fn terrain(&self) -> Option<&Terrain> {
        match &self.kind {
            SpaceKind::Terrain(t) => Some(t),
            _ => None,
        }
    }

    /// Mutable terrain data, for terrains.
    pub fn terrain_mut(&mut self) -> Option<&mut Terrain> {
        match &mut self.kind {
            SpaceKind::Terrain(t) => Some(t),
            _ => None,
        }
    }

    /// True if the space can be bought right now.
    #[must_use]
    pub fn is_for_sale(&self) -> bool {
        self.deed().is_some_and(Deed::is_for_sale)
    }

    /// Owner id, for owned spaces.
    #[must_use]
    pub fn owner(&self) -> Option<AgentId> {
        self.deed().and_then(|d| d.owner)
    }
}
