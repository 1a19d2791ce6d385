//! Tunable rules and amounts.
//!
//! Everything numeric the engine charges or pays lives here so a variant
//! can be played from a JSON file without touching code. Missing fields
//! fall back to the reference values.

use serde::{Deserialize, Serialize};

/// Amount of money. Signed: funds may dip below zero before the
/// bankruptcy check.
pub type Money = i64;

/// What happens to a bankrupt agent's holdings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankruptcyPolicy {
    /// Holdings return to the bank unmortgaged and unimproved.
    #[default]
    ReturnToBank,
    /// Holdings stay with the dead agent and never charge rent again.
    Freeze,
}

/// Game rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Funds every agent starts with.
    pub starting_funds: Money,
    /// Paid when passing or landing on start.
    pub salary: Money,
    /// Price of leaving jail early.
    pub bail: Money,
    /// Failed escape attempts after which bail is forced.
    pub max_jail_turns: u8,
    /// Consecutive doubles that send an agent to jail.
    pub max_doubles: u8,
    /// Tax amounts indexed by tax id - 1.
    pub tax_amounts: Vec<Money>,
    /// Price of every railroad.
    pub railroad_price: Money,
    /// Railroad rent indexed by railroads owned - 1.
    pub railroad_rents: Vec<Money>,
    /// Price of every company.
    pub company_price: Money,
    /// Dice multiplier indexed by companies owned - 1.
    pub company_multipliers: Vec<Money>,
    /// Lifting a mortgage costs this percentage of the mortgage value.
    pub mortgage_lift_percent: Money,
    /// Houses a terrain holds before it can take a hotel.
    pub max_houses: u8,
    /// Whether moving backwards across start pays salary.
    pub salary_on_backward_wrap: bool,
    /// Fate of a bankrupt agent's holdings.
    pub bankruptcy: BankruptcyPolicy,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            starting_funds: 1500,
            salary: 200,
            bail: 50,
            max_jail_turns: 3,
            max_doubles: 3,
            tax_amounts: vec![200, 100],
            railroad_price: 200,
            railroad_rents: vec![25, 50, 100, 200],
            company_price: 150,
            company_multipliers: vec![2, 10],
            mortgage_lift_percent: 110,
            max_houses: 4,
            salary_on_backward_wrap: true,
            bankruptcy: BankruptcyPolicy::ReturnToBank,
        }
    }
}

impl Rules {
    /// Parse rules from JSON. Absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the text is not a valid rules object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Mortgage value of a space with this price.
    #[must_use]
    pub const fn mortgage_value(price: Money) -> Money {
        price / 2
    }

    /// Cost of lifting the mortgage on a space with this price.
    #[must_use]
    pub const fn lift_cost(&self, price: Money) -> Money {
        Self::mortgage_value(price) * self.mortgage_lift_percent / 100
    }
}
