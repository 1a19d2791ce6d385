//! Text tables for localizing messages.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::cards::DeckKind;
use crate::game::AgentId;
use crate::presenter::{Localizer, Message, Param};

const ENGLISH: &str = include_str!("../../assets/lang/english.json");

/// A language's text: space names, card texts and message templates.
///
/// Templates use `{name}` placeholders filled from [`Message::params`].
/// `{agent}` always names the agent the message concerns.
#[derive(Debug, Clone, Deserialize)]
pub struct TextTable {
    spaces: Vec<String>,
    chance: Vec<String>,
    community_chest: Vec<String>,
    agent: String,
    messages: BTreeMap<String, String>,
}

impl TextTable {
    /// The built-in English table.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the embedded table is malformed.
    pub fn english() -> Result<Self, serde_json::Error> {
        Self::from_json(ENGLISH)
    }

    /// Parse a table from JSON.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the text is not a valid table.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    fn format_param(&self, param: &Param) -> String {
        match param {
            Param::Number(n) => n.to_string(),
            Param::Space(p) => self.space_name(*p),
            Param::Agent(a) => self.agent_name(*a),
            Param::Card(deck, index) => self.card_text(*deck, *index),
            Param::Text(t) => t.clone(),
        }
    }
}

impl Localizer for TextTable {
    fn space_name(&self, position: usize) -> String {
        self.spaces
            .get(position)
            .cloned()
            .unwrap_or_else(|| format!("#{position}"))
    }

    fn card_text(&self, deck: DeckKind, index: usize) -> String {
        let texts = match deck {
            DeckKind::Chance => &self.chance,
            DeckKind::CommunityChest => &self.community_chest,
        };
        texts
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("{deck:?} #{index}"))
    }

    fn agent_name(&self, agent: AgentId) -> String {
        self.agent.replace("{id}", &agent.to_string())
    }

    fn render(&self, agent: AgentId, message: &Message) -> String {
        let Some(template) = self.messages.get(message.key()) else {
            return message.key().to_string();
        };
        let mut text = template.replace("{agent}", &self.agent_name(agent));
        for (name, param) in message.params() {
            text = text.replace(&format!("{{{name}}}"), &self.format_param(&param));
        }
        text
    }
}
