//! Example record type and selection strategies.

use crate::traversal::ScoreStrategy;
use crate::types::Record;
use serde::{Deserialize, Serialize};

/// A Pokémon with its battle stats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: String,
    pub attack: u32,
    pub defense: u32,
}

impl Pokemon {
    pub fn new(id: impl Into<String>, attack: u32, defense: u32) -> Self {
        Self {
            id: id.into(),
            attack,
            defense,
        }
    }

    /// Attack plus defense, widened so the sum cannot overflow.
    pub fn total(&self) -> u64 {
        u64::from(self.attack) + u64::from(self.defense)
    }
}

impl Record for Pokemon {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Highest attack wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByAttack;

impl ScoreStrategy<Pokemon> for ByAttack {
    fn score(&self, record: &Pokemon) -> f64 {
        record.attack as f64
    }
}

/// Highest defense wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByDefense;

impl ScoreStrategy<Pokemon> for ByDefense {
    fn score(&self, record: &Pokemon) -> f64 {
        record.defense as f64
    }
}

/// Highest attack plus defense wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByTotal;

impl ScoreStrategy<Pokemon> for ByTotal {
    fn score(&self, record: &Pokemon) -> f64 {
        record.total() as f64
    }
}
