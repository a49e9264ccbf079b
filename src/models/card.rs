//! Card model and the request bodies that create or patch it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Image used when a card has no picture of its own.
pub const PLACEHOLDER_IMAGE: &str = "unown.png";

/// Element type classifying a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Fire,
    Water,
    Electric,
    Ice,
    Flying,
    Rock,
    Grass,
    Dragon,
    Fairy,
    Ghost,
    Psychic,
    Normal,
    Fighting,
    Steel,
    Ground,
    Bug,
}

impl Category {
    pub const ALL: [Category; 16] = [
        Category::Fire,
        Category::Water,
        Category::Electric,
        Category::Ice,
        Category::Flying,
        Category::Rock,
        Category::Grass,
        Category::Dragon,
        Category::Fairy,
        Category::Ghost,
        Category::Psychic,
        Category::Normal,
        Category::Fighting,
        Category::Steel,
        Category::Ground,
        Category::Bug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fire => "FIRE",
            Category::Water => "WATER",
            Category::Electric => "ELECTRIC",
            Category::Ice => "ICE",
            Category::Flying => "FLYING",
            Category::Rock => "ROCK",
            Category::Grass => "GRASS",
            Category::Dragon => "DRAGON",
            Category::Fairy => "FAIRY",
            Category::Ghost => "GHOST",
            Category::Psychic => "PSYCHIC",
            Category::Normal => "NORMAL",
            Category::Fighting => "FIGHTING",
            Category::Steel => "STEEL",
            Category::Ground => "GROUND",
            Category::Bug => "BUG",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    /// Case-insensitive: the input is upper-cased before matching.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_uppercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| AppError::InvalidCategory(s.to_string()))
    }
}

/// One card in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(alias = "tid")]
    pub id: u64,
    pub name: String,
    #[serde(alias = "elementType")]
    pub category: Category,
    #[serde(alias = "imageName")]
    pub image_reference: String,
    #[serde(alias = "healthPoints")]
    pub health: i32,
    #[serde(alias = "attackPoints")]
    pub attack: i32,
}

impl Card {
    pub fn new(
        id: u64,
        name: impl Into<String>,
        category: Category,
        image_reference: impl Into<String>,
        health: i32,
        attack: i32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            image_reference: image_reference.into(),
            health,
            attack,
        }
    }

    /// Merge a patch into this card.
    ///
    /// Zero ids and stats and missing strings leave the current value alone.
    /// A missing image is the exception: it resets to [`PLACEHOLDER_IMAGE`].
    pub fn apply_patch(&mut self, patch: &CardPatch) {
        if patch.id != 0 {
            self.id = patch.id;
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        self.image_reference = patch
            .image_reference
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
        if patch.health != 0 {
            self.health = patch.health;
        }
        if patch.attack != 0 {
            self.attack = patch.attack;
        }
    }
}

/// Request body for creating a card. Any client-supplied id is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCardRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "elementType")]
    pub category: Option<String>,
    #[serde(default, alias = "imageName")]
    pub image_reference: Option<String>,
    #[serde(default, alias = "healthPoints")]
    pub health: i32,
    #[serde(default, alias = "attackPoints")]
    pub attack: i32,
}

impl CreateCardRequest {
    /// Parse the requested category. A missing category is as bad as an unknown one.
    pub fn category(&self) -> Result<Category, AppError> {
        match &self.category {
            Some(raw) => raw.parse(),
            None => Err(AppError::InvalidCategory("<missing>".to_string())),
        }
    }

    pub fn into_card(self, id: u64, category: Category) -> Card {
        Card {
            id,
            name: self.name.unwrap_or_default(),
            category,
            image_reference: self
                .image_reference
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            health: self.health,
            attack: self.attack,
        }
    }
}

/// Request body for patching a card, before category validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCardRequest {
    #[serde(default, alias = "tid")]
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "elementType")]
    pub category: Option<String>,
    #[serde(default, alias = "imageName")]
    pub image_reference: Option<String>,
    #[serde(default, alias = "healthPoints")]
    pub health: i32,
    #[serde(default, alias = "attackPoints")]
    pub attack: i32,
}

impl UpdateCardRequest {
    pub fn into_patch(self) -> Result<CardPatch, AppError> {
        let category = self.category.as_deref().map(str::parse).transpose()?;
        Ok(CardPatch {
            id: self.id,
            name: self.name,
            category,
            image_reference: self.image_reference,
            health: self.health,
            attack: self.attack,
        })
    }
}

/// A validated partial update. See [`Card::apply_patch`] for the merge rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPatch {
    pub id: u64,
    pub name: Option<String>,
    pub category: Option<Category>,
    pub image_reference: Option<String>,
    pub health: i32,
    pub attack: i32,
}
