//! Card storage backed by a single JSON file.
//!
//! The file is the source of truth; the repository reloads it before every operation.

mod repository;

pub use repository::*;

use std::path::Path;

use crate::errors::AppError;
use crate::models::{Card, Category};

/// The cards every fresh collection starts with.
pub fn seed_cards() -> Vec<Card> {
    vec![
        Card::new(1, "Tokimander", Category::Fire, "charmander.png", 100, 50),
        Card::new(2, "Tokiurtle", Category::Water, "squirtle.png", 100, 50),
        Card::new(3, "Tokisaur", Category::Grass, "bulbasaur.png", 100, 50),
    ]
}

/// Open the card store, writing the seed cards when the file is missing or `reset` is set.
pub async fn init_store(data_path: &Path, reset: bool) -> Result<Repository, AppError> {
    // Ensure the parent directory exists
    if let Some(parent) = data_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let exists = tokio::fs::try_exists(data_path).await?;
    if reset || !exists {
        tracing::info!(reset, exists, "Seeding card store at {:?}", data_path);
        Repository::create(data_path, seed_cards()).await
    } else {
        Repository::open(data_path).await
    }
}
