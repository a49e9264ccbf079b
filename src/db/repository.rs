//! Card repository over the JSON backing file.
//!
//! Every operation holds the store lock across its reload, mutate and rewrite
//! steps, so overlapping requests cannot lose each other's writes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::models::{Card, CardPatch};

/// First id handed out once the three seed cards exist.
pub const FIRST_ASSIGNED_ID: u64 = 4;

#[derive(Debug, Default)]
struct StoreState {
    cards: Vec<Card>,
    /// Running count kept alongside add/delete; reset from the list on reload
    total: usize,
}

/// Repository for all card operations.
#[derive(Debug)]
pub struct Repository {
    path: PathBuf,
    state: Mutex<StoreState>,
    next_id: AtomicU64,
}

impl Repository {
    /// Open a store over `path`. A missing file is an empty collection.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let cards = read_cards(&path).await?.unwrap_or_default();
        let next_id = next_id_after(&cards);

        tracing::debug!(cards = cards.len(), next_id, "Opened card store {:?}", path);

        Ok(Self {
            path,
            state: Mutex::new(StoreState {
                total: cards.len(),
                cards,
            }),
            next_id: AtomicU64::new(next_id),
        })
    }

    /// Create a store over `path`, replacing whatever the file held with `cards`.
    pub async fn create(path: impl Into<PathBuf>, cards: Vec<Card>) -> Result<Self, AppError> {
        let path = path.into();
        write_cards(&path, &cards).await?;
        Self::open(path).await
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reserve the next card id.
    pub fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of cards as tracked by the running counter.
    pub async fn total(&self) -> usize {
        self.state.lock().await.total
    }

    /// List all cards in file order.
    pub async fn list_cards(&self) -> Result<Vec<Card>, AppError> {
        let mut state = self.state.lock().await;
        self.reload(&mut state).await?;
        Ok(state.cards.clone())
    }

    /// Get the first card with the given id.
    pub async fn get_card(&self, id: u64) -> Result<Card, AppError> {
        let mut state = self.state.lock().await;
        self.reload(&mut state).await?;

        state
            .cards
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Append a card whose id was already assigned. Duplicate ids are not checked.
    pub async fn add_card(&self, card: Card) -> Result<Card, AppError> {
        let mut state = self.state.lock().await;
        self.reload(&mut state).await?;

        let after = step_past(card.id)?;
        self.next_id.fetch_max(after, Ordering::SeqCst);
        state.cards.push(card.clone());
        state.total += 1;
        self.persist(&state).await?;

        tracing::debug!(id = card.id, total = state.total, "Card added");
        Ok(card)
    }

    /// Patch the card with the given id and return the merged card.
    pub async fn update_card(&self, id: u64, patch: &CardPatch) -> Result<Card, AppError> {
        let mut state = self.state.lock().await;
        self.reload(&mut state).await?;

        let index = state
            .cards
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| not_found(id))?;

        if patch.id != 0 && patch.id != id && state.cards.iter().any(|c| c.id == patch.id) {
            return Err(AppError::Conflict(format!(
                "Cannot move card {} to id {}: id already in use",
                id, patch.id
            )));
        }

        let after = if patch.id != 0 { step_past(patch.id)? } else { 0 };

        let card = &mut state.cards[index];
        card.apply_patch(patch);
        let updated = card.clone();

        self.next_id.fetch_max(after, Ordering::SeqCst);
        self.persist(&state).await?;

        tracing::debug!(id, new_id = updated.id, "Card updated");
        Ok(updated)
    }

    /// Remove the first card with the given id. Returns whether a card was removed.
    pub async fn delete_card(&self, id: u64) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;
        self.reload(&mut state).await?;

        let Some(index) = state.cards.iter().position(|c| c.id == id) else {
            return Ok(false);
        };

        state.cards.remove(index);
        state.total = state.total.saturating_sub(1);
        self.persist(&state).await?;

        tracing::debug!(id, total = state.total, "Card deleted");
        Ok(true)
    }

    /// Replace the in-memory list with the file contents, if the file exists.
    async fn reload(&self, state: &mut StoreState) -> Result<(), AppError> {
        if let Some(cards) = read_cards(&self.path).await? {
            self.next_id.fetch_max(next_id_after(&cards), Ordering::SeqCst);
            state.total = cards.len();
            state.cards = cards;
        }
        Ok(())
    }

    async fn persist(&self, state: &StoreState) -> Result<(), AppError> {
        write_cards(&self.path, &state.cards).await
    }
}

fn not_found(id: u64) -> AppError {
    AppError::NotFound(format!("Card {} not found", id))
}

/// The id after `id`, or an error when the counter cannot get past it.
fn step_past(id: u64) -> Result<u64, AppError> {
    id.checked_add(1)
        .ok_or_else(|| AppError::BadRequest(format!("Card id {} is out of range", id)))
}

fn next_id_after(cards: &[Card]) -> u64 {
    cards
        .iter()
        .map(|c| c.id.saturating_add(1))
        .max()
        .unwrap_or(0)
        .max(FIRST_ASSIGNED_ID)
}

async fn read_cards(path: &Path) -> Result<Option<Vec<Card>>, AppError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    tracing::trace!(bytes = bytes.len(), "Reloaded {:?}", path);
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Write the whole list to a temporary sibling, then rename it over `path`.
async fn write_cards(path: &Path, cards: &[Card]) -> Result<(), AppError> {
    let bytes = serde_json::to_vec_pretty(cards)?;
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("cards.json");
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;

    tracing::debug!(cards = cards.len(), "Rewrote {:?}", path);
    Ok(())
}
