// Client-side copy of the user's collection. The backend owns the data; this
// store only keeps what the screen needs and is updated whenever a card is
// created, scanned, or the list is fetched.

use crate::api::CardApi;
use crate::error::ApiError;
use crate::models::{Card, CardCreate};
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct CardCollection {
    cards: Vec<Card>,
}

impl CardCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cards in the order the server returned them, newly added ones last.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Card> {
        self.cards.iter().find(|c| c.id() == id)
    }

    pub fn replace(&mut self, cards: Vec<Card>) {
        self.cards = cards;
    }

    /// Insert `card`, or overwrite the entry with the same id in place.
    pub fn upsert(&mut self, card: Card) -> &Card {
        let index = match self.cards.iter().position(|c| c.id() == card.id()) {
            Some(index) => {
                self.cards[index] = card;
                index
            }
            None => {
                self.cards.push(card);
                self.cards.len() - 1
            }
        };
        &self.cards[index]
    }

    /// Reload the whole list from the backend. Returns the new size.
    pub fn refresh<A: CardApi + ?Sized>(&mut self, api: &A) -> Result<usize, ApiError> {
        let cards = api.list_cards()?;
        debug!(count = cards.len(), "collection refreshed");
        self.replace(cards);
        Ok(self.len())
    }

    /// Create a card on the backend and keep the stored copy.
    pub fn add<A: CardApi + ?Sized>(&mut self, api: &A, card: &CardCreate) -> Result<&Card, ApiError> {
        let created = api.create_card(card)?;
        debug!(id = created.id(), "card created");
        Ok(self.upsert(created))
    }
}
