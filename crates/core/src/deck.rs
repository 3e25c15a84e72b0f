use crate::{Card, RngState};
use serde::{Deserialize, Serialize};

/// Combat card piles. The top of the draw pile is the end of `draw`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Piles {
    pub draw: Vec<Card>,
    pub discard: Vec<Card>,
    #[serde(default)]
    pub exhaust: Vec<Card>,
}

impl Piles {
    pub fn from_deck(deck: &[Card], rng: &mut RngState) -> Self {
        let mut draw = deck.to_vec();
        rng.shuffle(&mut draw);
        Self {
            draw,
            discard: Vec::new(),
            exhaust: Vec::new(),
        }
    }

    /// Cards still reachable by drawing.
    pub fn drawable(&self) -> usize {
        self.draw.len() + self.discard.len()
    }

    /// Pops the top card, reshuffling the discard pile in when the draw pile is empty.
    pub fn draw_one(&mut self, rng: &mut RngState) -> Option<Card> {
        if self.draw.is_empty() {
            self.reshuffle_discard(rng);
        }
        self.draw.pop()
    }

    pub fn draw_cards(&mut self, count: usize, rng: &mut RngState) -> Vec<Card> {
        let mut cards = Vec::with_capacity(count);
        for _ in 0..count {
            match self.draw_one(rng) {
                Some(card) => cards.push(card),
                None => break,
            }
        }
        cards
    }

    pub fn discard(&mut self, mut cards: Vec<Card>) {
        self.discard.append(&mut cards);
    }

    pub fn reshuffle_discard(&mut self, rng: &mut RngState) {
        if self.discard.is_empty() {
            return;
        }
        self.draw.append(&mut self.discard);
        rng.shuffle(&mut self.draw);
    }

    pub fn insert_random(&mut self, card: Card, rng: &mut RngState) {
        let position = rng.index(self.draw.len() + 1).unwrap_or(0);
        self.draw.insert(position, card);
    }

    /// Moves the most recently discarded card onto the top of the draw pile.
    pub fn recycle_top_discard(&mut self) -> bool {
        match self.discard.pop() {
            Some(card) => {
                self.draw.push(card);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardKind, Rarity};

    fn card(id: &str) -> Card {
        Card {
            id: id.into(),
            name: id.into(),
            kind: CardKind::Skill,
            cost: 1,
            damage: None,
            block: Some(5),
            description: String::new(),
            rarity: Rarity::Common,
            exhaust: false,
            upgraded: false,
            status: None,
            special: None,
            uid: 0,
        }
    }

    #[test]
    fn draw_reshuffles_discard_once_empty() {
        let mut rng = RngState::from_seed(4);
        let mut piles = Piles {
            draw: vec![card("a"), card("b")],
            discard: vec![card("c"), card("d"), card("e")],
            exhaust: Vec::new(),
        };
        let drawn = piles.draw_cards(4, &mut rng);
        assert_eq!(drawn.len(), 4);
        assert_eq!(drawn[0].id, "b");
        assert_eq!(drawn[1].id, "a");
        assert!(piles.discard.is_empty());
        assert_eq!(piles.draw.len(), 1);
    }

    #[test]
    fn draw_stops_when_everything_is_in_hand() {
        let mut rng = RngState::from_seed(4);
        let mut piles = Piles {
            draw: vec![card("a")],
            discard: vec![card("b")],
            exhaust: vec![card("x")],
        };
        let drawn = piles.draw_cards(5, &mut rng);
        assert_eq!(drawn.len(), 2);
        assert_eq!(piles.drawable(), 0);
    }

    #[test]
    fn recycle_moves_last_discard_to_top() {
        let mut piles = Piles {
            draw: vec![card("a")],
            discard: vec![card("b"), card("c")],
            exhaust: Vec::new(),
        };
        assert!(piles.recycle_top_discard());
        assert_eq!(piles.draw.last().map(|c| c.id.as_str()), Some("c"));
        piles.discard.clear();
        assert!(!piles.recycle_top_discard());
    }
}
