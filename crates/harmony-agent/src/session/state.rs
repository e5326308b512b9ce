//! Conversation state: ordered message history plus the simulated
//! marketplace and spending ledger. Mutation and query only; turn logic
//! lives in `turn.rs`.

use crate::market::{Marketplace, SpendingLedger};
use crate::{Message, Role};

/// Everything one session owns. Never shared across sessions.
#[derive(Debug)]
pub struct ConversationState {
    messages: Vec<Message>,
    marketplace: Marketplace,
    ledger: SpendingLedger,
}

impl ConversationState {
    pub fn new(marketplace: Marketplace, ledger: SpendingLedger) -> Self {
        Self {
            messages: Vec::new(),
            marketplace,
            ledger,
        }
    }

    /// State seeded with the demo catalog and spending history.
    pub fn demo() -> Self {
        Self::new(Marketplace::demo(), SpendingLedger::seeded())
    }

    /// Append a message. Messages are immutable once appended and are
    /// never reordered or deduplicated.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    /// Full history in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn marketplace(&self) -> &Marketplace {
        &self.marketplace
    }

    pub fn ledger(&self) -> &SpendingLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut SpendingLedger {
        &mut self.ledger
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(
            Marketplace::new(Vec::new()).expect("empty catalog is valid"),
            SpendingLedger::new(),
        )
    }
}
