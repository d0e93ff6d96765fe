//! crates/kalakriti_core/src/conversation.rs
//!
//! The transcript of a customer/assistant exchange about one product.

use std::fmt;

use crate::domain::ProductId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Ordered turns scoped to a single product. Starts empty with no product.
///
/// The transcript is unbounded; the whole of it is sent as model context.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    product_id: Option<ProductId>,
    turns: Vec<Turn>,
    selection: u64,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates the transcript with `product_id`. Switching to a different
    /// product discards every turn; re-selecting the current one does nothing.
    pub fn select_product(&mut self, product_id: &str) {
        if self.product_id.as_deref() != Some(product_id) {
            self.turns.clear();
            self.product_id = Some(product_id.to_string());
            self.selection += 1;
        }
    }

    /// Counts product switches. Equal values mean the transcript has not been
    /// reset in between, even if the same product was selected again.
    pub fn selection(&self) -> u64 {
        self.selection
    }

    pub fn append_turn(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(Turn {
            role,
            content: content.into(),
        });
    }

    pub fn product_id(&self) -> Option<&str> {
        self.product_id.as_deref()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
