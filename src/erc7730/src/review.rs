//! Hardware-wallet style review of a formatted transaction
//!
//! The device shows one screen at a time: first the intent, then each field.
//! The user pages through with next/prev (wrapping at both ends) and finally
//! approves or rejects. Signing itself happens elsewhere.

use crate::formatter::{FormattedField, FormattedTransaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Reviewing,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("Transaction was already {0:?}")]
    AlreadyDecided(ReviewState),
}

/// What the device screen shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen<'a> {
    Intent {
        intent: &'a str,
        function_name: &'a str,
    },
    Field(&'a FormattedField),
}

impl std::fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Screen::Intent {
                intent,
                function_name,
            } => write!(f, "> REVIEW TRANSACTION\n{intent}\n[{function_name}()]"),
            Screen::Field(field) => write!(f, "> {}\n{}", field.label, field.value),
        }
    }
}

/// Step-through review session over one transaction
#[derive(Debug, Clone)]
pub struct ReviewSession {
    transaction: FormattedTransaction,
    index: usize,
    state: ReviewState,
}

impl ReviewSession {
    pub fn new(transaction: FormattedTransaction) -> Self {
        Self {
            transaction,
            index: 0,
            state: ReviewState::Reviewing,
        }
    }

    pub fn transaction(&self) -> &FormattedTransaction {
        &self.transaction
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    /// Intent screen plus one per field
    pub fn screen_count(&self) -> usize {
        self.transaction.fields.len() + 1
    }

    /// 1-based `(current, total)` screen position
    pub fn position(&self) -> (usize, usize) {
        (self.index + 1, self.screen_count())
    }

    pub fn current(&self) -> Screen<'_> {
        self.screen(self.index)
            .unwrap_or_else(|| self.intent_screen())
    }

    pub fn screen(&self, index: usize) -> Option<Screen<'_>> {
        match index {
            0 => Some(self.intent_screen()),
            i => self.transaction.fields.get(i - 1).map(Screen::Field),
        }
    }

    /// Every screen in display order
    pub fn screens(&self) -> impl Iterator<Item = Screen<'_>> {
        (0..self.screen_count()).filter_map(|i| self.screen(i))
    }

    fn intent_screen(&self) -> Screen<'_> {
        Screen::Intent {
            intent: &self.transaction.intent,
            function_name: &self.transaction.function_name,
        }
    }

    pub fn next(&mut self) -> Result<Screen<'_>, ReviewError> {
        self.ensure_reviewing()?;
        self.index = (self.index + 1) % self.screen_count();
        Ok(self.current())
    }

    pub fn prev(&mut self) -> Result<Screen<'_>, ReviewError> {
        self.ensure_reviewing()?;
        self.index = self
            .index
            .checked_sub(1)
            .unwrap_or(self.screen_count() - 1);
        Ok(self.current())
    }

    pub fn approve(&mut self) -> Result<(), ReviewError> {
        self.decide(ReviewState::Approved)
    }

    pub fn reject(&mut self) -> Result<(), ReviewError> {
        self.decide(ReviewState::Rejected)
    }

    fn decide(&mut self, outcome: ReviewState) -> Result<(), ReviewError> {
        self.ensure_reviewing()?;
        self.state = outcome;
        Ok(())
    }

    fn ensure_reviewing(&self) -> Result<(), ReviewError> {
        match self.state {
            ReviewState::Reviewing => Ok(()),
            decided => Err(ReviewError::AlreadyDecided(decided)),
        }
    }
}
