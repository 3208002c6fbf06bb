//! Per-image download slots.
//!
//! Every displayed image owns a slot holding a [`DownloadState`]. The board
//! admits a single active download at a time through its `active` index; all
//! other slots report `disabled` while it is held. Each generation batch gets
//! a fresh epoch so late completions and delayed resets from a previous batch
//! cannot touch the new slots.

use crate::error::{GenPixError, Result};
use crate::models::{DownloadSlot, DownloadState};

/// Identifies one started download. Every follow-up action carries it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadToken {
    pub index: usize,
    pub epoch: u64,
    pub ticket: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    Begin { index: usize },
    Complete(DownloadToken),
    Fail(DownloadToken),
    Reset(DownloadToken),
    Reinitialize { count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    Started(DownloadToken),
    Applied,
    /// The action referred to a superseded download and changed nothing.
    Stale,
}

#[derive(Debug, Clone)]
pub struct SlotBoard {
    states: Vec<DownloadState>,
    tickets: Vec<u64>,
    active: Option<usize>,
    epoch: u64,
    next_ticket: u64,
}

impl SlotBoard {
    pub fn new(count: usize) -> Self {
        Self {
            states: vec![DownloadState::Idle; count],
            tickets: vec![0; count],
            active: None,
            epoch: 0,
            next_ticket: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn state(&self, index: usize) -> Option<DownloadState> {
        self.states.get(index).copied()
    }

    pub fn slot(&self, index: usize) -> Option<DownloadSlot> {
        let state = self.state(index)?;
        Some(DownloadSlot {
            loading: state == DownloadState::Loading,
            downloaded: state == DownloadState::Downloaded,
            disabled: self.active.map_or(false, |active| active != index),
        })
    }

    pub fn slots(&self) -> Vec<DownloadSlot> {
        (0..self.len()).filter_map(|i| self.slot(i)).collect()
    }

    /// True while a download is in flight.
    pub fn is_fetching(&self) -> bool {
        self.active.is_some()
    }

    /// True while some slot shows its transient "downloaded" state.
    pub fn is_fetched(&self) -> bool {
        self.states.contains(&DownloadState::Downloaded)
    }

    pub fn begin(&mut self, index: usize) -> Result<DownloadToken> {
        match self.apply(SlotAction::Begin { index })? {
            SlotOutcome::Started(token) => Ok(token),
            other => Err(GenPixError::InternalError(format!(
                "Unexpected outcome for begin: {:?}",
                other
            ))),
        }
    }

    pub fn apply(&mut self, action: SlotAction) -> Result<SlotOutcome> {
        match action {
            SlotAction::Begin { index } => {
                if index >= self.len() {
                    return Err(GenPixError::InvalidResource(format!(
                        "No download slot at index {}",
                        index
                    )));
                }
                if let Some(active) = self.active {
                    return Err(GenPixError::DownloadBusy(active));
                }

                let token = DownloadToken {
                    index,
                    epoch: self.epoch,
                    ticket: self.next_ticket,
                };
                self.next_ticket += 1;
                self.tickets[index] = token.ticket;
                self.states[index] = DownloadState::Loading;
                self.active = Some(index);
                Ok(SlotOutcome::Started(token))
            }
            SlotAction::Complete(token) | SlotAction::Fail(token) => {
                if !self.holds(&token) || self.active != Some(token.index) {
                    return Ok(SlotOutcome::Stale);
                }
                self.states[token.index] = if matches!(action, SlotAction::Complete(_)) {
                    DownloadState::Downloaded
                } else {
                    DownloadState::Idle
                };
                self.active = None;
                Ok(SlotOutcome::Applied)
            }
            SlotAction::Reset(token) => {
                if !self.holds(&token) {
                    return Ok(SlotOutcome::Stale);
                }
                self.states[token.index] = DownloadState::Idle;
                if self.active == Some(token.index) {
                    self.active = None;
                }
                Ok(SlotOutcome::Applied)
            }
            SlotAction::Reinitialize { count } => {
                self.states = vec![DownloadState::Idle; count];
                self.tickets = vec![0; count];
                self.active = None;
                self.epoch += 1;
                Ok(SlotOutcome::Applied)
            }
        }
    }

    // Token belongs to the current epoch and is the latest download of its slot.
    fn holds(&self, token: &DownloadToken) -> bool {
        token.epoch == self.epoch && self.tickets.get(token.index) == Some(&token.ticket)
    }
}

impl Default for SlotBoard {
    fn default() -> Self {
        Self::new(5)
    }
}
