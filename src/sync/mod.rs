//! Bookmark list synchronization: subscription lifecycle, reload bookkeeping
//! and per-row delete state. Pure state; the component drives the I/O.

use crate::api::ChannelStatus;
use crate::models::{Bookmark, ChangeEvent};
use std::collections::BTreeSet;

pub(crate) const DELETE_FAILED_MESSAGE: &str = "Failed to delete bookmark. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SyncPhase {
    Idle,
    Subscribed { user_id: String },
    Unsubscribed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ChangeAction {
    Reload,
    Ignore,
}

/// Decides how the list reacts to a change event.
pub(crate) trait ChangeStrategy {
    fn on_change(&self, event: &ChangeEvent) -> ChangeAction;
}

/// Re-fetches the whole list for every event; no local diffing.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FullReload;

impl ChangeStrategy for FullReload {
    fn on_change(&self, _event: &ChangeEvent) -> ChangeAction {
        ChangeAction::Reload
    }
}

/// Identifies one issued reload; only the latest one may land.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ReloadTicket {
    pub request_id: u64,
    pub user_id: String,
}

#[derive(Clone, Debug)]
pub(crate) struct ListSync<S = FullReload> {
    phase: SyncPhase,
    rows: Vec<Bookmark>,
    deleting: BTreeSet<String>,
    loaded: bool,
    channel: Option<ChannelStatus>,
    request_id: u64,
    strategy: S,
}

impl Default for ListSync<FullReload> {
    fn default() -> Self {
        Self::new(FullReload)
    }
}

impl<S: ChangeStrategy> ListSync<S> {
    pub fn new(strategy: S) -> Self {
        Self {
            phase: SyncPhase::Idle,
            rows: Vec::new(),
            deleting: BTreeSet::new(),
            loaded: false,
            channel: None,
            request_id: 0,
            strategy,
        }
    }

    pub fn phase(&self) -> &SyncPhase {
        &self.phase
    }

    pub fn user_id(&self) -> Option<&str> {
        match &self.phase {
            SyncPhase::Subscribed { user_id } => Some(user_id),
            _ => None,
        }
    }

    pub fn rows(&self) -> &[Bookmark] {
        &self.rows
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn channel(&self) -> Option<ChannelStatus> {
        self.channel
    }

    pub fn is_deleting(&self, id: &str) -> bool {
        self.deleting.contains(id)
    }

    /// Enters `Subscribed` for a non-empty `user_id` and issues the initial load.
    /// The caller opens the change feed once this returns a ticket.
    pub fn subscribe(&mut self, user_id: &str) -> Option<ReloadTicket> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return None;
        }
        if self.user_id() == Some(user_id) {
            return None;
        }

        self.phase = SyncPhase::Subscribed {
            user_id: user_id.to_string(),
        };
        self.rows.clear();
        self.deleting.clear();
        self.loaded = false;
        self.channel = None;
        self.begin_reload()
    }

    /// Leaves `Subscribed`. Later events and reload responses are dropped.
    pub fn unsubscribe(&mut self) {
        if matches!(self.phase, SyncPhase::Subscribed { .. }) {
            self.phase = SyncPhase::Unsubscribed;
            self.channel = Some(ChannelStatus::Closed);
        }
    }

    pub fn begin_reload(&mut self) -> Option<ReloadTicket> {
        let user_id = self.user_id()?.to_string();
        self.request_id = self.request_id.saturating_add(1);
        Some(ReloadTicket {
            request_id: self.request_id,
            user_id,
        })
    }

    pub fn on_change(&mut self, event: &ChangeEvent) -> Option<ReloadTicket> {
        self.user_id()?;
        match self.strategy.on_change(event) {
            ChangeAction::Reload => self.begin_reload(),
            ChangeAction::Ignore => None,
        }
    }

    /// Status from the channel opened for `user_id`. Reports from a channel
    /// of an earlier subscription are ignored.
    pub fn on_channel_status(&mut self, user_id: &str, status: ChannelStatus) {
        if self.user_id() == Some(user_id) {
            self.channel = Some(status);
        }
    }

    /// Replaces the list with a fetched snapshot. Returns `false` when the
    /// ticket is stale or the list is no longer subscribed to its user.
    pub fn apply_reload(&mut self, ticket: &ReloadTicket, mut rows: Vec<Bookmark>) -> bool {
        if ticket.request_id != self.request_id || self.user_id() != Some(ticket.user_id.as_str())
        {
            return false;
        }

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.deleting.retain(|id| rows.iter().any(|r| &r.id == id));
        self.rows = rows;
        self.loaded = true;
        true
    }

    /// A failed reload still ends the loading state; rows are left as they were.
    pub fn reload_failed(&mut self, ticket: &ReloadTicket) {
        if ticket.request_id == self.request_id && self.user_id().is_some() {
            self.loaded = true;
        }
    }

    /// Marks a displayed row as deleting. `false` if unknown or already deleting.
    pub fn begin_delete(&mut self, id: &str) -> bool {
        if self.user_id().is_none() || !self.rows.iter().any(|r| r.id == id) {
            return false;
        }
        self.deleting.insert(id.to_string())
    }

    /// The row stays listed; removal is only ever observed through a reload.
    pub fn delete_failed(&mut self, id: &str) {
        self.deleting.remove(id);
    }
}
