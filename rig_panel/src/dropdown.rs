//! Open/closed presentation of the camera selector.
//!
//! Opening is two-phase: the container expands at once, the entries appear
//! after the reveal delay. Only one reveal is ever pending; any later
//! transition replaces or drops it, so a stale reveal cannot show the entries
//! of a dropdown that has since closed.

use crate::render::UiUpdate;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

pub const ENTRY_HEIGHT_PX: u32 = 35;
pub const ENTRY_MARGIN_PX: u32 = 10;
pub const PADDING_PX: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropdownState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DropdownLayout {
    pub height_px: u32,
    pub padding_px: u32,
    pub icon_rotation_deg: u16,
}

impl DropdownLayout {
    pub fn expanded(camera_count: usize) -> Self {
        let count = u32::try_from(camera_count).unwrap_or(u32::MAX);
        let per_entry = ENTRY_HEIGHT_PX + 2 * ENTRY_MARGIN_PX;
        Self {
            height_px: count
                .saturating_mul(per_entry)
                .saturating_add(2 * PADDING_PX),
            padding_px: PADDING_PX,
            icon_rotation_deg: 180,
        }
    }

    pub fn collapsed() -> Self {
        Self {
            height_px: 0,
            padding_px: 0,
            icon_rotation_deg: 0,
        }
    }
}

#[derive(Debug)]
pub struct Dropdown {
    state: DropdownState,
    reveal_delay: Duration,
    pending_reveal: Option<Instant>,
}

impl Dropdown {
    /// Starts in the pre-layout `Open` state; the first [`Dropdown::toggle`]
    /// lands on `Closed` and emits the initial layout.
    pub fn new(reveal_delay: Duration) -> Self {
        Self {
            state: DropdownState::Open,
            reveal_delay,
            pending_reveal: None,
        }
    }

    pub fn state(&self) -> DropdownState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DropdownState::Open
    }

    pub fn reveal_deadline(&self) -> Option<Instant> {
        self.pending_reveal
    }

    pub fn toggle(&mut self, camera_count: usize, now: Instant) -> Vec<UiUpdate> {
        match self.state {
            DropdownState::Open => self.close(),
            DropdownState::Closed => self.open(camera_count, now),
        }
    }

    /// Forces `Closed`, whatever the current state.
    pub fn close(&mut self) -> Vec<UiUpdate> {
        self.state = DropdownState::Closed;
        self.pending_reveal = None;
        vec![
            UiUpdate::CameraEntries { visible: false },
            UiUpdate::Dropdown {
                layout: DropdownLayout::collapsed(),
            },
        ]
    }

    fn open(&mut self, camera_count: usize, now: Instant) -> Vec<UiUpdate> {
        self.state = DropdownState::Open;
        self.pending_reveal = Some(now + self.reveal_delay);
        vec![UiUpdate::Dropdown {
            layout: DropdownLayout::expanded(camera_count),
        }]
    }

    /// Shows the entries once the pending reveal is due.
    pub fn fire_reveal(&mut self, now: Instant) -> Option<UiUpdate> {
        let deadline = self.pending_reveal?;
        if now < deadline {
            return None;
        }
        self.pending_reveal = None;
        self.is_open()
            .then_some(UiUpdate::CameraEntries { visible: true })
    }

    pub fn cancel_reveal(&mut self) {
        self.pending_reveal = None;
    }
}
