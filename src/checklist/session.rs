//! Per-user session record for one inspection pass.

use crate::checklist::state::FlowState;

/// What the user reported for one checklist entry.
///
/// An entry the user marked "All clear" carries no Finding at all, so a photo
/// reference can only exist alongside a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// The user's comment for this entry.
    pub comment: String,
    /// Durable, externally fetchable URL of the uploaded photo, if any.
    pub photo_ref: Option<String>,
}

/// One user's conversation state, reused across passes.
///
/// `findings` is a fixed-size slot per entry; slot `i - 1` holds entry `i`.
/// `current_entry` stays within `[1, N]`, only ever moves forward by one, and
/// resets when the pass completes.
#[derive(Debug, Clone)]
pub struct Session {
    /// Current machine state.
    pub state: FlowState,
    /// Location text chosen at the start of the pass.
    pub chosen_location: Option<String>,
    current_entry: Option<usize>,
    findings: Vec<Option<Finding>>,
}

impl Session {
    /// Create an empty session for a checklist of `entries` items.
    pub fn new(entries: usize) -> Self {
        Self {
            state: FlowState::default(),
            chosen_location: None,
            current_entry: None,
            findings: vec![None; entries],
        }
    }

    /// Wipe everything back to the start of location selection.
    pub fn reset(&mut self) {
        self.state = FlowState::AwaitingLocation;
        self.chosen_location = None;
        self.current_entry = None;
        self.findings.iter_mut().for_each(|f| *f = None);
    }

    /// Number of checklist entries in a pass.
    pub fn entries(&self) -> usize {
        self.findings.len()
    }

    /// The 1-based entry currently being processed, if a pass is underway.
    pub fn current_entry(&self) -> Option<usize> {
        self.current_entry
    }

    /// The finding recorded for a 1-based entry index, if any.
    pub fn finding(&self, entry: usize) -> Option<&Finding> {
        self.findings.get(entry.checked_sub(1)?)?.as_ref()
    }

    /// Store the chosen location and point at the first entry.
    pub fn begin_pass(&mut self, location: impl Into<String>) {
        self.chosen_location = Some(location.into());
        self.current_entry = Some(1);
    }

    /// Move to the next entry. Fails past the last entry or outside a pass.
    pub fn advance_entry(&mut self) -> Result<usize, String> {
        let current = self
            .current_entry
            .ok_or_else(|| "No pass in progress".to_string())?;
        if current >= self.entries() {
            return Err(format!("Already at the last entry ({current})"));
        }
        self.current_entry = Some(current + 1);
        Ok(current + 1)
    }

    /// Record a comment for an entry, creating its finding.
    pub fn record_comment(&mut self, entry: usize, comment: impl Into<String>) -> Result<(), String> {
        let slot = self
            .slot_mut(entry)
            .ok_or_else(|| format!("Entry {entry} is out of range"))?;
        *slot = Some(Finding {
            comment: comment.into(),
            photo_ref: None,
        });
        Ok(())
    }

    /// Attach a photo reference to an entry that already has a comment.
    pub fn record_photo(&mut self, entry: usize, url: impl Into<String>) -> Result<(), String> {
        let slot = self
            .slot_mut(entry)
            .ok_or_else(|| format!("Entry {entry} is out of range"))?;
        match slot {
            Some(finding) => {
                finding.photo_ref = Some(url.into());
                Ok(())
            }
            None => Err(format!("Entry {entry} has no comment to attach a photo to")),
        }
    }

    /// Move to `target` if the state machine allows it.
    pub fn transition_to(&mut self, target: FlowState) -> Result<(), String> {
        if !self.state.can_transition_to(target) {
            return Err(format!("Cannot transition from {} to {}", self.state, target));
        }
        self.state = target;
        Ok(())
    }

    fn slot_mut(&mut self, entry: usize) -> Option<&mut Option<Finding>> {
        self.findings.get_mut(entry.checked_sub(1)?)
    }
}
