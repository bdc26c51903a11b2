//! Destination rotation policy.

/// Outcome of [`RotationPolicy::on_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDecision {
    /// Keep writing to the current destination.
    Continue,
    /// Open a new destination with this index before writing the event.
    Rotate(u32),
}

/// Decides when a new destination must be opened.
///
/// Within a luminosity block, destinations are numbered from 0. Once
/// `events_per_destination` events have gone to the current destination,
/// the next event triggers a rotation to the following index. With a
/// threshold of N, the events numbered N+1, 2N+1, ... of a block each open
/// a new destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    events_per_destination: u32,
    events_since_rotation: u32,
    current_index: u32,
}

impl RotationPolicy {
    /// Creates a policy. `events_per_destination` is clamped to at least 1.
    #[must_use]
    pub fn new(events_per_destination: u32) -> Self {
        Self {
            events_per_destination: events_per_destination.max(1),
            events_since_rotation: 0,
            current_index: 0,
        }
    }

    /// Accounts for one event about to be written.
    ///
    /// Equivalent to [`peek`](Self::peek) followed by
    /// [`commit`](Self::commit).
    pub fn on_event(&mut self) -> RotationDecision {
        let decision = self.peek();
        self.commit(decision);
        decision
    }

    /// Decision for the next event, without changing any state.
    #[must_use]
    pub fn peek(&self) -> RotationDecision {
        if self.events_since_rotation >= self.events_per_destination {
            RotationDecision::Rotate(self.current_index + 1)
        } else {
            RotationDecision::Continue
        }
    }

    /// Records one event under `decision`, as returned by
    /// [`peek`](Self::peek).
    pub fn commit(&mut self, decision: RotationDecision) {
        if let RotationDecision::Rotate(index) = decision {
            self.current_index = index;
            self.events_since_rotation = 0;
        }
        self.events_since_rotation += 1;
    }

    /// Resets to destination 0 at the start of a luminosity block.
    pub fn on_boundary(&mut self) {
        self.current_index = 0;
        self.events_since_rotation = 0;
    }

    /// Index of the current destination.
    #[must_use]
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    /// Events written to the current destination.
    #[must_use]
    pub fn events_since_rotation(&self) -> u32 {
        self.events_since_rotation
    }

    /// The rotation threshold.
    #[must_use]
    pub fn events_per_destination(&self) -> u32 {
        self.events_per_destination
    }
}
