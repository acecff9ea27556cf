//! Interrupt status decoding and event delivery
//!
//! The cm36672p raises a falling-edge interrupt when the proximity count
//! crosses one of its thresholds. The handler reads INT_FLAG (reading
//! acknowledges it), turns the flags into at most one [`ProximityEvent`] and
//! pushes it to the host's [`EventSink`], stamped by the host's [`Clock`].
//!
//! # Example
//!
//! ```ignore
//! # use msm8916_periph::interrupt::{IrqOutcome, Direction};
//! match sensor.handle_irq(&mut clock, &mut sink)? {
//!     IrqOutcome::Event(event) => assert_eq!(event.direction, Direction::Approaching),
//!     IrqOutcome::Spurious(flags) => { /* logged, nothing pushed */ }
//! }
//! ```

/// INT_FLAG bit: count fell below the low threshold
pub const PS_IF_AWAY: u16 = 1 << 8;

/// INT_FLAG bit: count rose above the high threshold
pub const PS_IF_CLOSE: u16 = 1 << 9;

/// Direction of a proximity threshold crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Object moving away (rising distance)
    Receding,
    /// Object coming close (falling distance)
    Approaching,
}

/// A proximity threshold event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProximityEvent {
    /// Crossing direction
    pub direction: Direction,
    /// Monotonic timestamp in nanoseconds taken when the status was decoded
    pub timestamp_ns: u64,
}

/// Receives events decoded in interrupt context
pub trait EventSink {
    /// Deliver one event
    fn push(&mut self, event: ProximityEvent);
}

/// Monotonic time source for event timestamps
pub trait Clock {
    /// Current time in nanoseconds
    fn now_ns(&mut self) -> u64;
}

/// Result of handling one interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqOutcome {
    /// An event was decoded and pushed to the sink
    Event(ProximityEvent),
    /// No known flag was set; contains the raw INT_FLAG value
    Spurious(u16),
    /// Acknowledged while event reporting was off; contains the raw INT_FLAG value
    Masked(u16),
}

/// Proximity interrupt flags
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProximityStatus {
    /// Away flag
    pub away: bool,
    /// Close flag
    pub close: bool,
}

impl ProximityStatus {
    /// Decode a raw INT_FLAG value
    pub const fn from_raw(raw: u16) -> Self {
        Self {
            away: raw & PS_IF_AWAY != 0,
            close: raw & PS_IF_CLOSE != 0,
        }
    }

    /// Check if any proximity flag is set
    pub const fn any_set(&self) -> bool {
        self.away || self.close
    }

    /// Event direction; the away flag wins when both are set
    pub const fn direction(&self) -> Option<Direction> {
        if self.away {
            Some(Direction::Receding)
        } else if self.close {
            Some(Direction::Approaching)
        } else {
            None
        }
    }
}

/// Map a raw INT_FLAG value to an event direction
pub const fn decode_proximity_status(raw: u16) -> Option<Direction> {
    ProximityStatus::from_raw(raw).direction()
}
