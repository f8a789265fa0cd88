//! Bit Timing Recovery
//!
//! Turns the per-sample mark/space decision into NRZI-decoded bits.
//! Two interchangeable strategies are provided: a transition-interval
//! counter and a digital PLL. Both emit `false` for a tone change and
//! `true` for an unchanged tone.

use crate::config::{BAUD_RATE, SAMPLING_RATE};
use crate::types::TimingMode;

/// Recovers bits from a stream of line levels
pub trait BitTimingRecovery {
    /// Feed one line level, calling `emit` for each recovered bit
    fn process<F: FnMut(bool)>(&mut self, level: bool, emit: F);

    /// Forget all timing state
    fn reset(&mut self);
}

/// Longest run decoded from one transition interval
///
/// Seven ones already exceed any legal HDLC sequence, so longer runs
/// decode identically.
const MAX_RUN_BITS: u64 = 16;

/// Counts samples between level transitions
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeCounter {
    /// Samples since the last transition
    edge: u32,
    /// Level before the current sample
    level: bool,
}

impl EdgeCounter {
    /// Create a counter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            edge: 0,
            level: false,
        }
    }

    /// Whole bit periods in `samples`, rounded to nearest
    #[must_use]
    pub const fn bit_periods(samples: u32) -> u64 {
        let rate = SAMPLING_RATE as u64;
        (samples as u64 * BAUD_RATE as u64 * 2 + rate) / (rate * 2)
    }
}

impl BitTimingRecovery for EdgeCounter {
    fn process<F: FnMut(bool)>(&mut self, level: bool, mut emit: F) {
        self.edge = self.edge.saturating_add(1);
        if level == self.level {
            return;
        }

        // One zero for the transition, then a one per extra bit period
        let bits = Self::bit_periods(self.edge).min(MAX_RUN_BITS);
        emit(false);
        for _ in 1..bits {
            emit(true);
        }

        self.edge = 0;
        self.level = level;
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Phase increment per sample: 2^32 / samples-per-bit, rounded
pub const PLL_STEP: i32 =
    (((1_u64 << 32) + (SAMPLING_RATE / BAUD_RATE) as u64 / 2) / (SAMPLING_RATE / BAUD_RATE) as u64)
        as i32;

/// Digital PLL sampling mid-bit
///
/// The signed phase counter advances by [`PLL_STEP`] per sample. A bit
/// is sampled when the counter wraps past `i32::MAX`. Every transition
/// pulls the counter a quarter of the way toward zero, so transitions
/// settle at phase zero and sampling lands half a bit later.
#[derive(Clone, Copy, Debug, Default)]
pub struct PllRecovery {
    /// Phase counter
    counter: i32,
    /// Level at the previous sampling point
    nrzi: bool,
    /// Level before the current sample
    level: bool,
}

impl PllRecovery {
    /// Create a PLL at phase zero
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: 0,
            nrzi: false,
            level: false,
        }
    }

    /// Current phase counter
    #[must_use]
    pub const fn phase(&self) -> i32 {
        self.counter
    }
}

impl BitTimingRecovery for PllRecovery {
    fn process<F: FnMut(bool)>(&mut self, level: bool, mut emit: F) {
        let prev = self.counter >> 31;
        self.counter = self.counter.wrapping_add(PLL_STEP);

        if (self.counter >> 31) < prev {
            emit(level == self.nrzi);
            self.nrzi = level;
        }

        if level != self.level {
            self.counter -= self.counter >> 2;
            self.level = level;
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Runtime-selected timing recovery
#[derive(Clone, Copy, Debug)]
pub enum TimingRecovery {
    /// Transition interval counting
    EdgeCount(EdgeCounter),
    /// Digital PLL
    Pll(PllRecovery),
}

impl TimingRecovery {
    /// Create the strategy for `mode`
    #[must_use]
    pub const fn new(mode: TimingMode) -> Self {
        match mode {
            TimingMode::EdgeCount => Self::EdgeCount(EdgeCounter::new()),
            TimingMode::Pll => Self::Pll(PllRecovery::new()),
        }
    }

    /// Strategy in use
    #[must_use]
    pub const fn mode(&self) -> TimingMode {
        match self {
            Self::EdgeCount(_) => TimingMode::EdgeCount,
            Self::Pll(_) => TimingMode::Pll,
        }
    }
}

impl Default for TimingRecovery {
    fn default() -> Self {
        Self::new(TimingMode::default())
    }
}

impl BitTimingRecovery for TimingRecovery {
    fn process<F: FnMut(bool)>(&mut self, level: bool, emit: F) {
        match self {
            Self::EdgeCount(t) => t.process(level, emit),
            Self::Pll(t) => t.process(level, emit),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::EdgeCount(t) => t.reset(),
            Self::Pll(t) => t.reset(),
        }
    }
}
