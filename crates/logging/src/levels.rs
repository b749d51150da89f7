//! crates/logging/src/levels.rs
//! Flag enums and level structures for info and debug verbosity.

/// Info flags for user-facing negotiation diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InfoFlag {
    /// Transport establishment and capability detection.
    Connect,
    /// Delivery of a negotiated protocol connection.
    Deliver,
    /// Handoffs to the legacy fallback protocol.
    Fallback,
}

impl InfoFlag {
    /// All info flags in declaration order.
    pub const ALL: [Self; 3] = [Self::Connect, Self::Deliver, Self::Fallback];

    /// Returns the token used when parsing `--info` style flag lists.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Deliver => "deliver",
            Self::Fallback => "fallback",
        }
    }
}

/// Debug flags for engine internals.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugFlag {
    /// Protocol selector callbacks.
    Select,
    /// Speculative probe reads.
    Probe,
    /// Push-back adapter installation and replay.
    Pushback,
    /// Buffer pool acquisition and release.
    Pool,
}

impl DebugFlag {
    /// All debug flags in declaration order.
    pub const ALL: [Self; 4] = [Self::Select, Self::Probe, Self::Pushback, Self::Pool];

    /// Returns the token used when parsing `--debug` style flag lists.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Probe => "probe",
            Self::Pushback => "pushback",
            Self::Pool => "pool",
        }
    }
}

/// Info verbosity levels for each flag.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfoLevels {
    /// Connection establishment level.
    pub connect: u8,
    /// Protocol delivery level.
    pub deliver: u8,
    /// Fallback handoff level.
    pub fallback: u8,
}

impl InfoLevels {
    /// Get the level for a specific flag.
    pub fn get(&self, flag: InfoFlag) -> u8 {
        match flag {
            InfoFlag::Connect => self.connect,
            InfoFlag::Deliver => self.deliver,
            InfoFlag::Fallback => self.fallback,
        }
    }

    /// Set the level for a specific flag.
    pub fn set(&mut self, flag: InfoFlag, level: u8) {
        match flag {
            InfoFlag::Connect => self.connect = level,
            InfoFlag::Deliver => self.deliver = level,
            InfoFlag::Fallback => self.fallback = level,
        }
    }

    /// Set all flags to the specified level.
    pub fn set_all(&mut self, level: u8) {
        for flag in InfoFlag::ALL {
            self.set(flag, level);
        }
    }
}

/// Debug verbosity levels for each flag.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebugLevels {
    /// Selector callback level.
    pub select: u8,
    /// Probe read level.
    pub probe: u8,
    /// Push-back adapter level.
    pub pushback: u8,
    /// Buffer pool level.
    pub pool: u8,
}

impl DebugLevels {
    /// Get the level for a specific flag.
    pub fn get(&self, flag: DebugFlag) -> u8 {
        match flag {
            DebugFlag::Select => self.select,
            DebugFlag::Probe => self.probe,
            DebugFlag::Pushback => self.pushback,
            DebugFlag::Pool => self.pool,
        }
    }

    /// Set the level for a specific flag.
    pub fn set(&mut self, flag: DebugFlag, level: u8) {
        match flag {
            DebugFlag::Select => self.select = level,
            DebugFlag::Probe => self.probe = level,
            DebugFlag::Pushback => self.pushback = level,
            DebugFlag::Pool => self.pool = level,
        }
    }

    /// Set all flags to the specified level.
    pub fn set_all(&mut self, level: u8) {
        for flag in DebugFlag::ALL {
            self.set(flag, level);
        }
    }
}
