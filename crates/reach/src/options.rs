//! Pass options handed in by the compiler driver.

/// Options for a reachability pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReachOptions {
    /// Check graph invariants after finalization
    pub verify: bool,
    /// Log the full graph dump at debug level after finalization
    pub dump: bool,
    /// Emit a trace event for every expression queued from a method body
    pub trace_bodies: bool,
}

impl ReachOptions {
    /// Options for debug builds of the compiler (default)
    pub fn debug() -> Self {
        Self {
            verify: true,
            dump: false,
            trace_bodies: false,
        }
    }

    /// Options for release builds: no invariant checking
    pub fn release() -> Self {
        Self {
            verify: false,
            dump: false,
            trace_bodies: false,
        }
    }

    /// Debug options plus a graph dump
    pub fn dump() -> Self {
        Self {
            dump: true,
            ..Self::debug()
        }
    }
}

impl Default for ReachOptions {
    fn default() -> Self {
        Self::debug()
    }
}
