//! Composer tool flags.
//!
//! `extract_inputs` only makes sense when tools are enabled. Each toggle is
//! locked while the other one depends on it.

/// The `use_tools` / `extract_inputs` pair sent with every chat message.
///
/// Invariant: `extract_inputs` implies `use_tools`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ToolFlags {
    use_tools: bool,
    extract_inputs: bool,
}

impl ToolFlags {
    #[must_use]
    pub fn use_tools(self) -> bool {
        self.use_tools
    }

    #[must_use]
    pub fn extract_inputs(self) -> bool {
        self.extract_inputs
    }

    /// Set `use_tools`. Clearing it is refused while `extract_inputs` is on.
    ///
    /// Returns whether the value was applied.
    pub fn set_use_tools(&mut self, enabled: bool) -> bool {
        if !enabled && self.extract_inputs {
            return false;
        }
        self.use_tools = enabled;
        true
    }

    /// Set `extract_inputs`. Enabling it is refused while `use_tools` is off.
    ///
    /// Returns whether the value was applied.
    pub fn set_extract_inputs(&mut self, enabled: bool) -> bool {
        if enabled && !self.use_tools {
            return false;
        }
        self.extract_inputs = enabled;
        true
    }

    pub fn toggle_use_tools(&mut self) -> bool {
        self.set_use_tools(!self.use_tools)
    }

    pub fn toggle_extract_inputs(&mut self) -> bool {
        self.set_extract_inputs(!self.extract_inputs)
    }

    /// The `use_tools` toggle is locked while extraction is on.
    #[must_use]
    pub fn use_tools_editable(self) -> bool {
        !self.extract_inputs
    }

    /// The `extract_inputs` toggle is only offered while tools are on.
    #[must_use]
    pub fn extract_editable(self) -> bool {
        self.use_tools
    }
}

#[cfg(test)]
#[path = "compose_test.rs"]
mod tests;
