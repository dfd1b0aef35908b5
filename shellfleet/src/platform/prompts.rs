//! Literal prompt markers used to judge dialogue steps.

use memchr::memmem;

/// The literal markers vendor dialogues look for in drained output.
///
/// Matching is a case-sensitive substring search over the output drained
/// by the most recent step only, never the whole session history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// Asked for a password during escalation.
    pub password: String,

    /// Present once IOS-like devices are in enable mode.
    pub enabled: String,

    /// Present once a Unix-like shell is running as root.
    pub root: String,

    /// Present at the WLC-like CLI prompt after the secondary login.
    pub controller: String,

    /// WLC-like devices asking whether to save configuration on exit.
    pub save_confirm: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            password: "Password:".to_string(),
            enabled: "#".to_string(),
            root: "root".to_string(),
            controller: ">".to_string(),
            save_confirm: "save?".to_string(),
        }
    }
}

impl PromptSet {
    /// Override the escalation password prompt.
    pub fn with_password(mut self, marker: impl Into<String>) -> Self {
        self.password = marker.into();
        self
    }

    /// Override the enable-mode marker.
    pub fn with_enabled(mut self, marker: impl Into<String>) -> Self {
        self.enabled = marker.into();
        self
    }

    /// Override the root-shell marker.
    pub fn with_root(mut self, marker: impl Into<String>) -> Self {
        self.root = marker.into();
        self
    }

    /// Override the controller prompt marker.
    pub fn with_controller(mut self, marker: impl Into<String>) -> Self {
        self.controller = marker.into();
        self
    }

    /// Override the save-configuration question marker.
    pub fn with_save_confirm(mut self, marker: impl Into<String>) -> Self {
        self.save_confirm = marker.into();
        self
    }
}

/// Case-sensitive literal substring search.
pub fn contains_marker(output: &str, marker: &str) -> bool {
    memmem::find(output.as_bytes(), marker.as_bytes()).is_some()
}
