//! Toggle switch bound to a boolean
//!
//! ```ignore
//! let mut skip = Switch::new("skip", "skip inactive").checked(true);
//! skip.toggle();
//! assert!(!skip.is_checked());
//! ```

/// Rendered state of a switch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchView {
    pub id: String,
    pub label: String,
    pub checked: bool,
    pub disabled: bool,
}

/// A labelled on/off switch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Switch {
    id: String,
    label: String,
    checked: bool,
    disabled: bool,
}

impl Switch {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            checked: false,
            disabled: false,
        }
    }

    /// Set the initial checked state
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Set the initial disabled state
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Flip the switch. Disabled switches stay put; returns whether it flipped.
    pub fn toggle(&mut self) -> bool {
        if self.disabled {
            return false;
        }
        self.checked = !self.checked;
        true
    }

    pub fn view(&self) -> SwitchView {
        SwitchView {
            id: self.id.clone(),
            label: self.label.clone(),
            checked: self.checked,
            disabled: self.disabled,
        }
    }
}
