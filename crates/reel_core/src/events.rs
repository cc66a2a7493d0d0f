//! Input events
//!
//! Platform-neutral pointer and keyboard input delivered to controls,
//! plus the bounds used to hit-test them.

/// Axis-aligned bounds of a control, in logical pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check whether a point lies inside the bounds
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Horizontal position of `x` across the bounds as a fraction in `[0, 1]`.
    ///
    /// Returns `None` for degenerate (zero or negative width) bounds.
    pub fn fraction_x(&self, x: f32) -> Option<f32> {
        if self.width.is_nan() || self.width <= 0.0 || !x.is_finite() {
            return None;
        }
        Some(((x - self.x) / self.width).clamp(0.0, 1.0))
    }
}

/// Pointer button
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
    Other(u8),
}

/// Pointer event data
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub button: PointerButton,
}

impl PointerEvent {
    /// Primary-button pointer event at a position
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            button: PointerButton::Primary,
        }
    }
}

/// Virtual key codes (platform-agnostic)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const ENTER: KeyCode = KeyCode(0x0D);
    pub const ESCAPE: KeyCode = KeyCode(0x1B);
    pub const SPACE: KeyCode = KeyCode(0x20);

    pub const END: KeyCode = KeyCode(0x23);
    pub const HOME: KeyCode = KeyCode(0x24);
    pub const LEFT: KeyCode = KeyCode(0x25);
    pub const RIGHT: KeyCode = KeyCode(0x27);

    pub const F: KeyCode = KeyCode(0x46);

    pub const UNKNOWN: KeyCode = KeyCode(0);
}

/// Keyboard modifier flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    bits: u8,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { bits: 0 };
    pub const SHIFT: u8 = 0b0001;
    pub const CTRL: u8 = 0b0010;
    pub const ALT: u8 = 0b0100;
    pub const META: u8 = 0b1000;

    pub const fn from_bits(bits: u8) -> Self {
        Self { bits }
    }

    pub const fn shift(&self) -> bool {
        self.bits & Self::SHIFT != 0
    }

    pub const fn ctrl(&self) -> bool {
        self.bits & Self::CTRL != 0
    }

    pub const fn alt(&self) -> bool {
        self.bits & Self::ALT != 0
    }

    pub const fn meta(&self) -> bool {
        self.bits & Self::META != 0
    }

    /// Check if any modifier is pressed
    pub const fn any(&self) -> bool {
        self.bits != 0
    }
}

/// Keyboard event data
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub modifiers: Modifiers,
    /// Whether this is an auto-repeat event
    pub repeat: bool,
}

impl KeyEvent {
    /// Plain key press without modifiers
    pub fn pressed(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
            repeat: false,
        }
    }
}

/// An input event delivered to a control
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerUp(PointerEvent),
    /// Press and release on the same control
    Click(PointerEvent),
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
}

impl InputEvent {
    /// Pointer payload, if this is a pointer event
    pub fn pointer(&self) -> Option<&PointerEvent> {
        match self {
            InputEvent::PointerDown(p) | InputEvent::PointerUp(p) | InputEvent::Click(p) => Some(p),
            InputEvent::KeyDown(_) | InputEvent::KeyUp(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_is_clamped_to_unit_range() {
        let track = Rect::new(100.0, 0.0, 200.0, 8.0);
        assert_eq!(track.fraction_x(150.0), Some(0.25));
        assert_eq!(track.fraction_x(50.0), Some(0.0));
        assert_eq!(track.fraction_x(400.0), Some(1.0));
    }

    #[test]
    fn degenerate_bounds_have_no_fraction() {
        assert_eq!(Rect::new(10.0, 0.0, 0.0, 8.0).fraction_x(10.0), None);
        assert_eq!(Rect::new(10.0, 0.0, -5.0, 8.0).fraction_x(10.0), None);
        assert_eq!(Rect::new(0.0, 0.0, 100.0, 8.0).fraction_x(f32::NAN), None);
    }

    #[test]
    fn contains_is_inclusive() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(0.0, 10.0));
        assert!(!rect.contains(10.5, 5.0));
    }

    #[test]
    fn modifiers_bits() {
        let mods = Modifiers::from_bits(Modifiers::SHIFT | Modifiers::META);
        assert!(mods.shift());
        assert!(mods.meta());
        assert!(!mods.ctrl());
        assert!(mods.any());
        assert!(!Modifiers::NONE.any());
    }
}
