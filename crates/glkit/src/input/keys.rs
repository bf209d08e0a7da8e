//! Key, mouse button and action identifiers

/// Keyboard keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Key {
    /// Space key
    Space,
    /// Apostrophe key
    Apostrophe,
    /// Comma key
    Comma,
    /// Minus key
    Minus,
    /// Period key
    Period,
    /// Slash key
    Slash,
    /// 0 key
    Num0,
    /// 1 key
    Num1,
    /// 2 key
    Num2,
    /// 3 key
    Num3,
    /// 4 key
    Num4,
    /// 5 key
    Num5,
    /// 6 key
    Num6,
    /// 7 key
    Num7,
    /// 8 key
    Num8,
    /// 9 key
    Num9,
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// Escape key
    Escape,
    /// Enter key
    Enter,
    /// Tab key
    Tab,
    /// Backspace key
    Backspace,
    /// Insert key
    Insert,
    /// Delete key
    Delete,
    /// Right arrow
    Right,
    /// Left arrow
    Left,
    /// Down arrow
    Down,
    /// Up arrow
    Up,
    /// Left shift
    LeftShift,
    /// Left control
    LeftControl,
    /// Left alt
    LeftAlt,
    /// Right shift
    RightShift,
    /// Right control
    RightControl,
    /// Right alt
    RightAlt,
    /// F1 key
    F1,
    /// F2 key
    F2,
    /// F3 key
    F3,
    /// F4 key
    F4,
    /// F5 key
    F5,
    /// F6 key
    F6,
    /// F7 key
    F7,
    /// F8 key
    F8,
    /// F9 key
    F9,
    /// F10 key
    F10,
    /// F11 key
    F11,
    /// F12 key
    F12,
}

impl Key {
    /// Number of distinct keys
    pub const COUNT: usize = Self::F12 as usize + 1;

    /// Dense index of this key
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

impl MouseButton {
    /// Number of distinct buttons
    pub const COUNT: usize = Self::Middle as usize + 1;

    /// Dense index of this button
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Key or button transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Went down
    Press,
    /// Went up
    Release,
    /// Held long enough to auto-repeat
    Repeat,
}
