/// Key identities the controller understands, named after DOM `KeyboardEvent.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowDown,
    ArrowLeft,
    ArrowUp,
    Space,
    Enter,
    Backspace,
    PageDown,
    PageUp,
    Home,
    End,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Advance,
    Retreat,
    ToggleFullscreen,
    First,
    Last,
}

impl Key {
    /// Parse a DOM-style key name (`"ArrowLeft"`, `" "`, `"f"`, ...).
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowRight" => Self::ArrowRight,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowUp" => Self::ArrowUp,
            " " | "Space" => Self::Space,
            "Enter" => Self::Enter,
            "Backspace" => Self::Backspace,
            "PageDown" => Self::PageDown,
            "PageUp" => Self::PageUp,
            "Home" => Self::Home,
            "End" => Self::End,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other,
                }
            }
        }
    }

    pub fn action(self) -> Option<Action> {
        match self {
            Self::ArrowRight | Self::ArrowDown | Self::Space | Self::Enter | Self::PageDown => {
                Some(Action::Advance)
            }
            Self::ArrowLeft | Self::ArrowUp | Self::Backspace | Self::PageUp => {
                Some(Action::Retreat)
            }
            Self::Char('f') | Self::Char('F') => Some(Action::ToggleFullscreen),
            Self::Home => Some(Action::First),
            Self::End => Some(Action::Last),
            Self::Char(_) | Self::Other => None,
        }
    }
}
