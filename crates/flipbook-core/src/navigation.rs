/// A user request to move through the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationAction {
    Next,
    Prev,
    First,
    Last,
}

impl NavigationAction {
    /// Maps a DOM `KeyboardEvent.key` value to an action.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" | "PageDown" => Some(Self::Next),
            "ArrowLeft" | "PageUp" => Some(Self::Prev),
            "Home" => Some(Self::First),
            "End" => Some(Self::Last),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_and_paging_keys_map_to_actions() {
        assert_eq!(NavigationAction::from_key("ArrowRight"), Some(NavigationAction::Next));
        assert_eq!(NavigationAction::from_key("PageUp"), Some(NavigationAction::Prev));
        assert_eq!(NavigationAction::from_key("End"), Some(NavigationAction::Last));
        assert_eq!(NavigationAction::from_key("a"), None);
    }
}
