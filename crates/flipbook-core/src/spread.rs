//! Spread index bookkeeping and navigation rules.
//!
//! A spread is a pair of facing pages. Spread `i` shows pages `2i + 1` and
//! `2i + 2`; the right page may fall past the end of an odd-length document,
//! in which case its surface is cleared.

/// Pages shown for one spread, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePair {
    pub left: u32,
    pub right: u32,
}

impl PagePair {
    pub fn for_spread(index: u32) -> Self {
        let left = index.saturating_mul(2).saturating_add(1);
        Self {
            left,
            right: left.saturating_add(1),
        }
    }

    /// Indicator text such as `"7-7 / 7"`; page numbers never exceed `total_pages`.
    pub fn indicator_text(&self, total_pages: u32) -> String {
        let left = self.left.min(total_pages);
        let right = self.right.min(total_pages);
        format!("{left}-{right} / {total_pages}")
    }
}

/// Which half of the spread a surface shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageSide {
    Left,
    Right,
}

/// Current spread plus the document length it is bounded by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpreadCursor {
    index: u32,
    total_pages: u32,
}

impl SpreadCursor {
    pub fn new(total_pages: u32) -> Self {
        Self {
            index: 0,
            total_pages,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn pages(&self) -> PagePair {
        PagePair::for_spread(self.index)
    }

    pub fn indicator_text(&self) -> String {
        self.pages().indicator_text(self.total_pages)
    }

    /// The next spread exists when its left page is a real page.
    pub fn can_go_next(&self) -> bool {
        let next_left = u64::from(self.index) * 2 + 3;
        next_left <= u64::from(self.total_pages)
    }

    pub fn can_go_prev(&self) -> bool {
        self.index > 0
    }

    /// Advances one spread; returns `false` at the last spread.
    pub fn next(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }

        self.index += 1;
        true
    }

    /// Steps back one spread; returns `false` at the first spread.
    pub fn prev(&mut self) -> bool {
        if !self.can_go_prev() {
            return false;
        }

        self.index -= 1;
        true
    }

    pub fn last_index(&self) -> u32 {
        self.total_pages.saturating_sub(1) / 2
    }

    /// Spread holding `page`, with the page clamped into the document.
    pub fn spread_for_page(&self, page: u32) -> u32 {
        let page = page.clamp(1, self.total_pages.max(1));
        (page - 1) / 2
    }

    /// Moves to `index` (clamped); returns whether the spread changed.
    pub fn jump_to(&mut self, index: u32) -> bool {
        let index = index.min(self.last_index());
        if index == self.index {
            return false;
        }

        self.index = index;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_pair_follows_spread_index() {
        for index in [0_u32, 1, 2, 7, 41] {
            let pair = PagePair::for_spread(index);
            assert_eq!(pair.left, index * 2 + 1);
            assert_eq!(pair.right, pair.left + 1);
        }
    }

    #[test]
    fn indicator_clamps_to_document_length() {
        assert_eq!(PagePair::for_spread(0).indicator_text(10), "1-2 / 10");
        assert_eq!(PagePair::for_spread(3).indicator_text(7), "7-7 / 7");
        assert_eq!(PagePair::for_spread(0).indicator_text(1), "1-1 / 1");
    }

    #[test]
    fn next_stops_when_following_spread_would_be_empty() {
        let mut cursor = SpreadCursor::new(10);
        for _ in 0..4 {
            assert!(cursor.next());
        }
        assert_eq!(cursor.index(), 4);
        assert_eq!(cursor.pages(), PagePair::for_spread(4));

        assert!(!cursor.next());
        assert_eq!(cursor.index(), 4);
    }

    #[test]
    fn odd_document_reaches_single_page_spread() {
        let mut cursor = SpreadCursor::new(7);
        while cursor.next() {}

        assert_eq!(cursor.index(), 3);
        assert_eq!(cursor.indicator_text(), "7-7 / 7");
        assert_eq!(cursor.last_index(), 3);
    }

    #[test]
    fn prev_is_noop_at_first_spread() {
        let mut cursor = SpreadCursor::new(4);
        assert!(!cursor.prev());
        assert_eq!(cursor.index(), 0);

        assert!(cursor.next());
        assert!(cursor.prev());
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn empty_document_cannot_move() {
        let mut cursor = SpreadCursor::new(0);
        assert!(!cursor.next());
        assert!(!cursor.prev());
        assert_eq!(cursor.last_index(), 0);
    }

    #[test]
    fn spread_for_page_clamps_into_document() {
        let cursor = SpreadCursor::new(9);
        assert_eq!(cursor.spread_for_page(0), 0);
        assert_eq!(cursor.spread_for_page(1), 0);
        assert_eq!(cursor.spread_for_page(2), 0);
        assert_eq!(cursor.spread_for_page(3), 1);
        assert_eq!(cursor.spread_for_page(9), 4);
        assert_eq!(cursor.spread_for_page(500), 4);
    }

    #[test]
    fn jump_reports_change_and_clamps() {
        let mut cursor = SpreadCursor::new(6);
        assert!(cursor.jump_to(10));
        assert_eq!(cursor.index(), 2);
        assert!(!cursor.jump_to(2));
        assert!(cursor.jump_to(0));
    }
}
