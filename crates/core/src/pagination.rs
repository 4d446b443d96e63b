//! Page arithmetic for post feeds.
//!
//! Feeds are sliced into fixed-size pages. Page selection is forgiving: a
//! missing or malformed `?page=` value selects the first page, and a number
//! past the end selects the last page. An empty feed still has one (empty)
//! page so listings always render.

use serde::Serialize;

/// Default number of posts shown per feed page.
pub const POSTS_PER_PAGE: i64 = 10;

/// Position of one page within a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// 1-based page number.
    pub number: i64,
    /// Total number of pages (at least 1).
    pub num_pages: i64,
    /// Total number of items across all pages.
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
    #[serde(skip)]
    per_page: i64,
}

impl PageInfo {
    /// Resolve the page to show for a raw `?page=` value.
    pub fn resolve(requested: Option<&str>, count: i64, per_page: i64) -> Self {
        let per_page = per_page.max(1);
        let count = count.max(0);
        let num_pages = if count == 0 {
            1
        } else {
            (count + per_page - 1) / per_page
        };

        let number = match requested.map(str::trim).map(str::parse::<i64>) {
            Some(Ok(n)) if n > num_pages => num_pages,
            Some(Ok(n)) if n >= 1 => n,
            // Zero or negative numbers are out of range on the low side.
            Some(Ok(_)) => 1,
            Some(Err(_)) | None => 1,
        };

        Self {
            number,
            num_pages,
            count,
            has_next: number < num_pages,
            has_previous: number > 1,
            per_page,
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    /// Maximum number of rows on this page.
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn next_page_number(&self) -> Option<i64> {
        self.has_next.then_some(self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<i64> {
        self.has_previous.then_some(self.number - 1)
    }
}

/// One page of a feed: its position plus the items on it.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    #[serde(flatten)]
    pub info: PageInfo,
    pub object_list: Vec<T>,
}

impl<T: Serialize> Page<T> {
    pub fn new(info: PageInfo, object_list: Vec<T>) -> Self {
        Self { info, object_list }
    }

    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_of_twenty_one() {
        let page = PageInfo::resolve(None, 21, POSTS_PER_PAGE);
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 10);
        assert!(page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn last_page_holds_the_remainder() {
        let page = PageInfo::resolve(Some("3"), 21, POSTS_PER_PAGE);
        assert_eq!(page.number, 3);
        assert_eq!(page.offset(), 20);
        assert!(!page.has_next);
        assert_eq!(page.previous_page_number(), Some(2));
    }

    #[test]
    fn page_past_the_end_selects_last_page() {
        let page = PageInfo::resolve(Some("99"), 21, POSTS_PER_PAGE);
        assert_eq!(page.number, 3);
    }

    #[test]
    fn malformed_page_selects_first_page() {
        assert_eq!(PageInfo::resolve(Some("abc"), 21, 10).number, 1);
        assert_eq!(PageInfo::resolve(Some(""), 21, 10).number, 1);
        assert_eq!(PageInfo::resolve(Some("0"), 21, 10).number, 1);
        assert_eq!(PageInfo::resolve(Some("-4"), 21, 10).number, 1);
    }

    #[test]
    fn empty_feed_has_one_empty_page() {
        let page = PageInfo::resolve(Some("2"), 0, 10);
        assert_eq!(page.num_pages, 1);
        assert_eq!(page.number, 1);
        assert_eq!(page.offset(), 0);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let page = PageInfo::resolve(Some("2"), 20, 10);
        assert_eq!(page.num_pages, 2);
        assert!(!page.has_next);
        assert_eq!(page.next_page_number(), None);
    }

    #[test]
    fn page_serializes_flat_with_object_list() {
        let page = Page::new(PageInfo::resolve(None, 2, 10), vec!["a", "b"]);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["number"], 1);
        assert_eq!(json["count"], 2);
        assert_eq!(json["object_list"].as_array().unwrap().len(), 2);
        assert!(json.get("per_page").is_none());
    }
}
