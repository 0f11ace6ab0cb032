//! Offset pagination shared by every listing.
//!
//! Stores return a [`Paged`] whose metadata lives beside the items rather than
//! wrapped around them; the HTTP layer serialises the two under separate keys.

use serde::{Deserialize, Serialize};

/// Default page size of the opportunity listings.
pub const LISTING_LIMIT: u64 = 15;

/// Default page size of an applicant's own applications.
pub const APPLICATIONS_LIMIT: u64 = 10;

/// A 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page:  u64,
  pub limit: u64,
}

impl PageRequest {
  /// Page numbers below 1 are read as the first page; a zero limit as one.
  ///
  /// The page is capped so that its offset still fits an SQL `OFFSET`. Pages
  /// past the last one come back empty.
  pub fn new(page: Option<i64>, limit: u64) -> Self {
    let limit = limit.max(1);
    let last = i64::MAX as u64 / limit + 1;
    let page = page.filter(|p| *p >= 1).map_or(1, |p| (p as u64).min(last));
    Self { page, limit }
  }

  pub fn offset(&self) -> u64 { (self.page - 1).saturating_mul(self.limit) }
}

/// Page metadata returned next to (never around) the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDetails {
  pub total_docs:     u64,
  pub limit:          u64,
  pub page:           u64,
  pub total_pages:    u64,
  /// 1-based index of the first item of this page.
  pub paging_counter: u64,
  pub has_prev_page:  bool,
  pub has_next_page:  bool,
  pub prev_page:      Option<u64>,
  pub next_page:      Option<u64>,
}

impl PageDetails {
  pub fn new(total_docs: u64, req: PageRequest) -> Self {
    let total_pages = total_docs.div_ceil(req.limit).max(1);
    let has_prev_page = req.page > 1;
    let has_next_page = req.page < total_pages;
    Self {
      total_docs,
      limit: req.limit,
      page: req.page,
      total_pages,
      paging_counter: req.offset().saturating_add(1),
      has_prev_page,
      has_next_page,
      prev_page: has_prev_page.then(|| req.page - 1),
      next_page: has_next_page.then(|| req.page + 1),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Paged<T> {
  pub items:        Vec<T>,
  pub page_details: PageDetails,
}

impl<T> Paged<T> {
  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
    Paged {
      items:        self.items.into_iter().map(f).collect(),
      page_details: self.page_details,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_below_one_is_first_page() {
    assert_eq!(PageRequest::new(Some(0), 15).page, 1);
    assert_eq!(PageRequest::new(Some(-3), 15).page, 1);
    assert_eq!(PageRequest::new(None, 15).offset(), 0);
    assert_eq!(PageRequest::new(Some(3), 10).offset(), 20);
  }

  #[test]
  fn huge_page_offset_fits_sql() {
    let req = PageRequest::new(Some(i64::MAX), 15);
    assert!(req.offset() <= i64::MAX as u64);
    assert_eq!(req.offset() % 15, 0);

    let req = PageRequest::new(Some(i64::MAX), 1);
    assert_eq!(req.offset(), i64::MAX as u64 - 1);

    let d = PageDetails::new(1, PageRequest::new(Some(1_000_000_000_000_000_000), 15));
    assert_eq!(d.total_pages, 1);
    assert!(!d.has_next_page);
  }

  #[test]
  fn details_for_middle_page() {
    let d = PageDetails::new(31, PageRequest::new(Some(2), 15));
    assert_eq!(d.total_pages, 3);
    assert_eq!(d.paging_counter, 16);
    assert_eq!(d.prev_page, Some(1));
    assert_eq!(d.next_page, Some(3));
    assert!(d.has_prev_page && d.has_next_page);
  }

  #[test]
  fn empty_result_has_one_page() {
    let d = PageDetails::new(0, PageRequest::new(Some(1), 15));
    assert_eq!(d.total_pages, 1);
    assert!(!d.has_next_page);
    assert_eq!(d.next_page, None);
  }

  #[test]
  fn page_details_serialise_camel_case() {
    let d = PageDetails::new(1, PageRequest::new(None, 10));
    let v = serde_json::to_value(&d).unwrap();
    assert_eq!(v["totalDocs"], 1);
    assert_eq!(v["pagingCounter"], 1);
    assert!(v.get("items").is_none());
  }
}
