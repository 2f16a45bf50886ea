//! Pagination for the changelist.
//!
//! [`Paginator`] slices a record set into pages and renders the pager: a
//! window of at most [`Paginator::PAGER_COUNT`] page links around the current
//! page plus previous/next links. Page links keep the listing's filter
//! parameters.
//!
//! # Examples
//!
//! ```
//! use thanos_crm::paginator::Paginator;
//! use thanos_http::QueryDict;
//!
//! let items: Vec<u32> = (1..=25).collect();
//! let paginator = Paginator::new(QueryDict::parse("city=Paris"), items, 3, "/thanos/crm/customer/", 10);
//! assert_eq!(paginator.num_pages(), 3);
//! assert_eq!(paginator.show_obj_list(), &[21, 22, 23, 24, 25]);
//! assert!(paginator.pager_html().unwrap().contains("/thanos/crm/customer/?city=Paris&amp;page=2"));
//! ```

use std::fmt::Write;
use std::ops::RangeInclusive;

use thanos_core::html::escape_html;
use thanos_core::ThanosResult;
use thanos_http::QueryDict;

/// Splits records into pages and renders page links.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    params: QueryDict,
    object_list: Vec<T>,
    current_page: usize,
    base_path: String,
    per_page: usize,
}

impl<T> Paginator<T> {
    /// Maximum number of page links shown at once.
    pub const PAGER_COUNT: usize = 11;

    /// Creates a paginator.
    ///
    /// `current_page` is clamped into `1..=num_pages()`; a `per_page` of zero
    /// is treated as one.
    pub fn new(
        params: QueryDict,
        object_list: Vec<T>,
        current_page: usize,
        base_path: &str,
        per_page: usize,
    ) -> Self {
        let mut paginator = Self {
            params,
            object_list,
            current_page,
            base_path: base_path.to_string(),
            per_page: per_page.max(1),
        };
        paginator.current_page = current_page.clamp(1, paginator.num_pages());
        paginator
    }

    /// Total number of records.
    pub fn count(&self) -> usize {
        self.object_list.len()
    }

    /// Number of pages; an empty list still has one page.
    pub fn num_pages(&self) -> usize {
        self.count().div_ceil(self.per_page).max(1)
    }

    /// The current page number after clamping.
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Returns `true` if there is a page before the current one.
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Returns `true` if there is a page after the current one.
    pub fn has_next(&self) -> bool {
        self.current_page < self.num_pages()
    }

    /// The records on the current page.
    pub fn show_obj_list(&self) -> &[T] {
        let start = (self.current_page - 1) * self.per_page;
        let end = (start + self.per_page).min(self.count());
        self.object_list.get(start..end).unwrap_or_default()
    }

    /// The page numbers shown in the pager.
    pub fn page_range(&self) -> RangeInclusive<usize> {
        let num_pages = self.num_pages();
        let half = Self::PAGER_COUNT / 2;
        if num_pages <= Self::PAGER_COUNT {
            1..=num_pages
        } else if self.current_page <= half + 1 {
            1..=Self::PAGER_COUNT
        } else if self.current_page + half > num_pages {
            (num_pages - Self::PAGER_COUNT + 1)..=num_pages
        } else {
            (self.current_page - half)..=(self.current_page + half)
        }
    }

    /// The link for page `number`, keeping the filter parameters.
    pub fn page_url(&self, number: usize) -> ThanosResult<String> {
        let mut params = self.params.copy();
        params.set("page", &number.to_string())?;
        Ok(format!("{}?{}", self.base_path, params.urlencode()))
    }

    /// Renders the pager as a `<ul class="pagination">` list.
    pub fn pager_html(&self) -> ThanosResult<String> {
        let mut html = String::from(r#"<ul class="pagination">"#);

        if self.has_previous() {
            let url = self.page_url(self.current_page - 1)?;
            write!(html, r#"<li><a href="{}">&laquo;</a></li>"#, escape_html(&url)).ok();
        } else {
            html.push_str(r#"<li class="disabled"><span>&laquo;</span></li>"#);
        }

        for number in self.page_range() {
            let url = self.page_url(number)?;
            let class = if number == self.current_page {
                r#" class="active""#
            } else {
                ""
            };
            write!(
                html,
                r#"<li{class}><a href="{}">{number}</a></li>"#,
                escape_html(&url)
            )
            .ok();
        }

        if self.has_next() {
            let url = self.page_url(self.current_page + 1)?;
            write!(html, r#"<li><a href="{}">&raquo;</a></li>"#, escape_html(&url)).ok();
        } else {
            html.push_str(r#"<li class="disabled"><span>&raquo;</span></li>"#);
        }

        html.push_str("</ul>");
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paginator(count: u32, page: usize) -> Paginator<u32> {
        Paginator::new(QueryDict::new(), (1..=count).collect(), page, "/list/", 10)
    }

    #[test]
    fn test_slices_current_page() {
        let p = paginator(25, 2);
        assert_eq!(p.num_pages(), 3);
        assert_eq!(p.show_obj_list().len(), 10);
        assert_eq!(p.show_obj_list()[0], 11);
    }

    #[test]
    fn test_page_is_clamped() {
        assert_eq!(paginator(25, 0).current_page(), 1);
        assert_eq!(paginator(25, 99).current_page(), 3);
        assert_eq!(paginator(25, 99).show_obj_list(), &[21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let p = paginator(0, 1);
        assert_eq!(p.num_pages(), 1);
        assert!(p.show_obj_list().is_empty());
        assert!(!p.has_next());
        assert!(!p.has_previous());
    }

    #[test]
    fn test_page_range_window() {
        assert_eq!(paginator(50, 1).page_range(), 1..=5);
        assert_eq!(paginator(300, 3).page_range(), 1..=11);
        assert_eq!(paginator(300, 15).page_range(), 10..=20);
        assert_eq!(paginator(300, 29).page_range(), 20..=30);
    }

    #[test]
    fn test_page_url_keeps_params() {
        let p = Paginator::new(
            QueryDict::parse("name=Ann+Lee&page=4"),
            vec![1, 2, 3],
            1,
            "/list/",
            1,
        );
        assert_eq!(p.page_url(2).unwrap(), "/list/?name=Ann+Lee&page=2");
    }

    #[test]
    fn test_pager_html() {
        let html = paginator(25, 2).pager_html().unwrap();
        assert!(html.starts_with(r#"<ul class="pagination">"#));
        assert!(html.contains(r#"<li class="active"><a href="/list/?page=2">2</a></li>"#));
        assert!(html.contains(r#"<li><a href="/list/?page=1">&laquo;</a></li>"#));
        assert!(html.contains(r#"<li><a href="/list/?page=3">&raquo;</a></li>"#));

        let first = paginator(5, 1).pager_html().unwrap();
        assert!(first.contains(r#"<li class="disabled"><span>&laquo;</span></li>"#));
        assert!(first.contains(r#"<li class="disabled"><span>&raquo;</span></li>"#));
    }
}
