//! Pagination of the selection into budget-bounded pages.
//!
//! Items are grouped by domain, then by subdomain in first-seen order, and
//! cut into pages of at most `max_lines` entries. Headers and items each cost
//! one entry regardless of how many lines their text wraps to; the exporter
//! does a second, height-aware split when a page is visually too tall.

use crate::config::{LayoutConfig, MAX_LINES_PER_PAGE};
use crate::selection::{ItemKey, SelectedItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identity of a page: its domain and 0-based page number within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId {
    pub domain: String,
    pub index: usize,
}

impl PageId {
    pub fn new(domain: impl Into<String>, index: usize) -> Self {
        Self {
            domain: domain.into(),
            index,
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} p.{}", self.domain, self.index + 1)
    }
}

/// One line of a page.
#[derive(Debug, Clone, PartialEq)]
pub enum LineEntry {
    /// Subdomain header, repeated at the top of continuation pages.
    Header(String),
    /// A selected competency.
    Item(SelectedItem),
}

impl LineEntry {
    pub fn is_header(&self) -> bool {
        matches!(self, Self::Header(_))
    }
}

/// An ordered run of entries belonging to one domain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub entries: Vec<LineEntry>,
}

impl Page {
    /// Entry units charged against the budget.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn items(&self) -> impl Iterator<Item = &SelectedItem> {
        self.entries.iter().filter_map(|entry| match entry {
            LineEntry::Item(item) => Some(item),
            LineEntry::Header(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pages of one domain.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainPages {
    pub domain: String,
    pub pages: Vec<Page>,
}

/// Result of paginating a selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pagination {
    domains: Vec<DomainPages>,
    item_index: HashMap<ItemKey, PageId>,
    flat: Vec<PageId>,
}

impl Pagination {
    /// Domains that have at least one page, in catalog order.
    pub fn domains(&self) -> &[DomainPages] {
        &self.domains
    }

    /// Pages of a domain (empty if nothing is selected in it).
    pub fn pages(&self, domain: &str) -> &[Page] {
        self.domains
            .iter()
            .find(|d| d.domain == domain)
            .map(|d| d.pages.as_slice())
            .unwrap_or(&[])
    }

    pub fn page(&self, id: &PageId) -> Option<&Page> {
        self.pages(&id.domain).get(id.index)
    }

    /// Every page in navigation order: domains in catalog order, then page order.
    pub fn flat(&self) -> &[PageId] {
        &self.flat
    }

    pub fn flat_position(&self, id: &PageId) -> Option<usize> {
        self.flat.iter().position(|p| p == id)
    }

    /// Page that holds a selected item.
    pub fn locate(&self, key: &ItemKey) -> Option<&PageId> {
        self.item_index.get(key)
    }

    pub fn page_count(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }
}

/// Splits a selection into pages under an entry budget.
#[derive(Debug, Clone)]
pub struct Paginator {
    max_lines: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            max_lines: MAX_LINES_PER_PAGE,
        }
    }
}

impl Paginator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the budget of a layout configuration.
    pub fn from_layout(layout: &LayoutConfig) -> Self {
        Self::new().with_max_lines(layout.max_lines())
    }

    /// Set the per-page entry budget (at least 2: a header and one item).
    pub fn with_max_lines(mut self, lines: usize) -> Self {
        self.max_lines = lines.max(2);
        self
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Paginate `items` for the domains in `domain_order`.
    ///
    /// Items of domains missing from `domain_order` are skipped.
    pub fn paginate(&self, domain_order: &[&str], items: &[SelectedItem]) -> Pagination {
        let mut grouped: Vec<(&str, Vec<(&str, Vec<&SelectedItem>)>)> =
            domain_order.iter().map(|d| (*d, Vec::new())).collect();

        for item in items {
            let Some((_, groups)) = grouped.iter_mut().find(|(d, _)| *d == item.domain) else {
                log::warn!(
                    "Skipping '{}': domain '{}' is not in the catalog",
                    item.text,
                    item.domain
                );
                continue;
            };
            let group = item.group();
            match groups.iter_mut().find(|(sub, _)| *sub == group) {
                Some((_, members)) => members.push(item),
                None => groups.push((group, vec![item])),
            }
        }

        let mut pagination = Pagination::default();
        for (domain, groups) in grouped {
            let pages = self.paginate_domain(&groups);
            if pages.is_empty() {
                continue;
            }

            for (index, page) in pages.iter().enumerate() {
                let id = PageId::new(domain, index);
                for item in page.items() {
                    pagination.item_index.insert(item.key(), id.clone());
                }
                pagination.flat.push(id);
            }
            log::debug!("Domain '{}': {} page(s)", domain, pages.len());
            pagination.domains.push(DomainPages {
                domain: domain.to_string(),
                pages,
            });
        }

        pagination
    }

    fn paginate_domain(&self, groups: &[(&str, Vec<&SelectedItem>)]) -> Vec<Page> {
        let mut pages = Vec::new();
        let mut current = Page::default();

        for (subdomain, items) in groups {
            // Open the header only where its first item fits too.
            let needed = if items.is_empty() { 1 } else { 2 };
            if current.entry_count() + needed > self.max_lines && !current.is_empty() {
                pages.push(std::mem::take(&mut current));
            }
            current.entries.push(LineEntry::Header(subdomain.to_string()));

            for item in items {
                if current.entry_count() + 1 > self.max_lines && !current.is_empty() {
                    pages.push(std::mem::take(&mut current));
                    current.entries.push(LineEntry::Header(subdomain.to_string()));
                }
                current.entries.push(LineEntry::Item((*item).clone()));
            }
        }

        if !current.is_empty() {
            pages.push(current);
        }
        pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(domain: &str, sub: &str, text: &str) -> SelectedItem {
        SelectedItem {
            domain: domain.into(),
            subdomain: sub.into(),
            text: text.into(),
            timestamp: None,
            batch: None,
        }
    }

    fn many(domain: &str, sub: &str, n: usize) -> Vec<SelectedItem> {
        (0..n).map(|i| item(domain, sub, &format!("c{}", i))).collect()
    }

    #[test]
    fn test_single_page() {
        let items = many("Math", "Geo", 3);
        let p = Paginator::new().paginate(&["Math"], &items);
        assert_eq!(p.page_count(), 1);
        let page = p.page(&PageId::new("Math", 0)).unwrap();
        assert_eq!(page.entries[0], LineEntry::Header("Geo".into()));
        assert_eq!(page.entry_count(), 4);
    }

    #[test]
    fn test_25_items_budget_20_repeats_header() {
        let items = many("Math", "Geo", 25);
        let p = Paginator::new().with_max_lines(20).paginate(&["Math"], &items);
        let pages = p.pages("Math");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].entry_count(), 20);
        assert_eq!(pages[1].entries[0], LineEntry::Header("Geo".into()));
        assert_eq!(pages[1].items().count(), 6);
    }

    #[test]
    fn test_budget_never_exceeded() {
        for budget in 2..8 {
            let mut items = many("D", "A", 7);
            items.extend(many("D", "B", 1));
            items.extend(many("D", "C", 5));
            let p = Paginator::new().with_max_lines(budget).paginate(&["D"], &items);
            for page in p.pages("D") {
                assert!(page.entry_count() <= budget, "budget {}", budget);
                assert!(page.entries[0].is_header());
            }
            assert_eq!(p.pages("D").iter().map(|pg| pg.items().count()).sum::<usize>(), 13);
        }
    }

    #[test]
    fn test_header_not_orphaned_at_page_end() {
        // 18 items fill A up to 19 entries; B's header would be the 20th line.
        let mut items = many("D", "A", 18);
        items.extend(many("D", "B", 2));
        let p = Paginator::new().with_max_lines(20).paginate(&["D"], &items);
        let pages = p.pages("D");
        assert_eq!(pages[0].entry_count(), 19);
        assert!(!pages[0].entries.last().unwrap().is_header());
        assert_eq!(pages[1].entries[0], LineEntry::Header("B".into()));
    }

    #[test]
    fn test_subdomain_order_is_first_seen_in_selection() {
        let items = vec![item("D", "B", "1"), item("D", "A", "2"), item("D", "B", "3")];
        let p = Paginator::new().paginate(&["D"], &items);
        let page = &p.pages("D")[0];
        assert_eq!(
            page.entries,
            vec![
                LineEntry::Header("B".into()),
                LineEntry::Item(items[0].clone()),
                LineEntry::Item(items[2].clone()),
                LineEntry::Header("A".into()),
                LineEntry::Item(items[1].clone()),
            ]
        );
    }

    #[test]
    fn test_flat_index_follows_catalog_order() {
        let mut items = many("Second", "S", 3);
        items.extend(many("First", "F", 25));
        let p = Paginator::new().paginate(&["First", "Empty", "Second"], &items);
        assert_eq!(
            p.flat(),
            &[
                PageId::new("First", 0),
                PageId::new("First", 1),
                PageId::new("Second", 0)
            ]
        );
        assert!(p.pages("Empty").is_empty());
    }

    #[test]
    fn test_reverse_index() {
        let items = many("Math", "Geo", 25);
        let p = Paginator::new().paginate(&["Math"], &items);
        assert_eq!(p.locate(&items[0].key()), Some(&PageId::new("Math", 0)));
        assert_eq!(p.locate(&items[24].key()), Some(&PageId::new("Math", 1)));
        assert_eq!(p.flat_position(&PageId::new("Math", 1)), Some(1));
    }

    #[test]
    fn test_empty_subdomain_groups_under_domain() {
        let items = vec![item("Art", "", "draw")];
        let p = Paginator::new().paginate(&["Art"], &items);
        assert_eq!(p.pages("Art")[0].entries[0], LineEntry::Header("Art".into()));
    }

    #[test]
    fn test_unknown_domain_skipped() {
        let items = vec![item("Ghost", "S", "boo"), item("Math", "S", "ok")];
        let p = Paginator::new().paginate(&["Math"], &items);
        assert_eq!(p.page_count(), 1);
        assert!(p.locate(&items[0].key()).is_none());
    }

    #[test]
    fn test_empty_selection() {
        let p = Paginator::new().paginate(&["A"], &[]);
        assert!(p.is_empty());
        assert!(p.domains().is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        const DOMAINS: [&str; 3] = ["Langage", "Agir", "Explorer"];

        /// Distinct items in a random selection order.
        fn items_strategy() -> impl Strategy<Value = Vec<SelectedItem>> {
            prop::collection::btree_set((0..DOMAINS.len(), 0..4usize, 0..40usize), 0..80)
                .prop_map(|keys| {
                    keys.into_iter()
                        .map(|(d, s, t)| item(DOMAINS[d], &format!("S{}", s), &format!("c{}", t)))
                        .collect::<Vec<_>>()
                })
                .prop_shuffle()
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn prop_budget_never_exceeded(items in items_strategy(), budget in 2usize..30) {
                let p = Paginator::new().with_max_lines(budget).paginate(&DOMAINS, &items);
                let mut placed = 0;
                for domain in DOMAINS {
                    for page in p.pages(domain) {
                        prop_assert!(page.entry_count() <= budget);
                        prop_assert!(page.entries[0].is_header());
                        placed += page.items().count();
                    }
                }
                prop_assert_eq!(placed, items.len());
                for item in &items {
                    prop_assert!(p.locate(&item.key()).is_some());
                }
            }

            #[test]
            fn prop_idempotent(items in items_strategy(), budget in 2usize..30) {
                let paginator = Paginator::new().with_max_lines(budget);
                let first = paginator.paginate(&DOMAINS, &items);
                let second = paginator.paginate(&DOMAINS, &items);
                prop_assert_eq!(first, second);
            }
        }
    }
}
