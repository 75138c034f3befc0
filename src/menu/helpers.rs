//! Menu Normalization and Formatting Helpers
//!
//! Pure functions that turn raw catalog records into menu items and menu
//! items into the JSON and plain-text renderings.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use super::models::{
    CacheStatus, MenuCacheInfo, MenuEntry, MenuItem, MenuResponse, MenuSnapshot, TIMESTAMP_FORMAT,
};
use crate::catalog::models::{RawItem, DEFAULT_CATEGORY};

/// Knobs for the normalization pipeline
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Eligible category ids. Empty means every item is eligible.
    pub whitelist: HashSet<String>,
    /// Strip a leading `"12. "` from item names
    pub strip_ordinals: bool,
}

impl NormalizeOptions {
    pub fn whitelist_mode(&self) -> bool {
        !self.whitelist.is_empty()
    }
}

/// Picks the display category for an item, or `None` when the item is not
/// eligible under the whitelist.
pub fn resolve_category(item: &RawItem, options: &NormalizeOptions) -> Option<String> {
    let refs = item.category_refs();

    if options.whitelist_mode() {
        return refs
            .into_iter()
            .find(|r| r.id.as_ref().is_some_and(|id| options.whitelist.contains(id)))
            .map(|r| display_name(r.name.as_deref()));
    }

    let named = refs
        .into_iter()
        .find_map(|r| r.name.as_deref().filter(|n| !n.trim().is_empty()));
    Some(display_name(named))
}

fn display_name(name: Option<&str>) -> String {
    match name {
        Some(n) if !n.trim().is_empty() => n.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

/// Removes a leading `"<digits>. "` ordinal.
///
/// `"67. Chicken Biryani"` becomes `"Chicken Biryani"`. Names without the
/// prefix, or that would be left empty, come back unchanged.
pub fn clean_name(name: &str) -> String {
    let digits = name.len() - name.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return name.to_string();
    }

    let Some(rest) = name[digits..].strip_prefix('.') else {
        return name.to_string();
    };
    let stripped = rest.trim_start();
    if stripped.len() == rest.len() || stripped.is_empty() {
        return name.to_string();
    }

    stripped.to_string()
}

/// Runs the normalization pipeline over one fetch cycle.
///
/// Per item, in order: category resolution (may skip), zero-price filter,
/// first-occurrence dedup by id, optional name cleanup. The result is sorted
/// by `(category, name)`.
pub fn normalize_items(raw_items: Vec<RawItem>, options: &NormalizeOptions) -> Vec<MenuItem> {
    let mut seen_ids = HashSet::new();
    let mut items = Vec::new();

    for raw in raw_items {
        let Some(category) = resolve_category(&raw, options) else {
            continue;
        };

        let price_cents = raw.price.unwrap_or(0);
        if price_cents == 0 {
            continue;
        }

        let Some(id) = raw.id.filter(|id| !id.is_empty()) else {
            continue;
        };
        if !seen_ids.insert(id) {
            continue;
        }

        let name = raw.name.unwrap_or_default();
        let name = if options.strip_ordinals {
            clean_name(&name)
        } else {
            name
        };

        items.push(MenuItem {
            name,
            price: price_cents as f64 / 100.0,
            category,
            available: !raw.hidden.unwrap_or(false),
        });
    }

    sort_menu(&mut items);
    items
}

/// Orders items by `(category, name)`, byte-wise and case-sensitive.
pub fn sort_menu(items: &mut [MenuItem]) {
    items.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
}

/// Groups already-sorted items by category, keeping their order.
pub fn group_by_category(items: &[MenuItem]) -> BTreeMap<String, Vec<&MenuItem>> {
    let mut groups: BTreeMap<String, Vec<&MenuItem>> = BTreeMap::new();
    for item in items {
        groups.entry(item.category.clone()).or_default().push(item);
    }
    groups
}

pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

pub fn availability_mark(available: bool) -> &'static str {
    if available {
        "✓"
    } else {
        "✗"
    }
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// When a snapshot refreshed at `last_refresh` goes stale, if representable.
pub fn next_refresh_at(last_refresh: DateTime<Utc>, window: Duration) -> Option<DateTime<Utc>> {
    last_refresh.checked_add_signed(window)
}

/// Reports age and freshness of a snapshot at `now`.
pub fn compute_cache_status(
    snapshot: &MenuSnapshot,
    window: Duration,
    now: DateTime<Utc>,
) -> CacheStatus {
    let Some(last_refresh) = snapshot.last_refresh else {
        return CacheStatus {
            cached: false,
            items: 0,
            last_refresh: None,
            next_refresh: None,
            cache_age_seconds: None,
            cache_age_minutes: None,
            is_fresh: false,
        };
    };

    let age = now - last_refresh;
    let age_seconds = age.num_seconds().max(0);

    CacheStatus {
        cached: true,
        items: snapshot.items.len(),
        last_refresh: Some(format_timestamp(last_refresh)),
        next_refresh: next_refresh_at(last_refresh, window).map(format_timestamp),
        cache_age_seconds: Some(age_seconds),
        cache_age_minutes: Some(age_seconds / 60),
        is_fresh: age < window,
    }
}

/// Builds the grouped JSON menu.
pub fn build_menu_response(
    snapshot: &MenuSnapshot,
    status: &CacheStatus,
    restaurant: &str,
    environment: &str,
) -> MenuResponse {
    let categories = group_by_category(&snapshot.items)
        .into_iter()
        .map(|(category, items)| {
            let entries = items
                .into_iter()
                .map(|item| MenuEntry {
                    name: item.name.clone(),
                    price: format_price(item.price),
                    available: availability_mark(item.available),
                })
                .collect();
            (category, entries)
        })
        .collect();

    MenuResponse {
        restaurant: restaurant.to_string(),
        environment: environment.to_string(),
        last_updated: snapshot
            .last_refresh
            .map(format_timestamp)
            .unwrap_or_else(|| "Unknown".to_string()),
        total_items: snapshot.items.len(),
        cache_info: MenuCacheInfo {
            is_fresh: status.is_fresh,
            cache_age_minutes: status.cache_age_minutes,
            next_auto_refresh: status.next_refresh.clone(),
        },
        categories,
    }
}

/// Human-readable refresh policy for a window.
pub fn describe_refresh_policy(window: Duration) -> String {
    if window <= Duration::zero() {
        "Menu refreshes on every request".to_string()
    } else {
        format!("Menu auto-refreshes every {} minutes", window.num_minutes())
    }
}

/// Renders the menu as plain text for voice agents.
pub fn render_menu_text(
    snapshot: &MenuSnapshot,
    status: &CacheStatus,
    restaurant: &str,
    window: Duration,
) -> String {
    let rule = "=".repeat(60);
    let thin_rule = "-".repeat(60);

    let cache_info = match status.cache_age_minutes {
        Some(minutes) if status.cached => format!("Cached {} minutes ago", minutes),
        _ => "No cache".to_string(),
    };
    let updated = snapshot
        .last_refresh
        .map(format_timestamp)
        .unwrap_or_else(|| "Unknown".to_string());

    let mut text = format!("{} MENU\n", restaurant.to_uppercase());
    text.push_str(&format!("{}\n", rule));
    text.push_str(&format!("Updated: {}\n", updated));
    text.push_str(&format!("Cache Status: {}\n", cache_info));
    text.push_str(&format!("Total Items: {}\n", snapshot.items.len()));
    text.push_str(&format!("{}\n\n", rule));

    for (category, items) in group_by_category(&snapshot.items) {
        text.push_str(&format!("\n{}\n", category.to_uppercase()));
        text.push_str(&format!("{}\n", thin_rule));
        for item in items {
            text.push_str(&format!(
                "{} {:<45} ${:>6.2}\n",
                availability_mark(item.available),
                item.name,
                item.price
            ));
        }
    }

    text.push_str(&format!("\n{}\n", rule));
    text.push_str(&format!("{}\n", describe_refresh_policy(window)));
    text.push_str(&format!(
        "Next refresh: {}\n",
        status.next_refresh.as_deref().unwrap_or("Unknown")
    ));

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::{CategoryRef, RawCategory};
    use chrono::TimeZone;

    fn raw(id: &str, name: &str, price: i64, category_ids: &[(&str, &str)]) -> RawItem {
        let refs = category_ids
            .iter()
            .map(|(id, name)| CategoryRef {
                id: Some(id.to_string()),
                name: Some(name.to_string()),
            })
            .collect();
        RawItem {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            price: Some(price),
            hidden: Some(false),
            category: None,
            categories: Some(RawCategory::Expanded { elements: refs }),
        }
    }

    fn whitelist(ids: &[&str]) -> NormalizeOptions {
        NormalizeOptions {
            whitelist: ids.iter().map(|s| s.to_string()).collect(),
            strip_ordinals: true,
        }
    }

    fn item(category: &str, name: &str) -> MenuItem {
        MenuItem {
            name: name.to_string(),
            price: 1.0,
            category: category.to_string(),
            available: true,
        }
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("67. Chicken Biryani"), "Chicken Biryani");
        assert_eq!(clean_name("Naan"), "Naan");
        assert_eq!(clean_name("7 Up"), "7 Up");
        assert_eq!(clean_name("12.5oz Lassi"), "12.5oz Lassi");
        assert_eq!(clean_name("3. "), "3. ");
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let items = normalize_items(
            vec![
                raw("A1", "Samosa", 500, &[("C1", "Starters")]),
                raw("A1", "Samosa (dup)", 900, &[("C1", "Starters")]),
            ],
            &NormalizeOptions::default(),
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Samosa");
        assert_eq!(items[0].price, 5.0);
    }

    #[test]
    fn test_whitelist_excludes_and_selects_matching_reference() {
        let options = whitelist(&["C2"]);
        let items = normalize_items(
            vec![
                raw("A1", "Samosa", 500, &[("C9", "Hidden Stuff")]),
                raw("A2", "Korma", 1400, &[("C9", "Hidden Stuff"), ("C2", "Curries")]),
            ],
            &options,
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Korma");
        assert_eq!(items[0].category, "Curries");
    }

    #[test]
    fn test_whitelist_skips_items_without_references() {
        let mut bare = raw("A1", "Water", 100, &[]);
        bare.categories = None;
        assert!(normalize_items(vec![bare], &whitelist(&["C1"])).is_empty());
    }

    #[test]
    fn test_embedded_category_or_default_without_whitelist() {
        let embedded = RawItem {
            id: Some("A1".into()),
            name: Some("Chai".into()),
            price: Some(300),
            category: Some(RawCategory::Single(CategoryRef {
                id: None,
                name: Some("Drinks".into()),
            })),
            ..Default::default()
        };
        let uncategorized = RawItem {
            id: Some("A2".into()),
            name: Some("Pickle".into()),
            price: Some(150),
            ..Default::default()
        };

        let items = normalize_items(vec![embedded, uncategorized], &NormalizeOptions::default());

        assert_eq!(items[0].category, "Drinks");
        assert_eq!(items[1].category, "General");
    }

    #[test]
    fn test_zero_price_items_dropped() {
        let items = normalize_items(
            vec![
                raw("A1", "Free Papad", 0, &[("C1", "Starters")]),
                raw("A2", "Pakora", 600, &[("C1", "Starters")]),
            ],
            &NormalizeOptions::default(),
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Pakora");
    }

    #[test]
    fn test_zero_priced_duplicate_does_not_shadow_priced_one() {
        let items = normalize_items(
            vec![
                raw("A1", "Lassi", 0, &[("C1", "Drinks")]),
                raw("A1", "Lassi", 450, &[("C1", "Drinks")]),
            ],
            &NormalizeOptions::default(),
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, 4.5);
    }

    #[test]
    fn test_hidden_items_marked_unavailable() {
        let mut hidden = raw("A1", "Kulfi", 400, &[("C1", "Desserts")]);
        hidden.hidden = Some(true);
        let items = normalize_items(vec![hidden], &NormalizeOptions::default());
        assert!(!items[0].available);
    }

    #[test]
    fn test_ordinals_kept_when_cleanup_disabled() {
        let items = normalize_items(
            vec![raw("A1", "67. Chicken Biryani", 1599, &[("C1", "Rice")])],
            &NormalizeOptions::default(),
        );
        assert_eq!(items[0].name, "67. Chicken Biryani");

        let items = normalize_items(
            vec![raw("A1", "67. Chicken Biryani", 1599, &[("C1", "Rice")])],
            &whitelist(&["C1"]),
        );
        assert_eq!(items[0].name, "Chicken Biryani");
    }

    #[test]
    fn test_sort_by_category_then_name() {
        let mut items = vec![item("B", "X"), item("A", "Z"), item("A", "A")];
        sort_menu(&mut items);

        let order: Vec<_> = items
            .iter()
            .map(|i| format!("{}/{}", i.category, i.name))
            .collect();
        assert_eq!(order, vec!["A/A", "A/Z", "B/X"]);
    }

    #[test]
    fn test_sort_is_case_sensitive() {
        let mut items = vec![item("a", "x"), item("B", "y")];
        sort_menu(&mut items);
        assert_eq!(items[0].category, "B");
    }

    #[test]
    fn test_cache_status_unset_before_first_refresh() {
        let status = compute_cache_status(
            &MenuSnapshot::default(),
            Duration::minutes(30),
            Utc::now(),
        );
        assert!(!status.cached);
        assert_eq!(status.last_refresh, None);
        assert_eq!(status.cache_age_seconds, None);
        assert!(!status.is_fresh);
    }

    #[test]
    fn test_cache_status_age_and_next_refresh() {
        let last = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let snapshot = MenuSnapshot {
            items: vec![item("A", "A")],
            last_refresh: Some(last),
        };

        let now = last + Duration::seconds(754);
        let status = compute_cache_status(&snapshot, Duration::minutes(30), now);
        assert_eq!(status.cache_age_seconds, Some(754));
        assert_eq!(status.cache_age_minutes, Some(12));
        assert_eq!(status.next_refresh.as_deref(), Some("2024-05-01 12:30:00"));
        assert!(status.is_fresh);

        let now = last + Duration::minutes(30);
        let stale = compute_cache_status(&snapshot, Duration::minutes(30), now);
        assert!(!stale.is_fresh);
    }

    #[test]
    fn test_cache_status_survives_unrepresentable_next_refresh() {
        let last = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let snapshot = MenuSnapshot {
            items: vec![item("A", "A")],
            last_refresh: Some(last),
        };

        let status = compute_cache_status(&snapshot, Duration::days(1_000_000_000), last);

        assert!(status.cached);
        assert!(status.is_fresh);
        assert_eq!(status.next_refresh, None);
        assert_eq!(status.cache_age_seconds, Some(0));
    }

    #[test]
    fn test_menu_response_groups_and_formats() {
        let snapshot = MenuSnapshot {
            items: vec![
                MenuItem {
                    name: "Naan".into(),
                    price: 3.5,
                    category: "Breads".into(),
                    available: true,
                },
                MenuItem {
                    name: "Korma".into(),
                    price: 14.0,
                    category: "Curries".into(),
                    available: false,
                },
            ],
            last_refresh: None,
        };
        let status = compute_cache_status(&snapshot, Duration::minutes(30), Utc::now());

        let response = build_menu_response(&snapshot, &status, "Aroma", "TEST");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["total_items"], 2);
        assert_eq!(json["last_updated"], "Unknown");
        assert_eq!(json["categories"]["Breads"][0]["price"], "$3.50");
        assert_eq!(json["categories"]["Curries"][0]["available"], "✗");
    }

    #[test]
    fn test_render_menu_text_layout() {
        let last = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let snapshot = MenuSnapshot {
            items: vec![MenuItem {
                name: "Chicken Biryani".into(),
                price: 15.99,
                category: "Rice".into(),
                available: true,
            }],
            last_refresh: Some(last),
        };
        let window = Duration::minutes(30);
        let status = compute_cache_status(&snapshot, window, last + Duration::minutes(5));

        let text = render_menu_text(&snapshot, &status, "Aroma Indian Restaurant", window);

        assert!(text.starts_with("AROMA INDIAN RESTAURANT MENU\n"));
        assert!(text.contains("Updated: 2024-05-01 12:00:00\n"));
        assert!(text.contains("Cache Status: Cached 5 minutes ago\n"));
        assert!(text.contains("\nRICE\n"));
        assert!(text.contains(&format!("✓ {:<45} $ 15.99\n", "Chicken Biryani")));
        assert!(text.contains("Menu auto-refreshes every 30 minutes\n"));
        assert!(text.ends_with("Next refresh: 2024-05-01 12:30:00\n"));
    }
}
