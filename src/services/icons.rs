//! Icon picker catalog. Names match the front-end's icon set.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Icon {
    pub name: &'static str,
    pub category: &'static str,
    pub keywords: &'static [&'static str],
}

const fn icon(name: &'static str, category: &'static str, keywords: &'static [&'static str]) -> Icon {
    Icon { name, category, keywords }
}

pub const ICONS: &[Icon] = &[
    icon("zap", "general", &["fast", "lightning", "power", "speed"]),
    icon("star", "general", &["favorite", "rating", "best"]),
    icon("heart", "general", &["love", "like", "care"]),
    icon("check", "general", &["done", "tick", "included", "yes"]),
    icon("sparkles", "general", &["new", "magic", "ai"]),
    icon("globe", "general", &["world", "international", "web"]),
    icon("shield", "security", &["secure", "protection", "safe"]),
    icon("lock", "security", &["private", "password", "secure"]),
    icon("key", "security", &["access", "auth", "password"]),
    icon("eye-off", "security", &["privacy", "hidden"]),
    icon("users", "people", &["team", "group", "community"]),
    icon("user", "people", &["person", "account", "profile"]),
    icon("smile", "people", &["happy", "customer", "satisfaction"]),
    icon("message-circle", "communication", &["chat", "support", "comment"]),
    icon("mail", "communication", &["email", "contact", "inbox"]),
    icon("phone", "communication", &["call", "contact", "support"]),
    icon("bell", "communication", &["notification", "alert"]),
    icon("bar-chart", "business", &["analytics", "stats", "growth"]),
    icon("trending-up", "business", &["growth", "increase", "revenue"]),
    icon("dollar-sign", "business", &["price", "money", "cost"]),
    icon("briefcase", "business", &["work", "job", "enterprise"]),
    icon("target", "business", &["goal", "focus", "aim"]),
    icon("code", "technology", &["developer", "api", "programming"]),
    icon("cloud", "technology", &["hosting", "saas", "storage"]),
    icon("cpu", "technology", &["performance", "processor", "compute"]),
    icon("database", "technology", &["data", "storage", "sql"]),
    icon("smartphone", "technology", &["mobile", "app", "device"]),
    icon("settings", "technology", &["configure", "options", "gear"]),
    icon("clock", "time", &["time", "schedule", "hours"]),
    icon("calendar", "time", &["date", "event", "booking"]),
    icon("refresh-cw", "time", &["sync", "update", "reload"]),
    icon("map-pin", "location", &["address", "place", "location"]),
    icon("truck", "location", &["shipping", "delivery"]),
    icon("home", "location", &["house", "start"]),
];

/// Distinct categories in catalog order.
#[must_use]
pub fn categories() -> Vec<&'static str> {
    let mut seen: Vec<&'static str> = Vec::new();
    for icon in ICONS {
        if !seen.contains(&icon.category) {
            seen.push(icon.category);
        }
    }
    seen
}

/// Icons whose name or keywords contain `query` (case-insensitive), limited
/// to `category` when given. Name matches come before keyword-only matches.
#[must_use]
pub fn search(query: Option<&str>, category: Option<&str>) -> Vec<&'static Icon> {
    let needle = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let in_category = ICONS
        .iter()
        .filter(|icon| category.map_or(true, |c| icon.category.eq_ignore_ascii_case(c)));

    let Some(needle) = needle else {
        return in_category.collect();
    };

    let (mut by_name, mut by_keyword) = (Vec::new(), Vec::new());
    for icon in in_category {
        if icon.name.contains(needle.as_str()) {
            by_name.push(icon);
        } else if icon.keywords.iter().any(|k| k.contains(needle.as_str())) {
            by_keyword.push(icon);
        }
    }
    by_name.append(&mut by_keyword);
    by_name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(icons: &[&Icon]) -> Vec<&'static str> {
        icons.iter().map(|i| i.name).collect()
    }

    #[test]
    fn empty_query_returns_everything() {
        assert_eq!(search(None, None).len(), ICONS.len());
        assert_eq!(search(Some("   "), None).len(), ICONS.len());
    }

    #[test]
    fn name_matches_rank_before_keywords() {
        let found = names(&search(Some("lock"), None));
        assert_eq!(found.first(), Some(&"lock"));

        let found = names(&search(Some("secure"), None));
        assert!(found.contains(&"shield"));
        assert!(found.contains(&"lock"));
    }

    #[test]
    fn category_filter_is_case_insensitive() {
        let found = search(None, Some("Security"));
        assert!(!found.is_empty());
        assert!(found.iter().all(|i| i.category == "security"));
        assert!(search(Some("mail"), Some("security")).is_empty());
    }

    #[test]
    fn categories_are_distinct() {
        let cats = categories();
        assert_eq!(cats.first(), Some(&"general"));
        let mut sorted = cats.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), cats.len());
    }

    #[test]
    fn icon_names_are_unique() {
        for (i, a) in ICONS.iter().enumerate() {
            assert!(ICONS.iter().skip(i + 1).all(|b| b.name != a.name), "duplicate icon {}", a.name);
        }
    }
}
