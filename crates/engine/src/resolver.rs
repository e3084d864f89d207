//! Category Resolver — maps arbitrary category names to canonical parents.
//!
//! Resolution is a two-step pure function over an **ordered** rule table:
//! exact match on the normalized name first, then the first rule whose
//! pattern appears anywhere inside the name. Declaration order is the
//! tie-break contract: when two patterns could both match ("gas bill" and
//! "gas"), whichever is declared first wins, so multi-word phrases are
//! declared before the stems they contain.
//!
//! Unresolvable names are never an error — they fall back to "Other".

use std::collections::HashMap;

use smartspend_core::FALLBACK_CATEGORY;

/// A single (pattern, parent) resolution rule. Patterns are lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub pattern: String,
    pub parent: String,
}

impl KeywordRule {
    pub fn new(pattern: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into().to_lowercase(),
            parent: parent.into(),
        }
    }
}

/// The ordered keyword table backing the resolver.
///
/// Immutable after construction. The rule list is the priority order;
/// the exact-match index is a lookup shortcut over the same rules (first
/// declaration of a pattern wins there too).
#[derive(Debug, Clone)]
pub struct KeywordTable {
    rules: Vec<KeywordRule>,
    exact: HashMap<String, usize>,
}

impl KeywordTable {
    /// Build a table from an ordered rule list.
    pub fn from_rules(rules: Vec<KeywordRule>) -> Self {
        let mut exact = HashMap::with_capacity(rules.len());
        for (i, rule) in rules.iter().enumerate() {
            exact.entry(rule.pattern.clone()).or_insert(i);
        }
        Self { rules, exact }
    }

    /// The built-in rule table.
    pub fn with_default_rules() -> Self {
        Self::from_rules(default_rules())
    }

    /// Prepend caller-supplied rules; they take priority over the built-ins.
    pub fn with_overrides(self, overrides: Vec<KeywordRule>) -> Self {
        let mut rules = overrides;
        rules.extend(self.rules);
        Self::from_rules(rules)
    }

    /// Resolve a category name to its canonical parent.
    ///
    /// Case-folded and trimmed; empty input resolves to the fallback
    /// parent. Deterministic and side-effect free.
    pub fn resolve(&self, name: &str) -> &str {
        let normalized = name.trim().to_lowercase();
        if normalized.is_empty() {
            return FALLBACK_CATEGORY;
        }

        if let Some(&i) = self.exact.get(&normalized) {
            return &self.rules[i].parent;
        }

        for rule in &self.rules {
            if normalized.contains(&rule.pattern) {
                return &rule.parent;
            }
        }

        FALLBACK_CATEGORY
    }

    /// The rules, in priority order.
    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

/// The built-in (pattern, parent) rules, in priority order.
///
/// The leading block holds multi-word phrases that contain a stem declared
/// further down under a *different* parent — they must come first or the
/// stem would shadow them ("gas bill" is Utilities, "gas" alone is fuel).
fn default_rules() -> Vec<KeywordRule> {
    let r = KeywordRule::new;
    vec![
        // Overlapping phrases — most specific first.
        r("gas bill", "Utilities"),
        r("property tax", "Housing"),
        r("home repair", "Housing"),
        r("school fees", "Education"),
        r("school fee", "Education"),
        r("rainy day", "Emergency"),
        r("eating out", "Food"),
        r("eat out", "Food"),
        // Food
        r("food", "Food"),
        r("groceries", "Food"),
        r("grocery", "Food"),
        r("supermarket", "Food"),
        r("restaurant", "Food"),
        r("dining", "Food"),
        r("snack", "Food"),
        r("coffee", "Food"),
        r("tea", "Food"),
        r("bakery", "Food"),
        r("lunch", "Food"),
        r("dinner", "Food"),
        // Transport ("transport" stays ahead of Entertainment's "sport")
        r("transport", "Transport"),
        r("fuel", "Transport"),
        r("petrol", "Transport"),
        r("diesel", "Transport"),
        r("gas", "Transport"),
        r("taxi", "Transport"),
        r("uber", "Transport"),
        r("pickme", "Transport"),
        r("bus", "Transport"),
        r("train", "Transport"),
        r("parking", "Transport"),
        r("toll", "Transport"),
        // Housing
        r("rent", "Housing"),
        r("lease", "Housing"),
        r("mortgage", "Housing"),
        r("housing", "Housing"),
        r("apartment", "Housing"),
        r("furniture", "Housing"),
        r("repairs", "Housing"),
        r("maintenance", "Housing"),
        // Utilities
        r("utilities", "Utilities"),
        r("utility", "Utilities"),
        r("electricity", "Utilities"),
        r("power", "Utilities"),
        r("water", "Utilities"),
        r("internet", "Utilities"),
        r("wifi", "Utilities"),
        r("broadband", "Utilities"),
        r("phone", "Utilities"),
        r("mobile", "Utilities"),
        r("data", "Utilities"),
        r("sewer", "Utilities"),
        r("trash", "Utilities"),
        // Entertainment
        r("entertainment", "Entertainment"),
        r("movie", "Entertainment"),
        r("cinema", "Entertainment"),
        r("netflix", "Entertainment"),
        r("spotify", "Entertainment"),
        r("youtube", "Entertainment"),
        r("stream", "Entertainment"),
        r("streaming", "Entertainment"),
        r("games", "Entertainment"),
        r("gaming", "Entertainment"),
        r("hobby", "Entertainment"),
        r("gifts", "Entertainment"),
        r("party", "Entertainment"),
        r("shopping", "Entertainment"),
        r("apparel", "Entertainment"),
        r("clothes", "Entertainment"),
        r("clothing", "Entertainment"),
        r("subscriptions", "Entertainment"),
        r("subscription", "Entertainment"),
        r("gym", "Entertainment"),
        r("fitness", "Entertainment"),
        r("sport", "Entertainment"),
        r("sports", "Entertainment"),
        r("salon", "Entertainment"),
        // Savings
        r("savings", "Savings"),
        r("save", "Savings"),
        r("investment", "Savings"),
        r("invest", "Savings"),
        r("retirement", "Savings"),
        r("pf", "Savings"),
        r("fd", "Savings"),
        // Healthcare ("insur" is a stem: insurance, insurer, insured)
        r("health", "Healthcare"),
        r("healthcare", "Healthcare"),
        r("medical", "Healthcare"),
        r("medicine", "Healthcare"),
        r("pharmacy", "Healthcare"),
        r("doctor", "Healthcare"),
        r("hospital", "Healthcare"),
        r("clinic", "Healthcare"),
        r("dental", "Healthcare"),
        r("dentist", "Healthcare"),
        r("vision", "Healthcare"),
        r("insur", "Healthcare"),
        // Education
        r("education", "Education"),
        r("school", "Education"),
        r("fees", "Education"),
        r("tuition", "Education"),
        r("course", "Education"),
        r("class", "Education"),
        r("classes", "Education"),
        r("lesson", "Education"),
        r("lessons", "Education"),
        r("stationery", "Education"),
        r("books", "Education"),
        // Emergency
        r("emergency", "Emergency"),
        r("buffer", "Emergency"),
        // Other (named fallback groups)
        r("pet", "Other"),
        r("pets", "Other"),
        r("charity", "Other"),
        r("donation", "Other"),
        r("travel", "Other"),
        r("vacation", "Other"),
        r("flight", "Other"),
        r("hotel", "Other"),
    ]
}
