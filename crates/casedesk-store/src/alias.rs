use std::collections::HashMap;

use casedesk_core::normalize_text;

use crate::dataset::AliasTable;

/// Reverse lookup from any normalized alias to its canonical spelling.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    reverse: HashMap<String, HashMap<String, String>>,
}

impl AliasResolver {
    pub fn build(table: &AliasTable) -> Self {
        let mut reverse = HashMap::with_capacity(table.len());
        for (category, mapping) in table {
            let mut rev: HashMap<String, String> = HashMap::new();
            for (canonical, aliases) in mapping {
                for alias in aliases {
                    rev.insert(normalize_text(alias), canonical.clone());
                }
            }
            // Canonical spellings win over colliding aliases, keeping
            // canonicalize idempotent.
            for canonical in mapping.keys() {
                rev.insert(normalize_text(canonical), canonical.clone());
            }
            reverse.insert(category.clone(), rev);
        }
        Self { reverse }
    }

    /// Canonical form of `value`, or `value` itself when the category or the
    /// alias is unknown.
    pub fn canonicalize<'a>(&'a self, category: &str, value: &'a str) -> &'a str {
        self.reverse
            .get(category)
            .and_then(|rev| rev.get(&normalize_text(value)))
            .map_or(value, String::as_str)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.reverse.keys().map(String::as_str)
    }

    pub fn alias_count(&self, category: &str) -> usize {
        self.reverse.get(category).map_or(0, HashMap::len)
    }
}
