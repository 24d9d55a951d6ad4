//! Default food nutrition table.
//!
//! The table is immutable reference data keyed by lowercase food name.
//! Keys are kept in sorted order so lookups and planner filters always see
//! the same iteration order.

use crate::types::*;
use crate::config::CustomFood;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Cached default table - built once and reused by every analyzer
static DEFAULT_FOOD_TABLE: Lazy<FoodTable> = Lazy::new(build_default_food_table);

/// Get a reference to the cached default food table
pub fn default_food_table() -> &'static FoodTable {
    &DEFAULT_FOOD_TABLE
}

/// Read-only food nutrition table
#[derive(Clone, Debug, Default)]
pub struct FoodTable {
    entries: BTreeMap<String, FoodEntry>,
}

impl FoodTable {
    /// Build a table from entries, keyed by lowercase trimmed name
    pub fn from_entries(entries: impl IntoIterator<Item = FoodEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|e| (normalize_name(&e.name), e))
            .collect();
        Self { entries }
    }

    /// Exact lookup by normalized key
    pub fn get(&self, name: &str) -> Option<&FoodEntry> {
        self.entries.get(&normalize_name(name))
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = &FoodEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive lookup with substring fallback
    ///
    /// 1. Exact match on the trimmed, lowercased query.
    /// 2. Otherwise any key that contains the query or is contained in it.
    ///    The longest matching key wins; equal lengths resolve to the
    ///    first key in ascending order.
    pub fn find(&self, query: &str) -> Option<&FoodEntry> {
        let needle = normalize_name(query);
        if needle.is_empty() {
            tracing::warn!("Empty food query");
            return None;
        }

        if let Some(entry) = self.entries.get(&needle) {
            return Some(entry);
        }

        let mut best: Option<(&String, &FoodEntry)> = None;
        for (key, entry) in &self.entries {
            if !(key.contains(&needle) || needle.contains(key.as_str())) {
                continue;
            }
            // Strictly longer replaces; ties keep the earlier key
            if best.map_or(true, |(b, _)| key.len() > b.len()) {
                best = Some((key, entry));
            }
        }

        if let Some((key, _)) = best {
            tracing::debug!("Food query {:?} matched {:?} by substring", needle, key);
        }
        best.map(|(_, entry)| entry)
    }

    /// Merge user-defined foods over this table, replacing same-named entries
    pub fn with_custom(mut self, custom: &[CustomFood]) -> Result<Self> {
        for food in custom {
            let entry = food.to_entry();
            let key = normalize_name(&entry.name);
            if self.entries.insert(key.clone(), entry).is_some() {
                tracing::info!("Custom food {:?} overrides default entry", key);
            }
        }

        let errors = self.validate();
        if !errors.is_empty() {
            return Err(Error::FoodTable(errors.join("; ")));
        }
        Ok(self)
    }

    /// Validate the table for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (key, entry) in &self.entries {
            if key.is_empty() || entry.name.trim().is_empty() {
                errors.push("Food has empty name".to_string());
                continue;
            }
            if key != &normalize_name(&entry.name) {
                errors.push(format!(
                    "Food key '{}' doesn't match name '{}'",
                    key, entry.name
                ));
            }
            if entry.glycemic_index > 100 {
                errors.push(format!(
                    "Food '{}': glycemic index {} > 100",
                    key, entry.glycemic_index
                ));
            }
            if entry.carbs_per_100g < 0.0 || entry.carbs_per_100g > 100.0 {
                errors.push(format!(
                    "Food '{}': carbs {} outside 0-100 g per 100g",
                    key, entry.carbs_per_100g
                ));
            }
            if entry.fiber_per_100g < 0.0 {
                errors.push(format!("Food '{}': negative fiber", key));
            }
            if entry.fiber_per_100g > entry.carbs_per_100g {
                errors.push(format!(
                    "Food '{}': fiber {} exceeds carbs {}",
                    key, entry.fiber_per_100g, entry.carbs_per_100g
                ));
            }
        }

        errors
    }
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn food(
    name: &str,
    carbs_per_100g: f64,
    glycemic_index: u8,
    category: FoodCategory,
    fiber_per_100g: f64,
    safety: SafetyFlag,
    portion: &str,
) -> FoodEntry {
    FoodEntry {
        name: name.into(),
        carbs_per_100g,
        glycemic_index,
        category,
        fiber_per_100g,
        safety,
        portion: portion.into(),
    }
}

/// Builds the default table
///
/// **Note**: For production use, prefer `default_food_table()` which returns
/// a cached reference.
pub fn build_default_food_table() -> FoodTable {
    use FoodCategory::*;
    use SafetyFlag::*;

    FoodTable::from_entries([
        // Low GI vegetables
        food("broccoli", 6.0, 15, Vegetable, 2.6, Safe, "1 cup (91g)"),
        food("spinach", 3.0, 15, Vegetable, 2.2, Safe, "1 cup (30g)"),
        food("cauliflower", 5.0, 15, Vegetable, 2.1, Safe, "1 cup (107g)"),
        food("kale", 7.0, 15, Vegetable, 2.6, Safe, "1 cup (67g)"),
        food("cabbage", 5.0, 10, Vegetable, 2.2, Safe, "1 cup (89g)"),
        food("zucchini", 4.0, 15, Vegetable, 1.2, Safe, "1 cup (124g)"),
        food("mushrooms", 3.0, 15, Vegetable, 1.0, Safe, "1 cup (70g)"),
        food("bell peppers", 6.0, 15, Vegetable, 1.5, Safe, "1 cup (149g)"),
        // Proteins and dairy
        food("chicken breast", 0.0, 0, Protein, 0.0, Safe, "100g"),
        food("salmon", 0.0, 0, Protein, 0.0, Safe, "100g"),
        food("eggs", 1.0, 0, Protein, 0.0, Safe, "1 large (50g)"),
        food("tofu", 2.0, 15, Protein, 1.0, Safe, "100g"),
        food("greek yogurt", 4.0, 35, Dairy, 0.0, Safe, "100g"),
        food("cheese", 1.0, 0, Dairy, 0.0, Safe, "28g"),
        // Fats and nuts
        food("avocado", 9.0, 15, Fat, 7.0, Safe, "100g"),
        food("almonds", 6.0, 15, Nuts, 3.5, Safe, "28g"),
        food("walnuts", 4.0, 15, Nuts, 2.0, Safe, "28g"),
        food("olive oil", 0.0, 0, Fat, 0.0, Safe, "1 tbsp (14g)"),
        // Medium GI
        food("apple", 25.0, 36, Fruit, 4.4, Moderate, "1 medium (182g)"),
        food("orange", 21.0, 40, Fruit, 4.3, Moderate, "1 medium (131g)"),
        food("banana", 27.0, 51, Fruit, 3.1, Moderate, "1 medium (118g)"),
        food("sweet potato", 20.0, 54, Starch, 3.3, Moderate, "100g"),
        food("brown rice", 45.0, 55, Grain, 3.5, Moderate, "1 cup cooked (195g)"),
        food("oats", 66.0, 55, Grain, 10.1, Moderate, "100g dry"),
        food("quinoa", 39.0, 53, Grain, 5.2, Moderate, "1 cup cooked (185g)"),
        food("whole wheat bread", 49.0, 60, Grain, 6.9, Moderate, "2 slices (56g)"),
        // High GI
        food("white bread", 49.0, 75, Grain, 2.7, Unsafe, "2 slices (56g)"),
        food("white rice", 53.0, 73, Grain, 0.6, Unsafe, "1 cup cooked (186g)"),
        food("potato", 37.0, 78, Starch, 4.0, Unsafe, "1 medium (173g)"),
        food("sugar", 100.0, 100, Sweet, 0.0, Unsafe, "100g"),
        food("soda", 39.0, 90, Drink, 0.0, Unsafe, "1 can (355ml)"),
        food("cake", 57.0, 85, Sweet, 1.0, Unsafe, "100g"),
        food("cookies", 68.0, 80, Sweet, 2.0, Unsafe, "100g"),
        food("ice cream", 28.0, 65, Sweet, 0.0, Unsafe, "100g"),
        food("candy", 98.0, 95, Sweet, 0.0, Unsafe, "100g"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_loads() {
        let table = build_default_food_table();
        assert_eq!(table.len(), 35);
        assert!(table.get("Chicken Breast").is_some());
    }

    #[test]
    fn test_default_table_validates() {
        let errors = build_default_food_table().validate();
        assert!(
            errors.is_empty(),
            "Default food table has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_cached_table_matches_built() {
        assert_eq!(default_food_table().len(), build_default_food_table().len());
    }

    #[test]
    fn test_find_exact_is_case_insensitive() {
        let table = build_default_food_table();
        let entry = table.find("  SUGAR ").unwrap();
        assert_eq!(entry.name, "sugar");
    }

    #[test]
    fn test_find_prefers_longest_key() {
        let table = build_default_food_table();
        assert_eq!(table.find("white rice pudding").unwrap().name, "white rice");
        // "bread" is inside "white bread" and "whole wheat bread"
        assert_eq!(table.find("bread").unwrap().name, "whole wheat bread");
    }

    #[test]
    fn test_find_breaks_length_ties_by_key_order() {
        let table = build_default_food_table();
        // "brown rice" and "white rice" have the same length
        assert_eq!(table.find("rice").unwrap().name, "brown rice");
    }

    #[test]
    fn test_find_query_containing_key() {
        let table = build_default_food_table();
        assert_eq!(table.find("grilled salmon fillet").unwrap().name, "salmon");
    }

    #[test]
    fn test_find_unknown_and_empty() {
        let table = build_default_food_table();
        assert!(table.find("nonexistent-food-xyz").is_none());
        assert!(table.find("   ").is_none());
    }

    #[test]
    fn test_validate_catches_bad_entries() {
        let table = FoodTable::from_entries([food(
            "mystery",
            10.0,
            120,
            FoodCategory::Sweet,
            12.0,
            SafetyFlag::Unsafe,
            "100g",
        )]);
        let errors = table.validate();
        assert_eq!(errors.len(), 2);
    }
}
