//! Illustrative weekly meal planning from the food table.
//!
//! Picks are uniform random draws from low-GI subsets of the table. There is
//! no optimization and no guarantee of variety across days.
//!
//! Snacks are drawn from foods with GI <= 40 and 0 < carbs <= 15 g per 100g.
//! Zero-carb foods (cheese, meat, fish, oils) never appear as snacks: they
//! would fit any remaining budget and fill the list without ever consuming it.
//!
//! Days serialize and display with full English names ("Monday").

use crate::foods::FoodTable;
use crate::noise::NoiseSource;
use crate::{ActivityLevel, FoodCategory, FoodEntry, SafetyFlag, UserProfile};
use chrono::Weekday;
use serde::{Deserialize, Serialize};

const BASE_CARBS_PER_MEAL: f64 = 45.0;
const MEAL_GI_LIMIT: u8 = 55;
const SNACK_GI_LIMIT: u8 = 40;
const SNACK_CARB_LIMIT: f64 = 15.0;
const SNACK_STOP_MARGIN: f64 = 5.0;
const MAX_SNACK_DRAWS: usize = 32;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealSlot {
    /// Share of the daily carb target
    pub fn carb_share(self) -> f64 {
        match self {
            MealSlot::Breakfast => 0.25,
            MealSlot::Lunch => 0.35,
            MealSlot::Dinner => 0.30,
            MealSlot::Snacks => 0.10,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    pub protein: String,
    pub carb_source: String,
    pub vegetables: [String; 2],
    pub carb_target: f64,
    /// Sum of per-100g carbs of the picked foods
    pub estimated_carbs: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SnackPlan {
    pub items: Vec<String>,
    pub carb_target: f64,
    pub estimated_carbs: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DayPlan {
    #[serde(with = "full_day_name")]
    pub day: Weekday,
    pub breakfast: Meal,
    pub lunch: Meal,
    pub dinner: Meal,
    pub snacks: SnackPlan,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeeklyDietPlan {
    pub daily_carb_target: f64,
    pub days: Vec<DayPlan>,
}

/// Full English name of a weekday
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

mod full_day_name {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(super::day_name(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Habitual activity multiplier on the carb target
pub fn activity_factor(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 0.9,
        ActivityLevel::Light => 1.0,
        ActivityLevel::Moderate => 1.1,
        ActivityLevel::Active => 1.2,
        ActivityLevel::Athlete => 1.3,
    }
}

/// Daily carbs in grams for three main meals, scaled by weight and activity
pub fn daily_carb_target(profile: &UserProfile) -> f64 {
    let weight_factor = profile.weight_kg / 70.0;
    (BASE_CARBS_PER_MEAL * weight_factor * activity_factor(profile.activity) * 3.0).round()
}

/// Food pools the planner draws from, in table order
struct Pools<'a> {
    proteins: Vec<&'a FoodEntry>,
    carb_sources: Vec<&'a FoodEntry>,
    vegetables: Vec<&'a FoodEntry>,
    snacks: Vec<&'a FoodEntry>,
}

impl<'a> Pools<'a> {
    fn from_table(table: &'a FoodTable) -> Self {
        let low_gi: Vec<&FoodEntry> = table
            .iter()
            .filter(|f| f.glycemic_index <= MEAL_GI_LIMIT && f.safety == SafetyFlag::Safe)
            .collect();

        let proteins = low_gi
            .iter()
            .copied()
            .filter(|f| f.category == FoodCategory::Protein)
            .collect();
        let carb_sources = low_gi
            .iter()
            .copied()
            .filter(|f| f.carbs_per_100g > 5.0 && f.carbs_per_100g <= 25.0)
            .collect();
        let vegetables = low_gi
            .iter()
            .copied()
            .filter(|f| f.category == FoodCategory::Vegetable)
            .collect();
        let snacks = table
            .iter()
            .filter(|f| {
                f.glycemic_index <= SNACK_GI_LIMIT
                    && f.carbs_per_100g > 0.0
                    && f.carbs_per_100g <= SNACK_CARB_LIMIT
            })
            .collect();

        Self {
            proteins,
            carb_sources,
            vegetables,
            snacks,
        }
    }

    fn missing(&self) -> Option<&'static str> {
        if self.proteins.is_empty() {
            Some("protein")
        } else if self.carb_sources.is_empty() {
            Some("carb source")
        } else if self.vegetables.is_empty() {
            Some("vegetable")
        } else {
            None
        }
    }
}

fn draw<'a, N: NoiseSource + ?Sized>(pool: &[&'a FoodEntry], noise: &mut N) -> &'a FoodEntry {
    pool[noise.pick(pool.len())]
}

fn generate_meal<N: NoiseSource + ?Sized>(pools: &Pools<'_>, carb_target: f64, noise: &mut N) -> Meal {
    let protein = draw(&pools.proteins, noise);
    let carb_source = draw(&pools.carb_sources, noise);
    let veg1 = draw(&pools.vegetables, noise);
    let veg2 = draw(&pools.vegetables, noise);

    let estimated = protein.carbs_per_100g
        + carb_source.carbs_per_100g
        + veg1.carbs_per_100g
        + veg2.carbs_per_100g;

    Meal {
        protein: protein.name.clone(),
        carb_source: carb_source.name.clone(),
        vegetables: [veg1.name.clone(), veg2.name.clone()],
        carb_target: (carb_target * 10.0).round() / 10.0,
        estimated_carbs: (estimated * 100.0).round() / 100.0,
    }
}

/// Greedy random fill: a draw is kept only if it fits the remaining budget
fn generate_snacks<N: NoiseSource + ?Sized>(pools: &Pools<'_>, carb_target: f64, noise: &mut N) -> SnackPlan {
    let mut items = Vec::new();
    let mut remaining = carb_target;
    let mut draws = 0;

    while remaining > SNACK_STOP_MARGIN && !pools.snacks.is_empty() && draws < MAX_SNACK_DRAWS {
        draws += 1;
        let snack = draw(&pools.snacks, noise);
        if snack.carbs_per_100g <= remaining {
            items.push(snack.name.clone());
            remaining -= snack.carbs_per_100g;
        }
    }

    SnackPlan {
        items,
        carb_target: (carb_target * 10.0).round() / 10.0,
        estimated_carbs: ((carb_target - remaining) * 10.0).round() / 10.0,
    }
}

/// Build seven day plans with breakfast, lunch, dinner and snacks
///
/// Returns `None` when the table lacks a protein, carb source or vegetable
/// in the low-GI pool (never the case for the default table).
pub fn generate_weekly_diet_plan<N: NoiseSource + ?Sized>(
    table: &FoodTable,
    profile: &UserProfile,
    noise: &mut N,
) -> Option<WeeklyDietPlan> {
    let pools = Pools::from_table(table);
    if let Some(missing) = pools.missing() {
        tracing::warn!("Cannot plan meals: no low-GI {} in food table", missing);
        return None;
    }

    let daily = daily_carb_target(profile);
    tracing::debug!("Planning week around {}g carbs per day", daily);

    let days = WEEK
        .iter()
        .map(|&day| DayPlan {
            day,
            breakfast: generate_meal(&pools, daily * MealSlot::Breakfast.carb_share(), noise),
            lunch: generate_meal(&pools, daily * MealSlot::Lunch.carb_share(), noise),
            dinner: generate_meal(&pools, daily * MealSlot::Dinner.carb_share(), noise),
            snacks: generate_snacks(&pools, daily * MealSlot::Snacks.carb_share(), noise),
        })
        .collect();

    Some(WeeklyDietPlan {
        daily_carb_target: daily,
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::build_default_food_table;
    use crate::noise::{FixedNoise, RandomNoise};
    use crate::DiabetesType;

    fn profile(weight_kg: f64, activity: ActivityLevel) -> UserProfile {
        UserProfile {
            age: 45,
            weight_kg,
            height_cm: 172,
            diabetes_type: DiabetesType::Type2,
            activity,
            hba1c: Some(7.4),
            current_bg: 150,
            sleep_hours: None,
            stress_level: None,
        }
    }

    #[test]
    fn test_daily_carb_target() {
        assert_eq!(daily_carb_target(&profile(70.0, ActivityLevel::Light)), 135.0);
        // 45 * 1.1 * 3 = 148.5
        assert_eq!(daily_carb_target(&profile(70.0, ActivityLevel::Moderate)), 149.0);
        assert_eq!(daily_carb_target(&profile(140.0, ActivityLevel::Sedentary)), 243.0);
    }

    #[test]
    fn test_week_has_seven_days_of_four_slots() {
        let table = build_default_food_table();
        let plan = generate_weekly_diet_plan(
            &table,
            &profile(80.0, ActivityLevel::Active),
            &mut RandomNoise::seeded(17),
        )
        .unwrap();

        assert_eq!(plan.days.len(), 7);
        assert_eq!(plan.days[0].day, Weekday::Mon);
        assert_eq!(plan.days[6].day, Weekday::Sun);

        for day in &plan.days {
            for meal in [&day.breakfast, &day.lunch, &day.dinner] {
                assert!(table.get(&meal.protein).is_some());
                assert!(table.get(&meal.carb_source).is_some());
                for veg in &meal.vegetables {
                    assert_eq!(table.get(veg).unwrap().category, FoodCategory::Vegetable);
                }
            }
            for item in &day.snacks.items {
                assert!(table.get(item).is_some());
            }
        }
    }

    #[test]
    fn test_meal_picks_respect_filters() {
        let table = build_default_food_table();
        let mut noise = RandomNoise::seeded(8);
        for _ in 0..20 {
            let plan =
                generate_weekly_diet_plan(&table, &profile(70.0, ActivityLevel::Light), &mut noise)
                    .unwrap();
            for day in &plan.days {
                let protein = table.get(&day.lunch.protein).unwrap();
                assert_eq!(protein.category, FoodCategory::Protein);
                assert!(protein.glycemic_index <= 55);

                let carb = table.get(&day.lunch.carb_source).unwrap();
                assert!(carb.carbs_per_100g > 5.0 && carb.carbs_per_100g <= 25.0);
                assert_eq!(carb.safety, SafetyFlag::Safe);
            }
        }
    }

    #[test]
    fn test_snacks_stay_within_budget() {
        let table = build_default_food_table();
        let mut noise = RandomNoise::seeded(21);
        let plan =
            generate_weekly_diet_plan(&table, &profile(90.0, ActivityLevel::Athlete), &mut noise)
                .unwrap();

        for day in &plan.days {
            assert!(day.snacks.estimated_carbs <= day.snacks.carb_target + 1e-9);
            let total: f64 = day
                .snacks
                .items
                .iter()
                .map(|name| table.get(name).unwrap().carbs_per_100g)
                .sum();
            assert!((total - day.snacks.estimated_carbs).abs() < 0.1);
        }
    }

    #[test]
    fn test_fixed_noise_plan_terminates_and_repeats() {
        let table = build_default_food_table();
        let plan = generate_weekly_diet_plan(
            &table,
            &profile(70.0, ActivityLevel::Moderate),
            &mut FixedNoise(0.0),
        )
        .unwrap();

        // Same draw every time gives identical days
        assert!(plan.days.iter().all(|d| d.lunch == plan.days[0].lunch));
        // Pools are in key order: first protein is chicken breast
        assert_eq!(plan.days[0].breakfast.protein, "chicken breast");
    }

    #[test]
    fn test_table_without_proteins_cannot_plan() {
        let table = crate::foods::FoodTable::from_entries(
            build_default_food_table()
                .iter()
                .filter(|f| f.category != FoodCategory::Protein)
                .cloned(),
        );
        let plan = generate_weekly_diet_plan(
            &table,
            &profile(70.0, ActivityLevel::Light),
            &mut FixedNoise::silent(),
        );
        assert!(plan.is_none());
    }

    #[test]
    fn test_zero_carb_foods_are_not_snacks() {
        let table = build_default_food_table();
        let pools = Pools::from_table(&table);

        assert!(!pools.snacks.is_empty());
        for snack in &pools.snacks {
            assert!(snack.carbs_per_100g > 0.0, "{} has no carbs", snack.name);
            assert!(snack.carbs_per_100g <= 15.0);
            assert!(snack.glycemic_index <= 40);
        }
        assert!(pools.snacks.iter().all(|f| f.name != "chicken breast"));
    }

    #[test]
    fn test_days_serialize_with_full_names() {
        let table = build_default_food_table();
        let plan = generate_weekly_diet_plan(
            &table,
            &profile(70.0, ActivityLevel::Light),
            &mut RandomNoise::seeded(3),
        )
        .unwrap();

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["days"][0]["day"], "Monday");
        assert_eq!(json["days"][6]["day"], "Sunday");

        let parsed: WeeklyDietPlan = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, plan);
        assert_eq!(day_name(Weekday::Wed), "Wednesday");
    }
}
