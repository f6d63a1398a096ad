use std::sync::Arc;

use serde::Serialize;
use shared::{
    domain::{CaffeineLevel, Category, MenuItem},
    protocol::SelectedMenu,
};

/// Recommended daily sugar limit in grams.
pub const DAILY_SUGAR_LIMIT_G: f64 = 24.0;

/// Sugar amount that fills the sugar gauge.
pub const SUGAR_GAUGE_FULL_G: f64 = 50.0;

/// Last settled item per category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    slots: [Option<Arc<MenuItem>>; 3],
    settled_this_cycle: [bool; 3],
}

impl SelectionState {
    pub fn get(&self, category: Category) -> Option<&Arc<MenuItem>> {
        self.slots[category.index()].as_ref()
    }

    pub fn record(&mut self, category: Category, item: Arc<MenuItem>) {
        self.slots[category.index()] = Some(item);
        self.settled_this_cycle[category.index()] = true;
    }

    /// Forgets which categories settled; the slots keep their items until the
    /// wheels overwrite them.
    pub fn begin_cycle(&mut self) {
        self.settled_this_cycle = [false; 3];
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn is_ready(&self) -> bool {
        self.is_complete() && self.settled_this_cycle.iter().all(|settled| *settled)
    }

    pub fn selected_menu(&self) -> Option<SelectedMenu> {
        let [main_dish, snack, drink] = &self.slots;
        Some(SelectedMenu {
            main_dish: Arc::clone(main_dish.as_ref()?),
            snack: Arc::clone(snack.as_ref()?),
            drink: Arc::clone(drink.as_ref()?),
        })
    }

    pub fn totals(&self) -> MealTotals {
        let mut totals = MealTotals::default();
        for category in Category::ALL {
            let Some(item) = self.get(category) else {
                continue;
            };
            totals.calories_kcal += item.calories_kcal;
            totals.sugar_g += item.sugar_g;
            if item.calories_kcal > 0.0 {
                totals.breakdown.push(CalorieShare {
                    category,
                    calories_kcal: item.calories_kcal,
                });
            }
            totals.peak_caffeine = totals.peak_caffeine.max(Some(item.caffeine_level));
        }
        totals
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalorieShare {
    pub category: Category,
    pub calories_kcal: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MealTotals {
    pub calories_kcal: f64,
    pub sugar_g: f64,
    /// Calories per category, zero entries omitted.
    pub breakdown: Vec<CalorieShare>,
    pub peak_caffeine: Option<CaffeineLevel>,
}

impl MealTotals {
    pub fn exceeds_sugar_limit(&self) -> bool {
        self.sugar_g > DAILY_SUGAR_LIMIT_G
    }

    /// Fill of the sugar gauge, capped at 1.0.
    pub fn sugar_gauge_fill(&self) -> f64 {
        (self.sugar_g / SUGAR_GAUGE_FULL_G).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::TypeTag;

    use super::*;

    fn item(id: &str, calories: f64, sugar: f64, caffeine: CaffeineLevel) -> Arc<MenuItem> {
        Arc::new(MenuItem {
            id: id.into(),
            name_th: id.into(),
            name_en: id.into(),
            description_th: String::new(),
            calories_kcal: calories,
            protein_g: 0.0,
            fat_g: 0.0,
            carb_g: 0.0,
            sugar_g: sugar,
            fiber_g: 0.0,
            caffeine_level: caffeine,
            health_score: 5,
            type_tag: TypeTag::Normal,
        })
    }

    #[test]
    fn record_leaves_other_slots_alone() {
        let mut state = SelectionState::default();
        state.record(Category::Snack, item("s", 1.0, 0.0, CaffeineLevel::None));
        state.record(Category::Drink, item("d", 1.0, 0.0, CaffeineLevel::None));
        state.record(Category::Snack, item("s2", 1.0, 0.0, CaffeineLevel::None));

        assert!(state.get(Category::MainDish).is_none());
        assert_eq!(state.get(Category::Snack).map(|i| i.id.as_str()), Some("s2"));
        assert_eq!(state.get(Category::Drink).map(|i| i.id.as_str()), Some("d"));
        assert!(!state.is_complete());
        assert!(state.selected_menu().is_none());
    }

    #[test]
    fn readiness_needs_a_settle_per_category_since_cycle_start() {
        let mut state = SelectionState::default();
        for category in Category::ALL {
            state.record(category, item(category.as_str(), 1.0, 0.0, CaffeineLevel::None));
        }
        assert!(state.is_ready());

        state.begin_cycle();
        assert!(state.is_complete(), "slots survive a new cycle");
        assert!(!state.is_ready());

        state.record(Category::MainDish, item("m2", 1.0, 0.0, CaffeineLevel::None));
        state.record(Category::Drink, item("d2", 1.0, 0.0, CaffeineLevel::None));
        assert!(!state.is_ready(), "snack has not settled this cycle");

        state.record(Category::Snack, item("s2", 1.0, 0.0, CaffeineLevel::None));
        assert!(state.is_ready());
        let menu = state.selected_menu().expect("complete");
        assert_eq!(menu.main_dish.id, "m2");
    }

    #[test]
    fn totals_sum_the_meal_and_skip_zero_calorie_shares() {
        let mut state = SelectionState::default();
        state.record(Category::MainDish, item("m", 550.0, 5.0, CaffeineLevel::None));
        state.record(Category::Snack, item("s", 60.0, 10.0, CaffeineLevel::Low));
        state.record(Category::Drink, item("d", 0.0, 12.0, CaffeineLevel::High));

        let totals = state.totals();
        assert_eq!(totals.calories_kcal, 610.0);
        assert_eq!(totals.sugar_g, 27.0);
        assert!(totals.exceeds_sugar_limit());
        assert_eq!(totals.sugar_gauge_fill(), 0.54);
        assert_eq!(totals.breakdown.len(), 2);
        assert_eq!(totals.peak_caffeine, Some(CaffeineLevel::High));
    }

    #[test]
    fn sugar_gauge_caps_at_full() {
        let mut state = SelectionState::default();
        state.record(Category::Drink, item("d", 200.0, 80.0, CaffeineLevel::None));
        assert_eq!(state.totals().sugar_gauge_fill(), 1.0);
    }
}
