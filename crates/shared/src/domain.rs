use std::{fmt, sync::Arc};

use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MainDish,
    Snack,
    Drink,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::MainDish, Category::Snack, Category::Drink];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::MainDish => "main_dish",
            Category::Snack => "snack",
            Category::Drink => "drink",
        }
    }

    pub fn label_th(self) -> &'static str {
        match self {
            Category::MainDish => "จานหลัก",
            Category::Snack => "ของว่าง",
            Category::Drink => "เครื่องดื่ม",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Category::MainDish => 0,
            Category::Snack => 1,
            Category::Drink => 2,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaffeineLevel {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Healthy,
    Normal,
    HighCalorie,
    LowCarb,
    HighProtein,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthBand {
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name_th: String,
    pub name_en: String,
    pub description_th: String,
    pub calories_kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carb_g: f64,
    pub sugar_g: f64,
    pub fiber_g: f64,
    pub caffeine_level: CaffeineLevel,
    #[serde(deserialize_with = "rounded_score")]
    pub health_score: u8,
    pub type_tag: TypeTag,
}

/// Accepts integral or fractional scores from generated documents, rounding
/// to the nearest integer. Non-finite or out-of-range values are rejected.
pub(crate) fn rounded_score<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(de::Error::custom("score must be a finite number"));
    }
    T::try_from(raw.round() as i64)
        .map_err(|_| de::Error::custom(format!("score {raw} is out of range")))
}

impl MenuItem {
    pub fn health_band(&self) -> HealthBand {
        if self.health_score >= 8 {
            HealthBand::Good
        } else if self.health_score >= 5 {
            HealthBand::Fair
        } else {
            HealthBand::Poor
        }
    }
}

/// The three category lists of a menu. Any key other than the three categories
/// rejects the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuCategories {
    pub main_dish: Vec<Arc<MenuItem>>,
    pub snack: Vec<Arc<MenuItem>>,
    pub drink: Vec<Arc<MenuItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuDatabase {
    pub version: String,
    pub categories: MenuCategories,
}

impl MenuDatabase {
    pub fn items(&self, category: Category) -> &[Arc<MenuItem>] {
        match category {
            Category::MainDish => &self.categories.main_dish,
            Category::Snack => &self.categories.snack,
            Category::Drink => &self.categories.drink,
        }
    }

    pub fn total_items(&self) -> usize {
        Category::ALL.iter().map(|c| self.items(*c).len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    WeightLoss,
    Maintain,
    MuscleGain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: u32,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub goal: Goal,
    pub has_diabetes: bool,
    pub has_hypertension: bool,
    pub sensitive_to_caffeine: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            age: 25,
            gender: Gender::Female,
            weight_kg: 60.0,
            height_cm: 165.0,
            goal: Goal::Maintain,
            has_diabetes: false,
            has_hypertension: false,
            sensitive_to_caffeine: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiButtons {
    pub spin_now: String,
    pub spin_all: String,
    pub save_meal: String,
    pub see_stats: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiMessages {
    pub daily_success: Vec<String>,
    pub low_sugar_reward: Vec<String>,
    pub high_caffeine_warning: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiContent {
    pub buttons: UiButtons,
    pub messages: UiMessages,
}
