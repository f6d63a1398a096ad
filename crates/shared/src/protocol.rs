use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{rounded_score, CaffeineLevel, Category, MenuItem, UserProfile};

/// The three settled items of one meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedMenu {
    pub main_dish: Arc<MenuItem>,
    pub snack: Arc<MenuItem>,
    pub drink: Arc<MenuItem>,
}

/// Minified menu item sent as comparison context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAlternative {
    pub name_th: String,
    pub calories_kcal: f64,
    pub sugar_g: f64,
    pub caffeine_level: CaffeineLevel,
    #[serde(deserialize_with = "rounded_score")]
    pub health_score: u8,
}

impl From<&MenuItem> for CandidateAlternative {
    fn from(item: &MenuItem) -> Self {
        Self {
            name_th: item.name_th.clone(),
            calories_kcal: item.calories_kcal,
            sugar_g: item.sugar_g,
            caffeine_level: item.caffeine_level,
            health_score: item.health_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    pub user_profile: UserProfile,
    pub selected_menu: SelectedMenu,
    pub candidate_alternatives: Vec<CandidateAlternative>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAlternative {
    pub from_category: Category,
    pub name_th: String,
    pub reason_th: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Good,
    Fair,
    Caution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorResponse {
    pub summary_th: String,
    pub evaluation_th: String,
    pub risk_factors_th: Vec<String>,
    pub advice_th: String,
    #[serde(deserialize_with = "rounded_score")]
    pub health_score_overall: i64,
    pub suggested_alternatives: Vec<SuggestedAlternative>,
}

impl AdvisorResponse {
    /// Reads the verdict out of the evaluation text ("ดี", "พอใช้", "ควรระวัง").
    pub fn verdict(&self) -> Verdict {
        if self.evaluation_th.contains("ดี") {
            Verdict::Good
        } else if self.evaluation_th.contains("ระวัง") {
            Verdict::Caution
        } else {
            Verdict::Fair
        }
    }
}
