use std::sync::Arc;

use shared::{
    domain::{Category, MenuDatabase, UserProfile},
    protocol::{AdvisorResponse, AdvisoryRequest, CandidateAlternative, SelectedMenu},
};
use tracing::{error, info, warn};

use crate::{
    error::GenerationError,
    generative::{GenerationRequest, GenerativeBackend},
    prompts, provider,
};

const ADVISOR_TEMPERATURE: f32 = 0.5;

/// How many items from the front of each category are sent as alternatives.
pub const ALTERNATIVES_PER_CATEGORY: [(Category, usize); 3] = [
    (Category::MainDish, 3),
    (Category::Snack, 2),
    (Category::Drink, 2),
];

/// Advisory lifecycle held by the session:
/// `Idle -> Requesting -> {Resolved, Failed}`, back to `Idle` on a new spin.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AdvisorPhase {
    #[default]
    Idle,
    Requesting,
    Resolved(AdvisorResponse),
    Failed,
}

impl AdvisorPhase {
    pub fn is_requesting(&self) -> bool {
        matches!(self, AdvisorPhase::Requesting)
    }

    pub fn response(&self) -> Option<&AdvisorResponse> {
        match self {
            AdvisorPhase::Resolved(response) => Some(response),
            _ => None,
        }
    }
}

pub fn candidate_alternatives(db: &MenuDatabase) -> Vec<CandidateAlternative> {
    ALTERNATIVES_PER_CATEGORY
        .iter()
        .flat_map(|(category, take)| db.items(*category).iter().take(*take))
        .map(|item| CandidateAlternative::from(item.as_ref()))
        .collect()
}

pub fn build_request(
    profile: &UserProfile,
    selected: &SelectedMenu,
    db: &MenuDatabase,
) -> AdvisoryRequest {
    AdvisoryRequest {
        user_profile: profile.clone(),
        selected_menu: selected.clone(),
        candidate_alternatives: candidate_alternatives(db),
    }
}

/// Sends one meal to the advisory service. Holds no state of its own and never
/// retries; mutual exclusion is the caller's job.
#[derive(Clone)]
pub struct AdvisoryRequestor {
    backend: Option<Arc<dyn GenerativeBackend>>,
}

impl AdvisoryRequestor {
    pub fn new(backend: Option<Arc<dyn GenerativeBackend>>) -> Self {
        Self { backend }
    }

    pub async fn request(
        &self,
        profile: &UserProfile,
        selected: &SelectedMenu,
        db: &MenuDatabase,
    ) -> Option<AdvisorResponse> {
        let payload = build_request(profile, selected, db);
        match self.try_request(&payload).await {
            Ok(response) => {
                info!(
                    score = response.health_score_overall,
                    alternatives = response.suggested_alternatives.len(),
                    "advisory analysis received"
                );
                Some(response)
            }
            Err(GenerationError::MissingCredentials) => {
                warn!("no generative client; meal stays unanalyzed");
                None
            }
            Err(err) => {
                error!(error = %err, "analysis failed");
                None
            }
        }
    }

    async fn try_request(
        &self,
        payload: &AdvisoryRequest,
    ) -> Result<AdvisorResponse, GenerationError> {
        let request = GenerationRequest::new(serde_json::to_string(payload)?)
            .with_system_instruction(prompts::ADVISOR_SYSTEM)
            .with_temperature(ADVISOR_TEMPERATURE);
        provider::generate_json(self.backend.as_deref(), request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use shared::protocol::SuggestedAlternative;

    use super::*;
    use crate::fallback;

    struct FixedBackend {
        reply: Option<String>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl GenerativeBackend for FixedBackend {
        async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
            self.seen.lock().expect("lock").push(request);
            self.reply.clone().ok_or(GenerationError::EmptyResponse)
        }
    }

    fn fixed(reply: Option<&str>) -> Arc<FixedBackend> {
        Arc::new(FixedBackend {
            reply: reply.map(str::to_string),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn selected(db: &MenuDatabase) -> SelectedMenu {
        SelectedMenu {
            main_dish: Arc::clone(&db.categories.main_dish[1]),
            snack: Arc::clone(&db.categories.snack[0]),
            drink: Arc::clone(&db.categories.drink[0]),
        }
    }

    fn canned_response() -> AdvisorResponse {
        AdvisorResponse {
            summary_th: "มื้อนี้สมดุล".into(),
            evaluation_th: "ดี เพราะโปรตีนพอเหมาะ".into(),
            risk_factors_th: vec!["โซเดียมสูงเล็กน้อย".into()],
            advice_th: "ดื่มน้ำเปล่าเพิ่ม".into(),
            health_score_overall: 8,
            suggested_alternatives: vec![SuggestedAlternative {
                from_category: Category::Snack,
                name_th: "โยเกิร์ต".into(),
                reason_th: "น้ำตาลน้อยกว่า".into(),
            }],
        }
    }

    #[test]
    fn alternatives_come_from_the_front_of_each_category() {
        let mut db = fallback::menu_database();
        let extra = Arc::clone(&db.categories.main_dish[0]);
        for _ in 0..4 {
            db.categories.main_dish.push(Arc::clone(&extra));
        }

        let alternatives = candidate_alternatives(&db);

        // 3 of 6 main dishes, the only snack, the only drink.
        assert_eq!(alternatives.len(), 5);
        assert_eq!(alternatives[0].name_th, db.categories.main_dish[0].name_th);
        assert_eq!(alternatives[1].name_th, db.categories.main_dish[1].name_th);
        assert_eq!(alternatives[4].name_th, db.categories.drink[0].name_th);
    }

    #[tokio::test]
    async fn output_matches_the_service_document() {
        let expected = canned_response();
        let backend = fixed(Some(&serde_json::to_string(&expected).expect("json")));
        let requestor = AdvisoryRequestor::new(Some(backend.clone()));
        let db = fallback::menu_database();

        let response = requestor
            .request(&UserProfile::default(), &selected(&db), &db)
            .await;

        assert_eq!(response, Some(expected));

        let seen = backend.seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].temperature, Some(ADVISOR_TEMPERATURE));
        let sent: serde_json::Value = serde_json::from_str(&seen[0].contents).expect("payload json");
        assert_eq!(sent["selected_menu"]["main_dish"]["id"], "mock-2");
        assert_eq!(sent["user_profile"]["goal"], "maintain");
        assert_eq!(
            sent["candidate_alternatives"][0],
            serde_json::json!({
                "name_th": "ข้าวผัดกะเพราไก่ไข่ดาว",
                "calories_kcal": 550.0,
                "sugar_g": 5.0,
                "caffeine_level": "none",
                "health_score": 6
            })
        );
    }

    #[tokio::test]
    async fn failures_collapse_to_absent_result() {
        let db = fallback::menu_database();
        let profile = UserProfile::default();

        let unreachable = AdvisoryRequestor::new(Some(fixed(None)));
        assert_eq!(unreachable.request(&profile, &selected(&db), &db).await, None);

        let partial = AdvisoryRequestor::new(Some(fixed(Some(r#"{"summary_th":"x"}"#))));
        assert_eq!(partial.request(&profile, &selected(&db), &db).await, None);

        let unconfigured = AdvisoryRequestor::new(None);
        assert_eq!(unconfigured.request(&profile, &selected(&db), &db).await, None);
    }
}
