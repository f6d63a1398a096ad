//! Menu and UI copy generation with static fallbacks.

use serde::de::DeserializeOwned;
use shared::domain::{MenuDatabase, UiContent};
use tracing::{error, info, warn};

use crate::{
    error::GenerationError,
    fallback,
    generative::{GenerationRequest, GenerativeBackend},
    prompts,
};

const MENU_TEMPERATURE: f32 = 0.7;

/// Sends `request` and parses the response text as `T`. Empty and malformed
/// bodies are errors.
pub async fn generate_json<T: DeserializeOwned>(
    backend: Option<&dyn GenerativeBackend>,
    request: GenerationRequest,
) -> Result<T, GenerationError> {
    let backend = backend.ok_or(GenerationError::MissingCredentials)?;
    let text = backend.generate(request).await?;
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(serde_json::from_str(&text)?)
}

pub async fn generate_menu_database(backend: Option<&dyn GenerativeBackend>) -> MenuDatabase {
    let request = GenerationRequest::new(prompts::GENERATE_MENU).with_temperature(MENU_TEMPERATURE);
    match generate_json::<MenuDatabase>(backend, request).await {
        Ok(db) => {
            info!(
                version = %db.version,
                items = db.total_items(),
                "generated menu database"
            );
            db
        }
        Err(GenerationError::MissingCredentials) => {
            warn!("no generative client; using fallback menu database");
            fallback::menu_database()
        }
        Err(err) => {
            error!(error = %err, "failed to generate menu; using fallback menu database");
            fallback::menu_database()
        }
    }
}

pub async fn generate_ui_copy(backend: Option<&dyn GenerativeBackend>) -> UiContent {
    let request = GenerationRequest::new(prompts::UI_COPY_USER)
        .with_system_instruction(prompts::UI_COPY_SYSTEM);
    match generate_json::<UiContent>(backend, request).await {
        Ok(copy) => copy,
        Err(GenerationError::MissingCredentials) => fallback::ui_content(),
        Err(err) => {
            error!(error = %err, "failed to generate UI copy; using fallback copy");
            fallback::ui_content()
        }
    }
}
