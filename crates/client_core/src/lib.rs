//! Session core for the NutriWheel meal randomizer: three cancellable spin
//! wheels, the current meal, and the generative-service calls that produce the
//! menu, the UI copy and the nutrition advice.

pub mod advisor;
pub mod config;
pub mod error;
pub mod fallback;
pub mod generative;
mod prompts;
pub mod provider;
pub mod selection;
pub mod session;
pub mod spin;

pub use advisor::{AdvisorPhase, AdvisoryRequestor};
pub use config::{load_settings_from, Settings};
pub use error::{GenerationError, SessionError};
pub use generative::{client_from_settings, GeminiClient, GenerationRequest, GenerativeBackend};
pub use selection::{MealTotals, SelectionState};
pub use session::{Session, SessionEvent, SessionSnapshot};
pub use spin::{SpinEngine, SpinEvent, SpinHandle, SpinTiming};
