use std::{
    collections::HashSet,
    sync::{Arc, Weak},
};

use serde::Serialize;
use shared::{
    domain::{Category, MenuDatabase, MenuItem, UiContent, UserProfile},
    protocol::AdvisorResponse,
};
use tokio::{
    sync::{broadcast, mpsc, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{
    advisor::{AdvisorPhase, AdvisoryRequestor},
    config::Settings,
    error::SessionError,
    fallback,
    generative::GenerativeBackend,
    provider,
    selection::{MealTotals, SelectionState},
    spin::{SpinEngine, SpinEvent, SpinHandle},
};

const EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub enum SessionEvent {
    MenuLoaded {
        version: String,
        items: usize,
    },
    SpinStarted {
        generation: u64,
    },
    /// The previous advice no longer matches the meal being spun.
    AdvisoryCleared,
    WheelCycled {
        category: Category,
        item: Arc<MenuItem>,
    },
    WheelSettled {
        category: Category,
        item: Arc<MenuItem>,
    },
    SpinFinished {
        generation: u64,
        ready: bool,
    },
    SpinCancelled {
        generation: u64,
    },
    AnalysisStarted,
    AnalysisReady(AdvisorResponse),
    AnalysisFailed,
}

/// Read-only view of the session for front ends.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub menu_version: Option<String>,
    pub spinning: bool,
    pub ready: bool,
    pub analyzing: bool,
    pub selection: Vec<(Category, Option<Arc<MenuItem>>)>,
    pub totals: MealTotals,
    pub advice: Option<AdvisorResponse>,
    pub ui_copy: UiContent,
}

struct SessionState {
    db: Option<Arc<MenuDatabase>>,
    ui_copy: UiContent,
    profile: UserProfile,
    selection: SelectionState,
    advisor: AdvisorPhase,
    generation: u64,
    wheels: Vec<SpinHandle>,
    pending: HashSet<Category>,
    pump: Option<JoinHandle<()>>,
}

impl SessionState {
    fn is_spinning(&self) -> bool {
        !self.pending.is_empty()
    }

    fn stop_wheels(&mut self) {
        for wheel in self.wheels.drain(..) {
            wheel.cancel();
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.pending.clear();
    }
}

/// Single owner of one user's in-memory session: menu, profile, the three
/// wheels, the current meal and its advice.
pub struct Session {
    backend: Option<Arc<dyn GenerativeBackend>>,
    requestor: AdvisoryRequestor,
    engines: [SpinEngine; 3],
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(settings: &Settings, backend: Option<Arc<dyn GenerativeBackend>>) -> Arc<Self> {
        let timing = settings.spin_timing();
        Self::with_engines(
            backend,
            Category::ALL.map(|category| SpinEngine::new(category, timing)),
        )
    }

    pub fn with_engines(
        backend: Option<Arc<dyn GenerativeBackend>>,
        engines: [SpinEngine; 3],
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            requestor: AdvisoryRequestor::new(backend.clone()),
            backend,
            engines,
            inner: Mutex::new(SessionState {
                db: None,
                ui_copy: fallback::ui_content(),
                profile: UserProfile::default(),
                selection: SelectionState::default(),
                advisor: AdvisorPhase::Idle,
                generation: 0,
                wheels: Vec::new(),
                pending: HashSet::new(),
                pump: None,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Generates the menu and the UI copy concurrently and stores both.
    pub async fn load(&self) {
        let backend = self.backend.as_deref();
        let (db, ui_copy) = tokio::join!(
            provider::generate_menu_database(backend),
            provider::generate_ui_copy(backend)
        );

        let mut guard = self.inner.lock().await;
        guard.ui_copy = ui_copy;
        self.install_menu(&mut guard, db);
    }

    /// Regenerates the menu only. Slots keep their items.
    pub async fn refresh_menu(&self) -> Result<(), SessionError> {
        if self.inner.lock().await.is_spinning() {
            return Err(SessionError::AlreadySpinning);
        }

        let db = provider::generate_menu_database(self.backend.as_deref()).await;

        let mut guard = self.inner.lock().await;
        if guard.is_spinning() {
            return Err(SessionError::AlreadySpinning);
        }
        self.install_menu(&mut guard, db);
        Ok(())
    }

    fn install_menu(&self, guard: &mut SessionState, db: MenuDatabase) {
        info!(version = %db.version, items = db.total_items(), "menu database ready");
        let _ = self.events.send(SessionEvent::MenuLoaded {
            version: db.version.clone(),
            items: db.total_items(),
        });
        guard.db = Some(Arc::new(db));
    }

    pub async fn profile(&self) -> UserProfile {
        self.inner.lock().await.profile.clone()
    }

    pub async fn set_profile(&self, profile: UserProfile) {
        self.inner.lock().await.profile = profile;
    }

    pub async fn menu(&self) -> Option<Arc<MenuDatabase>> {
        self.inner.lock().await.db.clone()
    }

    pub async fn ui_copy(&self) -> UiContent {
        self.inner.lock().await.ui_copy.clone()
    }

    pub async fn is_spinning(&self) -> bool {
        self.inner.lock().await.is_spinning()
    }

    pub async fn can_analyze(&self) -> bool {
        let guard = self.inner.lock().await;
        guard.selection.is_ready() && !guard.advisor.is_requesting()
    }

    pub async fn advice(&self) -> Option<AdvisorResponse> {
        self.inner.lock().await.advisor.response().cloned()
    }

    pub async fn advisor_phase(&self) -> AdvisorPhase {
        self.inner.lock().await.advisor.clone()
    }

    /// Starts all three wheels. The previous advice is cleared before any wheel
    /// is started. Returns the generation of the new cycle.
    pub async fn spin_all(self: &Arc<Self>) -> Result<u64, SessionError> {
        let mut guard = self.inner.lock().await;
        let db = guard.db.clone().ok_or(SessionError::MenuNotLoaded)?;
        if guard.is_spinning() {
            return Err(SessionError::AlreadySpinning);
        }
        if guard.advisor.is_requesting() {
            return Err(SessionError::AnalysisInFlight);
        }

        guard.generation += 1;
        let generation = guard.generation;
        guard.stop_wheels();
        guard.advisor = AdvisorPhase::Idle;
        guard.selection.begin_cycle();
        let _ = self.events.send(SessionEvent::AdvisoryCleared);
        let _ = self.events.send(SessionEvent::SpinStarted { generation });

        let (tx, rx) = mpsc::unbounded_channel();
        for engine in &self.engines {
            let items = db.items(engine.category()).to_vec();
            if let Some(handle) = engine.start(items, generation, tx.clone()) {
                guard.pending.insert(handle.category());
                guard.wheels.push(handle);
            }
        }
        drop(tx);

        if guard.pending.is_empty() {
            debug!(generation, "no category has items; nothing to spin");
            let _ = self.events.send(SessionEvent::SpinFinished {
                generation,
                ready: guard.selection.is_ready(),
            });
            return Ok(generation);
        }

        guard.pump = Some(tokio::spawn(pump_spin_events(Arc::downgrade(self), rx)));
        info!(generation, wheels = guard.wheels.len(), "spin started");
        Ok(generation)
    }

    /// Stops every wheel of the current cycle. No settle from it can land
    /// afterwards.
    pub async fn cancel_spin(&self) -> bool {
        let mut guard = self.inner.lock().await;
        if !guard.is_spinning() {
            return false;
        }
        let cancelled = guard.generation;
        guard.generation += 1;
        guard.stop_wheels();
        info!(generation = cancelled, "spin cancelled");
        let _ = self.events.send(SessionEvent::SpinCancelled {
            generation: cancelled,
        });
        true
    }

    async fn apply_spin_event(&self, event: SpinEvent) {
        let mut guard = self.inner.lock().await;
        if event.generation() != guard.generation {
            debug!(
                generation = event.generation(),
                current = guard.generation,
                "dropping stale wheel event"
            );
            return;
        }

        match event {
            SpinEvent::Cycled { category, item, .. } => {
                let _ = self
                    .events
                    .send(SessionEvent::WheelCycled { category, item });
            }
            SpinEvent::Settled {
                category,
                generation,
                item,
            } => {
                info!(%category, item = %item.id, "wheel settled");
                guard.selection.record(category, Arc::clone(&item));
                guard.pending.remove(&category);
                let _ = self
                    .events
                    .send(SessionEvent::WheelSettled { category, item });

                if guard.pending.is_empty() {
                    guard.wheels.clear();
                    guard.pump = None;
                    let ready = guard.selection.is_ready();
                    let _ = self
                        .events
                        .send(SessionEvent::SpinFinished { generation, ready });
                }
            }
        }
    }

    /// Requests advice for the current meal. Refused while any category has not
    /// settled in this cycle or while another request is in flight.
    pub async fn analyze(&self) -> Result<Option<AdvisorResponse>, SessionError> {
        let (profile, selected, db, generation) = {
            let mut guard = self.inner.lock().await;
            if guard.advisor.is_requesting() {
                return Err(SessionError::AnalysisInFlight);
            }
            if !guard.selection.is_ready() {
                return Err(SessionError::SelectionIncomplete);
            }
            let selected = guard
                .selection
                .selected_menu()
                .ok_or(SessionError::SelectionIncomplete)?;
            let db = guard.db.clone().ok_or(SessionError::MenuNotLoaded)?;
            guard.advisor = AdvisorPhase::Requesting;
            (guard.profile.clone(), selected, db, guard.generation)
        };
        let _ = self.events.send(SessionEvent::AnalysisStarted);

        let result = self.requestor.request(&profile, &selected, &db).await;

        let mut guard = self.inner.lock().await;
        if guard.generation != generation {
            debug!(generation, "storing advice for an older meal");
        }
        match &result {
            Some(response) => {
                guard.advisor = AdvisorPhase::Resolved(response.clone());
                let _ = self
                    .events
                    .send(SessionEvent::AnalysisReady(response.clone()));
            }
            None => {
                guard.advisor = AdvisorPhase::Failed;
                let _ = self.events.send(SessionEvent::AnalysisFailed);
            }
        }
        Ok(result)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let guard = self.inner.lock().await;
        SessionSnapshot {
            menu_version: guard.db.as_ref().map(|db| db.version.clone()),
            spinning: guard.is_spinning(),
            ready: guard.selection.is_ready(),
            analyzing: guard.advisor.is_requesting(),
            selection: Category::ALL
                .iter()
                .map(|category| (*category, guard.selection.get(*category).cloned()))
                .collect(),
            totals: guard.selection.totals(),
            advice: guard.advisor.response().cloned(),
            ui_copy: guard.ui_copy.clone(),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.inner.get_mut().stop_wheels();
    }
}

async fn pump_spin_events(session: Weak<Session>, mut rx: mpsc::UnboundedReceiver<SpinEvent>) {
    while let Some(event) = rx.recv().await {
        let Some(session) = session.upgrade() else {
            break;
        };
        session.apply_spin_event(event).await;
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
