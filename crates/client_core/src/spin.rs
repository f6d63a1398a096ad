//! Per-category wheel: cycles through random items, then settles on one.

use std::{sync::Arc, time::Duration};

use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::domain::{Category, MenuItem};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinTiming {
    pub cycle_interval: Duration,
    pub min_settle: Duration,
    pub max_settle: Duration,
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_millis(100),
            min_settle: Duration::from_millis(1000),
            max_settle: Duration::from_millis(2000),
        }
    }
}

impl SpinTiming {
    const MIN_CYCLE_INTERVAL: Duration = Duration::from_millis(1);

    /// Cycle interval of at least 1 ms and a settle window with `max >= min`.
    pub fn normalized(self) -> Self {
        Self {
            cycle_interval: self.cycle_interval.max(Self::MIN_CYCLE_INTERVAL),
            min_settle: self.min_settle,
            max_settle: self.max_settle.max(self.min_settle),
        }
    }

    fn sample_settle_delay(&self, rng: &mut impl Rng) -> Duration {
        if self.max_settle <= self.min_settle {
            return self.min_settle;
        }
        rng.gen_range(self.min_settle..self.max_settle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpinEvent {
    /// Visual cycling; carries no meaning for the outcome.
    Cycled {
        category: Category,
        generation: u64,
        item: Arc<MenuItem>,
    },
    Settled {
        category: Category,
        generation: u64,
        item: Arc<MenuItem>,
    },
}

impl SpinEvent {
    pub fn category(&self) -> Category {
        match self {
            SpinEvent::Cycled { category, .. } | SpinEvent::Settled { category, .. } => *category,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            SpinEvent::Cycled { generation, .. } | SpinEvent::Settled { generation, .. } => {
                *generation
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpinEngine {
    category: Category,
    timing: SpinTiming,
    seed: Option<u64>,
}

/// Owns the single task that drives both the cycling ticker and the settle
/// timer. Cancelling or dropping the handle stops both at once.
#[derive(Debug)]
pub struct SpinHandle {
    category: Category,
    task: JoinHandle<()>,
}

impl SpinHandle {
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for SpinHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl SpinEngine {
    pub fn new(category: Category, timing: SpinTiming) -> Self {
        Self {
            category,
            timing: timing.normalized(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Starts one spin over `items`. Returns `None` for an empty list: nothing is
    /// sampled and no event is ever sent.
    pub fn start(
        &self,
        items: Vec<Arc<MenuItem>>,
        generation: u64,
        events: mpsc::UnboundedSender<SpinEvent>,
    ) -> Option<SpinHandle> {
        if items.is_empty() {
            debug!(category = %self.category, "no items to spin");
            return None;
        }

        let category = self.category;
        let timing = self.timing;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ generation),
            None => StdRng::from_entropy(),
        };

        let task = tokio::spawn(async move {
            let settle_after = timing.sample_settle_delay(&mut rng);
            let settle = time::sleep(settle_after);
            tokio::pin!(settle);

            let mut ticker = time::interval(timing.cycle_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    () = &mut settle => {
                        let item = pick(&items, &mut rng);
                        debug!(%category, generation, item = %item.id, "wheel settled");
                        let _ = events.send(SpinEvent::Settled { category, generation, item });
                        break;
                    }
                    _ = ticker.tick() => {
                        let item = pick(&items, &mut rng);
                        if events.send(SpinEvent::Cycled { category, generation, item }).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Some(SpinHandle { category, task })
    }
}

fn pick(items: &[Arc<MenuItem>], rng: &mut impl Rng) -> Arc<MenuItem> {
    Arc::clone(&items[rng.gen_range(0..items.len())])
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use shared::domain::{CaffeineLevel, TypeTag};

    use super::*;

    fn item(id: &str) -> Arc<MenuItem> {
        Arc::new(MenuItem {
            id: id.into(),
            name_th: id.into(),
            name_en: id.into(),
            description_th: String::new(),
            calories_kcal: 100.0,
            protein_g: 1.0,
            fat_g: 1.0,
            carb_g: 1.0,
            sugar_g: 1.0,
            fiber_g: 1.0,
            caffeine_level: CaffeineLevel::None,
            health_score: 5,
            type_tag: TypeTag::Normal,
        })
    }

    async fn drain(mut rx: mpsc::UnboundedReceiver<SpinEvent>) -> Vec<SpinEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn settled_ids(events: &[SpinEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                SpinEvent::Settled { item, .. } => Some(item.id.clone()),
                SpinEvent::Cycled { .. } => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn two_item_list_always_settles_to_exactly_one_member() {
        let engine = SpinEngine::new(Category::MainDish, SpinTiming::default());
        let items = vec![item("a"), item("b")];
        let mut seen = HashSet::new();

        for generation in 0..200 {
            let (tx, rx) = mpsc::unbounded_channel();
            let handle = engine
                .start(items.clone(), generation, tx)
                .expect("non-empty list spins");
            let settled = settled_ids(&drain(rx).await);
            drop(handle);

            assert_eq!(settled.len(), 1, "exactly one settle per spin");
            assert!(settled[0] == "a" || settled[0] == "b");
            seen.insert(settled[0].clone());
        }

        assert_eq!(seen.len(), 2, "both items are reachable");
    }

    #[tokio::test(start_paused = true)]
    async fn every_event_references_an_input_item() {
        let engine = SpinEngine::new(Category::Snack, SpinTiming::default()).with_seed(7);
        let items: Vec<_> = ["x", "y", "z"].into_iter().map(item).collect();
        let ids: HashSet<_> = items.iter().map(|i| i.id.clone()).collect();
        let (tx, rx) = mpsc::unbounded_channel();

        let _handle = engine.start(items, 3, tx).expect("spin");
        let events = drain(rx).await;

        assert!(events.len() > 1, "cycling emits before the settle");
        for event in &events {
            assert_eq!(event.category(), Category::Snack);
            assert_eq!(event.generation(), 3);
            let (SpinEvent::Cycled { item, .. } | SpinEvent::Settled { item, .. }) = event;
            assert!(ids.contains(&item.id));
        }
        assert!(matches!(events.last(), Some(SpinEvent::Settled { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_list_never_spins() {
        let engine = SpinEngine::new(Category::Drink, SpinTiming::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(engine.start(Vec::new(), 1, tx).is_none());
        assert!(rx.recv().await.is_none(), "sender dropped without events");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_before_settle_emits_no_settle() {
        let engine = SpinEngine::new(Category::MainDish, SpinTiming::default());
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = engine.start(vec![item("a"), item("b")], 1, tx).expect("spin");
        time::sleep(Duration::from_millis(500)).await;
        handle.cancel();
        time::sleep(Duration::from_secs(5)).await;

        let events = drain(rx).await;
        assert!(!events.is_empty(), "cycling happened before cancel");
        assert!(settled_ids(&events).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels_the_spin() {
        let engine = SpinEngine::new(Category::Drink, SpinTiming::default());
        let (tx, rx) = mpsc::unbounded_channel();

        drop(engine.start(vec![item("a")], 1, tx));
        time::sleep(Duration::from_secs(5)).await;

        assert!(settled_ids(&drain(rx).await).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn settle_lands_inside_the_configured_window() {
        let timing = SpinTiming {
            cycle_interval: Duration::from_millis(100),
            min_settle: Duration::from_millis(1000),
            max_settle: Duration::from_millis(2000),
        };
        let engine = SpinEngine::new(Category::MainDish, timing);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let started = time::Instant::now();

        let _handle = engine.start(vec![item("a")], 1, tx).expect("spin");
        loop {
            match rx.recv().await.expect("settle arrives") {
                SpinEvent::Settled { .. } => break,
                SpinEvent::Cycled { .. } => continue,
            }
        }

        let elapsed = started.elapsed();
        assert!(elapsed >= timing.min_settle, "settled early: {elapsed:?}");
        assert!(elapsed <= timing.max_settle, "settled late: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn zero_cycle_interval_still_settles() {
        let timing = SpinTiming {
            cycle_interval: Duration::ZERO,
            min_settle: Duration::from_millis(50),
            max_settle: Duration::from_millis(10),
        };
        let engine = SpinEngine::new(Category::Snack, timing);
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = engine.start(vec![item("a")], 1, tx).expect("spin");
        let settled = settled_ids(&drain(rx).await);
        drop(handle);

        assert_eq!(settled, vec!["a".to_string()]);
    }

    #[test]
    fn normalized_timing_is_usable() {
        let timing = SpinTiming {
            cycle_interval: Duration::ZERO,
            min_settle: Duration::from_millis(500),
            max_settle: Duration::from_millis(100),
        }
        .normalized();

        assert_eq!(timing.cycle_interval, Duration::from_millis(1));
        assert_eq!(timing.max_settle, timing.min_settle);
    }
}
