use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use client_core::{
    client_from_settings, config::config_path, load_settings_from, Session, SessionError,
    SessionEvent,
};
use shared::domain::{Gender, Goal, UserProfile};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GoalArg {
    WeightLoss,
    Maintain,
    MuscleGain,
}

#[derive(Parser, Debug)]
#[command(name = "nutriwheel", about = "Spin a random meal and ask for nutrition advice")]
struct Args {
    /// Config file; defaults to ./nutriwheel.toml
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    rounds: u32,
    /// Request advice for every settled meal.
    #[arg(long)]
    analyze: bool,
    /// Print each round as a JSON snapshot.
    #[arg(long)]
    json: bool,
    /// Print the wheels while they cycle.
    #[arg(long)]
    show_cycles: bool,
    #[arg(long)]
    age: Option<u32>,
    #[arg(long, value_enum)]
    gender: Option<GenderArg>,
    #[arg(long)]
    weight_kg: Option<f64>,
    #[arg(long)]
    height_cm: Option<f64>,
    #[arg(long, value_enum)]
    goal: Option<GoalArg>,
    #[arg(long)]
    diabetes: bool,
    #[arg(long)]
    hypertension: bool,
    #[arg(long)]
    caffeine_sensitive: bool,
}

impl Args {
    fn profile(&self) -> UserProfile {
        let mut profile = UserProfile::default();
        if let Some(age) = self.age {
            profile.age = age;
        }
        if let Some(gender) = self.gender {
            profile.gender = match gender {
                GenderArg::Male => Gender::Male,
                GenderArg::Female => Gender::Female,
                GenderArg::Other => Gender::Other,
            };
        }
        if let Some(weight) = self.weight_kg {
            profile.weight_kg = weight;
        }
        if let Some(height) = self.height_cm {
            profile.height_cm = height;
        }
        if let Some(goal) = self.goal {
            profile.goal = match goal {
                GoalArg::WeightLoss => Goal::WeightLoss,
                GoalArg::Maintain => Goal::Maintain,
                GoalArg::MuscleGain => Goal::MuscleGain,
            };
        }
        profile.has_diabetes = self.diabetes;
        profile.has_hypertension = self.hypertension;
        profile.sensitive_to_caffeine = self.caffeine_sensitive;
        profile
    }
}

async fn wait_for_spin(
    events: &mut broadcast::Receiver<SessionEvent>,
    generation: u64,
    show_cycles: bool,
) -> Result<bool> {
    loop {
        match events.recv().await {
            Ok(SessionEvent::WheelCycled { category, item }) if show_cycles => {
                render::print_cycle(category, &item);
            }
            Ok(SessionEvent::SpinFinished {
                generation: finished,
                ready,
            }) if finished == generation => return Ok(ready),
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => bail!("session closed while spinning"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings_from(&config_path(args.config.clone()));
    let session = Session::new(&settings, client_from_settings(&settings));
    session.load().await;
    session.set_profile(args.profile()).await;

    let copy = session.ui_copy().await;
    if !args.json {
        println!("== NutriWheel :: {} ==", copy.buttons.spin_all);
    }

    for round in 1..=args.rounds.max(1) {
        let mut events = session.subscribe_events();
        let generation = session.spin_all().await?;
        let ready = wait_for_spin(&mut events, generation, args.show_cycles).await?;

        if args.analyze {
            match session.analyze().await {
                Ok(_) => {}
                Err(SessionError::SelectionIncomplete) => {
                    tracing::warn!(round, "meal incomplete; skipping analysis");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let snapshot = session.snapshot().await;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        } else {
            render::print_round(round, ready, &snapshot);
            if args.analyze {
                render::print_advice(snapshot.advice.as_ref());
            }
        }
    }

    Ok(())
}
