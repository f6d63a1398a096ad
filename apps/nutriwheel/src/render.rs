//! Plain-text rendering of session state.

use std::sync::Arc;

use client_core::{selection::DAILY_SUGAR_LIMIT_G, SessionSnapshot};
use shared::{
    domain::{Category, HealthBand, MenuItem},
    protocol::{AdvisorResponse, Verdict},
};

pub fn print_cycle(category: Category, item: &MenuItem) {
    eprintln!("  [{}] ... {}", category.label_th(), item.name_th);
}

fn band_marker(item: &MenuItem) -> &'static str {
    match item.health_band() {
        HealthBand::Good => "+",
        HealthBand::Fair => "~",
        HealthBand::Poor => "!",
    }
}

const GAUGE_WIDTH: usize = 10;

fn sugar_gauge(fill: f64) -> String {
    let filled = (fill * GAUGE_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled.min(GAUGE_WIDTH)),
        ".".repeat(GAUGE_WIDTH - filled.min(GAUGE_WIDTH))
    )
}

fn print_item(category: Category, item: Option<&Arc<MenuItem>>) {
    match item {
        Some(item) => println!(
            "  {:<12} {} ({}) {} kcal, sugar {} g, score {}{}",
            category.label_th(),
            item.name_th,
            item.name_en,
            item.calories_kcal,
            item.sugar_g,
            item.health_score,
            band_marker(item),
        ),
        None => println!("  {:<12} -", category.label_th()),
    }
}

pub fn print_round(round: u32, ready: bool, snapshot: &SessionSnapshot) {
    println!();
    println!("Round {round}");
    for (category, item) in &snapshot.selection {
        print_item(*category, item.as_ref());
    }

    let totals = &snapshot.totals;
    println!(
        "  total {} kcal, sugar {} g / {} g {}{}",
        totals.calories_kcal,
        totals.sugar_g,
        DAILY_SUGAR_LIMIT_G,
        sugar_gauge(totals.sugar_gauge_fill()),
        if totals.exceeds_sugar_limit() {
            " (over limit)"
        } else {
            ""
        }
    );
    if !ready {
        println!("  some wheels have no items; the meal cannot be analyzed");
    }
}

pub fn print_advice(advice: Option<&AdvisorResponse>) {
    let Some(advice) = advice else {
        println!("  Nutri Advisor: not analyzed yet");
        return;
    };

    let verdict = match advice.verdict() {
        Verdict::Good => "good",
        Verdict::Fair => "fair",
        Verdict::Caution => "caution",
    };
    println!(
        "  Nutri Advisor ({verdict}, health score {}/10)",
        advice.health_score_overall
    );
    println!("    {}", advice.summary_th);
    println!("    {}", advice.evaluation_th);
    for risk in &advice.risk_factors_th {
        println!("    ! {risk}");
    }
    println!("    {}", advice.advice_th);
    for alt in &advice.suggested_alternatives {
        println!(
            "    -> [{}] {}: {}",
            alt.from_category.label_th(),
            alt.name_th,
            alt.reason_th
        );
    }
}
