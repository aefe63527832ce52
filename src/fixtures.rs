//! Randomized, collision-resistant test data.
//!
//! Every value that must be unique across concurrently running shards embeds a
//! process-monotonic millisecond stamp, a random token and the run tag.
use crate::context::RunInfo;
use crate::domain::{DishFixture, TestIdentity};
use chrono::Utc;
use fake::Fake;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::{FirstName, LastName};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use secrecy::Secret;
use std::sync::atomic::{AtomicI64, Ordering};

pub const PREP_TIME_RANGE: std::ops::RangeInclusive<u32> = 5..=35;
pub const COOK_TIME_RANGE: std::ops::RangeInclusive<u32> = 10..=70;
pub const CALORIES_RANGE: std::ops::RangeInclusive<u32> = 100..=600;

const TOKEN_LENGTH: usize = 6;
const NATIONALITIES: &[&str] = &[
    "Mexican",
    "Colombian",
    "Argentinian",
    "Spanish",
    "Peruvian",
    "Chilean",
];

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Wall-clock milliseconds, bumped so that no two calls in a process return the same value.
pub fn monotonic_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let next = if now > last { now } else { last + 1 };
        match LAST_STAMP.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// Lowercase alphanumeric token.
pub fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// `"<prefix> <millis>-<token>"`
pub fn unique_name(prefix: &str) -> String {
    format!("{} {}-{}", prefix, monotonic_millis(), random_token(TOKEN_LENGTH))
}

#[tracing::instrument(name = "Generating user fixture", skip(run), fields(run = %run.run_tag()))]
pub fn generate_user_fixture(run: &RunInfo, email_domain: &str) -> TestIdentity {
    let mut rng = rand::thread_rng();
    let stamp = monotonic_millis();
    let token = random_token(TOKEN_LENGTH);
    let email = format!("e2e.{}.{}.{}@{}", run.run_tag(), stamp, token, email_domain);
    let phone = format!(
        "{:04}{:06}",
        stamp.rem_euclid(10_000),
        rng.gen_range(0..1_000_000)
    );
    let nationality = NATIONALITIES
        .choose(&mut rng)
        .copied()
        .unwrap_or("Mexican")
        .to_string();
    let password = format!("Nutri{}!{}", random_token(TOKEN_LENGTH), rng.gen_range(10..100));

    TestIdentity {
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
        email,
        nationality,
        phone,
        password: Secret::new(password),
    }
}

#[tracing::instrument(name = "Generating dish fixture")]
pub fn generate_dish_fixture() -> DishFixture {
    let mut rng = rand::thread_rng();
    let description: String = Sentence(4..8).fake();
    DishFixture {
        name: unique_name("Test Dish"),
        description,
        // Independent of the times so both card layouts get covered
        quick_prep: rng.gen_bool(0.5),
        prep_time: Some(rng.gen_range(PREP_TIME_RANGE)),
        cook_time: Some(rng.gen_range(COOK_TIME_RANGE)),
        image_url: None,
        steps: vec![
            "Step 1: Prepare ingredients".into(),
            "Step 2: Cook the dish".into(),
            "Step 3: Serve".into(),
        ],
        calories: Some(rng.gen_range(CALORIES_RANGE)),
    }
}
