//! Shelf-life arithmetic: expiry status, freshness progress and when to
//! warn about an ingredient.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::models::{DISPLAY_DATE_FORMAT, Ingredient};

/// How many days ahead of the expiration date the first warning goes out.
pub const NOTIFY_DAYS_BEFORE: i64 = 7;

const YELLOW_FROM: u8 = 50;
const RED_ABOVE: u8 = 80;

/// Whole days from `today` to the expiration date; negative once expired.
#[must_use]
pub fn days_until_expiration(ingredient: &Ingredient, today: NaiveDate) -> i64 {
    (ingredient.expiration_date - today).num_days()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "days", rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    ExpiresToday,
    ExpiresIn(i64),
}

impl ExpiryStatus {
    #[must_use]
    pub fn of(ingredient: &Ingredient, today: NaiveDate) -> Self {
        match days_until_expiration(ingredient, today) {
            d if d < 0 => Self::Expired,
            0 => Self::ExpiresToday,
            d => Self::ExpiresIn(d),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Expired => "expired".to_string(),
            Self::ExpiresToday => "expires today".to_string(),
            Self::ExpiresIn(1) => "1 day left".to_string(),
            Self::ExpiresIn(d) => format!("{d} days left"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessBand {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Freshness {
    /// Share of the shelf life used up, 0..=100.
    pub progress: u8,
    pub band: FreshnessBand,
}

/// Shelf-life progress: `(elapsed + 1) / (shelf_life + 1)`, as a percentage
/// capped at 100. Both spans are whole days counted from the add date.
#[must_use]
pub fn freshness(ingredient: &Ingredient, today: NaiveDate) -> Freshness {
    let elapsed = (today - ingredient.add_date).num_days().max(0);
    let shelf_life = (ingredient.expiration_date - ingredient.add_date)
        .num_days()
        .max(0);
    let progress = u8::try_from(((elapsed + 1) * 100 / (shelf_life + 1)).min(100)).unwrap_or(100);

    let band = if progress < YELLOW_FROM {
        FreshnessBand::Green
    } else if progress <= RED_ABOVE {
        FreshnessBand::Yellow
    } else {
        FreshnessBand::Red
    };
    Freshness { progress, band }
}

/// Whether a warning should be scheduled for this ingredient today.
///
/// Never-notified ingredients are warned once they are within
/// [`NOTIFY_DAYS_BEFORE`] days of expiry. After that an ingredient is warned
/// again on its expiration day and once more after it has expired.
#[must_use]
pub fn should_notify(ingredient: &Ingredient, today: NaiveDate) -> bool {
    let until = days_until_expiration(ingredient, today);
    match ingredient.last_notified {
        None => until <= NOTIFY_DAYS_BEFORE,
        Some(last) => {
            (until < 0 && last <= ingredient.expiration_date)
                || (until == 0 && last < ingredient.expiration_date)
        }
    }
}

/// Local midnight [`NOTIFY_DAYS_BEFORE`] days ahead of expiry.
#[must_use]
pub fn notification_time(ingredient: &Ingredient) -> NaiveDateTime {
    (ingredient.expiration_date - Duration::days(NOTIFY_DAYS_BEFORE)).and_time(NaiveTime::MIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Expired,
    ExpiresToday,
    ExpiresSoon,
}

impl NoticeKind {
    #[must_use]
    pub fn on(expiration_date: NaiveDate, day: NaiveDate) -> Self {
        match expiration_date.cmp(&day) {
            std::cmp::Ordering::Less => Self::Expired,
            std::cmp::Ordering::Equal => Self::ExpiresToday,
            std::cmp::Ordering::Greater => Self::ExpiresSoon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiryNotice {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub expiration_date: NaiveDate,
    /// Local wall-clock time the notice should fire. A time in the past means
    /// fire immediately.
    pub fire_at: NaiveDateTime,
}

impl ExpiryNotice {
    #[must_use]
    pub fn for_ingredient(ingredient: &Ingredient) -> Self {
        Self {
            ingredient_id: ingredient.id,
            ingredient_name: ingredient.name.clone(),
            expiration_date: ingredient.expiration_date,
            fire_at: notification_time(ingredient),
        }
    }

    #[must_use]
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.fire_at <= now
    }

    #[must_use]
    pub fn kind(&self, shown_on: NaiveDate) -> NoticeKind {
        NoticeKind::on(self.expiration_date, shown_on)
    }

    /// Text for the notice when it is shown on `shown_on`.
    #[must_use]
    pub fn message(&self, shown_on: NaiveDate) -> String {
        let name = &self.ingredient_name;
        match self.kind(shown_on) {
            NoticeKind::Expired => format!("{name} has expired"),
            NoticeKind::ExpiresToday => format!("{name} expires today"),
            NoticeKind::ExpiresSoon => format!(
                "{name} expires soon ({})",
                self.expiration_date.format(DISPLAY_DATE_FORMAT)
            ),
        }
    }
}
