use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use pantry_core::expiry::ExpiryNotice;
use pantry_core::service::{NotificationScheduler, PantryService};

use super::helpers::display_date;

/// Stands in for a platform alarm service: a notice whose fire time has
/// passed is shown right away, later ones are only reported.
struct TerminalScheduler {
    now: NaiveDateTime,
    quiet: bool,
}

impl NotificationScheduler for TerminalScheduler {
    fn schedule(&self, notice: &ExpiryNotice) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        if notice.is_due(self.now) {
            println!("{}", notice.message(self.now.date()));
        } else {
            println!(
                "Scheduled: {} on {}",
                notice.message(notice.fire_at.date()),
                display_date(notice.fire_at.date())
            );
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct NoticeView<'a> {
    #[serde(flatten)]
    notice: &'a ExpiryNotice,
    due: bool,
    message: String,
}

pub(crate) fn cmd_notify(svc: &PantryService, json: bool) -> Result<()> {
    let now = Local::now().naive_local();
    let scheduler = TerminalScheduler { now, quiet: json };
    let notices = svc.schedule_expiry_notifications(&scheduler, now.date())?;

    if json {
        let views: Vec<NoticeView> = notices
            .iter()
            .map(|notice| {
                let due = notice.is_due(now);
                let shown_on = if due { now.date() } else { notice.fire_at.date() };
                NoticeView {
                    notice,
                    due,
                    message: notice.message(shown_on),
                }
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else if notices.is_empty() {
        eprintln!("Nothing to warn about");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pantry_core::models::Ingredient;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_terminal_scheduler_accepts_notices() {
        let svc = PantryService::new_in_memory().unwrap();
        svc.ingredient_add(&Ingredient::new(
            1,
            "Yoghurt",
            date(2024, 3, 1),
            date(2024, 3, 6),
            "1",
        ))
        .unwrap();

        let now = date(2024, 3, 5).and_hms_opt(9, 0, 0).unwrap();
        let scheduler = TerminalScheduler { now, quiet: true };
        let notices = svc
            .schedule_expiry_notifications(&scheduler, now.date())
            .unwrap();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].is_due(now));
    }

    #[test]
    fn test_notice_view_json() {
        let ing = Ingredient::new(1, "Yoghurt", date(2024, 3, 1), date(2024, 3, 6), "1");
        let notice = ExpiryNotice::for_ingredient(&ing);
        let view = NoticeView {
            notice: &notice,
            due: true,
            message: notice.message(date(2024, 3, 5)),
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["ingredient_name"], "Yoghurt");
        assert_eq!(value["fire_at"], "2024-02-28T00:00:00");
        assert_eq!(value["message"], "Yoghurt expires soon (06/03/2024)");
    }
}
