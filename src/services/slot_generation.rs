// Génération des créneaux récurrents (modèle hebdomadaire)
// Fonction pure: aucun accès BD, "now" est fourni par l'appelant

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use serde::Deserialize;
use validator::Validate;

use crate::errors::AppError;

/// Règle de récurrence: jours de la semaine, plage horaire, pas, horizon.
/// Par défaut: lundi et jeudi, 14:00 à 16:00, toutes les 20 minutes, 4 semaines.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RecurrenceRule {
    #[validate(length(min = 1, max = 7))]
    pub weekdays: Vec<Weekday>,
    pub first_start: NaiveTime,
    pub last_start: NaiveTime,
    #[validate(range(min = 5, max = 240))]
    pub step_minutes: u32,
    #[validate(range(min = 1, max = 52))]
    pub weeks: u32,
    pub location: Option<String>,
    pub room: Option<String>,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self {
            weekdays: vec![Weekday::Mon, Weekday::Thu],
            first_start: NaiveTime::from_hms_opt(14, 0, 0).unwrap_or(NaiveTime::MIN),
            last_start: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
            step_minutes: 20,
            weeks: 4,
            location: None,
            room: None,
        }
    }
}

impl RecurrenceRule {
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;

        if self.first_start > self.last_start {
            return Err(AppError::Validation(
                "firstStart must not be after lastStart".to_string(),
            ));
        }

        Ok(())
    }
}

/// Liste triée des instants de début à créer, strictement après `now`.
/// Semaines couvertes: celle qui contient `now` puis les `weeks - 1` suivantes.
/// Les heures sont interprétées dans le fuseau de `now`.
pub fn generate_start_times<Tz: TimeZone>(rule: &RecurrenceRule, now: &DateTime<Tz>) -> Vec<DateTime<Utc>> {
    let timezone = now.timezone();
    let today = now.date_naive();
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let step = Duration::minutes(rule.step_minutes.max(1) as i64);

    let mut start_times = Vec::new();

    for week in 0..rule.weeks {
        let week_start = monday + Duration::weeks(week as i64);

        for weekday in &rule.weekdays {
            let day = week_start + Duration::days(weekday.num_days_from_monday() as i64);
            let mut time = rule.first_start;

            while time <= rule.last_start {
                // Heure inexistante ou ambiguë (changement d'heure): ignorée
                if let Some(local) = timezone.from_local_datetime(&day.and_time(time)).single() {
                    if local > *now {
                        start_times.push(local.with_timezone(&Utc));
                    }
                }

                let (next, wrapped) = time.overflowing_add_signed(step);
                if wrapped != 0 {
                    break;
                }
                time = next;
            }
        }
    }

    start_times.sort();
    start_times.dedup();
    start_times
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_default_rule_from_a_sunday() {
        // 2026-10-18 est un dimanche: la semaine en cours est déjà passée
        let now = at(2026, 10, 18, 10, 0);
        let times = generate_start_times(&RecurrenceRule::default(), &now);

        // 3 semaines futures x 2 jours x 7 créneaux (14:00 .. 16:00)
        assert_eq!(times.len(), 3 * 2 * 7);
        assert_eq!(times[0], at(2026, 10, 19, 14, 0));
        assert_eq!(times[6], at(2026, 10, 19, 16, 0));
        assert_eq!(*times.last().unwrap(), at(2026, 11, 5, 16, 0));
        assert!(times.iter().all(|t| *t > now));
        assert!(times
            .iter()
            .all(|t| matches!(t.weekday(), Weekday::Mon | Weekday::Thu)));
    }

    #[test]
    fn test_partial_day_keeps_only_future_slots() {
        // Lundi 2026-10-19 à 14:30: 14:00 et 14:20 sont passés
        let now = at(2026, 10, 19, 14, 30);
        let rule = RecurrenceRule {
            weeks: 1,
            ..RecurrenceRule::default()
        };

        let times = generate_start_times(&rule, &now);
        let monday: Vec<_> = times.iter().filter(|t| t.weekday() == Weekday::Mon).collect();
        assert_eq!(monday.len(), 5);
        assert_eq!(monday[0].minute(), 40);
        assert_eq!(times.len(), 5 + 7);
    }

    #[test]
    fn test_step_not_dividing_range() {
        let now = at(2026, 10, 18, 0, 0);
        let rule = RecurrenceRule {
            weekdays: vec![Weekday::Tue],
            first_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            last_start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            step_minutes: 25,
            weeks: 1,
            location: None,
            room: None,
        };

        // Dimanche 18: la semaine du lundi 12 est passée, mardi 13 aussi
        assert!(generate_start_times(&rule, &now).is_empty());

        let rule = RecurrenceRule { weeks: 2, ..rule };
        let times = generate_start_times(&rule, &now);
        assert_eq!(
            times,
            vec![at(2026, 10, 20, 9, 0), at(2026, 10, 20, 9, 25), at(2026, 10, 20, 9, 50)]
        );
    }

    #[test]
    fn test_rule_validation() {
        assert!(RecurrenceRule::default().check().is_ok());

        let reversed = RecurrenceRule {
            first_start: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            ..RecurrenceRule::default()
        };
        assert!(matches!(reversed.check(), Err(AppError::Validation(_))));

        let no_days = RecurrenceRule {
            weekdays: vec![],
            ..RecurrenceRule::default()
        };
        assert!(no_days.check().is_err());

        let zero_step = RecurrenceRule {
            step_minutes: 0,
            ..RecurrenceRule::default()
        };
        assert!(zero_step.check().is_err());
    }
}
