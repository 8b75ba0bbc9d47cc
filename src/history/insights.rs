//! Performance insights over the historical index.

use std::cmp::Ordering;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::index::{HistoricalPerformanceIndex, Tally};
use super::recommend::round_tenth;
use crate::models::{day_index, TimeOfDay};

/// Minimum mean check-ins for a format to count as a teacher specialty.
pub const SPECIALTY_MIN_CHECKED_IN: f64 = 5.0;

/// Specialties returned per teacher.
pub const SPECIALTY_LIMIT: usize = 5;

/// A historically strong class slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopClass {
    pub format: String,
    pub location: String,
    pub day: Weekday,
    pub time: TimeOfDay,
    /// Teacher with the highest total check-ins in this group.
    pub teacher: String,
    /// Mean check-ins, rounded to one decimal.
    pub avg_checked_in: f64,
    pub avg_revenue: f64,
    /// Number of sessions.
    pub frequency: usize,
}

/// (format, location, day, time) groups with mean check-ins at or above
/// `min_avg`, best first.
pub fn top_performing_classes(index: &HistoricalPerformanceIndex, min_avg: f64) -> Vec<TopClass> {
    let mut out = Vec::new();

    for (slot, pairs) in index.slots() {
        // formats in first-seen order at this slot
        let mut formats: Vec<&str> = Vec::new();
        for pair in pairs {
            if !formats.contains(&pair.format.as_str()) {
                formats.push(&pair.format);
            }
        }

        for format in formats {
            let mut group = Tally::default();
            let mut best: Option<(&str, f64)> = None;
            for pair in pairs.iter().filter(|p| p.format == format) {
                group.merge(&pair.tally);
                if best.is_none_or(|(_, total)| pair.tally.checked_in > total) {
                    best = Some((&pair.teacher, pair.tally.checked_in));
                }
            }

            let stats = group.stats();
            let avg = round_tenth(stats.avg_checked_in);
            if avg < min_avg {
                continue;
            }
            out.push(TopClass {
                format: format.to_string(),
                location: slot.location.clone(),
                day: slot.day,
                time: slot.time,
                teacher: best.map(|(t, _)| t.to_string()).unwrap_or_default(),
                avg_checked_in: avg,
                avg_revenue: stats.avg_revenue,
                frequency: stats.sample_count,
            });
        }
    }

    out.sort_by(|a, b| {
        b.avg_checked_in
            .partial_cmp(&a.avg_checked_in)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.location.cmp(&b.location))
            .then_with(|| day_index(a.day).cmp(&day_index(b.day)))
            .then_with(|| a.time.cmp(&b.time))
            .then_with(|| a.format.cmp(&b.format))
    });
    out
}

/// Formats a teacher draws well in: mean check-ins ≥ 5.0, best first,
/// at most five.
pub fn teacher_specialties(index: &HistoricalPerformanceIndex, teacher: &str) -> Vec<String> {
    let mut scored: Vec<(&str, f64)> = index
        .teacher_formats(teacher)
        .iter()
        .map(|(format, tally)| (format.as_str(), tally.stats().avg_checked_in))
        .filter(|(_, avg)| *avg >= SPECIALTY_MIN_CHECKED_IN)
        .collect();
    // stable: ties keep first-seen order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
        .into_iter()
        .take(SPECIALTY_LIMIT)
        .map(|(format, _)| format.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PerformanceRecord, TrainerRoster};

    fn rec(format: &str, day: Weekday, hour: u16, teacher: &str, checked_in: f64) -> PerformanceRecord {
        PerformanceRecord::new(format, "Kenkere House", day, TimeOfDay::from_hm(hour, 0), teacher, checked_in)
            .with_revenue(checked_in * 500.0)
    }

    #[test]
    fn test_top_performing_classes() {
        let records = vec![
            rec("Studio Barre 57", Weekday::Mon, 7, "Anisha Shah", 9.0),
            rec("Studio Barre 57", Weekday::Mon, 7, "Reshma Sharma", 5.0),
            rec("Studio Barre 57", Weekday::Mon, 7, "Reshma Sharma", 6.0),
            rec("Studio FIT", Weekday::Mon, 7, "Richard D", 4.0),
            rec("Studio Mat 57", Weekday::Tue, 18, "Reshma Sharma", 10.0),
        ];
        let index = HistoricalPerformanceIndex::build(&records, &TrainerRoster::new());
        let top = top_performing_classes(&index, 5.0);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].format, "Studio Mat 57");
        assert_eq!(top[1].format, "Studio Barre 57");
        assert!((top[1].avg_checked_in - 6.7).abs() < 1e-10);
        assert_eq!(top[1].frequency, 3);
        // Reshma: 11 total check-ins beats Anisha's 9
        assert_eq!(top[1].teacher, "Reshma Sharma");
        assert!((top[0].avg_revenue - 5000.0).abs() < 1e-10);
    }

    #[test]
    fn test_teacher_specialties() {
        let records = vec![
            rec("Studio Barre 57", Weekday::Mon, 7, "Anisha Shah", 9.0),
            rec("Studio FIT", Weekday::Mon, 8, "Anisha Shah", 4.0),
            rec("Studio Mat 57", Weekday::Tue, 9, "Anisha Shah", 6.0),
            rec("Studio Cardio Barre", Weekday::Wed, 9, "Anisha Shah", 5.0),
            rec("Studio Recovery", Weekday::Wed, 10, "Anisha Shah", 5.5),
            rec("Studio powerCycle", Weekday::Thu, 9, "Anisha Shah", 7.0),
            rec("Studio Back Body Blaze", Weekday::Fri, 9, "Anisha Shah", 8.0),
            rec("Studio Barre 57", Weekday::Mon, 7, "Someone Else", 12.0),
        ];
        let index = HistoricalPerformanceIndex::build(&records, &TrainerRoster::new());
        let specialties = teacher_specialties(&index, "Anisha Shah");
        assert_eq!(
            specialties,
            vec![
                "Studio Barre 57",
                "Studio Back Body Blaze",
                "Studio powerCycle",
                "Studio Mat 57",
                "Studio Recovery"
            ]
        );
        assert!(teacher_specialties(&index, "Nobody").is_empty());
    }
}
