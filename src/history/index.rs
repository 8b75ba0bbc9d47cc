//! Historical performance index.
//!
//! Aggregates past sessions by slot so the recommender and the insight
//! queries can answer "what ran here, who taught it, and how did it do"
//! without rescanning the records.
//!
//! # Exclusions
//! Hosted sessions, qualified sub-variants ("Studio FIT - Outdoor"),
//! records without a teacher and records of inactive trainers never
//! enter the index.

use std::collections::{BTreeSet, HashMap};

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::models::{format, PerformanceRecord, TimeOfDay, TrainerRoster};

/// Aggregate performance of one group of records.
///
/// An unseen group yields `SlotStats::default()` (zero samples).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotStats {
    pub avg_checked_in: f64,
    pub avg_revenue: f64,
    pub sample_count: usize,
}

impl SlotStats {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

/// Running sums for one group.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Tally {
    pub checked_in: f64,
    pub revenue: f64,
    pub count: usize,
}

impl Tally {
    fn add(&mut self, record: &PerformanceRecord) {
        self.checked_in += record.checked_in;
        self.revenue += record.revenue;
        self.count += 1;
    }

    pub(crate) fn merge(&mut self, other: &Tally) {
        self.checked_in += other.checked_in;
        self.revenue += other.revenue;
        self.count += other.count;
    }

    pub(crate) fn stats(&self) -> SlotStats {
        if self.count == 0 {
            return SlotStats::default();
        }
        SlotStats {
            avg_checked_in: self.checked_in / self.count as f64,
            avg_revenue: self.revenue / self.count as f64,
            sample_count: self.count,
        }
    }
}

/// A (location, day, time) slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub location: String,
    pub day: Weekday,
    pub time: TimeOfDay,
}

impl SlotKey {
    pub fn new(location: impl Into<String>, day: Weekday, time: TimeOfDay) -> Self {
        Self {
            location: location.into(),
            day,
            time,
        }
    }
}

/// Performance of one (format, teacher) pair within a group.
#[derive(Debug, Clone)]
pub struct PairStats {
    pub format: String,
    pub teacher: String,
    pub(crate) tally: Tally,
}

impl PairStats {
    pub fn stats(&self) -> SlotStats {
        self.tally.stats()
    }
}

/// Upserts a record into a first-seen ordered pair list.
fn add_pair(pairs: &mut Vec<PairStats>, record: &PerformanceRecord) {
    match pairs
        .iter_mut()
        .find(|p| p.format == record.format && p.teacher == record.teacher)
    {
        Some(pair) => pair.tally.add(record),
        None => {
            let mut tally = Tally::default();
            tally.add(record);
            pairs.push(PairStats {
                format: record.format.clone(),
                teacher: record.teacher.clone(),
                tally,
            });
        }
    }
}

/// Read-only aggregation of historical records.
#[derive(Debug, Clone, Default)]
pub struct HistoricalPerformanceIndex {
    /// Pairs observed at each exact slot, first-seen order.
    slot_pairs: HashMap<SlotKey, Vec<PairStats>>,
    /// Pairs observed anywhere on a (location, day), first-seen order.
    day_pairs: HashMap<(String, Weekday), Vec<PairStats>>,
    slot_times: HashMap<(String, Weekday), BTreeSet<TimeOfDay>>,
    /// Per-teacher format tallies, first-seen order.
    teacher_formats: HashMap<String, Vec<(String, Tally)>>,
    indexed: usize,
    excluded: usize,
}

impl HistoricalPerformanceIndex {
    /// Builds the index, applying the permanent exclusions.
    pub fn build(records: &[PerformanceRecord], roster: &TrainerRoster) -> Self {
        let mut index = Self::default();

        for record in records {
            if !Self::is_indexable(record, roster) {
                index.excluded += 1;
                continue;
            }
            index.indexed += 1;

            let key = SlotKey::new(record.location.clone(), record.day, record.time);
            add_pair(index.slot_pairs.entry(key).or_default(), record);

            let day_key = (record.location.clone(), record.day);
            add_pair(index.day_pairs.entry(day_key.clone()).or_default(), record);
            index
                .slot_times
                .entry(day_key)
                .or_default()
                .insert(record.time);

            let formats = index
                .teacher_formats
                .entry(record.teacher.clone())
                .or_default();
            match formats.iter_mut().find(|(f, _)| *f == record.format) {
                Some((_, tally)) => tally.add(record),
                None => {
                    let mut tally = Tally::default();
                    tally.add(record);
                    formats.push((record.format.clone(), tally));
                }
            }
        }

        tracing::debug!(
            indexed = index.indexed,
            excluded = index.excluded,
            slots = index.slot_pairs.len(),
            "built historical performance index"
        );
        index
    }

    fn is_indexable(record: &PerformanceRecord, roster: &TrainerRoster) -> bool {
        !record.teacher.is_empty()
            && !format::is_hosted(&record.format)
            && !format::has_qualifier(&record.format)
            && !roster.is_inactive(&record.teacher)
    }

    /// Stats of a format at a slot, over all teachers.
    pub fn stats(&self, format: &str, location: &str, day: Weekday, time: TimeOfDay) -> SlotStats {
        let mut tally = Tally::default();
        for pair in self.pairs_at(location, day, time) {
            if pair.format == format {
                tally.merge(&pair.tally);
            }
        }
        tally.stats()
    }

    /// Stats of a format taught by one teacher at a slot.
    pub fn teacher_stats(
        &self,
        format: &str,
        location: &str,
        day: Weekday,
        time: TimeOfDay,
        teacher: &str,
    ) -> SlotStats {
        self.pairs_at(location, day, time)
            .iter()
            .find(|p| p.format == format && p.teacher == teacher)
            .map(PairStats::stats)
            .unwrap_or_default()
    }

    /// Pairs observed at an exact slot, first-seen order.
    pub fn pairs_at(&self, location: &str, day: Weekday, time: TimeOfDay) -> &[PairStats] {
        self.slot_pairs
            .get(&SlotKey::new(location, day, time))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pairs observed anywhere on a (location, day), first-seen order.
    pub fn day_pairs(&self, location: &str, day: Weekday) -> &[PairStats] {
        self.day_pairs
            .get(&(location.to_string(), day))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Start times with at least one record at (location, day), ascending.
    pub fn slot_times(&self, location: &str, day: Weekday) -> Vec<TimeOfDay> {
        self.slot_times
            .get(&(location.to_string(), day))
            .map(|times| times.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = (&SlotKey, &Vec<PairStats>)> {
        self.slot_pairs.iter()
    }

    pub(crate) fn teacher_formats(&self, teacher: &str) -> &[(String, Tally)] {
        self.teacher_formats
            .get(teacher)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Records that entered the index.
    pub fn len(&self) -> usize {
        self.indexed
    }

    pub fn is_empty(&self) -> bool {
        self.indexed == 0
    }

    /// Records dropped by the exclusion rules.
    pub fn excluded_count(&self) -> usize {
        self.excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trainer;

    fn rec(
        format: &str,
        location: &str,
        day: Weekday,
        hour: u16,
        minute: u16,
        teacher: &str,
        checked_in: f64,
    ) -> PerformanceRecord {
        PerformanceRecord::new(
            format,
            location,
            day,
            TimeOfDay::from_hm(hour, minute),
            teacher,
            checked_in,
        )
    }

    #[test]
    fn test_slot_stats() {
        let records = vec![
            rec("Studio Barre 57", "Kenkere House", Weekday::Mon, 7, 0, "Anisha Shah", 8.0)
                .with_revenue(4000.0),
            rec("Studio Barre 57", "Kenkere House", Weekday::Mon, 7, 0, "Anisha Shah", 6.0)
                .with_revenue(2000.0),
            rec("Studio Barre 57", "Kenkere House", Weekday::Mon, 7, 0, "Vivaran Dhasmana", 4.0),
        ];
        let index = HistoricalPerformanceIndex::build(&records, &TrainerRoster::new());

        let all = index.stats(
            "Studio Barre 57",
            "Kenkere House",
            Weekday::Mon,
            TimeOfDay::from_hm(7, 0),
        );
        assert_eq!(all.sample_count, 3);
        assert!((all.avg_checked_in - 6.0).abs() < 1e-10);
        assert!((all.avg_revenue - 2000.0).abs() < 1e-10);

        let anisha = index.teacher_stats(
            "Studio Barre 57",
            "Kenkere House",
            Weekday::Mon,
            TimeOfDay::from_hm(7, 0),
            "Anisha Shah",
        );
        assert_eq!(anisha.sample_count, 2);
        assert!((anisha.avg_checked_in - 7.0).abs() < 1e-10);
        assert_eq!(index.pairs_at("Kenkere House", Weekday::Mon, TimeOfDay::from_hm(7, 0)).len(), 2);
    }

    #[test]
    fn test_unseen_key_is_empty() {
        let index = HistoricalPerformanceIndex::build(&[], &TrainerRoster::new());
        let s = index.stats("Studio FIT", "Nowhere", Weekday::Tue, TimeOfDay::from_hm(9, 0));
        assert!(s.is_empty());
        assert!(index.pairs_at("Nowhere", Weekday::Tue, TimeOfDay::from_hm(9, 0)).is_empty());
        assert!(index.slot_times("Nowhere", Weekday::Tue).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_exclusions() {
        let roster = TrainerRoster::new().with_trainer(Trainer::inactive("Nishanth R"));
        let records = vec![
            rec("Studio Hosted Class", "Kenkere House", Weekday::Mon, 9, 0, "Anisha Shah", 12.0),
            rec("Studio FIT - Outdoor", "Kenkere House", Weekday::Mon, 9, 0, "Anisha Shah", 12.0),
            rec("Studio FIT", "Kenkere House", Weekday::Mon, 9, 0, "Nishanth R", 12.0),
            rec("Studio FIT", "Kenkere House", Weekday::Mon, 9, 0, "", 12.0),
            rec("Studio FIT", "Kenkere House", Weekday::Mon, 9, 0, "Anisha Shah", 5.0),
        ];
        let index = HistoricalPerformanceIndex::build(&records, &roster);
        assert_eq!(index.len(), 1);
        assert_eq!(index.excluded_count(), 4);
        let pairs = index.pairs_at("Kenkere House", Weekday::Mon, TimeOfDay::from_hm(9, 0));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].teacher, "Anisha Shah");
    }

    #[test]
    fn test_slot_times_and_day_pairs() {
        let records = vec![
            rec("Studio FIT", "Kenkere House", Weekday::Wed, 18, 0, "Anisha Shah", 5.0),
            rec("Studio Mat 57", "Kenkere House", Weekday::Wed, 7, 30, "Reshma Sharma", 6.0),
            rec("Studio FIT", "Kenkere House", Weekday::Wed, 9, 0, "Anisha Shah", 7.0),
            rec("Studio FIT", "Kenkere House", Weekday::Thu, 9, 0, "Anisha Shah", 7.0),
        ];
        let index = HistoricalPerformanceIndex::build(&records, &TrainerRoster::new());
        assert_eq!(
            index.slot_times("Kenkere House", Weekday::Wed),
            vec![
                TimeOfDay::from_hm(7, 30),
                TimeOfDay::from_hm(9, 0),
                TimeOfDay::from_hm(18, 0)
            ]
        );

        let pairs = index.day_pairs("Kenkere House", Weekday::Wed);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].format, "Studio FIT"); // first seen
        assert_eq!(pairs[0].stats().sample_count, 2);
        assert!((pairs[0].stats().avg_checked_in - 6.0).abs() < 1e-10);
    }
}
