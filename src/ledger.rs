//! Schedule ledger: committed classes plus per-teacher load indices.
//!
//! The ledger is the single mutable state of a synthesis run or an edit
//! session. Every commit updates the class list and the committing
//! teacher's load in one step; wholesale changes (remove, replace, undo,
//! redo, clear) rebuild the indices from the class list.
//!
//! # Undo History
//! Edit operations ([`ScheduleLedger::add`], [`remove`](ScheduleLedger::remove),
//! [`replace`](ScheduleLedger::replace), [`clear`](ScheduleLedger::clear),
//! [`set_classes`](ScheduleLedger::set_classes)) snapshot the class list
//! first. [`commit`](ScheduleLedger::commit) does not: a synthesis run commits
//! hundreds of classes and is recorded once with [`checkpoint`](ScheduleLedger::checkpoint).

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::models::{day_index, ScheduledClass, Shift, TimeOfDay};

/// Default id prefix for committed classes.
pub const DEFAULT_ID_PREFIX: &str = "class";

/// Shift pattern of a teacher's day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayShift {
    Morning,
    Afternoon,
    Evening,
    /// Classes in more than one shift.
    Mixed,
}

/// One teacher's load on one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayLoad {
    pub minutes: u32,
    pub classes: usize,
    /// Location taught at (at most one per day).
    pub location: Option<String>,
    pub shift: Option<DayShift>,
}

impl DayLoad {
    fn add(&mut self, class: &ScheduledClass) {
        self.minutes += u32::from(class.duration_minutes);
        self.classes += 1;
        if self.location.is_none() {
            self.location = Some(class.location.clone());
        }
        let shift = match class.shift() {
            Shift::Morning => DayShift::Morning,
            Shift::Afternoon => DayShift::Afternoon,
            Shift::Evening => DayShift::Evening,
        };
        self.shift = match self.shift {
            None => Some(shift),
            Some(current) if current == shift => Some(current),
            Some(_) => Some(DayShift::Mixed),
        };
    }

    pub fn hours(&self) -> f64 {
        self.minutes as f64 / 60.0
    }
}

/// One teacher's load across the week.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherLoad {
    pub weekly_minutes: u32,
    /// Indexed Monday = 0.
    pub days: [DayLoad; 7],
}

impl TeacherLoad {
    /// The load after adding `class`.
    fn with_class(&self, class: &ScheduledClass) -> Self {
        let mut next = self.clone();
        next.weekly_minutes += u32::from(class.duration_minutes);
        next.days[day_index(class.day)].add(class);
        next
    }

    pub fn weekly_hours(&self) -> f64 {
        self.weekly_minutes as f64 / 60.0
    }

    pub fn day(&self, day: Weekday) -> &DayLoad {
        &self.days[day_index(day)]
    }
}

/// Committed classes with per-teacher indices and undo history.
#[derive(Debug, Clone)]
pub struct ScheduleLedger {
    classes: Vec<ScheduledClass>,
    loads: HashMap<String, TeacherLoad>,
    id_prefix: String,
    next_seq: u64,
    undo_stack: Vec<Vec<ScheduledClass>>,
    redo_stack: Vec<Vec<ScheduledClass>>,
}

impl Default for ScheduleLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            loads: HashMap::new(),
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            next_seq: 1,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Creates a ledger holding existing classes (ids kept; missing ids
    /// are assigned).
    pub fn from_classes(classes: impl IntoIterator<Item = ScheduledClass>) -> Self {
        let mut ledger = Self::new();
        for class in classes {
            ledger.commit(class);
        }
        ledger
    }

    /// Sets the prefix for assigned ids.
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    fn contains_id(&self, id: &str) -> bool {
        self.classes.iter().any(|c| c.id == id)
    }

    /// Gives the class a fresh id when it has none or its id is taken.
    fn assign_id(&mut self, class: &mut ScheduledClass) {
        if !class.id.is_empty() && !self.contains_id(&class.id) {
            return;
        }
        if !class.id.is_empty() {
            tracing::debug!(id = %class.id, "duplicate class id reassigned");
        }
        loop {
            let candidate = format!("{}-{}", self.id_prefix, self.next_seq);
            self.next_seq += 1;
            if !self.contains_id(&candidate) {
                class.id = candidate;
                return;
            }
        }
    }

    /// Commits a class and updates its teacher's load.
    ///
    /// Assigns an id when the class has none or its id is already in the
    /// ledger, and returns the id. Generated ids skip every id present.
    /// The caller is responsible for validating the class first.
    pub fn commit(&mut self, mut class: ScheduledClass) -> String {
        self.assign_id(&mut class);
        let load = self
            .loads
            .get(&class.teacher)
            .cloned()
            .unwrap_or_default()
            .with_class(&class);
        let id = class.id.clone();
        self.loads.insert(class.teacher.clone(), load);
        self.classes.push(class);
        id
    }

    /// Records the current state as an undo point.
    pub fn checkpoint(&mut self) {
        self.undo_stack.push(self.classes.clone());
        self.redo_stack.clear();
    }

    /// Commits a class as an undoable edit.
    pub fn add(&mut self, class: ScheduledClass) -> String {
        self.checkpoint();
        self.commit(class)
    }

    /// Removes a class by id.
    pub fn remove(&mut self, id: &str) -> Result<ScheduledClass> {
        let pos = self.position(id)?;
        self.checkpoint();
        let removed = self.classes.remove(pos);
        self.rebuild_loads();
        Ok(removed)
    }

    /// Replaces a class in place, keeping its id.
    pub fn replace(&mut self, id: &str, mut class: ScheduledClass) -> Result<()> {
        let pos = self.position(id)?;
        self.checkpoint();
        class.id = id.to_string();
        self.classes[pos] = class;
        self.rebuild_loads();
        Ok(())
    }

    /// Replaces the whole class set.
    pub fn set_classes(&mut self, classes: Vec<ScheduledClass>) {
        self.checkpoint();
        self.restore(classes);
    }

    /// Removes every class.
    pub fn clear(&mut self) {
        self.set_classes(Vec::new());
    }

    /// Restores the previous undo point. Returns false when there is none.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.classes, previous);
                self.redo_stack.push(current);
                self.rebuild_loads();
                true
            }
            None => false,
        }
    }

    /// Re-applies the last undone change. Returns false when there is none.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.classes, next);
                self.undo_stack.push(current);
                self.rebuild_loads();
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn restore(&mut self, classes: Vec<ScheduledClass>) {
        self.classes = Vec::with_capacity(classes.len());
        self.loads.clear();
        for class in classes {
            self.commit(class);
        }
    }

    fn rebuild_loads(&mut self) {
        let classes = std::mem::take(&mut self.classes);
        self.restore(classes);
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.classes
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ScheduleError::ClassNotFound(id.to_string()))
    }

    // ======================== Queries ========================

    /// Committed classes in commit order.
    pub fn classes(&self) -> &[ScheduledClass] {
        &self.classes
    }

    pub fn into_classes(self) -> Vec<ScheduledClass> {
        self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ScheduledClass> {
        self.classes.iter().find(|c| c.id == id)
    }

    /// Classes at a location on a day.
    pub fn classes_on<'a>(
        &'a self,
        location: &'a str,
        day: Weekday,
    ) -> impl Iterator<Item = &'a ScheduledClass> + 'a {
        self.classes
            .iter()
            .filter(move |c| c.day == day && c.location == location)
    }

    /// Classes starting at an exact slot.
    pub fn classes_at<'a>(
        &'a self,
        location: &'a str,
        day: Weekday,
        time: TimeOfDay,
    ) -> impl Iterator<Item = &'a ScheduledClass> + 'a {
        self.classes_on(location, day).filter(move |c| c.time == time)
    }

    /// Number of classes at a location on a day.
    pub fn count_on(&self, location: &str, day: Weekday) -> usize {
        self.classes_on(location, day).count()
    }

    /// Occurrences of each format at a location on a day.
    pub fn format_counts(&self, location: &str, day: Weekday) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for class in self.classes_on(location, day) {
            *counts.entry(class.format.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// A teacher's classes on a day, by start time.
    pub fn teacher_classes_on(&self, teacher: &str, day: Weekday) -> Vec<&ScheduledClass> {
        let mut out: Vec<&ScheduledClass> = self
            .classes
            .iter()
            .filter(|c| c.day == day && c.teacher == teacher)
            .collect();
        out.sort_by_key(|c| c.time);
        out
    }

    pub fn teacher_load(&self, teacher: &str) -> Option<&TeacherLoad> {
        self.loads.get(teacher)
    }

    pub fn weekly_minutes(&self, teacher: &str) -> u32 {
        self.loads.get(teacher).map_or(0, |l| l.weekly_minutes)
    }

    pub fn weekly_hours(&self, teacher: &str) -> f64 {
        self.weekly_minutes(teacher) as f64 / 60.0
    }

    /// Teachers with loads, sorted by name.
    pub fn teachers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.loads.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Teachers already working a location, day and shift.
    pub fn teachers_in_shift(&self, location: &str, day: Weekday, shift: Shift) -> HashSet<String> {
        self.classes_on(location, day)
            .filter(|c| c.shift() == shift)
            .map(|c| c.teacher.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOC: &str = "Kenkere House";

    fn class(day: Weekday, hour: u16, format: &str, teacher: &str) -> ScheduledClass {
        ScheduledClass::new(day, TimeOfDay::from_hm(hour, 0), LOC, format, teacher)
    }

    #[test]
    fn test_commit_assigns_ids_and_loads() {
        let mut ledger = ScheduleLedger::new().with_id_prefix("wk");
        let a = ledger.commit(class(Weekday::Mon, 7, "Studio Barre 57", "Anisha Shah"));
        let b = ledger.commit(class(Weekday::Mon, 18, "Studio Barre 57 (Express)", "Anisha Shah"));
        let c = ledger.commit(class(Weekday::Tue, 9, "Studio FIT", "Richard D").with_id("kept"));

        assert_eq!(a, "wk-1");
        assert_eq!(b, "wk-2");
        assert_eq!(c, "kept");

        let load = ledger.teacher_load("Anisha Shah").unwrap();
        assert_eq!(load.weekly_minutes, 105);
        let mon = load.day(Weekday::Mon);
        assert_eq!(mon.classes, 2);
        assert_eq!(mon.minutes, 105);
        assert_eq!(mon.location.as_deref(), Some(LOC));
        assert_eq!(mon.shift, Some(DayShift::Mixed));
        assert_eq!(load.day(Weekday::Tue).classes, 0);
        assert_eq!(
            ledger.teacher_load("Richard D").unwrap().day(Weekday::Tue).shift,
            Some(DayShift::Morning)
        );
        assert!((ledger.weekly_hours("Anisha Shah") - 1.75).abs() < 1e-10);
        assert_eq!(ledger.weekly_minutes("Nobody"), 0);
    }

    #[test]
    fn test_queries() {
        let mut ledger = ScheduleLedger::new();
        ledger.commit(class(Weekday::Wed, 7, "Studio Barre 57", "Anisha Shah"));
        ledger.commit(class(Weekday::Wed, 7, "Studio FIT", "Richard D"));
        ledger.commit(class(Weekday::Wed, 18, "Studio Barre 57", "Reshma Sharma"));
        ledger.commit(
            ScheduledClass::new(Weekday::Wed, TimeOfDay::from_hm(7, 0), "Supreme HQ, Bandra", "Studio FIT", "Pranjali Jain"),
        );

        assert_eq!(ledger.count_on(LOC, Weekday::Wed), 3);
        assert_eq!(ledger.classes_at(LOC, Weekday::Wed, TimeOfDay::from_hm(7, 0)).count(), 2);
        let counts = ledger.format_counts(LOC, Weekday::Wed);
        assert_eq!(counts.get("Studio Barre 57"), Some(&2));
        assert_eq!(counts.get("Studio FIT"), Some(&1));

        let morning = ledger.teachers_in_shift(LOC, Weekday::Wed, Shift::Morning);
        assert_eq!(morning.len(), 2);
        assert!(morning.contains("Richard D"));
        assert_eq!(ledger.teachers().len(), 4);
    }

    #[test]
    fn test_remove_and_replace_rebuild_loads() {
        let mut ledger = ScheduleLedger::new();
        let id = ledger.commit(class(Weekday::Mon, 7, "Studio Barre 57", "Anisha Shah"));
        ledger.commit(class(Weekday::Mon, 9, "Studio FIT", "Anisha Shah"));

        ledger
            .replace(&id, class(Weekday::Fri, 8, "Studio Mat 57", "Reshma Sharma"))
            .unwrap();
        assert_eq!(ledger.get(&id).unwrap().teacher, "Reshma Sharma");
        assert_eq!(ledger.weekly_minutes("Anisha Shah"), 60);
        assert_eq!(ledger.weekly_minutes("Reshma Sharma"), 60);

        let removed = ledger.remove(&id).unwrap();
        assert_eq!(removed.format, "Studio Mat 57");
        assert_eq!(ledger.weekly_minutes("Reshma Sharma"), 0);
        assert!(matches!(ledger.remove("missing"), Err(ScheduleError::ClassNotFound(_))));
    }

    #[test]
    fn test_undo_redo() {
        let mut ledger = ScheduleLedger::new();
        assert!(!ledger.undo());

        let first = ledger.add(class(Weekday::Mon, 7, "Studio Barre 57", "Anisha Shah"));
        ledger.add(class(Weekday::Mon, 9, "Studio FIT", "Richard D"));
        assert_eq!(ledger.len(), 2);

        assert!(ledger.undo());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.weekly_minutes("Richard D"), 0);
        assert!(ledger.can_redo());

        assert!(ledger.redo());
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.weekly_minutes("Richard D"), 60);

        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.undo());
        assert_eq!(ledger.len(), 2);
        assert!(ledger.get(&first).is_some());

        // a new edit drops the redo branch
        assert!(ledger.undo());
        ledger.add(class(Weekday::Tue, 8, "Studio FIT", "Richard D"));
        assert!(!ledger.can_redo());
    }

    #[test]
    fn test_commit_is_not_recorded() {
        let mut ledger = ScheduleLedger::new();
        ledger.commit(class(Weekday::Mon, 7, "Studio Barre 57", "Anisha Shah"));
        assert!(!ledger.can_undo());
        ledger.checkpoint();
        ledger.commit(class(Weekday::Mon, 9, "Studio FIT", "Richard D"));
        assert!(ledger.undo());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_from_classes() {
        let ledger = ScheduleLedger::from_classes(vec![
            class(Weekday::Sat, 10, "Studio FIT", "Richard D").with_id("a"),
            class(Weekday::Sat, 11, "Studio FIT", "Richard D"),
        ]);
        assert_eq!(ledger.classes()[0].id, "a");
        assert_eq!(ledger.classes()[1].id, "class-1");
        assert_eq!(ledger.teacher_load("Richard D").unwrap().day(Weekday::Sat).classes, 2);
    }

    #[test]
    fn test_generated_ids_skip_existing() {
        let mut ledger = ScheduleLedger::from_classes(vec![
            class(Weekday::Thu, 7, "Studio FIT", "Richard D").with_id("class-1"),
            class(Weekday::Thu, 9, "Studio FIT", "Richard D").with_id("class-2"),
        ]);
        let next = ledger.commit(class(Weekday::Thu, 18, "Studio Barre 57", "Anisha Shah"));
        assert_eq!(next, "class-3");

        // an explicit id already in use is replaced
        let clash = ledger.add(class(Weekday::Fri, 7, "Studio Mat 57", "Reshma Sharma").with_id("class-1"));
        assert_eq!(clash, "class-4");
        assert_eq!(ledger.get("class-1").unwrap().day, Weekday::Thu);

        let mut ids: Vec<&str> = ledger.classes().iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), ledger.len());
    }
}
