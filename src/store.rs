use crate::model::Movie;
use chrono::{DateTime, FixedOffset, Local};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Slot {
    /// Insertion sequence, used to keep equal oscars counts in insertion order.
    seq: u64,
    movie: Movie,
}

/// Keyed collection of movies.
///
/// The store never fails: callers check existence and emptiness before mutating and translate
/// absence into domain errors themselves. Bulk removals build the surviving map first and then
/// swap it in, so a caller never observes a half-filtered collection.
#[derive(Debug, Clone)]
pub struct MovieStore {
    entries: BTreeMap<i32, Slot>,
    creation_date: DateTime<FixedOffset>,
    next_seq: u64,
}

impl Default for MovieStore {
    fn default() -> Self {
        Self::new(Local::now().fixed_offset())
    }
}

impl MovieStore {
    pub fn new(creation_date: DateTime<FixedOffset>) -> Self {
        Self {
            entries: BTreeMap::new(),
            creation_date,
            next_seq: 0,
        }
    }

    pub fn creation_date(&self) -> DateTime<FixedOffset> {
        self.creation_date
    }

    pub fn get(&self, key: i32) -> Option<&Movie> {
        self.entries.get(&key).map(|slot| &slot.movie)
    }

    pub fn get_mut(&mut self, key: i32) -> Option<&mut Movie> {
        self.entries.get_mut(&key).map(|slot| &mut slot.movie)
    }

    pub fn contains_key(&self, key: i32) -> bool {
        self.entries.contains_key(&key)
    }

    /// Insert or overwrite. An overwritten entry keeps its place in the insertion order.
    pub fn put(&mut self, key: i32, movie: Movie) {
        match self.entries.get_mut(&key) {
            Some(slot) => slot.movie = movie,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.entries.insert(key, Slot { seq, movie });
            }
        }
    }

    pub fn remove(&mut self, key: i32) -> Option<Movie> {
        self.entries.remove(&key).map(|slot| slot.movie)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &Movie)> {
        self.entries.iter().map(|(key, slot)| (*key, &slot.movie))
    }

    /// Remove every movie with strictly more oscars than `reference`. Returns the removed count.
    pub fn remove_where_greater_than(&mut self, reference: &Movie) -> usize {
        let threshold = reference.oscars_count();
        self.retain_swapping(|_, movie| movie.oscars_count() <= threshold)
    }

    /// Remove every entry whose key is strictly below `key`. Returns the removed count.
    pub fn remove_where_key_less_than(&mut self, key: i32) -> usize {
        self.retain_swapping(|k, _| k >= key)
    }

    fn retain_swapping(&mut self, keep: impl Fn(i32, &Movie) -> bool) -> usize {
        let survivors: BTreeMap<i32, Slot> = self
            .entries
            .iter()
            .filter(|(key, slot)| keep(**key, &slot.movie))
            .map(|(key, slot)| (*key, slot.clone()))
            .collect();
        let removed = self.entries.len() - survivors.len();
        if removed > 0 {
            self.entries = survivors;
        }
        removed
    }

    /// Replace the movie at `key` when `candidate` has strictly fewer oscars.
    ///
    /// The candidate is stored under `key` with its id forced to `key`. Returns `false` when
    /// nothing was replaced, including when `key` is absent.
    pub fn replace_if_lower(&mut self, key: i32, candidate: Movie) -> bool {
        match self.entries.get_mut(&key) {
            Some(slot) if slot.movie.oscars_count() > candidate.oscars_count() => {
                slot.movie = candidate.with_id(key);
                true
            }
            _ => false,
        }
    }

    pub fn ascending_view(&self) -> Vec<&Movie> {
        let mut slots: Vec<&Slot> = self.entries.values().collect();
        slots.sort_by_key(|slot| (slot.movie.oscars_count(), slot.seq));
        slots.into_iter().map(|slot| &slot.movie).collect()
    }

    pub fn descending_view(&self) -> Vec<&Movie> {
        let mut view = self.ascending_view();
        view.reverse();
        view
    }

    /// Same ordering as [`MovieStore::descending_view`]: oscars count is the only key.
    pub fn oscars_descending_view(&self) -> Vec<&Movie> {
        self.descending_view()
    }
}
