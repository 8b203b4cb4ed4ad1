// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Bounded, ordered image store with a current selection.
//!
//! Entries are kept in arrival order. When the store grows past its
//! capacity the oldest entry is dropped. Every entry keeps its original
//! pixels (`baseline`) untouched and applies transforms to a separate
//! `working` buffer.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Weak};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::Config;
use crate::curve::Curve;
use crate::error::Result;
use crate::permute;
use crate::pixels::PixelBuffer;

/// One loaded image.
#[derive(Debug)]
pub struct Entry {
    identifier: String,
    baseline: PixelBuffer,
    working: PixelBuffer,
    curve: Arc<Curve>,
}

impl Entry {
    fn new(identifier: String, baseline: PixelBuffer, curve: Arc<Curve>) -> Self {
        debug_assert_eq!(curve.len(), baseline.pixel_count());
        let working = baseline.clone();
        Self {
            identifier,
            baseline,
            working,
            curve,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Pixels as loaded. Never changes.
    pub fn baseline(&self) -> &PixelBuffer {
        &self.baseline
    }

    /// Pixels currently displayed.
    pub fn working(&self) -> &PixelBuffer {
        &self.working
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn width(&self) -> usize {
        self.baseline.width()
    }

    pub fn height(&self) -> usize {
        self.baseline.height()
    }

    /// True if `working` no longer matches `baseline`.
    pub fn is_modified(&self) -> bool {
        self.working != self.baseline
    }

    fn apply_forward(&mut self) -> Result<()> {
        self.working = permute::forward(&self.curve, &self.working)?;
        debug!(identifier = %self.identifier, "forward applied");
        Ok(())
    }

    fn apply_inverse(&mut self) -> Result<()> {
        self.working = permute::inverse(&self.curve, &self.working)?;
        debug!(identifier = %self.identifier, "inverse applied");
        Ok(())
    }

    fn revert(&mut self) {
        self.working = self.baseline.clone();
        debug!(identifier = %self.identifier, "reverted");
    }
}

/// State transition reported to observers after it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added { index: usize },
    /// Oldest entry dropped to respect capacity.
    Evicted { identifier: String },
    Removed { index: usize, identifier: String },
    Cleared,
    /// Current selection changed, or the entry under it did.
    SelectionChanged { index: Option<usize> },
    WorkingChanged { index: usize },
}

pub trait StoreObserver: Send + Sync {
    fn notify(&self, event: &StoreEvent);
}

impl<F> StoreObserver for F
where
    F: Fn(&StoreEvent) + Send + Sync,
{
    fn notify(&self, event: &StoreEvent) {
        self(event)
    }
}

pub struct ImageStore {
    capacity: usize,
    entries: VecDeque<Entry>,
    current: Option<usize>,
    curves: HashMap<(usize, usize), Weak<Curve>>,
    observers: Vec<Box<dyn StoreObserver>>,
}

impl fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageStore")
            .field("capacity", &self.capacity)
            .field("entries", &self.entries.len())
            .field("current", &self.current)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ImageStore {
    /// Empty store holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(64)),
            current: None,
            curves: HashMap::new(),
            observers: Vec::new(),
        }
    }

    pub fn with_config(config: &Config) -> Self {
        Self::new(config.capacity)
    }

    pub fn subscribe(&mut self, observer: Box<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&Entry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    pub fn item_at(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Position of `entry` in the store, compared by identity.
    pub fn index_of(&self, entry: &Entry) -> Option<usize> {
        self.entries.iter().position(|e| std::ptr::eq(e, entry))
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.entries.iter()
    }

    /// Appends a new entry and selects it. Evicts the oldest entry if
    /// the store is over capacity. Returns the index of the new entry.
    pub fn add(&mut self, identifier: impl Into<String>, baseline: PixelBuffer) -> Result<usize> {
        let identifier = identifier.into();
        let curve = self.curve_for(baseline.width(), baseline.height())?;

        info!(%identifier, width = baseline.width(), height = baseline.height(), "adding image");
        self.entries.push_back(Entry::new(identifier, baseline, curve));

        if self.entries.len() > self.capacity {
            if let Some(old) = self.entries.pop_front() {
                info!(identifier = %old.identifier, "evicting oldest image");
                self.emit(StoreEvent::Evicted {
                    identifier: old.identifier,
                });
            }
            self.prune_curves();
        }

        let index = self.entries.len() - 1;
        self.emit(StoreEvent::Added { index });
        self.current = Some(index);
        self.emit(StoreEvent::SelectionChanged { index: Some(index) });
        Ok(index)
    }

    /// Selects `index`. Out of range leaves the selection untouched and
    /// returns `None`.
    pub fn set_current(&mut self, index: usize) -> Option<&Entry> {
        if index >= self.entries.len() {
            return None;
        }
        self.select(Some(index));
        self.entries.get(index)
    }

    pub fn next(&mut self) -> Option<usize> {
        let last = self.entries.len().checked_sub(1)?;
        let index = self.current.map_or(0, |i| (i + 1).min(last));
        self.select(Some(index));
        self.current
    }

    pub fn previous(&mut self) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let index = self.current.map_or(0, |i| i.saturating_sub(1));
        self.select(Some(index));
        self.current
    }

    /// Replaces the working buffer of entry `index` with its forward
    /// permutation. Returns false if there is no such entry.
    pub fn apply_forward(&mut self, index: usize) -> Result<bool> {
        let Some(entry) = self.entries.get_mut(index) else {
            return Ok(false);
        };
        entry.apply_forward()?;
        self.emit(StoreEvent::WorkingChanged { index });
        Ok(true)
    }

    pub fn apply_inverse(&mut self, index: usize) -> Result<bool> {
        let Some(entry) = self.entries.get_mut(index) else {
            return Ok(false);
        };
        entry.apply_inverse()?;
        self.emit(StoreEvent::WorkingChanged { index });
        Ok(true)
    }

    /// Restores the baseline of entry `index`, undoing every transform.
    pub fn revert(&mut self, index: usize) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        entry.revert();
        self.emit(StoreEvent::WorkingChanged { index });
        true
    }

    pub fn apply_forward_current(&mut self) -> Result<bool> {
        match self.current {
            Some(i) => self.apply_forward(i),
            None => Ok(false),
        }
    }

    pub fn apply_inverse_current(&mut self) -> Result<bool> {
        match self.current {
            Some(i) => self.apply_inverse(i),
            None => Ok(false),
        }
    }

    pub fn revert_current(&mut self) -> bool {
        match self.current {
            Some(i) => self.revert(i),
            None => false,
        }
    }

    /// Forward permutation on every entry, entries processed in parallel.
    #[tracing::instrument(level = "debug", skip(self), fields(entries = self.entries.len()))]
    pub fn apply_forward_all(&mut self) -> Result<()> {
        self.entries.par_iter_mut().try_for_each(Entry::apply_forward)?;
        self.emit_all_changed();
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self), fields(entries = self.entries.len()))]
    pub fn apply_inverse_all(&mut self) -> Result<()> {
        self.entries.par_iter_mut().try_for_each(Entry::apply_inverse)?;
        self.emit_all_changed();
        Ok(())
    }

    pub fn revert_all(&mut self) {
        self.entries.par_iter_mut().for_each(Entry::revert);
        self.emit_all_changed();
    }

    /// Removes entry `index`.
    ///
    /// A selection past the removed entry shifts down with it. When the
    /// selected entry itself goes, the entry now at that position (or the
    /// new last one) becomes current.
    pub fn remove(&mut self, index: usize) -> Option<Entry> {
        let entry = self.entries.remove(index)?;
        info!(identifier = %entry.identifier, index, "removing image");
        // The returned entry still holds its curve; forget the size if
        // nothing else in the store uses it.
        if Arc::strong_count(&entry.curve) == 1 {
            self.curves.remove(&(entry.width(), entry.height()));
        }

        let len = self.entries.len();
        self.current = match self.current {
            _ if len == 0 => None,
            Some(c) if c > index => Some(c - 1),
            Some(c) => Some(c.min(len - 1)),
            None => None,
        };

        self.emit(StoreEvent::Removed {
            index,
            identifier: entry.identifier.clone(),
        });
        self.emit(StoreEvent::SelectionChanged {
            index: self.current,
        });
        Some(entry)
    }

    /// Removes the selected entry. No-op without a selection.
    pub fn remove_current(&mut self) -> Option<Entry> {
        self.current.and_then(|i| self.remove(i))
    }

    pub fn remove_all(&mut self) {
        info!(count = self.entries.len(), "clearing store");
        self.entries.clear();
        self.curves.clear();
        self.emit(StoreEvent::Cleared);
        self.select(None);
    }

    /// Shared curve for `width * height`, generated on first use.
    fn curve_for(&mut self, width: usize, height: usize) -> Result<Arc<Curve>> {
        if let Some(curve) = self.curves.get(&(width, height)).and_then(Weak::upgrade) {
            debug!(width, height, "reusing cached curve");
            return Ok(curve);
        }
        let curve = Arc::new(Curve::generate(width, height)?);
        self.prune_curves();
        self.curves.insert((width, height), Arc::downgrade(&curve));
        Ok(curve)
    }

    fn prune_curves(&mut self) {
        self.curves.retain(|_, c| c.strong_count() > 0);
    }

    fn select(&mut self, index: Option<usize>) {
        if self.current != index {
            self.current = index;
            self.emit(StoreEvent::SelectionChanged { index });
        }
    }

    fn emit_all_changed(&self) {
        for index in 0..self.entries.len() {
            self.emit(StoreEvent::WorkingChanged { index });
        }
    }

    fn emit(&self, event: StoreEvent) {
        for o in &self.observers {
            o.notify(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn image(w: usize, h: usize, seed: u8) -> PixelBuffer {
        let bytes = (0..w * h * 4).map(|i| (i as u8).wrapping_mul(31) ^ seed).collect();
        PixelBuffer::from_raw(w, h, bytes).unwrap()
    }

    fn ids(store: &ImageStore) -> Vec<&str> {
        store.entries().map(Entry::identifier).collect()
    }

    fn recording(store: &mut ImageStore) -> Arc<Mutex<Vec<StoreEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        store.subscribe(Box::new(move |e: &StoreEvent| {
            sink.lock().unwrap().push(e.clone())
        }));
        log
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut store = ImageStore::new(2);
        store.add("a", image(2, 2, 1)).unwrap();
        store.add("b", image(2, 2, 2)).unwrap();
        let idx = store.add("c", image(2, 2, 3)).unwrap();

        assert_eq!(ids(&store), ["b", "c"]);
        assert_eq!(idx, 1);
        assert_eq!(store.current_index(), Some(1));
        assert_eq!(store.current().unwrap().identifier(), "c");
    }

    #[test]
    fn capacity_never_exceeded() {
        let mut store = ImageStore::new(3);
        for i in 0..10u8 {
            store.add(format!("img{i}"), image(3, 1, i)).unwrap();
            assert!(store.len() <= 3);
        }
        assert_eq!(ids(&store), ["img7", "img8", "img9"]);
    }

    #[test]
    fn zero_capacity_is_raised() {
        let mut store = ImageStore::new(0);
        assert_eq!(store.capacity(), 1);
        store.add("a", image(1, 1, 0)).unwrap();
        store.add("b", image(1, 1, 0)).unwrap();
        assert_eq!(ids(&store), ["b"]);
        assert_eq!(store.current_index(), Some(0));
    }

    #[test]
    fn navigation_is_clamped() {
        let mut store = ImageStore::new(5);
        assert_eq!(store.next(), None);
        assert_eq!(store.previous(), None);
        assert_eq!(store.current_index(), None);

        for n in ["a", "b", "c"] {
            store.add(n, image(1, 1, 0)).unwrap();
        }
        assert_eq!(store.next(), Some(2));
        assert_eq!(store.previous(), Some(1));
        assert_eq!(store.previous(), Some(0));
        assert_eq!(store.previous(), Some(0));
        assert_eq!(store.next(), Some(1));
    }

    #[test]
    fn set_current_out_of_range_is_none() {
        let mut store = ImageStore::new(5);
        store.add("a", image(1, 1, 0)).unwrap();
        store.add("b", image(1, 1, 0)).unwrap();

        assert_eq!(store.set_current(0).map(Entry::identifier), Some("a"));
        assert!(store.set_current(2).is_none());
        assert_eq!(store.current_index(), Some(0));
        assert!(store.item_at(2).is_none());
    }

    #[test]
    fn index_of_uses_identity() {
        let mut store = ImageStore::new(5);
        store.add("a", image(2, 1, 0)).unwrap();
        store.add("a", image(2, 1, 0)).unwrap();

        let second = store.item_at(1).unwrap();
        assert_eq!(store.index_of(second), Some(1));

        let stranger = Entry::new(
            "a".into(),
            image(2, 1, 0),
            Arc::new(Curve::generate(2, 1).unwrap()),
        );
        assert_eq!(store.index_of(&stranger), None);
    }

    #[test]
    fn revert_undoes_every_forward() {
        let mut store = ImageStore::new(2);
        let i = store.add("a", image(4, 3, 9)).unwrap();
        assert!(store.apply_forward(i).unwrap());
        assert!(store.apply_forward(i).unwrap());
        assert!(store.item_at(i).unwrap().is_modified());

        assert!(store.revert(i));
        let e = store.item_at(i).unwrap();
        assert_eq!(e.working(), e.baseline());
        assert!(!e.is_modified());
    }

    #[test]
    fn forward_then_inverse_restores() {
        let mut store = ImageStore::new(2);
        let i = store.add("a", image(7, 5, 3)).unwrap();
        store.apply_forward(i).unwrap();
        store.apply_inverse(i).unwrap();
        assert!(!store.item_at(i).unwrap().is_modified());
    }

    #[test]
    fn invalid_index_is_noop() {
        let mut store = ImageStore::new(2);
        assert!(!store.apply_forward(0).unwrap());
        assert!(!store.apply_inverse(3).unwrap());
        assert!(!store.revert(1));
        assert!(!store.apply_forward_current().unwrap());
    }

    #[test]
    fn all_variants_touch_every_entry() {
        let mut store = ImageStore::new(4);
        store.add("a", image(3, 3, 1)).unwrap();
        store.add("b", image(5, 2, 2)).unwrap();
        store.add("c", image(3, 3, 3)).unwrap();

        store.apply_forward_all().unwrap();
        assert!(store.entries().all(Entry::is_modified));

        store.apply_inverse_all().unwrap();
        assert!(store.entries().all(|e| !e.is_modified()));

        store.apply_inverse_all().unwrap();
        store.revert_all();
        assert!(store.entries().all(|e| !e.is_modified()));
    }

    #[test]
    fn same_size_entries_share_curve() {
        let mut store = ImageStore::new(4);
        store.add("a", image(6, 4, 1)).unwrap();
        store.add("b", image(6, 4, 2)).unwrap();
        store.add("c", image(4, 6, 3)).unwrap();

        let a = store.item_at(0).unwrap().curve();
        let b = store.item_at(1).unwrap().curve();
        let c = store.item_at(2).unwrap().curve();
        assert!(std::ptr::eq(a, b));
        assert!(!std::ptr::eq(a, c));
        assert_eq!(c.len(), 24);
    }

    #[test]
    fn curve_cache_drops_with_entries() {
        let mut store = ImageStore::new(1);
        store.add("a", image(6, 4, 1)).unwrap();
        store.add("b", image(2, 2, 1)).unwrap();
        assert_eq!(store.curves.len(), 1);
        assert!(store.curves.contains_key(&(2, 2)));
    }

    #[test]
    fn curve_cache_forgets_removed_sizes() {
        let mut store = ImageStore::new(4);
        store.add("a", image(6, 4, 1)).unwrap();
        store.add("b", image(2, 2, 1)).unwrap();
        store.add("c", image(2, 2, 2)).unwrap();

        let c = store.remove_current().unwrap();
        assert!(store.curves.contains_key(&(2, 2)), "b still uses 2x2");
        drop(c);

        store.set_current(0);
        let a = store.remove_current().unwrap();
        assert!(!store.curves.contains_key(&(6, 4)));
        assert_eq!(a.curve().len(), 24);
        assert_eq!(store.curves.len(), 1);

        store.remove_current();
        assert!(store.curves.is_empty());
    }

    #[test]
    fn remove_current_keeps_position() {
        let mut store = ImageStore::new(5);
        for n in ["a", "b", "c"] {
            store.add(n, image(1, 1, 0)).unwrap();
        }
        store.set_current(1);

        let gone = store.remove_current().unwrap();
        assert_eq!(gone.identifier(), "b");
        assert_eq!(ids(&store), ["a", "c"]);
        assert_eq!(store.current().unwrap().identifier(), "c");

        store.remove_current();
        assert_eq!(store.current().unwrap().identifier(), "a");

        store.remove_current();
        assert!(store.is_empty());
        assert_eq!(store.current_index(), None);

        assert!(store.remove_current().is_none());
    }

    #[test]
    fn remove_before_selection_shifts_it() {
        let mut store = ImageStore::new(5);
        for n in ["a", "b", "c"] {
            store.add(n, image(1, 1, 0)).unwrap();
        }
        store.remove(0);
        assert_eq!(store.current_index(), Some(1));
        assert_eq!(store.current().unwrap().identifier(), "c");
    }

    #[test]
    fn remove_all_clears_selection() {
        let mut store = ImageStore::new(5);
        store.add("a", image(1, 1, 0)).unwrap();
        store.add("b", image(1, 1, 0)).unwrap();
        store.remove_all();
        assert!(store.is_empty());
        assert_eq!(store.current_index(), None);
        assert!(store.current().is_none());
    }

    #[test]
    fn observers_see_transitions() {
        let mut store = ImageStore::new(1);
        let log = recording(&mut store);

        store.add("a", image(2, 2, 0)).unwrap();
        store.add("b", image(2, 2, 0)).unwrap();
        store.apply_forward(0).unwrap();
        store.remove_current();

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            [
                StoreEvent::Added { index: 0 },
                StoreEvent::SelectionChanged { index: Some(0) },
                StoreEvent::Evicted {
                    identifier: "a".into()
                },
                StoreEvent::Added { index: 0 },
                StoreEvent::SelectionChanged { index: Some(0) },
                StoreEvent::WorkingChanged { index: 0 },
                StoreEvent::Removed {
                    index: 0,
                    identifier: "b".into()
                },
                StoreEvent::SelectionChanged { index: None },
            ]
        );
    }
}
