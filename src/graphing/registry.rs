//! Ordered collection of the equations the user has entered.
use std::collections::VecDeque;
use std::fmt;

use log::{debug, info, warn};
use plotters::style::{Color, Palette, Palette99};

use crate::graphing::classifier::{Classification, EquationClassifier, Family};
use crate::graphing::config::RegistryConfig;
use crate::graphing::error::{PlotError, Result};
use crate::graphing::evaluator::{ExpressionEvaluator, SymbolicEvaluator};
use crate::graphing::surface::Rgba;

/// Stable identifier of a registry entry; never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One equation row: raw text, its cached classification and its style.
#[derive(Debug)]
pub struct FunctionEntry {
    id: EntryId,
    raw_input: String,
    classification: Classification,
    color: Rgba,
    visible: bool,
    revision: u64,
}

impl FunctionEntry {
    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Family tag; `None` for input that could not be attributed to any family.
    pub fn family(&self) -> Option<Family> {
        self.classification.family()
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// True when classification or compilation failed.
    pub fn has_error(&self) -> bool {
        !self.classification.is_valid()
    }

    pub fn error(&self) -> Option<&PlotError> {
        self.classification.error()
    }

    /// Bumped on every change of the raw input.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// visible and free of errors
    pub fn is_drawable(&self) -> bool {
        self.visible && !self.has_error()
    }
}

/// the i-th colour of the plotters 99-colour palette
pub fn palette_color(index: usize) -> Rgba {
    Rgba::from(Palette99::pick(index).to_rgba())
}

pub struct FunctionRegistry {
    entries: Vec<FunctionEntry>,
    next_id: u64,
    colors_assigned: usize,
    history: VecDeque<String>,
    history_capacity: usize,
    evaluator: Box<dyn ExpressionEvaluator>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("entries", &self.entries)
            .field("next_id", &self.next_id)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new(&RegistryConfig::default())
    }
}

impl FunctionRegistry {
    /// Registry compiling with the built-in [`SymbolicEvaluator`].
    pub fn new(config: &RegistryConfig) -> Self {
        Self::with_evaluator(config, Box::new(SymbolicEvaluator))
    }

    pub fn with_evaluator(config: &RegistryConfig, evaluator: Box<dyn ExpressionEvaluator>) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            colors_assigned: 0,
            history: VecDeque::new(),
            history_capacity: config.history_capacity,
            evaluator,
        }
    }

    fn classify(&self, raw_input: &str) -> Classification {
        EquationClassifier::new(self.evaluator.as_ref()).classify(raw_input)
    }

    fn remember(&mut self, raw_input: &str) {
        if self.history_capacity == 0 {
            return;
        }
        let text = raw_input.trim();
        if self.history.back().is_some_and(|last| last == text) {
            return;
        }
        while self.history.len() >= self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(text.to_string());
    }

    /// Appends a new entry. Input that fails to classify is kept, flagged with its error.
    pub fn add(&mut self, raw_input: &str) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        let classification = self.classify(raw_input);
        match classification.error() {
            None => {
                info!("added {} `{}` as {:?}", id, raw_input.trim(), classification.family());
                self.remember(raw_input);
            }
            Some(e) => warn!("added {} `{}` with error: {}", id, raw_input.trim(), e),
        }
        let color = palette_color(self.colors_assigned);
        self.colors_assigned += 1;
        self.entries.push(FunctionEntry {
            id,
            raw_input: raw_input.to_string(),
            classification,
            color,
            visible: true,
            revision: 0,
        });
        id
    }

    /// Replaces the text of an entry and re-classifies it. Unchanged text is a no-op.
    pub fn update_input(&mut self, id: EntryId, raw_input: &str) -> Result<()> {
        let index = self.index_of(id)?;
        if self.entries[index].raw_input == raw_input {
            return Ok(());
        }
        let classification = self.classify(raw_input);
        let entry = &mut self.entries[index];
        entry.raw_input = raw_input.to_string();
        entry.classification = classification;
        entry.revision += 1;
        debug!(
            "{} revision {}: `{}` -> {:?}, error: {}",
            id,
            entry.revision,
            raw_input,
            entry.family(),
            entry.has_error()
        );
        Ok(())
    }

    pub fn remove(&mut self, id: EntryId) -> Result<FunctionEntry> {
        let index = self.index_of(id)?;
        info!("removed {}", id);
        Ok(self.entries.remove(index))
    }

    pub fn set_visible(&mut self, id: EntryId, visible: bool) -> Result<()> {
        let index = self.index_of(id)?;
        self.entries[index].visible = visible;
        Ok(())
    }

    /// Flips visibility, returning the new state.
    pub fn toggle_visible(&mut self, id: EntryId) -> Result<bool> {
        let index = self.index_of(id)?;
        let entry = &mut self.entries[index];
        entry.visible = !entry.visible;
        Ok(entry.visible)
    }

    pub fn set_color(&mut self, id: EntryId, color: Rgba) -> Result<()> {
        let index = self.index_of(id)?;
        self.entries[index].color = color;
        Ok(())
    }

    fn index_of(&self, id: EntryId) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(PlotError::UnknownEntry(id.0))
    }

    pub fn get(&self, id: EntryId) -> Option<&FunctionEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionEntry> + '_ {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry; ids keep increasing and the history is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Successfully added inputs, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> + '_ {
        self.history.iter().map(String::as_str)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
