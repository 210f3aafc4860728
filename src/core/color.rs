//! Three-state visitation marker used by the searches.

use std::{
    collections::HashMap,
    hash::{BuildHasher, Hash},
};

use bitvec::vec::BitVec;

/// Visitation state of a vertex or an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Not discovered yet.
    White,
    /// Discovered, but not fully expanded (on the frontier or the stack).
    Gray,
    /// Fully expanded.
    Black,
}

/// A mapping from vertices (or edges) to their [`Color`].
///
/// Searches that pre-enumerate the graph seed every key white during
/// initialization. Implicit searches grow the map lazily, an absent key
/// reads as white by convention.
pub trait ColorMap<K> {
    fn color(&self, key: &K) -> Option<Color>;

    fn set_color(&mut self, key: K, color: Color);

    /// Forgets all colors.
    fn reset(&mut self);

    /// Number of keys that have a color.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn color_or_white(&self, key: &K) -> Color {
        self.color(key).unwrap_or(Color::White)
    }
}

impl<K, S> ColorMap<K> for HashMap<K, Color, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn color(&self, key: &K) -> Option<Color> {
        self.get(key).copied()
    }

    fn set_color(&mut self, key: K, color: Color) {
        self.insert(key, color);
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

/// Color map for graphs whose vertices are dense `usize` indices.
///
/// Each vertex takes two bits. The map grows on demand.
#[derive(Debug, Clone, Default)]
pub struct DenseColorMap {
    bits: BitVec,
}

impl DenseColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocates space for vertices `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: BitVec::with_capacity(capacity * 2),
        }
    }

    fn encode(color: Color) -> (bool, bool) {
        match color {
            Color::White => (false, true),
            Color::Gray => (true, false),
            Color::Black => (true, true),
        }
    }
}

impl ColorMap<usize> for DenseColorMap {
    fn color(&self, key: &usize) -> Option<Color> {
        let offset = key.checked_mul(2)?;
        if offset + 1 >= self.bits.len() {
            return None;
        }

        match (self.bits[offset], self.bits[offset + 1]) {
            (false, false) => None,
            (false, true) => Some(Color::White),
            (true, false) => Some(Color::Gray),
            (true, true) => Some(Color::Black),
        }
    }

    fn set_color(&mut self, key: usize, color: Color) {
        let offset = key * 2;
        if offset + 1 >= self.bits.len() {
            self.bits.resize(offset + 2, false);
        }

        let (high, low) = Self::encode(color);
        self.bits.set(offset, high);
        self.bits.set(offset + 1, low);
    }

    fn reset(&mut self) {
        self.bits.clear();
    }

    fn len(&self) -> usize {
        self.bits
            .chunks_exact(2)
            .filter(|pair| pair.any())
            .count()
    }
}
