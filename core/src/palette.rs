use crate::color::Rgb;

/// Largest palette the 4-bit pixel format can address.
pub const MAX_COLORS: usize = 16;

/// Ordered table of up to 16 colors.
///
/// Pixel indices resolve through this table; the capacity bound is the
/// structural guarantee that every stored index names a real slot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: heapless::Vec<Rgb, MAX_COLORS>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a color slice; `None` if it exceeds [`MAX_COLORS`].
    pub fn from_colors(colors: &[Rgb]) -> Option<Self> {
        let entries = heapless::Vec::from_slice(colors).ok()?;
        Some(Palette { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn color(&self, index: u8) -> Rgb {
        self.entries[index as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.entries.iter().copied()
    }

    /// Append a color, returning its index; `None` when full.
    pub(crate) fn push(&mut self, color: Rgb) -> Option<u8> {
        let index = self.entries.len() as u8;
        self.entries.push(color).ok()?;
        Some(index)
    }

    /// Index of the entry closest to `target`; lowest index wins ties.
    pub fn nearest(&self, target: Rgb) -> u8 {
        debug_assert!(!self.entries.is_empty());
        let mut best = 0u8;
        let mut best_distance = u32::MAX;
        for (index, entry) in self.entries.iter().enumerate() {
            let distance = entry.distance_sq(target);
            if distance < best_distance {
                best = index as u8;
                best_distance = distance;
            }
        }
        best
    }

    /// Full 16-slot word table with unused slots zeroed, so any nibble
    /// resolves without a bounds check (out-of-range indices come out
    /// black rather than panicking).
    pub fn lookup_table(&self) -> [u32; MAX_COLORS] {
        let mut table = [0u32; MAX_COLORS];
        for (slot, entry) in table.iter_mut().zip(self.entries.iter()) {
            *slot = entry.to_word();
        }
        table
    }
}
