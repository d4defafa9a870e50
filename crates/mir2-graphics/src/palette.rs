use core::fmt;

use mir2_core::Error;

pub type PaletteError = Error<PaletteErrorKind>;

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaletteErrorKind {
    InvalidLength { expected: usize, actual: usize },
}

impl std::error::Error for PaletteErrorKind {}

impl fmt::Display for PaletteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { expected, actual } => {
                write!(f, "invalid palette table length: expected {expected} bytes, got {actual}")
            }
        }
    }
}

/// Number of entries in a palette table.
pub const PALETTE_SIZE: usize = 256;

/// Read-only 256-entry table mapping a palette index to an RGB triple.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [[u8; 3]; PALETTE_SIZE],
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Palette")
            .field("first", &self.colors[0])
            .field("last", &self.colors[PALETTE_SIZE - 1])
            .finish_non_exhaustive()
    }
}

impl Palette {
    const NAME: &'static str = "Palette";

    pub fn from_fn(mut color: impl FnMut(u8) -> [u8; 3]) -> Self {
        let mut colors = [[0; 3]; PALETTE_SIZE];
        for (index, entry) in (0..=u8::MAX).zip(colors.iter_mut()) {
            *entry = color(index);
        }
        Self { colors }
    }

    /// Builds a palette from a packed `R G B` table (768 bytes).
    pub fn from_rgb_bytes(table: &[u8]) -> Result<Self, PaletteError> {
        Self::from_table(table, 3, 0)
    }

    /// Builds a palette from a table of 4-byte entries whose first byte is ignored
    /// (`_ R G B`, 1024 bytes), the layout the game client ships its palette in.
    pub fn from_argb_bytes(table: &[u8]) -> Result<Self, PaletteError> {
        Self::from_table(table, 4, 1)
    }

    fn from_table(table: &[u8], stride: usize, skip: usize) -> Result<Self, PaletteError> {
        let expected = PALETTE_SIZE * stride;

        if table.len() != expected {
            return Err(PaletteError::new(
                Self::NAME,
                PaletteErrorKind::InvalidLength {
                    expected,
                    actual: table.len(),
                },
            ));
        }

        let mut colors = [[0; 3]; PALETTE_SIZE];
        for (entry, chunk) in colors.iter_mut().zip(table.chunks_exact(stride)) {
            entry.copy_from_slice(&chunk[skip..skip + 3]);
        }

        Ok(Self { colors })
    }

    /// A ramp where index `i` maps to `(i, i, i)`.
    pub fn grayscale() -> Self {
        Self::from_fn(|i| [i, i, i])
    }

    pub fn rgb(&self, index: u8) -> [u8; 3] {
        self.colors[usize::from(index)]
    }

    /// Maps every palette index of `indices` to its color, producing packed RGB8 bytes.
    pub fn resolve(&self, indices: &[u8]) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(indices.len() * 3);
        for &index in indices {
            rgb.extend_from_slice(&self.rgb(index));
        }
        rgb
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::grayscale()
    }
}
