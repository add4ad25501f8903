use std::fmt::Debug;

/// The private buffer a suspended coroutine keeps its part of the shared stack in.
///
/// The snapshot has `used` bytes and a capacity.
///
/// - `used` is the size of the last saved stack image.
///
/// - the capacity only grows: it follows the high-water mark of the coroutine,
/// so a coroutine that yields at the same depth again and again allocates once.
///
/// # Snapshot representation
///
/// ```text
/// +---+---+---+---+---+---+---+---+
/// | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 |
/// +---+---+---+---+---+---+---+---+
/// | X | X | X | X | X |   |   |   |
/// +---+---+---+---+---+---+---+---+
///                     ^           ^
///                   used         cap
/// ```
pub struct StackSnapshot {
    slice: Box<[u8]>,
    used: usize
}

impl StackSnapshot {
    /// Creates an empty snapshot. It does not allocate.
    pub fn new() -> Self {
        Self {
            slice: Box::default(),
            used: 0
        }
    }

    /// Returns the size of the saved stack image.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.used
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Returns the allocated size.
    #[inline(always)]
    pub fn cap(&self) -> usize {
        self.slice.len()
    }

    /// Returns a writable image of exactly `len` bytes, growing the buffer if it is too small.
    /// The previous image is discarded.
    pub fn prepare(&mut self, len: usize) -> &mut [u8] {
        if self.cap() < len {
            self.slice = vec![0; len].into_boxed_slice();
        }
        self.used = len;
        &mut self.slice[..len]
    }
}

impl Default for StackSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for StackSnapshot {
    fn as_ref(&self) -> &[u8] {
        &self.slice[..self.used]
    }
}

impl Debug for StackSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackSnapshot")
            .field("used", &self.used)
            .field("cap", &self.cap())
            .finish()
    }
}
