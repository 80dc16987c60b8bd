/// What happens when the data pointer is moved past either end of the tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    /// Stop the run with a tape-bounds error.
    #[default]
    Abort,
    /// Wrap around modulo the tape size.
    Wrap,
}

/// The move would leave the tape under [`BoundsPolicy::Abort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds;

/// Fixed-size, zero-initialised byte tape with a data pointer.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
    policy: BoundsPolicy,
}

impl Tape {
    /// A zero-sized tape is bumped up to a single cell.
    pub fn new(size: usize, policy: BoundsPolicy) -> Self {
        Self {
            cells: vec![0; size.max(1)],
            pointer: 0,
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn get(&self) -> u8 {
        self.cells[self.pointer]
    }

    pub fn set(&mut self, value: u8) {
        self.cells[self.pointer] = value;
    }

    pub fn is_zero(&self) -> bool {
        self.get() == 0
    }

    pub fn inc_by(&mut self, n: usize) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_add((n % 256) as u8);
    }

    pub fn dec_by(&mut self, n: usize) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_sub((n % 256) as u8);
    }

    pub fn move_right(&mut self, n: usize) -> Result<(), OutOfBounds> {
        let len = self.len();
        self.pointer = match self.policy {
            BoundsPolicy::Wrap => (self.pointer + n % len) % len,
            BoundsPolicy::Abort => self
                .pointer
                .checked_add(n)
                .filter(|&p| p < len)
                .ok_or(OutOfBounds)?,
        };
        Ok(())
    }

    pub fn move_left(&mut self, n: usize) -> Result<(), OutOfBounds> {
        let len = self.len();
        self.pointer = match self.policy {
            BoundsPolicy::Wrap => (self.pointer + len - n % len) % len,
            BoundsPolicy::Abort => self.pointer.checked_sub(n).ok_or(OutOfBounds)?,
        };
        Ok(())
    }
}
