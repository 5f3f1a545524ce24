//! Axis descriptions (columns or rows).
//!
//! A [`Dimension`] knows how many indices an axis has (possibly unbounded),
//! how wide each index is, and whether the axis wraps around. Changes are
//! announced through [`Dimension::changed`] with the affected index, or
//! [`Which::All`].

use std::cell::{Cell, RefCell};
use std::fmt;

use crate::error::{GridError, Result};
use crate::observer::Notifier;
use crate::types::Which;

/// Description of one grid axis.
pub trait Dimension {
    /// Number of indices, `None` for an unbounded axis.
    fn count(&self) -> Option<u32>;

    /// Periodic axis. Only meaningful when `count()` is `Some`.
    fn wraparound(&self) -> bool;

    /// False when every index has the same size.
    fn variable_sizes(&self) -> bool;

    /// Size of `index`. Fixed-size axes ignore the argument.
    fn size_of(&self, index: u32) -> f64;

    /// Size change notifications.
    fn changed(&self) -> &Notifier<Which>;
}

/// Check that an axis size is usable (positive and finite).
pub fn validate_size(index: Option<u32>, size: f64) -> Result<f64> {
    if size.is_finite() && size > 0.0 {
        Ok(size)
    } else {
        Err(GridError::InvalidSize { index, size })
    }
}

/// True if the axis is periodic with a known period.
pub fn wraps(dim: &dyn Dimension) -> bool {
    dim.wraparound() && dim.count().is_some()
}

/// Every index has the same size.
pub struct FixedDimension {
    count: Cell<Option<u32>>,
    size: Cell<f64>,
    wraparound: bool,
    changed: Notifier<Which>,
}

impl FixedDimension {
    /// A finite axis of `count` indices, each `size` pixels.
    pub fn new(count: u32, size: f64, wraparound: bool) -> Result<Self> {
        Ok(Self {
            count: Cell::new(Some(count)),
            size: Cell::new(validate_size(None, size)?),
            wraparound,
            changed: Notifier::new(),
        })
    }

    /// An unbounded axis. Unbounded axes never wrap.
    pub fn unbounded(size: f64) -> Result<Self> {
        Ok(Self {
            count: Cell::new(None),
            size: Cell::new(validate_size(None, size)?),
            wraparound: false,
            changed: Notifier::new(),
        })
    }

    pub fn size(&self) -> f64 {
        self.size.get()
    }

    /// Change the common size. Notifies `All` when the value differs.
    pub fn set_size(&self, size: f64) -> Result<()> {
        let size = validate_size(None, size)?;
        if (self.size.get() - size).abs() > f64::EPSILON {
            self.size.set(size);
            self.changed.notify(&Which::All);
        }
        Ok(())
    }

    /// Change the count. Notifies `All` when the value differs.
    pub fn set_count(&self, count: Option<u32>) -> Result<()> {
        if self.wraparound && count.is_none() {
            return Err(GridError::WraparoundWithoutCount);
        }
        if self.count.get() != count {
            self.count.set(count);
            self.changed.notify(&Which::All);
        }
        Ok(())
    }
}

impl Dimension for FixedDimension {
    fn count(&self) -> Option<u32> {
        self.count.get()
    }

    fn wraparound(&self) -> bool {
        self.wraparound
    }

    fn variable_sizes(&self) -> bool {
        false
    }

    fn size_of(&self, _index: u32) -> f64 {
        self.size.get()
    }

    fn changed(&self) -> &Notifier<Which> {
        &self.changed
    }
}

impl fmt::Debug for FixedDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedDimension")
            .field("count", &self.count.get())
            .field("size", &self.size.get())
            .field("wraparound", &self.wraparound)
            .finish()
    }
}

/// Finite axis with an explicit size per index.
#[derive(Debug)]
pub struct SizeTable {
    sizes: RefCell<Vec<f64>>,
    wraparound: bool,
    changed: Notifier<Which>,
}

impl SizeTable {
    pub fn new(sizes: Vec<f64>, wraparound: bool) -> Result<Self> {
        for (i, s) in sizes.iter().enumerate() {
            validate_size(u32::try_from(i).ok(), *s)?;
        }
        if u32::try_from(sizes.len()).is_err() {
            return Err(GridError::Config(format!(
                "{} sizes exceed the index range",
                sizes.len()
            )));
        }
        Ok(Self {
            sizes: RefCell::new(sizes),
            wraparound,
            changed: Notifier::new(),
        })
    }

    /// Resize one index. Notifies that index when the value differs.
    pub fn set_size(&self, index: u32, size: f64) -> Result<()> {
        let size = validate_size(Some(index), size)?;
        let changed = {
            let mut sizes = self.sizes.borrow_mut();
            let slot = sizes
                .get_mut(index as usize)
                .ok_or_else(|| GridError::Config(format!("index {index} out of range")))?;
            let changed = (*slot - size).abs() > f64::EPSILON;
            *slot = size;
            changed
        };
        if changed {
            self.changed.notify(&Which::Index(index));
        }
        Ok(())
    }
}

impl Dimension for SizeTable {
    fn count(&self) -> Option<u32> {
        u32::try_from(self.sizes.borrow().len()).ok()
    }

    fn wraparound(&self) -> bool {
        self.wraparound
    }

    fn variable_sizes(&self) -> bool {
        true
    }

    fn size_of(&self, index: u32) -> f64 {
        self.sizes
            .borrow()
            .get(index as usize)
            .copied()
            .unwrap_or(0.0)
    }

    fn changed(&self) -> &Notifier<Which> {
        &self.changed
    }
}

type SizeFn = Box<dyn Fn(u32) -> f64>;

/// Variable-size axis whose sizes come from a function.
///
/// The function is not validated up front; the viewport resolver rejects
/// non-positive sizes when it meets them.
pub struct FnDimension {
    count: Cell<Option<u32>>,
    size: SizeFn,
    wraparound: bool,
    changed: Notifier<Which>,
}

impl FnDimension {
    pub fn new(
        count: Option<u32>,
        wraparound: bool,
        size: impl Fn(u32) -> f64 + 'static,
    ) -> Result<Self> {
        if wraparound && count.is_none() {
            return Err(GridError::WraparoundWithoutCount);
        }
        Ok(Self {
            count: Cell::new(count),
            size: Box::new(size),
            wraparound,
            changed: Notifier::new(),
        })
    }

    pub fn set_count(&self, count: Option<u32>) -> Result<()> {
        if self.wraparound && count.is_none() {
            return Err(GridError::WraparoundWithoutCount);
        }
        if self.count.get() != count {
            self.count.set(count);
            self.changed.notify(&Which::All);
        }
        Ok(())
    }

    /// Announce that sizes returned by the function changed.
    pub fn notify_changed(&self, which: Which) {
        self.changed.notify(&which);
    }
}

impl Dimension for FnDimension {
    fn count(&self) -> Option<u32> {
        self.count.get()
    }

    fn wraparound(&self) -> bool {
        self.wraparound
    }

    fn variable_sizes(&self) -> bool {
        true
    }

    fn size_of(&self, index: u32) -> f64 {
        (self.size)(index)
    }

    fn changed(&self) -> &Notifier<Which> {
        &self.changed
    }
}

impl fmt::Debug for FnDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDimension")
            .field("count", &self.count.get())
            .field("wraparound", &self.wraparound)
            .finish_non_exhaustive()
    }
}
