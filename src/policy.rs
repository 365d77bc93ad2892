//! The growth and shrink policy.
//!
//! The policy is a pure function of the current length and capacity of an
//! array; it only decides target capacities, it never touches memory.
//!
//! Growth doubles the capacity, which amortizes the cost of appending to
//! O(1). Shrinking is opt-in, and deliberately asymmetric: it triggers when
//! the length drops to a quarter of the capacity, and halves the capacity.
//! Using the same factor for trigger and target would cause the capacity to
//! oscillate on add/remove pairs near the boundary.

use super::failure::{Failure, Result};
use super::root::cmp;

/// GrowthPolicy
///
/// Decides target capacities when an array grows and, optionally, when it
/// shrinks after a removal.
///
/// #   Example
///
/// ```
/// #   use dynarr::policy::GrowthPolicy;
/// let policy = GrowthPolicy::default();
///
/// assert_eq!(Ok(1), policy.grow_target(0));
/// assert_eq!(Ok(2), policy.grow_target(1));
/// assert_eq!(Ok(8), policy.grow_target(4));
///
/// //  Shrinking is disabled by default.
/// assert_eq!(None, policy.shrink_target(1, 64));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GrowthPolicy {
    //  Minimum capacity retained by shrinking; `None` disables shrinking.
    shrink_floor: Option<usize>,
}

impl GrowthPolicy {
    /// Creates a policy with shrinking disabled.
    pub fn doubling() -> Self {
        Self { shrink_floor: None }
    }

    /// Creates a policy which shrinks after removals, never below `floor`.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use dynarr::policy::GrowthPolicy;
    /// let policy = GrowthPolicy::with_shrink(4);
    ///
    /// //  Length dropped to a quarter of capacity: halve it.
    /// assert_eq!(Some(8), policy.shrink_target(4, 16));
    ///
    /// //  Not far enough below capacity: keep it.
    /// assert_eq!(None, policy.shrink_target(5, 16));
    ///
    /// //  At or below the floor: keep it.
    /// assert_eq!(None, policy.shrink_target(1, 4));
    /// ```
    pub fn with_shrink(floor: usize) -> Self {
        Self { shrink_floor: Some(floor) }
    }

    /// Returns whether shrinking is enabled.
    pub fn is_shrink_enabled(&self) -> bool {
        self.shrink_floor.is_some()
    }

    /// Returns the target capacity for an array about to outgrow `capacity`.
    ///
    /// #   Errors
    ///
    /// Returns `Failure::ElementsOverflow` if doubling overflows.
    pub fn grow_target(&self, capacity: usize) -> Result<usize> {
        if capacity == 0 {
            Ok(1)
        } else {
            capacity.checked_mul(2).ok_or(Failure::ElementsOverflow)
        }
    }

    /// Returns the target capacity after a removal, if the array should
    /// shrink.
    ///
    /// The target is never below `length`, nor below the configured floor.
    pub fn shrink_target(&self, length: usize, capacity: usize) -> Option<usize> {
        let floor = self.shrink_floor?;

        if capacity > floor && length <= capacity / 4 {
            //  length <= capacity / 4, hence capacity / 2 >= length.
            Some(cmp::max(capacity / 2, floor))
        } else {
            None
        }
    }
}
