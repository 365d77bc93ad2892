//! #   The DynArray.
//!
//! The `DynArray` is a single-owner growable array: a contiguous,
//! index-addressable sequence which exclusively owns every element placed
//! into it.
//!
//! ##  Under the covers.
//!
//! Under the covers the `DynArray` composes three parts:
//!
//! -   A `Storage` strategy, owning a single block of `capacity` slots. Slots
//!     below the length hold live elements; the others are uninitialized
//!     memory, never default-constructed.
//! -   A `GrowthPolicy`, a pure function deciding target capacities on growth
//!     and, when enabled, on shrink.
//! -   An `Allocator`, providing and releasing the raw blocks.
//!
//! #   Example: basic
//!
//! General usage of `DynArray` involves pushing elements, either one at a
//! time with `push`, or in bulk with `extend`.
//!
//! The faillible equivalents exist too: `try_push` and `try_extend` return a
//! `Result` indicating whether the operation succeeded, and the cause of its
//! failure if it did not.
//!
//! ```
//! use dynarr::array::DynArray;
//!
//! let mut array: DynArray<_> = DynArray::new();
//! array.push(1);
//! array.push(2);
//!
//! assert_eq!(2, array.len());
//! assert_eq!(1, array[0]);
//!
//! array.extend([3, 4, 5].iter().copied());
//!
//! assert_eq!(5, array.len());
//! assert_eq!(4, array[3]);
//! ```
//!
//! #   Example: accessing elements
//!
//! `DynArray` provides multiple ways to access elements:
//!
//! -   The `get` and `get_mut` methods allow faillible scalar access.
//! -   The `Index` and `IndexMut` traits are implemented to provide
//!     infaillible checked scalar access.
//! -   The `iter` method walks the live elements in order.
//!
//! ```
//! use dynarr::array::DynArray;
//!
//! let mut array: DynArray<_> = DynArray::new();
//! array.extend([1, 2, 3].iter().copied());
//!
//! assert_eq!(Some(&1), array.get(0));
//! assert_eq!(None, array.get(3));
//!
//! array[2] = 9;
//! assert_eq!(9, array[2]);
//! ```
//!
//! #   Example: managing capacity
//!
//! The capacity doubles whenever an element is pushed into a full array,
//! starting from 1:
//!
//! ```
//! use dynarr::array::DynArray;
//!
//! let mut array: DynArray<_> = DynArray::new();
//! assert_eq!(0, array.capacity());
//!
//! array.push(1);
//! array.push(2);
//! array.push(3);
//!
//! assert_eq!(4, array.capacity());
//!
//! //  `shrink_to_fit` sheds the excess capacity.
//! array.shrink_to_fit();
//! assert_eq!(3, array.capacity());
//! ```
//!
//! Automatic shrinking after removals is opt-in, via
//! `GrowthPolicy::with_shrink`.
//!
//! #   Example: storage strategies
//!
//! The default strategy stores elements inline, in one contiguous block. The
//! `BoxedStorage` strategy instead stores one pointer per slot, each live
//! slot pointing at an individually allocated element; growth then moves
//! pointers, never elements.
//!
//! ```
//! use dynarr::array::BoxedDynArray;
//!
//! let mut array: BoxedDynArray<String> = BoxedDynArray::new();
//! array.push(String::from("hello"));
//!
//! assert_eq!("hello", array[0]);
//! ```

mod array;
mod storage;

pub use self::array::{DynArray, Iter};
pub use self::storage::{BoxedStorage, InlineStorage, Storage};

/// A `DynArray` using the pointer-per-slot storage strategy.
#[cfg(feature = "with-std")]
pub type BoxedDynArray<T> = DynArray<T, BoxedStorage<T>>;

use super::allocator;
use super::failure;
use super::policy;
use super::root;
