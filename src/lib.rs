#![cfg_attr(not(feature = "with-std"), no_std)]
//  Lints
#![allow(clippy::module_inception)]

//! #   The Dynarr Library
//!
//! A single-owner growable array, assembled from explicit parts:
//! -   The `DynArray`: a contiguous, index-addressable sequence which owns its
//!     elements exclusively.
//! -   The `Storage` strategies: inline value storage, or one heap allocation
//!     per element, behind the same contract.
//! -   The `GrowthPolicy`: doubling growth, with opt-in shrinking.
//!
//! Allocations are faillible, and every operation either fully succeeds or
//! leaves the array exactly as it was.

pub mod allocator;
pub mod array;
pub mod failure;
pub mod policy;

mod utils;

use self::utils::root;
