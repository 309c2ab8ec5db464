#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
pub mod macros;
pub mod serde_utils;
pub mod commitment;
pub mod hashing_utils;
pub mod misc;
