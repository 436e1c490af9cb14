#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod time;

pub mod traits;

pub mod util;
