#![doc = include_str!("../README.md")]

mod config;
mod error;
mod pace;
mod pool;
mod rand;
mod random_native;
mod report;
mod resource;
mod venue;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::pace::*;
pub use crate::pool::*;
pub use crate::rand::*;
pub use crate::random_native::*;
pub use crate::report::*;
pub use crate::resource::*;
pub use crate::venue::*;
pub(crate) use parking_lot::{Mutex, MutexGuard};
