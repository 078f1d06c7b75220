//! Default listener priority levels
//!
//! Higher priority listeners fire first. Any `i32` is accepted at
//! registration; these constants cover the usual cases.

pub const MIN: i32 = -300;
pub const LOW: i32 = -200;
pub const BELOW_NORMAL: i32 = -100;
pub const NORMAL: i32 = 0;
pub const ABOVE_NORMAL: i32 = 100;
pub const HIGH: i32 = 200;
pub const MAX: i32 = 300;
