mod count_down_latch;
mod wait_signal;

pub use self::{count_down_latch::*, wait_signal::*};
