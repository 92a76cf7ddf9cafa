mod element;
mod linked_list;
mod queue;

pub use self::{element::*, linked_list::*, queue::*};
