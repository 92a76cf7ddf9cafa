use std::fmt::Debug;

/// A marker for values that queues carry across tasks.
pub trait Element: Debug + Send + Sync + 'static {}

impl Element for i8 {}
impl Element for i16 {}
impl Element for i32 {}
impl Element for i64 {}
impl Element for u8 {}
impl Element for u16 {}
impl Element for u32 {}
impl Element for u64 {}
impl Element for usize {}
impl Element for bool {}
impl Element for String {}
impl Element for &'static str {}
