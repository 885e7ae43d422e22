pub mod defs;

pub use defs::{Article, CalendarTime, DigestOutput, FeedSourceSpec, RawEntry};
