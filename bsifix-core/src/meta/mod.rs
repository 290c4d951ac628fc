use time::OffsetDateTime;

pub mod bext;
pub mod cart;
pub mod tags;

/// Name written into coding history and the cart producer field.
pub const TOOL_NAME: &str = "BSIFix";
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wall-clock time, local when the offset can be determined.
pub(crate) fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
