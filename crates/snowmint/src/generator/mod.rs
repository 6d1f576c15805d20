mod mutex;
mod snowflake;
mod status;
#[cfg(test)]
mod tests;

pub(crate) use mutex::lock;
pub use mutex::*;
pub use snowflake::*;
pub use status::*;
