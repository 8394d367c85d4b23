pub mod casing;
pub mod config;
pub mod error;
pub mod snowflake;

pub use casing::{camel_key, to_camel_case};
pub use config::Config;
pub use error::{Result, ShardlineError};
pub use snowflake::Snowflake;
