pub mod archive;
pub mod audit;
pub mod codec;
pub mod config;
pub mod fsutil;
pub mod list;
pub mod paths;
pub mod quarter;
pub mod restore;
pub mod util;
pub mod warn;
