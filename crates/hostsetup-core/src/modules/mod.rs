pub mod datetime;
pub mod hostname;
pub mod hosts;
pub mod network;
