pub mod gateway;
pub mod memory;
pub mod rpc;
