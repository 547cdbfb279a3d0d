//! Client connections: the command parser, the per-connection state machine and the network
//! loop driving them.
pub mod command;
pub mod conn;
pub mod state;
