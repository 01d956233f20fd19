//! Language server for verdant sources, speaking LSP over stdio.

mod convert;
mod server;

pub use server::Server;
