//! Adapters behind the domain ports: the HTTP backend client, the external
//! session store, and in-memory stand-ins for offline use and tests.

pub mod http;
pub mod in_memory;
pub mod session;
