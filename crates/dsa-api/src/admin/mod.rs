//! Content management for admins: roadmaps, nodes, quiz banks, master
//! roadmaps and the dashboard counters.

pub mod model;
pub mod routes;

pub use routes::routes;
