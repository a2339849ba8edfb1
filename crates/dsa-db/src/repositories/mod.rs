// All repository functions are generic over `E: Executor<'e, Database = Postgres>`
// so they accept both a `&PgPool` (direct query) and a `&mut Transaction` (atomic operations).

pub mod activity;
pub mod master;
pub mod node;
pub mod progress;
pub mod quiz;
pub mod roadmap;
pub mod stats;
pub mod user;
