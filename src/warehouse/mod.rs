mod models;
mod schema;
mod store;

pub use models::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};
pub use schema::WAREHOUSE_SCHEMA;
pub use store::{SqliteWarehouse, TableCounts};
