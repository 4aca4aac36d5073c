pub mod schema;

pub use schema::Plan;
