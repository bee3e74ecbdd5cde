pub mod ids;

pub use ids::new_id;
