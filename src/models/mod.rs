pub mod alert;
pub mod feature;
pub mod repository;
pub mod summary;
pub mod task;

pub use alert::*;
pub use feature::*;
pub use repository::Repository;
pub use summary::*;
pub use task::*;
