mod model;
pub mod repository;
pub mod service;

pub use self::model::*;
pub use self::repository::ExerciseRepository;
pub use self::service::ExerciseService;
