mod repo_error;
mod route_repo;
mod timetable_repo;

pub use repo_error::RepositoryError;
pub use route_repo::*;
pub use timetable_repo::*;
