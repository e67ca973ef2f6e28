pub(crate) mod error;
pub(crate) mod routes;
pub(crate) mod timetables;

pub(crate) use error::ApiError;
