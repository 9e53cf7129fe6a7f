//! Course curriculum progression engine and the course-player backend that serves it.

pub mod api_client;
pub mod config;
pub mod course_view;
pub mod curriculum;
pub mod errors;
pub mod models;
pub mod progression;
pub mod rating;
pub mod review;
pub mod routes;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
