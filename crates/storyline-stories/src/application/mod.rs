//! Application services over the story domain.

pub mod repository;
