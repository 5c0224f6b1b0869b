pub mod campos;
pub mod repository;
pub mod service;
