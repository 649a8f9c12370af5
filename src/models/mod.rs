// src/models/mod.rs

pub mod classroom;
pub mod feedback;
pub mod quiz;
pub mod student;
pub mod teacher;
