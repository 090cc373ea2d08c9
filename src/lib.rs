// src/lib.rs

pub mod assemble;
pub mod classify;
pub mod error;
pub mod extract;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod sheet;
