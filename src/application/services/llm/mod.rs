//! Prompt construction for the generation backend

pub mod prompt_builder;
