//! Ports - Interfaces between the application core and adapters

pub mod outbound;
