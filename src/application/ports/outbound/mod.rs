//! Outbound ports - Interfaces that the application requires from external systems

mod content_generation_port;

pub use content_generation_port::{
    AspectRatio, ContentGenerationPort, ImageRequest, InlineImage, StructuredRequest,
};
