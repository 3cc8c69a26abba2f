//! Handler logic behind the HTTP surface.

pub mod receipts;
pub mod relay;
pub mod send;
