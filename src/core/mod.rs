// src/core/mod.rs

pub mod backoff;
pub mod html;
pub mod net;
pub mod sanitize;
