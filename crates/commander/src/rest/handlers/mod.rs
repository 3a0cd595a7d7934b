//! REST-Handler Module

pub mod calls;
pub mod devices;
