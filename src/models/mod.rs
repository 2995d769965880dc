//! Core data models for the SEO metadata service.
//!
//! Content items belong to the host platform's content store; this service
//! only reads them and writes the four SEO meta fields attached to them.

pub mod content_item;
pub mod meta_field;
