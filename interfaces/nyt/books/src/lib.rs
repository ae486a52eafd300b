//! Client for the NYT Books "lists" endpoint.
//!
//! Responses are returned as raw text; callers decide how to decode and store them.

pub mod index;
