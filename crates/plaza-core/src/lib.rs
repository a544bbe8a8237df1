//! Core types and trait definitions for Plaza, a minimal social network.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::SocialStore`]; the [`network::Network`] service ties a
//! store to its in-memory [`graph::GraphIndex`] and composes feeds.

pub mod comment;
pub mod error;
pub mod feed;
pub mod follower;
pub mod graph;
pub mod id;
pub mod network;
pub mod post;
pub mod store;
pub mod user;

mod validate;

pub use error::{Error, Result};
pub use id::{CommentId, EdgeId, PostId, UserId};
