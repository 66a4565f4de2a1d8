//! Typed API clients behind a YouTube livestreaming and news app.
//!
//! Requests are described as data ([`http::RequestDescriptor`]) by per-API action enums, and
//! executed by one generic [`http::ApiClient`]. On top of that sit the [`news::NewsService`],
//! the [`youtube::YouTubeService`] and the [`workflow::LivestreamWorkflow`] that takes a
//! broadcast draft to a bound RTMP stream.
//!
//! Services are constructed explicitly and own their state; the [`token_store::TokenStore`]
//! and [`session::StreamSession`] they share are passed in.

pub mod config;
pub mod error;
pub mod http;
pub mod news;
pub mod oauth;
pub mod session;
pub mod token_store;
pub mod workflow;
pub mod youtube;

#[cfg(test)]
mod test_support;

pub use error::Error;
