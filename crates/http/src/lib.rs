//! # hylan-http
//!
//! A small plain-HTTP/1.1 and HTTP/2 server used to expose the stream registry's
//! inspection endpoint.
//!
//! It abstracts away [`hyper`](https://crates.io/crates/hyper) to provide a simple
//! interface for creating and running a server.
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or [Apache-2.0](./LICENSE.Apache-2.0) license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`

pub mod backend;
pub mod body;
pub mod error;
mod server;
pub mod service;

pub use server::HttpServer;

pub type IncomingRequest = http::Request<body::IncomingBody>;
