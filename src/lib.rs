//! minum - Self-contained HTTP/1.1 application server with static-asset
//! caching and built-in intrusion detection.
//!
//! A performance-oriented HTTP server with comprehensive configuration
//! for memory management, connection handling, and protocol support.
//! Designed for small services that want a single binary: route handlers,
//! static files, and abuse mitigation without pulling in a reverse proxy.
//!
//! # Protocol Support
//!
//! - **HTTP/1.1**: Full protocol with persistent connections and chunked transfer encoding
//! - **HTTP/1.0**: Basic protocol support for legacy clients and simple requests
//! - **TLS**: Optional, via [`rustls`](https://docs.rs/rustls) through `tokio-rustls`
//!
//! # Features
//!
//! ## 🔒 Security & Protection
//! - **Built-in DoS/DDoS protection** - enabled by default, with no performance penalty.
//! - **Fully configurable limits and timeouts** for requests, responses, and connections.
//! - **Custom connection filtering** - implement the [`ConnectionFilter`] trait to
//!   reject unwanted connections at the TCP level.
//! - **The Brig** - an [`IntrusionDetector`](brig::IntrusionDetector) that jails clients
//!   whose requests trip honeypot routes or known scanner signatures.
//!
//! ## 🚀 Performance & Memory
//! - **Zero-allocation hot path** - request parsing and routing allocate nothing per request.
//! - **Pre-allocated memory for each connection** - linear and transparent scaling.
//! - **Static asset cache** - files are read, MIME-typed, and pre-formatted once at startup.
//!
//! ## 🌐 Protocol & Management
//! - **Route registry** - exact `(Method, path)` dispatch via [`HandlerRegistry`].
//! - **Automatic protocol detection for each request** - keep-alive eliminates
//!   the need for manual protocol selection.
//! - **Storing data between requests** - ability to store data between requests in a
//!   single connection using the [`ConnectionData`] trait.
//!
//! ## 🏭 Production Ready
//! - **Graceful performance degradation** - automatic 503 responses when overloaded.
//! - **Graceful shutdown** - in-flight connections finish before the process exits.
//! - [**Custom error format**
//!   ](https://docs.rs/minum/latest/minum/limits/struct.ServerLimits.html#structfield.json_errors) -
//!   structured JSON (with codes/descriptions) or a plain HTTP response.
//! - **Resource protection** - automatic closure of connections exceeding set limits.
//!
//! # Quick Start
//!
//! ## 1. Installation
//!
//! Add `minum` and [`tokio`](https://crates.io/crates/tokio) to your `Cargo.toml`:
//!
//! ```bash
//! cargo add minum tokio --features tokio/full
//! ```
//! Or manually:
//! ```toml
//! [dependencies]
//! minum = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! ## 2. Usage example
//! ```no_run
//! use minum::{Server, Handler, HandlerRegistry, Request, Response, Handled, StatusCode, Method};
//! use tokio::net::TcpListener;
//!
//! struct MyHandler;
//!
//! impl Handler for MyHandler {
//!     async fn handle(&self, _: &mut (), _: &Request, resp: &mut Response) -> Handled {
//!         resp.status(StatusCode::Ok).body("Hello World!")
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let routes = HandlerRegistry::new().route(Method::Get, "/", MyHandler);
//!
//!     Server::builder()
//!         .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
//!         .handler(routes)
//!         .build()
//!         .launch()
//!         .await;
//! }
//! ```
//!
//! # Use Cases
//!
//! - **Small HTTP services** - one binary serving an API plus its static assets
//! - **Resource-constrained environments** - predictable memory usage
//! - **Internal APIs** - security-conscious defaults, built-in abuse jailing
//! - **Performance-critical applications** - zero-allocation hot path
pub(crate) mod http {
    pub mod body;
    pub mod query;
    pub(crate) mod request;
    pub(crate) mod response;
    pub(crate) mod types;
}
pub(crate) mod server {
    pub(crate) mod connection;
    pub(crate) mod server_impl;
    pub(crate) mod tls;
}
pub mod brig;
pub mod config;
pub(crate) mod errors;
pub mod limits;
pub mod registry;
pub mod static_files;

pub use crate::{
    brig::IntrusionDetector,
    http::{
        body::MultipartPart,
        query,
        request::Request,
        response::{
            write::{BodyWriter, WriteBuffer},
            Handled, Response,
        },
        types::{Method, StatusCode, Url, Version},
    },
    registry::HandlerRegistry,
    server::{
        connection::{ConnectionData, ConnectionFilter},
        server_impl::{Handler, Server, ServerBuilder},
    },
    static_files::StaticFilesCache,
};

#[doc(hidden)]
pub fn run_test<F: FnOnce(&Request, &mut Response) -> Handled>(f: F) {
    f(
        &Request::new(&crate::limits::ReqLimits::default()),
        &mut Response::new(&crate::limits::RespLimits::default()),
    );
}

#[doc(hidden)]
#[macro_export]
macro_rules! impt_default_handler {
    ($name:ident) => {
        use minum::{Handled, Handler, Request, Response, StatusCode};
        struct $name;

        // `<()>` to check functionality
        impl Handler<()> for $name {
            async fn handle(&self, _: &mut (), _: &Request, resp: &mut Response) -> Handled {
                resp.status(StatusCode::Ok).body("Hello world!")
            }
        }
    };
}

#[doc(hidden)]
#[cfg(test)]
pub(crate) mod tools {
    use std::str::from_utf8;

    #[inline]
    pub(crate) fn str(value: Option<&[u8]>) -> Option<&str> {
        Some(from_utf8(value?).unwrap())
    }

    #[inline]
    pub(crate) fn str_op(value: &[u8]) -> &str {
        from_utf8(value).unwrap()
    }

    #[inline]
    pub(crate) fn str_2<'a>(value: (&'a [u8], &'a [u8])) -> (&'a str, &'a str) {
        (from_utf8(value.0).unwrap(), from_utf8(value.1).unwrap())
    }
}
