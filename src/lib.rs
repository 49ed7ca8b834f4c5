//! # ChatAdv relay
//!
//! A server-side relay between a chat frontend and the OpenAI Responses API.
//! Each request carries one user message and, optionally, the continuation
//! token from the previous reply. The relay adds the system instructions and
//! a `file_search` tool bound to one vector store, makes a single upstream
//! call, and returns the assistant text with a new continuation token.
//!
//! Conversation state lives entirely upstream; the relay keeps nothing
//! between requests.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌───────────┐   ┌──────────────┐
//! │ frontend │──▶│  request  │──▶│  payload  │──▶│    client    │──▶ OpenAI
//! └──────────┘   │ validate  │   │   build   │   │ POST + parse │
//!      ▲         └───────────┘   └───────────┘   └──────┬───────┘
//!      │                                                │
//!      └──────────────── relay::ChatReply ◀── extract ◀─┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML file, environment, and instructions loading |
//! | [`error`] | Error taxonomy and HTTP mapping |
//! | [`request`] | Inbound body validation |
//! | [`payload`] | Outbound Responses API body |
//! | [`client`] | Upstream HTTP call |
//! | [`extract`] | Assistant text extraction |
//! | [`relay`] | One chat turn, end to end |
//! | [`server`] | Axum HTTP server |

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod payload;
pub mod relay;
pub mod request;
pub mod server;
