//! AI NFT minting service.
//!
//! Turns a text prompt into a minted on-chain asset: image and metadata are
//! produced by a generative API, pinned to IPFS, and registered with a chain
//! minting provider, with the asset row tracking pipeline progress
//! throughout.

pub mod api;
pub mod assets;
pub mod chain;
pub mod config;
pub mod db;
pub mod errors;
pub mod generate;
pub mod http;
pub mod pipeline;
pub mod storage;
