//! gemini-mcp - MCP tool servers over the Gemini multimodal API
//!
//! This library provides:
//! - Two stdio MCP servers: PDF analysis and image understanding
//! - A caller-owned Gemini `generateContent` client
//! - The segmentation core: 0-1000 box mapping, mask decoding and overlay
//!   compositing, usable offline

pub mod cli;
pub mod config;
pub mod fetch;
pub mod gemini;
pub mod imaging;
pub mod mcp;
pub mod segment;
