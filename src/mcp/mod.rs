//! MCP (Model Context Protocol) servers backed by Gemini
//!
//! Two stdio servers: `gemini-pdf` for PDF analysis and
//! `img-understanding-mcp` for image captioning, comparison, box detection
//! and segmentation.
//!
//! Start them with `gmcp pdf` and `gmcp image`.

mod server;
pub mod tools;

pub use server::{
    run_image_server, run_pdf_server, ImageMcpServer, PdfMcpServer, IMAGE_SERVER_NAME,
    PDF_SERVER_NAME,
};
pub use tools::ToolContext;
