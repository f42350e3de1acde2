//! Pipeline stages for resume analysis.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ llm (×3) ──▶ score / postprocess
//! (path/URL) (pdfium)  (JPEG b64)  (VLM)        (regex)  (cleanup)
//! ```
//!
//! 1. [`input`]  — load the resume from a path or URL into memory
//! 2. [`render`] — rasterise page 1 only; blocking, so callers in async
//!    code run it on `spawn_blocking`
//! 3. [`encode`] — JPEG-encode and base64-wrap the bitmap
//! 4. [`llm`]    — one model call per tab; the only stage with network I/O
//! 5. [`score`]  — pull `Match Score: NN%` out of the match-tab text
//! 6. [`postprocess`] — tidy model text for display

pub mod encode;
pub mod input;
pub mod llm;
pub mod postprocess;
pub mod render;
pub mod score;
