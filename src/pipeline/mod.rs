//! Pipeline stages for CSV-to-image conversion.
//!
//! Each submodule implements exactly one step, and each is a plain
//! synchronous function so the driver can run it on a blocking thread.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ decode ──▶ encode
//! (CSV rows)  (base64,    (JPEG/PNG file)
//!              sniff)        │ on failure
//!                 │ failure  ▼
//!                 └──────▶ dump (<id>.txt)
//! ```
//!
//! 1. [`source`] — read the input file and yield `(id, payload)` records
//! 2. [`decode`] — base64-decode the payload and decode the image bytes,
//!    reporting the format detected from the byte signature
//! 3. [`encode`] — route JPEG → JPEG and everything else → PNG, write the file
//! 4. [`dump`]   — write the raw payload to `<id>.txt` when 2 or 3 fails

pub mod decode;
pub mod dump;
pub mod encode;
pub mod source;
