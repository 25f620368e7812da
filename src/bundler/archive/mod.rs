//! Binary archive encoders.
//!
//! | Module | Format | Used by |
//! |--------|--------|---------|
//! | [`targz`] | pax tar + gzip | `.deb` control and data members |
//! | [`zipfile`] | zip (deflate) | Windows artifacts, macOS fallback |
//!
//! Both are synchronous; async callers run them on the blocking pool.

pub mod targz;
pub mod zipfile;

pub use targz::TarGzBuilder;
pub use zipfile::zip_directory;
