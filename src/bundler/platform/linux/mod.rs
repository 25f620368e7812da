//! Linux packaging.
//!
//! Only Debian packages are produced. The `.deb` is assembled in-process
//! from the [`archive`](crate::bundler::archive) encoders, so no `dpkg-deb`
//! is needed on the build host.

pub mod debian;

pub use debian::bundle_project;
