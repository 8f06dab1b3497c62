// This is the main module file for the `utilities` directory.
// It declares the submodules; callers use the full paths
// (`utilities::platform::detect_os()` and friends).

// Declare the `platform` module: OS and architecture detection/normalization.
pub mod platform;
// Declare the `download` module: HTTP download of release archives.
pub mod download;
// Declare the `compression` module: archive kind dispatch and extraction.
pub mod compression;
