//! # Dose-Test Patterns
//!
//! Pure generators for lithography dose-test structures and the assembly
//! of their output into layout libraries:
//!
//! - [`lines`]: arrays of parallel lines at a fixed pitch
//! - [`angled`]: rectangle pairs hinged at increasing angles
//! - [`checkerboard`]: parity-filled square grids
//! - [`bend`]: L-shaped paths with increasing bend radius
//!
//! Generators never fail. Degenerate parameters give degenerate shapes.

pub mod lines;
pub mod angled;
pub mod checkerboard;
pub mod bend;
pub mod assembly;

pub use assembly::{bend_library, pattern_library, BendSetConfig, PatternSetConfig};
