// Shared imports; the wasm build uses hashbrown for its maps

// collections
#[cfg(feature = "wasm")]
pub use hashbrown::HashMap;
#[cfg(not(feature = "wasm"))]
pub use std::collections::HashMap;

// PI constants
pub use core::f64::consts::{PI, TAU};
