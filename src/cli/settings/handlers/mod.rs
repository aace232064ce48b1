//! Setting handlers for different configuration patterns.

pub mod boolean;
pub mod keyed;
pub mod numeric;
pub mod text;

pub use boolean::*;
pub use keyed::*;
pub use numeric::*;
pub use text::*;
