pub mod color;
pub mod depth;

pub use color::ColorTarget;
pub use depth::DepthStencilTarget;
