pub mod layout;
pub mod variants;

pub use layout::ProgramLayouts;
pub use variants::{build_variant, depth_stencil_state, VariantDesc};
