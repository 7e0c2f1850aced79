pub mod vertex;

pub use vertex::{vertex_attributes, GpuVertexTable};
