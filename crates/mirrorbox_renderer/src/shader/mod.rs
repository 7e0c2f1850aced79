pub mod compile;
pub mod program;

pub use compile::{
    compile, Attribute, CompileError, CompiledProgram, Location, ProgramId, ShaderHandles, ShaderStage, Uniform,
    UniformSlot, DEFAULT_VERSION_PREFIX,
};
pub use program::ShaderProgram;
