//! GLSL front end: version injection, per-stage compilation and reflection.
//!
//! Both stages are parsed and validated with naga before any GPU object
//! exists, so diagnostics carry the compiler's own text and are attributed
//! to the stage that produced them.  Reflection then resolves the logical
//! attribute and uniform names into [`ShaderHandles`].
//!
//! # Interface rules checked at link time
//!
//! * the fragment output `outColor` is bound to location 0;
//! * every recognised uniform lives in one block at `set = 0, binding = 0`,
//!   laid out identically in both stages.
//!
//! Names a stage does not declare are recorded as absent.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use naga::front::glsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};
use thiserror::Error;

/// Version line prepended to both sources when none is configured.
pub const DEFAULT_VERSION_PREFIX: &str = "#version 450\n";

/// Name every GLSL stage uses for its entry point.
pub const ENTRY_POINT: &str = "main";

/// Fragment output that must be bound to colour slot 0.
pub const OUTPUT_NAME: &str = "outColor";

/// Where the draw uniform block must be bound.
pub const DRAW_BLOCK_GROUP: u32 = 0;
pub const DRAW_BLOCK_BINDING: u32 = 0;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Compilation step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Link,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Link => "link",
        })
    }
}

/// Compile or link failure; `log` is the backend diagnostic, verbatim.
#[derive(Debug, Clone, Error)]
#[error("{stage} stage failed:\n{log}")]
pub struct CompileError {
    pub stage: ShaderStage,
    pub log: String,
}

impl CompileError {
    pub fn link(log: impl Into<String>) -> Self {
        Self { stage: ShaderStage::Link, log: log.into() }
    }
}

// ── Handles ───────────────────────────────────────────────────────────────────

/// Per-vertex inputs the geometry table can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Position,
    Color,
    Texcoord,
    Normal,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [Attribute::Position, Attribute::Color, Attribute::Texcoord, Attribute::Normal];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Position => "position",
            Attribute::Color => "color",
            Attribute::Texcoord => "texcoord",
            Attribute::Normal => "normal",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Members of the per-draw uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uniform {
    Model,
    View,
    Proj,
    OverrideColor,
}

impl Uniform {
    pub const ALL: [Uniform; 4] = [Uniform::Model, Uniform::View, Uniform::Proj, Uniform::OverrideColor];

    pub fn name(self) -> &'static str {
        match self {
            Uniform::Model => "model",
            Uniform::View => "view",
            Uniform::Proj => "proj",
            Uniform::OverrideColor => "overrideColor",
        }
    }

    /// Byte size of the value written for this member.
    pub fn size(self) -> u32 {
        match self {
            Uniform::Model | Uniform::View | Uniform::Proj => 64,
            Uniform::OverrideColor => 12,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Byte range of one member inside the draw block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformSlot {
    pub offset: u32,
    pub size: u32,
}

/// A resolved logical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Attribute(u32),
    Uniform(UniformSlot),
}

/// Identifies one compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(u64);

static NEXT_PROGRAM: AtomicU64 = AtomicU64::new(1);

impl ProgramId {
    fn next() -> Self {
        Self(NEXT_PROGRAM.fetch_add(1, Ordering::Relaxed))
    }
}

/// Program identifier plus the location of every logical name.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderHandles {
    pub program: ProgramId,
    attributes: [Option<u32>; 4],
    uniforms: [Option<UniformSlot>; 4],
    /// Size of the draw block (its std140 span), if either stage declares one.
    pub block_size: Option<u32>,
}

impl ShaderHandles {
    pub fn attribute(&self, attribute: Attribute) -> Option<u32> {
        self.attributes[attribute.index()]
    }

    pub fn uniform(&self, uniform: Uniform) -> Option<UniformSlot> {
        self.uniforms[uniform.index()]
    }

    /// Looks up any logical name; unknown and absent names give `None`.
    pub fn location(&self, name: &str) -> Option<Location> {
        if let Some(a) = Attribute::ALL.iter().find(|a| a.name() == name) {
            return self.attribute(*a).map(Location::Attribute);
        }
        Uniform::ALL
            .iter()
            .find(|u| u.name() == name)
            .and_then(|u| self.uniform(*u))
            .map(Location::Uniform)
    }

    /// Logical names the program does not use.
    pub fn absent(&self) -> Vec<&'static str> {
        let attributes = Attribute::ALL.iter().filter(|a| self.attribute(**a).is_none()).map(|a| a.name());
        let uniforms = Uniform::ALL.iter().filter(|u| self.uniform(**u).is_none()).map(|u| u.name());
        attributes.chain(uniforms).collect()
    }
}

// ── Compilation ───────────────────────────────────────────────────────────────

/// Output of [`compile`]: the prefixed sources the GPU modules are built from,
/// plus the reflected handles.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub vertex_source: String,
    pub fragment_source: String,
    pub handles: ShaderHandles,
}

/// Prepends `version_prefix` to both sources, compiles each stage and
/// checks the interface between them.
pub fn compile(vertex_source: &str, fragment_source: &str, version_prefix: &str) -> Result<CompiledProgram, CompileError> {
    let vertex_source = with_version(version_prefix, vertex_source);
    let fragment_source = with_version(version_prefix, fragment_source);

    let vertex = parse_stage(ShaderStage::Vertex, &vertex_source)?;
    let fragment = parse_stage(ShaderStage::Fragment, &fragment_source)?;
    log::debug!("vertex and fragment stages compiled");

    let handles = reflect(&vertex, &fragment)?;
    let absent = handles.absent();
    if !absent.is_empty() {
        log::debug!("program does not use: {}", absent.join(", "));
    }

    Ok(CompiledProgram { vertex_source, fragment_source, handles })
}

fn with_version(prefix: &str, source: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + source.len() + 1);
    out.push_str(prefix);
    if !prefix.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(source);
    out
}

fn naga_stage(stage: ShaderStage) -> naga::ShaderStage {
    match stage {
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
        _ => naga::ShaderStage::Vertex,
    }
}

fn parse_stage(stage: ShaderStage, source: &str) -> Result<naga::Module, CompileError> {
    let module = glsl::Frontend::default()
        .parse(&glsl::Options::from(naga_stage(stage)), source)
        .map_err(|errors| CompileError { stage, log: errors.emit_to_string(source) })?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|error| CompileError { stage, log: error.emit_to_string(source) })?;

    Ok(module)
}

fn entry_point(module: &naga::Module, stage: naga::ShaderStage) -> Result<&naga::EntryPoint, CompileError> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == ENTRY_POINT)
        .ok_or_else(|| CompileError::link(format!("no {stage:?} entry point named `{ENTRY_POINT}`")))
}

// ── Reflection ────────────────────────────────────────────────────────────────

fn reflect(vertex: &naga::Module, fragment: &naga::Module) -> Result<ShaderHandles, CompileError> {
    let vs = entry_point(vertex, naga::ShaderStage::Vertex)?;
    let fs = entry_point(fragment, naga::ShaderStage::Fragment)?;

    let mut attributes = [None; 4];
    for arg in &vs.function.arguments {
        let (Some(name), Some(naga::Binding::Location { location, .. })) = (&arg.name, &arg.binding) else {
            continue;
        };
        if let Some(a) = Attribute::ALL.iter().find(|a| a.name() == name) {
            attributes[a.index()] = Some(*location);
        }
    }

    check_output(fragment, fs)?;

    let vertex_block = draw_block(vertex)?;
    let fragment_block = draw_block(fragment)?;
    let block = match (vertex_block, fragment_block) {
        (Some(v), Some(f)) if v != f => {
            return Err(CompileError::link("the draw uniform block is laid out differently in the two stages"));
        }
        (Some(block), _) | (None, Some(block)) => Some(block),
        (None, None) => None,
    };

    Ok(ShaderHandles {
        program: ProgramId::next(),
        attributes,
        uniforms: block.as_ref().map(|b| b.members).unwrap_or_default(),
        block_size: block.map(|b| b.span),
    })
}

fn check_output(module: &naga::Module, fs: &naga::EntryPoint) -> Result<(), CompileError> {
    let result = fs
        .function
        .result
        .as_ref()
        .ok_or_else(|| CompileError::link(format!("fragment stage has no `{OUTPUT_NAME}` output")))?;

    let location = match (&result.binding, &module.types[result.ty].inner) {
        (Some(naga::Binding::Location { location, .. }), _) => Some(*location),
        (None, naga::TypeInner::Struct { members, .. }) => members
            .iter()
            .find(|m| m.name.as_deref() == Some(OUTPUT_NAME))
            .and_then(|m| match m.binding {
                Some(naga::Binding::Location { location, .. }) => Some(location),
                _ => None,
            }),
        _ => None,
    };

    match location {
        Some(0) => Ok(()),
        Some(other) => Err(CompileError::link(format!(
            "fragment output `{OUTPUT_NAME}` is bound to location {other}, expected 0"
        ))),
        None => Err(CompileError::link(format!("fragment stage has no `{OUTPUT_NAME}` output"))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DrawBlock {
    members: [Option<UniformSlot>; 4],
    span: u32,
}

/// Finds the uniform block holding the recognised members, if any.
fn draw_block(module: &naga::Module) -> Result<Option<DrawBlock>, CompileError> {
    let mut found = None;

    for (_, var) in module.global_variables.iter() {
        if var.space != naga::AddressSpace::Uniform {
            continue;
        }
        let naga::TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
            if let Some(name) = var.name.as_deref().filter(|n| Uniform::ALL.iter().any(|u| u.name() == *n)) {
                return Err(CompileError::link(format!("uniform `{name}` must be declared inside the draw block")));
            }
            continue;
        };

        let mut slots = [None; 4];
        for member in members {
            let Some(u) = Uniform::ALL.iter().find(|u| Some(u.name()) == member.name.as_deref()) else {
                continue;
            };
            let size = module.types[member.ty].inner.size(module.to_ctx());
            if size != u.size() {
                return Err(CompileError::link(format!(
                    "uniform `{}` is {size} bytes, expected {}",
                    u.name(),
                    u.size()
                )));
            }
            slots[u.index()] = Some(UniformSlot { offset: member.offset, size });
        }
        if slots.iter().all(Option::is_none) {
            continue;
        }

        match var.binding {
            Some(naga::ResourceBinding { group: DRAW_BLOCK_GROUP, binding: DRAW_BLOCK_BINDING }) => {}
            _ => {
                return Err(CompileError::link(format!(
                    "the draw uniform block must use set = {DRAW_BLOCK_GROUP}, binding = {DRAW_BLOCK_BINDING}"
                )));
            }
        }
        if found.is_some() {
            return Err(CompileError::link("the draw uniforms are split across several blocks"));
        }
        found = Some(DrawBlock { members: slots, span: *span });
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE_VERT: &str = include_str!("../../../../assets/shaders/scene.vert");
    const SCENE_FRAG: &str = include_str!("../../../../assets/shaders/scene.frag");

    const BARE_VERT: &str = "
layout(location = 0) in vec3 position;
void main() {
    gl_Position = vec4(position, 1.0);
}
";

    const BARE_FRAG: &str = "
layout(location = 0) out vec4 outColor;
void main() {
    outColor = vec4(1.0);
}
";

    #[test]
    fn scene_program_resolves_every_name() {
        let program = compile(SCENE_VERT, SCENE_FRAG, DEFAULT_VERSION_PREFIX).unwrap();
        let h = &program.handles;
        assert!(program.vertex_source.starts_with("#version 450\n"));
        assert!(h.absent().is_empty(), "{:?}", h.absent());

        assert_eq!(h.attribute(Attribute::Position), Some(0));
        assert_eq!(h.attribute(Attribute::Color), Some(1));
        assert_eq!(h.attribute(Attribute::Texcoord), Some(2));
        assert_eq!(h.attribute(Attribute::Normal), Some(3));

        let offsets: Vec<_> = Uniform::ALL.iter().map(|u| h.uniform(*u).map(|s| s.offset)).collect();
        assert_eq!(offsets, [Some(0), Some(64), Some(128), Some(192)]);
        assert_eq!(h.block_size, Some(208));
        assert_eq!(h.location("overrideColor"), Some(Location::Uniform(UniformSlot { offset: 192, size: 12 })));
        assert_eq!(h.location("texcoord"), Some(Location::Attribute(2)));
    }

    #[test]
    fn unused_names_are_absent_not_errors() {
        let program = compile(BARE_VERT, BARE_FRAG, DEFAULT_VERSION_PREFIX).unwrap();
        let h = &program.handles;
        assert_eq!(h.attribute(Attribute::Position), Some(0));
        assert_eq!(h.attribute(Attribute::Normal), None);
        assert_eq!(h.uniform(Uniform::Model), None);
        assert_eq!(h.block_size, None);
        assert_eq!(h.location("normal"), None);
        assert_eq!(h.location("not_a_name"), None);
        assert_eq!(h.absent().len(), 7);
    }

    #[test]
    fn vertex_errors_are_attributed_to_the_vertex_stage() {
        let err = compile("void main() { gl_Position = undefined_thing; }", BARE_FRAG, DEFAULT_VERSION_PREFIX)
            .unwrap_err();
        assert_eq!(err.stage, ShaderStage::Vertex);
        assert!(!err.log.is_empty());
    }

    #[test]
    fn fragment_errors_are_attributed_to_the_fragment_stage() {
        let err = compile(BARE_VERT, "void main() { outColor = ; }", DEFAULT_VERSION_PREFIX).unwrap_err();
        assert_eq!(err.stage, ShaderStage::Fragment);
        assert!(!err.log.is_empty());
    }

    #[test]
    fn out_color_must_use_slot_zero() {
        let frag = "
layout(location = 1) out vec4 outColor;
void main() {
    outColor = vec4(1.0);
}
";
        let err = compile(BARE_VERT, frag, DEFAULT_VERSION_PREFIX).unwrap_err();
        assert_eq!(err.stage, ShaderStage::Link);
        assert!(err.log.contains("outColor"), "{}", err.log);
    }

    #[test]
    fn draw_block_must_sit_at_group_zero() {
        let vert = "
layout(location = 0) in vec3 position;
layout(set = 1, binding = 0) uniform Draw {
    mat4 model;
};
void main() {
    gl_Position = model * vec4(position, 1.0);
}
";
        let err = compile(vert, BARE_FRAG, DEFAULT_VERSION_PREFIX).unwrap_err();
        assert_eq!(err.stage, ShaderStage::Link);
    }

    #[test]
    fn stages_must_agree_on_the_block_layout() {
        let vert = "
layout(location = 0) in vec3 position;
layout(set = 0, binding = 0) uniform Draw {
    mat4 model;
    vec3 overrideColor;
};
void main() {
    gl_Position = model * vec4(position, 1.0);
}
";
        let frag = "
layout(set = 0, binding = 0) uniform Draw {
    vec3 overrideColor;
};
layout(location = 0) out vec4 outColor;
void main() {
    outColor = vec4(overrideColor, 1.0);
}
";
        let err = compile(vert, frag, DEFAULT_VERSION_PREFIX).unwrap_err();
        assert_eq!(err.stage, ShaderStage::Link);
    }

    #[test]
    fn prefix_without_newline_still_compiles() {
        let program = compile(BARE_VERT, BARE_FRAG, "#version 450").unwrap();
        assert!(program.fragment_source.starts_with("#version 450\n"));
    }

    #[test]
    fn program_ids_are_unique() {
        let a = compile(BARE_VERT, BARE_FRAG, DEFAULT_VERSION_PREFIX).unwrap();
        let b = compile(BARE_VERT, BARE_FRAG, DEFAULT_VERSION_PREFIX).unwrap();
        assert_ne!(a.handles.program, b.handles.program);
    }
}
