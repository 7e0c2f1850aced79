pub mod mirror_pass;

pub use mirror_pass::MirrorPass;
