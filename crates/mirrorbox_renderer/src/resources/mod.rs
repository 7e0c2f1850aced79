pub mod buffer;
pub mod draw_buffer;
pub mod texture;

pub use draw_buffer::DrawBuffer;
pub use texture::{AssetDecodeError, DecodedImage, SceneTexture};
