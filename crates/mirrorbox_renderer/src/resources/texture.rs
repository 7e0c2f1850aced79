//! Texture helpers: render attachments and the scene's single sampled image.

use std::path::{Path, PathBuf};

use thiserror::Error;

// ── Render attachments ────────────────────────────────────────────────────────

/// Descriptor for a single-sample 2-D render-attachment texture.
pub struct RenderTextureDesc<'a> {
    pub label: &'a str,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
}

/// Creates a 2-D texture from a [`RenderTextureDesc`].
pub fn create_render_texture(device: &wgpu::Device, desc: &RenderTextureDesc<'_>) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(desc.label),
        size: wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: desc.format,
        usage: desc.usage,
        view_formats: &[],
    })
}

/// Creates a default `TextureView` for a texture (all mips, all layers).
#[inline]
pub fn default_view(texture: &wgpu::Texture) -> wgpu::TextureView {
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// The texture image could not be turned into pixels.
///
/// Never fatal: the caller logs it and renders with [`DecodedImage::placeholder`].
#[derive(Debug, Error)]
pub enum AssetDecodeError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} has no pixels")]
    Empty { path: PathBuf },
}

/// An RGB image expanded to tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Edge length of the placeholder image, in pixels.
pub const PLACEHOLDER_SIZE: u32 = 8;
const PLACEHOLDER_CELL: u32 = 2;
const PLACEHOLDER_DARK: [u8; 4] = [32, 32, 32, 255];
const PLACEHOLDER_LIGHT: [u8; 4] = [224, 0, 224, 255];

impl DecodedImage {
    /// Decodes `path` to RGB and expands it to RGBA8 with opaque alpha.
    pub fn load(path: &Path) -> Result<Self, AssetDecodeError> {
        let rgb = image::open(path)
            .map_err(|source| AssetDecodeError::Decode { path: path.to_path_buf(), source })?
            .to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(AssetDecodeError::Empty { path: path.to_path_buf() });
        }
        Ok(Self { width, height, rgba: expand_rgb(rgb.as_raw()) })
    }

    /// Checkerboard shown in place of a texture that failed to decode.
    pub fn placeholder() -> Self {
        let mut rgba = Vec::with_capacity((PLACEHOLDER_SIZE * PLACEHOLDER_SIZE * 4) as usize);
        for y in 0..PLACEHOLDER_SIZE {
            for x in 0..PLACEHOLDER_SIZE {
                let light = (x / PLACEHOLDER_CELL + y / PLACEHOLDER_CELL) % 2 == 0;
                rgba.extend_from_slice(if light { &PLACEHOLDER_LIGHT } else { &PLACEHOLDER_DARK });
            }
        }
        Self { width: PLACEHOLDER_SIZE, height: PLACEHOLDER_SIZE, rgba }
    }

    /// [`load`](Self::load), falling back to the placeholder with a warning.
    pub fn load_or_placeholder(path: &Path) -> Self {
        match Self::load(path) {
            Ok(image) => {
                log::debug!("decoded {} ({}x{})", path.display(), image.width, image.height);
                image
            }
            Err(e) => {
                log::warn!("{e}; using a placeholder texture");
                Self::placeholder()
            }
        }
    }
}

fn expand_rgb(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3).flat_map(|px| [px[0], px[1], px[2], u8::MAX]).collect()
}

// ── Sampled texture ───────────────────────────────────────────────────────────

/// The scene's one texture, its view and its sampler.
pub struct SceneTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl SceneTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Uploads `image` with clamp-to-edge wrapping and linear filtering.
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &DecodedImage) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = default_view(&texture);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scene Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self { texture, view, sampler }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_is_expanded_with_opaque_alpha() {
        assert_eq!(expand_rgb(&[1, 2, 3, 4, 5, 6]), vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn placeholder_is_a_full_rgba_checkerboard() {
        let img = DecodedImage::placeholder();
        assert_eq!(img.rgba.len(), (PLACEHOLDER_SIZE * PLACEHOLDER_SIZE * 4) as usize);
        assert_eq!(&img.rgba[0..4], &PLACEHOLDER_LIGHT);
        // third pixel of the first row starts the next cell
        assert_eq!(&img.rgba[8..12], &PLACEHOLDER_DARK);
        assert!(img.rgba.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = DecodedImage::load(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, AssetDecodeError::Decode { .. }));
    }

    #[test]
    fn missing_file_falls_back_to_the_placeholder() {
        let img = DecodedImage::load_or_placeholder(Path::new("definitely/not/here.png"));
        assert_eq!(img, DecodedImage::placeholder());
    }

    #[test]
    fn bundled_texture_decodes() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/textures/crate.png");
        let img = DecodedImage::load(&path).unwrap();
        assert_eq!((img.width, img.height), (64, 64));
        assert_eq!(img.rgba.len(), 64 * 64 * 4);
    }
}
