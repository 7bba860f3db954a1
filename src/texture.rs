use crate::gpu::GpuContext;

/// Failures while loading a texture from encoded image data.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode image '{label}': {source}")]
    Decode {
        label: String,
        #[source]
        source: image::ImageError,
    },
}

/// A GPU texture that can be bound for batch draws.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    ///
    /// Sampling repeats in both directions with linear filtering, so texture
    /// coordinates outside `[0, 1]` tile the image.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// A 1×1 opaque white texture; sampling it leaves vertex colors unchanged.
    pub fn white(gpu: &GpuContext) -> Self {
        Self::from_rgba(gpu, &[255, 255, 255, 255], 1, 1, "White Texture")
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: &str) -> Result<Self, TextureError> {
        let img = image::open(path)
            .map_err(|source| TextureError::Decode {
                label: path.to_string(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        log::debug!("loaded texture '{path}' ({width}x{height})");
        Ok(Self::from_rgba(gpu, &img, width, height, path))
    }

    /// Generate a two-color checkerboard with `cells` squares per side.
    pub fn checkerboard(gpu: &GpuContext, size: u32, cells: u32, a: [u8; 3], b: [u8; 3]) -> Self {
        let data = checkerboard_pixels(size, cells, a, b);
        Self::from_rgba(gpu, &data, size, size, "Checkerboard Texture")
    }
}

fn checkerboard_pixels(size: u32, cells: u32, a: [u8; 3], b: [u8; 3]) -> Vec<u8> {
    let cell = (size / cells.max(1)).max(1);
    let mut data = vec![0u8; (size * size * 4) as usize];

    for y in 0..size {
        for x in 0..size {
            let idx = ((y * size + x) * 4) as usize;
            let color = if (x / cell + y / cell) % 2 == 0 { a } else { b };
            data[idx..idx + 3].copy_from_slice(&color);
            data[idx + 3] = 255;
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_alternates_cells() {
        let data = checkerboard_pixels(4, 2, [255, 0, 0], [0, 0, 255]);
        assert_eq!(data.len(), 4 * 4 * 4);

        let pixel = |x: usize, y: usize| {
            let idx = (y * 4 + x) * 4;
            [data[idx], data[idx + 1], data[idx + 2], data[idx + 3]]
        };
        assert_eq!(pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(pixel(1, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(2, 0), [0, 0, 255, 255]);
        assert_eq!(pixel(0, 2), [0, 0, 255, 255]);
        assert_eq!(pixel(3, 3), [255, 0, 0, 255]);
    }
}
