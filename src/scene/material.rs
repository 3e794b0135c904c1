use glam::Vec4;

/// Texture filtering mode, mirroring the glTF sampler enumerations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Nearest texel.
    Nearest,
    /// Bilinear.
    Linear,
    /// Nearest texel, nearest mip.
    NearestMipmapNearest,
    /// Bilinear, nearest mip.
    LinearMipmapNearest,
    /// Nearest texel, blended mips.
    NearestMipmapLinear,
    /// Trilinear.
    LinearMipmapLinear,
}

impl From<gltf::texture::MagFilter> for Filter {
    fn from(filter: gltf::texture::MagFilter) -> Self {
        match filter {
            gltf::texture::MagFilter::Nearest => Self::Nearest,
            gltf::texture::MagFilter::Linear => Self::Linear,
        }
    }
}

impl From<gltf::texture::MinFilter> for Filter {
    fn from(filter: gltf::texture::MinFilter) -> Self {
        use gltf::texture::MinFilter;
        match filter {
            MinFilter::Nearest => Self::Nearest,
            MinFilter::Linear => Self::Linear,
            MinFilter::NearestMipmapNearest => Self::NearestMipmapNearest,
            MinFilter::LinearMipmapNearest => Self::LinearMipmapNearest,
            MinFilter::NearestMipmapLinear => Self::NearestMipmapLinear,
            MinFilter::LinearMipmapLinear => Self::LinearMipmapLinear,
        }
    }
}

/// How a texture is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSettings {
    /// Minification filter.
    pub min_filter: Filter,
    /// Magnification filter.
    pub mag_filter: Filter,
    /// Maximum anisotropy samples.
    pub anisotropy: u16,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            min_filter: Filter::LinearMipmapLinear,
            mag_filter: Filter::Linear,
            anisotropy: 1,
        }
    }
}

/// Reference from a material to one of the document's textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRef {
    /// glTF texture index.
    pub texture_index: usize,
    /// glTF image index the texture samples.
    pub image_index: usize,
    /// Sampler state.
    pub sampler: SamplerSettings,
}

/// Metallic-roughness surface description of one primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material name from the document.
    pub name: Option<String>,
    /// Linear RGBA base color factor.
    pub base_color: Vec4,
    /// Metalness factor.
    pub metallic: f32,
    /// Roughness factor.
    pub roughness: f32,
    /// Render back faces.
    pub double_sided: bool,
    /// Optional base color texture.
    pub base_color_texture: Option<TextureRef>,
    /// Whether the GPU copy must be rebuilt before the next draw.
    pub needs_update: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color: Vec4::ONE,
            metallic: 1.0,
            roughness: 1.0,
            double_sided: false,
            base_color_texture: None,
            needs_update: true,
        }
    }
}
