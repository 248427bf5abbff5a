/// One acquired swapchain image plus the encoder recording into it.
///
/// Dropping the surface texture after submission presents the image, so a frame
/// must be submitted within the refresh it was acquired in.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
