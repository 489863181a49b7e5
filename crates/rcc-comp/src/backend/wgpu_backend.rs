//! wgpu mask backend.
//!
//! Runs the even-odd fill and both blur passes as compute shaders.
//! Masks live in storage buffers; results are read back into
//! [`MaskBuffer`] so the rest of the pipeline is backend-agnostic.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::MaskBackend;
use crate::blur::blur_radius;
use crate::mask::{MaskBuffer, image_to_pixel};
use crate::shaders;
use crate::{CompError, CompResult};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct DimsUniform {
    dims: [u32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct BlurUniform {
    width: u32,
    height: u32,
    radius: u32,
    axis: u32,
    step_px: f32,
    _pad: [f32; 3],
}

struct Pipelines {
    fill: wgpu::ComputePipeline,
    blur: wgpu::ComputePipeline,
}

/// Compute-shader mask backend.
pub struct WgpuMaskBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pipelines: Pipelines,
}

impl WgpuMaskBackend {
    /// Check if a wgpu adapter is available.
    pub fn is_available() -> bool {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .is_some()
        })
    }

    pub fn new() -> CompResult<Self> {
        pollster::block_on(Self::new_async())
    }

    pub async fn new_async() -> CompResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| CompError::BackendFault("no wgpu adapter".into()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("rcc_mask_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| CompError::BackendFault(e.to_string()))?;

        let pipelines = Self::create_pipelines(&device);

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            pipelines,
        })
    }

    fn create_pipelines(device: &wgpu::Device) -> Pipelines {
        let create_pipeline = |source: &str, label: &str| -> wgpu::ComputePipeline {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: None, // Auto layout
                module: &module,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                cache: None,
            })
        };

        Pipelines {
            fill: create_pipeline(shaders::MASK_EVEN_ODD, "mask_fill_pipeline"),
            blur: create_pipeline(shaders::BLUR_PASS, "mask_blur_pipeline"),
        }
    }

    fn dispatch_and_wait(
        &self,
        pipeline: &wgpu::ComputePipeline,
        bind_group: &wgpu::BindGroup,
        workgroups: (u32, u32, u32),
    ) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("mask_encoder"),
            });

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("mask_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(workgroups.0, workgroups.1, workgroups.2);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.device.poll(wgpu::Maintain::Wait);
    }

    fn mask_buffer(&self, texels: u64, label: &str) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: texels * 4,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn download(&self, buffer: &wgpu::Buffer, size: u64) -> CompResult<Vec<f32>> {
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mask_staging"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&Default::default());
        encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| CompError::BackendFault("map channel closed".into()))?
            .map_err(|e| CompError::BackendFault(format!("map failed: {e}")))?;

        let data = slice.get_mapped_range();
        let result: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();

        Ok(result)
    }

    fn blur_pass(
        &self,
        src: &wgpu::Buffer,
        dst: &wgpu::Buffer,
        width: u32,
        height: u32,
        radius: u32,
        axis: u32,
        step_px: f32,
    ) {
        let uniform = BlurUniform {
            width,
            height,
            radius,
            axis,
            step_px,
            _pad: [0.0; 3],
        };
        let params_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("blur_uniform"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let layout = self.pipelines.blur.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blur_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: src.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: dst.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: params_buf.as_entire_binding() },
            ],
        });

        let workgroups = (width.div_ceil(16), height.div_ceil(16), 1);
        self.dispatch_and_wait(&self.pipelines.blur, &bind_group, workgroups);
    }
}

impl MaskBackend for WgpuMaskBackend {
    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn rasterize(
        &self,
        width: u32,
        height: u32,
        shapes: &[Vec<(f32, f32)>],
    ) -> CompResult<MaskBuffer> {
        if width == 0 || height == 0 {
            return Err(CompError::InvalidDimensions(width, height));
        }

        let mut points: Vec<[f32; 2]> = Vec::new();
        let mut ranges: Vec<[u32; 2]> = Vec::new();
        for shape in shapes.iter().filter(|s| s.len() >= 3) {
            ranges.push([points.len() as u32, shape.len() as u32]);
            points.extend(
                shape
                    .iter()
                    .map(|&p| {
                        let (x, y) = image_to_pixel(p, width, height);
                        [x, y]
                    }),
            );
        }

        if ranges.is_empty() {
            return MaskBuffer::new(width, height);
        }

        let points_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shape_points"),
                contents: bytemuck::cast_slice(&points),
                usage: wgpu::BufferUsages::STORAGE,
            });
        let ranges_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shape_ranges"),
                contents: bytemuck::cast_slice(&ranges),
                usage: wgpu::BufferUsages::STORAGE,
            });

        let texels = (width as u64) * (height as u64);
        let mask_buf = self.mask_buffer(texels, "mask_storage");

        let uniform = DimsUniform {
            dims: [width, height, ranges.len() as u32, 0],
        };
        let dims_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mask_dims"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let layout = self.pipelines.fill.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mask_fill_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: points_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: ranges_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: mask_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: dims_buf.as_entire_binding() },
            ],
        });

        let workgroups = (width.div_ceil(16), height.div_ceil(16), 1);
        self.dispatch_and_wait(&self.pipelines.fill, &bind_group, workgroups);

        let data = self.download(&mask_buf, texels * 4)?;
        Ok(MaskBuffer { width, height, data })
    }

    fn blur(&self, mask: &mut MaskBuffer, falloff: f32) -> CompResult<()> {
        let (w, h) = (mask.width, mask.height);
        let r = blur_radius(falloff, h);
        let diameter = falloff * h as f32;
        let step_px = diameter / (2.0 * r as f32);

        let texels = (w as u64) * (h as u64);
        let src = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("blur_src"),
                contents: bytemuck::cast_slice(&mask.data),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST,
            });
        let scratch = self.mask_buffer(texels, "blur_scratch");

        // vertical into scratch, horizontal back into src
        self.blur_pass(&src, &scratch, w, h, r as u32, 1, step_px);
        self.blur_pass(&scratch, &src, w, h, r as u32, 0, step_px);

        mask.data = self.download(&src, texels * 4)?;
        Ok(())
    }
}
