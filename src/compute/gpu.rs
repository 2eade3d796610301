//! wgpu device running the WGSL position kernels.

use glam::Vec3;
use wgpu::util::DeviceExt;

use super::{ComputeDevice, KernelDispatch, KernelKind};
use crate::core::{Error, Result};

/// Bytes per position in the output buffers (tightly packed `f32` xyz).
const POSITION_STRIDE: u64 = 3 * std::mem::size_of::<f32>() as u64;

/// Compute pipeline for one kernel
struct KernelPipeline {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl KernelPipeline {
    fn new(device: &wgpu::Device, kind: KernelKind, source: &'static str) -> Self {
        let label = kind.entry_point();
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        // Group 0: params uniform + output storage
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(kind.entry_point()),
            compilation_options: Default::default(),
            cache: None,
        });

        Self { pipeline, bind_group_layout }
    }
}

/// GPU output buffer plus its mappable staging copy.
pub struct GpuBuffer {
    kind: KernelKind,
    len: usize,
    storage: wgpu::Buffer,
    staging: wgpu::Buffer,
}

impl GpuBuffer {
    fn size(&self) -> u64 {
        self.len as u64 * POSITION_STRIDE
    }
}

/// Headless wgpu device with the split and grass pipelines compiled.
pub struct GpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_name: String,
    split_terrain: KernelPipeline,
    spawn_grass: KernelPipeline,
}

impl GpuDevice {
    /// Request an adapter and device without a surface.
    pub async fn new() -> Result<Self> {
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
            .map_err(|e| Error::Gpu(format!("No suitable adapter found: {:?}", e)))?;

        let adapter_limits = adapter.limits();
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("terrasplit_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits {
                    max_storage_buffer_binding_size: adapter_limits.max_storage_buffer_binding_size,
                    max_buffer_size: adapter_limits.max_buffer_size,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| Error::Gpu(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("GPU device: {} ({:?})", info.name, info.backend);
        Ok(Self::from_device(device, queue, info.name))
    }

    /// Blocking variant of [`GpuDevice::new`].
    pub fn new_blocking() -> Result<Self> {
        pollster::block_on(Self::new())
    }

    /// Build the kernel pipelines on an existing device.
    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue, adapter_name: String) -> Self {
        let split_terrain = KernelPipeline::new(
            &device,
            KernelKind::SplitTerrain,
            include_str!("../../shaders/split_terrain.wgsl"),
        );
        let spawn_grass = KernelPipeline::new(
            &device,
            KernelKind::SpawnGrass,
            include_str!("../../shaders/spawn_grass.wgsl"),
        );

        Self {
            device,
            queue,
            adapter_name,
            split_terrain,
            spawn_grass,
        }
    }

    fn pipeline(&self, kind: KernelKind) -> &KernelPipeline {
        match kind {
            KernelKind::SplitTerrain => &self.split_terrain,
            KernelKind::SpawnGrass => &self.spawn_grass,
        }
    }

    fn wait(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait { submission_index: None, timeout: None })
            .map(|_| ())
            .map_err(|e| Error::Gpu(format!("device poll failed: {:?}", e)))
    }
}

impl ComputeDevice for GpuDevice {
    type Buffer = GpuBuffer;

    fn name(&self) -> &str {
        &self.adapter_name
    }

    fn acquire(&self, kind: KernelKind, len: usize) -> Result<GpuBuffer> {
        if len == 0 {
            return Err(Error::Compute(format!("cannot allocate an empty {} buffer", kind.output_name())));
        }

        let size = len as u64 * POSITION_STRIDE;
        let limits = self.device.limits();
        let max_binding = u64::from(limits.max_storage_buffer_binding_size);
        if size > max_binding || size > limits.max_buffer_size {
            return Err(Error::Gpu(format!(
                "{} needs {}MB, device allows {}MB per binding",
                kind.output_name(),
                size / 1024 / 1024,
                max_binding / 1024 / 1024
            )));
        }

        let storage = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(kind.output_name()),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("position_staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(GpuBuffer { kind, len, storage, staging })
    }

    fn dispatch(&self, dispatch: &KernelDispatch, output: &mut GpuBuffer) -> Result<()> {
        let kind = dispatch.kind();
        if output.kind != kind || output.len != dispatch.output_len() {
            return Err(Error::Compute(format!(
                "{} needs {} positions, buffer {} holds {}",
                kind.entry_point(),
                dispatch.output_len(),
                output.kind.output_name(),
                output.len
            )));
        }

        let [workgroups_x, workgroups_y, _] = dispatch.workgroups();
        let max_workgroups = self.device.limits().max_compute_workgroups_per_dimension;
        if workgroups_x > max_workgroups || workgroups_y > max_workgroups {
            return Err(Error::Gpu(format!(
                "dispatch {} x {} exceeds {} workgroups per dimension",
                workgroups_x, workgroups_y, max_workgroups
            )));
        }

        let params_bytes = match dispatch {
            KernelDispatch::SplitTerrain(p) => bytemuck::bytes_of(p),
            KernelDispatch::SpawnGrass(p) => bytemuck::bytes_of(p),
        };
        let params_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("kernel_params"),
            contents: params_bytes,
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let pipeline = self.pipeline(kind);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(kind.entry_point()),
            layout: &pipeline.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.storage.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(kind.entry_point()),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(kind.entry_point()),
                timestamp_writes: None,
            });
            pass.set_pipeline(&pipeline.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(workgroups_x, workgroups_y, 1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        self.wait()?;

        params_buffer.destroy();
        Ok(())
    }

    fn read_back(&self, buffer: &GpuBuffer) -> Result<Vec<Vec3>> {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("position_readback"),
        });
        encoder.copy_buffer_to_buffer(&buffer.storage, 0, &buffer.staging, 0, buffer.size());
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).ok();
        });
        self.wait()?;

        rx.recv()
            .map_err(|e| Error::Gpu(format!("map callback dropped: {}", e)))?
            .map_err(|e| Error::Gpu(format!("failed to map {}: {}", buffer.kind.output_name(), e)))?;

        let positions = {
            let data = slice.get_mapped_range();
            data.chunks_exact(POSITION_STRIDE as usize)
                .map(|xyz| Vec3::from_array(bytemuck::pod_read_unaligned::<[f32; 3]>(xyz)))
                .collect()
        };
        buffer.staging.unmap();

        Ok(positions)
    }

    fn release(&self, buffer: &mut GpuBuffer) {
        buffer.storage.destroy();
        buffer.staging.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{CpuDevice, run_kernel};
    use crate::grass::SpawnGrassParams;
    use crate::grid::{StartCorner, TileGrid};
    use crate::terrain::TerrainExtent;

    /// GPU tests are skipped on machines without an adapter.
    fn gpu() -> Option<GpuDevice> {
        match GpuDevice::new_blocking() {
            Ok(device) => Some(device),
            Err(e) => {
                eprintln!("skipping GPU test: {}", e);
                None
            }
        }
    }

    fn assert_close(gpu: &[Vec3], cpu: &[Vec3]) {
        assert_eq!(gpu.len(), cpu.len());
        for (i, (a, b)) in gpu.iter().zip(cpu).enumerate() {
            assert!(a.abs_diff_eq(*b, 1e-3), "slot {}: gpu {} vs cpu {}", i, a, b);
        }
    }

    #[test]
    fn test_split_matches_cpu() {
        let Some(device) = gpu() else { return };
        for corner in StartCorner::ALL {
            let grid = TileGrid::new(TerrainExtent::new(95.0, 42.0), 10.0, corner).unwrap();
            let dispatch = KernelDispatch::SplitTerrain(grid.split_params());
            let on_gpu = run_kernel(&device, &dispatch).unwrap();
            let on_cpu = run_kernel(&CpuDevice::new(), &dispatch).unwrap();
            assert_close(&on_gpu, &on_cpu);
        }
    }

    #[test]
    fn test_grass_matches_cpu() {
        let Some(device) = gpu() else { return };
        let grid = TileGrid::new(TerrainExtent::new(95.0, 42.0), 10.0, StartCorner::BottomLeft).unwrap();
        let params = SpawnGrassParams::new(&grid, 1.0, 10, Vec3::new(30.0, 2.0, 20.0), 25.0);
        let dispatch = KernelDispatch::SpawnGrass(params);
        let on_gpu = run_kernel(&device, &dispatch).unwrap();
        let on_cpu = run_kernel(&CpuDevice::new(), &dispatch).unwrap();
        assert_eq!(on_gpu.len(), 5000);
        assert_close(&on_gpu, &on_cpu);
    }

    #[test]
    fn test_empty_acquire_rejected() {
        let Some(device) = gpu() else { return };
        assert!(device.acquire(KernelKind::SplitTerrain, 0).is_err());
    }
}
