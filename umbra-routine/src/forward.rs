//! Lit rendering of the scene to the backbuffer, sampling the shadow map.

use umbra::{Renderer, WINDOW_DEPTH_FORMAT};
use wgpu::{
    BindGroup, BlendState, Color, ColorTargetState, ColorWrites, CommandEncoder, CompareFunction, DepthBiasState,
    DepthStencilState, Face, FragmentState, IndexFormat, LoadOp, MultisampleState, Operations,
    PipelineLayoutDescriptor, PolygonMode, PrimitiveState, PrimitiveTopology, RenderPassColorAttachment,
    RenderPassDepthStencilAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor,
    ShaderModuleDescriptor, ShaderSource, StencilState, TextureView, VertexState,
};

use crate::{
    common::WholeFrameInterfaces,
    depth::front_face,
    scene::{SceneObject, Vertex},
    schedule::{PassKind, PassPlan, RenderOp},
    shaders,
};

const BACKGROUND_COLOR: Color = Color {
    r: 0.392,
    g: 0.584,
    b: 0.929,
    a: 1.0,
};

/// Forward pass routine.
///
/// Group 0 is the forward uniform set: the viewing camera, the light with its
/// view/projection, and the shadow map with its comparison sampler.
pub struct ForwardRoutine {
    pipeline: RenderPipeline,
}

impl ForwardRoutine {
    pub fn new(renderer: &Renderer, interfaces: &WholeFrameInterfaces) -> Self {
        profiling::scope!("ForwardRoutine::new");

        let sm = renderer.device.create_shader_module(ShaderModuleDescriptor {
            label: Some("forward"),
            source: ShaderSource::Wgsl(shaders::wgsl_source("forward.wgsl")),
        });

        let pll = renderer.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("forward pass"),
            bind_group_layouts: &[&interfaces.forward_uniform_bgl, &interfaces.object_bgl],
            push_constant_ranges: &[],
        });

        let pipeline = renderer.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("forward pipeline"),
            layout: Some(&pll),
            vertex: VertexState {
                module: &sm,
                entry_point: "vs_main",
                buffers: &[Vertex::layout()],
            },
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: front_face(renderer.handedness()),
                cull_mode: Some(Face::Back),
                unclipped_depth: false,
                polygon_mode: PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: WINDOW_DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState::default(),
            fragment: Some(FragmentState {
                module: &sm,
                entry_point: "fs_main",
                targets: &[Some(ColorTargetState {
                    format: renderer.surface_format(),
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            multiview: None,
        });

        Self { pipeline }
    }

    /// Encodes the forward pass: clears the backbuffer and window depth, then
    /// draws the plan's objects with the shadow map bound for sampling.
    pub fn add_forward_pass(
        &self,
        encoder: &mut CommandEncoder,
        color_view: &TextureView,
        depth_view: &TextureView,
        forward_uniform_bg: &BindGroup,
        scene: &[SceneObject],
        plan: &PassPlan,
    ) {
        profiling::scope!("Forward Pass");
        debug_assert_eq!(plan.kind, PassKind::Forward);

        let clear = plan.ops.contains(&RenderOp::ClearBackbuffer);
        let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("forward pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: Operations {
                    load: if clear { LoadOp::Clear(BACKGROUND_COLOR) } else { LoadOp::Load },
                    store: true,
                },
            })],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(Operations {
                    load: if clear { LoadOp::Clear(1.0) } else { LoadOp::Load },
                    store: true,
                }),
                stencil_ops: None,
            }),
        });

        rpass.set_pipeline(&self.pipeline);

        for op in &plan.ops {
            match op {
                RenderOp::BindShadowRead => rpass.set_bind_group(0, forward_uniform_bg, &[]),
                RenderOp::Draw { index } => {
                    let object = &scene[*index];
                    rpass.set_bind_group(1, &object.bind_group, &[]);
                    rpass.set_vertex_buffer(0, object.mesh.vertex_buffer.slice(..));
                    rpass.set_index_buffer(object.mesh.index_buffer.slice(..), IndexFormat::Uint16);
                    rpass.draw_indexed(0..object.mesh.index_count, 0, 0..1);
                }
                _ => {}
            }
        }
    }
}
