//! Depth-only rendering of the scene into the shadow map.

use umbra::{managers::ShadowTarget, types::Handedness, Renderer, SHADOW_DEPTH_FORMAT};
use wgpu::{
    BindGroup, CommandEncoder, CompareFunction, DepthBiasState, DepthStencilState, Face, FrontFace, IndexFormat,
    LoadOp, MultisampleState, Operations, PipelineLayoutDescriptor, PolygonMode, PrimitiveState, PrimitiveTopology,
    RenderPassDepthStencilAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor,
    ShaderModuleDescriptor, ShaderSource, StencilState, VertexState,
};

use crate::{
    common::WholeFrameInterfaces,
    scene::{SceneObject, Vertex},
    schedule::{PassKind, PassPlan, RenderOp},
    shaders,
};

/// Shadow pass routine.
///
/// The pipeline renders with the light's camera bound as group 0 and no
/// fragment stage. Front faces are culled so the map holds the backs of the
/// casters, and the depth bias values keep grazing surfaces from
/// self-shadowing.
pub struct DepthRoutine {
    pipeline: RenderPipeline,
}

impl DepthRoutine {
    pub fn new(renderer: &Renderer, interfaces: &WholeFrameInterfaces, unclipped_depth_supported: bool) -> Self {
        profiling::scope!("DepthRoutine::new");

        let sm = renderer.device.create_shader_module(ShaderModuleDescriptor {
            label: Some("depth"),
            source: ShaderSource::Wgsl(shaders::wgsl_source("depth.wgsl")),
        });

        let pll = renderer.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("shadow pass"),
            bind_group_layouts: &[&interfaces.shadow_uniform_bgl, &interfaces.object_bgl],
            push_constant_ranges: &[],
        });

        let pipeline = renderer.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("shadow depth pipeline"),
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
                cull_mode: Some(Face::Front),
                unclipped_depth: unclipped_depth_supported,
                polygon_mode: PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: SHADOW_DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState {
                    constant: 20,
                    slope_scale: 2.0,
                    clamp: 0.01,
                },
            }),
            multisample: MultisampleState::default(),
            fragment: None,
            multiview: None,
        });

        Self { pipeline }
    }

    /// Encodes the shadow pass: clears the map to the far plane and draws
    /// every object the plan lists, with the light's camera bound.
    pub fn add_shadow_pass(
        &self,
        encoder: &mut CommandEncoder,
        target: &ShadowTarget,
        shadow_uniform_bg: &BindGroup,
        scene: &[SceneObject],
        plan: &PassPlan,
    ) {
        profiling::scope!("Shadow Pass");
        debug_assert_eq!(plan.kind, PassKind::Shadow);

        let clear = plan.ops.contains(&RenderOp::ClearShadowDepth);
        let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("shadow pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: &target.depth_view,
                depth_ops: Some(Operations {
                    load: if clear { LoadOp::Clear(1.0) } else { LoadOp::Load },
                    store: true,
                }),
                stencil_ops: None,
            }),
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, shadow_uniform_bg, &[]);

        for op in &plan.ops {
            if let RenderOp::Draw { index } = op {
                let object = &scene[*index];
                rpass.set_bind_group(1, &object.bind_group, &[]);
                rpass.set_vertex_buffer(0, object.mesh.vertex_buffer.slice(..));
                rpass.set_index_buffer(object.mesh.index_buffer.slice(..), IndexFormat::Uint16);
                rpass.draw_indexed(0..object.mesh.index_count, 0, 0..1);
            }
        }
    }
}

pub(crate) fn front_face(handedness: Handedness) -> FrontFace {
    match handedness {
        Handedness::Left => FrontFace::Cw,
        Handedness::Right => FrontFace::Ccw,
    }
}
