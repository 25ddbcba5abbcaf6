//! Per-frame orchestration of the shadow and forward passes.

use umbra::{
    managers::{CameraManager, DirectionalLightManager, ShadowTarget},
    types::CameraMode,
    Renderer,
};
use wgpu::{BindGroup, CommandEncoderDescriptor, SurfaceError, TextureViewDescriptor};

use crate::{
    common::WholeFrameInterfaces,
    depth::DepthRoutine,
    forward::ForwardRoutine,
    scene::SceneObject,
    schedule::{FrameSchedule, PassKind},
    uniforms::FrameUniformBuffers,
};

/// Everything a frame needs to know that can change between frames.
pub struct FrameState<'a> {
    /// Which camera the forward pass views through.
    pub camera_mode: CameraMode,
    /// The camera the shadow fit follows, regardless of mode.
    pub free_camera: &'a CameraManager,
    /// Detached observer camera for inspecting the fit.
    pub visual_camera: &'a CameraManager,
}

/// Owns the pipelines, uniform buffers, and bind groups shared by every
/// frame, and encodes one frame at a time.
pub struct BaseRenderRoutine {
    pub interfaces: WholeFrameInterfaces,
    depth: DepthRoutine,
    forward: ForwardRoutine,
    uniforms: FrameUniformBuffers,
    shadow_uniform_bg: BindGroup,
    forward_uniform_bg: BindGroup,
}

impl BaseRenderRoutine {
    /// Builds the routines against the given shadow target. The same target
    /// must be the one passed to every later [`Self::render_frame`] call; its
    /// views are baked into the forward bind group here.
    pub fn new(renderer: &Renderer, shadow_target: &ShadowTarget, unclipped_depth_supported: bool) -> Self {
        profiling::scope!("BaseRenderRoutine::new");

        let interfaces = WholeFrameInterfaces::new(&renderer.device);
        let depth = DepthRoutine::new(renderer, &interfaces, unclipped_depth_supported);
        let forward = ForwardRoutine::new(renderer, &interfaces);
        let uniforms = FrameUniformBuffers::new(&renderer.device);

        let shadow_uniform_bg = umbra::util::bind_merge::BindGroupBuilder::new()
            .append_buffer(&uniforms.shadow_camera)
            .build(&renderer.device, Some("shadow uniform bg"), &interfaces.shadow_uniform_bgl);

        let forward_uniform_bg = umbra::util::bind_merge::BindGroupBuilder::new()
            .append_buffer(&uniforms.forward_camera)
            .append_buffer(&uniforms.light)
            .append_texture_view(&shadow_target.read_view)
            .append_sampler(&shadow_target.sampler)
            .build(&renderer.device, Some("forward uniform bg"), &interfaces.forward_uniform_bgl);

        Self {
            interfaces,
            depth,
            forward,
            uniforms,
            shadow_uniform_bg,
            forward_uniform_bg,
        }
    }

    /// Renders one frame: refit the light, upload uniforms, run the shadow
    /// pass then the forward pass, present.
    ///
    /// Both passes go into one command buffer on one queue, which is what
    /// orders the forward pass's shadow map reads after the shadow pass's
    /// writes.
    pub fn render_frame(
        &self,
        renderer: &Renderer,
        lights: &mut DirectionalLightManager,
        shadow_target: &ShadowTarget,
        scene: &[SceneObject],
        state: &FrameState<'_>,
    ) -> Result<(), SurfaceError> {
        profiling::scope!("render_frame");

        // The fit has no state beyond the current frame; redo it before
        // anything reads the shadow camera.
        lights.ready(state.free_camera);

        let active = active_camera(
            state.camera_mode,
            state.free_camera,
            state.visual_camera,
            lights.shadow_camera(),
        );
        self.uniforms
            .update(&renderer.queue, active, lights.light(), lights.shadow_camera());

        let schedule = FrameSchedule::for_scene(scene.len());
        debug_assert_eq!(schedule.validate(), Ok(()));

        let frame = renderer.acquire_frame()?;
        let backbuffer_view = frame.texture.create_view(&TextureViewDescriptor::default());

        let mut encoder = renderer.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("frame encoder"),
        });

        for pass in &schedule.passes {
            match pass.kind {
                PassKind::Shadow => {
                    self.depth
                        .add_shadow_pass(&mut encoder, shadow_target, &self.shadow_uniform_bg, scene, pass)
                }
                PassKind::Forward => self.forward.add_forward_pass(
                    &mut encoder,
                    &backbuffer_view,
                    renderer.window_depth_view(),
                    &self.forward_uniform_bg,
                    scene,
                    pass,
                ),
            }
        }

        renderer.queue.submit(Some(encoder.finish()));
        frame.present();

        Ok(())
    }
}

/// Which camera's matrices feed the forward pass.
pub fn active_camera<'a>(
    mode: CameraMode,
    free: &'a CameraManager,
    visual: &'a CameraManager,
    shadow: &'a CameraManager,
) -> &'a CameraManager {
    match mode {
        CameraMode::Free => free,
        CameraMode::Visual => visual,
        CameraMode::Shadow => shadow,
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3A;
    use umbra::{
        managers::CameraManager,
        types::{Camera, CameraMode, CameraProjection, CameraView, Handedness},
    };

    use super::active_camera;

    fn camera_at(x: f32) -> CameraManager {
        CameraManager::new(
            Camera {
                projection: CameraProjection::default(),
                view: CameraView::FreeLook {
                    location: Vec3A::new(x, 0.0, 0.0),
                    pitch: 0.0,
                    yaw: 0.0,
                },
            },
            Handedness::Left,
            None,
        )
    }

    #[test]
    fn mode_selects_matching_camera() {
        let free = camera_at(1.0);
        let visual = camera_at(2.0);
        let shadow = camera_at(3.0);

        assert_eq!(active_camera(CameraMode::Free, &free, &visual, &shadow).view(), free.view());
        assert_eq!(
            active_camera(CameraMode::Visual, &free, &visual, &shadow).view(),
            visual.view()
        );
        assert_eq!(
            active_camera(CameraMode::Shadow, &free, &visual, &shadow).view(),
            shadow.view()
        );
    }
}
