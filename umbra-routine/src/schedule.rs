//! The frame reified as data.
//!
//! A [`FrameSchedule`] is the full description of one frame's rendering work:
//! which passes run, in which order, and what each one clears, binds, and
//! draws. [`base::BaseRenderRoutine`](crate::base::BaseRenderRoutine) walks
//! the schedule when encoding, so the ordering and hazard rules the renderer
//! depends on can be checked on the schedule itself, with no device in sight.

use thiserror::Error;

/// One logical operation inside a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOp {
    /// Clear the shadow map to the far plane depth.
    ClearShadowDepth,
    /// Clear the backbuffer color and the window depth buffer.
    ClearBackbuffer,
    /// Bind the shadow map read view and its comparison sampler for sampling.
    BindShadowRead,
    /// Draw scene object `index` into the pass's target.
    Draw { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Depth-only rendering into the shadow map, from the light's camera.
    Shadow,
    /// Lit rendering into the backbuffer, sampling the shadow map.
    Forward,
}

/// The operations of a single pass, in submission order.
#[derive(Debug, Clone)]
pub struct PassPlan {
    pub kind: PassKind,
    pub ops: Vec<RenderOp>,
}

/// The two passes of one frame, in submission order.
#[derive(Debug, Clone)]
pub struct FrameSchedule {
    pub passes: Vec<PassPlan>,
}

impl FrameSchedule {
    /// Builds the schedule for a scene of `object_count` objects: the shadow
    /// pass draws every object into the cleared shadow map, then the forward
    /// pass draws the same list again against the cleared backbuffer.
    pub fn for_scene(object_count: usize) -> Self {
        let draws = (0..object_count).map(|index| RenderOp::Draw { index });

        let shadow = PassPlan {
            kind: PassKind::Shadow,
            ops: std::iter::once(RenderOp::ClearShadowDepth).chain(draws.clone()).collect(),
        };
        let forward = PassPlan {
            kind: PassKind::Forward,
            ops: [RenderOp::ClearBackbuffer, RenderOp::BindShadowRead]
                .into_iter()
                .chain(draws)
                .collect(),
        };

        Self {
            passes: vec![shadow, forward],
        }
    }

    /// Checks the structural rules the two-pass algorithm depends on.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let kinds: Vec<_> = self.passes.iter().map(|pass| pass.kind).collect();
        if kinds != [PassKind::Shadow, PassKind::Forward] {
            return Err(ScheduleError::WrongPassSequence);
        }

        for pass in &self.passes {
            match pass.kind {
                PassKind::Shadow => {
                    // The shadow map is this pass's output; sampling it here
                    // would alias the same texels for read and write.
                    if pass.ops.contains(&RenderOp::BindShadowRead) {
                        return Err(ScheduleError::ShadowReadDuringShadowPass);
                    }
                    if pass.ops.contains(&RenderOp::ClearBackbuffer) {
                        return Err(ScheduleError::MisplacedClear);
                    }
                }
                PassKind::Forward => {
                    if pass.ops.contains(&RenderOp::ClearShadowDepth) {
                        return Err(ScheduleError::MisplacedClear);
                    }
                    let bind = pass.ops.iter().position(|op| *op == RenderOp::BindShadowRead);
                    let first_draw = pass.ops.iter().position(|op| matches!(op, RenderOp::Draw { .. }));
                    if let Some(draw) = first_draw {
                        match bind {
                            Some(bind) if bind < draw => {}
                            _ => return Err(ScheduleError::DrawBeforeShadowBind),
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// All operations of the frame, flattened into submission order.
    pub fn flattened(&self) -> impl Iterator<Item = (PassKind, RenderOp)> + '_ {
        self.passes
            .iter()
            .flat_map(|pass| pass.ops.iter().map(move |&op| (pass.kind, op)))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("expected exactly a shadow pass followed by a forward pass")]
    WrongPassSequence,
    #[error("shadow map bound for reading during the shadow pass")]
    ShadowReadDuringShadowPass,
    #[error("a pass clears a target it does not own")]
    MisplacedClear,
    #[error("forward draw issued before the shadow map was bound for reading")]
    DrawBeforeShadowBind,
}

#[cfg(test)]
mod tests {
    use super::{FrameSchedule, PassKind, PassPlan, RenderOp, ScheduleError};

    #[test]
    fn generated_schedule_is_valid() {
        assert_eq!(FrameSchedule::for_scene(171).validate(), Ok(()));
        assert_eq!(FrameSchedule::for_scene(0).validate(), Ok(()));
    }

    #[test]
    fn every_shadow_draw_precedes_the_backbuffer_clear() {
        let schedule = FrameSchedule::for_scene(7);
        let flat: Vec<_> = schedule.flattened().collect();

        let clear = flat
            .iter()
            .position(|(_, op)| *op == RenderOp::ClearBackbuffer)
            .unwrap();
        let last_shadow_draw = flat
            .iter()
            .rposition(|(kind, op)| *kind == PassKind::Shadow && matches!(op, RenderOp::Draw { .. }))
            .unwrap();
        let first_forward_draw = flat
            .iter()
            .position(|(kind, op)| *kind == PassKind::Forward && matches!(op, RenderOp::Draw { .. }))
            .unwrap();

        assert!(last_shadow_draw < clear);
        assert!(clear < first_forward_draw);
    }

    #[test]
    fn both_passes_draw_the_same_objects_in_order() {
        let schedule = FrameSchedule::for_scene(5);
        let draws = |kind| {
            schedule
                .flattened()
                .filter(move |(k, _)| *k == kind)
                .filter_map(|(_, op)| match op {
                    RenderOp::Draw { index } => Some(index),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(draws(PassKind::Shadow), vec![0, 1, 2, 3, 4]);
        assert_eq!(draws(PassKind::Forward), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn shadow_read_during_shadow_pass_rejected() {
        let mut schedule = FrameSchedule::for_scene(1);
        schedule.passes[0].ops.insert(1, RenderOp::BindShadowRead);
        assert_eq!(schedule.validate(), Err(ScheduleError::ShadowReadDuringShadowPass));
    }

    #[test]
    fn forward_draw_without_shadow_bind_rejected() {
        let mut schedule = FrameSchedule::for_scene(1);
        schedule.passes[1].ops.retain(|op| *op != RenderOp::BindShadowRead);
        assert_eq!(schedule.validate(), Err(ScheduleError::DrawBeforeShadowBind));
    }

    #[test]
    fn reversed_passes_rejected() {
        let mut schedule = FrameSchedule::for_scene(1);
        schedule.passes.swap(0, 1);
        assert_eq!(schedule.validate(), Err(ScheduleError::WrongPassSequence));
    }

    #[test]
    fn missing_pass_rejected() {
        let schedule = FrameSchedule {
            passes: vec![PassPlan {
                kind: PassKind::Shadow,
                ops: vec![RenderOp::ClearShadowDepth],
            }],
        };
        assert_eq!(schedule.validate(), Err(ScheduleError::WrongPassSequence));
    }
}
