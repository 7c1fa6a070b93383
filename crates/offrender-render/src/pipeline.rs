use offrender_core::{OffrenderResult, RenderConfig, ResolveMode, SceneDescription};

use crate::backend::GlBackend;
use crate::context::RenderContext;
use crate::gpu;
use crate::renderer::Renderer;
use crate::resolver::{BulkLoader, EntryPointResolver, ExplicitList};
use crate::scene::SceneBuilder;

/// End-to-end offscreen render: context, entry points, device state, scene
/// and one frame.
#[derive(Debug, Clone, Default)]
pub struct OffscreenPipeline {
    config: RenderConfig,
}

impl OffscreenPipeline {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The resolver selected by the configured [`ResolveMode`].
    pub fn resolver(&self) -> Box<dyn EntryPointResolver> {
        match self.config.resolve_mode {
            ResolveMode::Loader => Box::new(BulkLoader::glow()),
            ResolveMode::Explicit => Box::new(ExplicitList),
        }
    }

    /// Render `scene` once. The returned context still owns the finished
    /// pixel buffer; dropping it releases everything.
    pub fn run(
        &self,
        backend: Box<dyn GlBackend>,
        scene: &SceneDescription,
    ) -> OffrenderResult<RenderContext> {
        scene.validate()?;
        let mut ctx = RenderContext::create(
            backend,
            self.config.width,
            self.config.height,
            &self.config.attributes,
        )?;

        ctx.load_entry_points(self.resolver().as_ref())?;
        gpu::prepare(&mut ctx)?;

        let shapes = SceneBuilder::new(&ctx)?.build_scene(scene)?;
        Renderer::for_scene(scene).render(&mut ctx, &shapes)?;

        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeBackend;
    use offrender_core::{OffrenderError, ShapeDescription};

    #[test]
    fn test_invalid_scene_rejected_before_context() {
        let backend = FakeBackend::new();
        let calls = backend.calls();
        let scene = SceneDescription::reference().with_shape(ShapeDescription {
            vertices: vec![[0.0; 3]; 2],
            offsets: vec![0.0; 2],
            fragment_shader: String::new(),
        });

        let err = OffscreenPipeline::default()
            .run(Box::new(backend), &scene)
            .unwrap_err();
        assert!(matches!(err, OffrenderError::InvalidArgument(_)));
        assert_eq!(calls.borrow().created, 0);
    }

    #[test]
    fn test_context_failure_stops_pipeline() {
        let err = OffscreenPipeline::default()
            .run(Box::new(FakeBackend::new().failing_create()), &SceneDescription::reference())
            .unwrap_err();
        assert!(matches!(err, OffrenderError::ContextCreation(_)));
    }

    #[test]
    fn test_missing_entry_point_stops_pipeline_and_cleans_up() {
        let backend = FakeBackend::new().without_symbol("glClear");
        let calls = backend.calls();
        let pipeline =
            OffscreenPipeline::new(RenderConfig::new(8, 8).with_resolve_mode(ResolveMode::Explicit));

        match pipeline.run(Box::new(backend), &SceneDescription::reference()) {
            Err(OffrenderError::UnresolvedSymbol(name)) => assert_eq!(name, "glClear"),
            other => panic!("expected UnresolvedSymbol, got {:?}", other),
        }
        let calls = calls.borrow();
        assert_eq!(calls.released, 1);
        assert_eq!(calls.destroyed, 1);
    }
}
