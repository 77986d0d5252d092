//! Explicit-enable rendering gate.
//!
//! A [`Visualizer`] starts disabled. Until [`enable`](Visualizer::enable) is
//! called every render attempt fails with
//! [`IntrospectError::VisualizationDisabled`] and the renderer is never
//! invoked, so a code path that forgets to opt in cannot leak schema
//! structure.

use std::sync::Arc;

use tracing::debug;

use crate::core::schema::Schema;
use crate::error::{IntrospectError, Result};
use crate::handler::ConnectionHandler;
use crate::render::Renderer;

/// Gate around a schema snapshot and the renderers that may expose it.
#[derive(Debug)]
pub struct Visualizer {
    schema: Arc<Schema>,
    handler: Option<Arc<ConnectionHandler>>,
    enabled: bool,
}

impl Visualizer {
    /// Wrap `schema`. The gate starts disabled.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            handler: None,
            enabled: false,
        }
    }

    /// Bind the handler used to resolve database overrides in
    /// [`render_for`](Self::render_for).
    pub fn with_handler(mut self, handler: Arc<ConnectionHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The held snapshot.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Render the held snapshot.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::VisualizationDisabled`] naming the renderer's
    /// format while the gate is disabled; otherwise whatever the renderer
    /// reports.
    pub fn render(&self, renderer: &dyn Renderer) -> Result<String> {
        self.check_enabled(renderer)?;
        debug!("Rendering '{}' as {}", self.schema.name(), renderer.name());
        renderer.render(&self.schema)
    }

    /// Render `database` instead of the held snapshot.
    ///
    /// `None`, or the held snapshot's own name, renders the held snapshot.
    /// Any other name is introspected through the bound handler without
    /// re-validating the connection.
    ///
    /// # Errors
    ///
    /// - [`IntrospectError::VisualizationDisabled`] while the gate is
    ///   disabled; nothing is fetched
    /// - [`IntrospectError::InvalidConnection`] if an override is requested
    ///   and no handler is bound
    pub async fn render_for(
        &self,
        renderer: &dyn Renderer,
        database: Option<&str>,
    ) -> Result<String> {
        self.check_enabled(renderer)?;

        match database.filter(|d| *d != self.schema.name()) {
            None => self.render(renderer),
            Some(database) => {
                let handler = self.handler.as_ref().ok_or_else(|| {
                    IntrospectError::invalid_connection(format!(
                        "cannot switch to database '{}': no connection handler bound",
                        database
                    ))
                })?;

                let schema = handler.schema(Some(database)).await?;
                debug!("Rendering '{}' as {}", schema.name(), renderer.name());
                renderer.render(&schema)
            }
        }
    }

    fn check_enabled(&self, renderer: &dyn Renderer) -> Result<()> {
        if self.enabled {
            Ok(())
        } else {
            Err(IntrospectError::visualization_disabled(renderer.name()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::Table;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRenderer {
        calls: AtomicUsize,
    }

    impl CountingRenderer {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Renderer for CountingRenderer {
        fn render(&self, schema: &Schema) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{}:{}", schema.name(), schema.table_count()))
        }

        fn name(&self) -> &str {
            "counting"
        }

        fn mime_type(&self) -> &str {
            "text/plain"
        }
    }

    fn snapshot() -> Arc<Schema> {
        Arc::new(Schema::new("shop", "mysql", vec![Table::new("orders")]).unwrap())
    }

    #[test]
    fn test_disabled_by_default() {
        let visualizer = Visualizer::new(snapshot());
        let renderer = CountingRenderer::default();

        assert!(!visualizer.is_enabled());
        let err = visualizer.render(&renderer).unwrap_err();
        assert!(matches!(
            err,
            IntrospectError::VisualizationDisabled { ref format } if format == "counting"
        ));
        assert_eq!(renderer.calls(), 0);
    }

    #[test]
    fn test_enabled_returns_renderer_output() {
        let mut visualizer = Visualizer::new(snapshot());
        let renderer = CountingRenderer::default();

        visualizer.enable();
        visualizer.enable();
        assert_eq!(visualizer.render(&renderer).unwrap(), "shop:1");
        assert_eq!(renderer.calls(), 1);
    }

    #[test]
    fn test_disable_closes_gate_again() {
        let mut visualizer = Visualizer::new(snapshot());
        let renderer = CountingRenderer::default();

        visualizer.enable();
        visualizer.disable();
        assert!(visualizer.render(&renderer).is_err());
        assert_eq!(renderer.calls(), 0);
    }

    #[tokio::test]
    async fn test_render_for_checks_gate_first() {
        let visualizer = Visualizer::new(snapshot());
        let renderer = CountingRenderer::default();

        let err = visualizer
            .render_for(&renderer, Some("analytics"))
            .await
            .unwrap_err();
        assert!(matches!(err, IntrospectError::VisualizationDisabled { .. }));
        assert_eq!(renderer.calls(), 0);
    }

    #[tokio::test]
    async fn test_render_for_same_database_uses_snapshot() {
        let mut visualizer = Visualizer::new(snapshot());
        let renderer = CountingRenderer::default();
        visualizer.enable();

        assert_eq!(visualizer.render_for(&renderer, None).await.unwrap(), "shop:1");
        assert_eq!(
            visualizer.render_for(&renderer, Some("shop")).await.unwrap(),
            "shop:1"
        );
    }

    #[tokio::test]
    async fn test_render_for_override_without_handler() {
        let mut visualizer = Visualizer::new(snapshot());
        let renderer = CountingRenderer::default();
        visualizer.enable();

        let err = visualizer
            .render_for(&renderer, Some("analytics"))
            .await
            .unwrap_err();
        assert!(matches!(err, IntrospectError::InvalidConnection(_)));
        assert_eq!(renderer.calls(), 0);
    }

    #[cfg(feature = "mysql")]
    #[tokio::test]
    async fn test_render_for_override_fetches_through_handler() {
        use crate::core::AdapterResolver;
        use crate::testing::{row, MockConnection};

        let connection = Arc::new(MockConnection::new("mysql").on_params(
            "TABLE_COMMENT",
            &["analytics"],
            vec![
                row(&[("TABLE_NAME", Some("events")), ("TABLE_TYPE", Some("BASE TABLE"))]),
                row(&[("TABLE_NAME", Some("sessions")), ("TABLE_TYPE", Some("BASE TABLE"))]),
            ],
        ));
        let handler = ConnectionHandler::new(
            connection.clone(),
            Some("shop"),
            &AdapterResolver::with_builtins(),
        )
        .await
        .unwrap();

        let mut visualizer = Visualizer::new(snapshot()).with_handler(Arc::new(handler));
        visualizer.enable();

        let renderer = CountingRenderer::default();
        assert_eq!(
            visualizer
                .render_for(&renderer, Some("analytics"))
                .await
                .unwrap(),
            "analytics:2"
        );
        // Held snapshot is untouched
        assert_eq!(visualizer.schema().name(), "shop");
    }
}
