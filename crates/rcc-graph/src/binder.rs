//! Frame-to-node resolution.
//!
//! Translates "the image under this timeline frame" into the source and
//! its ColorCorrector pipeline node. The node is created on demand by
//! prepending it to the source's color pipeline.

use tracing::debug;

use crate::host::{FrameContext, NodeId, SourceId};
use crate::keys::CORRECTOR_KIND;

/// Outcome of a resolve: both, source only, or neither.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    /// The unique source under the frame, when there is one.
    pub source: Option<SourceId>,
    /// The unique ColorCorrector node, when resolvable.
    pub node: Option<NodeId>,
}

impl Resolution {
    /// Both source and node resolved.
    pub fn complete(&self) -> Option<(&str, &str)> {
        match (&self.source, &self.node) {
            (Some(s), Some(n)) => Some((s.as_str(), n.as_str())),
            _ => None,
        }
    }
}

/// Locates (or creates) the ColorCorrector node for the source under a
/// timeline frame.
#[derive(Debug, Default)]
pub struct NodeGraphBinder;

impl NodeGraphBinder {
    /// Resolves `(source, node)` for a frame.
    ///
    /// - Zero or multiple sources under the frame: `(None, None)`.
    /// - No unique ColorCorrector and `create_if_missing` unset, or the
    ///   host refuses creation: `(source, None)`.
    pub fn resolve<C: FrameContext + ?Sized>(
        ctx: &mut C,
        frame: i32,
        create_if_missing: bool,
    ) -> Resolution {
        let sources = ctx.sources_at(frame);
        if sources.len() != 1 {
            debug!(frame, count = sources.len(), "no unique source");
            return Resolution::default();
        }
        let source = sources.into_iter().next().unwrap_or_default();

        let mut nodes = ctx.nodes_in_eval_path(frame, CORRECTOR_KIND);
        if nodes.is_empty() && create_if_missing {
            debug!(frame, source = %source, "creating ColorCorrector node");
            if ctx.prepend_pipeline_node(&source, CORRECTOR_KIND).is_some() {
                nodes = ctx.nodes_in_eval_path(frame, CORRECTOR_KIND);
            }
        }

        let node = if nodes.len() == 1 {
            nodes.into_iter().next()
        } else {
            None
        };

        Resolution {
            source: Some(source),
            node,
        }
    }
}
