use super::{ConnectorParams, PaintInfo, PathBuilder, Router};

/// Stub, body, stub
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StraightRouter;

impl Router for StraightRouter {
    fn name(&self) -> &str {
        "Straight"
    }

    fn route(&self, info: &PaintInfo, _params: &ConnectorParams, path: &mut PathBuilder) {
        path.straight(info.start(), info.start_stub);
        path.straight(info.start_stub, info.end_stub);
        path.straight(info.end_stub, info.end());
    }
}
