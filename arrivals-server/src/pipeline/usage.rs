//! Historical ridership for busy Vitrasa stops.

use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use crate::domain::Feed;
use crate::feeds::normalize_stop_code;
use crate::ridership::{RidershipWhitelist, UsageSource};

use super::context::ArrivalsContext;
use super::stage::{Stage, StageError, StageStatus};

pub struct UsageStage {
    whitelist: Arc<RidershipWhitelist>,
    source: Arc<dyn UsageSource>,
}

impl UsageStage {
    pub fn new(whitelist: Arc<RidershipWhitelist>, source: Arc<dyn UsageSource>) -> Self {
        Self { whitelist, source }
    }
}

impl Stage for UsageStage {
    fn name(&self) -> &'static str {
        "ridership"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut ArrivalsContext,
    ) -> BoxFuture<'a, Result<StageStatus, StageError>> {
        Box::pin(async move {
            if ctx.feed() != Feed::Vitrasa {
                return Ok(StageStatus::Skipped("not a vitrasa stop"));
            }
            let code = normalize_stop_code(Feed::Vitrasa, &ctx.stop_code);
            if !self.whitelist.contains(&code) {
                return Ok(StageStatus::Skipped("stop not whitelisted"));
            }

            let usage = self.source.usage(&code).await?;
            debug!(stop_code = %code, points = usage.len(), "attached ridership");
            ctx.set_usage(usage);
            Ok(StageStatus::Applied)
        })
    }
}
