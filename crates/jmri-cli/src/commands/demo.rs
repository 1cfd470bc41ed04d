//! Demo command - list reporters, read MR001, run address 138 forward at half speed

use anyhow::Result;
use jmri_client::JmriClient;

use crate::output::OutputContext;

const DEMO_REPORTER: &str = "MR001";
const DEMO_ADDRESS: u32 = 138;
const DEMO_SPEED: f64 = 0.5;

/// Run the demo sequence against a live layout
pub async fn demo(client: &JmriClient, ctx: &OutputContext) -> Result<()> {
    ctx.info("Reporters:");
    super::reporters(client, ctx).await?;

    ctx.info(&format!("Reporter {}:", DEMO_REPORTER));
    super::reporter(client, DEMO_REPORTER, ctx).await?;

    super::run_train(client, DEMO_ADDRESS, DEMO_SPEED, "forward", ctx).await
}
