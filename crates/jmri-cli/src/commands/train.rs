//! Run-train command - bind a throttle and set its speed and direction

use anyhow::Result;
use jmri_client::JmriClient;

use crate::output::{OutputContext, ThrottleRow};

/// Drive a locomotive
pub async fn run_train(
    client: &JmriClient,
    address: u32,
    speed: f64,
    direction: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let run = client.run_train(address, speed, direction).await?;

    ctx.success(&format!(
        "Throttle '{}' running address {}",
        run.throttle.throttle_name, run.throttle.engine_address
    ));
    ctx.print(&[ThrottleRow {
        throttle: run.throttle.throttle_name,
        address: run.throttle.engine_address,
        speed: run.throttle.speed,
        direction: format!("{:?}", run.throttle.direction).to_lowercase(),
    }]);
    Ok(())
}
