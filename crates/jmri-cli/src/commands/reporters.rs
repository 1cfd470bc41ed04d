//! Reporter commands - list reporters and show one reporter's state

use anyhow::Result;
use jmri_client::{JmriClient, Reply};

use crate::output::{OutputContext, ReporterRow};

/// List all reporters
pub async fn reporters(client: &JmriClient, ctx: &OutputContext) -> Result<()> {
    let reporters = client.list_reporters().await?;

    let rows: Vec<ReporterRow> = reporters.iter().map(ReporterRow::from_value).collect();

    ctx.print(&rows);
    Ok(())
}

/// Show the current state of one reporter
pub async fn reporter(client: &JmriClient, name: &str, ctx: &OutputContext) -> Result<()> {
    let reply = client.get_reporter_state(name).await?;

    if reply.message_type() == Some("error") {
        let message = reply
            .data()
            .and_then(|d| d.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error");
        ctx.error(&format!("JMRI error for reporter {}: {}", name, message));
        return Ok(());
    }

    match reply {
        Reply::Body(value) => ctx.print_value(&value),
        Reply::Empty => ctx.info(&format!("No data for reporter {}", name)),
    }
    Ok(())
}
