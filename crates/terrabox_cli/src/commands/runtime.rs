//! Runtime command - Report the container runtime in use.

use anyhow::Result;
use clap::Args;
use tracing::info;

use terrabox_runner::ContainerRuntime;

#[derive(Args)]
pub struct RuntimeArgs {
    /// Preferred container runtime (docker or podman)
    #[arg(long, env = "TERRABOX_RUNTIME")]
    runtime: Option<ContainerRuntime>,
}

pub async fn execute(args: RuntimeArgs) -> Result<()> {
    let runtime = ContainerRuntime::detect(args.runtime)?;
    info!("Detected container runtime: {}", runtime);
    println!("{}", runtime);
    Ok(())
}
