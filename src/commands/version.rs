use anyhow::Result;

use super::Context;
use crate::core::version::version_string;

pub fn execute(ctx: &Context) -> Result<()> {
    println!("cycler {}", version_string(ctx.runner.as_ref()));
    Ok(())
}
