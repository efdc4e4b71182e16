//! Chatscope CLI binary entrypoint.

fn main() -> anyhow::Result<()> {
    chatscope_cli::app::run()?;
    Ok(())
}
