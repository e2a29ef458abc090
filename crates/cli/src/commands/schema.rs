use anyhow::Result;
use assetpipe_core::configs::BuildConfig;

pub fn execute() -> Result<()> {
    let schema = BuildConfig::json_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
