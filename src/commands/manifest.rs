//! Manifest export for outside tooling

use eyre::Result;

use crate::protocol::Protocol;

pub fn run(protocol: &Protocol, json: bool) -> Result<()> {
    if json {
        let export = protocol.export_for_openclaw()?;
        println!("{}", serde_json::to_string_pretty(&export)?);
    } else {
        print!("{}", protocol.create_openclaw_manifest()?);
    }
    Ok(())
}
