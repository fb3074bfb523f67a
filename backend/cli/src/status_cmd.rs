//! CLI Status Command
//!
//! Queries `/api/health` on a running gateway.

use anyhow::Result;

use crate::terminal_output;

pub async fn run(port: u16) -> Result<()> {
    let client = reqwest::Client::new();
    match client
        .get(format!("http://localhost:{port}/api/health"))
        .send()
        .await
    {
        Ok(resp) => {
            let body: serde_json::Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(_) => {
            terminal_output::note_warn(&format!("Folio is not running on port {port}"));
        }
    }
    Ok(())
}
