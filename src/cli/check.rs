use anyhow::{Context, Result};
use clap::Args;
use perceiver_extract::judge;
use serde_json::json;

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    /// Candidate text
    #[arg(short, long)]
    pub text: String,

    /// Candidate link
    #[arg(short, long)]
    pub url: Option<String>,

    /// Print the verdict as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_check(args: CheckArgs) -> Result<()> {
    let verdict = judge(&args.text, args.url.as_deref());
    if args.json {
        let payload = json!({
            "text": args.text,
            "url": args.url,
            "valid": verdict.is_ok(),
            "reason": verdict.as_ref().err().map(ToString::to_string),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("Failed to encode verdict")?
        );
        return Ok(());
    }
    match verdict {
        Ok(()) => println!("accepted"),
        Err(reason) => println!("rejected: {reason}"),
    }
    Ok(())
}
