//! Request boundary and session status commands.

use anyhow::Result;
use colored::Colorize;
use flashsess_core::SessionBackend;
use serde::Serialize;

use super::RequestContext;

#[derive(Debug, Serialize)]
struct FlashStatus {
    session_id: String,
    keys: usize,
    flash_new: Vec<String>,
    flash_old: Vec<String>,
}

pub fn next_request(ctx: &RequestContext) -> Result<()> {
    let mut session = ctx.open()?;
    let transition = session.on_request_start();
    ctx.save(session)?;

    println!("{}", format!("Session: {}", ctx.session_id).cyan().bold());
    println!("{}", "─".repeat(50));
    if transition.is_empty() {
        println!("  {}", "No flash data changed".dimmed());
    }
    for key in &transition.expired {
        println!("  {} {}", "expired".red(), key);
    }
    for key in &transition.carried {
        println!("  {} {}", "readable".green(), key);
    }
    Ok(())
}

pub fn status(ctx: &RequestContext, json: bool) -> Result<()> {
    let session = ctx.open()?;
    let status = FlashStatus {
        session_id: ctx.session_id.clone(),
        keys: session.all().len(),
        flash_new: session.flash_new_keys(),
        flash_old: session.flash_old_keys(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", format!("Session: {}", status.session_id).cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  Top-level keys: {}", status.keys);
    println!("  Flashed this request: {}", list_or_none(&status.flash_new));
    println!("  Expiring after this request: {}", list_or_none(&status.flash_old));
    println!(
        "  Sessions in {}: {}",
        ctx.backend.dir().display(),
        ctx.backend.list()?.len()
    );
    Ok(())
}

pub fn destroy(ctx: &RequestContext) -> Result<()> {
    if ctx.backend.destroy(&ctx.session_id)? {
        println!("{} {}", "Destroyed".green(), ctx.session_id);
    } else {
        println!("{} {}", "No such session".yellow(), ctx.session_id);
    }
    Ok(())
}

fn list_or_none(keys: &[String]) -> String {
    if keys.is_empty() {
        "(none)".to_string()
    } else {
        keys.join(", ")
    }
}
