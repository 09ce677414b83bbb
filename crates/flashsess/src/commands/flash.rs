//! Flash data commands.

use anyhow::Result;
use colored::Colorize;

use super::{RequestContext, parse_value};

pub fn flash(ctx: &RequestContext, key: &str, raw: &str, now: bool) -> Result<()> {
    let mut session = ctx.open()?;
    if now {
        session.now(key, parse_value(raw))?;
    } else {
        session.flash(key, parse_value(raw))?;
    }
    ctx.save(session)?;

    let lifetime = if now { "this request" } else { "the next request" };
    println!("{} {} until {}", "Flashed".green(), key, lifetime);
    Ok(())
}

pub fn keep(ctx: &RequestContext, keys: &[String]) -> Result<()> {
    let mut session = ctx.open()?;
    let kept = session.keep(keys)?;
    ctx.save(session)?;

    for key in keys {
        if kept.contains(key) {
            println!("  {} {}", "kept".green(), key);
        } else {
            println!("  {} {} (not old flash data)", "skipped".yellow(), key);
        }
    }
    Ok(())
}

pub fn reflash(ctx: &RequestContext) -> Result<()> {
    let mut session = ctx.open()?;
    let moved = session.reflash();
    ctx.save(session)?;

    if moved.is_empty() {
        println!("{}", "No old flash data to reflash".dimmed());
    } else {
        println!("{} {}", "Reflashed".green(), moved.join(", "));
    }
    Ok(())
}
