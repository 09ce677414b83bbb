//! Dotted-path store commands.

use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

use super::{RequestContext, parse_value, render_value};

pub fn get(ctx: &RequestContext, path: &str, default: Option<&str>) -> Result<()> {
    let session = ctx.open()?;
    match (session.get(path), default) {
        (Some(value), _) => println!("{}", render_value(value)),
        (None, Some(default)) => println!("{}", render_value(&parse_value(default))),
        (None, None) => println!("{}", "(absent)".dimmed()),
    }
    Ok(())
}

pub fn set(ctx: &RequestContext, path: &str, raw: &str) -> Result<()> {
    let mut session = ctx.open()?;
    session.set(path, parse_value(raw))?;
    ctx.save(session)?;
    println!("{} {}", "Set".green(), path);
    Ok(())
}

pub fn has(ctx: &RequestContext, path: &str) -> Result<()> {
    let session = ctx.open()?;
    println!("{}", session.has(path));
    Ok(())
}

pub fn pull(ctx: &RequestContext, path: &str) -> Result<()> {
    let mut session = ctx.open()?;
    match session.pull(path) {
        Some(value) => {
            ctx.save(session)?;
            println!("{}", render_value(&value));
        }
        None => println!("{}", "(absent)".dimmed()),
    }
    Ok(())
}

pub fn push(ctx: &RequestContext, path: &str, raw: &str) -> Result<()> {
    let mut session = ctx.open()?;
    session.push(path, parse_value(raw))?;
    let len = session
        .get(path)
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);
    ctx.save(session)?;
    println!("{} {} ({} items)", "Pushed onto".green(), path, len);
    Ok(())
}

pub fn forget(ctx: &RequestContext, path: &str) -> Result<()> {
    let mut session = ctx.open()?;
    if session.forget(path) {
        ctx.save(session)?;
        println!("{} {}", "Forgot".green(), path);
    } else {
        println!("{} {}", "Nothing at".yellow(), path);
    }
    Ok(())
}

pub fn all(ctx: &RequestContext) -> Result<()> {
    let session = ctx.open()?;
    println!("{}", serde_json::to_string_pretty(session.all())?);
    Ok(())
}

pub fn clear(ctx: &RequestContext) -> Result<()> {
    let mut session = ctx.open()?;
    let count = session.all().len();
    session.clear();
    ctx.save(session)?;
    println!("{} {} keys", "Cleared".green(), count);
    Ok(())
}
