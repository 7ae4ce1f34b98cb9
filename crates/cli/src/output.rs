// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting shared by every command handler (§6: "human table,
//! JSON array, one-JSON-object-per-line stream, or user-template").

use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};

use clap::ValueEnum;
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    /// One JSON object per line — a stream-friendly alternative to `Json`'s
    /// single pretty-printed array.
    Jsonl,
}

/// Format a timestamp as relative time (e.g. "5s", "2m", "1h", "3d").
pub fn format_time_ago(epoch_ms: u64) -> String {
    if epoch_ms == 0 {
        return "-".to_string();
    }
    let now_ms =
        std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64;
    let elapsed_secs = now_ms.saturating_sub(epoch_ms) / 1000;
    fm_core::format_elapsed(elapsed_secs)
}

/// Info about items that were truncated by [`apply_limit`].
pub struct Truncation {
    pub remaining: usize,
}

/// Apply a limit/no_limit pair to a vec, returning truncation info when
/// items were removed.
pub fn apply_limit<T>(items: &mut Vec<T>, limit: usize, no_limit: bool) -> Option<Truncation> {
    let total = items.len();
    let effective = if no_limit { total } else { limit };
    if total > effective {
        items.truncate(effective);
        Some(Truncation { remaining: total - effective })
    } else {
        None
    }
}

/// Render a list as text table, JSON array, or JSONL. Handles the empty
/// check and format branch so command handlers only supply the text
/// renderer.
pub fn handle_list<T: Serialize>(
    format: OutputFormat,
    items: &[T],
    empty_msg: &str,
    render_text: impl FnOnce(&[T], &mut dyn Write),
) -> anyhow::Result<()> {
    handle_list_with_limit(format, items, empty_msg, None, render_text)
}

/// Like [`handle_list`] but prints a truncation message when items were
/// limited, and (text mode only) renders a user-supplied template per row.
pub fn handle_list_with_limit<T: Serialize>(
    format: OutputFormat,
    items: &[T],
    empty_msg: &str,
    truncation: Option<Truncation>,
    render_text: impl FnOnce(&[T], &mut dyn Write),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
        OutputFormat::Jsonl => {
            for item in items {
                println!("{}", serde_json::to_string(item)?);
            }
        }
        OutputFormat::Text => {
            if items.is_empty() {
                println!("{}", empty_msg);
            } else {
                render_text(items, &mut std::io::stdout());
            }
            if let Some(trunc) = truncation {
                if trunc.remaining > 0 {
                    println!("\n... {} more not shown. Use --no-limit or -n N to see more.", trunc.remaining);
                }
            }
        }
    }
    Ok(())
}

/// Format-branch helper for non-list commands (show, status, etc.).
pub fn format_or_json<T: Serialize>(format: OutputFormat, data: &T, text_fn: impl FnOnce()) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Jsonl => println!("{}", serde_json::to_string(data)?),
        OutputFormat::Text => text_fn(),
    }
    Ok(())
}

/// Renders a user-supplied `--template` string against a JSON value, the
/// fourth §6 output form. Substitutes `{field}` with the value at that key
/// (top-level only; missing keys render empty), mirroring the `${var}`
/// placeholder grammar `fm-profile::template` already uses for agent-type
/// argv so the user-facing syntax and the internal one stay consistent.
pub fn render_template(template: &str, value: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '{' {
            if let Some(end) = template[i..].find('}') {
                let key = &template[i + 1..i + end];
                if key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') && !key.is_empty() {
                    let rendered = value.get(key).map(render_scalar).unwrap_or_default();
                    out.push_str(&rendered);
                    for _ in 0..end {
                        chars.next();
                    }
                    continue;
                }
            }
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out
}

fn render_scalar(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Print results from a bulk operation (rename/destroy across a filter set,
/// `gc`'s per-category reclaim list, etc.).
pub fn print_batch_action_results(actioned: &[String], action_past: &str, not_found: &[String]) {
    for id in actioned {
        println!("{} {}", action_past, id);
    }
    for id in not_found {
        eprintln!("not found: {}", id);
    }
    if !not_found.is_empty() {
        std::process::exit(1);
    }
}

/// Display log content with optional follow mode, handling text/json output.
///
/// Returns the byte offset for polling if follow mode is needed but the log
/// file is not locally accessible (a remote-host log). Callers should use
/// [`poll_log_follow`] with a query-specific callback when this returns
/// `Some(offset)`.
pub async fn display_log(
    log_path: &std::path::Path,
    content: &str,
    follow: bool,
    offset: u64,
    format: OutputFormat,
    label: &str,
    id: &str,
) -> anyhow::Result<Option<u64>> {
    match format {
        OutputFormat::Text => {
            if !content.is_empty() {
                print!("{}", content);
                if !content.ends_with('\n') {
                    println!();
                }
            } else {
                eprintln!("No log entries found for {} {}", label, id);
                if !follow {
                    return Ok(None);
                }
            }

            if follow {
                if log_path.exists() {
                    tail_file(log_path).await?;
                } else {
                    return Ok(Some(offset));
                }
            }
        }
        OutputFormat::Json | OutputFormat::Jsonl => {
            let obj = serde_json::json!({
                "log_path": log_path.to_string_lossy(),
                "lines": content.lines().collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&obj)?);
            if follow {
                eprintln!("warning: --follow is not supported with --output json/jsonl");
            }
        }
    }
    Ok(None)
}

/// Poll the daemon for log updates in a loop until Ctrl-C.
pub async fn poll_log_follow<F, Fut>(mut offset: u64, poll_fn: F) -> anyhow::Result<()>
where
    F: Fn(u64) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<(String, u64)>>,
{
    let poll_ms: u64 = std::env::var("FM_LOG_POLL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(1000);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_millis(poll_ms)) => {
                match poll_fn(offset).await {
                    Ok((content, new_offset)) => {
                        if !content.is_empty() {
                            print!("{}", content);
                            let _ = std::io::stdout().flush();
                        }
                        offset = new_offset;
                    }
                    Err(_) => {}
                }
            }
            _ = &mut ctrl_c => break,
        }
    }
    Ok(())
}

/// Tail a file, printing new lines as they appear.
pub async fn tail_file(path: &std::path::Path) -> anyhow::Result<()> {
    let mut file =
        std::fs::File::open(path).map_err(|_| anyhow::anyhow!("Log file not found: {}", path.display()))?;
    file.seek(SeekFrom::End(0))?;
    let mut reader = BufReader::new(file);

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let path_buf = path.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: Result<NotifyEvent, _>| {
        if let Ok(event) = res {
            if matches!(event.kind, EventKind::Modify(_)) {
                let _ = tx.blocking_send(());
            }
        }
    })?;
    let watch_dir = path_buf.parent().unwrap_or(&path_buf);
    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let mut line = String::new();
        while reader.read_line(&mut line)? > 0 {
            print!("{}", line);
            line.clear();
        }

        tokio::select! {
            _ = rx.recv() => {}
            _ = &mut ctrl_c => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_limit_truncates_and_reports_remaining() {
        let mut items = vec![1, 2, 3, 4, 5];
        let trunc = apply_limit(&mut items, 3, false).unwrap();
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(trunc.remaining, 2);
    }

    #[test]
    fn apply_limit_no_limit_keeps_all() {
        let mut items = vec![1, 2, 3];
        assert!(apply_limit(&mut items, 1, true).is_none());
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn render_template_substitutes_known_fields() {
        let value = serde_json::json!({"name": "foo", "status": "running"});
        assert_eq!(render_template("{name} is {status}", &value), "foo is running");
    }

    #[test]
    fn render_template_leaves_unknown_fields_empty() {
        let value = serde_json::json!({"name": "foo"});
        assert_eq!(render_template("{name}:{missing}", &value), "foo:");
    }

    #[test]
    fn format_time_ago_zero_is_dash() {
        assert_eq!(format_time_ago(0), "-");
    }
}
