//! Logging utilities: env_logger bootstrap for embedding hosts and a helper
//! for keeping script-supplied text single-line in log output.

/// Initialize env_logger with a verbosity count (0 = info, 1 = debug,
/// 2+ = trace). `RUST_LOG` still wins when set. Safe to call more than once;
/// later calls are no-ops.
pub fn init_logging(verbosity: u8) {
    let base_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env = env_logger::Env::default().default_filter_or(base_level);
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Escape a script-supplied string for single-line logging. Object and
/// property names come straight from player scripts, so control characters
/// are escaped and long strings truncated with an ellipsis.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 120;
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
