//! Startup banner and session summary display.

use std::time::Duration;

use crate::consts::REPO;

/// What is running, for display in the startup banner.
pub struct BannerInfo<'a> {
    pub mode: &'a str,
    pub agent_url: &'a str,
    pub poll_interval: Duration,
    pub max_wait: Option<Duration>,
    /// Only set in bot mode.
    pub chat_id: Option<i64>,
    pub state: &'a str,
}

pub fn render_banner(info: &BannerInfo) -> String {
    let max_wait = info
        .max_wait
        .map(|d| format!("{:.1}s", d.as_secs_f64()))
        .unwrap_or_else(|| "unbounded".to_string());
    let mut out = format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║            C O U R I E R              ║
   ║   carries your words to the agent     ║
   ╚═══════════════════════════════════════╝

   version   {}
   repo      {}
   mode      {}
   agent     {}
   poll      every {:.1}s (max wait {})
"#,
        env!("CARGO_PKG_VERSION"),
        REPO,
        info.mode,
        info.agent_url,
        info.poll_interval.as_secs_f64(),
        max_wait,
    );
    if let Some(chat_id) = info.chat_id {
        out.push_str(&format!("   chat      {chat_id}\n"));
    }
    out.push_str(&format!("   state     {}\n", info.state));
    out
}

pub fn print_banner(info: &BannerInfo) {
    println!("{}", render_banner(info));
}

/// Outcome counts for one interactive session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionStats {
    pub answered: u64,
    pub failed: u64,
}

pub fn print_session_summary(stats: SessionStats) {
    if stats.answered + stats.failed > 0 {
        println!(
            "session: {} answered, {} failed",
            stats.answered, stats.failed
        );
    }
    println!("goodbye.");
}
