use async_trait::async_trait;

use super::{BotInfo, Command, CommandResult};

pub struct StatusCommand;

#[async_trait]
impl Command for StatusCommand {
    fn name(&self) -> &str {
        "/status"
    }

    fn description(&self) -> &str {
        "show the agent endpoint and polling settings"
    }

    async fn execute(&self, info: &BotInfo<'_>) -> CommandResult {
        let max_wait = match info.max_wait {
            Some(d) => format!("{:.1}s", d.as_secs_f64()),
            None => "unbounded".to_string(),
        };
        CommandResult::Reply(format!(
            "agent     {}\npoll      every {:.1}s\nmax wait  {}",
            info.agent_url,
            info.poll_interval.as_secs_f64(),
            max_wait
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_info;
    use std::time::Duration;

    #[tokio::test]
    async fn reports_endpoint_and_interval() {
        match StatusCommand.execute(&test_info()).await {
            CommandResult::Reply(text) => {
                assert!(text.contains("http://localhost:7000"));
                assert!(text.contains("every 1.5s"));
                assert!(text.contains("unbounded"));
            }
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reports_max_wait_when_set() {
        let info = BotInfo {
            max_wait: Some(Duration::from_secs(120)),
            ..test_info()
        };
        match StatusCommand.execute(&info).await {
            CommandResult::Reply(text) => assert!(text.contains("120.0s")),
            other => panic!("expected Reply, got {other:?}"),
        }
    }
}
