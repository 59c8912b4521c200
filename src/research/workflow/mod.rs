use anyhow::{Context, Result};

use crate::config::Config;
use crate::outlet::{DiskOutlet, Outlet, ReportView, StdoutOutlet};
use crate::research::context::ResearchContext;
use crate::research::orchestrator::ResearchOrchestrator;
use crate::types::ResearchOutcome;

/// 启动一次研究：校验配置、执行研究循环、输出报告
pub async fn launch(config: &Config, topic: &str) -> Result<ResearchOutcome> {
    config.validate()?;

    let context = ResearchContext::from_config(config)?;
    let outcome = execute(context, topic).await?;

    let report = ReportView::from_outcome(&outcome);
    StdoutOutlet.save(&report).await?;
    if let Some(output_path) = &config.output_path {
        DiskOutlet::new(output_path.clone()).save(&report).await?;
    }

    Ok(outcome)
}

/// 使用给定的服务句柄执行研究循环
pub async fn execute(context: ResearchContext, topic: &str) -> Result<ResearchOutcome> {
    println!("🧐 正在研究: {}", topic.trim());
    let orchestrator = ResearchOrchestrator::new(context);

    let outcome = orchestrator
        .run_research(topic)
        .await
        .context("Research run failed")?;

    if outcome.used_fallback() {
        eprintln!(
            "⚠️ 有 {} 个阶段的模型输出无法解析，已使用兜底查询",
            outcome.fallbacks.len()
        );
    }
    println!("✓ 研究完成，共执行 {} 次搜索", outcome.loop_count);

    Ok(outcome)
}
