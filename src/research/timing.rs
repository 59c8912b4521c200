use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::types::Stage;

/// 时间跟踪作用域，同一阶段多次执行时累计耗时
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: HashMap<Stage, Instant>,
    phase_durations: HashMap<Stage, (u32, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: HashMap::new(),
            phase_durations: HashMap::new(),
        }
    }

    /// 开始一个阶段的计时
    pub fn start_phase(&mut self, stage: Stage) {
        self.phase_start_times.insert(stage, Instant::now());
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, stage: Stage) -> Option<Duration> {
        let duration = self.phase_start_times.remove(&stage)?.elapsed();
        let entry = self
            .phase_durations
            .entry(stage)
            .or_insert((0, Duration::ZERO));
        entry.0 += 1;
        entry.1 += duration;
        Some(duration)
    }

    /// 阶段执行次数
    pub fn phase_calls(&self, stage: Stage) -> u32 {
        self.phase_durations
            .get(&stage)
            .map(|(calls, _)| *calls)
            .unwrap_or(0)
    }

    pub fn total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.total_duration().as_secs_f64()
        );

        let order = [
            Stage::GenerateQuery,
            Stage::WebResearch,
            Stage::Summarize,
            Stage::Reflect,
            Stage::Finalize,
        ];
        for stage in order {
            if let Some((calls, duration)) = self.phase_durations.get(&stage) {
                report.push_str(&format!(
                    "- {} x{}: {:.3}秒\n",
                    stage,
                    calls,
                    duration.as_secs_f64()
                ));
            }
        }

        report
    }
}
