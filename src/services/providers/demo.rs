//! Demo provider: a deterministic fixture generator, not a real analyzer.
//!
//! The template is picked from the file name alone so the same name always
//! yields the same result. A fixed delay stands in for network latency.

use super::{RawProviderResponse, VisionAdapter};
use crate::error::AdapterError;
use crate::models::analysis_result::{AnalysisResult, DetectedObject, SceneLabel};
use crate::models::image::ImagePayload;
use crate::models::settings::{Provider, Settings};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

/// Simulated latency of the demo provider
pub const DEMO_DELAY: Duration = Duration::from_secs(2);

/// Which fixture a file name maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoTemplate {
    Cat,
    Dog,
    Car,
    Generic,
}

impl DemoTemplate {
    /// Case-insensitive substring match, checked in cat, dog, car order
    pub fn for_file_name(file_name: &str) -> Self {
        let name = file_name.to_lowercase();
        if name.contains("cat") || name.contains('猫') {
            Self::Cat
        } else if name.contains("dog") || name.contains('狗') {
            Self::Dog
        } else if name.contains("car") || name.contains("汽车") {
            Self::Car
        } else {
            Self::Generic
        }
    }

    pub fn result(&self) -> AnalysisResult {
        match self {
            Self::Cat => fixture(
                "这是一张可爱的猫咪照片。图片中显示了一只毛茸茸的小猫，看起来非常温顺可爱。猫咪的眼神清澈明亮，毛色看起来很健康。",
                &[("猫", 0.95), ("动物", 0.92), ("宠物", 0.88), ("毛发", 0.85)],
                &[("室内", 0.78), ("家庭环境", 0.65), ("宠物照片", 0.90)],
                0.93,
                &["棕色", "白色", "黑色"],
                "温馨可爱",
            ),
            Self::Dog => fixture(
                "图片展示了一只友善的狗狗。这只狗看起来很活泼，姿态自然，可能正在户外活动。它的表情显得很开心和放松。",
                &[("狗", 0.96), ("动物", 0.94), ("宠物", 0.90), ("哺乳动物", 0.87)],
                &[("户外", 0.82), ("公园", 0.70), ("休闲", 0.75)],
                0.94,
                &["金色", "棕色", "白色"],
                "活泼开朗",
            ),
            Self::Car => fixture(
                "这是一张汽车的照片。车辆看起来保养良好，线条流畅。可能是在道路上或停车场拍摄的。",
                &[("汽车", 0.97), ("车辆", 0.95), ("交通工具", 0.90), ("轮胎", 0.85)],
                &[("道路", 0.80), ("交通", 0.85), ("城市", 0.72)],
                0.92,
                &["黑色", "银色", "灰色"],
                "现代都市",
            ),
            Self::Generic => fixture(
                "这是一张清晰的图片，包含了多个有趣的元素。图片的构图很好，光线充足，色彩丰富。整体给人的感觉很好。",
                &[("物体", 0.85), ("图像", 0.92), ("照片", 0.88), ("内容", 0.80)],
                &[("日常", 0.75), ("生活", 0.70), ("记录", 0.80)],
                0.85,
                &["多彩", "自然"],
                "日常生活",
            ),
        }
    }
}

fn fixture(
    description: &str,
    objects: &[(&str, f64)],
    scene: &[(&str, f64)],
    confidence: f64,
    colors: &[&str],
    mood: &str,
) -> AnalysisResult {
    AnalysisResult {
        description: description.to_string(),
        objects: objects
            .iter()
            .map(|(name, c)| DetectedObject::new(*name, *c))
            .collect(),
        text: None,
        scene: scene
            .iter()
            .map(|(label, c)| SceneLabel::new(*label, *c))
            .collect(),
        confidence,
        colors: Some(colors.iter().map(|c| c.to_string()).collect()),
        mood: Some(mood.to_string()),
    }
}

/// Demo adapter (no network)
#[derive(Debug, Clone)]
pub struct DemoAdapter {
    delay: Duration,
}

impl DemoAdapter {
    pub fn new() -> Self {
        Self { delay: DEMO_DELAY }
    }

    /// Override the simulated latency (tests use `Duration::ZERO`)
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for DemoAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionAdapter for DemoAdapter {
    fn provider(&self) -> Provider {
        Provider::Demo
    }

    async fn analyze(
        &self,
        payload: &ImagePayload,
        _settings: &Settings,
    ) -> Result<RawProviderResponse, AdapterError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let template = DemoTemplate::for_file_name(payload.file_name());
        tracing::debug!(file = payload.file_name(), ?template, "demo fixture selected");

        Ok(RawProviderResponse::Demo(template.result()))
    }
}
