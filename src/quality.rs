//! Device capability → quality tier.
//!
//! The resolver only buckets the device; it knows nothing about what the
//! tier scales. Each renderer owns a [`TierTable`] with its own values and
//! looks the tier up there, so every cost knob moves together.

use serde::{Deserialize, Serialize};

/// Coarse device signal collected once at mount.
///
/// Every field is optional: hosts pass whatever their probe could read.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapabilitySignal {
    /// Benchmark bucket from a GPU detection library (0 = unusable, 3 = fast).
    pub gpu_tier: Option<u8>,
    /// `navigator.deviceMemory` in GiB.
    pub device_memory_gb: Option<f64>,
    pub hardware_concurrency: Option<u32>,
    pub pixel_ratio: Option<f64>,
    pub is_mobile: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    #[default]
    Low,
    Medium,
    High,
}

impl QualityTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Per-consumer lookup table keyed by tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierTable<T> {
    pub low: T,
    pub medium: T,
    pub high: T,
}

impl<T: Copy> TierTable<T> {
    #[must_use]
    pub const fn new(low: T, medium: T, high: T) -> Self {
        Self { low, medium, high }
    }

    #[must_use]
    pub const fn get(&self, tier: QualityTier) -> T {
        match tier {
            QualityTier::Low => self.low,
            QualityTier::Medium => self.medium,
            QualityTier::High => self.high,
        }
    }
}

impl TierTable<f64> {
    /// Scales `base` by the tier's factor, rounding to the nearest count.
    #[must_use]
    pub fn scale_count(&self, tier: QualityTier, base: usize) -> usize {
        let factor = self.get(tier);
        if !factor.is_finite() || factor <= 0.0 {
            return 0;
        }
        (base as f64 * factor).round() as usize
    }
}

/// Maps a capability signal to a tier. A missing signal (probe failure)
/// resolves to [`QualityTier::Low`].
///
/// A GPU tier, when present, decides the base bucket; otherwise memory and
/// core count do. Mobile devices and very dense displays never get `High`.
#[must_use]
pub fn resolve_quality(signal: Option<&CapabilitySignal>) -> QualityTier {
    let Some(signal) = signal else {
        return QualityTier::Low;
    };

    let memory = signal
        .device_memory_gb
        .filter(|value| value.is_finite() && *value > 0.0);
    let cores = signal.hardware_concurrency.filter(|value| *value > 0);
    let pixel_ratio = signal
        .pixel_ratio
        .filter(|value| value.is_finite() && *value > 0.0);

    let base = match signal.gpu_tier {
        Some(0 | 1) => QualityTier::Low,
        Some(2) => QualityTier::Medium,
        Some(_) => QualityTier::High,
        None => match (memory, cores) {
            (Some(memory), Some(cores)) if memory >= 8.0 && cores >= 8 => QualityTier::High,
            (Some(memory), Some(cores)) if memory >= 4.0 && cores >= 4 => QualityTier::Medium,
            (None, Some(cores)) if cores >= 8 => QualityTier::Medium,
            (Some(memory), None) if memory >= 8.0 => QualityTier::Medium,
            _ => QualityTier::Low,
        },
    };

    let dense_display = pixel_ratio.is_some_and(|ratio| ratio > 2.5);
    if base == QualityTier::High && (signal.is_mobile || dense_display) {
        QualityTier::Medium
    } else {
        base
    }
}

/// Reads what the browser exposes directly. GPU tier and device memory are
/// not reachable through `web-sys` and stay empty unless the host supplies
/// them.
#[cfg(target_arch = "wasm32")]
#[must_use]
pub fn probe_browser() -> Option<CapabilitySignal> {
    let window = web_sys::window()?;
    let navigator = window.navigator();
    let cores = navigator.hardware_concurrency();
    let user_agent = navigator.user_agent().unwrap_or_default();

    Some(CapabilitySignal {
        gpu_tier: None,
        device_memory_gb: None,
        hardware_concurrency: (cores.is_finite() && cores >= 1.0).then_some(cores as u32),
        pixel_ratio: Some(window.device_pixel_ratio()),
        is_mobile: user_agent.contains("Mobi") || user_agent.contains("Android"),
    })
}

#[cfg(not(target_arch = "wasm32"))]
#[must_use]
pub fn probe_browser() -> Option<CapabilitySignal> {
    None
}
