/// System load regimes driving the screensaver's look and feel

use super::surface::Rgb;

/// Discrete visual mode derived from averaged CPU and memory load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    Idle,
    Normal,
    Busy,
    Intense,
}

impl Regime {
    /// Classify from raw CPU and memory percentages.
    ///
    /// Pure function of `(cpu + mem) / 2`; inputs are not validated beyond
    /// the NaN guard in [`Regime::from_load`].
    pub fn classify(avg_cpu_percent: f64, memory_used_percent: f64) -> Self {
        Self::from_load((avg_cpu_percent + memory_used_percent) / 2.0)
    }

    /// Classify an already-averaged load value
    pub fn from_load(load: f64) -> Self {
        let load = if load.is_nan() { 0.0 } else { load };

        if load < 30.0 {
            Regime::Idle
        } else if load < 50.0 {
            Regime::Normal
        } else if load < 70.0 {
            Regime::Busy
        } else {
            Regime::Intense
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Regime::Idle => "idle",
            Regime::Normal => "normal",
            Regime::Busy => "busy",
            Regime::Intense => "intense",
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            Regime::Idle => Rgb(0x00, 0xFF, 0x88),
            Regime::Normal => Rgb(0x00, 0xD9, 0xFF),
            Regime::Busy => Rgb(0xFF, 0xD7, 0x00),
            Regime::Intense => Rgb(0xFF, 0x00, 0xFF),
        }
    }

    pub fn speed_multiplier(&self) -> f64 {
        match self {
            Regime::Idle => 0.5,
            Regime::Normal => 1.0,
            Regime::Busy => 2.0,
            Regime::Intense => 3.0,
        }
    }

    pub fn target_count(&self) -> usize {
        match self {
            Regime::Idle => 30,
            Regime::Normal => 50,
            Regime::Busy => 80,
            Regime::Intense => 120,
        }
    }

    /// Per-component velocity limit for particles in this regime
    pub fn max_velocity(&self) -> f64 {
        self.speed_multiplier() * 2.0
    }

    pub fn all() -> &'static [Regime] {
        &[Regime::Idle, Regime::Normal, Regime::Busy, Regime::Intense]
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
