//! Estimator configuration
//!
//! Configurations are plain serde structs so they can be loaded from YAML
//! or assembled from command-line flags. `validate` rejects parameter
//! combinations the sampling schemes cannot honour; after a successful
//! `build_estimator` no operation can fail.

use super::{StreamingEstimator, TriangleEstimator};
use crate::graph::Round;
use crate::policy::{
    AdaptiveRate, AdmissionRate, BernoulliSampling, ClassicReservoir, FixedRate,
    ProbabilityRoundWeight, RoundBatched, TurnoverWeight, UniformWeight, WaitingRoomSampling,
    WaitingRoomWeight,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Smallest usable reservoir; turnover weights divide by `k − 1`
pub const MIN_CAPACITY: usize = 2;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Capacity must be at least 2, got {0}")]
    InvalidCapacity(usize),

    #[error("Sampling probability must be in (0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("Discard rate must be in [0, 1), got {0}")]
    InvalidDiscardRate(f64),

    #[error("Initial adaptive discard rate must be in (0, 1), got {0}")]
    InvalidInitialRate(f64),

    #[error("Uniform weighting needs decaying admission; turnover admission requires per-edge weighting")]
    UniformWithTurnover,

    #[error("Adaptive target z must be in (0, 1), got {0}")]
    InvalidTarget(f64),

    #[error("Round bound must be at least 1")]
    InvalidRoundBound,

    #[error("Waiting room fraction must be in [0, 1), got {0}")]
    InvalidWaitingRoom(f64),

    #[error("Waiting room of {room} leaves {reservoir} reservoir slots; at least 2 are needed")]
    ReservoirTooSmall { room: usize, reservoir: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Weighting used with a fixed discard rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundWeighting {
    /// Per-edge probability and survival since the admission round
    #[default]
    PerEdge,
    /// One shared probability for every sampled edge
    Uniform,
}

fn default_z() -> f64 {
    0.5
}

fn default_round_bound() -> Round {
    5
}

fn default_init_alpha() -> f64 {
    0.1
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SamplingScheme {
    /// Keep each edge independently with a fixed probability
    Bernoulli { probability: f64 },
    /// Classic reservoir sampling
    Reservoir,
    /// Batch eviction at a fixed discard rate
    RoundBatched {
        alpha: f64,
        #[serde(default)]
        admission: AdmissionRate,
        #[serde(default)]
        weighting: RoundWeighting,
    },
    /// Batch eviction with a discard rate driven by triangle discovery
    Adaptive {
        #[serde(default = "default_z")]
        z: f64,
        #[serde(default = "default_round_bound")]
        round_bound: Round,
        #[serde(default = "default_init_alpha")]
        init_alpha: f64,
        #[serde(default)]
        admission: AdmissionRate,
    },
    /// Waiting room of `floor(k·alpha_wr)` edges in front of the reservoir
    WaitingRoom { alpha_wr: f64 },
}

impl Default for SamplingScheme {
    fn default() -> Self {
        SamplingScheme::Adaptive {
            z: default_z(),
            round_bound: default_round_bound(),
            init_alpha: default_init_alpha(),
            admission: AdmissionRate::default(),
        }
    }
}

impl SamplingScheme {
    pub fn name(&self) -> &'static str {
        match self {
            SamplingScheme::Bernoulli { .. } => "bernoulli",
            SamplingScheme::Reservoir => "reservoir",
            SamplingScheme::RoundBatched { .. } => "round_batched",
            SamplingScheme::Adaptive { .. } => "adaptive",
            SamplingScheme::WaitingRoom { .. } => "waiting_room",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Total memory budget in edges
    pub capacity: usize,
    /// RNG seed; `None` draws one from the OS
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub scheme: SamplingScheme,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            capacity: 100_000,
            seed: None,
            scheme: SamplingScheme::default(),
        }
    }
}

fn is_discard_rate(alpha: f64) -> bool {
    (0.0..1.0).contains(&alpha)
}

impl EstimatorConfig {
    pub fn new(capacity: usize, scheme: SamplingScheme) -> Self {
        Self {
            capacity,
            seed: None,
            scheme,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.capacity < MIN_CAPACITY {
            return Err(ConfigError::InvalidCapacity(self.capacity));
        }
        match self.scheme {
            SamplingScheme::Bernoulli { probability } => {
                if !(probability > 0.0 && probability <= 1.0) {
                    return Err(ConfigError::InvalidProbability(probability));
                }
            }
            SamplingScheme::Reservoir => {}
            SamplingScheme::RoundBatched {
                alpha,
                admission,
                weighting,
            } => {
                if !is_discard_rate(alpha) {
                    return Err(ConfigError::InvalidDiscardRate(alpha));
                }
                // a shared k/t is not the presence probability of a batch-evicted edge
                if weighting == RoundWeighting::Uniform && admission == AdmissionRate::Turnover {
                    return Err(ConfigError::UniformWithTurnover);
                }
            }
            SamplingScheme::Adaptive {
                z,
                round_bound,
                init_alpha,
                ..
            } => {
                if !(z > 0.0 && z < 1.0) {
                    return Err(ConfigError::InvalidTarget(z));
                }
                if round_bound == 0 {
                    return Err(ConfigError::InvalidRoundBound);
                }
                if !(init_alpha > 0.0 && init_alpha < 1.0) {
                    return Err(ConfigError::InvalidInitialRate(init_alpha));
                }
            }
            SamplingScheme::WaitingRoom { alpha_wr } => {
                if !is_discard_rate(alpha_wr) {
                    return Err(ConfigError::InvalidWaitingRoom(alpha_wr));
                }
                let room = WaitingRoomSampling::room_size(self.capacity, alpha_wr);
                let reservoir = self.capacity - room;
                if reservoir < MIN_CAPACITY {
                    return Err(ConfigError::ReservoirTooSmall { room, reservoir });
                }
            }
        }
        Ok(())
    }
}

/// Validate `config` and build the matching estimator
pub fn build_estimator(config: &EstimatorConfig) -> ConfigResult<Box<dyn TriangleEstimator>> {
    config.validate()?;
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let k = config.capacity;

    let estimator: Box<dyn TriangleEstimator> = match config.scheme {
        SamplingScheme::Bernoulli { probability } => Box::new(StreamingEstimator::new(
            k,
            BernoulliSampling::new(probability, k),
            UniformWeight,
            rng,
        )),
        SamplingScheme::Reservoir => Box::new(StreamingEstimator::new(
            k,
            ClassicReservoir::new(k),
            TurnoverWeight,
            rng,
        )),
        SamplingScheme::RoundBatched {
            alpha,
            admission,
            weighting,
        } => {
            let policy = RoundBatched::new(k, FixedRate::new(alpha), admission);
            match weighting {
                RoundWeighting::PerEdge => {
                    Box::new(StreamingEstimator::new(k, policy, ProbabilityRoundWeight, rng))
                }
                RoundWeighting::Uniform => {
                    Box::new(StreamingEstimator::new(k, policy, UniformWeight, rng))
                }
            }
        }
        SamplingScheme::Adaptive {
            z,
            round_bound,
            init_alpha,
            admission,
        } => Box::new(StreamingEstimator::new(
            k,
            RoundBatched::new(k, AdaptiveRate::new(z, round_bound, init_alpha), admission),
            ProbabilityRoundWeight,
            rng,
        )),
        SamplingScheme::WaitingRoom { alpha_wr } => {
            let policy = WaitingRoomSampling::new(k, alpha_wr);
            let reservoir = policy.reservoir_capacity();
            Box::new(StreamingEstimator::new(reservoir, policy, WaitingRoomWeight, rng))
        }
    };

    info!(
        "Built {} estimator with a budget of {} edges",
        config.scheme.name(),
        k
    );
    Ok(estimator)
}
