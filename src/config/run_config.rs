use crate::chart::RansacConfig;
use crate::engine::WalkForwardConfig;
use crate::strategy::momentum::MomentumModel;
use crate::strategy::rsi_reversion::RsiReversionModel;
use crate::strategy::sma_reversion::SmaReversionModel;
use crate::strategy::Model;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

//model type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Momentum,
    SmaReversion,
    RsiReversion,
}

impl ModelType {
    //parse model type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "momentum" | "mom" => Some(ModelType::Momentum),
            "sma" | "sma_reversion" => Some(ModelType::SmaReversion),
            "rsi" | "rsi_reversion" => Some(ModelType::RsiReversion),
            _ => None,
        }
    }
}

//model parameters shared by the built-in models
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    pub lookback: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            lookback: 10,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

//swing and trendline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendlineConfig {
    pub swing_window: usize,
    pub ransac: RansacConfig,
}

impl Default for TrendlineConfig {
    fn default() -> Self {
        TrendlineConfig {
            swing_window: 5,
            ransac: RansacConfig::default(),
        }
    }
}

//complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfiguration {
    //data
    pub data_path: Option<PathBuf>,
    pub symbol: Option<String>,

    //model
    pub model: ModelType,
    pub model_params: ModelParams,

    pub walk_forward: WalkForwardConfig,
    pub trendline: TrendlineConfig,

    //optional output paths
    pub output_equity_csv: Option<PathBuf>,
    pub output_json: Option<PathBuf>,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        RunConfiguration {
            data_path: None,
            symbol: None,
            model: ModelType::Momentum,
            model_params: ModelParams::default(),
            walk_forward: WalkForwardConfig::default(),
            trendline: TrendlineConfig::default(),
            output_equity_csv: None,
            output_json: None,
        }
    }
}

impl RunConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file {:?}", path))?;
        let config: RunConfiguration = serde_json::from_str(&contents)
            .context(format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    //builds the configured model
    pub fn build_model(&self) -> Box<dyn Model> {
        let params = &self.model_params;
        match self.model {
            ModelType::Momentum => Box::new(MomentumModel::new(params.lookback)),
            ModelType::SmaReversion => Box::new(SmaReversionModel::new(params.lookback)),
            ModelType::RsiReversion => Box::new(RsiReversionModel::new(
                params.lookback,
                params.oversold,
                params.overbought,
            )),
        }
    }
}
