//! OCR engine adapters.
//!
//! Every backend implements [`OcrEngine`]: one page image in, text or an
//! [`EngineFailure`] out. Adapters never panic or return fatal errors, so a
//! broken backend degrades a single page slot instead of the whole request.

pub mod local;
pub mod remote;

use crate::config::OcrConfig;
use crate::error::{EngineFailure, OcrError};
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

pub use local::LocalEngine;
pub use remote::MistralOcrEngine;

/// A text recogniser for a single page image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Human-readable name, used as the block heading in `both` mode.
    fn label(&self) -> &str;

    /// Extract the text of the image at `image`.
    async fn recognize(&self, image: &Path) -> Result<String, EngineFailure>;
}

/// Which engines to run on every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSelection {
    Qari,
    Mistral,
    Both,
}

impl EngineSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineSelection::Qari => "qari",
            EngineSelection::Mistral => "mistral",
            EngineSelection::Both => "both",
        }
    }
}

impl fmt::Display for EngineSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineSelection {
    type Err = OcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qari" => Ok(EngineSelection::Qari),
            "mistral" => Ok(EngineSelection::Mistral),
            "both" => Ok(EngineSelection::Both),
            _ => Err(OcrError::InvalidSelection {
                token: s.to_string(),
            }),
        }
    }
}

/// The two engine slots, in output order.
#[derive(Clone)]
pub struct EngineSet {
    pub qari: Arc<dyn OcrEngine>,
    pub mistral: Arc<dyn OcrEngine>,
}

impl fmt::Debug for EngineSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSet")
            .field("qari", &self.qari.label())
            .field("mistral", &self.mistral.label())
            .finish()
    }
}

impl EngineSet {
    pub fn new(qari: Arc<dyn OcrEngine>, mistral: Arc<dyn OcrEngine>) -> Self {
        Self { qari, mistral }
    }

    /// The production engines described by `config`.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        Ok(Self {
            qari: Arc::new(LocalEngine::new(config.local_text.clone())),
            mistral: Arc::new(MistralOcrEngine::new(&config.mistral)?),
        })
    }

    /// Engines to run for `selection`, in slot order.
    pub fn selected(&self, selection: EngineSelection) -> Vec<Arc<dyn OcrEngine>> {
        match selection {
            EngineSelection::Qari => vec![Arc::clone(&self.qari)],
            EngineSelection::Mistral => vec![Arc::clone(&self.mistral)],
            EngineSelection::Both => vec![Arc::clone(&self.qari), Arc::clone(&self.mistral)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_selection_tokens() {
        assert_eq!("qari".parse::<EngineSelection>().unwrap(), EngineSelection::Qari);
        assert_eq!(" Mistral ".parse::<EngineSelection>().unwrap(), EngineSelection::Mistral);
        assert_eq!("BOTH".parse::<EngineSelection>().unwrap(), EngineSelection::Both);
    }

    #[test]
    fn reject_unknown_tokens() {
        for token in ["", "tesseract", "qari,mistral", "mistral-ocr"] {
            let err = token.parse::<EngineSelection>().unwrap_err();
            assert!(matches!(err, OcrError::InvalidSelection { .. }), "{token}");
        }
    }

    #[test]
    fn selection_round_trips_through_display() {
        for sel in [EngineSelection::Qari, EngineSelection::Mistral, EngineSelection::Both] {
            assert_eq!(sel.to_string().parse::<EngineSelection>().unwrap(), sel);
        }
    }

    #[test]
    fn default_engines_keep_slot_order() {
        let set = EngineSet::from_config(&OcrConfig::default()).unwrap();
        let labels: Vec<String> = set
            .selected(EngineSelection::Both)
            .iter()
            .map(|e| e.label().to_string())
            .collect();
        assert_eq!(labels, vec!["Qari OCR", "Mistral OCR"]);
        assert_eq!(set.selected(EngineSelection::Mistral).len(), 1);
    }
}
