use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// クラス id → 表示名 (ラベル CSV の 1 列目)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Labels {
    names: Vec<String>,
}

impl Labels {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read labels {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// 読めなければ空 (id 表示にフォールバック)
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(labels) => labels,
            Err(e) => {
                tracing::warn!("{:#}", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let names = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let first = line.split(',').next().unwrap_or("");
                first.trim().trim_matches('"').to_string()
            })
            .collect();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: usize) -> String {
        match self.names.get(id) {
            Some(name) => name.clone(),
            None => format!("#{}", id),
        }
    }
}
