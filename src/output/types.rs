// src/output/types.rs
use std::path::PathBuf;

/// Ordered list of deliveries for one command.
#[derive(Debug, Clone, Default)]
pub struct OutputPlan {
    pub operations: Vec<DeliveryTarget>,
}

impl OutputPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation(mut self, operation: DeliveryTarget) -> Self {
        self.operations.push(operation);
        self
    }

    /// Writes to `path` when given, otherwise prints.
    pub fn file_or_stdout(path: Option<PathBuf>, content: String) -> Self {
        let operation = match path {
            Some(path) => DeliveryTarget::WriteFile { path, content },
            None => DeliveryTarget::PrintToStdout { content },
        };
        Self::new().with_operation(operation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    WriteFile { path: PathBuf, content: String },
    PrintToStdout { content: String },
}

impl DeliveryTarget {
    pub fn content(&self) -> &str {
        match self {
            Self::WriteFile { content, .. } | Self::PrintToStdout { content } => content,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Delivered {
    pub operation: DeliveryTarget,
    pub bytes_written: usize,
}

/// What happened to each planned delivery.
#[derive(Debug, Clone, Default)]
pub struct OutputReport {
    pub completed: Vec<Delivered>,
    /// Failed operations with their error messages
    pub failed: Vec<(DeliveryTarget, String)>,
}

impl OutputReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn bytes_written(&self) -> usize {
        self.completed.iter().map(|d| d.bytes_written).sum()
    }

    /// Error messages of the failed deliveries.
    pub fn failures(&self) -> Vec<String> {
        self.failed.iter().map(|(_, e)| e.clone()).collect()
    }
}
