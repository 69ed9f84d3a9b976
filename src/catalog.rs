//! The static catalog of candidate models.
//!
//! Descriptions are free text consumed only by the meta-model as selection
//! context; nothing in this crate parses them.

use serde::{Deserialize, Serialize};

/// A catalog entry: a model the meta-model may pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Identifier understood by the upstream provider (e.g. "openai/gpt-4o").
    pub name: String,
    /// Capability/pricing/latency summary shown to the meta-model.
    pub description: String,
}

/// Ordered, read-only list of candidate models, fixed at process start.
#[derive(Debug, Clone)]
pub struct Catalog {
    models: Vec<ModelDescriptor>,
}

impl Catalog {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Serialize the catalog for the meta-model prompt, one entry per line.
    pub fn render(&self) -> String {
        self.models
            .iter()
            .map(|m| format!("- {}: {}", m.name, m.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Catalog {
    /// The built-in OpenRouter catalog.
    fn default() -> Self {
        let entry = |name: &str, description: &str| ModelDescriptor {
            name: name.to_string(),
            description: description.to_string(),
        };

        Self::new(vec![
            entry(
                "openai/gpt-4o",
                "Most advanced multimodal model with vision capabilities. Context: 128,000 tokens. \
                 Pricing: $0.000005 prompt, $0.000015 completion. TTFT: 0.56s. Throughput: 109 tokens/s. \
                 Tier: Premium. Capabilities: reasoning, vision, coding.",
            ),
            entry(
                "openai/gpt-4o-mini",
                "Faster, more affordable version of GPT-4o. Context: 128,000 tokens. \
                 Pricing: $0.00000015 prompt, $0.0000006 completion. TTFT: 0.35s. Throughput: 120 tokens/s. \
                 Tier: High. Capabilities: reasoning, vision, coding.",
            ),
            entry(
                "openai/gpt-4-turbo",
                "Enhanced GPT-4 with improved performance. Context: 128,000 tokens. \
                 Pricing: $0.00001 prompt, $0.00003 completion. TTFT: 0.85s. Throughput: 20 tokens/s. \
                 Tier: Premium. Capabilities: reasoning, vision, coding.",
            ),
            entry(
                "openai/gpt-4",
                "Most capable GPT model for complex reasoning. Context: 8,192 tokens. \
                 Pricing: $0.00003 prompt, $0.00006 completion. TTFT: 1.2s. Throughput: 15 tokens/s. \
                 Tier: Premium. Capabilities: reasoning, coding.",
            ),
            entry(
                "openai/gpt-3.5-turbo",
                "Fast and cost-effective for most tasks. Context: 16,385 tokens. \
                 Pricing: $0.0000005 prompt, $0.0000015 completion. TTFT: 0.25s. Throughput: 85 tokens/s. \
                 Tier: Medium. Capabilities: general, coding.",
            ),
            entry(
                "openai/gpt-3.5-turbo-instruct",
                "Instruction-following variant of GPT-3.5. Context: 4,096 tokens. \
                 Pricing: $0.0000015 prompt, $0.000002 completion. TTFT: 0.30s. Throughput: 80 tokens/s. \
                 Tier: Medium. Capabilities: instructions, general.",
            ),
            entry(
                "anthropic/claude-3.5-sonnet",
                "Most intelligent Claude model with enhanced reasoning. Context: 200,000 tokens. \
                 Pricing: $0.000003 prompt, $0.000015 completion. TTFT: 1.23s. Throughput: 28 tokens/s. \
                 Tier: Premium. Capabilities: reasoning, analysis, coding, vision.",
            ),
            entry(
                "anthropic/claude-3-opus",
                "Most powerful Claude model for complex tasks. Context: 200,000 tokens. \
                 Pricing: $0.000015 prompt, $0.000075 completion. TTFT: 2.1s. Throughput: 23 tokens/s. \
                 Tier: Premium. Capabilities: reasoning, analysis, coding, vision.",
            ),
            entry(
                "anthropic/claude-3-sonnet",
                "Balanced performance and speed. Context: 200,000 tokens. \
                 Pricing: $0.000003 prompt, $0.000015 completion. TTFT: 1.8s. Throughput: 35 tokens/s. \
                 Tier: High. Capabilities: reasoning, analysis, coding, vision.",
            ),
            entry(
                "anthropic/claude-3-haiku",
                "Fastest Claude model for quick responses. Context: 200,000 tokens. \
                 Pricing: $0.00000025 prompt, $0.00000125 completion. TTFT: 0.8s. Throughput: 65 tokens/s. \
                 Tier: Medium. Capabilities: general, coding, vision.",
            ),
            entry(
                "openai/gpt-oss-20b:free",
                "Open weight 20B parameter model with MoE architecture. Context: 131,072 tokens. \
                 Pricing: Free. TTFT: 0.40s. Throughput: 45 tokens/s. \
                 Tier: Standard. Capabilities: general, coding.",
            ),
        ])
    }
}
