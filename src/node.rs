//! The node contract exposed to the host graph: input schema, outputs, and
//! normalization of raw inputs into a generation request.

use serde::Serialize;

use crate::params::{
    clamp_dimension, clamp_steps, DEFAULT_HEIGHT, DEFAULT_MODEL, DEFAULT_PROMPT, DEFAULT_STEPS,
    DEFAULT_WIDTH, DIMENSION_STEP, MAX_DIMENSION, MAX_STEPS, MIN_DIMENSION, MIN_STEPS,
};

/// Class name the node registers under.
pub const NODE_CLASS: &str = "TogetherImageGenerator";

/// Class name of the variant that also takes LoRA adapters.
pub const LORA_NODE_CLASS: &str = "TogetherImageGeneratorLoRA";

/// Slot type of a single node input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum InputSpec {
    /// Text input.
    String {
        /// Default value shown by the host.
        default: String,
        /// Whether the host should render a multi-line editor.
        multiline: bool,
    },
    /// Bounded integer input.
    Int {
        /// Default value.
        default: i64,
        /// Inclusive minimum.
        min: i64,
        /// Inclusive maximum.
        max: i64,
        /// Increment the host snaps to.
        step: i64,
    },
}

/// Everything the host needs to register the node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeDescriptor {
    /// Registered class name.
    pub class_name: &'static str,
    /// Human readable name.
    pub display_name: &'static str,
    /// Menu category.
    pub category: &'static str,
    /// Entry point invoked by the host.
    pub function: &'static str,
    /// Required inputs, in display order.
    pub inputs: Vec<(&'static str, InputSpec)>,
    /// Output slot types.
    pub outputs: Vec<&'static str>,
}

/// Describe the node's inputs and outputs.
#[must_use]
pub fn descriptor() -> NodeDescriptor {
    let dimension = |default: u32| InputSpec::Int {
        default: i64::from(default),
        min: i64::from(MIN_DIMENSION),
        max: i64::from(MAX_DIMENSION),
        step: i64::from(DIMENSION_STEP),
    };

    NodeDescriptor {
        class_name: NODE_CLASS,
        display_name: "Together Image Generator",
        category: "Together API",
        function: "generate_image",
        inputs: vec![
            ("prompt", InputSpec::String { default: DEFAULT_PROMPT.into(), multiline: true }),
            ("model", InputSpec::String { default: DEFAULT_MODEL.into(), multiline: false }),
            ("width", dimension(DEFAULT_WIDTH)),
            ("height", dimension(DEFAULT_HEIGHT)),
            (
                "steps",
                InputSpec::Int {
                    default: i64::from(DEFAULT_STEPS),
                    min: i64::from(MIN_STEPS),
                    max: i64::from(MAX_STEPS),
                    step: 1,
                },
            ),
        ],
        outputs: vec!["IMAGE"],
    }
}

/// Describe the LoRA variant: the base inputs plus adapter URLs and scales.
#[must_use]
pub fn lora_descriptor() -> NodeDescriptor {
    let mut base = descriptor();
    base.class_name = LORA_NODE_CLASS;
    base.display_name = "Together Image Generator with LoRA";
    base.inputs.push((
        "lora_urls",
        InputSpec::String { default: String::new(), multiline: true },
    ));
    base.inputs.push((
        "lora_scales",
        InputSpec::String { default: String::new(), multiline: false },
    ));
    base
}

/// Descriptors for every node this crate provides.
#[must_use]
pub fn all_descriptors() -> Vec<NodeDescriptor> {
    vec![descriptor(), lora_descriptor()]
}

/// Raw inputs as the host hands them over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInputs {
    /// Text prompt.
    pub prompt: String,
    /// Model identifier.
    pub model: String,
    /// Requested width, possibly out of range.
    pub width: i64,
    /// Requested height, possibly out of range.
    pub height: i64,
    /// Requested step count, possibly out of range.
    pub steps: i64,
    /// Comma-separated LoRA URLs; empty for the base node.
    pub lora_urls: String,
    /// Comma-separated LoRA scales, matched to URLs by position.
    pub lora_scales: String,
}

impl Default for NodeInputs {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            width: i64::from(DEFAULT_WIDTH),
            height: i64::from(DEFAULT_HEIGHT),
            steps: i64::from(DEFAULT_STEPS),
            lora_urls: String::new(),
            lora_scales: String::new(),
        }
    }
}

/// Inputs after clamping, quantization, and default substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedInputs {
    /// Non-empty prompt.
    pub prompt: String,
    /// Non-empty model identifier.
    pub model: String,
    /// Width in `[256, 2048]`, a multiple of 64.
    pub width: u32,
    /// Height in `[256, 2048]`, a multiple of 64.
    pub height: u32,
    /// Steps in `[1, 100]`.
    pub steps: u32,
    /// Raw LoRA URL list, parsed when the request is built.
    pub lora_urls: String,
    /// Raw LoRA scale list.
    pub lora_scales: String,
}

impl NodeInputs {
    /// Apply the input schema's bounds and defaults.
    #[must_use]
    pub fn normalize(&self) -> NormalizedInputs {
        let prompt = self.prompt.trim();
        let model = self.model.trim();
        NormalizedInputs {
            prompt: if prompt.is_empty() { DEFAULT_PROMPT } else { prompt }.to_string(),
            model: if model.is_empty() { DEFAULT_MODEL } else { model }.to_string(),
            width: clamp_dimension(self.width),
            height: clamp_dimension(self.height),
            steps: clamp_steps(self.steps),
            lora_urls: self.lora_urls.clone(),
            lora_scales: self.lora_scales.clone(),
        }
    }
}
