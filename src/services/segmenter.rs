use crate::{
    error::{Result, SegmentationError},
    models::book::Scene,
    services::ai_service::ModelClient,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Wrapper keys the model is known to put around the scene list, in priority order
const ENVELOPE_KEYS: [&str; 3] = ["scenes", "results", "result"];

/// The JSON shapes accepted from the segmentation model
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEnvelope {
    /// `[{...}, {...}]`
    BareArray(Vec<Value>),
    /// `{"scenes": [...]}`, `{"results": [...]}` or `{"result": [...]}`
    Wrapped { key: &'static str, items: Vec<Value> },
    /// `{"1": {...}, "2": {...}}`, ordered by key
    NumberedMap(Vec<Value>),
    /// A lone `{"index": 1, "text": "..."}`
    SingleScene(Value),
}

impl SceneEnvelope {
    /// Classify a parsed reply; `None` for any shape not listed above
    pub fn classify(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Self::BareArray(items)),
            Value::Object(map) => Self::classify_object(map),
            _ => None,
        }
    }

    fn classify_object(mut map: Map<String, Value>) -> Option<Self> {
        for key in ENVELOPE_KEYS {
            if matches!(map.get(key), Some(Value::Array(_))) {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return Some(Self::Wrapped { key, items });
                }
            }
        }

        if map.contains_key("text") {
            return Some(Self::SingleScene(Value::Object(map)));
        }

        if !map.is_empty() && map.keys().all(|k| k.parse::<u64>().is_ok()) {
            let mut numbered: Vec<(u64, Value)> = map
                .into_iter()
                .filter_map(|(k, v)| k.parse::<u64>().ok().map(|n| (n, v)))
                .collect();
            numbered.sort_by_key(|(n, _)| *n);
            return Some(Self::NumberedMap(
                numbered.into_iter().map(|(_, v)| v).collect(),
            ));
        }

        None
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::BareArray(items) | Self::NumberedMap(items) => items,
            Self::Wrapped { items, .. } => items,
            Self::SingleScene(scene) => vec![scene],
        }
    }
}

/// Splits a story into scenes with the text model
pub struct SceneSegmenter {
    client: Arc<dyn ModelClient>,
    min_scene_chars: usize,
}

impl SceneSegmenter {
    pub fn new(client: Arc<dyn ModelClient>, min_scene_chars: usize) -> Self {
        Self {
            client,
            min_scene_chars,
        }
    }

    #[instrument(skip(self, story), fields(story_len = story.len()))]
    pub async fn segment(&self, story: &str, max_scenes: u32) -> Result<Vec<Scene>> {
        let max_scenes = max_scenes.max(1);
        let system_prompt = system_instructions(max_scenes);

        let raw = self.client.complete_json(&system_prompt, story).await?;

        let scenes = parse_scenes(&raw, max_scenes as usize, self.min_scene_chars)?;

        info!("Segmented story into {} scenes", scenes.len());

        Ok(scenes)
    }
}

pub fn system_instructions(max_scenes: u32) -> String {
    format!(
        "You are an expert children's book editor. Split the input STORY into a maximum \
        of {max_scenes} scenes, one illustration per scene. Prefer breaking at chapter \
        markers and paragraph boundaries, keep every scene a self-contained moment, and \
        keep the scenes in story order. DO NOT change the original text. Reply ONLY with \
        JSON of the form {{\"scenes\": [{{\"index\": int, \"text\": str}}, ...]}}."
    )
}

/// Parse the model's reply into at most `max_scenes` scenes numbered from 1
pub fn parse_scenes(
    raw: &str,
    max_scenes: usize,
    min_scene_chars: usize,
) -> std::result::Result<Vec<Scene>, SegmentationError> {
    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|source| SegmentationError::InvalidJson {
            source,
            raw: raw.to_string(),
        })?;

    let items = SceneEnvelope::classify(value)
        .ok_or_else(|| SegmentationError::UnrecognizedShape {
            raw: raw.to_string(),
        })?
        .into_items();

    let mut parsed = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let text = item
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| SegmentationError::InvalidScene {
                position: position + 1,
                raw: raw.to_string(),
            })?;
        let order = item
            .get("index")
            .and_then(Value::as_u64)
            .unwrap_or(position as u64 + 1);
        parsed.push((order, text.trim().to_string()));
    }

    if parsed.is_empty() {
        return Err(SegmentationError::NoScenes {
            raw: raw.to_string(),
        });
    }

    // Stable: equal or missing indices keep the model's order
    parsed.sort_by_key(|(order, _)| *order);

    // Every scene is checked, including those dropped by the cap below
    let min_chars = min_scene_chars.max(1);
    if let Some(position) = parsed
        .iter()
        .position(|(_, text)| text.chars().count() < min_chars)
    {
        return Err(SegmentationError::SceneTooShort {
            position: position + 1,
            min_chars,
            raw: raw.to_string(),
        });
    }

    parsed.truncate(max_scenes);

    Ok(parsed
        .into_iter()
        .enumerate()
        .map(|(i, (_, text))| Scene {
            index: i as u32 + 1,
            text,
        })
        .collect())
}
