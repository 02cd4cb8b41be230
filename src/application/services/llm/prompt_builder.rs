//! Prompt building functions for generation requests

use crate::domain::value_objects::{MapRegion, LOCATION_MAX_COORD, LOCATION_MIN_COORD, MIN_SEPARATION};

/// How much of the itinerary is echoed into the background prompt
const BACKGROUND_CONTEXT_CHARS: usize = 600;

/// Build the extraction prompt that turns an itinerary into map markers
///
/// The extraction policy lives entirely in this prompt: the service does not
/// parse itinerary syntax itself.
pub fn build_extraction_prompt(region: &MapRegion, itinerary: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Analyze the following travel itinerary for {}.\n\n",
        region.coverage
    ));
    prompt.push_str("ITINERARY START\n");
    prompt.push_str(itinerary.trim());
    prompt.push_str("\nITINERARY END\n\n");

    prompt.push_str("Task:\n");
    prompt.push_str("1. Extract 12-15 distinct locations.\n");

    if region.must_include.is_empty() {
        prompt.push_str(
            "2. MANDATORY: Specific attractions mentioned inside a day's notes MUST be their own separate points, do not merge them into the city name.\n",
        );
    } else {
        let quoted: Vec<String> = region
            .must_include
            .iter()
            .map(|stop| format!("\"{}\"", stop))
            .collect();
        prompt.push_str(&format!(
            "2. MANDATORY: You MUST include specific attractions mentioned such as {} as their own separate points, do not merge them into the city name.\n",
            quoted.join(", ")
        ));
    }

    prompt.push_str(
        "3. Ignore generic terms like \"Camp 1\", \"Camp 2\", \"Airport\" unless it's a major stop (like start/end).\n",
    );
    prompt.push_str("4. Generate coordinates (x, y) for a map canvas where:\n");
    for hint in &region.layout_hints {
        prompt.push_str(&format!("   - {}\n", hint));
    }
    prompt.push_str("   - x: 0-100 (Left to Right), y: 0-100 (Top to Bottom).\n");
    prompt.push_str(&format!(
        "   - CRITICAL: Spread out markers visually. If two locations are geographically close, separate them by at least {}% distance on the x or y axis so the UI pins do not overlap.\n\n",
        MIN_SEPARATION
    ));

    prompt.push_str("Output Format: JSON Array.\n");
    prompt.push_str("Each item:\n");
    prompt.push_str("- name: Name in Traditional Chinese (繁體中文).\n");
    prompt.push_str(
        "- description: A cute, Chiikawa-style description (using \"哇！\", \"好期待！\", \"哭哭\", \"好厲害\" etc.). Limit to 2 sentences.\n",
    );
    prompt.push_str("- emoji: Relevant emoji (e.g., 🌊 for water park, 🎢 for theme park).\n");
    prompt.push_str(&format!(
        "- x: number ({}-{}).\n",
        LOCATION_MIN_COORD, LOCATION_MAX_COORD
    ));
    prompt.push_str(&format!(
        "- y: number ({}-{}).\n",
        LOCATION_MIN_COORD, LOCATION_MAX_COORD
    ));
    prompt.push_str("- tags: 2-3 keywords (Traditional Chinese).\n");

    prompt
}

/// Response schema for the extraction request
pub fn location_response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "name": { "type": "STRING" },
                "description": { "type": "STRING" },
                "emoji": { "type": "STRING" },
                "x": { "type": "NUMBER" },
                "y": { "type": "NUMBER" },
                "tags": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                }
            }
        }
    })
}

/// Build the background illustration prompt
///
/// The itinerary only serves as regional context; no markers are drawn.
pub fn build_background_prompt(region: &MapRegion, itinerary: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "A very cute, kawaii, hand-drawn vector style map background of {}.\n",
        region.scenery
    ));
    prompt.push_str("Style: Chiikawa anime style (Nagano), pastel colors.\n");
    prompt.push_str(
        "Colors: Very light Cream paper texture background. Pale green forests, baby blue river.\n",
    );
    prompt.push_str(
        "Aesthetic: Clean, simple, 'loose' ink lines like a children's book illustration.\n",
    );
    prompt.push_str(
        "IMPORTANT: High brightness, low contrast background image so markers stand out. No text labels.\n",
    );
    prompt.push_str("View: Top-down 2D map.\n");

    let context: String = itinerary
        .trim()
        .chars()
        .take(BACKGROUND_CONTEXT_CHARS)
        .collect();
    if !context.is_empty() {
        prompt.push_str("\nTrip context (for regional flavour only, do not write any of it on the map):\n");
        prompt.push_str(&context);
        prompt.push('\n');
    }

    prompt
}
