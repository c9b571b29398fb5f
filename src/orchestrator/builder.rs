//! Assembles the outbound generation request from chat state.

use crate::conversation::{Attachment, ConversationTurn, GeoPoint, Role};
use atomlink_schema::GenerateContentRequest;
use atomlink_schema::gemini::{
    Content, HarmBlockThreshold, HarmCategory, Part, SafetySetting, Tool, ToolConfig,
};

/// Thresholds sent with every generation call.
pub const SAFETY_SETTINGS: [SafetySetting; 4] = [
    SafetySetting::new(HarmCategory::HarmCategoryHarassment, HarmBlockThreshold::BlockOnlyHigh),
    SafetySetting::new(HarmCategory::HarmCategoryHateSpeech, HarmBlockThreshold::BlockOnlyHigh),
    SafetySetting::new(HarmCategory::HarmCategorySexuallyExplicit, HarmBlockThreshold::BlockOnlyHigh),
    SafetySetting::new(HarmCategory::HarmCategoryDangerousContent, HarmBlockThreshold::BlockOnlyHigh),
];

/// Everything one user send contributes to a generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationInput<'a> {
    pub prompt: &'a str,
    pub attachments: &'a [Attachment],
    pub history: &'a [ConversationTurn],
    pub system_instruction: &'a str,
    pub location: Option<GeoPoint>,
}

/// Builds the full-capability request: search grounding always, maps grounding
/// and the caller's coordinates only when a location is known.
///
/// The same input always yields the same request.
pub fn build_generation_request(input: GenerationInput<'_>) -> GenerateContentRequest {
    let mut contents: Vec<Content> = input
        .history
        .iter()
        .filter(|turn| !turn.is_error)
        .filter_map(|turn| turn_content(turn.role, &turn.text, &turn.attachments))
        .collect();

    if let Some(current) = turn_content(Role::User, input.prompt, input.attachments) {
        contents.push(current);
    }

    let mut request = GenerateContentRequest::new(contents);
    if !input.system_instruction.trim().is_empty() {
        request.system_instruction = Some(Content::system(input.system_instruction));
    }
    request.safety_settings = Some(SAFETY_SETTINGS.to_vec());

    let mut tools = vec![Tool::google_search()];
    if let Some(location) = input.location {
        tools.push(Tool::google_maps());
        request.tool_config = Some(ToolConfig::with_lat_lng(location.into()));
    }
    request.tools = Some(tools);

    request
}

/// Inline parts for sendable attachments, then the text. `None` when nothing is left.
fn turn_content(role: Role, text: &str, attachments: &[Attachment]) -> Option<Content> {
    let mut parts: Vec<Part> = attachments
        .iter()
        .filter(|a| a.is_sendable())
        .map(|a| Part::inline_data(a.mime_type.as_str(), a.base64_data()))
        .collect();

    if !text.is_empty() {
        parts.push(Part::text(text));
    }

    (!parts.is_empty()).then(|| Content::new(role.as_str(), parts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input<'a>(
        prompt: &'a str,
        history: &'a [ConversationTurn],
        location: Option<GeoPoint>,
    ) -> GenerationInput<'a> {
        GenerationInput {
            prompt,
            attachments: &[],
            history,
            system_instruction: "be brief",
            location,
        }
    }

    #[test]
    fn error_and_empty_turns_are_dropped() {
        let history = vec![
            ConversationTurn::user("first"),
            ConversationTurn::error("Neural connection interrupted."),
            ConversationTurn::model(""),
            ConversationTurn::model("answer"),
        ];
        let request = build_generation_request(input("next", &history, None));

        let texts: Vec<_> = request
            .contents
            .iter()
            .map(|c| {
                (
                    c.role.clone().unwrap_or_default(),
                    c.parts[0].text.clone().unwrap_or_default(),
                )
            })
            .collect();
        assert_eq!(
            texts,
            vec![
                ("user".to_string(), "first".to_string()),
                ("model".to_string(), "answer".to_string()),
                ("user".to_string(), "next".to_string()),
            ]
        );
    }

    #[test]
    fn attachments_precede_text() {
        let attachments = vec![
            Attachment::new(b"img".to_vec(), "image/png"),
            Attachment::new(Vec::new(), "image/png"),
        ];
        let request = build_generation_request(GenerationInput {
            attachments: &attachments,
            ..input("describe", &[], None)
        });

        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        let blob = parts[0].inline_data.as_ref().unwrap();
        assert_eq!(blob.mime_type, "image/png");
        assert_eq!(blob.data, "aW1n");
        assert_eq!(parts[1].text.as_deref(), Some("describe"));
    }

    #[test]
    fn empty_prompt_adds_no_user_turn() {
        let history = vec![ConversationTurn::user("hello")];
        let request = build_generation_request(input("", &history, None));
        assert_eq!(request.contents.len(), 1);
    }

    #[test]
    fn search_always_maps_only_with_location() {
        let plain = build_generation_request(input("q", &[], None));
        assert!(plain.has_google_search());
        assert!(!plain.has_google_maps());
        assert!(plain.tool_config.is_none());

        let here = GeoPoint {
            latitude: 52.52,
            longitude: 13.405,
        };
        let located = build_generation_request(input("q", &[], Some(here)));
        assert!(located.has_google_search());
        assert!(located.has_google_maps());
        let lat_lng = located.retrieval_lat_lng().unwrap();
        assert_eq!(lat_lng.latitude, 52.52);
        assert_eq!(lat_lng.longitude, 13.405);
    }

    #[test]
    fn wire_shape_carries_static_safety_and_system_instruction() {
        let value = serde_json::to_value(build_generation_request(input("q", &[], None))).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(value["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(
            value["safetySettings"][0],
            json!({"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_ONLY_HIGH"})
        );
        assert_eq!(value["tools"], json!([{"googleSearch": {}}]));
    }

    #[test]
    fn build_is_deterministic() {
        let history = vec![ConversationTurn::user("a"), ConversationTurn::model("b")];
        let here = Some(GeoPoint {
            latitude: 1.0,
            longitude: 2.0,
        });
        let first = serde_json::to_string(&build_generation_request(input("c", &history, here)));
        let second = serde_json::to_string(&build_generation_request(input("c", &history, here)));
        assert_eq!(first.unwrap(), second.unwrap());
    }
}
