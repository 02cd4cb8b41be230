//! Decoration character roster
//!
//! The roster is static configuration. It does not depend on the itinerary.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDefinition {
    pub name: String,
    /// Image prompt sent to the generator
    pub prompt: String,
    /// Caption shown when the character is clicked
    pub default_message: String,
}

impl CharacterDefinition {
    pub fn new(
        name: impl Into<String>,
        prompt: impl Into<String>,
        default_message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            default_message: default_message.into(),
        }
    }
}

const STICKER_STYLE: &str = "White background, simple thick black outlines, vector flat style.";

/// The four travelling companions, in anchor-slot order
pub fn default_roster() -> Vec<CharacterDefinition> {
    vec![
        CharacterDefinition::new(
            "吉伊卡娃",
            format!(
                "Full body sticker of Chiikawa (small white bear) wearing swimming goggles and a floatie, looking nervous but happy. {}",
                STICKER_STYLE
            ),
            "水...水好涼！",
        ),
        CharacterDefinition::new(
            "小八貓",
            format!(
                "Full body sticker of Hachiware (cat with blue tips) holding a camera taking a photo of scenery, speaking. {}",
                STICKER_STYLE
            ),
            "這個好像很厲害耶！",
        ),
        CharacterDefinition::new(
            "烏薩奇",
            format!(
                "Full body sticker of Usagi (yellow rabbit) running fast with a French baguette in mouth, crazy eyes. {}",
                STICKER_STYLE
            ),
            "普魯亞哈！！",
        ),
        CharacterDefinition::new(
            "栗子饅頭",
            format!(
                "Full body sticker of Kurimanju (otter) holding a german beer mug, sighing with satisfaction 'Haa...'. {}",
                STICKER_STYLE
            ),
            "哈...",
        ),
    ]
}
