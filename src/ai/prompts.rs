//! Prompt templates and the response schema for story generation.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};

use crate::curve::IntensitySample;
use crate::story::models::Language;

/// Genres the model picks from. One is suggested per request so that
/// consecutive stories do not all land in the same setting.
pub const GENRES: [&str; 10] = [
    "Historical Fiction",
    "High Fantasy",
    "Space Opera",
    "Murder Mystery",
    "Psychological Horror",
    "Western",
    "Romance",
    "Slice of Life",
    "Folklore",
    "Steampunk",
];

pub fn pick_genre<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    GENRES.choose(rng).copied().unwrap_or(GENRES[0])
}

pub fn system_instruction(chapter_count: usize, language: Language, genre: &str) -> String {
    let lang = language.prompt_name();
    let genres = GENRES.join(", ");
    format!(
        r#"You are a master storyteller and visual director.
Your task is to write a cohesive, engaging story divided into {chapter_count} chapters.
The story's dramatic tension and emotional intensity MUST strictly follow the provided intensity curve.

LANGUAGE REQUIREMENT:
The 'title', 'theme', 'chapterTitle', and 'content' MUST be written in {lang}.
The 'imagePrompt' MUST be written in English to ensure best image generation results.

INTENSITY GUIDELINES:
- Low Intensity (0-30%): Calm, peaceful, exposition, or resolution.
- Medium Intensity (30-60%): Rising action, mystery, travel, dialogue.
- High Intensity (60-85%): Conflict, danger, rapid movement, revelation.
- Extreme Intensity (85-100%): Climax, battle, major plot twist, epiphany.

CONTENT REQUIREMENTS:
- GENRE/THEME: Do NOT default to Cyberpunk. Write this story as {genre}. Other genres you may blend in: {genres}.
- LENGTH: Each chapter content MUST be substantial, approximately 150-200 words. Detail the environment, internal monologues, and sensory details.

For each chapter, provide:
1. A short title (in {lang}).
2. The story content (approx 150-200 words, in {lang}).
3. An 'intensity' score (number) based on the input.
4. An 'imagePrompt' that describes the visual scene vividly for an AI image generator (English). Focus on lighting, color, and mood."#
    )
}

/// The arc description: one line per chapter with its rounded intensity.
pub fn arc_prompt(samples: &[IntensitySample]) -> String {
    let lines: Vec<String> = samples
        .iter()
        .enumerate()
        .map(|(i, s)| format!("Chapter {}: Intensity Level {}%", i + 1, s.intensity.round()))
        .collect();
    format!("Create a story based on this dramatic arc:\n{}", lines.join("\n"))
}

/// JSON schema the text model must answer with.
pub fn story_schema(language: Language) -> Value {
    let lang = language.prompt_name();
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING", "description": format!("The main title of the story in {lang}") },
            "theme": { "type": "STRING", "description": format!("The genre or theme chosen in {lang}") },
            "chapters": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "chapterTitle": { "type": "STRING" },
                        "content": { "type": "STRING" },
                        "intensity": { "type": "NUMBER" },
                        "imagePrompt": { "type": "STRING" }
                    },
                    "required": ["chapterTitle", "content", "intensity", "imagePrompt"]
                }
            }
        },
        "required": ["title", "theme", "chapters"]
    })
}
