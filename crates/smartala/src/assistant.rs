//! Boundary to the external language model.
//!
//! The model transcribes audio and writes the spoken answer; this module
//! only builds prompts for it and parses the sectioned text it returns.
//! No vendor client lives here: callers plug one in through
//! [`AudioDescriber`].

use std::path::Path;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// Section header for what the model heard.
pub const TRANSCRIPTION: &str = "TRANSCRIPTION";
/// Section header for navigation guidance.
pub const NAVIGATION: &str = "NAVIGATION";
/// Section header for a main-screen command answer.
pub const RESPONSE: &str = "RESPONSE";
/// Section header for a recognised destination.
pub const DESTINATION: &str = "DESTINATION";
/// Section header for a narrated route.
pub const ROUTE: &str = "ROUTE";
/// Section header for walking time.
pub const TIME: &str = "TIME";
/// Section header for walking distance.
pub const DISTANCE: &str = "DISTANCE";

const DEFAULT_MIME: &str = "audio/webm";

/// A recorded voice clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Encoded audio bytes.
    pub data: Vec<u8>,
    /// MIME type of `data`.
    pub mime_type: String,
}

impl AudioClip {
    /// Wrap bytes with an explicit MIME type.
    #[must_use]
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Wrap bytes, taking the MIME type from a file name's extension.
    #[must_use]
    pub fn from_file_name(data: Vec<u8>, file_name: &str) -> Self {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::new(data, mime_type_for_extension(ext))
    }

    /// Whether the clip has no audio.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// MIME type for an audio file extension, `audio/webm` when unknown.
#[must_use]
pub fn mime_type_for_extension(ext: &str) -> &'static str {
    match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "webm" => "audio/webm",
        "m4a" => "audio/m4a",
        "mp3" => "audio/mp3",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        _ => DEFAULT_MIME,
    }
}

/// A generative model that can answer a prompt about an audio clip.
#[async_trait]
pub trait AudioDescriber: Send + Sync {
    /// Answer `prompt` with `clip` attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be reached or refuses.
    async fn describe(&self, prompt: &str, clip: &AudioClip) -> Result<String>;
}

/// Send a clip to the model, rejecting empty clips and blank answers.
///
/// # Errors
///
/// Returns [`Error::Validation`] for an empty clip and [`Error::Assistant`]
/// when the model fails or answers with nothing.
pub async fn ask(describer: &dyn AudioDescriber, prompt: &str, clip: &AudioClip) -> Result<String> {
    if clip.is_empty() {
        return Err(Error::validation("audio clip is empty"));
    }
    let text = describer.describe(prompt, clip).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::assistant("model returned an empty reply"));
    }
    Ok(text.to_string())
}

/// Inputs for the navigation prompt.
#[derive(Debug, Clone, Copy)]
pub struct NavigationPrompt<'a> {
    /// City the assistant works in.
    pub city: &'a str,
    /// Current position.
    pub position: Coordinate,
    /// Stated destination, if any.
    pub destination: Option<&'a str>,
    /// Previous exchanges rendered as text.
    pub context: &'a str,
}

impl NavigationPrompt<'_> {
    /// Render the prompt.
    #[must_use]
    pub fn render(&self) -> String {
        let destination = match self.destination {
            Some(d) if !d.trim().is_empty() => format!("Destination: {}", d.trim()),
            _ => format!("Ready to plan a route to any place in {}", self.city),
        };
        format!(
            "You are SmartAla, a professional voice navigator for pedestrians in {city}. \
You know every street, building and route in the city.\n\n\
CURRENT SITUATION:\n\
You are at coordinates {position} in {city}\n\
{destination}\n\n\
PREVIOUS CONVERSATION:\n\
{context}\n\n\
INSTRUCTIONS:\n\
- Transcribe the audio exactly\n\
- Answer like a professional GPS navigator with real street names\n\
- Give distances in meters and times in minutes\n\
- Say directions plainly: \"turn right onto ...\", \"walk straight 200 meters\"\n\
- Warn about traffic lights, crossings and landmarks\n\
- If asked whether the user is on track, confirm or correct the direction\n\
- If the exact place is unknown, suggest the nearest known landmarks\n\n\
ANSWER FORMAT:\n\
{TRANSCRIPTION}: [what you heard]\n\
{NAVIGATION}: [exact directions with street names and distances]\n",
            city = self.city,
            position = self.position,
            context = self.context,
        )
    }
}

/// Prompt for voice commands on the main screen.
#[must_use]
pub fn command_prompt() -> String {
    format!(
        "You are the voice assistant of SmartAla, a navigation app for blind and low-vision people. \
The user is on the main screen.\n\n\
AVAILABLE COMMANDS:\n\
- \"Start navigation\" / \"Navigation\" -> open the navigation screen\n\
- \"Glasses\" / \"Connect glasses\" -> open the smart glasses screen\n\
- \"My places\" / \"Saved places\" -> show saved places\n\
- \"Help\" -> show help\n\
- \"Save this place\" -> save the current location\n\
- General questions about the app\n\n\
INSTRUCTIONS:\n\
1. Transcribe the audio exactly\n\
2. Work out what the user wants\n\
3. Answer clearly and name the action\n\n\
ANSWER FORMAT:\n\
{TRANSCRIPTION}: [what you heard]\n\
{RESPONSE}: [your answer to the user]\n"
    )
}

/// Prompt asking the model to plan a route to a spoken destination.
#[must_use]
pub fn voice_route_prompt(city: &str, position: Coordinate) -> String {
    format!(
        "You are SmartAla, a professional voice navigator for {city}.\n\n\
TASK: listen to the audio and build an exact walking route to the place the user names.\n\n\
YOUR POSITION:\n\
{position} in central {city}\n\n\
INSTRUCTIONS:\n\
1. Transcribe exactly what the user says\n\
2. Identify the destination\n\
3. Build a detailed walking route with real street names\n\
4. Give the exact time and distance\n\
5. Warn about traffic lights, crossings and landmarks\n\n\
ANSWER FORMAT:\n\
{TRANSCRIPTION}: [what you heard]\n\
{DESTINATION}: [the exact place]\n\
{ROUTE}: [step by step directions with streets, distances and landmarks]\n\
{TIME}: [minutes]\n\
{DISTANCE}: [meters]\n"
    )
}

/// Split a sectioned reply into the text of each named section.
///
/// A line that starts with `HEADER:` opens that section; following
/// non-empty lines are appended to the open section with one space.
/// Lines before any header are ignored. The result has one string per
/// header, in the order given.
#[must_use]
pub fn parse_sections(text: &str, headers: &[&str]) -> Vec<String> {
    let mut sections = vec![String::new(); headers.len()];
    let mut current: Option<usize> = None;

    for line in text.lines().map(str::trim) {
        let opened = headers.iter().enumerate().find_map(|(i, header)| {
            line.strip_prefix(header)
                .and_then(|rest| rest.strip_prefix(':'))
                .map(|rest| (i, rest.trim()))
        });

        if let Some((i, rest)) = opened {
            current = Some(i);
            sections[i].push_str(rest);
        } else if let Some(i) = current {
            if !line.is_empty() {
                if !sections[i].is_empty() {
                    sections[i].push(' ');
                }
                sections[i].push_str(line);
            }
        }
    }

    sections.iter().map(|s| s.trim().to_string()).collect()
}

/// Parse a transcription-plus-answer reply.
///
/// When either section comes back empty the reply is split on the
/// `answer_header` marker if both markers are present; otherwise the
/// whole text becomes the answer and `fallback` the transcription.
#[must_use]
pub fn parse_exchange(text: &str, answer_header: &str, fallback: &str) -> (String, String) {
    let sections = parse_sections(text, &[TRANSCRIPTION, answer_header]);
    let (transcription, answer) = (&sections[0], &sections[1]);
    if !transcription.is_empty() && !answer.is_empty() {
        return (transcription.clone(), answer.clone());
    }

    let transcription_marker = format!("{TRANSCRIPTION}:");
    let answer_marker = format!("{answer_header}:");
    if text.contains(&transcription_marker) {
        if let Some((head, tail)) = text.split_once(&answer_marker) {
            return (
                head.replace(&transcription_marker, "").trim().to_string(),
                tail.trim().to_string(),
            );
        }
    }

    (fallback.to_string(), text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for_extension("mp3"), "audio/mp3");
        assert_eq!(mime_type_for_extension(".WAV"), "audio/wav");
        assert_eq!(mime_type_for_extension("flac"), "audio/flac");
        assert_eq!(mime_type_for_extension("aiff"), "audio/webm");
        assert_eq!(mime_type_for_extension(""), "audio/webm");
    }

    #[test]
    fn test_clip_from_file_name() {
        let clip = AudioClip::from_file_name(vec![1, 2], "recording.m4a");
        assert_eq!(clip.mime_type, "audio/m4a");
        let clip = AudioClip::from_file_name(vec![1], "blob");
        assert_eq!(clip.mime_type, "audio/webm");
    }

    #[test]
    fn test_parse_sections_multiline() {
        let text = "TRANSCRIPTION: where is the park\n\
                    NAVIGATION: Turn right onto Abay Avenue\n\
                    and walk 300 meters\n\
                    \n\
                    to the traffic light";
        let sections = parse_sections(text, &[TRANSCRIPTION, NAVIGATION]);
        assert_eq!(sections[0], "where is the park");
        assert_eq!(
            sections[1],
            "Turn right onto Abay Avenue and walk 300 meters to the traffic light"
        );
    }

    #[test]
    fn test_parse_sections_ignores_preamble() {
        let text = "Sure!\nTIME: 8\nDISTANCE: 650";
        let sections = parse_sections(text, &[TIME, DISTANCE, ROUTE]);
        assert_eq!(sections, vec!["8", "650", ""]);
    }

    #[test]
    fn test_parse_sections_header_on_its_own_line() {
        let text = "ROUTE:\nHead north\nThen east";
        let sections = parse_sections(text, &[ROUTE]);
        assert_eq!(sections[0], "Head north Then east");
    }

    #[test]
    fn test_parse_exchange_regular() {
        let text = "TRANSCRIPTION: hello\nRESPONSE: hi there";
        let (t, r) = parse_exchange(text, RESPONSE, "Command processed");
        assert_eq!(t, "hello");
        assert_eq!(r, "hi there");
    }

    #[test]
    fn test_parse_exchange_inline_markers() {
        let text = "TRANSCRIPTION: go home NAVIGATION: walk north";
        let (t, r) = parse_exchange(text, NAVIGATION, "Audio processed");
        assert_eq!(t, "go home");
        assert_eq!(r, "walk north");
    }

    #[test]
    fn test_parse_exchange_fallback() {
        let text = "Walk north for 200 meters.";
        let (t, r) = parse_exchange(text, NAVIGATION, "Audio processed");
        assert_eq!(t, "Audio processed");
        assert_eq!(r, "Walk north for 200 meters.");
    }

    #[test]
    fn test_navigation_prompt_contents() {
        let position = Coordinate::new(43.238293, 76.889709).unwrap();
        let prompt = NavigationPrompt {
            city: "Almaty",
            position,
            destination: Some("Green Bazaar"),
            context: "User: hi\nAssistant: hello",
        }
        .render();
        assert!(prompt.contains("43.238293, 76.889709"));
        assert!(prompt.contains("Destination: Green Bazaar"));
        assert!(prompt.contains("User: hi"));
        assert!(prompt.contains("NAVIGATION: ["));

        let open = NavigationPrompt {
            city: "Almaty",
            position,
            destination: None,
            context: "",
        }
        .render();
        assert!(open.contains("any place in Almaty"));
    }

    #[test]
    fn test_other_prompts_name_their_sections() {
        assert!(command_prompt().contains("RESPONSE: ["));
        let prompt = voice_route_prompt("Almaty", Coordinate::new(1.0, 2.0).unwrap());
        for header in [TRANSCRIPTION, DESTINATION, ROUTE, TIME, DISTANCE] {
            assert!(prompt.contains(&format!("{header}: [")), "{header}");
        }
    }
}
