//! Instruction templates and query assembly
//!
//! Two fixed templates, selected by whether a medical image accompanies the
//! request. The template is translated into the patient's detected language
//! before assembly; the assembled query then carries the patient-language
//! note, the transcript (or its absence), and the image-availability note.

use crate::types::{PromptVariant, Transcript};

/// Instruction template used when a medical image is attached.
pub const BASE_PROMPT_WITH_IMAGE: &str = "You have to act as a professional doctor, i know you are not but this is for learning purpose. \
What's in this image?. Do you find anything wrong with it medically? \
If you make a differential, suggest some remedies for them. Donot add any numbers or special characters in \
your response. Your response should be in one long paragraph. Also always answer as if you are answering to a real person. \
Donot say 'In the image I see' but say 'With what I see, I think you have ....' \
Dont respond as an AI model in markdown, your answer should mimic that of an actual doctor not an AI bot, \
Keep your answer concise (max 2 sentences). No preamble, start your answer right away please";

/// Instruction template used when the patient only described symptoms.
pub const BASE_PROMPT_VOICE_ONLY: &str = "You have to act as a professional doctor (for learning purposes). \
The patient only described their symptoms via speech; no medical image is available. \
Listen to what they said (transcript is provided) and infer the most likely causes plus concrete suggestions \
(home care, medications to discuss with a doctor, red-flag symptoms). Avoid bullet points, keep it to one \
paragraph in natural language, maximum two sentences, and sound like an actual doctor speaking to a patient.";

/// Reply substituted when the reasoning service is never called.
pub const NO_INPUT_REPLY: &str = "No input provided (neither speech nor image).";

/// Transcript placeholder shown in the result when no speech was captured.
pub const NO_SPEECH_PLACEHOLDER: &str = "No speech provided.";

/// Select the template for the request shape.
pub fn base_prompt(variant: PromptVariant) -> &'static str {
    match variant {
        PromptVariant::WithImage => BASE_PROMPT_WITH_IMAGE,
        PromptVariant::VoiceOnly => BASE_PROMPT_VOICE_ONLY,
    }
}

/// Assemble the full reasoning query from the (possibly translated)
/// instruction template, the transcript, and the image availability.
pub fn build_query(translated_prompt: &str, transcript: &Transcript, has_image: bool) -> String {
    let mut query = format!("{translated_prompt}\n\n");

    if !transcript.is_empty() {
        query.push_str(&format!(
            "The patient spoke in {}. Patient said: {}.\n",
            transcript.language.as_code(),
            transcript.text
        ));
    } else {
        query.push_str("No speech was provided.\n");
    }

    if has_image {
        query.push_str("A medical image is attached. Use it for your assessment.");
    } else {
        query.push_str(
            "No medical image is available. Offer guidance based solely on the patient's description.",
        );
    }

    query
}
